//! Per-intent policy orchestration.
//!
//! Each check handles one [`RequestIntent`](crate::RequestIntent): it pulls
//! the networks implicated by the request (body and, where the instance
//! already exists, the instance lookup) and runs the policy rules in
//! order required → banned → count, stopping at the first violation.
//!
//! Checks return `Ok(None)` to let the request through and
//! `Ok(Some(violation))` to reject it. Lookup failures are errors.

mod attach;
mod boot;
mod detach;

pub use attach::AttachNetworkCountCheck;
pub use boot::BootNetworkCountCheck;
pub use detach::DetachNetworkCheck;
