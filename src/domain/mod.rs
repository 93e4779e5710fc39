pub mod approval;
pub mod identity;
pub mod priority;
pub mod role;
pub mod transitions;

pub use approval::ApprovalDecision;
pub use identity::Identity;
pub use priority::Priority;
pub use role::Role;
pub use transitions::{StatusFlags, TransitionDenied, check_transition};
