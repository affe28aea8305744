pub mod classifier;
pub mod detector;
pub mod fields;
pub mod parser;
pub mod pending;
pub mod types;

pub use classifier::classify_action;
pub use detector::detect_approval_result;
pub use parser::parse_approval_text;
pub use pending::{PendingApprovals, PendingSet};
pub use types::*;
