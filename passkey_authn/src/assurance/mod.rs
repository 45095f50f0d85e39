mod main;
mod types;

pub use main::AssurancePolicy;
pub use types::{AssuranceLevel, MethodTag};
