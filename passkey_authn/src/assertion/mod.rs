mod errors;
mod main;
#[cfg(test)]
mod test_utils;
mod types;

pub use errors::AssertionError;
pub use main::verify_assertion;
pub use types::{AssertionResponse, VerifiedAssertion};
