mod main;
mod types;

pub use main::AuthenticatorCatalog;
pub use types::{AuthenticatorInfo, VendorCategory};
