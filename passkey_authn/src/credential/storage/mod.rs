mod credential_store;
mod postgres;
mod sqlite;

pub(crate) use credential_store::CredentialStore;
