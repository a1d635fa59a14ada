pub mod cli;
pub mod config;
pub mod csv;
pub mod entity;
pub mod error;
pub mod import;
pub mod search;
pub mod storage;
pub mod template;
pub mod vault;

pub use error::{Result, VaultError};
pub use storage::DualStore;
pub use vault::Vault;
