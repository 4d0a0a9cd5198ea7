pub mod error;
pub mod identity_repo;
pub mod memory;
