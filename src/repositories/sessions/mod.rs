pub mod session_repo;
pub mod memory_store;

pub use session_repo::*;
pub use memory_store::*;
