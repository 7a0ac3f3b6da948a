pub mod hashmap_identity_selection_store;
pub mod hashmap_leave_store;
pub mod hashmap_profile_store;
pub mod postgres_leave_store;
pub mod postgres_profile_store;
pub mod redis_identity_selection_store;

pub use hashmap_identity_selection_store::*;
pub use hashmap_leave_store::*;
pub use hashmap_profile_store::*;
pub use postgres_leave_store::*;
pub use postgres_profile_store::*;
pub use redis_identity_selection_store::*;
