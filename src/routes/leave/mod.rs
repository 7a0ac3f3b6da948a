mod create_leave;
mod delete_leave;
mod get_leave;
mod update_leave;

pub use create_leave::*;
pub use delete_leave::*;
pub use get_leave::*;
pub use update_leave::*;
