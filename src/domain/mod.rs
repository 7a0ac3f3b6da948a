mod clock;
mod data_stores;
mod eligibility;
mod error;
mod events;
mod leave_record;
mod line_user_id;
mod member_name;
mod notification;
mod overtime;
mod period;
mod profile;
pub mod roster;
mod shift;
mod team;

pub use clock::*;
pub use data_stores::*;
pub use eligibility::*;
pub use error::*;
pub use events::*;
pub use leave_record::*;
pub use line_user_id::*;
pub use member_name::*;
pub use notification::*;
pub use overtime::*;
pub use period::*;
pub use profile::*;
pub use shift::*;
pub use team::*;
