mod eligibility;
mod leave;
mod opportunities;
mod shifts;
mod webhook;

pub use eligibility::*;
pub use leave::*;
pub use opportunities::*;
pub use shifts::*;
pub use webhook::*;
