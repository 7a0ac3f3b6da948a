mod eligibility;
mod helpers;
mod leave;
mod opportunities;
mod shifts;
mod webhook;
