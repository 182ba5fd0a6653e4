//! Command handlers grouped by concern.

mod roster;
mod run;

pub(crate) use roster::handle_roster;
pub(crate) use run::handle_run;
