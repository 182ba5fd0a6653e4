use zapauth_core::DEFAULT_ROSTER;

use crate::cli::OutputFormat;
use crate::client::CliResult;
use crate::output::render_roster;

pub(crate) fn handle_roster(format: OutputFormat) -> CliResult<()> {
    render_roster(&DEFAULT_ROSTER, format)
}
