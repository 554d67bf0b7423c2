//! Conversion from CLI errors to miette reports.

use miette::Report;

use crate::error::CliError;

/// Convert a `CliError` into a miette `Report`.
///
/// Assembly errors keep their diagnostic code and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Assembly(e) => Report::new(e),
        CliError::Config(e) => miette::miette!(
            help = "Run `tack check` to validate the configuration",
            "Configuration error: {}",
            e
        ),
        other => miette::miette!("{}", other),
    }
}
