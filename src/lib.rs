pub mod cli;
pub mod config;
pub mod expr;
pub mod filter;
pub mod logging;
pub mod pipeline;
pub mod projector;
pub mod record;
pub mod timegrep;

use anyhow::Context;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

pub use cli::{Cli, ColorMode, cli_parse};
pub use expr::{ExprSet, ExprSpec};
pub use filter::{FieldFilter, FilterSet};
pub use pipeline::{Lltsv, LltsvOptions, RunSummary, Source};
pub use projector::{KeySelection, Projector, RenderMode};
pub use record::Record;
pub use timegrep::{TimeFormat, TimeRange, TimeRangeSet};

/// Compile the options from `cli` and stream every input through them.
///
/// Configuration errors are returned before any input is read. Unreadable
/// inputs do not stop the run but make the exit code non-zero.
pub fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let profile = config::load_config(cli.config.as_deref()).context("Failed to load config")?;
    let (options, color_mode) = profile.merge(cli);

    let colorize = color_mode.enabled(io::stdout().is_terminal());
    if colorize && !options.no_key {
        colored::control::set_override(true);
    }

    let lltsv = Lltsv::new(&options, colorize).context("Invalid filter")?;

    let sources: Vec<Source> = if cli.files.is_empty() {
        vec![Source::Stdin]
    } else {
        cli.files.iter().cloned().map(Source::File).collect()
    };

    // stdout is line buffered, so `tail -f | lltsv` emits as lines arrive
    let mut out = io::stdout().lock();
    let summary = lltsv
        .run_sources(&sources, &mut out)
        .context("Failed to write output")?;

    Ok(if summary.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
