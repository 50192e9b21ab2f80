use lltsv::{cli_parse, logging, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli_parse();
    logging::init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
