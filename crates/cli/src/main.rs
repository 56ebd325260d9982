use clap::Parser;
use lambda_audit::args::Cli;
use lambda_audit::commands::audit_command;
use lambda_audit::exit_code::{ExitCode, ExitCodeExt};
use lambda_audit::logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let code = match audit_command(&cli) {
        Ok(_) => ExitCode::Success,
        Err(err) => {
            eprintln!("Error: {err:#}");
            err.exit_code()
        }
    };
    code.into()
}
