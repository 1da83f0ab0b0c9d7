//! nodectl binary.

use std::process::ExitCode;

use clap_complete::CompleteEnv;

#[tokio::main]
async fn main() -> ExitCode {
    CompleteEnv::with_factory(nodectl_commands::cli_command).complete();

    nodectl_commands::run().await
}
