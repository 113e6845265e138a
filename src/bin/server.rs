use std::process::ExitCode;

use clap::Parser;
use collect_rush_server::config::Config;
use collect_rush_server::server::run;
use collect_rush_server::telemetry::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "server stopped");
            ExitCode::FAILURE
        }
    }
}
