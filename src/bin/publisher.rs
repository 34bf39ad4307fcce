use std::process::ExitCode;
#[macro_use]
extern crate tracing;

use notifications::{config::PublisherConfig, init, interrupt, publisher};

#[tokio::main]
async fn main() -> ExitCode {
    init::init();

    let config = match PublisherConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);

            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = publisher::serve(config, interrupt()).await {
        error!("Failed to start producer: {}", err);

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
