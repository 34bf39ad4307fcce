use std::process::ExitCode;
#[macro_use]
extern crate tracing;

use notifications::{config::SubscriberConfig, init, interrupt, subscriber::Subscriber};

#[tokio::main]
async fn main() -> ExitCode {
    init::init();

    let config = match SubscriberConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);

            return ExitCode::FAILURE;
        }
    };

    let subscriber = match Subscriber::connect(&config).await {
        Ok(subscriber) => subscriber,
        Err(err) => {
            error!("{}", err);

            return ExitCode::FAILURE;
        }
    };

    info!(partitions = ?subscriber.partitions(), "Consumer is running");

    match subscriber.run(tokio::io::stdout(), interrupt()).await {
        Ok(printed) => {
            info!(printed, "Subscriber stopped");

            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Failed to write received messages: {}", err);

            ExitCode::FAILURE
        }
    }
}
