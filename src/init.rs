use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "notifications=info,publisher=info,subscriber=info";

/// Process bootstrap shared by both binaries. Loads `.env` when one exists and
/// installs the tracing subscriber. Logs go to stderr so stdout only carries
/// relayed messages. Call once per process.
pub fn init() {
    if let Err(err) = dotenv::dotenv() {
        if !err.not_found() {
            eprintln!("Failed to load .env: {}", err);
        }
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
