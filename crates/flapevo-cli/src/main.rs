use tracing_subscriber::EnvFilter;

mod command;
mod model;
mod util;

fn main() -> anyhow::Result<()> {
    init_tracing();
    command::run()
}

/// Logs to stderr so that JSON written to stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
