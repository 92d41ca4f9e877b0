use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "bondcalc=info,warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = bondcalc::api::Cli::parse();
    if let Err(e) = bondcalc::api::run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
