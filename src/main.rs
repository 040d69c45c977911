//! virl-packet CLI: VIRL bare-metal servers on Packet.

use clap::Parser;
use virl_packet::cli::Cli;
use virl_packet::core::config;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = std::env::var("VIRL_PACKET_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match config::load_settings(cli.config.as_deref()) {
        Ok(settings) => virl_packet::cli::dispatch(cli.command, &settings).await,
        Err(e) => Err(e),
    };

    match code {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
