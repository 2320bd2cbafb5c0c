use clap::Parser;
use reminder_app::app::{run, AppConfig, Cli};

fn main() {
    tracing_subscriber::fmt::init();
    let config = AppConfig::from_cli(Cli::parse());
    if let Err(err) = run(config) {
        eprintln!("Failed to run reminder host: {err:#}");
        std::process::exit(1);
    }
}
