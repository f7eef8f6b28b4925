use clap::Parser;
use habit_app::{
    app::{run, AppConfig},
    cli::Cli,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().unwrap_or_default();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Err(err) = run(&config, cli.command) {
        eprintln!("habitforge: {err:#}");
        std::process::exit(1);
    }
}
