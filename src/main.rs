use appenv::cli::{run, Cli, OutputFormat, FORMATTER};
use appenv::infrastructure::init_logging;
use appenv::Config;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.command.json());

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    config.apply_env_overrides();
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }

    if let Err(e) = init_logging(&config.log_level) {
        eprintln!("Warning: {e}");
    }

    match run(cli, &config).await {
        Ok(output) => print!("{output}"),
        Err(e) => {
            let removed = e
                .error
                .as_store_error()
                .map(|store_error| store_error.removed_keys().to_vec())
                .unwrap_or_default();
            let message = FORMATTER.format_error(&e.user_message(), &removed, format);
            match format {
                OutputFormat::Json => print!("{message}"),
                OutputFormat::Text => eprint!("{message}"),
            }
            process::exit(1);
        }
    }
}
