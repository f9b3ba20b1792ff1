use std::env;
use std::process::ExitCode;

use log::{error, info};
use recipe_parser::{AppConfig, CancellationToken, ParseError, RecipeParser};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let Some(url) = env::args().nth(1) else {
        eprintln!("Usage: recipe-parser <url>");
        return ExitCode::from(2);
    };

    // A broken config file is fatal here; the library falls back to defaults
    let config = match AppConfig::load().map_err(ParseError::from) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let parser = match RecipeParser::builder().config(config).build() {
        Ok(parser) => parser,
        Err(e) => {
            error!("Failed to set up recipe parser: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let response = parser.parse_response(&url, &cancel).await;
    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
