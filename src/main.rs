use anyhow::Result;
use clap::{Parser, Subcommand};
use pocketalk::client::AnswerClient;
use pocketalk::config::{API_URL_ENV, Config, ConfigOverrides};
use pocketalk::ui::conversation::FAILURE_WARNING;
use pocketalk::{app, logging};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pocketalk")]
#[command(version)]
#[command(about = "Chat with a remote answering service from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the answering service
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Config file to use instead of ~/.pocketalk/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat screen (default)
    Chat,
    /// Ask a single question and print the answer
    Ask { text: String },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        config_path: cli.config,
        api_url: cli.api_url,
        log_level: cli.log_level,
    };
    let config = Config::load(&overrides)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let _guard = logging::init_file(&Config::home_dir()?.join("logs"), &config.log_level)?;
            app::run(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ask { text } => {
            if text.trim().is_empty() {
                return Ok(ExitCode::SUCCESS);
            }

            logging::init_stderr(&config.log_level)?;
            let client = AnswerClient::from_config(&config)?;

            match client.ask(&text).await {
                Ok(answer) => {
                    println!("{answer}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "question failed");
                    eprintln!("{FAILURE_WARNING}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
