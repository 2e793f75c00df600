use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod configuration;
mod prompt;
mod session;

use configuration::CliConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session
    Chat {
        /// History key of a recorded conversation to continue
        #[arg(long)]
        resume: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        question: String,

        /// History key of a recorded conversation to continue
        #[arg(long)]
        resume: Option<String>,
    },

    /// Compare a resume against a job description
    Analyze {
        /// Path to the resume as plain text
        #[arg(long)]
        resume: PathBuf,

        /// Path to the job description as plain text
        #[arg(long)]
        job: PathBuf,
    },

    /// Print the version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Version) => commands::version::execute().await,
        Some(Command::Ask { question, resume }) => {
            let config = CliConfig::load()?;
            commands::ask::execute(&config, &question, resume).await
        }
        Some(Command::Analyze { resume, job }) => {
            let config = CliConfig::load()?;
            commands::analyze::execute(&config, &resume, &job).await
        }
        Some(Command::Chat { resume }) => {
            let config = CliConfig::load()?;
            commands::chat::execute(&config, resume).await
        }
        None => {
            let config = CliConfig::load()?;
            commands::chat::execute(&config, None).await
        }
    }
}
