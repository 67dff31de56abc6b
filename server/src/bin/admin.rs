//! Operator tooling: user provisioning, store maintenance and key generation.

use clap::{Parser, Subcommand};
use common::{Config, Result, WipiError};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use wipi_server::logging::setup_logger;
use wipi_server::security::{generate_key_files, Authenticator, PasswordHasher, TokenService};
use wipi_server::store::Stores;

#[derive(Parser)]
#[command(name = "wipi-admin", about = "Administer a WiPi control plane")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an operator account
    AddUser {
        username: String,
        #[arg(long, env = "WIPI_PASSWORD")]
        password: String,
        #[arg(long)]
        admin: bool,
    },
    /// Delete every job and credential
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Print all recorded jobs
    Jobs,
    /// Print one job by id
    Job { id: u64 },
    /// Print the job with the latest start time
    LastJob,
    /// Write a new token signing keypair into a directory
    Keygen {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger();

    let args = Args::parse();
    let config = Config::load()?;

    match args.command {
        Command::Keygen { dir } => {
            let (signing, verifying) = generate_key_files(&dir)?;
            println!("SIGNING_KEY_PATH={}", signing.display());
            println!("VERIFYING_KEY_PATH={}", verifying.display());
        }
        Command::AddUser { username, password, admin } => {
            let stores = Stores::open(&config)?;
            let authenticator = Authenticator::new(
                stores.credentials,
                Arc::new(TokenService::ephemeral(config.token_lifetime_secs)),
                PasswordHasher::new(config.password_iterations)?,
            );
            authenticator.provision(&username, &password, admin).await?;
            println!("Created user {}{}", username, if admin { " (admin)" } else { "" });
        }
        Command::Reset { yes } => {
            if !yes {
                return Err(WipiError::BadRequest(
                    "reset deletes all jobs and users, pass --yes to confirm".to_string(),
                ));
            }
            let stores = Stores::open(&config)?;
            stores.jobs.reset().await?;
            stores.credentials.reset().await?;
            info!("Store reset");
        }
        Command::Jobs => {
            let stores = Stores::open(&config)?;
            for job in stores.jobs.list_all().await? {
                println!("{}", serde_json::to_string(&job)?);
            }
        }
        Command::Job { id } => {
            let stores = Stores::open(&config)?;
            match stores.jobs.lookup(id).await? {
                Some(job) => println!("{}", serde_json::to_string_pretty(&job)?),
                None => return Err(WipiError::BadRequest(format!("no job with id {}", id))),
            }
        }
        Command::LastJob => {
            let stores = Stores::open(&config)?;
            match stores.jobs.most_recent().await? {
                Some(job) => println!("{}", serde_json::to_string_pretty(&job)?),
                None => println!("No jobs recorded"),
            }
        }
    }

    Ok(())
}
