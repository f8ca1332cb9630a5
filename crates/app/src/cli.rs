//! CLI command definitions and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;

use bankline_domain::ApiRequest;
use bankline_infrastructure::{GatewayConfig, SessionState, file_part};
use clap::{Parser, Subcommand};

use crate::client::Client;
use crate::error::CliError;

/// Exit code when the session ended and the user must sign in again.
const LOGIN_REQUIRED_EXIT: u8 = 2;

/// Bankline - client for the banking API
#[derive(Debug, Parser)]
#[command(name = "bankline", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file (defaults to ./bankline.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the stored session
    Status,
    /// GET a path and print the response body
    Get {
        /// Path relative to the API base URL
        path: String,
        /// Query parameter as key=value, repeatable
        #[arg(short, long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
    },
    /// POST a file as multipart/form-data
    Upload {
        /// Path relative to the API base URL
        path: String,
        /// File to send
        file: PathBuf,
        /// Form field name for the file
        #[arg(long, default_value = "file")]
        field: String,
        /// Extra text field as key=value, repeatable
        #[arg(long = "text", value_name = "KEY=VALUE")]
        text: Vec<String>,
    },
}

impl Cli {
    /// Runs the command against the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if wiring fails or the call fails for a reason
    /// other than an ended session.
    pub async fn execute(self, config: &GatewayConfig) -> Result<ExitCode, CliError> {
        let client = Client::connect(config)?;
        let result = run(&client, self.command).await;

        if let SessionState::LoginRequired { location } = client.signal.state() {
            eprintln!("Session ended. Sign in again at {location}");
            return Ok(ExitCode::from(LOGIN_REQUIRED_EXIT));
        }

        result.map(|()| ExitCode::SUCCESS)
    }
}

async fn run(client: &Client, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let role = client.auth.login(&email, &password).await?;
            match role {
                Some(role) => println!("Signed in as {email} ({role})"),
                None => println!("Signed in as {email}"),
            }
        }
        Command::Logout => {
            client.auth.logout().await?;
            client.signal.reset();
            println!("Signed out");
        }
        Command::Status => {
            println!("{}", client.auth.session_status().display_message());
            if let Some(role) = client.auth.current_role() {
                println!("Role: {role}");
            }
        }
        Command::Get { path, query } => {
            let mut request = ApiRequest::get(path);
            for pair in &query {
                let (key, value) = split_pair(pair)?;
                request = request.with_query(key, value);
            }
            let response = client.gateway.send(request).await?;
            println!("{}", pretty_body(&response.text()));
        }
        Command::Upload {
            path,
            file,
            field,
            text,
        } => {
            let mut parts = Vec::with_capacity(text.len() + 1);
            for pair in &text {
                let (key, value) = split_pair(pair)?;
                parts.push(bankline_domain::FormPart::text(key, value));
            }
            parts.push(file_part(field, &file).await?);

            let request = ApiRequest::post(path)
                .with_multipart(parts)
                .with_generated_idempotency_key();
            let response = client.gateway.send(request).await?;
            println!("{}", pretty_body(&response.text()));
        }
    }
    Ok(())
}

fn split_pair(pair: &str) -> Result<(&str, &str), CliError> {
    pair.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| CliError::Argument(format!("expected KEY=VALUE, got '{pair}'")))
}

/// Pretty-prints JSON bodies and passes anything else through.
fn pretty_body(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.to_string())
}
