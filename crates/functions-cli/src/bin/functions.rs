// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! The Functions CLI submits Chainlink Functions requests and reports their fulfillment.

const CLI_LONG_ABOUT: &str = r#"
The Functions CLI simulates a request source locally, estimates its cost, optionally uploads
DON-hosted secrets, submits the request through a consumer contract and waits for the DON to
fulfill it.
"#;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::aot::Shell;
use functions_cli::{
    commands::{ReadLatest, Request, RequestWithSecrets, UpdateAutomation},
    config::GlobalConfig,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Subcommand, Clone, Debug)]
enum Command {
    /// Send a request and wait for its fulfillment
    Request(Box<Request>),

    /// Upload DON-hosted secrets and send a request that uses them
    #[command(name = "request-with-secrets")]
    RequestWithSecrets(Box<RequestWithSecrets>),

    /// Store an encoded request on an automated consumer
    #[command(name = "update-automation")]
    UpdateAutomation(Box<UpdateAutomation>),

    /// Read the latest response stored by an automated consumer
    #[command(name = "read-latest")]
    ReadLatest(Box<ReadLatest>),

    #[command(hide = true)]
    Completions { shell: Shell },
}

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "CLI for Chainlink Functions requests",
    long_about = CLI_LONG_ABOUT,
    arg_required_else_help = true
)]
struct MainArgs {
    /// Subcommand to run
    #[command(subcommand)]
    command: Command,

    #[command(flatten, next_help_heading = "Global Options")]
    config: GlobalConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    match dotenvy::dotenv() {
        Ok(path) => eprintln!("Loaded environment variables from {:?}", path),
        Err(e) if e.not_found() => (),
        Err(e) => {
            eprintln!("Warning: failed to load .env file: {}", e);
        }
    }

    let args = match MainArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayVersion
                    | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                err.print()?;
                return Ok(());
            }
            // Invalid arguments, including malformed credentials from the environment
            err.print()?;
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(args.config.log_level.into())
                .from_env_lossy(),
        )
        .init();

    run(&args).await
}

async fn run(args: &MainArgs) -> Result<()> {
    match &args.command {
        Command::Request(cmd) => cmd.run(&args.config).await,
        Command::RequestWithSecrets(cmd) => cmd.run(&args.config).await,
        Command::UpdateAutomation(cmd) => cmd.run(&args.config).await,
        Command::ReadLatest(cmd) => cmd.run(&args.config).await,
        Command::Completions { shell } => generate_shell_completions(shell),
    }
}

fn generate_shell_completions(shell: &Shell) -> Result<()> {
    clap_complete::generate(*shell, &mut MainArgs::command(), "functions", &mut std::io::stdout());
    Ok(())
}
