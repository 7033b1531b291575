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


//! Common configuration options for commands in the Functions CLI.

use std::{num::ParseIntError, path::PathBuf, time::Duration};

use alloy::{
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use clap::Args;
use functions_client::Settings;
use tracing::level_filters::LevelFilter;
use url::Url;

/// Common configuration options for all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalConfig {
    /// Transaction confirmation timeout in seconds.
    #[clap(long, env = "TX_TIMEOUT", global = true, value_parser = |arg: &str| -> Result<Duration, ParseIntError> {Ok(Duration::from_secs(arg.parse()?))})]
    pub tx_timeout: Option<Duration>,

    /// Log level (error, warn, info, debug, trace)
    #[clap(long, env = "LOG_LEVEL", global = true, default_value = "warn")]
    pub log_level: LevelFilter,
}

/// Request file and credentials shared by the request commands
#[derive(Args, Debug, Clone)]
pub struct FunctionsConfig {
    /// Path to the request configuration file
    #[clap(short, long, env = "FUNCTIONS_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// RPC URL of the network the consumer is deployed on
    #[clap(long, env = "POLYGON_MUMBAI_RPC_URL")]
    pub rpc_url: Option<Url>,

    /// Private key used to sign request transactions
    #[clap(long, env = "DEVELOPER_ACCOUNT_PK", hide_env_values = true)]
    pub private_key: Option<PrivateKeySigner>,

    /// Base URL of the Functions toolkit service used for simulation and secrets uploads.
    /// Overrides TOOLKIT_URL in the configuration file.
    #[clap(long, env = "FUNCTIONS_TOOLKIT_URL")]
    pub toolkit_url: Option<Url>,
}

impl FunctionsConfig {
    /// Access [Self::rpc_url] or return an error that can be shown to the user.
    pub fn require_rpc_url(&self) -> Result<Url> {
        self.rpc_url
            .clone()
            .context("RPC URL not provided.\n\nSet the POLYGON_MUMBAI_RPC_URL env var or pass --rpc-url")
    }

    /// Access [Self::private_key] or return an error that can be shown to the user.
    pub fn require_private_key(&self) -> Result<PrivateKeySigner> {
        self.private_key.clone().context(
            "Private key not provided.\n\nSet the DEVELOPER_ACCOUNT_PK env var or pass --private-key",
        )
    }

    /// Load the request settings file.
    pub async fn load_settings(&self) -> Result<Settings> {
        Settings::load(&self.config)
            .await
            .with_context(|| format!("Failed to load request config {}", self.config.display()))
    }

    /// Toolkit base URL from the command line, falling back to the settings file.
    pub fn require_toolkit_url(&self, settings: &Settings) -> Result<Url> {
        self.toolkit_url.clone().or_else(|| settings.toolkit_url.clone()).context(
            "Functions toolkit URL not provided.\n\nSet TOOLKIT_URL in the config file, the FUNCTIONS_TOOLKIT_URL env var, or pass --toolkit-url",
        )
    }

    /// Provider that signs with [Self::private_key].
    ///
    /// Credentials are checked before anything touches the network.
    pub fn signing_provider(&self) -> Result<impl Provider + Clone + 'static> {
        let signer = self.require_private_key()?;
        let rpc_url = self.require_rpc_url()?;
        tracing::debug!("Signing requests as {}", signer.address());
        Ok(ProviderBuilder::new().wallet(signer).connect_http(rpc_url))
    }

    /// Read-only provider.
    pub fn provider(&self) -> Result<impl Provider + Clone + 'static> {
        let rpc_url = self.require_rpc_url()?;
        Ok(ProviderBuilder::new().connect_http(rpc_url))
    }
}
