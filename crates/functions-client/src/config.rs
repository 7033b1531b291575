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

//! Request settings loaded from a TOML file.
//!
//! Keys keep the SCREAMING_CASE spelling used by existing Functions project configs, e.g.
//!
//! ```toml
//! CONSUMER_ADDRESS = "0x..."
//! SUBSCRIPTION_ID = 1234
//! ROUTER_ADDRESS = "0x..."
//! DONID = "fun-polygon-mumbai-1"
//! SOURCEFILE = "sources/01-getDayDifferenceScript.js"
//! ARGS = ["US"]
//! GAS_LIMIT = 300000
//! RETURN_TYPE = "uint256"
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use url::Url;

use crate::{errors::CodedError, impl_coded_debug, return_type::ReturnType};

/// Default values for optional settings.
pub mod defaults {
    /// Seconds between polls for the fulfillment event.
    pub const fn listener_poll_interval_secs() -> u64 {
        2
    }

    /// Confirmations required on the request transaction.
    pub const fn confirmations() -> u64 {
        1
    }

    /// Secret name to environment variable mapping used when none is configured.
    pub fn secrets_env() -> std::collections::BTreeMap<String, String> {
        [("apiKey".to_string(), "COINMARKETCAP_API_KEY".to_string())].into_iter().collect()
    }
}

#[derive(Error)]
pub enum ConfigError {
    #[error("Failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} must be set for requests that use DON-hosted secrets")]
    MissingSecretsField(&'static str),

    #[error("Secret '{name}' requires environment variable {var} to be set")]
    MissingSecretValue { name: String, var: String },

    #[error("LISTENER_POLL_INTERVAL_SECS must be greater than zero")]
    ZeroPollInterval,
}

impl_coded_debug!(ConfigError);

impl CodedError for ConfigError {
    fn code(&self) -> &str {
        match self {
            ConfigError::Read { .. } => "[F-CFG-001]",
            ConfigError::Parse(_) => "[F-CFG-002]",
            ConfigError::MissingSecretsField(_) => "[F-CFG-003]",
            ConfigError::MissingSecretValue { .. } => "[F-CFG-004]",
            ConfigError::ZeroPollInterval => "[F-CFG-005]",
        }
    }
}

/// How a simulation error affects the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationPolicy {
    /// Log the simulation error and submit the request anyway.
    #[default]
    #[serde(alias = "warn-and-continue")]
    Warn,
    /// Abort before any on-chain cost is incurred.
    #[serde(alias = "fail-fast")]
    Fail,
}

/// Settings parsed from the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    /// Path to the consumer ABI artifact. Bindings are compiled in, so this is informational.
    #[serde(default)]
    pub contract_abi: Option<PathBuf>,
    /// Consumer contract the request is sent through.
    pub consumer_address: Address,
    /// Billing subscription funding the request.
    pub subscription_id: u64,
    /// Functions router.
    pub router_address: Address,
    /// LINK token used by the subscription.
    #[serde(default)]
    pub link_token_address: Option<Address>,
    /// DON the request targets.
    #[serde(rename = "DONID")]
    pub don_id: String,
    /// Block explorer base URL, used to print transaction links.
    #[serde(default)]
    pub explorer_url: Option<Url>,
    /// JavaScript source, relative to the config file.
    #[serde(rename = "SOURCEFILE")]
    pub source_file: PathBuf,
    /// String arguments for the source.
    #[serde(default)]
    pub args: Vec<String>,
    /// Byte arguments for the source.
    #[serde(default)]
    pub bytes_args: Vec<Bytes>,
    /// Gas limit of the consumer callback.
    pub gas_limit: u32,
    /// Expected result type; unrecognized values decode as a string.
    #[serde(default)]
    pub return_type: Option<String>,
    /// First secrets gateway.
    #[serde(default)]
    pub gateway_url1: Option<Url>,
    /// Second secrets gateway.
    #[serde(default)]
    pub gateway_url2: Option<Url>,
    /// Gateway storage slot for the secrets.
    #[serde(default)]
    pub slot_id_number: Option<u8>,
    /// Lifetime of uploaded secrets.
    #[serde(default)]
    pub expiration_time_minutes: Option<u32>,
    /// Secret name to environment variable mapping.
    #[serde(default = "defaults::secrets_env")]
    pub secrets_env: BTreeMap<String, String>,
    /// Base URL of the Functions toolkit sidecar.
    #[serde(default)]
    pub toolkit_url: Option<Url>,
    #[serde(default)]
    pub simulation_policy: SimulationPolicy,
    #[serde(default = "defaults::listener_poll_interval_secs")]
    pub listener_poll_interval_secs: u64,
    /// Upper bound on the fulfillment wait. Unset means wait indefinitely.
    #[serde(default)]
    pub listener_timeout_secs: Option<u64>,
    #[serde(default = "defaults::confirmations")]
    pub confirmations: u64,

    #[serde(skip)]
    base_dir: PathBuf,
}

/// Which consumer entry point a request is submitted through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    /// `sendRequest` on a Functions consumer; the request is sent immediately.
    Consumer,
    /// `updateRequest` on an automated consumer; the request is stored and replayed by upkeeps.
    Automation,
}

/// Everything needed to upload DON-hosted secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretsConfig {
    /// Gateways that receive the encrypted secrets.
    pub gateway_urls: Vec<Url>,
    /// Storage slot.
    pub slot_id: u8,
    /// Lifetime of the upload.
    pub expiration_minutes: u32,
    /// Secret values keyed by the name the source reads them under.
    pub values: BTreeMap<String, String>,
}

impl std::fmt::Debug for SecretsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsConfig")
            .field("gateway_urls", &self.gateway_urls)
            .field("slot_id", &self.slot_id)
            .field("expiration_minutes", &self.expiration_minutes)
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// An immutable, fully resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub router_address: Address,
    pub consumer_address: Address,
    pub subscription_id: u64,
    pub don_id: String,
    pub gas_limit: u32,
    pub source: String,
    pub args: Vec<String>,
    pub bytes_args: Vec<Bytes>,
    pub return_type: ReturnType,
    pub mode: SubmissionMode,
    /// Present when the request carries DON-hosted secrets.
    pub secrets: Option<SecretsConfig>,
}

/// Fulfillment wait parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerConfig {
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
}

impl Settings {
    /// Load the settings from disk.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&data, base_dir)
    }

    /// Parse settings, resolving relative paths against `base_dir`.
    pub fn parse(data: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut settings: Settings = toml::from_str(data)?;
        settings.base_dir = base_dir.into();
        if settings.listener_poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(settings)
    }

    /// The configured return type, falling back to a string for unknown names.
    pub fn return_type(&self) -> ReturnType {
        self.return_type.as_deref().map(ReturnType::resolve).unwrap_or_default()
    }

    /// Absolute path of the request source.
    pub fn source_path(&self) -> PathBuf {
        self.base_dir.join(&self.source_file)
    }

    /// Read the request source from disk.
    pub async fn read_source(&self) -> Result<String, ConfigError> {
        let path = self.source_path();
        fs::read_to_string(&path).await.map_err(|source| ConfigError::Read { path, source })
    }

    /// Secrets upload settings, with values looked up through `lookup` (usually the process
    /// environment).
    pub fn secrets_config(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<SecretsConfig, ConfigError> {
        let gateway_urls: Vec<Url> =
            [&self.gateway_url1, &self.gateway_url2].into_iter().flatten().cloned().collect();
        if gateway_urls.is_empty() {
            return Err(ConfigError::MissingSecretsField("GATEWAY_URL1"));
        }
        let slot_id = self.slot_id_number.ok_or(ConfigError::MissingSecretsField("SLOT_ID_NUMBER"))?;
        let expiration_minutes = self
            .expiration_time_minutes
            .ok_or(ConfigError::MissingSecretsField("EXPIRATION_TIME_MINUTES"))?;

        let values = self
            .secrets_env
            .iter()
            .map(|(name, var)| {
                lookup(var)
                    .map(|value| (name.clone(), value))
                    .ok_or_else(|| ConfigError::MissingSecretValue { name: name.clone(), var: var.clone() })
            })
            .collect::<Result<_, _>>()?;

        Ok(SecretsConfig { gateway_urls, slot_id, expiration_minutes, values })
    }

    /// Resolve the request, reading the source file.
    pub async fn request_config(
        &self,
        mode: SubmissionMode,
        secrets: Option<SecretsConfig>,
    ) -> Result<RequestConfig, ConfigError> {
        Ok(RequestConfig {
            router_address: self.router_address,
            consumer_address: self.consumer_address,
            subscription_id: self.subscription_id,
            don_id: self.don_id.clone(),
            gas_limit: self.gas_limit,
            source: self.read_source().await?,
            args: self.args.clone(),
            bytes_args: self.bytes_args.clone(),
            return_type: self.return_type(),
            mode,
            secrets,
        })
    }

    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            poll_interval: Duration::from_secs(self.listener_poll_interval_secs),
            timeout: self.listener_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Explorer link for a transaction, if an explorer is configured.
    pub fn explorer_tx_url(&self, tx_hash: &alloy::primitives::B256) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{:#x}", base.as_str().trim_end_matches('/'), tx_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
CONTRACT_ABI = "../build/artifacts/FunctionsConsumer.json"
CONSUMER_ADDRESS = "0x8dFf78B7EE3128D00E90611FBeD20A71397064D9"
SUBSCRIPTION_ID = 1234
ROUTER_ADDRESS = "0x6E2dc0F9DB014aE19888F539E59285D2Ea04244C"
LINK_TOKEN_ADDRESS = "0x326C977E6efc84E512bB9C30f76E30c160eD06FB"
DONID = "fun-polygon-mumbai-1"
EXPLORER_URL = "https://mumbai.polygonscan.com/"
SOURCEFILE = "sources/holiday.js"
ARGS = ["US"]
GAS_LIMIT = 300000
RETURN_TYPE = "uint256"
"#;

    #[test]
    fn parses_minimal_config() {
        let settings = Settings::parse(MINIMAL, "/project").unwrap();
        assert_eq!(settings.subscription_id, 1234);
        assert_eq!(settings.don_id, "fun-polygon-mumbai-1");
        assert_eq!(settings.args, vec!["US".to_string()]);
        assert_eq!(settings.gas_limit, 300_000);
        assert_eq!(settings.return_type(), ReturnType::Uint256);
        assert_eq!(settings.simulation_policy, SimulationPolicy::Warn);
        assert_eq!(settings.source_path(), PathBuf::from("/project/sources/holiday.js"));
        assert_eq!(
            settings.listener_config(),
            ListenerConfig { poll_interval: Duration::from_secs(2), timeout: None }
        );
    }

    #[test]
    fn unknown_return_type_falls_back_to_string() {
        let data = MINIMAL.replace("\"uint256\"", "\"float\"");
        let settings = Settings::parse(&data, ".").unwrap();
        assert_eq!(settings.return_type(), ReturnType::String);
    }

    #[test]
    fn rejects_missing_required_key() {
        let data = MINIMAL.replace("GAS_LIMIT = 300000\n", "");
        let err = Settings::parse(&data, ".").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(format!("{err:?}").starts_with("[F-CFG-002]"));
    }

    #[test]
    fn explorer_link_has_no_double_slash() {
        let settings = Settings::parse(MINIMAL, ".").unwrap();
        let hash = alloy::primitives::B256::repeat_byte(0xab);
        let url = settings.explorer_tx_url(&hash).unwrap();
        assert!(url.starts_with("https://mumbai.polygonscan.com/tx/0xabab"));
    }

    #[test]
    fn secrets_config_requires_gateways() {
        let settings = Settings::parse(MINIMAL, ".").unwrap();
        let err = settings.secrets_config(|_| Some("key".into())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecretsField("GATEWAY_URL1")));
    }

    #[test]
    fn secrets_config_resolves_values() {
        let data = format!(
            "{MINIMAL}\nGATEWAY_URL1 = \"https://01.functions-gateway.testnet.chain.link/\"\n\
             GATEWAY_URL2 = \"https://02.functions-gateway.testnet.chain.link/\"\n\
             SLOT_ID_NUMBER = 0\nEXPIRATION_TIME_MINUTES = 15\n"
        );
        let settings = Settings::parse(&data, ".").unwrap();

        let missing = settings.secrets_config(|_| None).unwrap_err();
        assert!(matches!(missing, ConfigError::MissingSecretValue { ref var, .. } if var == "COINMARKETCAP_API_KEY"));

        let secrets = settings
            .secrets_config(|var| (var == "COINMARKETCAP_API_KEY").then(|| "s3cret".to_string()))
            .unwrap();
        assert_eq!(secrets.gateway_urls.len(), 2);
        assert_eq!(secrets.slot_id, 0);
        assert_eq!(secrets.expiration_minutes, 15);
        assert_eq!(secrets.values.get("apiKey").map(String::as_str), Some("s3cret"));
        assert!(!format!("{secrets:?}").contains("s3cret"));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let data = format!("{MINIMAL}\nLISTENER_POLL_INTERVAL_SECS = 0\n");
        let err = Settings::parse(&data, ".").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroPollInterval));
        assert!(format!("{err:?}").starts_with("[F-CFG-005]"));
    }

    #[test]
    fn parses_policy_and_timeout() {
        let data = format!("{MINIMAL}\nSIMULATION_POLICY = \"fail\"\nLISTENER_TIMEOUT_SECS = 300\n");
        let settings = Settings::parse(&data, ".").unwrap();
        assert_eq!(settings.simulation_policy, SimulationPolicy::Fail);
        assert_eq!(settings.listener_config().timeout, Some(Duration::from_secs(300)));
    }

    #[tokio::test]
    async fn loads_source_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sources")).unwrap();
        std::fs::write(dir.path().join("sources/holiday.js"), "return Functions.encodeUint256(1)")
            .unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::File::create(&config_path).unwrap().write_all(MINIMAL.as_bytes()).unwrap();

        let settings = Settings::load(&config_path).await.unwrap();
        let request = settings.request_config(SubmissionMode::Consumer, None).await.unwrap();
        assert_eq!(request.source, "return Functions.encodeUint256(1)");
        assert_eq!(request.return_type, ReturnType::Uint256);
        assert!(request.secrets.is_none());
    }
}
