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

//! Encryption and upload of DON-hosted secrets.

use std::collections::BTreeMap;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{config::SecretsConfig, errors::CodedError, request::DonHostedSecretsReference};

#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("{code} Secrets upload request failed: {0}", code = self.code())]
    Http(#[from] reqwest::Error),

    #[error("{code} Invalid secrets endpoint: {0}", code = self.code())]
    Url(#[from] url::ParseError),

    #[error("{code} Gateways rejected the secrets upload: {0}", code = self.code())]
    UploadRejected(String),
}

impl CodedError for SecretsError {
    fn code(&self) -> &str {
        match self {
            SecretsError::Http(_) => "[F-SEC-001]",
            SecretsError::Url(_) => "[F-SEC-002]",
            SecretsError::UploadRejected(_) => "[F-SEC-003]",
        }
    }
}

/// Secrets that were encrypted and stored on the DON.
///
/// The version is assigned by the gateways; the request references the secrets by slot and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedSecretsBundle {
    pub ciphertext: Bytes,
    pub slot_id: u8,
    pub version: u64,
}

impl EncryptedSecretsBundle {
    pub fn reference(&self) -> DonHostedSecretsReference {
        DonHostedSecretsReference { slot_id: self.slot_id, version: self.version }
    }
}

/// Encrypts secrets to the DON public key and stores them on the gateways.
#[async_trait]
pub trait SecretsPublisher: Send + Sync {
    async fn publish(
        &self,
        router: Address,
        don_id: &str,
        secrets: &SecretsConfig,
    ) -> Result<EncryptedSecretsBundle, SecretsError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest<'a> {
    router_address: Address,
    don_id: &'a str,
    secrets: &'a BTreeMap<String, String>,
    gateway_urls: &'a [Url],
    slot_id: u8,
    minutes_until_expiration: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    version: Option<u64>,
    #[serde(default)]
    encrypted_secrets: Option<Bytes>,
    #[serde(default)]
    node_responses: Vec<NodeResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeResponse {
    #[serde(default)]
    node_address: Option<String>,
    success: bool,
    #[serde(default)]
    error_message: Option<String>,
}

impl UploadResponse {
    fn rejection(&self) -> String {
        let failures: Vec<String> = self
            .node_responses
            .iter()
            .filter(|node| !node.success)
            .map(|node| {
                format!(
                    "{}: {}",
                    node.node_address.as_deref().unwrap_or("unknown node"),
                    node.error_message.as_deref().unwrap_or("no error message")
                )
            })
            .collect();
        if failures.is_empty() {
            "gateway reported success=false".to_string()
        } else {
            failures.join(", ")
        }
    }
}

/// [SecretsPublisher] backed by the Functions toolkit sidecar, which performs the threshold
/// encryption and the signed gateway upload.
#[derive(Clone)]
pub struct GatewaySecretsPublisher {
    client: reqwest::Client,
    endpoint: Url,
}

impl GatewaySecretsPublisher {
    pub fn new(base_url: &Url) -> Result<Self, SecretsError> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: crate::join_endpoint(base_url, "secrets/upload")?,
        })
    }
}

#[async_trait]
impl SecretsPublisher for GatewaySecretsPublisher {
    async fn publish(
        &self,
        router: Address,
        don_id: &str,
        secrets: &SecretsConfig,
    ) -> Result<EncryptedSecretsBundle, SecretsError> {
        tracing::info!(
            "Uploading {} secret(s) to {} gateway(s), slot {}",
            secrets.values.len(),
            secrets.gateway_urls.len(),
            secrets.slot_id
        );
        let body = UploadRequest {
            router_address: router,
            don_id,
            secrets: &secrets.values,
            gateway_urls: &secrets.gateway_urls,
            slot_id: secrets.slot_id,
            minutes_until_expiration: secrets.expiration_minutes,
        };
        let response: UploadResponse = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.success {
            return Err(SecretsError::UploadRejected(response.rejection()));
        }
        let version = response
            .version
            .ok_or_else(|| SecretsError::UploadRejected("gateway did not report a version".into()))?;
        tracing::debug!("Secrets stored at slot {} version {version}", secrets.slot_id);

        Ok(EncryptedSecretsBundle {
            ciphertext: response.encrypted_secrets.unwrap_or_default(),
            slot_id: secrets.slot_id,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn secrets_config() -> SecretsConfig {
        SecretsConfig {
            gateway_urls: vec![
                Url::parse("https://01.functions-gateway.testnet.chain.link/").unwrap(),
                Url::parse("https://02.functions-gateway.testnet.chain.link/").unwrap(),
            ],
            slot_id: 0,
            expiration_minutes: 15,
            values: [("apiKey".to_string(), "s3cret".to_string())].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn publish_returns_gateway_version() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/secrets/upload").json_body_partial(
                r#"{"donId": "fun-polygon-mumbai-1", "slotId": 0, "minutesUntilExpiration": 15, "secrets": {"apiKey": "s3cret"}}"#,
            );
            then.status(200).json_body(json!({
                "success": true,
                "version": 1712345678u64,
                "encryptedSecrets": "0xdeadbeef",
                "nodeResponses": [{"nodeAddress": "0x01", "success": true}]
            }));
        });

        let publisher =
            GatewaySecretsPublisher::new(&Url::parse(&server.base_url()).unwrap()).unwrap();
        let bundle = publisher
            .publish(Address::repeat_byte(1), "fun-polygon-mumbai-1", &secrets_config())
            .await
            .unwrap();
        mock.assert();

        assert_eq!(bundle.version, 1712345678);
        assert_eq!(bundle.ciphertext, Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(bundle.reference(), DonHostedSecretsReference { slot_id: 0, version: 1712345678 });
    }

    #[tokio::test]
    async fn rejected_upload_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/secrets/upload");
            then.status(200).json_body(json!({
                "success": false,
                "version": 1712345678u64,
                "nodeResponses": [
                    {"nodeAddress": "0x01", "success": true},
                    {"nodeAddress": "0x02", "success": false, "errorMessage": "expired"}
                ]
            }));
        });

        let publisher =
            GatewaySecretsPublisher::new(&Url::parse(&server.base_url()).unwrap()).unwrap();
        let err = publisher
            .publish(Address::repeat_byte(1), "fun-polygon-mumbai-1", &secrets_config())
            .await
            .unwrap_err();
        assert!(matches!(err, SecretsError::UploadRejected(ref msg) if msg == "0x02: expired"));
        assert!(err.to_string().starts_with("[F-SEC-003]"));
    }
}
