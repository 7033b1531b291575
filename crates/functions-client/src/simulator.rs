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

//! Local execution of request sources before anything is sent on-chain.

use std::collections::BTreeMap;

use alloy::primitives::Bytes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{
    config::RequestConfig,
    decode::{decode_response, DecodeError, DecodedValue},
    errors::CodedError,
    return_type::ReturnType,
};

#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("{code} Simulator request failed: {0}", code = self.code())]
    Http(#[from] reqwest::Error),

    #[error("{code} Invalid simulator URL: {0}", code = self.code())]
    Url(#[from] url::ParseError),

    #[error("{code} Simulator returned a malformed response: {0}", code = self.code())]
    MalformedResponse(String),
}

impl CodedError for SimulatorError {
    fn code(&self) -> &str {
        match self {
            SimulatorError::Http(_) => "[F-SIM-001]",
            SimulatorError::Url(_) => "[F-SIM-002]",
            SimulatorError::MalformedResponse(_) => "[F-SIM-003]",
        }
    }
}

/// Input to a simulation run.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    pub source: String,
    pub args: Vec<String>,
    pub bytes_args: Vec<Bytes>,
    pub secrets: BTreeMap<String, String>,
}

impl SimulationInput {
    /// Build the simulation input for a request. Secret values are only included when the
    /// request carries secrets.
    pub fn from_request(request: &RequestConfig) -> Self {
        Self {
            source: request.source.clone(),
            args: request.args.clone(),
            bytes_args: request.bytes_args.clone(),
            secrets: request.secrets.as_ref().map(|s| s.values.clone()).unwrap_or_default(),
        }
    }
}

/// Outcome of a simulation. Either the source returned bytes or it raised an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationResult {
    Success {
        response: Bytes,
        /// Console output of the source, if captured.
        output: Option<String>,
    },
    Error {
        message: String,
        output: Option<String>,
    },
}

impl SimulationResult {
    pub fn is_error(&self) -> bool {
        matches!(self, SimulationResult::Error { .. })
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            SimulationResult::Success { output, .. } | SimulationResult::Error { output, .. } => {
                output.as_deref()
            }
        }
    }

    /// Decodes a successful response. Errors and empty responses yield `None`.
    pub fn decoded(&self, return_type: ReturnType) -> Result<Option<DecodedValue>, DecodeError> {
        match self {
            SimulationResult::Success { response, .. } => decode_response(response, return_type),
            SimulationResult::Error { .. } => Ok(None),
        }
    }
}

/// Runs request sources in a sandbox.
#[async_trait]
pub trait Simulator: Send + Sync {
    async fn simulate(&self, input: &SimulationInput) -> Result<SimulationResult, SimulatorError>;
}

/// Wire format of the toolkit `/simulate` endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    #[serde(default)]
    response_bytes_hexstring: Option<String>,
    #[serde(default)]
    error_string: Option<String>,
    #[serde(default)]
    captured_terminal_output: Option<String>,
}

impl TryFrom<SimulateResponse> for SimulationResult {
    type Error = SimulatorError;

    fn try_from(value: SimulateResponse) -> Result<Self, SimulatorError> {
        let output = value.captured_terminal_output.filter(|s| !s.is_empty());
        if let Some(message) = value.error_string.filter(|s| !s.is_empty()) {
            return Ok(SimulationResult::Error { message, output });
        }
        let response = match value.response_bytes_hexstring.as_deref() {
            Some(hex_str) => hex::decode(hex_str.trim_start_matches("0x"))
                .map(Bytes::from)
                .map_err(|e| SimulatorError::MalformedResponse(e.to_string()))?,
            None => Bytes::new(),
        };
        Ok(SimulationResult::Success { response, output })
    }
}

/// [Simulator] backed by the Functions toolkit sidecar.
#[derive(Clone)]
pub struct HttpSimulator {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSimulator {
    pub fn new(base_url: &Url) -> Result<Self, SimulatorError> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: crate::join_endpoint(base_url, "simulate")?,
        })
    }
}

#[async_trait]
impl Simulator for HttpSimulator {
    async fn simulate(&self, input: &SimulationInput) -> Result<SimulationResult, SimulatorError> {
        tracing::debug!("Simulating request source at {}", self.endpoint);
        let response: SimulateResponse = self
            .client
            .post(self.endpoint.clone())
            .json(input)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use httpmock::prelude::*;
    use serde_json::json;

    fn input() -> SimulationInput {
        SimulationInput {
            source: "return Functions.encodeUint256(1)".into(),
            args: vec!["US".into()],
            bytes_args: vec![],
            secrets: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn simulate_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/simulate")
                .json_body(json!({"source": "return Functions.encodeUint256(1)", "args": ["US"], "bytesArgs": [], "secrets": {}}));
            then.status(200).json_body(json!({
                "responseBytesHexstring": format!("0x{}", "0".repeat(63) + "1"),
                "capturedTerminalOutput": "fetched holidays\n"
            }));
        });

        let simulator = HttpSimulator::new(&Url::parse(&server.base_url()).unwrap()).unwrap();
        let result = simulator.simulate(&input()).await.unwrap();
        mock.assert();

        assert!(!result.is_error());
        assert_eq!(result.output(), Some("fetched holidays\n"));
        assert_eq!(
            result.decoded(ReturnType::Uint256).unwrap(),
            Some(DecodedValue::Uint(U256::from(1)))
        );
    }

    #[tokio::test]
    async fn simulate_error_string() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/simulate");
            then.status(200).json_body(json!({
                "responseBytesHexstring": "0x",
                "errorString": "Error: HTTP request failed"
            }));
        });

        let simulator = HttpSimulator::new(&Url::parse(&server.base_url()).unwrap()).unwrap();
        let result = simulator.simulate(&input()).await.unwrap();
        assert_eq!(
            result,
            SimulationResult::Error { message: "Error: HTTP request failed".into(), output: None }
        );
        assert_eq!(result.decoded(ReturnType::Uint256).unwrap(), None);
    }

    #[tokio::test]
    async fn empty_response_is_not_decoded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/simulate");
            then.status(200).json_body(json!({ "responseBytesHexstring": "0x" }));
        });

        let simulator = HttpSimulator::new(&Url::parse(&server.base_url()).unwrap()).unwrap();
        let result = simulator.simulate(&input()).await.unwrap();
        assert_eq!(result.decoded(ReturnType::Uint256).unwrap(), None);
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/simulate");
            then.status(500);
        });

        let simulator = HttpSimulator::new(&Url::parse(&server.base_url()).unwrap()).unwrap();
        let err = simulator.simulate(&input()).await.unwrap_err();
        assert!(matches!(err, SimulatorError::Http(_)));
        assert!(err.to_string().starts_with("[F-SIM-001]"));
    }
}
