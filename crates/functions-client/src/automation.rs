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

//! Reading the last result stored by an automated consumer.

use alloy::{
    primitives::{Address, Bytes, B256},
    providers::Provider,
};

use crate::{
    contracts::IAutomatedFunctionsConsumer,
    decode::{decode_response, DecodeError, DecodedValue},
    fulfillment::{error_string, response_bytes},
    return_type::ReturnType,
};

/// State of the most recent request an automated consumer received a response for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestResponse {
    pub request_id: B256,
    pub response: Option<Bytes>,
    pub error: Option<String>,
}

impl LatestResponse {
    /// Decodes the stored response. An error or an empty response yields `None`.
    pub fn decoded(&self, return_type: ReturnType) -> Result<Option<DecodedValue>, DecodeError> {
        if self.error.is_some() {
            return Ok(None);
        }
        match &self.response {
            Some(response) => decode_response(response, return_type),
            None => Ok(None),
        }
    }
}

/// Read `s_lastRequestId`, `s_lastResponse` and `s_lastError` from `consumer`.
pub async fn read_latest<P: Provider>(
    provider: &P,
    consumer: Address,
) -> Result<LatestResponse, alloy::contract::Error> {
    let consumer = IAutomatedFunctionsConsumer::new(consumer, provider);
    let request_id = consumer.s_lastRequestId().call().await?;
    let response = consumer.s_lastResponse().call().await?;
    let error = consumer.s_lastError().call().await?;
    tracing::debug!("Latest request id {request_id:#x}");

    Ok(LatestResponse {
        request_id,
        response: response_bytes(&response),
        error: error_string(&error),
    })
}
