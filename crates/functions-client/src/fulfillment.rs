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

//! Terminal state of a Functions request as reported by the router.

use std::fmt;

use alloy::primitives::{Bytes, B256, U256};

use crate::{
    decode::{decode_response, DecodeError, DecodedValue},
    return_type::ReturnType,
};

/// Result code emitted by the router when it processes a DON response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FulfillmentCode {
    /// The consumer callback ran successfully.
    Fulfilled,
    /// The response was delivered but the consumer callback reverted.
    UserCallbackError,
    /// The router did not recognize the request id.
    InvalidRequestId,
    /// The fulfillment cost exceeded what the request committed to.
    CostExceedsCommitment,
    /// The transmitter did not supply enough gas for the callback.
    InsufficientGasProvided,
    /// Subscription accounting rejected the fulfillment.
    SubscriptionBalanceInvariantViolation,
    /// The request commitment did not match.
    InvalidCommitment,
    /// A code not known to this client.
    Unknown(u8),
}

impl From<u8> for FulfillmentCode {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Fulfilled,
            1 => Self::UserCallbackError,
            2 => Self::InvalidRequestId,
            3 => Self::CostExceedsCommitment,
            4 => Self::InsufficientGasProvided,
            5 => Self::SubscriptionBalanceInvariantViolation,
            6 => Self::InvalidCommitment,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for FulfillmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fulfilled => f.write_str("FULFILLED"),
            Self::UserCallbackError => f.write_str("USER_CALLBACK_ERROR"),
            Self::InvalidRequestId => f.write_str("INVALID_REQUEST_ID"),
            Self::CostExceedsCommitment => f.write_str("COST_EXCEEDS_COMMITMENT"),
            Self::InsufficientGasProvided => f.write_str("INSUFFICIENT_GAS_PROVIDED"),
            Self::SubscriptionBalanceInvariantViolation => {
                f.write_str("SUBSCRIPTION_BALANCE_INVARIANT_VIOLATION")
            }
            Self::InvalidCommitment => f.write_str("INVALID_COMMITMENT"),
            Self::Unknown(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}

/// The observed fulfillment of a submitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentRecord {
    /// Transaction that created the request.
    pub tx_hash: B256,
    /// Router-assigned request id.
    pub request_id: B256,
    /// How the router processed the response.
    pub code: FulfillmentCode,
    /// Total cost charged to the subscription, in Juels.
    pub total_cost_juels: U256,
    /// Error reported by the DON, if any.
    pub error: Option<String>,
    /// Raw response bytes, if any.
    pub response: Option<Bytes>,
}

impl FulfillmentRecord {
    /// Returns true if the consumer callback completed.
    pub fn is_fulfilled(&self) -> bool {
        self.code == FulfillmentCode::Fulfilled
    }

    /// Decodes the response as `return_type`.
    ///
    /// Returns `None` when the DON reported an error or the response is empty.
    pub fn decoded_response(
        &self,
        return_type: ReturnType,
    ) -> Result<Option<DecodedValue>, DecodeError> {
        if self.error.is_some() {
            return Ok(None);
        }
        match &self.response {
            Some(response) => decode_response(response, return_type),
            None => Ok(None),
        }
    }
}

/// Converts an error payload to text; empty payloads mean no error.
pub(crate) fn error_string(raw: &[u8]) -> Option<String> {
    (!raw.is_empty()).then(|| String::from_utf8_lossy(raw).into_owned())
}

/// Wraps a response payload; empty payloads mean no response.
pub(crate) fn response_bytes(raw: &Bytes) -> Option<Bytes> {
    (!raw.is_empty()).then(|| raw.clone())
}
