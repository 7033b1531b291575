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

//! Decoding of raw Functions response bytes into typed values.

use std::fmt;

use alloy::primitives::{Bytes, I256, U256};
use thiserror::Error;

use crate::{errors::CodedError, return_type::ReturnType};

/// Width in bytes of an encoded 256-bit integer.
const WORD_SIZE: usize = 32;

/// A response decoded according to its [ReturnType].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    /// An unsigned integer result.
    Uint(U256),
    /// A signed integer result.
    Int(I256),
    /// A text result.
    String(String),
    /// An opaque byte result.
    Bytes(Bytes),
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Bytes(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors from decoding a response.
pub enum DecodeError {
    /// Integer results must be exactly one 32-byte word.
    #[error("{code} cannot decode {return_type}: expected {expected} bytes, got {actual}", code = self.code(), expected = WORD_SIZE)]
    InvalidLength {
        /// The requested return type.
        return_type: ReturnType,
        /// Number of bytes in the response.
        actual: usize,
    },
}

impl CodedError for DecodeError {
    fn code(&self) -> &str {
        match self {
            DecodeError::InvalidLength { .. } => "[F-DEC-001]",
        }
    }
}

/// Decodes `response` as `return_type`.
///
/// Strings are decoded lossily so that a malformed result is still printable.
pub fn decode_result(response: &[u8], return_type: ReturnType) -> Result<DecodedValue, DecodeError> {
    match return_type {
        ReturnType::Uint256 => Ok(DecodedValue::Uint(word(response, return_type)?)),
        ReturnType::Int256 => Ok(DecodedValue::Int(I256::from_raw(word(response, return_type)?))),
        ReturnType::String => Ok(DecodedValue::String(String::from_utf8_lossy(response).into_owned())),
        ReturnType::Bytes => Ok(DecodedValue::Bytes(Bytes::copy_from_slice(response))),
    }
}

/// Decodes `response` unless it is empty.
///
/// Empty responses are what a failed or callback-reverted request carries, so no decode is
/// attempted and `None` is returned.
pub fn decode_response(
    response: &[u8],
    return_type: ReturnType,
) -> Result<Option<DecodedValue>, DecodeError> {
    if response.is_empty() {
        return Ok(None);
    }
    decode_result(response, return_type).map(Some)
}

fn word(response: &[u8], return_type: ReturnType) -> Result<U256, DecodeError> {
    if response.len() != WORD_SIZE {
        return Err(DecodeError::InvalidLength { return_type, actual: response.len() });
    }
    Ok(U256::from_be_slice(response))
}
