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

//! Encoding of Functions request descriptors.
//!
//! Automated consumers store a pre-encoded request and replay it on every upkeep, so the
//! request has to be serialized client-side in the same canonical CBOR layout the DON decodes.

use alloy::primitives::{Bytes, B256};
use ciborium::Value;
use thiserror::Error;

use crate::errors::CodedError;

/// Where a piece of request data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Location {
    /// Embedded in the request itself.
    Inline = 0,
    /// Fetched by the DON from user-hosted URLs.
    Remote = 1,
    /// Stored on the DON gateways.
    DonHosted = 2,
}

/// Language of the request source. Only JavaScript is executed by the DON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CodeLanguage {
    /// JavaScript source.
    JavaScript = 0,
}

#[derive(Error, Debug)]
/// Errors from encoding a request.
pub enum EncodeError {
    /// The DON id does not fit into a bytes32 string.
    #[error("{code} DON id '{0}' is longer than 31 bytes", code = self.code())]
    DonIdTooLong(String),

    /// CBOR serialization failed.
    #[error("{code} failed to serialize CBOR: {0}", code = self.code())]
    Cbor(String),
}

impl CodedError for EncodeError {
    fn code(&self) -> &str {
        match self {
            EncodeError::DonIdTooLong(_) => "[F-ENC-001]",
            EncodeError::Cbor(_) => "[F-ENC-002]",
        }
    }
}

/// Reference to secrets uploaded to the DON gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonHostedSecretsReference {
    /// Gateway storage slot.
    pub slot_id: u8,
    /// Version assigned by the gateways on upload.
    pub version: u64,
}

impl DonHostedSecretsReference {
    /// Encodes the reference as the canonical CBOR map `{slotId, version}`.
    pub fn encode(&self) -> Result<Bytes, EncodeError> {
        encode_canonical(vec![
            ("slotId", Value::from(self.slot_id)),
            ("version", Value::from(self.version)),
        ])
    }
}

/// An inline JavaScript request descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionsRequest {
    /// JavaScript source executed by the DON.
    pub source: String,
    /// String arguments exposed to the source as `args`.
    pub args: Vec<String>,
    /// Byte arguments exposed to the source as `bytesArgs`.
    pub bytes_args: Vec<Bytes>,
    /// Optional DON-hosted secrets.
    pub secrets: Option<DonHostedSecretsReference>,
}

impl FunctionsRequest {
    /// Creates a request for `source` with the given string arguments.
    pub fn new(source: impl Into<String>, args: Vec<String>) -> Self {
        Self { source: source.into(), args, ..Default::default() }
    }

    /// Attaches byte arguments.
    pub fn with_bytes_args(self, bytes_args: Vec<Bytes>) -> Self {
        Self { bytes_args, ..self }
    }

    /// Attaches a DON-hosted secrets reference.
    pub fn with_secrets(self, secrets: DonHostedSecretsReference) -> Self {
        Self { secrets: Some(secrets), ..self }
    }

    /// Encodes the request as canonical CBOR.
    pub fn encode_cbor(&self) -> Result<Bytes, EncodeError> {
        let mut entries = vec![
            ("codeLocation", Value::from(Location::Inline as u8)),
            ("codeLanguage", Value::from(CodeLanguage::JavaScript as u8)),
            ("source", Value::Text(self.source.clone())),
        ];
        if let Some(secrets) = &self.secrets {
            entries.push(("secretsLocation", Value::from(Location::DonHosted as u8)));
            entries.push(("secrets", Value::Bytes(secrets.encode()?.to_vec())));
        }
        entries.push((
            "args",
            Value::Array(self.args.iter().cloned().map(Value::Text).collect()),
        ));
        entries.push((
            "bytesArgs",
            Value::Array(self.bytes_args.iter().map(|arg| Value::Bytes(arg.to_vec())).collect()),
        ));
        encode_canonical(entries)
    }
}

/// Canonical CBOR orders map keys by encoded length, then bytewise.
fn encode_canonical(mut entries: Vec<(&'static str, Value)>) -> Result<Bytes, EncodeError> {
    entries.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    let map =
        Value::Map(entries.into_iter().map(|(key, value)| (Value::Text(key.into()), value)).collect());

    let mut buffer = Vec::new();
    ciborium::into_writer(&map, &mut buffer).map_err(|e| EncodeError::Cbor(e.to_string()))?;
    Ok(buffer.into())
}

/// Encodes a DON id as a bytes32 string: UTF-8, right-padded with zeros and null-terminated.
pub fn don_id_to_bytes32(don_id: &str) -> Result<B256, EncodeError> {
    let raw = don_id.as_bytes();
    if raw.len() > 31 {
        return Err(EncodeError::DonIdTooLong(don_id.to_string()));
    }
    let mut out = [0u8; 32];
    out[..raw.len()].copy_from_slice(raw);
    Ok(B256::from(out))
}
