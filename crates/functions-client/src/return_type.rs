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

//! Return types understood by the result decoder.

use std::{fmt, str::FromStr};

/// The type a Functions source encodes its result as.
///
/// The `uint` and `int` spellings are accepted as aliases of `uint256` and `int256`, which is
/// how the sandbox encodes every integer result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReturnType {
    /// Unsigned 256-bit integer, big-endian.
    Uint256,
    /// Signed 256-bit integer, two's complement, big-endian.
    Int256,
    /// UTF-8 text.
    #[default]
    String,
    /// Raw bytes, left undecoded.
    Bytes,
}

impl ReturnType {
    /// Resolves a configured return type name, falling back to [ReturnType::String] for any
    /// value that is not recognized.
    pub fn resolve(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Canonical name of the return type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uint256 => "uint256",
            Self::Int256 => "int256",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when strictly parsing an unknown return type name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported return type '{0}', expected one of uint, uint256, int, int256, string, bytes")]
pub struct ParseReturnTypeError(String);

impl FromStr for ReturnType {
    type Err = ParseReturnTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uint" | "uint256" => Ok(Self::Uint256),
            "int" | "int256" => Ok(Self::Int256),
            "string" => Ok(Self::String),
            "bytes" => Ok(Self::Bytes),
            other => Err(ParseReturnTypeError(other.to_string())),
        }
    }
}
