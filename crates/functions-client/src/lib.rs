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

//! Client for Chainlink Functions requests: local simulation, cost estimation, DON-hosted
//! secrets, on-chain submission and fulfillment tracking.

/// Automated consumer state.
pub mod automation;
/// Request settings.
pub mod config;
/// Contract bindings.
pub mod contracts;
/// Response decoding.
pub mod decode;
/// Error codes.
pub mod errors;
/// Cost estimation.
pub mod estimator;
/// Fulfillment results.
pub mod fulfillment;
/// Fulfillment tracking.
pub mod listener;
/// Request orchestration.
pub mod pipeline;
/// Request encoding.
pub mod request;
/// Response type names.
pub mod return_type;
/// DON-hosted secrets.
pub mod secrets;
/// Local simulation.
pub mod simulator;
/// Transaction submission.
pub mod submitter;

pub use config::{RequestConfig, Settings, SimulationPolicy, SubmissionMode};
pub use decode::DecodedValue;
pub use fulfillment::{FulfillmentCode, FulfillmentRecord};
pub use listener::FulfillmentHandle;
pub use pipeline::{Pipeline, PipelineError, SubmittedRequest};
pub use return_type::ReturnType;

/// Resolve `path` against a toolkit base URL, treating the base as a directory.
pub(crate) fn join_endpoint(base: &url::Url, path: &str) -> Result<url::Url, url::ParseError> {
    if base.path().ends_with('/') {
        base.join(path)
    } else {
        url::Url::parse(&format!("{}/", base.as_str()))?.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::join_endpoint;
    use url::Url;

    #[test]
    fn joins_below_base_path() {
        let base = Url::parse("http://localhost:8000/toolkit").unwrap();
        assert_eq!(
            join_endpoint(&base, "simulate").unwrap().as_str(),
            "http://localhost:8000/toolkit/simulate"
        );
        let base = Url::parse("http://localhost:8000").unwrap();
        assert_eq!(
            join_endpoint(&base, "secrets/upload").unwrap().as_str(),
            "http://localhost:8000/secrets/upload"
        );
    }
}
