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

//! Request lifecycle: simulate, estimate, publish secrets, submit, then wait for fulfillment.

use std::sync::Arc;

use alloy::primitives::B256;
use thiserror::Error;

use crate::{
    config::{ListenerConfig, RequestConfig, SimulationPolicy, SubmissionMode},
    errors::CodedError,
    estimator::{CostEstimate, CostEstimator, EstimateError},
    fulfillment::FulfillmentRecord,
    listener::{FulfillmentHandle, FulfillmentListener, ListenerError},
    request::{EncodeError, FunctionsRequest},
    secrets::{EncryptedSecretsBundle, SecretsError, SecretsPublisher},
    simulator::{SimulationInput, SimulationResult, Simulator},
    submitter::{RequestSubmitter, Submission, SubmissionReceipt, SubmitError},
};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{code} Simulation failed: {0}", code = self.code())]
    SimulationFailed(String),

    #[error("{code} Request carries secrets but no secrets publisher is configured", code = self.code())]
    NoSecretsPublisher,

    #[error("{code} Transaction {0:#x} has no request id to listen for", code = self.code())]
    NoRequestId(B256),

    #[error("{code} {0}", code = self.code())]
    Encode(#[from] EncodeError),

    #[error("{code} {0}", code = self.code())]
    Estimate(#[from] EstimateError),

    #[error("{code} {0}", code = self.code())]
    Secrets(#[from] SecretsError),

    #[error("{code} {0}", code = self.code())]
    Submit(#[from] SubmitError),

    #[error("{code} {0}", code = self.code())]
    Listener(#[from] ListenerError),
}

impl CodedError for PipelineError {
    fn code(&self) -> &str {
        match self {
            PipelineError::SimulationFailed(_) => "[F-PIP-001]",
            PipelineError::NoSecretsPublisher => "[F-PIP-002]",
            PipelineError::NoRequestId(_) => "[F-PIP-003]",
            PipelineError::Encode(_) => "[F-PIP-004]",
            PipelineError::Estimate(_) => "[F-PIP-005]",
            PipelineError::Secrets(_) => "[F-PIP-006]",
            PipelineError::Submit(_) => "[F-PIP-007]",
            PipelineError::Listener(_) => "[F-PIP-008]",
        }
    }
}

/// Everything known about a request once its transaction is mined.
#[derive(Debug, Clone)]
pub struct SubmittedRequest {
    /// Local simulation result. `None` if the simulator could not be reached.
    pub simulation: Option<SimulationResult>,
    pub estimate: CostEstimate,
    pub secrets: Option<EncryptedSecretsBundle>,
    pub receipt: SubmissionReceipt,
}

impl SubmittedRequest {
    pub fn tx_hash(&self) -> B256 {
        self.receipt.tx_hash
    }
}

/// Drives a single request through its lifecycle.
pub struct Pipeline {
    simulator: Arc<dyn Simulator>,
    estimator: Arc<dyn CostEstimator>,
    secrets_publisher: Option<Arc<dyn SecretsPublisher>>,
    submitter: Arc<dyn RequestSubmitter>,
    listener: Arc<dyn FulfillmentListener>,
    simulation_policy: SimulationPolicy,
    listener_config: ListenerConfig,
}

impl Pipeline {
    pub fn new(
        simulator: Arc<dyn Simulator>,
        estimator: Arc<dyn CostEstimator>,
        submitter: Arc<dyn RequestSubmitter>,
        listener: Arc<dyn FulfillmentListener>,
        listener_config: ListenerConfig,
    ) -> Self {
        Self {
            simulator,
            estimator,
            secrets_publisher: None,
            submitter,
            listener,
            simulation_policy: SimulationPolicy::default(),
            listener_config,
        }
    }

    pub fn with_secrets_publisher(self, publisher: Arc<dyn SecretsPublisher>) -> Self {
        Self { secrets_publisher: Some(publisher), ..self }
    }

    pub fn with_simulation_policy(self, simulation_policy: SimulationPolicy) -> Self {
        Self { simulation_policy, ..self }
    }

    /// Run the request source locally and apply the simulation policy to the outcome.
    pub async fn simulate(
        &self,
        request: &RequestConfig,
    ) -> Result<Option<SimulationResult>, PipelineError> {
        let result = match self.simulator.simulate(&SimulationInput::from_request(request)).await {
            Ok(result) => result,
            Err(err) => return self.on_simulation_failure(err.to_string(), None),
        };
        if let Some(output) = result.output() {
            tracing::debug!("Simulation output:\n{output}");
        }
        if let SimulationResult::Error { message, .. } = &result {
            let message = message.clone();
            return self.on_simulation_failure(message, Some(result));
        }

        match result.decoded(request.return_type) {
            Ok(Some(value)) => tracing::info!("Simulated response: {value}"),
            Ok(None) => tracing::info!("Simulation returned an empty response"),
            Err(err) => tracing::warn!("Could not decode simulated response: {err}"),
        }
        Ok(Some(result))
    }

    fn on_simulation_failure(
        &self,
        message: String,
        result: Option<SimulationResult>,
    ) -> Result<Option<SimulationResult>, PipelineError> {
        match self.simulation_policy {
            SimulationPolicy::Fail => Err(PipelineError::SimulationFailed(message)),
            SimulationPolicy::Warn => {
                tracing::warn!("Simulation error: {message}. Submitting the request anyway");
                Ok(result)
            }
        }
    }

    /// Simulate, estimate, publish secrets when the request carries them, and submit.
    pub async fn submit(&self, request: &RequestConfig) -> Result<SubmittedRequest, PipelineError> {
        let simulation = self.simulate(request).await?;

        let base = FunctionsRequest::new(request.source.clone(), request.args.clone())
            .with_bytes_args(request.bytes_args.clone());
        let estimate = self.estimator.estimate(request, &base.encode_cbor()?).await?;
        tracing::info!("Estimated fulfillment cost: {} LINK", estimate.cost_link());
        if !estimate.is_covered() {
            tracing::warn!(
                "Subscription {} balance may not cover the estimated cost",
                request.subscription_id
            );
        }

        let secrets = match &request.secrets {
            Some(config) => {
                let publisher =
                    self.secrets_publisher.as_ref().ok_or(PipelineError::NoSecretsPublisher)?;
                let bundle =
                    publisher.publish(request.router_address, &request.don_id, config).await?;
                tracing::info!(
                    "Secrets uploaded to slot {} with version {}",
                    bundle.slot_id,
                    bundle.version
                );
                Some(bundle)
            }
            None => None,
        };

        let submission = match (request.mode, &secrets) {
            (SubmissionMode::Consumer, None) => Submission::Direct,
            (SubmissionMode::Consumer, Some(bundle)) => Submission::WithSecrets(bundle.reference()),
            (SubmissionMode::Automation, bundle) => {
                let mut encoded = base;
                if let Some(bundle) = bundle {
                    encoded = encoded.with_secrets(bundle.reference());
                }
                Submission::Automated { cbor: encoded.encode_cbor()? }
            }
        };

        let receipt = self.submitter.submit(request, &submission).await?;
        tracing::info!("Request transaction {:#x} confirmed", receipt.tx_hash);

        Ok(SubmittedRequest { simulation, estimate, secrets, receipt })
    }

    /// Start waiting for the fulfillment of a submitted request.
    pub fn listen(&self, submitted: &SubmittedRequest) -> Result<FulfillmentHandle, PipelineError> {
        let request_id =
            submitted.receipt.request_id.ok_or(PipelineError::NoRequestId(submitted.tx_hash()))?;
        Ok(FulfillmentHandle::spawn(
            self.listener.clone(),
            submitted.tx_hash(),
            request_id,
            submitted.receipt.block_number,
            self.listener_config.timeout,
        ))
    }

    /// Submit a request and wait for its fulfillment.
    ///
    /// Fulfillment errors are reported inside the returned record.
    pub async fn submit_and_await(
        &self,
        request: &RequestConfig,
    ) -> Result<FulfillmentRecord, PipelineError> {
        let submitted = self.submit(request).await?;
        let record = self.listen(&submitted)?.wait().await?;
        log_fulfillment(&record, request);
        Ok(record)
    }
}

fn log_fulfillment(record: &FulfillmentRecord, request: &RequestConfig) {
    if !record.is_fulfilled() {
        tracing::warn!("Request {:#x} was not fulfilled: {}", record.request_id, record.code);
    }
    if let Some(error) = &record.error {
        tracing::warn!("Request {:#x} returned an error: {error}", record.request_id);
    }
    match record.decoded_response(request.return_type) {
        Ok(Some(value)) => tracing::info!("Request {:#x} response: {value}", record.request_id),
        Ok(None) => tracing::debug!("Request {:#x} has no response to decode", record.request_id),
        Err(err) => tracing::warn!("Failed to decode response: {err}"),
    }
}
