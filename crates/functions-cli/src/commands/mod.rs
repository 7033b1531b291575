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


//! Commands for submitting Functions requests and reading their results.

mod read_latest;
mod request;
mod update_automation;

pub use read_latest::ReadLatest;
pub use request::{Request, RequestArgs, RequestWithSecrets};
pub use update_automation::UpdateAutomation;

use std::sync::Arc;

use alloy::providers::Provider;
use anyhow::Result;
use functions_client::{
    config::ListenerConfig, estimator::RouterCostEstimator, listener::RouterResponseListener,
    secrets::GatewaySecretsPublisher, simulator::HttpSimulator, submitter::ConsumerSubmitter,
    Pipeline, Settings, SimulationPolicy,
};

use crate::config::{FunctionsConfig, GlobalConfig};

/// Wire the request pipeline to the RPC provider and the toolkit service.
pub(crate) fn build_pipeline<P>(
    provider: P,
    functions_config: &FunctionsConfig,
    settings: &Settings,
    listener_config: ListenerConfig,
    global_config: &GlobalConfig,
    fail_on_simulation_error: bool,
) -> Result<Pipeline>
where
    P: Provider + Clone + 'static,
{
    let toolkit_url = functions_config.require_toolkit_url(settings)?;
    let simulation_policy = if fail_on_simulation_error {
        SimulationPolicy::Fail
    } else {
        settings.simulation_policy
    };

    let submitter = ConsumerSubmitter::new(provider.clone())
        .with_confirmations(settings.confirmations)
        .with_timeout(global_config.tx_timeout);
    let listener = RouterResponseListener::new(
        provider.clone(),
        settings.router_address,
        listener_config.poll_interval,
    );

    Ok(Pipeline::new(
        Arc::new(HttpSimulator::new(&toolkit_url)?),
        Arc::new(RouterCostEstimator::new(provider)),
        Arc::new(submitter),
        Arc::new(listener),
        listener_config,
    )
    .with_secrets_publisher(Arc::new(GatewaySecretsPublisher::new(&toolkit_url)?))
    .with_simulation_policy(simulation_policy))
}
