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


use std::{num::ParseIntError, time::Duration};

use anyhow::{Context, Result};
use clap::Args;
use functions_client::{simulator::SimulationResult, ReturnType, SubmissionMode, SubmittedRequest};

use super::build_pipeline;
use crate::{
    config::{FunctionsConfig, GlobalConfig},
    display::DisplayManager,
};

/// Options shared by the request commands
#[derive(Args, Clone, Debug)]
pub struct RequestArgs {
    /// Abort before submitting if the local simulation reports an error
    #[clap(long)]
    pub fail_on_simulation_error: bool,

    /// Return once the request transaction is confirmed instead of waiting for fulfillment
    #[clap(long)]
    pub no_wait: bool,

    /// Give up waiting for fulfillment after this many seconds.
    /// Overrides LISTENER_TIMEOUT_SECS in the configuration file.
    #[clap(long, value_parser = |arg: &str| -> Result<Duration, ParseIntError> {Ok(Duration::from_secs(arg.parse()?))})]
    pub timeout: Option<Duration>,

    /// Request file and credentials
    #[clap(flatten)]
    pub functions_config: FunctionsConfig,
}

/// Send a request through a Functions consumer and wait for its fulfillment
#[derive(Args, Clone, Debug)]
pub struct Request {
    #[clap(flatten)]
    args: RequestArgs,
}

impl Request {
    /// Run the request command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        run_request(&self.args, global_config, false).await
    }
}

/// Upload DON-hosted secrets, then send a request that references them
#[derive(Args, Clone, Debug)]
pub struct RequestWithSecrets {
    #[clap(flatten)]
    args: RequestArgs,
}

impl RequestWithSecrets {
    /// Run the request-with-secrets command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        run_request(&self.args, global_config, true).await
    }
}

async fn run_request(
    args: &RequestArgs,
    global_config: &GlobalConfig,
    with_secrets: bool,
) -> Result<()> {
    let provider = args.functions_config.signing_provider()?;
    let settings = args.functions_config.load_settings().await?;

    let secrets = if with_secrets {
        Some(settings.secrets_config(|var| std::env::var(var).ok())?)
    } else {
        None
    };
    let request = settings.request_config(SubmissionMode::Consumer, secrets).await?;

    let mut listener_config = settings.listener_config();
    if args.timeout.is_some() {
        listener_config.timeout = args.timeout;
    }
    let pipeline = build_pipeline(
        provider,
        &args.functions_config,
        &settings,
        listener_config,
        global_config,
        args.fail_on_simulation_error,
    )?;

    let display = DisplayManager::with_don(&settings.don_id);
    display.header("Functions Request");
    display.address("Consumer", request.consumer_address);
    display.item("Subscription", request.subscription_id);
    display.item("Return Type", request.return_type);

    let submitted = pipeline.submit(&request).await.context("Failed to submit request")?;
    display_submission(&display, &submitted, request.return_type);
    display.tx_hash(submitted.tx_hash(), settings.explorer_tx_url(&submitted.tx_hash()));

    let handle = pipeline.listen(&submitted)?;
    if args.no_wait {
        display.item_colored("Request ID", format!("{:#x}", handle.request_id()), "dimmed");
        handle.cancel();
        display.note("Not waiting for fulfillment");
        return Ok(());
    }

    display.info("Waiting for fulfillment...");
    let record = handle.wait().await.context("Failed while waiting for fulfillment")?;
    display.fulfillment(&record, request.return_type);

    if record.is_fulfilled() && record.error.is_none() {
        display.success("Request fulfilled");
    } else {
        display.warning(&format!("Request finished with {}", record.code));
    }
    Ok(())
}

pub(super) fn display_submission(
    display: &DisplayManager,
    submitted: &SubmittedRequest,
    return_type: ReturnType,
) {
    match &submitted.simulation {
        Some(SimulationResult::Error { message, .. }) => {
            display.item_colored("Simulation", message, "yellow")
        }
        Some(result) => match result.decoded(return_type) {
            Ok(Some(value)) => display.item_colored("Simulation", value, "green"),
            Ok(None) => display.item_colored("Simulation", "(empty)", "dimmed"),
            Err(err) => display.item_colored("Simulation", err, "yellow"),
        },
        None => display.item_colored("Simulation", "unavailable", "yellow"),
    }
    display.address("Coordinator", submitted.estimate.coordinator);
    display.link("Estimated Cost", submitted.estimate.total_cost_juels);
    if let Some(bundle) = &submitted.secrets {
        display.item("Secrets Size", format!("{} bytes", bundle.ciphertext.len()));
        display.item("Secrets Slot", bundle.slot_id);
        display.item("Secrets Version", bundle.version);
    }
}
