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


use anyhow::{Context, Result};
use clap::Args;
use functions_client::SubmissionMode;

use super::{build_pipeline, request::display_submission};
use crate::{
    config::{FunctionsConfig, GlobalConfig},
    display::DisplayManager,
};

/// Encode the request as CBOR and store it on an automated consumer with `updateRequest`
///
/// Secrets are uploaded first when GATEWAY_URL1 or GATEWAY_URL2 is configured. The stored
/// request is sent by Automation upkeeps, so this command does not wait for a fulfillment.
#[derive(Args, Clone, Debug)]
pub struct UpdateAutomation {
    /// Abort before updating if the local simulation reports an error
    #[clap(long)]
    pub fail_on_simulation_error: bool,

    /// Request file and credentials
    #[clap(flatten)]
    pub functions_config: FunctionsConfig,
}

impl UpdateAutomation {
    /// Run the update-automation command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let provider = self.functions_config.signing_provider()?;
        let settings = self.functions_config.load_settings().await?;

        let secrets = if settings.gateway_url1.is_some() || settings.gateway_url2.is_some() {
            Some(settings.secrets_config(|var| std::env::var(var).ok())?)
        } else {
            None
        };
        let request = settings.request_config(SubmissionMode::Automation, secrets).await?;
        let pipeline = build_pipeline(
            provider,
            &self.functions_config,
            &settings,
            settings.listener_config(),
            global_config,
            self.fail_on_simulation_error,
        )?;

        let display = DisplayManager::with_don(&settings.don_id);
        display.header("Automated Request Update");
        display.address("Consumer", request.consumer_address);
        display.item("Subscription", request.subscription_id);

        let submitted =
            pipeline.submit(&request).await.context("Failed to update automated request")?;
        display_submission(&display, &submitted, request.return_type);
        display.tx_hash(submitted.tx_hash(), settings.explorer_tx_url(&submitted.tx_hash()));
        display.success("Automated consumer updated");
        Ok(())
    }
}
