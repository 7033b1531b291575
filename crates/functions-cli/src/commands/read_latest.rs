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
use functions_client::automation::read_latest;

use crate::{
    config::{FunctionsConfig, GlobalConfig},
    display::DisplayManager,
};

/// Read the last request id, response and error stored by an automated consumer
#[derive(Args, Clone, Debug)]
pub struct ReadLatest {
    /// Request file and RPC URL
    #[clap(flatten)]
    pub functions_config: FunctionsConfig,
}

impl ReadLatest {
    /// Run the read-latest command
    pub async fn run(&self, _global_config: &GlobalConfig) -> Result<()> {
        let provider = self.functions_config.provider()?;
        let settings = self.functions_config.load_settings().await?;
        let return_type = settings.return_type();

        let latest = read_latest(&provider, settings.consumer_address)
            .await
            .context("Failed to read the consumer state")?;

        let display = DisplayManager::with_don(&settings.don_id);
        display.header("Latest Response");
        display.address("Consumer", settings.consumer_address);
        display.item_colored("Request ID", format!("{:#x}", latest.request_id), "dimmed");
        if let Some(error) = &latest.error {
            display.item_colored("Error", error, "red");
        }
        match latest.decoded(return_type) {
            Ok(Some(value)) => display.item_colored("Response", value, "green"),
            Ok(None) => display.item_colored("Response", "(empty)", "dimmed"),
            Err(err) => display.item_colored("Response", err, "red"),
        }
        Ok(())
    }
}
