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

//! Pre-flight cost estimation against the DON coordinator.

use alloy::{
    primitives::{utils::format_ether, Address, Bytes, U256},
    providers::Provider,
    transports::TransportError,
};
use async_trait::async_trait;
use thiserror::Error;

use crate::{
    config::RequestConfig,
    contracts::{IFunctionsCoordinator, IFunctionsRouter},
    errors::CodedError,
    request::{don_id_to_bytes32, EncodeError},
};

#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("{code} Contract call failed: {0}", code = self.code())]
    Contract(#[from] alloy::contract::Error),

    #[error("{code} RPC error: {0}", code = self.code())]
    Rpc(#[from] TransportError),

    #[error("{code} No coordinator registered for DON '{0}'", code = self.code())]
    UnknownDon(String),

    #[error("{code} {0}", code = self.code())]
    Encode(#[from] EncodeError),
}

impl CodedError for EstimateError {
    fn code(&self) -> &str {
        match self {
            EstimateError::Contract(_) => "[F-EST-001]",
            EstimateError::Rpc(_) => "[F-EST-002]",
            EstimateError::UnknownDon(_) => "[F-EST-003]",
            EstimateError::Encode(_) => "[F-EST-004]",
        }
    }
}

/// Expected cost of fulfilling a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostEstimate {
    /// Coordinator that produced the estimate.
    pub coordinator: Address,
    pub gas_price_wei: U256,
    /// Estimated fulfillment cost, in Juels.
    pub total_cost_juels: U256,
    /// Subscription balance at the time of the estimate, in Juels.
    pub subscription_balance_juels: U256,
}

impl CostEstimate {
    /// Estimated cost formatted in LINK.
    pub fn cost_link(&self) -> String {
        format_ether(self.total_cost_juels)
    }

    /// Whether the subscription currently holds enough LINK to cover the estimate.
    pub fn is_covered(&self) -> bool {
        self.subscription_balance_juels >= self.total_cost_juels
    }
}

#[async_trait]
pub trait CostEstimator: Send + Sync {
    /// Estimate the cost of `request`, whose encoded payload is `data`.
    async fn estimate(&self, request: &RequestConfig, data: &Bytes)
        -> Result<CostEstimate, EstimateError>;
}

/// [CostEstimator] that resolves the coordinator through the router and queries it directly.
#[derive(Clone)]
pub struct RouterCostEstimator<P> {
    provider: P,
}

impl<P> RouterCostEstimator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

/// Query a coordinator for the fulfillment cost of a request, in Juels.
pub async fn coordinator_estimate<P: Provider>(
    provider: &P,
    coordinator: Address,
    subscription_id: u64,
    data: Bytes,
    gas_limit: u32,
    gas_price_wei: U256,
) -> Result<U256, EstimateError> {
    let coordinator = IFunctionsCoordinator::new(coordinator, provider);
    let cost = coordinator.estimateCost(subscription_id, data, gas_limit, gas_price_wei).call().await?;
    Ok(U256::from(cost))
}

#[async_trait]
impl<P> CostEstimator for RouterCostEstimator<P>
where
    P: Provider + Clone + 'static,
{
    async fn estimate(
        &self,
        request: &RequestConfig,
        data: &Bytes,
    ) -> Result<CostEstimate, EstimateError> {
        let router = IFunctionsRouter::new(request.router_address, &self.provider);
        let don_id = don_id_to_bytes32(&request.don_id)?;

        let coordinator = router.getContractById(don_id).call().await?;
        if coordinator == Address::ZERO {
            return Err(EstimateError::UnknownDon(request.don_id.clone()));
        }
        tracing::debug!("DON {} is served by coordinator {coordinator}", request.don_id);

        let subscription = router.getSubscription(request.subscription_id).call().await?;
        if !subscription.consumers.contains(&request.consumer_address) {
            tracing::warn!(
                "Consumer {} is not registered on subscription {}",
                request.consumer_address,
                request.subscription_id
            );
        }

        let gas_price_wei = U256::from(self.provider.get_gas_price().await?);
        let total_cost_juels = coordinator_estimate(
            &self.provider,
            coordinator,
            request.subscription_id,
            data.clone(),
            request.gas_limit,
            gas_price_wei,
        )
        .await?;

        Ok(CostEstimate {
            coordinator,
            gas_price_wei,
            total_cost_juels,
            subscription_balance_juels: U256::from(subscription.balance),
        })
    }
}
