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

//! Waiting for the router to report the fulfillment of a request.

use std::{sync::Arc, time::Duration};

use alloy::{
    primitives::{Address, B256, U256},
    providers::Provider,
    rpc::types::Filter,
    sol_types::SolEvent,
    transports::TransportError,
};
use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    contracts::IFunctionsRouter,
    errors::CodedError,
    fulfillment::{error_string, response_bytes, FulfillmentCode, FulfillmentRecord},
};

#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("{code} RPC error while waiting for fulfillment: {0}", code = self.code())]
    Rpc(#[from] TransportError),

    #[error("{code} Failed to decode RequestProcessed log: {0}", code = self.code())]
    Decode(#[from] alloy::sol_types::Error),

    #[error("{code} No fulfillment observed within {0:?}", code = self.code())]
    Timeout(Duration),

    #[error("{code} Fulfillment wait was cancelled", code = self.code())]
    Cancelled,

    #[error("{code} Listener task failed: {0}", code = self.code())]
    Join(#[from] tokio::task::JoinError),
}

impl CodedError for ListenerError {
    fn code(&self) -> &str {
        match self {
            ListenerError::Rpc(_) => "[F-LIS-001]",
            ListenerError::Decode(_) => "[F-LIS-002]",
            ListenerError::Timeout(_) => "[F-LIS-003]",
            ListenerError::Cancelled => "[F-LIS-004]",
            ListenerError::Join(_) => "[F-LIS-005]",
        }
    }
}

/// Resolves once with the terminal router event of a request.
#[async_trait]
pub trait FulfillmentListener: Send + Sync {
    /// Wait for `request_id`, created by `tx_hash`, to be processed. Blocks before `from_block`
    /// are not searched; `None` starts at the current head.
    async fn wait_for(
        &self,
        tx_hash: B256,
        request_id: B256,
        from_block: Option<u64>,
    ) -> Result<FulfillmentRecord, ListenerError>;
}

/// [FulfillmentListener] that polls the router for `RequestProcessed` logs.
#[derive(Clone)]
pub struct RouterResponseListener<P> {
    provider: P,
    router: Address,
    poll_interval: Duration,
}

impl<P> RouterResponseListener<P> {
    pub fn new(provider: P, router: Address, poll_interval: Duration) -> Self {
        Self { provider, router, poll_interval }
    }
}

fn record_from_event(tx_hash: B256, event: IFunctionsRouter::RequestProcessed) -> FulfillmentRecord {
    FulfillmentRecord {
        tx_hash,
        request_id: event.requestId,
        code: FulfillmentCode::from(event.resultCode),
        total_cost_juels: U256::from(event.totalCostJuels),
        error: error_string(&event.err),
        response: response_bytes(&event.response),
    }
}

#[async_trait]
impl<P> FulfillmentListener for RouterResponseListener<P>
where
    P: Provider + Clone + 'static,
{
    async fn wait_for(
        &self,
        tx_hash: B256,
        request_id: B256,
        from_block: Option<u64>,
    ) -> Result<FulfillmentRecord, ListenerError> {
        let from_block = match from_block {
            Some(block) => block,
            None => self.provider.get_block_number().await?,
        };
        let filter = Filter::new()
            .address(self.router)
            .event_signature(IFunctionsRouter::RequestProcessed::SIGNATURE_HASH)
            .topic1(request_id)
            .from_block(from_block);

        tracing::debug!("Waiting for fulfillment of request {request_id:#x} from block {from_block}");
        loop {
            let logs = self.provider.get_logs(&filter).await?;
            // The router emits exactly one terminal event per request.
            if let Some(log) = logs.first() {
                let event = IFunctionsRouter::RequestProcessed::decode_log_data(log.data())?;
                return Ok(record_from_event(tx_hash, event));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// A fulfillment wait running in the background.
///
/// The wait can be awaited with [FulfillmentHandle::wait], stopped with
/// [FulfillmentHandle::cancel], and is bounded by the timeout it was spawned with, if any.
pub struct FulfillmentHandle {
    tx_hash: B256,
    request_id: B256,
    cancel_token: CancellationToken,
    task: JoinHandle<Result<FulfillmentRecord, ListenerError>>,
}

impl FulfillmentHandle {
    pub fn spawn(
        listener: Arc<dyn FulfillmentListener>,
        tx_hash: B256,
        request_id: B256,
        from_block: Option<u64>,
        timeout: Option<Duration>,
    ) -> Self {
        let cancel_token = CancellationToken::new();
        let task_token = cancel_token.clone();
        let task = tokio::spawn(async move {
            let wait = async {
                let fut = listener.wait_for(tx_hash, request_id, from_block);
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, fut)
                        .await
                        .map_err(|_| ListenerError::Timeout(limit))?,
                    None => fut.await,
                }
            };
            tokio::select! {
                res = wait => res,
                _ = task_token.cancelled() => Err(ListenerError::Cancelled),
            }
        });
        Self { tx_hash, request_id, cancel_token, task }
    }

    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    pub fn request_id(&self) -> B256 {
        self.request_id
    }

    /// Stop waiting. A subsequent [FulfillmentHandle::wait] returns [ListenerError::Cancelled]
    /// unless the record was already observed.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn wait(self) -> Result<FulfillmentRecord, ListenerError> {
        self.task.await?
    }
}
