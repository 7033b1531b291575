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

//! Broadcasting requests through a consumer contract.

use std::time::Duration;

use alloy::{
    network::TransactionBuilder,
    primitives::{Bytes, B256},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol_types::SolCall,
    transports::TransportError,
};
use async_trait::async_trait;
use thiserror::Error;

use crate::{
    config::RequestConfig,
    contracts::{
        confirm_transaction, extract_event, IAutomatedFunctionsConsumer, IFunctionsConsumer,
        IFunctionsRouter, ISecretsFunctionsConsumer,
    },
    errors::CodedError,
    request::{don_id_to_bytes32, DonHostedSecretsReference, EncodeError},
};

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("{code} {0}", code = self.code())]
    Encode(#[from] EncodeError),

    #[error("{code} Failed to broadcast transaction: {0}", code = self.code())]
    Rpc(#[from] TransportError),

    #[error("{code} {0:#}", code = self.code())]
    Confirmation(anyhow::Error),

    #[error("{code} Transaction {0:#x} did not emit RequestStart", code = self.code())]
    MissingRequestId(B256),
}

impl CodedError for SubmitError {
    fn code(&self) -> &str {
        match self {
            SubmitError::Encode(_) => "[F-SUB-001]",
            SubmitError::Rpc(_) => "[F-SUB-002]",
            SubmitError::Confirmation(_) => "[F-SUB-003]",
            SubmitError::MissingRequestId(_) => "[F-SUB-004]",
        }
    }
}

/// The consumer entry point used to submit a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// `sendRequest(source, subscriptionId, args, gasLimit, donID)`.
    Direct,
    /// `sendRequest` with a reference to DON-hosted secrets.
    WithSecrets(DonHostedSecretsReference),
    /// `updateRequest` with a pre-encoded CBOR request.
    Automated { cbor: Bytes },
}

/// A mined request transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    /// Router-assigned request id. Automated submissions only store the request and have none.
    pub request_id: Option<B256>,
}

#[async_trait]
pub trait RequestSubmitter: Send + Sync {
    async fn submit(
        &self,
        request: &RequestConfig,
        submission: &Submission,
    ) -> Result<SubmissionReceipt, SubmitError>;
}

/// Calldata for `submission` against the consumer contract.
pub fn encode_calldata(request: &RequestConfig, submission: &Submission) -> Result<Bytes, SubmitError> {
    let don_id = don_id_to_bytes32(&request.don_id)?;
    let data = match submission {
        Submission::Direct => IFunctionsConsumer::sendRequestCall {
            source: request.source.clone(),
            subscriptionId: request.subscription_id,
            args: request.args.clone(),
            gasLimit: request.gas_limit,
            donID: don_id,
        }
        .abi_encode(),
        Submission::WithSecrets(reference) => ISecretsFunctionsConsumer::sendRequestCall {
            source: request.source.clone(),
            encryptedSecretsUrls: Bytes::new(),
            donHostedSecretsSlotID: reference.slot_id,
            donHostedSecretsVersion: reference.version,
            args: request.args.clone(),
            bytesArgs: request.bytes_args.clone(),
            subscriptionId: request.subscription_id,
            gasLimit: request.gas_limit,
            donID: don_id,
        }
        .abi_encode(),
        Submission::Automated { cbor } => IAutomatedFunctionsConsumer::updateRequestCall {
            _requestCBOR: cbor.clone(),
            _subscriptionId: request.subscription_id,
            _fulfillGasLimit: request.gas_limit,
            _donID: don_id,
        }
        .abi_encode(),
    };
    Ok(data.into())
}

/// [RequestSubmitter] that sends transactions from the provider's wallet.
#[derive(Clone)]
pub struct ConsumerSubmitter<P> {
    provider: P,
    confirmations: u64,
    tx_timeout: Option<Duration>,
}

impl<P> ConsumerSubmitter<P> {
    pub fn new(provider: P) -> Self {
        Self { provider, confirmations: 1, tx_timeout: None }
    }

    pub fn with_confirmations(self, confirmations: u64) -> Self {
        Self { confirmations, ..self }
    }

    pub fn with_timeout(self, tx_timeout: Option<Duration>) -> Self {
        Self { tx_timeout, ..self }
    }
}

#[async_trait]
impl<P> RequestSubmitter for ConsumerSubmitter<P>
where
    P: Provider + Clone + 'static,
{
    async fn submit(
        &self,
        request: &RequestConfig,
        submission: &Submission,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let calldata = encode_calldata(request, submission)?;
        let tx = TransactionRequest::default()
            .with_to(request.consumer_address)
            .with_input(calldata);

        let pending = self.provider.send_transaction(tx).await?;
        tracing::info!("Broadcast request transaction {:#x}", pending.tx_hash());

        let receipt = confirm_transaction(pending, self.tx_timeout, self.confirmations)
            .await
            .map_err(SubmitError::Confirmation)?;
        let tx_hash = receipt.transaction_hash;

        let request_id = match submission {
            Submission::Automated { .. } => None,
            _ => Some(
                extract_event::<IFunctionsRouter::RequestStart>(&receipt)
                    .map_err(|_| SubmitError::MissingRequestId(tx_hash))?
                    .requestId,
            ),
        };

        Ok(SubmissionReceipt { tx_hash, block_number: receipt.block_number, request_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SubmissionMode, return_type::ReturnType};
    use alloy::{
        primitives::{aliases::U96, Address, Log as PrimitiveLog},
        providers::ProviderBuilder,
        rpc::types::Log,
        signers::local::PrivateKeySigner,
        sol_types::SolEvent,
    };
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    const TX_HASH: B256 = B256::repeat_byte(0x77);

    fn mock_rpc(server: &MockServer, method: &str, result: Value) {
        let method = format!("\"{method}\"");
        server.mock(|when, then| {
            when.method(POST).path("/").body_contains(method.as_str());
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": result }));
        });
    }

    /// Serves the calls a wallet provider makes to sign, broadcast and confirm a transaction,
    /// answering the receipt lookup with `status` and `logs`.
    fn mock_chain(server: &MockServer, status: bool, logs: Vec<Log>) {
        mock_rpc(server, "eth_chainId", json!("0x13881"));
        mock_rpc(server, "eth_getTransactionCount", json!("0x0"));
        mock_rpc(server, "eth_estimateGas", json!("0x30d40"));
        mock_rpc(server, "eth_gasPrice", json!("0x3b9aca00"));
        mock_rpc(server, "eth_maxPriorityFeePerGas", json!("0x3b9aca00"));
        mock_rpc(
            server,
            "eth_feeHistory",
            json!({
                "oldestBlock": "0x10",
                "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
                "gasUsedRatio": [0.5],
                "reward": [["0x3b9aca00"]]
            }),
        );
        mock_rpc(server, "eth_sendRawTransaction", json!(TX_HASH));
        mock_rpc(server, "eth_blockNumber", json!("0x11"));
        mock_rpc(server, "eth_getBlockByNumber", Value::Null);
        mock_rpc(
            server,
            "eth_getTransactionReceipt",
            json!({
                "type": "0x2",
                "status": if status { "0x1" } else { "0x0" },
                "cumulativeGasUsed": "0x30d40",
                "logs": logs,
                "logsBloom": format!("0x{}", "00".repeat(256)),
                "transactionHash": TX_HASH,
                "transactionIndex": "0x0",
                "blockHash": B256::repeat_byte(0x10),
                "blockNumber": "0x11",
                "gasUsed": "0x30d40",
                "effectiveGasPrice": "0x3b9aca00",
                "from": Address::repeat_byte(0xaa),
                "to": Address::repeat_byte(2),
                "contractAddress": null
            }),
        );
    }

    fn request_start_log(router: Address, request_id: B256) -> Log {
        let event = IFunctionsRouter::RequestStart {
            requestId: request_id,
            donId: don_id_to_bytes32("fun-polygon-mumbai-1").unwrap(),
            subscriptionId: 1234,
            subscriptionOwner: Address::repeat_byte(0xaa),
            requestingContract: Address::repeat_byte(2),
            requestInitiator: Address::repeat_byte(0xaa),
            data: Bytes::new(),
            dataVersion: 1,
            callbackGasLimit: 300_000,
            estimatedTotalCostJuels: U96::from(1u64),
        };
        Log {
            inner: PrimitiveLog { address: router, data: event.encode_log_data() },
            block_number: Some(17),
            transaction_hash: Some(TX_HASH),
            log_index: Some(0),
            ..Default::default()
        }
    }

    fn submitter(server: &MockServer) -> ConsumerSubmitter<impl Provider + Clone + 'static> {
        let signer: PrivateKeySigner =
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".parse().unwrap();
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect_http(server.base_url().parse().unwrap());
        ConsumerSubmitter::new(provider).with_timeout(Some(Duration::from_secs(5)))
    }

    fn request() -> RequestConfig {
        RequestConfig {
            router_address: Address::repeat_byte(1),
            consumer_address: Address::repeat_byte(2),
            subscription_id: 1234,
            don_id: "fun-polygon-mumbai-1".into(),
            gas_limit: 300_000,
            source: "return Functions.encodeUint256(1)".into(),
            args: vec!["US".into()],
            bytes_args: vec![Bytes::from_static(&[0xca, 0xfe])],
            return_type: ReturnType::Uint256,
            mode: SubmissionMode::Consumer,
            secrets: None,
        }
    }

    #[tokio::test]
    async fn test_submit_reads_request_id_from_receipt() {
        let server = MockServer::start();
        let request_id = B256::repeat_byte(0x42);
        mock_chain(&server, true, vec![request_start_log(Address::repeat_byte(1), request_id)]);

        let receipt = submitter(&server).submit(&request(), &Submission::Direct).await.unwrap();

        assert_eq!(receipt.tx_hash, TX_HASH);
        assert_eq!(receipt.block_number, Some(17));
        assert_eq!(receipt.request_id, Some(request_id));
    }

    #[tokio::test]
    async fn test_submit_without_request_start() {
        let server = MockServer::start();
        mock_chain(&server, true, vec![]);

        let err = submitter(&server).submit(&request(), &Submission::Direct).await.unwrap_err();

        assert!(matches!(err, SubmitError::MissingRequestId(hash) if hash == TX_HASH));
        assert!(err.to_string().starts_with("[F-SUB-004]"));
    }

    #[tokio::test]
    async fn test_automated_submission_has_no_request_id() {
        let server = MockServer::start();
        mock_chain(&server, true, vec![]);

        let submission = Submission::Automated { cbor: Bytes::from_static(&[0xa1, 0x00]) };
        let receipt = submitter(&server).submit(&request(), &submission).await.unwrap();

        assert_eq!(receipt.tx_hash, TX_HASH);
        assert_eq!(receipt.request_id, None);
    }

    #[tokio::test]
    async fn test_submit_reverted_transaction() {
        let server = MockServer::start();
        mock_chain(&server, false, vec![]);

        let err = submitter(&server).submit(&request(), &Submission::Direct).await.unwrap_err();

        assert!(matches!(err, SubmitError::Confirmation(_)));
        assert!(err.to_string().contains("reverted"));
    }

    #[test]
    fn direct_calldata() {
        let data = encode_calldata(&request(), &Submission::Direct).unwrap();
        let call = IFunctionsConsumer::sendRequestCall::abi_decode(&data).unwrap();
        assert_eq!(call.subscriptionId, 1234);
        assert_eq!(call.args, vec!["US".to_string()]);
        assert_eq!(call.gasLimit, 300_000);
        assert_eq!(&call.donID[..20], b"fun-polygon-mumbai-1");
        assert!(call.donID[20..].iter().all(|b| *b == 0));
    }

    #[test]
    fn secrets_calldata_references_slot_and_version() {
        let reference = DonHostedSecretsReference { slot_id: 0, version: 1712345678 };
        let data = encode_calldata(&request(), &Submission::WithSecrets(reference)).unwrap();
        let call = ISecretsFunctionsConsumer::sendRequestCall::abi_decode(&data).unwrap();
        assert!(call.encryptedSecretsUrls.is_empty());
        assert_eq!(call.donHostedSecretsSlotID, 0);
        assert_eq!(call.donHostedSecretsVersion, 1712345678);
        assert_eq!(call.bytesArgs, vec![Bytes::from_static(&[0xca, 0xfe])]);
    }

    #[test]
    fn automated_calldata_carries_cbor() {
        let cbor = Bytes::from_static(&[0xa1, 0x00]);
        let data =
            encode_calldata(&request(), &Submission::Automated { cbor: cbor.clone() }).unwrap();
        let call = IAutomatedFunctionsConsumer::updateRequestCall::abi_decode(&data).unwrap();
        assert_eq!(call._requestCBOR, cbor);
        assert_eq!(call._fulfillGasLimit, 300_000);
    }

    #[test]
    fn rejects_long_don_id() {
        let mut request = request();
        request.don_id = "x".repeat(32);
        let err = encode_calldata(&request, &Submission::Direct).unwrap_err();
        assert!(matches!(err, SubmitError::Encode(EncodeError::DonIdTooLong(_))));
    }
}
