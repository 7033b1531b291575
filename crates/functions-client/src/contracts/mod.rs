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

//! Contract bindings and transaction helpers for the Functions router, coordinator and
//! consumer contracts.

use std::time::Duration;

use alloy::{
    network::Ethereum,
    providers::PendingTransactionBuilder,
    rpc::types::TransactionReceipt,
    sol,
    sol_types::SolEvent,
};
use anyhow::{ensure, Context, Result};

sol! {
    /// Functions router: subscription registry, request entry point and fulfillment sink.
    #[sol(rpc)]
    interface IFunctionsRouter {
        struct Subscription {
            uint96 balance;
            address owner;
            uint96 blockedBalance;
            address proposedOwner;
            address[] consumers;
            bytes32 flags;
        }

        event RequestStart(
            bytes32 indexed requestId,
            bytes32 indexed donId,
            uint64 indexed subscriptionId,
            address subscriptionOwner,
            address requestingContract,
            address requestInitiator,
            bytes data,
            uint16 dataVersion,
            uint32 callbackGasLimit,
            uint96 estimatedTotalCostJuels
        );

        event RequestProcessed(
            bytes32 indexed requestId,
            uint64 indexed subscriptionId,
            uint96 totalCostJuels,
            address transmitter,
            uint8 resultCode,
            bytes response,
            bytes err,
            bytes callbackReturnData
        );

        function getContractById(bytes32 id) external view returns (address);
        function getSubscription(uint64 subscriptionId) external view returns (Subscription memory);
    }
}

sol! {
    /// DON coordinator, resolved through the router by DON id.
    #[sol(rpc)]
    interface IFunctionsCoordinator {
        function estimateCost(
            uint64 subscriptionId,
            bytes calldata data,
            uint32 callbackGasLimit,
            uint256 gasPriceWei
        ) external view returns (uint96);
    }
}

sol! {
    /// Consumer that sends an inline request without secrets.
    #[sol(rpc)]
    interface IFunctionsConsumer {
        function sendRequest(
            string calldata source,
            uint64 subscriptionId,
            string[] calldata args,
            uint32 gasLimit,
            bytes32 donID
        ) external returns (bytes32 requestId);
    }
}

sol! {
    /// Consumer that sends an inline request referencing DON-hosted secrets.
    #[sol(rpc)]
    interface ISecretsFunctionsConsumer {
        function sendRequest(
            string calldata source,
            bytes calldata encryptedSecretsUrls,
            uint8 donHostedSecretsSlotID,
            uint64 donHostedSecretsVersion,
            string[] calldata args,
            bytes[] calldata bytesArgs,
            uint64 subscriptionId,
            uint32 gasLimit,
            bytes32 donID
        ) external returns (bytes32 requestId);
    }
}

sol! {
    /// Consumer driven by Automation that replays a stored CBOR request.
    #[sol(rpc)]
    interface IAutomatedFunctionsConsumer {
        function updateRequest(
            bytes memory _requestCBOR,
            uint64 _subscriptionId,
            uint32 _fulfillGasLimit,
            bytes32 _donID
        ) external;

        function s_lastRequestId() external view returns (bytes32);
        function s_lastResponse() external view returns (bytes memory);
        function s_lastError() external view returns (bytes memory);
    }
}

/// Confirm a transaction by waiting for the specified number of confirmations.
pub async fn confirm_transaction(
    pending: PendingTransactionBuilder<Ethereum>,
    timeout: Option<Duration>,
    confirmations: u64,
) -> Result<TransactionReceipt> {
    let tx_hash = *pending.tx_hash();

    let receipt = pending
        .with_required_confirmations(confirmations)
        .with_timeout(timeout)
        .get_receipt()
        .await
        .with_context(|| format!("Failed to get receipt for transaction {:#x}", tx_hash))?;

    ensure!(receipt.status(), "Transaction reverted: {:#x}", receipt.transaction_hash);

    Ok(receipt)
}

/// Extract the first log of event `E` from a transaction receipt.
pub fn extract_event<E: SolEvent>(receipt: &TransactionReceipt) -> Result<E> {
    receipt
        .logs()
        .iter()
        .filter_map(|log| log.log_decode::<E>().ok())
        .next()
        .with_context(|| format!("Event {} not found in transaction receipt", E::SIGNATURE))
        .map(|log| log.inner.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{keccak256, Address, Bytes, LogData, B256, U256};

    #[test]
    fn event_signatures_match_router_abi() {
        assert_eq!(
            IFunctionsRouter::RequestProcessed::SIGNATURE_HASH,
            keccak256("RequestProcessed(bytes32,uint64,uint96,address,uint8,bytes,bytes,bytes)")
        );
        assert_eq!(
            IFunctionsRouter::RequestStart::SIGNATURE_HASH,
            keccak256(
                "RequestStart(bytes32,bytes32,uint64,address,address,address,bytes,uint16,uint32,uint96)"
            )
        );
    }

    #[test]
    fn decodes_request_processed_log() {
        let event = IFunctionsRouter::RequestProcessed {
            requestId: B256::repeat_byte(7),
            subscriptionId: 42,
            totalCostJuels: alloy::primitives::aliases::U96::from(5u64),
            transmitter: Address::repeat_byte(9),
            resultCode: 1,
            response: Bytes::new(),
            err: Bytes::from_static(b"callback reverted"),
            callbackReturnData: Bytes::new(),
        };
        let data: LogData = event.encode_log_data();
        let decoded = IFunctionsRouter::RequestProcessed::decode_log_data(&data).unwrap();

        assert_eq!(decoded.requestId, B256::repeat_byte(7));
        assert_eq!(decoded.subscriptionId, 42);
        assert_eq!(U256::from(decoded.totalCostJuels), U256::from(5u64));
        assert_eq!(decoded.resultCode, 1);
    }
}
