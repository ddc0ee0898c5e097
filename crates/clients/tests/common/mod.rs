#![allow(dead_code)]

use ethers::types::{Address, Bytes, TransactionReceipt, U256, U64};
use jsonrpsee::{
    core::{async_trait, RpcResult},
    server::{Server, ServerHandle},
    types::ErrorObjectOwned,
};
use modulor_clients::{
    bundler::{BundlerApiServer, PimlicoApiServer},
    paymaster::{PaymasterApiServer, PaymasterData, PaymasterStubData},
};
use modulor_primitives::{
    GasPrice, GasPriceTiers, UserOperation, UserOperationByHash, UserOperationGasEstimation,
    UserOperationHash, UserOperationReceipt,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub const CHAIN_ID: u64 = 11155111;

pub fn entry_point() -> Address {
    "0x0000000071727De22E5E9d8BAf0edAc6f37da032".parse().unwrap()
}

pub fn paymaster() -> Address {
    "0x0000000000000039cd5e8aE05257CE51C473ddd1".parse().unwrap()
}

#[derive(Default)]
pub struct MockState {
    /// User operations received by `eth_sendUserOperation`
    pub sent: Vec<UserOperation>,
    /// Receipt polls answered with `null` before the receipt shows up (`None` never shows it)
    pub pending_polls: Option<usize>,
    pub receipt_polls: usize,
    /// Context of the last paymaster request
    pub paymaster_context: Option<Value>,
}

/// In-process bundler and paymaster
#[derive(Clone, Default)]
pub struct MockServices {
    pub state: Arc<Mutex<MockState>>,
}

impl MockServices {
    pub fn with_pending_polls(pending_polls: Option<usize>) -> Self {
        let services = Self::default();
        services.state.lock().unwrap().pending_polls = pending_polls;
        services
    }

    pub async fn start(&self) -> (String, ServerHandle) {
        let server = Server::builder().build("127.0.0.1:0").await.unwrap();
        let address = server.local_addr().unwrap();

        let mut module = BundlerApiServer::into_rpc(self.clone());
        module.merge(PimlicoApiServer::into_rpc(self.clone())).unwrap();
        module.merge(PaymasterApiServer::into_rpc(self.clone())).unwrap();

        (format!("http://{address}"), server.start(module))
    }
}

fn invalid_params(message: &str) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(-32602, message.to_string(), None::<bool>)
}

#[async_trait]
impl BundlerApiServer for MockServices {
    async fn chain_id(&self) -> RpcResult<U64> {
        Ok(U64::from(CHAIN_ID))
    }

    async fn supported_entry_points(&self) -> RpcResult<Vec<Address>> {
        Ok(vec![entry_point()])
    }

    async fn send_user_operation(
        &self,
        user_operation: UserOperation,
        entry_point: Address,
    ) -> RpcResult<UserOperationHash> {
        let hash = user_operation.hash(&entry_point, CHAIN_ID);
        self.state.lock().unwrap().sent.push(user_operation);
        Ok(hash)
    }

    async fn estimate_user_operation_gas(
        &self,
        user_operation: UserOperation,
        _entry_point: Address,
    ) -> RpcResult<UserOperationGasEstimation> {
        if user_operation.signature.is_empty() {
            return Err(invalid_params("estimation needs a dummy signature"));
        }
        Ok(UserOperationGasEstimation {
            pre_verification_gas: 50_000.into(),
            verification_gas_limit: 300_000.into(),
            call_gas_limit: 100_000.into(),
            paymaster_verification_gas_limit: user_operation.paymaster.map(|_| 40_000.into()),
            paymaster_post_op_gas_limit: user_operation.paymaster.map(|_| 1.into()),
        })
    }

    async fn get_user_operation_receipt(
        &self,
        user_operation_hash: UserOperationHash,
    ) -> RpcResult<Option<UserOperationReceipt>> {
        let mut state = self.state.lock().unwrap();
        state.receipt_polls += 1;
        match state.pending_polls {
            Some(pending) if state.receipt_polls > pending => {}
            _ => return Ok(None),
        }

        let Some(user_operation) = state
            .sent
            .iter()
            .find(|uo| uo.hash(&entry_point(), CHAIN_ID) == user_operation_hash)
        else {
            return Ok(None);
        };

        Ok(Some(UserOperationReceipt {
            user_operation_hash,
            sender: user_operation.sender,
            nonce: user_operation.nonce,
            paymaster: user_operation.paymaster,
            actual_gas_cost: 21_000.into(),
            actual_gas_used: 21_000.into(),
            success: true,
            reason: String::new(),
            logs: vec![],
            tx_receipt: TransactionReceipt::default(),
        }))
    }

    async fn get_user_operation_by_hash(
        &self,
        _user_operation_hash: UserOperationHash,
    ) -> RpcResult<Option<UserOperationByHash>> {
        Ok(None)
    }
}

#[async_trait]
impl PimlicoApiServer for MockServices {
    async fn get_user_operation_gas_price(&self) -> RpcResult<GasPriceTiers> {
        let tier = |fee: u64| GasPrice {
            max_fee_per_gas: U256::from(fee),
            max_priority_fee_per_gas: U256::from(fee / 2),
        };
        Ok(GasPriceTiers { slow: tier(10), standard: tier(20), fast: tier(30) })
    }
}

#[async_trait]
impl PaymasterApiServer for MockServices {
    async fn get_paymaster_stub_data(
        &self,
        _user_operation: UserOperation,
        entry_point: Address,
        chain_id: String,
        context: Value,
    ) -> RpcResult<PaymasterStubData> {
        if chain_id != format!("{CHAIN_ID:#x}") || entry_point != self::entry_point() {
            return Err(invalid_params("unsupported chain or entry point"));
        }
        self.state.lock().unwrap().paymaster_context = Some(context);

        Ok(PaymasterStubData {
            paymaster: paymaster(),
            paymaster_data: Bytes::from(vec![0u8; 4]),
            paymaster_verification_gas_limit: Some(100_000.into()),
            paymaster_post_op_gas_limit: Some(50_000.into()),
            sponsor: None,
            is_final: false,
        })
    }

    async fn get_paymaster_data(
        &self,
        user_operation: UserOperation,
        _entry_point: Address,
        _chain_id: String,
        _context: Value,
    ) -> RpcResult<PaymasterData> {
        if user_operation.call_gas_limit.is_zero() {
            return Err(invalid_params("gas limits missing"));
        }
        Ok(PaymasterData {
            paymaster: paymaster(),
            paymaster_data: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        })
    }
}
