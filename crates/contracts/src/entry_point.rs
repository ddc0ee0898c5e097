pub use super::gen::{EntryPointAPI, EntryPointAPIEvents, UserOperationEventFilter};
use super::{
    error::ContractsError,
    gen::entry_point_api::{self, EntryPointAPIErrors},
};
use ethers::{
    prelude::Event,
    providers::Middleware,
    types::{Address, Bytes, H256, U256},
};
use modulor_primitives::PackedUserOperation;
use std::sync::Arc;

impl From<PackedUserOperation> for entry_point_api::PackedUserOperation {
    fn from(uo: PackedUserOperation) -> Self {
        Self {
            sender: uo.sender,
            nonce: uo.nonce,
            init_code: uo.init_code,
            call_data: uo.call_data,
            account_gas_limits: uo.account_gas_limits.0,
            pre_verification_gas: uo.pre_verification_gas,
            gas_fees: uo.gas_fees.0,
            paymaster_and_data: uo.paymaster_and_data,
            signature: uo.signature,
        }
    }
}

/// Entry point (v0.7) read helpers
#[derive(Clone)]
pub struct EntryPoint<M: Middleware + 'static> {
    eth_client: Arc<M>,
    address: Address,
    entry_point_api: EntryPointAPI<M>,
}

impl<M: Middleware + 'static> EntryPoint<M> {
    pub fn new(eth_client: Arc<M>, address: Address) -> Self {
        let entry_point_api = EntryPointAPI::new(address, eth_client.clone());
        Self { eth_client, address, entry_point_api }
    }

    pub fn entry_point_api(&self) -> &EntryPointAPI<M> {
        &self.entry_point_api
    }

    pub fn events(&self) -> Event<Arc<M>, M, EntryPointAPIEvents> {
        self.entry_point_api.events()
    }

    pub fn eth_client(&self) -> Arc<M> {
        self.eth_client.clone()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Nonce of the account for the given key (the key selects the validator)
    pub async fn get_nonce(&self, sender: Address, key: U256) -> Result<U256, ContractsError> {
        self.entry_point_api.get_nonce(sender, key).call().await.map_err(|err| {
            ContractsError::Other { inner: format!("get nonce error: {err:?}") }
        })
    }

    /// Counterfactual address of the account created by the init code
    ///
    /// `getSenderAddress` always reverts, the address is carried by the `SenderAddressResult`
    /// error.
    pub async fn get_sender_address(&self, init_code: Bytes) -> Result<Address, ContractsError> {
        let res = self.entry_point_api.get_sender_address(init_code).call().await;

        match res {
            Ok(_) => Err(ContractsError::NoRevert { function: "get_sender_address".into() }),
            Err(e) => ContractsError::from_contract_error(e).and_then(|op| match op {
                EntryPointAPIErrors::SenderAddressResult(res) => Ok(res.sender),
                EntryPointAPIErrors::FailedOp(err) => {
                    Err(ContractsError::ExecutionReverted(err.reason))
                }
                _ => Err(ContractsError::Other {
                    inner: format!("get sender address error: {op:?}"),
                }),
            }),
        }
    }

    /// Hash of the user operation as computed on-chain
    pub async fn get_user_op_hash(
        &self,
        uo: PackedUserOperation,
    ) -> Result<H256, ContractsError> {
        let hash = self.entry_point_api.get_user_op_hash(uo.into()).call().await.map_err(|err| {
            ContractsError::Other { inner: format!("get user operation hash error: {err:?}") }
        })?;
        Ok(H256(hash))
    }

    /// Deposit of the account in the entry point
    pub async fn balance_of(&self, addr: &Address) -> Result<U256, ContractsError> {
        self.entry_point_api.balance_of(*addr).call().await.map_err(|err| {
            ContractsError::Other { inner: format!("balance of error: {err:?}") }
        })
    }
}
