use ethers::{
    providers::{Http, Middleware, Provider},
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, Eip1559TransactionRequest, H256,
        U256,
    },
};
use eyre::{ensure, eyre};
use modulor_clients::{BundlerClient, PaymasterClient};
use modulor_contracts::{function_name, AccountAPI, EntryPoint};
use modulor_modules::{
    encode_execute,
    erc1271::{self, AccountDomain},
    install_module_action, ownable::ownable_mock_signature,
    validator_nonce_key, Module, Safe7579Account,
};
use modulor_primitives::{
    Deployments, Execution, UserOperation, UserOperationHash, UserOperationReceipt, Wallet,
};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Extra call gas added on top of the bundler's estimate (in percent)
pub const CALL_GAS_BUFFER: u64 = 10;

/// Endpoints of the chain, the bundler and the (optional) paymaster
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Endpoints {
    pub rpc_url: String,
    pub bundler_url: String,
    pub paymaster_url: Option<String>,
}

/// The `SmartAccountClient` drives one Safe7579 account through the bundler
#[derive(Clone)]
pub struct SmartAccountClient<M: Middleware + 'static> {
    /// Ethereum execution client
    pub eth_client: Arc<M>,
    pub bundler: BundlerClient,
    /// Sponsors the user operations when set
    pub paymaster: Option<PaymasterClient>,
    pub deployments: Deployments,
    pub account: Safe7579Account,
    /// Counterfactual address of the account
    pub address: Address,
    pub chain_id: u64,
    /// Call gas buffer in percent
    pub call_gas_buffer: u64,
    entry_point: EntryPoint<M>,
}

pub type HttpSmartAccountClient = SmartAccountClient<Provider<Http>>;

impl HttpSmartAccountClient {
    /// Connects to the endpoints over HTTP
    pub async fn connect(
        endpoints: &Endpoints,
        deployments: Deployments,
        account: Safe7579Account,
    ) -> eyre::Result<Self> {
        let eth_client = Arc::new(Provider::<Http>::try_from(endpoints.rpc_url.as_str())?);
        let bundler = BundlerClient::new(&endpoints.bundler_url, deployments.entry_point)?;
        let paymaster = endpoints.paymaster_url.as_deref().map(PaymasterClient::new).transpose()?;
        Self::new(eth_client, bundler, paymaster, deployments, account).await
    }
}

impl<M: Middleware + 'static> SmartAccountClient<M> {
    /// Create a new client, resolving the account address by simulating its deployment
    ///
    /// # Arguments
    /// * `eth_client` - Connection to the chain the account lives on
    /// * `bundler` - Bundler the user operations are sent to
    /// * `paymaster` - Optional sponsoring paymaster
    /// * `deployments` - Infrastructure and module addresses
    /// * `account` - The account configuration (owners, initial modules, attesters, salt)
    ///
    /// # Returns
    /// * `Self` - The client
    pub async fn new(
        eth_client: Arc<M>,
        bundler: BundlerClient,
        paymaster: Option<PaymasterClient>,
        deployments: Deployments,
        account: Safe7579Account,
    ) -> eyre::Result<Self> {
        let chain_id = eth_client.get_chainid().await?.as_u64();

        let tx: TypedTransaction = Eip1559TransactionRequest::new()
            .to(deployments.safe_proxy_factory)
            .data(account.factory_data(&deployments)?)
            .into();
        let result = eth_client.call(&tx, None).await?;
        ensure!(result.len() >= 32, "proxy factory returned {} bytes", result.len());
        let address = Address::from_slice(&result[12..32]);
        info!("Smart account {address:?} on chain {chain_id}");

        let entry_point = EntryPoint::new(eth_client.clone(), deployments.entry_point);
        Ok(Self {
            eth_client,
            bundler,
            paymaster,
            deployments,
            account,
            address,
            chain_id,
            call_gas_buffer: CALL_GAS_BUFFER,
            entry_point,
        })
    }

    pub fn with_call_gas_buffer(mut self, call_gas_buffer: u64) -> Self {
        self.call_gas_buffer = call_gas_buffer;
        self
    }

    pub async fn is_deployed(&self) -> eyre::Result<bool> {
        let code = self.eth_client.get_code(self.address, None).await?;
        Ok(!code.is_empty())
    }

    /// Next nonce of the account in the lane of `validator`
    pub async fn nonce(&self, validator: Address) -> eyre::Result<U256> {
        Ok(self.entry_point.get_nonce(self.address, validator_nonce_key(validator)).await?)
    }

    /// Builds a user operation executing `calls`, ready to be signed
    ///
    /// The gas limits are estimated with `dummy_signature` in place, which has to be shaped like
    /// the final signature of the validator selected by `nonce`.
    pub async fn prepare_user_operation(
        &self,
        calls: &[Execution],
        nonce: U256,
        dummy_signature: Bytes,
    ) -> eyre::Result<UserOperation> {
        for call in calls {
            debug!(
                "Call to {:?}: {}",
                call.to,
                function_name(&call.data).unwrap_or("unknown function")
            );
        }

        let mut uo = UserOperation::default()
            .sender(self.address)
            .nonce(nonce)
            .call_data(encode_execute(calls)?)
            .signature(dummy_signature);

        if !self.is_deployed().await? {
            info!("Account {:?} not deployed yet, attaching the factory", self.address);
            uo = uo.factory(
                self.deployments.safe_proxy_factory,
                self.account.factory_data(&self.deployments)?,
            );
        }

        let gas_price = self.bundler.gas_price().await?.fast;
        uo = uo
            .max_fee_per_gas(gas_price.max_fee_per_gas)
            .max_priority_fee_per_gas(gas_price.max_priority_fee_per_gas);

        let mut is_final = false;
        if let Some(paymaster) = &self.paymaster {
            let stub = paymaster
                .get_paymaster_stub_data(&uo, self.deployments.entry_point, self.chain_id)
                .await?;
            is_final = stub.is_final;
            uo = uo.paymaster(
                stub.paymaster,
                stub.paymaster_verification_gas_limit.unwrap_or_default(),
                stub.paymaster_post_op_gas_limit.unwrap_or_default(),
                stub.paymaster_data,
            );
        }

        let estimation = self.bundler.estimate_user_operation_gas(&uo).await?;
        let call_gas_limit =
            estimation.call_gas_limit * U256::from(100 + self.call_gas_buffer) / U256::from(100);
        uo = uo
            .call_gas_limit(call_gas_limit)
            .verification_gas_limit(estimation.verification_gas_limit)
            .pre_verification_gas(estimation.pre_verification_gas);
        if let Some(gas) = estimation.paymaster_verification_gas_limit {
            uo = uo.paymaster_verification_gas_limit(gas);
        }
        if let Some(gas) = estimation.paymaster_post_op_gas_limit {
            uo = uo.paymaster_post_op_gas_limit(gas);
        }

        if let (Some(paymaster), false) = (&self.paymaster, is_final) {
            let data =
                paymaster.get_paymaster_data(&uo, self.deployments.entry_point, self.chain_id).await?;
            uo.paymaster = Some(data.paymaster);
            uo = uo.paymaster_data(data.paymaster_data);
        }

        trace!("Prepared user operation: {uo:?}");
        Ok(uo)
    }

    pub fn hash(&self, uo: &UserOperation) -> UserOperationHash {
        uo.hash(&self.deployments.entry_point, self.chain_id)
    }

    pub async fn send_user_operation(&self, uo: &UserOperation) -> eyre::Result<UserOperationHash> {
        Ok(self.bundler.send_user_operation(uo).await?)
    }

    pub async fn wait(&self, hash: UserOperationHash) -> eyre::Result<UserOperationReceipt> {
        let receipt = self.bundler.wait_for_user_operation_receipt(hash).await?;
        info!(
            "User operation {hash} included in {:?} (success: {})",
            receipt.tx_receipt.transaction_hash, receipt.success
        );
        Ok(receipt)
    }

    /// Executes `calls` authorized by `owner` through the ownable validator
    pub async fn send_calls(
        &self,
        calls: &[Execution],
        owner: &Wallet,
    ) -> eyre::Result<UserOperationReceipt> {
        let nonce = self.nonce(self.deployments.ownable_validator).await?;
        let uo = self.prepare_user_operation(calls, nonce, ownable_mock_signature(1)).await?;
        let signature = owner.sign_hash(self.hash(&uo).0).await?;

        let hash = self.send_user_operation(&uo.signature(signature)).await?;
        let receipt = self.wait(hash).await?;
        ensure!(receipt.success, "user operation {hash} reverted: {}", receipt.reason);
        Ok(receipt)
    }

    pub async fn install_module(
        &self,
        module: &Module,
        owner: &Wallet,
    ) -> eyre::Result<UserOperationReceipt> {
        info!("Installing {} module {:?}", module.module_type, module.address);
        self.send_calls(&[install_module_action(self.address, module)], owner).await
    }

    /// ERC-1271 signature of `hash` by `owner`, checked by the ownable validator
    pub async fn sign_erc1271(&self, hash: H256, owner: &Wallet) -> eyre::Result<Bytes> {
        let message_hash = erc1271::safe_message_hash(self.address, self.chain_id, hash);
        let signature = owner.sign_hash(message_hash).await?;
        Ok(erc1271::encode_1271_signature(self.deployments.ownable_validator, &signature))
    }

    /// EIP-712 domain of the deployed account, as its `eip712Domain()` reports it
    pub async fn account_domain(&self) -> eyre::Result<AccountDomain> {
        let account = AccountAPI::new(self.address, self.eth_client.clone());
        let (_, name, version, chain_id, verifying_contract, salt, _): (
            [u8; 1],
            String,
            String,
            U256,
            Address,
            [u8; 32],
            Vec<U256>,
        ) = account.method("eip712Domain", ())?.call().await?;
        Ok(AccountDomain { name, version, chain_id, verifying_contract, salt })
    }

    /// Reads the deployed code size, failing with a readable error when the account is missing
    pub async fn ensure_deployed(&self) -> eyre::Result<()> {
        if self.is_deployed().await? {
            Ok(())
        } else {
            Err(eyre!("account {:?} is not deployed on chain {}", self.address, self.chain_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::{
        abi::{encode, Token},
        providers::{MockProvider, Provider},
    };
    use modulor_modules::ownable::ownable_validator;

    fn client_parts() -> (Deployments, Safe7579Account) {
        let deployments = Deployments::default();
        let owner: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        let account = Safe7579Account::new(owner, &deployments).with_validator(
            ownable_validator(deployments.ownable_validator, &[owner], 1).unwrap(),
        );
        (deployments, account)
    }

    #[tokio::test]
    async fn address_comes_from_factory_simulation() {
        let (provider, mock): (Provider<MockProvider>, MockProvider) = Provider::mocked();
        let account_address = Address::repeat_byte(0x42);

        // responses are served last in, first out
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(account_address.as_bytes());
        mock.push::<Bytes, _>(Bytes::from(word.to_vec())).unwrap();
        mock.push::<U256, _>(U256::from(11155111)).unwrap();

        let (deployments, account) = client_parts();
        let bundler = BundlerClient::new("http://localhost:4337", deployments.entry_point).unwrap();
        let client = SmartAccountClient::new(Arc::new(provider), bundler, None, deployments, account)
            .await
            .unwrap();

        assert_eq!(client.address, account_address);
        assert_eq!(client.chain_id, 11155111);
        assert_eq!(client.call_gas_buffer, CALL_GAS_BUFFER);
    }

    #[tokio::test]
    async fn account_domain_is_read_from_the_account() {
        let (provider, mock): (Provider<MockProvider>, MockProvider) = Provider::mocked();
        let account_address = Address::repeat_byte(0x42);

        let domain = encode(&[
            Token::FixedBytes(vec![0x0f]),
            Token::String("Safe7579".into()),
            Token::String("1.0.0".into()),
            Token::Uint(U256::from(11155111)),
            Token::Address(account_address),
            Token::FixedBytes(vec![0u8; 32]),
            Token::Array(vec![]),
        ]);
        mock.push::<Bytes, _>(Bytes::from(domain)).unwrap();
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(account_address.as_bytes());
        mock.push::<Bytes, _>(Bytes::from(word.to_vec())).unwrap();
        mock.push::<U256, _>(U256::from(11155111)).unwrap();

        let (deployments, account) = client_parts();
        let bundler = BundlerClient::new("http://localhost:4337", deployments.entry_point).unwrap();
        let client = SmartAccountClient::new(Arc::new(provider), bundler, None, deployments, account)
            .await
            .unwrap();

        assert_eq!(
            client.account_domain().await.unwrap(),
            AccountDomain {
                name: "Safe7579".into(),
                version: "1.0.0".into(),
                chain_id: U256::from(11155111),
                verifying_contract: account_address,
                salt: [0u8; 32],
            }
        );
    }

    #[tokio::test]
    async fn short_factory_result_is_rejected() {
        let (provider, mock): (Provider<MockProvider>, MockProvider) = Provider::mocked();
        mock.push::<Bytes, _>(Bytes::from(vec![0u8; 4])).unwrap();
        mock.push::<U256, _>(U256::from(1)).unwrap();

        let (deployments, account) = client_parts();
        let bundler = BundlerClient::new("http://localhost:4337", deployments.entry_point).unwrap();
        let result =
            SmartAccountClient::new(Arc::new(provider), bundler, None, deployments, account).await;
        assert!(result.is_err());
    }
}
