//! Funding wallet: an externally owned account paying for test setups

use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, Bytes, Eip1559TransactionRequest, TransactionReceipt, U256},
};
use eyre::eyre;
use modulor_contracts::TokenAPI;
use modulor_primitives::Wallet;
use std::sync::Arc;
use tracing::info;

/// Sends transactions from the funding key
#[derive(Clone, Debug)]
pub struct Funder {
    client: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
}

impl Funder {
    pub fn new(provider: Provider<Http>, wallet: &Wallet, chain_id: u64) -> Self {
        let signer = wallet.signer.clone().with_chain_id(chain_id);
        Self { client: Arc::new(SignerMiddleware::new(provider, signer)) }
    }

    /// Connects to `rpc_url` and reads the chain id from it
    pub async fn connect(rpc_url: &str, wallet: &Wallet) -> eyre::Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)?;
        let chain_id = provider.get_chainid().await?.as_u64();
        Ok(Self::new(provider, wallet, chain_id))
    }

    pub fn address(&self) -> Address {
        self.client.address()
    }

    /// Transfers `amount` of `token` to `to` and waits for the receipt
    pub async fn transfer_token(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> eyre::Result<TransactionReceipt> {
        let call = TokenAPI::new(token, self.client.clone()).transfer(to, amount);
        let receipt = call
            .send()
            .await?
            .await?
            .ok_or_else(|| eyre!("transfer of {amount} {token:?} to {to:?} dropped"))?;
        info!("Funded {to:?} with {amount} of {token:?} ({:?})", receipt.transaction_hash);
        Ok(receipt)
    }

    /// Sends `data` to `to`, e.g. a proxy factory deployment
    pub async fn send(&self, to: Address, data: Bytes) -> eyre::Result<TransactionReceipt> {
        let tx = Eip1559TransactionRequest::new().to(to).data(data);
        let receipt = self
            .client
            .send_transaction(tx, None)
            .await?
            .await?
            .ok_or_else(|| eyre!("transaction to {to:?} dropped"))?;
        info!("Transaction {:?} to {to:?} mined", receipt.transaction_hash);
        Ok(receipt)
    }
}
