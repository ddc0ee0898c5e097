//! A `Wallet` is a wrapper around an ethers local signer used to sign user operation hashes
use crate::{UserOperation, UserOperationHash};
use ethers::{
    prelude::{k256::ecdsa::SigningKey, rand},
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer},
    types::{Address, Bytes, H256},
};
use expanded_pathbuf::ExpandedPathBuf;

const DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Wrapper around ethers wallet
#[derive(Clone, Debug)]
pub struct Wallet {
    /// Signing key of the wallet
    pub signer: ethers::signers::Wallet<SigningKey>,
}

impl From<LocalWallet> for Wallet {
    fn from(signer: LocalWallet) -> Self {
        Self { signer }
    }
}

impl Wallet {
    /// Builds a `Wallet` from a randomly generated key
    pub fn random() -> Self {
        Self { signer: LocalWallet::new(&mut rand::thread_rng()) }
    }

    /// Create a new wallet from a hex encoded private key (with or without `0x` prefix)
    ///
    /// # Arguments
    /// * `key` - The private key
    ///
    /// # Returns
    /// * `Self` - A new `Wallet` instance
    pub fn from_private_key(key: &str) -> eyre::Result<Self> {
        let signer = key.trim().trim_start_matches("0x").parse::<LocalWallet>()?;
        Ok(Self { signer })
    }

    /// Create a new wallet from the given file containing the mnemonic phrase
    ///
    /// # Arguments
    /// * `path` - The path to the file where the mnemonic phrase is stored
    ///
    /// # Returns
    /// * `Self` - A new `Wallet` instance
    pub fn from_file(path: ExpandedPathBuf) -> eyre::Result<Self> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(path.to_path_buf())
            .derivation_path(DERIVATION_PATH)?
            .build()?;
        Ok(Self { signer })
    }

    /// Create a new wallet from the given mnemonic phrase
    ///
    /// # Arguments
    /// * `phrase` - The mnemonic phrase
    ///
    /// # Returns
    /// * `Self` - A new `Wallet` instance
    pub fn from_phrase(phrase: &str) -> eyre::Result<Self> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path(DERIVATION_PATH)?
            .build()?;
        Ok(Self { signer })
    }

    /// Address of the signer
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs a 32-byte hash as an EIP-191 personal message over the raw bytes
    ///
    /// Returns the 65-byte `r ‖ s ‖ v` signature with `v` in {27, 28}.
    pub async fn sign_hash(&self, hash: H256) -> eyre::Result<Bytes> {
        let sig = self.signer.sign_message(hash.as_bytes()).await?;
        Ok(sig.to_vec().into())
    }

    /// Signs the user operation
    ///
    /// # Arguments
    /// * `uo` - The [UserOperation](UserOperation) to be signed
    /// * `ep` - The entry point contract address
    /// * `chain_id` - The chain id of the blockchain network to be used
    ///
    /// # Returns
    /// * `UserOperation` - The signed [UserOperation](UserOperation)
    pub async fn sign_user_operation(
        &self,
        uo: &UserOperation,
        ep: &Address,
        chain_id: u64,
    ) -> eyre::Result<UserOperation> {
        let hash: UserOperationHash = uo.hash(ep, chain_id);
        let signature = self.sign_hash(hash.0).await?;
        Ok(uo.clone().signature(signature))
    }
}
