//! Safe smart account with the ERC-7579 adapter, deployed through the Safe7579 launchpad

use crate::{module::Module, ModuleError};
use ethers::{
    abi::AbiEncode,
    types::{Address, Bytes, U256},
};
use modulor_contracts::{
    launchpad_api::{AddSafe7579Call, ModuleInit},
    proxy_factory_api::CreateProxyWithNonceCall,
    safe_api::SetupCall,
};
use modulor_primitives::{pack_factory_data, Deployments};

/// Counterfactual Safe7579 account
///
/// The account is created by the Safe proxy factory. Its `setup` delegates to the launchpad which
/// enables the Safe7579 adapter (as module and fallback handler), installs the initial modules and
/// trusts the attesters in the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Safe7579Account {
    pub owners: Vec<Address>,
    pub threshold: u64,
    pub validators: Vec<Module>,
    pub executors: Vec<Module>,
    pub fallbacks: Vec<Module>,
    pub hooks: Vec<Module>,
    pub attesters: Vec<Address>,
    pub attesters_threshold: u8,
    pub salt_nonce: U256,
}

fn module_inits(modules: &[Module]) -> Vec<ModuleInit> {
    modules
        .iter()
        .map(|module| ModuleInit { module: module.address, init_data: module.install_data() })
        .collect()
}

impl Safe7579Account {
    /// Account with a single owner and the attesters configured in the deployments
    pub fn new(owner: Address, deployments: &Deployments) -> Self {
        Self {
            owners: vec![owner],
            threshold: 1,
            validators: vec![],
            executors: vec![],
            fallbacks: vec![],
            hooks: vec![],
            attesters: deployments.attesters.clone(),
            attesters_threshold: deployments.attesters_threshold,
            salt_nonce: U256::zero(),
        }
    }

    pub fn with_validator(mut self, module: Module) -> Self {
        self.validators.push(module);
        self
    }

    pub fn with_executor(mut self, module: Module) -> Self {
        self.executors.push(module);
        self
    }

    pub fn with_fallback(mut self, module: Module) -> Self {
        self.fallbacks.push(module);
        self
    }

    pub fn with_hook(mut self, module: Module) -> Self {
        self.hooks.push(module);
        self
    }

    pub fn with_salt_nonce(mut self, salt_nonce: U256) -> Self {
        self.salt_nonce = salt_nonce;
        self
    }

    /// Safe `setup` call data, delegating to the launchpad's `addSafe7579`
    pub fn initializer(&self, deployments: &Deployments) -> Result<Bytes, ModuleError> {
        if self.threshold == 0 || self.threshold as usize > self.owners.len() {
            return Err(ModuleError::InvalidThreshold {
                threshold: self.threshold,
                signers: self.owners.len(),
            });
        }

        let mut attesters = self.attesters.clone();
        attesters.sort();

        let add_safe_7579 = AddSafe7579Call {
            adapter: deployments.safe_7579,
            validators: module_inits(&self.validators),
            executors: module_inits(&self.executors),
            fallbacks: module_inits(&self.fallbacks),
            hooks: module_inits(&self.hooks),
            attesters,
            threshold: self.attesters_threshold,
        };

        Ok(SetupCall {
            owners: self.owners.clone(),
            threshold: U256::from(self.threshold),
            to: deployments.safe_7579_launchpad,
            data: add_safe_7579.encode().into(),
            fallback_handler: deployments.safe_7579,
            payment_token: Address::zero(),
            payment: U256::zero(),
            payment_receiver: Address::zero(),
        }
        .encode()
        .into())
    }

    /// `createProxyWithNonce` call data for the proxy factory
    pub fn factory_data(&self, deployments: &Deployments) -> Result<Bytes, ModuleError> {
        Ok(CreateProxyWithNonceCall {
            singleton: deployments.safe_singleton,
            initializer: self.initializer(deployments)?,
            salt_nonce: self.salt_nonce,
        }
        .encode()
        .into())
    }

    /// `factory ‖ factoryData`
    pub fn init_code(&self, deployments: &Deployments) -> Result<Bytes, ModuleError> {
        Ok(pack_factory_data(deployments.safe_proxy_factory, self.factory_data(deployments)?)
            .into())
    }
}
