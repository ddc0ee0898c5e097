//! ERC-7579 module model and the account calls that (un)install modules

use ethers::{
    abi::{encode, AbiEncode, Token},
    types::{Address, Bytes, U256},
};
use modulor_contracts::account_api::{
    InstallModuleCall, IsModuleInstalledCall, UninstallModuleCall,
};
use modulor_primitives::Execution;
use strum_macros::{Display, EnumString};

/// Head of the Safe7579 validator and executor linked lists
pub const SENTINEL: Address = ethers::types::H160([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
]);

/// Module type ids (ERC-7579)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ModuleType {
    Validator = 1,
    Executor = 2,
    Fallback = 3,
    Hook = 4,
}

impl ModuleType {
    pub fn type_id(self) -> U256 {
        U256::from(self as u8)
    }
}

/// Whether a hook runs for every call or only for a selector
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HookType {
    #[default]
    Global = 0,
    Sig = 1,
}

/// How a fallback handler is called
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallType {
    #[default]
    Call = 0x00,
    Batch = 0x01,
    Static = 0xfe,
    DelegateCall = 0xff,
}

/// A module to install on (or uninstall from) an account
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub address: Address,
    pub module_type: ModuleType,
    /// Data passed to `onInstall`
    pub init_data: Bytes,
    /// Data passed to `onUninstall`
    pub de_init_data: Bytes,
    /// Hooks only (global when absent)
    pub hook_type: Option<HookType>,
    /// Hooks and fallbacks only (zero selector when absent)
    pub selector: Option<[u8; 4]>,
    /// Fallbacks only (plain call when absent)
    pub call_type: Option<CallType>,
}

impl Module {
    pub fn new(address: Address, module_type: ModuleType, init_data: Bytes) -> Self {
        Self {
            address,
            module_type,
            init_data,
            de_init_data: Bytes::default(),
            hook_type: None,
            selector: None,
            call_type: None,
        }
    }

    pub fn validator(address: Address, init_data: Bytes) -> Self {
        Self::new(address, ModuleType::Validator, init_data)
    }

    pub fn executor(address: Address, init_data: Bytes) -> Self {
        Self::new(address, ModuleType::Executor, init_data)
    }

    pub fn hook(address: Address, init_data: Bytes) -> Self {
        Self::new(address, ModuleType::Hook, init_data)
    }

    pub fn fallback(
        address: Address,
        selector: [u8; 4],
        call_type: CallType,
        init_data: Bytes,
    ) -> Self {
        Self {
            selector: Some(selector),
            call_type: Some(call_type),
            ..Self::new(address, ModuleType::Fallback, init_data)
        }
    }

    pub fn with_hook_type(mut self, hook_type: HookType, selector: [u8; 4]) -> Self {
        self.hook_type = Some(hook_type);
        self.selector = Some(selector);
        self
    }

    pub fn with_de_init_data(mut self, de_init_data: Bytes) -> Self {
        self.de_init_data = de_init_data;
        self
    }

    fn selector_token(&self) -> Token {
        Token::FixedBytes(self.selector.unwrap_or_default().to_vec())
    }

    fn hook_type_token(&self) -> Token {
        Token::Uint(U256::from(self.hook_type.unwrap_or_default() as u8))
    }

    /// Data the Safe7579 adapter expects when installing the module
    ///
    /// Validators and executors get their init data as is. Hooks get
    /// `abi.encode(uint8 hookType, bytes4 selector, bytes initData)` and fallbacks
    /// `abi.encode(bytes4 selector, bytes1 callType, bytes initData)`.
    pub fn install_data(&self) -> Bytes {
        match self.module_type {
            ModuleType::Validator | ModuleType::Executor => self.init_data.clone(),
            ModuleType::Hook => encode(&[
                self.hook_type_token(),
                self.selector_token(),
                Token::Bytes(self.init_data.to_vec()),
            ])
            .into(),
            ModuleType::Fallback => encode(&[
                self.selector_token(),
                Token::FixedBytes(vec![self.call_type.unwrap_or_default() as u8]),
                Token::Bytes(self.init_data.to_vec()),
            ])
            .into(),
        }
    }

    /// Data the Safe7579 adapter expects when uninstalling the module
    ///
    /// Validators and executors live in linked lists, `prev` is the entry pointing to the module
    /// ([SENTINEL] for the head).
    pub fn uninstall_data(&self, prev: Address) -> Bytes {
        match self.module_type {
            ModuleType::Validator | ModuleType::Executor => {
                encode(&[Token::Address(prev), Token::Bytes(self.de_init_data.to_vec())]).into()
            }
            ModuleType::Hook => encode(&[
                self.hook_type_token(),
                self.selector_token(),
                Token::Bytes(self.de_init_data.to_vec()),
            ])
            .into(),
            ModuleType::Fallback => {
                encode(&[self.selector_token(), Token::Bytes(self.de_init_data.to_vec())]).into()
            }
        }
    }

    /// Context for `isModuleInstalled`
    pub fn installed_context(&self) -> Bytes {
        match self.module_type {
            ModuleType::Validator | ModuleType::Executor => Bytes::default(),
            ModuleType::Hook => encode(&[self.hook_type_token(), self.selector_token()]).into(),
            ModuleType::Fallback => encode(&[self.selector_token()]).into(),
        }
    }
}

/// `installModule(uint256,address,bytes)` call data
pub fn install_module_call(module: &Module) -> Bytes {
    InstallModuleCall {
        module_type_id: module.module_type.type_id(),
        module: module.address,
        init_data: module.install_data(),
    }
    .encode()
    .into()
}

/// `uninstallModule(uint256,address,bytes)` call data
pub fn uninstall_module_call(module: &Module, prev: Address) -> Bytes {
    UninstallModuleCall {
        module_type_id: module.module_type.type_id(),
        module: module.address,
        de_init_data: module.uninstall_data(prev),
    }
    .encode()
    .into()
}

/// `isModuleInstalled(uint256,address,bytes)` call data
pub fn is_module_installed_call(module: &Module) -> Bytes {
    IsModuleInstalledCall {
        module_type_id: module.module_type.type_id(),
        module: module.address,
        additional_context: module.installed_context(),
    }
    .encode()
    .into()
}

/// Self call installing the module (sent through `execute`)
pub fn install_module_action(account: Address, module: &Module) -> Execution {
    Execution::call(account, install_module_call(module))
}

/// Self call uninstalling the module (sent through `execute`)
pub fn uninstall_module_action(account: Address, module: &Module, prev: Address) -> Execution {
    Execution::call(account, uninstall_module_call(module, prev))
}
