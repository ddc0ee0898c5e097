use ethers::{
    contract::{abigen, EthCall},
    types::Selector,
};
use lazy_static::lazy_static;
use std::collections::HashMap;

abigen!(
    EntryPointAPI,
    r#"[
        struct PackedUserOperation {address sender;uint256 nonce;bytes initCode;bytes callData;bytes32 accountGasLimits;uint256 preVerificationGas;bytes32 gasFees;bytes paymasterAndData;bytes signature;}
        function balanceOf(address account) external view returns (uint256)
        function depositTo(address account) external payable
        function getSenderAddress(bytes memory initCode) external
        function getUserOpHash(PackedUserOperation calldata userOp) external view returns (bytes32)
        function getNonce(address sender, uint192 key) public view returns (uint256 nonce)
        error FailedOp(uint256 opIndex, string reason)
        error FailedOpWithRevert(uint256 opIndex, string reason, bytes inner)
        error SenderAddressResult(address sender)
        event UserOperationRevertReason(bytes32 indexed userOpHash,address indexed sender,uint256 nonce,bytes revertReason)
        event UserOperationEvent(bytes32 indexed userOpHash,address indexed sender,address indexed paymaster,uint256 nonce,bool success,uint256 actualGasCost,uint256 actualGasUsed)
    ]"#;

    AccountAPI,
    r#"[
        function execute(bytes32 mode, bytes calldata executionCalldata) external payable
        function installModule(uint256 moduleTypeId, address module, bytes calldata initData) external payable
        function uninstallModule(uint256 moduleTypeId, address module, bytes calldata deInitData) external payable
        function isModuleInstalled(uint256 moduleTypeId, address module, bytes calldata additionalContext) external view returns (bool)
        function accountId() external view returns (string memory)
        function eip712Domain() external view returns (bytes1 fields, string memory name, string memory version, uint256 chainId, address verifyingContract, bytes32 salt, uint256[] memory extensions)
        event ModuleInstalled(uint256 moduleTypeId, address module)
        event ModuleUninstalled(uint256 moduleTypeId, address module)
    ]"#;

    SafeAPI,
    r#"[
        function setup(address[] calldata owners,uint256 threshold,address to,bytes calldata data,address fallbackHandler,address paymentToken,uint256 payment,address paymentReceiver) external
        function getOwners() external view returns (address[] memory)
    ]"#;

    LaunchpadAPI,
    r#"[
        struct ModuleInit {address module;bytes initData;}
        function addSafe7579(address adapter,ModuleInit[] calldata validators,ModuleInit[] calldata executors,ModuleInit[] calldata fallbacks,ModuleInit[] calldata hooks,address[] calldata attesters,uint8 threshold) external
    ]"#;

    ProxyFactoryAPI,
    r#"[
        function createProxyWithNonce(address singleton,bytes calldata initializer,uint256 saltNonce) external payable returns (address)
    ]"#;

    RegistryAPI,
    r#"[
        function trustAttesters(uint8 threshold, address[] calldata attesters) external
    ]"#;

    TokenAPI,
    r#"[
        function transfer(address to, uint256 amount) external returns (bool)
        function approve(address spender, uint256 amount) external returns (bool)
        function balanceOf(address account) external view returns (uint256)
        function decimals() external view returns (uint8)
        function mint(address to, uint256 amount) external
    ]"#;

    OwnableValidatorAPI,
    r#"[
        function setThreshold(uint256 threshold) external
        function addOwner(address owner) external
        function getOwners(address account) external view returns (address[] memory)
        function threshold(address account) external view returns (uint256)
    ]"#;

    SmartSessionsAPI,
    r#"[
        struct PolicyData {address policy;bytes initData;}
        struct ActionData {bytes4 actionTargetSelector;address actionTarget;PolicyData[] actionPolicies;}
        struct Erc7739Context {bytes32 appDomainSeparator;string[] contentName;}
        struct Erc7739Data {Erc7739Context[] allowedERC7739Content;PolicyData[] erc1271Policies;}
        struct Session {address sessionValidator;bytes sessionValidatorInitData;bytes32 salt;PolicyData[] userOpPolicies;Erc7739Data erc7739Policies;ActionData[] actions;bool permitERC4337Paymaster;}
        function getSessionDigest(bytes32 permissionId, address account, Session memory data, uint8 mode) external view returns (bytes32)
        function getNonce(bytes32 permissionId, address account) external view returns (uint256)
        function isPermissionEnabled(bytes32 permissionId, address account) external view returns (bool)
        function isERC7739ContentEnabled(address account, bytes32 permissionId, bytes32 appDomainSeparator, string calldata content) external view returns (bool)
    ]"#;

    DeadmanSwitchAPI,
    r#"[
        function isInitialized(address smartAccount) external view returns (bool)
        function config(address account) external view returns (uint48 lastAccess, uint48 timeout, address nominee)
    ]"#;

    ScheduledTransfersAPI,
    r#"[
        function executeOrder(uint256 jobId) external
    ]"#;

    ScheduledOrdersAPI,
    r#"[
        function executeOrder(uint256 jobId, uint160 sqrtPriceLimitX96, uint256 amountOutMinimum, uint24 fee) external
    ]"#;

    AutoSavingsAPI,
    r#"[
        function autoSave(address token, uint256 amountReceived, uint160 sqrtPriceLimitX96, uint256 amountOutMinimum, uint24 fee) external
    ]"#;
);

lazy_static! {
    /// Names of the functions the workflows call, by selector (used when logging call data)
    pub static ref SELECTORS_NAMES: HashMap<Selector, String> = {
        let mut map = HashMap::new();
        // account
        map.insert(account_api::ExecuteCall::selector(), account_api::ExecuteCall::function_name().into());
        map.insert(account_api::InstallModuleCall::selector(), account_api::InstallModuleCall::function_name().into());
        map.insert(account_api::UninstallModuleCall::selector(), account_api::UninstallModuleCall::function_name().into());
        // deployment
        map.insert(proxy_factory_api::CreateProxyWithNonceCall::selector(), proxy_factory_api::CreateProxyWithNonceCall::function_name().into());
        // modules
        map.insert(registry_api::TrustAttestersCall::selector(), registry_api::TrustAttestersCall::function_name().into());
        map.insert(ownable_validator_api::SetThresholdCall::selector(), ownable_validator_api::SetThresholdCall::function_name().into());
        map.insert(scheduled_transfers_api::ExecuteOrderCall::selector(), scheduled_transfers_api::ExecuteOrderCall::function_name().into());
        map.insert(scheduled_orders_api::ExecuteOrderCall::selector(), scheduled_orders_api::ExecuteOrderCall::function_name().into());
        map.insert(auto_savings_api::AutoSaveCall::selector(), auto_savings_api::AutoSaveCall::function_name().into());
        // tokens
        map.insert(token_api::TransferCall::selector(), token_api::TransferCall::function_name().into());
        map.insert(token_api::MintCall::selector(), token_api::MintCall::function_name().into());

        map
    };
}

/// Name of the called function, if it is one the workflows know about
pub fn function_name(call_data: &[u8]) -> Option<&'static str> {
    let selector: Selector = call_data.get(0..4)?.try_into().ok()?;
    SELECTORS_NAMES.get(&selector).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors() {
        assert_eq!(account_api::ExecuteCall::selector(), [0xe9, 0xae, 0x5c, 0x53]);
        assert_eq!(account_api::InstallModuleCall::selector(), [0x95, 0x17, 0xe2, 0x9f]);
        assert_eq!(
            proxy_factory_api::CreateProxyWithNonceCall::selector(),
            [0x16, 0x88, 0xf0, 0xb9]
        );
        assert_eq!(
            launchpad_api::AddSafe7579Call::selector(),
            [0xd7, 0x83, 0x43, 0xd9]
        );
        assert_eq!(scheduled_orders_api::ExecuteOrderCall::selector(), [0xc3, 0x2d, 0xa5, 0x5d]);
        assert_eq!(account_api::Eip712DomainCall::selector(), [0x84, 0xb0, 0x19, 0x6e]);
        assert_eq!(
            smart_sessions_api::GetSessionDigestCall::selector(),
            [0x05, 0xde, 0xfb, 0xa6]
        );
    }

    #[test]
    fn known_function_names() {
        assert_eq!(function_name(&[0xa9, 0x05, 0x9c, 0xbb, 0x00]), Some("transfer"));
        assert_eq!(function_name(&[0x94, 0xf6, 0x11, 0x34]), Some("executeOrder"));
        assert_eq!(function_name(&[0x00, 0x01]), None);
        assert_eq!(function_name(&[0xde, 0xad, 0xbe, 0xef]), None);
    }
}
