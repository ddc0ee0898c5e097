//! Account abstraction (ERC-4337 / ERC-7579)-related constants

/// Entry point smart contract
pub mod entry_point {
    /// Address of the entry point smart contract
    pub const ADDRESS: &str = "0x0000000071727De22E5E9d8BAf0edAc6f37da032";
    /// Version of the entry point smart contract
    pub const VERSION: &str = "0.7.0";
}

/// Safe smart account infrastructure
pub mod safe {
    /// Safe L2 singleton (v1.4.1)
    pub const SINGLETON: &str = "0x29fcB43b46531BcA003ddC8FCB67FFE91900C762";
    /// Safe proxy factory (v1.4.1)
    pub const PROXY_FACTORY: &str = "0x4e1DCf7AD4e460CfD30791CCC4F9c8a4f820ec67";
    /// Safe7579 adapter, also used as the 4337 module and fallback handler
    pub const SAFE_7579: &str = "0x7579EE8307284F293B1927136486880611F20002";
    /// Safe7579 launchpad
    pub const LAUNCHPAD: &str = "0x7579011aB74c46090561ea277Ba79D510c6C00ff";
    /// Safe version the accounts are created with
    pub const VERSION: &str = "1.4.1";
}

/// Module registry and attesters
pub mod registry {
    pub const ADDRESS: &str = "0x000000000069E2a187AEFFb852bF3cCdC95151B2";
    pub const RHINESTONE_ATTESTER: &str = "0x000000333034E9f539ce08819E12c1b8Cb29084d";
    /// Do not use in production
    pub const MOCK_ATTESTER: &str = "0x6D0515e8E499468DCe9583626f0cA15b887f9d03";
}

/// ERC-7579 modules
pub mod modules {
    pub const OWNABLE_VALIDATOR: &str = "0x2483DA3A338895199E5e538530213157e931Bf06";
    pub const WEBAUTHN_VALIDATOR: &str = "0x2f167e55d42584f65e2e30a748f41ee75a311414";
    pub const SOCIAL_RECOVERY: &str = "0xA04D053b3C8021e8D5bF641816c42dAA75D8b597";
    pub const DEADMAN_SWITCH: &str = "0x570fA6Ce2eDcC6E4a5bCa2F2E65D8a3C3c8B5A6a";
    pub const SMART_SESSIONS: &str = "0x00000000002B0eCfbD0496EE71e01257dA0E37DE";
    pub const SUDO_POLICY: &str = "0x0000003111cD8e92337C100F22B7A9dbf8DEE301";
    pub const SCHEDULED_TRANSFERS: &str = "0xA8E374779aeE60413c974b484d6509c7E4DDb6bA";
    pub const SCHEDULED_ORDERS: &str = "0x40dc90D670C89F322fa8b9f685770296428DCb6b";
    pub const AUTO_SAVINGS: &str = "0x6AC6b7E5BDc5bD0a3B1a0B4D87E2e6cC3D0F5c1e";
}

/// Orchestrator (intents) modules and settlement
pub mod orchestrator {
    /// Default orchestrator API endpoint
    pub const URL: &str = "https://orchestrator.rhinestone.wtf";
    pub const SAME_CHAIN_MODULE: &str = "0x000000000043ff16d5776c7F0f65Ec485C17Ca04";
    pub const TARGET_MODULE: &str = "0x0000000000E5a37279A001301A837a91b5de1D5E";
    pub const HOOK: &str = "0x0000000000f6Ed8Be424d673c63eeFF8b9267420";
    /// Attester vouching for the intent modules (test deployments)
    pub const MOCK_ATTESTER: &str = "0x6D0515e8E499468DCe9583626f0cA15b887f9d03";
    /// Verifying contract of the signed order bundles
    pub const THE_COMPACT: &str = "0x00000000000018DF021Ff2467dF97ff846E09f48";
    /// Selector routed to the target module through the fallback handler
    pub const TARGET_FALLBACK_SELECTOR: [u8; 4] = [0x3a, 0x5b, 0xe8, 0xcb];
    /// Interval between two bundle status checks (in milliseconds)
    pub const STATUS_POLL_INTERVAL: u64 = 2000;
}

/// Automations service
pub mod automations {
    /// Default automations API endpoint
    pub const URL: &str = "https://automations.rhinestone.wtf";
    /// Account type reported to the automations service
    pub const ACCOUNT_TYPE: &str = "SAFE";
    /// Key the automations service signs session operations with
    pub const SESSION_KEY: &str = "0x2DC2fb2f4F11DeE1d6a2054ffCBf102D09b62bE2";
    /// Cron expression running a time based automation every minute
    pub const EVERY_MINUTE: &str = "* * * * *";
    pub const SCHEDULED_ORDERS_BUILDER_URL: &str =
        "https://calldata-builder-example.vercel.app/scheduled-orders/";
    pub const AUTO_SAVINGS_BUILDER_URL: &str =
        "https://calldata-builder-example.vercel.app/auto-savings/";
}

/// Mintable test tokens and vaults (Sepolia)
pub mod testnet {
    pub const MOCK_USDC: &str = "0x8034e69FAFEd6588cc36ff3400AFE5c049a3B92E";
    pub const MOCK_USDT: &str = "0x3520ef0E951125dEfA8476946d6D3153fd07b346";
    /// WETH vault
    pub const SAVINGS_VAULT: &str = "0xd921f0dF3B56899F26F658809aaa161cdfC2359F";
    pub const MOCK_TOKEN_DECIMALS: u32 = 6;
    /// Recipient of the scheduled transfers
    pub const TRANSFER_RECIPIENT: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
    /// Target of the zero signatures session
    pub const SESSION_TARGET: &str = "0xa564cB165815937967a7d018B7F34B907B52fcFd";
}

/// Bundler
pub mod bundler {
    /// Default interval between two receipt checks (in milliseconds)
    pub const RECEIPT_POLL_INTERVAL: u64 = 1000;
    /// Default time to wait for a receipt (in seconds)
    pub const RECEIPT_TIMEOUT: u64 = 120;
    /// Default time to wait for the bundler or paymaster to come up (in seconds)
    pub const READY_TIMEOUT: u64 = 60;
}

/// Local development endpoints
pub mod local {
    pub const BUNDLER_URL: &str = "http://localhost:4337";
    pub const RPC_URL: &str = "http://localhost:8545";
    pub const PAYMASTER_URL: &str = "http://localhost:3000";
}

/// Supported chains
pub mod supported_chains {
    use alloy_chains::NamedChain;

    pub const CHAINS: [NamedChain; 10] = [
        NamedChain::Dev,
        NamedChain::Mainnet,
        NamedChain::Sepolia,
        NamedChain::Base,
        NamedChain::BaseSepolia,
        NamedChain::Optimism,
        NamedChain::OptimismSepolia,
        NamedChain::Arbitrum,
        NamedChain::ArbitrumSepolia,
        NamedChain::Polygon,
    ];
}
