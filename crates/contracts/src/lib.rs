//! Contract interfaces of the entry point, the ERC-7579 Safe account and the modules

pub mod entry_point;
mod error;
mod gen;

pub use entry_point::EntryPoint;
pub use error::{decode_revert_error, decode_revert_string, ContractsError};
pub use gen::{
    account_api, auto_savings_api, deadman_switch_api, entry_point_api, function_name,
    launchpad_api, ownable_validator_api, proxy_factory_api, registry_api, safe_api,
    scheduled_orders_api, scheduled_transfers_api, smart_sessions_api, token_api, AccountAPI,
    AutoSavingsAPI, DeadmanSwitchAPI, EntryPointAPI, LaunchpadAPI, OwnableValidatorAPI,
    ProxyFactoryAPI, RegistryAPI, SafeAPI, ScheduledOrdersAPI, ScheduledTransfersAPI,
    SmartSessionsAPI, TokenAPI, UserOperationEventFilter, SELECTORS_NAMES,
};
