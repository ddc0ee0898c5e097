//! Deadman switch: a nominee takes over once the account stays inactive for the timeout

use crate::{module::Module, ownable::MOCK_SIGNATURE, ModuleError};
use ethers::types::{Address, Bytes};

/// Largest uint48
pub const MAX_UINT48: u64 = (1 << 48) - 1;

/// Validator side of the switch
///
/// Install data is `nominee ‖ uint48 timeout` (packed), or empty when the switch is already
/// configured for the account (the hook and the validator share the configuration).
pub fn deadman_switch(
    address: Address,
    nominee: Address,
    timeout: u64,
    initialized: bool,
) -> Result<Module, ModuleError> {
    if timeout > MAX_UINT48 {
        return Err(ModuleError::Overflow { field: "timeout", bits: 48 });
    }

    let init_data = if initialized {
        Bytes::default()
    } else {
        [nominee.as_bytes(), &timeout.to_be_bytes()[2..]].concat().into()
    };
    Ok(Module::validator(address, init_data))
}

/// Hook side of the switch, refreshing the last access on every execution
pub fn deadman_switch_hook(address: Address) -> Module {
    Module::hook(address, Bytes::default())
}

pub fn deadman_switch_mock_signature() -> Bytes {
    MOCK_SIGNATURE.to_vec().into()
}
