//! Module registry

use ethers::{
    abi::AbiEncode,
    types::{Address, Bytes},
};
use modulor_contracts::registry_api::TrustAttestersCall;
use modulor_primitives::Execution;

/// `trustAttesters` call data, attesters sorted ascending as the registry requires
pub fn trust_attesters_call(threshold: u8, attesters: &[Address]) -> Bytes {
    let mut attesters = attesters.to_vec();
    attesters.sort();
    TrustAttestersCall { threshold, attesters }.encode().into()
}

/// Account call trusting `attesters` in the registry
pub fn trust_attesters_action(registry: Address, threshold: u8, attesters: &[Address]) -> Execution {
    Execution::call(registry, trust_attesters_call(threshold, attesters))
}
