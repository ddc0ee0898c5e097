//! Addresses of the contracts the workflows talk to
//!
//! Every address has a compiled-in default (see [constants](crate::constants)). A JSON file can
//! override any subset of them, which is how the workflows are pointed at local or freshly
//! redeployed infrastructure.

use crate::constants::{entry_point, modules, orchestrator, registry, safe};
use ethers::types::{Address, H160};
use expanded_pathbuf::ExpandedPathBuf;
use serde::{Deserialize, Serialize};
use std::fs;

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("address constants are hex"),
    }
}

/// Decodes a `0x` prefixed address constant, only ever evaluated in `const` items so a malformed
/// constant fails the build
const fn address(value: &str) -> Address {
    let bytes = value.as_bytes();
    assert!(bytes.len() == 42 && bytes[0] == b'0' && bytes[1] == b'x');
    let mut out = [0u8; 20];
    let mut i = 0;
    while i < 20 {
        out[i] = (nibble(bytes[2 + 2 * i]) << 4) | nibble(bytes[3 + 2 * i]);
        i += 1;
    }
    H160(out)
}

const ENTRY_POINT: Address = address(entry_point::ADDRESS);
const SAFE_SINGLETON: Address = address(safe::SINGLETON);
const SAFE_PROXY_FACTORY: Address = address(safe::PROXY_FACTORY);
const SAFE_7579: Address = address(safe::SAFE_7579);
const SAFE_7579_LAUNCHPAD: Address = address(safe::LAUNCHPAD);
const REGISTRY: Address = address(registry::ADDRESS);
const RHINESTONE_ATTESTER: Address = address(registry::RHINESTONE_ATTESTER);
const MOCK_ATTESTER: Address = address(registry::MOCK_ATTESTER);
const OWNABLE_VALIDATOR: Address = address(modules::OWNABLE_VALIDATOR);
const WEBAUTHN_VALIDATOR: Address = address(modules::WEBAUTHN_VALIDATOR);
const SOCIAL_RECOVERY: Address = address(modules::SOCIAL_RECOVERY);
const DEADMAN_SWITCH: Address = address(modules::DEADMAN_SWITCH);
const SMART_SESSIONS: Address = address(modules::SMART_SESSIONS);
const SUDO_POLICY: Address = address(modules::SUDO_POLICY);
const SCHEDULED_TRANSFERS: Address = address(modules::SCHEDULED_TRANSFERS);
const SCHEDULED_ORDERS: Address = address(modules::SCHEDULED_ORDERS);
const AUTO_SAVINGS: Address = address(modules::AUTO_SAVINGS);
const SAME_CHAIN_MODULE: Address = address(orchestrator::SAME_CHAIN_MODULE);
const TARGET_MODULE: Address = address(orchestrator::TARGET_MODULE);
const INTENT_HOOK: Address = address(orchestrator::HOOK);
const INTENT_ATTESTER: Address = address(orchestrator::MOCK_ATTESTER);
const THE_COMPACT: Address = address(orchestrator::THE_COMPACT);

/// Contract deployments
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deployments {
    pub entry_point: Address,
    pub safe_singleton: Address,
    pub safe_proxy_factory: Address,
    pub safe_7579: Address,
    pub safe_7579_launchpad: Address,
    pub registry: Address,
    pub attesters: Vec<Address>,
    pub attesters_threshold: u8,
    pub ownable_validator: Address,
    pub webauthn_validator: Address,
    pub social_recovery: Address,
    pub deadman_switch: Address,
    pub smart_sessions: Address,
    pub sudo_policy: Address,
    pub scheduled_transfers: Address,
    pub scheduled_orders: Address,
    pub auto_savings: Address,
    pub same_chain_module: Address,
    pub target_module: Address,
    pub intent_hook: Address,
    pub intent_attester: Address,
    pub the_compact: Address,
}

impl Default for Deployments {
    fn default() -> Self {
        Self {
            entry_point: ENTRY_POINT,
            safe_singleton: SAFE_SINGLETON,
            safe_proxy_factory: SAFE_PROXY_FACTORY,
            safe_7579: SAFE_7579,
            safe_7579_launchpad: SAFE_7579_LAUNCHPAD,
            registry: REGISTRY,
            attesters: vec![RHINESTONE_ATTESTER, MOCK_ATTESTER],
            attesters_threshold: 1,
            ownable_validator: OWNABLE_VALIDATOR,
            webauthn_validator: WEBAUTHN_VALIDATOR,
            social_recovery: SOCIAL_RECOVERY,
            deadman_switch: DEADMAN_SWITCH,
            smart_sessions: SMART_SESSIONS,
            sudo_policy: SUDO_POLICY,
            scheduled_transfers: SCHEDULED_TRANSFERS,
            scheduled_orders: SCHEDULED_ORDERS,
            auto_savings: AUTO_SAVINGS,
            same_chain_module: SAME_CHAIN_MODULE,
            target_module: TARGET_MODULE,
            intent_hook: INTENT_HOOK,
            intent_attester: INTENT_ATTESTER,
            the_compact: THE_COMPACT,
        }
    }
}

impl Deployments {
    /// Loads deployments from a JSON file, keys missing from the file keep their defaults
    ///
    /// # Arguments
    /// * `path` - The path to the JSON file
    ///
    /// # Returns
    /// * `Self` - The deployments
    pub fn from_file(path: ExpandedPathBuf) -> eyre::Result<Self> {
        let content = fs::read_to_string(path.to_path_buf())?;
        let deployments = serde_json::from_str(&content)?;
        Ok(deployments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_distinct_infrastructure() {
        let deployments = Deployments::default();
        assert_ne!(deployments.safe_7579, deployments.safe_7579_launchpad);
        assert_eq!(deployments.attesters.len(), 2);
        assert_eq!(deployments.attesters_threshold, 1);
    }

    #[test]
    fn compiled_in_addresses_match_their_constants() {
        let deployments = Deployments::default();
        let pairs = [
            (deployments.entry_point, entry_point::ADDRESS),
            (deployments.safe_proxy_factory, safe::PROXY_FACTORY),
            (deployments.webauthn_validator, modules::WEBAUTHN_VALIDATOR),
            (deployments.smart_sessions, modules::SMART_SESSIONS),
            (deployments.the_compact, orchestrator::THE_COMPACT),
            (deployments.attesters[1], registry::MOCK_ATTESTER),
        ];
        for (decoded, constant) in pairs {
            assert_eq!(decoded, constant.parse::<Address>().unwrap());
        }
    }

    #[test]
    fn file_overrides_subset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ownableValidator": "0x1111111111111111111111111111111111111111", "attestersThreshold": 2}}"#
        )
        .unwrap();

        let deployments =
            Deployments::from_file(ExpandedPathBuf(file.path().to_path_buf())).unwrap();
        assert_eq!(
            deployments.ownable_validator,
            "0x1111111111111111111111111111111111111111".parse::<Address>().unwrap()
        );
        assert_eq!(deployments.attesters_threshold, 2);
        assert_eq!(deployments.entry_point, Deployments::default().entry_point);
    }
}
