//! Modules an account needs to take part in orchestrator intents

use crate::{
    account::Safe7579Account,
    module::{CallType, Module},
};
use ethers::{
    abi::{encode, Token},
    types::Bytes,
};
use modulor_primitives::{constants::orchestrator::TARGET_FALLBACK_SELECTOR, Deployments};

/// Executors settling intents on the origin and target chains; the hook also executes
pub fn intent_executors(deployments: &Deployments) -> Vec<Module> {
    [deployments.same_chain_module, deployments.target_module, deployments.intent_hook]
        .into_iter()
        .map(|address| Module::executor(address, Bytes::default()))
        .collect()
}

/// Fallback routing fills to the target module
pub fn intent_fallback(deployments: &Deployments) -> Module {
    Module::fallback(
        deployments.target_module,
        TARGET_FALLBACK_SELECTOR,
        CallType::Call,
        Bytes::default(),
    )
}

/// Global hook, enabled on install
pub fn intent_hook(deployments: &Deployments) -> Module {
    Module::hook(deployments.intent_hook, encode(&[Token::Bool(true)]).into())
}

impl Safe7579Account {
    /// Adds the intent executors, fallback and hook, and trusts the intent attester
    pub fn with_intent_modules(mut self, deployments: &Deployments) -> Self {
        self.executors.extend(intent_executors(deployments));
        self.fallbacks.push(intent_fallback(deployments));
        self.hooks.push(intent_hook(deployments));
        if !self.attesters.contains(&deployments.intent_attester) {
            self.attesters.push(deployments.intent_attester);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Address;
    use pretty_assertions::assert_eq;

    #[test]
    fn fallback_and_hook_data() {
        let deployments = Deployments::default();

        let fallback = intent_fallback(&deployments).install_data();
        assert_eq!(&fallback[..4], &TARGET_FALLBACK_SELECTOR);
        assert_eq!(&fallback[4..64], &[0u8; 60]);
        assert_eq!(fallback[95], 0x60);
        assert_eq!(fallback.len(), 128);

        let hook = intent_hook(&deployments).install_data();
        // hook type, selector, offset, length, abi.encode(true)
        assert_eq!(hook.len(), 32 * 5);
        assert_eq!(hook[127], 32);
        assert_eq!(hook[159], 1);
    }

    #[test]
    fn account_with_intent_modules() {
        let deployments = Deployments::default();
        let account = Safe7579Account::new(Address::repeat_byte(1), &deployments)
            .with_intent_modules(&deployments);
        assert_eq!(account.executors.len(), 3);
        assert_eq!(account.fallbacks.len(), 1);
        assert_eq!(account.hooks.len(), 1);
        assert_eq!(
            account.attesters.iter().filter(|a| **a == deployments.intent_attester).count(),
            1
        );
        assert!(account.init_code(&deployments).is_ok());
    }
}
