//! Passkey signed user operations

use crate::{Endpoints, HttpSmartAccountClient, SmartAccountClient};
use async_trait::async_trait;
use ethers::providers::Middleware;
use modulor_modules::{
    ownable::ownable_validator,
    registry::trust_attesters_action,
    webauthn::{
        encode_webauthn_signature, webauthn_challenge, webauthn_mock_signature,
        webauthn_validator, WebAuthnAssertion, WebAuthnCredential, WebAuthnSignature,
    },
    Safe7579Account,
};
use modulor_primitives::{
    constants::registry::RHINESTONE_ATTESTER, Deployments, Execution, UserOperationReceipt, Wallet,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{info, warn};

/// Holder of a passkey
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Public key installed in the validator
    fn credential(&self) -> WebAuthnCredential;

    /// Assertion over the base64url `challenge`
    async fn get_assertion(&self, challenge: &str) -> eyre::Result<WebAuthnAssertion>;
}

/// Authenticator replaying an assertion recorded beforehand
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAuthenticator {
    pub credential: WebAuthnCredential,
    pub assertion: WebAuthnAssertion,
}

impl RecordedAuthenticator {
    /// Loads `{"credential": ..., "assertion": ...}` from a JSON file
    pub fn from_file(path: &Path) -> eyre::Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

#[async_trait]
impl Authenticator for RecordedAuthenticator {
    fn credential(&self) -> WebAuthnCredential {
        self.credential.clone()
    }

    async fn get_assertion(&self, challenge: &str) -> eyre::Result<WebAuthnAssertion> {
        if !self.assertion.client_data_json.contains(challenge) {
            warn!("Recorded assertion was not made for challenge {challenge}");
        }
        Ok(self.assertion.clone())
    }
}

/// Executes `calls` signed by the authenticator's passkey
pub async fn send_with_passkey<M: Middleware + 'static, A: Authenticator + ?Sized>(
    client: &SmartAccountClient<M>,
    authenticator: &A,
    calls: &[Execution],
) -> eyre::Result<UserOperationReceipt> {
    let nonce = client.nonce(client.deployments.webauthn_validator).await?;
    let uo = client.prepare_user_operation(calls, nonce, webauthn_mock_signature()).await?;

    let challenge = webauthn_challenge(client.hash(&uo).0);
    info!("Requesting an assertion for challenge {challenge}");
    let assertion = authenticator.get_assertion(&challenge).await?;
    let signature = WebAuthnSignature::try_from(assertion)?;

    let uo = uo.signature(encode_webauthn_signature(&signature));
    let hash = client.send_user_operation(&uo).await?;
    client.wait(hash).await
}

/// Installs the authenticator's passkey and has it authorize a `trustAttesters` call
pub async fn run<A: Authenticator + ?Sized>(
    endpoints: &Endpoints,
    deployments: Deployments,
    authenticator: &A,
) -> eyre::Result<UserOperationReceipt> {
    let owner = Wallet::random();
    let account = Safe7579Account::new(owner.address(), &deployments).with_validator(
        ownable_validator(deployments.ownable_validator, &[owner.address()], 1)?,
    );
    let client = HttpSmartAccountClient::connect(endpoints, deployments, account).await?;

    let credential = authenticator.credential();
    let validator = webauthn_validator(client.deployments.webauthn_validator, &credential);
    client.install_module(&validator, &owner).await?;

    let action =
        trust_attesters_action(client.deployments.registry, 1, &[RHINESTONE_ATTESTER.parse()?]);
    send_with_passkey(&client, authenticator, &[action]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::{Bytes, U256};

    fn recorded() -> RecordedAuthenticator {
        RecordedAuthenticator {
            credential: WebAuthnCredential {
                pub_key_x: U256::from(1),
                pub_key_y: U256::from(2),
                authenticator_id: "hello".into(),
            },
            assertion: WebAuthnAssertion {
                authenticator_data: Bytes::from(vec![0x49, 0x96]),
                client_data_json: r#"{"type":"webauthn.get","challenge":"abc"}"#.into(),
                signature: Bytes::from(vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]),
            },
        }
    }

    #[tokio::test]
    async fn recorded_assertion_is_replayed() {
        let authenticator = recorded();
        let assertion = authenticator.get_assertion("abc").await.unwrap();
        assert_eq!(assertion, authenticator.assertion);

        // mismatching challenges only warn
        assert!(authenticator.get_assertion("other").await.is_ok());

        let signature = WebAuthnSignature::try_from(assertion).unwrap();
        assert_eq!(signature.response_type_location, 1);
        assert_eq!((signature.r, signature.s), (U256::from(1), U256::from(2)));
    }

    #[test]
    fn recorded_file_shape() {
        let json = serde_json::json!({
            "credential": {"pubKeyX": "0x1", "pubKeyY": "0x2", "authenticatorId": "hello"},
            "assertion": {
                "authenticatorData": "0x4996",
                "clientDataJson": "{\"type\":\"webauthn.get\",\"challenge\":\"abc\"}",
                "signature": "0x3006020101020102"
            }
        });
        let authenticator: RecordedAuthenticator = serde_json::from_value(json).unwrap();
        assert_eq!(authenticator, recorded());
    }
}
