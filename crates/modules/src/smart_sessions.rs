//! Smart sessions: scoped signing permissions delegated to session keys
//!
//! A [Session] pairs a session validator (who may sign) with the policies that bound what the
//! session may do. The smart sessions module is installed as a validator and routes each user
//! operation to a session by its permission id, carried in the signature.

use crate::{module::Module, zip::flz_compress, ModuleError};
use ethers::{
    abi::{encode, Token, Tokenizable},
    contract::EthAbiType,
    types::{transaction::eip712::EIP712Domain, Address, Bytes, H160, H256},
    utils::keccak256,
};
use strum_macros::{Display, EnumString};

/// Action target matching any contract
pub const FALLBACK_TARGET: Address = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01,
]);
/// Action selector matching any function
pub const FALLBACK_SELECTOR: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

const MULTICHAIN_DOMAIN_NAME: &str = "SmartSession";
const MULTICHAIN_DOMAIN_VERSION: &str = "1";

const ACTION_DATA_TYPE: &str =
    "ActionData(bytes4 actionTargetSelector,address actionTarget,PolicyData[] actionPolicies)";
const CHAIN_SESSION_TYPE: &str = "ChainSession(uint64 chainId,SignedSession session)";
const ERC7739_CONTEXT_TYPE: &str =
    "ERC7739Context(bytes32 appDomainSeparator,string[] contentName)";
const ERC7739_DATA_TYPE: &str =
    "ERC7739Data(ERC7739Context[] allowedERC7739Content,PolicyData[] erc1271Policies)";
const MULTICHAIN_SESSION_TYPE: &str = "MultiChainSession(ChainSession[] sessionsAndChainIds)";
const POLICY_DATA_TYPE: &str = "PolicyData(address policy,bytes initData)";
const SIGNED_PERMISSIONS_TYPE: &str = "SignedPermissions(bool permitGenericPolicy,bool permitAdminAccess,bool ignoreSecurityAttestations,bool permitERC4337Paymaster,PolicyData[] userOpPolicies,ERC7739Data erc7739Policies,ActionData[] actions)";
const SIGNED_SESSION_TYPE: &str = "SignedSession(address account,SignedPermissions permissions,address sessionValidator,bytes sessionValidatorInitData,bytes32 salt,address smartSession,uint256 nonce)";

/// How the smart sessions module treats the signature
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SmartSessionMode {
    /// The session is already enabled on the account
    #[default]
    Use = 0x00,
    Enable = 0x01,
    UnsafeEnable = 0x02,
}

/// A policy contract and the data it is initialised with for the session
#[derive(Clone, Debug, Default, PartialEq, Eq, EthAbiType)]
pub struct PolicyData {
    pub policy: Address,
    pub init_data: Bytes,
}

/// A call the session may make
#[derive(Clone, Debug, Default, PartialEq, Eq, EthAbiType)]
pub struct ActionData {
    pub action_target_selector: [u8; 4],
    pub action_target: Address,
    pub action_policies: Vec<PolicyData>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EthAbiType)]
pub struct Erc7739Context {
    pub app_domain_separator: [u8; 32],
    pub content_name: Vec<String>,
}

/// ERC-1271 signing permissions of the session
#[derive(Clone, Debug, Default, PartialEq, Eq, EthAbiType)]
pub struct Erc7739Data {
    pub allowed_erc7739_content: Vec<Erc7739Context>,
    pub erc1271_policies: Vec<PolicyData>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EthAbiType)]
pub struct Session {
    pub session_validator: Address,
    pub session_validator_init_data: Bytes,
    pub salt: [u8; 32],
    pub user_op_policies: Vec<PolicyData>,
    pub erc7739_policies: Erc7739Data,
    pub actions: Vec<ActionData>,
    pub permit_erc4337_paymaster: bool,
}

impl Session {
    pub fn new(session_validator: Address, session_validator_init_data: Bytes) -> Self {
        Self { session_validator, session_validator_init_data, ..Default::default() }
    }

    pub fn with_salt(mut self, salt: [u8; 32]) -> Self {
        self.salt = salt;
        self
    }

    pub fn with_user_op_policy(mut self, policy: PolicyData) -> Self {
        self.user_op_policies.push(policy);
        self
    }

    pub fn with_action(mut self, action: ActionData) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_paymaster_permitted(mut self, permitted: bool) -> Self {
        self.permit_erc4337_paymaster = permitted;
        self
    }

    /// Lets the session sign ERC-7739 typed data of `content_name` for the app domain
    pub fn with_erc7739_content(mut self, app_domain_separator: H256, content_name: &str) -> Self {
        self.erc7739_policies.allowed_erc7739_content.push(Erc7739Context {
            app_domain_separator: app_domain_separator.0,
            content_name: vec![content_name.into()],
        });
        self
    }

    pub fn with_erc1271_policy(mut self, policy: PolicyData) -> Self {
        self.erc7739_policies.erc1271_policies.push(policy);
        self
    }
}

/// Session digest the smart sessions module computes on one chain
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EthAbiType)]
pub struct ChainDigest {
    pub chain_id: u64,
    pub session_digest: H256,
}

/// Session enabled by the user operation that first uses it
///
/// One owner signature over the [permission_enable_hash] of every chain digest enables the
/// session on all of those chains.
#[derive(Clone, Debug, Default, PartialEq, Eq, EthAbiType)]
pub struct EnableSession {
    /// Position of this chain's digest in `hashes_and_chain_ids`
    pub chain_digest_index: u8,
    pub hashes_and_chain_ids: Vec<ChainDigest>,
    pub session_to_enable: Session,
    /// `validator ‖ signature` of the permission enable hash
    pub permission_enable_sig: Bytes,
}

impl EnableSession {
    /// Enables `session` on `chain_id`, which has to be one of the digests' chains
    pub fn new(
        session: Session,
        hashes_and_chain_ids: Vec<ChainDigest>,
        chain_id: u64,
    ) -> Result<Self, ModuleError> {
        let index = hashes_and_chain_ids
            .iter()
            .position(|digest| digest.chain_id == chain_id)
            .ok_or(ModuleError::MissingChainDigest(chain_id))?;
        let chain_digest_index = u8::try_from(index)
            .map_err(|_| ModuleError::Overflow { field: "chain digest index", bits: 8 })?;
        Ok(Self {
            chain_digest_index,
            hashes_and_chain_ids,
            session_to_enable: session,
            permission_enable_sig: Bytes::default(),
        })
    }

    /// Hash the account owners sign to enable the session
    pub fn permission_enable_hash(&self) -> H256 {
        permission_enable_hash(&self.hashes_and_chain_ids)
    }

    /// Sets the owners' signature of the permission enable hash, checked by `validator`
    pub fn with_permission_enable_sig(mut self, validator: Address, signature: &[u8]) -> Self {
        self.permission_enable_sig = [validator.as_bytes(), signature].concat().into();
        self
    }
}

fn type_hash(types: &[&str]) -> Token {
    Token::FixedBytes(keccak256(types.concat()).to_vec())
}

/// EIP-712 `MultiChainSession` hash over the chain digests, in the `SmartSession` domain
pub fn permission_enable_hash(hashes_and_chain_ids: &[ChainDigest]) -> H256 {
    let domain = EIP712Domain {
        name: Some(MULTICHAIN_DOMAIN_NAME.into()),
        version: Some(MULTICHAIN_DOMAIN_VERSION.into()),
        ..Default::default()
    };
    let chain_session_type = type_hash(&[
        CHAIN_SESSION_TYPE,
        ACTION_DATA_TYPE,
        ERC7739_CONTEXT_TYPE,
        ERC7739_DATA_TYPE,
        POLICY_DATA_TYPE,
        SIGNED_PERMISSIONS_TYPE,
        SIGNED_SESSION_TYPE,
    ]);
    let chain_sessions: Vec<u8> = hashes_and_chain_ids
        .iter()
        .flat_map(|digest| {
            keccak256(encode(&[
                chain_session_type.clone(),
                Token::Uint(digest.chain_id.into()),
                Token::FixedBytes(digest.session_digest.as_bytes().to_vec()),
            ]))
        })
        .collect();
    let struct_hash = keccak256(encode(&[
        type_hash(&[
            MULTICHAIN_SESSION_TYPE,
            ACTION_DATA_TYPE,
            CHAIN_SESSION_TYPE,
            ERC7739_CONTEXT_TYPE,
            ERC7739_DATA_TYPE,
            POLICY_DATA_TYPE,
            SIGNED_PERMISSIONS_TYPE,
            SIGNED_SESSION_TYPE,
        ]),
        Token::FixedBytes(keccak256(chain_sessions).to_vec()),
    ]));

    keccak256([&[0x19, 0x01][..], &domain.separator()[..], &struct_hash[..]].concat()).into()
}

/// Salt from a UTF-8 string, right padded with zeros (truncated past 32 bytes)
pub fn session_salt(value: &str) -> [u8; 32] {
    let mut salt = [0u8; 32];
    let bytes = value.as_bytes();
    let len = bytes.len().min(32);
    salt[..len].copy_from_slice(&bytes[..len]);
    salt
}

/// `keccak256(abi.encode(sessionValidator, sessionValidatorInitData, salt))`
pub fn permission_id(session: &Session) -> H256 {
    keccak256(encode(&[
        Token::Address(session.session_validator),
        Token::Bytes(session.session_validator_init_data.to_vec()),
        Token::FixedBytes(session.salt.to_vec()),
    ]))
    .into()
}

/// Policy allowing everything
pub fn sudo_policy(address: Address) -> PolicyData {
    PolicyData { policy: address, init_data: Bytes::default() }
}

/// Action on `target`'s `selector`, allowed without restriction
pub fn sudo_action(policy: Address, target: Address, selector: [u8; 4]) -> ActionData {
    ActionData {
        action_target_selector: selector,
        action_target: target,
        action_policies: vec![sudo_policy(policy)],
    }
}

/// Smart sessions validator enabling `sessions` on install (`abi.encode(Session[])`)
pub fn smart_sessions_validator(address: Address, sessions: Vec<Session>) -> Module {
    let init_data = if sessions.is_empty() {
        Bytes::default()
    } else {
        encode(&[Token::Array(sessions.into_iter().map(Tokenizable::into_token).collect())]).into()
    };
    Module::validator(address, init_data)
}

/// Session that may call anything, restricted by `policy` only
pub fn fallback_action(policy: Address) -> ActionData {
    sudo_action(policy, FALLBACK_TARGET, FALLBACK_SELECTOR)
}

/// `mode ‖ permissionId ‖ signature` for a session that is already enabled
pub fn encode_use_signature(permission_id: H256, signature: &[u8]) -> Bytes {
    [&[SmartSessionMode::Use as u8][..], permission_id.as_bytes(), signature].concat().into()
}

/// `mode ‖ flzCompress(abi.encode(enableSession, signature))`, enabling the session and using it
/// in the same user operation
pub fn encode_enable_signature(
    mode: SmartSessionMode,
    enable_session: &EnableSession,
    signature: &[u8],
) -> Result<Bytes, ModuleError> {
    if mode == SmartSessionMode::Use {
        return Err(ModuleError::UnsupportedSessionMode(mode.to_string()));
    }
    let payload =
        encode(&[enable_session.clone().into_token(), Token::Bytes(signature.to_vec())]);
    Ok([&[mode as u8][..], &flz_compress(&payload)].concat().into())
}

/// `smartSessions ‖ permissionId ‖ signature`, an ERC-1271 signature checked by the session
pub fn encode_erc1271_session_signature(
    smart_sessions: Address,
    permission_id: H256,
    signature: &[u8],
) -> Bytes {
    [smart_sessions.as_bytes(), permission_id.as_bytes(), signature].concat().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ownable::encode_validation_data, zip::flz_decompress};
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        let owner: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        Session::new(
            "0x2483DA3A338895199E5e538530213157e931Bf06".parse().unwrap(),
            encode_validation_data(&[owner], 1).unwrap(),
        )
        .with_salt(session_salt("0"))
    }

    #[test]
    fn salt_is_right_padded() {
        let salt = session_salt("0");
        assert_eq!(salt[0], 0x30);
        assert_eq!(&salt[1..], &[0u8; 31]);
    }

    #[test]
    fn permission_id_vector() {
        assert_eq!(
            permission_id(&session()),
            "0x628816546c68882b2349fa66d6593c3a0fad73cdc82db4b605aa5cc3baaf6f46"
                .parse::<H256>()
                .unwrap()
        );
    }

    #[test]
    fn permission_id_ignores_policies() {
        let policy = Address::repeat_byte(0x03);
        let with_policies = session()
            .with_user_op_policy(sudo_policy(policy))
            .with_action(sudo_action(policy, Address::repeat_byte(0x01), [0x70, 0xa0, 0x82, 0x31]));
        assert_eq!(permission_id(&with_policies), permission_id(&session()));
    }

    #[test]
    fn validator_init_data() {
        assert!(smart_sessions_validator(Address::zero(), vec![]).init_data.is_empty());

        let module = smart_sessions_validator(Address::zero(), vec![session()]);
        let expected = encode(&[Token::Array(vec![session().into_token()])]);
        assert_eq!(module.init_data.to_vec(), expected);
        // offset of the array, then its length
        assert_eq!(module.init_data[31], 0x20);
        assert_eq!(module.init_data[63], 1);
    }

    #[test]
    fn use_signature() {
        let id = permission_id(&session());
        let signature = encode_use_signature(id, &[0xaa; 65]);
        assert_eq!(signature.len(), 1 + 32 + 65);
        assert_eq!(signature[0], 0);
        assert_eq!(&signature[1..33], id.as_bytes());
        assert_eq!(signature[33], 0xaa);
    }

    fn digests() -> Vec<ChainDigest> {
        vec![
            ChainDigest { chain_id: 11155111, session_digest: H256::repeat_byte(0x11) },
            ChainDigest { chain_id: 84532, session_digest: H256::repeat_byte(0x22) },
        ]
    }

    #[test]
    fn permission_enable_hash_vector() {
        assert_eq!(
            permission_enable_hash(&digests()),
            "0x51d9b839f70dbb6f4d246f42c5d756ab8c8820299a871e0ab1f9c1b0ce4be010"
                .parse::<H256>()
                .unwrap()
        );
        assert_eq!(
            permission_enable_hash(&digests()[..1]),
            "0xa240a991bb5eb941759c225570eecd2c7163ee7f4a4ac237e3a1ca0a10e6ff6c"
                .parse::<H256>()
                .unwrap()
        );
    }

    #[test]
    fn enable_session_for_each_chain() {
        let on_base = EnableSession::new(session(), digests(), 84532).unwrap();
        assert_eq!(on_base.chain_digest_index, 1);
        let on_sepolia = EnableSession::new(session(), digests(), 11155111).unwrap();
        assert_eq!(on_sepolia.chain_digest_index, 0);
        // one owner signature covers both chains
        assert_eq!(on_base.permission_enable_hash(), on_sepolia.permission_enable_hash());

        assert_eq!(
            EnableSession::new(session(), digests(), 1),
            Err(ModuleError::MissingChainDigest(1))
        );
    }

    #[test]
    fn enable_signature() {
        let validator = Address::repeat_byte(0x24);
        let enable = EnableSession::new(session(), digests(), 84532)
            .unwrap()
            .with_permission_enable_sig(validator, &[0xbb; 65]);
        assert_eq!(&enable.permission_enable_sig[..20], validator.as_bytes());
        assert_eq!(enable.permission_enable_sig.len(), 85);

        let signature =
            encode_enable_signature(SmartSessionMode::Enable, &enable, &[0xaa; 65]).unwrap();
        assert_eq!(signature[0], SmartSessionMode::Enable as u8);
        let payload = flz_decompress(&signature[1..]).unwrap();
        assert_eq!(
            payload,
            encode(&[enable.clone().into_token(), Token::Bytes(vec![0xaa; 65])])
        );
        // the zero padding of the ABI words compresses away
        assert!(signature.len() < payload.len());

        let unsafe_enable =
            encode_enable_signature(SmartSessionMode::UnsafeEnable, &enable, &[0xaa; 65]).unwrap();
        assert_eq!(unsafe_enable[0], 0x02);
        assert!(encode_enable_signature(SmartSessionMode::Use, &enable, &[0xaa; 65]).is_err());
    }

    #[test]
    fn fallback_action_matches_anything() {
        let action = fallback_action(Address::repeat_byte(0x03));
        assert_eq!(action.action_target, Address::from_low_u64_be(1));
        assert_eq!(action.action_target_selector, [0, 0, 0, 1]);
        assert_eq!(action.action_policies, vec![sudo_policy(Address::repeat_byte(0x03))]);
    }

    #[test]
    fn erc1271_session_signature() {
        let id = permission_id(&session());
        let smart_sessions = Address::repeat_byte(0x5e);
        let signature = encode_erc1271_session_signature(smart_sessions, id, &[0xcc; 70]);
        assert_eq!(signature.len(), 20 + 32 + 70);
        assert_eq!(&signature[..20], smart_sessions.as_bytes());
        assert_eq!(&signature[20..52], id.as_bytes());

        let with_content = session()
            .with_erc7739_content(H256::repeat_byte(0x33), "Mail")
            .with_erc1271_policy(sudo_policy(Address::repeat_byte(0x03)));
        let content = &with_content.erc7739_policies.allowed_erc7739_content[0];
        assert_eq!(content.content_name, vec!["Mail".to_string()]);
        assert_eq!(permission_id(&with_content), id);
    }
}
