//! ERC-1271 envelopes for messages signed through a Safe7579 validator

use crate::ModuleError;
use ethers::{
    abi::{encode, Token},
    types::{transaction::eip712::EIP712Domain, Address, Bytes, H256, U256},
    utils::keccak256,
};

const SAFE_MESSAGE_TYPE: &str = "SafeMessage(bytes message)";
const ACCOUNT_DOMAIN_FIELDS: &str =
    "string name,string version,uint256 chainId,address verifyingContract,bytes32 salt";

/// EIP-712 `SafeMessage` hash the owners sign for `hash`
///
/// The domain only carries the chain id and the account as verifying contract.
pub fn safe_message_hash(account: Address, chain_id: u64, hash: H256) -> H256 {
    let domain = EIP712Domain {
        chain_id: Some(U256::from(chain_id)),
        verifying_contract: Some(account),
        ..Default::default()
    };
    let struct_hash = keccak256(encode(&[
        Token::FixedBytes(keccak256(SAFE_MESSAGE_TYPE).to_vec()),
        Token::FixedBytes(keccak256(hash.as_bytes()).to_vec()),
    ]));

    keccak256([&[0x19, 0x01][..], &domain.separator()[..], &struct_hash[..]].concat()).into()
}

/// `validator ‖ signature`, routing `isValidSignature` to the validator
pub fn encode_1271_signature(validator: Address, signature: &[u8]) -> Bytes {
    [validator.as_bytes(), signature].concat().into()
}

/// EIP-712 domain of an account, as returned by its `eip712Domain()`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountDomain {
    pub name: String,
    pub version: String,
    pub chain_id: U256,
    pub verifying_contract: Address,
    pub salt: [u8; 32],
}

/// Name of the primary type of an EIP-712 type encoding (`Mail` for `Mail(address to,...)`)
fn contents_name(contents_type: &str) -> &str {
    contents_type.split('(').next().unwrap_or(contents_type)
}

/// ERC-7739 `TypedDataSign` hash the signer signs for typed data of another app
///
/// `contents` is the struct hash of the app's message and `contents_type` its full type encoding.
/// The account domain binds the signature to one account.
pub fn typed_data_sign_hash(
    app_domain_separator: H256,
    contents: H256,
    contents_type: &str,
    account: &AccountDomain,
) -> H256 {
    let type_hash = keccak256(format!(
        "TypedDataSign({} contents,{ACCOUNT_DOMAIN_FIELDS}){contents_type}",
        contents_name(contents_type)
    ));
    let struct_hash = keccak256(encode(&[
        Token::FixedBytes(type_hash.to_vec()),
        Token::FixedBytes(contents.as_bytes().to_vec()),
        Token::FixedBytes(keccak256(&account.name).to_vec()),
        Token::FixedBytes(keccak256(&account.version).to_vec()),
        Token::Uint(account.chain_id),
        Token::Address(account.verifying_contract),
        Token::FixedBytes(account.salt.to_vec()),
    ]));

    keccak256([&[0x19, 0x01][..], app_domain_separator.as_bytes(), &struct_hash[..]].concat())
        .into()
}

/// `signature ‖ appDomainSeparator ‖ contents ‖ contentsType ‖ uint16(contentsType.length)`
pub fn encode_typed_data_sign_signature(
    signature: &[u8],
    app_domain_separator: H256,
    contents: H256,
    contents_type: &str,
) -> Result<Bytes, ModuleError> {
    let len = u16::try_from(contents_type.len())
        .map_err(|_| ModuleError::Overflow { field: "contents type length", bits: 16 })?;
    Ok([
        signature,
        app_domain_separator.as_bytes(),
        contents.as_bytes(),
        contents_type.as_bytes(),
        &len.to_be_bytes()[..],
    ]
    .concat()
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn safe_message() {
        let account: Address = "0x9c5754De1443984659E1b3a8d1931D83475ba29C".parse().unwrap();
        assert_eq!(
            safe_message_hash(account, 11155111, H256::repeat_byte(0x11)),
            "0xc642939f3d145faacd6477a2c18f7fbbe7268db02503253189538d8ff817f30d"
                .parse::<H256>()
                .unwrap()
        );
        assert_ne!(
            safe_message_hash(account, 1, H256::repeat_byte(0x11)),
            safe_message_hash(account, 11155111, H256::repeat_byte(0x11))
        );
    }

    fn account_domain() -> AccountDomain {
        AccountDomain {
            name: "Safe7579".into(),
            version: "1.0.0".into(),
            chain_id: U256::from(11155111),
            verifying_contract: "0x9c5754De1443984659E1b3a8d1931D83475ba29C".parse().unwrap(),
            salt: [0u8; 32],
        }
    }

    #[test]
    fn typed_data_sign_vector() {
        let hash = typed_data_sign_hash(
            H256::repeat_byte(0x33),
            H256::repeat_byte(0x44),
            "Mail(address to,string contents)",
            &account_domain(),
        );
        assert_eq!(
            hash,
            "0x772ccaa6e78e4c147e5e7932c33662780e73fcbdfb62bb59a4d309ef0e2c6aa3"
                .parse::<H256>()
                .unwrap()
        );

        let other_account =
            AccountDomain { verifying_contract: Address::repeat_byte(0x01), ..account_domain() };
        assert_ne!(
            typed_data_sign_hash(
                H256::repeat_byte(0x33),
                H256::repeat_byte(0x44),
                "Mail(address to,string contents)",
                &other_account,
            ),
            hash
        );
    }

    #[test]
    fn typed_data_sign_signature_layout() {
        let contents_type = "Mail(address to,string contents)";
        let signature = encode_typed_data_sign_signature(
            &[0xab; 65],
            H256::repeat_byte(0x33),
            H256::repeat_byte(0x44),
            contents_type,
        )
        .unwrap();
        assert_eq!(signature.len(), 65 + 32 + 32 + contents_type.len() + 2);
        assert_eq!(&signature[65..97], H256::repeat_byte(0x33).as_bytes());
        assert_eq!(&signature[129..129 + contents_type.len()], contents_type.as_bytes());
        assert_eq!(&signature[signature.len() - 2..], &[0x00, contents_type.len() as u8]);

        let too_long = "A".repeat(70_000);
        assert!(
            encode_typed_data_sign_signature(&[], H256::zero(), H256::zero(), &too_long).is_err()
        );
    }

    #[test]
    fn signature_envelope() {
        let validator = Address::repeat_byte(0x24);
        let signature = encode_1271_signature(validator, &[0xab; 65]);
        assert_eq!(signature.len(), 85);
        assert_eq!(&signature[..20], validator.as_bytes());
        assert_eq!(signature[20], 0xab);
    }
}
