//! EIP-712 hash of an order bundle (multichain compact) under "The Compact" domain

use super::types::{Exec, OrderBundle, Quantity, Segment, Witness};
use crate::ClientError;
use ethers::{
    abi::{encode, Token},
    types::{transaction::eip712::EIP712Domain, Address, H256, U256},
    utils::keccak256,
};

const DOMAIN_NAME: &str = "The Compact";
const DOMAIN_VERSION: &str = "0";

const MULTICHAIN_COMPACT_TYPE: &str =
    "MultichainCompact(address sponsor,uint256 nonce,uint256 expires,Segment[] segments)";
const SEGMENT_TYPE: &str =
    "Segment(address arbiter,uint256 chainId,uint256[2][] idsAndAmounts,Mandate mandate)";
const MANDATE_TYPE: &str = "Mandate(address recipient,uint256[2][] tokenOut,uint256 destChainId,uint256 fillDeadline,XchainExec[] xchainExecs,bytes32 userOpHash,uint256 maxFeeBps)";
const XCHAIN_EXEC_TYPE: &str = "XchainExec(address to,uint256 value,bytes data)";

fn type_hash(types: &[&str]) -> Token {
    Token::FixedBytes(keccak256(types.concat()).to_vec())
}

fn uint(value: &Quantity) -> Token {
    Token::Uint(value.0)
}

fn hash_tokens(tokens: &[Token]) -> [u8; 32] {
    keccak256(encode(tokens))
}

/// Arrays hash to the keccak of their concatenated member hashes
fn hash_array(hashes: impl Iterator<Item = [u8; 32]>) -> Token {
    Token::FixedBytes(keccak256(hashes.flatten().collect::<Vec<u8>>()).to_vec())
}

fn hash_pairs(pairs: &[[Quantity; 2]]) -> Token {
    hash_array(pairs.iter().map(|[a, b]| hash_tokens(&[uint(a), uint(b)])))
}

fn hash_exec(exec: &Exec) -> [u8; 32] {
    hash_tokens(&[
        type_hash(&[XCHAIN_EXEC_TYPE]),
        Token::Address(exec.to),
        uint(&exec.value),
        Token::FixedBytes(keccak256(&exec.data).to_vec()),
    ])
}

fn hash_mandate(witness: &Witness) -> [u8; 32] {
    hash_tokens(&[
        type_hash(&[MANDATE_TYPE, XCHAIN_EXEC_TYPE]),
        Token::Address(witness.recipient),
        hash_pairs(&witness.token_out),
        uint(&witness.target_chain),
        uint(&witness.fill_deadline),
        hash_array(witness.execs.iter().map(hash_exec)),
        Token::FixedBytes(witness.user_op_hash.as_bytes().to_vec()),
        uint(&witness.max_fee_bps),
    ])
}

fn hash_segment(segment: &Segment) -> [u8; 32] {
    hash_tokens(&[
        type_hash(&[SEGMENT_TYPE, MANDATE_TYPE, XCHAIN_EXEC_TYPE]),
        Token::Address(segment.arbiter),
        uint(&segment.chain_id),
        hash_pairs(&segment.ids_and_amounts),
        Token::FixedBytes(hash_mandate(&segment.witness).to_vec()),
    ])
}

/// Full EIP-712 type encoding of the bundle, with its referenced types
pub fn multichain_compact_type() -> String {
    [MULTICHAIN_COMPACT_TYPE, MANDATE_TYPE, SEGMENT_TYPE, XCHAIN_EXEC_TYPE].concat()
}

/// Separator of "The Compact" domain on `chain_id`
pub fn compact_domain_separator(chain_id: U256, verifying_contract: Address) -> H256 {
    EIP712Domain {
        name: Some(DOMAIN_NAME.into()),
        version: Some(DOMAIN_VERSION.into()),
        chain_id: Some(chain_id),
        verifying_contract: Some(verifying_contract),
        salt: None,
    }
    .separator()
    .into()
}

/// EIP-712 struct hash of the bundle
pub fn order_bundle_struct_hash(bundle: &OrderBundle) -> H256 {
    hash_tokens(&[
        type_hash(&[MULTICHAIN_COMPACT_TYPE, MANDATE_TYPE, SEGMENT_TYPE, XCHAIN_EXEC_TYPE]),
        Token::Address(bundle.sponsor),
        uint(&bundle.nonce),
        uint(&bundle.expires),
        hash_array(bundle.segments.iter().map(hash_segment)),
    ])
    .into()
}

/// Separator the bundle is signed under: the domain chain is the chain of the first segment,
/// so an empty bundle has none
pub fn order_bundle_domain_separator(
    bundle: &OrderBundle,
    verifying_contract: Address,
) -> Result<H256, ClientError> {
    let first = bundle
        .segments
        .first()
        .ok_or(ClientError::EmptyBundle { sponsor: bundle.sponsor })?;
    Ok(compact_domain_separator(first.chain_id.0, verifying_contract))
}

/// Digest the sponsor signs for the bundle
///
/// `verifying_contract` is the Compact deployment settling the bundle.
pub fn order_bundle_hash(
    bundle: &OrderBundle,
    verifying_contract: Address,
) -> Result<H256, ClientError> {
    let separator = order_bundle_domain_separator(bundle, verifying_contract)?;
    let struct_hash = order_bundle_struct_hash(bundle);

    Ok(keccak256([&[0x19, 0x01][..], separator.as_bytes(), struct_hash.as_bytes()].concat())
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modulor_primitives::Deployments;
    use pretty_assertions::assert_eq;

    fn the_compact() -> Address {
        Deployments::default().the_compact
    }

    fn bundle() -> OrderBundle {
        OrderBundle {
            sponsor: Address::repeat_byte(0x11),
            nonce: 1.into(),
            expires: 1_700_000_000.into(),
            segments: vec![Segment {
                arbiter: Address::repeat_byte(0x22),
                chain_id: 8453.into(),
                ids_and_amounts: vec![[5.into(), 100.into()]],
                witness: Witness {
                    recipient: Address::repeat_byte(0x33),
                    token_out: vec![[6.into(), 99.into()]],
                    deposit_id: 0.into(),
                    target_chain: 10.into(),
                    fill_deadline: 1_700_000_100.into(),
                    execs: vec![Exec {
                        to: Address::repeat_byte(0x44),
                        value: U256::zero().into(),
                        data: vec![0xa9, 0x05, 0x9c, 0xbb].into(),
                    }],
                    user_op_hash: H256::zero(),
                    max_fee_bps: 0.into(),
                },
            }],
        }
    }

    #[test]
    fn bundle_hash_vector() {
        assert_eq!(
            order_bundle_hash(&bundle(), the_compact()).unwrap(),
            "0xaac5a48ecb6de4e31ee6c2d5a6cd95f11066da0fba5669ca24598844c3e8b8a6"
                .parse::<H256>()
                .unwrap()
        );

        let mut bundle = bundle();
        bundle.nonce = 2.into();
        assert_eq!(
            order_bundle_hash(&bundle, the_compact()).unwrap(),
            "0x2e52dcae1af4d7d96f034ac0cefb04a322c2f20e086ee0e2b214fff1c23b6e3a"
                .parse::<H256>()
                .unwrap()
        );
    }

    #[test]
    fn deposit_id_is_not_signed() {
        let mut other = bundle();
        other.segments[0].witness.deposit_id = 9.into();
        assert_eq!(
            order_bundle_hash(&other, the_compact()).unwrap(),
            order_bundle_hash(&bundle(), the_compact()).unwrap()
        );
    }

    #[test]
    fn domain_binds_the_compact_deployment() {
        let redeployed = Address::repeat_byte(0x55);
        assert_ne!(
            order_bundle_hash(&bundle(), redeployed).unwrap(),
            order_bundle_hash(&bundle(), the_compact()).unwrap()
        );
    }

    #[test]
    fn hash_parts() {
        let bundle = bundle();
        let separator = order_bundle_domain_separator(&bundle, the_compact()).unwrap();
        assert_eq!(separator, compact_domain_separator(U256::from(8453), the_compact()));

        let digest = keccak256(
            [&[0x19, 0x01][..], separator.as_bytes(), order_bundle_struct_hash(&bundle).as_bytes()]
                .concat(),
        );
        assert_eq!(H256::from(digest), order_bundle_hash(&bundle, the_compact()).unwrap());

        let contents_type = multichain_compact_type();
        assert!(contents_type.starts_with("MultichainCompact(address sponsor"));
        assert!(contents_type.ends_with("XchainExec(address to,uint256 value,bytes data)"));
    }

    #[test]
    fn empty_bundle() {
        let empty = OrderBundle::default();
        assert!(matches!(
            order_bundle_hash(&empty, the_compact()),
            Err(ClientError::EmptyBundle { .. })
        ));
    }
}
