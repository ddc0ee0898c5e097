//! WebAuthn (passkey) validator
//!
//! The validator verifies a P-256 assertion over the user operation hash. The challenge the
//! authenticator signs is the base64url encoded hash; the assertion it returns is re-encoded
//! into the ABI shape the validator decodes.

use crate::{module::Module, ModuleError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ethers::{
    abi::{encode, Token},
    types::{Address, Bytes, H256, U256},
    utils::keccak256,
};
use serde::{Deserialize, Serialize};

/// Order of the P-256 curve
const P256_N: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xbc, 0xe6, 0xfa, 0xad, 0xa7, 0x17, 0x9e, 0x84, 0xf3, 0xb9, 0xca, 0xc2, 0xfc, 0x63, 0x25, 0x51,
];

const RESPONSE_TYPE: &str = r#""type":"webauthn.get""#;

const MOCK_AUTHENTICATOR_DATA: [u8; 37] = [
    0x49, 0x96, 0x0d, 0xe5, 0x88, 0x0e, 0x8c, 0x68, 0x74, 0x34, 0x17, 0x0f, 0x64, 0x76, 0x60, 0x5b,
    0x8f, 0xe4, 0xae, 0xb9, 0xa2, 0x86, 0x32, 0xc7, 0x99, 0x5c, 0xf3, 0xba, 0x83, 0x1d, 0x97, 0x63,
    0x1d, 0x00, 0x00, 0x00, 0x00,
];
const MOCK_CLIENT_DATA_JSON: &str = r#"{"type":"webauthn.get","challenge":"tbxXNFS9X_4Byr1cMwqKrIGB-_30a0QhZ6y7ucM0BOE","origin":"http://localhost:3000","crossOrigin":false, "other_keys_can_be_added_here":"do not compare clientDataJSON against a template. See https://goo.gl/yabPex"}"#;
const MOCK_R: &str = "635bc6d0f68ff895cae8a288ecf7542a6a9cd555df784b73e1e2ea7e9104b1db";
const MOCK_S: &str = "15e9015d280cb19527881c625fee43fd3a405d5b0d199a8c8e6589a7381209e4";

/// Passkey public key and the id of the authenticator holding it
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebAuthnCredential {
    pub pub_key_x: U256,
    pub pub_key_y: U256,
    pub authenticator_id: String,
}

/// Raw assertion returned by an authenticator
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebAuthnAssertion {
    pub authenticator_data: Bytes,
    pub client_data_json: String,
    /// DER encoded ECDSA signature
    pub signature: Bytes,
}

/// Assertion in the shape the validator verifies
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebAuthnSignature {
    pub authenticator_data: Bytes,
    pub client_data_json: String,
    pub response_type_location: usize,
    pub r: U256,
    pub s: U256,
    pub use_precompiled: bool,
}

impl TryFrom<WebAuthnAssertion> for WebAuthnSignature {
    type Error = ModuleError;

    fn try_from(assertion: WebAuthnAssertion) -> Result<Self, Self::Error> {
        let response_type_location = response_type_location(&assertion.client_data_json)?;
        let (r, s) = parse_and_normalize_signature(&assertion.signature)?;
        Ok(Self {
            authenticator_data: assertion.authenticator_data,
            client_data_json: assertion.client_data_json,
            response_type_location,
            r,
            s,
            use_precompiled: false,
        })
    }
}

/// Validator with `abi.encode((uint256 x, uint256 y), keccak256(authenticatorId))` init data
pub fn webauthn_validator(address: Address, credential: &WebAuthnCredential) -> Module {
    let init_data = encode(&[
        Token::Tuple(vec![Token::Uint(credential.pub_key_x), Token::Uint(credential.pub_key_y)]),
        Token::FixedBytes(keccak256(credential.authenticator_id.as_bytes()).to_vec()),
    ]);
    Module::validator(address, init_data.into())
}

/// Challenge the authenticator signs for a user operation hash
pub fn webauthn_challenge(hash: H256) -> String {
    URL_SAFE_NO_PAD.encode(hash.as_bytes())
}

/// Index of `"type":"webauthn.get"` in the client data JSON
pub fn response_type_location(client_data_json: &str) -> Result<usize, ModuleError> {
    client_data_json.rfind(RESPONSE_TYPE).ok_or(ModuleError::MissingResponseType)
}

fn der_length(der: &[u8], pos: &mut usize) -> Result<usize, ModuleError> {
    let first = *der.get(*pos).ok_or_else(|| invalid_der("truncated length"))?;
    *pos += 1;
    if first & 0x80 == 0 {
        return Ok(first as usize);
    }

    let octets = (first & 0x7f) as usize;
    if octets == 0 || octets > 2 {
        return Err(invalid_der("unsupported length"));
    }
    let bytes = der.get(*pos..*pos + octets).ok_or_else(|| invalid_der("truncated length"))?;
    *pos += octets;
    Ok(bytes.iter().fold(0usize, |len, byte| (len << 8) | *byte as usize))
}

fn der_integer(der: &[u8], pos: &mut usize) -> Result<U256, ModuleError> {
    if der.get(*pos) != Some(&0x02) {
        return Err(invalid_der("expected integer"));
    }
    *pos += 1;

    let len = der_length(der, pos)?;
    let mut value = der.get(*pos..*pos + len).ok_or_else(|| invalid_der("truncated integer"))?;
    *pos += len;

    // positive integers with the high bit set carry a leading zero
    while value.len() > 1 && value[0] == 0 {
        value = &value[1..];
    }
    if value.len() > 32 {
        return Err(invalid_der("integer larger than 256 bits"));
    }
    Ok(U256::from_big_endian(value))
}

fn invalid_der(reason: &str) -> ModuleError {
    ModuleError::InvalidDerSignature(reason.into())
}

/// Extracts `(r, s)` from a DER `SEQUENCE { INTEGER r, INTEGER s }`, with `s` moved to the lower
/// half of the curve order
pub fn parse_and_normalize_signature(der: &[u8]) -> Result<(U256, U256), ModuleError> {
    if der.first() != Some(&0x30) {
        return Err(invalid_der("expected sequence"));
    }
    let mut pos = 1;
    let len = der_length(der, &mut pos)?;
    if pos + len != der.len() {
        return Err(invalid_der("sequence length mismatch"));
    }

    let r = der_integer(der, &mut pos)?;
    let mut s = der_integer(der, &mut pos)?;
    if pos != der.len() {
        return Err(invalid_der("trailing bytes"));
    }

    let n = U256::from_big_endian(&P256_N);
    if s > n / 2 {
        s = n - s;
    }
    Ok((r, s))
}

/// `abi.encode(bytes authenticatorData, string clientDataJSON, uint256 responseTypeLocation,
/// uint256 r, uint256 s, bool usePrecompiled)`
pub fn encode_webauthn_signature(signature: &WebAuthnSignature) -> Bytes {
    encode(&[
        Token::Bytes(signature.authenticator_data.to_vec()),
        Token::String(signature.client_data_json.clone()),
        Token::Uint(U256::from(signature.response_type_location)),
        Token::Uint(signature.r),
        Token::Uint(signature.s),
        Token::Bool(signature.use_precompiled),
    ])
    .into()
}

/// Signature of the right shape and size, for gas estimation
pub fn webauthn_mock_signature() -> Bytes {
    encode_webauthn_signature(&WebAuthnSignature {
        authenticator_data: MOCK_AUTHENTICATOR_DATA.to_vec().into(),
        client_data_json: MOCK_CLIENT_DATA_JSON.into(),
        response_type_location: 1,
        r: U256::from_str_radix(MOCK_R, 16).unwrap_or_default(),
        s: U256::from_str_radix(MOCK_S, 16).unwrap_or_default(),
        use_precompiled: false,
    })
}
