//! Packing helpers and serde serializers

use ethers::{
    types::{Address, Bytes, U128, U256},
    utils::to_checksum,
};

/// Serializes address as checksum address
pub fn as_checksum_addr<S>(val: &Address, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&to_checksum(val, None))
}

/// Serializes optional address as checksum address
pub fn as_checksum_addr_opt<S>(val: &Option<Address>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match val {
        Some(addr) => s.serialize_str(&to_checksum(addr, None)),
        None => s.serialize_none(),
    }
}

/// If possible, parses address from the first 20 bytes
pub fn get_address(buf: &[u8]) -> Option<Address> {
    if buf.len() >= 20 {
        Some(Address::from_slice(&buf[0..20]))
    } else {
        None
    }
}

/// Truncates to the low 128 bits (as the entry point does when unpacking)
fn low_u128(value: U256) -> U128 {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    U128::from_big_endian(&buf[16..32])
}

/// Packs two uint128 into one 32-byte word (`a` in the high half)
pub fn pack_uint128(a: U256, b: U256) -> [u8; 32] {
    let mut res = [0u8; 32];
    low_u128(a).to_big_endian(&mut res[0..16]);
    low_u128(b).to_big_endian(&mut res[16..32]);
    res
}

/// Unpacks two uint128 from a 32-byte word
pub fn unpack_uint128(buf: &[u8]) -> (U256, U256) {
    if buf.len() < 32 {
        return (U256::zero(), U256::zero());
    }
    (U256::from_big_endian(&buf[0..16]), U256::from_big_endian(&buf[16..32]))
}

/// `paymaster ‖ verificationGasLimit (uint128) ‖ postOpGasLimit (uint128) ‖ paymasterData`
pub fn pack_paymaster_data(
    paymaster: Address,
    paymaster_verification_gas_limit: U256,
    paymaster_post_op_gas_limit: U256,
    paymaster_data: &Bytes,
) -> Vec<u8> {
    if paymaster.is_zero() {
        return vec![];
    }
    let gas_data = pack_uint128(paymaster_verification_gas_limit, paymaster_post_op_gas_limit);
    [paymaster.as_bytes(), &gas_data, paymaster_data.as_ref()].concat()
}

pub fn unpack_paymaster_data(buf: &[u8]) -> (Address, U256, U256, Bytes) {
    if buf.len() < 52 {
        return (Address::zero(), U256::zero(), U256::zero(), Bytes::default());
    }
    let (verification_gas_limit, post_op_gas_limit) = unpack_uint128(&buf[20..52]);
    (
        Address::from_slice(&buf[0..20]),
        verification_gas_limit,
        post_op_gas_limit,
        Bytes::from(buf[52..].to_vec()),
    )
}

/// `factory ‖ factoryData`, empty for the zero factory
pub fn pack_factory_data(factory: Address, factory_data: Bytes) -> Vec<u8> {
    if factory.is_zero() {
        return vec![];
    }
    [factory.as_bytes(), factory_data.as_ref()].concat()
}

pub fn unpack_factory_data(init_code: &[u8]) -> (Address, Bytes) {
    match get_address(init_code) {
        Some(factory) => (factory, Bytes::from(init_code[20..].to_vec())),
        None => (Address::zero(), Bytes::default()),
    }
}
