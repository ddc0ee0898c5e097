//! Orchestrator API types

use ethers::types::{Address, Bytes, H256, U256};
use modulor_primitives::Execution;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeMap, fmt, ops::Deref};
use strum_macros::{Display, EnumString};

/// Integer exchanged as a decimal string (numbers and 0x-prefixed strings are accepted too)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quantity(pub U256);

impl From<U256> for Quantity {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl Deref for Quantity {
    type Target = U256;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            String(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(number) => Ok(Self(U256::from(number))),
            Raw::String(string) => match string.strip_prefix("0x") {
                Some(hex) => U256::from_str_radix(hex, 16).map_err(|err| format!("{err:?}")),
                None => U256::from_dec_str(&string).map_err(|err| format!("{err:?}")),
            }
            .map(Self)
            .map_err(|err| de::Error::custom(format!("invalid quantity {string}: {err}"))),
        }
    }
}

/// Call executed on the target chain
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exec {
    pub to: Address,
    #[serde(default)]
    pub value: Quantity,
    #[serde(default)]
    pub data: Bytes,
}

impl From<Execution> for Exec {
    fn from(execution: Execution) -> Self {
        Self { to: execution.to, value: execution.value.into(), data: execution.data }
    }
}

impl From<Exec> for Execution {
    fn from(exec: Exec) -> Self {
        Execution::new(exec.to, exec.value.0, exec.data)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    pub token_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Quantity>,
}

/// What the user wants to happen on the target chain
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaIntent {
    pub target_chain_id: u64,
    pub token_transfers: Vec<TokenTransfer>,
    pub target_account: Address,
    pub target_executions: Vec<Exec>,
}

/// Fill conditions the arbiter enforces
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Witness {
    pub recipient: Address,
    pub token_out: Vec<[Quantity; 2]>,
    #[serde(default)]
    pub deposit_id: Quantity,
    pub target_chain: Quantity,
    pub fill_deadline: Quantity,
    pub execs: Vec<Exec>,
    pub user_op_hash: H256,
    pub max_fee_bps: Quantity,
}

/// Part of the bundle settled on one origin chain
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub arbiter: Address,
    pub chain_id: Quantity,
    /// `(token id, amount)` pairs locked in the compact
    pub ids_and_amounts: Vec<[Quantity; 2]>,
    pub witness: Witness,
}

/// Multichain compact the sponsor signs
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBundle {
    pub sponsor: Address,
    pub nonce: Quantity,
    pub expires: Quantity,
    pub segments: Vec<Segment>,
}

/// A way to fulfil the intent, as planned by the orchestrator
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPath {
    pub order_bundle: OrderBundle,
    /// Calls the orchestrator needs to run before the target executions
    #[serde(default)]
    pub injected_executions: Vec<Exec>,
    #[serde(default)]
    pub intent_cost: IntentCost,
}

/// Amount of one token the account gives up on an origin chain
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSpent {
    /// Taken from tokens already locked in the compact
    #[serde(default)]
    pub locked: Quantity,
    #[serde(default)]
    pub unlocked: Quantity,
}

/// How much of a requested token reaches the target chain
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReceived {
    pub token_address: Address,
    #[serde(default)]
    pub has_fulfilled: bool,
    #[serde(default)]
    pub amount_spent: Quantity,
    #[serde(default)]
    pub destination_amount: Quantity,
    #[serde(default)]
    pub fee: Quantity,
}

/// Fee quote of an intent
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentCost {
    /// False when the account balances cannot cover every transfer
    #[serde(default)]
    pub has_fulfilled_all: bool,
    #[serde(default)]
    pub tokens_received: Vec<TokenReceived>,
    /// Chain id to token to amount
    #[serde(default)]
    pub tokens_spent: BTreeMap<u64, BTreeMap<Address, TokenSpent>>,
}

impl IntentCost {
    /// Sum of the fees over every received token
    pub fn total_fee(&self) -> U256 {
        self.tokens_received.iter().fold(U256::zero(), |total, token| total + token.fee.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrderBundle {
    #[serde(flatten)]
    pub order_bundle: OrderBundle,
    /// One signature per segment
    pub origin_signatures: Vec<Bytes>,
    pub target_signature: Bytes,
}

/// Signed bundle, with the init code of the account when it is deployed on fill
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSubmission {
    pub signed_order_bundle: SignedOrderBundle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_code: Option<Bytes>,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleStatus {
    #[default]
    Pending,
    PartiallyCompleted,
    Completed,
    Filled,
    Expired,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Settlement state of a posted bundle
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResult {
    pub bundle_id: Quantity,
    pub status: BundleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_transaction_hash: Option<H256>,
    #[serde(default)]
    pub claims: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderPathResponse {
    pub order_bundles: Vec<OrderPath>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntentCostResponse {
    pub intent_cost: IntentCost,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostBundlesRequest<'a> {
    pub bundles: &'a [BundleSubmission],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostBundlesResponse {
    pub bundle_results: Vec<BundleResult>,
}
