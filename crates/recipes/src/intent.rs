//! Intents: the orchestrator fills a token transfer (and calls) on a target chain, paid from the
//! account's balance on the origin chain

use crate::{
    funding::Funder, named_chain, smart_sessions::ownable_session, Endpoints,
    HttpSmartAccountClient,
};
use ethers::{
    abi::AbiEncode,
    providers::{Http, Middleware, Provider},
    types::{Address, Bytes, U256},
};
use eyre::{eyre, ContextCompat};
use modulor_clients::{
    orchestrator::{
        compact_domain_separator, multichain_compact_type, order_bundle_domain_separator,
        order_bundle_hash, order_bundle_struct_hash, BundleResult, BundleSubmission, Exec,
        MetaIntent, OrderBundle, OrderPath, SignedOrderBundle, TokenTransfer,
    },
    OrchestratorClient,
};
use modulor_contracts::token_api::TransferCall;
use modulor_modules::{
    erc1271::{
        encode_1271_signature, encode_typed_data_sign_signature, typed_data_sign_hash,
        AccountDomain,
    },
    ownable::ownable_validator,
    smart_sessions::{
        encode_erc1271_session_signature, fallback_action, permission_id,
        smart_sessions_validator, sudo_policy, Session,
    },
    Safe7579Account,
};
use modulor_primitives::{token_address, Deployments, Execution, Wallet};
use strum_macros::{Display, EnumString};
use tracing::{info, warn};

/// Salt nonce of accounts deployed on fill
pub const DEPLOY_ON_FILL_SALT_NONCE: u64 = 234;
/// Call deploying the account with a first user operation
const DEPLOYMENT_CALL_DATA: [u8; 4] = [0x11; 4];
/// Primary type of the order bundle, the ERC-7739 content a session may sign
pub const ORDER_BUNDLE_CONTENT_NAME: &str = "MultichainCompact";

/// How the account reaches the target chain
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum IntentMode {
    /// Origin and target are the same chain
    #[default]
    SameChain,
    /// The account already exists on the target chain
    CrossChain,
    /// The target account is deployed by the fill, from the init code posted with the bundle
    DeployOnFill,
    /// Cross-chain, with the bundle signed by a session key instead of the owner
    SessionKey,
}

impl IntentMode {
    /// USDC (base units) the funding wallet sends to the account on the origin chain
    pub fn funding_amount(&self) -> U256 {
        match self {
            IntentMode::DeployOnFill => U256::from(200_000),
            _ => U256::from(2),
        }
    }

    /// USDC (base units) requested on the target chain
    pub fn transfer_amount(&self) -> U256 {
        match self {
            IntentMode::SameChain => U256::one(),
            _ => U256::from(2),
        }
    }
}

/// Everything the intent workflow needs besides the deployments
#[derive(Clone, Debug)]
pub struct IntentSetup {
    /// Origin chain endpoints
    pub source: Endpoints,
    /// Target chain RPC, required unless the mode is same-chain
    pub target_rpc_url: Option<String>,
    pub orchestrator: OrchestratorClient,
    /// Pays for the account's USDC (and its deployment on fill)
    pub funding: Wallet,
    /// Overrides the mode's funding amount
    pub funding_amount: Option<U256>,
    /// Receives one USDC base unit on the target chain
    pub recipient: Address,
    pub mode: IntentMode,
}

/// Replaces the witness calls of the first segment with the injected executions followed by
/// the target executions
pub fn with_target_executions(
    path: OrderPath,
    target_executions: &[Exec],
) -> eyre::Result<OrderBundle> {
    let mut bundle = path.order_bundle;
    let sponsor = bundle.sponsor;
    let segment = bundle
        .segments
        .first_mut()
        .wrap_err_with(|| format!("order bundle of {sponsor:?} has no segment"))?;
    segment.witness.execs =
        path.injected_executions.into_iter().chain(target_executions.iter().cloned()).collect();
    Ok(bundle)
}

/// Uses `signature` (already packed with its validator) for every segment and the target
pub fn signed_bundle(bundle: OrderBundle, signature: Bytes) -> SignedOrderBundle {
    SignedOrderBundle {
        origin_signatures: vec![signature.clone(); bundle.segments.len()],
        target_signature: signature,
        order_bundle: bundle,
    }
}

/// Session of `session_key` allowed to sign order bundles of the Compact on `chain_id`
pub fn intent_session(
    deployments: &Deployments,
    session_key: Address,
    chain_id: u64,
) -> eyre::Result<Session> {
    let sudo = deployments.sudo_policy;
    let separator = compact_domain_separator(chain_id.into(), deployments.the_compact);
    Ok(ownable_session(deployments, session_key)?
        .with_user_op_policy(sudo_policy(sudo))
        .with_action(fallback_action(sudo))
        .with_paymaster_permitted(true)
        .with_erc7739_content(separator, ORDER_BUNDLE_CONTENT_NAME)
        .with_erc1271_policy(sudo_policy(sudo)))
}

/// Signs the bundle with `session_key` as ERC-7739 typed data of the account in `domain`,
/// routed to `session` by the smart sessions module
pub async fn session_bundle_signature(
    bundle: &OrderBundle,
    deployments: &Deployments,
    session: &Session,
    session_key: &Wallet,
    domain: &AccountDomain,
) -> eyre::Result<Bytes> {
    let separator = order_bundle_domain_separator(bundle, deployments.the_compact)?;
    let contents = order_bundle_struct_hash(bundle);
    let contents_type = multichain_compact_type();

    let hash = typed_data_sign_hash(separator, contents, &contents_type, domain);
    let signature = session_key.sign_hash(hash).await?;
    let signature =
        encode_typed_data_sign_signature(&signature, separator, contents, &contents_type)?;
    Ok(encode_erc1271_session_signature(
        deployments.smart_sessions,
        permission_id(session),
        &signature,
    ))
}

async fn chain_id(rpc_url: &str) -> eyre::Result<u64> {
    Ok(Provider::<Http>::try_from(rpc_url)?.get_chainid().await?.as_u64())
}

/// Funds a fresh account, asks the orchestrator to fill a USDC transfer and waits for the fill
pub async fn run(setup: &IntentSetup, deployments: Deployments) -> eyre::Result<BundleResult> {
    let mode = setup.mode;
    let owner = Wallet::random();
    let session_key = Wallet::random();
    let mut account = Safe7579Account::new(owner.address(), &deployments)
        .with_validator(ownable_validator(deployments.ownable_validator, &[owner.address()], 1)?)
        .with_intent_modules(&deployments);
    if mode == IntentMode::DeployOnFill {
        account = account.with_salt_nonce(DEPLOY_ON_FILL_SALT_NONCE.into());
    }
    let session = match mode {
        IntentMode::SessionKey => {
            let source_chain_id = chain_id(&setup.source.rpc_url).await?;
            let session = intent_session(&deployments, session_key.address(), source_chain_id)?;
            account = account.with_validator(smart_sessions_validator(
                deployments.smart_sessions,
                vec![session.clone()],
            ));
            Some(session)
        }
        _ => None,
    };
    let client = HttpSmartAccountClient::connect(&setup.source, deployments, account).await?;

    let target_chain_id = match (mode, &setup.target_rpc_url) {
        (IntentMode::SameChain, _) => client.chain_id,
        (_, Some(url)) => chain_id(url).await?,
        (_, None) => return Err(eyre!("{mode} intents need the target chain RPC")),
    };
    info!("{mode} intent from chain {} to chain {target_chain_id}", client.chain_id);

    let funder = Funder::connect(&setup.source.rpc_url, &setup.funding).await?;
    let source_usdc = token_address("USDC", named_chain(client.chain_id)?)?;
    let funding_amount = setup.funding_amount.unwrap_or_else(|| mode.funding_amount());
    funder.transfer_token(source_usdc, client.address, funding_amount).await?;

    if mode == IntentMode::DeployOnFill {
        let factory_data = client.account.factory_data(&client.deployments)?;
        funder.send(client.deployments.safe_proxy_factory, factory_data).await?;
    } else if !client.is_deployed().await? {
        let call = Execution::call(Address::zero(), DEPLOYMENT_CALL_DATA.to_vec());
        client.send_calls(&[call], &owner).await?;
    }
    client.ensure_deployed().await?;

    let target_usdc = token_address("USDC", named_chain(target_chain_id)?)?;
    let transfer = TransferCall { to: setup.recipient, amount: U256::one() };
    let intent = MetaIntent {
        target_chain_id,
        token_transfers: vec![TokenTransfer {
            token_address: target_usdc,
            amount: Some(mode.transfer_amount().into()),
        }],
        target_account: client.address,
        target_executions: vec![Execution::call(target_usdc, transfer.encode()).into()],
    };

    let cost = setup.orchestrator.get_intent_cost(client.address, &intent).await?;
    info!("Intent fee: {}", cost.total_fee());
    if !cost.has_fulfilled_all {
        warn!("Account balances do not cover every requested transfer");
    }

    let path = setup
        .orchestrator
        .get_order_path(client.address, &intent)
        .await?
        .into_iter()
        .next()
        .wrap_err("orchestrator returned no order path")?;
    let bundle = with_target_executions(path, &intent.target_executions)?;

    let hash = order_bundle_hash(&bundle, client.deployments.the_compact)?;
    let signature = match &session {
        Some(session) => {
            let domain = client.account_domain().await?;
            session_bundle_signature(&bundle, &client.deployments, session, &session_key, &domain)
                .await?
        }
        None => {
            let signature = owner.sign_hash(hash).await?;
            encode_1271_signature(client.deployments.ownable_validator, &signature)
        }
    };
    info!("Signed order bundle {hash:?}");

    let init_code = match mode {
        IntentMode::DeployOnFill => Some(client.account.init_code(&client.deployments)?),
        _ => None,
    };
    let submission =
        BundleSubmission { signed_order_bundle: signed_bundle(bundle, signature), init_code };
    let result = setup
        .orchestrator
        .post_signed_order_bundles(&[submission])
        .await?
        .into_iter()
        .next()
        .wrap_err("orchestrator accepted no bundle")?;

    Ok(setup.orchestrator.wait_for_bundle(result.bundle_id).await?)
}
