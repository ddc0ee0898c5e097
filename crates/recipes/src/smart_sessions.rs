//! Session keys: a second key allowed to call specific targets through the smart sessions
//! validator

use crate::{named_chain, Endpoints, HttpSmartAccountClient, SmartAccountClient};
use ethers::{
    abi::{AbiEncode, Tokenizable},
    contract::EthCall,
    providers::Middleware,
    types::{Address, Bytes, H256, U256},
};
use eyre::ensure;
use modulor_contracts::{smart_sessions_api, token_api::BalanceOfCall, SmartSessionsAPI};
use modulor_modules::{
    ownable::{encode_validation_data, ownable_mock_signature, ownable_validator},
    smart_sessions::{
        encode_enable_signature, encode_use_signature, fallback_action, permission_enable_hash,
        permission_id, session_salt, smart_sessions_validator, sudo_action, sudo_policy,
        ChainDigest, EnableSession, Session, SmartSessionMode,
    },
    Safe7579Account,
};
use modulor_primitives::{
    constants::testnet::SESSION_TARGET, token_address, Deployments, Execution,
    UserOperationReceipt, Wallet,
};
use tracing::info;

/// Call deploying the account with a first user operation
const DEPLOYMENT_CALL_DATA: [u8; 4] = [0x11; 4];

/// Session owned by `session_key` through the ownable validator, salt `"0"`
pub fn ownable_session(deployments: &Deployments, session_key: Address) -> eyre::Result<Session> {
    Ok(Session::new(
        deployments.ownable_validator,
        encode_validation_data(&[session_key], 1)?,
    )
    .with_salt(session_salt("0")))
}

/// Executes `calls` authorized by `session_key` under an enabled `session`
pub async fn send_with_session<M: Middleware + 'static>(
    client: &SmartAccountClient<M>,
    session: &Session,
    session_key: &Wallet,
    calls: &[Execution],
) -> eyre::Result<UserOperationReceipt> {
    let permission_id = permission_id(session);
    let nonce = client.nonce(client.deployments.smart_sessions).await?;
    let uo = client
        .prepare_user_operation(
            calls,
            nonce,
            encode_use_signature(permission_id, &ownable_mock_signature(1)),
        )
        .await?;

    let signature = session_key.sign_hash(client.hash(&uo).0).await?;
    let uo = uo.signature(encode_use_signature(permission_id, &signature));

    info!("Sending user operation with session {permission_id:?}");
    let hash = client.send_user_operation(&uo).await?;
    client.wait(hash).await
}

/// Installs a session allowed to read the account's USDC balance, then uses it
pub async fn run(
    endpoints: &Endpoints,
    deployments: Deployments,
) -> eyre::Result<UserOperationReceipt> {
    let owner = Wallet::random();
    let session_key = Wallet::random();

    let account = Safe7579Account::new(owner.address(), &deployments).with_validator(
        ownable_validator(deployments.ownable_validator, &[owner.address()], 1)?,
    );
    let client = HttpSmartAccountClient::connect(endpoints, deployments, account).await?;
    let usdc = token_address("USDC", named_chain(client.chain_id)?)?;

    let sudo = client.deployments.sudo_policy;
    let session = ownable_session(&client.deployments, session_key.address())?
        .with_user_op_policy(sudo_policy(sudo))
        .with_action(sudo_action(sudo, usdc, BalanceOfCall::selector()))
        .with_paymaster_permitted(true);

    let validator =
        smart_sessions_validator(client.deployments.smart_sessions, vec![session.clone()]);
    client.install_module(&validator, &owner).await?;

    let balance_of = BalanceOfCall { account: client.address }.encode();
    send_with_session(&client, &session, &session_key, &[Execution::call(usdc, balance_of)]).await
}

/// Session enabled at deployment, the account owner never signs
pub async fn run_zero_signatures(
    endpoints: &Endpoints,
    deployments: Deployments,
) -> eyre::Result<UserOperationReceipt> {
    // the owner is only an address here
    let owner = Wallet::random().address();
    let session_key = Wallet::random();
    let target: Address = SESSION_TARGET.parse()?;

    let session = ownable_session(&deployments, session_key.address())?.with_action(sudo_action(
        deployments.sudo_policy,
        target,
        [0u8; 4],
    ));
    let sessions = smart_sessions_validator(deployments.smart_sessions, vec![session.clone()]);
    let account = Safe7579Account::new(owner, &deployments)
        .with_validator(ownable_validator(deployments.ownable_validator, &[owner], 1)?)
        .with_validator(sessions);
    let client = HttpSmartAccountClient::connect(endpoints, deployments, account).await?;

    let call = Execution::new(target, U256::zero(), Bytes::from(vec![0u8; 4]));
    send_with_session(&client, &session, &session_key, &[call]).await
}

/// Session of `session_key` that may call anything, enabled on several chains at once
pub fn multichain_session(
    deployments: &Deployments,
    session_key: Address,
) -> eyre::Result<Session> {
    let sudo = deployments.sudo_policy;
    Ok(ownable_session(deployments, session_key)?
        .with_user_op_policy(sudo_policy(sudo))
        .with_action(fallback_action(sudo))
        .with_paymaster_permitted(true))
}

/// Digest of `session` the smart sessions module of the client's chain expects in ENABLE mode
pub async fn session_digest<M: Middleware + 'static>(
    client: &SmartAccountClient<M>,
    session: &Session,
) -> eyre::Result<ChainDigest> {
    let smart_sessions =
        SmartSessionsAPI::new(client.deployments.smart_sessions, client.eth_client.clone());
    let data = smart_sessions_api::Session::from_token(session.clone().into_token())?;
    let digest = smart_sessions
        .get_session_digest(
            permission_id(session).0,
            client.address,
            data,
            SmartSessionMode::Enable as u8,
        )
        .call()
        .await?;
    Ok(ChainDigest { chain_id: client.chain_id, session_digest: H256::from(digest) })
}

/// Enables `enable.session_to_enable` and uses it in the same user operation
pub async fn send_enabling_session<M: Middleware + 'static>(
    client: &SmartAccountClient<M>,
    enable: &EnableSession,
    session_key: &Wallet,
    calls: &[Execution],
) -> eyre::Result<UserOperationReceipt> {
    let mode = SmartSessionMode::Enable;
    let nonce = client.nonce(client.deployments.smart_sessions).await?;
    let dummy = encode_enable_signature(mode, enable, &ownable_mock_signature(1))?;
    let uo = client.prepare_user_operation(calls, nonce, dummy).await?;

    let signature = session_key.sign_hash(client.hash(&uo).0).await?;
    let uo = uo.signature(encode_enable_signature(mode, enable, &signature)?);

    info!(
        "Enabling session {:?} on chain {}",
        permission_id(&enable.session_to_enable),
        client.chain_id
    );
    let hash = client.send_user_operation(&uo).await?;
    let receipt = client.wait(hash).await?;
    ensure!(receipt.success, "user operation {hash} reverted: {}", receipt.reason);
    Ok(receipt)
}

/// One owner signature enables the same session on every chain, then the session key sends a
/// user operation on each of them
pub async fn run_multichain(
    endpoints: &[Endpoints],
    deployments: Deployments,
) -> eyre::Result<Vec<UserOperationReceipt>> {
    ensure!(!endpoints.is_empty(), "at least one chain is required");
    let owner = Wallet::random();
    let session_key = Wallet::random();

    let account = Safe7579Account::new(owner.address(), &deployments)
        .with_validator(ownable_validator(deployments.ownable_validator, &[owner.address()], 1)?)
        .with_validator(smart_sessions_validator(deployments.smart_sessions, vec![]));
    let mut clients = Vec::with_capacity(endpoints.len());
    for endpoints in endpoints {
        clients.push(
            HttpSmartAccountClient::connect(endpoints, deployments.clone(), account.clone())
                .await?,
        );
    }

    let session = multichain_session(&deployments, session_key.address())?;
    let mut digests = Vec::with_capacity(clients.len());
    for client in clients.iter() {
        digests.push(session_digest(client, &session).await?);
    }
    let enable_hash = permission_enable_hash(&digests);
    let owner_signature = owner.sign_hash(enable_hash).await?;
    info!("Owner signed {} chain digest(s): {enable_hash:?}", digests.len());

    let target: Address = SESSION_TARGET.parse()?;
    let call = Execution::new(target, U256::zero(), Bytes::from(vec![0u8; 4]));
    let mut receipts = Vec::with_capacity(clients.len());
    for client in clients.iter() {
        if !client.is_deployed().await? {
            let deployment = Execution::call(Address::zero(), DEPLOYMENT_CALL_DATA.to_vec());
            client.send_calls(&[deployment], &owner).await?;
        }
        let enable = EnableSession::new(session.clone(), digests.clone(), client.chain_id)?
            .with_permission_enable_sig(client.deployments.ownable_validator, &owner_signature);
        receipts.push(send_enabling_session(client, &enable, &session_key, &[call.clone()]).await?);
    }
    Ok(receipts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn session_salt_and_validator() {
        let deployments = Deployments::default();
        let key = Address::repeat_byte(0x2d);
        let session = ownable_session(&deployments, key).unwrap();

        assert_eq!(session.session_validator, deployments.ownable_validator);
        assert_eq!(session.salt[0], b'0');
        assert!(session.salt[1..].iter().all(|byte| *byte == 0));
        assert_eq!(
            session.session_validator_init_data,
            encode_validation_data(&[key], 1).unwrap()
        );
    }

    #[test]
    fn multichain_session_calls_anything() {
        let deployments = Deployments::default();
        let key = Address::repeat_byte(0x2d);
        let session = multichain_session(&deployments, key).unwrap();

        assert_eq!(session.actions, vec![fallback_action(deployments.sudo_policy)]);
        assert_eq!(session.user_op_policies, vec![sudo_policy(deployments.sudo_policy)]);
        assert!(session.permit_erc4337_paymaster);
        assert_eq!(
            permission_id(&session),
            permission_id(&ownable_session(&deployments, key).unwrap())
        );
    }

    #[test]
    fn session_converts_to_the_contract_struct() {
        let deployments = Deployments::default();
        let session = multichain_session(&deployments, Address::repeat_byte(0x2d)).unwrap();
        let data = smart_sessions_api::Session::from_token(session.clone().into_token()).unwrap();

        assert_eq!(data.session_validator, deployments.ownable_validator);
        assert_eq!(data.salt, session.salt);
        assert_eq!(data.actions.len(), 1);
        assert_eq!(data.into_token(), session.into_token());
    }

    #[test]
    fn enable_signature_per_chain() {
        let deployments = Deployments::default();
        let session = multichain_session(&deployments, Address::repeat_byte(0x2d)).unwrap();
        let digests = vec![
            ChainDigest { chain_id: 11155111, session_digest: H256::repeat_byte(0x01) },
            ChainDigest { chain_id: 84532, session_digest: H256::repeat_byte(0x02) },
        ];
        let owner_signature = [0xab; 65];

        let first = EnableSession::new(session.clone(), digests.clone(), 11155111).unwrap();
        let second = EnableSession::new(session, digests, 84532).unwrap();
        assert_eq!(first.chain_digest_index, 0);
        assert_eq!(second.chain_digest_index, 1);
        assert_eq!(first.permission_enable_hash(), second.permission_enable_hash());

        let enable =
            second.with_permission_enable_sig(deployments.ownable_validator, &owner_signature);
        assert_eq!(&enable.permission_enable_sig[..20], deployments.ownable_validator.as_bytes());
        let signature =
            encode_enable_signature(SmartSessionMode::Enable, &enable, &[0xcd; 65]).unwrap();
        assert_eq!(signature[0], SmartSessionMode::Enable as u8);
    }

    #[test]
    fn permission_depends_on_the_key_only() {
        let deployments = Deployments::default();
        let key = Address::repeat_byte(0x2d);
        let plain = ownable_session(&deployments, key).unwrap();
        let with_action = plain.clone().with_action(sudo_action(
            deployments.sudo_policy,
            Address::repeat_byte(0x01),
            [0u8; 4],
        ));

        assert_eq!(permission_id(&plain), permission_id(&with_action));
        assert_ne!(
            permission_id(&plain),
            permission_id(&ownable_session(&deployments, Address::repeat_byte(0x2e)).unwrap())
        );
    }
}
