//! Guardians lowering the threshold of an account whose owners can no longer reach it

use crate::{Endpoints, HttpSmartAccountClient, SmartAccountClient};
use ethers::{providers::Middleware, types::Address};
use eyre::ensure;
use futures::future::try_join_all;
use modulor_modules::{
    ownable::{ownable_validator, set_threshold_action},
    social_recovery::{
        combine_guardian_signatures, social_recovery_mock_signature, social_recovery_validator,
    },
    Safe7579Account,
};
use modulor_primitives::{
    constants::{automations::SESSION_KEY, testnet::TRANSFER_RECIPIENT},
    Deployments, Execution, UserOperationReceipt, Wallet,
};
use tracing::info;

/// Executes `calls` co-signed by `guardians`, in the given order
pub async fn send_with_guardians<M: Middleware + 'static>(
    client: &SmartAccountClient<M>,
    guardians: &[Wallet],
    calls: &[Execution],
) -> eyre::Result<UserOperationReceipt> {
    let threshold = guardians.len() as u64;
    let nonce = client.nonce(client.deployments.social_recovery).await?;
    let uo = client
        .prepare_user_operation(calls, nonce, social_recovery_mock_signature(threshold))
        .await?;

    let hash = client.hash(&uo).0;
    let signatures =
        try_join_all(guardians.iter().map(|guardian| guardian.sign_hash(hash))).await?;
    let uo = uo.signature(combine_guardian_signatures(&signatures));

    info!("Sending user operation signed by {threshold} guardian(s)");
    let hash = client.send_user_operation(&uo).await?;
    client.wait(hash).await
}

/// Deploys an account guarded by two guardians and has them lower its threshold to one
///
/// The ownable validator starts with two owners and a threshold of two, the guardians' first
/// user operation deploys the account and recovers it.
pub async fn run(
    endpoints: &Endpoints,
    deployments: Deployments,
    guardians: Vec<Wallet>,
) -> eyre::Result<UserOperationReceipt> {
    ensure!(!guardians.is_empty(), "at least one guardian is required");

    let owner = Wallet::random();
    let owners: [Address; 2] = [SESSION_KEY.parse()?, TRANSFER_RECIPIENT.parse()?];
    let guardian_addresses = guardians.iter().map(Wallet::address).collect::<Vec<_>>();

    let account = Safe7579Account::new(owner.address(), &deployments)
        .with_validator(ownable_validator(deployments.ownable_validator, &owners, 2)?)
        .with_validator(social_recovery_validator(
            deployments.social_recovery,
            &guardian_addresses,
            guardian_addresses.len() as u64,
        )?);
    let client = HttpSmartAccountClient::connect(endpoints, deployments, account).await?;

    let recovery = set_threshold_action(client.deployments.ownable_validator, 1);
    send_with_guardians(&client, &guardians, &[recovery]).await
}
