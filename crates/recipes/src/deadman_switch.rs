//! Deadman switch: the nominee takes over an inactive account

use crate::{Endpoints, HttpSmartAccountClient, SmartAccountClient};
use ethers::providers::Middleware;
use eyre::eyre;
use modulor_contracts::DeadmanSwitchAPI;
use modulor_modules::{
    deadman_switch::{deadman_switch, deadman_switch_hook, deadman_switch_mock_signature},
    ownable::ownable_validator,
    registry::trust_attesters_action,
    Safe7579Account,
};
use modulor_primitives::{
    constants::registry::RHINESTONE_ATTESTER, Deployments, UserOperationReceipt, Wallet,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// Inactivity (in seconds) after which the nominee may act
pub const TIMEOUT: u64 = 1;
/// Time the account stays idle before the nominee steps in
pub const IDLE: Duration = Duration::from_secs(10);

/// Whether the switch is configured for the account (never for undeployed accounts)
pub async fn is_initialized<M: Middleware + 'static>(
    client: &SmartAccountClient<M>,
) -> eyre::Result<bool> {
    if !client.is_deployed().await? {
        return Ok(false);
    }
    let switch =
        DeadmanSwitchAPI::new(client.deployments.deadman_switch, client.eth_client.clone());
    switch
        .is_initialized(client.address)
        .call()
        .await
        .map_err(|err| eyre!("deadman switch state of {:?}: {err}", client.address))
}

/// Installs the switch (validator and hook), lets the timeout pass and has the nominee act
pub async fn run(
    endpoints: &Endpoints,
    deployments: Deployments,
    nominee: Wallet,
) -> eyre::Result<UserOperationReceipt> {
    let owner = Wallet::random();
    let account = Safe7579Account::new(owner.address(), &deployments).with_validator(
        ownable_validator(deployments.ownable_validator, &[owner.address()], 1)?,
    );
    let client = HttpSmartAccountClient::connect(endpoints, deployments, account).await?;
    let address = client.deployments.deadman_switch;

    let initialized = is_initialized(&client).await?;
    let validator = deadman_switch(address, nominee.address(), TIMEOUT, initialized)?;
    client.install_module(&validator, &owner).await?;
    client.install_module(&deadman_switch_hook(address), &owner).await?;

    info!("Waiting {IDLE:?} for the switch to trigger");
    sleep(IDLE).await;

    let action = trust_attesters_action(
        client.deployments.registry,
        1,
        &[RHINESTONE_ATTESTER.parse()?],
    );
    let nonce = client.nonce(address).await?;
    let uo = client
        .prepare_user_operation(&[action], nonce, deadman_switch_mock_signature())
        .await?;
    let signature = nominee.sign_hash(client.hash(&uo).0).await?;

    let hash = client.send_user_operation(&uo.signature(signature)).await?;
    client.wait(hash).await
}
