//! Readiness checks for locally started services

use crate::{BundlerClient, ClientError};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

const CHECK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Deserialize)]
struct Pong {
    message: String,
}

/// Waits until the bundler answers `eth_chainId`
pub async fn ensure_bundler_ready(
    bundler: &BundlerClient,
    timeout: Duration,
) -> Result<(), ClientError> {
    let deadline = Instant::now() + timeout;

    loop {
        match bundler.chain_id().await {
            Ok(chain_id) => {
                info!("Bundler {} ready (chain {chain_id})", bundler.url);
                return Ok(());
            }
            Err(err) => warn!("Bundler {} not ready yet: {err}", bundler.url),
        }

        if Instant::now() >= deadline {
            return Err(ClientError::Timeout { what: "bundler".into(), secs: timeout.as_secs() });
        }
        sleep(CHECK_INTERVAL).await;
    }
}

async fn ping(http: &reqwest::Client, url: &str) -> Result<bool, ClientError> {
    let pong = http.get(format!("{url}/ping")).send().await?.json::<Pong>().await?;
    Ok(pong.message == "pong")
}

/// Waits until `GET {url}/ping` returns `{"message":"pong"}`
pub async fn ensure_paymaster_ready(url: &str, timeout: Duration) -> Result<(), ClientError> {
    let http = reqwest::Client::new();
    let url = url.trim_end_matches('/');
    let deadline = Instant::now() + timeout;

    loop {
        match ping(&http, url).await {
            Ok(true) => {
                info!("Paymaster {url} ready");
                return Ok(());
            }
            Ok(false) => warn!("Paymaster {url} not ready yet"),
            Err(err) => warn!("Paymaster {url} not ready yet: {err}"),
        }

        if Instant::now() >= deadline {
            return Err(ClientError::Timeout { what: "paymaster".into(), secs: timeout.as_secs() });
        }
        sleep(CHECK_INTERVAL).await;
    }
}
