use ethers::types::{Address, U256};
use modulor_recipes::intent::IntentMode;
use pin_utils::pin_mut;
use std::{future::Future, str::FromStr};
use tracing::info;

/// Parses address from string
pub fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|_| format!("String {s} is not a valid address"))
}

/// Parses U256 from string
pub fn parse_u256(s: &str) -> Result<U256, String> {
    U256::from_str_radix(s, 10).map_err(|_| format!("String {s} is not a valid U256"))
}

/// Parses IntentMode from string
pub fn parse_intent_mode(s: &str) -> Result<IntentMode, String> {
    IntentMode::from_str(s).map_err(|_| format!("String {s} is not a valid IntentMode"))
}

/// Accepts 64 hex digits, with or without `0x`
pub fn validate_private_key(hex_string: &str) -> Result<String, String> {
    let digits = hex_string.trim_start_matches("0x");

    if digits.chars().count() != 64 {
        return Err(format!("{hex_string} is not a valid private key"));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("{hex_string} is not a valid hexadecimal string"));
    }

    Ok(String::from(digits))
}

/// Runs the future to completion or until:
/// - `ctrl-c` is received.
/// - `SIGTERM` is received (unix only).
pub async fn run_until_ctrl_c<F, E>(fut: F) -> Result<(), E>
where
    F: Future<Output = Result<(), E>>,
    E: Send + Sync + 'static + From<std::io::Error>,
{
    let ctrl_c = tokio::signal::ctrl_c();

    let mut stream = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let sigterm = stream.recv();
    pin_mut!(sigterm, ctrl_c, fut);

    tokio::select! {
        _ = ctrl_c => {
            info!("Received ctrl-c signal.");
        },
        _ = sigterm => {
            info!("Received SIGTERM signal.");
        },
        res = fut => res?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn private_keys() {
        let key = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        assert_eq!(validate_private_key(key), Ok(key.to_string()));
        assert_eq!(validate_private_key(&format!("0x{key}")), Ok(key.to_string()));
        assert!(validate_private_key(&key[2..]).is_err());
        assert!(validate_private_key(&key.replace('a', "g")).is_err());
    }

    #[test]
    fn numbers_and_modes() {
        assert_eq!(parse_u256("200000"), Ok(U256::from(200_000)));
        assert!(parse_u256("0x10").is_err());
        assert_eq!(parse_intent_mode("cross-chain"), Ok(IntentMode::CrossChain));
        assert!(parse_intent_mode("bridge").is_err());
    }
}
