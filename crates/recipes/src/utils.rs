use alloy_chains::{Chain, NamedChain};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Named chain for a chain id, for the token tables
pub fn named_chain(chain_id: u64) -> eyre::Result<NamedChain> {
    Chain::from_id(chain_id).named().ok_or_else(|| eyre::eyre!("unsupported chain {chain_id}"))
}

pub fn unix_seconds() -> eyre::Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

pub fn unix_millis() -> eyre::Result<u64> {
    millis(SystemTime::now().duration_since(UNIX_EPOCH)?)
}

fn millis(duration: Duration) -> eyre::Result<u64> {
    Ok(u64::try_from(duration.as_millis())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains() {
        assert_eq!(named_chain(11155111).unwrap(), NamedChain::Sepolia);
        assert_eq!(named_chain(84532).unwrap(), NamedChain::BaseSepolia);
        assert!(named_chain(0xdead_beef).is_err());
    }

    #[test]
    fn clocks_agree() {
        let seconds = unix_seconds().unwrap();
        let millis = unix_millis().unwrap();
        assert!(millis / 1000 >= seconds);
        assert!(millis / 1000 - seconds <= 1);
    }

    #[test]
    fn millis_out_of_range() {
        assert_eq!(millis(Duration::from_secs(1_700_000_000)).unwrap(), 1_700_000_000_000);
        assert!(millis(Duration::MAX).is_err());
    }
}
