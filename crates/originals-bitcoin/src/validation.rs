//! Shared input validation for the bitcoin manager (§4.13).

use std::str::FromStr;

use bitcoin::{Address, Network};
use originals_core::{
    constants::{MAX_FEE_RATE_SAT_VB, MAX_SATOSHI, MIN_FEE_RATE_SAT_VB},
    BtcoNetwork, OriginalsError,
};
use originals_interfaces::ordinals::DUST_LIMIT_SATS;

pub const MAX_REVEAL_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;

pub fn validate_fee_rate(sat_per_vb: u64) -> Result<(), OriginalsError> {
    if sat_per_vb < MIN_FEE_RATE_SAT_VB || sat_per_vb > MAX_FEE_RATE_SAT_VB {
        return Err(OriginalsError::InvalidFeeRate(sat_per_vb));
    }
    Ok(())
}

pub fn validate_satoshi(satoshi: u128) -> Result<(), OriginalsError> {
    if satoshi >= MAX_SATOSHI {
        return Err(OriginalsError::InvalidSatoshi(satoshi));
    }
    Ok(())
}

pub fn validate_payload_size(bytes: &[u8]) -> Result<(), OriginalsError> {
    if bytes.len() > MAX_REVEAL_PAYLOAD_BYTES {
        return Err(OriginalsError::RevealPayloadTooLarge { size: bytes.len() });
    }
    Ok(())
}

fn bitcoin_network_for(network: BtcoNetwork) -> Network {
    match network {
        BtcoNetwork::Mainnet => Network::Bitcoin,
        BtcoNetwork::Test => Network::Testnet,
        BtcoNetwork::Sig => Network::Signet,
    }
}

/// Parse and validate a recipient address against the expected network (§4.13).
pub fn validate_address(address: &str, network: BtcoNetwork) -> Result<Address, OriginalsError> {
    let unchecked = Address::from_str(address).map_err(|e| OriginalsError::InvalidAddress(e.to_string()))?;
    unchecked
        .require_network(bitcoin_network_for(network))
        .map_err(|e| OriginalsError::InvalidAddress(e.to_string()))
}

/// Reject a value output below the dust limit (§4.13).
pub fn validate_above_dust(value_sats: u64) -> Result<(), OriginalsError> {
    if value_sats < DUST_LIMIT_SATS {
        return Err(OriginalsError::InsufficientFunds { required: DUST_LIMIT_SATS, available: value_sats });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_rate_out_of_range_is_rejected() {
        assert!(validate_fee_rate(0).is_err());
        assert!(validate_fee_rate(10_001).is_err());
        assert!(validate_fee_rate(5).is_ok());
    }

    #[test]
    fn satoshi_at_or_above_max_is_rejected() {
        assert!(validate_satoshi(MAX_SATOSHI).is_err());
        assert!(validate_satoshi(MAX_SATOSHI - 1).is_ok());
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let bytes = vec![0u8; MAX_REVEAL_PAYLOAD_BYTES + 1];
        assert!(validate_payload_size(&bytes).is_err());
    }

    #[test]
    fn below_dust_limit_is_rejected() {
        assert!(validate_above_dust(1).is_err());
        assert!(validate_above_dust(DUST_LIMIT_SATS).is_ok());
    }

    #[test]
    fn mainnet_address_validates_on_mainnet() {
        let address = validate_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4", BtcoNetwork::Mainnet);
        assert!(address.is_ok());
    }

    #[test]
    fn mainnet_address_rejected_on_testnet() {
        let address = validate_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4", BtcoNetwork::Test);
        assert!(address.is_err());
    }
}
