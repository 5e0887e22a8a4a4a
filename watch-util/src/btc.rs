use bitcoincore_rpc::bitcoin::address::NetworkUnchecked;
use bitcoincore_rpc::bitcoin::{Address, Amount, Network};
use std::str::FromStr;

/// Checks that `address` parses as a Bitcoin address and returns it trimmed.
/// Addresses for networks other than mainnet are accepted with a warning,
/// since the public data provider only indexes mainnet.
pub fn parse_watch_address(address: &str) -> Result<String, String> {
    let address = address.trim();
    if address.is_empty() {
        let msg = "Watch address is empty".to_string();
        error!("{}", msg);
        return Err(msg);
    }

    let addr = Address::<NetworkUnchecked>::from_str(address).map_err(|e| {
        let msg = format!("Invalid address {}: {}", address, e);
        error!("{}", msg);
        msg
    })?;

    if !addr.is_valid_for_network(Network::Bitcoin) {
        warn!("Address {} is not a mainnet address", address);
    }

    Ok(address.to_string())
}

/// Formats a satoshi amount as BTC with eight decimals.
pub fn format_btc(sat: u64) -> String {
    format!("{:.8}", Amount::from_sat(sat).to_btc())
}
