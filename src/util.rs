// src/util.rs

use ethereum_types::U256;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Contracts treated as safe counterparties: stablecoins for asset
/// composition, plus routers and marketplaces that legitimately hold
/// broad approvals. All entries lowercase.
static TRUSTED_CONTRACTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        // Stablecoins
        "0xdac17f958d2ee523a2206206994597c13d831ec7", // USDT
        "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", // USDC
        "0x6b175474e89094c44da98b954eedeac495271d0f", // DAI
        "0x4fabb145d64652a948d72533023f6e7a623c7c53", // BUSD
        "0x1456688345527be1f37e9e627da0837d6f08c925", // GUSD
        "0x57ab1ec28d129707052df4df418d58a2d46d5f51", // sUSD
        "0x0000000000085d4780b73119b644ae5ecd22b376", // TUSD
        // Infrastructure
        "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", // WETH
        // DEX routers
        "0x7a250d5630b4cf539739df2c5dacb4c659f2488d", // Uniswap V2
        "0xe592427a0aece92de3edee1f18e0157c05861564", // Uniswap V3
        "0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad", // Uniswap Universal Router
        "0x68b3465833fb72a70ecdf485e0e4c7bd8665fc45", // Uniswap V3 Router 2
        "0x1111111254fb6c44bac0bed2854e76f90643097d", // 1inch V5
        "0xdef1c0ded9bec7f1a1670819833240f027b25eff", // 0x Exchange Proxy
        // NFT marketplaces
        "0x00000000000000adc04c56bf30ac9d3c0aaf14dc", // Seaport 1.5
        "0x00000000006c3852cbef3e08e8df289169ede581", // Seaport 1.1
    ])
});

/// Case-insensitive allowlist lookup.
pub fn is_trusted(address: &str) -> bool {
    TRUSTED_CONTRACTS.contains(address.to_lowercase().as_str())
}

/// Block-explorer link for an address, used in evidence payloads.
pub fn address_url(address: &str) -> String {
    format!("https://etherscan.io/address/{}", address)
}

/// Converts an integer base-unit amount into token units using the token's
/// declared decimal count. Returns `None` when the amount is not a decimal
/// integer; callers treat that as a zero/safe value.
pub fn parse_token_amount(amount: &str, decimals: u32) -> Option<f64> {
    let raw = U256::from_dec_str(amount.trim()).ok()?;
    // U256 has no lossless f64 conversion; go through the decimal string.
    let as_float: f64 = raw.to_string().parse().ok()?;
    Some(as_float / 10f64.powi(decimals as i32))
}

/// Hex quantity (JSON-RPC style, `0x`-prefixed) to decimal string. `"0x"`
/// means zero on the Alchemy wire.
pub fn hex_to_dec_string(hex: &str) -> Option<String> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    if digits.is_empty() {
        return Some("0".to_string());
    }
    U256::from_str_radix(digits, 16).ok().map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_trusted_case_insensitive() {
        assert!(is_trusted("0xdAC17F958D2ee523a2206206994597C13D831ec7")); // USDT
        assert!(is_trusted("0xdac17f958d2ee523a2206206994597c13d831ec7"));
        assert!(!is_trusted("0x0000000000000000000000000000000000000001"));
    }

    #[test]
    fn test_parse_token_amount() {
        assert_eq!(
            parse_token_amount("1000000000000000000", 18),
            Some(1.0)
        );
        assert_eq!(parse_token_amount("500000000000000000", 18), Some(0.5));
        assert_eq!(parse_token_amount("1500000", 6), Some(1.5));
        assert_eq!(parse_token_amount("not-a-number", 18), None);
        assert_eq!(parse_token_amount("", 18), None);
    }

    #[test]
    fn test_parse_token_amount_beyond_u128() {
        // 2^128 in base units still converts.
        let amount = "340282366920938463463374607431768211456";
        let parsed = parse_token_amount(amount, 18).unwrap();
        assert!(parsed > 3.4e20 && parsed < 3.5e20);
    }

    #[test]
    fn test_hex_to_dec_string() {
        assert_eq!(hex_to_dec_string("0x").as_deref(), Some("0"));
        assert_eq!(hex_to_dec_string("0x0").as_deref(), Some("0"));
        assert_eq!(
            hex_to_dec_string("0xde0b6b3a7640000").as_deref(),
            Some("1000000000000000000")
        );
        assert_eq!(hex_to_dec_string("0xzz"), None);
    }
}
