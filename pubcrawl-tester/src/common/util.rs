pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a decimal or `0x`-prefixed hexadecimal seed.
pub fn parse_seed_token(token: &str) -> Option<u64> {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        let digits: String = hex.chars().filter(|c| *c != '_').collect();
        return u64::from_str_radix(&digits, 16).ok();
    }
    token.replace('_', "").parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn parses_decimal_and_hex_seeds() {
        assert_eq!(parse_seed_token("1337"), Some(1337));
        assert_eq!(parse_seed_token("0x00C0_FFEE"), Some(0x00C0_FFEE));
        assert_eq!(parse_seed_token("0Xff"), Some(255));
        assert_eq!(parse_seed_token("1_000"), Some(1000));
        assert_eq!(parse_seed_token("-7"), None);
        assert_eq!(parse_seed_token("0xZZ"), None);
        assert_eq!(parse_seed_token("seven"), None);
    }
}
