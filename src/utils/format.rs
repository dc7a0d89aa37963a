use chrono::{DateTime, Local, Utc};

const MICROALGOS_PER_ALGO: u64 = 1_000_000;
const EXPLORER_TX_URL: &str = "https://testnet.allo.info/tx";

/// `ABCDEF...UVWXYZ` for anything longer than twelve characters
pub fn short_address(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 12 {
        return value.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{}...{}", head, tail)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// microAlgos as ALGO with two to six decimals
pub fn format_algo(amount: u64) -> String {
    let whole = amount / MICROALGOS_PER_ALGO;
    let fraction = format!("{:06}", amount % MICROALGOS_PER_ALGO);
    let trimmed = fraction.trim_end_matches('0');
    let decimals = if trimmed.len() < 2 { &fraction[..2] } else { trimmed };
    format!("{}.{} ALGO", group_thousands(whole), decimals)
}

pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// TestNet explorer page for a transaction
pub fn explorer_url(tx_id: &str) -> String {
    format!("{}/{}", EXPLORER_TX_URL, tx_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("TW3A3ZK4HPAQ3FGBGGQJW6CA67U65M4TDKH3DH645EYL46P37NA2T6Z2MI"),
            "TW3A3Z...T6Z2MI"
        );
        assert_eq!(short_address("SHORT"), "SHORT");
    }

    #[test]
    fn test_format_algo() {
        assert_eq!(format_algo(100_000), "0.10 ALGO");
        assert_eq!(format_algo(1_000_000), "1.00 ALGO");
        assert_eq!(format_algo(1_234_567), "1.234567 ALGO");
        assert_eq!(format_algo(1_500_000_000), "1,500.00 ALGO");
        assert_eq!(format_algo(1_500_250_000), "1,500.25 ALGO");
        assert_eq!(format_algo(0), "0.00 ALGO");
    }

    #[test]
    fn test_explorer_url() {
        assert_eq!(explorer_url("TX42"), "https://testnet.allo.info/tx/TX42");
    }
}
