use regex::Regex;
use std::sync::OnceLock;

/// Memory sizes outside this range are treated as parse noise.
const MAX_RAM_GB: i32 = 1024;

/// Parse a free-text memory descriptor ("16GB", "8 G", "32gb DDR5") into gigabytes.
#[must_use]
pub fn parse_ram_gb(ram: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(\d{1,3})\s*(?:GB|G|gb|g)").expect("Invalid regex"));

    let caps = re.captures(ram)?;
    let value: i32 = caps.get(1)?.as_str().parse().ok()?;

    (1..=MAX_RAM_GB).contains(&value).then_some(value)
}

/// First integer in the descriptor, 0 when there is none. Used as the clustering feature.
#[must_use]
pub fn ram_value(ram: Option<&str>) -> f64 {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d+").expect("Invalid regex"));

    ram.and_then(|text| re.find(text))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Dashboard RAM buckets, in display order.
pub const RAM_BUCKETS: [&str; 6] = ["4GB", "8GB", "16GB", "32GB", "64GB", "128GB+"];

#[must_use]
pub const fn ram_bucket(gb: i32) -> &'static str {
    match gb {
        i32::MIN..=4 => "4GB",
        5..=8 => "8GB",
        9..=16 => "16GB",
        17..=32 => "32GB",
        33..=64 => "64GB",
        _ => "128GB+",
    }
}

#[must_use]
pub fn ram_bucket_order(label: &str) -> usize {
    RAM_BUCKETS
        .iter()
        .position(|b| *b == label)
        .unwrap_or(RAM_BUCKETS.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ram_gb() {
        assert_eq!(parse_ram_gb("16GB"), Some(16));
        assert_eq!(parse_ram_gb("8 G"), Some(8));
        assert_eq!(parse_ram_gb("32gb DDR5"), Some(32));
        assert_eq!(parse_ram_gb("内存 64G"), Some(64));
        assert_eq!(parse_ram_gb("unknown"), None);
        assert_eq!(parse_ram_gb("0GB"), None);
    }

    #[test]
    fn test_ram_value() {
        assert!((ram_value(Some("16GB")) - 16.0).abs() < f64::EPSILON);
        assert!((ram_value(Some("LPDDR5 32G")) - 5.0).abs() < f64::EPSILON);
        assert!(ram_value(Some("none")).abs() < f64::EPSILON);
        assert!(ram_value(None).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ram_bucket() {
        assert_eq!(ram_bucket(2), "4GB");
        assert_eq!(ram_bucket(4), "4GB");
        assert_eq!(ram_bucket(12), "16GB");
        assert_eq!(ram_bucket(64), "64GB");
        assert_eq!(ram_bucket(96), "128GB+");
        assert!(ram_bucket_order("8GB") < ram_bucket_order("128GB+"));
    }
}
