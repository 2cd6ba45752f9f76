//! Lenient readers for host event properties. Mobile hosts send numbers as
//! strings often enough that every numeric read accepts both.

use rudder_core::Properties;
use serde_json::Value;

/// First non-empty string (or number rendered as a string) among `keys`.
pub(crate) fn string(props: &Properties, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match props.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// First value among `keys` readable as a number.
pub(crate) fn number(props: &Properties, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| as_number(props.get(*key)?))
}

pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Largest playhead or index accepted from the host, roughly 31 years.
pub(crate) const MAX_SECONDS: i64 = 1_000_000_000;

/// Whole seconds, truncated and clamped to `0..=MAX_SECONDS`. NaN and
/// infinities read as absent.
pub(crate) fn seconds(props: &Properties, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .filter_map(|key| as_number(props.get(*key)?))
        .find(|n| n.is_finite())
        .map(|n| n.clamp(0.0, MAX_SECONDS as f64) as i64)
}

pub(crate) fn flag(props: &Properties, key: &str) -> bool {
    match props.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_lenient_reads() {
        let p = props(json!({
            "title": "",
            "name": "Pilot",
            "position": "12.9",
            "length": 300,
            "livestream": "TRUE",
            "episode": 4
        }));

        assert_eq!(string(&p, &["title", "name"]).as_deref(), Some("Pilot"));
        assert_eq!(string(&p, &["episode"]).as_deref(), Some("4"));
        assert_eq!(string(&p, &["missing"]), None);
        assert_eq!(number(&p, &["length"]), Some(300.0));
        assert_eq!(seconds(&p, &["position"]), Some(12));
        assert!(flag(&p, "livestream"));
        assert!(!flag(&p, "missing"));
    }

    #[test]
    fn test_seconds_out_of_range() {
        let p = props(json!({
            "huge": 1e30,
            "negative": -12,
            "nan": "NaN",
            "inf": "inf"
        }));

        assert_eq!(seconds(&p, &["huge"]), Some(MAX_SECONDS));
        assert_eq!(seconds(&p, &["negative"]), Some(0));
        assert_eq!(seconds(&p, &["nan"]), None);
        assert_eq!(seconds(&p, &["inf"]), None);
        assert_eq!(seconds(&p, &["nan", "huge"]), Some(MAX_SECONDS));
    }
}
