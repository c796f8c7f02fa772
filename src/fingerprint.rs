//! Fingerprint derivation for calculation parameter records

use serde::{Serialize, Serializer};
use std::fmt;
use xxhash_rust::xxh3::xxh3_128;

use crate::error::Result;

/// Key for cache lookups, derived from a calculation's parameter record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u128);

impl Fingerprint {
    /// Derive a fingerprint from a parameter record.
    ///
    /// The record is serialized to canonical JSON (object keys sorted) before
    /// hashing, so two records with the same field/value pairs produce the
    /// same fingerprint regardless of field order.
    pub fn from_params<T: Serialize>(params: &T) -> Result<Self> {
        // serde_json's Value maps are BTreeMap-backed, so rendering a Value
        // emits object keys in sorted order.
        let canonical = serde_json::to_value(params)?.to_string();
        Ok(Self(xxh3_128(canonical.as_bytes())))
    }

    /// Create a fingerprint from a pre-computed hash
    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct VoltageDropParams {
        length_m: f64,
        current_a: f64,
        cable_size_mm2: f64,
    }

    #[derive(Serialize)]
    struct ReorderedParams {
        cable_size_mm2: f64,
        current_a: f64,
        length_m: f64,
    }

    #[test]
    fn test_field_order_independence() {
        let a = VoltageDropParams {
            length_m: 50.0,
            current_a: 32.0,
            cable_size_mm2: 6.0,
        };
        let b = ReorderedParams {
            cable_size_mm2: 6.0,
            current_a: 32.0,
            length_m: 50.0,
        };

        assert_eq!(
            Fingerprint::from_params(&a).unwrap(),
            Fingerprint::from_params(&b).unwrap()
        );
    }

    #[test]
    fn test_value_sensitivity() {
        let a = json!({"voltage": 230.0, "phases": 3});
        let b = json!({"voltage": 231.0, "phases": 3});

        assert_ne!(
            Fingerprint::from_params(&a).unwrap(),
            Fingerprint::from_params(&b).unwrap()
        );
    }

    #[test]
    fn test_determinism_across_map_types() {
        let mut map = HashMap::new();
        map.insert("x", 1);
        map.insert("y", 2);
        let value = json!({"y": 2, "x": 1});

        assert_eq!(
            Fingerprint::from_params(&map).unwrap(),
            Fingerprint::from_params(&value).unwrap()
        );
    }

    #[test]
    fn test_nested_records() {
        let a = json!({"cable": {"size": 6.0, "cores": 4}, "run": 25.0});
        let b = json!({"run": 25.0, "cable": {"cores": 4, "size": 6.0}});

        assert_eq!(
            Fingerprint::from_params(&a).unwrap(),
            Fingerprint::from_params(&b).unwrap()
        );
    }

    #[test]
    fn test_unserializable_input() {
        let mut map = HashMap::new();
        map.insert(vec![1, 2], "non-string key");

        assert!(Fingerprint::from_params(&map).is_err());
    }

    #[test]
    fn test_display_is_hex() {
        let fp = Fingerprint::from_raw(0xdead_beef);
        let rendered = fp.to_string();

        assert_eq!(rendered.len(), 32);
        assert!(rendered.ends_with("deadbeef"));
    }
}
