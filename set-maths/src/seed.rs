//! Initial registry contents: built-in seeds, JSON seed files and derived
//! Mersenne sets.

use std::path::Path;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::Deserialize;
use set_core::{from_literals, mersenne, parse_decimal};

use crate::error::SetError;
use crate::registry::Registry;

/// Exponents p of the first 23 Mersenne primes 2^p - 1.
pub const MERSENNE_EXPONENTS: [u64; 23] = [
    2, 3, 5, 7, 13, 17, 19, 31, 61, 89, 107, 127, 521, 607, 1279, 2203, 2281, 3217, 4253, 4423,
    9689, 9941, 11213,
];

/// The next five Mersenne-prime exponents, kept as decimal literals.
pub const LARGE_EXPONENTS: [&str; 5] = ["44497", "86243", "110503", "132049", "216091"];

/// Largest exponent [`mersenne_numbers`] will expand.
pub const MAX_MERSENNE_EXPONENT: u32 = 1 << 20;

/// Registry with `set21` (small exponents) and `set22` (large exponents).
/// The counter starts at 23.
pub fn default_registry() -> Result<Registry, SetError> {
    let mut registry = Registry::new(1);
    registry.seed("set21", from_literals(&MERSENNE_EXPONENTS))?;
    let large = LARGE_EXPONENTS
        .iter()
        .map(|s| parse_decimal(s))
        .collect::<Result<Vec<_>, _>>()?;
    registry.seed("set22", large)?;
    Ok(registry)
}

/// JSON seed file layout.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedFile {
    pub sets: Vec<SeedSet>,
    /// Lower bound for the first minted index. Raised automatically past any
    /// seeded `set<N>` name.
    #[serde(default)]
    pub next_set_index: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSet {
    pub name: String,
    pub values: Vec<SeedValue>,
}

/// A seed value: decimal string for arbitrary size, or a JSON integer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SeedValue {
    Integer(i64),
    Decimal(String),
}

impl SeedValue {
    fn to_bigint(&self) -> Result<BigInt, SetError> {
        match self {
            SeedValue::Integer(v) => Ok(BigInt::from(*v)),
            SeedValue::Decimal(s) => Ok(parse_decimal(s)?),
        }
    }
}

impl SeedFile {
    pub fn into_registry(self) -> Result<Registry, SetError> {
        let mut registry = Registry::new(self.next_set_index.unwrap_or(1));
        for set in self.sets {
            let values = set
                .values
                .iter()
                .map(SeedValue::to_bigint)
                .collect::<Result<Vec<_>, _>>()?;
            registry.seed(set.name, values)?;
        }
        Ok(registry)
    }
}

/// Build a registry from seed-file JSON text.
pub fn registry_from_json(text: &str) -> Result<Registry, SetError> {
    let seed: SeedFile = serde_json::from_str(text).map_err(|e| SetError::SeedFile {
        path: "<inline>".into(),
        reason: e.to_string(),
    })?;
    seed.into_registry()
}

/// Read and parse a JSON seed file.
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Registry, SetError> {
    let path = path.as_ref();
    let seed_err = |reason: String| SetError::SeedFile {
        path: path.to_path_buf(),
        reason,
    };

    let text = std::fs::read_to_string(path).map_err(|e| seed_err(e.to_string()))?;
    let seed: SeedFile = serde_json::from_str(&text).map_err(|e| seed_err(e.to_string()))?;
    let registry = seed.into_registry()?;

    log::info!("loaded {} seed sets from {}", registry.len(), path.display());
    Ok(registry)
}

/// Map each exponent p in set `name` to the Mersenne number 2^p - 1.
///
/// Values outside `2..=MAX_MERSENNE_EXPONENT` are skipped with a warning.
pub fn mersenne_numbers(registry: &Registry, name: &str) -> Result<Vec<BigInt>, SetError> {
    let exponents = registry.lookup(name)?;
    let mut numbers = Vec::with_capacity(exponents.len());
    for exponent in exponents {
        match exponent.to_u32() {
            Some(p) if (2..=MAX_MERSENNE_EXPONENT).contains(&p) => numbers.push(mersenne(p)),
            _ => log::warn!("skipping exponent {} from {}: out of range", exponent, name),
        }
    }
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use set_core::is_probable_prime;

    #[test]
    fn test_default_registry() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.names(), ["set21", "set22"]);
        assert_eq!(registry.lookup("set21").unwrap().len(), 23);
        assert_eq!(registry.lookup("set22").unwrap().len(), 5);
        assert_eq!(registry.lookup("set22").unwrap()[4], BigInt::from(216091u32));
        assert_eq!(registry.next_set_index(), 23);
    }

    #[test]
    fn test_seed_json_with_mixed_values() {
        let json = r#"{
            "sets": [
                {"name": "primes", "values": [2, 3, "5"]},
                {"name": "set40", "values": ["340282366920938463463374607431768211507", -7]}
            ]
        }"#;
        let registry = registry_from_json(json).unwrap();
        assert_eq!(registry.names(), ["primes", "set40"]);
        assert_eq!(registry.lookup("primes").unwrap(), from_literals(&[2, 3, 5]).as_slice());
        let big = registry.lookup("set40").unwrap();
        assert_eq!(big[0].to_string(), "340282366920938463463374607431768211507");
        assert_eq!(big[1], BigInt::from(-7));
        assert_eq!(registry.next_set_index(), 41);
    }

    #[test]
    fn test_seed_json_explicit_counter() {
        let json = r#"{"sets": [{"name": "set3", "values": [1]}], "next_set_index": 100}"#;
        assert_eq!(registry_from_json(json).unwrap().next_set_index(), 100);

        // A counter that would collide is raised past the seeded names.
        let json = r#"{"sets": [{"name": "set30", "values": [1]}], "next_set_index": 5}"#;
        assert_eq!(registry_from_json(json).unwrap().next_set_index(), 31);
    }

    #[test]
    fn test_seed_json_errors() {
        let bad_value = r#"{"sets": [{"name": "a", "values": ["12x"]}]}"#;
        assert!(matches!(registry_from_json(bad_value), Err(SetError::InvalidValue(_))));

        let duplicate = r#"{"sets": [{"name": "a", "values": []}, {"name": "a", "values": []}]}"#;
        assert!(matches!(registry_from_json(duplicate), Err(SetError::DuplicateSetName(_))));

        assert!(matches!(registry_from_json("{not json"), Err(SetError::SeedFile { .. })));
    }

    #[test]
    fn test_load_seed_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_seed_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SetError::SeedFile { .. }));
    }

    #[test]
    fn test_mersenne_numbers_from_exponents() {
        let mut registry = Registry::new(1);
        registry
            .seed("exps", vec![BigInt::from(2), BigInt::from(7), BigInt::from(-3), BigInt::from(1)])
            .unwrap();
        let numbers = mersenne_numbers(&registry, "exps").unwrap();
        assert_eq!(numbers, vec![BigInt::from(3), BigInt::from(127)]);

        assert!(matches!(
            mersenne_numbers(&registry, "nope"),
            Err(SetError::UnknownSetName(_))
        ));
    }

    #[test]
    fn test_default_exponents_give_mersenne_primes() {
        let registry = default_registry().unwrap();
        let numbers = mersenne_numbers(&registry, "set21").unwrap();
        assert_eq!(numbers.len(), 23);
        for m in numbers.iter().take(14) {
            assert!(is_probable_prime(m));
        }
    }
}
