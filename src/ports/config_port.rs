//! Configuration access port trait.
//!
//! Implementors supply raw values only; the typed getters parse them and
//! report unparsable values as [`MarketError::ConfigInvalid`]. A missing key
//! yields the caller's default.

use crate::domain::error::MarketError;
use chrono::NaiveDate;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait ConfigPort {
    /// Raw value with surrounding whitespace removed. Empty values read as absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, MarketError> {
        parse_or(self.get_string(section, key), section, key, default, "an integer")
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, MarketError> {
        parse_or(self.get_string(section, key), section, key, default, "a number")
    }

    /// Accepts true/yes/1 and false/no/0, case-insensitive.
    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, MarketError> {
        match self.get_string(section, key) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                MarketError::invalid_config(section, key, format!("'{raw}' is not a boolean"))
            }),
            None => Ok(default),
        }
    }

    fn get_u64(&self, section: &str, key: &str) -> Result<Option<u64>, MarketError> {
        self.get_string(section, key)
            .map(|raw| parse(&raw, section, key, "a non-negative integer"))
            .transpose()
    }

    fn get_date(&self, section: &str, key: &str) -> Result<Option<NaiveDate>, MarketError> {
        self.get_string(section, key)
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|_| {
                    MarketError::invalid_config(
                        section,
                        key,
                        format!("invalid date '{raw}' (expected YYYY-MM-DD)"),
                    )
                })
            })
            .transpose()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    section: &str,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, MarketError> {
    match raw {
        Some(raw) => parse(&raw, section, key, expected),
        None => Ok(default),
    }
}

fn parse<T: FromStr>(raw: &str, section: &str, key: &str, expected: &str) -> Result<T, MarketError> {
    raw.parse()
        .map_err(|_| MarketError::invalid_config(section, key, format!("'{raw}' is not {expected}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }
    }

    #[test]
    fn typed_getters_parse_values() {
        let config = MapConfig::new(&[
            ("a", "int", "42"),
            ("a", "float", "1.5"),
            ("a", "seed", "7"),
            ("a", "date", "2021-03-04"),
        ]);
        assert_eq!(config.get_int("a", "int", 0).unwrap(), 42);
        assert_eq!(config.get_double("a", "float", 0.0).unwrap(), 1.5);
        assert_eq!(config.get_u64("a", "seed").unwrap(), Some(7));
        assert_eq!(
            config.get_date("a", "date").unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 4)
        );
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = MapConfig::new(&[]);
        assert_eq!(config.get_int("a", "int", 9).unwrap(), 9);
        assert_eq!(config.get_double("a", "float", 2.5).unwrap(), 2.5);
        assert_eq!(config.get_u64("a", "seed").unwrap(), None);
        assert_eq!(config.get_date("a", "date").unwrap(), None);
    }

    #[test]
    fn bool_values() {
        let config = MapConfig::new(&[
            ("a", "t1", "true"),
            ("a", "t2", "YES"),
            ("a", "t3", "1"),
            ("a", "f1", "false"),
            ("a", "f2", "no"),
            ("a", "f3", "0"),
            ("a", "bad", "maybe"),
        ]);
        for key in ["t1", "t2", "t3"] {
            assert!(config.get_bool("a", key, false).unwrap());
        }
        for key in ["f1", "f2", "f3"] {
            assert!(!config.get_bool("a", key, true).unwrap());
        }
        assert!(config.get_bool("a", "missing", true).unwrap());
        assert!(matches!(
            config.get_bool("a", "bad", true),
            Err(MarketError::ConfigInvalid { key, .. }) if key == "bad"
        ));
    }

    #[test]
    fn unparsable_values_name_the_key() {
        let config = MapConfig::new(&[
            ("live", "tick_change_pct", "lots"),
            ("simulation", "start_date", "01/02/2020"),
            ("simulation", "seed", "-1"),
        ]);
        assert!(matches!(
            config.get_double("live", "tick_change_pct", 1.5),
            Err(MarketError::ConfigInvalid { section, key, .. })
                if section == "live" && key == "tick_change_pct"
        ));
        assert!(matches!(
            config.get_date("simulation", "start_date"),
            Err(MarketError::ConfigInvalid { key, .. }) if key == "start_date"
        ));
        assert!(config.get_u64("simulation", "seed").is_err());
    }
}
