// src/config.rs
use crate::domain::layout::LayoutPolicy;
use crate::domain::operational::{CityTaxPolicy, OperationalSet};
use crate::domain::store::SortOrder;
use std::collections::HashMap;

pub const COOKIE_ENV: &str = "AIRBNB_COOKIE";
pub const API_KEY_ENV: &str = "AIRBNB_API_KEY";

/// A config key the tool understands, with its default and a hint for the host.
pub struct ConfigKey {
    pub key: &'static str,
    pub default: &'static str,
    pub instructions: &'static str,
}

pub const CONFIG_KEYS: &[ConfigKey] = &[
    ConfigKey {
        key: "cookie",
        default: "PUT COOKIE VALUE HERE",
        instructions: "Value of the _aaj cookie from a logged-in airbnb.com session",
    },
    ConfigKey {
        key: "key",
        default: "PUT KEY VALUE HERE",
        instructions: "API key sent with the reservations download request",
    },
    ConfigKey {
        key: "city_tax_rate",
        default: "PUT RATE HERE",
        instructions: "City tax per adult per night, e.g. 2.5",
    },
    ConfigKey {
        key: "city_tax_max_nights",
        default: "7",
        instructions: "Nights after which no more city tax is charged",
    },
    ConfigKey {
        key: "sort_order",
        default: "asc",
        instructions: "Row order by start date: asc or desc",
    },
    ConfigKey {
        key: "operational_columns",
        default: "basic",
        instructions: "basic (tax, check-in/out, cleaned) or extended (adds tax and document tracking, notes)",
    },
    ConfigKey {
        key: "clear_notes",
        default: "true",
        instructions: "Empty the Note column on every sync: true or false",
    },
    ConfigKey {
        key: "currency",
        default: "EUR",
        instructions: "Currency Airbnb reports earnings in",
    },
    ConfigKey {
        key: "page_size",
        default: "40",
        instructions: "Reservations requested per sync (only the first page is read)",
    },
    ConfigKey {
        key: "locale",
        default: "en",
        instructions: "Locale of the Airbnb export",
    },
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("'{0}' is not set. Please update the config table.")]
    Missing(&'static str),
    #[error("'{key}' has invalid value '{value}': expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("unknown config key '{0}'")]
    UnknownKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub cookie: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    cookie: Option<String>,
    api_key: Option<String>,
    pub layout: LayoutPolicy,
    pub currency: String,
    pub locale: String,
    pub page_size: u32,
}

/// Placeholder values seeded into a new config table count as unset.
fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || (v.starts_with("PUT ") && v.ends_with(" HERE"))
}

pub fn known_key(key: &str) -> Result<&'static ConfigKey, ConfigError> {
    CONFIG_KEYS
        .iter()
        .find(|k| k.key == key)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
}

impl Settings {
    /// Builds settings from config-table entries. Secrets are read but only
    /// checked by [`Settings::credentials`]; everything else must be valid here.
    pub fn from_entries(entries: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let value = |key: &'static str| -> Option<&str> {
            entries
                .get(key)
                .map(String::as_str)
                .filter(|v| !is_placeholder(v))
        };
        let or_default = |key: &'static str| -> &str {
            value(key).unwrap_or_else(|| {
                known_key(key).map(|k| k.default).unwrap_or_default()
            })
        };

        let rate_raw = value("city_tax_rate").ok_or(ConfigError::Missing("city_tax_rate"))?;
        let rate = rate_raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite() && *r >= 0.0)
            .ok_or_else(|| ConfigError::Invalid {
                key: "city_tax_rate",
                value: rate_raw.to_string(),
                expected: "a non-negative number",
            })?;

        let max_nights = parse_number("city_tax_max_nights", or_default("city_tax_max_nights"))?;
        let page_size = parse_number("page_size", or_default("page_size"))?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "page_size",
                value: "0".to_string(),
                expected: "a positive whole number",
            });
        }

        let sort_raw = or_default("sort_order");
        let sort = SortOrder::parse(sort_raw).ok_or_else(|| ConfigError::Invalid {
            key: "sort_order",
            value: sort_raw.to_string(),
            expected: "asc or desc",
        })?;

        let columns_raw = or_default("operational_columns");
        let operational =
            OperationalSet::parse(columns_raw).ok_or_else(|| ConfigError::Invalid {
                key: "operational_columns",
                value: columns_raw.to_string(),
                expected: "basic or extended",
            })?;

        let clear_raw = or_default("clear_notes");
        let clear_notes = match clear_raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "clear_notes",
                    value: clear_raw.to_string(),
                    expected: "true or false",
                })
            }
        };

        Ok(Settings {
            cookie: value("cookie").map(str::to_string),
            api_key: value("key").map(str::to_string),
            layout: LayoutPolicy {
                sort,
                operational,
                city_tax: CityTaxPolicy { rate, max_nights },
                clear_notes,
            },
            currency: or_default("currency").trim().to_string(),
            locale: or_default("locale").trim().to_string(),
            page_size,
        })
    }

    /// Replaces the stored secrets with `AIRBNB_COOKIE` / `AIRBNB_API_KEY`
    /// when those are set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(cookie) = std::env::var(COOKIE_ENV).ok().filter(|v| !is_placeholder(v)) {
            self.cookie = Some(cookie);
        }
        if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|v| !is_placeholder(v)) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let cookie = self.cookie.clone().ok_or(ConfigError::Missing("cookie"))?;
        let api_key = self.api_key.clone().ok_or(ConfigError::Missing("key"))?;
        Ok(Credentials { cookie, api_key })
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse::<u32>().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        expected: "a whole number",
    })
}
