//! Contract models for settings manager
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, Utc};

/// Durable settings record
///
/// `(bag, group, key)` identifies the record. `key` is always the root
/// segment of a dotted key; nested paths live inside `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    /// Surrogate row id, used as the pagination cursor
    pub id: i64,
    /// Outer namespace
    pub bag: Option<i64>,
    /// Inner namespace, only present together with `bag`
    pub group: Option<String>,
    /// Root key
    pub key: String,
    /// Stored semantic type name (see [`SettingType`])
    pub r#type: String,
    /// Raw stored payload
    pub value: Option<String>,
    /// Whether reads of this record populate the cache
    pub cacheable: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Semantic type of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingType {
    String,
    Integer,
    Float,
    Boolean,
    /// Structured value (JSON object or array)
    Array,
}

impl SettingType {
    pub const ALL: [SettingType; 5] = [
        SettingType::String,
        SettingType::Integer,
        SettingType::Float,
        SettingType::Boolean,
        SettingType::Array,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingType::String => "string",
            SettingType::Integer => "integer",
            SettingType::Float => "float",
            SettingType::Boolean => "boolean",
            SettingType::Array => "array",
        }
    }
}

impl std::fmt::Display for SettingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SettingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown setting type '{}'", s))
    }
}

/// Listing request for one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Restrict to these root keys
    pub keys: Option<Vec<String>>,
    /// Page size
    pub per_page: u64,
    /// Return records with an id strictly greater than this
    pub cursor: Option<i64>,
}

/// One page of settings records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPage {
    pub items: Vec<Setting>,
    pub per_page: u64,
    /// Cursor for the following page, absent on the last page
    pub next_cursor: Option<i64>,
}
