//! Bag/group scope of a settings session
//!
//! A scope is an immutable value. Moving to another bag or back to the
//! general scope produces a new value with its cache tags already computed.

use super::error::SettingsError;

/// Tag carried by every settings cache entry, regardless of scope
pub const NAMESPACE_TAG: &str = "settings-manager";

/// Outer namespace (bag) and inner sub-namespace (group) of a settings session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    bag: Option<i64>,
    group: Option<String>,
    tags: Vec<String>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::general()
    }
}

impl Scope {
    /// Build a scope from optional parts.
    ///
    /// Fails with `InvalidScope` when a group is given without a bag.
    pub fn new(bag: Option<i64>, group: Option<String>) -> Result<Self, SettingsError> {
        if group.is_some() && bag.is_none() {
            return Err(SettingsError::group_without_bag());
        }
        let tags = compute_tags(bag, group.as_deref());
        Ok(Self { bag, group, tags })
    }

    /// The general scope: no bag, no group
    pub fn general() -> Self {
        Self {
            bag: None,
            group: None,
            tags: compute_tags(None, None),
        }
    }

    /// Scope for a bag, optionally narrowed to a group
    pub fn bag(bag: i64, group: Option<&str>) -> Self {
        let group = group.map(str::to_string);
        let tags = compute_tags(Some(bag), group.as_deref());
        Self {
            bag: Some(bag),
            group,
            tags,
        }
    }

    pub fn bag_id(&self) -> Option<i64> {
        self.bag
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn is_general(&self) -> bool {
        self.bag.is_none()
    }

    /// Cache tags of this scope, ordered namespace, bag, group
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.bag, &self.group) {
            (None, _) => write!(f, "general"),
            (Some(bag), None) => write!(f, "bag:{}", bag),
            (Some(bag), Some(group)) => write!(f, "bag:{}/group:{}", bag, group),
        }
    }
}

fn compute_tags(bag: Option<i64>, group: Option<&str>) -> Vec<String> {
    std::iter::once(NAMESPACE_TAG.to_string())
        .chain(bag.map(|b| b.to_string()))
        .chain(group.map(str::to_string))
        .collect()
}
