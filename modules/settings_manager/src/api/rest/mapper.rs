//! Mapper implementations for converting between DTOs and contract models

use super::dto::*;
use crate::contract;
use crate::domain::coercion::coerce_on_read;

// ===== Setting conversions =====

impl From<contract::Setting> for SettingDto {
    fn from(setting: contract::Setting) -> Self {
        let value = coerce_on_read(setting.value.as_deref(), &setting.r#type);
        Self {
            id: setting.id,
            key: setting.key,
            bag: setting.bag,
            group: setting.group,
            r#type: setting.r#type,
            value,
            cacheable: setting.cacheable,
            created_at: setting.created_at,
            updated_at: setting.updated_at,
        }
    }
}

impl From<contract::SettingsPage> for SettingsListResponse {
    fn from(page: contract::SettingsPage) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            per_page: page.per_page,
            next_cursor: page.next_cursor,
        }
    }
}

impl ScopeQuery {
    /// Validated scope for this request
    pub fn to_scope(&self) -> Result<contract::Scope, contract::SettingsError> {
        contract::Scope::new(self.bag, self.group.clone())
    }
}

impl ListSettingsQuery {
    pub fn to_scope(&self) -> Result<contract::Scope, contract::SettingsError> {
        contract::Scope::new(self.bag, self.group.clone())
    }

    /// Non-empty entries of the comma-separated `keys` filter
    pub fn key_filter(&self) -> Option<Vec<String>> {
        self.keys.as_ref().map(|keys| {
            keys.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}
