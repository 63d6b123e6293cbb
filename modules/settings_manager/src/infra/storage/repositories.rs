//! SeaORM repository implementations

use crate::contract::{PageRequest, Scope, Setting, SettingType, SettingsPage};
use crate::domain::repository::SettingsStore;
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::sync::Arc;

use super::entity;

// ===== Settings Store =====

pub struct SeaOrmSettingsStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSettingsStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// Exact-match filter on the scope columns; `None` matches SQL NULL only
fn scope_condition(scope: &Scope) -> Condition {
    let bag = match scope.bag_id() {
        Some(bag) => entity::Column::Bag.eq(bag),
        None => entity::Column::Bag.is_null(),
    };
    let group = match scope.group() {
        Some(group) => entity::Column::Group.eq(group),
        None => entity::Column::Group.is_null(),
    };
    Condition::all().add(bag).add(group)
}

#[async_trait]
impl SettingsStore for SeaOrmSettingsStore {
    async fn find_one(&self, scope: &Scope, key: &str) -> Result<Option<Setting>> {
        let result = entity::Entity::find()
            .filter(scope_condition(scope))
            .filter(entity::Column::Key.eq(key))
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn find_many(&self, scope: &Scope, keys: &[String]) -> Result<Vec<Setting>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let results = entity::Entity::find()
            .filter(scope_condition(scope))
            .filter(entity::Column::Key.is_in(keys.iter().cloned()))
            .order_by_asc(entity::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn upsert(
        &self,
        scope: &Scope,
        key: &str,
        r#type: SettingType,
        value: Option<String>,
        cacheable: bool,
    ) -> Result<Setting> {
        let now = chrono::Utc::now();

        let existing = entity::Entity::find()
            .filter(scope_condition(scope))
            .filter(entity::Column::Key.eq(key))
            .one(&*self.db)
            .await?;

        let result = match existing {
            Some(model) => {
                // Update existing; the cache flag is kept as created
                let mut active: entity::ActiveModel = model.into();
                active.r#type = Set(r#type.as_str().to_string());
                active.value = Set(value);
                active.updated_at = Set(now);
                active.update(&*self.db).await?
            }
            None => {
                // Insert new
                let active = entity::ActiveModel {
                    bag: Set(scope.bag_id()),
                    group: Set(scope.group().map(str::to_string)),
                    key: Set(key.to_string()),
                    r#type: Set(r#type.as_str().to_string()),
                    value: Set(value),
                    cache: Set(cacheable),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active.insert(&*self.db).await?
            }
        };

        Ok(result.into())
    }

    async fn delete(&self, scope: &Scope, key: &str) -> Result<bool> {
        let result = entity::Entity::delete_many()
            .filter(scope_condition(scope))
            .filter(entity::Column::Key.eq(key))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn paginate(&self, scope: &Scope, request: &PageRequest) -> Result<SettingsPage> {
        let mut query = entity::Entity::find().filter(scope_condition(scope));

        if let Some(keys) = &request.keys {
            query = query.filter(entity::Column::Key.is_in(keys.iter().cloned()));
        }
        if let Some(cursor) = request.cursor {
            query = query.filter(entity::Column::Id.gt(cursor));
        }

        // Fetch one extra row to learn whether another page exists
        let limit = request.per_page.saturating_add(1).min(i64::MAX as u64);
        let mut rows = query
            .order_by_asc(entity::Column::Id)
            .limit(limit)
            .all(&*self.db)
            .await?;

        let per_page = usize::try_from(request.per_page).unwrap_or(usize::MAX);
        let next_cursor = if rows.len() > per_page {
            rows.truncate(per_page);
            rows.last().map(|row| row.id)
        } else {
            None
        };

        Ok(SettingsPage {
            items: rows.into_iter().map(Into::into).collect(),
            per_page: request.per_page,
            next_cursor,
        })
    }
}
