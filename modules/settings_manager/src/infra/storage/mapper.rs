//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use crate::contract::Setting;
use super::entity;

impl From<entity::Model> for Setting {
    fn from(entity: entity::Model) -> Self {
        Self {
            id: entity.id,
            bag: entity.bag,
            group: entity.group,
            key: entity.key,
            r#type: entity.r#type,
            value: entity.value,
            cacheable: entity.cache,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
