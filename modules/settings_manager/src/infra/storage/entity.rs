//! SeaORM entities for database tables

use sea_orm::entity::prelude::*;

/// Settings table entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Outer namespace (nullable, indexed)
    pub bag: Option<i64>,

    /// Inner namespace (nullable, indexed)
    pub group: Option<String>,

    /// Root key (indexed)
    pub key: String,

    /// string | integer | float | boolean | array
    pub r#type: String,

    /// Raw payload
    #[sea_orm(column_type = "Text", nullable)]
    pub value: Option<String>,

    /// Per-record cache opt-out
    pub cache: bool,

    /// Creation timestamp
    pub created_at: DateTimeUtc,

    /// Last update timestamp
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
