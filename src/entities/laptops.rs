use sea_orm::entity::prelude::*;

/// One scraped catalog listing.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "jd")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Identifier from the source CSV, used as the upsert key.
    pub original_id: String,

    pub name: String,

    pub price: Option<f64>,

    pub shop: Option<String>,

    pub brand: Option<String>,

    /// Free-text memory descriptor, e.g. "16GB".
    pub ram: Option<String>,

    pub cpu: Option<String>,

    pub sales: Option<i64>,

    pub rating: Option<f64>,

    /// Parsed from `ram` by import or `backfill-ram-gb`.
    pub ram_gb: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
