use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_at: String,

    pub laptop_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::laptops::Entity",
        from = "Column::LaptopId",
        to = "super::laptops::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Laptops,
}

impl Related<super::laptops::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Laptops.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
