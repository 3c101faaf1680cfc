use sea_orm::entity::prelude::*;
use sea_orm::PaginatorTrait;

use super::product;

/// Second level of the item taxonomy (e.g. "sneakers" under "shoes").
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subcategories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(has_many = "super::product::Entity")]
    Product,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Number of products filed under this subcategory.
    pub async fn product_count<C: ConnectionTrait>(&self, db: &C) -> Result<u64, DbErr> {
        product::Entity::find()
            .filter(product::Column::SubcategoryId.eq(self.id))
            .count(db)
            .await
    }
}
