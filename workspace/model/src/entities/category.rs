use sea_orm::entity::prelude::*;
use sea_orm::{PaginatorTrait, QueryOrder};
use tracing::instrument;

use super::{product, subcategory};

/// Top level of the item taxonomy (e.g. "shoes").
/// Names are unique across the system.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A category owns its subcategories.
    #[sea_orm(has_many = "super::subcategory::Entity")]
    Subcategory,
}

impl Related<super::subcategory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
    /// Returns true when a category other than `except` already uses `name`.
    #[instrument(skip(db), level = "trace")]
    pub async fn name_taken<C: ConnectionTrait>(
        db: &C,
        name: &str,
        except: Option<i32>,
    ) -> Result<bool, DbErr> {
        let mut query = Self::find().filter(Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(Column::Id.ne(id));
        }
        Ok(query.count(db).await? > 0)
    }
}

impl Model {
    /// Subcategories of this category, ordered by id.
    pub async fn subcategories<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Vec<subcategory::Model>, DbErr> {
        subcategory::Entity::find()
            .filter(subcategory::Column::CategoryId.eq(self.id))
            .order_by_asc(subcategory::Column::Id)
            .all(db)
            .await
    }

    /// Number of products filed under any subcategory of this category.
    #[instrument(skip(db), level = "trace")]
    pub async fn product_count<C: ConnectionTrait>(&self, db: &C) -> Result<u64, DbErr> {
        product::Entity::find()
            .inner_join(subcategory::Entity)
            .filter(subcategory::Column::CategoryId.eq(self.id))
            .count(db)
            .await
    }
}
