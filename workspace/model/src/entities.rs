//! SeaORM entities of the items-exchange store.
//!
//! Categories own subcategories, products are filed under a subcategory and
//! belong to the user who offers them.

pub mod category;
pub mod product;
pub mod subcategory;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::category::Entity as Category;
    pub use super::product::Entity as Product;
    pub use super::subcategory::Entity as Subcategory;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let owner = user::ActiveModel {
            username: Set("john".to_string()),
            email: Set("john@example.com".to_string()),
            name: Set(Some("John".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let shoes = category::ActiveModel {
            name: Set("shoes".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let sneakers = subcategory::ActiveModel {
            name: Set("sneakers".to_string()),
            category_id: Set(shoes.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let boots = subcategory::ActiveModel {
            name: Set("boots".to_string()),
            category_id: Set(shoes.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        product::ActiveModel {
            title: Set("Running shoes".to_string()),
            description: Set(Some("Worn twice".to_string())),
            user_id: Set(owner.id),
            subcategory_id: Set(sneakers.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let found = User::find_by_username_or_email(&db, "john@example.com").await?;
        assert_eq!(found.map(|u| u.id), Some(owner.id));
        let found = User::find_by_username_or_email(&db, "john").await?;
        assert_eq!(found.map(|u| u.id), Some(owner.id));
        assert!(User::find_by_username_or_email(&db, "nobody").await?.is_none());

        let subs = shoes.subcategories(&db).await?;
        assert_eq!(subs.len(), 2);
        assert_eq!(shoes.product_count(&db).await?, 1);
        assert_eq!(sneakers.product_count(&db).await?, 1);
        assert_eq!(boots.product_count(&db).await?, 0);

        // Subcategories go with their category.
        boots.clone().delete(&db).await?;
        let other = category::ActiveModel {
            name: Set("hats".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        subcategory::ActiveModel {
            name: Set("caps".to_string()),
            category_id: Set(other.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        other.clone().delete(&db).await?;
        let orphans = Subcategory::find()
            .filter(subcategory::Column::CategoryId.eq(other.id))
            .all(&db)
            .await?;
        assert!(orphans.is_empty());

        // A subcategory with products cannot be removed.
        assert!(sneakers.clone().delete(&db).await.is_err());
        assert_eq!(Product::find().all(&db).await?.len(), 1);
        assert_eq!(Category::find().all(&db).await?.len(), 1);

        Ok(())
    }
}
