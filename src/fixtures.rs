//! YAML datasets for seeding a database.
//!
//! A dataset lists rows per table with explicit ids:
//!
//! ```yaml
//! users:
//!   - { id: 1, username: admin, email: admin@example.com }
//! categories:
//!   - { id: 1, name: shoes }
//! subcategories:
//!   - { id: 1, name: sneakers, category_id: 1 }
//! products:
//!   - { id: 1, title: Old sneakers, user_id: 1, subcategory_id: 1 }
//! ```

use anyhow::{Context, Result};
use model::entities::{category, product, subcategory, user};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Set, TransactionTrait,
};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Deserialize)]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRow {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubcategoryRow {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub user_id: i32,
    pub subcategory_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<UserRow>,
    #[serde(default)]
    pub categories: Vec<CategoryRow>,
    #[serde(default)]
    pub subcategories: Vec<SubcategoryRow>,
    #[serde(default)]
    pub products: Vec<ProductRow>,
}

impl Dataset {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Malformed dataset")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }

    /// Insert every row in one transaction, parents before children.
    #[instrument(skip_all)]
    pub async fn load(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let txn = db.begin().await?;

        for row in &self.users {
            user::ActiveModel {
                id: Set(row.id),
                username: Set(row.username.clone()),
                email: Set(row.email.clone()),
                name: Set(row.name.clone()),
                surname: Set(row.surname.clone()),
                avatar: Set(row.avatar.clone()),
                phone: Set(row.phone.clone()),
            }
            .insert(&txn)
            .await?;
        }

        for row in &self.categories {
            category::ActiveModel {
                id: Set(row.id),
                name: Set(row.name.clone()),
            }
            .insert(&txn)
            .await?;
        }

        for row in &self.subcategories {
            subcategory::ActiveModel {
                id: Set(row.id),
                name: Set(row.name.clone()),
                category_id: Set(row.category_id),
            }
            .insert(&txn)
            .await?;
        }

        for row in &self.products {
            product::ActiveModel {
                id: Set(row.id),
                title: Set(row.title.clone()),
                description: Set(row.description.clone()),
                user_id: Set(row.user_id),
                subcategory_id: Set(row.subcategory_id),
            }
            .insert(&txn)
            .await?;
        }

        // Explicit ids leave Postgres sequences behind.
        if txn.get_database_backend() == DbBackend::Postgres {
            for table in ["users", "categories", "subcategories", "products"] {
                debug!("Resetting id sequence of {}", table);
                txn.execute_unprepared(&format!(
                    "SELECT setval(pg_get_serial_sequence('{table}', 'id'), COALESCE(MAX(id), 0) + 1, false) FROM {table}"
                ))
                .await?;
            }
        }

        txn.commit().await?;

        info!(
            "Dataset loaded: {} users, {} categories, {} subcategories, {} products",
            self.users.len(),
            self.categories.len(),
            self.subcategories.len(),
            self.products.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::{setup_test_db, DATABASE_INIT};
    use model::entities::prelude::*;
    use sea_orm::{EntityTrait, PaginatorTrait};

    #[test]
    fn test_parse_partial_dataset() {
        let dataset = Dataset::from_yaml_str("categories:\n  - { id: 5, name: books }\n").unwrap();
        assert!(dataset.users.is_empty());
        assert_eq!(dataset.categories.len(), 1);
        assert_eq!(dataset.categories[0].name, "books");
    }

    #[test]
    fn test_parse_rejects_missing_columns() {
        assert!(Dataset::from_yaml_str("subcategories:\n  - { id: 1, name: boots }\n").is_err());
    }

    #[tokio::test]
    async fn test_load_database_init() {
        let db = setup_test_db().await;
        let dataset = Dataset::from_yaml_str(DATABASE_INIT).unwrap();
        dataset.load(&db).await.unwrap();

        assert_eq!(User::find().count(&db).await.unwrap(), dataset.users.len() as u64);
        assert_eq!(Category::find().count(&db).await.unwrap(), dataset.categories.len() as u64);
        assert_eq!(
            Subcategory::find().count(&db).await.unwrap(),
            dataset.subcategories.len() as u64
        );
        assert_eq!(Product::find().count(&db).await.unwrap(), dataset.products.len() as u64);
    }

    #[tokio::test]
    async fn test_load_is_atomic() {
        let db = setup_test_db().await;
        // the product points at a subcategory that does not exist
        let dataset = Dataset::from_yaml_str(
            "users:\n  - { id: 1, username: john, email: john@example.com }\nproducts:\n  - { id: 1, title: Lamp, user_id: 1, subcategory_id: 99 }\n",
        )
        .unwrap();

        assert!(dataset.load(&db).await.is_err());
        assert_eq!(User::find().count(&db).await.unwrap(), 0);
    }
}
