use sea_orm::entity::prelude::*;
use sea_orm::{Condition, PaginatorTrait};
use tracing::instrument;

/// A registered member of the exchange.
/// The authenticated principal names a user by username or email.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    /// URL of the profile picture.
    pub avatar: Option<String>,
    pub phone: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user can offer multiple products.
    #[sea_orm(has_many = "super::product::Entity")]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
    /// Finds a user whose username or email equals `login`.
    #[instrument(skip(db), level = "trace")]
    pub async fn find_by_username_or_email<C: ConnectionTrait>(
        db: &C,
        login: &str,
    ) -> Result<Option<Model>, DbErr> {
        Self::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(login))
                    .add(Column::Email.eq(login)),
            )
            .one(db)
            .await
    }

    /// Returns true when a user other than `except` already uses `username`.
    #[instrument(skip(db), level = "trace")]
    pub async fn username_taken<C: ConnectionTrait>(
        db: &C,
        username: &str,
        except: i32,
    ) -> Result<bool, DbErr> {
        let count = Self::find()
            .filter(Column::Username.eq(username))
            .filter(Column::Id.ne(except))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Returns true when a user other than `except` already uses `email`.
    #[instrument(skip(db), level = "trace")]
    pub async fn email_taken<C: ConnectionTrait>(
        db: &C,
        email: &str,
        except: i32,
    ) -> Result<bool, DbErr> {
        let count = Self::find()
            .filter(Column::Email.eq(email))
            .filter(Column::Id.ne(except))
            .count(db)
            .await?;
        Ok(count > 0)
    }
}
