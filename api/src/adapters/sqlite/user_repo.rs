//! SQLite adapter for UserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::{db_err, from_json, to_json};
use crate::domain::entities::{NewUser, Page, PageRequest, Role, User, UserFilter, UserId};
use crate::domain::ports::UserRepository;
use crate::entity::users;
use crate::error::DomainError;

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository {
    db: DatabaseConnection,
}

impl SqliteUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let now = Utc::now();
        let address = match &user.address {
            Some(a) => Some(to_json(a)?),
            None => None,
        };

        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            name: Set(user.name.clone()),
            surname: Set(user.surname.clone()),
            phone: Set(user.phone.clone()),
            role: Set(user.role.to_string()),
            is_admin: Set(user.role == Role::Admin),
            avatar: Set(None),
            address: Set(address),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await.map_err(db_err)?;
        Ok(result.into())
    }

    async fn update_last_login(&self, id: &UserId) -> Result<(), DomainError> {
        users::ActiveModel {
            id: Set(id.0),
            last_login_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
        is_admin: bool,
    ) -> Result<User, DomainError> {
        let result = users::ActiveModel {
            id: Set(id.0),
            role: Set(role.to_string()),
            is_admin: Set(is_admin),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(result.into())
    }

    async fn set_active(&self, id: &UserId, is_active: bool) -> Result<User, DomainError> {
        let result = users::ActiveModel {
            id: Set(id.0),
            is_active: Set(is_active),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(result.into())
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, DomainError> {
        let mut query = users::Entity::find();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(users::Column::Name.contains(search.trim()))
                    .add(users::Column::Surname.contains(search.trim()))
                    .add(users::Column::Email.contains(search.trim())),
            );
        }
        if let Some(role) = filter.role {
            query = query.filter(users::Column::Role.eq(role.to_string()));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(users::Column::IsActive.eq(is_active));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let rows = query
            .order_by_desc(users::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(Page::new(
            rows.into_iter().map(|m| m.into()).collect(),
            total,
            page,
        ))
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, DomainError> {
        users::Entity::find()
            .filter(users::Column::Role.eq(role.to_string()))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}

/// Convert SeaORM model to domain entity
impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: UserId(model.id),
            email: model.email,
            password_hash: model.password_hash,
            name: model.name,
            surname: model.surname,
            phone: model.phone,
            role: model.role.parse().unwrap_or_default(),
            is_admin: model.is_admin,
            avatar: model.avatar,
            address: model.address.map(from_json),
            is_active: model.is_active,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
