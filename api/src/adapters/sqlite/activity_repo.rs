//! SQLite adapter for ActivityRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{ActivityLog, ActivityLogId, NewActivity, UserId};
use crate::domain::ports::ActivityRepository;
use crate::entity::activity_logs;
use crate::error::DomainError;

pub struct SqliteActivityRepository {
    db: DatabaseConnection,
}

impl SqliteActivityRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityRepository for SqliteActivityRepository {
    async fn record(&self, activity: &NewActivity) -> Result<(), DomainError> {
        activity_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(activity.user_id.map(|u| u.0)),
            action: Set(activity.action.to_string()),
            entity_type: Set(activity.action.entity_type().to_string()),
            entity_id: Set(activity.entity_id),
            description: Set(activity.description.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn recent(&self, limit: u64) -> Result<Vec<ActivityLog>, DomainError> {
        let rows = activity_logs::Entity::find()
            .order_by_desc(activity_logs::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|m| ActivityLog {
                id: ActivityLogId(m.id),
                user_id: m.user_id.map(UserId),
                action: m.action,
                entity_type: m.entity_type,
                entity_id: m.entity_id,
                description: m.description,
                created_at: m.created_at,
            })
            .collect())
    }
}
