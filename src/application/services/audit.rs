//! Audit trail: transactional recorder plus read-side queries
//!
//! `record` is generic over the connection so the audit row joins whatever
//! transaction the calling service has open; if the insert fails the whole
//! operation rolls back with it.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;

use crate::domain::{Actor, DomainResult};
use crate::infrastructure::database::entities::audit_log;
use crate::shared::types::{PaginatedResult, PaginationParams};

/// Kind of mutation an audit entry documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Payment,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Payment => "PAYMENT",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry to append to the audit log
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub action: AuditAction,
    pub entity_type: &'static str,
    pub entity_id: Option<i32>,
    pub details: Value,
    pub description: String,
}

/// Append an audit entry on the given connection or transaction.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    actor: &Actor,
    entry: NewAuditLog,
) -> DomainResult<()> {
    let model = audit_log::ActiveModel {
        action: Set(entry.action.as_str().to_string()),
        entity_type: Set(entry.entity_type.to_string()),
        entity_id: Set(entry.entity_id),
        performed_by: Set(actor.performed_by.clone()),
        ip_address: Set(actor.ip_address.clone()),
        details: Set(Some(entry.details)),
        description: Set(Some(entry.description)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(conn).await?;
    Ok(())
}

/// Read side of the audit trail. Entries are append-only; there is no
/// update or delete API.
pub struct AuditLogService {
    db: DatabaseConnection,
}

impl AuditLogService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest-first page of the full log.
    pub async fn find_all(
        &self,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<audit_log::Model>> {
        // Fields are public; re-clamp so page 0 cannot underflow below
        let params = PaginationParams::new(params.page, params.limit);
        let paginator = audit_log::Entity::find()
            .order_by_desc(audit_log::Column::CreatedAt)
            .order_by_desc(audit_log::Column::Id)
            .paginate(&self.db, params.limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(params.page - 1).await?;

        Ok(PaginatedResult::new(items, total, params))
    }

    /// History of one entity, newest first.
    pub async fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: i32,
    ) -> DomainResult<Vec<audit_log::Model>> {
        let entries = audit_log::Entity::find()
            .filter(audit_log::Column::EntityType.eq(entity_type))
            .filter(audit_log::Column::EntityId.eq(entity_id))
            .order_by_desc(audit_log::Column::CreatedAt)
            .order_by_desc(audit_log::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }
}
