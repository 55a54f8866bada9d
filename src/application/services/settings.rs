//! Tariff settings: seeded defaults, typed reads, audited updates
//!
//! Settings are stored as strings and parsed into `Decimal` on read so a
//! malformed value surfaces as `InvalidInput` instead of silently zeroing
//! a bill.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::application::services::audit::{self, AuditAction, NewAuditLog};
use crate::domain::{Actor, DomainError, DomainResult, TariffRates};
use crate::infrastructure::database::entities::setting;

pub const RATE_K1: &str = "RATE_K1";
pub const RATE_K2: &str = "RATE_K2";
pub const LIMIT_K1: &str = "LIMIT_K1";
pub const ADMIN_FEE: &str = "ADMIN_FEE";
pub const PENALTY_AMOUNT: &str = "PENALTY_AMOUNT";

const DEFAULT_SETTINGS: [(&str, &str, &str); 5] = [
    (RATE_K1, "1200", "Rate per m³ for K1 (≤ limit)"),
    (RATE_K2, "3000", "Rate per m³ for K2 (> limit)"),
    (LIMIT_K1, "40", "K1 usage limit in m³"),
    (ADMIN_FEE, "3000", "Monthly admin fee"),
    (PENALTY_AMOUNT, "5000", "Penalty amount for late payment"),
];

/// Key/value/description projection returned by the read APIs
#[derive(Debug, Clone, Serialize)]
pub struct SettingView {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

impl From<setting::Model> for SettingView {
    fn from(model: setting::Model) -> Self {
        Self {
            key: model.key,
            value: model.value,
            description: model.description,
        }
    }
}

/// Fetch one setting and parse it as a decimal amount.
///
/// Generic over the connection so billing code can read rates inside an
/// open transaction.
pub async fn fetch_value<C: ConnectionTrait>(conn: &C, key: &str) -> DomainResult<Decimal> {
    let model = setting::Entity::find()
        .filter(setting::Column::Key.eq(key))
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Setting", "key", key))?;

    let value = model.value.parse::<Decimal>().map_err(|_| {
        DomainError::invalid_input(format!(
            "Setting {} holds non-numeric value '{}'",
            key, model.value
        ))
    })?;
    if value < Decimal::ZERO {
        return Err(DomainError::invalid_input(format!(
            "Setting {key} holds negative value '{value}'"
        )));
    }
    Ok(value)
}

/// Fetch the four rate settings that drive charge calculation.
pub async fn fetch_rates<C: ConnectionTrait>(conn: &C) -> DomainResult<TariffRates> {
    let limit = fetch_value(conn, LIMIT_K1).await?;
    let limit_k1 = limit.to_i64().filter(|v| *v >= 0).ok_or_else(|| {
        DomainError::invalid_input(format!("Setting {LIMIT_K1} must be a non-negative integer"))
    })?;

    Ok(TariffRates {
        rate_k1: fetch_value(conn, RATE_K1).await?,
        rate_k2: fetch_value(conn, RATE_K2).await?,
        limit_k1,
        admin_fee: fetch_value(conn, ADMIN_FEE).await?,
    })
}

pub struct SettingsService {
    db: DatabaseConnection,
}

impl SettingsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert any missing default settings. Idempotent; existing values,
    /// including operator-modified ones, are left untouched.
    pub async fn ensure_defaults(&self) -> DomainResult<()> {
        for (key, value, description) in DEFAULT_SETTINGS {
            let exists = setting::Entity::find()
                .filter(setting::Column::Key.eq(key))
                .one(&self.db)
                .await?
                .is_some();
            if exists {
                continue;
            }

            let now = Utc::now();
            setting::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                description: Set(Some(description.to_string())),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await?;
            info!(key, value, "seeded default setting");
        }
        Ok(())
    }

    /// All settings, ordered by key.
    pub async fn find_all(&self) -> DomainResult<Vec<SettingView>> {
        let settings = setting::Entity::find()
            .order_by_asc(setting::Column::Key)
            .all(&self.db)
            .await?;
        Ok(settings.into_iter().map(SettingView::from).collect())
    }

    pub async fn get_value(&self, key: &str) -> DomainResult<Decimal> {
        fetch_value(&self.db, key).await
    }

    pub async fn current_rates(&self) -> DomainResult<TariffRates> {
        fetch_rates(&self.db).await
    }

    /// Change a setting's value. Applies to bills created afterwards;
    /// already-issued bills keep the amounts they were computed with.
    pub async fn update(&self, key: &str, value: &str, actor: &Actor) -> DomainResult<SettingView> {
        let parsed = value.parse::<Decimal>().map_err(|_| {
            DomainError::invalid_input(format!("Setting value '{value}' is not numeric"))
        })?;
        if parsed < Decimal::ZERO {
            return Err(DomainError::invalid_input(format!(
                "Setting value '{value}' must not be negative"
            )));
        }

        let txn = self.db.begin().await?;

        let model = setting::Entity::find()
            .filter(setting::Column::Key.eq(key))
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Setting", "key", key))?;

        let old_value = model.value.clone();
        let id = model.id;

        let mut active: setting::ActiveModel = model.into();
        active.value = Set(value.to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        audit::record(
            &txn,
            actor,
            NewAuditLog {
                action: AuditAction::Update,
                entity_type: "settings",
                entity_id: Some(id),
                details: json!({ "key": key, "old_value": old_value, "new_value": value }),
                description: format!("Changed setting {key} from {old_value} to {value}"),
            },
        )
        .await?;

        txn.commit().await?;
        info!(key, old_value, new_value = value, "setting updated");

        Ok(updated.into())
    }
}
