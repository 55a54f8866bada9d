//! Customer lifecycle: CRUD, soft-delete cascade, restore, force delete
//!
//! Soft delete stamps one shared timestamp down the whole tree (items,
//! bills, readings, then the customer) so restore can distinguish rows
//! hidden by this cascade from rows deleted earlier for other reasons.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::application::services::audit::{self, AuditAction, NewAuditLog};
use crate::domain::{Actor, DomainError, DomainResult};
use crate::infrastructure::database::entities::{bill, bill_item, customer, meter_reading};
use crate::shared::types::{PaginatedResult, PaginationParams};

/// Fields accepted by `update`; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub customer_number: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingBillSummary {
    pub id: i32,
    pub total_amount: Decimal,
    pub payment_status: String,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingSummary {
    pub id: i32,
    pub period: String,
    pub meter_start: i32,
    pub meter_end: i32,
    pub usage: i32,
    pub bill: Option<ReadingBillSummary>,
}

/// One customer with their reading history
#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    pub id: i32,
    pub name: String,
    pub customer_number: i32,
    pub outstanding_balance: Decimal,
    pub readings: Vec<ReadingSummary>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub struct CustomerService {
    db: DatabaseConnection,
}

impl CustomerService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        name: &str,
        customer_number: i32,
        actor: &Actor,
    ) -> DomainResult<customer::Model> {
        if name.trim().is_empty() {
            return Err(DomainError::invalid_input("Customer name must not be empty"));
        }

        let txn = self.db.begin().await?;

        // Soft-deleted holders still occupy the number; the unique index
        // would reject the insert anyway.
        let taken = customer::Entity::find()
            .filter(customer::Column::CustomerNumber.eq(customer_number))
            .one(&txn)
            .await?
            .is_some();
        if taken {
            return Err(DomainError::Conflict(format!(
                "Customer number {customer_number} is already in use"
            )));
        }

        let now = Utc::now();
        let created = customer::ActiveModel {
            name: Set(name.to_string()),
            customer_number: Set(customer_number),
            outstanding_balance: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        audit::record(
            &txn,
            actor,
            NewAuditLog {
                action: AuditAction::Create,
                entity_type: "customers",
                entity_id: Some(created.id),
                details: json!({ "name": created.name, "customer_number": created.customer_number }),
                description: format!(
                    "Created customer \"{}\" (#{})",
                    created.name, created.customer_number
                ),
            },
        )
        .await?;

        txn.commit().await?;
        info!(customer_id = created.id, customer_number, "customer created");

        Ok(created)
    }

    pub async fn update(
        &self,
        id: i32,
        changes: UpdateCustomer,
        actor: &Actor,
    ) -> DomainResult<customer::Model> {
        let txn = self.db.begin().await?;

        let existing = customer::Entity::find_by_id(id)
            .filter(customer::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", "id", id.to_string()))?;

        if let Some(number) = changes.customer_number {
            if number != existing.customer_number {
                let taken = customer::Entity::find()
                    .filter(customer::Column::CustomerNumber.eq(number))
                    .filter(customer::Column::Id.ne(id))
                    .one(&txn)
                    .await?
                    .is_some();
                if taken {
                    return Err(DomainError::Conflict(format!(
                        "Customer number {number} is already in use"
                    )));
                }
            }
        }

        let before = json!({
            "name": existing.name,
            "customer_number": existing.customer_number,
        });

        let mut active: customer::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            if name.trim().is_empty() {
                return Err(DomainError::invalid_input("Customer name must not be empty"));
            }
            active.name = Set(name);
        }
        if let Some(number) = changes.customer_number {
            active.customer_number = Set(number);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        audit::record(
            &txn,
            actor,
            NewAuditLog {
                action: AuditAction::Update,
                entity_type: "customers",
                entity_id: Some(id),
                details: json!({
                    "before": before,
                    "after": { "name": updated.name, "customer_number": updated.customer_number },
                }),
                description: format!("Updated customer \"{}\" (#{})", updated.name, updated.customer_number),
            },
        )
        .await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Live customers ordered by customer number.
    pub async fn find_all(
        &self,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<customer::Model>> {
        // Fields are public; re-clamp so page 0 cannot underflow below
        let params = PaginationParams::new(params.page, params.limit);
        let paginator = customer::Entity::find()
            .filter(customer::Column::DeletedAt.is_null())
            .order_by_asc(customer::Column::CustomerNumber)
            .paginate(&self.db, params.limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(params.page - 1).await?;

        Ok(PaginatedResult::new(items, total, params))
    }

    pub async fn find_one(&self, id: i32) -> DomainResult<CustomerDetail> {
        let found = customer::Entity::find_by_id(id)
            .filter(customer::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", "id", id.to_string()))?;

        let readings = meter_reading::Entity::find()
            .filter(meter_reading::Column::CustomerId.eq(id))
            .filter(meter_reading::Column::DeletedAt.is_null())
            .order_by_desc(meter_reading::Column::Period)
            .all(&self.db)
            .await?;

        let mut summaries = Vec::with_capacity(readings.len());
        for r in readings {
            let linked_bill = bill::Entity::find()
                .filter(bill::Column::MeterReadingId.eq(r.id))
                .filter(bill::Column::DeletedAt.is_null())
                .one(&self.db)
                .await?;
            summaries.push(ReadingSummary {
                id: r.id,
                period: r.period,
                meter_start: r.meter_start,
                meter_end: r.meter_end,
                usage: r.usage,
                bill: linked_bill.map(|b| ReadingBillSummary {
                    id: b.id,
                    total_amount: b.total_amount,
                    payment_status: b.payment_status,
                    paid_at: b.paid_at,
                }),
            });
        }

        Ok(CustomerDetail {
            id: found.id,
            name: found.name,
            customer_number: found.customer_number,
            outstanding_balance: found.outstanding_balance,
            readings: summaries,
            created_at: found.created_at,
            updated_at: found.updated_at,
        })
    }

    /// Soft-delete a customer and everything under them. Returns the
    /// number of readings hidden by the cascade.
    pub async fn remove(&self, id: i32, actor: &Actor) -> DomainResult<u64> {
        let txn = self.db.begin().await?;

        let target = customer::Entity::find_by_id(id)
            .filter(customer::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", "id", id.to_string()))?;

        let readings = meter_reading::Entity::find()
            .filter(meter_reading::Column::CustomerId.eq(id))
            .filter(meter_reading::Column::DeletedAt.is_null())
            .all(&txn)
            .await?;

        // One timestamp for the whole cascade; restore matches on it
        // being set, so mixing timestamps here would be harmless but
        // makes debugging noisier.
        let now = Utc::now();

        for reading in &readings {
            let linked_bill = bill::Entity::find()
                .filter(bill::Column::MeterReadingId.eq(reading.id))
                .filter(bill::Column::DeletedAt.is_null())
                .one(&txn)
                .await?;
            if let Some(linked_bill) = linked_bill {
                bill_item::Entity::update_many()
                    .col_expr(bill_item::Column::DeletedAt, Expr::value(now))
                    .filter(bill_item::Column::BillId.eq(linked_bill.id))
                    .filter(bill_item::Column::DeletedAt.is_null())
                    .exec(&txn)
                    .await?;

                let mut active: bill::ActiveModel = linked_bill.into();
                active.deleted_at = Set(Some(now));
                active.update(&txn).await?;
            }

            let mut active: meter_reading::ActiveModel = reading.clone().into();
            active.deleted_at = Set(Some(now));
            active.update(&txn).await?;
        }

        let deleted_readings = readings.len() as u64;

        let mut active: customer::ActiveModel = target.clone().into();
        active.deleted_at = Set(Some(now));
        active.update(&txn).await?;

        audit::record(
            &txn,
            actor,
            NewAuditLog {
                action: AuditAction::Delete,
                entity_type: "customers",
                entity_id: Some(id),
                details: json!({
                    "name": target.name,
                    "customer_number": target.customer_number,
                    "deleted_readings": deleted_readings,
                }),
                description: format!(
                    "Soft-deleted customer \"{}\" (#{}) cascading {} readings",
                    target.name, target.customer_number, deleted_readings
                ),
            },
        )
        .await?;

        txn.commit().await?;
        info!(customer_id = id, deleted_readings, "customer soft-deleted");

        Ok(deleted_readings)
    }

    /// Undo a soft delete, bringing the customer's readings, bills and
    /// items back with them. Returns the number of readings restored.
    pub async fn restore(&self, id: i32, actor: &Actor) -> DomainResult<u64> {
        let txn = self.db.begin().await?;

        let target = customer::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", "id", id.to_string()))?;
        if target.deleted_at.is_none() {
            return Err(DomainError::invalid_input(format!(
                "Customer #{id} is not deleted"
            )));
        }

        let mut active: customer::ActiveModel = target.clone().into();
        active.deleted_at = Set(None);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        let readings = meter_reading::Entity::find()
            .filter(meter_reading::Column::CustomerId.eq(id))
            .filter(meter_reading::Column::DeletedAt.is_not_null())
            .all(&txn)
            .await?;

        for reading in &readings {
            let mut active: meter_reading::ActiveModel = reading.clone().into();
            active.deleted_at = Set(None);
            active.update(&txn).await?;

            let linked_bill = bill::Entity::find()
                .filter(bill::Column::MeterReadingId.eq(reading.id))
                .filter(bill::Column::DeletedAt.is_not_null())
                .one(&txn)
                .await?;
            if let Some(linked_bill) = linked_bill {
                let bill_id = linked_bill.id;
                let mut active: bill::ActiveModel = linked_bill.into();
                active.deleted_at = Set(None);
                active.update(&txn).await?;

                bill_item::Entity::update_many()
                    .col_expr(bill_item::Column::DeletedAt, Expr::value(Option::<chrono::DateTime<Utc>>::None))
                    .filter(bill_item::Column::BillId.eq(bill_id))
                    .filter(bill_item::Column::DeletedAt.is_not_null())
                    .exec(&txn)
                    .await?;
            }
        }

        let restored_readings = readings.len() as u64;

        audit::record(
            &txn,
            actor,
            NewAuditLog {
                action: AuditAction::Update,
                entity_type: "customers",
                entity_id: Some(id),
                details: json!({
                    "name": target.name,
                    "customer_number": target.customer_number,
                    "restored_readings": restored_readings,
                }),
                description: format!(
                    "Restored customer \"{}\" (#{}) with {} readings",
                    target.name, target.customer_number, restored_readings
                ),
            },
        )
        .await?;

        txn.commit().await?;
        info!(customer_id = id, restored_readings, "customer restored");

        Ok(restored_readings)
    }

    /// Permanently delete the customer row. Readings, bills and items are
    /// left behind (there is no foreign key from readings to customers);
    /// use `remove` first if the whole tree should disappear from view.
    pub async fn force_delete(&self, id: i32, actor: &Actor) -> DomainResult<()> {
        let txn = self.db.begin().await?;

        let target = customer::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", "id", id.to_string()))?;

        audit::record(
            &txn,
            actor,
            NewAuditLog {
                action: AuditAction::Delete,
                entity_type: "customers",
                entity_id: Some(id),
                details: json!({
                    "name": target.name,
                    "customer_number": target.customer_number,
                    "force": true,
                }),
                description: format!(
                    "Force-deleted customer \"{}\" (#{})",
                    target.name, target.customer_number
                ),
            },
        )
        .await?;

        customer::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        info!(customer_id = id, "customer force-deleted");

        Ok(())
    }
}
