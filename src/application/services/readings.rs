//! Meter reading ingestion and the billing reports built on it
//!
//! `create` is the write path that turns a meter reading into a bill: the
//! reading, its bill, the tariff line items, the customer balance bump and
//! the audit entry all commit or roll back together.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::application::services::audit::{self, AuditAction, NewAuditLog};
use crate::application::services::settings;
use crate::domain::{
    calculate_charges, Actor, DomainError, DomainResult, PaymentStatus, Period,
};
use crate::infrastructure::database::entities::{bill, bill_item, customer, meter_reading};

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    pub id: i32,
    pub name: String,
    pub customer_number: i32,
}

impl From<&customer::Model> for CustomerSummary {
    fn from(model: &customer::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            customer_number: model.customer_number,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BillItemView {
    pub item_type: String,
    pub usage: i32,
    pub rate: Decimal,
    pub amount: Decimal,
}

impl From<&bill_item::Model> for BillItemView {
    fn from(model: &bill_item::Model) -> Self {
        Self {
            item_type: model.item_type.clone(),
            usage: model.usage,
            rate: model.rate,
            amount: model.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BillWithItems {
    pub id: i32,
    pub total_amount: Decimal,
    pub payment_status: String,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    pub items: Vec<BillItemView>,
}

/// Full view of one reading with its customer and bill
#[derive(Debug, Clone, Serialize)]
pub struct ReadingWithBill {
    pub id: i32,
    pub period: String,
    pub meter_start: i32,
    pub meter_end: i32,
    pub usage: i32,
    pub customer: CustomerSummary,
    pub bill: Option<BillWithItems>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// All readings of one billing period, ordered by customer number
#[derive(Debug, Serialize)]
pub struct PeriodReport {
    pub period: String,
    pub data: Vec<ReadingWithBill>,
}

pub struct MeterReadingService {
    db: DatabaseConnection,
}

impl MeterReadingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record a new reading and issue its bill.
    ///
    /// `meter_start` is carried over from the customer's latest reading
    /// (0 for the first one); usage and charges are derived, never taken
    /// from the caller.
    pub async fn create(
        &self,
        customer_id: i32,
        period: &str,
        meter_end: i32,
        actor: &Actor,
    ) -> DomainResult<ReadingWithBill> {
        let period: Period = period.parse()?;
        let period = period.to_string();

        if meter_end < 0 {
            return Err(DomainError::invalid_input(format!(
                "meter_end ({meter_end}) must not be negative"
            )));
        }

        let txn = self.db.begin().await?;

        let customer = customer::Entity::find_by_id(customer_id)
            .filter(customer::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", "id", customer_id.to_string()))?;

        let existing = meter_reading::Entity::find()
            .filter(meter_reading::Column::CustomerId.eq(customer_id))
            .filter(meter_reading::Column::Period.eq(&period))
            .filter(meter_reading::Column::DeletedAt.is_null())
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(DomainError::Conflict(format!(
                "Meter reading for period {period} already exists for customer #{customer_id}"
            )));
        }

        let last_reading = meter_reading::Entity::find()
            .filter(meter_reading::Column::CustomerId.eq(customer_id))
            .filter(meter_reading::Column::DeletedAt.is_null())
            .order_by_desc(meter_reading::Column::CreatedAt)
            .order_by_desc(meter_reading::Column::Id)
            .one(&txn)
            .await?;

        let meter_start = last_reading.map(|r| r.meter_end).unwrap_or(0);
        if meter_end < meter_start {
            return Err(DomainError::invalid_input(format!(
                "meter_end ({meter_end}) must be greater than or equal to last reading ({meter_start})"
            )));
        }

        let usage = meter_end - meter_start;
        let rates = settings::fetch_rates(&txn).await?;
        let breakdown = calculate_charges(usage as i64, &rates);
        let now = Utc::now();

        let reading = meter_reading::ActiveModel {
            customer_id: Set(customer_id),
            period: Set(period.clone()),
            meter_start: Set(meter_start),
            meter_end: Set(meter_end),
            usage: Set(usage),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let new_bill = bill::ActiveModel {
            meter_reading_id: Set(reading.id),
            total_amount: Set(breakdown.total),
            payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
            penalty: Set(Decimal::ZERO),
            amount_paid: Set(Decimal::ZERO),
            remaining: Set(Decimal::ZERO),
            change: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut item_views = Vec::with_capacity(breakdown.items.len());
        for line in &breakdown.items {
            let item = bill_item::ActiveModel {
                bill_id: Set(new_bill.id),
                item_type: Set(line.kind.as_str().to_string()),
                usage: Set(line.usage as i32),
                rate: Set(line.rate),
                amount: Set(line.amount),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            item_views.push(BillItemView::from(&item));
        }

        let customer_summary = CustomerSummary::from(&customer);
        let mut customer_active: customer::ActiveModel = customer.clone().into();
        customer_active.outstanding_balance = Set(customer.outstanding_balance + breakdown.total);
        customer_active.updated_at = Set(now);
        customer_active.update(&txn).await?;

        audit::record(
            &txn,
            actor,
            NewAuditLog {
                action: AuditAction::Create,
                entity_type: "meter_readings",
                entity_id: Some(reading.id),
                details: json!({
                    "customer_id": customer.id,
                    "customer_name": customer.name,
                    "period": period,
                    "meter_start": meter_start,
                    "meter_end": meter_end,
                    "usage": usage,
                    "bill_id": new_bill.id,
                    "total_amount": breakdown.total,
                }),
                description: format!(
                    "Created meter reading for \"{}\" period {} (usage: {}m³, bill: Rp{})",
                    customer.name, period, usage, breakdown.total
                ),
            },
        )
        .await?;

        txn.commit().await?;
        info!(
            reading_id = reading.id,
            customer_id,
            %period,
            usage,
            total = %breakdown.total,
            "meter reading recorded"
        );

        Ok(ReadingWithBill {
            id: reading.id,
            period: reading.period,
            meter_start: reading.meter_start,
            meter_end: reading.meter_end,
            usage: reading.usage,
            customer: customer_summary,
            bill: Some(BillWithItems {
                id: new_bill.id,
                total_amount: new_bill.total_amount,
                payment_status: new_bill.payment_status,
                paid_at: None,
                items: item_views,
            }),
            created_at: reading.created_at,
            updated_at: reading.updated_at,
        })
    }

    pub async fn find_one(&self, id: i32) -> DomainResult<ReadingWithBill> {
        let (reading, customer) = meter_reading::Entity::find_by_id(id)
            .filter(meter_reading::Column::DeletedAt.is_null())
            .find_also_related(customer::Entity)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Meter reading", "id", id.to_string()))?;

        let customer = customer
            .ok_or_else(|| DomainError::not_found("Customer", "meter_reading_id", id.to_string()))?;

        self.assemble(reading, &customer).await
    }

    /// Readings of one period with their bills, ordered by customer number.
    pub async fn report(&self, period: &str) -> DomainResult<PeriodReport> {
        let period: Period = period.parse()?;
        let period = period.to_string();

        let rows = meter_reading::Entity::find()
            .filter(meter_reading::Column::Period.eq(&period))
            .filter(meter_reading::Column::DeletedAt.is_null())
            .find_also_related(customer::Entity)
            .all(&self.db)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (reading, customer) in rows {
            let Some(customer) = customer else { continue };
            entries.push(self.assemble(reading, &customer).await?);
        }
        entries.sort_by_key(|e| e.customer.customer_number);

        Ok(PeriodReport {
            period,
            data: entries,
        })
    }

    /// Hard-delete a reading. The bill and its items go with it via the
    /// cascading foreign keys; the customer balance is credited back only
    /// while the bill is still pending.
    pub async fn remove(&self, id: i32, actor: &Actor) -> DomainResult<()> {
        let txn = self.db.begin().await?;

        let reading = meter_reading::Entity::find_by_id(id)
            .filter(meter_reading::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Meter reading", "id", id.to_string()))?;

        let customer = customer::Entity::find_by_id(reading.customer_id).one(&txn).await?;
        let linked_bill = bill::Entity::find()
            .filter(bill::Column::MeterReadingId.eq(reading.id))
            .one(&txn)
            .await?;

        if let (Some(customer), Some(linked_bill)) = (&customer, &linked_bill) {
            if linked_bill.payment_status == PaymentStatus::Pending.as_str() {
                let mut active: customer::ActiveModel = customer.clone().into();
                active.outstanding_balance =
                    Set(customer.outstanding_balance - linked_bill.total_amount);
                active.updated_at = Set(Utc::now());
                active.update(&txn).await?;
            }
        }

        audit::record(
            &txn,
            actor,
            NewAuditLog {
                action: AuditAction::Delete,
                entity_type: "meter_readings",
                entity_id: Some(id),
                details: json!({
                    "customer_id": customer.as_ref().map(|c| c.id),
                    "customer_name": customer.as_ref().map(|c| c.name.clone()),
                    "period": reading.period,
                    "usage": reading.usage,
                    "bill_id": linked_bill.as_ref().map(|b| b.id),
                    "bill_status": linked_bill.as_ref().map(|b| b.payment_status.clone()),
                }),
                description: format!(
                    "Deleted meter reading #{} for \"{}\" period {}",
                    id,
                    customer.as_ref().map(|c| c.name.as_str()).unwrap_or("?"),
                    reading.period
                ),
            },
        )
        .await?;

        meter_reading::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        info!(reading_id = id, "meter reading deleted");

        Ok(())
    }

    async fn assemble(
        &self,
        reading: meter_reading::Model,
        customer: &customer::Model,
    ) -> DomainResult<ReadingWithBill> {
        let linked_bill = bill::Entity::find()
            .filter(bill::Column::MeterReadingId.eq(reading.id))
            .filter(bill::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;

        let bill_view = match linked_bill {
            Some(b) => {
                let items = bill_item::Entity::find()
                    .filter(bill_item::Column::BillId.eq(b.id))
                    .filter(bill_item::Column::DeletedAt.is_null())
                    .order_by_asc(bill_item::Column::Id)
                    .all(&self.db)
                    .await?;
                Some(BillWithItems {
                    id: b.id,
                    total_amount: b.total_amount,
                    payment_status: b.payment_status,
                    paid_at: b.paid_at,
                    items: items.iter().map(BillItemView::from).collect(),
                })
            }
            None => None,
        };

        Ok(ReadingWithBill {
            id: reading.id,
            period: reading.period,
            meter_start: reading.meter_start,
            meter_end: reading.meter_end,
            usage: reading.usage,
            customer: CustomerSummary::from(customer),
            bill: bill_view,
            created_at: reading.created_at,
            updated_at: reading.updated_at,
        })
    }
}
