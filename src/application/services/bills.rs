//! Bill queries and payment reconciliation
//!
//! A bill's penalty is decided exactly once, on the first payment while the
//! bill is still pending. Later partial payments keep whatever penalty was
//! locked in then; the caller's penalty flag is ignored on those.

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
use crate::application::services::readings::CustomerSummary;
use crate::application::services::settings;
use crate::domain::{settle, Actor, DomainError, DomainResult, PaymentStatus};
use crate::infrastructure::database::entities::{bill, customer, meter_reading};

/// Outcome of one payment against a bill
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub bill_id: i32,
    pub amount_paid: Decimal,
    pub remaining: Decimal,
    pub change: Decimal,
    pub payment_status: String,
}

/// Full state of one bill with its customer and period
#[derive(Debug, Clone, Serialize)]
pub struct BillDetail {
    pub id: i32,
    pub period: String,
    pub customer: CustomerSummary,
    pub total_amount: Decimal,
    pub penalty: Decimal,
    pub amount_paid: Decimal,
    pub remaining: Decimal,
    pub change: Decimal,
    pub payment_status: String,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Collection-list row: an unsettled bill with who owes it
#[derive(Debug, Clone, Serialize)]
pub struct PendingBill {
    pub id: i32,
    pub period: String,
    pub customer: CustomerSummary,
    pub total_amount: Decimal,
    pub remaining: Decimal,
    pub payment_status: String,
}

pub struct BillService {
    db: DatabaseConnection,
}

impl BillService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Apply a payment to a bill.
    ///
    /// For a pending bill the amount due is total + penalty (if flagged);
    /// for a partial bill it is the stored remaining and `has_penalty` has
    /// no effect. Overpayment settles the bill and reports the excess as
    /// change.
    pub async fn pay(
        &self,
        bill_id: i32,
        amount_paid: Decimal,
        has_penalty: bool,
        actor: &Actor,
    ) -> DomainResult<PaymentReceipt> {
        if amount_paid <= Decimal::ZERO {
            return Err(DomainError::invalid_input(format!(
                "amount_paid ({amount_paid}) must be positive"
            )));
        }

        let txn = self.db.begin().await?;

        let target = bill::Entity::find_by_id(bill_id)
            .filter(bill::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Bill", "id", bill_id.to_string()))?;

        let status = PaymentStatus::from_str(&target.payment_status).ok_or_else(|| {
            DomainError::invalid_input(format!(
                "Bill #{bill_id} has unknown payment status '{}'",
                target.payment_status
            ))
        })?;
        if status == PaymentStatus::Paid {
            return Err(DomainError::AlreadySettled { bill_id });
        }

        let reading = meter_reading::Entity::find_by_id(target.meter_reading_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                DomainError::not_found("Meter reading", "bill_id", bill_id.to_string())
            })?;
        let payer = customer::Entity::find_by_id(reading.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                DomainError::not_found("Customer", "id", reading.customer_id.to_string())
            })?;

        // Penalty is locked in on the first payment only.
        let penalty = match status {
            PaymentStatus::Pending if has_penalty => {
                settings::fetch_value(&txn, settings::PENALTY_AMOUNT).await?
            }
            PaymentStatus::Pending => Decimal::ZERO,
            _ => target.penalty,
        };

        let outstanding = match status {
            PaymentStatus::Partial => target.remaining,
            _ => target.total_amount + penalty,
        };

        let settlement = settle(outstanding, amount_paid);
        let now = Utc::now();

        let mut active: bill::ActiveModel = target.clone().into();
        active.penalty = Set(penalty);
        active.amount_paid = Set(target.amount_paid + amount_paid);
        active.remaining = Set(settlement.remaining);
        active.change = Set(settlement.change);
        active.payment_status = Set(settlement.status.as_str().to_string());
        if settlement.status == PaymentStatus::Paid {
            active.paid_at = Set(Some(now));
        }
        active.updated_at = Set(now);
        active.update(&txn).await?;

        // Balance moves by the cash kept, not the cash tendered; change
        // goes back to the customer and must not drive the balance
        // negative on overpayment.
        let cash_kept = amount_paid - settlement.change;
        let mut payer_active: customer::ActiveModel = payer.clone().into();
        payer_active.outstanding_balance = Set(payer.outstanding_balance - cash_kept);
        payer_active.updated_at = Set(now);
        payer_active.update(&txn).await?;

        audit::record(
            &txn,
            actor,
            NewAuditLog {
                action: AuditAction::Payment,
                entity_type: "bills",
                entity_id: Some(bill_id),
                details: json!({
                    "amount_paid": amount_paid,
                    "penalty": penalty,
                    "remaining": settlement.remaining,
                    "change": settlement.change,
                    "status": settlement.status.as_str(),
                    "customer_id": payer.id,
                    "customer_name": payer.name,
                }),
                description: format!(
                    "Payment of Rp{} for bill #{} ({})",
                    amount_paid,
                    bill_id,
                    if settlement.status == PaymentStatus::Paid {
                        "PAID"
                    } else {
                        "PARTIAL"
                    }
                ),
            },
        )
        .await?;

        txn.commit().await?;
        info!(
            bill_id,
            amount = %amount_paid,
            remaining = %settlement.remaining,
            status = settlement.status.as_str(),
            "payment recorded"
        );

        Ok(PaymentReceipt {
            bill_id,
            amount_paid,
            remaining: settlement.remaining,
            change: settlement.change,
            payment_status: settlement.status.as_str().to_string(),
        })
    }

    pub async fn find_one(&self, id: i32) -> DomainResult<BillDetail> {
        let (target, reading) = bill::Entity::find_by_id(id)
            .filter(bill::Column::DeletedAt.is_null())
            .find_also_related(meter_reading::Entity)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Bill", "id", id.to_string()))?;

        let reading = reading
            .ok_or_else(|| DomainError::not_found("Meter reading", "bill_id", id.to_string()))?;
        let owner = customer::Entity::find_by_id(reading.customer_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                DomainError::not_found("Customer", "id", reading.customer_id.to_string())
            })?;

        Ok(BillDetail {
            id: target.id,
            period: reading.period,
            customer: CustomerSummary::from(&owner),
            total_amount: target.total_amount,
            penalty: target.penalty,
            amount_paid: target.amount_paid,
            remaining: target.remaining,
            change: target.change,
            payment_status: target.payment_status,
            paid_at: target.paid_at,
        })
    }

    /// All pending and partial bills, newest first.
    pub async fn find_pending(&self) -> DomainResult<Vec<PendingBill>> {
        let rows = bill::Entity::find()
            .filter(bill::Column::PaymentStatus.is_in([
                PaymentStatus::Pending.as_str(),
                PaymentStatus::Partial.as_str(),
            ]))
            .filter(bill::Column::DeletedAt.is_null())
            .order_by_desc(bill::Column::CreatedAt)
            .order_by_desc(bill::Column::Id)
            .find_also_related(meter_reading::Entity)
            .all(&self.db)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (b, reading) in rows {
            let Some(reading) = reading else { continue };
            let Some(owner) = customer::Entity::find_by_id(reading.customer_id)
                .one(&self.db)
                .await?
            else {
                continue;
            };
            out.push(PendingBill {
                id: b.id,
                period: reading.period,
                customer: CustomerSummary::from(&owner),
                total_amount: b.total_amount,
                remaining: b.remaining,
                payment_status: b.payment_status,
            });
        }
        Ok(out)
    }
}
