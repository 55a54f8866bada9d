//! Customer CRUD, soft-delete cascade, restore and force delete

mod common;

use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use tirta_billing::application::services::{
    customers::{CustomerService, UpdateCustomer},
    readings::MeterReadingService,
};
use tirta_billing::domain::{Actor, DomainError};
use tirta_billing::infrastructure::database::entities::{bill, bill_item, customer, meter_reading};
use tirta_billing::shared::types::PaginationParams;

#[tokio::test]
async fn duplicate_customer_number_is_a_conflict() {
    let db = common::setup().await;
    let customers = CustomerService::new(db.clone());

    customers
        .create("Ibu SUHENI", 1001, &Actor::system())
        .await
        .unwrap();
    let err = customers
        .create("Bpk. HARSONO", 1001, &Actor::system())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn update_renames_and_checks_number_collisions() {
    let db = common::setup().await;
    let customers = CustomerService::new(db.clone());

    let a = customers
        .create("Ibu SUKINEM", 1001, &Actor::system())
        .await
        .unwrap();
    customers
        .create("Bpk. HERU", 1002, &Actor::system())
        .await
        .unwrap();

    let renamed = customers
        .update(
            a.id,
            UpdateCustomer {
                name: Some("Ibu SUKINEM RT. 02".to_string()),
                customer_number: None,
            },
            &Actor::new("Admin"),
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Ibu SUKINEM RT. 02");
    assert_eq!(renamed.customer_number, 1001);

    let err = customers
        .update(
            a.id,
            UpdateCustomer {
                name: None,
                customer_number: Some(1002),
            },
            &Actor::new("Admin"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn listing_pages_by_customer_number() {
    let db = common::setup().await;
    let customers = CustomerService::new(db.clone());

    for n in [1005, 1001, 1003, 1004, 1002] {
        customers
            .create(&format!("Customer {n}"), n, &Actor::system())
            .await
            .unwrap();
    }

    let page1 = customers
        .find_all(PaginationParams::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page1.total, 5);
    assert_eq!(page1.total_pages, 3);
    let numbers: Vec<i32> = page1.items.iter().map(|c| c.customer_number).collect();
    assert_eq!(numbers, vec![1001, 1002]);

    let page3 = customers
        .find_all(PaginationParams::new(3, 2))
        .await
        .unwrap();
    assert_eq!(page3.items.len(), 1);
    assert_eq!(page3.items[0].customer_number, 1005);

    // A literal page 0 is treated as the first page, not an underflow
    let page0 = customers
        .find_all(PaginationParams { page: 0, limit: 2 })
        .await
        .unwrap();
    let numbers: Vec<i32> = page0.items.iter().map(|c| c.customer_number).collect();
    assert_eq!(numbers, vec![1001, 1002]);
}

#[tokio::test]
async fn detail_view_includes_reading_history() {
    let db = common::setup().await;
    let customers = CustomerService::new(db.clone());
    let readings = MeterReadingService::new(db.clone());

    let created = customers
        .create("Bpk. SUKINO", 1001, &Actor::system())
        .await
        .unwrap();
    readings
        .create(created.id, "2025-10", 10, &Actor::system())
        .await
        .unwrap();
    readings
        .create(created.id, "2025-11", 25, &Actor::system())
        .await
        .unwrap();

    let detail = customers.find_one(created.id).await.unwrap();
    assert_eq!(detail.customer_number, 1001);
    assert_eq!(detail.readings.len(), 2);
    // Newest period first
    assert_eq!(detail.readings[0].period, "2025-11");
    assert!(detail.readings.iter().all(|r| r.bill.is_some()));
    assert_eq!(detail.outstanding_balance, dec!(15000) + dec!(21000));
}

#[tokio::test]
async fn soft_delete_then_restore_round_trips() {
    let db = common::setup().await;
    let customers = CustomerService::new(db.clone());
    let readings = MeterReadingService::new(db.clone());

    let created = customers
        .create("Ibu SUNARTI", 1001, &Actor::system())
        .await
        .unwrap();
    for (period, end) in [("2025-10", 10), ("2025-11", 25), ("2025-12", 40)] {
        readings
            .create(created.id, period, end, &Actor::system())
            .await
            .unwrap();
    }
    let balance_before = customer::Entity::find_by_id(created.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap()
        .outstanding_balance;

    let deleted = customers.remove(created.id, &Actor::new("Admin")).await.unwrap();
    assert_eq!(deleted, 3);

    // Hidden from every live query
    assert!(matches!(
        customers.find_one(created.id).await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
    assert_eq!(customers.find_all(PaginationParams::default()).await.unwrap().total, 0);
    let live_readings = meter_reading::Entity::find()
        .filter(meter_reading::Column::DeletedAt.is_null())
        .count(&db)
        .await
        .unwrap();
    assert_eq!(live_readings, 0);
    let live_bills = bill::Entity::find()
        .filter(bill::Column::DeletedAt.is_null())
        .count(&db)
        .await
        .unwrap();
    assert_eq!(live_bills, 0);
    let live_items = bill_item::Entity::find()
        .filter(bill_item::Column::DeletedAt.is_null())
        .count(&db)
        .await
        .unwrap();
    assert_eq!(live_items, 0);

    // New readings for a deleted customer are refused
    assert!(matches!(
        readings
            .create(created.id, "2026-01", 50, &Actor::system())
            .await
            .unwrap_err(),
        DomainError::NotFound { .. }
    ));

    let restored = customers.restore(created.id, &Actor::new("Admin")).await.unwrap();
    assert_eq!(restored, 3);

    let detail = customers.find_one(created.id).await.unwrap();
    assert_eq!(detail.readings.len(), 3);
    assert_eq!(detail.outstanding_balance, balance_before);
    let live_items = bill_item::Entity::find()
        .filter(bill_item::Column::DeletedAt.is_null())
        .count(&db)
        .await
        .unwrap();
    assert_eq!(live_items, 9);
}

#[tokio::test]
async fn restoring_a_live_customer_is_invalid() {
    let db = common::setup().await;
    let customers = CustomerService::new(db.clone());

    let created = customers
        .create("Bpk. SUMARDI", 1001, &Actor::system())
        .await
        .unwrap();
    let err = customers
        .restore(created.id, &Actor::system())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)), "got {err:?}");
}

#[tokio::test]
async fn force_delete_removes_only_the_customer_row() {
    let db = common::setup().await;
    let customers = CustomerService::new(db.clone());
    let readings = MeterReadingService::new(db.clone());

    let created = customers
        .create("Ibu MARYATUN", 1001, &Actor::system())
        .await
        .unwrap();
    readings
        .create(created.id, "2025-10", 10, &Actor::system())
        .await
        .unwrap();

    customers
        .force_delete(created.id, &Actor::new("Admin"))
        .await
        .unwrap();

    assert!(customer::Entity::find_by_id(created.id)
        .one(&db)
        .await
        .unwrap()
        .is_none());

    // Readings, bills and items survive the customer row
    let orphaned = meter_reading::Entity::find()
        .filter(meter_reading::Column::CustomerId.eq(created.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(orphaned, 1);
    assert_eq!(bill::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(bill_item::Entity::find().count(&db).await.unwrap(), 3);
}

#[tokio::test]
async fn force_delete_works_on_a_soft_deleted_customer() {
    let db = common::setup().await;
    let customers = CustomerService::new(db.clone());

    let created = customers
        .create("Bpk. SUMINO", 1001, &Actor::system())
        .await
        .unwrap();
    customers.remove(created.id, &Actor::system()).await.unwrap();
    customers
        .force_delete(created.id, &Actor::system())
        .await
        .unwrap();

    assert!(customer::Entity::find_by_id(created.id)
        .one(&db)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn soft_deleted_number_still_blocks_reuse() {
    let db = common::setup().await;
    let customers = CustomerService::new(db.clone());

    let created = customers
        .create("Ibu SULAMI", 1001, &Actor::system())
        .await
        .unwrap();
    customers.remove(created.id, &Actor::system()).await.unwrap();

    let err = customers
        .create("Bpk. SUBARDI", 1001, &Actor::system())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)), "got {err:?}");
}
