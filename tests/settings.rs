//! Settings store behavior: seeding, typed reads, audited updates

mod common;

use rust_decimal_macros::dec;

use tirta_billing::application::services::{audit::AuditLogService, settings::SettingsService};
use tirta_billing::domain::{Actor, DomainError};
use tirta_billing::shared::types::PaginationParams;

#[tokio::test]
async fn defaults_are_seeded_once_and_ordered_by_key() {
    let db = common::setup().await;
    let settings = SettingsService::new(db.clone());

    // A second run must not duplicate or overwrite anything
    settings.ensure_defaults().await.unwrap();

    let all = settings.find_all().await.unwrap();
    let keys: Vec<&str> = all.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["ADMIN_FEE", "LIMIT_K1", "PENALTY_AMOUNT", "RATE_K1", "RATE_K2"]
    );
}

#[tokio::test]
async fn values_parse_as_decimals() {
    let db = common::setup().await;
    let settings = SettingsService::new(db.clone());

    assert_eq!(settings.get_value("RATE_K1").await.unwrap(), dec!(1200));
    assert_eq!(settings.get_value("PENALTY_AMOUNT").await.unwrap(), dec!(5000));

    let rates = settings.current_rates().await.unwrap();
    assert_eq!(rates.rate_k2, dec!(3000));
    assert_eq!(rates.limit_k1, 40);
    assert_eq!(rates.admin_fee, dec!(3000));
}

#[tokio::test]
async fn unknown_key_is_not_found() {
    let db = common::setup().await;
    let err = SettingsService::new(db.clone())
        .get_value("RATE_K3")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn non_numeric_update_is_rejected_before_writing() {
    let db = common::setup().await;
    let settings = SettingsService::new(db.clone());

    let err = settings
        .update("RATE_K1", "twelve hundred", &Actor::new("Admin"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)), "got {err:?}");
    assert_eq!(settings.get_value("RATE_K1").await.unwrap(), dec!(1200));
}

#[tokio::test]
async fn updates_are_audited() {
    let db = common::setup().await;
    let settings = SettingsService::new(db.clone());
    let audits = AuditLogService::new(db.clone());

    let updated = settings
        .update("ADMIN_FEE", "3500", &Actor::new("Admin"))
        .await
        .unwrap();
    assert_eq!(updated.value, "3500");

    let page = audits.find_all(PaginationParams::default()).await.unwrap();
    assert_eq!(page.total, 1);
    let entry = &page.items[0];
    assert_eq!(entry.action, "UPDATE");
    assert_eq!(entry.entity_type, "settings");
    assert_eq!(entry.performed_by, "Admin");

    // Page 0 reads as the first page on the audit side too
    let page0 = audits
        .find_all(PaginationParams { page: 0, limit: 10 })
        .await
        .unwrap();
    assert_eq!(page0.items.len(), 1);
}
