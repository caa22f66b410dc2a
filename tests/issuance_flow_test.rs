mod common;

use assert_matches::assert_matches;
use clinic_stock_api::{
    entities::{issuance::IssuanceStatus, stock_ledger_entry::LedgerEntryType},
    errors::ServiceError,
};
use uuid::Uuid;

#[tokio::test]
async fn issue_decrements_stock_and_appends_ledger_entry() {
    let app = common::setup().await;
    let item = app
        .stock
        .create_stock_item(common::new_item("Amoxicillin 500mg", "antibiotic", 120))
        .await
        .unwrap();
    let pharmacist = Uuid::new_v4();
    let order = Uuid::new_v4();

    let issued = app
        .issuance
        .issue(Some(order), item.id, 20, pharmacist, Some("counter sale".into()))
        .await
        .unwrap();

    assert_eq!(issued.quantity, 20);
    assert_eq!(issued.status, IssuanceStatus::Issued.as_str());
    assert_eq!(issued.order_id, Some(order));
    assert_eq!(issued.issued_by, pharmacist);
    assert!(issued.returned_at.is_none());

    let fresh = app.stock.get_stock_item(item.id).await.unwrap();
    assert_eq!(fresh.current_quantity, 100);
    assert_eq!(fresh.original_quantity, 120);

    let history = app.stock.history_for(item.id).await.unwrap();
    assert_eq!(history.len(), 1);
    let entry = &history[0];
    assert_eq!(entry.entry_type, LedgerEntryType::Issued.as_str());
    assert_eq!(entry.quantity, 20);
    assert_eq!(entry.previous_quantity, 120);
    assert_eq!(entry.changed_by, pharmacist);
    assert_eq!(entry.reference_id, Some(issued.id));
}

#[tokio::test]
async fn over_issue_fails_with_available_and_requested_and_mutates_nothing() {
    let app = common::setup().await;
    let item = app
        .stock
        .create_stock_item(common::new_item("Bifocal 1.56", "bifocal", 5))
        .await
        .unwrap();

    let err = app
        .issuance
        .issue(None, item.id, 10, Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InsufficientStock {
            available: 5,
            requested: 10
        }
    );

    let fresh = app.stock.get_stock_item(item.id).await.unwrap();
    assert_eq!(fresh.current_quantity, 5);
    assert!(app.stock.history_for(item.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn issue_then_return_round_trips_the_quantity() {
    let app = common::setup().await;
    let item = app
        .stock
        .create_stock_item(common::new_item("Single vision 1.61", "single_vision", 40))
        .await
        .unwrap();
    let issuer = Uuid::new_v4();
    let returner = Uuid::new_v4();

    let issued = app
        .issuance
        .issue(Some(Uuid::new_v4()), item.id, 15, issuer, None)
        .await
        .unwrap();
    assert_eq!(
        app.stock.get_stock_item(item.id).await.unwrap().current_quantity,
        25
    );

    let returned = app
        .issuance
        .return_issuance(issued.id, Some(returner), Some("order cancelled".into()))
        .await
        .unwrap();
    assert_eq!(returned.status, IssuanceStatus::Returned.as_str());
    assert!(returned.returned_at.is_some());

    let fresh = app.stock.get_stock_item(item.id).await.unwrap();
    assert_eq!(fresh.current_quantity, 40);

    let history = app.stock.history_for(item.id).await.unwrap();
    assert_eq!(history.len(), 2);
    let return_entry = history
        .iter()
        .find(|e| e.entry_type == LedgerEntryType::Returned.as_str())
        .expect("no returned entry");
    assert_eq!(return_entry.quantity, 15);
    assert_eq!(return_entry.previous_quantity, 25);
    assert_eq!(return_entry.changed_by, returner);
}

#[tokio::test]
async fn second_return_fails_without_double_crediting() {
    let app = common::setup().await;
    let item = app
        .stock
        .create_stock_item(common::new_item("Cetirizine 10mg", "antihistamine", 30))
        .await
        .unwrap();

    let issued = app
        .issuance
        .issue(None, item.id, 10, Uuid::new_v4(), None)
        .await
        .unwrap();

    app.issuance
        .return_issuance(issued.id, None, None)
        .await
        .unwrap();
    let err = app
        .issuance
        .return_issuance(issued.id, None, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));

    // Credited exactly once.
    let fresh = app.stock.get_stock_item(item.id).await.unwrap();
    assert_eq!(fresh.current_quantity, 30);
    let history = app.stock.history_for(item.id).await.unwrap();
    assert_eq!(
        history
            .iter()
            .filter(|e| e.entry_type == LedgerEntryType::Returned.as_str())
            .count(),
        1
    );
}

#[tokio::test]
async fn return_falls_back_to_the_original_issuer_identity() {
    let app = common::setup().await;
    let item = app
        .stock
        .create_stock_item(common::new_item("Ibuprofen 400mg", "analgesic", 50))
        .await
        .unwrap();
    let issuer = Uuid::new_v4();

    let issued = app
        .issuance
        .issue(None, item.id, 5, issuer, None)
        .await
        .unwrap();
    app.issuance
        .return_issuance(issued.id, None, None)
        .await
        .unwrap();

    let history = app.stock.history_for(item.id).await.unwrap();
    let return_entry = history
        .iter()
        .find(|e| e.entry_type == LedgerEntryType::Returned.as_str())
        .unwrap();
    assert_eq!(return_entry.changed_by, issuer);
}

#[tokio::test]
async fn issue_rejects_non_positive_quantities_before_mutating() {
    let app = common::setup().await;
    let item = app
        .stock
        .create_stock_item(common::new_item("Paracetamol 500mg", "analgesic", 10))
        .await
        .unwrap();

    for quantity in [0, -3] {
        let err = app
            .issuance
            .issue(None, item.id, quantity, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    assert_eq!(
        app.stock.get_stock_item(item.id).await.unwrap().current_quantity,
        10
    );
}

#[tokio::test]
async fn issue_against_unknown_item_is_not_found() {
    let app = common::setup().await;
    let err = app
        .issuance
        .issue(None, Uuid::new_v4(), 1, Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn return_of_unknown_issuance_is_not_found() {
    let app = common::setup().await;
    let err = app
        .issuance
        .return_issuance(Uuid::new_v4(), None, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn issuances_are_listed_per_order() {
    let app = common::setup().await;
    let item = app
        .stock
        .create_stock_item(common::new_item("Frame glass 2mm", "frame", 100))
        .await
        .unwrap();
    let order = Uuid::new_v4();
    let other_order = Uuid::new_v4();
    let user = Uuid::new_v4();

    app.issuance
        .issue(Some(order), item.id, 3, user, None)
        .await
        .unwrap();
    app.issuance
        .issue(Some(order), item.id, 4, user, None)
        .await
        .unwrap();
    app.issuance
        .issue(Some(other_order), item.id, 5, user, None)
        .await
        .unwrap();

    let for_order = app.issuance.list_for_order(order).await.unwrap();
    assert_eq!(for_order.len(), 2);
    assert!(for_order.iter().all(|i| i.order_id == Some(order)));

    let fetched = app
        .issuance
        .get_issuance(for_order[0].id)
        .await
        .unwrap();
    assert_eq!(fetched.id, for_order[0].id);
}
