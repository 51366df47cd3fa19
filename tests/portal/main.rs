//! Integration tests for the mock database as the portal uses it.

mod models;

use std::sync::Arc;

use models::{BidOpening, Supplier};
use parking_lot::Mutex;
use procure_mockdb::models::{Employee, Tender, TenderStatus};
use procure_mockdb::{
    ChangeEvent, ChangeKind, DbError, Document, DocumentsExt, MockDb, MockDbConfig, ResetPolicy,
    SeedSet, StoreSnapshot, Topic,
};
use serde_json::json;

#[test]
fn derive_declares_collections() {
    assert_eq!(Supplier::COLLECTION, "suppliers");
    assert_eq!(BidOpening::COLLECTION, "bid_openings");
}

#[test]
fn external_documents_validate() {
    let db = MockDb::new();
    let suppliers = db.documents::<Supplier>();

    let err = suppliers.create(&Supplier::new("Acme", "12-34")).unwrap_err();
    assert!(matches!(err, DbError::Schema { .. }));

    let stored = suppliers.create(&Supplier::new("Acme", "123456789")).unwrap();
    assert_eq!(stored.id, 1);

    let blacklisted = suppliers
        .patch_json(stored.id, json!({"blacklisted": true}))
        .unwrap()
        .unwrap();
    assert!(blacklisted.data.blacklisted);

    let openings = db.documents::<BidOpening>();
    openings
        .create(&BidOpening {
            tender_id: 1,
            opened_at: "2026-12-01T10:00:00Z".into(),
        })
        .unwrap();
    assert_eq!(db.get_all("bid_openings").len(), 1);
}

#[test]
fn list_and_form_stay_in_sync() {
    let db = MockDb::with_seed(SeedSet::procurement(), ResetPolicy::Reseed);

    // Dashboard list of published tenders and an edit form, both on "tenders".
    let published = db.filtered_view("tenders", |r| r.get_str("status") == Some("published"));
    let form = db.view("tenders");
    assert_eq!(published.len(), 1);

    let tender = Tender {
        reference: "TND-2026-004".into(),
        title: "Printers".into(),
        plan_id: Some(1),
        procurement_method: procure_mockdb::models::ProcurementMethod::Open,
        status: TenderStatus::Published,
        closing_date: "2027-01-15".into(),
        estimated_value: 9000.0,
    };
    let fields = tender.to_fields().unwrap();
    let created = form.create(fields);
    assert_eq!(created.id(), 4);
    assert_eq!(published.len(), 2);

    form.update_json(created.id(), json!({"status": "cancelled"})).unwrap();
    assert_eq!(published.len(), 1);

    assert!(form.delete(created.mirror_id()));
    assert_eq!(form.len(), 3);
}

#[test]
fn typed_writes_notify_views() {
    let db = MockDb::new();
    let view = db.view("employees");

    db.documents::<Employee>()
        .create(&Employee::new("Lena", "lena@procure.example"))
        .unwrap();

    let records = view.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get_str("email"), Some("lena@procure.example"));
}

#[test]
fn scoped_listener_sees_only_its_collection_and_resets() {
    let db = MockDb::with_seed(SeedSet::procurement(), ResetPolicy::Empty);
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&kinds);
    let _sub = db.subscribe(Topic::collection("committees"), move |event| {
        sink.lock().push(event.kind);
    });

    db.create_json("tenders", json!({"title": "Ignored"})).unwrap();
    db.update_json("committees", 1, json!({"name": "Renamed"})).unwrap();
    db.reset();

    assert_eq!(
        kinds.lock().as_slice(),
        &[ChangeKind::Updated, ChangeKind::Reset]
    );
    assert!(db.get_all("committees").is_empty());
}

#[test]
fn snapshot_restore_notifies_views() {
    let db = MockDb::with_seed(SeedSet::procurement(), ResetPolicy::Reseed);
    let saved = db.snapshot();

    let view = db.view("employees");
    db.clear();
    assert!(view.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal.json");
    saved.save(&path).unwrap();

    db.restore(StoreSnapshot::load(&path).unwrap()).unwrap();
    assert_eq!(view.len(), 4);
    assert_eq!(db.create_json("employees", json!({"name": "X"})).unwrap().id(), 5);
}

#[test]
fn config_file_drives_seeding() {
    let dir = tempfile::tempdir().unwrap();
    let seed_path = dir.path().join("seed.json");
    std::fs::write(
        &seed_path,
        r#"{ "employees": [ { "name": "Solo", "email": "solo@procure.example" } ] }"#,
    )
    .unwrap();

    let config_path = dir.path().join("mockdb.toml");
    std::fs::write(
        &config_path,
        format!(
            "seed_file = {:?}\nreseed_on_reset = false\n",
            seed_path.display().to_string()
        ),
    )
    .unwrap();

    // Only the file should drive this config.
    for suffix in ["SEED", "SEED_FILE", "RESEED_ON_RESET"] {
        std::env::remove_var(format!("PROCURE_MOCKDB_{}", suffix));
    }
    let config = MockDbConfig::load_from_path(&config_path).unwrap();
    let db = MockDb::from_config(&config).unwrap();
    assert_eq!(db.get_all("employees").len(), 1);
    assert!(db.get_all("tenders").is_empty());

    db.reset();
    assert!(db.get_all("employees").is_empty());
}

#[test]
fn listener_events_carry_ids() {
    let db = MockDb::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let _sub = db.subscribe(Topic::All, move |event| sink.lock().push(event.clone()));

    let a = db.create_json("employees", json!({"name": "A"})).unwrap();
    db.delete("employees", a.mirror_id());

    assert_eq!(
        events.lock().as_slice(),
        &[
            ChangeEvent::created("employees", 1),
            ChangeEvent::deleted("employees", 1)
        ]
    );
}
