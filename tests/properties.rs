//! Store-level properties of ids, deletes, updates and queries.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use procure_mockdb::{
    into_fields, ChangeEvent, ChangeKind, Fields, MockDatabase, MockDb, Record, ResetPolicy,
    SeedSet, Topic,
};
use serde_json::{json, Value};

fn named(name: &str) -> Fields {
    into_fields(json!({ "name": name })).unwrap()
}

fn numbered(n: u64) -> Fields {
    into_fields(json!({ "n": n, "parity": if n % 2 == 0 { "even" } else { "odd" } })).unwrap()
}

#[test]
fn fresh_collection_ids_follow_call_order() {
    for count in [1usize, 2, 7, 50] {
        let db = MockDatabase::new();
        let ids: Vec<u64> = (0..count).map(|i| db.create("c", numbered(i as u64)).id()).collect();
        let expected: Vec<u64> = (1..=count as u64).collect();
        assert_eq!(ids, expected);
    }
}

#[test]
fn ids_after_deletion_exceed_every_issued_id() {
    let db = MockDatabase::new();
    let mut max_issued = 0;
    for round in 0..5 {
        for _ in 0..3 {
            max_issued = max_issued.max(db.create("c", Fields::new()).id());
        }
        // Delete everything, including the newest record.
        for record in db.get_all("c") {
            assert!(db.delete("c", record.id()));
        }
        let next = db.create("c", Fields::new());
        assert!(next.id() > max_issued, "round {}: {} reused", round, next.id());
        max_issued = next.id();
    }
}

#[test]
fn update_of_missing_id_changes_nothing() {
    let db = MockDatabase::new();
    for n in 0..4 {
        db.create("c", numbered(n));
    }
    let before = db.get_all("c");
    for missing in [0u64, 5, 99] {
        assert!(db.update("c", missing, named("X")).is_none());
        assert!(db.update("c", missing.to_string(), named("X")).is_none());
    }
    assert_eq!(db.get_all("c"), before);
}

#[test]
fn delete_removes_exactly_one() {
    let db = MockDatabase::new();
    for n in 0..6 {
        db.create("c", numbered(n));
    }
    for id in [3u64, 1, 6] {
        let before = db.len("c");
        assert!(db.delete("c", id));
        assert_eq!(db.len("c"), before - 1);
        assert!(db.get_by_id("c", id).is_none());
        assert!(db.get_all("c").iter().all(|r| r.id() != id));
    }
}

#[test]
fn create_then_get_round_trips() {
    let db = MockDatabase::new();
    let inputs = [
        json!({"name": "A"}),
        json!({"nested": {"items": [1, 2, 3]}, "flag": true}),
        json!({}),
    ];
    for input in inputs {
        let created = db.create_json("c", input).unwrap();
        assert_eq!(db.get_by_id("c", created.id()), Some(created.clone()));
        assert_eq!(db.get_by_id("c", created.mirror_id()), Some(created));
    }
}

#[test]
fn second_delete_is_a_no_op() {
    let db = MockDatabase::new();
    for n in 0..3 {
        db.create("c", numbered(n));
    }
    assert!(db.delete("c", 2));
    let after_first = db.get_all("c");
    assert!(!db.delete("c", 2));
    assert_eq!(db.get_all("c"), after_first);
}

#[test]
fn query_is_the_ordered_subsequence_of_get_all() {
    let db = MockDatabase::new();
    for n in 0..20 {
        db.create("c", numbered(n));
    }
    db.delete("c", 4);
    db.update("c", 7, into_fields(json!({"parity": "even"})).unwrap());

    let is_even = |r: &Record| r.get("parity") == Some(&Value::from("even"));
    let expected: Vec<Record> = db.get_all("c").into_iter().filter(|r| is_even(r)).collect();
    assert_eq!(db.query("c", is_even), expected);
    assert!(db.query("c", |_| false).is_empty());
    assert_eq!(db.query("c", |_| true), db.get_all("c"));
}

#[test]
fn reset_never_mixes_user_and_seed_data() {
    let seed = SeedSet::new().with_records("c", vec![named("seed-1"), named("seed-2")]);

    let reseeding = MockDatabase::with_seed(seed.clone(), ResetPolicy::Reseed);
    let expected = reseeding.get_all("c");
    reseeding.create("c", named("user"));
    reseeding.update("c", 1, named("edited"));
    reseeding.reset();
    assert_eq!(reseeding.get_all("c"), expected);

    let emptying = MockDatabase::with_seed(seed, ResetPolicy::Empty);
    emptying.create("c", named("user"));
    emptying.reset();
    assert!(emptying.get_all("c").is_empty());
}

#[test]
fn employees_scenario() {
    let db = MockDatabase::new();
    assert_eq!(
        db.create("employees", named("A")).to_value(),
        json!({"id": 1, "_id": "1", "name": "A"})
    );
    assert_eq!(
        db.create("employees", named("B")).to_value(),
        json!({"id": 2, "_id": "2", "name": "B"})
    );
    assert!(db.delete("employees", 1));
    assert_eq!(
        serde_json::to_value(db.get_all("employees")).unwrap(),
        json!([{"id": 2, "_id": "2", "name": "B"}])
    );
    assert_eq!(
        db.update("employees", 2, named("B2")).map(|r| r.to_value()),
        Some(json!({"id": 2, "_id": "2", "name": "B2"}))
    );
    assert!(db.update("employees", 99, named("X")).is_none());
}

#[test]
fn concurrent_creates_get_distinct_ids() {
    const THREADS: u64 = 16;
    const PER_THREAD: u64 = 25;

    let db = MockDb::new();
    let events: Arc<Mutex<Vec<ChangeEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let _sub = db.subscribe(Topic::All, move |event| sink.lock().push(event.clone()));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let db = db.clone();
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|i| db.create("c", numbered(t * PER_THREAD + i)).id())
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let mut ids: Vec<u64> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    ids.sort_unstable();

    let total = THREADS * PER_THREAD;
    assert_eq!(ids, (1..=total).collect::<Vec<u64>>());
    assert_eq!(db.get_all("c").len() as u64, total);

    let events = events.lock();
    assert_eq!(events.len() as u64, total);
    assert!(events.iter().all(|e| e.kind == ChangeKind::Created));
    let mut event_ids: Vec<u64> = events.iter().filter_map(|e| e.id).collect();
    event_ids.sort_unstable();
    assert_eq!(event_ids, ids);
}
