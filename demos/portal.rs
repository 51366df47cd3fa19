//! Walk through the mock database the way the portal's screens use it.
//!
//! Run with `RUST_LOG=procure_mockdb=debug` to see store activity.

use procure_mockdb::models::{Discussion, DiscussionStatus, Employee, EmployeeRole};
use procure_mockdb::{DbError, DocumentsExt, MockDb, MockDbConfig, Topic};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), DbError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = MockDbConfig::load_from_path("mockdb.toml")?;
    let db = MockDb::from_config(&config)?;

    // Two independent screens over the same collection.
    let directory = db.view("employees");
    let admins = db.filtered_view("employees", |r| r.get_str("role") == Some("admin"));

    let _audit = db.subscribe(Topic::All, |event| {
        println!("[change] {}", event);
    });

    let mut hire = Employee::new("Grace Njoroge", "grace.njoroge@procure.example");
    hire.department = "Procurement".into();
    hire.role = EmployeeRole::Admin;
    let stored = db.documents::<Employee>().create(&hire)?;
    println!(
        "hired #{}: directory has {}, admins {}",
        stored.id,
        directory.len(),
        admins.len()
    );

    let discussions = db.documents::<Discussion>();
    for thread in discussions.find(|d| d.status != DiscussionStatus::Resolved)? {
        println!(
            "open discussion #{} with {}: {}",
            thread.id, thread.data.agency, thread.data.subject
        );
    }

    db.reset();
    println!(
        "after reset: directory has {}, admins {}",
        directory.len(),
        admins.len()
    );

    Ok(())
}
