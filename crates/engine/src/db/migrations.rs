//! Versioned, tracked reference-data migrations.
//!
//! Each migration runs at most once per database: applied versions are
//! recorded and skipped on replay, so `migrate` is safe to call on every
//! startup. This replaces ad hoc schema-patch scripts re-executed as part
//! of runtime logic.

use tracing::info;

use pickupmart_core::CityId;

use super::{Database, Tables};
use crate::models::City;

/// A single migration step.
struct Migration {
    version: u32,
    name: &'static str,
    apply: fn(&mut Tables),
}

/// The full, ordered migration history. Append only; never reorder or edit
/// an entry that has shipped.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "seed-city-directory",
        apply: seed_city_directory,
    },
    Migration {
        version: 2,
        name: "add-pilot-cities-inactive",
        apply: add_pilot_cities_inactive,
    },
];

/// What a [`migrate`] run did.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Versions and names applied by this run, in order.
    pub applied: Vec<(u32, &'static str)>,
    /// Versions that were already applied and skipped.
    pub skipped: Vec<u32>,
}

/// Apply all pending migrations in version order.
pub async fn migrate(db: &Database) -> MigrationReport {
    let mut report = MigrationReport::default();
    let mut tables = db.write().await;

    for migration in MIGRATIONS {
        if tables.applied_migrations.contains_key(&migration.version) {
            report.skipped.push(migration.version);
            continue;
        }
        (migration.apply)(&mut tables);
        tables
            .applied_migrations
            .insert(migration.version, migration.name.to_string());
        info!(
            version = migration.version,
            name = migration.name,
            "applied migration"
        );
        report.applied.push((migration.version, migration.name));
    }

    report
}

fn insert_city(tables: &mut Tables, name: &str, active: bool) {
    if tables
        .cities
        .values()
        .any(|city| city.name.eq_ignore_ascii_case(name))
    {
        return;
    }
    let city = City {
        id: CityId::generate(),
        name: name.to_string(),
        active,
    };
    tables.cities.insert(city.id, city);
}

/// v1: the launch city directory.
fn seed_city_directory(tables: &mut Tables) {
    for name in ["Hyderabad", "Bengaluru", "Mumbai", "Pune", "Chennai"] {
        insert_city(tables, name, true);
    }
}

/// v2: pilot cities registered but not yet open for store creation.
fn add_pilot_cities_inactive(tables: &mut Tables) {
    for name in ["Mysuru", "Kochi"] {
        insert_city(tables, name, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_applies_all_versions_once() {
        let db = Database::new();

        let first = migrate(&db).await;
        assert_eq!(first.applied.len(), MIGRATIONS.len());
        assert!(first.skipped.is_empty());

        let second = migrate(&db).await;
        assert!(second.applied.is_empty(), "replay must be a no-op");
        assert_eq!(second.skipped.len(), MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_seeded_cities_resolve() {
        let db = Database::new();
        migrate(&db).await;

        let hyderabad = db
            .cities()
            .find_by_name("Hyderabad")
            .await
            .expect("seeded");
        assert!(hyderabad.active);

        let mysuru = db.cities().find_by_name("Mysuru").await.expect("seeded");
        assert!(!mysuru.active, "pilot cities start inactive");
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent_for_city_count() {
        let db = Database::new();
        migrate(&db).await;
        let count = db.cities().list().await.len();
        migrate(&db).await;
        assert_eq!(db.cities().list().await.len(), count);
    }
}
