use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

/// Bootstrap bookkeeping schema. Every migration, this one included, is
/// recorded in the table this script defines.
const BOOTSTRAP_SCRIPT: &str = "\
DEFINE TABLE OVERWRITE migration SCHEMAFULL;
DEFINE FIELD OVERWRITE key ON migration TYPE string;
DEFINE FIELD OVERWRITE version ON migration TYPE string;
DEFINE FIELD OVERWRITE checksum ON migration TYPE string;
DEFINE FIELD OVERWRITE applied_at ON migration TYPE datetime DEFAULT time::now();
DEFINE INDEX OVERWRITE migration_unique ON migration FIELDS key, version UNIQUE;";

pub(crate) fn builtin_migrations() -> Vec<Migration> {
    vec![Migration::new("core", "0001", BOOTSTRAP_SCRIPT)]
}

#[derive(Debug)]
pub(crate) struct Migration {
    pub key: &'static str,
    pub version: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub(crate) const fn new(key: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { key, version, script }
    }

    fn id(&self) -> String {
        format!("{}:{}", self.key, self.version)
    }

    /// Content hash of the script, persisted so later runs can detect edits
    /// to an already-applied migration.
    fn checksum(&self) -> String {
        format!("{:016x}", fxhash::hash64(self.script.as_bytes()))
    }

    fn to_applied(&self) -> AppliedMigration {
        AppliedMigration {
            key: self.key.to_owned(),
            version: self.version.to_owned(),
            checksum: self.checksum(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct AppliedMigration {
    pub key: String,
    pub version: String,
    pub checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner {
    db: Surreal<Any>,
}

impl MigrationRunner {
    #[must_use]
    pub(crate) const fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        self.run_list(&builtin_migrations()).await
    }

    async fn run_list(&self, migrations: &[Migration]) -> Result<MigrationReport, DatabaseError> {
        let mut report = MigrationReport::default();
        let applied_migrations = self.get_migrations_map().await?;

        for migration in migrations {
            if let Some(applied) = applied_migrations.get(&migration.id()) {
                ensure_checksum_match(migration, &applied.checksum)?;
                report.skipped.push(migration.to_applied());
                continue;
            }

            self.apply_migration(migration).await?;
            report.applied.push(migration.to_applied());
        }

        Ok(report)
    }

    async fn apply_migration(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration SET key = $key, version = $version, checksum = $checksum;
            COMMIT TRANSACTION;",
            migration.script,
        );

        let _ = self
            .db
            .query(&query)
            .bind(("key", migration.key))
            .bind(("version", migration.version))
            .bind(("checksum", migration.checksum()))
            .await
            .context(format!("SQL execution failed at {}:{}", migration.key, migration.version))?;

        Ok(())
    }

    async fn is_system_ready(&self) -> Result<bool, DatabaseError> {
        let mut response = self
            .db
            .query("!(SELECT VALUE fields FROM ONLY INFO FOR TABLE migration).is_empty()")
            .await
            .context("Checking if system is ready")?;

        let is_ready = response.take::<Option<bool>>(0)?.unwrap_or_default();
        Ok(is_ready)
    }

    async fn get_migrations_map(
        &self,
    ) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let is_ready = self.is_system_ready().await?;

        if !is_ready {
            return Ok(FxHashMap::default());
        }

        let entries = self
            .db
            .query("SELECT key, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing migrations map")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.key, entry.version), entry))
            .collect())
    }
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    let expected = migration.checksum();
    if existing != expected {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (expected {existing}, got {expected})",
                migration.id(),
            )
            .into(),
            context: Some("Migration already applied with different checksum".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::any::connect;

    async fn mem_db() -> Surreal<Any> {
        let db = connect("mem://").await.expect("mem engine");
        db.use_ns("test").use_db("migrations").await.expect("session");
        db
    }

    #[tokio::test]
    async fn applies_builtins_once_then_skips() {
        let runner = MigrationRunner::new(mem_db().await);

        let first = runner.run().await.expect("first run");
        assert_eq!(first.applied.len(), 1);
        assert!(first.skipped.is_empty());

        let second = runner.run().await.expect("second run");
        assert!(second.applied.is_empty());
        assert_eq!(second.skipped.len(), 1);
    }

    #[tokio::test]
    async fn checksum_mismatch_is_an_error() {
        let runner = MigrationRunner::new(mem_db().await);
        runner.run().await.expect("bootstrap");

        let v1 = Migration::new("demo", "0001", "DEFINE TABLE OVERWRITE demo SCHEMALESS;");
        let report = runner.run_list(&[v1]).await.expect("apply demo");
        assert_eq!(report.applied.len(), 1);

        let tampered = Migration::new("demo", "0001", "DEFINE TABLE OVERWRITE demo SCHEMAFULL;");
        let err = runner.run_list(&[tampered]).await.expect_err("tampered script");
        assert!(matches!(err, DatabaseError::Migration { .. }));
    }

    #[tokio::test]
    async fn fresh_engine_reports_not_ready() {
        let runner = MigrationRunner::new(mem_db().await);
        let ready = runner.is_system_ready().await.expect("readiness probe");
        assert!(!ready);

        runner.run().await.expect("bootstrap");
        let ready = runner.is_system_ready().await.expect("readiness probe");
        assert!(ready);
    }
}
