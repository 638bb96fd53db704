//! The migration runner: run, rollback, status.

use std::collections::HashSet;
use std::sync::Arc;

use super::repository::MigrationRepository;
use super::{checksum, resolve_order, Migration};
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::schema::{Schema, SchemaBuilder};

/// The failing unit of a partially-successful run or rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFailure {
    pub name: String,
    pub message: String,
}

/// Outcome of [`Migrator::run`]: what succeeded before any failure.
/// Migrations already committed stay committed.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub ran: Vec<String>,
    pub batch: Option<i64>,
    pub failed: Option<MigrationFailure>,
}

/// Outcome of [`Migrator::rollback`].
#[derive(Debug, Clone, Default)]
pub struct RollbackReport {
    pub rolled_back: Vec<String>,
    pub failed: Option<MigrationFailure>,
}

/// Status of one discovered migration.
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub name: String,
    pub description: String,
    pub applied: bool,
    pub batch: Option<i64>,
    /// Whether the stored checksum still matches; `None` when pending.
    pub checksum_valid: Option<bool>,
}

/// Orders and executes migration units against one connection.
pub struct Migrator {
    migrations: Vec<Arc<dyn Migration>>,
    repository: MigrationRepository,
}

impl Migrator {
    pub fn new(repository: MigrationRepository) -> Self {
        Self {
            migrations: Vec::new(),
            repository,
        }
    }

    /// Register a migration unit.
    pub fn register(&mut self, migration: Arc<dyn Migration>) {
        self.migrations.push(migration);
    }

    /// The repository this migrator tracks history in.
    pub fn repository(&self) -> &MigrationRepository {
        &self.repository
    }

    fn discovered(&self) -> Vec<Arc<dyn Migration>> {
        let mut migrations = self.migrations.clone();
        migrations.sort_by(|a, b| a.name().cmp(b.name()));
        migrations
    }

    /// Run all pending migrations in dependency order.
    ///
    /// Stops at the first failure; earlier migrations of this run stay
    /// committed and are reported in the returned [`RunReport`].
    pub async fn run(&self, conn: &mut Connection) -> Result<RunReport> {
        self.repository.ensure_table(conn).await?;
        let ran: HashSet<String> = self
            .repository
            .get_ran(conn)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();

        let pending: Vec<Arc<dyn Migration>> = self
            .discovered()
            .into_iter()
            .filter(|m| !ran.contains(m.name()))
            .collect();
        verify_dependencies(&pending, &ran)?;
        let ordered = resolve_order(&pending)?;

        let mut report = RunReport::default();
        if ordered.is_empty() {
            return Ok(report);
        }
        let batch = self.repository.max_batch(conn).await? + 1;
        report.batch = Some(batch);

        for migration in ordered {
            let mut schema = Schema::new();
            migration.up(&mut schema);
            let outcome = self.execute(conn, &migration, &schema).await;
            match outcome {
                Ok(()) => {
                    let sum = checksum(migration.as_ref())?;
                    self.repository
                        .log(conn, migration.name(), &sum, batch)
                        .await?;
                    tracing::info!(
                        target: "quarry::migrate",
                        migration = migration.name(),
                        batch,
                        "migrated"
                    );
                    report.ran.push(migration.name().to_string());
                }
                Err(error) => {
                    report.failed = Some(MigrationFailure {
                        name: migration.name().to_string(),
                        message: error.to_string(),
                    });
                    break;
                }
            }
        }
        Ok(report)
    }

    /// Roll back the most recent `steps` batches, newest first, each
    /// batch in reverse-of-application order.
    pub async fn rollback(&self, conn: &mut Connection, steps: usize) -> Result<RollbackReport> {
        self.repository.ensure_table(conn).await?;
        let mut report = RollbackReport::default();
        if steps == 0 {
            return Ok(report);
        }

        let records = self.repository.get_ran(conn).await?;
        let mut batches: Vec<i64> = records.iter().map(|r| r.batch).collect();
        batches.sort_unstable();
        batches.dedup();
        let targets: HashSet<i64> = batches.into_iter().rev().take(steps).collect();

        let mut to_revert: Vec<_> = records
            .into_iter()
            .filter(|r| targets.contains(&r.batch))
            .collect();
        to_revert.sort_by_key(|r| std::cmp::Reverse(r.id));

        for record in to_revert {
            let Some(migration) = self
                .migrations
                .iter()
                .find(|m| m.name() == record.name)
            else {
                report.failed = Some(MigrationFailure {
                    name: record.name.clone(),
                    message: format!("migration '{}' is not registered", record.name),
                });
                break;
            };
            let mut schema = Schema::new();
            migration.down(&mut schema);
            let outcome = self.execute(conn, migration, &schema).await;
            match outcome {
                Ok(()) => {
                    self.repository.delete(conn, &record.name).await?;
                    tracing::info!(
                        target: "quarry::migrate",
                        migration = record.name.as_str(),
                        "rolled back"
                    );
                    report.rolled_back.push(record.name);
                }
                Err(error) => {
                    report.failed = Some(MigrationFailure {
                        name: record.name,
                        message: error.to_string(),
                    });
                    break;
                }
            }
        }
        Ok(report)
    }

    /// Report every discovered migration with its applied state and
    /// checksum drift. Read-only; drift is reported, never fatal.
    pub async fn status(&self, conn: &mut Connection) -> Result<Vec<MigrationStatus>> {
        self.repository.ensure_table(conn).await?;
        let records = self.repository.get_ran(conn).await?;

        let mut out = Vec::new();
        for migration in self.discovered() {
            let record = records.iter().find(|r| r.name == migration.name());
            let checksum_valid = match record {
                Some(record) => {
                    let current = checksum(migration.as_ref())?;
                    let valid = current == record.checksum;
                    if !valid {
                        tracing::warn!(
                            target: "quarry::migrate",
                            migration = migration.name(),
                            "checksum drift detected"
                        );
                    }
                    Some(valid)
                }
                None => None,
            };
            out.push(MigrationStatus {
                name: migration.name().to_string(),
                description: migration.description().to_string(),
                applied: record.is_some(),
                batch: record.map(|r| r.batch),
                checksum_valid,
            });
        }
        Ok(out)
    }

    /// Execute one migration's schema program, transactionally unless
    /// the unit opts out.
    async fn execute(
        &self,
        conn: &mut Connection,
        migration: &Arc<dyn Migration>,
        schema: &Schema,
    ) -> Result<()> {
        if !migration.within_transaction() {
            return SchemaBuilder::new(conn).execute(schema).await;
        }
        conn.begin_transaction().await?;
        let result = SchemaBuilder::new(conn).execute(schema).await;
        match result {
            Ok(()) => conn.commit().await,
            Err(error) => {
                conn.rollback().await?;
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for Migrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("migrations", &self.migrations.len())
            .field("repository", &self.repository)
            .finish()
    }
}

/// Convenience check that every dependency of every registered unit is
/// either registered or already applied.
pub fn verify_dependencies(
    migrations: &[Arc<dyn Migration>],
    applied: &HashSet<String>,
) -> Result<()> {
    let known: HashSet<&str> = migrations.iter().map(|m| m.name()).collect();
    for migration in migrations {
        for dependency in migration.depends_on() {
            if !known.contains(dependency.as_str()) && !applied.contains(&dependency) {
                return Err(Error::migration(format!(
                    "'{}' depends on unknown migration '{dependency}'",
                    migration.name()
                )));
            }
        }
    }
    Ok(())
}
