//! Schema migrations: units, dependency ordering, and checksums.
//!
//! A migration is a named unit whose `up`/`down` record schema programs.
//! The migrator orders pending units lexicographically, then reorders by
//! declared dependencies (depth-first, with cycle detection), runs each
//! inside its own transaction unless it opts out, and tracks execution
//! history with content checksums.

mod repository;
mod runner;

#[cfg(test)]
mod tests;

pub use repository::{MigrationRecord, MigrationRepository};
pub use runner::{
    verify_dependencies, MigrationFailure, MigrationStatus, Migrator, RollbackReport, RunReport,
};

use std::collections::HashSet;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::schema::grammar::MySqlSchemaGrammar;
use crate::schema::Schema;

/// One migration unit.
pub trait Migration: Send + Sync {
    /// Unique identity; pending units run in lexicographic name order
    /// before dependency reordering.
    fn name(&self) -> &str;

    /// Record the forward schema program.
    fn up(&self, schema: &mut Schema);

    /// Record the inverse schema program.
    fn down(&self, schema: &mut Schema);

    /// Identities that must be applied before this unit.
    fn depends_on(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether to wrap execution in a transaction.
    fn within_transaction(&self) -> bool {
        true
    }

    /// Human-readable summary.
    fn description(&self) -> &str {
        ""
    }
}

impl std::fmt::Debug for dyn Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Canonical text of a migration: its identity plus the exact statement
/// sequences `up` and `down` produce against the reference grammar.
/// Byte-stable across runs of unchanged code.
pub fn canonical_source(migration: &dyn Migration) -> Result<String> {
    let grammar = MySqlSchemaGrammar::new();
    let mut up = Schema::new();
    migration.up(&mut up);
    let mut down = Schema::new();
    migration.down(&mut down);

    let mut out = String::new();
    out.push_str(migration.name());
    out.push('\n');
    out.push_str(migration.description());
    out.push_str("\n-- up\n");
    for statement in up.compile(&grammar)? {
        out.push_str(&statement);
        out.push('\n');
    }
    out.push_str("-- down\n");
    for statement in down.compile(&grammar)? {
        out.push_str(&statement);
        out.push('\n');
    }
    Ok(out)
}

/// SHA-256 checksum of a migration's canonical text, as 64 hex chars.
pub fn checksum(migration: &dyn Migration) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(canonical_source(migration)?.as_bytes());
    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Reorder pending migrations so every declared dependency precedes its
/// dependent. Dependencies not in the pending set are assumed already
/// applied. A cycle is fatal and reported before anything executes.
pub fn resolve_order(
    pending: &[Arc<dyn Migration>],
) -> Result<Vec<Arc<dyn Migration>>> {
    let mut ordered: Vec<Arc<dyn Migration>> = Vec::with_capacity(pending.len());
    let mut resolved: HashSet<String> = HashSet::new();
    let mut resolving: HashSet<String> = HashSet::new();

    fn visit(
        name: &str,
        pending: &[Arc<dyn Migration>],
        resolved: &mut HashSet<String>,
        resolving: &mut HashSet<String>,
        ordered: &mut Vec<Arc<dyn Migration>>,
    ) -> Result<()> {
        if resolved.contains(name) {
            return Ok(());
        }
        if resolving.contains(name) {
            return Err(Error::CircularDependency(name.to_string()));
        }
        let Some(migration) = pending.iter().find(|m| m.name() == name) else {
            // Not pending: either already applied or unknown; the runner
            // surfaces genuinely missing units when it executes.
            return Ok(());
        };
        resolving.insert(name.to_string());
        for dependency in migration.depends_on() {
            visit(&dependency, pending, resolved, resolving, ordered)?;
        }
        resolving.remove(name);
        resolved.insert(name.to_string());
        ordered.push(Arc::clone(migration));
        Ok(())
    }

    for migration in pending {
        visit(
            migration.name(),
            pending,
            &mut resolved,
            &mut resolving,
            &mut ordered,
        )?;
    }
    Ok(ordered)
}
