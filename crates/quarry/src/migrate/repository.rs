//! Migration tracking table access.

use crate::connection::Connection;
use crate::error::Result;
use crate::query::QueryBuilder;
use crate::row::Row;
use crate::schema::SchemaBuilder;
use crate::value::Value;

/// One applied-migration row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
    pub id: i64,
    pub name: String,
    pub checksum: String,
    pub batch: i64,
}

impl MigrationRecord {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_int("id")?,
            name: row.try_str("migration")?.to_string(),
            checksum: row.try_str("checksum")?.to_string(),
            batch: row.try_int("batch")?,
        })
    }
}

/// Persists execution history in a tracking table:
/// `id, migration (unique), checksum (64 hex), batch, executed_at`.
#[derive(Debug, Clone)]
pub struct MigrationRepository {
    table: String,
}

impl MigrationRepository {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// The tracking table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the tracking table when absent.
    pub async fn ensure_table(&self, conn: &mut Connection) -> Result<()> {
        let mut builder = SchemaBuilder::new(conn);
        if builder.has_table(&self.table).await? {
            return Ok(());
        }
        builder
            .create(&self.table, |t| {
                t.id();
                t.string("migration").unique();
                t.char("checksum", 64);
                t.integer("batch");
                t.timestamp("executed_at").use_current();
            })
            .await
    }

    /// All applied migrations, in application order.
    pub async fn get_ran(&self, conn: &mut Connection) -> Result<Vec<MigrationRecord>> {
        let rows = QueryBuilder::new(&self.table)
            .select(&["id", "migration", "checksum", "batch"])
            .order_by("id")
            .get(conn)
            .await?;
        rows.iter().map(MigrationRecord::from_row).collect()
    }

    /// Record one applied migration.
    pub async fn log(
        &self,
        conn: &mut Connection,
        name: &str,
        checksum: &str,
        batch: i64,
    ) -> Result<()> {
        QueryBuilder::new(&self.table)
            .insert(
                conn,
                vec![vec![
                    ("migration".to_string(), Value::Str(name.to_string())),
                    ("checksum".to_string(), Value::Str(checksum.to_string())),
                    ("batch".to_string(), Value::Int(batch)),
                ]],
            )
            .await
            .map(|_| ())
    }

    /// Remove the record for one migration.
    pub async fn delete(&self, conn: &mut Connection, name: &str) -> Result<()> {
        QueryBuilder::new(&self.table)
            .and_eq("migration", name)
            .delete(conn)
            .await
            .map(|_| ())
    }

    /// The highest batch number, or 0 when nothing is applied.
    pub async fn max_batch(&self, conn: &mut Connection) -> Result<i64> {
        let records = self.get_ran(conn).await?;
        Ok(records.iter().map(|r| r.batch).max().unwrap_or(0))
    }
}
