//! Embedded agent table backed by redb.
//!
//! Reference [`AgentStore`] adapter: rows are stored as JSON bytes keyed by
//! their integer id, ids are allocated monotonically, and queries scan in
//! key order before filtering and sorting in memory.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde_json::Value;
use std::sync::Arc;

use crate::schema;
use crate::store::{AgentStore, Filter, Order, RawRow};

const AGENTS: TableDefinition<u64, &[u8]> = TableDefinition::new(schema::TABLE_NAME);

/// Embedded agent table with a JSON-row API.
#[derive(Debug, Clone)]
pub struct AgentTable {
    db: Arc<Database>,
}

impl AgentTable {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(AGENTS)?;
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl AgentStore for AgentTable {
    fn query(&self, filter: &Filter, order: &Order) -> Result<Vec<RawRow>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AGENTS)?;

        let mut rows = Vec::new();
        for item in table.iter()? {
            let (_, value) = item?;
            let row: RawRow = serde_json::from_slice(value.value())?;
            if filter.matches(&row) {
                rows.push(row);
            }
        }

        if !order.is_empty() {
            rows.sort_by(|a, b| order.compare(a, b));
        }

        Ok(rows)
    }

    fn insert(&self, row: &RawRow) -> Result<i64> {
        let write_txn = self.db.begin_write()?;
        let id = {
            let mut table = write_txn.open_table(AGENTS)?;
            let id = table
                .last()?
                .map(|(key, _)| key.value())
                .unwrap_or(0)
                + 1;

            let mut stored = row.clone();
            stored.insert(schema::ID.to_string(), Value::from(id));
            table.insert(id, serde_json::to_vec(&stored)?.as_slice())?;
            id
        };
        write_txn.commit()?;

        Ok(i64::try_from(id)?)
    }

    fn update(&self, id: i64, row: &RawRow) -> Result<bool> {
        let Ok(key) = u64::try_from(id) else {
            return Ok(false);
        };

        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(AGENTS)?;
            if table.get(key)?.is_none() {
                false
            } else {
                let mut stored = row.clone();
                stored.insert(schema::ID.to_string(), Value::from(key));
                table.insert(key, serde_json::to_vec(&stored)?.as_slice())?;
                true
            }
        };
        write_txn.commit()?;

        Ok(updated)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let Ok(key) = u64::try_from(id) else {
            return Ok(false);
        };

        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(AGENTS)?;
            table.remove(key)?.is_some()
        };
        write_txn.commit()?;

        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Direction;
    use serde_json::json;
    use tempfile::tempdir;

    fn setup_test_table() -> (AgentTable, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        let table = AgentTable::new(db).unwrap();
        (table, temp_dir)
    }

    fn sample_row(name: &str, sort: i64) -> RawRow {
        let mut row = RawRow::new();
        row.insert(schema::NAME.to_string(), json!(name));
        row.insert(schema::SORT.to_string(), json!(sort));
        row
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let (table, _temp_dir) = setup_test_table();

        let first = table.insert(&sample_row("JobA", 100)).unwrap();
        let second = table.insert(&sample_row("JobB", 200)).unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn test_query_returns_stored_rows_with_ids() {
        let (table, _temp_dir) = setup_test_table();

        let id = table.insert(&sample_row("JobA", 100)).unwrap();

        let rows = table.query(&Filter::new(), &Order::new()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(schema::ID), Some(&json!(id)));
        assert_eq!(rows[0].get(schema::NAME), Some(&json!("JobA")));
    }

    #[test]
    fn test_query_filters_rows() {
        let (table, _temp_dir) = setup_test_table();

        table.insert(&sample_row("JobA\n//@nightly", 100)).unwrap();
        table.insert(&sample_row("JobB", 200)).unwrap();

        let rows = table
            .query(
                &Filter::new().contains(schema::NAME, "//@nightly"),
                &Order::new(),
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(schema::NAME), Some(&json!("JobA\n//@nightly")));
    }

    #[test]
    fn test_query_orders_rows() {
        let (table, _temp_dir) = setup_test_table();

        table.insert(&sample_row("JobA", 500)).unwrap();
        table.insert(&sample_row("JobB", 100)).unwrap();

        let rows = table
            .query(
                &Filter::new(),
                &Order::new().by(schema::SORT, Direction::Asc),
            )
            .unwrap();
        assert_eq!(rows[0].get(schema::NAME), Some(&json!("JobB")));
        assert_eq!(rows[1].get(schema::NAME), Some(&json!("JobA")));
    }

    #[test]
    fn test_update_existing_row() {
        let (table, _temp_dir) = setup_test_table();

        let id = table.insert(&sample_row("JobA", 100)).unwrap();
        let updated = table.update(id, &sample_row("JobA", 900)).unwrap();
        assert!(updated);

        let rows = table.query(&Filter::new(), &Order::new()).unwrap();
        assert_eq!(rows[0].get(schema::SORT), Some(&json!(900)));
    }

    #[test]
    fn test_update_unknown_id_reports_failure() {
        let (table, _temp_dir) = setup_test_table();
        assert!(!table.update(42, &sample_row("JobA", 100)).unwrap());
    }

    #[test]
    fn test_delete() {
        let (table, _temp_dir) = setup_test_table();

        let id = table.insert(&sample_row("JobA", 100)).unwrap();
        assert!(table.delete(id).unwrap());
        assert!(!table.delete(id).unwrap());

        let rows = table.query(&Filter::new(), &Order::new()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_insert_rejects_id_beyond_signed_range() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        let table = AgentTable::new(db.clone()).unwrap();

        // Seed a key at the top of the range directly in the raw table so
        // the next allocation would not fit in an i64.
        let write_txn = db.begin_write().unwrap();
        {
            let mut raw = write_txn.open_table(AGENTS).unwrap();
            let bytes = serde_json::to_vec(&sample_row("JobA", 100)).unwrap();
            raw.insert(u64::MAX - 1, bytes.as_slice()).unwrap();
        }
        write_txn.commit().unwrap();

        assert!(table.insert(&sample_row("JobB", 200)).is_err());
    }

    #[test]
    fn test_id_allocation_skips_reused_ids_after_delete() {
        let (table, _temp_dir) = setup_test_table();

        table.insert(&sample_row("JobA", 100)).unwrap();
        let second = table.insert(&sample_row("JobB", 200)).unwrap();
        table.delete(second).unwrap();

        // Allocation is last-key + 1, so removing the tail reuses its id.
        let third = table.insert(&sample_row("JobC", 300)).unwrap();
        assert_eq!(third, 2);
    }
}
