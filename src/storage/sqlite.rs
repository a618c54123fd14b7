//! SQLite product store
//!
//! Writes are batched: saves accumulate inside an open transaction and a
//! commit is issued every `commit_every` writes. [`ProductStore::flush`]
//! commits whatever is pending; the pipeline calls it unconditionally at run
//! end, so a partial run never loses rows that were handed to the store.

use crate::record::ProductRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::{StorageError, StorageResult};
use rusqlite::{params, Connection};
use std::path::Path;

pub struct ProductStore {
    conn: Connection,
    commit_every: u32,
    pending: u32,
    in_tx: bool,
}

impl ProductStore {
    /// Opens or creates the database at the given path
    pub fn new(path: &Path, commit_every: u32) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL + NORMAL synchronous is much faster for many small transactions
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            commit_every: commit_every.max(1),
            pending: 0,
            in_tx: false,
        })
    }

    /// Creates an in-memory store (for testing)
    #[cfg(test)]
    pub fn new_in_memory(commit_every: u32) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            commit_every: commit_every.max(1),
            pending: 0,
            in_tx: false,
        })
    }

    /// Saves one record: idempotent product upsert plus snapshot append
    ///
    /// The product row uses insert-or-ignore semantics (first-seen wins);
    /// the snapshot is always appended. The write joins the current batch
    /// and is committed once the batch fills.
    pub fn save(&mut self, record: &ProductRecord) -> StorageResult<()> {
        if !self.in_tx {
            self.conn.execute_batch("BEGIN")?;
            self.in_tx = true;
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO products (product_id, title, category, product_url)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.product_id,
                record.title,
                record.category,
                record.product_url
            ],
        )?;

        self.conn.execute(
            "INSERT INTO price_snapshots (product_id, scraped_at, price, rating)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.product_id,
                record.scraped_at,
                record.price,
                record.rating
            ],
        )?;

        self.pending += 1;
        if self.pending >= self.commit_every {
            self.flush()?;
        }

        Ok(())
    }

    /// Commits any pending writes
    pub fn flush(&mut self) -> StorageResult<()> {
        if self.in_tx {
            self.conn.execute_batch("COMMIT")?;
            self.in_tx = false;
            self.pending = 0;
        }
        Ok(())
    }

    /// Flushes and closes the connection
    pub fn close(mut self) -> StorageResult<()> {
        self.flush()?;
        self.conn
            .close()
            .map_err(|(_, e)| StorageError::Sqlite(e))?;
        Ok(())
    }

    /// Counts rows in the products table
    pub fn count_products(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Counts rows in the price_snapshots table
    pub fn count_snapshots(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM price_snapshots", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Fetches the stored title for a product id (for tests and tooling)
    pub fn get_product_title(&self, product_id: &str) -> StorageResult<Option<String>> {
        use rusqlite::OptionalExtension;
        let title = self
            .conn
            .query_row(
                "SELECT title FROM products WHERE product_id = ?1",
                params![product_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(title)
    }
}
