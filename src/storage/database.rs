// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded estate database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: grantor id → serialized StoredGrantor
//! - `user_usernames` / `user_emails` / `user_phone_numbers`: unique value → grantor id
//! - `trustees`: trustee id → serialized StoredTrustee
//! - `trustee_usernames`: username → trustee id
//! - `beneficiaries`: beneficiary id → serialized StoredBeneficiary
//! - `assets` / `monetaries`: id → serialized row
//! - `*_by_grantor`, `*_by_beneficiary`: composite key (parent|child) → child id
//!
//! The composite index tables stand in for foreign keys. Every mutation that
//! touches a parent updates its children in the same write transaction, so
//! cascades either happen completely or not at all.

use std::path::Path;

use redb::{
    Database, ReadOnlyTable, ReadTransaction, ReadableDatabase, ReadableTable,
    ReadableTableMetadata, Table, TableDefinition, WriteTransaction,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use super::StoragePaths;

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) type RowTable = TableDefinition<'static, &'static str, &'static [u8]>;
pub(crate) type IndexTable = TableDefinition<'static, &'static str, &'static str>;

pub(crate) const USERS: RowTable = TableDefinition::new("users");
pub(crate) const USER_USERNAMES: IndexTable = TableDefinition::new("user_usernames");
pub(crate) const USER_EMAILS: IndexTable = TableDefinition::new("user_emails");
pub(crate) const USER_PHONE_NUMBERS: IndexTable = TableDefinition::new("user_phone_numbers");

pub(crate) const TRUSTEES: RowTable = TableDefinition::new("trustees");
pub(crate) const TRUSTEE_USERNAMES: IndexTable = TableDefinition::new("trustee_usernames");
pub(crate) const TRUSTEES_BY_GRANTOR: IndexTable = TableDefinition::new("trustees_by_grantor");

pub(crate) const BENEFICIARIES: RowTable = TableDefinition::new("beneficiaries");
pub(crate) const BENEFICIARIES_BY_GRANTOR: IndexTable =
    TableDefinition::new("beneficiaries_by_grantor");

pub(crate) const ASSETS: RowTable = TableDefinition::new("assets");
pub(crate) const ASSETS_BY_GRANTOR: IndexTable = TableDefinition::new("assets_by_grantor");
pub(crate) const ASSETS_BY_BENEFICIARY: IndexTable = TableDefinition::new("assets_by_beneficiary");

pub(crate) const MONETARIES: RowTable = TableDefinition::new("monetaries");
pub(crate) const MONETARIES_BY_GRANTOR: IndexTable = TableDefinition::new("monetaries_by_grantor");
pub(crate) const MONETARIES_BY_BENEFICIARY: IndexTable =
    TableDefinition::new("monetaries_by_beneficiary");

const ROW_TABLES: [RowTable; 5] = [USERS, TRUSTEES, BENEFICIARIES, ASSETS, MONETARIES];
const INDEX_TABLES: [IndexTable; 10] = [
    USER_USERNAMES,
    USER_EMAILS,
    USER_PHONE_NUMBERS,
    TRUSTEE_USERNAMES,
    TRUSTEES_BY_GRANTOR,
    BENEFICIARIES_BY_GRANTOR,
    ASSETS_BY_GRANTOR,
    ASSETS_BY_BENEFICIARY,
    MONETARIES_BY_GRANTOR,
    MONETARIES_BY_BENEFICIARY,
];

/// Row and index tables of one willed item kind (assets or monetaries).
#[derive(Clone, Copy)]
pub(crate) struct WilledTables {
    pub rows: RowTable,
    pub by_grantor: IndexTable,
    pub by_beneficiary: IndexTable,
}

pub(crate) const ASSET_TABLES: WilledTables = WilledTables {
    rows: ASSETS,
    by_grantor: ASSETS_BY_GRANTOR,
    by_beneficiary: ASSETS_BY_BENEFICIARY,
};

pub(crate) const MONETARY_TABLES: WilledTables = WilledTables {
    rows: MONETARIES,
    by_grantor: MONETARIES_BY_GRANTOR,
    by_beneficiary: MONETARIES_BY_BENEFICIARY,
};

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Row absent, or present but owned by someone else.
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Foreign-key violation: the referenced parent row does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("invalid id: {0}")]
    InvalidId(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Key & Row Helpers
// =============================================================================

/// Parse a path-supplied identifier.
pub fn parse_id(raw: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| StorageError::InvalidId(raw.to_string()))
}

/// Composite key for parent → child index tables.
pub(crate) fn child_key(parent: &str, child: &str) -> String {
    format!("{parent}|{child}")
}

/// All child ids recorded under `parent` in an index table.
///
/// `}` is the byte right after `|`, so the range covers exactly the keys
/// prefixed with `parent|`.
pub(crate) fn child_ids<T>(index: &T, parent: &str) -> StorageResult<Vec<String>>
where
    T: ReadableTable<&'static str, &'static str>,
{
    let start = format!("{parent}|");
    let end = format!("{parent}}}");

    let mut ids = Vec::new();
    for entry in index.range(start.as_str()..end.as_str())? {
        let (_, child) = entry?;
        ids.push(child.value().to_string());
    }
    Ok(ids)
}

/// Read and deserialize a single row.
pub(crate) fn read_row<T, R>(table: &T, id: &str) -> StorageResult<Option<R>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
    R: DeserializeOwned,
{
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

/// Serialize and insert (or replace) a single row.
pub(crate) fn write_row<R: Serialize>(
    table: &mut Table<'_, &'static str, &'static [u8]>,
    id: &str,
    row: &R,
) -> StorageResult<()> {
    let json = serde_json::to_vec(row)?;
    table.insert(id, json.as_slice())?;
    Ok(())
}

/// Load every child row listed under `parent`, skipping dangling index entries.
pub(crate) fn rows_for_parent<I, T, R>(index: &I, rows: &T, parent: &str) -> StorageResult<Vec<R>>
where
    I: ReadableTable<&'static str, &'static str>,
    T: ReadableTable<&'static str, &'static [u8]>,
    R: DeserializeOwned,
{
    let mut out = Vec::new();
    for id in child_ids(index, parent)? {
        if let Some(row) = read_row(rows, &id)? {
            out.push(row);
        }
    }
    Ok(out)
}

/// The two foreign keys every asset and monetary row carries.
#[derive(Debug, Deserialize)]
struct WillLink {
    owner_id: Uuid,
    will_to: Uuid,
}

/// Delete every willed row of one kind that points at `beneficiary_id`.
fn remove_willed_for_beneficiary(
    txn: &WriteTransaction,
    tables: WilledTables,
    beneficiary_id: &str,
) -> StorageResult<usize> {
    let mut rows = txn.open_table(tables.rows)?;
    let mut by_grantor = txn.open_table(tables.by_grantor)?;
    let mut by_beneficiary = txn.open_table(tables.by_beneficiary)?;

    let ids = child_ids(&by_beneficiary, beneficiary_id)?;
    for id in &ids {
        if let Some(link) = read_row::<_, WillLink>(&rows, id)? {
            by_grantor.remove(child_key(&link.owner_id.to_string(), id).as_str())?;
        }
        rows.remove(id.as_str())?;
        by_beneficiary.remove(child_key(beneficiary_id, id).as_str())?;
    }
    Ok(ids.len())
}

/// Delete every willed row of one kind owned by `grantor_id`.
fn remove_willed_for_grantor(
    txn: &WriteTransaction,
    tables: WilledTables,
    grantor_id: &str,
) -> StorageResult<usize> {
    let mut rows = txn.open_table(tables.rows)?;
    let mut by_grantor = txn.open_table(tables.by_grantor)?;
    let mut by_beneficiary = txn.open_table(tables.by_beneficiary)?;

    let ids = child_ids(&by_grantor, grantor_id)?;
    for id in &ids {
        if let Some(link) = read_row::<_, WillLink>(&rows, id)? {
            by_beneficiary.remove(child_key(&link.will_to.to_string(), id).as_str())?;
        }
        rows.remove(id.as_str())?;
        by_grantor.remove(child_key(grantor_id, id).as_str())?;
    }
    Ok(ids.len())
}

/// Cascade a beneficiary deletion to the assets and monetaries willed to it.
///
/// The caller must not hold any of the willed tables open.
pub(crate) fn cascade_beneficiary(txn: &WriteTransaction, beneficiary_id: &str) -> StorageResult<usize> {
    Ok(remove_willed_for_beneficiary(txn, ASSET_TABLES, beneficiary_id)?
        + remove_willed_for_beneficiary(txn, MONETARY_TABLES, beneficiary_id)?)
}

/// Cascade a grantor deletion to every dependent table.
///
/// The caller must not hold any dependent table open.
pub(crate) fn cascade_grantor(txn: &WriteTransaction, grantor_id: &str) -> StorageResult<usize> {
    let mut removed = remove_willed_for_grantor(txn, ASSET_TABLES, grantor_id)?
        + remove_willed_for_grantor(txn, MONETARY_TABLES, grantor_id)?;

    {
        let mut rows = txn.open_table(BENEFICIARIES)?;
        let mut index = txn.open_table(BENEFICIARIES_BY_GRANTOR)?;
        let ids = child_ids(&index, grantor_id)?;
        for id in &ids {
            rows.remove(id.as_str())?;
            index.remove(child_key(grantor_id, id).as_str())?;
        }
        removed += ids.len();
    }

    {
        #[derive(Deserialize)]
        struct TrusteeLogin {
            username: String,
        }

        let mut rows = txn.open_table(TRUSTEES)?;
        let mut index = txn.open_table(TRUSTEES_BY_GRANTOR)?;
        let mut usernames = txn.open_table(TRUSTEE_USERNAMES)?;
        let ids = child_ids(&index, grantor_id)?;
        for id in &ids {
            if let Some(login) = read_row::<_, TrusteeLogin>(&rows, id)? {
                usernames.remove(login.username.as_str())?;
            }
            rows.remove(id.as_str())?;
            index.remove(child_key(grantor_id, id).as_str())?;
        }
        removed += ids.len();
    }

    Ok(removed)
}

/// Confirm a beneficiary exists and belongs to `grantor_id`.
pub(crate) fn ensure_beneficiary_of<T>(
    beneficiaries: &T,
    grantor_id: Uuid,
    beneficiary_id: Uuid,
) -> StorageResult<()>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    #[derive(Deserialize)]
    struct AddedBy {
        added_by: Uuid,
    }

    match read_row::<_, AddedBy>(beneficiaries, &beneficiary_id.to_string())? {
        Some(row) if row.added_by == grantor_id => Ok(()),
        _ => Err(StorageError::MissingReference(format!(
            "Beneficiary {beneficiary_id}"
        ))),
    }
}

/// Confirm the owning grantor row exists.
pub(crate) fn ensure_grantor<T>(users: &T, grantor_id: Uuid) -> StorageResult<()>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    if users.get(grantor_id.to_string().as_str())?.is_some() {
        Ok(())
    } else {
        Err(StorageError::MissingReference(format!("Grantor {grantor_id}")))
    }
}

// =============================================================================
// EstateDatabase
// =============================================================================

/// Embedded ACID database holding every estate record.
///
/// One handle is opened at startup and shared through `AppState`. Each
/// repository call runs inside its own read or write transaction, which is
/// released when it goes out of scope whether or not it committed.
pub struct EstateDatabase {
    db: Database,
}

impl EstateDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            for table in ROW_TABLES {
                write_txn.open_table(table)?;
            }
            for table in INDEX_TABLES {
                write_txn.open_table(table)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Open the database file under the configured data root.
    pub fn open_in(paths: &StoragePaths) -> StorageResult<Self> {
        Self::open(&paths.database())
    }

    pub(crate) fn begin_read(&self) -> StorageResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    pub(crate) fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Verify the database answers a read transaction.
    pub fn health_check(&self) -> StorageResult<()> {
        let read_txn = self.begin_read()?;
        let users: ReadOnlyTable<&str, &[u8]> = read_txn.open_table(USERS)?;
        users.len()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (EstateDatabase, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = EstateDatabase::open_in(&StoragePaths::new(dir.path())).expect("open db");
        (db, dir)
    }

    #[test]
    fn open_creates_tables_and_passes_health_check() {
        let (db, _dir) = test_db();
        db.health_check().expect("health check should pass");
    }

    #[test]
    fn child_ids_only_match_exact_parent_prefix() {
        let (db, _dir) = test_db();
        let txn = db.begin_write().unwrap();
        {
            let mut index = txn.open_table(BENEFICIARIES_BY_GRANTOR).unwrap();
            index.insert(child_key("grantor-1", "b1").as_str(), "b1").unwrap();
            index.insert(child_key("grantor-1", "b2").as_str(), "b2").unwrap();
            index.insert(child_key("grantor-10", "b3").as_str(), "b3").unwrap();
            index.insert(child_key("grantor-2", "b4").as_str(), "b4").unwrap();
        }
        txn.commit().unwrap();

        let read = db.begin_read().unwrap();
        let index = read.open_table(BENEFICIARIES_BY_GRANTOR).unwrap();
        let mut ids = child_ids(&index, "grantor-1").unwrap();
        ids.sort();
        assert_eq!(ids, vec!["b1".to_string(), "b2".to_string()]);
        assert!(child_ids(&index, "grantor-3").unwrap().is_empty());
    }

    #[test]
    fn parse_id_rejects_malformed_values() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_id("not-a-uuid"), Err(StorageError::InvalidId(_))));
    }

    #[test]
    fn write_and_read_row() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Row {
            name: String,
        }

        let (db, _dir) = test_db();
        let txn = db.begin_write().unwrap();
        {
            let mut table = txn.open_table(USERS).unwrap();
            write_row(&mut table, "id-1", &Row { name: "Ebuka".into() }).unwrap();
        }
        txn.commit().unwrap();

        let read = db.begin_read().unwrap();
        let table = read.open_table(USERS).unwrap();
        let row: Option<Row> = read_row(&table, "id-1").unwrap();
        assert_eq!(row, Some(Row { name: "Ebuka".into() }));
        let missing: Option<Row> = read_row(&table, "id-2").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn uncommitted_write_is_discarded_on_drop() {
        let (db, _dir) = test_db();
        {
            let txn = db.begin_write().unwrap();
            {
                let mut table = txn.open_table(USER_USERNAMES).unwrap();
                table.insert("eBolton", "id").unwrap();
            }
            // dropped without commit
        }

        let read = db.begin_read().unwrap();
        let table = read.open_table(USER_USERNAMES).unwrap();
        assert!(table.get("eBolton").unwrap().is_none());
    }
}
