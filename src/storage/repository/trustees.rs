// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trustee repository.
//!
//! Trustees (executors) are appointed by exactly one grantor and hold their
//! own login credentials. Usernames are unique among trustees; they may
//! coincide with a grantor username since the two are looked up separately.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::super::database::{
    child_key, ensure_grantor, read_row, rows_for_parent, write_row, TRUSTEES,
    TRUSTEES_BY_GRANTOR, TRUSTEE_USERNAMES, USERS,
};
use super::super::{EstateDatabase, OwnedResource, StorageError, StorageResult};
use super::{patch, patch_optional};
use crate::models::{TrusteeRelation, UpdateTrusteeRequest};

/// Trustee row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredTrustee {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub relation: TrusteeRelation,
    pub note: Option<String>,
    /// Grantor who appointed this trustee.
    pub added_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OwnedResource for StoredTrustee {
    fn owner_id(&self) -> Uuid {
        self.added_by
    }
}

/// Repository for trustee operations.
pub struct TrusteeRepository<'a> {
    db: &'a EstateDatabase,
}

impl<'a> TrusteeRepository<'a> {
    pub fn new(db: &'a EstateDatabase) -> Self {
        Self { db }
    }

    /// Insert a trustee under an existing grantor.
    pub fn create(&self, trustee: &StoredTrustee) -> StorageResult<()> {
        let key = trustee.id.to_string();
        let grantor_key = trustee.added_by.to_string();

        let write_txn = self.db.begin_write()?;
        {
            ensure_grantor(&write_txn.open_table(USERS)?, trustee.added_by)?;

            let mut trustees = write_txn.open_table(TRUSTEES)?;
            let mut usernames = write_txn.open_table(TRUSTEE_USERNAMES)?;
            let mut by_grantor = write_txn.open_table(TRUSTEES_BY_GRANTOR)?;

            if usernames.get(trustee.username.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "Trustee username {}",
                    trustee.username
                )));
            }

            write_row(&mut trustees, &key, trustee)?;
            usernames.insert(trustee.username.as_str(), key.as_str())?;
            by_grantor.insert(child_key(&grantor_key, &key).as_str(), key.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a trustee by id regardless of grantor (principal resolution).
    pub fn find(&self, trustee_id: Uuid) -> StorageResult<Option<StoredTrustee>> {
        let read_txn = self.db.begin_read()?;
        let trustees = read_txn.open_table(TRUSTEES)?;
        read_row(&trustees, &trustee_id.to_string())
    }

    /// Look up a trustee by login name.
    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<StoredTrustee>> {
        let read_txn = self.db.begin_read()?;
        let usernames = read_txn.open_table(TRUSTEE_USERNAMES)?;
        let Some(id) = usernames.get(username)?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };
        let trustees = read_txn.open_table(TRUSTEES)?;
        read_row(&trustees, &id)
    }

    /// Get a trustee appointed by `grantor_id`.
    pub fn get(&self, grantor_id: Uuid, trustee_id: Uuid) -> StorageResult<StoredTrustee> {
        match self.find(trustee_id)? {
            Some(trustee) if trustee.added_by == grantor_id => Ok(trustee),
            _ => Err(StorageError::NotFound(format!("Trustee {trustee_id}"))),
        }
    }

    /// List every trustee appointed by a grantor, oldest first.
    pub fn list_by_grantor(&self, grantor_id: Uuid) -> StorageResult<Vec<StoredTrustee>> {
        let read_txn = self.db.begin_read()?;
        let mut trustees: Vec<StoredTrustee> = rows_for_parent(
            &read_txn.open_table(TRUSTEES_BY_GRANTOR)?,
            &read_txn.open_table(TRUSTEES)?,
            &grantor_id.to_string(),
        )?;
        trustees.sort_by_key(|t| t.created_at);
        Ok(trustees)
    }

    pub fn update(
        &self,
        grantor_id: Uuid,
        trustee_id: Uuid,
        changes: &UpdateTrusteeRequest,
    ) -> StorageResult<StoredTrustee> {
        let key = trustee_id.to_string();

        let write_txn = self.db.begin_write()?;
        let trustee = {
            let mut trustees = write_txn.open_table(TRUSTEES)?;
            let mut trustee = match read_row::<_, StoredTrustee>(&trustees, &key)? {
                Some(trustee) if trustee.added_by == grantor_id => trustee,
                _ => return Err(StorageError::NotFound(format!("Trustee {trustee_id}"))),
            };

            patch(&mut trustee.first_name, &changes.first_name);
            patch(&mut trustee.middle_name, &changes.middle_name);
            patch(&mut trustee.last_name, &changes.last_name);
            patch(&mut trustee.relation, &changes.relation);
            patch_optional(&mut trustee.note, &changes.note);
            trustee.updated_at = Some(Utc::now());

            write_row(&mut trustees, &key, &trustee)?;
            trustee
        };
        write_txn.commit()?;
        Ok(trustee)
    }

    pub fn delete(&self, grantor_id: Uuid, trustee_id: Uuid) -> StorageResult<()> {
        let key = trustee_id.to_string();

        let write_txn = self.db.begin_write()?;
        {
            let mut trustees = write_txn.open_table(TRUSTEES)?;
            let mut usernames = write_txn.open_table(TRUSTEE_USERNAMES)?;
            let mut by_grantor = write_txn.open_table(TRUSTEES_BY_GRANTOR)?;

            let trustee = match read_row::<_, StoredTrustee>(&trustees, &key)? {
                Some(trustee) if trustee.added_by == grantor_id => trustee,
                _ => return Err(StorageError::NotFound(format!("Trustee {trustee_id}"))),
            };

            trustees.remove(key.as_str())?;
            usernames.remove(trustee.username.as_str())?;
            by_grantor.remove(child_key(&grantor_id.to_string(), &key).as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
