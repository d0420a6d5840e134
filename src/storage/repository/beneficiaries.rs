// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Beneficiary repository.
//!
//! Deleting a beneficiary also deletes every asset and monetary row willed
//! to it.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::super::database::{
    cascade_beneficiary, child_key, ensure_grantor, read_row, rows_for_parent, write_row,
    BENEFICIARIES, BENEFICIARIES_BY_GRANTOR, USERS,
};
use super::super::{EstateDatabase, OwnedResource, StorageError, StorageResult};
use super::patch;
use crate::models::{BeneficiaryRelation, UpdateBeneficiaryRequest};

/// Beneficiary row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredBeneficiary {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub relation: BeneficiaryRelation,
    /// Grantor who registered this beneficiary.
    pub added_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OwnedResource for StoredBeneficiary {
    fn owner_id(&self) -> Uuid {
        self.added_by
    }
}

/// Repository for beneficiary operations.
pub struct BeneficiaryRepository<'a> {
    db: &'a EstateDatabase,
}

impl<'a> BeneficiaryRepository<'a> {
    pub fn new(db: &'a EstateDatabase) -> Self {
        Self { db }
    }

    pub fn create(&self, beneficiary: &StoredBeneficiary) -> StorageResult<()> {
        let key = beneficiary.id.to_string();

        let write_txn = self.db.begin_write()?;
        {
            ensure_grantor(&write_txn.open_table(USERS)?, beneficiary.added_by)?;

            let mut beneficiaries = write_txn.open_table(BENEFICIARIES)?;
            let mut by_grantor = write_txn.open_table(BENEFICIARIES_BY_GRANTOR)?;

            if beneficiaries.get(key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Beneficiary {key}")));
            }

            write_row(&mut beneficiaries, &key, beneficiary)?;
            by_grantor.insert(
                child_key(&beneficiary.added_by.to_string(), &key).as_str(),
                key.as_str(),
            )?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a beneficiary registered by `grantor_id`.
    pub fn get(&self, grantor_id: Uuid, beneficiary_id: Uuid) -> StorageResult<StoredBeneficiary> {
        let read_txn = self.db.begin_read()?;
        let beneficiaries = read_txn.open_table(BENEFICIARIES)?;
        match read_row::<_, StoredBeneficiary>(&beneficiaries, &beneficiary_id.to_string())? {
            Some(beneficiary) if beneficiary.added_by == grantor_id => Ok(beneficiary),
            _ => Err(StorageError::NotFound(format!(
                "Beneficiary {beneficiary_id}"
            ))),
        }
    }

    /// Get a beneficiary regardless of grantor.
    pub fn find(&self, beneficiary_id: Uuid) -> StorageResult<Option<StoredBeneficiary>> {
        let read_txn = self.db.begin_read()?;
        let beneficiaries = read_txn.open_table(BENEFICIARIES)?;
        read_row(&beneficiaries, &beneficiary_id.to_string())
    }

    /// List every beneficiary registered by a grantor, oldest first.
    pub fn list_by_grantor(&self, grantor_id: Uuid) -> StorageResult<Vec<StoredBeneficiary>> {
        let read_txn = self.db.begin_read()?;
        let mut beneficiaries: Vec<StoredBeneficiary> = rows_for_parent(
            &read_txn.open_table(BENEFICIARIES_BY_GRANTOR)?,
            &read_txn.open_table(BENEFICIARIES)?,
            &grantor_id.to_string(),
        )?;
        beneficiaries.sort_by_key(|b| b.created_at);
        Ok(beneficiaries)
    }

    pub fn update(
        &self,
        grantor_id: Uuid,
        beneficiary_id: Uuid,
        changes: &UpdateBeneficiaryRequest,
    ) -> StorageResult<StoredBeneficiary> {
        let key = beneficiary_id.to_string();

        let write_txn = self.db.begin_write()?;
        let beneficiary = {
            let mut beneficiaries = write_txn.open_table(BENEFICIARIES)?;
            let mut beneficiary = match read_row::<_, StoredBeneficiary>(&beneficiaries, &key)? {
                Some(beneficiary) if beneficiary.added_by == grantor_id => beneficiary,
                _ => {
                    return Err(StorageError::NotFound(format!(
                        "Beneficiary {beneficiary_id}"
                    )))
                }
            };

            patch(&mut beneficiary.first_name, &changes.first_name);
            patch(&mut beneficiary.middle_name, &changes.middle_name);
            patch(&mut beneficiary.last_name, &changes.last_name);
            patch(&mut beneficiary.relation, &changes.relation);
            beneficiary.updated_at = Some(Utc::now());

            write_row(&mut beneficiaries, &key, &beneficiary)?;
            beneficiary
        };
        write_txn.commit()?;
        Ok(beneficiary)
    }

    /// Delete a beneficiary and everything willed to it.
    pub fn delete(&self, grantor_id: Uuid, beneficiary_id: Uuid) -> StorageResult<()> {
        let key = beneficiary_id.to_string();

        let write_txn = self.db.begin_write()?;
        {
            let mut beneficiaries = write_txn.open_table(BENEFICIARIES)?;
            let mut by_grantor = write_txn.open_table(BENEFICIARIES_BY_GRANTOR)?;

            match read_row::<_, StoredBeneficiary>(&beneficiaries, &key)? {
                Some(beneficiary) if beneficiary.added_by == grantor_id => {}
                _ => {
                    return Err(StorageError::NotFound(format!(
                        "Beneficiary {beneficiary_id}"
                    )))
                }
            }

            beneficiaries.remove(key.as_str())?;
            by_grantor.remove(child_key(&grantor_id.to_string(), &key).as_str())?;
        }
        let removed = cascade_beneficiary(&write_txn, &key)?;
        write_txn.commit()?;

        tracing::debug!(
            beneficiary_id = %beneficiary_id,
            removed,
            "Beneficiary deleted with willed items"
        );
        Ok(())
    }
}
