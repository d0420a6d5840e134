// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Monetary asset repository (bank account holdings).

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::super::database::{
    child_key, ensure_beneficiary_of, ensure_grantor, read_row, rows_for_parent, write_row,
    BENEFICIARIES, MONETARIES, MONETARIES_BY_BENEFICIARY, MONETARIES_BY_GRANTOR, USERS,
};
use super::super::{EstateDatabase, OwnedResource, StorageError, StorageResult};
use super::{patch, patch_optional};
use crate::models::UpdateMonetaryRequest;

/// Monetary row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredMonetary {
    pub id: Uuid,
    pub acc_name: String,
    pub acc_number: String,
    /// Formatted amount, stored verbatim.
    pub amount: String,
    pub bank_name: String,
    pub document: Option<String>,
    pub note: Option<String>,
    pub owner_id: Uuid,
    pub will_to: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OwnedResource for StoredMonetary {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Repository for monetary assets.
pub struct MonetaryRepository<'a> {
    db: &'a EstateDatabase,
}

impl<'a> MonetaryRepository<'a> {
    pub fn new(db: &'a EstateDatabase) -> Self {
        Self { db }
    }

    pub fn create(&self, monetary: &StoredMonetary) -> StorageResult<()> {
        let key = monetary.id.to_string();

        let write_txn = self.db.begin_write()?;
        {
            ensure_grantor(&write_txn.open_table(USERS)?, monetary.owner_id)?;
            ensure_beneficiary_of(
                &write_txn.open_table(BENEFICIARIES)?,
                monetary.owner_id,
                monetary.will_to,
            )?;

            let mut monetaries = write_txn.open_table(MONETARIES)?;
            let mut by_grantor = write_txn.open_table(MONETARIES_BY_GRANTOR)?;
            let mut by_beneficiary = write_txn.open_table(MONETARIES_BY_BENEFICIARY)?;

            if monetaries.get(key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Monetary {key}")));
            }

            write_row(&mut monetaries, &key, monetary)?;
            by_grantor.insert(
                child_key(&monetary.owner_id.to_string(), &key).as_str(),
                key.as_str(),
            )?;
            by_beneficiary.insert(
                child_key(&monetary.will_to.to_string(), &key).as_str(),
                key.as_str(),
            )?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get(&self, grantor_id: Uuid, monetary_id: Uuid) -> StorageResult<StoredMonetary> {
        let read_txn = self.db.begin_read()?;
        let monetaries = read_txn.open_table(MONETARIES)?;
        match read_row::<_, StoredMonetary>(&monetaries, &monetary_id.to_string())? {
            Some(monetary) if monetary.owner_id == grantor_id => Ok(monetary),
            _ => Err(StorageError::NotFound(format!("Monetary {monetary_id}"))),
        }
    }

    pub fn list_by_grantor(&self, grantor_id: Uuid) -> StorageResult<Vec<StoredMonetary>> {
        let read_txn = self.db.begin_read()?;
        let mut monetaries: Vec<StoredMonetary> = rows_for_parent(
            &read_txn.open_table(MONETARIES_BY_GRANTOR)?,
            &read_txn.open_table(MONETARIES)?,
            &grantor_id.to_string(),
        )?;
        monetaries.sort_by_key(|m| m.created_at);
        Ok(monetaries)
    }

    pub fn list_by_beneficiary(
        &self,
        grantor_id: Uuid,
        beneficiary_id: Uuid,
    ) -> StorageResult<Vec<StoredMonetary>> {
        let read_txn = self.db.begin_read()?;
        let mut monetaries: Vec<StoredMonetary> = rows_for_parent(
            &read_txn.open_table(MONETARIES_BY_BENEFICIARY)?,
            &read_txn.open_table(MONETARIES)?,
            &beneficiary_id.to_string(),
        )?;
        monetaries.retain(|m| m.owner_id == grantor_id);
        monetaries.sort_by_key(|m| m.created_at);
        Ok(monetaries)
    }

    pub fn update(
        &self,
        grantor_id: Uuid,
        monetary_id: Uuid,
        changes: &UpdateMonetaryRequest,
        document: Option<String>,
    ) -> StorageResult<StoredMonetary> {
        let key = monetary_id.to_string();

        let write_txn = self.db.begin_write()?;
        let monetary = {
            let mut monetaries = write_txn.open_table(MONETARIES)?;
            let mut monetary = match read_row::<_, StoredMonetary>(&monetaries, &key)? {
                Some(monetary) if monetary.owner_id == grantor_id => monetary,
                _ => return Err(StorageError::NotFound(format!("Monetary {monetary_id}"))),
            };

            if let Some(will_to) = changes.will_to.filter(|b| *b != monetary.will_to) {
                ensure_beneficiary_of(&write_txn.open_table(BENEFICIARIES)?, grantor_id, will_to)?;

                let mut by_beneficiary = write_txn.open_table(MONETARIES_BY_BENEFICIARY)?;
                by_beneficiary.remove(child_key(&monetary.will_to.to_string(), &key).as_str())?;
                by_beneficiary.insert(child_key(&will_to.to_string(), &key).as_str(), key.as_str())?;
                monetary.will_to = will_to;
            }

            patch(&mut monetary.acc_name, &changes.acc_name);
            patch(&mut monetary.acc_number, &changes.acc_number);
            patch(&mut monetary.amount, &changes.amount);
            patch(&mut monetary.bank_name, &changes.bank_name);
            patch_optional(&mut monetary.note, &changes.note);
            if document.is_some() {
                monetary.document = document;
            }
            monetary.updated_at = Some(Utc::now());

            write_row(&mut monetaries, &key, &monetary)?;
            monetary
        };
        write_txn.commit()?;
        Ok(monetary)
    }

    pub fn delete(&self, grantor_id: Uuid, monetary_id: Uuid) -> StorageResult<()> {
        let key = monetary_id.to_string();

        let write_txn = self.db.begin_write()?;
        {
            let mut monetaries = write_txn.open_table(MONETARIES)?;
            let mut by_grantor = write_txn.open_table(MONETARIES_BY_GRANTOR)?;
            let mut by_beneficiary = write_txn.open_table(MONETARIES_BY_BENEFICIARY)?;

            let monetary = match read_row::<_, StoredMonetary>(&monetaries, &key)? {
                Some(monetary) if monetary.owner_id == grantor_id => monetary,
                _ => return Err(StorageError::NotFound(format!("Monetary {monetary_id}"))),
            };

            monetaries.remove(key.as_str())?;
            by_grantor.remove(child_key(&grantor_id.to_string(), &key).as_str())?;
            by_beneficiary.remove(child_key(&monetary.will_to.to_string(), &key).as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
