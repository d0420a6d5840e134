// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Grantor repository.
//!
//! Grantors are the account holders. Username, email (case-insensitive) and
//! phone number are each unique across all grantors and are enforced through
//! dedicated index tables written in the same transaction as the row.

use chrono::{DateTime, NaiveDate, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::super::database::{
    cascade_grantor, read_row, rows_for_parent, write_row, ASSETS, ASSETS_BY_GRANTOR,
    BENEFICIARIES, BENEFICIARIES_BY_GRANTOR, MONETARIES, MONETARIES_BY_GRANTOR, TRUSTEES,
    TRUSTEES_BY_GRANTOR, USERS, USER_EMAILS, USER_PHONE_NUMBERS, USER_USERNAMES,
};
use super::super::{EstateDatabase, StorageError, StorageResult};
use super::{patch, StoredAsset, StoredBeneficiary, StoredMonetary, StoredTrustee};
use crate::models::{Gender, UpdateGrantorRequest};

/// Grantor row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredGrantor {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A grantor together with every record they own.
#[derive(Debug, Clone)]
pub struct GrantorDashboard {
    pub grantor: StoredGrantor,
    pub beneficiaries: Vec<StoredBeneficiary>,
    pub trustees: Vec<StoredTrustee>,
    pub assets: Vec<StoredAsset>,
    pub monetaries: Vec<StoredMonetary>,
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Repository for grantor accounts.
pub struct GrantorRepository<'a> {
    db: &'a EstateDatabase,
}

impl<'a> GrantorRepository<'a> {
    pub fn new(db: &'a EstateDatabase) -> Self {
        Self { db }
    }

    /// Insert a new grantor, rejecting duplicate username, email or phone number.
    pub fn create(&self, grantor: &StoredGrantor) -> StorageResult<()> {
        let key = grantor.id.to_string();
        let email = email_key(&grantor.email);

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let mut usernames = write_txn.open_table(USER_USERNAMES)?;
            let mut emails = write_txn.open_table(USER_EMAILS)?;
            let mut phones = write_txn.open_table(USER_PHONE_NUMBERS)?;

            if users.get(key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Grantor {key}")));
            }
            if usernames.get(grantor.username.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "Username {}",
                    grantor.username
                )));
            }
            if emails.get(email.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Email {}", grantor.email)));
            }
            if phones.get(grantor.phone_number.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "Phone number {}",
                    grantor.phone_number
                )));
            }

            write_row(&mut users, &key, grantor)?;
            usernames.insert(grantor.username.as_str(), key.as_str())?;
            emails.insert(email.as_str(), key.as_str())?;
            phones.insert(grantor.phone_number.as_str(), key.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a grantor by id, if present.
    pub fn find(&self, grantor_id: Uuid) -> StorageResult<Option<StoredGrantor>> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        read_row(&users, &grantor_id.to_string())
    }

    pub fn get(&self, grantor_id: Uuid) -> StorageResult<StoredGrantor> {
        self.find(grantor_id)?
            .ok_or_else(|| StorageError::NotFound(format!("Grantor {grantor_id}")))
    }

    /// Look up a grantor by login name.
    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<StoredGrantor>> {
        let read_txn = self.db.begin_read()?;
        let usernames = read_txn.open_table(USER_USERNAMES)?;
        let Some(id) = usernames.get(username)?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS)?;
        read_row(&users, &id)
    }

    /// Apply a partial profile update.
    pub fn update(
        &self,
        grantor_id: Uuid,
        changes: &UpdateGrantorRequest,
    ) -> StorageResult<StoredGrantor> {
        let key = grantor_id.to_string();

        let write_txn = self.db.begin_write()?;
        let grantor = {
            let mut users = write_txn.open_table(USERS)?;
            let mut grantor: StoredGrantor = read_row(&users, &key)?
                .ok_or_else(|| StorageError::NotFound(format!("Grantor {grantor_id}")))?;

            patch(&mut grantor.first_name, &changes.first_name);
            patch(&mut grantor.middle_name, &changes.middle_name);
            patch(&mut grantor.last_name, &changes.last_name);
            patch(&mut grantor.date_of_birth, &changes.date_of_birth);
            patch(&mut grantor.gender, &changes.gender);
            grantor.updated_at = Some(Utc::now());

            write_row(&mut users, &key, &grantor)?;
            grantor
        };
        write_txn.commit()?;
        Ok(grantor)
    }

    /// Delete a grantor and every beneficiary, trustee, asset and monetary
    /// row they own.
    pub fn delete(&self, grantor_id: Uuid) -> StorageResult<()> {
        let key = grantor_id.to_string();

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let grantor: StoredGrantor = read_row(&users, &key)?
                .ok_or_else(|| StorageError::NotFound(format!("Grantor {grantor_id}")))?;

            let mut usernames = write_txn.open_table(USER_USERNAMES)?;
            let mut emails = write_txn.open_table(USER_EMAILS)?;
            let mut phones = write_txn.open_table(USER_PHONE_NUMBERS)?;

            users.remove(key.as_str())?;
            usernames.remove(grantor.username.as_str())?;
            emails.remove(email_key(&grantor.email).as_str())?;
            phones.remove(grantor.phone_number.as_str())?;
        }
        let removed = cascade_grantor(&write_txn, &key)?;
        write_txn.commit()?;

        tracing::debug!(grantor_id = %grantor_id, removed, "Grantor deleted with dependents");
        Ok(())
    }

    /// Load a grantor and all of their records from one snapshot.
    pub fn dashboard(&self, grantor_id: Uuid) -> StorageResult<GrantorDashboard> {
        let key = grantor_id.to_string();
        let read_txn = self.db.begin_read()?;

        let users = read_txn.open_table(USERS)?;
        let grantor: StoredGrantor = read_row(&users, &key)?
            .ok_or_else(|| StorageError::NotFound(format!("Grantor {grantor_id}")))?;

        let mut beneficiaries: Vec<StoredBeneficiary> = rows_for_parent(
            &read_txn.open_table(BENEFICIARIES_BY_GRANTOR)?,
            &read_txn.open_table(BENEFICIARIES)?,
            &key,
        )?;
        let mut trustees: Vec<StoredTrustee> = rows_for_parent(
            &read_txn.open_table(TRUSTEES_BY_GRANTOR)?,
            &read_txn.open_table(TRUSTEES)?,
            &key,
        )?;
        let mut assets: Vec<StoredAsset> = rows_for_parent(
            &read_txn.open_table(ASSETS_BY_GRANTOR)?,
            &read_txn.open_table(ASSETS)?,
            &key,
        )?;
        let mut monetaries: Vec<StoredMonetary> = rows_for_parent(
            &read_txn.open_table(MONETARIES_BY_GRANTOR)?,
            &read_txn.open_table(MONETARIES)?,
            &key,
        )?;

        beneficiaries.sort_by_key(|b| b.created_at);
        trustees.sort_by_key(|t| t.created_at);
        assets.sort_by_key(|a| a.created_at);
        monetaries.sort_by_key(|m| m.created_at);

        Ok(GrantorDashboard {
            grantor,
            beneficiaries,
            trustees,
            assets,
            monetaries,
        })
    }
}
