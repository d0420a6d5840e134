// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Physical asset repository.
//!
//! Each asset is owned by a grantor and willed to one of that grantor's
//! beneficiaries. Both links are indexed so assets can be listed per grantor
//! and per beneficiary and removed by either cascade.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::super::database::{
    child_key, ensure_beneficiary_of, ensure_grantor, read_row, rows_for_parent, write_row,
    ASSETS, ASSETS_BY_BENEFICIARY, ASSETS_BY_GRANTOR, BENEFICIARIES, USERS,
};
use super::super::{EstateDatabase, OwnedResource, StorageError, StorageResult};
use super::{patch, patch_optional};
use crate::models::UpdateAssetRequest;

/// Asset row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredAsset {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    /// Stored name of the supporting document, if one was uploaded.
    pub document: Option<String>,
    pub note: Option<String>,
    pub owner_id: Uuid,
    pub will_to: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OwnedResource for StoredAsset {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Repository for physical assets.
pub struct AssetRepository<'a> {
    db: &'a EstateDatabase,
}

impl<'a> AssetRepository<'a> {
    pub fn new(db: &'a EstateDatabase) -> Self {
        Self { db }
    }

    /// Insert an asset. Fails with `MissingReference` if the owner does not
    /// exist or the beneficiary is not one of the owner's.
    pub fn create(&self, asset: &StoredAsset) -> StorageResult<()> {
        let key = asset.id.to_string();

        let write_txn = self.db.begin_write()?;
        {
            ensure_grantor(&write_txn.open_table(USERS)?, asset.owner_id)?;
            ensure_beneficiary_of(
                &write_txn.open_table(BENEFICIARIES)?,
                asset.owner_id,
                asset.will_to,
            )?;

            let mut assets = write_txn.open_table(ASSETS)?;
            let mut by_grantor = write_txn.open_table(ASSETS_BY_GRANTOR)?;
            let mut by_beneficiary = write_txn.open_table(ASSETS_BY_BENEFICIARY)?;

            if assets.get(key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Asset {key}")));
            }

            write_row(&mut assets, &key, asset)?;
            by_grantor.insert(
                child_key(&asset.owner_id.to_string(), &key).as_str(),
                key.as_str(),
            )?;
            by_beneficiary.insert(
                child_key(&asset.will_to.to_string(), &key).as_str(),
                key.as_str(),
            )?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get an asset owned by `grantor_id`.
    pub fn get(&self, grantor_id: Uuid, asset_id: Uuid) -> StorageResult<StoredAsset> {
        let read_txn = self.db.begin_read()?;
        let assets = read_txn.open_table(ASSETS)?;
        match read_row::<_, StoredAsset>(&assets, &asset_id.to_string())? {
            Some(asset) if asset.owner_id == grantor_id => Ok(asset),
            _ => Err(StorageError::NotFound(format!("Asset {asset_id}"))),
        }
    }

    /// List every asset owned by a grantor, oldest first.
    pub fn list_by_grantor(&self, grantor_id: Uuid) -> StorageResult<Vec<StoredAsset>> {
        let read_txn = self.db.begin_read()?;
        let mut assets: Vec<StoredAsset> = rows_for_parent(
            &read_txn.open_table(ASSETS_BY_GRANTOR)?,
            &read_txn.open_table(ASSETS)?,
            &grantor_id.to_string(),
        )?;
        assets.sort_by_key(|a| a.created_at);
        Ok(assets)
    }

    /// List the assets willed to a beneficiary, restricted to `grantor_id`'s.
    pub fn list_by_beneficiary(
        &self,
        grantor_id: Uuid,
        beneficiary_id: Uuid,
    ) -> StorageResult<Vec<StoredAsset>> {
        let read_txn = self.db.begin_read()?;
        let mut assets: Vec<StoredAsset> = rows_for_parent(
            &read_txn.open_table(ASSETS_BY_BENEFICIARY)?,
            &read_txn.open_table(ASSETS)?,
            &beneficiary_id.to_string(),
        )?;
        assets.retain(|a| a.owner_id == grantor_id);
        assets.sort_by_key(|a| a.created_at);
        Ok(assets)
    }

    /// Apply a partial update. `document` replaces the stored document name
    /// when a new file was uploaded with the update.
    pub fn update(
        &self,
        grantor_id: Uuid,
        asset_id: Uuid,
        changes: &UpdateAssetRequest,
        document: Option<String>,
    ) -> StorageResult<StoredAsset> {
        let key = asset_id.to_string();

        let write_txn = self.db.begin_write()?;
        let asset = {
            let mut assets = write_txn.open_table(ASSETS)?;
            let mut asset = match read_row::<_, StoredAsset>(&assets, &key)? {
                Some(asset) if asset.owner_id == grantor_id => asset,
                _ => return Err(StorageError::NotFound(format!("Asset {asset_id}"))),
            };

            if let Some(will_to) = changes.will_to.filter(|b| *b != asset.will_to) {
                ensure_beneficiary_of(&write_txn.open_table(BENEFICIARIES)?, grantor_id, will_to)?;

                let mut by_beneficiary = write_txn.open_table(ASSETS_BY_BENEFICIARY)?;
                by_beneficiary.remove(child_key(&asset.will_to.to_string(), &key).as_str())?;
                by_beneficiary.insert(child_key(&will_to.to_string(), &key).as_str(), key.as_str())?;
                asset.will_to = will_to;
            }

            patch(&mut asset.name, &changes.name);
            patch_optional(&mut asset.location, &changes.location);
            patch_optional(&mut asset.note, &changes.note);
            if document.is_some() {
                asset.document = document;
            }
            asset.updated_at = Some(Utc::now());

            write_row(&mut assets, &key, &asset)?;
            asset
        };
        write_txn.commit()?;
        Ok(asset)
    }

    pub fn delete(&self, grantor_id: Uuid, asset_id: Uuid) -> StorageResult<()> {
        let key = asset_id.to_string();

        let write_txn = self.db.begin_write()?;
        {
            let mut assets = write_txn.open_table(ASSETS)?;
            let mut by_grantor = write_txn.open_table(ASSETS_BY_GRANTOR)?;
            let mut by_beneficiary = write_txn.open_table(ASSETS_BY_BENEFICIARY)?;

            let asset = match read_row::<_, StoredAsset>(&assets, &key)? {
                Some(asset) if asset.owner_id == grantor_id => asset,
                _ => return Err(StorageError::NotFound(format!("Asset {asset_id}"))),
            };

            assets.remove(key.as_str())?;
            by_grantor.remove(child_key(&grantor_id.to_string(), &key).as_str())?;
            by_beneficiary.remove(child_key(&asset.will_to.to_string(), &key).as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::beneficiaries::tests::sample_beneficiary;
    use crate::storage::repository::grantors::tests::{sample_grantor, test_db};
    use crate::storage::{BeneficiaryRepository, GrantorRepository};

    fn sample_asset(owner_id: Uuid, will_to: Uuid) -> StoredAsset {
        StoredAsset {
            id: Uuid::new_v4(),
            name: "House at Lekki".to_string(),
            location: Some("Lagos".to_string()),
            document: None,
            note: None,
            owner_id,
            will_to,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Grantor with one beneficiary, ready to own assets.
    fn seeded(db: &EstateDatabase) -> (Uuid, Uuid) {
        let grantor = sample_grantor("owner", "o@x.com", "1");
        GrantorRepository::new(db).create(&grantor).unwrap();
        let beneficiary = sample_beneficiary(grantor.id);
        BeneficiaryRepository::new(db).create(&beneficiary).unwrap();
        (grantor.id, beneficiary.id)
    }

    #[test]
    fn create_and_list_by_grantor_and_beneficiary() {
        let (db, _dir) = test_db();
        let (grantor_id, beneficiary_id) = seeded(&db);
        let repo = AssetRepository::new(&db);

        let asset = sample_asset(grantor_id, beneficiary_id);
        repo.create(&asset).unwrap();

        assert_eq!(repo.list_by_grantor(grantor_id).unwrap(), vec![asset.clone()]);
        assert_eq!(
            repo.list_by_beneficiary(grantor_id, beneficiary_id).unwrap(),
            vec![asset.clone()]
        );
        assert!(repo
            .list_by_beneficiary(Uuid::new_v4(), beneficiary_id)
            .unwrap()
            .is_empty());
        assert_eq!(repo.get(grantor_id, asset.id).unwrap(), asset);
    }

    #[test]
    fn dangling_or_foreign_beneficiary_is_rejected() {
        let (db, _dir) = test_db();
        let (grantor_id, _) = seeded(&db);
        let repo = AssetRepository::new(&db);

        let result = repo.create(&sample_asset(grantor_id, Uuid::new_v4()));
        assert!(matches!(result, Err(StorageError::MissingReference(_))));

        let other = sample_grantor("other", "t@x.com", "2");
        GrantorRepository::new(&db).create(&other).unwrap();
        let foreign = sample_beneficiary(other.id);
        BeneficiaryRepository::new(&db).create(&foreign).unwrap();

        let result = repo.create(&sample_asset(grantor_id, foreign.id));
        assert!(matches!(result, Err(StorageError::MissingReference(_))));
        assert!(repo.list_by_grantor(grantor_id).unwrap().is_empty());
    }

    #[test]
    fn update_moves_beneficiary_index_and_keeps_document() {
        let (db, _dir) = test_db();
        let (grantor_id, first) = seeded(&db);
        let second = sample_beneficiary(grantor_id);
        BeneficiaryRepository::new(&db).create(&second).unwrap();

        let repo = AssetRepository::new(&db);
        let mut asset = sample_asset(grantor_id, first);
        asset.document = Some(format!("{grantor_id}_2026-01-01deed.pdf"));
        repo.create(&asset).unwrap();

        let updated = repo
            .update(
                grantor_id,
                asset.id,
                &UpdateAssetRequest {
                    will_to: Some(second.id),
                    note: Some("Includes the annex".into()),
                    ..Default::default()
                },
                None,
            )
            .unwrap();

        assert_eq!(updated.will_to, second.id);
        assert_eq!(updated.document, asset.document);
        assert!(repo.list_by_beneficiary(grantor_id, first).unwrap().is_empty());
        assert_eq!(
            repo.list_by_beneficiary(grantor_id, second.id).unwrap().len(),
            1
        );

        let result = repo.update(
            grantor_id,
            asset.id,
            &UpdateAssetRequest {
                will_to: Some(Uuid::new_v4()),
                ..Default::default()
            },
            None,
        );
        assert!(matches!(result, Err(StorageError::MissingReference(_))));
        assert_eq!(repo.get(grantor_id, asset.id).unwrap().will_to, second.id);
    }

    #[test]
    fn beneficiary_delete_cascades_to_assets() {
        let (db, _dir) = test_db();
        let (grantor_id, beneficiary_id) = seeded(&db);
        let repo = AssetRepository::new(&db);
        repo.create(&sample_asset(grantor_id, beneficiary_id)).unwrap();
        repo.create(&sample_asset(grantor_id, beneficiary_id)).unwrap();

        BeneficiaryRepository::new(&db)
            .delete(grantor_id, beneficiary_id)
            .unwrap();
        assert!(repo.list_by_grantor(grantor_id).unwrap().is_empty());
    }

    #[test]
    fn grantor_delete_removes_asset_row_and_indexes() {
        let (db, _dir) = test_db();
        let (grantor_id, beneficiary_id) = seeded(&db);
        let asset = sample_asset(grantor_id, beneficiary_id);
        AssetRepository::new(&db).create(&asset).unwrap();

        GrantorRepository::new(&db).delete(grantor_id).unwrap();

        let asset_key = asset.id.to_string();
        let read_txn = db.begin_read().unwrap();
        let assets = read_txn.open_table(ASSETS).unwrap();
        let by_grantor = read_txn.open_table(ASSETS_BY_GRANTOR).unwrap();
        let by_beneficiary = read_txn.open_table(ASSETS_BY_BENEFICIARY).unwrap();

        assert!(assets.get(asset_key.as_str()).unwrap().is_none());
        assert!(by_grantor
            .get(child_key(&grantor_id.to_string(), &asset_key).as_str())
            .unwrap()
            .is_none());
        assert!(by_beneficiary
            .get(child_key(&beneficiary_id.to_string(), &asset_key).as_str())
            .unwrap()
            .is_none());
    }

    #[test]
    fn delete_is_scoped_to_owner() {
        let (db, _dir) = test_db();
        let (grantor_id, beneficiary_id) = seeded(&db);
        let repo = AssetRepository::new(&db);
        let asset = sample_asset(grantor_id, beneficiary_id);
        repo.create(&asset).unwrap();

        assert!(matches!(
            repo.delete(Uuid::new_v4(), asset.id),
            Err(StorageError::NotFound(_))
        ));
        repo.delete(grantor_id, asset.id).unwrap();
        assert!(repo.list_by_grantor(grantor_id).unwrap().is_empty());
        assert!(repo
            .list_by_beneficiary(grantor_id, beneficiary_id)
            .unwrap()
            .is_empty());
    }
}
