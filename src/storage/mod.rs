// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state for the estate service: an embedded redb database for
//! records and a document store for uploaded files.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   estate.redb          # grantors, trustees, beneficiaries, assets, monetaries
//!   documents/uploads/   # <owner_id>_<YYYY-MM-DD><filename> (local backend)
//! ```
//!
//! ## Important Notes
//!
//! - Uniqueness and foreign-key rules are enforced by the repositories, not
//!   by the handlers
//! - A cascade runs in the same write transaction as the delete that
//!   triggered it

pub mod database;
pub mod documents;
pub mod ownership;
pub mod paths;
pub mod repository;

pub use database::{parse_id, EstateDatabase, StorageError, StorageResult};
pub use documents::{DocumentError, DocumentStore};
pub use ownership::{OwnedResource, OwnershipDenied, OwnershipEnforcer};
pub use paths::StoragePaths;
pub use repository::{
    AssetRepository, BeneficiaryRepository, GrantorDashboard, GrantorRepository,
    MonetaryRepository, StoredAsset, StoredBeneficiary, StoredGrantor, StoredMonetary,
    StoredTrustee, TrusteeRepository,
};
