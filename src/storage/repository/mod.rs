// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the estate database.
//!
//! Each repository provides CRUD operations for a specific entity type.
//! Reads and writes are scoped by the owning grantor: a row that exists but
//! belongs to another grantor is reported as `NotFound`.

pub mod assets;
pub mod beneficiaries;
pub mod grantors;
pub mod monetaries;
pub mod trustees;

pub use assets::{AssetRepository, StoredAsset};
pub use beneficiaries::{BeneficiaryRepository, StoredBeneficiary};
pub use grantors::{GrantorDashboard, GrantorRepository, StoredGrantor};
pub use monetaries::{MonetaryRepository, StoredMonetary};
pub use trustees::{StoredTrustee, TrusteeRepository};

/// Overwrite a required field when the update supplies a value.
pub(crate) fn patch<T: Clone>(field: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *field = value.clone();
    }
}

/// Overwrite an optional field when the update supplies a value.
pub(crate) fn patch_optional<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *field = value.clone();
    }
}
