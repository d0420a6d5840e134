// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated principals.

use uuid::Uuid;

use super::AuthError;
use crate::models::AccountType;
use crate::storage::{
    EstateDatabase, GrantorRepository, StoredGrantor, StoredTrustee, TrusteeRepository,
};

/// The account a verified token resolved to.
#[derive(Debug, Clone)]
pub enum Principal {
    Grantor(StoredGrantor),
    Trustee(StoredTrustee),
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::Grantor(grantor) => grantor.id,
            Principal::Trustee(trustee) => trustee.id,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Principal::Grantor(grantor) => &grantor.username,
            Principal::Trustee(trustee) => &trustee.username,
        }
    }

    pub fn account_type(&self) -> AccountType {
        match self {
            Principal::Grantor(_) => AccountType::Grantor,
            Principal::Trustee(_) => AccountType::Trustee,
        }
    }

    /// Resolve a token subject: grantors first, then trustees.
    pub fn resolve(db: &EstateDatabase, subject_id: Uuid) -> Result<Self, AuthError> {
        let storage_error = |e: crate::storage::StorageError| AuthError::InternalError(e.to_string());

        if let Some(grantor) = GrantorRepository::new(db)
            .find(subject_id)
            .map_err(storage_error)?
        {
            return Ok(Principal::Grantor(grantor));
        }
        if let Some(trustee) = TrusteeRepository::new(db)
            .find(subject_id)
            .map_err(storage_error)?
        {
            return Ok(Principal::Trustee(trustee));
        }
        Err(AuthError::UnknownPrincipal)
    }
}
