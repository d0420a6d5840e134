// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for grantor-scoped routes.
//!
//! Every scoped route carries the owning grantor's id in its path. The
//! authenticated principal must be that grantor; anything else is denied
//! before a repository is touched.

use uuid::Uuid;

use crate::auth::Principal;

/// Trait for resources that have an owning grantor.
pub trait OwnedResource {
    fn owner_id(&self) -> Uuid;
}

/// Outcome of comparing a principal against a path-supplied owner id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipDenied {
    /// The principal is a trustee; only grantors manage estate records.
    NotAGrantor,
    /// The principal is a different grantor, or the id is malformed.
    Mismatch,
}

/// Trait for enforcing ownership on scoped operations.
pub trait OwnershipEnforcer {
    /// Verify that the principal is the grantor named by `owner_id` and
    /// return the parsed id.
    fn authorize_owner(&self, owner_id: &str) -> Result<Uuid, OwnershipDenied>;

    /// Verify that the principal owns an already-loaded resource.
    fn verify_ownership<R: OwnedResource>(&self, resource: &R) -> Result<(), OwnershipDenied>;
}

impl OwnershipEnforcer for Principal {
    fn authorize_owner(&self, owner_id: &str) -> Result<Uuid, OwnershipDenied> {
        let Principal::Grantor(grantor) = self else {
            return Err(OwnershipDenied::NotAGrantor);
        };
        match Uuid::parse_str(owner_id) {
            Ok(id) if id == grantor.id => Ok(id),
            _ => Err(OwnershipDenied::Mismatch),
        }
    }

    fn verify_ownership<R: OwnedResource>(&self, resource: &R) -> Result<(), OwnershipDenied> {
        match self {
            Principal::Grantor(grantor) if grantor.id == resource.owner_id() => Ok(()),
            Principal::Grantor(_) => Err(OwnershipDenied::Mismatch),
            Principal::Trustee(_) => Err(OwnershipDenied::NotAGrantor),
        }
    }
}
