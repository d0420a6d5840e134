// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Accounts**: grantor registration, login and the grantor dashboard
//! - **Trustees**: executors appointed by a grantor, with their own login
//! - **Beneficiaries**: people a grantor wills assets to
//! - **Assets / Monetaries**: physical and monetary items, each willed to
//!   exactly one beneficiary
//!
//! Stored rows never leave the service directly: every response type is built
//! from its stored counterpart and omits password hashes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::repository::{
    GrantorDashboard, StoredAsset, StoredBeneficiary, StoredGrantor, StoredMonetary,
    StoredTrustee,
};

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Other,
}

/// How a trustee is related to the grantor who appointed them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrusteeRelation {
    Brother,
    Sister,
    Friend,
    Lawyer,
    Wife,
}

/// How a beneficiary is related to the grantor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BeneficiaryRelation {
    Brother,
    Sister,
    Son,
    Daughter,
    Wife,
    Husband,
    Stepson,
    Stepdaughter,
    Grandchild,
    Cousin,
    Nephew,
    Friend,
    Father,
    Mother,
    Inlaw,
}

/// Which credential table a login is checked against.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Grantor,
    Trustee,
}

// =============================================================================
// Generic Responses
// =============================================================================

/// Confirmation message returned by create endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Minimal email shape check: one `@` with text on both sides and a dot in
/// the domain.
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

// =============================================================================
// Account Models
// =============================================================================

/// Request to register a new grantor account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterGrantorRequest {
    pub username: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
}

/// Partial update of a grantor profile. Credentials and unique contact
/// fields are not editable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateGrantorRequest {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

/// JSON login request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub account_type: AccountType,
}

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Identifier of the authenticated grantor or trustee.
    pub id: Uuid,
}

impl AccessTokenResponse {
    pub fn bearer(access_token: String, id: Uuid) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            id,
        }
    }
}

/// Public view of a grantor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantorResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<StoredGrantor> for GrantorResponse {
    fn from(grantor: StoredGrantor) -> Self {
        Self {
            id: grantor.id,
            username: grantor.username,
            first_name: grantor.first_name,
            middle_name: grantor.middle_name,
            last_name: grantor.last_name,
            email: grantor.email,
            phone_number: grantor.phone_number,
            date_of_birth: grantor.date_of_birth,
            gender: grantor.gender,
            created_at: grantor.created_at,
            updated_at: grantor.updated_at,
        }
    }
}

/// Grantor profile together with everything the grantor has registered.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub grantor: GrantorResponse,
    pub beneficiaries: Vec<BeneficiaryResponse>,
    pub trustees: Vec<TrusteeResponse>,
    pub assets: Vec<AssetResponse>,
    pub monetaries: Vec<MonetaryResponse>,
}

impl From<GrantorDashboard> for DashboardResponse {
    fn from(dashboard: GrantorDashboard) -> Self {
        Self {
            grantor: dashboard.grantor.into(),
            beneficiaries: dashboard.beneficiaries.into_iter().map(Into::into).collect(),
            trustees: dashboard.trustees.into_iter().map(Into::into).collect(),
            assets: dashboard.assets.into_iter().map(Into::into).collect(),
            monetaries: dashboard.monetaries.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Trustee Models
// =============================================================================

/// Request to appoint a trustee.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTrusteeRequest {
    pub username: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub relation: TrusteeRelation,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTrusteeRequest {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub relation: Option<TrusteeRelation>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrusteeResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub relation: TrusteeRelation,
    pub note: Option<String>,
    pub added_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<StoredTrustee> for TrusteeResponse {
    fn from(trustee: StoredTrustee) -> Self {
        Self {
            id: trustee.id,
            username: trustee.username,
            first_name: trustee.first_name,
            middle_name: trustee.middle_name,
            last_name: trustee.last_name,
            email: trustee.email,
            phone_number: trustee.phone_number,
            relation: trustee.relation,
            note: trustee.note,
            added_by: trustee.added_by,
            created_at: trustee.created_at,
            updated_at: trustee.updated_at,
        }
    }
}

// =============================================================================
// Beneficiary Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBeneficiaryRequest {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub relation: BeneficiaryRelation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateBeneficiaryRequest {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub relation: Option<BeneficiaryRelation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BeneficiaryResponse {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub relation: BeneficiaryRelation,
    pub added_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<StoredBeneficiary> for BeneficiaryResponse {
    fn from(beneficiary: StoredBeneficiary) -> Self {
        Self {
            id: beneficiary.id,
            first_name: beneficiary.first_name,
            middle_name: beneficiary.middle_name,
            last_name: beneficiary.last_name,
            relation: beneficiary.relation,
            added_by: beneficiary.added_by,
            created_at: beneficiary.created_at,
            updated_at: beneficiary.updated_at,
        }
    }
}

// =============================================================================
// Asset Models
// =============================================================================

/// Request to register a physical asset.
///
/// Sent either as a JSON body or as the `data` part of a multipart upload
/// whose `document` part carries a supporting file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAssetRequest {
    pub name: String,
    pub location: Option<String>,
    /// Beneficiary receiving the asset (must belong to the same grantor).
    pub will_to: Uuid,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub will_to: Option<Uuid>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetResponse {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    /// Stored document name, usable with the download route.
    pub document: Option<String>,
    pub note: Option<String>,
    pub owner_id: Uuid,
    pub will_to: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<StoredAsset> for AssetResponse {
    fn from(asset: StoredAsset) -> Self {
        Self {
            id: asset.id,
            name: asset.name,
            location: asset.location,
            document: asset.document,
            note: asset.note,
            owner_id: asset.owner_id,
            will_to: asset.will_to,
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        }
    }
}

// =============================================================================
// Monetary Models
// =============================================================================

/// Request to register a monetary asset (bank account holding).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMonetaryRequest {
    pub acc_name: String,
    pub acc_number: String,
    /// Formatted amount, kept as text (e.g. `"1,000,000 NGN"`).
    pub amount: String,
    pub bank_name: String,
    pub will_to: Uuid,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMonetaryRequest {
    pub acc_name: Option<String>,
    pub acc_number: Option<String>,
    pub amount: Option<String>,
    pub bank_name: Option<String>,
    pub will_to: Option<Uuid>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonetaryResponse {
    pub id: Uuid,
    pub acc_name: String,
    pub acc_number: String,
    pub amount: String,
    pub bank_name: String,
    pub document: Option<String>,
    pub note: Option<String>,
    pub owner_id: Uuid,
    pub will_to: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<StoredMonetary> for MonetaryResponse {
    fn from(monetary: StoredMonetary) -> Self {
        Self {
            id: monetary.id,
            acc_name: monetary.acc_name,
            acc_number: monetary.acc_number,
            amount: monetary.amount,
            bank_name: monetary.bank_name,
            document: monetary.document,
            note: monetary.note,
            owner_id: monetary.owner_id,
            will_to: monetary.will_to,
            created_at: monetary.created_at,
            updated_at: monetary.updated_at,
        }
    }
}
