// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Password login, access tokens and principal resolution for the estate API.
//!
//! ## Auth Flow
//!
//! 1. A grantor or trustee logs in with username and password (JSON body or
//!    HTTP Basic credentials)
//! 2. The password is verified against the stored Argon2id hash
//! 3. The server issues an HMAC-signed JWT whose `sub` is the account id
//! 4. Later requests send `Authorization: Bearer <token>` (or the
//!    `Authorization` cookie); the server verifies signature and expiry and
//!    resolves the subject to a grantor, then a trustee
//!
//! ## Security
//!
//! - Tokens expire after the configured number of weeks; there are no
//!   refresh tokens
//! - Ownership of grantor-scoped routes is checked against the resolved
//!   principal in `storage::ownership`

pub mod error;
pub mod extractor;
pub mod password;
pub mod principal;
pub mod token;

pub use error::AuthError;
pub use extractor::{Auth, BasicCredentials};
pub use password::{hash_password, verify_password, verify_unknown_account};
pub use principal::Principal;
pub use token::{Claims, TokenService};
