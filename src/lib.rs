// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Estate Trust - estate planning service
//!
//! Grantors register beneficiaries, appoint trustees and will physical and
//! monetary assets to their beneficiaries, with supporting documents.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password login, bearer tokens and principal resolution
//! - `config` - Environment configuration
//! - `storage` - Embedded redb database and document store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
