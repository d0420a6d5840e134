// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenService;
use crate::storage::{DocumentStore, EstateDatabase};

/// Shared handles passed to every handler.
///
/// Opened once in `main` and dropped at shutdown.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<EstateDatabase>,
    pub documents: Arc<DocumentStore>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: EstateDatabase, documents: DocumentStore, tokens: TokenService) -> Self {
        Self {
            db: Arc::new(db),
            documents: Arc::new(documents),
            tokens: Arc::new(tokens),
        }
    }
}
