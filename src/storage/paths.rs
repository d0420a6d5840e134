// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the on-disk data layout.

use std::path::{Path, PathBuf};

/// File name of the embedded database under the data root.
pub const DATABASE_FILE: &str = "estate.redb";

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persisted data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the redb database file.
    pub fn database(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    /// Directory holding uploaded documents.
    pub fn documents_dir(&self) -> PathBuf {
        self.root.join("documents").join("uploads")
    }

    /// Path to a stored document.
    pub fn document(&self, stored_name: &str) -> PathBuf {
        self.documents_dir().join(stored_name)
    }
}
