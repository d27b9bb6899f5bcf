// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Terminal failure kinds of an asset load.

use std::fmt;

/// Why an asset ended up in the failed state.
///
/// All variants are terminal: a failed asset is never retried automatically.
/// Callers observe them through `AssetPtr::error()` rather than through a
/// returned `Result`, except for the name-based entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetLoadingError {
    /// The asset id was not found in the store.
    InvalidId,
    /// The stored bytes could not be decoded or finalized.
    InvalidData,
    /// An asset loaded while reading this one failed.
    FailedDependency,
    /// A name lookup in the store did not resolve to any id.
    UnknownId,
}

impl fmt::Display for AssetLoadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLoadingError::InvalidId => write!(f, "invalid asset id"),
            AssetLoadingError::InvalidData => write!(f, "invalid asset data"),
            AssetLoadingError::FailedDependency => write!(f, "failed to load dependency"),
            AssetLoadingError::UnknownId => write!(f, "unknown asset name"),
        }
    }
}

impl std::error::Error for AssetLoadingError {}
