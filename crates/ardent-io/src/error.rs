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

use thiserror::Error;

/// Why [`Loadable::read`](crate::Loadable::read) or
/// [`Loadable::finalize`](crate::Loadable::finalize) rejected an asset.
///
/// The loader maps every variant to
/// [`AssetLoadingError::InvalidData`](ardent_core::asset::AssetLoadingError::InvalidData)
/// and logs the detail.
#[derive(Debug, Error)]
pub enum AssetDecodeError {
    /// Reading the stored bytes failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The bytes are not a valid bincode encoding of the asset.
    #[error("bincode decoding failed: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    /// The bytes decoded but describe an invalid asset.
    #[error("malformed asset: {0}")]
    Malformed(String),
}
