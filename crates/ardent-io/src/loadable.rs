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

use std::io::Read;

use ardent_core::asset::Asset;
use ardent_core::device::DevicePtr;
use serde::{de::DeserializeOwned, Serialize};

use crate::{AssetDecodeError, AssetLoadingContext};

/// An asset type the [`AssetLoader`](crate::AssetLoader) knows how to load.
///
/// Loading has two phases. [`read`](Loadable::read) runs on a worker thread:
/// it decodes the stored bytes into an intermediate value and may request
/// other assets through the context, which become dependencies.
/// [`finalize`](Loadable::finalize) runs later on the thread owning the
/// graphics device, once every dependency is loaded, and turns the
/// intermediate value into the asset.
///
/// ```rust
/// use std::io::Read;
/// use ardent_core::device::DevicePtr;
/// use ardent_io::{read_bytes, Asset, AssetDecodeError, AssetLoadingContext, Loadable};
///
/// struct Text(String);
/// impl Asset for Text {}
///
/// impl Loadable for Text {
///     type Intermediate = Vec<u8>;
///
///     fn read(
///         reader: &mut dyn Read,
///         _ctx: &mut AssetLoadingContext<'_>,
///     ) -> Result<Vec<u8>, AssetDecodeError> {
///         read_bytes(reader)
///     }
///
///     fn finalize(_device: &DevicePtr, bytes: Vec<u8>) -> Result<Self, AssetDecodeError> {
///         String::from_utf8(bytes)
///             .map(Text)
///             .map_err(|e| AssetDecodeError::Malformed(e.to_string()))
///     }
/// }
/// ```
pub trait Loadable: Asset + Sized {
    /// What `read` hands over to `finalize`.
    type Intermediate: Send + 'static;

    /// Decodes the stored bytes. Runs on a worker thread.
    fn read(
        reader: &mut dyn Read,
        ctx: &mut AssetLoadingContext<'_>,
    ) -> Result<Self::Intermediate, AssetDecodeError>;

    /// Builds the asset. Runs on the device thread.
    ///
    /// Must not block on other assets: the device thread is the one that
    /// would finalize them.
    fn finalize(
        device: &DevicePtr,
        intermediate: Self::Intermediate,
    ) -> Result<Self, AssetDecodeError>;
}

/// Reads the whole stream.
pub fn read_bytes(reader: &mut dyn Read) -> Result<Vec<u8>, AssetDecodeError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Decodes a value written by [`encode_bincode`].
pub fn decode_bincode<T: DeserializeOwned>(
    mut reader: &mut dyn Read,
) -> Result<T, AssetDecodeError> {
    let config = bincode::config::standard();
    Ok(bincode::serde::decode_from_std_read(&mut reader, config)?)
}

/// Encodes a value in the layout [`decode_bincode`] expects.
pub fn encode_bincode<T: Serialize>(value: &T) -> Result<Vec<u8>, bincode::error::EncodeError> {
    let config = bincode::config::standard();
    bincode::serde::encode_to_vec(value, config)
}
