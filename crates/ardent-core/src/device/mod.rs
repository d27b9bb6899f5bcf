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

//! The narrow graphics-device interface consumed by the asset finalize phase.
//!
//! Command recording, swapchains and pipelines live outside the core. The
//! loader only forwards a [`DevicePtr`] to `Loadable::finalize`, which is the
//! one place allowed to create GPU resources, and it is always called from
//! the thread that owns the device.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A device that finalized assets may allocate resources on.
///
/// The core never interprets it. Finalizers downcast through
/// [`GraphicsDevice::as_any`] when they need the concrete backend.
pub trait GraphicsDevice: Send + Sync + 'static {
    /// A human readable name, used in logs.
    fn label(&self) -> &str;

    /// Allows downcasting to the concrete device type.
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn GraphicsDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("label", &self.label())
            .finish()
    }
}

/// Shared handle to the engine's graphics device.
pub type DevicePtr = Arc<dyn GraphicsDevice>;

/// A device with no backing GPU, for tools, servers and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessDevice;

impl HeadlessDevice {
    /// Returns a shared [`DevicePtr`] to a headless device.
    pub fn shared() -> DevicePtr {
        Arc::new(HeadlessDevice)
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn label(&self) -> &str {
        "headless"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
