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

//! # Ardent Core
//!
//! Foundational crate containing the primitive types and interface contracts
//! shared by the ECS (`ardent-data`) and the asset pipeline (`ardent-io`).
//! It knows nothing about how entities are stored or how assets are loaded.

#![warn(missing_docs)]

pub mod asset;
pub mod config;
pub mod device;
pub mod ecs;
pub mod telemetry;

pub use config::EngineConfig;
pub use device::{DevicePtr, GraphicsDevice, HeadlessDevice};
