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

//! # Ardent Agents
//!
//! Systems that connect the ECS world to the engine's services.
//!
//! The [`asset_agent`] drives asset loading for components: components that
//! implement [`LoadableComponent`](asset_agent::LoadableComponent) have their
//! assets requested when they are added to the world, and are reported once
//! those assets settle.

#![warn(missing_docs)]

pub mod asset_agent;
