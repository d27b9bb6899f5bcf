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

use ardent_core::ecs::EntityId;

use crate::ecs::{Archetype, Component, ComponentTypeIndex, World};

/// A collection of component values that can be attached together.
///
/// Implemented for tuples of components, like `(Position, Velocity)`, and for
/// `()`. Used by [`World::create_entity_with`] and [`World::add_bundle`].
pub trait ComponentBundle {
    /// The component types in this bundle, in tuple order.
    fn type_indices() -> Vec<ComponentTypeIndex>;

    /// Adds every value of the bundle to `id`, replacing existing components.
    fn insert_into(self, world: &mut World, id: EntityId);
}

/// A tuple of default-constructible component types, used as a static archetype.
///
/// ```rust
/// use ardent_data::ecs::{Component, World};
///
/// #[derive(Component, Default)]
/// struct Position(f32, f32);
/// #[derive(Component, Default)]
/// struct Velocity(f32, f32);
///
/// let mut world = World::new();
/// let id = world.create_entity_static::<(Position, Velocity)>();
/// assert!(world.has::<Velocity>(id));
/// ```
pub trait StaticArchetype {
    /// The dynamic archetype listing the same types.
    fn archetype() -> Archetype;

    /// Default-constructs every listed type missing on `id`.
    fn add_defaults(world: &mut World, id: EntityId);
}

impl ComponentBundle for () {
    fn type_indices() -> Vec<ComponentTypeIndex> {
        Vec::new()
    }

    fn insert_into(self, _world: &mut World, _id: EntityId) {}
}

impl StaticArchetype for () {
    fn archetype() -> Archetype {
        Archetype::new()
    }

    fn add_defaults(_world: &mut World, _id: EntityId) {}
}

macro_rules! impl_bundle_tuple {
    ($(($C:ident, $i:tt)),*) => {
        impl<$($C: Component),*> ComponentBundle for ($($C,)*) {
            fn type_indices() -> Vec<ComponentTypeIndex> {
                vec![$(ComponentTypeIndex::of::<$C>()),*]
            }

            fn insert_into(self, world: &mut World, id: EntityId) {
                $(world.add_component(id, self.$i);)*
            }
        }

        impl<$($C: Component + Default),*> StaticArchetype for ($($C,)*) {
            fn archetype() -> Archetype {
                let mut archetype = Archetype::new();
                $(archetype.add::<$C>();)*
                archetype
            }

            fn add_defaults(world: &mut World, id: EntityId) {
                $(
                    if !world.has::<$C>(id) {
                        world.add_component(id, $C::default());
                    }
                )*
            }
        }
    };
}

impl_bundle_tuple!((C1, 0));
impl_bundle_tuple!((C1, 0), (C2, 1));
impl_bundle_tuple!((C1, 0), (C2, 1), (C3, 2));
impl_bundle_tuple!((C1, 0), (C2, 1), (C3, 2), (C4, 3));
impl_bundle_tuple!((C1, 0), (C2, 1), (C3, 2), (C4, 3), (C5, 4));
impl_bundle_tuple!((C1, 0), (C2, 1), (C3, 2), (C4, 3), (C5, 4), (C6, 5));
impl_bundle_tuple!((C1, 0), (C2, 1), (C3, 2), (C4, 3), (C5, 4), (C6, 5), (C7, 6));
impl_bundle_tuple!((C1, 0), (C2, 1), (C3, 2), (C4, 3), (C5, 4), (C6, 5), (C7, 6), (C8, 7));
