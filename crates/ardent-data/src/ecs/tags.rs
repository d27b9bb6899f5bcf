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

//! Named entity sets used as query filters.

use ahash::AHashMap;
use ardent_core::ecs::EntityId;

use crate::ecs::SparseIdSet;

/// Tag set by editors on entities that should not be rendered.
pub const HIDDEN: &str = "hidden";
/// Tag set by editors on the current selection.
pub const SELECTED: &str = "selected";

/// Prefix that negates a tag in query filters: `"!hidden"`.
pub const NOT_PREFIX: char = '!';
/// Prefix reserved for engine-managed tags: `"@loading"`.
pub const IMPLICIT_PREFIX: char = '@';

/// Returns `true` for engine-managed tag names, which user code may only read.
pub fn is_tag_implicit(name: &str) -> bool {
    name.starts_with(IMPLICIT_PREFIX)
}

/// Splits a query filter into its tag name and whether it includes or excludes.
pub(crate) fn parse_filter(filter: &str) -> (&str, bool) {
    match filter.strip_prefix(NOT_PREFIX) {
        Some(name) => (name, false),
        None => (filter, true),
    }
}

/// Storage for every tag of a world.
#[derive(Debug, Default, Clone)]
pub struct TagSet {
    tags: AHashMap<String, SparseIdSet>,
}

impl TagSet {
    /// Creates an empty tag storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags `id` with `tag`. Returns `false` if it was already tagged.
    pub fn add(&mut self, id: EntityId, tag: &str) -> bool {
        debug_assert!(
            !tag.starts_with(NOT_PREFIX),
            "Tag names can not start with '{NOT_PREFIX}'"
        );
        match self.tags.get_mut(tag) {
            Some(set) => set.insert(id),
            None => self
                .tags
                .entry(tag.to_string())
                .or_default()
                .insert(id),
        }
    }

    /// Untags `id`. Returns `false` if it was not tagged.
    pub fn remove(&mut self, id: EntityId, tag: &str) -> bool {
        self.tags.get_mut(tag).is_some_and(|set| set.remove(id))
    }

    /// Removes `tag` from every entity.
    pub fn clear(&mut self, tag: &str) {
        if let Some(set) = self.tags.get_mut(tag) {
            set.clear();
        }
    }

    /// Returns `true` if `id` carries `tag`.
    pub fn has(&self, id: EntityId, tag: &str) -> bool {
        self.tags.get(tag).is_some_and(|set| set.contains(id))
    }

    /// The entities carrying `tag`, or `None` if the tag was never used.
    pub fn get(&self, tag: &str) -> Option<&SparseIdSet> {
        self.tags.get(tag)
    }

    /// Drops `id` from every tag.
    pub fn remove_entity(&mut self, id: EntityId) {
        for set in self.tags.values_mut() {
            set.remove(id);
        }
    }

    /// Every tag name ever used, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// The tags carried by `id`.
    pub fn tags_of(&self, id: EntityId) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .filter(move |(_, set)| set.contains(id))
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("hidden"), ("hidden", true));
        assert_eq!(parse_filter("!hidden"), ("hidden", false));
    }

    #[test]
    fn test_implicit_tags() {
        assert!(is_tag_implicit("@loading"));
        assert!(!is_tag_implicit(HIDDEN));
    }

    #[test]
    fn test_tag_lifecycle() {
        let mut tags = TagSet::new();
        let a = EntityId::new(0, 0);
        let b = EntityId::new(1, 0);

        assert!(tags.add(a, SELECTED));
        assert!(!tags.add(a, SELECTED));
        tags.add(b, SELECTED);
        tags.add(b, HIDDEN);

        assert!(tags.has(b, HIDDEN));
        assert_eq!(tags.tags_of(b).count(), 2);

        tags.remove_entity(b);
        assert!(!tags.has(b, SELECTED));

        tags.clear(SELECTED);
        assert!(!tags.has(a, SELECTED));
        assert!(tags.get(SELECTED).is_some_and(|set| set.is_empty()));
        assert!(tags.get("unknown").is_none());
    }
}
