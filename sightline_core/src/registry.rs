// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracked item storage with generational handles.
//!
//! Items live in a slot arena addressed by [`ItemId`]. Removing an item frees
//! its slot and bumps the slot's generation, so the removed handle goes stale
//! while every other handle keeps working. Freed slots are recycled.
//!
//! An element maps to at most one live item. Adding an element that is
//! already tracked replaces the old entry: its handle goes stale and the new
//! entry starts from the default state at the end of the iteration order.
//!
//! Iteration follows insertion order. The order list drops stale handles
//! lazily, so removal does not shift anything.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::options::ItemOptions;
use crate::side::Side;
use crate::visibility::Offset;

/// Stale order entries tolerated before the order list is compacted.
const COMPACT_THRESHOLD: usize = 32;

/// A handle to an item in a [`Registry`].
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after an item is removed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ItemId {
    /// Rebuilds a handle from its raw parts, e.g. when decoding a recording.
    ///
    /// The result only resolves against the registry that issued it.
    #[inline]
    #[must_use]
    pub const fn from_raw(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({}@gen{})", self.idx, self.generation)
    }
}

/// State kept for one tracked element.
pub struct TrackedItem<E, D> {
    pub(crate) id: ItemId,
    pub(crate) element: E,
    pub(crate) options: ItemOptions<E, D>,
    pub(crate) on_screen: bool,
    pub(crate) side: Side,
    pub(crate) offset: Offset,
    /// Presentation classes this item last put on its element.
    pub(crate) applied_classes: Vec<String>,
}

impl<E, D> TrackedItem<E, D> {
    fn new(id: ItemId, element: E, options: ItemOptions<E, D>) -> Self {
        Self {
            id,
            element,
            options,
            on_screen: false,
            side: Side::default(),
            offset: Offset::default(),
            applied_classes: Vec::new(),
        }
    }

    /// This item's handle.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// The tracked element.
    #[must_use]
    pub fn element(&self) -> &E {
        &self.element
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &ItemOptions<E, D> {
        &self.options
    }

    /// The last published verdict.
    #[must_use]
    pub fn is_on_screen(&self) -> bool {
        self.on_screen
    }

    /// The last off-screen side (initially [`Side::Bottom`]).
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Offsets from the latest evaluation.
    #[must_use]
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Classes this item currently has applied to its element.
    #[must_use]
    pub fn applied_classes(&self) -> &[String] {
        &self.applied_classes
    }
}

impl<E: fmt::Debug, D: fmt::Debug> fmt::Debug for TrackedItem<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedItem")
            .field("id", &self.id)
            .field("element", &self.element)
            .field("options", &self.options)
            .field("on_screen", &self.on_screen)
            .field("side", &self.side)
            .field("offset", &self.offset)
            .field("applied_classes", &self.applied_classes)
            .finish()
    }
}

/// Slot arena of [`TrackedItem`]s indexed by element.
pub struct Registry<E, D> {
    slots: Vec<Option<TrackedItem<E, D>>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    order: Vec<ItemId>,
    stale_in_order: usize,
    by_element: HashMap<E, ItemId>,
}

impl<E, D> fmt::Debug for Registry<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.by_element.len())
            .field("slots", &self.slots.len())
            .field("free", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl<E: Clone + Eq + Hash, D> Default for Registry<E, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + Eq + Hash, D> Registry<E, D> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            order: Vec::new(),
            stale_in_order: 0,
            by_element: HashMap::new(),
        }
    }

    /// Number of live items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_element.len()
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_element.is_empty()
    }

    /// Starts tracking `element`, replacing any existing entry for it.
    ///
    /// A replaced entry hands its applied classes to the new one, so the
    /// next transition still removes them from the element.
    pub fn insert(&mut self, element: E, options: ItemOptions<E, D>) -> &mut TrackedItem<E, D> {
        let carried = match self.by_element.get(&element).copied() {
            Some(existing) => self
                .remove_id(existing)
                .map(|old| old.applied_classes)
                .unwrap_or_default(),
            None => Vec::new(),
        };

        let idx = if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            #[expect(clippy::cast_possible_truncation, reason = "slot count fits in u32")]
            let idx = self.slots.len() as u32;
            self.slots.push(None);
            self.generation.push(0);
            idx
        };

        let id = ItemId {
            idx,
            generation: self.generation[idx as usize],
        };
        self.by_element.insert(element.clone(), id);
        self.order.push(id);
        let mut item = TrackedItem::new(id, element, options);
        item.applied_classes = carried;
        self.slots[idx as usize].insert(item)
    }

    /// Returns whether the given handle refers to a live item.
    #[must_use]
    pub fn is_alive(&self, id: ItemId) -> bool {
        let i = id.idx as usize;
        i < self.slots.len() && self.generation[i] == id.generation && self.slots[i].is_some()
    }

    /// The handle currently tracking `element`.
    #[must_use]
    pub fn lookup(&self, element: &E) -> Option<ItemId> {
        self.by_element.get(element).copied()
    }

    /// The item behind `id`, unless the handle is stale.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&TrackedItem<E, D>> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.idx as usize].as_ref()
    }

    /// Mutable access to the item behind `id`, unless the handle is stale.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut TrackedItem<E, D>> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.idx as usize].as_mut()
    }

    /// The item tracking `element`.
    #[must_use]
    pub fn find(&self, element: &E) -> Option<&TrackedItem<E, D>> {
        self.get(self.lookup(element)?)
    }

    /// Replaces the options of the item tracking `element` without merging.
    ///
    /// Returns `None` (and drops `options`) when `element` is not tracked.
    pub fn set_options(&mut self, element: &E, options: ItemOptions<E, D>) -> Option<&TrackedItem<E, D>> {
        let id = self.lookup(element)?;
        let item = self.get_mut(id)?;
        item.options = options;
        Some(item)
    }

    /// Stops tracking `element`. Unknown elements are ignored.
    pub fn remove(&mut self, element: &E) -> Option<TrackedItem<E, D>> {
        let id = self.lookup(element)?;
        self.remove_id(id)
    }

    /// Removes the item behind `id`. Stale handles are ignored.
    pub fn remove_id(&mut self, id: ItemId) -> Option<TrackedItem<E, D>> {
        if !self.is_alive(id) {
            return None;
        }
        let i = id.idx as usize;
        let item = self.slots[i].take()?;
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(id.idx);
        self.by_element.remove(&item.element);

        self.stale_in_order += 1;
        if self.stale_in_order > COMPACT_THRESHOLD && self.stale_in_order * 2 > self.order.len() {
            self.compact_order();
        }
        Some(item)
    }

    /// Drops every item. Outstanding handles all go stale.
    pub fn clear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.generation[i] = self.generation[i].wrapping_add(1);
                #[expect(clippy::cast_possible_truncation, reason = "slot count fits in u32")]
                self.free_list.push(i as u32);
            }
        }
        self.order.clear();
        self.stale_in_order = 0;
        self.by_element.clear();
    }

    /// Live handles in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.order.iter().copied().filter(|&id| self.is_alive(id))
    }

    /// Live items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedItem<E, D>> + '_ {
        self.order.iter().filter_map(|&id| self.get(id))
    }

    /// Copies the live handles, for iteration that outlives a borrow.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ItemId> {
        self.ids().collect()
    }

    fn compact_order(&mut self) {
        let Self { order, slots, generation, .. } = self;
        order.retain(|id| {
            let i = id.idx as usize;
            generation[i] == id.generation && slots[i].is_some()
        });
        self.stale_in_order = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    type Reg = Registry<&'static str, u32>;

    fn opts(data: u32) -> ItemOptions<&'static str, u32> {
        ItemOptions {
            data: Some(data),
            ..ItemOptions::default()
        }
    }

    #[test]
    fn new_items_start_off_screen_at_bottom() {
        let mut reg = Reg::new();
        let id = reg.insert("a", opts(1)).id();
        let item = reg.get(id).unwrap();
        assert!(!item.is_on_screen());
        assert_eq!(item.side(), Side::Bottom);
        assert_eq!(item.element(), &"a");
        assert_eq!(item.options().data, Some(1));
    }

    #[test]
    fn removal_keeps_other_handles_valid() {
        let mut reg = Reg::new();
        let a = reg.insert("a", opts(1)).id();
        let b = reg.insert("b", opts(2)).id();
        let c = reg.insert("c", opts(3)).id();

        assert!(reg.remove(&"a").is_some());
        assert!(!reg.is_alive(a));
        assert_eq!(reg.lookup(&"b"), Some(b));
        assert_eq!(reg.lookup(&"c"), Some(c));
        assert_eq!(reg.get(c).unwrap().options().data, Some(3));
        assert_eq!(reg.snapshot(), vec![b, c]);
    }

    #[test]
    fn reused_slots_do_not_revive_stale_handles() {
        let mut reg = Reg::new();
        let a = reg.insert("a", opts(1)).id();
        reg.remove_id(a);
        let b = reg.insert("b", opts(2)).id();
        assert_eq!(a.index(), b.index(), "slot is recycled");
        assert_ne!(a.generation(), b.generation());
        assert!(reg.get(a).is_none());
        assert!(reg.remove_id(a).is_none());
        assert!(reg.is_alive(b));
    }

    #[test]
    fn unknown_elements_are_no_ops() {
        let mut reg = Reg::new();
        reg.insert("a", opts(1));
        assert!(reg.remove(&"zzz").is_none());
        assert!(reg.set_options(&"zzz", opts(9)).is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn set_options_replaces_wholesale() {
        let mut reg = Reg::new();
        reg.insert(
            "a",
            ItemOptions {
                screen_enter_class: String::from("custom"),
                ..opts(1)
            },
        );
        let item = reg.set_options(&"a", opts(2)).unwrap();
        assert_eq!(item.options().data, Some(2));
        assert_eq!(item.options().screen_enter_class, "js-screenenter");
    }

    #[test]
    fn duplicate_insert_replaces_previous_entry() {
        let mut reg = Reg::new();
        let first = reg.insert("a", opts(1)).id();
        let other = reg.insert("b", opts(2)).id();
        reg.get_mut(first).unwrap().on_screen = true;

        let second = reg.insert("a", opts(3)).id();
        assert_eq!(reg.len(), 2);
        assert!(!reg.is_alive(first));
        assert_eq!(reg.lookup(&"a"), Some(second));
        let item = reg.get(second).unwrap();
        assert!(!item.is_on_screen(), "replacement starts fresh");
        assert_eq!(item.options().data, Some(3));
        assert_eq!(reg.snapshot(), vec![other, second]);
    }

    #[test]
    fn clear_stales_every_handle() {
        let mut reg = Reg::new();
        let a = reg.insert("a", opts(1)).id();
        let b = reg.insert("b", opts(2)).id();
        reg.clear();
        assert!(reg.is_empty());
        assert!(!reg.is_alive(a));
        assert!(!reg.is_alive(b));
        assert_eq!(reg.ids().count(), 0);

        let c = reg.insert("a", opts(3)).id();
        assert!(reg.is_alive(c));
        assert!(!reg.is_alive(a));
    }

    #[test]
    fn iteration_survives_heavy_churn() {
        let names: [&'static str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let mut reg = Reg::new();
        for round in 0..20_u32 {
            for (i, &name) in names.iter().enumerate() {
                let i = u32::try_from(i).unwrap();
                reg.insert(name, opts(round * 10 + i));
            }
            for name in &names[..6] {
                reg.remove(name);
            }
        }
        assert_eq!(reg.len(), 2);
        let data: Vec<_> = reg.iter().map(|item| item.options().data).collect();
        assert_eq!(data, vec![Some(196), Some(197)]);
    }
}
