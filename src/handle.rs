//! `Handle` and `HandleTable`: a fixed-capacity arena of native instances.
//!
//! A [`Handle`] is a `(slot, generation)` pair packed into a small
//! non-negative `i32` so it can cross a boundary that only speaks primitive
//! scalars. The generation counter is bumped every time a slot is released,
//! so a stale handle can never alias a newer instance bound into the same
//! slot: out-of-range, inactive, and stale handles are all rejected uniformly
//! as "not usable".
//!
//! The table owns no marshalling logic; it is a slab of
//! `(instance, generation)` slots with explicit lifecycle control. Capacity
//! is a hard ceiling fixed at construction — a deliberate trade-off (O(1)
//! validity check, O(capacity) acquire, bounded memory) over dynamic growth.
//!
//! Acquisition is two-phase: [`HandleTable::reserve`] marks the lowest free
//! slot pending and returns a [`Reservation`] guard; the guard either binds a
//! constructed instance into the slot or, on drop, returns the slot to the
//! free pool. A failed instance construction therefore never leaks a
//! reservation.

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bits of the packed handle that address the slot.
const SLOT_BITS: u32 = 10;
/// Mask for the slot field.
const SLOT_MASK: i32 = (1 << SLOT_BITS) - 1;
/// Mask for the generation field; bit 31 stays clear so packed handles are
/// always non-negative.
const GENERATION_MASK: u32 = (1 << (31 - SLOT_BITS)) - 1;

/// Largest capacity a table may be built with.
pub const MAX_CAPACITY: usize = 1 << SLOT_BITS;

/// Default capacity of the process-wide boundary tables.
pub const DEFAULT_CAPACITY: usize = 64;

static_assertions::const_assert!(DEFAULT_CAPACITY <= MAX_CAPACITY);

/// A validated reference to one live instance in a [`HandleTable`].
///
/// Packs to a small non-negative `i32` via [`raw`](Self::raw); a fresh
/// table's first handles pack to `0, 1, 2, …` (generation zero), matching the
/// boundary convention that `-1` is the "no handle" sentinel.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    pub(crate) fn new(slot: u32, generation: u32) -> Self {
        debug_assert!(slot < MAX_CAPACITY as u32);
        Handle { slot, generation: generation & GENERATION_MASK }
    }

    /// Slot index inside the table.
    #[inline]
    pub fn slot(self) -> usize {
        self.slot as usize
    }

    /// Generation the slot had when this handle was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Pack into the boundary representation: slot in the low bits,
    /// generation above, bit 31 clear.
    #[inline]
    pub fn raw(self) -> i32 {
        ((self.generation << SLOT_BITS) as i32) | self.slot as i32
    }

    /// Unpack a boundary value. Negative values are never handles; validity
    /// against a particular table is checked separately.
    #[inline]
    pub fn from_raw(raw: i32) -> Option<Self> {
        if raw < 0 {
            return None;
        }
        Some(Handle {
            slot: (raw & SLOT_MASK) as u32,
            generation: (raw >> SLOT_BITS) as u32 & GENERATION_MASK,
        })
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("slot", &self.slot)
            .field("generation", &self.generation)
            .finish()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

enum SlotState<T> {
    Empty,
    Reserved,
    Bound(T),
}

struct Slot<T> {
    state: SlotState<T>,
    generation: u32,
}

/// Fixed-capacity arena mapping handles to live instances.
pub struct HandleTable<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    /// Table with the default boundary capacity. Infallible; the default is
    /// const-asserted to lie within the packable slot range.
    pub fn new() -> Self {
        Self::build(DEFAULT_CAPACITY)
    }

    /// Build a table with the given hard capacity.
    ///
    /// # Errors
    /// `CapacityTooLarge` if `capacity` exceeds the packable slot range.
    pub fn with_capacity(capacity: usize) -> Result<Self, BridgeError> {
        if capacity > MAX_CAPACITY {
            return Err(BridgeError::CapacityTooLarge {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(Self::build(capacity))
    }

    fn build(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot { state: SlotState::Empty, generation: 0 });
        HandleTable { slots }
    }

    /// Hard ceiling on concurrently active instances.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of free slots.
    pub fn available(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Empty))
            .count()
    }

    /// Number of slots currently bound to an instance.
    pub fn active(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Bound(_)))
            .count()
    }

    /// Reserve the lowest free slot.
    ///
    /// # Errors
    /// `TableExhausted` if every slot is in use.
    pub fn reserve(&mut self) -> Result<Reservation<'_, T>, BridgeError> {
        let capacity = self.capacity();
        let slot = self
            .slots
            .iter()
            .position(|s| matches!(s.state, SlotState::Empty))
            .ok_or(BridgeError::TableExhausted { capacity })?;
        self.slots[slot].state = SlotState::Reserved;
        Ok(Reservation { table: self, slot: slot as u32, bound: false })
    }

    /// Remove and return the instance behind `handle`, bumping the slot
    /// generation so the handle value goes stale.
    pub fn release(&mut self, handle: Handle) -> Result<T, BridgeError> {
        self.check(handle)?;
        let slot = &mut self.slots[handle.slot()];
        match std::mem::replace(&mut slot.state, SlotState::Empty) {
            SlotState::Bound(value) => {
                slot.generation = slot.generation.wrapping_add(1) & GENERATION_MASK;
                Ok(value)
            }
            // check() only passes for bound slots.
            other => {
                slot.state = other;
                Err(BridgeError::InvalidHandle(handle.raw()))
            }
        }
    }

    /// Validated shared access.
    pub fn get(&self, handle: Handle) -> Result<&T, BridgeError> {
        self.check(handle)?;
        match &self.slots[handle.slot()].state {
            SlotState::Bound(value) => Ok(value),
            _ => Err(BridgeError::InvalidHandle(handle.raw())),
        }
    }

    /// Validated exclusive access.
    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T, BridgeError> {
        self.check(handle)?;
        match &mut self.slots[handle.slot()].state {
            SlotState::Bound(value) => Ok(value),
            _ => Err(BridgeError::InvalidHandle(handle.raw())),
        }
    }

    /// Whether `handle` currently refers to a live instance.
    pub fn is_valid(&self, handle: Handle) -> bool {
        self.check(handle).is_ok()
    }

    fn check(&self, handle: Handle) -> Result<(), BridgeError> {
        let stale = BridgeError::InvalidHandle(handle.raw());
        let slot = self.slots.get(handle.slot()).ok_or(stale.clone())?;
        if slot.generation != handle.generation() {
            return Err(stale);
        }
        match slot.state {
            SlotState::Bound(_) => Ok(()),
            _ => Err(stale),
        }
    }
}

/// Guard for a pending slot: bind an instance or roll the slot back on drop.
pub struct Reservation<'a, T> {
    table: &'a mut HandleTable<T>,
    slot: u32,
    bound: bool,
}

impl<'a, T> Reservation<'a, T> {
    /// Bind `value` into the reserved slot and issue its handle.
    pub fn bind(mut self, value: T) -> Handle {
        let slot = &mut self.table.slots[self.slot as usize];
        slot.state = SlotState::Bound(value);
        self.bound = true;
        Handle::new(self.slot, slot.generation)
    }

    /// Slot index this reservation holds, for diagnostics.
    pub fn slot(&self) -> usize {
        self.slot as usize
    }
}

impl<'a, T> core::fmt::Debug for Reservation<'a, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Reservation")
            .field("slot", &self.slot)
            .field("bound", &self.bound)
            .finish()
    }
}

impl<'a, T> Drop for Reservation<'a, T> {
    fn drop(&mut self) {
        if !self.bound {
            self.table.slots[self.slot as usize].state = SlotState::Empty;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> HandleTable<String> {
        HandleTable::with_capacity(4).unwrap()
    }

    #[test]
    fn bind_then_release_round_trips_the_instance() {
        let mut table = small_table();
        let h = table.reserve().unwrap().bind("mesh".to_owned());
        assert_eq!(h.raw(), 0);
        assert_eq!(table.get(h).unwrap(), "mesh");
        assert_eq!(table.active(), 1);
        assert_eq!(table.release(h).unwrap(), "mesh");
        assert_eq!(table.active(), 0);
        assert_eq!(table.available(), 4);
    }

    #[test]
    fn dropped_reservation_returns_slot_to_free_pool() {
        let mut table = small_table();
        {
            let reservation = table.reserve().unwrap();
            assert_eq!(reservation.slot(), 0);
        }
        assert_eq!(table.available(), 4);
        // The rolled-back slot is handed out again, lowest index first.
        let h = table.reserve().unwrap().bind("m".to_owned());
        assert_eq!(h.slot(), 0);
    }

    #[test]
    fn exhausted_table_reports_capacity() {
        let mut table = small_table();
        let mut handles = Vec::new();
        for _ in 0..4 {
            handles.push(table.reserve().unwrap().bind(String::new()));
        }
        assert_eq!(table.available(), 0);
        match table.reserve() {
            Err(BridgeError::TableExhausted { capacity }) => assert_eq!(capacity, 4),
            other => panic!("expected exhaustion, got {other:?}"),
        }
        // Releasing one slot makes acquire succeed again.
        table.release(handles[2]).unwrap();
        assert_eq!(table.reserve().unwrap().bind(String::new()).slot(), 2);
    }

    #[test]
    fn stale_handle_is_rejected_after_slot_reuse() {
        let mut table = small_table();
        let first = table.reserve().unwrap().bind("old".to_owned());
        table.release(first).unwrap();
        let second = table.reserve().unwrap().bind("new".to_owned());
        assert_eq!(second.slot(), first.slot());
        assert_ne!(second.raw(), first.raw());
        assert!(!table.is_valid(first));
        assert!(table.is_valid(second));
        assert!(matches!(table.get(first), Err(BridgeError::InvalidHandle(_))));
        assert_eq!(table.get(second).unwrap(), "new");
    }

    #[test]
    fn double_release_fails_without_touching_the_new_occupant() {
        let mut table = small_table();
        let h = table.reserve().unwrap().bind("a".to_owned());
        table.release(h).unwrap();
        assert!(table.release(h).is_err());
        let again = table.reserve().unwrap().bind("b".to_owned());
        assert!(table.release(h).is_err());
        assert_eq!(table.get(again).unwrap(), "b");
    }

    #[test]
    fn out_of_range_and_negative_raw_values_are_invalid() {
        let table = small_table();
        assert!(Handle::from_raw(-1).is_none());
        let beyond = Handle::from_raw(100).unwrap();
        assert!(!table.is_valid(beyond));
    }

    #[test]
    fn capacity_ceiling_is_enforced() {
        assert!(HandleTable::<u8>::with_capacity(MAX_CAPACITY).is_ok());
        assert!(matches!(
            HandleTable::<u8>::with_capacity(MAX_CAPACITY + 1),
            Err(BridgeError::CapacityTooLarge { .. })
        ));
    }

    #[test]
    fn default_table_carries_the_boundary_capacity() {
        let table = HandleTable::<u8>::new();
        assert_eq!(table.capacity(), DEFAULT_CAPACITY);
        assert_eq!(table.available(), DEFAULT_CAPACITY);
    }

    #[test]
    fn packed_handles_round_trip_and_stay_non_negative() {
        for slot in [0u32, 63, 1023] {
            for generation in [0u32, 1, GENERATION_MASK] {
                let h = Handle::new(slot, generation);
                assert!(h.raw() >= 0);
                assert_eq!(Handle::from_raw(h.raw()), Some(h));
            }
        }
    }

    #[test]
    fn handle_serde_round_trip() {
        let h = Handle::new(5, 7);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(serde_json::from_str::<Handle>(&json).unwrap(), h);
    }
}
