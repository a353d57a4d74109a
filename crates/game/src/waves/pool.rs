//! Fixed-capacity unit pool and the resumable batch cursor.

use std::ops::Range;

use super::config::UnitConfig;
use super::error::WaveError;

/// Lifecycle of an allocated slot within one wave.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotStatus {
    /// Allocated and inactive
    Pooled,
    /// Bound to an active unit
    Live(UnitConfig),
    /// Killed this wave, inactive until the pool is cleared
    Dead,
}

#[derive(Debug)]
pub struct Slot<H> {
    pub handle: H,
    pub status: SlotStatus,
}

/// Pool of unit handles. A slot is `Some` iff it holds an allocated unit;
/// the slot index identifies the unit for the whole wave.
#[derive(Debug)]
pub struct UnitPool<H> {
    slots: Vec<Option<Slot<H>>>,
}

impl<H> UnitPool<H> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn allocated(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn live(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| matches!(s.status, SlotStatus::Live(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    pub fn get(&self, slot: usize) -> Option<&Slot<H>> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    pub fn is_vacant(&self, slot: usize) -> bool {
        matches!(self.slots.get(slot), Some(None))
    }

    /// Indices of every allocated slot, ascending.
    pub fn populated_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| i))
            .collect()
    }

    /// Stores a freshly created handle in a vacant slot.
    pub fn insert(&mut self, slot: usize, handle: H) -> Result<(), WaveError> {
        let capacity = self.capacity();
        match self.slots.get_mut(slot) {
            None => Err(WaveError::SlotOutOfRange { slot, capacity }),
            Some(Some(_)) => Err(WaveError::SlotOccupied(slot)),
            Some(entry) => {
                *entry = Some(Slot {
                    handle,
                    status: SlotStatus::Pooled,
                });
                Ok(())
            }
        }
    }

    /// Empties a slot, handing the unit back to the caller.
    pub fn take(&mut self, slot: usize) -> Option<Slot<H>> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Binds an allocated, non-live slot to `config`.
    pub fn bind(&mut self, slot: usize, config: UnitConfig) -> Result<&H, WaveError> {
        let entry = self.slot_mut(slot)?;
        if matches!(entry.status, SlotStatus::Live(_)) {
            return Err(WaveError::SlotAlreadyLive(slot));
        }
        entry.status = SlotStatus::Live(config);
        Ok(&entry.handle)
    }

    /// Returns a slot to the inactive state. The flag tells whether it was live.
    pub fn release(&mut self, slot: usize) -> Result<(&H, bool), WaveError> {
        let entry = self.slot_mut(slot)?;
        let was_live = matches!(entry.status, SlotStatus::Live(_));
        entry.status = SlotStatus::Pooled;
        Ok((&entry.handle, was_live))
    }

    /// Marks a live slot dead. `None` when the slot was not live.
    pub fn mark_dead(&mut self, slot: usize) -> Option<&H> {
        let entry = self.slots.get_mut(slot)?.as_mut()?;
        if !matches!(entry.status, SlotStatus::Live(_)) {
            return None;
        }
        entry.status = SlotStatus::Dead;
        Some(&entry.handle)
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut Slot<H>, WaveError> {
        let capacity = self.capacity();
        match self.slots.get_mut(slot) {
            None => Err(WaveError::SlotOutOfRange { slot, capacity }),
            Some(None) => Err(WaveError::SlotNotAllocated(slot)),
            Some(Some(entry)) => Ok(entry),
        }
    }
}

/// Saved progress of a multi-tick batch operation over `0..target`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCursor {
    next_slot_index: usize,
    target: usize,
}

impl BatchCursor {
    pub fn new(target: usize) -> Self {
        Self {
            next_slot_index: 0,
            target,
        }
    }

    /// Range of work for this tick, at most `batch_size` long.
    pub fn step(&mut self, batch_size: usize) -> Range<usize> {
        let start = self.next_slot_index;
        let end = start.saturating_add(batch_size).min(self.target);
        self.next_slot_index = end;
        start..end
    }

    pub fn is_done(&self) -> bool {
        self.next_slot_index >= self.target
    }

    pub fn remaining(&self) -> usize {
        self.target.saturating_sub(self.next_slot_index)
    }
}
