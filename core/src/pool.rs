//! Generational object pool used to recycle simulation entities.

use crate::ContractViolation;

/// Identifier of the pool that issued a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u32);

impl PoolId {
    /// Creates a new pool identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reference to an entry owned by a [`Pool`].
///
/// Handles carry the issuing pool and the slot generation so that releases
/// into the wrong pool, or of an already released entry, are detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pool: PoolId,
    slot: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot-reusing store that owns entities of a single kind.
#[derive(Debug)]
pub struct Pool<T> {
    id: PoolId,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Pool<T> {
    /// Creates an empty pool tagged with the provided identifier.
    #[must_use]
    pub fn new(id: PoolId) -> Self {
        Self {
            id,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Identifier stamped onto every handle issued by the pool.
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Number of live entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Reports whether the pool holds no live entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Stores the value in a recycled or fresh slot and returns its handle.
    pub fn acquire(&mut self, value: T) -> Handle {
        self.live += 1;
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.value = Some(value);
            return Handle {
                pool: self.id,
                slot,
                generation: entry.generation,
            };
        }

        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle {
            pool: self.id,
            slot,
            generation: 0,
        }
    }

    /// Removes the entry referenced by `handle`, returning it to the caller.
    pub fn release(&mut self, handle: Handle) -> Result<T, ContractViolation> {
        if handle.pool != self.id {
            return Err(ContractViolation::ForeignHandle {
                expected: self.id,
                found: handle.pool,
            });
        }

        let entry = self
            .slots
            .get_mut(handle.slot as usize)
            .filter(|entry| entry.generation == handle.generation)
            .ok_or(ContractViolation::StaleHandle { handle })?;
        let value = entry
            .value
            .take()
            .ok_or(ContractViolation::StaleHandle { handle })?;

        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(handle.slot);
        self.live -= 1;
        Ok(value)
    }

    /// Borrows the entry referenced by `handle`, if it is still live.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        if handle.pool != self.id {
            return None;
        }
        self.slots
            .get(handle.slot as usize)
            .filter(|entry| entry.generation == handle.generation)
            .and_then(|entry| entry.value.as_ref())
    }

    /// Mutably borrows the entry referenced by `handle`, if it is still live.
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if handle.pool != self.id {
            return None;
        }
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|entry| entry.generation == handle.generation)
            .and_then(|entry| entry.value.as_mut())
    }

    /// Iterates over live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        let pool = self.id;
        self.slots.iter().enumerate().filter_map(move |(slot, entry)| {
            entry.value.as_ref().map(|value| {
                (
                    Handle {
                        pool,
                        slot: slot as u32,
                        generation: entry.generation,
                    },
                    value,
                )
            })
        })
    }

    /// Collects the handles of all live entries in slot order.
    #[must_use]
    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(handle, _)| handle).collect()
    }
}
