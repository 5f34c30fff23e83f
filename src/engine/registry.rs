// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Generational component arena and id types.
//!
//! Components are created by allocation and consumed by merges; they are
//! never split. Merged-away ids must not dereference a reused slot, so every
//! slot carries a generation counter and handles from retired slots fail with
//! `StaleComponent`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::error::{Error, Result};

/// Opaque id of one two-level degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegisterId(pub u64);

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reg#{}", self.0)
    }
}

/// Generational handle to a component slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    pub index: u32,
    pub generation: u32,
}

impl ComponentId {
    /// Placeholder for components not yet inserted into an arena.
    pub const UNSET: ComponentId = ComponentId {
        index: u32::MAX,
        generation: u32::MAX,
    };
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}v{}", self.index, self.generation)
    }
}

struct Slot {
    generation: u32,
    component: Option<Component>,
}

/// Arena of live components, indexed by generational id.
#[derive(Default)]
pub struct ComponentArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ComponentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component, stamping its id.
    pub fn insert(&mut self, mut component: Component) -> ComponentId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    component: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = ComponentId {
            index,
            generation: slot.generation,
        };
        component.id = id;
        slot.component = Some(component);
        id
    }

    pub fn get(&self, id: ComponentId) -> Result<&Component> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.component.as_ref())
            .ok_or(Error::StaleComponent(id))
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Result<&mut Component> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.component.as_mut())
            .ok_or(Error::StaleComponent(id))
    }

    /// Remove a component, retiring its slot (generation bump).
    pub fn remove(&mut self, id: ComponentId) -> Result<Component> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .ok_or(Error::StaleComponent(id))?;
        let component = slot.component.take().ok_or(Error::StaleComponent(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Ok(component)
    }

    /// Ids of all live components.
    pub fn live_ids(&self) -> Vec<ComponentId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.component.is_some())
            .map(|(index, slot)| ComponentId {
                index: index as u32,
                generation: slot.generation,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.component.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::table::LabelId;

    fn component(reg: u64) -> Component {
        Component::new_pure(RegisterId(reg), (LabelId(0), LabelId(1)))
    }

    #[test]
    fn test_insert_and_get() {
        let mut arena = ComponentArena::new();
        let id = arena.insert(component(0));
        assert_eq!(arena.get(id).unwrap().registers(), &[RegisterId(0)]);
        assert_eq!(arena.get(id).unwrap().id, id);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_removed_handle_goes_stale() {
        let mut arena = ComponentArena::new();
        let id = arena.insert(component(0));
        arena.remove(id).unwrap();
        assert!(matches!(arena.get(id), Err(Error::StaleComponent(_))));
        assert!(matches!(arena.remove(id), Err(Error::StaleComponent(_))));
    }

    #[test]
    fn test_reused_slot_rejects_old_generation() {
        let mut arena = ComponentArena::new();
        let old = arena.insert(component(0));
        arena.remove(old).unwrap();
        let new = arena.insert(component(1));
        // Same slot, new generation
        assert_eq!(old.index, new.index);
        assert_ne!(old.generation, new.generation);
        assert!(arena.get(old).is_err());
        assert!(arena.get(new).is_ok());
    }

    #[test]
    fn test_live_ids_skips_retired_slots() {
        let mut arena = ComponentArena::new();
        let a = arena.insert(component(0));
        let b = arena.insert(component(1));
        arena.remove(a).unwrap();
        let live = arena.live_ids();
        assert_eq!(live, vec![b]);
    }
}
