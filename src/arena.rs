//! Generational slot storage behind the event, track and sequence handles.

use core::ops::{Index, IndexMut};

/// A slot index paired with the generation it was issued for.
///
/// Freeing a slot bumps its generation, so a key outlives its value only as a
/// stale key that no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Key {
    slot: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub(crate) fn insert(&mut self, value: T) -> Key {
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.value = Some(value);
            return Key {
                slot,
                generation: entry.generation,
            };
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Key {
            slot,
            generation: 0,
        }
    }

    pub(crate) fn remove(&mut self, key: Key) -> Option<T> {
        let entry = self.slots.get_mut(key.slot as usize)?;
        if entry.generation != key.generation {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(key.slot);
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, key: Key) -> Option<&T> {
        self.slots
            .get(key.slot as usize)
            .filter(|entry| entry.generation == key.generation)
            .and_then(|entry| entry.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        self.slots
            .get_mut(key.slot as usize)
            .filter(|entry| entry.generation == key.generation)
            .and_then(|entry| entry.value.as_mut())
    }

    pub(crate) fn contains(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Free every slot, invalidating every key issued so far
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            if entry.value.take().is_some() {
                entry.generation = entry.generation.wrapping_add(1);
            }
            self.free.push(slot as u32);
        }
        self.len = 0;
    }
}

/// Keys handed out by the owning container are always live: a stale key is a bug
/// in the container, not in the caller.
impl<T> Index<Key> for Arena<T> {
    type Output = T;

    fn index(&self, key: Key) -> &T {
        match self.get(key) {
            Some(value) => value,
            None => panic!("stale arena key {key:?}"),
        }
    }
}

impl<T> IndexMut<Key> for Arena<T> {
    fn index_mut(&mut self, key: Key) -> &mut T {
        match self.get_mut(key) {
            Some(value) => value,
            None => panic!("stale arena key {key:?}"),
        }
    }
}

#[test]
fn removed_keys_go_stale() {
    use pretty_assertions::assert_eq;
    let mut arena = Arena::default();
    let a = arena.insert("a");
    let b = arena.insert("b");
    assert_eq!(arena.remove(a), Some("a"));
    assert_eq!(arena.get(a), None);

    // the slot is reused under a new generation
    let c = arena.insert("c");
    assert_ne!(a, c);
    assert_eq!(arena.get(c), Some(&"c"));
    assert_eq!(arena.len(), 2);

    arena.clear();
    assert!(!arena.contains(b));
    assert!(!arena.contains(c));
    assert_eq!(arena.len(), 0);
}
