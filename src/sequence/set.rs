use crate::{
    arena::{Arena, Key},
    error::{DataResult, OwnershipError},
    sequence::Sequence,
};

/// A handle to a sequence owned by a [`SequenceSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(Key);

#[derive(Debug)]
struct SequenceSlot {
    sequence: Sequence,
    prev: Option<SequenceId>,
    next: Option<SequenceId>,
}

#[doc = r#"
An ordered collection of sibling sequences.

# Example
```rust
# use mididata::prelude::*;
let mut set = SequenceSet::new();
let intro = set.push(Sequence::new(Format::SequentiallyIndependent, Timing::default()));
let verse = set.push(Sequence::default());

assert_eq!(set.next(intro), Some(verse));
let removed = set.remove(intro).unwrap();
assert_eq!(removed.format(), Format::SequentiallyIndependent);
assert_eq!(set.first(), Some(verse));
```
"#]
#[derive(Debug, Default)]
pub struct SequenceSet {
    sequences: Arena<SequenceSlot>,
    first: Option<SequenceId>,
    last: Option<SequenceId>,
}

impl SequenceSet {
    /// An empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sequence
    pub fn push(&mut self, sequence: Sequence) -> SequenceId {
        let id = SequenceId(self.sequences.insert(SequenceSlot {
            sequence,
            prev: self.last,
            next: None,
        }));
        match self.last {
            Some(last) => self.sequences[last.0].next = Some(id),
            None => self.first = Some(id),
        }
        self.last = Some(id);
        id
    }

    /// Take a sequence out of the set, linking its neighbours together
    pub fn remove(&mut self, id: SequenceId) -> DataResult<Sequence> {
        let Some(slot) = self.sequences.remove(id.0) else {
            return Err(OwnershipError::UnknownSequence(id).into());
        };
        match slot.prev {
            Some(prev) => self.sequences[prev.0].next = slot.next,
            None => self.first = slot.next,
        }
        match slot.next {
            Some(next) => self.sequences[next.0].prev = slot.prev,
            None => self.last = slot.prev,
        }
        Ok(slot.sequence)
    }

    /// The sequence behind a handle
    pub fn get(&self, id: SequenceId) -> Option<&Sequence> {
        self.sequences.get(id.0).map(|slot| &slot.sequence)
    }

    /// The sequence behind a handle, mutably
    pub fn get_mut(&mut self, id: SequenceId) -> Option<&mut Sequence> {
        self.sequences.get_mut(id.0).map(|slot| &mut slot.sequence)
    }

    /// The first sequence
    pub fn first(&self) -> Option<SequenceId> {
        self.first
    }

    /// The last sequence
    pub fn last(&self) -> Option<SequenceId> {
        self.last
    }

    /// The sequence after `id`
    pub fn next(&self, id: SequenceId) -> Option<SequenceId> {
        self.sequences.get(id.0)?.next
    }

    /// The sequence before `id`
    pub fn prev(&self, id: SequenceId) -> Option<SequenceId> {
        self.sequences.get(id.0)?.prev
    }

    /// Iterate over the sequences in order
    pub fn iter(&self) -> impl Iterator<Item = (SequenceId, &Sequence)> + '_ {
        let mut cursor = self.first;
        core::iter::from_fn(move || {
            let id = cursor?;
            let slot = self.sequences.get(id.0)?;
            cursor = slot.next;
            Some((id, &slot.sequence))
        })
    }

    /// The number of sequences
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Returns true if the set holds no sequence
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[test]
fn siblings_stay_linked() {
    use pretty_assertions::assert_eq;
    let mut set = SequenceSet::new();
    let a = set.push(Sequence::default());
    let b = set.push(Sequence::default());
    let c = set.push(Sequence::default());
    assert_eq!(set.len(), 3);

    set.remove(b).unwrap();
    assert_eq!(set.next(a), Some(c));
    assert_eq!(set.prev(c), Some(a));
    assert_eq!(
        set.remove(b).map(|_| ()),
        Err(OwnershipError::UnknownSequence(b).into())
    );
    let order: Vec<SequenceId> = set.iter().map(|(id, _)| id).collect();
    assert_eq!(order, [a, c]);

    set.remove(a).unwrap();
    set.remove(c).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.first(), None);
    assert_eq!(set.last(), None);
}
