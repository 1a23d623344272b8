//! Property-based tests for the queue
//!
//! Uses proptest to verify the index-bookkeeping invariants across many
//! random operation sequences: ids stay unique, the current index stays
//! in range, and the current entry keeps denoting the same logical track
//! unless that exact entry was removed.

mod common;

use common::track;
use proptest::prelude::*;
use std::collections::HashSet;
use vesper_playback::Queue;

// ===== Operation Model =====

#[derive(Debug, Clone)]
enum Op {
    Add { count: usize, before_slot: usize },
    Remove { slots: Vec<usize> },
    Jump(usize),
    Next,
    Previous,
    Move { from_slot: usize, to_slot: usize },
    RemoveUpcoming,
    RemovePrevious,
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1usize..4, 0usize..64).prop_map(|(count, before_slot)| Op::Add { count, before_slot }),
        prop::collection::vec(0usize..64, 1..4).prop_map(|slots| Op::Remove { slots }),
        (0usize..64).prop_map(Op::Jump),
        Just(Op::Next),
        Just(Op::Previous),
        (0usize..64, 0usize..64).prop_map(|(from_slot, to_slot)| Op::Move { from_slot, to_slot }),
        Just(Op::RemoveUpcoming),
        Just(Op::RemovePrevious),
        Just(Op::Clear),
    ]
}

/// Resolve a random slot to a live index
fn index_for(queue: &Queue, slot: usize) -> Option<usize> {
    if queue.is_empty() {
        None
    } else {
        Some(slot % queue.len())
    }
}

fn apply(queue: &mut Queue, op: &Op, counter: &mut usize) {
    match op {
        Op::Add { count, before_slot } => {
            let before = index_for(queue, *before_slot).and_then(|index| {
                // half the time insert before an existing entry
                if before_slot % 2 == 0 {
                    queue.get(index).map(|item| item.id)
                } else {
                    None
                }
            });
            let tracks = (0..*count)
                .map(|_| {
                    *counter += 1;
                    track(&format!("t{counter}"))
                })
                .collect();
            queue.add(tracks, before);
        }
        Op::Remove { slots } => {
            let ids: Vec<_> = slots
                .iter()
                .filter_map(|slot| index_for(queue, *slot))
                .filter_map(|index| queue.get(index).map(|item| item.id))
                .collect();
            queue.remove(&ids);
        }
        Op::Jump(slot) => {
            if let Some(index) = index_for(queue, *slot) {
                queue.jump(index).unwrap();
            }
        }
        Op::Next => {
            queue.next().ok();
        }
        Op::Previous => {
            queue.previous().ok();
        }
        Op::Move { from_slot, to_slot } => {
            if let (Some(from), Some(to)) = (index_for(queue, *from_slot), index_for(queue, *to_slot))
            {
                queue.move_item(from, to).ok();
            }
        }
        Op::RemoveUpcoming => queue.remove_upcoming(),
        Op::RemovePrevious => queue.remove_previous(),
        Op::Clear => queue.clear(),
    }
}

/// Whether this operation is allowed to change which entry is current
fn may_change_current(op: &Op, queue_before: &Queue) -> bool {
    match op {
        Op::Jump(_) | Op::Next | Op::Previous | Op::Clear => true,
        Op::Remove { slots } => {
            // only when the current entry itself is picked
            let Some(current) = queue_before.current() else {
                return false;
            };
            slots
                .iter()
                .filter_map(|slot| index_for(queue_before, *slot))
                .filter_map(|index| queue_before.get(index))
                .any(|item| item.id == current.id)
        }
        Op::Add { .. } | Op::Move { .. } | Op::RemoveUpcoming | Op::RemovePrevious => false,
    }
}

// ===== Properties =====

proptest! {
    /// Ids stay unique and the current index stays in range, no matter
    /// the operation sequence
    #[test]
    fn structural_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut queue = Queue::new();
        let mut counter = 0usize;

        for op in &ops {
            apply(&mut queue, op, &mut counter);

            let ids: HashSet<_> = queue.items().iter().map(|item| item.id).collect();
            prop_assert_eq!(ids.len(), queue.len(), "duplicate ids after {:?}", op);

            if let Some(index) = queue.current_index() {
                prop_assert!(index < queue.len(), "index {} out of range after {:?}", index, op);
                prop_assert!(queue.current().is_some());
            }
        }
    }

    /// The current entry keeps denoting the same logical track unless an
    /// operation removed it or explicitly navigated away
    #[test]
    fn current_entry_is_preserved(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut queue = Queue::new();
        let mut counter = 0usize;

        for op in &ops {
            let before_id = queue.current().map(|item| item.id);
            let may_change = may_change_current(op, &queue);

            apply(&mut queue, op, &mut counter);

            if let Some(before_id) = before_id {
                if !may_change {
                    prop_assert_eq!(
                        queue.current().map(|item| item.id),
                        Some(before_id),
                        "current entry drifted after {:?}",
                        op
                    );
                }
            }
        }
    }

    /// Removing a batch of ids leaves the same queue regardless of the
    /// order the ids are given in
    #[test]
    fn batch_removal_is_order_independent(
        size in 2usize..12,
        picks in prop::collection::vec(0usize..12, 1..6),
        start in 0usize..12,
    ) {
        let mut forward = Queue::new();
        let tracks: Vec<_> = (0..size).map(|i| track(&format!("t{i}"))).collect();
        let ids = forward.add(tracks, None);
        forward.jump(start % size).unwrap();
        let mut reversed = forward.clone();

        let batch: Vec<_> = picks
            .iter()
            .map(|pick| ids[pick % size])
            .collect();
        let mut backwards = batch.clone();
        backwards.reverse();

        forward.remove(&batch);
        reversed.remove(&backwards);

        let forward_ids: Vec<_> = forward.items().iter().map(|item| item.id).collect();
        let reversed_ids: Vec<_> = reversed.items().iter().map(|item| item.id).collect();
        prop_assert_eq!(forward_ids, reversed_ids);
        prop_assert_eq!(forward.current_index(), reversed.current_index());
    }
}
