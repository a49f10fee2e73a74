//! Current ERC-721 ownership from a token-transfer log.

use alloy_primitives::Address;
use std::collections::HashMap;

use crate::gateway::TransferEvent;

/// Tokens currently held by one address, each with the transfer that
/// established ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipSet {
    owned: HashMap<String, TransferEvent>,
}

impl OwnershipSet {
    pub fn contains(&self, token_id: &str) -> bool {
        self.owned.contains_key(token_id)
    }

    pub fn get(&self, token_id: &str) -> Option<&TransferEvent> {
        self.owned.get(token_id)
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    pub fn token_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.owned.keys().map(String::as_str).collect();
        ids.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        ids
    }

    /// Establishing events, oldest first.
    pub fn into_events(self) -> Vec<TransferEvent> {
        let mut events: Vec<TransferEvent> = self.owned.into_values().collect();
        events.sort_by(|a, b| {
            a.block_order()
                .cmp(&b.block_order())
                .then_with(|| a.token_id.len().cmp(&b.token_id.len()))
                .then_with(|| a.token_id.cmp(&b.token_id))
        });
        events
    }
}

/// Replays `events` in the order given and returns what `target` holds at
/// the end.
///
/// `events` must be in chronological (ascending) order. This is not checked:
/// out-of-order input gives a deterministic but wrong answer. Use
/// [`reconstruct_sorted`] when the source cannot guarantee ordering.
///
/// A receipt is recorded before a send is applied, so a self-transfer
/// leaves the token out of the set.
pub fn reconstruct(events: &[TransferEvent], target: Address) -> OwnershipSet {
    let mut owned = HashMap::new();

    for event in events {
        if event.to == target {
            owned.insert(event.token_id.clone(), event.clone());
        }
        if event.from == target {
            owned.remove(&event.token_id);
        }
    }

    OwnershipSet { owned }
}

/// Like [`reconstruct`], after a stable sort by block order.
pub fn reconstruct_sorted(events: &[TransferEvent], target: Address) -> OwnershipSet {
    let mut ordered = events.to_vec();
    ordered.sort_by_key(TransferEvent::block_order);
    reconstruct(&ordered, target)
}
