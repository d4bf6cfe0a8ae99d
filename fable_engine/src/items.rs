//! Player inventory.
//!
//! Items are integer ids ordered by acquisition. One item may be active
//! (selected for use); hidden items stay owned but are withheld from the
//! inventory UI.

use std::collections::BTreeSet;

use log::warn;
use serde::{Deserialize, Serialize};

/// Owned items, the active selection and per-item visibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<i64>,
    active_item: i64,
    hidden: BTreeSet<i64>,
}

impl Inventory {
    /// Owned item ids in acquisition order.
    pub fn items(&self) -> &[i64] {
        &self.items
    }

    /// Active item id, `0` when nothing is active.
    pub fn active_item(&self) -> i64 {
        self.active_item
    }

    pub fn owns(&self, id: i64) -> bool {
        self.items.contains(&id)
    }

    pub fn is_hidden(&self, id: i64) -> bool {
        self.hidden.contains(&id)
    }

    /// Add an item; adding an owned item is a no-op.
    pub fn add(&mut self, id: i64) {
        if !self.owns(id) {
            self.items.push(id);
        }
    }

    /// Remove an item, deactivating it if needed. Unowned ids warn and no-op.
    pub fn remove(&mut self, id: i64) {
        match self.items.iter().position(|i| *i == id) {
            Some(pos) => {
                self.items.remove(pos);
                if self.active_item == id {
                    self.active_item = 0;
                }
            },
            None => warn!("remove_item: item {id} not owned"),
        }
    }

    /// Swap an owned item for another in place, keeping its slot order.
    pub fn replace(&mut self, id: i64, replace_id: i64) {
        match self.items.iter().position(|i| *i == id) {
            Some(pos) => {
                self.items[pos] = replace_id;
                if self.active_item == id {
                    self.active_item = 0;
                }
            },
            None => warn!("replace_item: item {id} not owned"),
        }
    }

    /// Mark an owned item as the active selection.
    pub fn activate(&mut self, id: i64) {
        if self.owns(id) {
            self.active_item = id;
        } else {
            warn!("activate: item {id} not owned");
        }
    }

    pub fn deactivate(&mut self) {
        self.active_item = 0;
    }

    pub fn show(&mut self, id: i64) {
        self.hidden.remove(&id);
    }

    pub fn hide(&mut self, id: i64) {
        self.hidden.insert(id);
    }
}

/// Product ids unlocked through the store, loaded from the purchases
/// file at startup. Read-only to the running game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Purchases(BTreeSet<String>);

impl Purchases {
    pub fn grant(&mut self, product: impl Into<String>) {
        self.0.insert(product.into());
    }

    pub fn owns(&self, product: &str) -> bool {
        self.0.contains(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_activate_sequence() {
        let mut inv = Inventory::default();
        inv.add(1);
        inv.add(3);
        inv.add(2);
        inv.remove(1);
        inv.activate(2);
        assert_eq!(inv.items(), &[3, 2]);
        assert_eq!(inv.active_item(), 2);
        inv.remove(2);
        assert_eq!(inv.active_item(), 0);
    }

    #[test]
    fn double_add_is_noop() {
        let mut inv = Inventory::default();
        inv.add(5);
        inv.add(5);
        assert_eq!(inv.items(), &[5]);
    }

    #[test]
    fn remove_unowned_is_noop() {
        let mut inv = Inventory::default();
        inv.add(1);
        inv.remove(9);
        assert_eq!(inv.items(), &[1]);
    }

    #[test]
    fn activate_requires_ownership() {
        let mut inv = Inventory::default();
        inv.activate(7);
        assert_eq!(inv.active_item(), 0);
    }

    #[test]
    fn replace_preserves_slot_order() {
        let mut inv = Inventory::default();
        inv.add(1);
        inv.add(2);
        inv.add(3);
        inv.replace(2, 9);
        assert_eq!(inv.items(), &[1, 9, 3]);
    }

    #[test]
    fn replace_active_item_deactivates() {
        let mut inv = Inventory::default();
        inv.add(2);
        inv.activate(2);
        inv.replace(2, 9);
        assert_eq!(inv.active_item(), 0);
    }

    #[test]
    fn hide_and_show() {
        let mut inv = Inventory::default();
        inv.add(4);
        inv.hide(4);
        assert!(inv.is_hidden(4));
        inv.show(4);
        assert!(!inv.is_hidden(4));
    }

    #[test]
    fn roundtrip() {
        let mut inv = Inventory::default();
        inv.add(1);
        inv.add(2);
        inv.activate(1);
        inv.hide(2);
        let bytes = rmp_serde::to_vec_named(&inv).unwrap();
        assert_eq!(inv, rmp_serde::from_slice::<Inventory>(&bytes).unwrap());
    }
}
