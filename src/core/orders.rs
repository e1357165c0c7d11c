//! Last manufacturing order lookup
//!
//! Order history belongs to another system. The dialog only asks it which
//! order a machine last ran so the order field can be pre-filled.

use std::collections::BTreeMap;

use crate::core::Config;

/// Synchronous "last known manufacturing order" lookup keyed by machine
pub trait LastOrderLookup {
    fn last_order(&self, machine: u32) -> Option<String>;
}

impl LastOrderLookup for BTreeMap<u32, String> {
    fn last_order(&self, machine: u32) -> Option<String> {
        self.get(&machine).cloned()
    }
}

/// The `last_orders` table of the merged configuration
impl LastOrderLookup for Config {
    fn last_order(&self, machine: u32) -> Option<String> {
        self.last_orders
            .get(&machine)
            .map(|order| order.trim().to_string())
            .filter(|order| !order.is_empty())
    }
}
