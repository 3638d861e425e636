//! Bookkeeping for systems with a live connection.

use crate::tool_registry::domain::SystemId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::BTreeMap;

/// A live connection to a business system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedSystem {
    descriptor: String,
    connected_at: DateTime<Utc>,
}

impl ConnectedSystem {
    /// Returns the URL or command used to connect.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Returns when the connection was recorded.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }
}

/// Map of connected systems keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectedSystems {
    systems: BTreeMap<SystemId, ConnectedSystem>,
}

impl ConnectedSystems {
    /// Records `system_id` as connected through `descriptor`, replacing any
    /// previous entry.
    pub fn record(&mut self, system_id: SystemId, descriptor: impl Into<String>, clock: &impl Clock) {
        self.systems.insert(
            system_id,
            ConnectedSystem {
                descriptor: descriptor.into(),
                connected_at: clock.utc(),
            },
        );
    }

    /// Forgets `system_id`.
    pub fn remove(&mut self, system_id: &SystemId) -> Option<ConnectedSystem> {
        self.systems.remove(system_id)
    }

    /// Forgets every system.
    pub fn clear(&mut self) {
        self.systems.clear();
    }

    /// Returns the entry for `system_id`.
    #[must_use]
    pub fn get(&self, system_id: &SystemId) -> Option<&ConnectedSystem> {
        self.systems.get(system_id)
    }

    /// Returns whether `system_id` is connected.
    #[must_use]
    pub fn contains(&self, system_id: &SystemId) -> bool {
        self.systems.contains_key(system_id)
    }

    /// Returns the connected identifiers in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<&SystemId> {
        self.systems.keys().collect()
    }

    /// Iterates over entries in sorted identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&SystemId, &ConnectedSystem)> {
        self.systems.iter()
    }

    /// Returns the number of connected systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns whether no system is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
