//! Binding registry
//!
//! Tracks which masquerade devices currently take part in translation.
//! Lifecycle per masquerade device:
//!
//! ```text
//! Unbound → Bound      (register)
//! Bound   → Unbound    (unregister, base device deleted)
//! ```

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use masq_core::{Binding, DeviceId};
use thiserror::Error;
use tracing::{debug, trace};

/// Lifecycle state of a masquerade device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingState {
    Unbound,
    Bound,
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("masquerade device {device}: invalid transition from {from:?} to {to:?}: {reason}")]
pub struct InvalidTransition {
    pub device: DeviceId,
    pub from: BindingState,
    pub to: BindingState,
    pub reason: &'static str,
}

impl BindingState {
    /// Attempt a transition to a new state
    pub fn try_transition(
        self,
        device: DeviceId,
        to: BindingState,
    ) -> Result<BindingState, InvalidTransition> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(self.reject(device, to))
        }
    }

    fn reject(self, device: DeviceId, to: BindingState) -> InvalidTransition {
        let reason = match self {
            BindingState::Bound => "already bound - unregister before registering again",
            BindingState::Unbound => "not bound",
        };
        InvalidTransition {
            device,
            from: self,
            to,
            reason,
        }
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition_to(self, to: BindingState) -> bool {
        self != to
    }
}

/// Bound masquerade devices keyed by masquerade id
///
/// Safe to share between threads; bindings are handed out as clones so no
/// lock is held while the caller talks to the host.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: DashMap<DeviceId, Binding>,
}

impl BindingRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            bindings: DashMap::new(),
        }
    }

    /// Bind a masquerade device
    ///
    /// The state is the presence of the entry; only the rejected
    /// transitions need building here.
    pub fn insert(&self, binding: Binding) -> Result<(), InvalidTransition> {
        let id = binding.masquerade_id;
        match self.bindings.entry(id) {
            Entry::Occupied(_) => Err(BindingState::Bound.reject(id, BindingState::Bound)),
            Entry::Vacant(entry) => {
                debug!(
                    masquerade_id = %id,
                    base_device_id = %binding.base_device_id,
                    kind = binding.kind.type_id(),
                    "Binding masquerade device"
                );
                entry.insert(binding);
                Ok(())
            }
        }
    }

    /// Unbind a masquerade device, returning its binding
    pub fn remove(&self, id: DeviceId) -> Result<Binding, InvalidTransition> {
        match self.bindings.remove(&id) {
            Some((_, binding)) => {
                debug!(masquerade_id = %id, "Unbinding masquerade device");
                Ok(binding)
            }
            None => Err(BindingState::Unbound.reject(id, BindingState::Unbound)),
        }
    }

    /// Current lifecycle state of a masquerade device
    pub fn state(&self, id: DeviceId) -> BindingState {
        if self.bindings.contains_key(&id) {
            BindingState::Bound
        } else {
            BindingState::Unbound
        }
    }

    /// Get a copy of a binding
    pub fn get(&self, id: DeviceId) -> Option<Binding> {
        self.bindings.get(&id).map(|b| b.clone())
    }

    /// Bindings mirroring a base device, by ascending masquerade id
    pub fn bindings_for_base(&self, base_device_id: DeviceId) -> Vec<Binding> {
        let mut bindings: Vec<Binding> = self
            .bindings
            .iter()
            .filter(|b| b.base_device_id == base_device_id)
            .map(|b| b.value().clone())
            .collect();
        bindings.sort_by_key(|b| b.masquerade_id);
        trace!(base_device_id = %base_device_id, count = bindings.len(), "Resolved bindings for base device");
        bindings
    }

    /// All bound masquerade ids, ascending
    pub fn ids(&self) -> Vec<DeviceId> {
        let mut ids: Vec<DeviceId> = self.bindings.iter().map(|b| *b.key()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
