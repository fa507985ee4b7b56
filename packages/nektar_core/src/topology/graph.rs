//! Links and the topology aggregate.

use serde::{Deserialize, Serialize};

use crate::remote::types::{WireEdge, WireGraph};

use super::device::{coerce_id, Device};

/// A link between two devices, stored as an ordered pair but rendered as a
/// plain undirected connection. Duplicates and self-loops are permitted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub from: i64,
    pub to: i64,
}

impl Link {
    /// Build a link from an untrusted wire edge. Malformed endpoint ids
    /// coerce to `0`, the unresolved-reference sentinel.
    pub fn from_wire(edge: &WireEdge) -> Self {
        Self {
            from: coerce_id(edge.source.as_deref()),
            to: coerce_id(edge.target.as_deref()),
        }
    }

    pub fn to_wire(&self) -> WireEdge {
        WireEdge {
            source: Some(self.from.to_string()),
            target: Some(self.to.to_string()),
        }
    }

    /// Whether this link is incident to the given device id.
    pub fn touches(&self, id: i64) -> bool {
        self.from == id || self.to == id
    }
}

/// The unit both the DSL text and the visual graph must agree on.
///
/// Iteration order of `devices` and `links` is insertion order; every
/// projection derived from a topology preserves it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Topology {
    pub devices: Vec<Device>,
    pub links: Vec<Link>,
}

impl Topology {
    /// Build a topology from a wire graph, applying the device and link
    /// defaulting rules to every record.
    pub fn from_wire(graph: &WireGraph) -> Self {
        Self {
            devices: graph.nodes.iter().map(Device::from_wire).collect(),
            links: graph.edges.iter().map(Link::from_wire).collect(),
        }
    }

    /// Inverse of [`Topology::from_wire`], used when persisting a snapshot.
    pub fn to_wire(&self) -> WireGraph {
        WireGraph {
            nodes: self.devices.iter().map(Device::to_wire).collect(),
            edges: self.links.iter().map(Link::to_wire).collect(),
        }
    }

    /// Remove the device and every link incident to it, as one atomic
    /// update. Returns whether the device existed; the result never
    /// contains a dangling link either way.
    pub fn cascade_delete(&mut self, id: i64) -> bool {
        let existed = self.devices.iter().any(|d| d.id == id);
        if !existed {
            return false;
        }
        self.devices.retain(|d| d.id != id);
        self.links.retain(|l| !l.touches(id));
        true
    }

    /// Find a device by id.
    pub fn device(&self, id: i64) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.links.is_empty()
    }
}
