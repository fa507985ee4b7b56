//! Device model and its defaulting construction.
//!
//! A `Device` is always built from an untrusted wire node through
//! [`Device::from_wire`], which substitutes documented defaults for anything
//! missing or malformed. This is the single defaulting seam shared by the
//! decode response, the compile response, and snippet load.

use serde::{Deserialize, Serialize};

use crate::remote::types::{WireInterface, WireNode, WireNodeData, WirePosition};

/// Free-form 2D placement of a device on the canvas.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Interface configuration carried by a device.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Interface {
    pub name: String,
    pub ip: String,
    pub bandwidth_mbps: f64,
}

impl Interface {
    /// Sentinel used when a wire record carries no interface block.
    pub fn placeholder() -> Self {
        Self {
            name: "N/A".to_string(),
            ip: "N/A".to_string(),
            bandwidth_mbps: 0.0,
        }
    }

    fn from_wire(wire: &WireInterface) -> Self {
        Self {
            name: wire.name.clone().unwrap_or_else(|| "N/A".to_string()),
            ip: wire.ip.clone().unwrap_or_else(|| "N/A".to_string()),
            bandwidth_mbps: wire.bandwidth.unwrap_or(0.0),
        }
    }

    fn to_wire(&self) -> WireInterface {
        WireInterface {
            name: Some(self.name.clone()),
            ip: Some(self.ip.clone()),
            bandwidth: Some(self.bandwidth_mbps),
        }
    }
}

/// A device: one vertex of the topology graph.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Device {
    /// Unique within a topology. `0` marks an unresolved reference.
    pub id: i64,
    pub name: String,
    /// Opaque reference to the device icon; not interpreted here.
    pub image: String,
    pub position: Position,
    pub device_type: String,
    /// Free-text positional label, independent of `position`.
    pub coordinates: String,
    pub powered_on: bool,
    pub interface: Interface,
}

impl Device {
    /// Build a device from an untrusted wire node. Total: every missing or
    /// malformed field is replaced by its default.
    pub fn from_wire(node: &WireNode) -> Self {
        let position = node
            .position
            .map(|p| Position { x: p.x, y: p.y })
            .unwrap_or_default();
        let data = node.data.clone().unwrap_or_default();

        Self {
            id: coerce_id(node.id.as_deref()),
            name: data.label.unwrap_or_else(|| "Unknown".to_string()),
            image: data.src.unwrap_or_default(),
            position,
            device_type: data.device_type.unwrap_or_else(|| "unknown".to_string()),
            coordinates: data
                .coordinates
                .unwrap_or_else(|| format!("{} {}", position.x, position.y)),
            powered_on: data.power_on.unwrap_or(false),
            interface: data
                .interface
                .as_ref()
                .map(Interface::from_wire)
                .unwrap_or_else(Interface::placeholder),
        }
    }

    /// Inverse of [`Device::from_wire`]; every field is emitted explicitly so
    /// a later `from_wire` reproduces this device exactly.
    pub fn to_wire(&self) -> WireNode {
        WireNode {
            id: Some(self.id.to_string()),
            data: Some(WireNodeData {
                label: Some(self.name.clone()),
                src: Some(self.image.clone()),
                device_type: Some(self.device_type.clone()),
                coordinates: Some(self.coordinates.clone()),
                power_on: Some(self.powered_on),
                interface: Some(self.interface.to_wire()),
            }),
            position: Some(WirePosition {
                x: self.position.x,
                y: self.position.y,
            }),
        }
    }
}

/// Coerce a wire identifier to an integer. Missing or malformed values
/// become `0`, the unresolved-reference sentinel.
pub(crate) fn coerce_id(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}
