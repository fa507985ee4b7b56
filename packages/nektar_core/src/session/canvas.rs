//! Pure render projection from a topology to canvas nodes and edges.
//!
//! The canvas is derived state: recomputed from the topology whenever it is
//! asked for, never patched, so it cannot drift from the model. Node and
//! edge order follow topology iteration order.

use crate::topology::{Device, Topology};

/// One visual node. Carries the full device so a detail view needs no
/// further lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasNode {
    /// Stringified device id, the node key on the canvas.
    pub id: String,
    pub device: Device,
}

/// One visual edge. Drawn as a plain connection regardless of the stored
/// endpoint order.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasEdge {
    /// Dense per-projection key: `e0`, `e1`, ...
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: &'static str,
    pub animated: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Canvas {
    pub nodes: Vec<CanvasNode>,
    pub edges: Vec<CanvasEdge>,
}

impl Canvas {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Project a topology onto the canvas, order-preserving.
    pub fn project(topology: &Topology) -> Self {
        Self {
            nodes: topology
                .devices
                .iter()
                .map(|device| CanvasNode {
                    id: device.id.to_string(),
                    device: device.clone(),
                })
                .collect(),
            edges: topology
                .links
                .iter()
                .enumerate()
                .map(|(index, link)| CanvasEdge {
                    id: format!("e{}", index),
                    source: link.from.to_string(),
                    target: link.to.to_string(),
                    kind: "straight",
                    animated: true,
                })
                .collect(),
        }
    }
}
