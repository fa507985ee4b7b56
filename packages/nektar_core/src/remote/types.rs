//! Wire types for the node/edge graph exchanged with the external services.
//!
//! The compile and conversion services both speak the `react_flow` shape:
//! string-keyed nodes with a `data` bag and a 2D position, and edges as
//! `source`/`target` pairs. The same shape is embedded in saved snippets
//! under the `reactFlow` envelope key. Every field that an upstream payload
//! may omit is optional here; defaulting happens in one place, when the
//! topology model is built from these records.

use serde::{Deserialize, Serialize};

/// Graph payload: `{nodes: [...], edges: [...]}`. Missing arrays mean empty.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WireGraph {
    #[serde(default)]
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub edges: Vec<WireEdge>,
}

/// One graph node as the services emit it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WireNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub data: Option<WireNodeData>,
    #[serde(default)]
    pub position: Option<WirePosition>,
}

/// The node's `data` bag. Everything here is optional on input.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WireNodeData {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub coordinates: Option<String>,
    #[serde(default)]
    pub power_on: Option<bool>,
    #[serde(default)]
    pub interface: Option<WireInterface>,
}

/// Interface block inside a node's `data`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WireInterface {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub bandwidth: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct WirePosition {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// One graph edge. Endpoints reference node ids as strings.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WireEdge {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// Successful output of the XML conversion step: the decompiled DSL text
/// together with the graph it describes.
#[derive(Clone, Debug)]
pub struct ConvertOutcome {
    pub dsl: String,
    pub graph: WireGraph,
}
