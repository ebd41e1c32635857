//! Read model handed to renderers.

use super::{Emphasis, GraphArc, Node, Proximity, SimulationStats};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub proximity: Proximity,
    pub label: String,
    pub category: String,
}

impl From<&Node> for NodeView {
    fn from(n: &Node) -> Self {
        Self {
            id: n.id.clone(),
            x: n.x,
            y: n.y,
            proximity: n.proximity,
            label: n.label.clone(),
            category: n.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcView {
    pub from_id: String,
    pub to_id: String,
    pub relation_kind: String,
    pub emphasis: Emphasis,
}

impl From<&GraphArc> for ArcView {
    fn from(a: &GraphArc) -> Self {
        Self {
            from_id: a.from.clone(),
            to_id: a.to.clone(),
            relation_kind: a.relation.clone(),
            emphasis: a.emphasis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    pub nodes: Vec<NodeView>,
    pub arcs: Vec<ArcView>,
    pub stats: SimulationStats,
}
