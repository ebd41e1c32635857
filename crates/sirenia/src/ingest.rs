//! Merging fetched connectivity into a live simulation.

use crate::graph::{ArcChange, ArcKey, NodeChange, SimulationState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub category: String,
}

/// Which way an arc points relative to the ids it carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcDirection {
    /// `fromId -> toId`.
    #[default]
    Outgoing,
    /// `toId -> fromId`.
    Incoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcRecord {
    pub from_id: String,
    pub to_id: String,
    pub relation_kind: String,
    #[serde(default)]
    pub direction: ArcDirection,
}

impl ArcRecord {
    /// The `(from, to)` pair the arc is stored under.
    pub fn oriented(&self) -> (&str, &str) {
        match self.direction {
            ArcDirection::Outgoing => (self.from_id.as_str(), self.to_id.as_str()),
            ArcDirection::Incoming => (self.to_id.as_str(), self.from_id.as_str()),
        }
    }
}

/// One `fetchConnectivity` answer: a focal entity, its neighbors and the arcs among them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityResponse {
    pub focal_entity: EntityRecord,
    #[serde(default)]
    pub neighbor_entities: Vec<EntityRecord>,
    #[serde(default)]
    pub arcs: Vec<ArcRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub nodes_added: usize,
    pub nodes_promoted: usize,
    pub arcs_added: usize,
    pub arcs_updated: usize,
    /// Arcs dropped because an endpoint was not a known node.
    pub skipped_arcs: Vec<ArcKey>,
}

impl IngestReport {
    /// Whether the node or arc sets grew, or a node changed tier.
    pub fn changed(&self) -> bool {
        self.nodes_added > 0 || self.nodes_promoted > 0 || self.arcs_added > 0
    }

    fn record_node(&mut self, change: NodeChange) {
        match change {
            NodeChange::Inserted => self.nodes_added += 1,
            NodeChange::Promoted => self.nodes_promoted += 1,
            NodeChange::Unchanged => {}
        }
    }
}

/// Merges `response` into `state` and rebuilds the flat arc sequence.
///
/// Existing nodes keep their geometry; new neighbors are seeded around the focal node. The merge
/// is idempotent. The caller restarts the scheduler if the new geometry should settle.
pub fn ingest(state: &mut SimulationState, response: &ConnectivityResponse) -> IngestReport {
    let mut report = IngestReport::default();

    let focal = &response.focal_entity;
    report.record_node(state.ensure_node(&focal.id, &focal.label, &focal.category, true));
    let center = state
        .node(&focal.id)
        .map(|n| (n.x, n.y))
        .unwrap_or((0.0, 0.0));

    for n in &response.neighbor_entities {
        report.record_node(state.ensure_node_around(&n.id, &n.label, &n.category, false, center));
    }

    for arc in &response.arcs {
        let (from, to) = arc.oriented();
        match state.ensure_arc(from, to, &arc.relation_kind) {
            Some(ArcChange::Inserted) => report.arcs_added += 1,
            Some(ArcChange::Updated) => report.arcs_updated += 1,
            None => {
                tracing::warn!(from, to, "skipping arc with an unknown endpoint");
                report.skipped_arcs.push(ArcKey::new(from, to));
            }
        }
    }

    state.rebuild_arc_list();
    tracing::debug!(
        focal = %focal.id,
        nodes_added = report.nodes_added,
        nodes_promoted = report.nodes_promoted,
        arcs_added = report.arcs_added,
        skipped = report.skipped_arcs.len(),
        "connectivity ingested"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_deserializes_from_camel_case_json() {
        let json = r#"{
            "focalEntity": { "id": "ada", "label": "Ada Lovelace", "category": "person" },
            "neighborEntities": [{ "id": "engine", "label": "Analytical Engine" }],
            "arcs": [
                { "fromId": "ada", "toId": "engine", "relationKind": "wroteAbout" },
                { "fromId": "ada", "toId": "engine", "relationKind": "inspiredBy", "direction": "incoming" }
            ]
        }"#;
        let r: ConnectivityResponse = serde_json::from_str(json).expect("response");
        assert_eq!(r.neighbor_entities[0].category, "");
        assert_eq!(r.arcs[0].oriented(), ("ada", "engine"));
        assert_eq!(r.arcs[1].oriented(), ("engine", "ada"));
    }
}
