//! Simulation data model: nodes, arcs and running statistics.
//!
//! Nodes live in an insertion-ordered map keyed by entity id; arcs only hold id pairs and resolve
//! their endpoints through that map. The node index (insertion order) is stable because nodes are
//! never removed for the lifetime of a view.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

mod view;

pub use view::{ArcView, LayoutSnapshot, NodeView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Proximity {
    /// Explicitly expanded entity (tier 0).
    Focal,
    /// Neighbor fetched alongside a focal entity, not expanded yet (tier 1).
    Peripheral,
}

impl Proximity {
    pub fn tier(self) -> u8 {
        match self {
            Proximity::Focal => 0,
            Proximity::Peripheral => 1,
        }
    }
}

impl From<Proximity> for u8 {
    fn from(value: Proximity) -> Self {
        value.tier()
    }
}

impl TryFrom<u8> for Proximity {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Proximity::Focal),
            1 => Ok(Proximity::Peripheral),
            other => Err(format!("unknown proximity tier {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Solid,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelBox {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Pinned x. While set, integration holds `x` here and zeroes `vx`.
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    pub proximity: Proximity,
    pub label: String,
    /// Render styling tag; opaque to the engine.
    pub category: String,
    /// Measured label extent, cached after the renderer first lays the label out.
    pub label_box: Option<LabelBox>,
}

impl Node {
    pub fn is_focal(&self) -> bool {
        self.proximity == Proximity::Focal
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArcKey {
    pub from: String,
    pub to: String,
}

impl ArcKey {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphArc {
    pub from: String,
    pub to: String,
    pub relation: String,
    pub emphasis: Emphasis,
    /// Spring strength, `1 / min(degree(from), degree(to))`, refreshed when a run starts.
    pub strength: f64,
}

/// Node indices of one arc, in arc insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcEndpoints {
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStats {
    /// Ticks completed by the current run.
    pub tick_count: u64,
    /// Largest `|vx|` observed after the most recent tick.
    pub max_velocity_x: f64,
    /// Largest `|vy|` observed after the most recent tick.
    pub max_velocity_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeChange {
    Inserted,
    Promoted,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcChange {
    Inserted,
    /// The key already existed; its relation kind was overwritten.
    Updated,
}

/// Nodes, arcs and statistics of one graph view.
///
/// Single-writer contract: exactly one party mutates a state at a time. The frame callback, the
/// drag handlers and ingestion take turns on the same thread; none of them may hold a borrow
/// across a frame boundary.
#[derive(Debug, Clone)]
pub struct SimulationState {
    nodes: IndexMap<String, Node, FxBuildHasher>,
    arcs: IndexMap<ArcKey, GraphArc, FxBuildHasher>,
    arc_list: Vec<ArcEndpoints>,
    arc_list_stale: bool,
    stats: SimulationStats,
    initial_radius: f64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationState {
    pub fn new() -> Self {
        Self::with_initial_radius(10.0)
    }

    pub fn with_initial_radius(initial_radius: f64) -> Self {
        Self {
            nodes: IndexMap::default(),
            arcs: IndexMap::default(),
            arc_list: Vec::new(),
            arc_list_stale: false,
            stats: SimulationStats::default(),
            initial_radius,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn arcs(&self) -> impl Iterator<Item = &GraphArc> {
        self.arcs.values()
    }

    pub fn arc(&self, from: &str, to: &str) -> Option<&GraphArc> {
        self.arcs.get(&ArcKey::new(from, to))
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut SimulationStats {
        &mut self.stats
    }

    /// Inserts a node seeded around the origin, or promotes an existing one to focal.
    pub fn ensure_node(
        &mut self,
        id: &str,
        label: &str,
        category: &str,
        is_focal: bool,
    ) -> NodeChange {
        self.ensure_node_around(id, label, category, is_focal, (0.0, 0.0))
    }

    /// Like [`Self::ensure_node`], seeding a new node on a phyllotaxis spiral around `center`.
    ///
    /// Existing nodes keep their geometry. The tier only moves from peripheral to focal.
    pub fn ensure_node_around(
        &mut self,
        id: &str,
        label: &str,
        category: &str,
        is_focal: bool,
        center: (f64, f64),
    ) -> NodeChange {
        if let Some(node) = self.nodes.get_mut(id) {
            if is_focal && !node.is_focal() {
                node.proximity = Proximity::Focal;
                return NodeChange::Promoted;
            }
            return NodeChange::Unchanged;
        }

        let (x, y) = phyllotaxis(self.nodes.len(), self.initial_radius);
        self.nodes.insert(
            id.to_string(),
            Node {
                id: id.to_string(),
                x: center.0 + x,
                y: center.1 + y,
                vx: 0.0,
                vy: 0.0,
                fx: None,
                fy: None,
                proximity: if is_focal {
                    Proximity::Focal
                } else {
                    Proximity::Peripheral
                },
                label: label.to_string(),
                category: category.to_string(),
                label_box: None,
            },
        );
        NodeChange::Inserted
    }

    /// Inserts the directed arc `from -> to`, or overwrites the relation kind of an existing one.
    ///
    /// Returns `None` without touching the state when either endpoint is unknown. The flat arc
    /// sequence is stale afterwards until [`Self::rebuild_arc_list`] runs.
    pub fn ensure_arc(&mut self, from: &str, to: &str, relation: &str) -> Option<ArcChange> {
        let (Some(a), Some(b)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return None;
        };
        let emphasis = emphasis_for(a, b);

        self.arc_list_stale = true;
        let key = ArcKey::new(from, to);
        if let Some(arc) = self.arcs.get_mut(&key) {
            arc.relation = relation.to_string();
            arc.emphasis = emphasis;
            return Some(ArcChange::Updated);
        }
        self.arcs.insert(
            key,
            GraphArc {
                from: from.to_string(),
                to: to.to_string(),
                relation: relation.to_string(),
                emphasis,
                strength: 1.0,
            },
        );
        Some(ArcChange::Inserted)
    }

    /// Rebuilds the index-based arc sequence and refreshes every arc's emphasis.
    pub fn rebuild_arc_list(&mut self) {
        self.arc_list.clear();
        for arc in self.arcs.values_mut() {
            let (Some((source, _, a)), Some((target, _, b))) = (
                self.nodes.get_full(arc.from.as_str()),
                self.nodes.get_full(arc.to.as_str()),
            ) else {
                // Unreachable through `ensure_arc`; nodes are never removed.
                continue;
            };
            arc.emphasis = emphasis_for(a, b);
            self.arc_list.push(ArcEndpoints { source, target });
        }
        self.arc_list_stale = false;
    }

    pub fn is_arc_list_stale(&self) -> bool {
        self.arc_list_stale
    }

    pub fn arc_list(&self) -> &[ArcEndpoints] {
        &self.arc_list
    }

    /// Incident arc endpoints of `id`, counting both directions.
    pub fn degree(&self, id: &str) -> usize {
        self.arcs
            .keys()
            .map(|k| usize::from(k.from == id) + usize::from(k.to == id))
            .sum()
    }

    /// Degree of every node by node index, taken from the flat arc sequence.
    pub fn degrees(&self) -> Vec<usize> {
        let mut out = vec![0usize; self.nodes.len()];
        for e in &self.arc_list {
            out[e.source] += 1;
            out[e.target] += 1;
        }
        out
    }

    pub(crate) fn set_arc_strengths(&mut self, strengths: &[f64]) {
        for (arc, &s) in self.arcs.values_mut().zip(strengths) {
            arc.strength = s;
        }
    }

    pub fn set_label_box(&mut self, id: &str, width: f64, height: f64) -> Result<()> {
        let node = self.require_node_mut(id)?;
        node.label_box = Some(LabelBox { width, height });
        Ok(())
    }

    pub fn pin(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        let node = self.require_node_mut(id)?;
        node.fx = Some(x);
        node.fy = Some(y);
        Ok(())
    }

    /// Clears the pin; the node resumes from its current position at rest.
    pub fn unpin(&mut self, id: &str) -> Result<()> {
        let node = self.require_node_mut(id)?;
        node.fx = None;
        node.fy = None;
        node.vx = 0.0;
        node.vy = 0.0;
        Ok(())
    }

    /// Mutable node handles by index plus the flat arc sequence, for one tick.
    pub(crate) fn split_for_tick(&mut self) -> (Vec<&mut Node>, &[ArcEndpoints]) {
        (self.nodes.values_mut().collect(), &self.arc_list)
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            nodes: self.nodes.values().map(NodeView::from).collect(),
            arcs: self.arcs.values().map(ArcView::from).collect(),
            stats: self.stats,
        }
    }

    fn require_node_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })
    }
}

fn emphasis_for(a: &Node, b: &Node) -> Emphasis {
    if a.is_focal() && b.is_focal() {
        Emphasis::Solid
    } else {
        Emphasis::Dotted
    }
}

/// Seed offset of the `index`-th node on a golden-angle spiral.
fn phyllotaxis(index: usize, initial_radius: f64) -> (f64, f64) {
    let angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    let i = index as f64;
    let r = initial_radius * (0.5 + i).sqrt();
    let a = i * angle;
    (r * a.cos(), r * a.sin())
}
