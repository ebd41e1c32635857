#![forbid(unsafe_code)]

//! `sirenia` lays out an interactively explored knowledge graph with a force-directed particle
//! simulation that grows in place.
//!
//! Entities arrive a neighborhood at a time ([`ingest()`]); existing nodes keep their positions while
//! new ones are seeded around the expanded entity. A [`TickScheduler`] advances the
//! [`ForceEngine`] once per host frame until the layout cools or settles, and superseded runs exit
//! on their next frame. [`GraphView`] bundles all of it for one view.
//!
//! Everything here is single-threaded and `!Send`: the state is shared through
//! `Rc<RefCell<SimulationState>>` and only ever written from the thread pumping frames.

pub mod config;
pub mod drag;
pub mod error;
pub mod force;
pub mod graph;
pub mod ingest;
pub mod measure;
pub mod scheduler;
pub mod source;
pub mod view;

pub use config::ForceConfig;
pub use drag::DragInteraction;
pub use error::{Error, Result};
pub use force::{ForceEngine, TickVelocity};
pub use graph::{
    ArcChange, ArcEndpoints, ArcKey, ArcView, Emphasis, GraphArc, LabelBox, LayoutSnapshot, Node,
    NodeChange, NodeView, Proximity, SimulationState, SimulationStats,
};
pub use ingest::{
    ArcDirection, ArcRecord, ConnectivityResponse, EntityRecord, IngestReport, ingest,
};
pub use measure::{DeterministicLabelMeasurer, LabelMeasurer, measure_pending};
pub use scheduler::{FrameHost, FrameQueue, Generation, TickScheduler};
pub use source::{ConnectivitySource, StaticConnectivity};
pub use view::GraphView;
