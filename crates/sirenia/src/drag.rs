//! Pointer drag on a node, expressed as pin updates.
//!
//! Coordinates are already in simulation space; mapping from screen space is the host's job.

use crate::error::{Error, Result};
use crate::graph::SimulationState;

#[derive(Debug, Clone, Default)]
pub struct DragInteraction {
    dragged: Option<String>,
}

impl DragInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Records `id` as dragged and pins it where it currently is.
    ///
    /// A drag already in progress on another node is ended first.
    pub fn drag_start(&mut self, state: &mut SimulationState, id: &str) -> Result<()> {
        let (x, y) = state
            .node(id)
            .map(|n| (n.x, n.y))
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })?;
        if self.dragged.as_deref().is_some_and(|d| d != id) {
            self.drag_end(state);
        }
        state.pin(id, x, y)?;
        tracing::trace!(id, x, y, "drag started");
        self.dragged = Some(id.to_string());
        Ok(())
    }

    /// Moves the dragged node's pin. Returns `false` when nothing is being dragged.
    pub fn drag_move(&mut self, state: &mut SimulationState, x: f64, y: f64) -> bool {
        let Some(id) = self.dragged.as_deref() else {
            return false;
        };
        state.pin(id, x, y).is_ok()
    }

    /// Releases the pin; the node resumes at rest from where it was left.
    pub fn drag_end(&mut self, state: &mut SimulationState) -> bool {
        let Some(id) = self.dragged.take() else {
            return false;
        };
        tracing::trace!(id = %id, "drag ended");
        state.unpin(&id).is_ok()
    }
}
