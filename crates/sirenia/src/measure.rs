//! Label measurement and caching of measured boxes onto nodes.

use crate::graph::{LabelBox, SimulationState};

/// The renderer's `measureLabel` collaborator.
pub trait LabelMeasurer {
    fn measure(&self, node_id: &str, label: &str) -> LabelBox;
}

/// Character-count based measurement for headless use.
///
/// Width is the longest line's character count times `font_size * char_width_factor`; height is
/// the line count times `font_size * line_height_factor`. Zero factors fall back to 0.6 and 1.2.
#[derive(Debug, Clone)]
pub struct DeterministicLabelMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
    pub font_size: f64,
}

impl Default for DeterministicLabelMeasurer {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
            line_height_factor: 1.2,
            font_size: 16.0,
        }
    }
}

impl LabelMeasurer for DeterministicLabelMeasurer {
    fn measure(&self, _node_id: &str, label: &str) -> LabelBox {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };
        let font_size = self.font_size.max(1.0);

        let mut lines = 0usize;
        let mut max_chars = 0usize;
        for line in label.split('\n') {
            lines += 1;
            max_chars = max_chars.max(line.chars().count());
        }

        LabelBox {
            width: max_chars as f64 * font_size * char_width_factor,
            height: lines as f64 * font_size * line_height_factor,
        }
    }
}

/// Measures every node whose label box is still unknown and caches the result on the node.
///
/// Already measured nodes are left alone. Returns how many nodes were measured.
pub fn measure_pending(state: &mut SimulationState, measurer: &dyn LabelMeasurer) -> usize {
    let pending: Vec<(String, String)> = state
        .nodes()
        .filter(|n| n.label_box.is_none())
        .map(|n| (n.id.clone(), n.label.clone()))
        .collect();

    let mut measured = 0;
    for (id, label) in pending {
        let b = measurer.measure(&id, &label);
        if let Some(node) = state.node_mut(&id) {
            node.label_box = Some(b);
            measured += 1;
        }
    }
    if measured > 0 {
        tracing::debug!(measured, "label boxes measured");
    }
    measured
}
