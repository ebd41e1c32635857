use crate::graph::Node;

/// Pulls every node toward the origin by a fraction of its offset, per axis.
pub(super) fn apply(nodes: &mut [&mut Node], alpha: f64, strength_x: f64, strength_y: f64) {
    let kx = strength_x * alpha;
    let ky = strength_y * alpha;
    for n in nodes.iter_mut() {
        n.vx -= n.x * kx;
        n.vy -= n.y * ky;
    }
}
