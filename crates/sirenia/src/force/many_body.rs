use super::rng::XorShift64Star;
use crate::graph::Node;

/// Every ordered pair `(i, j)` pushes `i` along the unit vector from `j` with magnitude
/// `charge * alpha / d²`, where `d²` is floored at `distance_min_squared`.
///
/// The floor applies to `d²` itself rather than to a `sqrt`-softened distance, so coincident
/// or near-coincident nodes are pushed with at most `|charge| * alpha` (DESIGN.md, decision 8).
pub(super) fn apply(
    nodes: &mut [&mut Node],
    alpha: f64,
    charge: f64,
    distance_min_squared: f64,
    rng: &mut XorShift64Star,
) {
    let positions: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x, n.y)).collect();
    for (i, node) in nodes.iter_mut().enumerate() {
        let (xi, yi) = positions[i];
        for (j, &(xj, yj)) in positions.iter().enumerate() {
            if i == j {
                continue;
            }
            let mut dx = xj - xi;
            let mut dy = yj - yi;
            if dx == 0.0 {
                dx = rng.jiggle();
            }
            if dy == 0.0 {
                dy = rng.jiggle();
            }
            let l = dx * dx + dy * dy;
            let dist = l.sqrt();
            let w = charge * alpha / (l.max(distance_min_squared) * dist);
            node.vx += dx * w;
            node.vy += dy * w;
        }
    }
}
