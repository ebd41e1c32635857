use super::pair_mut;
use super::rng::XorShift64Star;
use crate::graph::Node;

/// Pushes apart pairs whose next-step centers come within `2 * radius`.
///
/// Not scaled by alpha: overlap is resolved at full strength until the run stops.
pub(super) fn apply(
    nodes: &mut [&mut Node],
    radius: f64,
    strength: f64,
    rng: &mut XorShift64Star,
) {
    let r = radius + radius;
    // A node's share is the other node's squared radius over the sum; radii are uniform.
    let share = 0.5;

    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let (a, b) = pair_mut(nodes, i, j);
            let mut x = a.x + a.vx - b.x - b.vx;
            let mut y = a.y + a.vy - b.y - b.vy;
            let mut l = x * x + y * y;
            if l >= r * r {
                continue;
            }
            if x == 0.0 {
                x = rng.jiggle();
                l += x * x;
            }
            if y == 0.0 {
                y = rng.jiggle();
                l += y * y;
            }
            let d = l.sqrt();
            let k = (r - d) / d * strength;
            x *= k;
            y *= k;
            a.vx += x * share;
            a.vy += y * share;
            b.vx -= x * (1.0 - share);
            b.vy -= y * (1.0 - share);
        }
    }
}
