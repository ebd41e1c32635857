use super::pair_mut;
use super::rng::XorShift64Star;
use crate::graph::Node;

/// Spring parameters of one arc, resolved against node indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LinkSpring {
    pub(crate) source: usize,
    pub(crate) target: usize,
    pub(crate) strength: f64,
    /// Share of the correction applied to the target; the source takes the complement.
    pub(crate) bias: f64,
}

impl LinkSpring {
    pub(crate) fn from_degrees(source: usize, target: usize, degrees: &[usize]) -> Self {
        // Every arc contributes to both endpoint degrees, so neither can be zero here.
        let ds = degrees[source].max(1) as f64;
        let dt = degrees[target].max(1) as f64;
        Self {
            source,
            target,
            strength: 1.0 / ds.min(dt),
            bias: ds / (ds + dt),
        }
    }
}

pub(super) fn apply(
    nodes: &mut [&mut Node],
    links: &[LinkSpring],
    alpha: f64,
    distance: f64,
    rng: &mut XorShift64Star,
) {
    for link in links {
        if link.source == link.target {
            continue;
        }
        let (s, t) = pair_mut(nodes, link.source, link.target);
        let mut x = t.x + t.vx - s.x - s.vx;
        let mut y = t.y + t.vy - s.y - s.vy;
        if x == 0.0 {
            x = rng.jiggle();
        }
        if y == 0.0 {
            y = rng.jiggle();
        }
        let l = (x * x + y * y).sqrt();
        let k = (l - distance) / l * alpha * link.strength;
        x *= k;
        y *= k;

        t.vx -= x * link.bias;
        t.vy -= y * link.bias;
        s.vx += x * (1.0 - link.bias);
        s.vy += y * (1.0 - link.bias);
    }
}
