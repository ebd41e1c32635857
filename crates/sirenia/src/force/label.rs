use super::pair_mut;
use super::rng::XorShift64Star;
use crate::graph::Node;

/// Separates nodes whose measured label boxes (centered on the node) overlap on both axes.
///
/// The pair is only nudged vertically so text rows stack instead of sliding sideways. Nodes
/// without a measured box are skipped.
pub(super) fn apply(nodes: &mut [&mut Node], alpha: f64, strength: f64, rng: &mut XorShift64Star) {
    if strength <= 0.0 {
        return;
    }
    for i in 0..nodes.len() {
        let Some(bi) = nodes[i].label_box else {
            continue;
        };
        for j in (i + 1)..nodes.len() {
            let Some(bj) = nodes[j].label_box else {
                continue;
            };
            let (a, b) = pair_mut(nodes, i, j);
            let overlap_x = (bi.width + bj.width) / 2.0 - (b.x - a.x).abs();
            let overlap_y = (bi.height + bj.height) / 2.0 - (b.y - a.y).abs();
            if overlap_x <= 0.0 || overlap_y <= 0.0 {
                continue;
            }

            let dy = b.y - a.y;
            if dy == 0.0 {
                let nudge = rng.jiggle();
                a.vy -= nudge;
                b.vy += nudge;
                continue;
            }
            let push = overlap_y * strength * alpha / 2.0 * dy.signum();
            a.vy -= push;
            b.vy += push;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LabelBox, SimulationState};

    fn labelled(points: &[(f64, f64)], size: (f64, f64)) -> SimulationState {
        let mut state = SimulationState::new();
        for (i, &(x, y)) in points.iter().enumerate() {
            let id = format!("n{i}");
            state.ensure_node(&id, &id, "", false);
            let n = state.node_mut(&id).unwrap();
            n.x = x;
            n.y = y;
            n.label_box = Some(LabelBox {
                width: size.0,
                height: size.1,
            });
        }
        state
    }

    #[test]
    fn overlapping_labels_move_apart_vertically() {
        let mut state = labelled(&[(0.0, 0.0), (10.0, 4.0)], (60.0, 12.0));
        let mut rng = XorShift64Star::new(1);
        let mut nodes = state.split_for_tick().0;
        apply(&mut nodes, 1.0, 0.5, &mut rng);
        // overlap_y = 12 - 4 = 8; push = 8 * 0.5 / 2 = 2 each way.
        assert_eq!((nodes[0].vx, nodes[1].vx), (0.0, 0.0));
        assert!((nodes[0].vy + 2.0).abs() < 1e-12);
        assert!((nodes[1].vy - 2.0).abs() < 1e-12);
    }

    #[test]
    fn aligned_labels_get_jiggled() {
        let mut state = labelled(&[(0.0, 5.0), (10.0, 5.0)], (60.0, 12.0));
        let mut rng = XorShift64Star::new(1);
        let mut nodes = state.split_for_tick().0;
        apply(&mut nodes, 1.0, 0.5, &mut rng);
        assert!(nodes[0].vy != 0.0 && nodes[0].vy.abs() < 1e-6);
        assert_eq!(nodes[0].vy, -nodes[1].vy);
    }

    #[test]
    fn separated_on_one_axis_is_untouched() {
        let mut state = labelled(&[(0.0, 0.0), (100.0, 1.0)], (60.0, 12.0));
        let mut rng = XorShift64Star::new(1);
        let mut nodes = state.split_for_tick().0;
        apply(&mut nodes, 1.0, 0.5, &mut rng);
        assert_eq!((nodes[0].vy, nodes[1].vy), (0.0, 0.0));
    }
}
