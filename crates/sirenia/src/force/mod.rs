//! Per-tick force computations and integration.
//!
//! Forces only touch velocities; positions move once per tick in `integrate`. The order is fixed:
//! link, many-body, collision, label boxes, centering, then integration.

use crate::config::ForceConfig;
use crate::graph::{Node, SimulationState};

mod center;
mod collide;
mod label;
mod link;
mod many_body;
mod rng;

use link::LinkSpring;
use rng::XorShift64Star;

/// Largest absolute per-axis velocity after an integration step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickVelocity {
    pub max_x: f64,
    pub max_y: f64,
}

#[derive(Debug, Clone)]
pub struct ForceEngine {
    config: ForceConfig,
    links: Vec<LinkSpring>,
    rng: XorShift64Star,
}

impl ForceEngine {
    pub fn new(config: ForceConfig) -> Self {
        let rng = XorShift64Star::new(config.jiggle_seed);
        Self {
            config,
            links: Vec::new(),
            rng,
        }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Recomputes degree-derived spring strengths and biases from the state's arcs.
    ///
    /// Called once per run start; the strengths are also written back onto the arcs.
    pub fn initialize(&mut self, state: &mut SimulationState) {
        if state.is_arc_list_stale() {
            state.rebuild_arc_list();
        }
        let degrees = state.degrees();
        self.links = state
            .arc_list()
            .iter()
            .map(|e| LinkSpring::from_degrees(e.source, e.target, &degrees))
            .collect();
        let strengths: Vec<f64> = self.links.iter().map(|l| l.strength).collect();
        state.set_arc_strengths(&strengths);

        tracing::debug!(
            nodes = state.node_count(),
            arcs = self.links.len(),
            "force engine initialized"
        );
    }

    /// Applies every force once at `alpha` and integrates.
    ///
    /// A pinned axis resets `alpha` to 1.0 so the rest of the graph keeps reacting to it.
    pub fn tick(&mut self, state: &mut SimulationState, alpha: &mut f64) -> TickVelocity {
        let cfg = &self.config;
        let a = *alpha;
        let (mut nodes, arc_list) = state.split_for_tick();
        if arc_list.len() == self.links.len() {
            link::apply(&mut nodes, &self.links, a, cfg.link_distance, &mut self.rng);
        } else {
            tracing::warn!(
                arcs = arc_list.len(),
                springs = self.links.len(),
                "arc set changed since the run started; skipping link force"
            );
        }
        many_body::apply(
            &mut nodes,
            a,
            cfg.charge,
            cfg.distance_min_squared,
            &mut self.rng,
        );
        if cfg.collision_radius > 0.0 {
            collide::apply(
                &mut nodes,
                cfg.collision_radius,
                cfg.collision_strength,
                &mut self.rng,
            );
        }
        label::apply(&mut nodes, a, cfg.label_strength, &mut self.rng);
        center::apply(&mut nodes, a, cfg.center_strength_x, cfg.center_strength_y);
        integrate(&mut nodes, cfg.velocity_decay, alpha)
    }
}

fn integrate(nodes: &mut [&mut Node], velocity_decay: f64, alpha: &mut f64) -> TickVelocity {
    let keep = 1.0 - velocity_decay;
    let mut out = TickVelocity::default();
    for n in nodes.iter_mut() {
        match n.fx {
            Some(fx) => {
                n.x = fx;
                n.vx = 0.0;
                *alpha = 1.0;
            }
            None => {
                n.vx *= keep;
                n.x += n.vx;
            }
        }
        match n.fy {
            Some(fy) => {
                n.y = fy;
                n.vy = 0.0;
                *alpha = 1.0;
            }
            None => {
                n.vy *= keep;
                n.y += n.vy;
            }
        }
        out.max_x = out.max_x.max(n.vx.abs());
        out.max_y = out.max_y.max(n.vy.abs());
    }
    out
}

/// Two distinct nodes borrowed mutably at once.
fn pair_mut<'a>(nodes: &'a mut [&mut Node], i: usize, j: usize) -> (&'a mut Node, &'a mut Node) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = nodes.split_at_mut(j);
        (&mut *head[i], &mut *tail[0])
    } else {
        let (head, tail) = nodes.split_at_mut(i);
        (&mut *tail[0], &mut *head[j])
    }
}
