use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of ticks an unopposed run takes for alpha to fall from 1.0 to `alpha_min`.
pub const DEFAULT_SETTLE_TICKS: f64 = 300.0;

/// Tuning for the force simulation.
///
/// Every field has a default, so a JSON config only needs the keys it overrides:
///
/// ```
/// let cfg = sirenia::ForceConfig::from_json_str(r#"{ "linkDistance": 45 }"#).unwrap();
/// assert_eq!(cfg.link_distance, 45.0);
/// assert_eq!(cfg.velocity_decay, 0.03);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForceConfig {
    /// Rest length of every arc spring.
    pub link_distance: f64,
    /// Many-body strength. Negative values repel.
    pub charge: f64,
    /// Squared-distance floor for the many-body force.
    pub distance_min_squared: f64,
    /// Node radius used by the collision force. `<= 0` disables collisions.
    pub collision_radius: f64,
    pub collision_strength: f64,
    /// Fraction of a vertical label-box overlap resolved per tick (times alpha).
    pub label_strength: f64,
    pub center_strength_x: f64,
    pub center_strength_y: f64,
    pub velocity_decay: f64,
    pub alpha_min: f64,
    /// Per-tick alpha decay. When absent it is derived from `alpha_min` so that alpha
    /// reaches the floor after [`DEFAULT_SETTLE_TICKS`] ticks.
    pub alpha_decay: Option<f64>,
    pub alpha_target: f64,
    /// ForceEngine sub-iterations per scheduled frame.
    pub iterations_per_tick: usize,
    /// A run stops early once both per-axis max velocities drop below this.
    pub settle_velocity: f64,
    /// Early stop is only considered after this many ticks.
    pub settle_min_ticks: u64,
    /// Phyllotaxis radius used to seed new nodes.
    pub initial_radius: f64,
    /// Seed for the jiggle generator.
    pub jiggle_seed: u64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            link_distance: 30.0,
            charge: -900.0,
            distance_min_squared: 1.0,
            collision_radius: 40.0,
            collision_strength: 1.0,
            label_strength: 0.5,
            center_strength_x: 0.1,
            center_strength_y: 0.12,
            velocity_decay: 0.03,
            alpha_min: 0.001,
            alpha_decay: None,
            alpha_target: 0.0,
            iterations_per_tick: 1,
            settle_velocity: 0.6,
            settle_min_ticks: 5,
            initial_radius: 10.0,
            jiggle_seed: 1,
        }
    }
}

impl ForceConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn alpha_decay(&self) -> f64 {
        self.alpha_decay
            .unwrap_or_else(|| 1.0 - self.alpha_min.powf(1.0 / DEFAULT_SETTLE_TICKS))
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::Config {
                message: message.to_string(),
            })
        };

        if !(self.link_distance.is_finite() && self.link_distance >= 0.0) {
            return invalid("linkDistance must be a finite, non-negative number");
        }
        if !self.charge.is_finite() {
            return invalid("charge must be finite");
        }
        if !(self.distance_min_squared.is_finite() && self.distance_min_squared > 0.0) {
            return invalid("distanceMinSquared must be positive");
        }
        if !self.collision_radius.is_finite() {
            return invalid("collisionRadius must be finite");
        }
        let strengths = [
            ("collisionStrength", self.collision_strength),
            ("labelStrength", self.label_strength),
            ("centerStrengthX", self.center_strength_x),
            ("centerStrengthY", self.center_strength_y),
        ];
        for (name, value) in strengths {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Config {
                    message: format!("{name} must be a finite, non-negative number"),
                });
            }
        }
        if !(self.initial_radius.is_finite() && self.initial_radius >= 0.0) {
            return invalid("initialRadius must be a finite, non-negative number");
        }
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return invalid("velocityDecay must be within [0, 1]");
        }
        if !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
            return invalid("alphaMin must be within (0, 1)");
        }
        if !(self.alpha_target >= 0.0 && self.alpha_target < self.alpha_min) {
            return invalid("alphaTarget must be within [0, alphaMin)");
        }
        if !(self.settle_velocity.is_finite() && self.settle_velocity >= 0.0) {
            return invalid("settleVelocity must be a finite, non-negative number");
        }
        if let Some(decay) = self.alpha_decay {
            if !(decay > 0.0 && decay <= 1.0) {
                return invalid("alphaDecay must be within (0, 1]");
            }
        }
        if self.iterations_per_tick == 0 {
            return invalid("iterationsPerTick must be at least 1");
        }
        Ok(())
    }
}
