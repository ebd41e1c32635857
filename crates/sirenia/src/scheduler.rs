//! Frame-driven run loop with cooperative cancellation.
//!
//! A run owns its alpha and a [`ForceEngine`], and re-arms itself through a [`FrameHost`] after
//! every tick. Each (re)start bumps a shared generation counter; a pending frame whose captured
//! generation no longer matches exits before touching the state, so at most one run is live.

use crate::config::ForceConfig;
use crate::force::{ForceEngine, TickVelocity};
use crate::graph::{SimulationState, SimulationStats};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

pub type Generation = u64;

type RunningSlot = Rc<RefCell<Option<Box<dyn FnMut(bool)>>>>;

/// The host environment's "call me on the next frame" primitive.
pub trait FrameHost {
    fn request_frame(&self, frame: Box<dyn FnOnce()>);
}

/// A manually pumped frame host for headless drivers and tests.
#[derive(Clone, Default)]
pub struct FrameQueue {
    pending: Rc<RefCell<VecDeque<Box<dyn FnOnce()>>>>,
}

impl std::fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Runs every callback requested before this frame began. Callbacks requested while the
    /// frame runs wait for the next one. Returns how many callbacks ran.
    pub fn run_frame(&self) -> usize {
        let frame: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        let n = frame.len();
        for cb in frame {
            cb();
        }
        n
    }

    /// Pumps frames until nothing is pending or `max_frames` frames ran; returns frames run.
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.pending() > 0 {
            self.run_frame();
            frames += 1;
        }
        frames
    }
}

impl FrameHost for FrameQueue {
    fn request_frame(&self, frame: Box<dyn FnOnce()>) {
        self.pending.borrow_mut().push_back(frame);
    }
}

pub struct TickScheduler {
    config: ForceConfig,
    host: Rc<dyn FrameHost>,
    generation: Rc<Cell<Generation>>,
    running: Rc<Cell<bool>>,
    /// The live run's `on_running_changed`, taken by whoever ends the run.
    running_changed: RunningSlot,
}

impl TickScheduler {
    pub fn new(config: ForceConfig, host: Rc<dyn FrameHost>) -> Self {
        Self {
            config,
            host,
            generation: Rc::new(Cell::new(0)),
            running: Rc::new(Cell::new(false)),
            running_changed: Rc::new(RefCell::new(None)),
        }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    pub fn current_generation(&self) -> Generation {
        self.generation.get()
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Supersedes the live run, if any, without starting another. A live run reports
    /// `on_running_changed(false)`.
    pub fn stop(&self) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        if self.running.replace(false) {
            tracing::debug!(generation, "simulation run stopped by host");
            report_stopped(&self.running_changed);
        }
    }

    /// Starts a new run over `state`, superseding any earlier run, and returns its generation.
    ///
    /// `on_tick(state, my_generation, current_generation)` fires after every tick the run
    /// performs; `on_running_changed` reports the start and the eventual stop. An empty state
    /// schedules nothing and reports `false` straight away.
    pub fn start_or_restart<T, R>(
        &self,
        state: Rc<RefCell<SimulationState>>,
        on_tick: T,
        on_running_changed: R,
    ) -> Generation
    where
        T: FnMut(&SimulationState, Generation, Generation) + 'static,
        R: FnMut(bool) + 'static,
    {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        // A superseded run never reports again.
        drop(self.running_changed.borrow_mut().take());
        let mut on_running_changed = on_running_changed;

        let empty = state.borrow().is_empty();
        if empty {
            tracing::debug!(generation, "empty simulation; nothing to schedule");
            self.running.set(false);
            on_running_changed(false);
            return generation;
        }

        let mut engine = ForceEngine::new(self.config.clone());
        {
            let mut st = state.borrow_mut();
            engine.initialize(&mut st);
            *st.stats_mut() = SimulationStats::default();
            tracing::debug!(
                generation,
                nodes = st.node_count(),
                arcs = st.arc_count(),
                "simulation run started"
            );
        }

        self.running.set(true);
        on_running_changed(true);
        if self.generation.get() != generation {
            // The callback stopped or restarted the simulation.
            if !self.running.get() {
                on_running_changed(false);
            }
            return generation;
        }
        *self.running_changed.borrow_mut() = Some(Box::new(on_running_changed));

        let run = Box::new(Run {
            generation,
            live: Rc::clone(&self.generation),
            running: Rc::clone(&self.running),
            host: Rc::clone(&self.host),
            state,
            alpha: 1.0,
            alpha_decay: self.config.alpha_decay(),
            engine,
            on_tick: Box::new(on_tick),
            running_changed: Rc::clone(&self.running_changed),
        });
        run.schedule();
        generation
    }
}

struct Run {
    generation: Generation,
    live: Rc<Cell<Generation>>,
    running: Rc<Cell<bool>>,
    host: Rc<dyn FrameHost>,
    state: Rc<RefCell<SimulationState>>,
    alpha: f64,
    alpha_decay: f64,
    engine: ForceEngine,
    on_tick: Box<dyn FnMut(&SimulationState, Generation, Generation)>,
    running_changed: RunningSlot,
}

fn report_stopped(slot: &RunningSlot) {
    let callback = slot.borrow_mut().take();
    if let Some(mut callback) = callback {
        callback(false);
    }
}

impl Run {
    fn schedule(self: Box<Self>) {
        let host = Rc::clone(&self.host);
        host.request_frame(Box::new(move || self.frame()));
    }

    fn frame(mut self: Box<Self>) {
        let live = self.live.get();
        if self.generation != live {
            tracing::trace!(
                generation = self.generation,
                live,
                "superseded run exits"
            );
            return;
        }

        let state = Rc::clone(&self.state);
        let keep_going = self.step(&mut state.borrow_mut());
        (self.on_tick)(&state.borrow(), self.generation, self.live.get());
        if self.generation != self.live.get() {
            // on_tick stopped or restarted the simulation.
            return;
        }

        if keep_going {
            self.schedule();
        } else {
            let stats = state.borrow().stats();
            tracing::debug!(
                generation = self.generation,
                ticks = stats.tick_count,
                alpha = self.alpha,
                "simulation run stopped"
            );
            self.running.set(false);
            report_stopped(&self.running_changed);
        }
    }

    /// One tick: decay alpha, run the engine, record stats, decide whether to continue.
    fn step(&mut self, state: &mut SimulationState) -> bool {
        let cfg = self.engine.config();
        let (alpha_target, alpha_min, iterations) =
            (cfg.alpha_target, cfg.alpha_min, cfg.iterations_per_tick);
        let (settle_min_ticks, settle_velocity) = (cfg.settle_min_ticks, cfg.settle_velocity);
        self.alpha += (alpha_target - self.alpha) * self.alpha_decay;

        let mut v = TickVelocity::default();
        for _ in 0..iterations {
            v = self.engine.tick(state, &mut self.alpha);
        }

        let stats = state.stats_mut();
        stats.tick_count += 1;
        stats.max_velocity_x = v.max_x;
        stats.max_velocity_y = v.max_y;
        tracing::trace!(
            tick = stats.tick_count,
            alpha = self.alpha,
            max_vx = v.max_x,
            max_vy = v.max_y,
            "tick"
        );

        let settled = stats.tick_count > settle_min_ticks
            && v.max_x < settle_velocity
            && v.max_y < settle_velocity;
        self.alpha >= alpha_min && !settled
    }
}
