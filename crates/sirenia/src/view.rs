//! One explored graph view: its simulation, scheduler, drag state and render callbacks.

use crate::config::ForceConfig;
use crate::drag::DragInteraction;
use crate::error::Result;
use crate::graph::{LayoutSnapshot, SimulationState};
use crate::ingest::{ConnectivityResponse, IngestReport, ingest};
use crate::measure::{LabelMeasurer, measure_pending};
use crate::scheduler::{FrameHost, Generation, TickScheduler};
use crate::source::ConnectivitySource;
use std::cell::RefCell;
use std::rc::Rc;

type TickCallback = Rc<RefCell<Box<dyn FnMut(&SimulationState, Generation, Generation)>>>;
type RunningCallback = Rc<RefCell<Box<dyn FnMut(bool)>>>;

/// Owns the generation counter for a view and restarts the simulation when its inputs change.
///
/// The view is single-threaded: all mutation happens between frames on the thread that pumps the
/// [`FrameHost`].
///
/// ```
/// use sirenia::{ConnectivityResponse, ForceConfig, FrameQueue, GraphView};
/// use std::rc::Rc;
///
/// let frames = FrameQueue::new();
/// let mut view = GraphView::new(ForceConfig::default(), Rc::new(frames.clone())).unwrap();
/// let response: ConnectivityResponse = serde_json::from_str(
///     r#"{"focalEntity": {"id": "a"}, "neighborEntities": [{"id": "b"}],
///         "arcs": [{"fromId": "a", "toId": "b", "relationKind": "knows"}]}"#,
/// )
/// .unwrap();
/// view.ingest(&response);
/// frames.run_until_idle(1_000);
/// assert!(!view.is_running());
/// assert_eq!(view.snapshot().nodes.len(), 2);
/// ```
pub struct GraphView {
    state: Rc<RefCell<SimulationState>>,
    scheduler: TickScheduler,
    drag: DragInteraction,
    on_tick: TickCallback,
    on_running_changed: RunningCallback,
}

impl GraphView {
    pub fn new(config: ForceConfig, host: Rc<dyn FrameHost>) -> Result<Self> {
        config.validate()?;
        let state = SimulationState::with_initial_radius(config.initial_radius);
        let on_tick: Box<dyn FnMut(&SimulationState, Generation, Generation)> =
            Box::new(|_: &SimulationState, _: Generation, _: Generation| {});
        let on_running_changed: Box<dyn FnMut(bool)> = Box::new(|_: bool| {});
        Ok(Self {
            state: Rc::new(RefCell::new(state)),
            scheduler: TickScheduler::new(config, host),
            drag: DragInteraction::new(),
            on_tick: Rc::new(RefCell::new(on_tick)),
            on_running_changed: Rc::new(RefCell::new(on_running_changed)),
        })
    }

    /// Replaces the render callback. Takes effect for the live run as well.
    pub fn set_on_tick<F>(&mut self, f: F)
    where
        F: FnMut(&SimulationState, Generation, Generation) + 'static,
    {
        *self.on_tick.borrow_mut() = Box::new(f);
    }

    pub fn set_on_running_changed<F>(&mut self, f: F)
    where
        F: FnMut(bool) + 'static,
    {
        *self.on_running_changed.borrow_mut() = Box::new(f);
    }

    /// Shared handle to the simulation. Do not hold a borrow across a frame.
    pub fn state(&self) -> Rc<RefCell<SimulationState>> {
        Rc::clone(&self.state)
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        self.state.borrow().snapshot()
    }

    pub fn config(&self) -> &ForceConfig {
        self.scheduler.config()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn current_generation(&self) -> Generation {
        self.scheduler.current_generation()
    }

    pub fn dragged(&self) -> Option<&str> {
        self.drag.dragged()
    }

    /// Starts a fresh run, superseding the live one.
    pub fn restart(&self) -> Generation {
        let on_tick = Rc::clone(&self.on_tick);
        let on_running_changed = Rc::clone(&self.on_running_changed);
        self.scheduler.start_or_restart(
            Rc::clone(&self.state),
            move |state, mine, current| (*on_tick.borrow_mut())(state, mine, current),
            move |running| (*on_running_changed.borrow_mut())(running),
        )
    }

    /// Ends the live run; the running-changed callback sees `false`.
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Merges `response` and restarts the run if anything new arrived.
    pub fn ingest(&mut self, response: &ConnectivityResponse) -> IngestReport {
        let report = ingest(&mut self.state.borrow_mut(), response);
        if report.changed() {
            self.restart();
        }
        report
    }

    /// Fetches the connectivity of `entity_id` from `source` and ingests it.
    pub async fn expand<S>(&mut self, source: &S, entity_id: &str) -> Result<IngestReport>
    where
        S: ConnectivitySource,
    {
        let response = source.fetch(entity_id).await?;
        Ok(self.ingest(&response))
    }

    /// Caches label boxes for every node not yet measured; returns how many were measured.
    pub fn measure_labels(&self, measurer: &dyn LabelMeasurer) -> usize {
        measure_pending(&mut self.state.borrow_mut(), measurer)
    }

    /// Pins `id` where it is and wakes the simulation if it had settled.
    pub fn drag_start(&mut self, id: &str) -> Result<()> {
        self.drag.drag_start(&mut self.state.borrow_mut(), id)?;
        if !self.scheduler.is_running() {
            self.restart();
        }
        Ok(())
    }

    pub fn drag_move(&mut self, x: f64, y: f64) -> bool {
        self.drag.drag_move(&mut self.state.borrow_mut(), x, y)
    }

    /// Releases the dragged node and lets the graph resettle around it.
    pub fn drag_end(&mut self) -> bool {
        let released = self.drag.drag_end(&mut self.state.borrow_mut());
        if released {
            self.restart();
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameQueue;
    use std::cell::Cell;

    fn pair() -> ConnectivityResponse {
        serde_json::from_str(
            r#"{"focalEntity": {"id": "a", "label": "A"},
                "neighborEntities": [{"id": "b", "label": "B"}],
                "arcs": [{"fromId": "a", "toId": "b", "relationKind": "r"}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn ingest_restarts_only_when_something_changed() {
        let q = FrameQueue::new();
        let mut view = GraphView::new(ForceConfig::default(), Rc::new(q.clone())).unwrap();
        view.ingest(&pair());
        assert_eq!(view.current_generation(), 1);
        assert!(view.is_running());

        q.run_until_idle(1_000);
        let report = view.ingest(&pair());
        assert!(!report.changed());
        assert_eq!(view.current_generation(), 1);
        assert!(!view.is_running());
    }

    #[test]
    fn drag_start_wakes_a_settled_view() {
        let q = FrameQueue::new();
        let mut view = GraphView::new(ForceConfig::default(), Rc::new(q.clone())).unwrap();
        view.ingest(&pair());
        q.run_until_idle(1_000);
        assert!(!view.is_running());

        view.drag_start("b").unwrap();
        assert!(view.is_running());
        assert_eq!(view.dragged(), Some("b"));
        assert!(view.drag_move(100.0, 0.0));
        q.run_frame();
        assert_eq!(view.state().borrow().node("b").unwrap().x, 100.0);

        let before = view.current_generation();
        assert!(view.drag_end());
        assert_eq!(view.current_generation(), before + 1);
    }

    #[test]
    fn callbacks_set_later_reach_the_live_run() {
        let q = FrameQueue::new();
        let mut view = GraphView::new(ForceConfig::default(), Rc::new(q.clone())).unwrap();
        view.ingest(&pair());
        let ticks = Rc::new(Cell::new(0u64));
        let t = Rc::clone(&ticks);
        view.set_on_tick(move |_, _, _| t.set(t.get() + 1));
        q.run_until_idle(1_000);
        assert!(ticks.get() > 0);
        assert_eq!(ticks.get(), view.snapshot().stats.tick_count);
    }

    #[test]
    fn restart_on_an_empty_view_reports_to_a_callback_reading_the_state() {
        let q = FrameQueue::new();
        let mut view = GraphView::new(ForceConfig::default(), Rc::new(q.clone())).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (state, s) = (view.state(), Rc::clone(&seen));
        view.set_on_running_changed(move |running| {
            s.borrow_mut().push((running, state.borrow().node_count()));
        });
        view.restart();
        assert_eq!(*seen.borrow(), vec![(false, 0)]);
        assert!(!view.is_running());
    }

    #[test]
    fn stop_reports_the_live_run_ending() {
        let q = FrameQueue::new();
        let mut view = GraphView::new(ForceConfig::default(), Rc::new(q.clone())).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        view.set_on_running_changed(move |running| s.borrow_mut().push(running));
        view.ingest(&pair());
        q.run_frame();
        view.stop();
        q.run_until_idle(1_000);
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(!view.is_running());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = ForceConfig {
            velocity_decay: 2.0,
            ..ForceConfig::default()
        };
        assert!(GraphView::new(cfg, Rc::new(FrameQueue::new())).is_err());
    }
}
