use sirenia::{
    ConnectivityResponse, ForceConfig, ForceEngine, FrameQueue, SimulationState, TickScheduler,
    ingest,
};
use std::cell::RefCell;
use std::rc::Rc;

fn linked_pair() -> ConnectivityResponse {
    serde_json::from_str(
        r#"{
            "focalEntity": { "id": "a", "label": "A" },
            "neighborEntities": [{ "id": "b", "label": "B" }],
            "arcs": [{ "fromId": "a", "toId": "b", "relationKind": "linked" }]
        }"#,
    )
    .unwrap()
}

fn settle(config: ForceConfig, response: &ConnectivityResponse) -> SimulationState {
    let mut state = SimulationState::with_initial_radius(config.initial_radius);
    ingest(&mut state, response);
    let state = Rc::new(RefCell::new(state));

    let q = FrameQueue::new();
    let sched = TickScheduler::new(config, Rc::new(q.clone()));
    sched.start_or_restart(Rc::clone(&state), |_, _, _| {}, |_| {});
    q.run_until_idle(10_000);
    assert!(!sched.is_running());
    state.borrow().clone()
}

fn distance(state: &SimulationState, a: &str, b: &str) -> f64 {
    let (a, b) = (state.node(a).unwrap(), state.node(b).unwrap());
    (a.x - b.x).hypot(a.y - b.y)
}

#[test]
fn linked_pair_settles_at_the_link_distance() {
    let config = ForceConfig {
        collision_radius: 0.0,
        ..ForceConfig::default()
    };
    let state = settle(config, &linked_pair());
    let d = distance(&state, "a", "b");
    assert!((d - 30.0).abs() <= 2.0, "settled at {d}");
}

#[test]
fn collision_keeps_a_linked_pair_apart_by_default() {
    let state = settle(ForceConfig::default(), &linked_pair());
    let d = distance(&state, "a", "b");
    assert!(d > 60.0 && d < 100.0, "settled at {d}");
}

#[test]
fn longer_links_settle_further_apart() {
    let short = settle(
        ForceConfig {
            collision_radius: 0.0,
            ..ForceConfig::default()
        },
        &linked_pair(),
    );
    let long = settle(
        ForceConfig {
            collision_radius: 0.0,
            link_distance: 60.0,
            ..ForceConfig::default()
        },
        &linked_pair(),
    );
    assert!(distance(&long, "a", "b") > distance(&short, "a", "b") + 10.0);
}

#[test]
fn coincident_nodes_stay_finite() {
    let mut state = SimulationState::new();
    ingest(&mut state, &linked_pair());
    for id in ["a", "b"] {
        let n = state.node_mut(id).unwrap();
        n.x = 5.0;
        n.y = 5.0;
    }

    let mut engine = ForceEngine::new(ForceConfig::default());
    engine.initialize(&mut state);
    let mut alpha = 1.0;
    engine.tick(&mut state, &mut alpha);

    for n in state.nodes() {
        assert!(n.x.is_finite() && n.y.is_finite(), "{n:?}");
        assert!(n.vx.is_finite() && n.vy.is_finite(), "{n:?}");
    }
    assert!(distance(&state, "a", "b") > 0.0);
}

#[test]
fn many_coincident_nodes_settle_without_nan() {
    let neighbors: Vec<String> = (0..8)
        .map(|i| format!(r#"{{ "id": "n{i}" }}"#))
        .collect();
    let response: ConnectivityResponse = serde_json::from_str(&format!(
        r#"{{ "focalEntity": {{ "id": "hub" }}, "neighborEntities": [{}] }}"#,
        neighbors.join(",")
    ))
    .unwrap();

    let mut state = SimulationState::with_initial_radius(0.0);
    ingest(&mut state, &response);
    let state = Rc::new(RefCell::new(state));
    let q = FrameQueue::new();
    let sched = TickScheduler::new(ForceConfig::default(), Rc::new(q.clone()));
    sched.start_or_restart(Rc::clone(&state), |_, _, _| {}, |_| {});
    q.run_until_idle(10_000);

    let state = state.borrow();
    assert!(state.nodes().all(|n| n.x.is_finite() && n.y.is_finite()));
    assert!(state.stats().max_velocity_x.is_finite());
}
