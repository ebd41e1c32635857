use sirenia::{ConnectivityResponse, ForceConfig, FrameQueue, GraphView, SimulationState};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn hub() -> ConnectivityResponse {
    serde_json::from_str(
        r#"{
            "focalEntity": { "id": "hub" },
            "neighborEntities": [{ "id": "x" }, { "id": "y" }, { "id": "z" }],
            "arcs": [
                { "fromId": "hub", "toId": "x", "relationKind": "r" },
                { "fromId": "hub", "toId": "y", "relationKind": "r" },
                { "fromId": "hub", "toId": "z", "relationKind": "r" }
            ]
        }"#,
    )
    .unwrap()
}

fn view() -> (GraphView, FrameQueue) {
    let q = FrameQueue::new();
    let mut view = GraphView::new(ForceConfig::default(), Rc::new(q.clone())).unwrap();
    view.ingest(&hub());
    (view, q)
}

#[test]
fn pinned_node_holds_its_position_on_every_tick() {
    let (mut view, q) = view();
    q.run_until_idle(10_000);

    let drifted = Rc::new(Cell::new(0u32));
    let ticks = Rc::new(Cell::new(0u32));
    let (d, t) = (Rc::clone(&drifted), Rc::clone(&ticks));
    view.set_on_tick(move |state: &SimulationState, _, _| {
        t.set(t.get() + 1);
        let x = state.node("x").unwrap();
        if (x.x, x.y) != (120.0, -40.0) || (x.vx, x.vy) != (0.0, 0.0) {
            d.set(d.get() + 1);
        }
    });

    view.drag_start("x").unwrap();
    assert!(view.drag_move(120.0, -40.0));
    q.run_until_idle(5_000);

    assert!(ticks.get() > 0);
    assert_eq!(drifted.get(), 0);
}

#[test]
fn released_node_resumes_at_rest_from_where_it_was_left() {
    let (mut view, q) = view();
    view.drag_start("y").unwrap();
    view.drag_move(-75.0, 20.0);
    q.run_frame();
    q.run_frame();

    assert!(view.drag_end());
    let state = view.state();
    let y = state.borrow().node("y").cloned().unwrap();
    assert_eq!((y.x, y.y), (-75.0, 20.0));
    assert_eq!((y.vx, y.vy), (0.0, 0.0));
    assert!(!y.is_pinned());
    assert!(view.dragged().is_none());

    q.run_until_idle(10_000);
    assert!(!view.is_running());
    let y = state.borrow().node("y").cloned().unwrap();
    assert!((y.x, y.y) != (-75.0, 20.0));
}

#[test]
fn drag_start_restarts_only_a_settled_view() {
    let (mut view, q) = view();
    let live = view.current_generation();
    view.drag_start("z").unwrap();
    assert_eq!(view.current_generation(), live);

    view.drag_end();
    q.run_until_idle(10_000);
    let settled = view.current_generation();
    view.drag_start("z").unwrap();
    assert_eq!(view.current_generation(), settled + 1);
    assert!(view.is_running());
}

#[test]
fn drag_on_an_unknown_node_fails_without_side_effects() {
    let (mut view, q) = view();
    q.run_until_idle(10_000);
    let generation = view.current_generation();

    assert!(view.drag_start("nope").is_err());
    assert_eq!(view.current_generation(), generation);
    assert!(!view.is_running());
    assert!(!view.drag_move(1.0, 2.0));
    assert!(!view.drag_end());
}

#[test]
fn snapshots_see_the_pin_through_the_read_model() {
    let (mut view, q) = view();
    view.drag_start("hub").unwrap();
    view.drag_move(3.0, 4.0);
    q.run_frame();

    let snapshot = view.snapshot();
    let hub = snapshot.nodes.iter().find(|n| n.id == "hub").unwrap();
    assert_eq!((hub.x, hub.y), (3.0, 4.0));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    view.set_on_running_changed(move |running| s.borrow_mut().push(running));
    view.drag_end();
    q.run_until_idle(10_000);
    assert_eq!(*seen.borrow(), vec![true, false]);
}
