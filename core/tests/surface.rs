use std::rc::Rc;

use jiguso_core::{
    DragLock, PickHit, PickScene, PickSurface, PointerState, SurfaceCamera, SurfaceDelegate,
    SurfaceId, SurfaceRect,
};

const LAYER: u32 = 7;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Event {
    Activate(usize),
    Move(usize, (f32, f32)),
    Deactivate(usize),
}

#[derive(Default)]
struct Rig {
    children: Vec<(SurfaceRect, i32)>,
    events: Vec<Event>,
}

impl Rig {
    fn with_children(children: Vec<(SurfaceRect, i32)>) -> Self {
        Self {
            children,
            events: Vec::new(),
        }
    }
}

impl PickScene for Rig {
    fn pick_candidates(
        &self,
        layer: u32,
        point: (f32, f32),
        _max_distance: f32,
        hits: &mut [PickHit],
    ) -> usize {
        if layer != LAYER {
            return 0;
        }
        let mut count = 0;
        for (id, (bounds, _)) in self.children.iter().enumerate() {
            if !bounds.contains(point) {
                continue;
            }
            if count == hits.len() {
                break;
            }
            hits[count] = PickHit {
                target: id,
                distance: 0.0,
            };
            count += 1;
        }
        count
    }
}

impl SurfaceDelegate for Rig {
    fn pick_priority(&self, target: usize) -> i32 {
        self.children[target].1
    }

    fn on_activate(&mut self, target: usize) {
        self.events.push(Event::Activate(target));
    }

    fn on_move(&mut self, target: usize, delta: (f32, f32)) {
        self.events.push(Event::Move(target, delta));
    }

    fn on_deactivate(&mut self, target: usize) {
        self.events.push(Event::Deactivate(target));
    }
}

fn child(x: f32, y: f32, priority: i32) -> (SurfaceRect, i32) {
    (SurfaceRect::new(x, y, 50.0, 50.0), priority)
}

fn camera() -> SurfaceCamera {
    SurfaceCamera::overhead(SurfaceRect::new(0.0, 0.0, 200.0, 200.0), 100.0)
}

fn surface(id: u32, lock: &Rc<DragLock>) -> PickSurface {
    PickSurface::new(SurfaceId(id), camera(), LAYER, Rc::clone(lock))
}

fn assert_close(actual: (f32, f32), expected: (f32, f32)) {
    assert!(
        (actual.0 - expected.0).abs() < 1.0e-3 && (actual.1 - expected.1).abs() < 1.0e-3,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn idle_pointer_picks_nothing() {
    let lock = Rc::new(DragLock::new());
    let mut surface = surface(1, &lock);
    let mut rig = Rig::with_children(vec![child(0.0, 0.0, 1)]);

    surface.tick(PointerState::released_at(10.0, 10.0), &mut rig);
    assert!(rig.events.is_empty());
    assert!(!surface.is_dragging());
    assert_eq!(lock.owner(), None);
}

#[test]
fn press_picks_the_highest_priority_child() {
    let lock = Rc::new(DragLock::new());
    let mut surface = surface(1, &lock);
    let mut rig = Rig::with_children(vec![
        child(0.0, 0.0, 5),
        child(10.0, 10.0, 9),
        child(5.0, 5.0, 2),
    ]);

    surface.tick(PointerState::pressed_at(20.0, 20.0), &mut rig);
    assert_eq!(rig.events, vec![Event::Activate(1)]);
    assert_eq!(surface.active(), Some(1));
    assert_eq!(lock.owner(), Some(SurfaceId(1)));
}

#[test]
fn priority_ties_go_to_the_first_hit() {
    let lock = Rc::new(DragLock::new());
    let mut surface = surface(1, &lock);
    let mut rig = Rig::with_children(vec![child(0.0, 0.0, 3), child(10.0, 10.0, 3)]);

    surface.tick(PointerState::pressed_at(20.0, 20.0), &mut rig);
    assert_eq!(rig.events, vec![Event::Activate(0)]);
}

#[test]
fn drag_reports_deltas_from_the_anchor() {
    let lock = Rc::new(DragLock::new());
    let mut surface = surface(1, &lock);
    let mut rig = Rig::with_children(vec![child(0.0, 0.0, 1)]);

    surface.tick(PointerState::pressed_at(10.0, 10.0), &mut rig);
    surface.tick(PointerState::pressed_at(15.0, 12.0), &mut rig);
    surface.tick(PointerState::pressed_at(15.0, 30.0), &mut rig);
    surface.tick(PointerState::released_at(15.0, 30.0), &mut rig);

    assert_eq!(rig.events.len(), 4);
    assert_eq!(rig.events[0], Event::Activate(0));
    let Event::Move(target, delta) = rig.events[1] else {
        panic!("expected a move event, got {:?}", rig.events[1]);
    };
    assert_eq!(target, 0);
    assert_close(delta, (5.0, 2.0));
    let Event::Move(_, delta) = rig.events[2] else {
        panic!("expected a move event, got {:?}", rig.events[2]);
    };
    assert_close(delta, (0.0, 18.0));
    assert_eq!(rig.events[3], Event::Deactivate(0));
    assert_eq!(lock.owner(), None);
    assert!(!surface.is_dragging());
}

#[test]
fn pointer_leaving_the_plane_drops_without_deactivate() {
    let lock = Rc::new(DragLock::new());
    let mut surface = surface(1, &lock);
    let mut rig = Rig::with_children(vec![child(0.0, 0.0, 1)]);

    surface.tick(PointerState::pressed_at(10.0, 10.0), &mut rig);
    surface.tick(PointerState::pressed_at(500.0, 500.0), &mut rig);

    assert_eq!(rig.events, vec![Event::Activate(0)]);
    assert!(!surface.is_dragging());
    assert_eq!(lock.owner(), None);

    // the dropped object can be grabbed again on a later tick
    surface.tick(PointerState::released_at(10.0, 10.0), &mut rig);
    surface.tick(PointerState::pressed_at(10.0, 10.0), &mut rig);
    assert_eq!(
        rig.events,
        vec![Event::Activate(0), Event::Activate(0)]
    );
}

#[test]
fn only_one_surface_wins_the_same_tick() {
    let lock = Rc::new(DragLock::new());
    let mut first = surface(1, &lock);
    let mut second = surface(2, &lock);
    let mut rig_a = Rig::with_children(vec![child(0.0, 0.0, 1)]);
    let mut rig_b = Rig::with_children(vec![child(0.0, 0.0, 1)]);

    let pointer = PointerState::pressed_at(10.0, 10.0);
    first.tick(pointer, &mut rig_a);
    second.tick(pointer, &mut rig_b);

    assert_eq!(rig_a.events, vec![Event::Activate(0)]);
    assert!(rig_b.events.is_empty());
    assert!(first.is_dragging());
    assert!(!second.is_dragging());
    assert_eq!(lock.owner(), Some(SurfaceId(1)));
}

#[test]
fn locked_out_surface_resumes_after_the_release() {
    let lock = Rc::new(DragLock::new());
    let mut first = surface(1, &lock);
    let mut second = surface(2, &lock);
    let mut rig_a = Rig::with_children(vec![child(0.0, 0.0, 1)]);
    let mut rig_b = Rig::with_children(vec![child(0.0, 0.0, 1)]);

    first.tick(PointerState::pressed_at(10.0, 10.0), &mut rig_a);
    second.tick(PointerState::pressed_at(10.0, 10.0), &mut rig_b);
    assert!(rig_b.events.is_empty());

    first.tick(PointerState::released_at(10.0, 10.0), &mut rig_a);
    assert_eq!(lock.owner(), None);

    second.tick(PointerState::pressed_at(10.0, 10.0), &mut rig_b);
    assert_eq!(rig_b.events, vec![Event::Activate(0)]);
    assert_eq!(lock.owner(), Some(SurfaceId(2)));
}

#[test]
fn full_hit_buffer_truncates_and_counts() {
    let lock = Rc::new(DragLock::new());
    let mut surface =
        PickSurface::with_hit_capacity(SurfaceId(1), camera(), LAYER, Rc::clone(&lock), 2);
    let mut rig = Rig::with_children(vec![
        child(0.0, 0.0, 1),
        child(5.0, 5.0, 4),
        child(10.0, 10.0, 9),
    ]);

    surface.tick(PointerState::pressed_at(20.0, 20.0), &mut rig);

    // the third child never made it into the buffer, so the best of the
    // first two wins
    assert_eq!(rig.events, vec![Event::Activate(1)]);
    assert_eq!(surface.full_hit_queries(), 1);
}

#[test]
fn pick_misses_outside_every_child() {
    let lock = Rc::new(DragLock::new());
    let mut surface = surface(1, &lock);
    let mut rig = Rig::with_children(vec![child(0.0, 0.0, 1)]);

    surface.tick(PointerState::pressed_at(150.0, 150.0), &mut rig);
    assert!(rig.events.is_empty());
    assert_eq!(lock.owner(), None);
}
