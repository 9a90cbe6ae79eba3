use std::cell::Cell;
use std::rc::Rc;

use tracing::warn;

pub const HIT_BUFFER_CAPACITY_DEFAULT: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// Drag exclusion token shared (via `Rc`) by every pick surface that must
/// never drag at the same time. At most one surface holds it; the holder
/// keeps it until its drag ends.
#[derive(Debug, Default)]
pub struct DragLock {
    owner: Cell<Option<SurfaceId>>,
}

impl DragLock {
    pub fn new() -> Self {
        Self {
            owner: Cell::new(None),
        }
    }

    pub fn owner(&self) -> Option<SurfaceId> {
        self.owner.get()
    }

    /// A surface may act this tick while it holds the token or nobody does.
    pub fn permits(&self, id: SurfaceId) -> bool {
        match self.owner.get() {
            None => true,
            Some(holder) => holder == id,
        }
    }

    fn acquire(&self, id: SurfaceId) -> bool {
        match self.owner.get() {
            None => {
                self.owner.set(Some(id));
                true
            }
            Some(holder) => holder == id,
        }
    }

    fn release(&self, id: SurfaceId) {
        if self.owner.get() == Some(id) {
            self.owner.set(None);
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PointerState {
    pub screen: (f32, f32),
    pub pressed: bool,
}

impl PointerState {
    pub fn pressed_at(x: f32, y: f32) -> Self {
        Self {
            screen: (x, y),
            pressed: true,
        }
    }

    pub fn released_at(x: f32, y: f32) -> Self {
        Self {
            screen: (x, y),
            pressed: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRect {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn new(min_x: f32, min_y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: (f32, f32)) -> bool {
        point.0 >= self.min_x
            && point.0 <= self.min_x + self.width
            && point.1 >= self.min_y
            && point.1 <= self.min_y + self.height
    }
}

/// Maps pointer screen samples onto the surface plane. A sample outside the
/// viewport means the pointer ray misses the plane.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceCamera {
    pub viewport: SurfaceRect,
    pub plane: SurfaceRect,
    pub plane_distance: f32,
}

impl SurfaceCamera {
    /// Camera whose viewport maps one-to-one onto the plane.
    pub fn overhead(plane: SurfaceRect, plane_distance: f32) -> Self {
        Self {
            viewport: plane,
            plane,
            plane_distance,
        }
    }

    pub fn plane_point(&self, screen: (f32, f32)) -> Option<(f32, f32)> {
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return None;
        }
        if !self.viewport.contains(screen) {
            return None;
        }
        let u = (screen.0 - self.viewport.min_x) / self.viewport.width;
        let v = (screen.1 - self.viewport.min_y) / self.viewport.height;
        Some((
            self.plane.min_x + u * self.plane.width,
            self.plane.min_y + v * self.plane.height,
        ))
    }

    /// Pick rays are tested out to twice the camera-to-plane distance.
    pub fn max_pick_distance(&self) -> f32 {
        self.plane_distance * 2.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PickHit {
    pub target: usize,
    pub distance: f32,
}

/// Ray query consumed from the input layer. Implementations write the
/// children of `layer` found under `point` into `hits` and return how many
/// they wrote; candidates past the end of the buffer are dropped.
pub trait PickScene {
    fn pick_candidates(
        &self,
        layer: u32,
        point: (f32, f32),
        max_distance: f32,
        hits: &mut [PickHit],
    ) -> usize;
}

/// The extension points a surface drives on its host. Everything defaults
/// to a no-op so a host overrides only what it needs.
pub trait SurfaceDelegate {
    fn pick_priority(&self, _target: usize) -> i32 {
        1
    }

    fn on_activate(&mut self, _target: usize) {}

    fn on_move(&mut self, _target: usize, _delta: (f32, f32)) {}

    fn on_deactivate(&mut self, _target: usize) {}
}

/// Pointer-driven drag surface. Advanced once per simulation tick; selects,
/// moves and releases a single active object among the children its host
/// reports on `child_layer`.
pub struct PickSurface {
    id: SurfaceId,
    camera: SurfaceCamera,
    child_layer: u32,
    lock: Rc<DragLock>,
    active: Option<usize>,
    anchor: (f32, f32),
    hit_buffer: Vec<PickHit>,
    full_hit_queries: u64,
}

impl PickSurface {
    pub fn new(id: SurfaceId, camera: SurfaceCamera, child_layer: u32, lock: Rc<DragLock>) -> Self {
        Self::with_hit_capacity(id, camera, child_layer, lock, HIT_BUFFER_CAPACITY_DEFAULT)
    }

    pub fn with_hit_capacity(
        id: SurfaceId,
        camera: SurfaceCamera,
        child_layer: u32,
        lock: Rc<DragLock>,
        capacity: usize,
    ) -> Self {
        Self {
            id,
            camera,
            child_layer,
            lock,
            active: None,
            anchor: (0.0, 0.0),
            hit_buffer: vec![PickHit::default(); capacity.max(1)],
            full_hit_queries: 0,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn hit_capacity(&self) -> usize {
        self.hit_buffer.len()
    }

    /// How many pick queries filled the hit buffer to the brim (and so may
    /// have dropped candidates).
    pub fn full_hit_queries(&self) -> u64 {
        self.full_hit_queries
    }

    pub fn tick<H>(&mut self, pointer: PointerState, host: &mut H)
    where
        H: PickScene + SurfaceDelegate,
    {
        // Another surface mid-drag freezes this one for the whole tick.
        if !self.lock.permits(self.id) {
            return;
        }
        if pointer.pressed {
            match self.active {
                None => {
                    let Some(point) = self.camera.plane_point(pointer.screen) else {
                        return;
                    };
                    let max_distance = self.camera.max_pick_distance();
                    if let Some(hit) = self.find_best_hit(host, point, max_distance) {
                        if self.lock.acquire(self.id) {
                            self.active = Some(hit.target);
                            self.anchor = point;
                            host.on_activate(hit.target);
                        }
                    }
                }
                Some(target) => match self.camera.plane_point(pointer.screen) {
                    Some(point) => {
                        let delta = (point.0 - self.anchor.0, point.1 - self.anchor.1);
                        self.anchor = point;
                        host.on_move(target, delta);
                    }
                    None => {
                        // Pointer ray left the plane: drop the object without
                        // the deactivate callback, but give the token back.
                        self.active = None;
                        self.lock.release(self.id);
                    }
                },
            }
        } else if let Some(target) = self.active.take() {
            host.on_deactivate(target);
            self.lock.release(self.id);
        }
    }

    fn find_best_hit<H>(&mut self, host: &H, point: (f32, f32), max_distance: f32) -> Option<PickHit>
    where
        H: PickScene + SurfaceDelegate,
    {
        let written = host.pick_candidates(self.child_layer, point, max_distance, &mut self.hit_buffer);
        let count = written.min(self.hit_buffer.len());
        if count == self.hit_buffer.len() {
            self.full_hit_queries += 1;
            warn!(
                surface = self.id.0,
                capacity = self.hit_buffer.len(),
                "pick hit buffer filled; extra candidates were dropped"
            );
        }
        let mut best: Option<PickHit> = None;
        let mut best_priority = i32::MIN;
        for hit in &self.hit_buffer[..count] {
            let priority = host.pick_priority(hit.target);
            if best.is_none() || priority > best_priority {
                best = Some(*hit);
                best_priority = priority;
            }
        }
        best
    }
}
