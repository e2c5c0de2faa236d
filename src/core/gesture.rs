//! Gesture-to-transform adapter.
//!
//! Turns pointer-down / move / up on a placement handle into `TransformState`
//! updates. Every update is computed from the state captured at pointer-down,
//! so dropping intermediate moves never changes the result:
//!
//! ```text
//! move     position = start + (pointer - start_pointer)
//! scale    scale    = start * |pointer - center| / |start_pointer - center|
//! rotate   rotation = start + angle(pointer) - angle(start_pointer)
//! crop     inset    = start +/- edge delta, opposing edges never cross
//! ```
//!
//! Capture: the pointer that started a gesture owns it until up/cancel;
//! events from any other pointer are ignored. Moves are coalesced to one
//! commit per frame, pointer-up always commits the final state.

use glam::Vec2;
use log::{debug, trace};
use uuid::Uuid;

use super::frame_coalescer::FrameCoalescer;
use crate::entities::region::Region;
use crate::entities::space;
use crate::entities::transform::{TransformLimits, TransformState};

/// Start distances below this leave the scale unchanged.
const MIN_SCALE_DISTANCE: f32 = 1.0;

/// Pointer identity (mouse = 0, touches use their platform id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

impl PointerId {
    pub const MOUSE: PointerId = PointerId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];

    /// Unit-square offset from the wrapper center (+Y down).
    pub fn unit(&self) -> Vec2 {
        match self {
            Corner::TopLeft => Vec2::new(-0.5, -0.5),
            Corner::TopRight => Vec2::new(0.5, -0.5),
            Corner::BottomLeft => Vec2::new(-0.5, 0.5),
            Corner::BottomRight => Vec2::new(0.5, 0.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    /// Unit-square offset of the edge midpoint from the wrapper center (+Y down).
    pub fn unit(&self) -> Vec2 {
        match self {
            Edge::Left => Vec2::new(-0.5, 0.0),
            Edge::Right => Vec2::new(0.5, 0.0),
            Edge::Top => Vec2::new(0.0, -0.5),
            Edge::Bottom => Vec2::new(0.0, 0.5),
        }
    }
}

/// Which handle the gesture started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureMode {
    Move,
    ScaleCorner(Corner),
    Rotate,
    CropEdge(Edge),
}

impl GestureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureMode::Move => "move",
            GestureMode::ScaleCorner(_) => "scale",
            GestureMode::Rotate => "rotate",
            GestureMode::CropEdge(_) => "crop",
        }
    }
}

/// What a gesture edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureTarget {
    Region(Region),
    Floating(Uuid),
}

/// Transform to write back to the design.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformCommit {
    pub target: GestureTarget,
    pub state: TransformState,
    /// Pointer-up commit; no further updates follow for this gesture
    pub is_final: bool,
}

/// Snapshot taken at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureStart {
    pub mode: GestureMode,
    pub start_pointer: Vec2,
    /// Wrapper geometric center in screen space
    pub center: Vec2,
    pub start_state: TransformState,
}

impl GestureStart {
    /// Transform for the pointer at `pointer`, clamped to `limits`.
    pub fn resolve(&self, pointer: Vec2, limits: &TransformLimits) -> TransformState {
        let start = self.start_state;
        let delta = pointer - self.start_pointer;
        let mut next = start;

        match self.mode {
            GestureMode::Move => {
                next.position = start.position + delta;
            }
            GestureMode::ScaleCorner(_) => {
                let start_dist = space::distance(self.center, self.start_pointer);
                if start_dist >= MIN_SCALE_DISTANCE {
                    let ratio = space::distance(self.center, pointer) / start_dist;
                    next.scale = limits.scale.clamp(start.scale * ratio);
                }
            }
            GestureMode::Rotate => {
                let a0 = space::angle_deg(self.center, self.start_pointer);
                let a1 = space::angle_deg(self.center, pointer);
                next.rotation_deg = limits.rotation.clamp(start.rotation_deg + (a1 - a0));
            }
            GestureMode::CropEdge(edge) => {
                let room = (limits.crop_base_size - limits.min_visible).max(0.0);
                let c = start.crop;
                // outward drag reveals more (smaller inset), inward crops more
                match edge {
                    Edge::Left => next.crop.left = (c.left + delta.x).clamp(0.0, (room - c.right).max(0.0)),
                    Edge::Right => next.crop.right = (c.right - delta.x).clamp(0.0, (room - c.left).max(0.0)),
                    Edge::Top => next.crop.top = (c.top + delta.y).clamp(0.0, (room - c.bottom).max(0.0)),
                    Edge::Bottom => next.crop.bottom = (c.bottom - delta.y).clamp(0.0, (room - c.top).max(0.0)),
                }
            }
        }

        next.clamped(limits)
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveGesture {
    pointer: PointerId,
    target: GestureTarget,
    start: GestureStart,
}

/// Pointer capture + per-frame coalescing around [`GestureStart::resolve`].
#[derive(Debug, Clone)]
pub struct GestureController {
    limits: TransformLimits,
    active: Option<ActiveGesture>,
    pending: FrameCoalescer<TransformCommit>,
}

impl GestureController {
    pub fn new(limits: TransformLimits) -> Self {
        Self {
            limits: limits.sanitized(),
            active: None,
            pending: FrameCoalescer::new(),
        }
    }

    /// Begin a gesture and capture `pointer`.
    ///
    /// Returns false (and changes nothing) while another gesture owns capture.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        target: GestureTarget,
        mode: GestureMode,
        pos: Vec2,
        center: Vec2,
        state: TransformState,
    ) -> bool {
        if let Some(active) = &self.active {
            trace!("Gesture: pointer {:?} ignored, captured by {:?}", pointer, active.pointer);
            return false;
        }
        debug!("Gesture: {} started on {:?} by {:?}", mode.as_str(), target, pointer);
        self.active = Some(ActiveGesture {
            pointer,
            target,
            start: GestureStart {
                mode,
                start_pointer: pos,
                center,
                start_state: state,
            },
        });
        true
    }

    /// Route a move. Returns true if it belonged to the active gesture.
    pub fn pointer_move(&mut self, pointer: PointerId, pos: Vec2) -> bool {
        let Some(active) = self.captured(pointer) else {
            return false;
        };
        let state = active.start.resolve(pos, &self.limits);
        self.pending.schedule(TransformCommit {
            target: active.target,
            state,
            is_final: false,
        });
        true
    }

    /// End the gesture: release capture and return the final commit.
    pub fn pointer_up(&mut self, pointer: PointerId, pos: Vec2) -> Option<TransformCommit> {
        let active = self.captured(pointer)?;
        self.active = None;
        // final state supersedes whatever was waiting for a frame
        self.pending.cancel();
        let state = active.start.resolve(pos, &self.limits);
        debug!(
            "Gesture: {} finished on {:?} ({} moves coalesced so far)",
            active.start.mode.as_str(),
            active.target,
            self.pending.coalesced_count()
        );
        Some(TransformCommit {
            target: active.target,
            state,
            is_final: true,
        })
    }

    /// Platform cancelled the pointer: release capture, drop pending update.
    pub fn pointer_cancel(&mut self, pointer: PointerId) -> bool {
        if self.captured(pointer).is_none() {
            return false;
        }
        debug!("Gesture: cancelled by platform for {:?}", pointer);
        self.active = None;
        self.pending.cancel();
        true
    }

    /// At most one commit per frame; call from the update loop.
    pub fn take_frame_commit(&mut self) -> Option<TransformCommit> {
        self.pending.take_frame()
    }

    /// Stop any gesture editing `target` (its image was removed).
    pub fn cancel_target(&mut self, target: GestureTarget) {
        if self.active.map(|a| a.target) == Some(target) {
            debug!("Gesture: cancelled, target {:?} removed", target);
            self.active = None;
            self.pending.cancel();
        }
    }

    /// Stop everything (navigation away, shutdown, reload).
    pub fn cancel(&mut self) {
        if self.active.take().is_some() {
            debug!("Gesture: cancelled");
        }
        self.pending.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_target(&self) -> Option<GestureTarget> {
        self.active.map(|a| a.target)
    }

    pub fn active_mode(&self) -> Option<GestureMode> {
        self.active.map(|a| a.start.mode)
    }

    fn captured(&self, pointer: PointerId) -> Option<ActiveGesture> {
        self.active.filter(|a| a.pointer == pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::transform::{CropMargins, RotationRange};

    const FRONT: GestureTarget = GestureTarget::Region(Region::Front);

    fn controller() -> GestureController {
        GestureController::new(TransformLimits::default())
    }

    #[test]
    fn test_move_adds_screen_delta() {
        let mut g = controller();
        let start = TransformState { position: Vec2::new(10.0, 10.0), ..Default::default() };
        assert!(g.pointer_down(PointerId::MOUSE, FRONT, GestureMode::Move, Vec2::new(100.0, 100.0), Vec2::ZERO, start));
        g.pointer_move(PointerId::MOUSE, Vec2::new(120.0, 90.0));
        let commit = g.take_frame_commit().unwrap();
        assert_eq!(commit.state.position, Vec2::new(30.0, 0.0));
        assert!(!commit.is_final);
    }

    #[test]
    fn test_moves_coalesce_to_one_commit_per_frame() {
        let mut g = controller();
        g.pointer_down(PointerId::MOUSE, FRONT, GestureMode::Move, Vec2::ZERO, Vec2::ZERO, TransformState::default());
        for i in 1..=10 {
            g.pointer_move(PointerId::MOUSE, Vec2::new(i as f32, 0.0));
        }
        assert_eq!(g.take_frame_commit().map(|c| c.state.position.x), Some(10.0));
        assert!(g.take_frame_commit().is_none());
    }

    #[test]
    fn test_pointer_up_flushes_final_state() {
        let mut g = controller();
        g.pointer_down(PointerId::MOUSE, FRONT, GestureMode::Move, Vec2::ZERO, Vec2::ZERO, TransformState::default());
        g.pointer_move(PointerId::MOUSE, Vec2::new(5.0, 5.0));
        // frame never ran
        let commit = g.pointer_up(PointerId::MOUSE, Vec2::new(8.0, 6.0)).unwrap();
        assert!(commit.is_final);
        assert_eq!(commit.state.position, Vec2::new(8.0, 6.0));
        assert!(!g.is_active());
        assert!(g.take_frame_commit().is_none());
    }

    #[test]
    fn test_capture_ignores_other_pointers() {
        let mut g = controller();
        g.pointer_down(PointerId(1), FRONT, GestureMode::Move, Vec2::ZERO, Vec2::ZERO, TransformState::default());
        assert!(!g.pointer_down(PointerId(2), GestureTarget::Region(Region::Back), GestureMode::Rotate, Vec2::ZERO, Vec2::ZERO, TransformState::default()));
        assert!(!g.pointer_move(PointerId(2), Vec2::new(50.0, 0.0)));
        assert!(g.pointer_up(PointerId(2), Vec2::ZERO).is_none());
        assert!(g.is_active());
        assert!(g.pointer_cancel(PointerId(1)));
        assert!(!g.is_active());
    }

    #[test]
    fn test_scale_by_distance_ratio() {
        let mut g = controller();
        let center = Vec2::new(50.0, 50.0);
        g.pointer_down(PointerId::MOUSE, FRONT, GestureMode::ScaleCorner(Corner::BottomRight), Vec2::new(100.0, 50.0), center, TransformState::default());
        let c = g.pointer_up(PointerId::MOUSE, Vec2::new(150.0, 50.0)).unwrap();
        assert_eq!(c.state.scale, 200.0);
    }

    #[test]
    fn test_scale_clamps_at_floor() {
        let mut g = controller();
        let center = Vec2::ZERO;
        let start = TransformState { scale: 20.0, ..Default::default() };
        g.pointer_down(PointerId::MOUSE, FRONT, GestureMode::ScaleCorner(Corner::TopLeft), Vec2::new(-40.0, -40.0), center, start);
        g.pointer_move(PointerId::MOUSE, Vec2::new(-10.0, -10.0));
        assert_eq!(g.take_frame_commit().unwrap().state.scale, 20.0);
        // through the center: distance zero
        let c = g.pointer_up(PointerId::MOUSE, Vec2::ZERO).unwrap();
        assert_eq!(c.state.scale, 20.0);
        assert!(c.state.scale > 0.0);
    }

    #[test]
    fn test_scale_degenerate_start_keeps_scale() {
        let start = GestureStart {
            mode: GestureMode::ScaleCorner(Corner::TopRight),
            start_pointer: Vec2::new(0.2, 0.0),
            center: Vec2::ZERO,
            start_state: TransformState { scale: 80.0, ..Default::default() },
        };
        assert_eq!(start.resolve(Vec2::new(500.0, 0.0), &TransformLimits::default()).scale, 80.0);
    }

    #[test]
    fn test_rotate_half_turn_releases_capture() {
        let mut g = controller();
        let center = Vec2::new(200.0, 200.0);
        let start = TransformState { rotation_deg: 0.0, ..Default::default() };
        g.pointer_down(PointerId::MOUSE, FRONT, GestureMode::Rotate, Vec2::new(300.0, 200.0), center, start);
        g.pointer_move(PointerId::MOUSE, Vec2::new(200.0, 300.0));
        g.pointer_move(PointerId::MOUSE, Vec2::new(100.0, 200.0));
        let c = g.pointer_up(PointerId::MOUSE, Vec2::new(100.0, 200.0)).unwrap();
        assert!((c.state.rotation_deg.abs() - 180.0).abs() < 1e-3);
        assert!(!g.is_active());
        assert!(g.active_target().is_none());
        // an unrelated click starts a fresh gesture normally
        assert!(g.pointer_down(PointerId::MOUSE, GestureTarget::Region(Region::Back), GestureMode::Move, Vec2::ZERO, Vec2::ZERO, TransformState::default()));
        assert_eq!(g.active_mode(), Some(GestureMode::Move));
    }

    #[test]
    fn test_rotate_clamped_vs_free() {
        let start = GestureStart {
            mode: GestureMode::Rotate,
            start_pointer: Vec2::new(10.0, 0.0),
            center: Vec2::ZERO,
            start_state: TransformState { rotation_deg: 170.0, ..Default::default() },
        };
        let quarter = Vec2::new(0.0, 10.0);
        let clamped = start.resolve(quarter, &TransformLimits::default());
        assert_eq!(clamped.rotation_deg, 180.0);
        let free = TransformLimits { rotation: RotationRange::Free, ..Default::default() };
        assert!((start.resolve(quarter, &free).rotation_deg - 260.0).abs() < 1e-3);
    }

    #[test]
    fn test_crop_direction() {
        let limits = TransformLimits::default();
        let crop = CropMargins { left: 20.0, right: 20.0, top: 20.0, bottom: 20.0 };
        let base = TransformState { crop, ..Default::default() };
        let at = |edge: Edge, delta: Vec2| {
            GestureStart {
                mode: GestureMode::CropEdge(edge),
                start_pointer: Vec2::ZERO,
                center: Vec2::ZERO,
                start_state: base,
            }
            .resolve(delta, &limits)
            .crop
        };
        // outward reveals
        assert_eq!(at(Edge::Left, Vec2::new(-5.0, 0.0)).left, 15.0);
        assert_eq!(at(Edge::Right, Vec2::new(5.0, 0.0)).right, 15.0);
        assert_eq!(at(Edge::Top, Vec2::new(0.0, -5.0)).top, 15.0);
        assert_eq!(at(Edge::Bottom, Vec2::new(0.0, 5.0)).bottom, 15.0);
        // inward crops
        assert_eq!(at(Edge::Left, Vec2::new(5.0, 0.0)).left, 25.0);
        assert_eq!(at(Edge::Bottom, Vec2::new(0.0, -5.0)).bottom, 25.0);
        // never below zero
        assert_eq!(at(Edge::Left, Vec2::new(-500.0, 0.0)).left, 0.0);
    }

    #[test]
    fn test_crop_sequence_never_crosses() {
        let limits = TransformLimits::default();
        let mut state = TransformState::default();
        let drags = [
            (Edge::Left, Vec2::new(170.0, 0.0)),
            (Edge::Right, Vec2::new(-170.0, 0.0)),
            (Edge::Top, Vec2::new(0.0, 400.0)),
            (Edge::Bottom, Vec2::new(0.0, -400.0)),
            (Edge::Left, Vec2::new(-30.0, 0.0)),
            (Edge::Right, Vec2::new(-90.0, 0.0)),
            (Edge::Left, Vec2::new(1000.0, 0.0)),
        ];
        for (edge, delta) in drags {
            state = GestureStart {
                mode: GestureMode::CropEdge(edge),
                start_pointer: Vec2::new(50.0, 50.0),
                center: Vec2::ZERO,
                start_state: state,
            }
            .resolve(Vec2::new(50.0, 50.0) + delta, &limits);
            let c = state.crop;
            assert!(c.left + c.right <= limits.crop_base_size);
            assert!(c.top + c.bottom <= limits.crop_base_size);
            assert!(limits.crop_base_size - (c.left + c.right) >= limits.min_visible - 1e-3);
            assert!(limits.crop_base_size - (c.top + c.bottom) >= limits.min_visible - 1e-3);
        }
    }

    #[test]
    fn test_cancel_target_drops_pending() {
        let mut g = controller();
        g.pointer_down(PointerId::MOUSE, FRONT, GestureMode::Move, Vec2::ZERO, Vec2::ZERO, TransformState::default());
        g.pointer_move(PointerId::MOUSE, Vec2::new(3.0, 3.0));
        g.cancel_target(GestureTarget::Region(Region::Back));
        assert!(g.is_active());
        g.cancel_target(FRONT);
        assert!(!g.is_active());
        assert!(g.take_frame_commit().is_none());
        assert!(g.pointer_up(PointerId::MOUSE, Vec2::new(9.0, 9.0)).is_none());
    }
}
