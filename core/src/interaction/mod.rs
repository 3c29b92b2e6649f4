//! Pointer interaction state machine
//!
//! Resolves raw pointer events against a set of hit-testable entities into
//! intents (drag, paint, click, hover). The machine never touches domain
//! state; labs apply the returned [`PointerIntent`] to their simulation.
//!
//! ```text
//! Idle --down on entity--> Dragging(target) --move--> Dragging(target)
//! Idle --down elsewhere (paint mode)--> Painting --move (throttled)--> Painting
//! Dragging | Painting --up / leave--> Idle
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::trace;
use serde::{Deserialize, Serialize};

use crate::geometry::PixelPoint;
use crate::simulation::PointId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    /// Pointer left the canvas bounds
    Leave,
}

/// Pointer event in logical canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: PixelPoint,
    /// Host event timestamp, used for paint throttling
    pub timestamp_ms: f64,
    /// Shift modifier held
    #[serde(default)]
    pub shift: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self {
            kind,
            position: PixelPoint::new(x, y),
            timestamp_ms,
            shift: false,
        }
    }

    pub fn down(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self::new(PointerEventKind::Down, x, y, timestamp_ms)
    }

    pub fn moved(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self::new(PointerEventKind::Move, x, y, timestamp_ms)
    }

    pub fn up(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self::new(PointerEventKind::Up, x, y, timestamp_ms)
    }

    pub fn leave(timestamp_ms: f64) -> Self {
        Self::new(PointerEventKind::Leave, -1.0, -1.0, timestamp_ms)
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Entity a pointer can grab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTarget {
    Centroid(usize),
    QueryMarker,
    Point(PointId),
    /// The 1D sigmoid curve
    Curve,
    /// A draggable decision boundary
    Boundary,
    /// An association-rule link
    Link(usize),
}

/// Hit-test precedence; markers are checked before plain points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HitPriority {
    Marker,
    Point,
}

/// Geometry of a hit region in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitShape {
    Circle { center: PixelPoint, radius: f64 },
    Segment { from: PixelPoint, to: PixelPoint, tolerance: f64 },
    /// Matches anywhere on the canvas at distance zero
    Anywhere,
}

impl HitShape {
    /// Distance from `at` when inside the region
    fn distance_within(&self, at: &PixelPoint) -> Option<f64> {
        match self {
            HitShape::Circle { center, radius } => {
                let d = at.distance(center);
                (d < *radius).then_some(d)
            }
            HitShape::Segment { from, to, tolerance } => {
                let d = at.distance_to_segment(from, to);
                (d < *tolerance).then_some(d)
            }
            HitShape::Anywhere => Some(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCandidate {
    pub target: HitTarget,
    pub shape: HitShape,
    pub priority: HitPriority,
}

impl HitCandidate {
    pub fn marker(target: HitTarget, center: PixelPoint, radius: f64) -> Self {
        Self {
            target,
            shape: HitShape::Circle { center, radius },
            priority: HitPriority::Marker,
        }
    }

    pub fn point(id: PointId, center: PixelPoint, radius: f64) -> Self {
        Self {
            target: HitTarget::Point(id),
            shape: HitShape::Circle { center, radius },
            priority: HitPriority::Point,
        }
    }
}

/// Nearest entity under the pointer
///
/// Markers win over plain points whenever any marker is in range; within
/// one priority the nearest candidate wins and exact ties keep the earlier
/// candidate.
pub fn hit_test(candidates: &[HitCandidate], at: PixelPoint) -> Option<HitTarget> {
    let mut best: Option<(HitPriority, f64, HitTarget)> = None;
    for candidate in candidates {
        let Some(distance) = candidate.shape.distance_within(&at) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some((priority, best_distance, _)) => {
                candidate.priority < *priority
                    || (candidate.priority == *priority && distance < *best_distance)
            }
        };
        if better {
            best = Some((candidate.priority, distance, candidate.target));
        }
    }
    best.map(|(_, _, target)| target)
}

/// What a press on empty canvas does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressBehavior {
    /// Start a throttled paint stroke
    Paint,
    /// Emit a single click
    Click,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Idle,
    Dragging(HitTarget),
    Painting,
}

/// Outcome of one pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerIntent {
    None,
    Hover(Option<HitTarget>),
    BeginDrag(HitTarget, PixelPoint),
    DragTo(HitTarget, PixelPoint),
    EndDrag(HitTarget),
    Paint(PixelPoint),
    EndPaint,
    Click { at: PixelPoint, shift: bool },
}

/// Cursor the host should display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorHint {
    Crosshair,
    Grab,
    Grabbing,
    Pointer,
    Default,
}

#[derive(Debug, Clone)]
pub struct PointerStateMachine {
    phase: PointerPhase,
    hover: Option<HitTarget>,
    last_paint_ms: Option<f64>,
    paint_throttle_ms: f64,
}

impl PointerStateMachine {
    pub fn new(paint_throttle_ms: f64) -> Self {
        Self {
            phase: PointerPhase::Idle,
            hover: None,
            last_paint_ms: None,
            paint_throttle_ms: paint_throttle_ms.max(0.0),
        }
    }

    #[inline]
    pub fn phase(&self) -> PointerPhase {
        self.phase
    }

    #[inline]
    pub fn hovered(&self) -> Option<HitTarget> {
        self.hover
    }

    pub fn dragged(&self) -> Option<HitTarget> {
        match self.phase {
            PointerPhase::Dragging(target) => Some(target),
            _ => None,
        }
    }

    /// Forces the machine back to idle, e.g. when the dragged entity vanished
    pub fn reset(&mut self) {
        self.phase = PointerPhase::Idle;
        self.hover = None;
        self.last_paint_ms = None;
    }

    /// Feeds one event through the machine
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        candidates: &[HitCandidate],
        press: PressBehavior,
    ) -> PointerIntent {
        let intent = match (event.kind, self.phase) {
            (PointerEventKind::Down, _) => {
                if let Some(target) = hit_test(candidates, event.position) {
                    self.phase = PointerPhase::Dragging(target);
                    self.hover = Some(target);
                    PointerIntent::BeginDrag(target, event.position)
                } else {
                    match press {
                        PressBehavior::Paint => {
                            self.phase = PointerPhase::Painting;
                            self.last_paint_ms = Some(event.timestamp_ms);
                            PointerIntent::Paint(event.position)
                        }
                        PressBehavior::Click => {
                            self.phase = PointerPhase::Idle;
                            PointerIntent::Click {
                                at: event.position,
                                shift: event.shift,
                            }
                        }
                        PressBehavior::Ignore => {
                            self.phase = PointerPhase::Idle;
                            PointerIntent::None
                        }
                    }
                }
            }
            (PointerEventKind::Move, PointerPhase::Dragging(target)) => {
                PointerIntent::DragTo(target, event.position)
            }
            (PointerEventKind::Move, PointerPhase::Painting) => {
                let due = self
                    .last_paint_ms
                    .map_or(true, |last| event.timestamp_ms - last >= self.paint_throttle_ms);
                if due {
                    self.last_paint_ms = Some(event.timestamp_ms);
                    PointerIntent::Paint(event.position)
                } else {
                    PointerIntent::None
                }
            }
            (PointerEventKind::Move, PointerPhase::Idle) => {
                self.hover = hit_test(candidates, event.position);
                PointerIntent::Hover(self.hover)
            }
            (PointerEventKind::Up | PointerEventKind::Leave, phase) => {
                self.phase = PointerPhase::Idle;
                self.last_paint_ms = None;
                // Release re-resolves hover where the pointer actually is
                self.hover = match event.kind {
                    PointerEventKind::Leave => None,
                    _ => hit_test(candidates, event.position),
                };
                match phase {
                    PointerPhase::Dragging(target) => PointerIntent::EndDrag(target),
                    PointerPhase::Painting => PointerIntent::EndPaint,
                    PointerPhase::Idle => PointerIntent::None,
                }
            }
        };
        trace!("pointer {:?} -> {:?} ({:?})", event.kind, intent, self.phase);
        intent
    }

    /// Cursor for the current phase and hover target
    pub fn cursor(&self) -> CursorHint {
        match self.phase {
            PointerPhase::Dragging(_) => CursorHint::Grabbing,
            PointerPhase::Painting => CursorHint::Crosshair,
            PointerPhase::Idle => match self.hover {
                Some(HitTarget::Link(_)) => CursorHint::Pointer,
                Some(HitTarget::Boundary) => CursorHint::Crosshair,
                Some(_) => CursorHint::Grab,
                None => CursorHint::Crosshair,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<HitCandidate> {
        vec![
            HitCandidate::point(PointId(1), PixelPoint::new(100.0, 100.0), 15.0),
            HitCandidate::point(PointId(2), PixelPoint::new(108.0, 100.0), 15.0),
            HitCandidate::marker(HitTarget::QueryMarker, PixelPoint::new(120.0, 100.0), 25.0),
        ]
    }

    #[test]
    fn test_marker_takes_priority() {
        // Point 2 is nearer, but the marker is also in range
        let hit = hit_test(&candidates(), PixelPoint::new(106.0, 100.0));
        assert_eq!(hit, Some(HitTarget::QueryMarker));
    }

    #[test]
    fn test_nearest_point_wins_without_marker() {
        let points = &candidates()[..2];
        assert_eq!(hit_test(points, PixelPoint::new(106.0, 100.0)), Some(HitTarget::Point(PointId(2))));
        assert_eq!(hit_test(points, PixelPoint::new(101.0, 100.0)), Some(HitTarget::Point(PointId(1))));
        assert_eq!(hit_test(points, PixelPoint::new(300.0, 300.0)), None);
    }

    #[test]
    fn test_equal_distance_keeps_first() {
        let points = &candidates()[..2];
        assert_eq!(hit_test(points, PixelPoint::new(104.0, 100.0)), Some(HitTarget::Point(PointId(1))));
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut machine = PointerStateMachine::new(50.0);
        let c = candidates();
        let begin = machine.handle(&PointerEvent::down(120.0, 100.0, 0.0), &c, PressBehavior::Paint);
        assert!(matches!(begin, PointerIntent::BeginDrag(HitTarget::QueryMarker, _)));
        assert_eq!(machine.cursor(), CursorHint::Grabbing);

        let drag = machine.handle(&PointerEvent::moved(500.0, 20.0, 1.0), &c, PressBehavior::Paint);
        assert_eq!(drag, PointerIntent::DragTo(HitTarget::QueryMarker, PixelPoint::new(500.0, 20.0)));

        let end = machine.handle(&PointerEvent::leave(2.0), &c, PressBehavior::Paint);
        assert_eq!(end, PointerIntent::EndDrag(HitTarget::QueryMarker));
        assert_eq!(machine.phase(), PointerPhase::Idle);
    }

    #[test]
    fn test_paint_is_throttled() {
        let mut machine = PointerStateMachine::new(50.0);
        let none: Vec<HitCandidate> = Vec::new();
        assert!(matches!(
            machine.handle(&PointerEvent::down(10.0, 10.0, 0.0), &none, PressBehavior::Paint),
            PointerIntent::Paint(_)
        ));
        assert_eq!(
            machine.handle(&PointerEvent::moved(20.0, 10.0, 30.0), &none, PressBehavior::Paint),
            PointerIntent::None
        );
        assert!(matches!(
            machine.handle(&PointerEvent::moved(30.0, 10.0, 50.0), &none, PressBehavior::Paint),
            PointerIntent::Paint(_)
        ));
        assert_eq!(
            machine.handle(&PointerEvent::up(30.0, 10.0, 60.0), &none, PressBehavior::Paint),
            PointerIntent::EndPaint
        );
    }

    #[test]
    fn test_click_mode_stays_idle() {
        let mut machine = PointerStateMachine::new(50.0);
        let intent = machine.handle(
            &PointerEvent::down(10.0, 10.0, 0.0).with_shift(),
            &[],
            PressBehavior::Click,
        );
        assert_eq!(intent, PointerIntent::Click { at: PixelPoint::new(10.0, 10.0), shift: true });
        assert_eq!(machine.phase(), PointerPhase::Idle);
    }

    #[test]
    fn test_hover_sets_grab_cursor() {
        let mut machine = PointerStateMachine::new(50.0);
        machine.handle(&PointerEvent::moved(100.0, 100.0, 0.0), &candidates(), PressBehavior::Paint);
        assert_eq!(machine.cursor(), CursorHint::Grab);
        machine.handle(&PointerEvent::moved(400.0, 400.0, 1.0), &candidates(), PressBehavior::Paint);
        assert_eq!(machine.cursor(), CursorHint::Crosshair);
    }

    #[test]
    fn test_release_off_target_drops_hover() {
        let mut machine = PointerStateMachine::new(50.0);
        let c = candidates();
        machine.handle(&PointerEvent::down(100.0, 100.0, 0.0), &c, PressBehavior::Click);
        machine.handle(&PointerEvent::moved(-500.0, -500.0, 16.0), &c, PressBehavior::Click);
        let end = machine.handle(&PointerEvent::up(-500.0, -500.0, 32.0), &c, PressBehavior::Click);
        assert_eq!(end, PointerIntent::EndDrag(HitTarget::Point(PointId(1))));
        assert_eq!(machine.hovered(), None);
        assert_eq!(machine.cursor(), CursorHint::Crosshair);

        // Releasing over a target keeps it hovered
        machine.handle(&PointerEvent::down(100.0, 100.0, 40.0), &c, PressBehavior::Click);
        machine.handle(&PointerEvent::up(100.0, 100.0, 50.0), &c, PressBehavior::Click);
        assert_eq!(machine.cursor(), CursorHint::Grab);
    }

    #[test]
    fn test_segment_hit() {
        let link = HitCandidate {
            target: HitTarget::Link(3),
            shape: HitShape::Segment {
                from: PixelPoint::new(0.0, 0.0),
                to: PixelPoint::new(100.0, 0.0),
                tolerance: 15.0,
            },
            priority: HitPriority::Marker,
        };
        assert_eq!(hit_test(&[link], PixelPoint::new(50.0, 10.0)), Some(HitTarget::Link(3)));
        assert_eq!(hit_test(&[link], PixelPoint::new(50.0, 20.0)), None);
    }
}
