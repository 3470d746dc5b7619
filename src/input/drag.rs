use crate::{core::geo::Point, rendering::scheduler::RenderScheduler};

/// Pointer gesture in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    pub anchor_point: Point,
    pub last_point: Point,
    /// Set once a move has been observed; a session without moves is a tap
    pub is_tracking: bool,
}

impl GestureSession {
    fn new(point: Point) -> Self {
        Self {
            anchor_point: point,
            last_point: point,
            is_tracking: false,
        }
    }

    pub fn delta(&self) -> Point {
        self.last_point.subtract(&self.anchor_point)
    }
}

/// Turns pointer movement into projection translation
///
/// Moves preview the drag by offsetting the translate from the canonical
/// origin; dropping commits the net delta into the projection center and puts
/// the translate back at the origin.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<GestureSession>,
    commits: u64,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A press began at `point`; the session is armed but not yet dragging
    pub fn start(&mut self, point: Point) {
        self.session = Some(GestureSession::new(point));
    }

    /// Whether a press is in progress
    pub fn is_armed(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the armed session has moved
    pub fn is_dragging(&self) -> bool {
        self.session.map(|s| s.is_tracking).unwrap_or(false)
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// Number of drags committed so far
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Pointer moved; queues a preview frame. Ignored outside a session.
    pub fn move_to<A>(&mut self, point: Point, frames: &mut RenderScheduler<A>) -> bool {
        let Some(session) = self.session.as_mut() else {
            log::trace!("move outside a drag session ignored");
            return false;
        };
        session.last_point = point;
        session.is_tracking = true;

        let delta = session.delta();
        frames.queue_with(move |p| {
            let preview = p.canonical_translate().add(&delta);
            p.set_translate(preview);
        });
        true
    }

    /// Press released; commits the drag if the session moved
    ///
    /// `release` is the pointer position reported with the release, when the
    /// device provides one. Returns the committed screen delta.
    pub fn drop<A>(&mut self, release: Option<Point>, frames: &mut RenderScheduler<A>) -> Option<Point> {
        let mut session = self.session.take()?;
        if !session.is_tracking {
            return None;
        }
        if let Some(point) = release.filter(Point::is_finite) {
            session.last_point = point;
        }

        let delta = session.delta();
        frames.queue_with(move |p| {
            let (grade_x, grade_y) = p.grade();
            let center = p.center().offset(-delta.y / grade_y, -delta.x / grade_x);
            p.set_center(center);
            p.set_translate(p.canonical_translate());
        });
        self.commits += 1;
        log::debug!("drag committed with delta ({:.1}, {:.1})", delta.x, delta.y);
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use crate::core::projection::{ProjectionState, ViewportContext};

    fn setup() -> (DragController, RenderScheduler<()>, ProjectionState) {
        (
            DragController::new(),
            RenderScheduler::new(),
            ProjectionState::new(ViewportContext::new(960.0, 480.0).unwrap()),
        )
    }

    #[test]
    fn test_start_arms_without_dragging() {
        let (mut drag, _, _) = setup();
        drag.start(Point::new(10.0, 10.0));
        assert!(drag.is_armed());
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_moves_coalesce_to_latest_preview() {
        let (mut drag, mut frames, mut projection) = setup();
        drag.start(Point::new(100.0, 100.0));
        drag.move_to(Point::new(110.0, 100.0), &mut frames);
        drag.move_to(Point::new(120.0, 105.0), &mut frames);
        drag.move_to(Point::new(150.0, 130.0), &mut frames);

        let mut draws = 0;
        frames.fire(&mut projection, |_| draws += 1);
        assert_eq!(draws, 1);
        assert_eq!(projection.translate(), Point::new(530.0, 270.0));
        assert_eq!(projection.center(), LatLng::origin());
        assert!(drag.is_dragging());
    }

    #[test]
    fn test_drop_commits_center() {
        let (mut drag, mut frames, mut projection) = setup();
        drag.start(Point::new(100.0, 100.0));
        drag.move_to(Point::new(150.0, 130.0), &mut frames);
        frames.fire(&mut projection, |_| {});

        assert_eq!(drag.drop(None, &mut frames), Some(Point::new(50.0, 30.0)));
        frames.fire(&mut projection, |_| {});

        let center = projection.center();
        assert!((center.lng - -18.75).abs() < 1e-9);
        assert!((center.lat - -10.0).abs() < 1e-9);
        assert_eq!(projection.translate(), Point::new(480.0, 240.0));
        assert!(!drag.is_armed());
        assert_eq!(drag.commits(), 1);
    }

    #[test]
    fn test_release_point_overrides_last_move() {
        let (mut drag, mut frames, mut projection) = setup();
        drag.start(Point::new(0.0, 0.0));
        drag.move_to(Point::new(10.0, 0.0), &mut frames);
        let delta = drag.drop(Some(Point::new(20.0, 0.0)), &mut frames);
        frames.fire(&mut projection, |_| {});

        assert_eq!(delta, Some(Point::new(20.0, 0.0)));
        assert!((projection.center().lng - -7.5).abs() < 1e-9);
    }

    #[test]
    fn test_tap_leaves_projection_untouched() {
        let (mut drag, mut frames, projection) = setup();
        let before = projection.clone();
        drag.start(Point::new(100.0, 100.0));

        assert_eq!(drag.drop(Some(Point::new(140.0, 100.0)), &mut frames), None);
        assert!(!frames.is_pending());
        assert!(!drag.is_armed());
        assert_eq!(projection, before);
    }

    #[test]
    fn test_late_events_are_ignored() {
        let (mut drag, mut frames, _) = setup();
        assert_eq!(drag.drop(None, &mut frames), None);
        assert!(!drag.move_to(Point::new(5.0, 5.0), &mut frames));
        assert!(!frames.is_pending());

        drag.start(Point::new(0.0, 0.0));
        drag.move_to(Point::new(5.0, 5.0), &mut frames);
        drag.drop(None, &mut frames);
        assert!(!drag.move_to(Point::new(50.0, 50.0), &mut frames));
        assert!(drag.session().is_none());
    }
}
