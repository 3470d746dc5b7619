use crate::core::projection::ProjectionState;

/// Mutation applied to the projection right before a draw pass
pub type PreFrame = Box<dyn FnOnce(&mut ProjectionState) + Send>;

struct PendingFrame<A> {
    mutations: Vec<PreFrame>,
    follow_up: Option<A>,
}

/// Result of a fired display frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport<A> {
    /// Number of coalesced pre-frame mutations applied before drawing
    pub mutations: usize,
    /// Continuation the owner must run now that the frame is drawn
    pub follow_up: Option<A>,
}

/// Coalesces redraw requests into at most one draw pass per display frame
///
/// This is the only place a draw pass is invoked and the only writer of the
/// shared projection: every mutation travels as a pre-frame closure. While a
/// frame is pending, further requests chain their mutations onto it; a new
/// continuation replaces the previous one, and a request without one keeps it.
pub struct RenderScheduler<A> {
    pending: Option<PendingFrame<A>>,
    frames_drawn: u64,
    requests: u64,
}

impl<A> RenderScheduler<A> {
    pub fn new() -> Self {
        Self {
            pending: None,
            frames_drawn: 0,
            requests: 0,
        }
    }

    /// Requests a redraw on the next display frame
    ///
    /// Returns `true` when this call scheduled a new frame, `false` when it was
    /// absorbed into the one already pending.
    pub fn queue(&mut self, pre_frame: Option<PreFrame>, follow_up: Option<A>) -> bool {
        self.requests += 1;
        match self.pending.as_mut() {
            Some(pending) => {
                pending.mutations.extend(pre_frame);
                if follow_up.is_some() {
                    pending.follow_up = follow_up;
                }
                log::trace!(
                    "coalesced redraw request ({} mutations pending)",
                    pending.mutations.len()
                );
                false
            }
            None => {
                self.pending = Some(PendingFrame {
                    mutations: pre_frame.into_iter().collect(),
                    follow_up,
                });
                true
            }
        }
    }

    /// Requests a plain redraw with no mutation
    pub fn request(&mut self) -> bool {
        self.queue(None, None)
    }

    /// Requests a redraw preceded by `mutation`
    pub fn queue_with<F>(&mut self, mutation: F) -> bool
    where
        F: FnOnce(&mut ProjectionState) + Send + 'static,
    {
        self.queue(Some(Box::new(mutation)), None)
    }

    /// Cancels the pending frame, if any
    pub fn stop(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("pending frame cancelled");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Total number of redraw requests received, coalesced or not
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Display-frame callback
    ///
    /// Applies every queued mutation in arrival order, runs `draw` once, and
    /// hands back the continuation. Does nothing when no frame is pending.
    pub fn fire<F>(&mut self, projection: &mut ProjectionState, draw: F) -> Option<FrameReport<A>>
    where
        F: FnOnce(&ProjectionState),
    {
        let pending = self.pending.take()?;
        let mutations = pending.mutations.len();
        for mutation in pending.mutations {
            mutation(projection);
        }
        draw(projection);
        self.frames_drawn += 1;
        Some(FrameReport {
            mutations,
            follow_up: pending.follow_up,
        })
    }
}

impl<A> Default for RenderScheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;
    use crate::core::projection::ViewportContext;

    fn projection() -> ProjectionState {
        ProjectionState::new(ViewportContext::new(960.0, 480.0).unwrap())
    }

    #[test]
    fn test_requests_coalesce_into_one_draw() {
        let mut scheduler: RenderScheduler<()> = RenderScheduler::new();
        let mut projection = projection();

        assert!(scheduler.request());
        for _ in 0..9 {
            assert!(!scheduler.request());
        }

        let mut draws = 0;
        let report = scheduler.fire(&mut projection, |_| draws += 1);
        assert!(report.is_some());
        assert_eq!(draws, 1);
        assert_eq!(scheduler.frames_drawn(), 1);
        assert_eq!(scheduler.requests(), 10);

        // Nothing pending: a spurious frame callback draws nothing
        assert!(scheduler.fire(&mut projection, |_| draws += 1).is_none());
        assert_eq!(draws, 1);
    }

    #[test]
    fn test_mutations_apply_in_order_before_draw() {
        let mut scheduler: RenderScheduler<()> = RenderScheduler::new();
        let mut projection = projection();

        scheduler.queue_with(|p| p.set_translate(Point::new(1.0, 1.0)));
        scheduler.queue_with(|p| p.set_translate(Point::new(2.0, 2.0)));
        scheduler.queue_with(|p| p.set_scale(500.0));

        let mut seen = None;
        let report = scheduler
            .fire(&mut projection, |p| seen = Some((p.translate(), p.scale())))
            .unwrap();

        assert_eq!(report.mutations, 3);
        assert_eq!(seen, Some((Point::new(2.0, 2.0), 500.0)));
    }

    #[test]
    fn test_latest_follow_up_wins_and_is_preserved() {
        let mut scheduler = RenderScheduler::new();
        let mut projection = projection();

        scheduler.queue(None, Some("first"));
        scheduler.queue(None, Some("second"));
        scheduler.queue(None, None);

        let report = scheduler.fire(&mut projection, |_| {}).unwrap();
        assert_eq!(report.follow_up, Some("second"));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut scheduler: RenderScheduler<()> = RenderScheduler::new();
        let mut projection = projection();
        let before = projection.clone();

        scheduler.stop();
        scheduler.queue_with(|p| p.set_scale(1000.0));
        scheduler.stop();
        scheduler.stop();

        assert!(!scheduler.is_pending());
        assert!(scheduler.fire(&mut projection, |_| {}).is_none());
        assert_eq!(projection, before);
    }

    #[test]
    fn test_new_frame_after_fire() {
        let mut scheduler: RenderScheduler<()> = RenderScheduler::new();
        let mut projection = projection();

        scheduler.request();
        scheduler.fire(&mut projection, |_| {});
        assert!(scheduler.request());
        scheduler.fire(&mut projection, |_| {});
        assert_eq!(scheduler.frames_drawn(), 2);
    }
}
