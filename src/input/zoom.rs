//! Hold-to-zoom state machine
//!
//! A press held past [`HOLD_THRESHOLD`] engages continuous zoom-in; a second
//! long press while zoomed resets the scale and, shortly after, the center.
//! Releasing cancels whichever deferred task is armed without changing state.

use crate::core::constants::{
    AUTO_ZOOM_STEP, DOUBLE_ACTIVATION_STEP, HOLD_THRESHOLD, RECENTER_DELAY,
    RESET_HOLD_THRESHOLD, ZOOM_TICK_INTERVAL, ZOOM_UNIT,
};
use crate::core::projection::ProjectionState;
use crate::rendering::scheduler::RenderScheduler;
use crate::runtime::{DeferredHandle, DeferredQueue};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoomState {
    Idle,
    ZoomingIn,
    ResettingOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoomTrigger {
    /// The hold threshold elapsed with the press still down
    HoldElapsed,
    /// A reset was requested, by a long press or a double activation
    ResetRequested,
    /// The reset finished restoring scale (and center, if asked to)
    ResetSettled,
    /// A new press arrived while a reset was still settling
    Interrupted,
}

impl ZoomState {
    /// Transition table; `None` marks an illegal transition
    pub fn transition(self, trigger: ZoomTrigger) -> Option<ZoomState> {
        use ZoomState::*;
        use ZoomTrigger::*;

        match (self, trigger) {
            (Idle, HoldElapsed) => Some(ZoomingIn),
            (Idle | ZoomingIn | ResettingOut, ResetRequested) => Some(ResettingOut),
            (ResettingOut, ResetSettled) => Some(Idle),
            (ResettingOut, Interrupted) => Some(Idle),
            _ => None,
        }
    }
}

/// Deferred tasks armed by the zoom controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomTask {
    Engage,
    Tick,
    BeginReset,
    Recenter,
}

/// Continuations attached to zoom frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomFollowUp {
    ScaleRestored { recenter: bool },
    Recentered,
}

pub type ZoomTimers = DeferredQueue<ZoomTask>;
pub type ZoomFrames = RenderScheduler<ZoomFollowUp>;

/// Converts sustained presses into auto-zoom and reverses it on demand
///
/// Holds at most one armed deferred task; arming always cancels the previous one.
#[derive(Debug)]
pub struct ZoomController {
    state: ZoomState,
    pending: Option<(ZoomTask, DeferredHandle)>,
    steps: u64,
    /// Whether scale changes queued for the next frame leave it off the
    /// baseline; `None` when nothing scale-related is queued
    queued_off_baseline: Option<bool>,
}

impl ZoomController {
    pub fn new() -> Self {
        Self {
            state: ZoomState::Idle,
            pending: None,
            steps: 0,
            queued_off_baseline: None,
        }
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    /// Whether a deferred task is currently armed
    pub fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|(_, handle)| !handle.is_cancelled())
            .unwrap_or(false)
    }

    /// Number of auto-zoom steps taken since creation
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Press began
    pub fn start(&mut self, timers: &mut ZoomTimers) {
        match self.state {
            ZoomState::Idle => self.arm(timers, HOLD_THRESHOLD, ZoomTask::Engage),
            ZoomState::ResettingOut => {
                self.cancel_pending();
                self.apply(ZoomTrigger::Interrupted);
                self.arm(timers, HOLD_THRESHOLD, ZoomTask::Engage);
            }
            ZoomState::ZoomingIn => self.arm(timers, RESET_HOLD_THRESHOLD, ZoomTask::BeginReset),
        }
    }

    /// Press released or pointer moved: cancel the armed hold task, keep the state
    ///
    /// A recenter already in flight is not press-driven and survives the release.
    pub fn end(&mut self) {
        if matches!(self.pending, Some((ZoomTask::Recenter, _))) {
            return;
        }
        self.cancel_pending();
    }

    /// Drops whatever task is pending, recenter included; used on teardown
    pub fn abort(&mut self) {
        self.cancel_pending();
    }

    /// Runs a deferred task that came due
    pub fn run_task(&mut self, task: ZoomTask, timers: &mut ZoomTimers, frames: &mut ZoomFrames) {
        // The task that fired is no longer pending
        self.pending = None;

        match task {
            ZoomTask::Engage => {
                if self.apply(ZoomTrigger::HoldElapsed) {
                    self.step(timers, frames);
                }
            }
            ZoomTask::Tick => {
                if self.state == ZoomState::ZoomingIn {
                    self.step(timers, frames);
                }
            }
            ZoomTask::BeginReset => {
                if self.state == ZoomState::ZoomingIn {
                    self.reset(true, frames);
                }
            }
            ZoomTask::Recenter => {
                if self.state == ZoomState::ResettingOut {
                    frames.queue(
                        Some(Box::new(|p: &mut ProjectionState| p.recenter())),
                        Some(ZoomFollowUp::Recentered),
                    );
                }
            }
        }
    }

    /// Restores the baseline scale, then optionally the center after [`RECENTER_DELAY`]
    pub fn reset(&mut self, recenter: bool, frames: &mut ZoomFrames) {
        self.cancel_pending();
        self.apply(ZoomTrigger::ResetRequested);
        self.queued_off_baseline = Some(false);
        frames.queue(
            Some(Box::new(|p: &mut ProjectionState| p.restore_baseline())),
            Some(ZoomFollowUp::ScaleRestored { recenter }),
        );
    }

    /// Continuation of a frame queued by this controller
    pub fn on_follow_up(&mut self, follow_up: ZoomFollowUp, timers: &mut ZoomTimers) {
        match follow_up {
            ZoomFollowUp::ScaleRestored { recenter } => {
                if self.state != ZoomState::ResettingOut {
                    return;
                }
                if recenter {
                    self.arm(timers, RECENTER_DELAY, ZoomTask::Recenter);
                } else {
                    self.apply(ZoomTrigger::ResetSettled);
                }
            }
            ZoomFollowUp::Recentered => {
                self.apply(ZoomTrigger::ResetSettled);
            }
        }
    }

    /// Immediate one-shot zoom-in; leaves the state machine alone
    pub fn zoom_once(&mut self, frames: &mut ZoomFrames) {
        self.queued_off_baseline = Some(true);
        frames.queue_with(|p| p.set_scale(p.scale() + DOUBLE_ACTIVATION_STEP));
    }

    /// Double activation: one-shot zoom from the baseline, reset otherwise
    ///
    /// Decides against the scale the next frame will show, so repeated
    /// activations before a frame alternate instead of stacking.
    pub fn double_activate(&mut self, projection: &ProjectionState, frames: &mut ZoomFrames) {
        let off_baseline = self
            .queued_off_baseline
            .unwrap_or_else(|| !projection.is_at_baseline());
        if off_baseline {
            self.reset(true, frames);
        } else {
            self.zoom_once(frames);
        }
    }

    /// A frame applied every queued scale change
    pub fn frame_drawn(&mut self) {
        self.queued_off_baseline = None;
    }

    /// Wheel zoom; scrolling up (negative delta) zooms in
    pub fn wheel(&mut self, delta_y: f64, frames: &mut ZoomFrames) {
        if !delta_y.is_finite() {
            log::warn!("ignoring non-finite wheel delta");
            return;
        }
        let change = -delta_y * ZOOM_UNIT;
        if change != 0.0 {
            self.queued_off_baseline = Some(true);
        }
        frames.queue_with(move |p| p.set_scale(p.scale() + change));
    }

    fn step(&mut self, timers: &mut ZoomTimers, frames: &mut ZoomFrames) {
        self.steps += 1;
        self.queued_off_baseline = Some(true);
        frames.queue_with(|p| p.set_scale(p.scale() + AUTO_ZOOM_STEP));
        self.arm(timers, ZOOM_TICK_INTERVAL, ZoomTask::Tick);
    }

    fn arm(&mut self, timers: &mut ZoomTimers, delay: Duration, task: ZoomTask) {
        self.cancel_pending();
        self.pending = Some((task, timers.schedule(delay, task)));
    }

    fn cancel_pending(&mut self) {
        if let Some((_, handle)) = self.pending.take() {
            handle.cancel();
        }
    }

    fn apply(&mut self, trigger: ZoomTrigger) -> bool {
        match self.state.transition(trigger) {
            Some(next) => {
                log::debug!("zoom {:?} --{:?}--> {:?}", self.state, trigger, next);
                self.state = next;
                true
            }
            None => {
                log::debug!("zoom ignores {:?} while {:?}", trigger, self.state);
                false
            }
        }
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new()
    }
}
