//! Frame-coalesced redraw scheduling.

/// Arms the host's next display-refresh callback. The host answers by calling
/// [`Surface::on_frame`](super::Surface::on_frame) once.
pub trait FrameRequester {
    fn request_frame(&mut self);
}

/// Requester for hosts that pump frames themselves: it records the request and
/// the host checks [`take`](Self::take) on its own tick.
#[derive(Debug, Default)]
pub struct ManualFrames {
    pending: bool,
    requests: usize,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Total frames requested so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Clear the pending request, returning whether there was one.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameRequester for ManualFrames {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleState {
    #[default]
    Idle,
    Queued,
}

/// Two-state machine guaranteeing at most one pending frame request.
#[derive(Debug)]
pub struct FrameScheduler<R> {
    state: ScheduleState,
    requester: R,
}

impl<R: FrameRequester> FrameScheduler<R> {
    pub fn new(requester: R) -> Self {
        Self {
            state: ScheduleState::Idle,
            requester,
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    /// Queue a frame unless one is already queued. Returns whether a new
    /// request went out.
    pub fn schedule(&mut self) -> bool {
        match self.state {
            ScheduleState::Queued => false,
            ScheduleState::Idle => {
                self.state = ScheduleState::Queued;
                self.requester.request_frame();
                true
            }
        }
    }

    /// Consume the queued frame. Returns `false` for a frame nobody asked for.
    pub fn fire(&mut self) -> bool {
        match self.state {
            ScheduleState::Idle => false,
            ScheduleState::Queued => {
                self.state = ScheduleState::Idle;
                true
            }
        }
    }

    pub fn requester(&self) -> &R {
        &self.requester
    }

    pub fn requester_mut(&mut self) -> &mut R {
        &mut self.requester
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_coalesces() {
        let mut s = FrameScheduler::new(ManualFrames::new());
        assert!(s.schedule());
        for _ in 0..4 {
            assert!(!s.schedule());
        }
        assert_eq!(s.requester().requests(), 1);
        assert_eq!(s.state(), ScheduleState::Queued);
    }

    #[test]
    fn test_fire_returns_to_idle() {
        let mut s = FrameScheduler::new(ManualFrames::new());
        assert!(!s.fire());
        s.schedule();
        assert!(s.fire());
        assert_eq!(s.state(), ScheduleState::Idle);
        assert!(!s.fire());

        assert!(s.schedule());
        assert_eq!(s.requester().requests(), 2);
    }

    #[test]
    fn test_manual_frames_take() {
        let mut frames = ManualFrames::new();
        frames.request_frame();
        assert!(frames.is_pending());
        assert!(frames.take());
        assert!(!frames.take());
    }
}
