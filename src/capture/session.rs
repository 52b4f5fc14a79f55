//! Hold-to-capture timing.
//!
//! ```text
//!   Idle ──Start──▶ Capturing ──Sample(elapsed ≥ duration)──▶ Succeeded ─┐
//!    ▲                  │                                                  │
//!    │                  └──Cancel──▶ Cancelled ───────────────────────────┤
//!    └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Elapsed time is always measured from the monotonic start timestamp, so
//! frame jitter never accumulates into the result.

use bevy::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePhase {
    #[default]
    Idle,
    Capturing {
        started_at: Duration,
        duration: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureInput {
    Start { now: Duration, duration: Duration },
    Cancel,
    Sample { now: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureOutcome {
    /// Input had no effect in the current phase.
    Ignored,
    Started,
    InProgress { progress: f32 },
    Cancelled,
    Succeeded,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CaptureSession {
    phase: CapturePhase,
}

impl CaptureSession {
    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.phase, CapturePhase::Capturing { .. })
    }

    pub fn dispatch(&mut self, input: CaptureInput) -> CaptureOutcome {
        match (self.phase, input) {
            (CapturePhase::Idle, CaptureInput::Start { now, duration }) => {
                self.phase = CapturePhase::Capturing {
                    started_at: now,
                    duration,
                };
                CaptureOutcome::Started
            }
            (CapturePhase::Capturing { .. }, CaptureInput::Cancel) => {
                self.phase = CapturePhase::Idle;
                CaptureOutcome::Cancelled
            }
            (
                CapturePhase::Capturing {
                    started_at,
                    duration,
                },
                CaptureInput::Sample { now },
            ) => {
                if now.saturating_sub(started_at) >= duration {
                    self.phase = CapturePhase::Idle;
                    CaptureOutcome::Succeeded
                } else {
                    CaptureOutcome::InProgress {
                        progress: self.progress(now),
                    }
                }
            }
            _ => CaptureOutcome::Ignored,
        }
    }

    /// Begins a capture. Returns false if one is already running.
    pub fn start(&mut self, now: Duration, duration: Duration) -> bool {
        self.dispatch(CaptureInput::Start { now, duration }) == CaptureOutcome::Started
    }

    /// Abandons a running capture. Returns false when idle.
    pub fn cancel(&mut self) -> bool {
        self.dispatch(CaptureInput::Cancel) == CaptureOutcome::Cancelled
    }

    /// Fraction of the hold completed at `now`, clamped to 0..=1. Zero when idle.
    pub fn progress(&self, now: Duration) -> f32 {
        match self.phase {
            CapturePhase::Idle => 0.0,
            CapturePhase::Capturing {
                started_at,
                duration,
            } => {
                if duration.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_sub(started_at);
                (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_completes_exactly_at_duration() {
        let mut session = CaptureSession::default();
        assert!(session.start(ms(1_000), ms(5_000)));

        assert_eq!(
            session.dispatch(CaptureInput::Sample { now: ms(5_999) }),
            CaptureOutcome::InProgress {
                progress: session.progress(ms(5_999))
            }
        );
        assert!(session.progress(ms(5_999)) < 1.0);
        assert_eq!(session.dispatch(CaptureInput::Sample { now: ms(6_000) }), CaptureOutcome::Succeeded);
        assert_eq!(session.phase(), CapturePhase::Idle);
    }

    #[test]
    fn test_progress_is_clamped_ratio() {
        let mut session = CaptureSession::default();
        session.start(ms(0), ms(5_000));
        assert_eq!(session.progress(ms(0)), 0.0);
        assert!((session.progress(ms(2_000)) - 0.4).abs() < 1e-6);
        assert_eq!(session.progress(ms(9_000)), 1.0);
    }

    #[test]
    fn test_progress_uses_start_timestamp_not_ticks() {
        // Irregular sampling must not change when completion happens.
        let mut session = CaptureSession::default();
        session.start(ms(0), ms(5_000));
        for now in [17, 450, 451, 2_300, 4_999] {
            assert!(matches!(
                session.dispatch(CaptureInput::Sample { now: ms(now) }),
                CaptureOutcome::InProgress { .. }
            ));
        }
        assert_eq!(session.dispatch(CaptureInput::Sample { now: ms(5_000) }), CaptureOutcome::Succeeded);
    }

    #[test]
    fn test_cancel_resets_progress() {
        let mut session = CaptureSession::default();
        session.start(ms(0), ms(5_000));
        assert!(session.cancel());
        assert_eq!(session.progress(ms(2_000)), 0.0);
        assert!(!session.is_capturing());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut session = CaptureSession::default();
        session.start(ms(0), ms(5_000));
        assert!(session.cancel());
        assert!(!session.cancel());
        assert_eq!(session.dispatch(CaptureInput::Cancel), CaptureOutcome::Ignored);
    }

    #[test]
    fn test_start_while_capturing_is_ignored() {
        let mut session = CaptureSession::default();
        assert!(session.start(ms(0), ms(5_000)));
        assert!(!session.start(ms(1_000), ms(8_000)));
        // The first start keeps its timing.
        assert_eq!(session.dispatch(CaptureInput::Sample { now: ms(5_000) }), CaptureOutcome::Succeeded);
    }

    #[test]
    fn test_sample_while_idle_is_ignored() {
        let mut session = CaptureSession::default();
        assert_eq!(session.dispatch(CaptureInput::Sample { now: ms(10) }), CaptureOutcome::Ignored);
    }

    #[test]
    fn test_zero_duration_completes_on_first_sample() {
        let mut session = CaptureSession::default();
        session.start(ms(100), Duration::ZERO);
        assert_eq!(session.progress(ms(100)), 1.0);
        assert_eq!(session.dispatch(CaptureInput::Sample { now: ms(100) }), CaptureOutcome::Succeeded);
    }
}
