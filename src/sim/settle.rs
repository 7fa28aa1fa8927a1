//! Settle detection after a drop
//!
//! Grace delay, then periodic polls. The pile counts as settled after
//! `required_polls` consecutive still polls; a hard timeout ends polling
//! regardless. Once either fires the detector is idle again, so the other
//! can never fire for the same drop.

use crate::config::SettleConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettleState {
    Idle,
    /// Waiting for the engine to start accelerating the dropped disc
    Grace { remaining: f32 },
    Polling {
        until_poll: f32,
        stable_polls: u32,
        /// Time spent polling, checked against the timeout
        elapsed: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Pending,
    Settled,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct SettleDetector {
    config: SettleConfig,
    state: SettleState,
}

impl SettleDetector {
    pub fn new(config: SettleConfig) -> Self {
        Self {
            config,
            state: SettleState::Idle,
        }
    }

    pub fn state(&self) -> SettleState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state != SettleState::Idle
    }

    /// Start watching a fresh drop
    pub fn arm(&mut self) {
        self.state = SettleState::Grace {
            remaining: self.config.grace,
        };
    }

    pub fn cancel(&mut self) {
        self.state = SettleState::Idle;
    }

    /// Advance by `dt` seconds
    ///
    /// `is_still` is sampled only when a poll is due.
    pub fn update<F: FnMut() -> bool>(&mut self, dt: f32, mut is_still: F) -> SettleOutcome {
        match self.state {
            SettleState::Idle => SettleOutcome::Pending,
            SettleState::Grace { remaining } => {
                let remaining = remaining - dt;
                self.state = if remaining <= 0.0 {
                    SettleState::Polling {
                        until_poll: self.config.poll_interval,
                        stable_polls: 0,
                        elapsed: 0.0,
                    }
                } else {
                    SettleState::Grace { remaining }
                };
                SettleOutcome::Pending
            }
            SettleState::Polling {
                mut until_poll,
                mut stable_polls,
                elapsed,
            } => {
                let elapsed = elapsed + dt;
                until_poll -= dt;
                if until_poll <= 0.0 {
                    until_poll += self.config.poll_interval;
                    if is_still() {
                        stable_polls += 1;
                    } else {
                        stable_polls = 0;
                    }
                    if stable_polls >= self.config.required_polls {
                        self.state = SettleState::Idle;
                        return SettleOutcome::Settled;
                    }
                }
                if elapsed >= self.config.timeout {
                    self.state = SettleState::Idle;
                    return SettleOutcome::TimedOut;
                }
                self.state = SettleState::Polling {
                    until_poll,
                    stable_polls,
                    elapsed,
                };
                SettleOutcome::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn run_until_done<F: FnMut() -> bool>(
        detector: &mut SettleDetector,
        mut is_still: F,
    ) -> (SettleOutcome, f32) {
        let mut t = 0.0;
        for _ in 0..10_000 {
            t += SIM_DT;
            match detector.update(SIM_DT, &mut is_still) {
                SettleOutcome::Pending => {}
                done => return (done, t),
            }
        }
        (SettleOutcome::Pending, t)
    }

    #[test]
    fn test_idle_detector_never_fires() {
        let mut detector = SettleDetector::new(SettleConfig::default());
        assert_eq!(detector.update(1.0, || true), SettleOutcome::Pending);
        assert!(!detector.is_armed());
    }

    #[test]
    fn test_still_scene_settles_after_grace_and_polls() {
        let config = SettleConfig::default();
        let mut detector = SettleDetector::new(config);
        detector.arm();
        let (outcome, t) = run_until_done(&mut detector, || true);
        assert_eq!(outcome, SettleOutcome::Settled);
        let earliest = config.grace + config.poll_interval * config.required_polls as f32;
        assert!(t >= earliest - SIM_DT, "settled too early at {t}");
        assert!(t < earliest + 5.0 * SIM_DT, "settled too late at {t}");
        assert!(!detector.is_armed());
    }

    #[test]
    fn test_no_sampling_during_grace() {
        let mut detector = SettleDetector::new(SettleConfig::default());
        detector.arm();
        let mut samples = 0;
        for _ in 0..20 {
            detector.update(SIM_DT, || {
                samples += 1;
                true
            });
        }
        // 20 ticks is a third of a second, still inside the grace delay
        assert_eq!(samples, 0);
    }

    #[test]
    fn test_moving_poll_resets_the_count() {
        let config = SettleConfig::default();
        let mut detector = SettleDetector::new(config);
        detector.arm();
        // still, still, moving, then still forever
        let mut polls = 0;
        let (outcome, _) = run_until_done(&mut detector, || {
            polls += 1;
            polls != 3
        });
        assert_eq!(outcome, SettleOutcome::Settled);
        assert_eq!(polls, 3 + config.required_polls);
    }

    #[test]
    fn test_jitter_hits_timeout() {
        let config = SettleConfig::default();
        let mut detector = SettleDetector::new(config);
        detector.arm();
        let (outcome, t) = run_until_done(&mut detector, || false);
        assert_eq!(outcome, SettleOutcome::TimedOut);
        assert!((t - (config.grace + config.timeout)).abs() < 3.0 * SIM_DT);
        // Loser of the race is a no-op
        assert_eq!(detector.update(SIM_DT, || true), SettleOutcome::Pending);
    }

    #[test]
    fn test_cancel_disarms() {
        let mut detector = SettleDetector::new(SettleConfig::default());
        detector.arm();
        detector.cancel();
        assert_eq!(detector.state(), SettleState::Idle);
    }
}
