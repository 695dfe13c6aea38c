/// Milestone learning-rate schedule: the rate is held constant until
/// `milestone` completed epochs, then multiplied once by `gamma`.
///
/// `current()` reads the rate without advancing, so the epoch driver reports
/// the pre-decay value throughout an epoch; the decayed value is first
/// reported for the epoch at index `milestone`.
#[derive(Debug, Clone)]
pub struct MilestoneLr {
    lr: f64,
    milestone: usize,
    gamma: f64,
    epochs_completed: usize,
}

impl MilestoneLr {
    pub const DEFAULT_GAMMA: f64 = 0.1;

    pub fn new(lr: f64, milestone: usize) -> Self {
        Self::with_gamma(lr, milestone, Self::DEFAULT_GAMMA)
    }

    pub fn with_gamma(lr: f64, milestone: usize, gamma: f64) -> Self {
        assert!(lr > 0.0, "lr must be > 0");
        assert!(gamma > 0.0, "gamma must be > 0");
        Self {
            lr,
            milestone,
            gamma,
            epochs_completed: 0,
        }
    }

    /// Learning rate in effect for the current epoch.
    pub fn current(&self) -> f64 {
        self.lr
    }

    /// Mark one training epoch as completed.
    pub fn advance(&mut self) {
        self.epochs_completed += 1;
        if self.epochs_completed == self.milestone {
            self.lr *= self.gamma;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_until_milestone_then_decays() {
        let mut schedule = MilestoneLr::new(1e-6, 10);

        let mut reported = Vec::new();
        for _ in 0..12 {
            reported.push(schedule.current());
            schedule.advance();
        }

        for lr in &reported[..10] {
            assert_eq!(*lr, 1e-6);
        }
        for lr in &reported[10..] {
            assert!((*lr - 1e-7).abs() < 1e-18);
            assert!(*lr < 1e-6);
        }
    }

    #[test]
    fn decays_exactly_once() {
        let mut schedule = MilestoneLr::with_gamma(1.0, 2, 0.5);
        for _ in 0..6 {
            schedule.advance();
        }
        assert_eq!(schedule.current(), 0.5);
    }

    #[test]
    fn zero_milestone_never_decays() {
        // Counter starts past a zero milestone, so the rate never moves.
        let mut schedule = MilestoneLr::new(1e-3, 0);
        for _ in 0..4 {
            schedule.advance();
        }
        assert_eq!(schedule.current(), 1e-3);
    }
}
