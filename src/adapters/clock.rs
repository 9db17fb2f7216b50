use crate::domain::ports::Clock;
use chrono::NaiveDateTime;

/// Local wall-clock time of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn fixed_clock_returns_given_instant() {
        let now = NaiveDate::from_ymd_opt(2025, 10, 2)
            .unwrap()
            .and_hms_opt(11, 35, 0)
            .unwrap();
        let clock: Box<dyn Clock> = Box::new(FixedClock::new(now));
        assert_eq!(clock.now(), now);
    }
}
