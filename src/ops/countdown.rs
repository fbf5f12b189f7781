use chrono::NaiveDate;

/// How the countdown reads on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Signed days from today to the target (negative once it has passed)
    pub days: i64,
}

impl Countdown {
    pub fn between(today: NaiveDate, target: NaiveDate) -> Self {
        Countdown {
            days: target.signed_duration_since(today).num_days(),
        }
    }

    pub fn is_overdue(self) -> bool {
        self.days < 0
    }

    /// Days shown to the user; never negative
    pub fn display_days(self) -> i64 {
        self.days.max(0)
    }

    pub fn label(self) -> String {
        format!("{} 天", self.display_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn counts_days_ahead() {
        let c = Countdown::between(d(2026, 1, 5), d(2026, 2, 6));
        assert_eq!(c.days, 32);
        assert!(!c.is_overdue());
        assert_eq!(c.label(), "32 天");
    }

    #[test]
    fn target_today_is_zero() {
        let c = Countdown::between(d(2026, 2, 6), d(2026, 2, 6));
        assert_eq!(c.days, 0);
        assert!(!c.is_overdue());
    }

    #[test]
    fn past_target_is_overdue_and_clamped() {
        let c = Countdown::between(d(2026, 3, 1), d(2026, 2, 6));
        assert_eq!(c.days, -23);
        assert!(c.is_overdue());
        assert_eq!(c.display_days(), 0);
        assert_eq!(c.label(), "0 天");
    }
}
