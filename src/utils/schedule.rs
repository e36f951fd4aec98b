use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use std::time::Duration;

/// Next moment (UTC) the clock reads `at`, strictly after `now`.
pub fn next_daily_run(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

/// How long to sleep until the next trigger.
pub fn until_next_run(now: DateTime<Utc>, at: NaiveTime) -> Duration {
    (next_daily_run(now, at) - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn half_past_noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 30, 0).unwrap()
    }

    #[test]
    fn later_today_when_trigger_is_ahead() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        assert_eq!(next_daily_run(now, half_past_noon()), Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
        assert_eq!(until_next_run(now, half_past_noon()), Duration::from_secs(4 * 3600 + 30 * 60));
    }

    #[test]
    fn tomorrow_when_trigger_has_passed_or_is_now() {
        let exactly = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(next_daily_run(exactly, half_past_noon()), Utc.with_ymd_and_hms(2024, 5, 2, 12, 30, 0).unwrap());

        let late = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(next_daily_run(late, half_past_noon()), Utc.with_ymd_and_hms(2025, 1, 1, 12, 30, 0).unwrap());
    }
}
