// ABOUTME: Reset-policy evaluation for sequence counters
// ABOUTME: Boundary checks compare calendar components only, never elapsed time

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use kiln_core::ResetPolicy;

/// Returns true when the issued date falls past a reset boundary relative to
/// the template's last sequence mutation.
///
/// The comparison is on calendar components in UTC: a counter last touched
/// at 23:59:59 and incremented at 00:00:01 the next day has crossed a DAILY
/// boundary even though less than a second elapsed.
pub fn boundary_crossed(
    policy: ResetPolicy,
    updated_at: DateTime<Utc>,
    issued_date: NaiveDate,
) -> bool {
    let last = updated_at.date_naive();

    match policy {
        ResetPolicy::None => false,
        ResetPolicy::Daily => last != issued_date,
        ResetPolicy::Monthly => {
            (last.year(), last.month()) != (issued_date.year(), issued_date.month())
        }
        ResetPolicy::Yearly => last.year() != issued_date.year(),
    }
}

/// Resolves the counter value an increment starts from: 0 when a boundary
/// has been crossed, otherwise the stored `last_number`.
pub fn resolve_base(
    policy: ResetPolicy,
    last_number: i64,
    updated_at: DateTime<Utc>,
    issued_date: NaiveDate,
) -> i64 {
    if boundary_crossed(policy, updated_at, issued_date) {
        0
    } else {
        last_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_none_never_crosses() {
        assert!(!boundary_crossed(
            ResetPolicy::None,
            at(2020, 1, 1, 0),
            day(2025, 6, 15)
        ));
    }

    #[rstest]
    #[case(day(2025, 3, 7), false)]
    #[case(day(2025, 3, 8), true)]
    #[case(day(2025, 4, 7), true)]
    #[case(day(2024, 3, 7), true)]
    fn test_daily_boundary(#[case] issued: NaiveDate, #[case] crossed: bool) {
        assert_eq!(
            boundary_crossed(ResetPolicy::Daily, at(2025, 3, 7, 12), issued),
            crossed
        );
    }

    #[rstest]
    #[case(day(2025, 3, 31), false)]
    #[case(day(2025, 4, 1), true)]
    #[case(day(2026, 3, 7), true)]
    fn test_monthly_boundary(#[case] issued: NaiveDate, #[case] crossed: bool) {
        assert_eq!(
            boundary_crossed(ResetPolicy::Monthly, at(2025, 3, 7, 12), issued),
            crossed
        );
    }

    #[rstest]
    #[case(day(2025, 12, 31), false)]
    #[case(day(2026, 1, 1), true)]
    fn test_yearly_boundary(#[case] issued: NaiveDate, #[case] crossed: bool) {
        assert_eq!(
            boundary_crossed(ResetPolicy::Yearly, at(2025, 3, 7, 12), issued),
            crossed
        );
    }

    #[test]
    fn test_midnight_tick_crosses_daily() {
        // 23:59:59 on the 7th, issued on the 8th: calendar day changed
        let updated_at = Utc.with_ymd_and_hms(2025, 3, 7, 23, 59, 59).unwrap();
        assert!(boundary_crossed(
            ResetPolicy::Daily,
            updated_at,
            day(2025, 3, 8)
        ));
    }

    #[test]
    fn test_resolve_base() {
        assert_eq!(
            resolve_base(ResetPolicy::Daily, 5, at(2025, 3, 7, 12), day(2025, 3, 8)),
            0
        );
        assert_eq!(
            resolve_base(ResetPolicy::None, 5, at(2025, 3, 7, 12), day(2025, 3, 8)),
            5
        );
        assert_eq!(
            resolve_base(ResetPolicy::Daily, 5, at(2025, 3, 7, 12), day(2025, 3, 7)),
            5
        );
    }
}
