//! Pure duration arithmetic over a session's timestamps.
//!
//! All elapsed-time math in the engine funnels through this module. There
//! is no background clock: callers pass `now` and the result is derived
//! from `started_at` and the pause intervals alone.
//!
//! Guarantees:
//! - the result is always >= 0
//! - successive calls with increasing `now` never decrease
//! - intervals are reconciled by `paused_at` ascending before summation,
//!   so out-of-order request processing cannot corrupt the total

use chrono::{DateTime, Utc};

use super::PauseInterval;

/// Elapsed focused seconds between `started_at` and `now`, excluding all
/// paused spans (closed intervals plus the open tail, if any).
pub fn elapsed_seconds(
    started_at: DateTime<Utc>,
    intervals: &[PauseInterval],
    now: DateTime<Utc>,
) -> i64 {
    let wall = (now - started_at).num_seconds().max(0);
    let paused = paused_seconds(started_at, intervals, now);
    (wall - paused).max(0)
}

/// Total paused seconds as of `now`.
///
/// Each interval's effective end is its `resumed_at`; an interval left
/// open is closed implicitly at the next interval's `paused_at`, and only
/// the final open interval accrues against `now`. Overlapping spans are
/// merged before summing, so duplicate or entangled records can never
/// count the same wall-clock second twice.
pub fn paused_seconds(
    started_at: DateTime<Utc>,
    intervals: &[PauseInterval],
    now: DateTime<Utc>,
) -> i64 {
    let mut sorted: Vec<&PauseInterval> = intervals.iter().collect();
    sorted.sort_by_key(|i| i.paused_at);

    let mut spans: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::with_capacity(sorted.len());
    for (idx, interval) in sorted.iter().enumerate() {
        let begin = interval.paused_at.max(started_at).min(now);
        let end = match interval.resumed_at {
            Some(resumed) => resumed,
            None => match sorted.get(idx + 1) {
                Some(next) => next.paused_at,
                None => now,
            },
        };
        let end = end.max(begin).min(now);
        if end > begin {
            spans.push((begin, end));
        }
    }

    // Merge the sweep: spans are sorted by begin already.
    let mut total = 0i64;
    let mut current: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
    for (begin, end) in spans {
        match current {
            Some((cb, ce)) if begin <= ce => current = Some((cb, ce.max(end))),
            Some((cb, ce)) => {
                total += (ce - cb).num_seconds();
                current = Some((begin, end));
            }
            None => current = Some((begin, end)),
        }
    }
    if let Some((cb, ce)) = current {
        total += (ce - cb).num_seconds();
    }
    total
}

/// True if the last pause interval is still open.
pub fn has_open_pause(intervals: &[PauseInterval]) -> bool {
    intervals.iter().any(|i| i.resumed_at.is_none())
}

/// Append a new open pause interval at `now`.
pub fn record_pause(intervals: &mut Vec<PauseInterval>, now: DateTime<Utc>) {
    intervals.push(PauseInterval {
        paused_at: now,
        resumed_at: None,
    });
}

/// Close the open pause interval at `now`.
///
/// Returns `false` when there is nothing to close. That case signals a
/// client/server desync and is a no-op on elapsed time; the caller logs
/// it as a warning rather than failing.
pub fn close_pause(intervals: &mut [PauseInterval], now: DateTime<Utc>) -> bool {
    match intervals.iter_mut().rev().find(|i| i.resumed_at.is_none()) {
        Some(open) => {
            open.resumed_at = Some(now.max(open.paused_at));
            true
        }
        None => false,
    }
}

/// Seconds of planned focus still ahead of a session as of `now`.
///
/// Used by the break-reminder scheduler to re-anchor a reminder after a
/// resume. Never negative.
pub fn remaining_planned_seconds(
    started_at: DateTime<Utc>,
    intervals: &[PauseInterval],
    planned_minutes: u32,
    now: DateTime<Utc>,
) -> i64 {
    let planned = i64::from(planned_minutes) * 60;
    (planned - elapsed_seconds(started_at, intervals, now)).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn min(m: i64) -> Duration {
        Duration::minutes(m)
    }

    #[test]
    fn no_pauses_is_wall_clock() {
        assert_eq!(elapsed_seconds(t0(), &[], t0() + min(25)), 25 * 60);
    }

    #[test]
    fn now_before_start_clamps_to_zero() {
        assert_eq!(elapsed_seconds(t0(), &[], t0() - min(1)), 0);
    }

    #[test]
    fn closed_pause_is_excluded() {
        // start -> pause at +5 -> resume at +15 -> read at +35 = 25min focused
        let intervals = vec![PauseInterval {
            paused_at: t0() + min(5),
            resumed_at: Some(t0() + min(15)),
        }];
        assert_eq!(elapsed_seconds(t0(), &intervals, t0() + min(35)), 25 * 60);
    }

    #[test]
    fn open_pause_freezes_elapsed() {
        let intervals = vec![PauseInterval {
            paused_at: t0() + min(10),
            resumed_at: None,
        }];
        // Frozen at 10 minutes however long the pause lasts.
        assert_eq!(elapsed_seconds(t0(), &intervals, t0() + min(11)), 10 * 60);
        assert_eq!(elapsed_seconds(t0(), &intervals, t0() + min(500)), 10 * 60);
    }

    #[test]
    fn out_of_order_intervals_are_reconciled() {
        let intervals = vec![
            PauseInterval {
                paused_at: t0() + min(20),
                resumed_at: Some(t0() + min(22)),
            },
            PauseInterval {
                paused_at: t0() + min(5),
                resumed_at: Some(t0() + min(10)),
            },
        ];
        assert_eq!(elapsed_seconds(t0(), &intervals, t0() + min(30)), 23 * 60);
    }

    #[test]
    fn dangling_open_pause_closes_at_next_pause() {
        // First pause never got its resume recorded; it is bounded by the
        // second pause rather than growing forever.
        let intervals = vec![
            PauseInterval {
                paused_at: t0() + min(5),
                resumed_at: None,
            },
            PauseInterval {
                paused_at: t0() + min(10),
                resumed_at: Some(t0() + min(12)),
            },
        ];
        // Paused 5..10 and 10..12 -> 7 minutes paused, 13 focused at +20.
        assert_eq!(elapsed_seconds(t0(), &intervals, t0() + min(20)), 13 * 60);
    }

    #[test]
    fn close_pause_without_open_interval_reports_false() {
        let mut intervals = vec![PauseInterval {
            paused_at: t0() + min(5),
            resumed_at: Some(t0() + min(6)),
        }];
        assert!(!close_pause(&mut intervals, t0() + min(7)));
        assert_eq!(elapsed_seconds(t0(), &intervals, t0() + min(10)), 9 * 60);
    }

    #[test]
    fn record_then_close_round_trip() {
        let mut intervals = Vec::new();
        record_pause(&mut intervals, t0() + min(5));
        assert!(has_open_pause(&intervals));
        assert!(close_pause(&mut intervals, t0() + min(8)));
        assert!(!has_open_pause(&intervals));
        assert_eq!(elapsed_seconds(t0(), &intervals, t0() + min(10)), 7 * 60);
    }

    #[test]
    fn close_before_pause_timestamp_clamps() {
        let mut intervals = Vec::new();
        record_pause(&mut intervals, t0() + min(5));
        // Resume timestamp earlier than the pause: clamped to zero-length.
        assert!(close_pause(&mut intervals, t0() + min(3)));
        assert_eq!(elapsed_seconds(t0(), &intervals, t0() + min(10)), 10 * 60);
    }

    #[test]
    fn remaining_planned_accounts_for_pauses() {
        let intervals = vec![PauseInterval {
            paused_at: t0() + min(5),
            resumed_at: Some(t0() + min(15)),
        }];
        // 20 wall minutes, 10 paused -> 10 focused of 25 planned.
        assert_eq!(
            remaining_planned_seconds(t0(), &intervals, 25, t0() + min(20)),
            15 * 60
        );
        // Past the plan: clamps at zero.
        assert_eq!(
            remaining_planned_seconds(t0(), &intervals, 25, t0() + min(120)),
            0
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_intervals() -> impl Strategy<Value = Vec<PauseInterval>> {
            // Offsets in seconds from t0; an interval may be open or closed.
            prop::collection::vec((0i64..7200, prop::option::of(0i64..7200)), 0..6).prop_map(
                |raw| {
                    raw.into_iter()
                        .map(|(p, r)| PauseInterval {
                            paused_at: t0() + Duration::seconds(p),
                            resumed_at: r.map(|d| t0() + Duration::seconds(p + d)),
                        })
                        .collect()
                },
            )
        }

        proptest! {
            #[test]
            fn elapsed_is_never_negative(
                intervals in arb_intervals(),
                now_offset in 0i64..20_000,
            ) {
                let now = t0() + Duration::seconds(now_offset);
                prop_assert!(elapsed_seconds(t0(), &intervals, now) >= 0);
            }

            #[test]
            fn elapsed_is_monotonic_in_now(
                intervals in arb_intervals(),
                a in 0i64..20_000,
                step in 0i64..10_000,
            ) {
                let earlier = t0() + Duration::seconds(a);
                let later = t0() + Duration::seconds(a + step);
                prop_assert!(
                    elapsed_seconds(t0(), &intervals, earlier)
                        <= elapsed_seconds(t0(), &intervals, later)
                );
            }

            #[test]
            fn elapsed_never_exceeds_wall_clock(
                intervals in arb_intervals(),
                now_offset in 0i64..20_000,
            ) {
                let now = t0() + Duration::seconds(now_offset);
                prop_assert!(elapsed_seconds(t0(), &intervals, now) <= now_offset);
            }
        }
    }
}
