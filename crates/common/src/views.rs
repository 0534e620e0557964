//! Derived views computed from raw API payloads.
//!
//! Pure functions only: every helper takes the fetched records plus whatever
//! policy/context it needs and returns a ready-to-render projection. Nothing
//! here performs I/O or caches between calls.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, AttendanceStatus, LeaveRequest, LeaveStatus};

/// Leave accrual and weekend policy.
///
/// The 12-day allowance and Saturday/Sunday weekend are company defaults,
/// not fixed rules, so both are carried in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeavePolicy {
    #[serde(default = "default_annual_allowance")]
    pub annual_allowance: u32,
    #[serde(default = "default_weekend")]
    pub weekend: Vec<Weekday>,
}

fn default_annual_allowance() -> u32 {
    12
}

fn default_weekend() -> Vec<Weekday> {
    vec![Weekday::Sat, Weekday::Sun]
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            annual_allowance: default_annual_allowance(),
            weekend: default_weekend(),
        }
    }
}

impl LeavePolicy {
    pub fn is_weekend(&self, day: Weekday) -> bool {
        self.weekend.contains(&day)
    }
}

/// One row of the weekly attendance grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekRow {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub total_hours: f64,
    pub status: AttendanceStatus,
    /// Marks the current day for highlighting.
    pub is_today: bool,
    /// False on weekend rows, where check-in/out actions are suppressed.
    pub can_check: bool,
}

/// The Sunday on or before `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Builds the fixed Sunday-to-Saturday grid for one week of attendance.
///
/// Days without a record come out as `Weekend` when the policy says so,
/// otherwise `Absent`. A record without a server-side status counts as
/// `Present` once a check-in exists.
pub fn weekly_grid(
    week_start: NaiveDate,
    records: &[AttendanceRecord],
    today: NaiveDate,
    policy: &LeavePolicy,
) -> Vec<WeekRow> {
    (0..7)
        .map(|offset| {
            let date = week_start + Duration::days(offset);
            let record = records.iter().find(|r| r.date == date);

            let status = match record {
                Some(r) => match r.status {
                    Some(status) => status,
                    None if r.check_in.is_some() => AttendanceStatus::Present,
                    None => AttendanceStatus::Absent,
                },
                None if policy.is_weekend(date.weekday()) => AttendanceStatus::Weekend,
                None => AttendanceStatus::Absent,
            };

            WeekRow {
                date,
                weekday: date.weekday(),
                check_in: record.and_then(|r| r.check_in.clone()),
                check_out: record.and_then(|r| r.check_out.clone()),
                total_hours: record.map(|r| r.total_hours).unwrap_or(0.0),
                status,
                is_today: date == today,
                can_check: status != AttendanceStatus::Weekend,
            }
        })
        .collect()
}

/// Inclusive day count of a leave request.
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Remaining annual leave: allowance minus approved requests, never negative.
pub fn remaining_leave(policy: &LeavePolicy, leaves: &[LeaveRequest]) -> u32 {
    let approved = leaves
        .iter()
        .filter(|l| l.status == LeaveStatus::Approved)
        .count() as u32;
    policy.annual_allowance.saturating_sub(approved)
}
