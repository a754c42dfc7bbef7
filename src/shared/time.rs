use std::{
    fmt::Display,
    ops::{Add, AddAssign, Sub, SubAssign},
};

use chrono::{TimeZone, Utc};

/// A point in time expressed as seconds since the Unix epoch.
///
/// GTFS `stop_times.txt` timestamps are service-day offsets (so `25:30:00`
/// is valid for a trip that runs past midnight); callers anchor those to a
/// service-day epoch before they ever reach a [`Time`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(i64);

/// Sentinel standing in for "unreached". Kept well below `i64::MAX` so that
/// adding a walking [`Duration`] to it can never overflow.
pub const INF: Time = Time(i64::MAX / 4);

impl From<i64> for Time {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Sub<Time> for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0 - rhs.0)
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0
    }
}

impl Sub<Duration> for Time {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_clock_string())
    }
}

impl Time {
    pub const INF: Time = INF;

    pub fn is_reachable(&self) -> bool {
        *self < Self::INF
    }

    pub const fn from_epoch_seconds(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn as_epoch_seconds(&self) -> i64 {
        self.0
    }

    /// Renders the wall-clock time-of-day (UTC) of this instant, e.g. `"16:32:05"`.
    pub fn to_clock_string(&self) -> String {
        match Utc.timestamp_opt(self.0, 0).single() {
            Some(dt) => dt.format("%H:%M:%S").to_string(),
            None => format!("<{}>", self.0),
        }
    }

    /// Parses a GTFS-style `HH:MM:SS` offset (hours may exceed 23) relative to
    /// a service-day epoch and returns the absolute [`Time`].
    pub fn from_hms_offset(service_day: Time, hms: &str) -> Option<Self> {
        Duration::from_hms(hms).map(|offset| service_day + offset)
    }
}

/// A span of time in seconds. Always non-negative in practice, but signed so
/// that subtracting two [`Time`]s is always well defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(i64);

impl From<i64> for Duration {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub const fn from_seconds(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes * 60)
    }

    pub const fn as_seconds(&self) -> i64 {
        self.0
    }

    pub fn as_minutes(&self) -> f64 {
        self.0 as f64 / 60.0
    }

    /// Parses `"HH:MM:SS"`. Returns `None` on malformed input; hours may be
    /// `>= 24` to express a trip that runs past midnight.
    pub fn from_hms(time: &str) -> Option<Self> {
        const HOUR_TO_SEC: i64 = 60 * 60;
        const MINUTE_TO_SEC: i64 = 60;
        let mut split = time.split(':');
        let hours: i64 = split.next()?.parse().ok()?;
        let minutes: i64 = split.next()?.parse().ok()?;
        let seconds: i64 = split.next()?.parse().ok()?;
        if split.next().is_some() {
            return None;
        }
        Some(Self(hours * HOUR_TO_SEC + minutes * MINUTE_TO_SEC + seconds))
    }

    pub fn to_hms_string(&self) -> String {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        format!("{h:02}:{m:02}:{s:02}")
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

#[test]
fn parse_unparse_1() {
    let time = "00:00:00";
    let d = Duration::from_hms(time).unwrap();
    assert_eq!(time, d.to_hms_string())
}

#[test]
fn parse_unparse_2() {
    let time = "00:00:30";
    let d = Duration::from_hms(time).unwrap();
    assert_eq!(time, d.to_hms_string())
}

#[test]
fn parse_unparse_3() {
    let time = "00:30:00";
    let d = Duration::from_hms(time).unwrap();
    assert_eq!(time, d.to_hms_string())
}

#[test]
fn parse_unparse_4() {
    let time = "12:00:00";
    let d = Duration::from_hms(time).unwrap();
    assert_eq!(time, d.to_hms_string())
}

#[test]
fn parse_unparse_5() {
    let time = "25:30:30";
    let d = Duration::from_hms(time).unwrap();
    assert_eq!(time, d.to_hms_string())
}

#[test]
fn valid_time_test_1() {
    assert_eq!(Duration::from_hms("00:00:00").unwrap().as_seconds(), 0);
}

#[test]
fn valid_time_test_2() {
    assert_eq!(Duration::from_hms("00:00:30").unwrap().as_seconds(), 30);
}

#[test]
fn valid_time_test_3() {
    assert_eq!(Duration::from_hms("00:01:30").unwrap().as_seconds(), 90);
}

#[test]
fn valid_time_test_4() {
    assert_eq!(Duration::from_hms("01:01:30").unwrap().as_seconds(), 3690);
}

#[test]
fn invalid_time_test_1() {
    assert!(Duration::from_hms("00:00:0a").is_none())
}

#[test]
fn invalid_time_test_2() {
    assert!(Duration::from_hms("00:00").is_none())
}

#[test]
fn time_inf_is_greater_than_any_real_time() {
    let t = Time::from_epoch_seconds(1_700_000_000);
    assert!(t < Time::INF);
    assert!(t.is_reachable());
    assert!(!Time::INF.is_reachable());
}

#[test]
fn time_plus_duration_never_reaches_inf_by_accident() {
    let walked = Time::INF + Duration::from_minutes(120);
    assert!(walked > Time::INF);
}
