use std::fmt::{Display, Formatter};

use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::types::DateTimeKind;

/// A date/time cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateTimeValue {
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimeTz(NaiveTime, FixedOffset),
    TimestampTz(chrono::DateTime<FixedOffset>),
}

// Upper bound (in days) of an automation date, 9999-12-31.
const MAX_OLE_DAYS: f64 = 2_958_466.0;

impl DateTimeValue {
    pub fn kind(&self) -> DateTimeKind {
        match self {
            DateTimeValue::Date(_) => DateTimeKind::Date,
            DateTimeValue::Time(_) => DateTimeKind::Time,
            DateTimeValue::Timestamp(_) => DateTimeKind::Timestamp,
            DateTimeValue::TimeTz(..) => DateTimeKind::TimeTz,
            DateTimeValue::TimestampTz(_) => DateTimeKind::TimestampTz,
        }
    }

    /// Parses backend text as the requested subtype.
    ///
    /// Both `T` and space are accepted between date and time; offsets may be
    /// `Z`, `+HH`, `+HHMM` or `+HH:MM`.
    pub fn parse(text: &str, kind: DateTimeKind) -> Option<DateTimeValue> {
        let text = text.trim();
        match kind {
            DateTimeKind::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(DateTimeValue::Date),
            DateTimeKind::Time => parse_time(text).map(DateTimeValue::Time),
            DateTimeKind::Timestamp => parse_timestamp(text).map(DateTimeValue::Timestamp),
            DateTimeKind::TimeTz => {
                let (time, offset) = split_offset(text)?;
                Some(DateTimeValue::TimeTz(parse_time(time)?, offset))
            }
            DateTimeKind::TimestampTz => {
                let (stamp, offset) = split_offset(text)?;
                let local = parse_timestamp(stamp)?;
                offset
                    .from_local_datetime(&local)
                    .single()
                    .map(DateTimeValue::TimestampTz)
            }
        }
    }

    /// Converts an automation date (fractional days since 1899-12-30) as
    /// handed out by COM providers.
    pub fn from_ole_date(days: f64) -> Option<NaiveDateTime> {
        if !days.is_finite() || days.abs() > MAX_OLE_DAYS {
            return None;
        }
        let whole = days.trunc();
        // The fraction is the time of day even for dates before the epoch.
        let fraction = (days - whole).abs();
        let seconds = (fraction * 86_400.0).round() as i64;
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
        epoch
            .checked_add_signed(Duration::seconds(whole as i64 * 86_400))?
            .checked_add_signed(Duration::seconds(seconds))
    }

    /// Reshapes the value into another subtype, when that loses no meaning
    /// beyond dropping the unrequested parts.
    pub fn convert(self, kind: DateTimeKind) -> Option<DateTimeValue> {
        use DateTimeValue::*;
        let rv = match (self, kind) {
            (v, k) if v.kind() == k => v,
            (Timestamp(ts), DateTimeKind::Date) => Date(ts.date()),
            (Timestamp(ts), DateTimeKind::Time) => Time(ts.time()),
            (TimestampTz(ts), DateTimeKind::Date) => Date(ts.naive_local().date()),
            (TimestampTz(ts), DateTimeKind::Time) => Time(ts.naive_local().time()),
            (TimestampTz(ts), DateTimeKind::Timestamp) => Timestamp(ts.naive_local()),
            (TimestampTz(ts), DateTimeKind::TimeTz) => TimeTz(ts.naive_local().time(), *ts.offset()),
            (Date(d), DateTimeKind::Timestamp) => Timestamp(d.and_hms_opt(0, 0, 0)?),
            (TimeTz(t, _), DateTimeKind::Time) => Time(t),
            _ => return None,
        };
        Some(rv)
    }
}

impl Display for DateTimeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DateTimeValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DateTimeValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            DateTimeValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            DateTimeValue::TimeTz(t, o) => write!(f, "{}{}", t.format("%H:%M:%S%.f"), o),
            DateTimeValue::TimestampTz(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f%:z")),
        }
    }
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Splits a trailing UTC offset from `text`.
fn split_offset(text: &str) -> Option<(&str, FixedOffset)> {
    if let Some(rest) = text.strip_suffix('Z') {
        return Some((rest, FixedOffset::east_opt(0)?));
    }
    // The offset sign must come after the time part, never inside the date.
    let time_start = text.find(':')?.saturating_sub(2);
    if !text.is_char_boundary(time_start) {
        return None;
    }
    let sign_pos = text[time_start..].rfind(['+', '-'])? + time_start;
    let (head, tail) = text.split_at(sign_pos);
    let sign = if tail.starts_with('-') { -1 } else { 1 };
    let digits: String = tail[1..].chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
    Some((head.trim_end(), offset))
}
