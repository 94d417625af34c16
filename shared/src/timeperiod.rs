use chrono::{DateTime, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub use strum::IntoEnumIterator;

#[derive(
    Serialize,
    Deserialize,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    EnumIter,
    EnumString,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
}

impl Period {
    /// Derives the window this period covers as seen from `now`.
    ///
    /// Day boundaries are taken in the time zone `now` carries, so the same
    /// instant yields different windows for different zones.
    pub fn window<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TimeWindow {
        let today = now.date_naive();
        match self {
            Period::Daily => {
                let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
                TimeWindow {
                    start: start_of_day(now, today),
                    end: start_of_day(now, tomorrow),
                }
            }
            Period::Weekly => {
                let first_day = today.checked_sub_days(Days::new(6)).unwrap_or(today);
                TimeWindow {
                    start: start_of_day(now, first_day),
                    end: end_of_day(now, today),
                }
            }
        }
    }
}

/// Half-open interval `[start, end)`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>, date: NaiveDate) -> DateTime<Utc> {
    local_instant(now, date.and_time(NaiveTime::MIN))
}

// 23:59:59.999 on `date`
fn end_of_day<Tz: TimeZone>(now: &DateTime<Tz>, date: NaiveDate) -> DateTime<Utc> {
    let next_day = date.checked_add_days(Days::new(1)).unwrap_or(date);
    start_of_day(now, next_day) - Duration::milliseconds(1)
}

fn local_instant<Tz: TimeZone>(now: &DateTime<Tz>, wall_clock: NaiveDateTime) -> DateTime<Utc> {
    match now.timezone().from_local_datetime(&wall_clock).earliest() {
        Some(instant) => instant.with_timezone(&Utc),
        // Skipped by a DST transition, fall back to the offset in effect now.
        None => Utc.from_utc_datetime(&(wall_clock - now.offset().fix())),
    }
}
