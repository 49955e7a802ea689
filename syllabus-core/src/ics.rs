use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use ics::parameters::Value;
use ics::properties::{CalScale, Description, DtEnd, DtStart, Location, Method, Summary};
use ics::{escape_text, ICalendar};

use crate::structs::Event;

/// Default product identifier stamped into generated calendars.
pub const PROD_ID: &str = "-//SyllaSync//Syllabus Calendar//EN";

/// Domain suffix of every generated UID.
const UID_DOMAIN: &str = "syllasync";

/// A finished calendar document plus the number of events absorbed
/// because their date did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCalendar {
    pub ics: String,
    pub skipped: usize,
}

/// Encode events into an iCalendar document.
///
/// Pure in (events, prod_id, now): the same inputs produce a
/// byte-identical document. Events are emitted in input order, each
/// stamped with the single DTSTAMP derived from `now`. An event whose
/// `date` is not a valid `YYYY-MM-DD` is skipped and counted, never
/// failing the document; a present but unparseable `time` degrades that
/// event to all-day.
pub fn encode_events(events: &[Event], prod_id: &str, now: DateTime<Utc>) -> EncodedCalendar {
    let dtstamp = now.format("%Y%m%dT%H%M%SZ").to_string();

    let mut calendar = ICalendar::new("2.0", prod_id);
    calendar.push(CalScale::new("GREGORIAN"));
    calendar.push(Method::new("PUBLISH"));

    let mut skipped = 0;

    for (index, event) in events.iter().enumerate() {
        match encode_event(index, event, &dtstamp) {
            Some(block) => calendar.add_event(block),
            None => {
                tracing::debug!(
                    "skipping event {:?} with unparseable date {:?}",
                    event.title,
                    event.date
                );
                skipped += 1;
            }
        }
    }

    EncodedCalendar {
        ics: calendar.to_string(),
        skipped,
    }
}

fn encode_event<'a>(index: usize, event: &'a Event, dtstamp: &'a str) -> Option<ics::Event<'a>> {
    let date = NaiveDate::parse_from_str(&event.date, "%Y-%m-%d").ok()?;

    // Position plus date keeps the UID stable across encodings of the
    // same sequence while distinct events never collide.
    let uid = format!("syllabus-{index}-{}@{UID_DOMAIN}", date.format("%Y%m%d"));
    let mut block = ics::Event::new(uid, dtstamp);

    let time = event
        .time
        .as_deref()
        .and_then(|time| NaiveTime::parse_from_str(time, "%H:%M").ok());

    match time {
        Some(start) => {
            // One hour by default; a 23:xx start clamps to 23:59 so the
            // event never rolls into the next day.
            let end = if start.hour() == 23 {
                NaiveTime::from_hms_opt(23, 59, 0)?
            } else {
                start + Duration::hours(1)
            };

            block.push(DtStart::new(format!(
                "{}T{}",
                date.format("%Y%m%d"),
                start.format("%H%M%S")
            )));
            block.push(DtEnd::new(format!(
                "{}T{}",
                date.format("%Y%m%d"),
                end.format("%H%M%S")
            )));
        }
        None => {
            // All-day DTEND is exclusive: the day after the event.
            let next_day = date.succ_opt()?;

            let mut dtstart = DtStart::new(date.format("%Y%m%d").to_string());
            dtstart.add(Value::new("DATE"));
            block.push(dtstart);

            let mut dtend = DtEnd::new(next_day.format("%Y%m%d").to_string());
            dtend.add(Value::new("DATE"));
            block.push(dtend);
        }
    }

    block.push(Summary::new(escape_text(event.title.as_str())));

    if let Some(location) = event.location.as_deref() {
        block.push(Location::new(escape_text(location)));
    }

    if let Some(description) = event.description.as_deref() {
        block.push(Description::new(escape_text(description)));
    }

    Some(block)
}
