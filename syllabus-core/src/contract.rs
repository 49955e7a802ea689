use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ExtractError;
use crate::provider::Provider;
use crate::structs::{Event, EventCandidate};

/// System prompt sent to the extraction provider. The rules it states
/// (course-coded titles, per-occurrence expansion of recurring series,
/// field formats, bare-JSON output) are the same ones [`validate`]
/// checks afterwards, so the contract lives in one place.
pub const EXTRACTION_PROMPT: &str = r#"You are parsing an academic course syllabus. Find every dated item - exams, quizzes, assignment deadlines, project milestones, presentations, class sessions - and return them as a strict JSON array.

RULES:
1. COURSE IDENTIFIER: First identify the course name or code from the syllabus (e.g. "CS 101", "Physics 201", "Introduction to Biology"). Every event title must incorporate it: "CS 101 - Midterm Exam", "Introduction to Biology - Lab Session". Never emit a bare generic title like "Class Session" when the syllabus names the course.

2. RECURRING EVENTS: Expand every bounded recurring mention (e.g. "classes every Friday from September 6 to December 13", "weekly labs on Mondays until November 30") into one object per occurrence, each with its own concrete date. Never return a single object standing for a whole series.

3. Each object carries exactly these fields:
- "title": string, course identifier included (required)
- "date": string, ISO format YYYY-MM-DD (required)
- "time": string, 24-hour HH:MM, or null when the syllabus gives no time
- "location": string (room, building, or platform), or null if not mentioned
- "description": string (topics covered, submission method, other details), or null if none

4. Capture everything the syllabus provides: if a location or supporting detail is mentioned for an item, include it.

Respond with the JSON array alone - no markdown, no code fences, no commentary. Example:
[
  {"title": "CS 101 - Midterm Exam", "date": "2024-10-15", "time": "14:00", "location": "Room 101", "description": "Covers chapters 1-5"},
  {"title": "CS 101 - Class Session", "date": "2024-09-06", "time": "10:00", "location": null, "description": null}
]"#;

/// Title given to candidates that arrive without one.
pub const GENERIC_TITLE: &str = "Untitled Event";

/// Outcome of validating provider candidates: the usable events plus
/// counts for everything absorbed along the way.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub events: Vec<Event>,
    /// Candidates discarded because they carried no date.
    pub missing_date: usize,
    /// Events whose title fails to mention the detected course code.
    pub generic_titles: usize,
}

/// Run the full extraction path: call the provider, parse its completion
/// as a candidate array, and validate the candidates against the source
/// text.
///
/// An empty parsed array is [`ExtractError::NoEventsFound`]; a non-empty
/// array whose candidates all lack dates is *not* an error and comes
/// back as a report with no events and a `missing_date` count.
pub async fn extract_events(
    provider: &dyn Provider,
    text: &str,
) -> Result<ValidationReport, ExtractError> {
    let completion = provider.extract(text).await?;
    let candidates = parse_candidates(&completion)?;

    if candidates.is_empty() {
        return Err(ExtractError::NoEventsFound);
    }

    let course_code = detect_course_code(text);
    match &course_code {
        Some(code) => tracing::debug!("detected course code {code:?} in source text"),
        None => tracing::debug!("no course code detected in source text"),
    }

    Ok(validate(candidates, course_code.as_deref()))
}

/// Parse a provider completion into candidate events, stripping any
/// markdown fencing first. Failure here is [`ExtractError::MalformedResponse`].
pub fn parse_candidates(completion: &str) -> Result<Vec<EventCandidate>, ExtractError> {
    let json = extract_json_array(completion);
    let candidates = serde_json::from_str(json)?;
    Ok(candidates)
}

/// Apply the contract's per-candidate rules: candidates without a date
/// are discarded and counted; missing titles fall back to
/// [`GENERIC_TITLE`]; titles that fail to mention the detected course
/// code are flagged and counted but never dropped.
pub fn validate(candidates: Vec<EventCandidate>, course_code: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();

    for candidate in candidates {
        let Some(date) = candidate.date.filter(|date| !date.trim().is_empty()) else {
            tracing::debug!(
                "discarding candidate without a date (title: {:?})",
                candidate.title
            );
            report.missing_date += 1;
            continue;
        };

        let title = candidate
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| GENERIC_TITLE.to_string());

        if let Some(code) = course_code {
            if !mentions_course(&title, code) {
                tracing::warn!("event title {title:?} does not mention course {code:?}");
                report.generic_titles += 1;
            }
        }

        report.events.push(Event {
            title,
            date,
            time: candidate.time.filter(|time| !time.trim().is_empty()),
            location: candidate.location.filter(|loc| !loc.trim().is_empty()),
            description: candidate.description.filter(|desc| !desc.trim().is_empty()),
        });
    }

    report
}

static COURSE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]{2,4})[ -]?(\d{3,4}[A-Z]?)\b").unwrap());

/// Short uppercase words that show up next to numbers in syllabi
/// without naming a course.
const NOT_DEPARTMENTS: &[&str] = &["FALL", "HALL", "PAGE", "ROOM", "UNIT", "WEEK"];

/// Scan source text for a course-code shape ("CS 101", "PHYS 201",
/// "MATH 1010") and normalize it to `DEPT NUMBER`. Returns the first
/// plausible match; course codes conventionally lead the document.
pub fn detect_course_code(text: &str) -> Option<String> {
    for caps in COURSE_CODE.captures_iter(text) {
        let dept = &caps[1];
        let number = &caps[2];
        if NOT_DEPARTMENTS.contains(&dept) {
            continue;
        }
        // A four-digit number starting 19/20 is almost always a
        // calendar year ("FALL 2024"), not a course number.
        if number.len() == 4 && (number.starts_with("19") || number.starts_with("20")) {
            continue;
        }
        return Some(format!("{dept} {number}"));
    }
    None
}

/// Containment check that ignores case, spacing, and punctuation, so
/// "CS101 - Midterm" still counts as mentioning "CS 101".
fn mentions_course(title: &str, course_code: &str) -> bool {
    fn squash(s: &str) -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }

    squash(title).contains(&squash(course_code))
}

/// Strip markdown code fences and surrounding prose from a completion,
/// leaving the widest bracketed window for serde to judge.
fn extract_json_array(completion: &str) -> &str {
    let mut text = completion.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the fence line ("```json" or bare "```"), then the
        // closing fence if one exists.
        let body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
        text = match body.rfind("```") {
            Some(end) => &body[..end],
            None => body,
        };
        text = text.trim();
    }

    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            return &text[start..=end];
        }
    }

    text
}

/// A bounded recurring series stated in source text, used to check that
/// a provider expanded the series into one event per occurrence.
///
/// Cadence: the first occurrence is the first date on or after `start`
/// falling on `weekday`; later occurrences step `interval_weeks * 7`
/// days; `start` and `end` are both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringSeries {
    pub weekday: Weekday,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval_weeks: u32,
}

impl RecurringSeries {
    /// Weekly series on `weekday` between `start` and `end` inclusive.
    pub fn weekly(weekday: Weekday, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            weekday,
            start,
            end,
            interval_weeks: 1,
        }
    }

    /// Every concrete date of the series, in order.
    pub fn occurrences(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();

        let mut date = self.start;
        while date.weekday() != self.weekday {
            match date.succ_opt() {
                Some(next) => date = next,
                None => return dates,
            }
        }

        let step = Duration::days(7 * i64::from(self.interval_weeks.max(1)));
        while date <= self.end {
            dates.push(date);
            match date.checked_add_signed(step) {
                Some(next) => date = next,
                None => break,
            }
        }

        dates
    }

    /// Series dates not covered by any event in `events`. Events whose
    /// date does not parse cover nothing.
    pub fn missing_occurrences(&self, events: &[Event]) -> Vec<NaiveDate> {
        let covered: HashSet<NaiveDate> = events
            .iter()
            .filter_map(|event| NaiveDate::parse_from_str(&event.date, "%Y-%m-%d").ok())
            .collect();

        self.occurrences()
            .into_iter()
            .filter(|date| !covered.contains(date))
            .collect()
    }
}
