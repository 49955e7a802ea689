//! End-to-end extraction and encoding against fixture providers, no
//! network involved.

use chrono::{NaiveDate, TimeZone, Utc, Weekday};

use syllabus_core::{
    encode_events, extract_events, ExtractError, Provider, ProviderError, RecurringSeries, PROD_ID,
};

/// Provider that replays a canned completion.
struct FixtureProvider(&'static str);

#[async_trait::async_trait]
impl Provider for FixtureProvider {
    async fn extract(&self, _text: &str) -> Result<String, ProviderError> {
        Ok(self.0.to_string())
    }
}

/// Provider that always fails upstream.
struct BrokenProvider;

#[async_trait::async_trait]
impl Provider for BrokenProvider {
    async fn extract(&self, _text: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Api {
            status: 500,
            message: "upstream down".to_string(),
        })
    }
}

const SYLLABUS: &str = "CS 101: Introduction to Computer Science\n\
    Classes every Friday from September 6 to September 20, 2024, Room 12.\n\
    Midterm exam October 15 at 14:00.";

const COMPLETION: &str = r#"```json
[
  {"title": "CS 101 - Class Session", "date": "2024-09-06", "time": "10:00", "location": "Room 12", "description": null},
  {"title": "CS 101 - Class Session", "date": "2024-09-13", "time": "10:00", "location": "Room 12", "description": null},
  {"title": "CS 101 - Class Session", "date": "2024-09-20", "time": "10:00", "location": "Room 12", "description": null},
  {"title": "CS 101 - Midterm Exam", "date": "2024-10-15", "time": "14:00", "location": null, "description": "Covers weeks 1-6"}
]
```"#;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn recurring_series_arrives_expanded_with_course_titles() {
    let provider = FixtureProvider(COMPLETION);
    let report = extract_events(&provider, SYLLABUS).await.unwrap();

    assert_eq!(report.events.len(), 4);
    assert_eq!(report.missing_date, 0);
    assert_eq!(report.generic_titles, 0);
    assert!(report.events.iter().all(|e| e.title.contains("CS 101")));

    let sessions: Vec<_> = report
        .events
        .iter()
        .filter(|e| e.title.contains("Class Session"))
        .collect();
    assert_eq!(
        sessions.iter().map(|e| e.date.as_str()).collect::<Vec<_>>(),
        vec!["2024-09-06", "2024-09-13", "2024-09-20"]
    );

    let series = RecurringSeries::weekly(Weekday::Fri, date(2024, 9, 6), date(2024, 9, 20));
    assert!(series.missing_occurrences(&report.events).is_empty());
}

#[tokio::test]
async fn extracted_events_encode_in_input_order() {
    let provider = FixtureProvider(COMPLETION);
    let report = extract_events(&provider, SYLLABUS).await.unwrap();

    let now = Utc.with_ymd_and_hms(2024, 8, 25, 12, 0, 0).unwrap();
    let encoded = encode_events(&report.events, PROD_ID, now);

    assert_eq!(encoded.skipped, 0);
    assert_eq!(encoded.ics.matches("BEGIN:VEVENT").count(), 4);

    let first_session = encoded.ics.find("UID:syllabus-0-20240906").unwrap();
    let midterm = encoded.ics.find("UID:syllabus-3-20241015").unwrap();
    assert!(first_session < midterm);
}

#[tokio::test]
async fn incomplete_expansion_is_detectable() {
    let provider = FixtureProvider(
        r#"[
            {"title": "CS 101 - Class Session", "date": "2024-09-06"},
            {"title": "CS 101 - Class Session", "date": "2024-09-20"}
        ]"#,
    );
    let report = extract_events(&provider, SYLLABUS).await.unwrap();

    let series = RecurringSeries::weekly(Weekday::Fri, date(2024, 9, 6), date(2024, 9, 20));
    assert_eq!(series.missing_occurrences(&report.events), vec![date(2024, 9, 13)]);
}

#[tokio::test]
async fn generic_titles_are_flagged_when_course_is_known() {
    let provider = FixtureProvider(r#"[{"title": "Class Session", "date": "2024-09-06"}]"#);
    let report = extract_events(&provider, SYLLABUS).await.unwrap();

    assert_eq!(report.events.len(), 1);
    assert_eq!(report.generic_titles, 1);
}

#[tokio::test]
async fn provider_failure_propagates_as_provider_error() {
    let err = extract_events(&BrokenProvider, SYLLABUS).await.unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Provider(ProviderError::Api { status: 500, .. })
    ));
}

#[tokio::test]
async fn prose_completion_is_malformed_response() {
    let provider = FixtureProvider("I could not find any structured dates in this document.");
    let err = extract_events(&provider, SYLLABUS).await.unwrap_err();
    assert!(matches!(err, ExtractError::MalformedResponse(_)));
}

#[tokio::test]
async fn empty_array_is_no_events_found() {
    let provider = FixtureProvider("[]");
    let err = extract_events(&provider, SYLLABUS).await.unwrap_err();
    assert!(matches!(err, ExtractError::NoEventsFound));
}

#[tokio::test]
async fn all_candidates_dateless_is_a_report_not_an_error() {
    let provider = FixtureProvider(r#"[{"title": "CS 101 - Reading"}, {"title": "CS 101 - Lab"}]"#);
    let report = extract_events(&provider, SYLLABUS).await.unwrap();

    assert!(report.events.is_empty());
    assert_eq!(report.missing_date, 2);
}
