mod contract;
mod error;
mod ics;
mod provider;
mod structs;

pub use contract::{
    detect_course_code, extract_events, parse_candidates, validate, RecurringSeries,
    ValidationReport, EXTRACTION_PROMPT, GENERIC_TITLE,
};
pub use error::{ExtractError, ProviderError};
pub use provider::Provider;
pub use structs::{Event, EventCandidate};

pub use self::ics::{encode_events, EncodedCalendar, PROD_ID};
