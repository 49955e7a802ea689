use std::{process, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use syllabus_core::{encode_events, extract_events, ExtractError, PROD_ID};

mod config;
mod provider;
mod text;

use config::Config;
use provider::OpenAiProvider;
use text::DocumentKind;

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const USAGE: &str =
    "POST a syllabus as multipart field `file` (.pdf or .txt) to /upload to receive an iCalendar file.\n";

struct AppState {
    provider: OpenAiProvider,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            process::exit(1);
        }
    };

    let addr = config.addr;
    let state = Arc::new(AppState {
        provider: OpenAiProvider::new(&config),
    });

    let router = Router::new()
        .route("/", get(|| async { USAGE }))
        .route("/upload", post(handle_upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening at http://{addr}");
    axum::serve(listener, router).await
}

async fn handle_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let (filename, bytes) = read_file_field(multipart).await?;

    let kind = DocumentKind::from_filename(&filename).ok_or_else(|| {
        ApiError::bad_request("Invalid file type. Please upload PDF or TXT files only.")
    })?;

    let syllabus_text = text::extract_text(kind, &bytes)?;
    tracing::info!(
        "extracted {} chars of text from {filename:?}",
        syllabus_text.len()
    );

    let report = extract_events(&state.provider, &syllabus_text).await?;

    if report.events.is_empty() {
        return Err(ApiError {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: format!(
                "All {} extracted entries were missing dates",
                report.missing_date
            ),
        });
    }

    if report.missing_date > 0 {
        tracing::warn!("discarded {} dateless candidates", report.missing_date);
    }
    if report.generic_titles > 0 {
        tracing::warn!(
            "{} event titles are missing the course identifier",
            report.generic_titles
        );
    }

    let encoded = encode_events(&report.events, PROD_ID, Utc::now());
    if encoded.skipped > 0 {
        tracing::warn!("skipped {} events with invalid dates", encoded.skipped);
    }
    tracing::info!(
        "encoded {} events from {filename:?}",
        report.events.len() - encoded.skipped
    );

    Ok((
        [
            ("content-type", "text/calendar"),
            (
                "content-disposition",
                "attachment; filename=\"syllabus_deadlines.ics\"",
            ),
        ],
        encoded.ics,
    )
        .into_response())
}

async fn read_file_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Malformed multipart body"))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let Some(filename) = field.file_name().map(str::to_string) else {
            return Err(ApiError::bad_request("No file selected"));
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("Failed to read uploaded file"))?;

        return Ok((filename, bytes.to_vec()));
    }

    Err(ApiError::bad_request("No file provided"))
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<text::TextError> for ApiError {
    fn from(err: text::TextError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        let status = match &err {
            ExtractError::NoEventsFound => StatusCode::BAD_REQUEST,
            ExtractError::Provider(_) | ExtractError::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}
