use std::sync::Arc;

use reqwest::Client;
use shared::{
    domain::SequenceId,
    error::{UploadError, UploadErrorKind},
    protocol::{self, AuthorField, UploadAck},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

pub mod authors;
pub mod fields;
pub mod report;
pub mod snapshot;
pub mod validate;

pub use authors::AuthorRoster;
pub use fields::{AuthorUnit, FieldFragment};
pub use report::ErrorPanel;
pub use snapshot::FormSnapshot;
pub use validate::ValidationReport;

pub const PARSE_FAILURE_MESSAGE: &str =
    "An unknown error occurred on the server (could not parse response).";
pub const CONNECTION_FAILURE_MESSAGE: &str = "Network or connection error occurred.";

/// State change notifications a front end renders from. Dropped receivers
/// are ignored.
#[derive(Debug, Clone)]
pub enum FormEvent {
    AuthorAdded { sequence_id: SequenceId },
    AuthorRemoved { sequence_id: SequenceId },
    LoadingChanged { visible: bool },
    ErrorsCleared,
    ErrorReported { line: String },
    NavigationRequested { target: String },
}

/// How one network submission resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 2xx with a readable body; the page navigates to the listing.
    Success { redirect: String },
    /// Non-2xx with a readable body; the server's message is shown verbatim.
    ServerRejected { message: String },
    /// A response arrived but its body could not be decoded.
    ResponseUnreadable { message: String },
    /// The request itself failed; no response was obtained.
    TransportFailure { message: String },
}

impl SubmissionOutcome {
    pub fn failure(&self) -> Option<UploadError> {
        match self {
            SubmissionOutcome::Success { .. } => None,
            SubmissionOutcome::ServerRejected { message } => Some(UploadError::new(
                UploadErrorKind::ServerRejection,
                message.clone(),
            )),
            SubmissionOutcome::ResponseUnreadable { message } => Some(UploadError::new(
                UploadErrorKind::ResponseParse,
                message.clone(),
            )),
            SubmissionOutcome::TransportFailure { message } => {
                Some(UploadError::new(UploadErrorKind::Transport, message.clone()))
            }
        }
    }
}

/// What one `submit` call produced.
#[derive(Debug, Clone)]
pub enum SubmitAttempt {
    /// Validation failed; no network call was made.
    Invalid(ValidationReport),
    /// A previous submission is still pending; the form was left untouched.
    InFlight,
    Completed(SubmissionOutcome),
}

struct FormState {
    title: FieldFragment,
    description: FieldFragment,
    authors: AuthorRoster,
    error_panel: ErrorPanel,
    csrf_token: Option<String>,
    loading: bool,
    in_flight: bool,
}

/// Drives the whole click-to-result flow: validate, enter loading,
/// serialize, POST, interpret the response, then report or hand out the
/// navigation target.
pub struct UploadFormController {
    http: Client,
    server_url: String,
    inner: Mutex<FormState>,
    events: broadcast::Sender<FormEvent>,
}

impl UploadFormController {
    pub fn new(server_url: impl Into<String>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            http: Client::new(),
            server_url: server_url.into(),
            inner: Mutex::new(FormState {
                title: fields::render_field(protocol::TITLE_FIELD, "Title"),
                description: fields::render_field(protocol::DESCRIPTION_FIELD, "Description"),
                authors: AuthorRoster::new(""),
                error_panel: ErrorPanel::new(),
                csrf_token: None,
                loading: false,
                in_flight: false,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub async fn set_title(&self, value: impl Into<String>) {
        self.inner.lock().await.title.value = value.into();
    }

    pub async fn set_description(&self, value: impl Into<String>) {
        self.inner.lock().await.description.value = value.into();
    }

    pub async fn set_csrf_token(&self, token: Option<String>) {
        self.inner.lock().await.csrf_token = token;
    }

    pub async fn add_author(&self) -> SequenceId {
        let sequence_id = self.inner.lock().await.authors.add_author();
        self.emit(FormEvent::AuthorAdded { sequence_id });
        sequence_id
    }

    /// Detaches one author unit; a no-op when the id is already gone.
    pub async fn remove_author(&self, sequence_id: SequenceId) -> bool {
        let removed = self.inner.lock().await.authors.remove_author(sequence_id);
        if removed {
            self.emit(FormEvent::AuthorRemoved { sequence_id });
        }
        removed
    }

    /// Writes into one author input. Returns false when the unit is gone.
    pub async fn set_author_field(
        &self,
        sequence_id: SequenceId,
        field: AuthorField,
        value: impl Into<String>,
    ) -> bool {
        let mut state = self.inner.lock().await;
        match state.authors.unit_mut(sequence_id) {
            Some(unit) => {
                unit.field_mut(field).value = value.into();
                true
            }
            None => false,
        }
    }

    pub async fn author_count(&self) -> usize {
        self.inner.lock().await.authors.len()
    }

    pub async fn error_lines(&self) -> Vec<String> {
        self.inner.lock().await.error_panel.lines().to_vec()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.loading
    }

    /// One full submission attempt. The panel is cleared and loading shown
    /// before validation runs; loading is restored on every path that does
    /// not navigate away. While a request is pending, further calls return
    /// [`SubmitAttempt::InFlight`] without touching the form.
    pub async fn submit(&self) -> SubmitAttempt {
        let snapshot = {
            let mut state = self.inner.lock().await;
            if state.in_flight {
                warn!("upload: submit refused, request already in flight");
                return SubmitAttempt::InFlight;
            }

            state.error_panel.clear();
            self.emit(FormEvent::ErrorsCleared);
            state.loading = true;
            self.emit(FormEvent::LoadingChanged { visible: true });

            let FormState {
                title,
                description,
                authors,
                ..
            } = &mut *state;
            let validation = validate::validate_form(title, description, authors);
            for message in validation.messages() {
                let line = state.error_panel.report(message);
                self.emit(FormEvent::ErrorReported { line });
            }
            if !validation.is_valid() {
                state.loading = false;
                self.emit(FormEvent::LoadingChanged { visible: false });
                info!(
                    problems = validation.messages().len(),
                    "upload: rejected locally"
                );
                return SubmitAttempt::Invalid(validation);
            }

            let mut snapshot =
                FormSnapshot::capture(&state.title, &state.description, &state.authors);
            if let Some(token) = &state.csrf_token {
                snapshot.set(protocol::CSRF_FIELD, token.clone());
            }
            state.in_flight = true;
            snapshot
        };

        let outcome = self.post_snapshot(snapshot).await;

        let mut state = self.inner.lock().await;
        state.in_flight = false;
        match &outcome {
            SubmissionOutcome::Success { redirect } => {
                // The page is leaving; loading stays up until navigation.
                self.emit(FormEvent::NavigationRequested {
                    target: redirect.clone(),
                });
            }
            SubmissionOutcome::ServerRejected { message }
            | SubmissionOutcome::ResponseUnreadable { message }
            | SubmissionOutcome::TransportFailure { message } => {
                state.loading = false;
                self.emit(FormEvent::LoadingChanged { visible: false });
                let line = state.error_panel.report(message);
                self.emit(FormEvent::ErrorReported { line });
            }
        }
        SubmitAttempt::Completed(outcome)
    }

    async fn post_snapshot(&self, snapshot: FormSnapshot) -> SubmissionOutcome {
        let url = format!("{}{}", self.server_url, protocol::UPLOAD_PATH);
        let response = match self
            .http
            .post(&url)
            .multipart(snapshot.into_multipart())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!("upload: transport failure: {err}");
                return SubmissionOutcome::TransportFailure {
                    message: CONNECTION_FAILURE_MESSAGE.to_string(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            match response.json::<UploadAck>().await {
                Ok(ack) => {
                    info!(message = %ack.message, "upload: dataset accepted");
                    SubmissionOutcome::Success {
                        redirect: protocol::LISTING_PATH.to_string(),
                    }
                }
                Err(err) => {
                    error!("upload: accepted but response body undecodable: {err}");
                    SubmissionOutcome::ResponseUnreadable {
                        message: PARSE_FAILURE_MESSAGE.to_string(),
                    }
                }
            }
        } else {
            match response.json::<UploadAck>().await {
                Ok(ack) => {
                    error!(status = status.as_u16(), message = %ack.message, "upload: rejected by server");
                    SubmissionOutcome::ServerRejected {
                        message: ack.message,
                    }
                }
                Err(err) => {
                    error!(
                        status = status.as_u16(),
                        "upload: could not parse rejection body: {err}"
                    );
                    SubmissionOutcome::ResponseUnreadable {
                        message: PARSE_FAILURE_MESSAGE.to_string(),
                    }
                }
            }
        }
    }

    fn emit(&self, event: FormEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
