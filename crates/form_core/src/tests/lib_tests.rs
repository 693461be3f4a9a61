use super::*;
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    routing::post,
    Json, Router,
};
use tokio::{net::TcpListener, sync::oneshot};

#[derive(Clone)]
struct ServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<Vec<(String, String)>>>>>,
}

async fn handle_upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Json<UploadAck> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.expect("field text");
        fields.push((name, value));
    }
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(fields);
    }
    Json(UploadAck {
        message: "ok".into(),
    })
}

async fn serve(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_upload_server() -> (String, oneshot::Receiver<Vec<(String, String)>>) {
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/dataset/upload", post(handle_upload))
        .with_state(state);
    (serve(app).await, rx)
}

async fn spawn_static_server(
    status: StatusCode,
    content_type: &'static str,
    body: &'static str,
) -> String {
    let app = Router::new().route(
        "/dataset/upload",
        post(move || async move { (status, [(header::CONTENT_TYPE, content_type)], body) }),
    );
    serve(app).await
}

async fn spawn_slow_server(delay: Duration) -> String {
    let app = Router::new().route(
        "/dataset/upload",
        post(move || async move {
            tokio::time::sleep(delay).await;
            Json(UploadAck {
                message: "ok".into(),
            })
        }),
    );
    serve(app).await
}

/// Address with nothing listening behind it.
async fn dead_server_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

async fn fill_valid_form(form: &UploadFormController) -> SequenceId {
    form.set_title("Solar flares").await;
    form.set_description("Observations from 2024").await;
    let id = form.add_author().await;
    form.set_author_field(id, AuthorField::Name, "Ada Lovelace")
        .await;
    form.set_author_field(id, AuthorField::Affiliation, "Analytical Engine Society")
        .await;
    form.set_author_field(id, AuthorField::Orcid, "0000-0002-1825-0097")
        .await;
    id
}

#[tokio::test]
async fn valid_submission_posts_snapshot_and_navigates() {
    let (server_url, payload_rx) = spawn_upload_server().await;
    let form = UploadFormController::new(server_url);
    fill_valid_form(&form).await;
    form.set_csrf_token(Some("tok-123".into())).await;

    let mut events = form.subscribe_events();
    let attempt = form.submit().await;

    let outcome = match attempt {
        SubmitAttempt::Completed(outcome) => outcome,
        other => panic!("unexpected attempt: {other:?}"),
    };
    assert_eq!(
        outcome,
        SubmissionOutcome::Success {
            redirect: "/dataset/list".into()
        }
    );
    assert!(form.error_lines().await.is_empty());
    // Terminal state: the page is navigating, loading was never restored.
    assert!(form.is_loading().await);

    let payload = payload_rx.await.expect("payload");
    assert_eq!(
        payload,
        [
            ("title".to_string(), "Solar flares".to_string()),
            ("desc".to_string(), "Observations from 2024".to_string()),
            ("authors-0-name".to_string(), "Ada Lovelace".to_string()),
            (
                "authors-0-affiliation".to_string(),
                "Analytical Engine Society".to_string()
            ),
            (
                "authors-0-orcid".to_string(),
                "0000-0002-1825-0097".to_string()
            ),
            ("csrf_token".to_string(), "tok-123".to_string()),
        ]
    );

    assert!(matches!(
        events.recv().await.expect("event"),
        FormEvent::ErrorsCleared
    ));
    assert!(matches!(
        events.recv().await.expect("event"),
        FormEvent::LoadingChanged { visible: true }
    ));
    match events.recv().await.expect("event") {
        FormEvent::NavigationRequested { target } => assert_eq!(target, "/dataset/list"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn rejected_submission_shows_server_message_verbatim() {
    let server_url = spawn_static_server(
        StatusCode::BAD_REQUEST,
        "application/json",
        r#"{"message":"duplicate title"}"#,
    )
    .await;
    let form = UploadFormController::new(server_url);
    fill_valid_form(&form).await;

    let attempt = form.submit().await;

    assert!(matches!(
        attempt,
        SubmitAttempt::Completed(SubmissionOutcome::ServerRejected { ref message })
            if message == "duplicate title"
    ));
    assert_eq!(
        form.error_lines().await,
        ["Upload error: duplicate title"]
    );
    assert!(!form.is_loading().await);
}

#[tokio::test]
async fn unreadable_rejection_body_reports_generic_message() {
    let server_url = spawn_static_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        "text/html",
        "<html>oops</html>",
    )
    .await;
    let form = UploadFormController::new(server_url);
    fill_valid_form(&form).await;

    let attempt = form.submit().await;

    assert!(matches!(
        attempt,
        SubmitAttempt::Completed(SubmissionOutcome::ResponseUnreadable { ref message })
            if message == PARSE_FAILURE_MESSAGE
    ));
    assert_eq!(
        form.error_lines().await,
        [format!("Upload error: {PARSE_FAILURE_MESSAGE}")]
    );
    assert!(!form.is_loading().await);
}

#[tokio::test]
async fn unreadable_success_body_reports_instead_of_navigating() {
    let server_url = spawn_static_server(StatusCode::OK, "text/html", "<html>ok</html>").await;
    let form = UploadFormController::new(server_url);
    fill_valid_form(&form).await;

    let mut events = form.subscribe_events();
    let attempt = form.submit().await;

    assert!(matches!(
        attempt,
        SubmitAttempt::Completed(SubmissionOutcome::ResponseUnreadable { .. })
    ));
    assert!(!form.is_loading().await);
    while let Ok(event) = events.try_recv() {
        assert!(
            !matches!(event, FormEvent::NavigationRequested { .. }),
            "must not navigate on an unreadable success body"
        );
    }
}

#[tokio::test]
async fn transport_failure_reports_connection_error() {
    let form = UploadFormController::new(dead_server_url().await);
    fill_valid_form(&form).await;

    let attempt = form.submit().await;

    assert!(matches!(
        attempt,
        SubmitAttempt::Completed(SubmissionOutcome::TransportFailure { ref message })
            if message == CONNECTION_FAILURE_MESSAGE
    ));
    assert_eq!(
        form.error_lines().await,
        [format!("Upload error: {CONNECTION_FAILURE_MESSAGE}")]
    );
    assert!(!form.is_loading().await);
}

#[tokio::test]
async fn invalid_form_never_reaches_the_network() {
    let (server_url, mut payload_rx) = spawn_upload_server().await;
    let form = UploadFormController::new(server_url);
    form.set_title("ab").await;
    form.set_description("x").await;
    let id = form.add_author().await;
    form.set_author_field(id, AuthorField::Orcid, "12345678")
        .await;

    let attempt = form.submit().await;

    let report = match attempt {
        SubmitAttempt::Invalid(report) => report,
        other => panic!("unexpected attempt: {other:?}"),
    };
    assert_eq!(
        report.messages(),
        [
            validate::TITLE_TOO_SHORT,
            validate::DESCRIPTION_TOO_SHORT,
            "ORCID value does not conform to valid format: 12345678",
            validate::AUTHOR_NAME_EMPTY,
        ]
    );
    assert_eq!(form.error_lines().await.len(), 4);
    assert!(!form.is_loading().await);
    assert!(
        payload_rx.try_recv().is_err(),
        "no request may be sent for an invalid form"
    );
}

#[tokio::test]
async fn second_submit_while_pending_returns_in_flight() {
    let server_url = spawn_slow_server(Duration::from_millis(300)).await;
    let form = UploadFormController::new(server_url);
    fill_valid_form(&form).await;

    let first = {
        let form = Arc::clone(&form);
        tokio::spawn(async move { form.submit().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = form.submit().await;
    assert!(matches!(second, SubmitAttempt::InFlight));
    assert!(form.error_lines().await.is_empty(), "guard must not touch the panel");

    let first = first.await.expect("join");
    assert!(matches!(
        first,
        SubmitAttempt::Completed(SubmissionOutcome::Success { .. })
    ));
}

#[tokio::test]
async fn author_lifecycle_emits_events_and_is_idempotent() {
    let form = UploadFormController::new("http://127.0.0.1:9");
    let mut events = form.subscribe_events();

    let id = form.add_author().await;
    assert_eq!(form.author_count().await, 1);
    assert!(form.remove_author(id).await);
    assert!(!form.remove_author(id).await);
    assert_eq!(form.author_count().await, 0);

    assert!(matches!(
        events.recv().await.expect("event"),
        FormEvent::AuthorAdded { sequence_id } if sequence_id == id
    ));
    assert!(matches!(
        events.recv().await.expect("event"),
        FormEvent::AuthorRemoved { sequence_id } if sequence_id == id
    ));
    assert!(events.try_recv().is_err(), "second removal emits nothing");
}

#[tokio::test]
async fn writing_into_a_removed_unit_is_refused() {
    let form = UploadFormController::new("http://127.0.0.1:9");
    let id = form.add_author().await;
    form.remove_author(id).await;
    assert!(
        !form
            .set_author_field(id, AuthorField::Name, "ghost")
            .await
    );
}

#[test]
fn outcome_failure_maps_to_error_kinds() {
    let success = SubmissionOutcome::Success {
        redirect: "/dataset/list".into(),
    };
    assert!(success.failure().is_none());

    let rejected = SubmissionOutcome::ServerRejected {
        message: "duplicate title".into(),
    };
    let err = rejected.failure().expect("error");
    assert_eq!(err.kind, UploadErrorKind::ServerRejection);
    assert_eq!(err.message, "duplicate title");

    let unreadable = SubmissionOutcome::ResponseUnreadable {
        message: PARSE_FAILURE_MESSAGE.into(),
    };
    assert_eq!(
        unreadable.failure().expect("error").kind,
        UploadErrorKind::ResponseParse
    );

    let transport = SubmissionOutcome::TransportFailure {
        message: CONNECTION_FAILURE_MESSAGE.into(),
    };
    assert_eq!(
        transport.failure().expect("error").kind,
        UploadErrorKind::Transport
    );
}
