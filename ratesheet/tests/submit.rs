//! Upload behaviour against an in-process mock of the receiving service.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Router,
};
use ratesheet::{Config, FileFormat, Session, SubmitBlocked, SubmitError, UploadClient};
use std::sync::{Arc, Mutex};

const VALID_CSV: &str = "Origin Port,Destination Port,Container Type,Ocean Freight Rate,Carrier,Effective Date\n\
    Shanghai,Rotterdam,40HC,1500,MSC,2023-01-01\n\
    Ningbo,Hamburg,20GP,900,CMA,2023-02-01";

/// What the mock endpoint saw
#[derive(Debug, Clone, Default)]
struct Received {
    field: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: &'static str,
    received: Arc<Mutex<Vec<Received>>>,
}

async fn upload(
    State(state): State<MockState>,
    mut multipart: Multipart,
) -> (StatusCode, &'static str) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();

        state.received.lock().unwrap().push(Received {
            field: name,
            file_name,
            content_type,
            bytes,
        });
    }
    (state.status, state.body)
}

/// Start a mock service; returns its base URL and the capture buffer.
async fn spawn_mock(status: StatusCode, body: &'static str) -> (String, Arc<Mutex<Vec<Received>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = MockState { status, body, received: received.clone() };

    let app = Router::new().route("/upload", post(upload)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), received)
}

fn client(base_url: &str) -> UploadClient {
    UploadClient::new(&Config::new(base_url).unwrap()).unwrap()
}

fn loaded_session() -> Session {
    let mut session = Session::new();
    session
        .load("rates.csv", VALID_CSV.as_bytes(), FileFormat::Csv)
        .unwrap();
    session
}

#[tokio::test]
async fn success_uses_server_message_and_clears_table() {
    let (base_url, received) = spawn_mock(StatusCode::OK, r#"{"message":"12 rates stored"}"#).await;
    let mut session = loaded_session();

    let outcome = session.submit(&client(&base_url)).await.unwrap();

    assert_eq!(outcome.message, "12 rates stored");
    assert!(session.table().is_none());
    assert!(!session.is_submittable());

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].field, "file");
    assert_eq!(received[0].file_name.as_deref(), Some("corrected_data.csv"));
    assert_eq!(received[0].content_type.as_deref(), Some("text/csv"));
    assert_eq!(String::from_utf8(received[0].bytes.clone()).unwrap(), VALID_CSV);
}

#[tokio::test]
async fn success_without_message_uses_default() {
    let (base_url, _) = spawn_mock(StatusCode::CREATED, "{}").await;
    let mut session = loaded_session();

    let outcome = session.submit(&client(&base_url)).await.unwrap();
    assert_eq!(outcome.message, "File uploaded successfully!");
}

#[tokio::test]
async fn spreadsheet_uploads_as_xlsx() {
    let (base_url, received) = spawn_mock(StatusCode::OK, "{}").await;

    let table = loaded_session().table().unwrap().clone();
    let xlsx = ratesheet::serialize(&table, FileFormat::Spreadsheet).unwrap();

    let mut session = Session::new();
    session
        .load("rates.xlsx", &xlsx.bytes, FileFormat::Spreadsheet)
        .unwrap();
    assert!(session.is_submittable());
    session.submit(&client(&base_url)).await.unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received[0].file_name.as_deref(), Some("corrected_data.xlsx"));
    assert_eq!(&received[0].bytes[..2], b"PK");
}

#[tokio::test]
async fn server_failure_keeps_table_for_retry() {
    let (base_url, _) = spawn_mock(StatusCode::INTERNAL_SERVER_ERROR, "database down").await;
    let mut session = loaded_session();
    let before = session.table().unwrap().clone();

    let err = session.submit(&client(&base_url)).await.unwrap_err();

    assert!(matches!(err, SubmitError::Server { status: 500, .. }));
    assert_eq!(err.user_message(), "File upload failed. Please try again.");
    assert_eq!(session.table().unwrap(), &before);
    assert!(session.is_submittable());
}

#[tokio::test]
async fn transport_failure_keeps_table() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut session = loaded_session();
    let err = session
        .submit(&client(&format!("http://{}", addr)))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Transport(_)));
    assert!(session.is_submittable());
}

#[tokio::test]
async fn blocked_session_never_reaches_server() {
    let (base_url, received) = spawn_mock(StatusCode::OK, "{}").await;
    let mut session = loaded_session();
    session.set_cell(0, "Effective Date", "2023/01/01").unwrap();

    let err = session.submit(&client(&base_url)).await.unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Blocked(SubmitBlocked::RowErrors { count: 1 })
    ));
    assert!(received.lock().unwrap().is_empty());
    assert!(session.table().is_some());
}

#[tokio::test]
async fn edits_during_flight_do_not_change_payload() {
    let (base_url, received) = spawn_mock(StatusCode::OK, "{}").await;
    let client = client(&base_url);
    let mut session = loaded_session();

    let submission = session.snapshot().unwrap();
    let in_flight = tokio::spawn({
        let client = client.clone();
        async move { client.submit(submission).await }
    });
    session.set_cell(0, "Carrier", "Maersk").unwrap();

    let result = in_flight.await.unwrap();
    assert!(result.is_ok());

    let body = String::from_utf8(received.lock().unwrap()[0].bytes.clone()).unwrap();
    assert!(body.contains("MSC"));
    assert!(!body.contains("Maersk"));

    session.complete_submission(&result);
    assert!(session.table().is_none());
}
