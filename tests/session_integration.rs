//! End-to-end session behavior against a mock backend

use serde_json::json;
use std::sync::Arc;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nodu::backend::HttpBackend;
use nodu::session::{ChatSession, RenderCommand, Role, SendOutcome, UiEvent, View};
use nodu::tutors::TutorId;

mod common;

async fn mount_history(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn session_for(server: &MockServer) -> (ChatSession, common::Recorder) {
    let config = common::config_for(&server.uri());
    let backend = Arc::new(HttpBackend::new(&config.server).unwrap());
    let recorder = common::Recorder::default();
    let session = ChatSession::new(backend, Box::new(recorder.clone()), &config);
    (session, recorder)
}

#[tokio::test]
async fn test_resume_stored_conversation_and_continue() {
    let server = MockServer::start().await;
    mount_history(
        &server,
        json!({
            "status": "success",
            "history": {
                "tutor-scientific": {
                    "messages": [
                        { "role": "user", "content": "Cos'è un vettore?" },
                        { "role": "bot", "content": "Una grandezza con direzione." }
                    ],
                    "last_updated": "2025-03-01T12:00:00"
                }
            }
        }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "tutorType": "tutor-scientific" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "reply": "Certo: $\\vec{v}$" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, _) = session_for(&server);
    session.start().await;
    assert_eq!(session.identity().view, View::Dashboard);

    session.dispatch(UiEvent::Navigate(View::History)).await;
    session.dispatch(UiEvent::HistoryEntryChosen(0)).await;

    let identity = session.identity();
    assert_eq!(identity.tutor, Some(TutorId::Scientifica));
    assert_eq!(identity.view, View::Chat);
    assert_eq!(session.surface().len(), 2);
    assert_eq!(session.surface()[1].message.role, Role::Assistant);

    assert_eq!(session.send("Un esempio?").await, SendOutcome::Replied);
    assert_eq!(session.surface().len(), 4);
    assert_eq!(session.surface()[3].message.content, "Certo: $\\vec{v}$");
}

#[tokio::test]
async fn test_fresh_session_when_history_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Not logged in" })))
        .mount(&server)
        .await;

    let (mut session, recorder) = session_for(&server);
    session.start().await;
    assert!(session.history().is_empty());

    session
        .dispatch(UiEvent::TutorSelected("generale".to_string()))
        .await;
    assert_eq!(session.surface().len(), 1);
    assert_eq!(
        session.surface()[0].message.content,
        TutorId::Generale.descriptor().greeting_text
    );
    assert!(recorder
        .commands()
        .contains(&RenderCommand::AcknowledgeSelection(TutorId::Generale)));
}

#[tokio::test]
async fn test_application_error_then_recovery() {
    let server = MockServer::start().await;
    mount_history(&server, json!({ "status": "success", "history": {} })).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "message": "primo" })))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "error": "Servizio non disponibile" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "message": "secondo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "Eccomi" })))
        .mount(&server)
        .await;

    let (mut session, _) = session_for(&server);
    session.start().await;
    session.select_tutor("umanistica");

    assert_eq!(session.send("primo").await, SendOutcome::ApplicationError);
    assert_eq!(
        session.surface().last().unwrap().message.content,
        "Errore: Servizio non disponibile"
    );

    assert_eq!(session.send("secondo").await, SendOutcome::Replied);
    assert_eq!(session.surface().last().unwrap().message.content, "Eccomi");
    assert!(session.surface().iter().all(|m| !m.placeholder));
}

#[tokio::test]
async fn test_attachment_survives_transport_failure_and_travels_on_retry() {
    let server = MockServer::start().await;
    mount_history(&server, json!({ "status": "success", "history": {} })).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "mime_type": "application/pdf" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "Letto" })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let pdf = dir.path().join("compito.pdf");
    std::fs::write(&pdf, b"%PDF-1.4 test").unwrap();

    // First attempt goes to a dead server.
    let config = common::config_for("http://127.0.0.1:9");
    let dead = Arc::new(HttpBackend::new(&config.server).unwrap());
    let recorder = common::Recorder::default();
    let mut session = ChatSession::new(dead, Box::new(recorder.clone()), &config);
    session.select_tutor("scientifica");
    session.dispatch(UiEvent::AttachmentPathChosen(pdf.clone())).await;
    assert!(session.pending_attachment().is_some());

    assert_eq!(session.send("Correggi").await, SendOutcome::TransportError);
    assert_eq!(
        session.surface().last().unwrap().message.content,
        "Errore di connessione con il server. Riprova."
    );
    assert!(session.pending_attachment().is_some());

    // Same file on a live server clears the buffer.
    let (mut live, live_recorder) = session_for(&server);
    live.select_tutor("scientifica");
    live.dispatch(UiEvent::AttachmentPathChosen(pdf)).await;
    assert!(live_recorder.commands().contains(&RenderCommand::ShowDocumentChip {
        name: "compito.pdf".to_string()
    }));
    assert_eq!(live.send("Correggi").await, SendOutcome::Replied);
    assert!(live.pending_attachment().is_none());
    assert_eq!(
        live_recorder.commands().last(),
        Some(&RenderCommand::HidePreviews)
    );
}
