use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::LocalSet;

use crate::common::TestModal;
use crate::common::mocks::MockBackend;
use vidseek::api::{ApiClient, RetrievalBackend};
use vidseek::config::{PlaybackConfig, ServerConfig};
use vidseek::models::Credentials;
use vidseek::player::{
    MediaElement, MediaEvent, MediaSlot, ReviewController, SessionRequest, StepDirection,
    SubmitControl, SubmitOutcome, TransportKind,
};
use vidseek::state::AppState;

fn connected_state() -> Arc<RwLock<AppState>> {
    Arc::new(RwLock::new(AppState::with_credentials(Some(
        Credentials::new("sess", "eval"),
    ))))
}

fn fast_hover() -> PlaybackConfig {
    PlaybackConfig {
        hover_debounce_ms: 1,
        ..PlaybackConfig::default()
    }
}

#[tokio::test]
async fn test_open_submit_and_close_through_controller() {
    LocalSet::new()
        .run_until(async {
            let fakes = TestModal::new();
            let backend = Arc::new(MockBackend::default());
            let (handle, controller) = ReviewController::new(
                fakes.build("http://localhost:5000", fast_hover()),
                backend.clone(),
                connected_state(),
            );
            tokio::task::spawn_local(controller.run());

            let session = handle
                .open(SessionRequest::new("L01_V001", 6.0, Some(25.0), 150))
                .await
                .unwrap();
            assert_eq!(
                handle.transport(MediaSlot::Primary).await.unwrap(),
                Some(TransportKind::ProgressiveFile)
            );
            assert_eq!(
                fakes.primary.source().as_deref(),
                Some("http://localhost:5000/videos/L01_V001")
            );

            fakes.primary.load(100.0);
            handle
                .media_event(session, MediaSlot::Primary, MediaEvent::LoadedMetadata)
                .unwrap();

            let info = handle.frame_info().await.unwrap().unwrap();
            assert_eq!(info.frame_label(), "Frame: 150 / 2500");
            assert_eq!(info.time_label(), "00:06");
            assert_eq!(fakes.panel.published.borrow().len(), 1);

            let outcome = handle.submit(session).await.unwrap().unwrap();
            match outcome {
                SubmitOutcome::Accepted { frame, time_ms, .. } => {
                    assert_eq!(frame, 150);
                    assert_eq!(time_ms, 6000);
                }
                other => panic!("unexpected outcome {:?}", other),
            }

            let submitted = backend.submitted.lock().unwrap().clone();
            assert_eq!(submitted.len(), 1);
            assert_eq!(submitted[0].video_id.as_str(), "L01_V001");
            assert!(!fakes.view.state.borrow().visible);
            assert!(handle.frame_info().await.unwrap().is_none());
        })
        .await;
}

#[tokio::test]
async fn test_rejected_submit_keeps_modal_open() {
    LocalSet::new()
        .run_until(async {
            let fakes = TestModal::new();
            let backend = Arc::new(MockBackend::default());
            backend.inject_error("Evaluation server timeout");
            let (handle, controller) = ReviewController::new(
                fakes.build("http://localhost:5000", fast_hover()),
                backend.clone(),
                connected_state(),
            );
            tokio::task::spawn_local(controller.run());

            let session = handle
                .open(SessionRequest::new("L03_V030", 35.68, Some(25.0), 892))
                .await
                .unwrap();
            fakes.primary.load(600.0);
            handle
                .media_event(session, MediaSlot::Primary, MediaEvent::LoadedMetadata)
                .unwrap();

            let outcome = handle.submit(session).await.unwrap().unwrap();
            assert!(matches!(
                outcome,
                SubmitOutcome::Rejected(ref m) if m.contains("Evaluation server timeout")
            ));

            let view = fakes.view.state.borrow();
            assert!(view.visible);
            assert_eq!(
                view.submit_control,
                Some(SubmitControl::Ready {
                    label: "Submit".to_string()
                })
            );
        })
        .await;
}

#[tokio::test]
async fn test_submit_without_credentials_never_calls_backend() {
    LocalSet::new()
        .run_until(async {
            let fakes = TestModal::new();
            let backend = Arc::new(MockBackend::default());
            let (handle, controller) = ReviewController::new(
                fakes.build("http://localhost:5000", fast_hover()),
                backend.clone(),
                Arc::new(RwLock::new(AppState::new())),
            );
            tokio::task::spawn_local(controller.run());

            let session = handle
                .open(SessionRequest::new("L01_V001", 6.0, None, 150))
                .await
                .unwrap();

            let result = handle.submit(session).await.unwrap();
            assert!(result.is_err());
            assert!(backend.submitted.lock().unwrap().is_empty());
            assert_eq!(fakes.view.state.borrow().alerts.len(), 1);
        })
        .await;
}

#[tokio::test]
async fn test_hover_moves_are_debounced_into_one_decode() {
    LocalSet::new()
        .run_until(async {
            let fakes = TestModal::new();
            let (handle, controller) = ReviewController::new(
                fakes.build("http://localhost:5000", fast_hover()),
                Arc::new(MockBackend::default()),
                connected_state(),
            );
            tokio::task::spawn_local(controller.run());

            let session = handle
                .open(SessionRequest::new("L01_V001", 6.0, Some(25.0), 150))
                .await
                .unwrap();
            fakes.primary.load(100.0);
            fakes.preview.load(100.0);
            handle
                .media_event(session, MediaSlot::Primary, MediaEvent::LoadedMetadata)
                .unwrap();

            for fraction in [0.125, 0.25, 0.625] {
                handle.pointer_moved(session, fraction).unwrap();
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(fakes.preview.state.borrow().seeks, vec![62.5]);

            handle
                .media_event(session, MediaSlot::Preview, MediaEvent::Seeked)
                .unwrap();
            // Round-trip so the event has been processed
            handle.frame_info().await.unwrap();
            let preview = fakes.view.state.borrow().preview.clone().unwrap();
            assert_eq!(preview.time_label, "01:02");
        })
        .await;
}

#[tokio::test]
async fn test_stale_session_commands_are_ignored() {
    LocalSet::new()
        .run_until(async {
            let fakes = TestModal::new();
            let (handle, controller) = ReviewController::new(
                fakes.build("http://localhost:5000", fast_hover()),
                Arc::new(MockBackend::default()),
                connected_state(),
            );
            tokio::task::spawn_local(controller.run());

            let first = handle
                .open(SessionRequest::new("L01_V001", 6.0, Some(25.0), 150))
                .await
                .unwrap();
            let second = handle
                .open(SessionRequest::new("L02_V004", 10.0, Some(25.0), 9))
                .await
                .unwrap();

            fakes.primary.load(100.0);
            handle
                .media_event(second, MediaSlot::Primary, MediaEvent::LoadedMetadata)
                .unwrap();
            handle
                .media_event(first, MediaSlot::Primary, MediaEvent::LoadedMetadata)
                .unwrap();
            assert!(handle.step(first, StepDirection::Forward).await.unwrap().is_none());

            let info = handle.frame_info().await.unwrap().unwrap();
            assert_eq!(info.video_id.as_str(), "L02_V004");
            assert_eq!(info.frame, 250);
            assert_eq!(fakes.primary.state.borrow().seeks, vec![10.0]);
        })
        .await;
}

#[tokio::test]
async fn test_controller_submits_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/submit")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "sessionId": "sess",
            "evaluationId": "eval",
            "videoId": "L03_V030",
            "timeMs": 35680
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    let config = ServerConfig {
        base_url: server.url(),
        ..ServerConfig::default()
    };
    let backend: Arc<dyn RetrievalBackend> = Arc::new(ApiClient::new(&config).unwrap());

    LocalSet::new()
        .run_until(async {
            let fakes = TestModal::new();
            let (handle, controller) = ReviewController::new(
                fakes.build(&config.base_url, fast_hover()),
                backend,
                connected_state(),
            );
            tokio::task::spawn_local(controller.run());

            let session = handle
                .open(SessionRequest::new("L03_V030", 35.68, Some(25.0), 892))
                .await
                .unwrap();
            fakes.primary.load(600.0);
            handle
                .media_event(session, MediaSlot::Primary, MediaEvent::LoadedMetadata)
                .unwrap();

            let outcome = handle.submit(session).await.unwrap().unwrap();
            assert!(matches!(
                outcome,
                SubmitOutcome::Accepted { frame: 892, time_ms: 35680, .. }
            ));
        })
        .await;

    mock.assert_async().await;
}
