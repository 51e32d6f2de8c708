//! Session controller integration tests
//!
//! Drives `Session` with a scripted enhancer and a recording clipboard.
//! No network, no system clipboard.

use async_trait::async_trait;
use promptalchemy::llm::{EnhanceError, Enhancer};
use promptalchemy::session::{
    messages, ApiKey, Clipboard, ClipboardError, CredentialStore, EnhanceStart, Notification,
    Session, SessionEvent, SessionState,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// Test helpers

/// Enhancer that replays canned results, optionally waiting on a gate
#[derive(Default)]
struct Scripted {
    results: Mutex<VecDeque<Result<String, EnhanceError>>>,
    calls: AtomicUsize,
    drafts: Mutex<Vec<String>>,
    keys: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl Scripted {
    fn returning(results: Vec<Result<String, EnhanceError>>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into()),
            ..Default::default()
        })
    }

    fn gated(results: Vec<Result<String, EnhanceError>>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into()),
            gate: Some(gate),
            ..Default::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Enhancer for Scripted {
    async fn enhance(&self, key: &ApiKey, draft: &str) -> Result<String, EnhanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.drafts.lock().unwrap().push(draft.to_string());
        self.keys.lock().unwrap().push(key.expose().to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(EnhanceError::Unknown("script exhausted".to_string())))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

/// Enhancer whose task dies before it can report
struct Crashing;

#[async_trait]
impl Enhancer for Crashing {
    async fn enhance(&self, _key: &ApiKey, _draft: &str) -> Result<String, EnhanceError> {
        panic!("enhancer crashed");
    }

    fn provider_name(&self) -> &str {
        "crashing"
    }
}

#[derive(Clone, Default)]
struct RecordingClipboard {
    writes: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl Clipboard for RecordingClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::Unavailable("no display".to_string()));
        }
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn session_with(enhancer: Arc<Scripted>, clipboard: RecordingClipboard) -> Session {
    Session::new(CredentialStore::in_memory(), enhancer, Box::new(clipboard))
}

fn unlocked(enhancer: Arc<Scripted>) -> Session {
    let mut session = session_with(enhancer, RecordingClipboard::default());
    assert!(session.submit_credential("abc123"));
    session
}

// Scenario A: no credential

#[tokio::test]
async fn test_scenario_a_locked_without_credential() {
    let enhancer = Scripted::returning(vec![]);
    let mut session = session_with(enhancer.clone(), RecordingClipboard::default());

    assert!(!session.load_credential());
    assert_eq!(session.state(), SessionState::Locked);
    assert!(!session.can_enhance());

    session.set_draft("write a poem");
    assert_eq!(
        session.start_enhance(),
        EnhanceStart::Rejected(EnhanceError::MissingCredential)
    );
    tokio::task::yield_now().await;
    assert_eq!(enhancer.calls(), 0);
}

// Scenario B: successful enhancement

#[tokio::test]
async fn test_scenario_b_success_replaces_enhanced_text() {
    let enhancer = Scripted::returning(vec![Ok("Persona: a seasoned poet...".to_string())]);
    let mut session = unlocked(enhancer.clone());
    session.set_draft("write a poem");

    assert!(session.can_enhance());
    assert!(matches!(session.start_enhance(), EnhanceStart::Started(_)));
    assert_eq!(session.state(), SessionState::Enhancing);

    session.wait_for_enhancement().await;

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.enhanced(), "Persona: a seasoned poet...");
    assert_eq!(
        session.notification(),
        Some(&Notification::success("Prompt successfully refined!"))
    );
    assert_eq!(enhancer.calls(), 1);
    assert_eq!(*enhancer.drafts.lock().unwrap(), vec!["write a poem"]);
    assert_eq!(*enhancer.keys.lock().unwrap(), vec!["abc123"]);
}

#[tokio::test]
async fn test_draft_survives_enhancement() {
    let enhancer = Scripted::returning(vec![Ok("better".to_string())]);
    let mut session = unlocked(enhancer);
    session.set_draft("rough idea");

    session.start_enhance();
    session.wait_for_enhancement().await;

    assert_eq!(session.draft(), "rough idea");
}

// Scenario C: unauthorized

#[tokio::test]
async fn test_scenario_c_invalid_key_keeps_previous_result() {
    let enhancer = Scripted::returning(vec![
        Ok("first result".to_string()),
        Err(EnhanceError::InvalidCredential),
    ]);
    let mut session = unlocked(enhancer);
    session.set_draft("write a poem");

    session.start_enhance();
    session.wait_for_enhancement().await;
    assert_eq!(session.enhanced(), "first result");

    session.start_enhance();
    session.wait_for_enhancement().await;

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.enhanced(), "first result");
    assert_eq!(
        session.notification(),
        Some(&Notification::error(
            "Invalid API Key. Please reset and try again."
        ))
    );
    assert_eq!(session.last_error(), Some(&EnhanceError::InvalidCredential));
}

// Scenario D: rate limited

#[tokio::test]
async fn test_scenario_d_rate_limited() {
    let enhancer = Scripted::returning(vec![Err(EnhanceError::RateLimited)]);
    let mut session = unlocked(enhancer);
    session.set_draft("write a poem");

    session.start_enhance();
    session.wait_for_enhancement().await;

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(
        session.notification(),
        Some(&Notification::error(
            "Rate limit exceeded. Please wait a moment."
        ))
    );
}

#[tokio::test]
async fn test_unknown_failure_shows_upstream_message() {
    let enhancer = Scripted::returning(vec![
        Err(EnhanceError::Unknown("HTTP error 500: backend down".to_string())),
        Err(EnhanceError::Unknown(String::new())),
    ]);
    let mut session = unlocked(enhancer);
    session.set_draft("x");

    session.start_enhance();
    session.wait_for_enhancement().await;
    assert_eq!(
        session.notification().map(|n| n.message.as_str()),
        Some("HTTP error 500: backend down")
    );

    session.start_enhance();
    session.wait_for_enhancement().await;
    assert_eq!(
        session.notification().map(|n| n.message.as_str()),
        Some("An unexpected error occurred while enhancing the prompt.")
    );
}

// Preconditions

#[tokio::test]
async fn test_blank_draft_never_calls_enhancer() {
    let enhancer = Scripted::returning(vec![]);
    let mut session = unlocked(enhancer.clone());

    for draft in ["", "   ", "\n\t  \n"] {
        session.set_draft(draft);
        assert!(!session.can_enhance());
        assert_eq!(
            session.start_enhance(),
            EnhanceStart::Rejected(EnhanceError::EmptyDraft)
        );
        assert_eq!(
            session.notification(),
            Some(&Notification::error("Please enter a draft prompt first."))
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    tokio::task::yield_now().await;
    assert_eq!(enhancer.calls(), 0);
}

#[tokio::test]
async fn test_second_start_while_enhancing_is_noop() {
    let gate = Arc::new(Notify::new());
    let enhancer = Scripted::gated(vec![Ok("done".to_string())], gate.clone());
    let mut session = unlocked(enhancer.clone());
    session.set_draft("write a poem");

    let first = session.start_enhance();
    assert!(matches!(first, EnhanceStart::Started(_)));
    assert_eq!(session.start_enhance(), EnhanceStart::Busy);
    assert_eq!(session.start_enhance(), EnhanceStart::Busy);

    gate.notify_one();
    session.wait_for_enhancement().await;

    assert_eq!(enhancer.calls(), 1);
    assert_eq!(session.enhanced(), "done");
}

#[tokio::test]
async fn test_draft_editable_while_enhancing() {
    let gate = Arc::new(Notify::new());
    let enhancer = Scripted::gated(vec![Ok("done".to_string())], gate.clone());
    let mut session = unlocked(enhancer.clone());
    session.set_draft("write a poem");

    session.start_enhance();
    session.draft_mut().push_str(" about rust");
    assert_eq!(session.draft(), "write a poem about rust");

    gate.notify_one();
    session.wait_for_enhancement().await;

    // The call used the draft as it was when started
    assert_eq!(*enhancer.drafts.lock().unwrap(), vec!["write a poem"]);
}

// Crashed enhancement task

fn crashing_session() -> Session {
    let mut session = Session::new(
        CredentialStore::in_memory(),
        Arc::new(Crashing),
        Box::new(RecordingClipboard::default()),
    );
    assert!(session.submit_credential("abc123"));
    session.set_draft("write a poem");
    session
}

#[tokio::test]
async fn test_crashed_task_returns_wait_to_idle_with_generic_error() {
    let mut session = crashing_session();
    assert!(matches!(session.start_enhance(), EnhanceStart::Started(_)));

    session.wait_for_enhancement().await;

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.last_error(), Some(&EnhanceError::Unknown(String::new())));
    assert_eq!(
        session.notification(),
        Some(&Notification::error(
            "An unexpected error occurred while enhancing the prompt."
        ))
    );
    assert!(session.can_enhance());
}

#[tokio::test]
async fn test_crashed_task_is_noticed_by_event_pump() {
    let mut session = crashing_session();
    session.start_enhance();

    for _ in 0..20 {
        tokio::task::yield_now().await;
        session.process_events();
        if !session.is_enhancing() {
            break;
        }
    }

    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.notification().is_some_and(Notification::is_error));

    // The session is usable again
    assert!(matches!(session.start_enhance(), EnhanceStart::Started(_)));
}

// Reset

#[tokio::test]
async fn test_reset_clears_everything_from_idle() {
    let enhancer = Scripted::returning(vec![Ok("result".to_string())]);
    let mut session = unlocked(enhancer);
    session.set_draft("write a poem");
    session.start_enhance();
    session.wait_for_enhancement().await;

    session.reset_credential();

    assert_eq!(session.state(), SessionState::Locked);
    assert_eq!(session.draft(), "");
    assert_eq!(session.enhanced(), "");
    assert_eq!(
        session.notification(),
        Some(&Notification::success(messages::KEY_CLEARED))
    );
}

#[tokio::test]
async fn test_reset_while_locked_is_harmless() {
    let mut session = session_with(Scripted::returning(vec![]), RecordingClipboard::default());
    session.set_draft("leftover");
    session.reset_credential();
    assert_eq!(session.state(), SessionState::Locked);
    assert_eq!(session.draft(), "");
}

#[tokio::test]
async fn test_reset_while_enhancing_drops_late_response() {
    let gate = Arc::new(Notify::new());
    let enhancer = Scripted::gated(vec![Ok("too late".to_string())], gate.clone());
    let mut session = unlocked(enhancer.clone());
    session.set_draft("write a poem");

    let EnhanceStart::Started(request_id) = session.start_enhance() else {
        panic!("enhancement should start");
    };
    tokio::task::yield_now().await;

    session.reset_credential();
    assert_eq!(session.state(), SessionState::Locked);

    gate.notify_one();
    tokio::task::yield_now().await;
    session.process_events();

    // Even a result that slipped through is ignored
    session.handle_event(SessionEvent::EnhanceFinished {
        request_id,
        result: Ok("too late".to_string()),
    });

    assert_eq!(session.enhanced(), "");
    assert_eq!(session.state(), SessionState::Locked);
    assert_eq!(
        session.notification(),
        Some(&Notification::success(messages::KEY_CLEARED))
    );

    // A fresh unlock starts clean
    assert!(session.submit_credential("  new-key  "));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.enhanced(), "");
}

// Copy

#[tokio::test]
async fn test_copy_is_noop_when_enhanced_empty() {
    let clipboard = RecordingClipboard::default();
    let mut session = session_with(Scripted::returning(vec![]), clipboard.clone());
    session.submit_credential("abc123");
    session.dismiss_notification();

    assert!(!session.can_copy());
    assert!(!session.copy_enhanced());
    assert!(clipboard.writes.lock().unwrap().is_empty());
    assert!(session.notification().is_none());
}

#[tokio::test]
async fn test_copy_writes_enhanced_text() {
    let clipboard = RecordingClipboard::default();
    let enhancer = Scripted::returning(vec![Ok("Persona: poet".to_string())]);
    let mut session = session_with(enhancer, clipboard.clone());
    session.submit_credential("abc123");
    session.set_draft("write a poem");
    session.start_enhance();
    session.wait_for_enhancement().await;

    assert!(session.copy_enhanced());
    assert_eq!(*clipboard.writes.lock().unwrap(), vec!["Persona: poet"]);
    assert_eq!(
        session.notification(),
        Some(&Notification::success("Copied to clipboard!"))
    );
}

#[tokio::test]
async fn test_copy_failure_notifies() {
    let clipboard = RecordingClipboard {
        fail: true,
        ..Default::default()
    };
    let enhancer = Scripted::returning(vec![Ok("Persona: poet".to_string())]);
    let mut session = session_with(enhancer, clipboard);
    session.submit_credential("abc123");
    session.set_draft("write a poem");
    session.start_enhance();
    session.wait_for_enhancement().await;

    assert!(!session.copy_enhanced());
    assert_eq!(
        session.notification(),
        Some(&Notification::error(messages::COPY_FAILED))
    );
}

// Notification lifetime

#[tokio::test(start_paused = true)]
async fn test_notification_clears_after_three_seconds() {
    let mut session = unlocked(Scripted::returning(vec![]));
    let start = tokio::time::Instant::now();
    tokio::task::yield_now().await;

    tokio::time::advance(Duration::from_millis(2_900)).await;
    tokio::task::yield_now().await;
    session.process_events();
    assert!(session.notification().is_some());

    let event = session.next_event().await;
    assert!(matches!(
        event,
        Some(SessionEvent::NotificationExpired { .. })
    ));
    assert!(session.notification().is_none());
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_new_notification_restarts_timer() {
    let mut session = session_with(Scripted::returning(vec![]), RecordingClipboard::default());
    let start = tokio::time::Instant::now();

    session.notify(Notification::success("first"));
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(2)).await;

    session.notify(Notification::error("second"));
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;

    // The first timer would have fired by now
    session.process_events();
    assert_eq!(session.notification(), Some(&Notification::error("second")));

    session.next_event().await;
    assert!(session.notification().is_none());
    assert!(start.elapsed() >= Duration::from_secs(5));
}

#[tokio::test]
async fn test_dismiss_notification() {
    let mut session = unlocked(Scripted::returning(vec![]));
    assert!(session.notification().is_some());
    session.dismiss_notification();
    assert!(session.notification().is_none());
}

// Stats

#[test]
fn test_stats_follow_both_texts() {
    let mut session = session_with(Scripted::returning(vec![]), RecordingClipboard::default());
    session.set_draft("  hi  there ");
    let stats = session.draft_stats();
    assert_eq!(stats.characters, 12);
    assert_eq!(stats.words, 2);
    assert_eq!(session.enhanced_stats().characters, 0);
    assert_eq!(session.enhanced_stats().words, 0);
}
