//! Session Controller
//!
//! Owns all UI-facing state (draft, enhanced text, in-flight flag, current
//! notification, credential) and drives the Enhancement Client.
//!
//! States: `Locked` → `Idle` ⇄ `Enhancing`, and back to `Locked` on reset.
//!
//! Invariants:
//! - At most one enhancement call is outstanding.
//! - No enhancement call is issued without a credential or with a blank draft.
//! - A response that arrives after its request was invalidated (reset) is
//!   dropped.
//! - Only the most recent notification is ever visible; each one expires
//!   after its TTL unless replaced first.

use crate::llm::{EnhanceError, Enhancer};
use crate::session::clipboard::Clipboard;
use crate::session::credential::{ApiKey, CredentialStore};
use crate::session::events::{SessionEvent, SessionReceiver, SessionSender};
use crate::session::notification::{messages, Notification, NOTIFICATION_TTL};
use crate::session::stats::PromptStats;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Externally visible session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No credential; workspace unusable
    Locked,
    /// Unlocked, nothing in flight
    Idle,
    /// Unlocked, one enhancement call outstanding
    Enhancing,
}

/// Outcome of `start_enhance`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnhanceStart {
    /// Call issued with this request id
    Started(u64),
    /// A call is already in flight; nothing happened
    Busy,
    /// Precondition failed; nothing was sent
    Rejected(EnhanceError),
}

#[derive(Debug)]
struct InFlight {
    request_id: u64,
    handle: JoinHandle<()>,
}

/// Session Controller
pub struct Session {
    credentials: CredentialStore,
    enhancer: Arc<dyn Enhancer>,
    clipboard: Box<dyn Clipboard>,

    draft: String,
    enhanced: String,
    last_error: Option<EnhanceError>,

    in_flight: Option<InFlight>,
    next_request_id: u64,

    notification: Option<Notification>,
    notification_generation: u64,
    expiry: Option<JoinHandle<()>>,
    /// Wall-clock expiry, used when no runtime was there to arm the timer
    expires_at: Option<Instant>,

    tx: SessionSender,
    rx: SessionReceiver,
}

impl Session {
    /// Create a locked session
    pub fn new(
        credentials: CredentialStore,
        enhancer: Arc<dyn Enhancer>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            credentials,
            enhancer,
            clipboard,
            draft: String::new(),
            enhanced: String::new(),
            last_error: None,
            in_flight: None,
            next_request_id: 1,
            notification: None,
            notification_generation: 0,
            expiry: None,
            expires_at: None,
            tx,
            rx,
        }
    }

    // ----- state ---------------------------------------------------------

    /// Get current session state
    pub fn state(&self) -> SessionState {
        if self.credentials.current().is_none() {
            SessionState::Locked
        } else if self.in_flight.is_some() {
            SessionState::Enhancing
        } else {
            SessionState::Idle
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state() == SessionState::Locked
    }

    pub fn is_enhancing(&self) -> bool {
        self.state() == SessionState::Enhancing
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn enhanced(&self) -> &str {
        &self.enhanced
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Error from the most recent finished enhancement, if it failed
    pub fn last_error(&self) -> Option<&EnhanceError> {
        self.last_error.as_ref()
    }

    pub fn draft_stats(&self) -> PromptStats {
        PromptStats::of(&self.draft)
    }

    pub fn enhanced_stats(&self) -> PromptStats {
        PromptStats::of(&self.enhanced)
    }

    /// Whether the enhance action should be offered (button gating)
    pub fn can_enhance(&self) -> bool {
        self.state() == SessionState::Idle && !self.draft.trim().is_empty()
    }

    /// Whether the copy action should be offered
    pub fn can_copy(&self) -> bool {
        !self.enhanced.is_empty()
    }

    pub fn enhancer_name(&self) -> &str {
        self.enhancer.provider_name()
    }

    // ----- draft editing -------------------------------------------------

    /// Replace the draft
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Mutable access for in-place editing; allowed in any unlocked state
    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    // ----- credential lifecycle ------------------------------------------

    /// Restore a key saved earlier in this login session
    pub fn load_credential(&mut self) -> bool {
        let restored = self.credentials.load().is_some();
        info!(restored, "session start");
        restored
    }

    /// Unlock with `raw`; blank input is ignored
    pub fn submit_credential(&mut self, raw: &str) -> bool {
        let Some(key) = ApiKey::parse(raw) else {
            debug!("blank credential ignored");
            return false;
        };
        self.credentials.set(key);
        info!("credential accepted");
        self.notify(Notification::success(messages::KEY_ACCEPTED));
        true
    }

    /// Lock the workspace and wipe unsaved work
    ///
    /// Any in-flight enhancement is aborted; if its response still arrives it
    /// is ignored.
    pub fn reset_credential(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(request_id = in_flight.request_id, "aborting in-flight enhancement");
            in_flight.handle.abort();
        }
        self.credentials.clear();
        self.draft.clear();
        self.enhanced.clear();
        self.last_error = None;
        info!("credential cleared");
        self.notify(Notification::success(messages::KEY_CLEARED));
    }

    // ----- enhancement ---------------------------------------------------

    /// Begin one enhancement of the current draft
    pub fn start_enhance(&mut self) -> EnhanceStart {
        match self.state() {
            SessionState::Enhancing => {
                debug!("enhance ignored: request already in flight");
                return EnhanceStart::Busy;
            }
            SessionState::Locked => {
                debug!("enhance ignored: workspace locked");
                return EnhanceStart::Rejected(EnhanceError::MissingCredential);
            }
            SessionState::Idle => {}
        }

        if self.draft.trim().is_empty() {
            let err = EnhanceError::EmptyDraft;
            self.notify(Notification::error(err.to_string()));
            return EnhanceStart::Rejected(err);
        }

        let Some(key) = self.credentials.current().cloned() else {
            return EnhanceStart::Rejected(EnhanceError::MissingCredential);
        };

        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let enhancer = Arc::clone(&self.enhancer);
        let draft = self.draft.clone();
        let tx = self.tx.clone();
        let task = async move {
            let result = enhancer.enhance(&key, &draft).await;
            let _ = tx.send(SessionEvent::EnhanceFinished { request_id, result });
        };

        match spawn(task) {
            Some(handle) => {
                info!(request_id, provider = self.enhancer.provider_name(), "enhancement started");
                self.in_flight = Some(InFlight { request_id, handle });
                EnhanceStart::Started(request_id)
            }
            None => {
                error!("no async runtime available for enhancement");
                let err = EnhanceError::Unknown(String::new());
                self.notify(Notification::error(err.to_string()));
                EnhanceStart::Rejected(err)
            }
        }
    }

    // ----- clipboard -----------------------------------------------------

    /// Copy the enhanced text; no-op while it is empty
    pub fn copy_enhanced(&mut self) -> bool {
        if self.enhanced.is_empty() {
            return false;
        }
        match self.clipboard.set_text(&self.enhanced) {
            Ok(()) => {
                self.notify(Notification::success(messages::COPIED));
                true
            }
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                self.notify(Notification::error(messages::COPY_FAILED));
                false
            }
        }
    }

    // ----- notifications -------------------------------------------------

    /// Show `notification`, replacing any current one and restarting the timer
    pub fn notify(&mut self, notification: Notification) {
        if let Some(previous) = self.expiry.take() {
            previous.abort();
        }
        self.notification_generation += 1;
        let generation = self.notification_generation;
        debug!(generation, message = %notification.message, "notification");
        self.notification = Some(notification);
        self.expires_at = None;

        let tx = self.tx.clone();
        self.expiry = spawn(async move {
            tokio::time::sleep(NOTIFICATION_TTL).await;
            let _ = tx.send(SessionEvent::NotificationExpired { generation });
        });
        if self.expiry.is_none() {
            warn!(generation, "no tokio runtime; notification expires on the next event pump");
            self.expires_at = Some(Instant::now() + NOTIFICATION_TTL);
        }
    }

    /// Remove the current notification now
    pub fn dismiss_notification(&mut self) {
        if let Some(previous) = self.expiry.take() {
            previous.abort();
        }
        self.expires_at = None;
        self.notification = None;
    }

    /// Clear a timer-less notification whose deadline is at or before `now`
    fn expire_untimed_notification(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if deadline <= now => {
                self.expires_at = None;
                self.notification = None;
                true
            }
            _ => false,
        }
    }

    /// Recover from an enhancement task that ended without posting a result
    ///
    /// Tasks send their result before finishing, so once the handle reports
    /// finished anything it sent is already queued.
    fn reap_lost_enhancement(&mut self) -> usize {
        if !self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.handle.is_finished())
        {
            return 0;
        }
        let mut applied = self.drain_events();
        if let Some(in_flight) = self.in_flight.take() {
            error!(
                request_id = in_flight.request_id,
                "enhancement task ended without a result"
            );
            let err = EnhanceError::Unknown(String::new());
            self.notify(Notification::error(err.to_string()));
            self.last_error = Some(err);
            applied += 1;
        }
        applied
    }

    fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    // ----- event pump ----------------------------------------------------

    /// Apply one event to the session
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::EnhanceFinished { request_id, result } => {
                let current = self.in_flight.as_ref().map(|f| f.request_id);
                if current != Some(request_id) {
                    debug!(request_id, ?current, "stale enhancement result dropped");
                    return;
                }
                self.in_flight = None;
                match result {
                    Ok(text) => {
                        info!(request_id, "enhancement succeeded");
                        self.enhanced = text;
                        self.last_error = None;
                        self.notify(Notification::success(messages::ENHANCED));
                    }
                    Err(err) => {
                        warn!(request_id, error = %err, "enhancement failed");
                        self.notify(Notification::error(err.to_string()));
                        self.last_error = Some(err);
                    }
                }
            }
            SessionEvent::NotificationExpired { generation } => {
                if generation == self.notification_generation {
                    self.notification = None;
                    self.expiry = None;
                }
            }
        }
    }

    /// Drain and apply all pending events without blocking
    ///
    /// Returns the number of events applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = self.drain_events();
        applied += self.reap_lost_enhancement();
        if self.expire_untimed_notification(Instant::now()) {
            applied += 1;
        }
        applied
    }

    /// Wait for the next event, apply it, and return it
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let event = self.rx.recv().await?;
        self.handle_event(event.clone());
        Some(event)
    }

    /// Wait until the in-flight enhancement (if any) has been applied
    pub async fn wait_for_enhancement(&mut self) {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return;
        };
        if let Err(err) = (&mut in_flight.handle).await {
            warn!(request_id = in_flight.request_id, error = %err, "enhancement task failed");
        }
        self.process_events();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
        }
        if let Some(expiry) = self.expiry.take() {
            expiry.abort();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("draft_len", &self.draft.len())
            .field("enhanced_len", &self.enhanced.len())
            .field("notification", &self.notification)
            .finish_non_exhaustive()
    }
}

/// Spawn on the ambient tokio runtime, if there is one
fn spawn<F>(future: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::runtime::Handle::try_current()
        .ok()
        .map(|handle| handle.spawn(future))
}
