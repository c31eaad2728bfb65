//! Widget instance state and storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reply substituted for the bot answer when a submission fails.
pub const APOLOGY_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// Default widget inactivity timeout (30 minutes).
const DEFAULT_WIDGET_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Opaque conversational state owned by the backend protocol.
///
/// The widget never interprets this mapping. It stores the most recent value
/// a reply carried and echoes it back verbatim on the next submission.
pub type ConversationContext = serde_json::Map<String, serde_json::Value>;

/// Originator of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The human typing into the widget.
    Customer,
    /// The remote backend (including substituted apology replies).
    Bot,
}

/// A single chat message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message text.
    pub text: String,
    /// Message originator.
    pub sender: Sender,
}

/// Panel visibility flags.
///
/// The two booleans flip independently; neither is coupled to message or
/// network state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    /// Whether the panel is shown at all.
    pub open: bool,
    /// Whether the panel uses the enlarged layout.
    pub expanded: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            open: true,
            expanded: false,
        }
    }
}

/// A non-empty submission taken from the draft.
///
/// `context` is the snapshot captured when the customer message was appended;
/// the widget's stored context may be replaced before the backend answers.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Trimmed message text.
    pub text: String,
    /// Conversational context snapshot to echo to the backend.
    pub context: ConversationContext,
}

/// A single mounted widget instance.
///
/// Instances own the message sequence, the draft input, the visibility flags
/// and the opaque conversational context. All fields sit behind `RwLock`s so
/// concurrent request handlers never observe a partial update.
#[derive(Debug)]
pub struct Widget {
    inner: Arc<WidgetInner>,
}

#[derive(Debug)]
struct WidgetInner {
    /// Unique widget instance identifier.
    id: String,
    /// Visibility flags.
    visibility: RwLock<Visibility>,
    /// Append-only message sequence, insertion order = display order.
    messages: RwLock<Vec<ChatMessage>>,
    /// Current uncommitted input text.
    draft: RwLock<String>,
    /// Opaque backend-owned context, replaced wholesale.
    context: RwLock<ConversationContext>,
    /// Instance creation time.
    created_at: DateTime<Utc>,
    /// Last activity time.
    last_activity: RwLock<DateTime<Utc>>,
}

/// Serializable snapshot of a widget instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetState {
    pub id: String,
    pub visibility: Visibility,
    pub messages: Vec<ChatMessage>,
    pub draft: String,
    pub context: ConversationContext,
    pub created_at: String,    // RFC3339
    pub last_activity: String, // RFC3339
}

impl Clone for Widget {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Widget {
    /// Create a new widget instance with the given ID.
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(WidgetInner {
                id,
                visibility: RwLock::new(Visibility::default()),
                messages: RwLock::new(Vec::new()),
                draft: RwLock::new(String::new()),
                context: RwLock::new(ConversationContext::new()),
                created_at: now,
                last_activity: RwLock::new(now),
            }),
        }
    }

    pub fn to_state(&self) -> WidgetState {
        WidgetState {
            id: self.inner.id.clone(),
            visibility: *self.inner.visibility.read().unwrap(),
            messages: self.inner.messages.read().unwrap().clone(),
            draft: self.inner.draft.read().unwrap().clone(),
            context: self.inner.context.read().unwrap().clone(),
            created_at: self.inner.created_at.to_rfc3339(),
            last_activity: self.inner.last_activity.read().unwrap().to_rfc3339(),
        }
    }

    /// Get the widget instance ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Get the current visibility flags.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        *self.inner.visibility.read().unwrap()
    }

    /// Flip the `open` flag.
    pub fn toggle_open(&self) {
        let mut guard = self.inner.visibility.write().unwrap();
        guard.open = !guard.open;
        drop(guard);
        self.touch();
    }

    /// Flip the `expanded` flag.
    pub fn toggle_expanded(&self) {
        let mut guard = self.inner.visibility.write().unwrap();
        guard.expanded = !guard.expanded;
        drop(guard);
        self.touch();
    }

    /// Hide the panel. Unlike [`Widget::toggle_open`] this is a plain set.
    pub fn close(&self) {
        let mut guard = self.inner.visibility.write().unwrap();
        guard.open = false;
        drop(guard);
        self.touch();
    }

    /// Replace the draft input. Any string is accepted, including empty.
    pub fn update_draft(&self, text: impl Into<String>) {
        let mut guard = self.inner.draft.write().unwrap();
        *guard = text.into();
        drop(guard);
        self.touch();
    }

    /// Get the current draft input.
    #[must_use]
    pub fn draft(&self) -> String {
        self.inner.draft.read().unwrap().clone()
    }

    /// Take a submission from the draft, if it has one.
    ///
    /// A draft that trims to empty is a no-op: nothing is appended, nothing
    /// is cleared and `None` is returned. Otherwise the customer message is
    /// appended and the draft cleared before the caller performs any network
    /// activity, so the customer always sees their own message first.
    pub fn take_submission(&self) -> Option<Submission> {
        let mut draft = self.inner.draft.write().unwrap();
        let trimmed = draft.trim();
        if trimmed.is_empty() {
            return None;
        }

        let text = trimmed.to_string();
        self.inner.messages.write().unwrap().push(ChatMessage {
            text: text.clone(),
            sender: Sender::Customer,
        });
        draft.clear();
        drop(draft);

        let context = self.inner.context.read().unwrap().clone();
        self.touch();

        Some(Submission { text, context })
    }

    /// Append a bot reply, replacing the stored context iff one was supplied.
    pub fn push_bot_reply(&self, text: impl Into<String>, context: Option<ConversationContext>) {
        self.inner.messages.write().unwrap().push(ChatMessage {
            text: text.into(),
            sender: Sender::Bot,
        });
        if let Some(context) = context {
            // Replaced wholesale, never merged.
            *self.inner.context.write().unwrap() = context;
        }
        self.touch();
    }

    /// Append the apology reply after a failed submission.
    ///
    /// The stored context is left untouched.
    pub fn push_apology(&self) {
        self.push_bot_reply(APOLOGY_REPLY, None);
    }

    /// Get all messages, in insertion order.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.messages.read().unwrap().clone()
    }

    /// Get the number of messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.inner.messages.read().unwrap().len()
    }

    /// Get a copy of the stored conversational context.
    #[must_use]
    pub fn context(&self) -> ConversationContext {
        self.inner.context.read().unwrap().clone()
    }

    /// Update the last activity timestamp.
    fn touch(&self) {
        let mut guard = self.inner.last_activity.write().unwrap();
        *guard = Utc::now();
    }

    /// Check if the instance has been inactive longer than the timeout.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = *self.inner.last_activity.read().unwrap();
        let now = Utc::now();
        if let Ok(duration) = (now - last).to_std() {
            duration > timeout
        } else {
            // Negative duration means clock skew or "last" is in the future.
            false
        }
    }
}

/// Thread-safe store for mounted widget instances.
#[derive(Debug, Clone)]
pub struct WidgetStore {
    inner: Arc<WidgetStoreInner>,
}

#[derive(Debug)]
struct WidgetStoreInner {
    widgets: RwLock<HashMap<String, Widget>>,
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetStore {
    /// Create a new widget store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(WidgetStoreInner {
                widgets: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Create a new widget instance and return it.
    #[must_use]
    pub fn create(&self) -> Widget {
        let id = Uuid::new_v4().to_string();
        self.create_with_id(id)
    }

    /// Create a new widget instance with a specific ID.
    #[must_use]
    pub fn create_with_id(&self, id: impl Into<String>) -> Widget {
        let id = id.into();
        let widget = Widget::new(id.clone());
        let mut guard = self.inner.widgets.write().unwrap();
        guard.insert(id, widget.clone());
        widget
    }

    /// Get a widget instance by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Widget> {
        let guard = self.inner.widgets.read().unwrap();
        guard.get(id).cloned()
    }

    /// Remove a widget instance by ID.
    pub fn remove(&self, id: &str) -> Option<Widget> {
        let mut guard = self.inner.widgets.write().unwrap();
        guard.remove(id)
    }

    /// Get the number of mounted instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.widgets.read().unwrap().len()
    }

    /// Check if there are no mounted instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all instances inactive past the default timeout.
    ///
    /// Returns the number of instances removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_with_timeout(DEFAULT_WIDGET_TIMEOUT)
    }

    /// Remove instances that have been inactive longer than the timeout.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.widgets.write().unwrap();
        let before = guard.len();
        guard.retain(|_, widget| !widget.is_expired_with_timeout(timeout));
        before - guard.len()
    }
}
