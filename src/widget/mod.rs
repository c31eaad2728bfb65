//! Widget state core and instance storage.
//!
//! This module provides the in-memory state of mounted chat widget instances.
//! Instances are identified by UUID, hold the append-only message sequence,
//! the draft input, the visibility flags and the opaque conversational
//! context, and live for the duration of their mount.
//!
//! # Architecture
//!
//! - [`Widget`]: a single mounted widget instance
//! - [`WidgetStore`]: thread-safe store for all mounted instances
//!
//! # Example
//!
//! ```rust
//! use chat_widget::widget::{Sender, WidgetStore};
//!
//! let store = WidgetStore::new();
//! let widget = store.create();
//!
//! widget.update_draft("Hello!");
//! let submission = widget.take_submission().unwrap();
//! assert_eq!(submission.text, "Hello!");
//!
//! let messages = widget.messages();
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].sender, Sender::Customer);
//! ```

mod state;

pub use state::{
    APOLOGY_REPLY, ChatMessage, ConversationContext, Sender, Submission, Visibility, Widget,
    WidgetState, WidgetStore,
};
