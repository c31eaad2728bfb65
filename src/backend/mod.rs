//! Remote conversational backend client.
//!
//! The widget talks to its backend through exactly one documented contract:
//! `POST {base}/api/chat` with `{ "message": string, "context": object }`,
//! answered by `{ "reply": string, "context"?: object }`. Everything behind
//! that endpoint (reply generation, context semantics) is the backend's
//! business; this module only delivers turns and decodes replies.
//!
//! [`ChatBackend`] is the seam between the widget and the transport, so tests
//! can substitute a scripted backend without touching widget logic.

mod client;

pub use client::{
    BackendError, BackendSettings, ChatBackend, HttpChatBackend, TurnReply, TurnRequest,
};
