//! Embeddable chat widget host.
//!
//! A floating, resizable chat panel served HTML-first: the axum host mounts
//! widget instances, htmx fragment endpoints drive their state transitions,
//! and each submission is forwarded to a remote conversational backend over a
//! single request/response contract.
//!
//! # Architecture
//!
//! - **Widget core**: explicit per-instance state (visibility, append-only
//!   messages, draft, opaque context) behind serialized updates
//! - **Backend client**: one `POST {base}/api/chat` contract, every failure
//!   collapsed into an inline apology reply
//! - **UI**: server-rendered panel markup, pure in the state snapshot
//! - **Server**: axum router exposing one endpoint per widget event
//!
//! # Modules
//!
//! - [`backend`]: chat backend contract and HTTP client
//! - [`config`]: layered configuration
//! - [`server`]: router and handlers
//! - [`ui`]: HTML shell and panel markup
//! - [`widget`]: widget state core and instance store

pub mod backend;
pub mod config;
pub mod server;
pub mod ui;
pub mod widget;

use std::sync::Arc;

use backend::ChatBackend;
use config::AppConfig;
use widget::WidgetStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Mounted widget instances.
    pub widgets: WidgetStore,
    /// Client for the remote conversational backend.
    pub backend: Arc<dyn ChatBackend>,
    /// Global configuration.
    pub config: Arc<AppConfig>,
}
