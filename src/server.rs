use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Form, Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::backend::{BackendSettings, ChatBackend, HttpChatBackend};
use crate::config::AppConfig;
use crate::ui;
use crate::widget::{ChatMessage, Widget, WidgetState, WidgetStore};

/// Interval between sweeps for abandoned widget instances.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Start the widget host server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let settings = BackendSettings::new(&config.backend.base_url)
        .with_timeout(Duration::from_secs(config.backend.request_timeout_secs));

    info!(
        name: "backend.config.loaded",
        base_url = %settings.base_url(),
        "Backend configuration loaded"
    );

    let backend: Arc<dyn ChatBackend> = Arc::new(HttpChatBackend::new(settings)?);
    let widgets = WidgetStore::new();

    // Instances abandoned by their page are swept in the background; nothing
    // else ever unmounts them.
    let sweep_store = widgets.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sweep_store.cleanup_expired();
            if removed > 0 {
                info!(
                    name: "widget.cleanup",
                    removed,
                    "Removed inactive widget instances"
                );
            }
        }
    });

    let state = AppState {
        widgets,
        backend,
        config: Arc::clone(&config),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the widget host router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let timeout_duration = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        // Host page mounting a fresh widget instance
        .route("/", get(index_handler))
        // Fragment endpoints, one per widget event
        .route("/widget/{id}/send", post(widget_send))
        .route("/widget/{id}/draft", post(widget_draft))
        .route("/widget/{id}/minimize", post(widget_minimize))
        .route("/widget/{id}/expand", post(widget_expand))
        .route("/widget/{id}/close", post(widget_close))
        // JSON diagnostics
        .route("/api/widgets", post(api_create_widget))
        .route("/api/widgets/{id}", get(api_get_widget))
        .route("/api/widgets/{id}/messages", get(api_get_messages))
        // Static assets (presentation only)
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let duration = timeout_duration;
                async move {
                    match tokio::time::timeout(duration, next.run(req)).await {
                        Ok(res) => res,
                        Err(_) => {
                            (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
                        }
                    }
                }
            },
        ))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Page and fragment handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Form body shared by the draft and send endpoints.
#[derive(Debug, Deserialize)]
struct MessageForm {
    /// Raw input text; missing fields read as empty.
    #[serde(default)]
    message: String,
}

/// GET / - Host page; mounts a fresh widget instance.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let widget = state.widgets.create();
    info!(
        name: "widget.mounted",
        widget_id = %widget.id(),
        "Mounted new widget instance"
    );

    let panel = ui::render_widget(&widget.to_state(), &state.config.widget.title);
    Html(ui::html_shell("Demo", &ui::demo_content(&panel)))
}

fn widget_fragment(state: &AppState, widget: &Widget) -> Response {
    Html(ui::render_widget(
        &widget.to_state(),
        &state.config.widget.title,
    ))
    .into_response()
}

/// POST /widget/:id/send - Run the draft through a full submission.
async fn widget_send(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Response {
    let Some(widget) = state.widgets.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    widget.update_draft(&form.message);
    let Some(submission) = widget.take_submission() else {
        // Empty or whitespace-only drafts are silently ignored.
        return widget_fragment(&state, &widget);
    };

    info!(
        name: "widget.turn.started",
        widget_id = %id,
        message = %submission.text,
        "Forwarding message to backend"
    );

    match state
        .backend
        .send_turn(&submission.text, &submission.context)
        .await
    {
        Ok(turn) => {
            widget.push_bot_reply(turn.reply, turn.context);
        }
        Err(err) => {
            // All failure classes collapse into the same apology reply.
            tracing::error!(
                name: "widget.turn.failed",
                widget_id = %id,
                error = %err,
                "Backend turn failed"
            );
            widget.push_apology();
        }
    }

    widget_fragment(&state, &widget)
}

/// POST /widget/:id/draft - Sync the uncommitted input text.
async fn widget_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Response {
    let Some(widget) = state.widgets.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    widget.update_draft(&form.message);
    StatusCode::NO_CONTENT.into_response()
}

/// POST /widget/:id/minimize - Flip the open flag.
async fn widget_minimize(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(widget) = state.widgets.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    widget.toggle_open();
    widget_fragment(&state, &widget)
}

/// POST /widget/:id/expand - Flip the expanded flag.
async fn widget_expand(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(widget) = state.widgets.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    widget.toggle_expanded();
    widget_fragment(&state, &widget)
}

/// POST /widget/:id/close - Hide the panel.
async fn widget_close(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(widget) = state.widgets.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    widget.close();
    widget_fragment(&state, &widget)
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON API handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/widgets - Mount a widget instance without a page.
async fn api_create_widget(State(state): State<AppState>) -> Json<WidgetState> {
    let widget = state.widgets.create();
    info!(
        name: "widget.mounted",
        widget_id = %widget.id(),
        "Mounted new widget instance"
    );
    Json(widget.to_state())
}

/// GET /api/widgets/:id - State snapshot for diagnostics.
async fn api_get_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WidgetState>, StatusCode> {
    match state.widgets.get(&id) {
        Some(widget) => Ok(Json(widget.to_state())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// GET /api/widgets/:id/messages - Message sequence in display order.
async fn api_get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, StatusCode> {
    match state.widgets.get(&id) {
        Some(widget) => Ok(Json(widget.messages())),
        None => Err(StatusCode::NOT_FOUND),
    }
}
