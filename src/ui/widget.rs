//! Widget panel markup.
//!
//! Pure functions from a [`WidgetState`] snapshot to HTML. Every fragment
//! endpoint re-renders the whole panel and htmx swaps it in place
//! (`outerHTML`), so the markup never drifts from the server-held state.

use crate::widget::{ChatMessage, Sender, WidgetState};

const CLOSE_ICON: &str = r#"<svg class="chat-widget__icon" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M18 6 6 18"/><path d="m6 6 12 12"/></svg>"#;

const EXPAND_ICON: &str = r#"<svg class="chat-widget__icon" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><polyline points="15 3 21 3 21 9"/><polyline points="9 21 3 21 3 15"/><line x1="21" y1="3" x2="14" y2="10"/><line x1="3" y1="21" x2="10" y2="14"/></svg>"#;

const MINIMIZE_ICON: &str = r#"<svg class="chat-widget__icon" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M5 12h14"/></svg>"#;

const SEND_ICON: &str = r#"<svg class="chat-widget__icon" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><line x1="22" y1="2" x2="11" y2="13"/><polygon points="22 2 15 22 11 13 2 9 22 2"/></svg>"#;

/// Render the full widget panel for the given state snapshot.
///
/// A closed panel is hidden, not removed: the element stays in the document
/// so htmx swaps keep working against the same target.
#[must_use]
pub fn render_widget(state: &WidgetState, title: &str) -> String {
    let mut classes = String::from("chat-widget");
    if state.visibility.expanded {
        classes.push_str(" chat-widget--large");
    }
    if !state.visibility.open {
        classes.push_str(" chat-widget--hidden");
    }

    format!(
        "<div id=\"chat-widget\" class=\"{classes}\" data-widget-id=\"{id}\">\n{top_bar}\n{messages}\n{input}\n</div>",
        id = state.id,
        top_bar = top_bar(&state.id, title),
        messages = message_list(&state.messages),
        input = input_area(&state.id, &state.draft),
    )
}

/// Top bar: title plus the close, expand/collapse and minimize controls.
fn top_bar(id: &str, title: &str) -> String {
    format!(
        r##"<header class="chat-widget__top-bar">
    <span class="chat-widget__title">{title}</span>
    <div class="chat-widget__controls">
        <button class="chat-widget__control" aria-label="Close"
                hx-post="/widget/{id}/close" hx-target="#chat-widget" hx-swap="outerHTML">{CLOSE_ICON}</button>
        <button class="chat-widget__control" aria-label="Expand"
                hx-post="/widget/{id}/expand" hx-target="#chat-widget" hx-swap="outerHTML">{EXPAND_ICON}</button>
        <button class="chat-widget__control" aria-label="Minimize"
                hx-post="/widget/{id}/minimize" hx-target="#chat-widget" hx-swap="outerHTML">{MINIMIZE_ICON}</button>
    </div>
</header>"##,
        title = escape_html(title),
    )
}

/// Scrollable message list, pinned to the most recent message on load.
fn message_list(messages: &[ChatMessage]) -> String {
    let mut items = String::new();
    for message in messages {
        items.push_str(&message_bubble(message));
        items.push('\n');
    }

    format!(
        r#"<div id="chat-box" class="chat-widget__messages" aria-live="polite" aria-label="Chat messages"
     hx-on--load="this.scrollTop = this.scrollHeight">
{items}</div>"#
    )
}

fn message_bubble(message: &ChatMessage) -> String {
    let class = match message.sender {
        Sender::Customer => "chat-widget__message chat-widget__message--customer",
        Sender::Bot => "chat-widget__message chat-widget__message--bot",
    };
    format!(
        r#"<div class="{class}">{text}</div>"#,
        text = escape_html(&message.text)
    )
}

/// Input row: text field plus the send trigger.
///
/// The field syncs the draft to the server on a debounce so it survives
/// fragment re-renders, and the form shows the customer bubble optimistically
/// before the round trip completes.
fn input_area(id: &str, draft: &str) -> String {
    format!(
        r##"<form class="chat-widget__input-row"
      hx-post="/widget/{id}/send" hx-target="#chat-widget" hx-swap="outerHTML"
      hx-on--before-request="const box = document.getElementById('chat-box'); const text = this.querySelector('[name=message]').value.trim(); if (box && text) {{ const bubble = document.createElement('div'); bubble.className = 'chat-widget__message chat-widget__message--customer'; bubble.textContent = text; box.appendChild(bubble); box.scrollTop = box.scrollHeight; }}">
    <input type="text" name="message" class="chat-widget__input" placeholder="Type a message…"
           autocomplete="off" value="{draft}"
           hx-post="/widget/{id}/draft" hx-trigger="input changed delay:300ms" hx-swap="none" />
    <button type="submit" class="chat-widget__send" aria-label="Send">{SEND_ICON}</button>
</form>"##,
        draft = escape_html(draft),
    )
}

/// Minimal HTML escaping for text and attribute values.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
