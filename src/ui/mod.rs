//! HTML rendering for the widget host.
//!
//! The host is HTML-first: pages and fragments are rendered server-side as
//! plain markup, and htmx swaps keep the widget panel in sync with its
//! server-held state. Rendering is a pure function of a state snapshot.
//!
//! # Structure
//!
//! - [`html_shell`]: document shell for full pages
//! - [`demo_content`]: host page content embedding the widget panel
//! - [`render_widget`]: the widget panel fragment

mod widget;

pub use widget::render_widget;

/// Generate the HTML shell for a full page.
pub fn html_shell(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Embeddable chat widget">
    <title>{title} - Chat Widget</title>

    <script src="https://unpkg.com/htmx.org@2.0.8"></script>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="host-page">
    <main id="app" class="host-page__main">
{content}
    </main>
</body>
</html>"#
    )
}

/// Host page content with the widget panel mounted.
///
/// Stands in for whatever page embeds the widget; the panel floats above it.
pub fn demo_content(widget_html: &str) -> String {
    format!(
        r#"<section class="host-page__hero">
    <h1>Widget host</h1>
    <p>The chat panel floats in the lower-right corner of this page.</p>
</section>
{widget_html}"#
    )
}
