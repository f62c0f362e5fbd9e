//! Markdown rendering for move definitions.
//!
//! Raw HTML in the source is escaped rather than passed through; only the
//! markup pulldown-cmark generates itself reaches the page.

use pulldown_cmark::{html, Event, Options, Parser};

pub fn render(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
