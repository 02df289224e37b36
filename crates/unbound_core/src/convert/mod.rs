//! Conversion between the Markdown, rich and HTML representations.
//!
//! # Responsibility
//! - Keep Markdown canonical: every rich edit can be serialized back to it.
//! - Degrade unsupported constructs instead of failing.

pub mod from_markdown;
pub mod html;
pub mod to_markdown;

pub use from_markdown::markdown_to_rich;
pub use to_markdown::{lossy_features, rich_to_markdown, LossyFeature};

use crate::model::rich::RichDoc;

/// Renders Markdown as the HTML a rich surface loads.
pub fn markdown_to_html(markdown: &str) -> String {
    markdown_to_rich(markdown).to_html()
}

/// Parses rich-surface HTML back into canonical Markdown.
pub fn html_to_markdown(html: &str) -> String {
    rich_to_markdown(&RichDoc::from_html(html))
}
