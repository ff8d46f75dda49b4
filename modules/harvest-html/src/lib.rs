//! HTML canonicalization and structured extraction.
//!
//! Everything here is synchronous and free of I/O: callers hand in markup,
//! get back a [`Document`] and typed reports. `scraper::Html` is not `Send`,
//! so async callers should finish with a `Document` before their next `.await`.

pub mod content;
mod dom;
pub mod document;
pub mod links;
pub mod seo;
pub mod serp;

pub use content::{extract_content, ContentBlock, ContentReport, CtaButton, KeySections};
pub use document::{canonical_page, canonicalize, Document};
pub use links::extract_internal_links;
pub use seo::{extract_seo, Headings, Hreflang, MetaTags, OpenGraph, SeoReport};
pub use serp::{SerpLimits, SerpParser};
