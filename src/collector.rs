//! Gathering every block of CSS reachable from one HTML document
//!
//! The document is flattened into a stream of [`TagEvent`]s in document
//! order, then a [`StyleCollector`] walks that stream with a single piece of
//! state, "inside a `<style>` element", capturing:
//!
//! - the value of any `style="..."` attribute, on any element
//! - text content while inside `<style>`
//! - the fetched body of every `<link rel="stylesheet" href="...">`

use crate::fetch::Fetcher;
use crate::tracing_config::{events, spans};
use html5ever::driver::{self, ParseOpts};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use scraper::{ElementRef, Html};
use tracing::Instrument;
use url::Url;

/// One step of a document walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Text(String),
}

impl TagEvent {
    /// Value of attribute `key` on a start tag
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self {
            Self::Start { attributes, .. } => attributes
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }
}

/// Where a CSS block came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssSource {
    /// `style="..."` on an element
    InlineAttribute,
    /// Content of a `<style>` element
    StyleElement,
    /// Body of a linked stylesheet, by resolved URL
    Stylesheet(Url),
}

/// One unit of raw stylesheet text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssBlock {
    pub source: CssSource,
    pub text: String,
}

impl CssBlock {
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self.source, CssSource::Stylesheet(_))
    }
}

enum Frame<'a> {
    Enter(ElementRef<'a>),
    Exit(&'a str),
    Text(&'a str),
}

/// Parse `html` as a browser without scripting would.
///
/// With scripting on, `<noscript>` content is kept as raw text and the
/// stylesheets, `<style>` elements and `style=` attributes inside it vanish.
fn parse_without_scripting(html: &str) -> Html {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    };
    driver::parse_document(Html::new_document(), opts).one(html)
}

/// Parse `html` and flatten it into start, text and end events in document
/// order. Comments, doctypes and processing instructions are dropped.
#[must_use]
pub fn tag_events(html: &str) -> Vec<TagEvent> {
    let document = parse_without_scripting(html);
    let mut events = Vec::new();
    let mut stack = vec![Frame::Enter(document.root_element())];

    // Explicit stack: deeply nested markup must not exhaust the call stack.
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(element) => {
                let name = element.value().name();
                events.push(TagEvent::Start {
                    name: name.to_string(),
                    attributes: element
                        .value()
                        .attrs()
                        .map(|(key, value)| (key.to_string(), value.to_string()))
                        .collect(),
                });
                stack.push(Frame::Exit(name));

                let children: Vec<_> = element.children().collect();
                for child in children.into_iter().rev() {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        stack.push(Frame::Enter(child_element));
                    } else if let Some(text) = child.value().as_text() {
                        stack.push(Frame::Text(&**text));
                    }
                }
            },
            Frame::Exit(name) => events.push(TagEvent::End {
                name: name.to_string(),
            }),
            Frame::Text(text) => events.push(TagEvent::Text(text.to_string())),
        }
    }

    events
}

fn is_stylesheet_link(event: &TagEvent) -> bool {
    event.attribute("rel").is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

/// Walks one document's tag stream. Owned by a single
/// [`StyleCollector::collect`] call; nothing is shared between calls.
pub struct StyleCollector<'f> {
    fetcher: &'f Fetcher,
    base_url: Url,
    in_style: bool,
    blocks: Vec<CssBlock>,
}

impl<'f> StyleCollector<'f> {
    #[must_use]
    pub fn new(fetcher: &'f Fetcher, base_url: Url) -> Self {
        Self {
            fetcher,
            base_url,
            in_style: false,
            blocks: Vec::new(),
        }
    }

    /// Every CSS block reachable from `html`, in document order.
    ///
    /// Linked stylesheets are fetched one at a time as their `<link>` is
    /// reached, with `base_url` as the `Referer` and as the base for
    /// relative `href`s.
    pub async fn collect(fetcher: &Fetcher, html: &str, base_url: &Url) -> Vec<CssBlock> {
        let tag_stream = tag_events(html);
        let mut collector = StyleCollector::new(fetcher, base_url.clone());
        for event in &tag_stream {
            collector.handle(event).await;
        }

        let blocks = collector.finish();
        let external = blocks.iter().filter(|block| block.is_external()).count();
        events::blocks_collected(base_url.as_str(), blocks.len() - external, external);
        blocks
    }

    /// Advance the state machine by one event
    pub async fn handle(&mut self, event: &TagEvent) {
        match event {
            TagEvent::Start { name, .. } => {
                if name.eq_ignore_ascii_case("style") {
                    self.in_style = true;
                }

                if let Some(css) = event.attribute("style") {
                    self.push(CssSource::InlineAttribute, css.to_string());
                }

                if name.eq_ignore_ascii_case("link") && is_stylesheet_link(event) {
                    match event.attribute("href") {
                        Some(href) => self.load_stylesheet(href).await,
                        None => tracing::debug!("Stylesheet link without href"),
                    }
                }
            },
            TagEvent::End { name } => {
                if name.eq_ignore_ascii_case("style") {
                    self.in_style = false;
                }
            },
            TagEvent::Text(text) => {
                if self.in_style {
                    self.push(CssSource::StyleElement, text.clone());
                }
            },
        }
    }

    #[must_use]
    pub fn in_style(&self) -> bool {
        self.in_style
    }

    #[must_use]
    pub fn finish(self) -> Vec<CssBlock> {
        self.blocks
    }

    fn push(&mut self, source: CssSource, text: String) {
        if !text.is_empty() {
            self.blocks.push(CssBlock { source, text });
        }
    }

    async fn load_stylesheet(&mut self, href: &str) {
        let url = match self.base_url.join(href) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(href = %href, error = %e, "Unresolvable stylesheet href");
                return;
            },
        };

        let document = self
            .fetcher
            .fetch(&url, Some(self.base_url.as_str()))
            .instrument(spans::stylesheet_fetch(url.as_str()))
            .await;

        self.push(CssSource::Stylesheet(url), document.body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CssColorsError, Result};
    use crate::fetch::{FetchedDocument, Transport};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Serves fixed bodies, 404 for everything else
    #[derive(Default)]
    struct MapTransport {
        bodies: HashMap<String, String>,
    }

    #[async_trait]
    impl Transport for MapTransport {
        async fn get(&self, url: &Url, _referer: Option<&str>) -> Result<FetchedDocument> {
            self.bodies
                .get(url.as_str())
                .map(|body| FetchedDocument::new(body.clone(), url.clone()))
                .ok_or_else(|| CssColorsError::fetch_failure(url, "404 Not Found"))
        }
    }

    fn base() -> Url {
        Url::parse("https://example.com/dir/page.html").unwrap()
    }

    #[test]
    fn test_tag_events_document_order() {
        let events = tag_events("<p style=\"color:red\">hi<b>x</b></p>");
        let names: Vec<String> = events
            .iter()
            .map(|event| match event {
                TagEvent::Start { name, .. } => format!("<{name}>"),
                TagEvent::End { name } => format!("</{name}>"),
                TagEvent::Text(text) => text.clone(),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "<html>", "<head>", "</head>", "<body>", "<p>", "hi", "<b>", "x", "</b>", "</p>",
                "</body>", "</html>"
            ]
        );
        let p = events.iter().find(|e| e.attribute("style").is_some()).unwrap();
        assert_eq!(p.attribute("STYLE"), Some("color:red"));
    }

    #[test]
    fn test_tag_events_deep_nesting() {
        let html = "<div>".repeat(5_000) + "<span style=\"color:#fff\"></span>";
        let events = tag_events(&html);
        assert!(events.iter().any(|e| e.attribute("style") == Some("color:#fff")));
    }

    #[test]
    fn test_tag_events_inside_noscript() {
        let events = tag_events(
            r#"<head><noscript><link rel="stylesheet" href="a.css"></noscript></head>
            <body><noscript><p style="color:red">x</p><style>q{color:blue}</style></noscript></body>"#,
        );
        let starts = |tag: &str| {
            events
                .iter()
                .filter(|e| matches!(e, TagEvent::Start { name, .. } if name == tag))
                .count()
        };
        assert_eq!(starts("noscript"), 2);
        assert_eq!(starts("link"), 1);
        assert_eq!(starts("style"), 1);
        assert!(events.iter().any(|e| e.attribute("style") == Some("color:red")));
        assert!(events.contains(&TagEvent::Text("q{color:blue}".to_string())));
    }

    #[tokio::test]
    async fn test_collects_sources_inside_noscript() {
        let transport = MapTransport {
            bodies: HashMap::from([(
                "https://example.com/dir/a.css".to_string(),
                "a{color:#f00}".to_string(),
            )]),
        };
        let fetcher = Fetcher::with_transport(Box::new(transport), 1);
        let html = r#"<head><noscript><link rel="stylesheet" href="a.css"></noscript></head>
            <body><noscript><p style="color:red">x</p><style>q{color:blue}</style></noscript></body>"#;

        let blocks = StyleCollector::collect(&fetcher, html, &base()).await;
        let texts: Vec<_> = blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["a{color:#f00}", "color:red", "q{color:blue}"]);
        assert!(blocks[0].is_external());
    }

    #[tokio::test]
    async fn test_collects_inline_sources_in_document_order() {
        let fetcher = Fetcher::with_transport(Box::<MapTransport>::default(), 2);
        let html = r#"<html><head><style>p{color:red}</style></head>
            <body><div style="color: #FF0000">x</div><style>a{color:blue}</style></body></html>"#;

        let blocks = StyleCollector::collect(&fetcher, html, &base()).await;
        assert_eq!(
            blocks,
            vec![
                CssBlock {
                    source: CssSource::StyleElement,
                    text: "p{color:red}".to_string()
                },
                CssBlock {
                    source: CssSource::InlineAttribute,
                    text: "color: #FF0000".to_string()
                },
                CssBlock {
                    source: CssSource::StyleElement,
                    text: "a{color:blue}".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_fetches_linked_stylesheets_with_referer() {
        let transport = MapTransport {
            bodies: HashMap::from([
                ("https://example.com/dir/a.css".to_string(), "a{color:#f00}".to_string()),
                ("https://cdn.example.net/b.css".to_string(), "b{color:lime}".to_string()),
            ]),
        };
        let fetcher = Fetcher::with_transport(Box::new(transport), 2);
        let html = r#"<link rel="stylesheet" href="a.css">
            <link rel="Stylesheet preload" href="https://cdn.example.net/b.css">
            <link rel="icon" href="favicon.css">"#;

        let blocks = StyleCollector::collect(&fetcher, html, &base()).await;
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].source,
            CssSource::Stylesheet(Url::parse("https://example.com/dir/a.css").unwrap())
        );
        assert_eq!(blocks[0].text, "a{color:#f00}");
        assert_eq!(blocks[1].text, "b{color:lime}");
        assert!(blocks.iter().all(CssBlock::is_external));
    }

    #[tokio::test]
    async fn test_link_without_href_or_failed_fetch_yields_nothing() {
        let transport = MapTransport::default();
        let fetcher = Fetcher::with_transport(Box::new(transport), 2);
        let html = r#"<link rel="stylesheet"><link rel="stylesheet" href="/missing.css">"#;

        let blocks = StyleCollector::collect(&fetcher, html, &base()).await;
        assert!(blocks.is_empty());
    }

    #[tokio::test]
    async fn test_state_machine_transitions() {
        let transport = MapTransport::default();
        let fetcher = Fetcher::with_transport(Box::new(transport), 1);
        let mut collector = StyleCollector::new(&fetcher, base());

        collector.handle(&TagEvent::Text("a{color:red}".into())).await;
        assert!(!collector.in_style());

        collector
            .handle(&TagEvent::Start {
                name: "style".into(),
                attributes: Vec::new(),
            })
            .await;
        assert!(collector.in_style());
        collector.handle(&TagEvent::Text("b{color:blue}".into())).await;

        collector.handle(&TagEvent::End { name: "style".into() }).await;
        assert!(!collector.in_style());
        collector.handle(&TagEvent::Text("c{color:lime}".into())).await;

        let blocks = collector.finish();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "b{color:blue}");
    }

    #[tokio::test]
    async fn test_style_attribute_on_any_tag() {
        let transport = MapTransport::default();
        let fetcher = Fetcher::with_transport(Box::new(transport), 1);
        let html = r#"<body style="background-color:#000"><style style="color:red">x{}</style></body>"#;

        let blocks = StyleCollector::collect(&fetcher, html, &base()).await;
        let texts: Vec<_> = blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["background-color:#000", "color:red", "x{}"]);
    }
}
