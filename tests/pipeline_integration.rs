//! End-to-end pipeline tests over a scripted transport
//!
//! These drive `ColorExtractor` with an in-memory `Transport` so that
//! retry counts, failures and diagnostics can be asserted exactly.

use async_trait::async_trait;
use csscolors::{
    ColorExtractor, ColorValue, CssColorsError, ExtractionConfig, FetchedDocument, OutputFormat,
    Result, SortOrder, Transport,
};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use url::Url;

/// Serves a fixed site; unknown URLs time out
#[derive(Default)]
struct ScriptedSite {
    pages: HashMap<String, String>,
    attempts: Arc<Mutex<HashMap<String, u32>>>,
}

impl ScriptedSite {
    fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    fn attempts(&self) -> Arc<Mutex<HashMap<String, u32>>> {
        Arc::clone(&self.attempts)
    }
}

#[async_trait]
impl Transport for ScriptedSite {
    async fn get(&self, url: &Url, _referer: Option<&str>) -> Result<FetchedDocument> {
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        match self.pages.get(url.as_str()) {
            Some(body) => Ok(FetchedDocument::new(body.clone(), url.clone())),
            None => Err(CssColorsError::fetch_failure(url, "operation timed out")),
        }
    }
}

/// Shared in-memory sink for a scoped fmt subscriber
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

fn extractor(site: ScriptedSite, config: ExtractionConfig) -> ColorExtractor {
    ColorExtractor::with_transport(config, Box::new(site)).unwrap()
}

const PAGE: &str = "https://example.com/";

#[tokio::test]
async fn test_every_css_source_contributes() {
    let site = ScriptedSite::default()
        .with_page(
            PAGE,
            r#"<html><head>
                <style>p{color:red}</style>
                <link rel="stylesheet" href="a.css">
            </head><body><div style="color: #FF0000">hello</div></body></html>"#,
        )
        .with_page("https://example.com/a.css", "a{color:#f00}");
    let extractor = extractor(site, ExtractionConfig::default());

    let extraction = extractor.extract(&Url::parse(PAGE).unwrap()).await;
    assert_eq!(extraction.tally.len(), 1);
    assert_eq!(extraction.tally.count(ColorValue::new(255, 0, 0)), 3);
    assert_eq!(extractor.render(&extraction).unwrap(), "3\trgb(255, 0, 0)\n");
}

#[tokio::test]
async fn test_link_without_href_is_ignored() {
    let site = ScriptedSite::default().with_page(
        PAGE,
        r#"<link rel="stylesheet"><p style="color: navy">x</p>"#,
    );
    let attempts = site.attempts();
    let extractor = extractor(site, ExtractionConfig::default());

    let extraction = extractor.extract(&Url::parse(PAGE).unwrap()).await;
    assert_eq!(extraction.tally.count(ColorValue::new(0, 0, 128)), 1);
    assert_eq!(attempts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_color_keywords_yield_nothing() {
    let site = ScriptedSite::default().with_page(
        PAGE,
        "<style>a{color: inherit} b{color: currentColor} c{color: transparent}</style>",
    );
    let extractor = extractor(site, ExtractionConfig::default());

    let extraction = extractor.extract(&Url::parse(PAGE).unwrap()).await;
    assert!(extraction.tally.is_empty());
    assert_eq!(extraction.blocks, 1);
    assert_eq!(extractor.render(&extraction).unwrap(), "");
}

#[tokio::test]
async fn test_unreachable_page_retries_then_warns_once() {
    let (logs, _guard) = capture_logs();
    let site = ScriptedSite::default();
    let attempts = site.attempts();
    let extractor = extractor(site, ExtractionConfig::default());

    let url = "https://down.example/";
    let extraction = extractor.extract(&Url::parse(url).unwrap()).await;

    assert!(extraction.tally.is_empty());
    assert!(extraction.final_url.is_none());
    assert_eq!(attempts.lock().unwrap().get(url), Some(&2));

    let output = logs.contents();
    let warnings: Vec<&str> = output.lines().filter(|line| line.contains("WARN")).collect();
    assert_eq!(warnings.len(), 1, "{output}");
    assert!(warnings[0].contains(url));
    assert_eq!(
        output
            .lines()
            .filter(|line| line.contains("Fetch attempt failed"))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_failed_stylesheet_keeps_inline_colors() {
    let (logs, _guard) = capture_logs();
    let site = ScriptedSite::default().with_page(
        PAGE,
        r#"<link rel="stylesheet" href="/gone.css"><div style="color:#00f">x</div>"#,
    );
    let attempts = site.attempts();
    let extractor = extractor(site, ExtractionConfig::default());

    let extraction = extractor.extract(&Url::parse(PAGE).unwrap()).await;
    assert_eq!(extraction.tally.count(ColorValue::new(0, 0, 255)), 1);
    assert_eq!(
        attempts.lock().unwrap().get("https://example.com/gone.css"),
        Some(&2)
    );

    let output = logs.contents();
    let warnings: Vec<&str> = output.lines().filter(|line| line.contains("WARN")).collect();
    assert_eq!(warnings.len(), 1, "{output}");
    assert!(warnings[0].contains("https://example.com/gone.css"));
}

#[tokio::test]
async fn test_configured_attempts_are_honored() {
    let site = ScriptedSite::default();
    let attempts = site.attempts();
    let config = ExtractionConfig::builder().max_attempts(4).build().unwrap();
    let extractor = extractor(site, config);

    let url = "https://down.example/";
    let _ = extractor.extract(&Url::parse(url).unwrap()).await;
    assert_eq!(attempts.lock().unwrap().get(url), Some(&4));
}

#[tokio::test]
async fn test_sort_orders_over_real_page() {
    let site = ScriptedSite::default().with_page(
        PAGE,
        r"<style>
            a{color:blue} b{color:white} c{color:#008000}
            d{color:blue} e{color:red} f{color:black} g{color:#00f}
        </style>",
    );
    let extractor = extractor(site, ExtractionConfig::default());
    let extraction = extractor.extract(&Url::parse(PAGE).unwrap()).await;
    let tally = &extraction.tally;

    let by = |order| -> Vec<ColorValue> {
        tally.sorted(order).into_iter().map(|entry| entry.color).collect()
    };
    let (red, green, blue) = (
        ColorValue::new(255, 0, 0),
        ColorValue::new(0, 128, 0),
        ColorValue::new(0, 0, 255),
    );

    assert_eq!(
        by(SortOrder::Rgb),
        vec![ColorValue::BLACK, blue, green, red, ColorValue::WHITE]
    );
    assert_eq!(
        by(SortOrder::Hsl),
        vec![ColorValue::BLACK, ColorValue::WHITE, red, green, blue]
    );
    assert_eq!(
        by(SortOrder::Occurrence),
        vec![blue, ColorValue::WHITE, green, red, ColorValue::BLACK]
    );
    assert_eq!(tally.sorted(SortOrder::Occurrence)[0].count, 3);
}

#[tokio::test]
async fn test_html_and_json_reports() {
    let site = ScriptedSite::default().with_page(PAGE, "<p style=\"color: gray\">x</p>");

    let config = ExtractionConfig::builder()
        .output_format(OutputFormat::Html)
        .build()
        .unwrap();
    let extractor = extractor(site, config);
    let extraction = extractor.extract(&Url::parse(PAGE).unwrap()).await;

    let html = extractor.render(&extraction).unwrap();
    assert!(html.contains("<title>https://example.com/</title>"));
    assert!(html.contains("#808080 [gray]"));
    assert!(html.contains("rgb(128, 128, 128)"));

    let json = csscolors::ReportFormatter::render(
        &extraction.tally.sorted(SortOrder::Rgb),
        PAGE,
        OutputFormat::Json,
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["colors"][0]["name"], "gray");
    assert_eq!(value["colors"][0]["count"], 1);
}
