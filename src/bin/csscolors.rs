//! CSS Colors CLI Tool
//!
//! Command-line interface for listing the colors referenced by a web page's
//! inline styles, `<style>` blocks and linked stylesheets.

#[cfg(feature = "cli")]
use csscolors::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(2);
}
