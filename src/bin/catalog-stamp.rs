//! Catalog Stamp CLI Tool
//!
//! Command-line interface that resizes product photos, replaces their
//! background, burns in sequential product codes and stamps a logo.

#[cfg(feature = "cli")]
use catalog_stamp::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
