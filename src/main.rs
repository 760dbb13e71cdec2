//! Thin binary wrapper around the `laplace_helper` library.
//!
//! Run:
//! - `cargo run` (opens the window)
//! - `cargo run -- export -o report.pdf --y 2`

use clap::Parser as _;

fn main() -> anyhow::Result<()> {
    // Keep logging setup in the binary so the library remains unopinionated.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("laplace_helper=info"),
    )
    .init();

    laplace_helper::cli::Cli::parse().run()
}
