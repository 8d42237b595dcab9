//! # charsniff CLI
//!
//! Command-line front end for charset detection and conversion.

#[cfg(feature = "cli")]
mod cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::run()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("charsniff was built without the `cli` feature");
    std::process::exit(1);
}
