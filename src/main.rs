//! # media-tidy CLI
//!
//! Command-line interface for media-tidy.
//!
//! ## Usage
//! ```bash
//! media-tidy dupes ~/Pictures --output json
//! media-tidy reorder ~/Pictures/trip --width 4
//! ```

mod cli;

use media_tidy::Result;

fn main() -> Result<()> {
    cli::run()
}
