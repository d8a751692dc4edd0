//! trackview binary entry point.

use anyhow::Result;

fn main() -> Result<()> {
    trackview::run()
}
