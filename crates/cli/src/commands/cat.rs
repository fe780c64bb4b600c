//! `cat` command implementation.

use std::io::{self, Write};

use anyhow::{Context, Result};
use dispatcher::RecordFile;
use tracing::debug;

use crate::cli::CatArgs;

/// Execute the `cat` command
pub fn run_cat(args: &CatArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let bytes = RecordFile::cat(&args.path, &mut out)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    out.flush()?;
    debug!(path = %args.path.display(), bytes, "Record file printed");
    Ok(())
}
