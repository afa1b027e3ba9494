//! Init command for creating an empty timekeep document.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::document;

/// Runs the init command.
pub fn run<W: Write>(writer: &mut W, path: &Path) -> Result<()> {
    if document::init(path)? {
        tracing::info!(path = %path.display(), "created timekeep document");
        writeln!(writer, "Created {}", path.display())?;
    } else {
        writeln!(writer, "{} already exists", path.display())?;
    }
    Ok(())
}
