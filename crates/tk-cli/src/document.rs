//! Timekeep documents on disk.
//!
//! A document is either a Markdown note holding a fenced ```timekeep block
//! with the JSON timekeep, or a bare JSON file. Writes hold an exclusive lock
//! on a sidecar `.<name>.lock` file for the whole read-modify-write, so
//! concurrent `tk` processes serialize their changes. New content goes to a
//! temporary file in the same directory that is renamed over the document.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tempfile::NamedTempFile;
use tk_core::Timekeep;

const FENCE_OPEN: &str = "```timekeep";
const FENCE_CLOSE: &str = "```";

/// Where the timekeep JSON sits inside the file.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
    /// Text around the fenced block is kept byte for byte.
    Markdown { before: String, after: String },
    Json,
}

/// A parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    layout: Layout,
    pub timekeep: Timekeep,
}

impl Document {
    /// Parses document text. `path` only decides how a file without a block is read.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        if let Some((before, body, after)) = split_markdown(content) {
            return Ok(Self {
                layout: Layout::Markdown {
                    before: before.to_string(),
                    after: after.to_string(),
                },
                timekeep: parse_timekeep(body)?,
            });
        }

        if is_markdown(path) {
            anyhow::bail!("no ```timekeep block found in {}", path.display());
        }

        Ok(Self {
            layout: Layout::Json,
            timekeep: parse_timekeep(content)?,
        })
    }

    /// Renders the document with `timekeep` in place of the stored one.
    ///
    /// Markdown blocks hold compact JSON with backticks escaped, so no name
    /// can close the fence early. Bare JSON files are pretty-printed when
    /// `pretty` is set.
    pub fn render(&self, timekeep: &Timekeep, pretty: bool) -> Result<String> {
        match &self.layout {
            Layout::Markdown { before, after } => {
                let json = serde_json::to_string(timekeep).context("failed to serialize timekeep")?;
                Ok(format!("{before}{}\n{after}", escape_backticks(&json)))
            }
            Layout::Json => {
                let json = if pretty {
                    serde_json::to_string_pretty(timekeep)
                } else {
                    serde_json::to_string(timekeep)
                }
                .context("failed to serialize timekeep")?;
                Ok(format!("{json}\n"))
            }
        }
    }
}

/// Backticks only occur inside JSON strings, where `\u0060` reads back the same.
fn escape_backticks(json: &str) -> String {
    json.replace('`', "\\u0060")
}

/// Splits text into (before the JSON, the JSON, from the closing fence on).
fn split_markdown(content: &str) -> Option<(&str, &str, &str)> {
    let open = content.find(FENCE_OPEN)?;
    let body_start = open + content[open..].find('\n')? + 1;
    let close = body_start + content[body_start..].find(FENCE_CLOSE)?;
    Some((
        &content[..body_start],
        &content[body_start..close],
        &content[close..],
    ))
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

/// Blank text is an empty timekeep.
fn parse_timekeep(json: &str) -> Result<Timekeep> {
    if json.trim().is_empty() {
        return Ok(Timekeep::default());
    }
    serde_json::from_str(json).context("failed to parse timekeep JSON")
}

/// Template for a new, empty document at `path`.
pub fn empty_document(path: &Path) -> Result<String> {
    let json = serde_json::to_string(&Timekeep::default()).context("failed to serialize timekeep")?;
    if is_markdown(path) {
        Ok(format!("{FENCE_OPEN}\n{json}\n{FENCE_CLOSE}\n"))
    } else {
        Ok(format!("{json}\n"))
    }
}

/// Sidecar lock file guarding `path`.
fn lock_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "timekeep".into(), |name| name.to_string_lossy());
    path.with_file_name(format!(".{name}.lock"))
}

/// Opens the sidecar lock, failing first if the document itself is missing.
fn open_lock(path: &Path) -> Result<File> {
    if !path.is_file() {
        anyhow::bail!("failed to open {} (run 'tk init' first)", path.display());
    }
    File::create(lock_path(path)).context("failed to create lock file")
}

fn read_content(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Reads the timekeep from a document under a shared lock.
pub fn read(path: &Path) -> Result<Timekeep> {
    let lock_file = open_lock(path)?;
    FileExt::lock_shared(&lock_file).context("failed to acquire lock")?;

    Ok(Document::parse(path, &read_content(path)?)?.timekeep)
}

/// Applies `change` to the document's timekeep and writes the result back.
///
/// Nothing is written when the timekeep comes back unchanged.
pub fn modify<F>(path: &Path, pretty: bool, change: F) -> Result<Timekeep>
where
    F: FnOnce(&Timekeep) -> Result<Timekeep>,
{
    let lock_file = open_lock(path)?;
    FileExt::lock_exclusive(&lock_file).context("failed to acquire lock")?;

    let document = Document::parse(path, &read_content(path)?)?;

    let updated = change(&document.timekeep)?;
    if updated == document.timekeep {
        tracing::debug!(path = %path.display(), "timekeep unchanged, skipping write");
        return Ok(updated);
    }

    replace_contents(path, &document.render(&updated, pretty)?)?;
    tracing::debug!(path = %path.display(), "wrote timekeep");
    Ok(updated)
}

/// Writes `contents` to a temporary sibling of `path` and renames it into place.
///
/// A failed write leaves the document as it was.
fn replace_contents(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).context("failed to create temporary file")?;
    temp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    temp.as_file().sync_all().context("failed to flush temporary file")?;

    let permissions = fs::metadata(path)
        .context("failed to read document permissions")?
        .permissions();
    fs::set_permissions(temp.path(), permissions).context("failed to copy document permissions")?;

    temp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

/// Creates an empty document unless one exists. Returns whether it was created.
pub fn init(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create document directory")?;
    }
    fs::write(path, empty_document(path)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
