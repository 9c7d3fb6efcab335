//! Raw markup dump for offline inspection
//!
//! Pages are concatenated in visit order, each preceded by a comment naming its
//! tier and URL. Nothing ever reads the dump back.

use crate::output::{ensure_parent_dir, OutputResult};
use crate::record::Level;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Markup of one fetched page, kept for the dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub level: Level,
    pub url: String,
    pub markup: String,
}

/// Writes all pages to a single file
pub fn write_html_dump(pages: &[RawPage], path: &Path) -> OutputResult<()> {
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    write_html_dump_to(pages, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_html_dump_to<W: Write>(pages: &[RawPage], writer: &mut W) -> OutputResult<()> {
    for page in pages {
        writeln!(writer, "<!-- dcmap-crawler: {} {} -->", page.level, page.url)?;
        writer.write_all(page.markup.as_bytes())?;
        writeln!(writer)?;
    }
    Ok(())
}
