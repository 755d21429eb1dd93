//! Chart packaging
//!
//! Produces the `.tgz` layout chart repositories expect: every entry lives
//! under a top-level directory named after the chart.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tar::{Builder, Header};

use crate::chart::LoadedChart;
use crate::error::{CoreError, Result};

/// Package a loaded chart into `dest_dir`
///
/// Returns the path of the created `{name}-{version}.tgz`.
pub fn create_archive(chart: &LoadedChart, dest_dir: &Path) -> Result<PathBuf> {
    if !dest_dir.is_dir() {
        return Err(CoreError::Archive {
            message: format!("destination {} is not a directory", dest_dir.display()),
        });
    }

    let output = dest_dir.join(default_archive_name(chart));
    let file = File::create(&output)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    for rel in &chart.files {
        let entry_name = archive_entry_name(chart.name(), rel);
        let content = std::fs::read(chart.root.join(rel))?;
        add_bytes_to_archive(&mut builder, &entry_name, &content)?;
    }

    let encoder = builder.into_inner()?;
    let mut file = encoder.finish()?;
    file.flush()?;

    tracing::debug!(
        "packaged {} files from {} into {}",
        chart.files.len(),
        chart.root.display(),
        output.display()
    );

    Ok(output)
}

/// Generate the archive filename for a chart
#[must_use]
pub fn default_archive_name(chart: &LoadedChart) -> String {
    format!("{}-{}.tgz", chart.name(), chart.version())
}

fn archive_entry_name(chart_name: &str, rel: &Path) -> String {
    let rel = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", chart_name, rel)
}

/// Add bytes to a tar archive with a given path
fn add_bytes_to_archive<W: Write>(
    builder: &mut Builder<W>,
    archive_path: &str,
    content: &[u8],
) -> Result<()> {
    let mut header = Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(0);
    header.set_cksum();

    builder.append_data(&mut header, archive_path, content)?;

    Ok(())
}
