//! CSV export of the registry: one column per set, one row per rank.
//!
//! Columns follow registry insertion order. Sets shorter than the longest set
//! leave empty fields in the trailing rows. Files are written to a temporary
//! file in the target directory and renamed into place only once complete.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use set_core::to_decimal_string;
use tempfile::NamedTempFile;

use crate::error::SetError;
use crate::registry::Registry;

const DELIMITER: &str = ",";

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub columns: usize,
    pub rows: usize,
}

/// Write the table for `registry` to `writer`. Returns the data row count.
pub fn export_to_writer<W: Write>(registry: &Registry, mut writer: W) -> io::Result<usize> {
    let header: Vec<String> = registry.iter().map(|(name, _)| escape_field(name)).collect();
    writeln!(writer, "{}", header.join(DELIMITER))?;

    let rows = registry.max_len();
    let mut line = String::new();
    for rank in 0..rows {
        line.clear();
        for (column, (_, values)) in registry.iter().enumerate() {
            if column > 0 {
                line.push_str(DELIMITER);
            }
            if let Some(value) = values.get(rank) {
                line.push_str(&to_decimal_string(value));
            }
        }
        writeln!(writer, "{}", line)?;
    }

    writer.flush()?;
    Ok(rows)
}

/// Render the table into a string.
pub fn render_table(registry: &Registry) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = export_to_writer(registry, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Write the table to `path`, replacing any existing file atomically.
///
/// On failure nothing is left at `path` besides what was there before.
pub fn export(registry: &Registry, path: impl AsRef<Path>) -> Result<ExportSummary, SetError> {
    let path = path.as_ref();
    let io_err = |source: io::Error| SetError::ExportIo {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    let rows = export_to_writer(registry, BufWriter::new(tmp.as_file_mut())).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    log::info!("exported {} sets x {} rows to {}", registry.len(), rows, path.display());

    Ok(ExportSummary {
        path: path.to_path_buf(),
        columns: registry.len(),
        rows,
    })
}

/// Quote a header field if it contains the delimiter, a quote or a newline.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use set_core::{from_literals, parse_decimal};

    #[test]
    fn test_short_columns_leave_empty_fields() {
        let mut registry = Registry::new(1);
        registry.seed("a", from_literals(&[1, 2, 3])).unwrap();
        registry.seed("b", from_literals(&[10, 20, 30, 40, 50])).unwrap();

        let table = render_table(&registry);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 1 + 5);
        assert_eq!(lines[0], "a,b");
        assert_eq!(lines[1], "1,10");
        assert_eq!(lines[3], "3,30");
        assert_eq!(lines[4], ",40");
        assert_eq!(lines[5], ",50");
    }

    #[test]
    fn test_empty_registry_has_only_header() {
        let registry = Registry::new(1);
        assert_eq!(render_table(&registry), "\n");
    }

    #[test]
    fn test_cells_are_exact_decimals() {
        let mut registry = Registry::new(1);
        let huge = parse_decimal("170141183460469231731687303715884105727").unwrap();
        registry
            .seed("set1", vec![huge, BigInt::from(-5), BigInt::from(0)])
            .unwrap();
        let table = render_table(&registry);
        assert_eq!(table, "set1\n170141183460469231731687303715884105727\n-5\n0\n");
    }

    #[test]
    fn test_header_names_with_delimiters_are_quoted() {
        assert_eq!(escape_field("set21"), "set21");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let mut registry = Registry::new(1);
        registry.seed("set21", from_literals(&[2, 3, 5])).unwrap();
        registry.seed("set22", from_literals(&[7])).unwrap();

        let summary = export(&registry, &path).unwrap();
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.rows, 3);

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "set21,set22\n2,7\n3,\n5,\n");

        // No temporary files left behind.
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        std::fs::write(&path, "stale contents that are longer than the new table\n").unwrap();

        let mut registry = Registry::new(1);
        registry.seed("x", from_literals(&[1])).unwrap();
        export(&registry, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n1\n");
    }

    #[test]
    fn test_export_to_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("results.csv");

        let registry = Registry::new(1);
        let err = export(&registry, &path).unwrap_err();
        assert!(matches!(err, SetError::ExportIo { path: ref p, .. } if *p == path));
        assert!(!path.exists());
    }
}
