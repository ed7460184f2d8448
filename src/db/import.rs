use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params_from_iter, Connection};

use crate::db::{LoadError, TableSpec};
use crate::logger::{debug, info, trace};

/// Copy every data row of `csv_path` into `table`, picking fields by header
/// name in `table.columns` order. Values are bound as text exactly as read;
/// fields missing from the end of a short row are bound as NULL.
///
/// All rows are read before the first insert, so a bad file never leaves a
/// partial table behind even outside a transaction. Returns the row count.
pub fn import_csv(conn: &Connection, csv_path: &Path, table: &TableSpec) -> Result<usize> {
    info(&format!("import: {} <- {}", table.name, csv_path.display()));
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", csv_path.display()))?
        .clone();
    let mut indices = Vec::with_capacity(table.columns.len());
    for &column in table.columns {
        let idx = headers.iter().position(|h| h == column).ok_or_else(|| {
            LoadError::MissingColumn {
                table: table.name,
                column,
                path: csv_path.to_path_buf(),
            }
        })?;
        indices.push(idx);
    }

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("malformed CSV in {}", csv_path.display()))?;
        if record.len() < headers.len() {
            debug(&format!(
                "import: {} line {} has {} of {} fields",
                csv_path.display(),
                record.position().map_or(0, |p| p.line()),
                record.len(),
                headers.len()
            ));
        }
        rows.push(indices.iter().map(|&idx| record.get(idx).map(str::to_string)).collect());
    }
    debug(&format!("import: {} rows read from {}", rows.len(), csv_path.display()));

    let sql = table.insert_sql();
    debug(&format!("import: {}", sql));
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("failed to prepare insert into {}", table.name))?;
    for (n, row) in rows.iter().enumerate() {
        trace(&format!("import: {} row {}: {:?}", table.name, n + 1, row));
        stmt.execute(params_from_iter(row.iter()))
            .with_context(|| format!("insert into {} failed at data row {}", table.name, n + 1))?;
    }

    info(&format!("import: {} rows inserted into {}", rows.len(), table.name));
    Ok(rows.len())
}
