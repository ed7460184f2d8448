use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::db::Records;
use crate::logger::{debug, info};

/// Remove the database file and the `-journal`, `-wal` and `-shm` files left
/// next to it. A missing file is fine; anything else (permissions, a directory
/// in the way) is not.
pub fn reset_database(path: &Path) -> Result<()> {
    let mut targets = vec![path.to_path_buf()];
    for suffix in ["-journal", "-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        targets.push(PathBuf::from(side));
    }
    for target in targets {
        match std::fs::remove_file(&target) {
            Ok(()) => info(&format!("sqlite: removed {}", target.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("failed to remove {}", target.display()))
            }
        }
    }
    Ok(())
}

pub fn open(path: &Path) -> Result<Connection> {
    debug(&format!("sqlite: opening {}", path.display()));
    let conn =
        Connection::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    // The bundled build turns foreign key enforcement on; plain SQLite leaves
    // it off until the schema script asks for it.
    conn.pragma_update(None, "foreign_keys", false)
        .context("failed to reset foreign_keys pragma")?;
    debug("sqlite: opened");
    Ok(conn)
}

/// Run the whole schema script as one batch, in autocommit mode so the script
/// may carry its own `BEGIN`/`COMMIT` and connection pragmas. Statements before
/// a failing one stay applied; the caller discards the file on error.
pub fn apply_schema(conn: &Connection, script_path: &Path) -> Result<()> {
    let script = std::fs::read_to_string(script_path)
        .with_context(|| format!("failed to read schema {}", script_path.display()))?;
    debug(&format!("sqlite: schema script\n{}", script));
    conn.execute_batch(&script)
        .with_context(|| format!("schema {} failed", script_path.display()))?;
    info(&format!("sqlite: applied schema {}", script_path.display()));
    Ok(())
}

/// `SELECT *` in engine order, every cell rendered as a SQL-ish literal.
pub fn fetch_records(conn: &Connection, table: &str) -> Result<Records> {
    let q = format!("SELECT * FROM {}", quote_ident(table));
    debug(&format!("sqlite: {}", q));
    let mut stmt = conn
        .prepare(&q)
        .with_context(|| format!("failed to query table {}", table))?;
    let columns = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let col_count = columns.len();

    let mut rows_vec: Vec<Vec<String>> = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut v = Vec::with_capacity(col_count);
        for i in 0..col_count {
            v.push(render_value(row.get_ref(i)?));
        }
        rows_vec.push(v);
    }

    Ok(Records { columns, rows: rows_vec })
}

/// Write a blank line, `Table: <name>`, then one tuple line per row.
pub fn print_table(conn: &Connection, table: &str, out: &mut impl Write) -> Result<usize> {
    let records = fetch_records(conn, table)?;
    writeln!(out)?;
    writeln!(out, "Table: {}", table)?;
    for row in &records.rows {
        writeln!(out, "{}", render_row(row))?;
    }
    Ok(records.rows.len())
}

pub fn render_row(cells: &[String]) -> String {
    format!("({})", cells.join(", "))
}

fn render_value(cell: ValueRef<'_>) -> String {
    match cell {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => render_real(f),
        ValueRef::Text(t) => format!("'{}'", String::from_utf8_lossy(t).replace('\'', "''")),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

// Display never switches to exponent notation; only the decimal point may be
// missing.
fn render_real(f: f64) -> String {
    let s = f.to_string();
    if f.is_finite() && !s.contains('.') {
        format!("{s}.0")
    } else {
        s
    }
}

/// Double-quote a SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_storage_class() {
        assert_eq!(render_value(ValueRef::Null), "NULL");
        assert_eq!(render_value(ValueRef::Integer(42)), "42");
        assert_eq!(render_value(ValueRef::Real(1.5)), "1.5");
        assert_eq!(render_value(ValueRef::Real(50000.0)), "50000.0");
        assert_eq!(render_value(ValueRef::Real(-3.0)), "-3.0");
        assert_eq!(render_value(ValueRef::Text(b"O'Neil")), "'O''Neil'");
        assert_eq!(render_value(ValueRef::Blob(&[1, 2, 3])), "<blob 3 bytes>");
    }

    #[test]
    fn reals_stay_in_plain_decimal_form() {
        assert_eq!(render_real(1e20), "100000000000000000000.0");
        assert_eq!(render_real(1e-7), "0.0000001");
        assert_eq!(render_real(f64::INFINITY), "inf");
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("sales"), "\"sales\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn reset_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        reset_database(&dir.path().join("absent.db")).unwrap();
    }

    #[test]
    fn reset_removes_file_and_journal() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("practice.db");
        let journal = dir.path().join("practice.db-journal");
        std::fs::write(&db, b"old").unwrap();
        std::fs::write(&journal, b"old").unwrap();
        reset_database(&db).unwrap();
        assert!(!db.exists());
        assert!(!journal.exists());
    }

    #[test]
    fn reset_removes_wal_side_files() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("practice.db");
        let wal = dir.path().join("practice.db-wal");
        let shm = dir.path().join("practice.db-shm");
        for f in [&db, &wal, &shm] {
            std::fs::write(f, b"old").unwrap();
        }
        reset_database(&db).unwrap();
        assert!(!wal.exists());
        assert!(!shm.exists());
    }

    #[test]
    fn reset_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = reset_database(dir.path()).unwrap_err();
        assert!(err.to_string().contains("failed to remove"));
    }

    #[test]
    fn open_leaves_foreign_keys_off() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open(&dir.path().join("practice.db")).unwrap();
        let on: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
            .unwrap();
        assert_eq!(on, 0);
    }

    #[test]
    fn schema_may_manage_its_own_transaction_and_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("schema.sql");
        std::fs::write(
            &script,
            "PRAGMA foreign_keys = ON;\nBEGIN;\nCREATE TABLE a (x TEXT);\nCOMMIT;\n",
        )
        .unwrap();
        let conn = open(&dir.path().join("practice.db")).unwrap();
        apply_schema(&conn, &script).unwrap();
        let on: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
            .unwrap();
        assert_eq!(on, 1);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn failing_schema_names_the_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("schema.sql");
        std::fs::write(&script, "CREATE TABLE b (y TEXT;\n").unwrap();
        let conn = Connection::open_in_memory().unwrap();
        let err = apply_schema(&conn, &script).unwrap_err();
        assert!(err.to_string().starts_with("schema "), "{err}");
        assert!(err.to_string().ends_with("schema.sql failed"), "{err}");
    }

    #[test]
    fn print_table_writes_header_and_tuples() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE departments (department_id INTEGER, department_name TEXT, budget REAL);
             INSERT INTO departments VALUES (10, 'Sales', 2500.5), (20, 'R&D', NULL);",
        )
        .unwrap();
        let mut out = Vec::new();
        let n = print_table(&conn, "departments", &mut out).unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nTable: departments\n(10, 'Sales', 2500.5)\n(20, 'R&D', NULL)\n"
        );
    }

    #[test]
    fn fetch_records_reports_column_names() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE sales (sale_id INTEGER, region TEXT);")
            .unwrap();
        let recs = fetch_records(&conn, "sales").unwrap();
        assert_eq!(recs.columns, vec!["sale_id", "region"]);
        assert!(recs.rows.is_empty());
    }
}
