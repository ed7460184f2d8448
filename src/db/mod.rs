mod import;
mod sqlite;

use std::path::PathBuf;

pub use import::import_csv;
pub use sqlite::{
    apply_schema, fetch_records, open, print_table, quote_ident, render_row, reset_database,
};

/// A destination table and the CSV columns copied into it, in insert order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub const EMPLOYEES: TableSpec = TableSpec {
    name: "employees",
    columns: &[
        "employee_id",
        "first_name",
        "last_name",
        "email",
        "department_id",
        "hire_date",
        "salary",
        "job_title",
        "manager_id",
    ],
};

pub const DEPARTMENTS: TableSpec = TableSpec {
    name: "departments",
    columns: &["department_id", "department_name", "manager_id", "location", "budget"],
};

pub const SALES: TableSpec = TableSpec {
    name: "sales",
    columns: &["sale_id", "employee_id", "sale_date", "sale_amount", "product", "region"],
};

/// Load order, which is also the dump order.
pub const TABLES: [TableSpec; 3] = [EMPLOYEES, DEPARTMENTS, SALES];

impl TableSpec {
    /// `INSERT INTO "t" ("a","b") VALUES (?,?)`
    pub fn insert_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(",");
        let placeholders = vec!["?"; self.columns.len()].join(",");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(self.name),
            columns,
            placeholders
        )
    }

    /// Progress line printed once the table has been imported.
    pub fn imported_message(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => format!("{}{} imported.", first.to_uppercase(), chars.as_str()),
            None => "imported.".to_string(),
        }
    }
}

/// Loader failures worth telling apart from plain I/O or SQL errors.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{}: header has no column `{column}` required by table {table}", .path.display())]
    MissingColumn {
        table: &'static str,
        column: &'static str,
        path: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct Records {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>, // each inner Vec is a row of rendered SQL literals
}
