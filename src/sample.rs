use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Schema matching the three loader tables.
pub const SCHEMA_SQL: &str = r#"CREATE TABLE employees (
    employee_id   INTEGER PRIMARY KEY,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    email         TEXT,
    department_id INTEGER,
    hire_date     TEXT,
    salary        INTEGER,
    job_title     TEXT,
    manager_id    INTEGER
);

CREATE TABLE departments (
    department_id   INTEGER PRIMARY KEY,
    department_name TEXT NOT NULL,
    manager_id      INTEGER,
    location        TEXT,
    budget          INTEGER
);

CREATE TABLE sales (
    sale_id     INTEGER PRIMARY KEY,
    employee_id INTEGER,
    sale_date   TEXT,
    sale_amount REAL,
    product     TEXT,
    region      TEXT
);
"#;

pub const EMPLOYEES_CSV: &str = "\
employee_id,first_name,last_name,email,department_id,hire_date,salary,job_title,manager_id
1,Alice,Nguyen,alice@example.com,10,2018-03-12,98000,Sales Director,
2,Bob,Okafor,bob@example.com,10,2019-07-01,64000,Account Executive,1
3,Carol,Schmidt,carol@example.com,20,2020-01-15,87000,Engineer,4
4,Dave,Ito,dave@example.com,20,2017-11-20,120000,Engineering Manager,
5,Eve,Moreau,eve@example.com,30,2021-05-03,58000,Analyst,
";

pub const DEPARTMENTS_CSV: &str = "\
department_id,department_name,manager_id,location,budget
10,Sales,1,Chicago,500000
20,Engineering,4,Berlin,1200000
30,Finance,,London,300000
";

pub const SALES_CSV: &str = "\
sale_id,employee_id,sale_date,sale_amount,product,region
1001,2,2023-01-05,1200.50,Widget,North
1002,2,2023-01-17,850.00,Gadget,North
1003,1,2023-02-02,4300.00,Widget Pro,East
1004,2,2023-02-20,99.99,Widget,West
";

/// Paths of a written sample workspace.
#[derive(Debug, Clone)]
pub struct SampleLayout {
    pub schema: PathBuf,
    pub data_dir: PathBuf,
    pub database: PathBuf,
}

/// Write `sql/create_tables.sql` and `data/*.csv` under `root`, overwriting
/// earlier copies.
pub fn write_sample(root: &Path) -> Result<SampleLayout> {
    let sql_dir = root.join("sql");
    let data_dir = root.join("data");
    for dir in [&sql_dir, &data_dir] {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let schema = sql_dir.join("create_tables.sql");
    let files = [
        (schema.clone(), SCHEMA_SQL),
        (data_dir.join("employees.csv"), EMPLOYEES_CSV),
        (data_dir.join("departments.csv"), DEPARTMENTS_CSV),
        (data_dir.join("sales.csv"), SALES_CSV),
    ];
    for (path, body) in &files {
        fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(SampleLayout {
        schema,
        data_dir,
        database: root.join("practice.db"),
    })
}
