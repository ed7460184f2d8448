use std::io::Write;

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::db::{self, TABLES};
use crate::logger::{debug, info};

/// Where a run got to. Phases only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Start,
    SchemaCreated,
    EmployeesLoaded,
    DepartmentsLoaded,
    SalesLoaded,
    Committed,
    Printed,
    Closed,
}

/// Phase reached after each entry of `TABLES` is imported.
const LOADED: [Phase; 3] = [
    Phase::EmployeesLoaded,
    Phase::DepartmentsLoaded,
    Phase::SalesLoaded,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// `(table, rows inserted)` in load order.
    pub imported: Vec<(&'static str, usize)>,
    pub phase: Phase,
}

/// Recreate the database from the schema script and the three CSV files,
/// writing progress lines and the verification dump to `out`.
pub fn run(settings: &Settings, out: &mut impl Write) -> Result<LoadSummary> {
    let mut phase = Phase::Start;
    info(&format!("run: database {}", settings.database.display()));

    db::reset_database(&settings.database)?;
    let mut conn = db::open(&settings.database)?;

    if let Err(e) = db::apply_schema(&conn, &settings.schema) {
        // A half-applied script must not leave tables behind.
        let _ = conn.close();
        db::reset_database(&settings.database)?;
        return Err(e);
    }
    phase = advance(phase, Phase::SchemaCreated);
    writeln!(out, "Tables created.")?;

    // Rolled back on drop if any import fails.
    let tx = conn.transaction()?;
    let mut imported = Vec::with_capacity(TABLES.len());
    for (table, loaded) in TABLES.iter().zip(LOADED) {
        let path = settings.csv_path(table.name);
        let rows = db::import_csv(&tx, &path, table)
            .with_context(|| format!("failed to import {}", table.name))?;
        imported.push((table.name, rows));
        phase = advance(phase, loaded);
        writeln!(out, "{}", table.imported_message())?;
    }
    tx.commit().context("failed to commit import")?;
    phase = advance(phase, Phase::Committed);
    info("run: committed");

    if settings.dump {
        for table in &TABLES {
            db::print_table(&conn, table.name, out)?;
        }
        phase = advance(phase, Phase::Printed);
    }

    conn.close()
        .map_err(|(_, e)| e)
        .context("failed to close database")?;
    phase = advance(phase, Phase::Closed);
    writeln!(out, "All done.")?;
    info("run: done");

    Ok(LoadSummary { imported, phase })
}

fn advance(from: Phase, to: Phase) -> Phase {
    debug_assert!(to > from, "phase went backwards: {from:?} -> {to:?}");
    debug(&format!("run: {:?} -> {:?}", from, to));
    to
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Start < Phase::SchemaCreated);
        assert!(Phase::SalesLoaded < Phase::Committed);
        assert!(Phase::Printed < Phase::Closed);
        assert!(LOADED.windows(2).all(|w| w[0] < w[1]));
    }
}
