//! CSV export of the intervention history and the Q-table.

use std::{fs::File, io::Write, path::Path};

use crate::{
    Result,
    error::Error,
    q_learning::QTable,
    types::{Action, InterventionRecord},
};

/// Write the intervention history as CSV, one record per row.
pub fn write_history_csv<W: Write>(records: &[InterventionRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the intervention history to a CSV file.
pub fn history_csv_to_path<P: AsRef<Path>>(
    records: &[InterventionRecord],
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create history file {path:?}"),
        source,
    })?;
    write_history_csv(records, file)
}

/// Write the Q-table as CSV with one row per state.
pub fn write_q_table_csv<W: Write>(table: &QTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut header = vec!["state".to_string()];
    header.extend(Action::ALL.iter().map(|action| action.to_string()));
    csv_writer.write_record(&header)?;

    for state in 0..table.state_count() {
        let mut row = vec![state.to_string()];
        row.extend(table.row(state).iter().map(|value| value.to_string()));
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the Q-table to a CSV file.
pub fn q_table_csv_to_path<P: AsRef<Path>>(table: &QTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create q-table file {path:?}"),
        source,
    })?;
    write_q_table_csv(table, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        intervention::InterventionRule,
        types::{ActionKind, InterventionRecord},
    };

    #[test]
    fn test_history_csv_contains_records() {
        let records = vec![InterventionRecord {
            occurred_at: 1_500,
            from_state: 1,
            to_state: 2,
            rule: InterventionRule::Impede,
            reward: 0.0,
            action: Action::Right,
            action_kind: ActionKind::Exploitation,
        }];

        let mut buffer = Vec::new();
        write_history_csv(&records, &mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();

        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("from_state"));
        assert!(header.contains("rule"));
        let row = lines.next().unwrap();
        assert!(row.contains("Impede"));
        assert!(row.contains("1500"));
    }

    #[test]
    fn test_q_table_csv_dimensions() {
        let mut table = QTable::zeroed(4, 4);
        table.set(2, Action::Right.index(), 5.0);

        let mut buffer = Vec::new();
        write_q_table_csv(&table, &mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "state,left,down,right,up");
        assert!(lines[3].starts_with("2,"));
        assert!(lines[3].contains('5'));
    }
}
