//! CSV flow tables.
//!
//! Input tables need an activity and a quantity column, and may carry a
//! notes column. Output tables repeat the input columns followed by the
//! parsed process fields and, for assessments, one column per impact
//! category.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{MatchError, Result};
use crate::types::{
    config::TableColumns,
    flow::{AssessedFlow, FlowRecord, ParsedFlow, ResolvedFlow},
    method::ImpactCategory,
};

const PROCESS_HEADERS: [&str; 3] = ["Process", "Location", "Units"];

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn required_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    column_index(headers, name).ok_or_else(|| MatchError::MissingColumn {
        column: name.to_string(),
    })
}

/// Read flows from any CSV source.
///
/// Reads at most `max_rows` data rows. Rows with a blank activity or a
/// blank quantity are dropped; the survivors keep their position as `row`.
/// A quantity that is present but not numeric reads as 0.
pub fn read_flows_from<R: Read>(
    reader: R,
    columns: &TableColumns,
    max_rows: Option<usize>,
) -> Result<Vec<FlowRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let activity_idx = required_column(&headers, &columns.activity)?;
    let quantity_idx = required_column(&headers, &columns.quantity)?;
    let notes_idx = column_index(&headers, &columns.notes);

    let mut flows = Vec::new();
    let mut dropped = 0;

    for (row, record) in reader
        .records()
        .take(max_rows.unwrap_or(usize::MAX))
        .enumerate()
    {
        let record = record?;
        let activity = record.get(activity_idx).unwrap_or("").trim();
        let raw_quantity = record.get(quantity_idx).unwrap_or("").trim();
        if activity.is_empty() || raw_quantity.is_empty() {
            dropped += 1;
            continue;
        }

        let quantity = FlowRecord::parse_quantity(raw_quantity);
        let mut flow = FlowRecord::new(row, activity, quantity);
        if let Some(notes) = notes_idx.and_then(|i| record.get(i)) {
            flow = flow.with_notes(notes);
        }
        flows.push(flow);
    }

    if dropped > 0 {
        debug!(dropped, "Dropped rows with missing values");
    }
    Ok(flows)
}

/// Read flows from a CSV file.
pub fn read_flows(
    path: impl AsRef<Path>,
    columns: &TableColumns,
    max_rows: Option<usize>,
) -> Result<Vec<FlowRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let flows = read_flows_from(file, columns, max_rows)?;
    info!(path = %path.display(), rows = flows.len(), "Loaded flow table");
    Ok(flows)
}

/// Write search-and-select results: one line per labelled row.
///
/// The process fields are empty for rows whose label did not parse.
pub fn write_resolved_to<W: Write>(
    writer: W,
    columns: &TableColumns,
    resolved: &[ResolvedFlow],
    parsed: &[ParsedFlow],
) -> Result<()> {
    let by_row: HashMap<usize, &ParsedFlow> = parsed.iter().map(|p| (p.flow.row, p)).collect();
    let mut writer = csv::Writer::from_writer(writer);

    let mut headers = vec![columns.activity.as_str(), columns.quantity.as_str(), "Selected dataset"];
    headers.extend(PROCESS_HEADERS);
    writer.write_record(&headers)?;

    for item in resolved {
        let quantity = item.flow.quantity.to_string();
        let (process, location, unit) = match by_row.get(&item.flow.row) {
            Some(p) => (
                p.process.process_name.as_str(),
                p.process.location.as_str(),
                p.process.unit.as_str(),
            ),
            None => ("", "", ""),
        };
        writer.write_record([
            item.flow.activity.as_str(),
            quantity.as_str(),
            item.label.as_str(),
            process,
            location,
            unit,
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write search-and-select results to a file.
pub fn write_resolved(
    path: impl AsRef<Path>,
    columns: &TableColumns,
    resolved: &[ResolvedFlow],
    parsed: &[ParsedFlow],
) -> Result<()> {
    let path = path.as_ref();
    write_resolved_to(std::fs::File::create(path)?, columns, resolved, parsed)?;
    info!(path = %path.display(), rows = resolved.len(), "Wrote resolved table");
    Ok(())
}

/// Write assessed rows with one column per impact category.
///
/// Unset impact values are written as empty cells.
pub fn write_assessed_to<W: Write>(
    writer: W,
    columns: &TableColumns,
    assessed: &[AssessedFlow],
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut headers = vec![columns.activity.as_str(), columns.quantity.as_str()];
    headers.extend(PROCESS_HEADERS);
    headers.extend(ImpactCategory::ALL.iter().map(|c| c.column()));
    writer.write_record(&headers)?;

    for item in assessed {
        let mut record = vec![
            item.flow.activity.clone(),
            item.flow.quantity.to_string(),
            item.process.process_name.clone(),
            item.process.location.clone(),
            item.process.unit.clone(),
        ];
        record.extend(
            ImpactCategory::ALL
                .iter()
                .map(|c| item.impacts.get(*c).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write assessed rows to a file.
pub fn write_assessed(
    path: impl AsRef<Path>,
    columns: &TableColumns,
    assessed: &[AssessedFlow],
) -> Result<()> {
    let path = path.as_ref();
    write_assessed_to(std::fs::File::create(path)?, columns, assessed)?;
    info!(path = %path.display(), rows = assessed.len(), "Wrote assessment table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::flow::{CandidateSource, ParsedLabel, SelectedLabel};
    use crate::types::method::ImpactValues;

    const TABLE: &str = "\
Input/output,In/out,Notes
Waste Graphite,1.5,from anode scrap
,2.0,
Copper,abc,
Steel,,
Electricity,-3,
";

    #[test]
    fn test_read_flows() {
        let flows = read_flows_from(TABLE.as_bytes(), &TableColumns::default(), None).unwrap();

        assert_eq!(flows.len(), 3);
        assert_eq!(flows[0].activity, "Waste Graphite");
        assert_eq!(flows[0].quantity, 1.5);
        assert_eq!(flows[0].notes.as_deref(), Some("from anode scrap"));
        // Blank activity and blank quantity dropped, positions kept
        assert_eq!(flows[1].row, 2);
        assert_eq!(flows[1].activity, "Copper");
        assert_eq!(flows[1].quantity, 0.0);
        assert_eq!(flows[1].notes, None);
        assert_eq!(flows[2].row, 4);
        assert_eq!(flows[2].quantity, -3.0);
    }

    #[test]
    fn test_blank_quantity_row_is_dropped() {
        let table = "Input/output,In/out\nsteel,\ncopper,2\n";
        let flows = read_flows_from(table.as_bytes(), &TableColumns::default(), None).unwrap();

        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].activity, "copper");
        assert_eq!(flows[0].row, 1);
        assert_eq!(flows[0].quantity, 2.0);
    }

    #[test]
    fn test_max_rows_window() {
        let flows = read_flows_from(TABLE.as_bytes(), &TableColumns::default(), Some(2)).unwrap();
        assert_eq!(flows.len(), 1);
    }

    #[test]
    fn test_missing_required_column() {
        let table = "Activity,In/out\nsteel,1\n";
        let err = read_flows_from(table.as_bytes(), &TableColumns::default(), None).unwrap_err();
        assert!(matches!(err, MatchError::MissingColumn { column } if column == "Input/output"));
    }

    #[test]
    fn test_notes_column_is_optional() {
        let table = "In/out,Input/output\n2,steel\n";
        let flows = read_flows_from(table.as_bytes(), &TableColumns::default(), None).unwrap();
        assert_eq!(flows[0].activity, "steel");
        assert_eq!(flows[0].quantity, 2.0);
    }

    #[test]
    fn test_custom_column_names() {
        let columns = TableColumns {
            activity: "Flow".to_string(),
            quantity: "Amount".to_string(),
            notes: "Comment".to_string(),
        };
        let table = "Flow,Amount,Comment\ncement,4,clinker\n";
        let flows = read_flows_from(table.as_bytes(), &columns, None).unwrap();
        assert_eq!(flows[0].notes.as_deref(), Some("clinker"));
    }

    fn parsed_label() -> ParsedLabel {
        ParsedLabel {
            process_name: "treatment of waste graphite".to_string(),
            location: "GLO".to_string(),
            unit: "kg".to_string(),
        }
    }

    #[test]
    fn test_write_assessed() {
        let mut impacts = ImpactValues::new();
        impacts.set(ImpactCategory::Gwp, 63.0);
        impacts.set(ImpactCategory::Pofp, 0.25);
        let assessed = vec![AssessedFlow {
            flow: FlowRecord::new(0, "Waste Graphite", 1.5),
            process: parsed_label(),
            impacts,
        }];

        let mut out = Vec::new();
        write_assessed_to(&mut out, &TableColumns::default(), &assessed).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Input/output,In/out,Process,Location,Units,GWP,ADP,Water use,AP,FETP,HTP,ODP,PMFP,POFP"
        );
        assert_eq!(
            lines[1],
            "Waste Graphite,1.5,treatment of waste graphite,GLO,kg,63,,,,,,,,0.25"
        );
    }

    #[test]
    fn test_write_resolved_leaves_unparsed_fields_empty() {
        let resolved = |row: usize, label: &str| ResolvedFlow {
            flow: FlowRecord::new(row, "Waste Graphite", 1.0),
            label: SelectedLabel::new(label),
            source: CandidateSource::Direct,
            candidate_count: 1,
        };
        let parsed = vec![ParsedFlow {
            flow: FlowRecord::new(0, "Waste Graphite", 1.0),
            process: parsed_label(),
        }];

        let mut out = Vec::new();
        write_resolved_to(
            &mut out,
            &TableColumns::default(),
            &[resolved(0, "treatment of waste graphite, GLO, kg"), resolved(1, "")],
            &parsed,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Input/output,In/out,Selected dataset,Process,Location,Units");
        assert_eq!(
            lines[1],
            "Waste Graphite,1,\"treatment of waste graphite, GLO, kg\",treatment of waste graphite,GLO,kg"
        );
        assert_eq!(lines[2], "Waste Graphite,1,,,,");
    }
}
