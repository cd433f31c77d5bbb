use crate::types::AggregationResult;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown preview of at most `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(tidak ada data)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}

/// Markdown table of chart series: one row per label, one column per series.
pub fn render_series<F>(result: &AggregationResult, format_value: F) -> String
where
    F: Fn(&str, f64) -> String,
{
    if result.labels.is_empty() {
        return "(tidak ada data)".to_string();
    }
    let mut builder = Builder::default();
    let mut header = vec!["Label".to_string()];
    header.extend(result.series.keys().cloned());
    builder.push_record(header);
    for (i, label) in result.labels.iter().enumerate() {
        let mut record = vec![label.clone()];
        for (name, values) in &result.series {
            record.push(format_value(name, values[i]));
        }
        builder.push_record(record);
    }
    builder.build().with(Style::markdown()).to_string()
}
