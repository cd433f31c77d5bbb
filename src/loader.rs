use crate::error::LoadError;
use crate::types::{ChartBarRow, Program, Row};
use crate::util::{parse_f64_safe, sorted_unique, value_to_f64, value_to_string};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// A flat record as it arrives from the API or a spreadsheet export.
pub type RawRecord = BTreeMap<String, Value>;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub malformed_rows: usize,
    pub parse_errors: usize,
    pub loaded_at: DateTime<Utc>,
}

const PROGRAM_KEYS: &[&str] = &["program", "jenis_program"];
const YEAR_KEYS: &[&str] = &["tahun", "year", "periode_data"];
const REGION_KEYS: &[&str] = &["wilayah", "region", "lokasi_kabkota"];
const DISTRICT_KEYS: &[&str] = &["kecamatan", "district"];
const SUB_DISTRICT_KEYS: &[&str] = &["kelurahan", "sub_district"];
const RW_KEYS: &[&str] = &["rw", "lokasi_rw", "rw_unit"];
const ACTIVITY_KEYS: &[&str] = &["nama_kegiatan", "activity_type", "kegiatan"];
const MATERIAL_KEYS: &[&str] = &["jenis_material", "material_type", "material"];
const VOLUME_KEYS: &[&str] = &["volume"];
const UNIT_KEYS: &[&str] = &["satuan", "unit"];
const CAP_BUDGET_KEYS: &[&str] = &["anggaran", "budget", "anggaran_cap", "anggaran_cip"];
const CIP_BUDGET_KEYS: &[&str] = &["anggaran", "budget", "anggaran_cip", "anggaran_cap"];

enum Numeric {
    Missing,
    Bad,
    Value(f64),
}

// Removes the first alias carrying a non-blank value; other aliases stay in
// the record and end up as passthrough fields.
fn take_text(rec: &mut RawRecord, keys: &[&str]) -> Option<String> {
    let key = keys
        .iter()
        .find(|k| rec.get(**k).map(value_to_string).is_some_and(|v| !v.is_empty()))?;
    rec.remove(*key).map(|v| value_to_string(&v))
}

fn take_number(rec: &mut RawRecord, keys: &[&str]) -> Numeric {
    let Some(key) = keys.iter().find(|k| {
        rec.get(**k)
            .is_some_and(|v| !v.is_null() && !value_to_string(v).is_empty())
    }) else {
        return Numeric::Missing;
    };
    match rec.remove(*key).as_ref().and_then(value_to_f64) {
        Some(v) => Numeric::Value(v),
        None => Numeric::Bad,
    }
}

/// Clean one record into a [`Row`].
///
/// Never fails: blank key fields become `""`, unreadable numbers become `0`
/// and negative budgets clamp to `0`. The flag reports whether any of that
/// happened so the caller can count malformed rows.
pub fn row_from_record(mut rec: RawRecord) -> (Row, bool) {
    let mut malformed = false;

    let mut program = take_text(&mut rec, PROGRAM_KEYS).and_then(|p| Program::parse(&p));
    let year = match take_text(&mut rec, YEAR_KEYS) {
        Some(y) => y,
        None => {
            if let Some(y) = take_text(&mut rec, &["tahun_cip"]) {
                program = program.or(Some(Program::Cip));
                y
            } else if let Some(y) = take_text(&mut rec, &["tahun_cap"]) {
                program = program.or(Some(Program::Cap));
                y
            } else {
                String::new()
            }
        }
    };

    let mut key_field = |keys: &[&str], rec: &mut RawRecord| match take_text(rec, keys) {
        Some(v) => v,
        None => {
            malformed = true;
            String::new()
        }
    };
    let region = key_field(REGION_KEYS, &mut rec);
    let district = key_field(DISTRICT_KEYS, &mut rec);
    let sub_district = key_field(SUB_DISTRICT_KEYS, &mut rec);
    let rw_unit = key_field(RW_KEYS, &mut rec);
    let activity_type = key_field(ACTIVITY_KEYS, &mut rec);
    if year.is_empty() {
        malformed = true;
    }

    let material_type = take_text(&mut rec, MATERIAL_KEYS).unwrap_or_default();
    let unit = take_text(&mut rec, UNIT_KEYS).unwrap_or_default();

    let volume = match take_number(&mut rec, VOLUME_KEYS) {
        Numeric::Value(v) => v,
        Numeric::Missing => 0.0,
        Numeric::Bad => {
            malformed = true;
            0.0
        }
    };
    let budget_keys = match program {
        Some(Program::Cap) => CAP_BUDGET_KEYS,
        _ => CIP_BUDGET_KEYS,
    };
    let budget = match take_number(&mut rec, budget_keys) {
        Numeric::Value(v) if v >= 0.0 => v,
        Numeric::Value(_) | Numeric::Bad => {
            malformed = true;
            0.0
        }
        Numeric::Missing => 0.0,
    };

    let row = Row {
        program,
        year,
        region,
        district,
        sub_district,
        rw_unit,
        activity_type,
        material_type,
        volume,
        unit,
        budget,
        extra: rec,
    };
    (row, malformed)
}

pub fn rows_from_records<I>(records: I, parse_errors: usize) -> (Vec<Row>, LoadReport)
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut rows = Vec::new();
    let mut malformed_rows = 0usize;
    for rec in records {
        let (row, malformed) = row_from_record(rec);
        if malformed {
            malformed_rows += 1;
        }
        rows.push(row);
    }
    let report = LoadReport {
        total_rows: rows.len() + parse_errors,
        malformed_rows,
        parse_errors,
        loaded_at: Utc::now(),
    };
    if malformed_rows > 0 || parse_errors > 0 {
        warn!(
            malformed_rows,
            parse_errors, "some rows were incomplete and were coerced to blanks/zeros"
        );
    }
    info!(rows = rows.len(), "rows loaded");
    (rows, report)
}

/// Read rows from a CSV export; header names follow the API field names.
pub fn read_rows_csv<R: Read>(reader: R) -> Result<(Vec<Row>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut parse_errors = 0usize;
    let mut records = Vec::new();

    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "skipping unreadable CSV record");
                parse_errors += 1;
                continue;
            }
        };
        let rec: RawRecord = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.trim().to_string(), Value::String(v.to_string())))
            .collect();
        records.push(rec);
    }
    Ok(rows_from_records(records, parse_errors))
}

/// `/filter-options` response body.
#[derive(Debug, Default, Deserialize)]
pub struct FilterOptionsPayload {
    #[serde(default, alias = "years")]
    pub tahun: Vec<Value>,
    #[serde(default)]
    pub tahun_cap: Vec<Value>,
    #[serde(default)]
    pub tahun_cip: Vec<Value>,
    #[serde(default, alias = "regions")]
    pub wilayah: Vec<Value>,
    #[serde(default, alias = "activityTypes")]
    pub nama_kegiatan: Vec<Value>,
    #[serde(default)]
    pub data: Vec<RawRecord>,
}

/// Cleaned `/filter-options` snapshot: flat option lists plus the rows the
/// adjacency maps get derived from.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    pub years: Vec<String>,
    pub cap_years: Vec<String>,
    pub cip_years: Vec<String>,
    pub regions: Vec<String>,
    pub activity_types: Vec<String>,
    pub rows: Vec<Row>,
    pub report: LoadReport,
}

fn text_list(values: &[Value]) -> Vec<String> {
    sorted_unique(values.iter().map(value_to_string))
}

impl From<FilterOptionsPayload> for FilterOptions {
    fn from(p: FilterOptionsPayload) -> Self {
        let cap_years = text_list(&p.tahun_cap);
        let cip_years = text_list(&p.tahun_cip);
        let years = sorted_unique(
            text_list(&p.tahun)
                .into_iter()
                .chain(cap_years.iter().cloned())
                .chain(cip_years.iter().cloned()),
        );
        let (rows, report) = rows_from_records(p.data, 0);
        FilterOptions {
            years,
            cap_years,
            cip_years,
            regions: text_list(&p.wilayah),
            activity_types: text_list(&p.nama_kegiatan),
            rows,
            report,
        }
    }
}

pub fn read_filter_options<R: Read>(reader: R) -> Result<FilterOptions, LoadError> {
    let payload: FilterOptionsPayload = serde_json::from_reader(reader)?;
    Ok(payload.into())
}

fn array_records(value: Value, what: &str) -> Vec<RawRecord> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map.into_iter().collect()),
                _ => None,
            })
            .collect(),
        _ => {
            warn!(payload = what, "expected a JSON array, treating as empty");
            Vec::new()
        }
    }
}

/// `/table-cip` response body: a JSON array of raw rows.
pub fn read_table_rows<R: Read>(reader: R) -> Result<(Vec<Row>, LoadReport), LoadError> {
    let value: Value = serde_json::from_reader(reader)?;
    Ok(rows_from_records(array_records(value, "table-cip"), 0))
}

/// `/chart-bar` response body when the backend already aggregated.
pub fn read_chart_bar<R: Read>(reader: R) -> Result<Vec<ChartBarRow>, LoadError> {
    let value: Value = serde_json::from_reader(reader)?;
    let rows = array_records(value, "chart-bar")
        .into_iter()
        .map(|mut rec| {
            let label = rec.remove("label").map(|v| value_to_string(&v)).unwrap_or_default();
            let values = rec
                .iter()
                .filter_map(|(k, v)| value_to_f64(v).map(|n| (k.clone(), n)))
                .collect();
            ChartBarRow { label, values }
        })
        .collect();
    Ok(rows)
}

/// Load rows from disk, choosing the parser by extension. JSON files may be a
/// bare row array or a full `/filter-options` payload.
pub fn load_rows(path: &Path) -> Result<(Vec<Row>, LoadReport), LoadError> {
    let file = BufReader::new(File::open(path)?);
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        return read_rows_csv(file);
    }
    let value: Value = serde_json::from_reader(file)?;
    let has_data = matches!(&value, Value::Object(map) if map.contains_key("data"));
    if has_data {
        let payload: FilterOptionsPayload = serde_json::from_value(value)?;
        let options = FilterOptions::from(payload);
        return Ok((options.rows, options.report));
    }
    if value.is_array() {
        return Ok(rows_from_records(array_records(value, "rows"), 0));
    }
    Err(LoadError::Shape(format!(
        "{}: expected a row array or an object with `data`",
        path.display()
    )))
}

/// Parse the numeric cell of a CSV-style string; exposed for the shell's prompts.
pub fn parse_number_input(s: &str) -> Option<f64> {
    parse_f64_safe(Some(s))
}
