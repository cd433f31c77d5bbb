use crate::error::EngineError;
use crate::filter::FilterState;
use crate::types::{AggregationResult, ChartBarRow, Facet, HierarchyLevel, Program, Row};
use crate::util::value_to_f64;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

fn selected(values: &[String], field: &str) -> bool {
    values.is_empty() || values.iter().any(|v| v == field.trim())
}

fn year_passes(row: &Row, state: &FilterState) -> bool {
    let cap = state.facet(Facet::YearCap);
    let cip = state.facet(Facet::YearCip);
    match row.program {
        Some(Program::Cap) => selected(cap, &row.year),
        Some(Program::Cip) => selected(cip, &row.year),
        None => selected(cap, &row.year) && selected(cip, &row.year),
    }
}

/// True when `row` satisfies every non-empty selection.
///
/// Matching is exact and case-sensitive on the trimmed field. `yearCap` only
/// constrains CAP rows and `yearCip` only CIP rows; rows without a programme
/// must satisfy both.
pub fn row_matches(row: &Row, state: &FilterState) -> bool {
    year_passes(row, state)
        && selected(state.facet(Facet::ActivityType), &row.activity_type)
        && HierarchyLevel::ALL
            .into_iter()
            .all(|l| selected(state.effective(l), l.value_of(row)))
}

pub fn filter_rows(rows: &[Row], state: &FilterState) -> Vec<Row> {
    rows.iter()
        .filter(|r| row_matches(r, state))
        .cloned()
        .collect()
}

/// Grouping level for the chart's x-axis: one level below the deepest
/// selection, or the RW level itself once RW units are picked.
pub fn chart_dimension(state: &FilterState) -> HierarchyLevel {
    match state.deepest_selected() {
        None => HierarchyLevel::Region,
        Some(level) => level.child().unwrap_or(level),
    }
}

/// A summable quantity taken from each row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueField {
    RowCount,
    CapCount,
    CipCount,
    Budget,
    Volume,
    /// Numeric passthrough column, `0` when absent or not a number.
    Extra(String),
}

impl ValueField {
    pub fn name(&self) -> &str {
        match self {
            ValueField::RowCount => "jumlah",
            ValueField::CapCount => "jumlah_cap",
            ValueField::CipCount => "jumlah_cip",
            ValueField::Budget => "anggaran",
            ValueField::Volume => "volume",
            ValueField::Extra(name) => name.as_str(),
        }
    }

    pub fn value(&self, row: &Row) -> f64 {
        let count_if = |b: bool| if b { 1.0 } else { 0.0 };
        let v = match self {
            ValueField::RowCount => 1.0,
            ValueField::CapCount => count_if(row.program == Some(Program::Cap)),
            ValueField::CipCount => count_if(row.program == Some(Program::Cip)),
            ValueField::Budget => row.budget,
            ValueField::Volume => row.volume,
            ValueField::Extra(name) => row.extra.get(name).and_then(value_to_f64).unwrap_or(0.0),
        };
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }
}

impl fmt::Display for ValueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueField {
    type Err = EngineError;

    /// Known names map to their variant; `extra:<column>` selects a
    /// passthrough column. Anything else is a caller bug.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "jumlah" | "count" => Ok(ValueField::RowCount),
            "jumlah_cap" => Ok(ValueField::CapCount),
            "jumlah_cip" => Ok(ValueField::CipCount),
            "anggaran" | "budget" => Ok(ValueField::Budget),
            "volume" => Ok(ValueField::Volume),
            other => match other.strip_prefix("extra:") {
                Some(col) if !col.trim().is_empty() => Ok(ValueField::Extra(col.trim().into())),
                _ => Err(EngineError::UnknownValueField(other.to_string())),
            },
        }
    }
}

// Buckets keyed by label in first-seen order.
struct Buckets<'f> {
    fields: &'f [ValueField],
    index: HashMap<String, usize>,
    labels: Vec<String>,
    sums: Vec<Vec<f64>>,
}

impl<'f> Buckets<'f> {
    fn new(fields: &'f [ValueField]) -> Self {
        Buckets {
            fields,
            index: HashMap::new(),
            labels: Vec::new(),
            sums: vec![Vec::new(); fields.len()],
        }
    }

    fn slot(&mut self, label: &str) -> usize {
        if let Some(i) = self.index.get(label) {
            return *i;
        }
        let i = self.labels.len();
        self.index.insert(label.to_string(), i);
        self.labels.push(label.to_string());
        for s in &mut self.sums {
            s.push(0.0);
        }
        i
    }

    fn finish(self) -> AggregationResult {
        let mut totals_by_label = BTreeMap::new();
        for (i, label) in self.labels.iter().enumerate() {
            let total: f64 = self.sums.iter().map(|s| s[i]).sum();
            *totals_by_label.entry(label.clone()).or_insert(0.0) += total;
        }
        let series = self
            .fields
            .iter()
            .zip(self.sums)
            .map(|(f, s)| (f.name().to_string(), s))
            .collect();
        AggregationResult {
            labels: self.labels,
            series,
            totals_by_label,
        }
    }
}

/// Sum `fields` per distinct `dimension` value. Labels keep the order in
/// which they first appear in `rows`.
pub fn group_for_chart(
    rows: &[Row],
    dimension: HierarchyLevel,
    fields: &[ValueField],
) -> AggregationResult {
    let mut buckets = Buckets::new(fields);
    for row in rows {
        let i = buckets.slot(dimension.value_of(row).trim());
        for (f, field) in fields.iter().enumerate() {
            buckets.sums[f][i] += field.value(row);
        }
    }
    debug!(%dimension, labels = buckets.labels.len(), "chart grouped");
    buckets.finish()
}

/// Filter, pick the x-axis level from the selection depth, then group.
pub fn chart_for(rows: &[Row], state: &FilterState, fields: &[ValueField]) -> AggregationResult {
    let filtered = filter_rows(rows, state);
    group_for_chart(&filtered, chart_dimension(state), fields)
}

/// Re-key rows the backend already aggregated. Unique labels pass through
/// unchanged; repeated labels are summed.
pub fn group_aggregated(rows: &[ChartBarRow], fields: &[ValueField]) -> AggregationResult {
    let mut buckets = Buckets::new(fields);
    for row in rows {
        let i = buckets.slot(row.label.trim());
        for (f, field) in fields.iter().enumerate() {
            let v = row.values.get(field.name()).copied().unwrap_or(0.0);
            if v.is_finite() {
                buckets.sums[f][i] += v;
            }
        }
    }
    buckets.finish()
}

/// Query string for the server-side chart path: the filter plus the x-axis
/// level the server should group by.
pub fn chart_query_string(state: &FilterState) -> String {
    let mut pairs: Vec<(&str, &str)> = state.query_pairs();
    pairs.push(("level_x_axis", chart_dimension(state).query_key()));
    crate::filter::encode_pairs(pairs)
}
