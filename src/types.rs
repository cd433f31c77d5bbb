use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Programme track a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Program {
    Cap,
    Cip,
}

impl Program {
    pub fn parse(s: &str) -> Option<Program> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CAP" => Some(Program::Cap),
            "CIP" => Some(Program::Cip),
            _ => None,
        }
    }
}

/// Administrative hierarchy, ordered parent to child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HierarchyLevel {
    Region,
    District,
    SubDistrict,
    RwUnit,
}

impl HierarchyLevel {
    pub const ALL: [HierarchyLevel; 4] = [
        HierarchyLevel::Region,
        HierarchyLevel::District,
        HierarchyLevel::SubDistrict,
        HierarchyLevel::RwUnit,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn parent(self) -> Option<HierarchyLevel> {
        match self {
            HierarchyLevel::Region => None,
            HierarchyLevel::District => Some(HierarchyLevel::Region),
            HierarchyLevel::SubDistrict => Some(HierarchyLevel::District),
            HierarchyLevel::RwUnit => Some(HierarchyLevel::SubDistrict),
        }
    }

    pub fn child(self) -> Option<HierarchyLevel> {
        match self {
            HierarchyLevel::Region => Some(HierarchyLevel::District),
            HierarchyLevel::District => Some(HierarchyLevel::SubDistrict),
            HierarchyLevel::SubDistrict => Some(HierarchyLevel::RwUnit),
            HierarchyLevel::RwUnit => None,
        }
    }

    /// Levels strictly below `self`.
    pub fn descendants(self) -> impl Iterator<Item = HierarchyLevel> {
        HierarchyLevel::ALL.into_iter().filter(move |l| *l > self)
    }

    /// Query-string key used by the dashboard API.
    pub fn query_key(self) -> &'static str {
        match self {
            HierarchyLevel::Region => "wilayah",
            HierarchyLevel::District => "kecamatan",
            HierarchyLevel::SubDistrict => "kelurahan",
            HierarchyLevel::RwUnit => "rw",
        }
    }

    pub fn value_of(self, row: &Row) -> &str {
        match self {
            HierarchyLevel::Region => &row.region,
            HierarchyLevel::District => &row.district,
            HierarchyLevel::SubDistrict => &row.sub_district,
            HierarchyLevel::RwUnit => &row.rw_unit,
        }
    }
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_key())
    }
}

impl FromStr for HierarchyLevel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wilayah" | "region" => Ok(HierarchyLevel::Region),
            "kecamatan" | "district" => Ok(HierarchyLevel::District),
            "kelurahan" | "sub_district" | "subdistrict" => Ok(HierarchyLevel::SubDistrict),
            "rw" | "lokasi_rw" | "rw_unit" => Ok(HierarchyLevel::RwUnit),
            other => Err(EngineError::UnknownLevel(other.to_string())),
        }
    }
}

/// Filters that sit outside the hierarchy and never cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facet {
    YearCap,
    YearCip,
    ActivityType,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::YearCap, Facet::YearCip, Facet::ActivityType];

    pub fn query_key(self) -> &'static str {
        match self {
            Facet::YearCap => "tahun_cap",
            Facet::YearCip => "tahun_cip",
            Facet::ActivityType => "nama_kegiatan",
        }
    }
}

/// Any selectable dropdown: a facet or a hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Facet(Facet),
    Level(HierarchyLevel),
}

impl FromStr for FilterKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tahun_cap" | "year_cap" => Ok(FilterKey::Facet(Facet::YearCap)),
            "tahun_cip" | "year_cip" => Ok(FilterKey::Facet(Facet::YearCip)),
            "nama_kegiatan" | "kegiatan" | "activity_type" => {
                Ok(FilterKey::Facet(Facet::ActivityType))
            }
            other => other
                .parse::<HierarchyLevel>()
                .map(FilterKey::Level)
                .map_err(|_| EngineError::UnknownFilterKey(other.to_string())),
        }
    }
}

/// One programme-activity entry after cleaning.
///
/// Key fields are trimmed strings (blank when the source lacked them) and the
/// numeric fields are already coerced, so nothing downstream has to re-check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    pub program: Option<Program>,
    pub year: String,
    pub region: String,
    pub district: String,
    pub sub_district: String,
    pub rw_unit: String,
    pub activity_type: String,
    pub material_type: String,
    pub volume: f64,
    pub unit: String,
    pub budget: f64,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A row the backend has already aggregated for the bar chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartBarRow {
    pub label: String,
    pub values: BTreeMap<String, f64>,
}

/// Chart-ready output; `labels` and every series are positionally aligned.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregationResult {
    pub labels: Vec<String>,
    pub series: BTreeMap<String, Vec<f64>>,
    pub totals_by_label: BTreeMap<String, f64>,
}

impl AggregationResult {
    pub fn series(&self, name: &str) -> &[f64] {
        self.series.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn display_budget(budget: &Option<f64>) -> String {
    match budget {
        Some(v) => crate::util::format_rupiah(*v),
        None => "-".to_string(),
    }
}

fn display_volume(volume: &f64) -> String {
    crate::util::format_number(*volume, 2)
}

/// Table projection: one row per (activity, material, region).
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct GroupedRow {
    #[serde(rename = "NamaKegiatan")]
    #[tabled(rename = "Nama Kegiatan")]
    pub activity_type: String,
    #[serde(rename = "JenisMaterial")]
    #[tabled(rename = "Jenis Material")]
    pub material_type: String,
    #[serde(rename = "Skpd")]
    #[tabled(rename = "SKPD")]
    pub region_or_skpd: String,
    #[serde(rename = "Volume")]
    #[tabled(rename = "Volume", display_with = "display_volume")]
    pub volume: f64,
    #[serde(rename = "Satuan")]
    #[tabled(rename = "Satuan")]
    pub unit: String,
    #[serde(rename = "Anggaran")]
    #[tabled(rename = "Anggaran (Rp)", display_with = "display_budget")]
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct BudgetSlice {
    #[serde(rename = "NamaKegiatan")]
    #[tabled(rename = "Nama Kegiatan")]
    pub label: String,
    #[serde(rename = "Anggaran")]
    #[tabled(rename = "Anggaran (Rp)", display_with = "display_rupiah")]
    pub budget: f64,
    #[serde(rename = "Persentase")]
    #[tabled(rename = "%", display_with = "display_percentage")]
    pub percentage: f64,
}

fn display_rupiah(v: &f64) -> String {
    crate::util::format_rupiah(*v)
}

fn display_percentage(v: &f64) -> String {
    format!("{:.1}", v)
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub total_regions: usize,
    pub total_districts: usize,
    pub total_sub_districts: usize,
    pub total_rw_units: usize,
    pub total_rows: usize,
    pub cap_rows: usize,
    pub cip_rows: usize,
    pub total_volume: f64,
    pub total_budget: Option<f64>,
    pub generated_at: DateTime<Utc>,
}
