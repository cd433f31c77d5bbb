use crate::loader::FilterOptions;
use crate::types::{HierarchyLevel, Program, Row};
use crate::util::sorted_unique;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A full region → RW path as seen on one row, trimmed.
pub type Place = [String; 4];

/// Dropdown options for one data load. Built once per row-set reload and only
/// read afterwards.
///
/// Every adjacency entry comes from scanning rows, so no child option exists
/// without a row behind it. All lists are de-duplicated and sorted with
/// [`crate::util::natural_cmp`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionCatalogue {
    pub years: Vec<String>,
    pub cap_years: Vec<String>,
    pub cip_years: Vec<String>,
    pub regions: Vec<String>,
    pub activity_types: Vec<String>,
    pub districts_by_region: BTreeMap<String, Vec<String>>,
    pub sub_districts_by_district: BTreeMap<String, Vec<String>>,
    pub rw_units_by_sub_district: BTreeMap<String, Vec<String>>,
    /// Distinct hierarchy paths. Lets deeper levels be narrowed by every
    /// ancestor selection, not just by the parent's bare names.
    pub places: Vec<Place>,
}

fn adjacency<F>(rows: &[Row], parent: F, child: HierarchyLevel) -> BTreeMap<String, Vec<String>>
where
    F: Fn(&Row) -> &str,
{
    let mut raw: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for r in rows {
        let (p, c) = (parent(r).trim(), child.value_of(r).trim());
        if p.is_empty() || c.is_empty() {
            continue;
        }
        raw.entry(p.to_string()).or_default().push(c);
    }
    raw.into_iter()
        .map(|(k, v)| (k, sorted_unique(v)))
        .collect()
}

impl OptionCatalogue {
    /// Derive every list by scanning rows.
    pub fn from_rows(rows: &[Row]) -> Self {
        let years_of = |program: Program| {
            sorted_unique(
                rows.iter()
                    .filter(|r| r.program == Some(program))
                    .map(|r| r.year.as_str()),
            )
        };
        let catalogue = OptionCatalogue {
            years: sorted_unique(rows.iter().map(|r| r.year.as_str())),
            cap_years: years_of(Program::Cap),
            cip_years: years_of(Program::Cip),
            regions: sorted_unique(rows.iter().map(|r| r.region.as_str())),
            activity_types: sorted_unique(rows.iter().map(|r| r.activity_type.as_str())),
            districts_by_region: adjacency(
                rows,
                |r| r.region.as_str(),
                HierarchyLevel::District,
            ),
            sub_districts_by_district: adjacency(
                rows,
                |r| r.district.as_str(),
                HierarchyLevel::SubDistrict,
            ),
            rw_units_by_sub_district: adjacency(
                rows,
                |r| r.sub_district.as_str(),
                HierarchyLevel::RwUnit,
            ),
            places: rows
                .iter()
                .map(|r| HierarchyLevel::ALL.map(|l| l.value_of(r).trim().to_string()))
                .collect::<BTreeSet<Place>>()
                .into_iter()
                .collect(),
        };
        debug!(
            regions = catalogue.regions.len(),
            districts = catalogue.districts_by_region.values().map(Vec::len).sum::<usize>(),
            places = catalogue.places.len(),
            "option catalogue rebuilt"
        );
        catalogue
    }

    /// Flat lists come from the payload when it sent them, adjacency always
    /// from its rows.
    pub fn from_filter_options(options: &FilterOptions) -> Self {
        let mut catalogue = Self::from_rows(&options.rows);
        let prefer = |sent: &Vec<String>, scanned: Vec<String>| {
            if sent.is_empty() {
                scanned
            } else {
                sent.clone()
            }
        };
        catalogue.years = prefer(&options.years, std::mem::take(&mut catalogue.years));
        catalogue.cap_years = prefer(&options.cap_years, std::mem::take(&mut catalogue.cap_years));
        catalogue.cip_years = prefer(&options.cip_years, std::mem::take(&mut catalogue.cip_years));
        catalogue.regions = prefer(&options.regions, std::mem::take(&mut catalogue.regions));
        catalogue.activity_types = prefer(
            &options.activity_types,
            std::mem::take(&mut catalogue.activity_types),
        );
        catalogue
    }

    /// Children of `parent_value`, where `parent_level` is the level the value
    /// belongs to. Unknown keys and the leaf level yield an empty slice.
    pub fn children(&self, parent_level: HierarchyLevel, parent_value: &str) -> &[String] {
        let map = match parent_level {
            HierarchyLevel::Region => &self.districts_by_region,
            HierarchyLevel::District => &self.sub_districts_by_district,
            HierarchyLevel::SubDistrict => &self.rw_units_by_sub_district,
            HierarchyLevel::RwUnit => return &[],
        };
        map.get(parent_value.trim()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every known value at `level`, ignoring any selection.
    pub fn all_options(&self, level: HierarchyLevel) -> Vec<String> {
        let map = match level {
            HierarchyLevel::Region => return self.regions.clone(),
            HierarchyLevel::District => &self.districts_by_region,
            HierarchyLevel::SubDistrict => &self.sub_districts_by_district,
            HierarchyLevel::RwUnit => &self.rw_units_by_sub_district,
        };
        sorted_unique(map.values().flatten())
    }
}
