use crate::aggregate::filter_rows;
use crate::filter::FilterState;
use crate::types::{GroupedRow, Program, Row};
use crate::util::{natural_cmp, value_to_string};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Fixed display order for the detail table's activity types.
pub const CANONICAL_ACTIVITY_TYPES: [&str; 15] = [
    "Jalan Lingkungan",
    "Trotoar",
    "Drainase Lingkungan",
    "Saluran",
    "Speed Bump",
    "Cermin Cembung",
    "Penerangan Jalan Umum",
    "Bollard",
    "Bangku Taman",
    "Gapura",
    "Wayfinding",
    "Vertikal Garden",
    "APAR",
    "Papan Nama Jalan",
    "Pekerjaan Utilitas",
];

static CANONICAL: Lazy<ActivityPriority> =
    Lazy::new(|| ActivityPriority::new(CANONICAL_ACTIVITY_TYPES));

/// Ordering of activity types: listed names by position, everything else
/// after them alphabetically.
#[derive(Debug, Clone, Default)]
pub struct ActivityPriority {
    rank: HashMap<String, usize>,
}

impl ActivityPriority {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rank = HashMap::new();
        for (i, name) in names.into_iter().enumerate() {
            rank.entry(name.as_ref().trim().to_string()).or_insert(i);
        }
        ActivityPriority { rank }
    }

    pub fn canonical() -> &'static ActivityPriority {
        &CANONICAL
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.rank.get(a), self.rank.get(b)) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => natural_cmp(a, b),
        }
    }
}

/// Group rows by (activity, material, region), summing volume and budget.
///
/// Types missing from the data produce no placeholder rows. A group's unit is
/// the first one seen for it.
pub fn group_rows(rows: &[Row], priority: &ActivityPriority) -> Vec<GroupedRow> {
    let mut index: HashMap<(&str, &str, &str), usize> = HashMap::new();
    let mut groups: Vec<GroupedRow> = Vec::new();
    for r in rows {
        let key = (
            r.activity_type.trim(),
            r.material_type.trim(),
            r.region.trim(),
        );
        let volume = if r.volume.is_finite() { r.volume } else { 0.0 };
        let budget = if r.budget.is_finite() { r.budget } else { 0.0 };
        match index.get(&key) {
            Some(&i) => {
                let g = &mut groups[i];
                g.volume += volume;
                g.budget = Some(g.budget.unwrap_or(0.0) + budget);
            }
            None => {
                index.insert(key, groups.len());
                groups.push(GroupedRow {
                    activity_type: key.0.to_string(),
                    material_type: key.1.to_string(),
                    region_or_skpd: key.2.to_string(),
                    volume,
                    unit: r.unit.trim().to_string(),
                    budget: Some(budget),
                });
            }
        }
    }
    groups.sort_by(|a, b| {
        priority
            .compare(&a.activity_type, &b.activity_type)
            .then_with(|| natural_cmp(&a.material_type, &b.material_type))
            .then_with(|| natural_cmp(&a.region_or_skpd, &b.region_or_skpd))
    });
    groups
}

// Every displayable value of a row, space-joined and lowercased. Budget is
// left out so a search cannot reveal figures a viewer may not see.
fn search_text(row: &Row) -> String {
    let program = match row.program {
        Some(Program::Cap) => "CAP",
        Some(Program::Cip) => "CIP",
        None => "",
    };
    let volume = row.volume.to_string();
    let mut parts: Vec<String> = [
        program,
        row.year.as_str(),
        row.region.as_str(),
        row.district.as_str(),
        row.sub_district.as_str(),
        row.rw_unit.as_str(),
        row.activity_type.as_str(),
        row.material_type.as_str(),
        volume.as_str(),
        row.unit.as_str(),
    ]
    .iter()
    .map(|s| s.trim().to_string())
    .collect();
    parts.extend(row.extra.values().map(value_to_string));
    parts.join(" ").to_lowercase()
}

/// Free-text table search: keeps rows whose values contain `text`,
/// case-insensitively. A blank search keeps everything.
pub fn search_rows(rows: &[Row], text: &str) -> Vec<Row> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|r| search_text(r).contains(&needle))
        .cloned()
        .collect()
}

/// Filter then group; the full ordered list before pagination.
pub fn group_for_table(
    rows: &[Row],
    state: &FilterState,
    priority: &ActivityPriority,
) -> Vec<GroupedRow> {
    group_rows(&filter_rows(rows, state), priority)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: usize,
    /// 1-based.
    pub page_number: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page_size: 10,
            page_number: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice one page out of `items`. Page numbers clamp into
/// `1..=total_pages`, a zero page size counts as 1, and an empty list still
/// has one (empty) page.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let page_size = request.page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page_number = request.page_number.clamp(1, total_pages);
    let start = (page_number - 1) * page_size;
    let end = (start + page_size).min(items.len());
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page_number,
        page_size,
        total_pages,
        total_items: items.len(),
    }
}

/// Drop budget figures for viewers not allowed to see them.
pub fn redact_budget(groups: &mut [GroupedRow]) {
    for g in groups {
        g.budget = None;
    }
}

/// One page of the detail table as the dashboard shows it.
pub fn table_page(
    rows: &[Row],
    state: &FilterState,
    priority: &ActivityPriority,
    request: PageRequest,
    include_budget: bool,
) -> Page<GroupedRow> {
    let mut groups = group_for_table(rows, state, priority);
    if !include_budget {
        redact_budget(&mut groups);
    }
    paginate(&groups, request)
}
