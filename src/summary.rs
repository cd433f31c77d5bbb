use crate::types::{BudgetSlice, HierarchyLevel, Program, Row, SummaryStats};
use chrono::Utc;
use std::collections::{HashMap, HashSet};

// Distinct places at `depth`, each qualified by its ancestors. A row whose
// own value at that depth is blank names no place there.
fn distinct_places(rows: &[Row], depth: HierarchyLevel) -> usize {
    rows.iter()
        .filter(|r| !depth.value_of(r).trim().is_empty())
        .map(|r| {
            HierarchyLevel::ALL[..=depth.index()]
                .iter()
                .map(|l| l.value_of(r).trim())
                .collect::<Vec<_>>()
        })
        .collect::<HashSet<_>>()
        .len()
}

/// Headline counts for the summary cards. Place counts are qualified by their
/// ancestors, so two "RW 01" in different sub-districts count twice; blank
/// values are not places.
pub fn summarize(rows: &[Row], include_budget: bool) -> SummaryStats {
    let count = |p: Program| rows.iter().filter(|r| r.program == Some(p)).count();

    SummaryStats {
        total_regions: distinct_places(rows, HierarchyLevel::Region),
        total_districts: distinct_places(rows, HierarchyLevel::District),
        total_sub_districts: distinct_places(rows, HierarchyLevel::SubDistrict),
        total_rw_units: distinct_places(rows, HierarchyLevel::RwUnit),
        total_rows: rows.len(),
        cap_rows: count(Program::Cap),
        cip_rows: count(Program::Cip),
        total_volume: rows.iter().map(|r| r.volume).sum(),
        total_budget: include_budget.then(|| rows.iter().map(|r| r.budget).sum()),
        generated_at: Utc::now(),
    }
}

/// Budget share per activity type for the donut chart, in first-seen order.
/// `program` restricts to one track; blank activity types read "Lainnya".
pub fn budget_share(rows: &[Row], program: Option<Program>) -> Vec<BudgetSlice> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut slices: Vec<BudgetSlice> = Vec::new();
    for r in rows.iter().filter(|r| program.is_none() || r.program == program) {
        let label = match r.activity_type.trim() {
            "" => "Lainnya",
            other => other,
        };
        let i = *index.entry(label).or_insert_with(|| {
            slices.push(BudgetSlice {
                label: label.to_string(),
                budget: 0.0,
                percentage: 0.0,
            });
            slices.len() - 1
        });
        slices[i].budget += r.budget;
    }
    let total: f64 = slices.iter().map(|s| s.budget).sum();
    if total > 0.0 {
        for s in &mut slices {
            s.percentage = s.budget / total * 100.0;
        }
    }
    slices
}
