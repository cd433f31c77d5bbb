// Cascading dropdown options.
//
// With nothing selected above it a level lists everything it knows. Once any
// ancestor carries a selection, a level only offers values that sit on a
// hierarchy path passing every selected ancestor, so a region pick narrows
// districts, sub-districts and RW units below it at once, and a district name
// shared by two regions never drags in the other region's children.
use crate::catalogue::OptionCatalogue;
use crate::error::EngineError;
use crate::filter::FilterState;
use crate::types::HierarchyLevel;
use crate::util::sorted_unique;
use serde::Serialize;

/// Child options grouped under one parent heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSection {
    pub title: String,
    pub options: Vec<String>,
}

// The set a child level derives from: explicit selection wins, otherwise
// whatever the level offers right now.
fn effective_set(
    catalogue: &OptionCatalogue,
    state: &FilterState,
    level: HierarchyLevel,
) -> Vec<String> {
    let selected = state.effective(level);
    if selected.is_empty() {
        options_for(catalogue, state, level)
    } else {
        selected.to_vec()
    }
}

/// Sorted, de-duplicated options for `level` consistent with every ancestor
/// selection. Unknown selected values contribute nothing.
///
/// For a level whose only selected ancestor is its parent this is the union
/// of that parent's children.
pub fn options_for(
    catalogue: &OptionCatalogue,
    state: &FilterState,
    level: HierarchyLevel,
) -> Vec<String> {
    match level.parent() {
        None => catalogue.regions.clone(),
        Some(parent) => {
            let ancestors = &HierarchyLevel::ALL[..=parent.index()];
            if ancestors.iter().all(|a| state.effective(*a).is_empty()) {
                return catalogue.all_options(level);
            }
            sorted_unique(
                catalogue
                    .places
                    .iter()
                    .filter(|place| {
                        ancestors.iter().all(|a| {
                            let selected = state.effective(*a);
                            selected.is_empty() || selected.contains(&place[a.index()])
                        })
                    })
                    .map(|place| place[level.index()].as_str()),
            )
        }
    }
}

pub fn district_options(catalogue: &OptionCatalogue, state: &FilterState) -> Vec<String> {
    options_for(catalogue, state, HierarchyLevel::District)
}

pub fn sub_district_options(catalogue: &OptionCatalogue, state: &FilterState) -> Vec<String> {
    options_for(catalogue, state, HierarchyLevel::SubDistrict)
}

pub fn rw_unit_options(catalogue: &OptionCatalogue, state: &FilterState) -> Vec<String> {
    options_for(catalogue, state, HierarchyLevel::RwUnit)
}

/// Options for `level` grouped under their parent.
///
/// One section per selected parent in selection order, or per parent option in
/// sorted order when the parent has no selection. Each section only holds
/// values also present in [`options_for`]; empty sections are dropped.
pub fn sections_for(
    catalogue: &OptionCatalogue,
    state: &FilterState,
    level: HierarchyLevel,
) -> Result<Vec<OptionSection>, EngineError> {
    let parent = level.parent().ok_or(EngineError::NoParentLevel(level))?;
    let flat = options_for(catalogue, state, level);
    let sections = effective_set(catalogue, state, parent)
        .into_iter()
        .map(|title| {
            let options = sorted_unique(
                catalogue
                    .children(parent, &title)
                    .iter()
                    .filter(|c| flat.contains(*c)),
            );
            OptionSection { title, options }
        })
        .filter(|s| !s.options.is_empty())
        .collect();
    Ok(sections)
}

pub fn district_options_by_sections(
    catalogue: &OptionCatalogue,
    state: &FilterState,
) -> Vec<OptionSection> {
    sections_for(catalogue, state, HierarchyLevel::District).unwrap_or_default()
}
