use proptest::prelude::*;
use sigap_kumuh::util::sorted_unique;
use sigap_kumuh::{
    district_options, filter_rows, group_for_chart, group_for_table, paginate, ActivityPriority,
    Facet, FilterState, HierarchyLevel, OptionCatalogue, PageRequest, Program, Row, ValueField,
};

const ACTIVITIES: [&str; 5] = ["Trotoar", "Jalan Lingkungan", "Gapura", "Bak Sampah", ""];
const MATERIALS: [&str; 3] = ["Aspal", "Beton", ""];
const YEARS: [&str; 3] = ["2022", "2023", "2024"];

fn arb_program() -> impl Strategy<Value = Option<Program>> {
    prop_oneof![Just(Some(Program::Cap)), Just(Some(Program::Cip)), Just(None)]
}

fn arb_row() -> impl Strategy<Value = Row> {
    (
        (0..3usize, 0..3usize, 0..3usize, 0..4usize),
        (0..ACTIVITIES.len(), 0..MATERIALS.len(), 0..YEARS.len()),
        (0u32..5_000_000, 0u32..100),
        arb_program(),
    )
        .prop_map(|((r, d, s, w), (a, m, y), (budget, volume), program)| Row {
            program,
            year: YEARS[y].to_string(),
            region: format!("R{r}"),
            // District names repeat across regions on purpose.
            district: format!("D{d}"),
            sub_district: format!("D{d}-S{s}"),
            rw_unit: format!("RW {w}"),
            activity_type: ACTIVITIES[a].to_string(),
            material_type: MATERIALS[m].to_string(),
            volume: f64::from(volume),
            unit: "unit".to_string(),
            budget: f64::from(budget),
            ..Default::default()
        })
}

fn pick(prefix: &'static str, max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec((0..max).prop_map(move |i| format!("{prefix}{i}")), 0..3)
}

fn arb_state() -> impl Strategy<Value = FilterState> {
    (
        pick("R", 4),
        pick("D", 4),
        prop::collection::vec(0..YEARS.len(), 0..2),
        prop::collection::vec(0..YEARS.len(), 0..2),
        prop::collection::vec(0..ACTIVITIES.len() - 1, 0..2),
    )
        .prop_map(|(regions, districts, cap, cip, acts)| {
            let mut f = FilterState::new();
            f.set_selection(HierarchyLevel::Region, regions);
            f.set_selection(HierarchyLevel::District, districts);
            f.set_facet(Facet::YearCap, cap.into_iter().map(|i| YEARS[i]));
            f.set_facet(Facet::YearCip, cip.into_iter().map(|i| YEARS[i]));
            f.set_facet(Facet::ActivityType, acts.into_iter().map(|i| ACTIVITIES[i]));
            f
        })
}

fn arb_level() -> impl Strategy<Value = HierarchyLevel> {
    prop::sample::select(HierarchyLevel::ALL.to_vec())
}

proptest! {
    #[test]
    fn setting_a_level_clears_all_descendants(
        mut state in arb_state(),
        level in arb_level(),
        values in pick("X", 5),
    ) {
        let facets_before: Vec<Vec<String>> =
            Facet::ALL.iter().map(|f| state.facet(*f).to_vec()).collect();
        state.set_selection(HierarchyLevel::RwUnit, ["RW 1"]);
        state.set_selection(level, values);
        for below in level.descendants() {
            prop_assert!(state.effective(below).is_empty());
        }
        let facets_after: Vec<Vec<String>> =
            Facet::ALL.iter().map(|f| state.facet(*f).to_vec()).collect();
        prop_assert_eq!(facets_before, facets_after);
    }

    #[test]
    fn district_options_are_the_union_of_selected_regions(
        rows in prop::collection::vec(arb_row(), 0..40),
        regions in pick("R", 5),
    ) {
        let catalogue = OptionCatalogue::from_rows(&rows);
        let mut state = FilterState::new();
        state.set_selection(HierarchyLevel::Region, regions.clone());

        let expected = if regions.is_empty() {
            sorted_unique(rows.iter().map(|r| r.district.as_str()))
        } else {
            sorted_unique(regions.iter().flat_map(|r| {
                catalogue.districts_by_region.get(r).cloned().unwrap_or_default()
            }))
        };
        prop_assert_eq!(district_options(&catalogue, &state), expected);
    }

    #[test]
    fn filtering_is_idempotent(
        rows in prop::collection::vec(arb_row(), 0..40),
        state in arb_state(),
    ) {
        let once = filter_rows(&rows, &state);
        let twice = filter_rows(&once, &state);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn chart_series_conserve_sums(
        rows in prop::collection::vec(arb_row(), 0..40),
        state in arb_state(),
        level in arb_level(),
    ) {
        let filtered = filter_rows(&rows, &state);
        let fields = [ValueField::Budget, ValueField::Volume, ValueField::RowCount, ValueField::CapCount];
        let result = group_for_chart(&filtered, level, &fields);
        for field in &fields {
            let series = result.series(field.name());
            prop_assert_eq!(series.len(), result.labels.len());
            let charted: f64 = series.iter().sum();
            let direct: f64 = filtered.iter().map(|r| field.value(r)).sum();
            prop_assert_eq!(charted, direct);
        }
    }

    #[test]
    fn pages_cover_every_group_exactly_once(
        rows in prop::collection::vec(arb_row(), 0..40),
        state in arb_state(),
        page_size in 1usize..6,
    ) {
        let groups = group_for_table(&rows, &state, ActivityPriority::canonical());
        let total_pages = paginate(&groups, PageRequest { page_size, page_number: 1 }).total_pages;
        let mut rebuilt = Vec::new();
        for page_number in 1..=total_pages {
            rebuilt.extend(paginate(&groups, PageRequest { page_size, page_number }).items);
        }
        prop_assert_eq!(rebuilt, groups);
    }
}
