use sigap_kumuh::{
    district_options, district_options_by_sections, filter_rows, options_for, rw_unit_options,
    sections_for, sub_district_options, EngineError, FilterState, HierarchyLevel,
    OptionCatalogue, OptionSection, Row,
};

fn place(region: &str, district: &str, sub: &str, rw: &str) -> Row {
    Row {
        year: "2024".into(),
        region: region.into(),
        district: district.into(),
        sub_district: sub.into(),
        rw_unit: rw.into(),
        activity_type: "Trotoar".into(),
        ..Default::default()
    }
}

fn jakarta() -> OptionCatalogue {
    OptionCatalogue::from_rows(&[
        place("Jakarta Pusat", "Gambir", "Kebon Kelapa", "RW 10"),
        place("Jakarta Pusat", "Gambir", "Kebon Kelapa", "RW 2"),
        place("Jakarta Pusat", "Gambir", "Duri Pulo", "RW 3"),
        place("Jakarta Pusat", "Tanah Abang", "Bendungan Hilir", "RW 1"),
        place("Jakarta Barat", "Tambora", "Angke", "RW 2"),
        place("Jakarta Barat", "Cengkareng", "Kapuk", "RW 11"),
        place("Jakarta Utara", "Koja", "Lagoa", "RW 5"),
        place("", "Orphan", "", ""),
    ])
}

#[test]
fn catalogue_lists_are_sorted_numerically() {
    let c = jakarta();
    assert_eq!(c.regions, vec!["Jakarta Barat", "Jakarta Pusat", "Jakarta Utara"]);
    assert_eq!(c.rw_units_by_sub_district["Kebon Kelapa"], vec!["RW 2", "RW 10"]);
    assert!(!c.districts_by_region.contains_key(""));
}

#[test]
fn nothing_selected_offers_everything() {
    let c = jakarta();
    let s = FilterState::new();
    assert_eq!(
        district_options(&c, &s),
        vec!["Cengkareng", "Gambir", "Koja", "Tambora", "Tanah Abang"]
    );
    assert_eq!(rw_unit_options(&c, &s), vec!["RW 1", "RW 2", "RW 3", "RW 5", "RW 10", "RW 11"]);
}

#[test]
fn multi_region_selection_unions_children() {
    let c = jakarta();
    let mut s = FilterState::new();
    s.set_selection(HierarchyLevel::Region, ["Jakarta Utara", "Jakarta Pusat"]);
    assert_eq!(district_options(&c, &s), vec!["Gambir", "Koja", "Tanah Abang"]);
}

#[test]
fn region_selection_narrows_every_level_below() {
    let c = jakarta();
    let mut s = FilterState::new();
    s.set_selection(HierarchyLevel::Region, ["Jakarta Barat"]);
    assert_eq!(sub_district_options(&c, &s), vec!["Angke", "Kapuk"]);
    assert_eq!(rw_unit_options(&c, &s), vec!["RW 2", "RW 11"]);

    s.set_selection(HierarchyLevel::District, ["Tambora"]);
    assert_eq!(sub_district_options(&c, &s), vec!["Angke"]);
}

#[test]
fn unknown_selection_yields_no_options() {
    let c = jakarta();
    let mut s = FilterState::new();
    s.set_selection(HierarchyLevel::Region, ["Bekasi"]);
    assert!(district_options(&c, &s).is_empty());
    assert!(rw_unit_options(&c, &s).is_empty());
    assert_eq!(options_for(&c, &s, HierarchyLevel::Region).len(), 3);
}

#[test]
fn sections_follow_selection_order() {
    let c = jakarta();
    let mut s = FilterState::new();
    s.set_selection(HierarchyLevel::Region, ["Jakarta Utara", "Jakarta Pusat", "Bekasi"]);
    assert_eq!(
        district_options_by_sections(&c, &s),
        vec![
            OptionSection {
                title: "Jakarta Utara".into(),
                options: vec!["Koja".into()],
            },
            OptionSection {
                title: "Jakarta Pusat".into(),
                options: vec!["Gambir".into(), "Tanah Abang".into()],
            },
        ]
    );
}

#[test]
fn sections_without_selection_use_sorted_parents() {
    let c = jakarta();
    let s = FilterState::new();
    let titles: Vec<String> = district_options_by_sections(&c, &s)
        .into_iter()
        .map(|sec| sec.title)
        .collect();
    assert_eq!(titles, vec!["Jakarta Barat", "Jakarta Pusat", "Jakarta Utara"]);

    let rw = sections_for(&c, &s, HierarchyLevel::RwUnit).expect("sections");
    assert_eq!(rw[0].title, "Angke");
}

#[test]
fn top_level_has_no_sections() {
    let c = jakarta();
    assert_eq!(
        sections_for(&c, &FilterState::new(), HierarchyLevel::Region),
        Err(EngineError::NoParentLevel(HierarchyLevel::Region))
    );
}

#[test]
fn shared_district_name_does_not_leak_across_regions() {
    let rows = [
        place("Jakarta Utara", "Koja", "Tugu Utara", "RW 01"),
        place("Jakarta Timur", "Tugu", "Tugu Selatan", "RW 05"),
        place("Jakarta Selatan", "Tugu", "Kebagusan", "RW 09"),
    ];
    let c = OptionCatalogue::from_rows(&rows);
    let mut s = FilterState::new();
    s.set_selection(HierarchyLevel::Region, ["Jakarta Timur"]);

    assert_eq!(district_options(&c, &s), vec!["Tugu"]);
    assert_eq!(sub_district_options(&c, &s), vec!["Tugu Selatan"]);
    assert_eq!(rw_unit_options(&c, &s), vec!["RW 05"]);

    s.set_selection(HierarchyLevel::District, ["Tugu"]);
    assert_eq!(sub_district_options(&c, &s), vec!["Tugu Selatan"]);
    let sections = sections_for(&c, &s, HierarchyLevel::SubDistrict).expect("sections");
    assert_eq!(sections[0].options, vec!["Tugu Selatan"]);

    // Every offered value still finds rows under the current selection.
    for sub in sub_district_options(&c, &s) {
        let mut narrowed = s.clone();
        narrowed.set_selection(HierarchyLevel::SubDistrict, [sub]);
        assert!(!filter_rows(&rows, &narrowed).is_empty());
    }
}
