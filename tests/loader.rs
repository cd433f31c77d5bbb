use sigap_kumuh::loader::{read_chart_bar, read_filter_options, read_rows_csv, read_table_rows};
use sigap_kumuh::{OptionCatalogue, Program};

#[test]
fn csv_rows_are_cleaned_and_passthrough_kept() {
    let csv = "\
tahun,wilayah,kecamatan,kelurahan,rw,nama_kegiatan,jenis_material,volume,satuan,anggaran_cip,keterangan
2024, Kota Adm. Jakarta Pusat ,Gambir,Kebon Kelapa,RW 02,Jalan Lingkungan,Aspal,\"1,200.5\",m2,1500000,ok
2024,Kota Adm. Jakarta Barat,Tambora,Angke,RW 01,Trotoar,,abc,m,-5,
";
    let (rows, report) = read_rows_csv(csv.as_bytes()).expect("csv");
    assert_eq!(rows.len(), 2);
    assert_eq!(report.total_rows, 2);
    assert_eq!(report.malformed_rows, 1);

    let first = &rows[0];
    assert_eq!(first.region, "Kota Adm. Jakarta Pusat");
    assert_eq!(first.volume, 1200.5);
    assert_eq!(first.budget, 1_500_000.0);
    assert_eq!(first.unit, "m2");
    assert_eq!(first.extra["keterangan"], "ok");

    let second = &rows[1];
    assert_eq!(second.volume, 0.0);
    assert_eq!(second.budget, 0.0);
    assert_eq!(second.material_type, "");
}

#[test]
fn filter_options_payload_builds_catalogue() {
    let json = r#"{
        "tahun_cap": [2023, "2022"],
        "tahun_cip": ["2024"],
        "wilayah": ["Utara", "Pusat"],
        "data": [
            {"tahun_cip": 2024, "wilayah": "Pusat", "kecamatan": "Gambir",
             "kelurahan": "Duri Pulo", "rw": "RW 3", "nama_kegiatan": "Trotoar"},
            {"tahun_cap": "2023", "wilayah": "Utara", "kecamatan": "Koja",
             "kelurahan": "Lagoa", "rw": "RW 10", "nama_kegiatan": "Saluran"}
        ]
    }"#;
    let options = read_filter_options(json.as_bytes()).expect("payload");
    assert_eq!(options.cap_years, vec!["2022", "2023"]);
    assert_eq!(options.years, vec!["2022", "2023", "2024"]);
    assert_eq!(options.rows[0].program, Some(Program::Cip));
    assert_eq!(options.rows[0].year, "2024");
    assert_eq!(options.rows[1].program, Some(Program::Cap));

    let catalogue = OptionCatalogue::from_filter_options(&options);
    assert_eq!(catalogue.regions, vec!["Pusat", "Utara"]);
    assert_eq!(catalogue.districts_by_region["Utara"], vec!["Koja"]);
    assert_eq!(catalogue.activity_types, vec!["Saluran", "Trotoar"]);
}

#[test]
fn table_payload_that_is_not_an_array_is_empty() {
    let (rows, _) = read_table_rows(r#"{"error": "timeout"}"#.as_bytes()).expect("json");
    assert!(rows.is_empty());
}

#[test]
fn chart_bar_payload_keeps_numeric_series() {
    let json = r#"[
        {"label": "Gambir", "jumlah_rw_kumuh": 3, "jumlah_rw_cap": "2", "catatan": "x"},
        {"label": "Koja", "jumlah_rw_kumuh": 1}
    ]"#;
    let bars = read_chart_bar(json.as_bytes()).expect("json");
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].values["jumlah_rw_cap"], 2.0);
    assert!(!bars[0].values.contains_key("catatan"));
    assert_eq!(bars[1].label, "Koja");
}

#[test]
fn invalid_json_is_an_error() {
    assert!(read_table_rows("[{".as_bytes()).is_err());
}
