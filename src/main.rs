// Entry point and high-level CLI flow.
//
// A small console shell over the library, kept in the dashboard's shape:
// - Option [1] loads the row set and rebuilds the option catalogue.
// - Option [2] sets one dropdown (cascading resets apply).
// - Option [3] clears every filter.
// - Option [4] renders the chart, table, donut and summary for the current
//   filter and writes them to the output directory.
// - Option [5] runs the cost projection (admin only).
// - Option [6] sets the free-text search applied to the detail table.
//
// End of input on any prompt exits the shell.
use once_cell::sync::Lazy;
use sigap_kumuh::output;
use sigap_kumuh::projection;
use sigap_kumuh::summary::{budget_share, summarize};
use sigap_kumuh::util::{format_int, format_number, format_rupiah};
use sigap_kumuh::{
    chart_for, chart_query_string, filter_rows, group_for_table, loader, options_for, search_rows,
    table_page, DashboardConfig, Facet, FilterKey, FilterState, OptionCatalogue, PageRequest,
    Program, Row, ValueField,
};
use std::io::{self, BufRead, Write};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Loaded data and the session's filter live here so the menu can load once
// and report many times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    rows: Option<Vec<Row>>,
    catalogue: OptionCatalogue,
    filter: FilterState,
    search: String,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_json = std::env::var("SIGAP_LOG_JSON").is_ok_and(|v| v == "1");
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

/// Print `label` and read one trimmed line; `None` once stdin is closed.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    read_line_from(&mut io::stdin().lock())
}

fn read_line_from<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf.trim().to_string()),
        Err(e) => {
            error!("stdin read failed: {e}");
            None
        }
    }
}

/// Read a single line after the common "Enter choice:" prompt.
fn read_choice() -> Option<String> {
    prompt("Enter choice: ")
}

/// Ask whether to go back to the menu after generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N` or input
/// ended.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(answer) = prompt("Back to menu (Y/N): ") else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the rows named in the config and rebuild the
/// catalogue. The filter is reset because old selections may not exist in
/// the new data.
fn handle_load(config: &DashboardConfig) {
    match loader::load_rows(&config.data_path) {
        Ok((rows, report)) => {
            println!(
                "Processing dataset... ({} rows loaded)",
                format_int(report.total_rows as i64)
            );
            if report.malformed_rows > 0 || report.parse_errors > 0 {
                println!(
                    "Note: {} incomplete rows kept with blank/zero fields, {} unreadable rows skipped.",
                    format_int(report.malformed_rows as i64),
                    format_int(report.parse_errors as i64)
                );
            }
            println!();
            let mut st = state();
            st.catalogue = OptionCatalogue::from_rows(&rows);
            st.rows = Some(rows);
            st.filter.reset();
            st.search.clear();
        }
        Err(e) => {
            error!(path = %config.data_path.display(), "load failed: {e}");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn options_for_key(catalogue: &OptionCatalogue, filter: &FilterState, key: FilterKey) -> Vec<String> {
    match key {
        FilterKey::Facet(Facet::YearCap) => catalogue.cap_years.clone(),
        FilterKey::Facet(Facet::YearCip) => catalogue.cip_years.clone(),
        FilterKey::Facet(Facet::ActivityType) => catalogue.activity_types.clone(),
        FilterKey::Level(level) => options_for(catalogue, filter, level),
    }
}

/// Handle option [2]: pick a dropdown, show its current options, take a
/// comma-separated selection. A blank selection means "Semua".
fn handle_set_filter() {
    let Some(key_text) =
        prompt("Filter (tahun_cap/tahun_cip/nama_kegiatan/wilayah/kecamatan/kelurahan/rw): ")
    else {
        return;
    };
    let key: FilterKey = match key_text.parse() {
        Ok(k) => k,
        Err(e) => {
            println!("{}\n", e);
            return;
        }
    };
    {
        let st = state();
        let opts = options_for_key(&st.catalogue, &st.filter, key);
        if opts.is_empty() {
            println!("(no options available)");
        } else {
            println!("Options: {}", opts.join(", "));
        }
    }
    let Some(values) = prompt("Values (comma-separated, blank = Semua): ") else {
        return;
    };
    let mut st = state();
    st.filter
        .set(key, values.split(',').map(str::trim).filter(|v| !v.is_empty()));
    println!("Query: ?{}\n", st.filter.to_query_string());
}

/// Handle option [4]: render every widget for the current filter and write
/// the exports.
///
/// Writes `chart_series.json`, `table_cip.csv` and `summary.json` into the
/// configured output directory and prints Markdown previews.
fn handle_generate_reports(config: &DashboardConfig) {
    let (rows, filter, search) = {
        let st = state();
        (st.rows.clone(), st.filter.clone(), st.search.clone())
    };
    let Some(rows) = rows else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    let include_budget = config.access.can_see_budget();
    info!(query = %filter.to_query_string(), include_budget, "generating reports");

    println!("Generating reports...");
    println!("API query: /chart-bar?{}\n", chart_query_string(&filter));

    let mut fields = vec![ValueField::CapCount, ValueField::CipCount];
    if include_budget {
        fields.push(ValueField::Budget);
    }
    let chart = chart_for(&rows, &filter, &fields);
    println!("CAP dan CIP berdasarkan RW Kumuh\n");
    println!(
        "{}\n",
        output::render_series(&chart, |name, v| match name {
            "anggaran" => format_rupiah(v),
            _ => format_number(v, 0),
        })
    );
    let chart_file = config.output_dir.join("chart_series.json");
    if let Err(e) = output::write_json(&chart_file, &chart) {
        eprintln!("Write error: {}", e);
    }

    let priority = config.priority();
    let searched = search_rows(&rows, &search);
    let page = table_page(
        &searched,
        &filter,
        &priority,
        PageRequest {
            page_size: config.page_size,
            page_number: 1,
        },
        include_budget,
    );
    let mut groups = group_for_table(&searched, &filter, &priority);
    if !include_budget {
        sigap_kumuh::table::redact_budget(&mut groups);
    }
    if !search.is_empty() {
        println!("Search: \"{}\"", search);
    }
    println!(
        "Detail CIP (page {} of {}, {} groups)\n",
        page.page_number,
        page.total_pages,
        format_int(page.total_items as i64)
    );
    output::preview_table_rows(&page.items, page.items.len());
    let table_file = config.output_dir.join("table_cip.csv");
    if let Err(e) = output::write_csv(&table_file, &groups) {
        eprintln!("Write error: {}", e);
    }
    println!("(Full table exported to {})\n", table_file.display());

    let filtered = filter_rows(&rows, &filter);
    if include_budget {
        println!("Persentase Anggaran CIP\n");
        output::preview_table_rows(&budget_share(&filtered, Some(Program::Cip)), 10);
    }

    let summary = summarize(&filtered, include_budget);
    let summary_file = config.output_dir.join("summary.json");
    if let Err(e) = output::write_json(&summary_file, &summary) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Summary: {} wilayah, {} kecamatan, {} kelurahan, {} RW, {} CIP rows",
        summary.total_regions,
        summary.total_districts,
        summary.total_sub_districts,
        summary.total_rw_units,
        format_int(summary.cip_rows as i64)
    );
    if let Some(total) = summary.total_budget {
        println!("Total anggaran: {}", format_rupiah(total));
    }
    println!();
}

/// Handle option [5]: unit-price projection, shown to admins only.
fn handle_estimate(config: &DashboardConfig) {
    if !config.access.can_see_budget() {
        println!("Cost estimation is only available to admin users.\n");
        return;
    }
    let names: Vec<&str> = projection::UNIT_PRICES.iter().map(|(n, _)| *n).collect();
    println!("Items: {}", names.join(", "));
    let Some(item) = prompt("Item: ") else {
        return;
    };
    let Some(volume) =
        prompt("Volume (meter/unit): ").and_then(|v| loader::parse_number_input(&v))
    else {
        println!("Volume must be a number.\n");
        return;
    };
    let Some(year) = prompt("Tahun estimasi: ").and_then(|y| y.parse::<i32>().ok()) else {
        println!("Year must be a number.\n");
        return;
    };
    match projection::estimate(&item, volume, year) {
        Ok(e) => println!(
            "Estimasi harga tahun {} untuk {} {} \"{}\": {}\n",
            e.year,
            format_number(e.volume, 2),
            e.unit_label,
            e.item,
            format_rupiah(e.total)
        ),
        Err(e) => println!("{}\n", e),
    }
}

/// Handle option [6]: set the table search. Blank clears it.
fn handle_search() {
    let Some(text) = prompt("Search table (blank = clear): ") else {
        return;
    };
    state().search = text;
    println!();
}

fn main() {
    init_tracing();
    let config = match DashboardConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(2);
        }
    };

    loop {
        println!("SIGAP KUMUH");
        println!("[1] Load the file");
        println!("[2] Set filter");
        println!("[3] Reset filter");
        println!("[4] Generate reports");
        println!("[5] Estimate cost");
        println!("[6] Search table");
        println!("[0] Exit\n");
        let Some(choice) = read_choice() else {
            println!("\nExiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&config),
            "2" => handle_set_filter(),
            "3" => {
                let mut st = state();
                st.filter.reset();
                st.search.clear();
                println!("All filters cleared.\n");
            }
            "4" => {
                println!();
                handle_generate_reports(&config);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "5" => handle_estimate(&config),
            "6" => handle_search(),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-6.\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_input_reads_as_none() {
        let mut input: &[u8] = b" 4 \n";
        assert_eq!(read_line_from(&mut input), Some("4".to_string()));
        assert_eq!(read_line_from(&mut input), None);
        assert_eq!(read_line_from(&mut &b"\n"[..]), Some(String::new()));
    }
}
