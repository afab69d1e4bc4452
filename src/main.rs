// Entry point and CLI flow.
//
// With a subcommand the binary loads the dataset, prints or exports the
// requested view and exits. Without one it runs a small menu loop:
// - [1] loads the CSV once for the session,
// - [2] prints the summary cards and report tables,
// - [3] browses the inventory table (search, sort, paging),
// - [4] exports the report tables.
mod aggregate;
mod config;
mod error;
mod loader;
mod output;
mod reports;
mod table;
mod types;
mod util;

use chrono::Datelike;
use clap::Parser;
use config::{Cli, Command, DashboardConfig};
use error::{DashboardError, Result};
use loader::{FileSource, InlineSource};
use output::TableStyle;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;
use table::{SortDirection, SortField, SortSpec, TableView, ViewState};
use tracing::{info, warn};
use types::VehicleRecord;

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn current_year() -> u32 {
    u32::try_from(chrono::Local::now().year()).unwrap_or(0)
}

fn reads_stdin(cfg: &DashboardConfig) -> bool {
    cfg.data_path.as_os_str() == "-"
}

/// `-` as the data path reads the CSV from stdin.
fn load(cfg: &DashboardConfig) -> Result<Vec<VehicleRecord>> {
    if reads_stdin(cfg) {
        let mut bytes = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .map_err(|e| DashboardError::SourceUnavailable(format!("stdin: {}", e)))?;
        return loader::load_records(&InlineSource::new("stdin", loader::decode_lossy(bytes)));
    }
    loader::load_records(&FileSource::new(&cfg.data_path))
}

fn print_reports(data: &[VehicleRecord], cfg: &DashboardConfig) {
    let report = reports::build(data, cfg.top_n, current_year());

    println!("{}\n", output::render_summary(&report.summary));

    println!("Top {} Manufacturers\n", cfg.top_n);
    output::preview_table_rows(&report.top_makes, cfg.top_n, cfg.style);

    println!("Top {} Counties\n", cfg.top_n);
    output::preview_table_rows(&report.top_counties, cfg.top_n, cfg.style);

    println!("Vehicle Type Distribution\n");
    output::preview_table_rows(&report.propulsion, usize::MAX, cfg.style);

    println!("EV Adoption by Model Year\n");
    output::preview_table_rows(&report.adoption, usize::MAX, cfg.style);
}

fn print_grouping(data: &[VehicleRecord], by: aggregate::GroupField, cfg: &DashboardConfig) {
    let rows = reports::generate_ranking(data, by, cfg.top_n);
    println!("Top {} by {}\n", cfg.top_n, by.title());
    output::preview_table_rows(&rows, cfg.top_n, cfg.style);
}

fn export_reports(data: &[VehicleRecord], cfg: &DashboardConfig, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let report = reports::build(data, cfg.top_n, current_year());
    output::write_csv(&out_dir.join("top_manufacturers.csv"), &report.top_makes)?;
    output::write_csv(&out_dir.join("top_counties.csv"), &report.top_counties)?;
    output::write_csv(&out_dir.join("vehicle_types.csv"), &report.propulsion)?;
    output::write_csv(&out_dir.join("adoption_trend.csv"), &report.adoption)?;
    output::write_json(&out_dir.join("summary.json"), &report.summary)?;
    info!(dir = %out_dir.display(), "reports exported");
    println!("Reports written to {}", out_dir.display());
    Ok(())
}

fn print_page(data: &[VehicleRecord], state: &ViewState, view: TableView, style: TableStyle) {
    let page = view.view(data, state);
    println!("{}\n", output::render_page(&page, style));
}

fn describe_state(state: &ViewState) -> String {
    let sort = match state.sort() {
        Some(SortSpec { field, direction }) => format!(
            "{} {}",
            field.name(),
            match direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            }
        ),
        None => "none".to_string(),
    };
    format!(
        "Search: \"{}\" | Sort: {} | Page: {}",
        state.search(),
        sort,
        state.page()
    )
}

/// Read one trimmed line after printing `prompt`. `None` once stdin is
/// closed.
fn prompt(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Session state for the interactive menu. The dataset is loaded once and
/// never changes afterwards.
struct App {
    cfg: DashboardConfig,
    data: Option<Vec<VehicleRecord>>,
    view_state: ViewState,
}

impl App {
    fn new(cfg: DashboardConfig) -> Self {
        Self {
            cfg,
            data: None,
            view_state: ViewState::new(),
        }
    }

    fn handle_load(&mut self) {
        if let Some(data) = &self.data {
            println!(
                "Dataset already loaded ({} vehicles).\n",
                util::format_int(data.len())
            );
            return;
        }
        match load(&self.cfg) {
            Ok(data) => {
                println!(
                    "Processing dataset... ({} vehicles loaded)\n",
                    util::format_int(data.len())
                );
                self.data = Some(data);
            }
            Err(e) => {
                tracing::error!(error = %e, "load failed");
                eprintln!("Failed to load data: {}\n", e);
            }
        }
    }

    fn loaded(&self) -> Option<&[VehicleRecord]> {
        let data = self.data.as_deref();
        if data.is_none() {
            println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        }
        data
    }

    fn handle_reports(&self) {
        if let Some(data) = self.loaded() {
            print_reports(data, &self.cfg);
        }
    }

    fn handle_export(&self) {
        let Some(data) = self.loaded() else { return };
        let dir = prompt("Output directory [.]: ")
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| ".".to_string());
        if let Err(e) = export_reports(data, &self.cfg, Path::new(&dir)) {
            eprintln!("Write error: {}\n", e);
        }
    }

    fn handle_browse(&mut self) {
        let Some(data) = self.data.as_deref() else {
            println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
            return;
        };
        let view = TableView::new(self.cfg.page_size);
        loop {
            print_page(data, &self.view_state, view, self.cfg.style);
            println!("{}", describe_state(&self.view_state));
            println!("[s <term>] search  [o <field>] sort  [n] next  [p] prev  [g <page>] go to  [b] back");
            let Some(line) = prompt("Enter choice: ") else { break };
            let (cmd, arg) = match line.split_once(' ') {
                Some((c, a)) => (c, a.trim()),
                None => (line.as_str(), ""),
            };
            match cmd {
                "s" => self.view_state.set_search(arg),
                "o" => match arg.parse::<SortField>() {
                    Ok(field) => self.view_state.request_sort(field),
                    Err(e) => println!("{}\n", e),
                },
                "n" => {
                    let page_count = view.view(data, &self.view_state).page_count;
                    self.view_state.next_page(page_count);
                }
                "p" => self.view_state.previous_page(),
                "g" => match arg.parse::<usize>() {
                    Ok(page) => {
                        let page_count = view.view(data, &self.view_state).page_count;
                        self.view_state.go_to_page(page.min(page_count));
                    }
                    Err(_) => println!("Invalid page number.\n"),
                },
                "b" => break,
                _ => println!("Invalid choice.\n"),
            }
        }
    }

    fn run(&mut self) {
        loop {
            println!("EV Registration Dashboard");
            println!("[1] Load the file");
            println!("[2] Show Reports");
            println!("[3] Browse Inventory");
            println!("[4] Export Reports");
            println!("[0] Exit\n");
            let Some(choice) = prompt("Enter choice: ") else { break };
            match choice.as_str() {
                "1" => self.handle_load(),
                "2" => self.handle_reports(),
                "3" => self.handle_browse(),
                "4" => self.handle_export(),
                "0" => {
                    println!("Exiting the program.");
                    break;
                }
                _ => println!("Invalid choice. Please enter 0-4.\n"),
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = DashboardConfig::from(&cli);
    let Some(command) = cli.command else {
        // The menu reads its choices from stdin, so the data can't come from there too.
        if reads_stdin(&cfg) {
            return Err(DashboardError::InvalidArgument(
                "--data - needs a subcommand; the interactive menu reads stdin".to_string(),
            ));
        }
        App::new(cfg).run();
        return Ok(());
    };

    let data = load(&cfg)?;
    if data.is_empty() {
        warn!(path = %cfg.data_path.display(), "dataset contains no usable rows");
    }
    match command {
        Command::Summary => print_reports(&data, &cfg),
        Command::Group { by } => print_grouping(&data, by, &cfg),
        Command::Mean { of } => println!(
            "Average {}: {} across {} vehicles",
            of.title(),
            util::format_number(aggregate::mean(&data, of), 1),
            util::format_int(aggregate::total(&data))
        ),
        Command::Table {
            search,
            sort,
            desc,
            page,
        } => {
            let mut state = ViewState::new();
            state.set_search(search);
            state.set_sort(sort.map(|field| SortSpec {
                field,
                direction: if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            }));
            state.go_to_page(page);
            print_page(&data, &state, TableView::new(cfg.page_size), cfg.style);
        }
        Command::Export { out_dir } => export_reports(&data, &cfg, &out_dir)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ DashboardError::SourceUnavailable(_)) => {
            eprintln!("Failed to load data: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
