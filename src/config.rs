use crate::aggregate::{GroupField, NumericField};
use crate::output::TableStyle;
use crate::table::{SortField, DEFAULT_PAGE_SIZE};
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data/Electric_Vehicle_Population_Data.csv";
pub const DEFAULT_TOP_N: usize = 6;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ev-dashboard",
    version,
    about = "Summaries and a browsable table over electric vehicle registration data"
)]
pub struct Cli {
    /// Registrations CSV (header row required)
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Rows per table page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub page_size: usize,

    /// Length of the ranking tables
    #[arg(long = "top", default_value_t = DEFAULT_TOP_N, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub top_n: usize,

    /// Border style for printed tables
    #[arg(long, value_enum, default_value_t = TableStyle::Markdown)]
    pub style: TableStyle,

    /// Log filter when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the summary cards and every report table
    Summary,
    /// Rank the values of one column by how often they occur
    Group {
        /// Column to group on (make, county, city, year, type, ...)
        #[arg(long)]
        by: GroupField,
    },
    /// Average of a numeric column (range, msrp, year)
    Mean {
        #[arg(long)]
        of: NumericField,
    },
    /// Print one page of the inventory table
    Table {
        /// Case-insensitive match against make, model and city
        #[arg(long, default_value = "")]
        search: String,
        /// Column to sort by (vin, make, model, city, county, year, type, range, msrp)
        #[arg(long)]
        sort: Option<SortField>,
        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// 1-based page number; values past the end show the last page
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Write every report table as CSV plus summary.json
    Export {
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },
}

/// Settings shared by every command once the command line is parsed.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub page_size: usize,
    pub top_n: usize,
    pub style: TableStyle,
}

impl From<&Cli> for DashboardConfig {
    fn from(cli: &Cli) -> Self {
        DashboardConfig {
            data_path: cli.data.clone(),
            page_size: cli.page_size,
            top_n: cli.top_n,
            style: cli.style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["ev-dashboard"]).unwrap();
        let cfg = DashboardConfig::from(&cli);
        assert_eq!(cfg.page_size, 8);
        assert_eq!(cfg.top_n, 6);
        assert_eq!(cfg.style, TableStyle::Markdown);
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert!(cli.command.is_none());
    }

    #[test]
    fn table_subcommand_parses_sort() {
        let cli = Cli::try_parse_from([
            "ev-dashboard", "--page-size", "5", "table", "--search", "tesla", "--sort", "range",
            "--desc", "--page", "2",
        ])
        .unwrap();
        assert_eq!(cli.page_size, 5);
        match cli.command {
            Some(Command::Table { search, sort, desc, page }) => {
                assert_eq!(search, "tesla");
                assert_eq!(sort, Some(SortField::ElectricRange));
                assert!(desc);
                assert_eq!(page, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_page_size_and_unknown_fields() {
        assert!(Cli::try_parse_from(["ev-dashboard", "--page-size", "0"]).is_err());
        assert!(Cli::try_parse_from(["ev-dashboard", "table", "--sort", "colour"]).is_err());
        assert!(Cli::try_parse_from(["ev-dashboard", "group", "--by", "colour"]).is_err());
        assert!(Cli::try_parse_from(["ev-dashboard", "mean", "--of", "weight"]).is_err());
    }

    #[test]
    fn counts_must_be_positive_integers() {
        let cli = Cli::try_parse_from(["ev-dashboard", "--top", "3", "--page-size", "1"]).unwrap();
        assert_eq!((cli.top_n, cli.page_size), (3, 1));
        assert!(Cli::try_parse_from(["ev-dashboard", "--top", "0"]).is_err());
        assert!(Cli::try_parse_from(["ev-dashboard", "--page-size", "abc"]).is_err());
        assert!(Cli::try_parse_from(["ev-dashboard", "--top", "-2"]).is_err());
    }
}
