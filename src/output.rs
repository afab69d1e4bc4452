use crate::error::Result;
use crate::table::PageResult;
use crate::types::{DashboardSummary, InventoryRow};
use crate::util::{format_int, format_number};
use clap::ValueEnum;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

/// Border style for every terminal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TableStyle {
    #[default]
    Markdown,
    Rounded,
    Ascii,
    Modern,
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = rows.len(), "csv written");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    debug!(path = %path.display(), "json written");
    Ok(())
}

pub fn render_table<T: Tabled>(rows: &[T], style: TableStyle) -> String
where
    T: Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut table = Table::new(rows.iter().cloned());
    match style {
        TableStyle::Markdown => table.with(Style::markdown()),
        TableStyle::Rounded => table.with(Style::rounded()),
        TableStyle::Ascii => table.with(Style::ascii()),
        TableStyle::Modern => table.with(Style::modern()),
    };
    table.to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize, style: TableStyle)
where
    T: Tabled + Clone,
{
    let end = rows.len().min(max_rows);
    println!("{}\n", render_table(&rows[..end], style));
}

/// The four headline cards as plain text lines.
pub fn render_summary(s: &DashboardSummary) -> String {
    let leader = match &s.market_leader {
        Some(g) => format!("{} ({} units)", g.label, format_int(g.count)),
        None => "N/A".to_string(),
    };
    let county = match &s.top_county {
        Some(g) => format!("{} ({}% of fleet)", g.label, format_number(s.top_county_percentage, 1)),
        None => "N/A".to_string(),
    };
    [
        format!("Total Population:    {}", format_int(s.total_vehicles)),
        format!("Market Purity (BEV): {}%", format_number(s.bev_percentage, 1)),
        format!("Average Range:       {} mi", format_number(s.avg_electric_range, 1)),
        format!("Market Leader:       {}", leader),
        format!("Top County:          {}", county),
    ]
    .join("\n")
}

/// One table page followed by the "Displaying a - b of n" pager line.
pub fn render_page(page: &PageResult<'_>, style: TableStyle) -> String {
    let rows: Vec<InventoryRow> = page.rows.iter().map(|r| InventoryRow::from(*r)).collect();
    let body = if rows.is_empty() {
        "No matching records found".to_string()
    } else {
        render_table(&rows, style)
    };
    let prev = if page.has_previous() { "< " } else { "" };
    let next = if page.has_next() { " >" } else { "" };
    format!(
        "{}\n\nDisplaying {} - {} of {} entries | {}page {} of {}{}",
        body,
        format_int(page.first_index),
        format_int(page.last_index),
        format_int(page.filtered_count),
        prev,
        page.page,
        page.page_count,
        next
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::record;
    use crate::table::{TableView, ViewState};
    use crate::types::{GroupCount, YearCountRow};

    #[test]
    fn empty_table_renders_placeholder() {
        let rows: Vec<YearCountRow> = Vec::new();
        assert_eq!(render_table(&rows, TableStyle::Markdown), "(no rows)");
    }

    #[test]
    fn markdown_table_has_headers() {
        let rows = vec![YearCountRow {
            model_year: 2020,
            vehicles: 3,
        }];
        let out = render_table(&rows, TableStyle::Markdown);
        assert!(out.contains("ModelYear"));
        assert!(out.contains("2020"));
        assert!(out.starts_with('|'));
    }

    #[test]
    fn page_footer_reports_range() {
        let data = vec![
            record("T1", "Tesla", "Model 3", "Seattle", 250),
            record("N1", "Nissan", "Leaf", "Tacoma", 150),
        ];
        let page = TableView::new(1).view(&data, &ViewState::new());
        let out = render_page(&page, TableStyle::Ascii);
        assert!(out.contains("T1"));
        assert!(out.ends_with("Displaying 1 - 1 of 2 entries | page 1 of 2 >"));
    }

    #[test]
    fn empty_page_renders_message() {
        let page = TableView::default().view(&[], &ViewState::new());
        let out = render_page(&page, TableStyle::Markdown);
        assert!(out.starts_with("No matching records found"));
    }

    #[test]
    fn summary_falls_back_to_na() {
        let s = DashboardSummary {
            total_vehicles: 0,
            bev_count: 0,
            bev_percentage: 0.0,
            avg_electric_range: 0.0,
            market_leader: None,
            top_county: None,
            top_county_percentage: 0.0,
        };
        let out = render_summary(&s);
        assert!(out.contains("Market Leader:       N/A"));
        assert!(out.contains("Market Purity (BEV): 0.0%"));

        let s = DashboardSummary {
            market_leader: Some(GroupCount {
                label: "TESLA".into(),
                count: 1200,
            }),
            total_vehicles: 2000,
            ..s
        };
        assert!(render_summary(&s).contains("TESLA (1,200 units)"));
    }

    #[test]
    fn writes_csv_and_json() {
        let dir = std::env::temp_dir().join(format!("ev_dashboard_out_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let rows = vec![YearCountRow {
            model_year: 2021,
            vehicles: 7,
        }];
        write_csv(&dir.join("years.csv"), &rows).unwrap();
        write_json(&dir.join("years.json"), &rows).unwrap();
        let csv_text = std::fs::read_to_string(dir.join("years.csv")).unwrap();
        assert_eq!(csv_text, "ModelYear,Vehicles\n2021,7\n");
        let json_text = std::fs::read_to_string(dir.join("years.json")).unwrap();
        assert!(json_text.contains("\"ModelYear\": 2021"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
