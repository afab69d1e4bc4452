use crate::aggregate::{self, GroupField, NumericField};
use crate::types::{
    DashboardSummary, PropulsionShareRow, PropulsionType, RankingRow, VehicleRecord, YearCountRow,
};
use crate::util::percentage;
use tracing::debug;

/// Model years up to and including this one are left out of the adoption
/// trend.
pub const TREND_FIRST_YEAR_EXCLUSIVE: u32 = 2012;

/// Every table the dashboard shows, computed from one record slice.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub summary: DashboardSummary,
    pub top_makes: Vec<RankingRow>,
    pub top_counties: Vec<RankingRow>,
    pub adoption: Vec<YearCountRow>,
    pub propulsion: Vec<PropulsionShareRow>,
}

pub fn build(data: &[VehicleRecord], top_n: usize, through_year: u32) -> DashboardReport {
    let report = DashboardReport {
        summary: generate_summary(data),
        top_makes: generate_ranking(data, GroupField::Make, top_n),
        top_counties: generate_ranking(data, GroupField::County, top_n),
        adoption: generate_adoption_trend(data, through_year),
        propulsion: generate_propulsion_distribution(data),
    };
    debug!(
        total = report.summary.total_vehicles,
        makes = report.top_makes.len(),
        years = report.adoption.len(),
        "dashboard report built"
    );
    report
}

pub fn generate_summary(data: &[VehicleRecord]) -> DashboardSummary {
    let total_vehicles = aggregate::total(data);
    let bev_count = data
        .iter()
        .filter(|r| r.propulsion == PropulsionType::BatteryElectric)
        .count();
    let market_leader = aggregate::top(data, GroupField::Make);
    let top_county = aggregate::top(data, GroupField::County);
    let top_county_percentage = top_county
        .as_ref()
        .map(|c| percentage(c.count, total_vehicles))
        .unwrap_or(0.0);
    DashboardSummary {
        total_vehicles,
        bev_count,
        bev_percentage: percentage(bev_count, total_vehicles),
        avg_electric_range: aggregate::mean(data, NumericField::ElectricRange),
        market_leader,
        top_county,
        top_county_percentage,
    }
}

/// Top `n` values of `field`, ranked from 1, with their share of all records.
pub fn generate_ranking(data: &[VehicleRecord], field: GroupField, n: usize) -> Vec<RankingRow> {
    let total = aggregate::total(data);
    aggregate::top_n(data, field, n)
        .into_iter()
        .enumerate()
        .map(|(idx, g)| RankingRow {
            rank: idx + 1,
            share_pct: percentage(g.count, total),
            label: g.label,
            vehicles: g.count,
        })
        .collect()
}

pub fn generate_adoption_trend(data: &[VehicleRecord], through_year: u32) -> Vec<YearCountRow> {
    aggregate::counts_by_year(data, TREND_FIRST_YEAR_EXCLUSIVE, through_year)
        .into_iter()
        .map(|(model_year, vehicles)| YearCountRow {
            model_year,
            vehicles,
        })
        .collect()
}

pub fn generate_propulsion_distribution(data: &[VehicleRecord]) -> Vec<PropulsionShareRow> {
    let total = aggregate::total(data);
    let mut counts: Vec<(PropulsionType, usize)> = [
        PropulsionType::BatteryElectric,
        PropulsionType::PlugInHybrid,
        PropulsionType::Other,
    ]
    .into_iter()
    .map(|t| (t, data.iter().filter(|r| r.propulsion == t).count()))
    .filter(|(_, n)| *n > 0)
    .collect();
    // Stable, so equal counts stay in BEV, PHEV, Other order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(t, vehicles)| PropulsionShareRow {
            propulsion: t.display_name().to_string(),
            vehicles,
            share_pct: percentage(vehicles, total),
        })
        .collect()
}
