use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One row of the registrations CSV as it appears on disk. Every column is
/// optional text; coercion happens in the loader.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "VIN (1-10)")]
    pub vin: Option<String>,
    #[serde(rename = "County")]
    pub county: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "Postal Code")]
    pub postal_code: Option<String>,
    #[serde(rename = "Model Year")]
    pub model_year: Option<String>,
    #[serde(rename = "Make")]
    pub make: Option<String>,
    #[serde(rename = "Model")]
    pub model: Option<String>,
    #[serde(rename = "Electric Vehicle Type")]
    pub ev_type: Option<String>,
    #[serde(rename = "Clean Alternative Fuel Vehicle (CAFV) Eligibility")]
    pub cafv_eligibility: Option<String>,
    #[serde(rename = "Electric Range")]
    pub electric_range: Option<String>,
    #[serde(rename = "Base MSRP")]
    pub base_msrp: Option<String>,
    #[serde(rename = "Legislative District")]
    pub legislative_district: Option<String>,
    #[serde(rename = "DOL Vehicle ID")]
    pub dol_vehicle_id: Option<String>,
    #[serde(rename = "Vehicle Location")]
    pub vehicle_location: Option<String>,
    #[serde(rename = "Electric Utility")]
    pub electric_utility: Option<String>,
    #[serde(rename = "2020 Census Tract")]
    pub census_tract: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropulsionType {
    BatteryElectric,
    PlugInHybrid,
    Other,
}

impl PropulsionType {
    /// Classify the free-text "Electric Vehicle Type" column.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Battery Electric Vehicle (BEV)" => PropulsionType::BatteryElectric,
            "Plug-in Hybrid Electric Vehicle (PHEV)" => PropulsionType::PlugInHybrid,
            _ => PropulsionType::Other,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            PropulsionType::BatteryElectric => "BEV",
            PropulsionType::PlugInHybrid => "PHEV",
            PropulsionType::Other => "Other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PropulsionType::BatteryElectric => "Full Electric (BEV)",
            PropulsionType::PlugInHybrid => "Plug-in Hybrid (PHEV)",
            PropulsionType::Other => "Other",
        }
    }
}

impl fmt::Display for PropulsionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A normalized registration. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    pub vin: String,
    pub county: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub model_year: u32,
    pub make: String,
    pub model: String,
    pub propulsion: PropulsionType,
    pub ev_type: String,
    pub cafv_eligibility: String,
    pub electric_range: u32,
    pub base_msrp: u64,
    pub legislative_district: String,
    pub dol_vehicle_id: String,
    pub vehicle_location: String,
    pub electric_utility: String,
    pub census_tract: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub label: String,
    #[serde(rename = "Vehicles")]
    #[tabled(rename = "Vehicles")]
    pub vehicles: usize,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearCountRow {
    #[serde(rename = "ModelYear")]
    #[tabled(rename = "ModelYear")]
    pub model_year: u32,
    #[serde(rename = "Vehicles")]
    #[tabled(rename = "Vehicles")]
    pub vehicles: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PropulsionShareRow {
    #[serde(rename = "Type")]
    #[tabled(rename = "Type")]
    pub propulsion: String,
    #[serde(rename = "Vehicles")]
    #[tabled(rename = "Vehicles")]
    pub vehicles: usize,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: f64,
}

/// Display row for the inventory table.
#[derive(Debug, Tabled, Clone)]
pub struct InventoryRow {
    #[tabled(rename = "VIN")]
    pub vin: String,
    #[tabled(rename = "Build")]
    pub build: String,
    #[tabled(rename = "Location")]
    pub location: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Max Range")]
    pub electric_range: u32,
}

impl From<&VehicleRecord> for InventoryRow {
    fn from(r: &VehicleRecord) -> Self {
        InventoryRow {
            vin: r.vin.chars().take(10).collect(),
            build: format!("{} {} ({})", r.make, r.model, r.model_year),
            location: format!("{}, {}", r.city, r.state),
            category: r.propulsion.short_name().to_string(),
            electric_range: r.electric_range,
        }
    }
}

/// A group label together with how many records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_vehicles: usize,
    pub bev_count: usize,
    pub bev_percentage: f64,
    pub avg_electric_range: f64,
    pub market_leader: Option<GroupCount>,
    pub top_county: Option<GroupCount>,
    pub top_county_percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn propulsion_labels_classify() {
        assert_eq!(
            PropulsionType::from_label("Battery Electric Vehicle (BEV)"),
            PropulsionType::BatteryElectric
        );
        assert_eq!(
            PropulsionType::from_label("Plug-in Hybrid Electric Vehicle (PHEV)"),
            PropulsionType::PlugInHybrid
        );
        assert_eq!(PropulsionType::from_label("Hydrogen"), PropulsionType::Other);
        assert_eq!(PropulsionType::from_label(""), PropulsionType::Other);
    }

    #[test]
    fn inventory_row_truncates_vin() {
        let r = VehicleRecord {
            vin: "5YJ3E1EBXKABCDEF".into(),
            county: "King".into(),
            city: "Seattle".into(),
            state: "WA".into(),
            postal_code: "98101".into(),
            model_year: 2019,
            make: "TESLA".into(),
            model: "MODEL 3".into(),
            propulsion: PropulsionType::BatteryElectric,
            ev_type: "Battery Electric Vehicle (BEV)".into(),
            cafv_eligibility: String::new(),
            electric_range: 220,
            base_msrp: 0,
            legislative_district: String::new(),
            dol_vehicle_id: String::new(),
            vehicle_location: String::new(),
            electric_utility: String::new(),
            census_tract: String::new(),
        };
        let row = InventoryRow::from(&r);
        assert_eq!(row.vin, "5YJ3E1EBXK");
        assert_eq!(row.build, "TESLA MODEL 3 (2019)");
        assert_eq!(row.location, "Seattle, WA");
        assert_eq!(row.category, "BEV");
    }
}
