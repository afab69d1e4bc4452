// Summary statistics over the loaded records. Everything here is a pure
// function of the input slice.
use crate::error::DashboardError;
use crate::types::{GroupCount, VehicleRecord};
use crate::util::round1;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Categorical columns that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Make,
    Model,
    County,
    City,
    State,
    ModelYear,
    Propulsion,
    CafvEligibility,
    ElectricUtility,
}

impl GroupField {
    pub fn key(&self, r: &VehicleRecord) -> String {
        match self {
            GroupField::Make => r.make.clone(),
            GroupField::Model => r.model.clone(),
            GroupField::County => r.county.clone(),
            GroupField::City => r.city.clone(),
            GroupField::State => r.state.clone(),
            GroupField::ModelYear => r.model_year.to_string(),
            GroupField::Propulsion => r.propulsion.short_name().to_string(),
            GroupField::CafvEligibility => r.cafv_eligibility.clone(),
            GroupField::ElectricUtility => r.electric_utility.clone(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GroupField::Make => "Make",
            GroupField::Model => "Model",
            GroupField::County => "County",
            GroupField::City => "City",
            GroupField::State => "State",
            GroupField::ModelYear => "Model Year",
            GroupField::Propulsion => "Vehicle Type",
            GroupField::CafvEligibility => "CAFV Eligibility",
            GroupField::ElectricUtility => "Electric Utility",
        }
    }
}

impl FromStr for GroupField {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "make" => Ok(GroupField::Make),
            "model" => Ok(GroupField::Model),
            "county" => Ok(GroupField::County),
            "city" => Ok(GroupField::City),
            "state" => Ok(GroupField::State),
            "model_year" | "year" => Ok(GroupField::ModelYear),
            "propulsion" | "type" | "ev_type" => Ok(GroupField::Propulsion),
            "cafv" | "cafv_eligibility" => Ok(GroupField::CafvEligibility),
            "utility" | "electric_utility" => Ok(GroupField::ElectricUtility),
            other => Err(DashboardError::InvalidArgument(format!(
                "unknown group field '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    ModelYear,
    ElectricRange,
    BaseMsrp,
}

impl FromStr for NumericField {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "model_year" | "year" => Ok(NumericField::ModelYear),
            "range" | "electric_range" => Ok(NumericField::ElectricRange),
            "msrp" | "base_msrp" => Ok(NumericField::BaseMsrp),
            other => Err(DashboardError::InvalidArgument(format!(
                "unknown numeric field '{}'",
                other
            ))),
        }
    }
}

impl NumericField {
    pub fn title(&self) -> &'static str {
        match self {
            NumericField::ModelYear => "Model Year",
            NumericField::ElectricRange => "Electric Range",
            NumericField::BaseMsrp => "Base MSRP",
        }
    }

    pub fn value(&self, r: &VehicleRecord) -> f64 {
        match self {
            NumericField::ModelYear => r.model_year as f64,
            NumericField::ElectricRange => r.electric_range as f64,
            NumericField::BaseMsrp => r.base_msrp as f64,
        }
    }
}

pub fn total(records: &[VehicleRecord]) -> usize {
    records.len()
}

pub fn grouped_counts(records: &[VehicleRecord], field: GroupField) -> HashMap<String, usize> {
    let mut map: HashMap<String, usize> = HashMap::new();
    for r in records {
        *map.entry(field.key(r)).or_default() += 1;
    }
    map
}

/// Order grouped counts by count descending, then by label.
pub fn ranked(counts: HashMap<String, usize>) -> Vec<GroupCount> {
    let mut rows: Vec<GroupCount> = counts
        .into_iter()
        .map(|(label, count)| GroupCount { label, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    rows
}

pub fn top_n(records: &[VehicleRecord], field: GroupField, n: usize) -> Vec<GroupCount> {
    let mut rows = ranked(grouped_counts(records, field));
    rows.truncate(n);
    rows
}

/// The single most common value of `field`, or `None` for an empty slice.
pub fn top(records: &[VehicleRecord], field: GroupField) -> Option<GroupCount> {
    top_n(records, field, 1).into_iter().next()
}

/// Mean of a numeric column, one decimal place; 0 when there are no records.
pub fn mean(records: &[VehicleRecord], field: NumericField) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let sum: f64 = records.iter().map(|r| field.value(r)).sum();
    round1(sum / records.len() as f64)
}

/// Registrations per model year for `after < year <= through`, oldest first.
pub fn counts_by_year(records: &[VehicleRecord], after: u32, through: u32) -> Vec<(u32, usize)> {
    let mut years: BTreeMap<u32, usize> = BTreeMap::new();
    for r in records {
        if r.model_year > after && r.model_year <= through {
            *years.entry(r.model_year).or_default() += 1;
        }
    }
    years.into_iter().collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::PropulsionType;

    pub(crate) fn record(vin: &str, make: &str, model: &str, city: &str, range: u32) -> VehicleRecord {
        VehicleRecord {
            vin: vin.into(),
            county: "King".into(),
            city: city.into(),
            state: "WA".into(),
            postal_code: String::new(),
            model_year: 2020,
            make: make.into(),
            model: model.into(),
            propulsion: PropulsionType::BatteryElectric,
            ev_type: "Battery Electric Vehicle (BEV)".into(),
            cafv_eligibility: String::new(),
            electric_range: range,
            base_msrp: 0,
            legislative_district: String::new(),
            dol_vehicle_id: String::new(),
            vehicle_location: String::new(),
            electric_utility: String::new(),
            census_tract: String::new(),
        }
    }

    fn sample() -> Vec<VehicleRecord> {
        vec![
            record("A", "TESLA", "MODEL 3", "Seattle", 250),
            record("B", "NISSAN", "LEAF", "Tacoma", 150),
            record("C", "TESLA", "MODEL Y", "Bellevue", 300),
            record("D", "KIA", "NIRO", "Seattle", 239),
            record("E", "NISSAN", "LEAF", "Everett", 0),
        ]
    }

    #[test]
    fn total_is_length() {
        assert_eq!(total(&sample()), 5);
        assert_eq!(total(&[]), 0);
    }

    #[test]
    fn grouped_counts_sum_to_total() {
        let data = sample();
        for field in [GroupField::Make, GroupField::City, GroupField::County, GroupField::Propulsion] {
            let counts = grouped_counts(&data, field);
            assert_eq!(counts.values().sum::<usize>(), total(&data));
        }
        assert_eq!(grouped_counts(&data, GroupField::Make)["TESLA"], 2);
    }

    #[test]
    fn top_n_breaks_ties_by_label() {
        let rows = top_n(&sample(), GroupField::Make, 2);
        assert_eq!(
            rows,
            vec![
                GroupCount { label: "NISSAN".into(), count: 2 },
                GroupCount { label: "TESLA".into(), count: 2 },
            ]
        );
        assert_eq!(top_n(&sample(), GroupField::Make, 10).len(), 3);
    }

    #[test]
    fn top_of_empty_is_none() {
        assert_eq!(top(&[], GroupField::Make), None);
    }

    #[test]
    fn mean_rounds_and_handles_empty() {
        assert_eq!(mean(&sample(), NumericField::ElectricRange), 187.8);
        assert_eq!(mean(&[], NumericField::ElectricRange), 0.0);
    }

    #[test]
    fn mean_over_year_and_msrp() {
        let mut data = sample();
        data[3].model_year = 2023;
        assert_eq!(mean(&data, NumericField::ModelYear), 2020.6);

        data[0].base_msrp = 69_900;
        data[2].base_msrp = 30_000;
        assert_eq!(mean(&data[..1], NumericField::BaseMsrp), 69_900.0);
        assert_eq!(mean(&data[..3], NumericField::BaseMsrp), 33_300.0);
        // Unknown prices count as 0 rather than being skipped.
        assert_eq!(mean(&data, NumericField::BaseMsrp), 19_980.0);
    }

    #[test]
    fn year_window_is_half_open() {
        let mut data = sample();
        data[0].model_year = 2012;
        data[1].model_year = 2013;
        data[2].model_year = 2030;
        let years = counts_by_year(&data, 2012, 2026);
        assert_eq!(years, vec![(2013, 1), (2020, 2)]);
    }

    #[test]
    fn group_field_names_parse() {
        assert_eq!("make".parse::<GroupField>().unwrap(), GroupField::Make);
        assert_eq!("Model Year".parse::<GroupField>().unwrap(), GroupField::ModelYear);
        assert!("colour".parse::<GroupField>().is_err());
        assert_eq!("msrp".parse::<NumericField>().unwrap(), NumericField::BaseMsrp);
        assert!("weight".parse::<NumericField>().is_err());
    }
}
