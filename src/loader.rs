use crate::error::{DashboardError, Result};
use crate::types::{PropulsionType, RawRow, VehicleRecord};
use crate::util::{parse_u32_or_zero, parse_u64_or_zero, text};
use csv::ReaderBuilder;
use std::path::PathBuf;
use tracing::{debug, info, trace};

/// Something that can hand over the raw CSV text, or explain why it can't.
pub trait DataSource {
    fn read_text(&self) -> std::result::Result<String, String>;

    /// Human readable origin, used in log lines.
    fn describe(&self) -> String;
}

/// CSV file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn read_text(&self) -> std::result::Result<String, String> {
        let bytes =
            std::fs::read(&self.path).map_err(|e| format!("{}: {}", self.path.display(), e))?;
        Ok(decode_lossy(bytes))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Invalid UTF-8 sequences become U+FFFD so one bad byte only mangles the
/// field it sits in.
pub fn decode_lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            let bytes = e.into_bytes();
            debug!(bytes = bytes.len(), "source is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }
}

/// CSV text that is already resident in memory, e.g. piped in on stdin.
#[derive(Debug, Clone)]
pub struct InlineSource {
    name: String,
    text: String,
}

impl InlineSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl DataSource for InlineSource {
    fn read_text(&self) -> std::result::Result<String, String> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Fetch the CSV text from `source` and normalize it.
///
/// The only error is [`DashboardError::SourceUnavailable`]; anything wrong
/// inside individual rows is recovered by [`normalize`].
pub fn load_records(source: &dyn DataSource) -> Result<Vec<VehicleRecord>> {
    let origin = source.describe();
    debug!(%origin, "reading data source");
    let raw = source
        .read_text()
        .map_err(DashboardError::SourceUnavailable)?;
    let records = normalize(&raw);
    info!(%origin, records = records.len(), "dataset loaded");
    Ok(records)
}

/// Turn CSV text with a header row into records, keeping source order.
///
/// Numeric columns that are missing or non-numeric become 0. Rows without an
/// identifier, and rows the CSV reader can't decode at all, are skipped.
pub fn normalize(raw: &str) -> Vec<VehicleRecord> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut records = Vec::new();
    for (line, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                trace!(line = line + 2, error = %e, "skipping undecodable row");
                continue;
            }
        };
        match to_record(row) {
            Some(record) => records.push(record),
            None => trace!(line = line + 2, "skipping row without identifier"),
        }
    }
    records
}

fn to_record(row: RawRow) -> Option<VehicleRecord> {
    let vin = text(row.vin);
    if vin.is_empty() {
        return None;
    }
    let ev_type = text(row.ev_type);
    Some(VehicleRecord {
        vin,
        county: text(row.county),
        city: text(row.city),
        state: text(row.state),
        postal_code: text(row.postal_code),
        model_year: parse_u32_or_zero(row.model_year.as_deref()),
        make: text(row.make),
        model: text(row.model),
        propulsion: PropulsionType::from_label(&ev_type),
        ev_type,
        cafv_eligibility: text(row.cafv_eligibility),
        electric_range: parse_u32_or_zero(row.electric_range.as_deref()),
        base_msrp: parse_u64_or_zero(row.base_msrp.as_deref()),
        legislative_district: text(row.legislative_district),
        dol_vehicle_id: text(row.dol_vehicle_id),
        vehicle_location: text(row.vehicle_location),
        electric_utility: text(row.electric_utility),
        census_tract: text(row.census_tract),
    })
}
