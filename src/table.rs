// Filter, sort and paginate the record list for the inventory table.
//
// The pipeline is recomputed from scratch on every read; `ViewState` is the
// only thing callers mutate.
use crate::error::DashboardError;
use crate::types::VehicleRecord;
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::trace;

pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Columns the table can be ordered by, each with a typed comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Vin,
    Make,
    Model,
    City,
    County,
    ModelYear,
    Propulsion,
    ElectricRange,
    BaseMsrp,
}

impl SortField {
    pub fn compare(&self, a: &VehicleRecord, b: &VehicleRecord) -> Ordering {
        match self {
            SortField::Vin => a.vin.cmp(&b.vin),
            SortField::Make => a.make.cmp(&b.make),
            SortField::Model => a.model.cmp(&b.model),
            SortField::City => a.city.cmp(&b.city),
            SortField::County => a.county.cmp(&b.county),
            SortField::ModelYear => a.model_year.cmp(&b.model_year),
            SortField::Propulsion => a.ev_type.cmp(&b.ev_type),
            SortField::ElectricRange => a.electric_range.cmp(&b.electric_range),
            SortField::BaseMsrp => a.base_msrp.cmp(&b.base_msrp),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SortField::Vin => "vin",
            SortField::Make => "make",
            SortField::Model => "model",
            SortField::City => "city",
            SortField::County => "county",
            SortField::ModelYear => "model_year",
            SortField::Propulsion => "type",
            SortField::ElectricRange => "range",
            SortField::BaseMsrp => "msrp",
        }
    }
}

impl FromStr for SortField {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "vin" => Ok(SortField::Vin),
            "make" | "build" => Ok(SortField::Make),
            "model" => Ok(SortField::Model),
            "city" | "location" => Ok(SortField::City),
            "county" => Ok(SortField::County),
            "model_year" | "year" => Ok(SortField::ModelYear),
            "type" | "category" | "ev_type" => Ok(SortField::Propulsion),
            "range" | "electric_range" => Ok(SortField::ElectricRange),
            "msrp" | "base_msrp" => Ok(SortField::BaseMsrp),
            other => Err(DashboardError::InvalidArgument(format!(
                "unknown sort field '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Search, sort and page selection for the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    page: usize,
    search: String,
    sort: Option<SortSpec>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
            sort: None,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    /// Replace the search term. Always jumps back to the first page.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    /// Click on a column header: same field flips the direction, a new field
    /// starts ascending. The page is left alone.
    pub fn request_sort(&mut self, field: SortField) {
        let direction = match self.sort {
            Some(SortSpec {
                field: current,
                direction: SortDirection::Ascending,
            }) if current == field => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortSpec { field, direction });
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    /// Pages below 1 are treated as 1; the upper bound is applied when the
    /// view is computed.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self, page_count: usize) {
        self.page = (self.page + 1).min(page_count.max(1));
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }
}

/// One computed page plus what the pager needs to draw itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<'a> {
    pub rows: Vec<&'a VehicleRecord>,
    pub filtered_count: usize,
    pub page: usize,
    pub page_count: usize,
    /// 1-based index of the first visible row, 0 when nothing is visible.
    pub first_index: usize,
    /// 1-based index of the last visible row, 0 when nothing is visible.
    pub last_index: usize,
}

impl PageResult<'_> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableView {
    page_size: usize,
}

impl Default for TableView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TableView {
    /// A page size of 0 is bumped to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn view<'a>(&self, records: &'a [VehicleRecord], state: &ViewState) -> PageResult<'a> {
        let mut rows = filter(records, &state.search);
        if let Some(spec) = state.sort {
            sort(&mut rows, spec);
        }

        let filtered_count = rows.len();
        let page_count = filtered_count.div_ceil(self.page_size).max(1);
        let page = state.page.clamp(1, page_count);
        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(filtered_count);
        trace!(
            search = %state.search,
            filtered_count,
            page,
            page_count,
            "table view computed"
        );

        let visible: Vec<&VehicleRecord> = rows.drain(start..end).collect();
        let (first_index, last_index) = if visible.is_empty() {
            (0, 0)
        } else {
            (start + 1, end)
        };
        PageResult {
            rows: visible,
            filtered_count,
            page,
            page_count,
            first_index,
            last_index,
        }
    }
}

/// Records whose make, model or city contains `term`, ignoring case.
/// An empty term keeps everything.
pub fn filter<'a>(records: &'a [VehicleRecord], term: &str) -> Vec<&'a VehicleRecord> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.make.to_lowercase().contains(&needle)
                || r.model.to_lowercase().contains(&needle)
                || r.city.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable sort; descending reverses the comparator so equal keys keep their
/// incoming order either way.
pub fn sort(rows: &mut [&VehicleRecord], spec: SortSpec) {
    rows.sort_by(|a, b| {
        let ord = spec.field.compare(a, b);
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}
