use fare_core::FlightQuery;

/// Per-row schedule fields, each read with its own positional query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    FlightNumbers,
    Stops,
    PlaneChange,
    DepartureTime,
    DepartureMeridiem,
    ArrivalTime,
    ArrivalMeridiem,
    Duration,
}

/// Fields read once per fare tier slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierField {
    Price,
    SeatsLeft,
}

/// Where things live on one version of the results page.
///
/// Row and tier indexes are 1-based, matching CSS `:nth-child`.
pub trait ResultsLayout: Send + Sync {
    fn results_url(&self, query: &FlightQuery) -> String;

    /// Submit control of the interstitial search form.
    fn search_submit(&self) -> &str;

    /// Matches every result row container.
    fn row_container(&self) -> &str;

    fn field(&self, row: usize, field: RowField) -> String;

    fn tier(&self, row: usize, slot: usize, field: TierField) -> String;
}

const ROWS: &str = r#"div[class*="resultGrid"] > div[class*="flightRow"]"#;
const SEARCH_SUBMIT: &str = r#"form[class*="bookFlightForm"] button[type="submit"]"#;

/// Grid-based results page: one `flightRow` per result, fare tiers as the
/// children of a `fareGrid` inside the row.
#[derive(Debug, Clone)]
pub struct GridLayout {
    base_url: String,
}

impl GridLayout {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn row(&self, row: usize) -> String {
        format!("{ROWS}:nth-child({row})")
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new("https://www.united.com/en/us/fsr/choose-flights")
    }
}

impl ResultsLayout for GridLayout {
    fn results_url(&self, query: &FlightQuery) -> String {
        format!(
            "{base}?f={from}&t={to}&d={date}&tt=1&sc=7&px=1&taxng=1&newHP=True&clm=7&st=bestmatches&tqp=R",
            base = self.base_url,
            from = query.origin,
            to = query.destination,
            date = query.date_label(),
        )
    }

    fn search_submit(&self) -> &str {
        SEARCH_SUBMIT
    }

    fn row_container(&self) -> &str {
        ROWS
    }

    fn field(&self, row: usize, field: RowField) -> String {
        let class = match field {
            RowField::FlightNumbers => "flightNumber",
            RowField::Stops => "stopCount",
            RowField::PlaneChange => "planeChange",
            RowField::DepartureTime => "departTime",
            RowField::DepartureMeridiem => "departMeridiem",
            RowField::ArrivalTime => "arriveTime",
            RowField::ArrivalMeridiem => "arriveMeridiem",
            RowField::Duration => "flightDuration",
        };
        format!(r#"{} [class*="{class}"]"#, self.row(row))
    }

    fn tier(&self, row: usize, slot: usize, field: TierField) -> String {
        let class = match field {
            TierField::Price => "fareAmount",
            TierField::SeatsLeft => "seatsLeft",
        };
        format!(
            r#"{} [class*="fareGrid"] > div:nth-child({slot}) [class*="{class}"]"#,
            self.row(row)
        )
    }
}
