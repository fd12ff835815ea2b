use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use ulid::Ulid;

use crate::ledger::date::{format_iso_date, parse_input_date, parse_record_date};
use crate::ledger::geo::{GeoPoint, legacy_coord};
use crate::{ClientError, ClientResult};

pub const FALLBACK_CATEGORY_COLOR: &str = "#cccccc";

/// Record identifier. Records written by the browser app carry millisecond
/// timestamps; new records get a ULID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Legacy(u64),
    Generated(String),
}

impl RecordId {
    pub fn generate() -> Self {
        Self::Generated(format!("rec_{}", Ulid::new()))
    }

    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<u64>() {
            Ok(number) => Self::Legacy(number),
            Err(_) => Self::Generated(trimmed.to_string()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy(number) => write!(f, "{number}"),
            Self::Generated(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownCategory {
    Fuel,
    Toll,
    Maintenance,
    Meal,
    Other,
}

impl KnownCategory {
    pub const ALL: [Self; 5] = [
        Self::Fuel,
        Self::Toll,
        Self::Maintenance,
        Self::Meal,
        Self::Other,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fuel => "Fuel",
            Self::Toll => "Toll",
            Self::Maintenance => "Maintenance",
            Self::Meal => "Meal",
            Self::Other => "Other",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Fuel => "#ffcd56",
            Self::Toll => "#4bc0c0",
            Self::Maintenance => "#ff6384",
            Self::Meal => "#36a2eb",
            Self::Other => "#9966ff",
        }
    }

    /// Matches canonical labels and the Portuguese labels of older data.
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "fuel" | "gas" | "gasoline" | "gasolina" | "combustível" | "combustivel" => {
                Some(Self::Fuel)
            }
            "toll" | "pedágio" | "pedagio" => Some(Self::Toll),
            "maintenance" | "manutenção" | "manutencao" => Some(Self::Maintenance),
            "meal" | "food" | "refeição" | "refeicao" => Some(Self::Meal),
            "other" | "others" | "outros" | "outro" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Expense category label. The set is open: unknown labels are kept as typed
/// and render with [`FALLBACK_CATEGORY_COLOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseCategory(String);

impl ExpenseCategory {
    /// Normalizes known aliases to their canonical label.
    pub fn normalized(value: &str) -> Self {
        match KnownCategory::from_label(value) {
            Some(known) => Self(known.label().to_string()),
            None => Self(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn known(&self) -> Option<KnownCategory> {
        KnownCategory::from_label(&self.0)
    }

    pub fn color(&self) -> &'static str {
        self.known()
            .map_or(FALLBACK_CATEGORY_COLOR, KnownCategory::color)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    pub id: RecordId,
    #[serde(rename = "data", default)]
    pub date: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "cliente", default)]
    pub client_name: String,
    #[serde(rename = "destino", default)]
    pub destination: String,
    #[serde(rename = "kmPercorrido", default)]
    pub distance_km: Option<f64>,
    #[serde(rename = "coordInicio", default, with = "legacy_coord")]
    pub start_coord: Option<GeoPoint>,
    #[serde(rename = "coordFim", default, with = "legacy_coord")]
    pub end_coord: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: RecordId,
    #[serde(rename = "data", default)]
    pub date: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "categoria")]
    pub category: ExpenseCategory,
    #[serde(rename = "descricao", default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub enum TripRecord {
    #[serde(rename = "receita")]
    Revenue(RevenueRecord),
    #[serde(rename = "despesa")]
    Expense(ExpenseRecord),
}

/// Records decoded from a saved or exported JSON array.
#[derive(Debug, Default)]
pub struct DecodedRecords {
    pub records: Vec<TripRecord>,
    pub skipped: usize,
}

/// Decodes each array entry on its own so one malformed record cannot hide
/// the rest. Fails only when `raw` is not a JSON array.
pub fn decode_record_array(raw: &str) -> serde_json::Result<DecodedRecords> {
    let entries = serde_json::from_str::<Vec<Value>>(raw)?;
    let mut decoded = DecodedRecords::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<TripRecord>(entry) {
            Ok(record) => decoded.records.push(record),
            Err(error) => {
                warn!(index, %error, "skipping malformed record");
                decoded.skipped += 1;
            }
        }
    }
    Ok(decoded)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Revenue,
    Expense,
}

impl RecordKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl TripRecord {
    pub fn id(&self) -> &RecordId {
        match self {
            Self::Revenue(record) => &record.id,
            Self::Expense(record) => &record.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Revenue(_) => RecordKind::Revenue,
            Self::Expense(_) => RecordKind::Expense,
        }
    }

    pub fn raw_date(&self) -> &str {
        match self {
            Self::Revenue(record) => &record.date,
            Self::Expense(record) => &record.date,
        }
    }

    /// `None` for malformed dates carried over from older data.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_record_date(self.raw_date())
    }

    pub fn amount(&self) -> f64 {
        match self {
            Self::Revenue(record) => record.amount,
            Self::Expense(record) => record.amount,
        }
    }

    pub fn distance_km(&self) -> f64 {
        match self {
            Self::Revenue(record) => record.distance_km.unwrap_or(0.0),
            Self::Expense(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RevenueInput {
    pub client_name: String,
    pub destination: String,
    pub date: String,
    pub amount: f64,
    pub distance_km: Option<f64>,
    pub start_coord: Option<GeoPoint>,
    pub end_coord: Option<GeoPoint>,
}

impl RevenueInput {
    pub fn into_record(self) -> ClientResult<TripRecord> {
        let client_name = required_text(&self.client_name, "client")?;
        let destination = required_text(&self.destination, "destination")?;
        let date = parse_input_date(&self.date, "date")?;
        let amount = valid_amount(self.amount, "amount")?;
        let distance_km = match self.distance_km {
            Some(value) => Some(valid_amount(value, "km")?),
            None => None,
        };

        Ok(TripRecord::Revenue(RevenueRecord {
            id: RecordId::generate(),
            date: format_iso_date(&date),
            amount,
            client_name,
            destination,
            distance_km: Some(distance_km.unwrap_or(0.0)),
            start_coord: self.start_coord,
            end_coord: self.end_coord,
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseInput {
    pub category: String,
    pub description: String,
    pub date: String,
    pub amount: f64,
}

impl ExpenseInput {
    pub fn into_record(self) -> ClientResult<TripRecord> {
        let category = required_text(&self.category, "category")?;
        let date = parse_input_date(&self.date, "date")?;
        let amount = valid_amount(self.amount, "amount")?;

        Ok(TripRecord::Expense(ExpenseRecord {
            id: RecordId::generate(),
            date: format_iso_date(&date),
            amount,
            category: ExpenseCategory::normalized(&category),
            description: self.description.trim().to_string(),
        }))
    }
}

fn required_text(value: &str, field_name: &str) -> ClientResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::validation_failed(
            field_name,
            &format!("`{field_name}` is required."),
        ));
    }
    Ok(trimmed.to_string())
}

fn valid_amount(value: f64, field_name: &str) -> ClientResult<f64> {
    if !value.is_finite() {
        return Err(ClientError::validation_failed(
            field_name,
            &format!("`{field_name}` must be a number."),
        ));
    }
    if value < 0.0 {
        return Err(ClientError::validation_failed(
            field_name,
            &format!("`{field_name}` must not be negative."),
        ));
    }
    Ok(value)
}
