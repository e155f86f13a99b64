use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

fn round_currency<S>(x: &Decimal, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // Round to 2 decimals, then send as a string so trailing zeros survive (e.g. "10.50")
    s.serialize_str(&x.round_dp(2).to_string())
}

fn round_currency_option<S>(x: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match x {
        Some(d) => round_currency(d, s),
        None => s.serialize_none(),
    }
}

/// Accepts a JSON string or number and keeps it as text. `null` and a missing
/// key both become `None`.
fn lenient_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

// --- Upstream records ---

/// One row of the tabular store, as the store returns it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(
        rename = "createdTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<String>,
}

// --- Portfolio domain ---

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ValuationPoint {
    pub period: String,
    pub value: Decimal,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FundingRound {
    pub round: String,
    pub pss: Decimal,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub security: String,
    pub units_held: Decimal,
    pub issue_price: Decimal,
    pub current_price: Decimal,
    pub total_invested: Decimal,
    pub units_sold: Option<Decimal>,
    pub redemption_price: Option<Decimal>,
    pub valuation_history: Vec<ValuationPoint>,
    pub funding_rounds: Vec<FundingRound>,
    pub last_valuation: Option<Decimal>,
    pub shares_outstanding: Option<Decimal>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    #[serde(serialize_with = "round_currency")]
    pub total_invested: Decimal,
    #[serde(serialize_with = "round_currency")]
    pub total_current_value: Decimal,
    #[serde(serialize_with = "round_currency")]
    pub total_gain_loss: Decimal,
    #[serde(serialize_with = "round_currency")]
    pub total_gain_loss_percent: Decimal,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub investor: String,
    pub holdings: Vec<Holding>,
    pub totals: PortfolioTotals,
}

// --- Response DTOs ---

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSummary {
    #[serde(flatten)]
    pub holding: Holding,
    #[serde(serialize_with = "round_currency")]
    pub current_value: Decimal,
    #[serde(serialize_with = "round_currency")]
    pub gain_loss: Decimal,
    #[serde(serialize_with = "round_currency")]
    pub gain_loss_percent: Decimal,
    #[serde(serialize_with = "round_currency")]
    pub multiple: Decimal,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PortfolioView {
    pub investor: String,
    pub holdings: Vec<HoldingSummary>,
    pub totals: PortfolioTotals,
}

/// Admin view of a raw record, one attribute per schema field.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecord {
    pub id: String,
    pub investor_name: Option<String>,
    pub security: Option<String>,
    #[serde(serialize_with = "round_currency_option")]
    pub units_held: Option<Decimal>,
    #[serde(serialize_with = "round_currency_option")]
    pub issue_price: Option<Decimal>,
    #[serde(serialize_with = "round_currency_option")]
    pub total_invested: Option<Decimal>,
    #[serde(rename = "latestPSS", serialize_with = "round_currency_option")]
    pub latest_pss: Option<Decimal>,
    #[serde(serialize_with = "round_currency_option")]
    pub units_sold: Option<Decimal>,
    #[serde(serialize_with = "round_currency_option")]
    pub redemption_price: Option<Decimal>,
    pub valuation_history: Option<String>,
    pub funding_rounds: Option<String>,
    #[serde(serialize_with = "round_currency_option")]
    pub last_valuation: Option<Decimal>,
    #[serde(serialize_with = "round_currency_option")]
    pub shares_outstanding: Option<Decimal>,
    pub created_time: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EmbedSnippet {
    pub investor: String,
    pub url: String,
    pub embed_code: String,
}

#[derive(Serialize, Debug)]
pub struct RecordId {
    pub id: String,
}

// --- Request DTOs ---

/// Admin form payload. Every field is optional text; numbers are accepted too.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub investor_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub security: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub units_held: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_invested: Option<String>,
    #[serde(rename = "latestPSS", default, deserialize_with = "lenient_string")]
    pub latest_pss: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub units_sold: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub redemption_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub valuation_history: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub funding_rounds: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_valuation: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub shares_outstanding: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocCenter {
    pub investor_name: Option<String>,
    pub folder_id: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocCenterLink {
    pub url: String,
    pub embed_code: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    pub folder_id: Option<String>,
    pub sort: Option<String>,
}

// --- Document center ---

/// A file as reported by the folder listing endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mime_type: String,
    pub modified_time: DateTime<Utc>,
    pub url: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Audio,
    Pdf,
    Spreadsheet,
    Document,
    Presentation,
    Other,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    #[serde(flatten)]
    pub file: FileDescriptor,
    pub size_label: String,
    pub kind: FileKind,
    pub thumbnail_url: Option<String>,
}
