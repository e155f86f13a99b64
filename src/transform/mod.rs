//! Raw store records -> portfolio domain.
//!
//! Everything here is synchronous and stateless; the async fetch happens
//! before these functions are called.

pub mod records;
pub mod schema;

use rust_decimal::Decimal;

use crate::portfolio::{current_value, percent_of};
use crate::schemas::{
    FundingRound, Holding, Portfolio, PortfolioTotals, RawRecord, ValuationPoint,
};
use schema::{Attribute, rule};

pub const PAIR_SEPARATOR: char = ',';
pub const KEY_VALUE_SEPARATOR: char = ':';

/// Parses `"label: value, label: value"` into ordered pairs.
///
/// Keys and values are trimmed and the key ends at the first key/value
/// separator. Missing or empty input gives an empty list. A single malformed
/// segment (no separator, non-numeric value, empty segment) discards the
/// whole field and also gives an empty list.
pub fn parse_delimited_pairs(
    raw: Option<&str>,
    pair_separator: char,
    key_value_separator: char,
) -> Vec<(String, Decimal)> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Vec::new();
    };

    let parsed: Result<Vec<(String, Decimal)>, String> = raw
        .split(pair_separator)
        .map(|segment| -> Result<(String, Decimal), String> {
            let malformed = || segment.to_string();
            let (key, value) = segment
                .split_once(key_value_separator)
                .ok_or_else(malformed)?;
            let value = schema::parse_decimal(value).ok_or_else(malformed)?;
            Ok((key.trim().to_string(), value))
        })
        .collect();

    match parsed {
        Ok(pairs) => pairs,
        Err(segment) => {
            tracing::debug!(%segment, "discarding delimited field with a malformed entry");
            Vec::new()
        }
    }
}

/// Renders pairs back into the delimited form read by [`parse_delimited_pairs`].
pub fn format_delimited_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, Decimal)>,
{
    let separator = format!("{} ", PAIR_SEPARATOR);
    pairs
        .into_iter()
        .map(|(label, value)| format!("{}{} {}", label, KEY_VALUE_SEPARATOR, value))
        .collect::<Vec<_>>()
        .join(separator.as_str())
}

/// A labelled number carried in one of the delimited fields.
pub trait LabeledValue: Sized {
    fn from_pair(label: String, value: Decimal) -> Self;
    fn label(&self) -> &str;
    fn value(&self) -> Decimal;
}

impl LabeledValue for ValuationPoint {
    fn from_pair(period: String, value: Decimal) -> Self {
        Self { period, value }
    }

    fn label(&self) -> &str {
        &self.period
    }

    fn value(&self) -> Decimal {
        self.value
    }
}

impl LabeledValue for FundingRound {
    fn from_pair(round: String, pss: Decimal) -> Self {
        Self { round, pss }
    }

    fn label(&self) -> &str {
        &self.round
    }

    fn value(&self) -> Decimal {
        self.pss
    }
}

pub fn parse_series<T: LabeledValue>(raw: Option<&str>) -> Vec<T> {
    series_from_pairs(parse_delimited_pairs(
        raw,
        PAIR_SEPARATOR,
        KEY_VALUE_SEPARATOR,
    ))
}

pub fn format_series<T: LabeledValue>(items: &[T]) -> String {
    format_delimited_pairs(items.iter().map(|item| (item.label(), item.value())))
}

fn series_from_pairs<T: LabeledValue>(pairs: Vec<(String, Decimal)>) -> Vec<T> {
    pairs
        .into_iter()
        .map(|(label, value)| T::from_pair(label, value))
        .collect()
}

pub fn normalize_holding(raw: &RawRecord) -> Holding {
    let fields = &raw.fields;

    Holding {
        id: raw.id.clone(),
        security: rule(Attribute::Security).text(fields),
        units_held: rule(Attribute::UnitsHeld).number(fields),
        issue_price: rule(Attribute::IssuePrice).number(fields),
        current_price: rule(Attribute::CurrentPrice).number(fields),
        total_invested: rule(Attribute::TotalInvested).number(fields),
        units_sold: rule(Attribute::UnitsSold).optional_number(fields),
        redemption_price: rule(Attribute::RedemptionPrice).optional_number(fields),
        valuation_history: series_from_pairs(rule(Attribute::ValuationHistory).pairs(fields)),
        funding_rounds: series_from_pairs(rule(Attribute::FundingRounds).pairs(fields)),
        last_valuation: rule(Attribute::LastValuation).optional_number(fields),
        shares_outstanding: rule(Attribute::SharesOutstanding).optional_number(fields),
    }
}

pub fn aggregate(holdings: &[Holding]) -> PortfolioTotals {
    let total_invested = checked_sum(holdings.iter().map(|h| h.total_invested));
    let total_current_value = checked_sum(holdings.iter().map(current_value));
    let total_gain_loss = total_current_value
        .checked_sub(total_invested)
        .unwrap_or(Decimal::ZERO);

    PortfolioTotals {
        total_invested,
        total_current_value,
        total_gain_loss,
        total_gain_loss_percent: percent_of(total_gain_loss, total_invested),
    }
}

// Zero when the running sum overflows.
fn checked_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
        .unwrap_or(Decimal::ZERO)
}

/// Builds one investor's portfolio. `None` when there are no records.
///
/// The investor name comes from the first record; all records are expected
/// to belong to the same investor.
pub fn build_portfolio(records: &[RawRecord]) -> Option<Portfolio> {
    let first = records.first()?;

    let investor = rule(Attribute::InvestorName).text(&first.fields);
    let holdings: Vec<Holding> = records.iter().map(normalize_holding).collect();
    let totals = aggregate(&holdings);

    Some(Portfolio {
        investor,
        holdings,
        totals,
    })
}

/// Distinct investor names in the order they first appear.
pub fn distinct_investors(records: &[RawRecord]) -> Vec<String> {
    let name_rule = rule(Attribute::InvestorName);
    let mut names: Vec<String> = Vec::new();

    for record in records {
        if let Some(name) = name_rule.text_value(&record.fields) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    names
}
