//! Admin read/write mapping of store records.

use serde_json::{Map, Value};

use super::schema::{Attribute, FieldDefault, RECORD_FIELDS, parse_decimal, rule};
use super::{KEY_VALUE_SEPARATOR, PAIR_SEPARATOR, parse_delimited_pairs};
use crate::error::AppError;
use crate::schemas::{AdminRecord, RawRecord, RecordInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

pub fn admin_record(raw: &RawRecord) -> AdminRecord {
    let fields = &raw.fields;
    let text = |attribute| rule(attribute).text_value(fields);
    let number = |attribute| rule(attribute).number_value(fields);

    AdminRecord {
        id: raw.id.clone(),
        investor_name: text(Attribute::InvestorName),
        security: text(Attribute::Security),
        units_held: number(Attribute::UnitsHeld),
        issue_price: number(Attribute::IssuePrice),
        total_invested: number(Attribute::TotalInvested),
        latest_pss: number(Attribute::CurrentPrice),
        units_sold: number(Attribute::UnitsSold),
        redemption_price: number(Attribute::RedemptionPrice),
        valuation_history: text(Attribute::ValuationHistory),
        funding_rounds: text(Attribute::FundingRounds),
        last_valuation: number(Attribute::LastValuation),
        shares_outstanding: number(Attribute::SharesOutstanding),
        created_time: raw.created_time.clone(),
    }
}

fn input_value(input: &RecordInput, attribute: Attribute) -> Option<&str> {
    let value = match attribute {
        Attribute::InvestorName => &input.investor_name,
        Attribute::Security => &input.security,
        Attribute::UnitsHeld => &input.units_held,
        Attribute::IssuePrice => &input.issue_price,
        Attribute::TotalInvested => &input.total_invested,
        Attribute::CurrentPrice => &input.latest_pss,
        Attribute::UnitsSold => &input.units_sold,
        Attribute::RedemptionPrice => &input.redemption_price,
        Attribute::ValuationHistory => &input.valuation_history,
        Attribute::FundingRounds => &input.funding_rounds,
        Attribute::LastValuation => &input.last_valuation,
        Attribute::SharesOutstanding => &input.shares_outstanding,
    };
    value.as_deref()
}

/// Turns an admin form into store fields.
///
/// Keys missing from the form are left out. Blank values are left out on
/// create and cleared on update. Numbers and pair lists are validated so the
/// store never receives data the reader would silently drop.
pub fn encode_input(input: &RecordInput, mode: WriteMode) -> Result<Map<String, Value>, AppError> {
    let mut fields = Map::new();

    for field_rule in RECORD_FIELDS {
        let Some(raw) = input_value(input, field_rule.attribute) else {
            continue;
        };
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            if mode == WriteMode::Update && field_rule.attribute != Attribute::InvestorName {
                fields.insert(field_rule.field.to_string(), Value::Null);
            }
            continue;
        }

        let value = match field_rule.default {
            FieldDefault::Text(_) => Value::String(trimmed.to_string()),
            FieldDefault::Zero | FieldDefault::Absent => {
                let number = parse_decimal(trimmed)
                    .and_then(|d| d.normalize().to_string().parse::<serde_json::Number>().ok())
                    .ok_or_else(|| {
                        AppError::ValidationError(format!(
                            "{} must be a number, got '{}'",
                            field_rule.form_key, trimmed
                        ))
                    })?;
                Value::Number(number)
            }
            FieldDefault::EmptyList => {
                let pairs =
                    parse_delimited_pairs(Some(trimmed), PAIR_SEPARATOR, KEY_VALUE_SEPARATOR);
                if pairs.is_empty() {
                    return Err(AppError::ValidationError(format!(
                        "{} must look like 'label: value, label: value'",
                        field_rule.form_key
                    )));
                }
                Value::String(trimmed.to_string())
            }
        };

        fields.insert(field_rule.field.to_string(), value);
    }

    let investor_field = rule(Attribute::InvestorName).field;
    if mode == WriteMode::Create && !fields.contains_key(investor_field) {
        return Err(AppError::ValidationError(
            "investorName is required".to_string(),
        ));
    }
    if mode == WriteMode::Update
        && input
            .investor_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
    {
        return Err(AppError::ValidationError(
            "investorName cannot be empty".to_string(),
        ));
    }

    Ok(fields)
}
