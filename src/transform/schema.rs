//! Field schema of a portfolio record.
//!
//! One rule per store field: the external field name, the admin form key,
//! the holding attribute it feeds and what to use when the value is missing.
//! Both the read path (normalization) and the write path (admin input) go
//! through this table.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use super::{KEY_VALUE_SEPARATOR, PAIR_SEPARATOR, parse_delimited_pairs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    InvestorName,
    Security,
    UnitsHeld,
    IssuePrice,
    TotalInvested,
    CurrentPrice,
    UnitsSold,
    RedemptionPrice,
    ValuationHistory,
    FundingRounds,
    LastValuation,
    SharesOutstanding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Text, replaced by the literal when missing or blank.
    Text(&'static str),
    /// Number, 0 when missing, blank or non-numeric.
    Zero,
    /// Number that stays absent when missing.
    Absent,
    /// Delimited pair list, empty when missing or malformed.
    EmptyList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub form_key: &'static str,
    pub attribute: Attribute,
    pub default: FieldDefault,
}

pub const INVESTOR_PLACEHOLDER: &str = "[Investor Name]";
pub const UNKNOWN_SECURITY: &str = "Unknown";

pub const RECORD_FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "Investor Name",
        form_key: "investorName",
        attribute: Attribute::InvestorName,
        default: FieldDefault::Text(INVESTOR_PLACEHOLDER),
    },
    FieldRule {
        field: "Security",
        form_key: "security",
        attribute: Attribute::Security,
        default: FieldDefault::Text(UNKNOWN_SECURITY),
    },
    FieldRule {
        field: "Units Held",
        form_key: "unitsHeld",
        attribute: Attribute::UnitsHeld,
        default: FieldDefault::Zero,
    },
    FieldRule {
        field: "Issue Price / Unit",
        form_key: "issuePrice",
        attribute: Attribute::IssuePrice,
        default: FieldDefault::Zero,
    },
    FieldRule {
        field: "Total Invested",
        form_key: "totalInvested",
        attribute: Attribute::TotalInvested,
        default: FieldDefault::Zero,
    },
    FieldRule {
        field: "Latest PSS",
        form_key: "latestPSS",
        attribute: Attribute::CurrentPrice,
        default: FieldDefault::Zero,
    },
    FieldRule {
        field: "Units Sold",
        form_key: "unitsSold",
        attribute: Attribute::UnitsSold,
        default: FieldDefault::Absent,
    },
    FieldRule {
        field: "RP ($)",
        form_key: "redemptionPrice",
        attribute: Attribute::RedemptionPrice,
        default: FieldDefault::Absent,
    },
    FieldRule {
        field: "Valuation History",
        form_key: "valuationHistory",
        attribute: Attribute::ValuationHistory,
        default: FieldDefault::EmptyList,
    },
    FieldRule {
        field: "Funding Rounds",
        form_key: "fundingRounds",
        attribute: Attribute::FundingRounds,
        default: FieldDefault::EmptyList,
    },
    FieldRule {
        field: "Last Valuation",
        form_key: "lastValuation",
        attribute: Attribute::LastValuation,
        default: FieldDefault::Absent,
    },
    FieldRule {
        field: "# Shares Outstanding",
        form_key: "sharesOutstanding",
        attribute: Attribute::SharesOutstanding,
        default: FieldDefault::Absent,
    },
];

/// Looks up the rule for an attribute. Every attribute has exactly one rule.
pub fn rule(attribute: Attribute) -> &'static FieldRule {
    RECORD_FIELDS
        .iter()
        .find(|rule| rule.attribute == attribute)
        .unwrap_or_else(|| unreachable!("no schema rule for {:?}", attribute))
}

impl FieldRule {
    fn raw<'a>(&self, fields: &'a Map<String, Value>) -> Option<&'a Value> {
        fields.get(self.field).map(unwrap_single)
    }

    /// Raw text of the field, without the default applied.
    pub fn text_value(&self, fields: &Map<String, Value>) -> Option<String> {
        self.raw(fields).and_then(coerce_text)
    }

    /// Raw number of the field, without the default applied.
    pub fn number_value(&self, fields: &Map<String, Value>) -> Option<Decimal> {
        self.raw(fields).and_then(coerce_number)
    }

    pub fn text(&self, fields: &Map<String, Value>) -> String {
        let fallback = match self.default {
            FieldDefault::Text(literal) => literal,
            _ => "",
        };
        self.text_value(fields)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn number(&self, fields: &Map<String, Value>) -> Decimal {
        self.number_value(fields).unwrap_or(Decimal::ZERO)
    }

    pub fn optional_number(&self, fields: &Map<String, Value>) -> Option<Decimal> {
        self.number_value(fields)
    }

    pub fn pairs(&self, fields: &Map<String, Value>) -> Vec<(String, Decimal)> {
        let raw = self.text_value(fields);
        parse_delimited_pairs(raw.as_deref(), PAIR_SEPARATOR, KEY_VALUE_SEPARATOR)
    }
}

// Lookup fields come back as single-element arrays.
fn unwrap_single(value: &Value) -> &Value {
    match value {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    }
}

/// Non-blank text; numbers are rendered as text.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn coerce_number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Parses plain (`"6.94"`) and scientific (`"1.2e3"`) notation.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn every_attribute_has_exactly_one_rule() {
        let attributes = [
            Attribute::InvestorName,
            Attribute::Security,
            Attribute::UnitsHeld,
            Attribute::IssuePrice,
            Attribute::TotalInvested,
            Attribute::CurrentPrice,
            Attribute::UnitsSold,
            Attribute::RedemptionPrice,
            Attribute::ValuationHistory,
            Attribute::FundingRounds,
            Attribute::LastValuation,
            Attribute::SharesOutstanding,
        ];

        assert_eq!(RECORD_FIELDS.len(), attributes.len());
        for attribute in attributes {
            let count = RECORD_FIELDS
                .iter()
                .filter(|r| r.attribute == attribute)
                .count();
            assert_eq!(count, 1, "{:?}", attribute);
        }
    }

    #[test]
    fn optional_fields_default_to_absent() {
        for attribute in [
            Attribute::UnitsSold,
            Attribute::RedemptionPrice,
            Attribute::LastValuation,
            Attribute::SharesOutstanding,
        ] {
            assert_eq!(rule(attribute).default, FieldDefault::Absent);
        }
    }

    #[test]
    fn current_price_reads_latest_pss() {
        assert_eq!(rule(Attribute::CurrentPrice).field, "Latest PSS");
        assert_eq!(rule(Attribute::RedemptionPrice).field, "RP ($)");
    }

    #[test]
    fn numbers_coerce_from_strings_and_numbers() {
        let map = fields(json!({
            "Units Held": "n/a",
            "Issue Price / Unit": " 1.5 ",
            "Total Invested": 2100,
            "Latest PSS": "abc",
            "Last Valuation": "1.2e6"
        }));

        assert_eq!(rule(Attribute::UnitsHeld).number(&map), Decimal::ZERO);
        assert_eq!(rule(Attribute::IssuePrice).number(&map), dec!(1.5));
        assert_eq!(rule(Attribute::TotalInvested).number(&map), dec!(2100));
        assert_eq!(rule(Attribute::CurrentPrice).number(&map), Decimal::ZERO);
        assert_eq!(
            rule(Attribute::LastValuation).optional_number(&map),
            Some(dec!(1200000))
        );
        assert_eq!(rule(Attribute::UnitsSold).optional_number(&map), None);
    }

    #[test]
    fn text_falls_back_to_literal() {
        let map = fields(json!({ "Security": "   " }));
        assert_eq!(rule(Attribute::Security).text(&map), "Unknown");
        assert_eq!(
            rule(Attribute::InvestorName).text(&map),
            INVESTOR_PLACEHOLDER
        );
    }

    #[test]
    fn lookup_arrays_are_unwrapped() {
        let map = fields(json!({ "Investor Name": ["Jane Doe"], "Units Held": [10] }));
        assert_eq!(rule(Attribute::InvestorName).text(&map), "Jane Doe");
        assert_eq!(rule(Attribute::UnitsHeld).number(&map), dec!(10));
    }

    #[test]
    fn parse_decimal_rejects_blank_and_words() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("  "), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("-2.5"), Some(dec!(-2.5)));
    }
}
