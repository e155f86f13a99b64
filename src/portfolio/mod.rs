
use rust_decimal::Decimal;

use crate::schemas::{Holding, HoldingSummary, Portfolio, PortfolioView};

/// `part / base * 100`, or zero when `base` is not positive.
pub fn percent_of(part: Decimal, base: Decimal) -> Decimal {
    ratio(part, base)
        .checked_mul(Decimal::from(100))
        .unwrap_or(Decimal::ZERO)
}

// Zero for a non-positive divisor or an overflowing quotient.
fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// `units_held * current_price`, or zero when the product overflows.
pub fn current_value(holding: &Holding) -> Decimal {
    holding
        .units_held
        .checked_mul(holding.current_price)
        .unwrap_or(Decimal::ZERO)
}

/// `current_value - total_invested`, or zero when the difference overflows.
pub fn gain_loss(holding: &Holding) -> Decimal {
    current_value(holding)
        .checked_sub(holding.total_invested)
        .unwrap_or(Decimal::ZERO)
}

pub fn gain_loss_percent(holding: &Holding) -> Decimal {
    percent_of(gain_loss(holding), holding.total_invested)
}

pub fn multiple(holding: &Holding) -> Decimal {
    ratio(holding.current_price, holding.issue_price)
}

pub fn summarize_holding(holding: Holding) -> HoldingSummary {
    HoldingSummary {
        current_value: current_value(&holding),
        gain_loss: gain_loss(&holding),
        gain_loss_percent: gain_loss_percent(&holding),
        multiple: multiple(&holding),
        holding,
    }
}

pub fn build_portfolio_view(portfolio: Portfolio) -> PortfolioView {
    PortfolioView {
        investor: portfolio.investor,
        holdings: portfolio
            .holdings
            .into_iter()
            .map(summarize_holding)
            .collect(),
        totals: portfolio.totals,
    }
}
