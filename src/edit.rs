//! Inline cell editing.
//!
//! Editors hand back either a number or a piece of text. These helpers coerce
//! that input into the target field; invalid numbers become zero and invalid
//! dates fall back to the last valid value.

use crate::deal::{lookup_owner, Contacts, Deal, DealField, Stage};
use crate::error::{DealError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw value coming out of a cell editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellInput {
    Number(f64),
    Text(String),
}

impl CellInput {
    pub fn text(value: impl Into<String>) -> Self {
        CellInput::Text(value.into())
    }

    fn into_text(self) -> String {
        match self {
            CellInput::Text(v) => v,
            CellInput::Number(n) => n.to_string(),
        }
    }
}

impl From<f64> for CellInput {
    fn from(value: f64) -> Self {
        CellInput::Number(value)
    }
}

impl From<&str> for CellInput {
    fn from(value: &str) -> Self {
        CellInput::Text(value.to_string())
    }
}

/// Parse a currency or number entry such as `"$1,250.50"`.
///
/// Everything except digits, `.` and `-` is stripped first. Unparseable,
/// non-finite and negative results coerce to zero.
pub fn parse_amount(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value = cleaned.parse::<f64>().unwrap_or(0.0);
    sanitize_amount(value)
}

fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

/// Normalize a date entry against the field's previous value.
///
/// Empty input clears the field. A valid date is stored in canonical form.
/// Anything else reverts to `previous` when that is valid, otherwise clears.
pub fn normalize_date(input: &str, previous: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }
    match parse_date(input).or_else(|| parse_date(previous)) {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Apply an editor value to one field of a deal.
pub fn apply_cell(deal: &mut Deal, field: DealField, input: CellInput) -> Result<()> {
    match field {
        DealField::Id => {
            return Err(DealError::InvalidField("id is immutable".to_string()));
        }
        DealField::DealValue | DealField::ForecastValue => {
            let amount = match input {
                CellInput::Number(n) => sanitize_amount(n),
                CellInput::Text(s) => parse_amount(&s),
            };
            if field == DealField::DealValue {
                deal.deal_value = amount;
            } else {
                deal.forecast_value = amount;
            }
        }
        DealField::Deal => deal.deal = input.into_text(),
        DealField::ActivitiesTimeline => deal.activities_timeline = input.into_text(),
        DealField::Accounts => deal.accounts = input.into_text(),
        DealField::Stage => deal.stage = Stage::lookup(&input.into_text()),
        DealField::Owner => deal.owner = lookup_owner(&input.into_text()),
        DealField::Contacts => deal.contacts = Contacts::parse(&input.into_text()),
        DealField::ExpectedClose => {
            deal.expected_close = normalize_date(&input.into_text(), &deal.expected_close);
        }
    }
    Ok(())
}
