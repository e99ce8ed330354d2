//! DealTable Record Types
//!
//! A `Deal` is one row of the pipeline grid. Fields are addressed by column id
//! through `DealField`, and read back as a `FieldValue` so the sort engine can
//! compare any column without knowing its concrete type.
//!
//! # Examples
//!
//! ```
//! use dealtable::{Contacts, Deal, DealField, FieldValue, Stage};
//!
//! let deal = Deal::new("7", "Data Warehouse Refresh")
//!     .with_stage(Stage::Negotiation)
//!     .with_value(42_000.0)
//!     .with_contacts(Contacts::parse("Ana Ruiz, Ben Ode"));
//!
//! assert_eq!(deal.contacts.len(), 2);
//! assert_eq!(deal.get(DealField::Stage), FieldValue::Text("Negotiation".to_string()));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delimiter used when contacts cross the display/persistence boundary.
pub const CONTACT_DELIMITER: &str = ", ";

/// Pipeline stage of a deal.
///
/// Labels outside the fixed set are kept verbatim in `Other` rather than being
/// mapped onto a known stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    Discovery,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
    Other(String),
}

impl Stage {
    /// The fixed stages in pipeline order.
    pub const ALL: [Stage; 5] = [
        Stage::Discovery,
        Stage::Proposal,
        Stage::Negotiation,
        Stage::ClosedWon,
        Stage::ClosedLost,
    ];

    pub fn label(&self) -> &str {
        match self {
            Stage::Discovery => "Discovery",
            Stage::Proposal => "Proposal",
            Stage::Negotiation => "Negotiation",
            Stage::ClosedWon => "Closed Won",
            Stage::ClosedLost => "Closed Lost",
            Stage::Other(label) => label,
        }
    }

    /// Short code used by selectors and bulk actions, e.g. `closed-won`.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Stage::Discovery => Some("discovery"),
            Stage::Proposal => Some("proposal"),
            Stage::Negotiation => Some("negotiation"),
            Stage::ClosedWon => Some("closed-won"),
            Stage::ClosedLost => Some("closed-lost"),
            Stage::Other(_) => None,
        }
    }

    /// Resolve a display label exactly; anything else becomes `Other`.
    pub fn from_label(label: &str) -> Stage {
        Stage::ALL
            .iter()
            .find(|stage| stage.label() == label)
            .cloned()
            .unwrap_or_else(|| Stage::Other(label.to_string()))
    }

    /// Resolve either a short code or a display label.
    ///
    /// Unknown input passes through verbatim as `Other`.
    pub fn lookup(value: &str) -> Stage {
        Stage::ALL
            .iter()
            .find(|stage| stage.code() == Some(value))
            .cloned()
            .unwrap_or_else(|| Stage::from_label(value))
    }

    pub fn is_closed_won(&self) -> bool {
        matches!(self, Stage::ClosedWon)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Discovery
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Stage {
    fn from(value: String) -> Self {
        Stage::from_label(&value)
    }
}

impl From<Stage> for String {
    fn from(value: Stage) -> Self {
        match value {
            Stage::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

/// A sales representative on the fixed roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub id: &'static str,
    pub name: &'static str,
    pub initials: &'static str,
}

pub const OWNERS: [Owner; 5] = [
    Owner { id: "alex-chen", name: "Alex Chen", initials: "AC" },
    Owner { id: "sam-wilson", name: "Sam Wilson", initials: "SW" },
    Owner { id: "emma-brown", name: "Emma Brown", initials: "EB" },
    Owner { id: "james-liu", name: "James Liu", initials: "JL" },
    Owner { id: "chris-taylor", name: "Chris Taylor", initials: "CT" },
];

/// Find a roster entry by short id or display name.
pub fn find_owner(value: &str) -> Option<&'static Owner> {
    OWNERS
        .iter()
        .find(|owner| owner.id == value || owner.name == value)
}

/// Map an owner id such as `alex-chen` to its display name.
/// Unknown values are returned unchanged.
pub fn lookup_owner(value: &str) -> String {
    find_owner(value)
        .map(|owner| owner.name.to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Ordered list of contact names. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Contacts(Vec<String>);

impl Contacts {
    pub fn new() -> Self {
        Contacts(Vec::new())
    }

    /// Split a delimited display string, dropping empty entries.
    pub fn parse(value: &str) -> Self {
        Contacts(
            value
                .split(CONTACT_DELIMITER)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn to_display(&self) -> String {
        self.0.join(CONTACT_DELIMITER)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Append a trimmed name. Blank names are ignored and return false.
    pub fn push(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }
}

impl From<String> for Contacts {
    fn from(value: String) -> Self {
        Contacts::parse(&value)
    }
}

impl From<Contacts> for String {
    fn from(value: Contacts) -> Self {
        value.to_display()
    }
}

/// Names are trimmed and blank ones skipped, as with `push`.
impl<S: Into<String>> FromIterator<S> for Contacts {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut contacts = Contacts::new();
        for name in iter {
            contacts.push(&name.into());
        }
        contacts
    }
}

/// A deal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub deal: String,
    #[serde(default)]
    pub activities_timeline: String,
    pub stage: Stage,
    pub deal_value: f64,
    #[serde(default)]
    pub contacts: Contacts,
    pub owner: String,
    #[serde(default)]
    pub accounts: String,
    #[serde(default)]
    pub expected_close: String,
    #[serde(default)]
    pub forecast_value: f64,
}

impl Deal {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Deal {
            id: id.into(),
            deal: name.into(),
            activities_timeline: String::new(),
            stage: Stage::default(),
            deal_value: 0.0,
            contacts: Contacts::new(),
            owner: OWNERS[0].name.to_string(),
            accounts: String::new(),
            expected_close: String::new(),
            forecast_value: 0.0,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.deal_value = value;
        self
    }

    pub fn with_forecast(mut self, value: f64) -> Self {
        self.forecast_value = value;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn with_contacts(mut self, contacts: Contacts) -> Self {
        self.contacts = contacts;
        self
    }

    pub fn with_accounts(mut self, accounts: impl Into<String>) -> Self {
        self.accounts = accounts.into();
        self
    }

    pub fn with_expected_close(mut self, date: impl Into<String>) -> Self {
        self.expected_close = date.into();
        self
    }

    /// Read a field as a comparable value.
    pub fn get(&self, field: DealField) -> FieldValue {
        match field {
            DealField::Id => FieldValue::Text(self.id.clone()),
            DealField::Deal => FieldValue::Text(self.deal.clone()),
            DealField::ActivitiesTimeline => FieldValue::Text(self.activities_timeline.clone()),
            DealField::Stage => FieldValue::Text(self.stage.label().to_string()),
            DealField::DealValue => FieldValue::Number(self.deal_value),
            DealField::Contacts => FieldValue::Text(self.contacts.to_display()),
            DealField::Owner => FieldValue::Text(self.owner.clone()),
            DealField::Accounts => FieldValue::Text(self.accounts.clone()),
            DealField::ExpectedClose => FieldValue::Text(self.expected_close.clone()),
            DealField::ForecastValue => FieldValue::Number(self.forecast_value),
        }
    }
}

/// Addressable fields of a deal, keyed by their column id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealField {
    Id,
    Deal,
    ActivitiesTimeline,
    Stage,
    DealValue,
    Contacts,
    Owner,
    Accounts,
    ExpectedClose,
    ForecastValue,
}

impl DealField {
    pub const ALL: [DealField; 10] = [
        DealField::Id,
        DealField::Deal,
        DealField::ActivitiesTimeline,
        DealField::Stage,
        DealField::DealValue,
        DealField::Contacts,
        DealField::Owner,
        DealField::Accounts,
        DealField::ExpectedClose,
        DealField::ForecastValue,
    ];

    pub fn column_id(&self) -> &'static str {
        match self {
            DealField::Id => "id",
            DealField::Deal => "deal",
            DealField::ActivitiesTimeline => "activitiesTimeline",
            DealField::Stage => "stage",
            DealField::DealValue => "dealValue",
            DealField::Contacts => "contacts",
            DealField::Owner => "owner",
            DealField::Accounts => "accounts",
            DealField::ExpectedClose => "expectedClose",
            DealField::ForecastValue => "forecastValue",
        }
    }

    pub fn from_column_id(id: &str) -> Option<DealField> {
        DealField::ALL.iter().copied().find(|field| field.column_id() == id)
    }
}

/// A field value as seen by comparisons.
///
/// Dates stay as ISO `YYYY-MM-DD` text, which orders correctly as a string.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

/// The five deals the dashboard starts with.
pub fn seed_deals() -> Vec<Deal> {
    vec![
        Deal::new("1", "Enterprise Software License")
            .with_stage(Stage::Proposal)
            .with_value(125_000.0)
            .with_contacts(Contacts::parse("John Smith, Mary Johnson"))
            .with_owner("Alex Chen")
            .with_accounts("TechCorp Inc. - Enterprise")
            .with_expected_close("2024-03-15")
            .with_forecast(112_500.0),
        Deal::new("2", "Cloud Migration Project")
            .with_stage(Stage::Negotiation)
            .with_value(85_000.0)
            .with_contacts(Contacts::parse("Sarah Johnson, Mike Davis, Lisa Wong"))
            .with_owner("Sam Wilson")
            .with_accounts("DataFlow Systems - Mid-Market")
            .with_expected_close("2024-02-28")
            .with_forecast(76_500.0),
        Deal::new("3", "Marketing Automation Setup")
            .with_stage(Stage::Proposal)
            .with_value(45_000.0)
            .with_contacts(Contacts::parse("Mike Davis, Jennifer Lee"))
            .with_owner("Emma Brown")
            .with_accounts("GrowthCo - Small Business")
            .with_expected_close("2024-02-15")
            .with_forecast(40_500.0),
        Deal::new("4", "Security Audit & Compliance")
            .with_stage(Stage::ClosedWon)
            .with_value(95_000.0)
            .with_contacts(Contacts::parse("Lisa Chen, Robert Kim, David Park"))
            .with_owner("James Liu")
            .with_accounts("SecureBank - Financial Services")
            .with_expected_close("2024-01-30")
            .with_forecast(95_000.0),
        Deal::new("5", "Custom Dashboard Development")
            .with_stage(Stage::Discovery)
            .with_value(65_000.0)
            .with_contacts(Contacts::parse("Tom Wilson, Anna Martinez"))
            .with_owner("Chris Taylor")
            .with_accounts("Analytics Pro - Technology")
            .with_expected_close("2024-03-30")
            .with_forecast(58_500.0),
    ]
}
