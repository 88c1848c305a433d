use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Placeholder shown for missing ids, names and values
pub const NOT_AVAILABLE: &str = "N/A";

/// Clinical components the entry form accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentName {
    /// Blood pressure, e.g. `120/80`
    Bp,
    /// Heart rate in beats per minute
    HeartRate,
    /// Body temperature in °C
    Temperature,
    /// Weight in kg
    Weight,
    /// Height in cm
    Height,
    /// Blood glucose in mg/dL
    Glucose,
}

/// A component key that is not one of the six canonical ones
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown clinical component: {0}")]
pub struct UnknownComponent(pub String);

impl ComponentName {
    /// Every canonical component, in form order
    pub const ALL: [ComponentName; 6] = [
        ComponentName::Bp,
        ComponentName::HeartRate,
        ComponentName::Temperature,
        ComponentName::Weight,
        ComponentName::Height,
        ComponentName::Glucose,
    ];

    /// Key sent to the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentName::Bp => "bp",
            ComponentName::HeartRate => "heartrate",
            ComponentName::Temperature => "temperature",
            ComponentName::Weight => "weight",
            ComponentName::Height => "height",
            ComponentName::Glucose => "glucose",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            ComponentName::Bp => "Blood Pressure",
            ComponentName::HeartRate => "Heart Rate",
            ComponentName::Temperature => "Temperature",
            ComponentName::Weight => "Weight",
            ComponentName::Height => "Height",
            ComponentName::Glucose => "Glucose",
        }
    }

    /// Unit appended to values of this component
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            ComponentName::Temperature => Some("°C"),
            ComponentName::Weight => Some("kg"),
            ComponentName::Height => Some("cm"),
            ComponentName::Glucose => Some("mg/dL"),
            ComponentName::HeartRate => Some("bpm"),
            ComponentName::Bp => None,
        }
    }

    /// Example value shown in the empty value field
    pub fn placeholder(&self) -> &'static str {
        match self {
            ComponentName::Bp => "e.g. 120/80",
            ComponentName::HeartRate => "e.g. 72",
            ComponentName::Temperature => "e.g. 36.5",
            ComponentName::Weight => "e.g. 70.5",
            ComponentName::Height => "e.g. 175",
            ComponentName::Glucose => "e.g. 95",
        }
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentName {
    type Err = UnknownComponent;

    /// Only the canonical keys parse; legacy aliases are display-only
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownComponent(s.to_string()))
    }
}

/// Component of a stored record, as far as the client understands it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentKind {
    /// One of the canonical keys
    Canonical(ComponentName),

    /// A key from the earlier naming scheme (`heart_rate`, `blood_pressure`)
    Legacy { alias: &'static str, name: ComponentName },

    /// Anything else, kept verbatim
    Unrecognized(String),

    /// No component name on the record
    Missing,
}

impl ComponentKind {
    /// Classify a raw key from the backend
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => ComponentKind::Missing,
            Some("heart_rate") => ComponentKind::Legacy {
                alias: "heart_rate",
                name: ComponentName::HeartRate,
            },
            Some("blood_pressure") => ComponentKind::Legacy {
                alias: "blood_pressure",
                name: ComponentName::Bp,
            },
            Some(key) => match key.parse::<ComponentName>() {
                Ok(name) => ComponentKind::Canonical(name),
                Err(_) => ComponentKind::Unrecognized(key.to_string()),
            },
        }
    }

    /// The canonical component this maps to, if any
    pub fn name(&self) -> Option<ComponentName> {
        match self {
            ComponentKind::Canonical(name) | ComponentKind::Legacy { name, .. } => Some(*name),
            _ => None,
        }
    }

    /// Label for the history table
    pub fn label(&self) -> String {
        match self {
            ComponentKind::Canonical(name) | ComponentKind::Legacy { name, .. } => name.label().to_string(),
            ComponentKind::Unrecognized(raw) => raw.clone(),
            ComponentKind::Missing => NOT_AVAILABLE.to_string(),
        }
    }

    /// Unit suffix for values of this component
    pub fn unit(&self) -> Option<&'static str> {
        self.name().and_then(|name| name.unit())
    }
}

/// Domain model for a clinical measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalRecord {
    /// Server-assigned identifier, absent on some legacy rows
    pub id: Option<i64>,

    /// Owning patient
    pub patient_id: Option<i64>,

    /// Parsed component
    pub component: ComponentKind,

    /// Raw value as entered
    pub value: Option<String>,

    /// When the measurement was taken, if the backend sent a readable time
    pub measured_at: Option<DateTime<Utc>>,
}

impl ClinicalRecord {
    /// Value with its unit suffix, or `N/A`
    pub fn display_value(&self) -> String {
        match self.value.as_deref() {
            Some(value) if !value.is_empty() => with_unit(value, self.component.unit()),
            _ => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Validated clinical entry ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClinical {
    pub patient_id: i64,
    pub component: ComponentName,
    pub value: String,
    pub measured_at: DateTime<Utc>,
}

fn with_unit(value: &str, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!("{} {}", value, unit),
        None => value.to_string(),
    }
}

/// Format a raw component/value pair the way the history table shows it.
///
/// Unknown component names leave the value untouched.
pub fn format_component_value(component_name: &str, value: &str) -> String {
    if value.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    with_unit(value, ComponentKind::parse(Some(component_name)).unit())
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 with an offset, or a zone-less local date-time (with or
/// without seconds) which is taken to be UTC.
pub fn parse_measured_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
