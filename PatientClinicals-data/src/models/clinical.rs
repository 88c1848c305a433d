use serde::{Deserialize, Serialize};

/// Clinical measurement as returned by the backend.
///
/// Every field is optional on the wire: older records may lack an id or a
/// timestamp, and the client renders placeholders for them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalRecord {
    /// Server-assigned identifier
    #[serde(default)]
    pub id: Option<i64>,

    /// Owning patient
    #[serde(default)]
    pub patient_id: Option<i64>,

    /// Component key such as `bp` or `temperature`
    #[serde(default)]
    pub component_name: Option<String>,

    /// Raw measured value, e.g. `120/80`
    #[serde(default)]
    pub component_value: Option<String>,

    /// ISO-8601 timestamp, with or without an offset
    #[serde(default)]
    pub measured_date_time: Option<String>,
}

/// Body of `PUT /clinicals/{patientId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertClinicalRequest {
    pub patient_id: i64,
    pub component_name: String,
    pub component_value: String,
    pub measured_date_time: String,
}
