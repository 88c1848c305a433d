// Wire models for the patient services API
// Field names follow the backend's camelCase JSON

pub mod clinical;
pub mod patient;
