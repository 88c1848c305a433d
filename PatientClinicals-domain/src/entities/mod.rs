// Domain entities
// Parsed, display-ready forms of what the patient services backend returns

pub mod clinical;
pub mod conversions;
pub mod patient;

use validator::ValidationErrors;

/// Flatten validator errors into one message, fields in a stable order
pub fn validation_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            messages.join(", ")
        })
        .collect::<Vec<String>>()
        .join("; ")
}
