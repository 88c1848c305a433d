//! Text rendering of screens and notifications

use patient_clinicals_domain::entities::clinical::ComponentName;
use patient_clinicals_domain::notifications::{ConfirmationPrompt, Notification};
use patient_clinicals_domain::views::messages;
use patient_clinicals_domain::views::{
    AddClinicalState, AddClinicalView, AddPatientView, PatientListState, PatientListView,
};
use tokio::time::Instant;

/// Width of a notification progress bar, in characters
const PROGRESS_WIDTH: usize = 10;

fn title(text: &str) -> Vec<String> {
    vec![text.to_string(), "=".repeat(text.chars().count())]
}

/// Pad every column to its widest cell
fn table(header: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(header.to_vec())];
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in rows {
        lines.push(line(row.iter().map(String::as_str).collect()));
    }
    lines
}

pub fn patient_list(view: &PatientListView) -> String {
    let mut lines = title("Patient List");
    match view.state() {
        PatientListState::Loading => lines.push(messages::PATIENTS_LOADING.to_string()),
        PatientListState::Failed(message) => lines.push(message.clone()),
        PatientListState::Loaded(patients) if patients.is_empty() => {
            lines.push(messages::PATIENTS_EMPTY.to_string());
        }
        PatientListState::Loaded(patients) => {
            let rows: Vec<Vec<String>> = patients
                .iter()
                .map(|p| {
                    vec![
                        p.id.to_string(),
                        p.first_name.clone(),
                        p.last_name.clone(),
                        p.age.to_string(),
                    ]
                })
                .collect();
            lines.extend(table(&["ID", "First Name", "Last Name", "Age"], &rows));
        }
    }
    lines.push(String::new());
    lines.push("Actions: add | clinical <id> | delete <id> | reload".to_string());
    lines.join("\n")
}

pub fn add_patient(view: &AddPatientView) -> String {
    let form = view.form();
    let mut lines = title("Add Patient");
    lines.push(format!("First name (firstName): {}", form.first_name));
    lines.push(format!("Last name  (lastName):  {}", form.last_name));
    lines.push(format!("Age        (age):       {}", form.age));
    lines.push(String::new());
    if view.is_submitting() {
        lines.push("Saving...".to_string());
    } else {
        lines.push("Actions: set <field> <value> | submit | clear | home".to_string());
    }
    lines.join("\n")
}

pub fn add_clinical(view: &AddClinicalView) -> String {
    let mut lines = title("Add Clinical Data");
    match view.state() {
        AddClinicalState::Loading => lines.push(messages::PATIENT_DETAILS_LOADING.to_string()),
        AddClinicalState::Failed(message) => {
            lines.push(message.clone());
            lines.push(String::new());
            lines.push("Actions: home".to_string());
        }
        AddClinicalState::Ready { patient, clinicals } => {
            lines.push(format!(
                "Patient: {} (ID: {}, Age: {})",
                patient.full_name(),
                patient.id,
                patient.age
            ));
            lines.push(String::new());

            let form = view.form();
            let options = ComponentName::ALL
                .iter()
                .map(|c| format!("{} ({})", c.as_str(), c.label()))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                "Component (component): {}",
                form.component.map(|c| c.label()).unwrap_or("-")
            ));
            lines.push(format!("  options: {}", options));
            let value = if form.value.is_empty() {
                format!("<{}>", form.placeholder())
            } else {
                form.value.clone()
            };
            lines.push(format!("Value (value): {}", value));
            lines.push(String::new());

            lines.push(messages::history_heading(clinicals.len()));
            if clinicals.is_empty() {
                lines.push(messages::CLINICALS_EMPTY.to_string());
            } else {
                let rows: Vec<Vec<String>> = view
                    .history()
                    .into_iter()
                    .map(|row| vec![row.id, row.component, row.value, row.measured])
                    .collect();
                lines.extend(table(&["ID", "Component", "Value", "Measured"], &rows));
            }
            lines.push(String::new());
            if view.is_submitting() {
                lines.push("Saving...".to_string());
            } else {
                lines.push("Actions: set <field> <value> | submit | clear | home".to_string());
            }
        }
    }
    lines.join("\n")
}

pub fn not_found(path: &str) -> String {
    let mut lines = title("Page not found");
    lines.push(format!("Nothing lives at {}", path));
    lines.push(String::new());
    lines.push("Actions: home".to_string());
    lines.join("\n")
}

fn progress_bar(fraction: f32) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * PROGRESS_WIDTH as f32).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(PROGRESS_WIDTH - filled))
}

/// One line per toast and per pending confirmation; empty when there are none
pub fn notifications(toasts: &[Notification], prompts: &[ConfirmationPrompt], now: Instant) -> String {
    let mut lines = Vec::new();
    for toast in toasts {
        let mut line = format!("[{} #{}] {}", toast.kind, toast.id, toast.message);
        if toast.is_paused() {
            line.push_str(" (paused)");
        } else if let Some(fraction) = toast.progress(now) {
            line.push(' ');
            line.push_str(&progress_bar(fraction));
        }
        lines.push(line);
    }
    for prompt in prompts {
        lines.push(format!(
            "[confirm #{}] {} (answer {} y|n)",
            prompt.id, prompt.message, prompt.id
        ));
    }
    lines.join("\n")
}
