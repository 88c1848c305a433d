// PatientClinicals-app lib.rs
//
// Terminal front end for the patient clinicals client.
// The binary in src/bin wires these modules to stdin/stdout.

pub mod app;
pub mod command;
pub mod config;
pub mod logging;
pub mod render;
pub mod shell;

pub use app::{ActiveView, App, AppError, Flow};
pub use command::{Command, CommandError};
pub use config::{AppConfig, ConfigError};
