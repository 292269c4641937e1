//! Source file management and diagnostics for the udpc compiler.
//!
//! This crate is responsible for:
//! - Describing source files handed over by the front-end
//! - Turning byte spans into `file:line:col` locations
//! - Collecting diagnostics from passes through a [`DiagnosticSink`]
//! - Rendering collected diagnostics with miette, including source context

mod diagnostic;
mod file;

pub use diagnostic::{report_error, DiagnosticSink, Diagnostics, Report, UdpcDiagnostic, UdpcError};
pub use file::SourceFile;

/// Re-exported so downstream crates name spans through one path.
pub use miette::SourceSpan;
