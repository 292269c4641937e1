//! Diagnostic types for error reporting in the udpc compiler
//!
//! Passes never print or abort on user errors. They push a [`UdpcDiagnostic`]
//! into a [`DiagnosticSink`] and keep going, so a single run surfaces every
//! problem it finds. The driver collects the sink afterwards and renders each
//! entry through miette, attaching the source text with [`Report`].

use crate::SourceFile;
use miette::{Diagnostic, Severity};
use std::{error::Error, fmt, sync::Arc};
use thiserror::Error;

/// A diagnostic message produced during compilation.
///
/// # Fields
///
/// * `location` - Human readable location, e.g. `and2.v:4:5 in primitive `and2``
/// * `report` - The error report containing the diagnostic details
#[derive(Debug, Clone)]
pub struct UdpcDiagnostic {
    pub location: String,
    pub report: Arc<dyn UdpcError>,
}

impl UdpcDiagnostic {
    /// Severity as declared by the report. Reports without an explicit
    /// severity count as errors, matching miette's rendering.
    pub fn severity(&self) -> Severity {
        self.report.severity().unwrap_or(Severity::Error)
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// The rendered one-line message, without location.
    pub fn message(&self) -> String {
        self.report.to_string()
    }
}

impl fmt::Display for UdpcDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.report)
    }
}

/// A report for rendering diagnostics with source code context.
///
/// Combines an error report with the source text so miette can print the
/// labelled snippet.
#[derive(Debug, Clone, Error)]
#[error("{report}")]
pub struct Report {
    /// The source code text for context in error displays
    pub source_code: String,

    /// The error report
    pub report: Arc<dyn UdpcError>,
}

// Lowering errors carry a code, help, labels and a severity; the source text
// is the file the report was rendered against.
impl Diagnostic for Report {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.report.code()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.report.help()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        self.report.labels()
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source_code)
    }

    fn severity(&self) -> Option<Severity> {
        self.report.severity()
    }
}

/// A trait for errors that can be reported with source context.
///
/// Extends miette's `Diagnostic` with the ability to build a [`Report`]
/// against a [`SourceFile`].
pub trait UdpcError: Diagnostic + Send + Sync + Error + 'static {
    /// Create a Report with source context for this error
    fn report(self, file: &SourceFile) -> Report
    where
        Self: Sized;
}

/// Any miette diagnostic is a `UdpcError`.
impl<T: Diagnostic + Send + Sync + Error + 'static> UdpcError for T {
    fn report(self, file: &SourceFile) -> Report {
        Report {
            source_code: file.contents().to_string(),
            report: Arc::new(self),
        }
    }
}

/// Destination for diagnostics produced by a pass.
pub trait DiagnosticSink {
    fn accumulate(&mut self, diagnostic: UdpcDiagnostic);
}

/// The default sink: an ordered list of everything reported.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<UdpcDiagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UdpcDiagnostic> {
        self.entries.iter()
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// One-line messages in report order.
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(UdpcDiagnostic::message).collect()
    }

    /// Render every entry against `file`.
    pub fn reports(&self, file: &SourceFile) -> Vec<Report> {
        self.entries
            .iter()
            .map(|d| Report {
                source_code: file.contents().to_string(),
                report: d.report.clone(),
            })
            .collect()
    }
}

impl DiagnosticSink for Diagnostics {
    fn accumulate(&mut self, diagnostic: UdpcDiagnostic) {
        self.entries.push(diagnostic);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a UdpcDiagnostic;
    type IntoIter = std::slice::Iter<'a, UdpcDiagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

pub fn report_error<R: UdpcError>(sink: &mut dyn DiagnosticSink, location: String, report: R) {
    sink.accumulate(UdpcDiagnostic {
        location,
        report: Arc::new(report),
    });
}
