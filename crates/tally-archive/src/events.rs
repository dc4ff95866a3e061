// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured diagnostic events produced by the engine.
//!
//! The engine never writes to an output stream itself; callers decide how
//! to render the event list (the CLI prints it, tests assert on it).

/// How a diagnostic line should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

/// One human-readable diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub severity: Severity,
    pub message: String,
}

impl DiagnosticEvent {
    pub fn info(message: impl Into<String>) -> DiagnosticEvent {
        DiagnosticEvent {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> DiagnosticEvent {
        DiagnosticEvent {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}
