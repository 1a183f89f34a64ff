//! Validation check results and the aggregated report.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How much a failed check matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks installation.
    Error,
    /// Flagged, but installation may proceed.
    Warning,
    /// Purely descriptive.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        f.write_str(label)
    }
}

/// Identifier of a validation rule, in battery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    KernelVersion,
    DiskSpace,
    KernelHeaders,
    BuildTools,
    SecureBoot,
    NouveauStatus,
}

impl CheckName {
    /// Every rule, in the order the battery runs them.
    pub const ALL: [Self; 6] = [
        Self::KernelVersion,
        Self::DiskSpace,
        Self::KernelHeaders,
        Self::BuildTools,
        Self::SecureBoot,
        Self::NouveauStatus,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KernelVersion => "kernel_version",
            Self::DiskSpace => "disk_space",
            Self::KernelHeaders => "kernel_headers",
            Self::BuildTools => "build_tools",
            Self::SecureBoot => "secure_boot",
            Self::NouveauStatus => "nouveau_status",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: CheckName,
    pub passed: bool,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl CheckResult {
    /// A passing, informational result.
    pub fn passed(name: CheckName, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            message: message.into(),
            severity: Severity::Info,
            remediation: None,
            details: BTreeMap::new(),
        }
    }

    pub fn failed(name: CheckName, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            message: message.into(),
            severity,
            remediation: None,
            details: BTreeMap::new(),
        }
    }

    pub fn error(name: CheckName, message: impl Into<String>) -> Self {
        Self::failed(name, Severity::Error, message)
    }

    pub fn warning(name: CheckName, message: impl Into<String>) -> Self {
        Self::failed(name, Severity::Warning, message)
    }

    #[must_use]
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.details.insert(key.into(), value.to_string());
        self
    }

    /// Failed with error severity.
    pub fn is_blocking(&self) -> bool {
        !self.passed && self.severity == Severity::Error
    }
}

/// Ordered check results with aggregates kept in sync by [`Self::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    checks: Vec<CheckResult>,
    passed: bool,
    errors: Vec<CheckResult>,
    warnings: Vec<CheckResult>,
    infos: Vec<CheckResult>,
    timestamp: DateTime<Utc>,
    duration: Option<Duration>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            passed: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            infos: Vec::new(),
            timestamp: Utc::now(),
            duration: None,
        }
    }

    /// Append a result. Once a blocking failure is added the report stays
    /// failed for the rest of its lifetime.
    pub fn add(&mut self, result: CheckResult) {
        if result.is_blocking() {
            self.passed = false;
        }

        match (result.passed, result.severity) {
            (false, Severity::Error) => self.errors.push(result.clone()),
            (_, Severity::Warning) => self.warnings.push(result.clone()),
            _ => self.infos.push(result.clone()),
        }
        self.checks.push(result);
    }

    /// Record how long the battery took. Only the first call has an effect.
    pub fn complete(&mut self, duration: Duration) {
        if self.duration.is_none() {
            self.duration = Some(duration);
        }
    }

    pub const fn passed(&self) -> bool {
        self.passed
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    pub fn errors(&self) -> &[CheckResult] {
        &self.errors
    }

    pub fn warnings(&self) -> &[CheckResult] {
        &self.warnings
    }

    pub fn infos(&self) -> &[CheckResult] {
        &self.infos
    }

    pub fn get(&self, name: CheckName) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub const fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
