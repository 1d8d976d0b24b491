//! Per-company outcome records
//!
//! An `Outcome` is created once, at the moment a cascade reaches a terminal
//! state, and is never modified afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason recorded on every `Failure` outcome
pub const FAILURE_REASON: &str = "no reports found after trying all report types";

/// The kind of report a query tier is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Annual,
    Sustainability,
    Financial,
}

impl ReportType {
    /// Human-readable label, as written to the audit log and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Annual => "Annual Report",
            Self::Sustainability => "Sustainability Report",
            Self::Financial => "Financial Report",
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Sustainability => "sustainability",
            Self::Financial => "financial",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "annual" => Some(Self::Annual),
            "sustainability" => Some(Self::Sustainability),
            "financial" => Some(Self::Financial),
            _ => None,
        }
    }

    /// All report types, in cascade preference order
    pub fn all() -> [Self; 3] {
        [Self::Annual, Self::Sustainability, Self::Financial]
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Terminal result for one company in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Outcome {
    /// A document passed every gate
    #[serde(rename = "success")]
    Success {
        company: String,
        url: String,
        #[serde(rename = "completeText")]
        text: String,
        #[serde(rename = "pages")]
        page_count: usize,
        #[serde(rename = "reportType")]
        report_type: ReportType,
        timestamp: DateTime<Utc>,
    },

    /// Every tier was tried and nothing was accepted
    #[serde(rename = "failed")]
    Failure {
        company: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The run was cancelled before the company reached a verdict
    #[serde(rename = "cancelled")]
    Cancelled {
        company: String,
        timestamp: DateTime<Utc>,
    },
}

impl Outcome {
    pub fn success(
        company: &str,
        url: &str,
        text: String,
        page_count: usize,
        report_type: ReportType,
    ) -> Self {
        Self::Success {
            company: company.to_string(),
            url: url.to_string(),
            text,
            page_count,
            report_type,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(company: &str) -> Self {
        Self::Failure {
            company: company.to_string(),
            reason: FAILURE_REASON.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn cancelled(company: &str) -> Self {
        Self::Cancelled {
            company: company.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn company(&self) -> &str {
        match self {
            Self::Success { company, .. }
            | Self::Failure { company, .. }
            | Self::Cancelled { company, .. } => company,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Success { timestamp, .. }
            | Self::Failure { timestamp, .. }
            | Self::Cancelled { timestamp, .. } => *timestamp,
        }
    }

    /// Status tag shared by the JSON file and the database
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Failure { .. } => "failed",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn report_type(&self) -> Option<ReportType> {
        match self {
            Self::Success { report_type, .. } => Some(*report_type),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Success { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Compares two outcomes on everything except when they were recorded
    pub fn same_result(&self, other: &Outcome) -> bool {
        match (self, other) {
            (
                Self::Success {
                    company: c1,
                    url: u1,
                    text: t1,
                    page_count: p1,
                    report_type: r1,
                    ..
                },
                Self::Success {
                    company: c2,
                    url: u2,
                    text: t2,
                    page_count: p2,
                    report_type: r2,
                    ..
                },
            ) => c1 == c2 && u1 == u2 && t1 == t2 && p1 == p2 && r1 == r2,
            (
                Self::Failure {
                    company: c1,
                    reason: r1,
                    ..
                },
                Self::Failure {
                    company: c2,
                    reason: r2,
                    ..
                },
            ) => c1 == c2 && r1 == r2,
            (Self::Cancelled { company: c1, .. }, Self::Cancelled { company: c2, .. }) => c1 == c2,
            _ => false,
        }
    }
}
