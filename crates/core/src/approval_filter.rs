//! Approval list filters: validation of untyped filter input, search-term
//! normalization, and matching against a snapshot.
//!
//! Filter values usually arrive from URL query parameters or a client
//! payload, so [`validate_filters`] takes a raw [`serde_json::Value`] and
//! only accepts the exact enumerated literals. Nothing is coerced.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::approval::{Approval, ApprovalStatus, ApprovalType};
use crate::validation::{ValidationReport, ViolationRule};

/// Literal meaning "do not filter on this field".
pub const FILTER_ALL: &str = "all";

/// All valid values of the `status` filter field.
pub const STATUS_FILTER_VALUES: &[&str] = &[FILTER_ALL, "PENDING", "APPROVED", "REJECTED"];

/// All valid values of the `type` filter field.
pub const TYPE_FILTER_VALUES: &[&str] = &[
    FILTER_ALL,
    "BLOCK_CHANGE",
    "MASS_UPDATE",
    "SYNC_OPERATION",
    "CATEGORY_CHANGE",
    "TAG_UPDATE",
    "SEASONAL_TEMPLATE",
];

// ---------------------------------------------------------------------------
// Filter value types
// ---------------------------------------------------------------------------

/// Status dimension of an approval filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApprovalStatus),
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => FILTER_ALL,
            Self::Only(status) => status.as_str(),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        if s == FILTER_ALL {
            return Some(Self::All);
        }
        ApprovalStatus::from_str(s).map(Self::Only)
    }

    pub fn matches(&self, status: ApprovalStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

/// Type dimension of an approval filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(ApprovalType),
}

impl TypeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => FILTER_ALL,
            Self::Only(kind) => kind.as_str(),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        if s == FILTER_ALL {
            return Some(Self::All);
        }
        ApprovalType::from_str(s).map(Self::Only)
    }

    pub fn matches(&self, kind: ApprovalType) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == kind,
        }
    }
}

macro_rules! literal_serde {
    ($ty:ident, $values:ident) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                $ty::from_str(&raw).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "invalid value '{raw}', expected one of: {}",
                        $values.join(", ")
                    ))
                })
            }
        }
    };
}

literal_serde!(StatusFilter, STATUS_FILTER_VALUES);
literal_serde!(TypeFilter, TYPE_FILTER_VALUES);

/// A validated approval list query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalFilter {
    pub status: StatusFilter,
    #[serde(rename = "type")]
    pub approval_type: TypeFilter,
    /// Free text as typed by the user; normalize with
    /// [`sanitize_search_term`] before matching.
    pub search: String,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Parse untyped filter input into an [`ApprovalFilter`].
///
/// Every field is checked so the report lists all problems at once. Unknown
/// extra keys are ignored.
pub fn parse_filters(raw: &Value) -> Result<ApprovalFilter, ValidationReport> {
    let mut report = ValidationReport::new();

    let Some(obj) = raw.as_object() else {
        report.push(
            "filters",
            ViolationRule::Shape,
            "Filters must be a JSON object",
            Some(raw),
        );
        return Err(report);
    };

    let status = parse_literal_field(
        obj,
        "status",
        STATUS_FILTER_VALUES,
        StatusFilter::from_str,
        &mut report,
    );
    let approval_type = parse_literal_field(
        obj,
        "type",
        TYPE_FILTER_VALUES,
        TypeFilter::from_str,
        &mut report,
    );
    let search = match obj.get("search") {
        None | Some(Value::Null) => {
            report.push("search", ViolationRule::Required, "search is required", None);
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            report.push(
                "search",
                ViolationRule::TypeCheck,
                "search must be a string",
                Some(other),
            );
            None
        }
    };

    if !report.is_valid() {
        return Err(report);
    }
    match (status, approval_type, search) {
        (Some(status), Some(approval_type), Some(search)) => Ok(ApprovalFilter {
            status,
            approval_type,
            search,
        }),
        _ => Err(report),
    }
}

fn parse_literal_field<T>(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    allowed: &[&str],
    parse: fn(&str) -> Option<T>,
    report: &mut ValidationReport,
) -> Option<T> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            report.push(field, ViolationRule::Required, format!("{field} is required"), None);
            None
        }
        Some(Value::String(s)) => {
            let parsed = parse(s);
            if parsed.is_none() {
                report.push(
                    field,
                    ViolationRule::EnumValues,
                    format!("Invalid {field} '{s}'. Must be one of: {}", allowed.join(", ")),
                    obj.get(field),
                );
            }
            parsed
        }
        Some(other) => {
            report.push(
                field,
                ViolationRule::TypeCheck,
                format!("{field} must be a string"),
                Some(other),
            );
            None
        }
    }
}

/// Check untyped filter input before it is used to query the data store.
///
/// Returns `false` on any missing field, wrong kind or unknown literal. The
/// detailed report is logged at debug level and otherwise discarded.
pub fn validate_filters(raw: &Value) -> bool {
    match parse_filters(raw) {
        Ok(_) => true,
        Err(report) => {
            tracing::debug!(violations = %report.summary(), "Rejected approval filter");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Normalize search text: trim surrounding whitespace and lower-case.
///
/// Lower-casing is Unicode-aware, so accented letters keep their accents.
/// Idempotent.
pub fn sanitize_search_term(search: &str) -> String {
    search.trim().to_lowercase()
}

/// Whether `approval` satisfies every dimension of `filter`.
///
/// The search term matches case-insensitively as a substring of the title,
/// description, type literal or id. An empty term matches everything.
pub fn matches_filter(approval: &Approval, filter: &ApprovalFilter) -> bool {
    if !filter.status.matches(approval.status) {
        return false;
    }
    if !filter.approval_type.matches(approval.approval_type) {
        return false;
    }

    let term = sanitize_search_term(&filter.search);
    if term.is_empty() {
        return true;
    }

    approval.title.to_lowercase().contains(&term)
        || approval
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&term))
        || approval.approval_type.as_str().to_lowercase().contains(&term)
        || approval.id.to_string().contains(&term)
}

/// Approvals from `approvals` that match `filter`, in input order.
pub fn filter_approvals<'a>(
    approvals: &'a [Approval],
    filter: &ApprovalFilter,
) -> Vec<&'a Approval> {
    approvals
        .iter()
        .filter(|a| matches_filter(a, filter))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
