pub mod attendance;
pub mod employee;
pub mod production;
pub mod raw_material;
pub mod status;
pub mod tool_stock;

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    analytics::Highlight,
    forms::{Draft, ValidationError},
    middleware::Portal,
    repository::{Repositories, Repository},
};

pub use attendance::{AttendanceRecord, LeaveRequest};
pub use employee::Employee;
pub use production::ProductionRecord;
pub use raw_material::RawMaterial;
pub use status::{ApprovalStatus, AttendanceStatus, EmployeeStatus, MaterialStatus, ToolStatus};
pub use tool_stock::{StockRequest, ToolStock};

/// A stored entity: the store-assigned id and creation time around the
/// entity's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<F> {
    pub id: i64,
    #[serde(flatten)]
    pub fields: F,
    #[serde(rename = "Created_At")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    /// Non-negative whole number.
    Count,
    Decimal,
    Date,
    Time,
    /// One of a fixed set of literals.
    Choice(&'static [&'static str]),
    /// Free text with suggested values.
    Suggest(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Storage column, also the wire name in JSON and HTML forms.
    pub column: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Older names for the same value, highest priority first.
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    pub const fn new(column: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            column,
            label,
            kind,
            required: true,
            aliases: &[],
        }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }
}

/// Fills a missing maximum from the minimum.
#[derive(Debug, Clone, Copy)]
pub struct DerivedMax {
    pub base: &'static str,
    pub max: &'static str,
    pub multiple: i32,
}

/// The domain fields of one entity type and everything the generic portal,
/// form and store code needs to know about it.
pub trait Model: Clone + Debug + PartialEq + Serialize + Send + Sync + Unpin + 'static {
    /// Singular display name, e.g. "Tool Stock".
    const LABEL: &'static str;
    /// Lowercase plural used in API error messages.
    const PLURAL: &'static str;
    /// Segment under `/api`.
    const API_PATH: &'static str;
    /// Portal page path segment.
    const SLUG: &'static str;
    const TABLE: &'static str;
    const PORTAL: Portal;
    const FIELDS: &'static [FieldSpec];
    /// Columns shown in the listing table.
    const LIST_COLUMNS: &'static [&'static str];
    /// Column the category filter matches against.
    const CATEGORY_FIELD: &'static str;
    const DERIVED_MAX: Option<DerivedMax> = None;

    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>>;

    fn search_fields(&self) -> Vec<&str>;

    fn category(&self) -> &str;

    fn status(&self) -> Option<&'static str>;

    fn to_draft(&self) -> Draft;

    fn from_draft(draft: &Draft) -> Result<Self, ValidationError>;

    /// Maps a historical value of `column` onto the current vocabulary.
    fn legacy_value(_column: &str, _value: &str) -> Option<&'static str> {
        None
    }

    /// Values offered by the category filter.
    fn category_options() -> Vec<String> {
        Self::FIELDS
            .iter()
            .find(|field| field.column == Self::CATEGORY_FIELD)
            .map(|field| match field.kind {
                FieldKind::Choice(values) | FieldKind::Suggest(values) => {
                    values.iter().map(|v| v.to_string()).collect()
                }
                _ => Vec::new(),
            })
            .unwrap_or_default()
    }

    fn defaults() -> Draft {
        let mut draft = Draft::new();
        for field in Self::FIELDS {
            let value = match field.kind {
                FieldKind::Choice(values) => values.first().copied().unwrap_or_default(),
                _ => "",
            };
            draft.set(field.column, value);
        }
        draft
    }

    fn highlights(_records: &[Record<Self>]) -> Vec<Highlight> {
        Vec::new()
    }
}

pub fn field<M: Model>(column: &str) -> Option<&'static FieldSpec> {
    M::FIELDS.iter().find(|field| field.column == column)
}

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M";
