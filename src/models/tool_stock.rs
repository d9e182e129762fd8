use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{DerivedMax, FieldKind, FieldSpec, Model, Record, DATE_FORMAT};
use crate::{
    analytics::Highlight,
    forms::{Draft, ValidationError},
    middleware::Portal,
    models::{ApprovalStatus, ToolStatus},
    repository::{
        postgres::{PgModel, PgQuery},
        Repositories, Repository,
    },
};

pub const TOOL_CATEGORIES: &[&str] = &[
    "Cutting Tools",
    "Measuring Tools",
    "Hand Tools",
    "Power Tools",
    "Safety Equipment",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ToolStock {
    #[serde(rename = "Tool_Name")]
    #[sqlx(rename = "Tool_Name")]
    pub tool_name: String,
    #[serde(rename = "Tool_ID")]
    #[sqlx(rename = "Tool_ID")]
    pub tool_id: String,
    #[serde(rename = "Category")]
    #[sqlx(rename = "Category")]
    pub category: String,
    #[serde(rename = "Quantity")]
    #[sqlx(rename = "Quantity")]
    pub quantity: i32,
    #[serde(rename = "Location")]
    #[sqlx(rename = "Location")]
    pub location: String,
    #[serde(rename = "Minimum_Stock")]
    #[sqlx(rename = "Minimum_Stock")]
    pub minimum_stock: i32,
    #[serde(rename = "Maximum_Stock")]
    #[sqlx(rename = "Maximum_Stock")]
    pub maximum_stock: i32,
    #[serde(rename = "Supplier")]
    #[sqlx(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Status")]
    #[sqlx(rename = "Status", try_from = "String")]
    pub status: ToolStatus,
}

impl Model for ToolStock {
    const LABEL: &'static str = "Tool Stock";
    const PLURAL: &'static str = "tool stocks";
    const API_PATH: &'static str = "toolstocks";
    const SLUG: &'static str = "toolstocks";
    const TABLE: &'static str = "tool_stocks";
    const PORTAL: Portal = Portal::ToolStocks;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("Tool_Name", "Tool Name", FieldKind::Text).aliases(&["toolName", "name"]),
        FieldSpec::new("Tool_ID", "Tool ID", FieldKind::Text).aliases(&["toolId"]),
        FieldSpec::new("Category", "Category", FieldKind::Suggest(TOOL_CATEGORIES))
            .aliases(&["category"]),
        FieldSpec::new("Quantity", "Quantity", FieldKind::Count).aliases(&["quantity"]),
        FieldSpec::new("Location", "Location", FieldKind::Text).aliases(&["location"]),
        FieldSpec::new("Minimum_Stock", "Minimum Stock", FieldKind::Count)
            .aliases(&["minStock", "minThreshold"]),
        FieldSpec::new("Maximum_Stock", "Maximum Stock", FieldKind::Count)
            .aliases(&["maxStock", "maxThreshold"]),
        FieldSpec::new("Supplier", "Supplier", FieldKind::Text).aliases(&["supplier"]),
        FieldSpec::new("Status", "Status", FieldKind::Choice(ToolStatus::LABELS))
            .aliases(&["status", "condition"]),
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "Tool_ID",
        "Tool_Name",
        "Category",
        "Quantity",
        "Location",
        "Minimum_Stock",
        "Status",
    ];
    const CATEGORY_FIELD: &'static str = "Category";
    const DERIVED_MAX: Option<DerivedMax> = Some(DerivedMax {
        base: "Minimum_Stock",
        max: "Maximum_Stock",
        multiple: 3,
    });

    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.tool_stocks.clone()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.tool_name.as_str(),
            self.tool_id.as_str(),
            self.location.as_str(),
        ]
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }

    fn to_draft(&self) -> Draft {
        Draft::new()
            .with("Tool_Name", &self.tool_name)
            .with("Tool_ID", &self.tool_id)
            .with("Category", &self.category)
            .with("Quantity", self.quantity.to_string())
            .with("Location", &self.location)
            .with("Minimum_Stock", self.minimum_stock.to_string())
            .with("Maximum_Stock", self.maximum_stock.to_string())
            .with("Supplier", &self.supplier)
            .with("Status", self.status.as_str())
    }

    fn from_draft(draft: &Draft) -> Result<Self, ValidationError> {
        Ok(Self {
            tool_name: draft.text("Tool_Name")?,
            tool_id: draft.text("Tool_ID")?,
            category: draft.text("Category")?,
            quantity: draft.count("Quantity")?,
            location: draft.text("Location")?,
            minimum_stock: draft.count("Minimum_Stock")?,
            maximum_stock: draft.count("Maximum_Stock")?,
            supplier: draft.text("Supplier")?,
            status: draft.choice("Status")?,
        })
    }

    /// Older tool records carried a physical condition instead of a status.
    fn legacy_value(column: &str, value: &str) -> Option<&'static str> {
        match (column, value) {
            ("Status", "Good") => Some(ToolStatus::Available.as_str()),
            ("Status", "Fair") => Some(ToolStatus::InUse.as_str()),
            ("Status", "Needs Repair") => Some(ToolStatus::Maintenance.as_str()),
            ("Status", "In Stock") => Some(ToolStatus::Available.as_str()),
            ("Status", "Reserved") => Some(ToolStatus::InUse.as_str()),
            _ => None,
        }
    }

    fn highlights(records: &[Record<Self>]) -> Vec<Highlight> {
        let units: i64 = records.iter().map(|r| i64::from(r.fields.quantity)).sum();
        let low = records
            .iter()
            .filter(|r| r.fields.quantity < r.fields.minimum_stock)
            .count();
        let maintenance = records
            .iter()
            .filter(|r| r.fields.status == ToolStatus::Maintenance)
            .count();

        vec![
            Highlight::new("Units on hand", units.to_string()),
            Highlight::new("Below minimum stock", low.to_string()),
            Highlight::new("In maintenance", maintenance.to_string()),
        ]
    }
}

impl PgModel for ToolStock {
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.tool_name)
            .bind(&self.tool_id)
            .bind(&self.category)
            .bind(self.quantity)
            .bind(&self.location)
            .bind(self.minimum_stock)
            .bind(self.maximum_stock)
            .bind(&self.supplier)
            .bind(self.status.as_str())
    }
}

/// A request to draw tools from stock, raised from the tool stock portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StockRequest {
    #[serde(rename = "Tool_Name")]
    #[sqlx(rename = "Tool_Name")]
    pub tool_name: String,
    #[serde(rename = "Tool_ID")]
    #[sqlx(rename = "Tool_ID")]
    pub tool_id: String,
    #[serde(rename = "Quantity")]
    #[sqlx(rename = "Quantity")]
    pub quantity: i32,
    #[serde(rename = "Requested_By")]
    #[sqlx(rename = "Requested_By")]
    pub requested_by: String,
    #[serde(rename = "Request_Date")]
    #[sqlx(rename = "Request_Date")]
    pub request_date: NaiveDate,
    #[serde(rename = "Status")]
    #[sqlx(rename = "Status", try_from = "String")]
    pub status: ApprovalStatus,
}

impl Model for StockRequest {
    const LABEL: &'static str = "Stock Request";
    const PLURAL: &'static str = "stock requests";
    const API_PATH: &'static str = "stockrequests";
    const SLUG: &'static str = "stockrequests";
    const TABLE: &'static str = "stock_requests";
    const PORTAL: Portal = Portal::ToolStocks;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("Tool_Name", "Tool Name", FieldKind::Text).aliases(&["toolName"]),
        FieldSpec::new("Tool_ID", "Tool ID", FieldKind::Text).aliases(&["toolId"]),
        FieldSpec::new("Quantity", "Quantity", FieldKind::Count).aliases(&["quantity"]),
        FieldSpec::new("Requested_By", "Requested By", FieldKind::Text)
            .aliases(&["requestedBy"]),
        FieldSpec::new("Request_Date", "Request Date", FieldKind::Date)
            .aliases(&["requestDate"]),
        FieldSpec::new("Status", "Status", FieldKind::Choice(ApprovalStatus::LABELS))
            .aliases(&["status"]),
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "Tool_ID",
        "Tool_Name",
        "Quantity",
        "Requested_By",
        "Request_Date",
        "Status",
    ];
    const CATEGORY_FIELD: &'static str = "Status";

    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.stock_requests.clone()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.tool_name.as_str(),
            self.tool_id.as_str(),
            self.requested_by.as_str(),
        ]
    }

    fn category(&self) -> &str {
        self.status.as_str()
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }

    fn to_draft(&self) -> Draft {
        Draft::new()
            .with("Tool_Name", &self.tool_name)
            .with("Tool_ID", &self.tool_id)
            .with("Quantity", self.quantity.to_string())
            .with("Requested_By", &self.requested_by)
            .with("Request_Date", self.request_date.format(DATE_FORMAT).to_string())
            .with("Status", self.status.as_str())
    }

    fn from_draft(draft: &Draft) -> Result<Self, ValidationError> {
        let quantity = draft.count("Quantity")?;
        if quantity == 0 {
            return Err(ValidationError::new("Quantity", "must be at least 1"));
        }

        Ok(Self {
            tool_name: draft.text("Tool_Name")?,
            tool_id: draft.text("Tool_ID")?,
            quantity,
            requested_by: draft.text("Requested_By")?,
            request_date: draft.date("Request_Date")?,
            status: draft.choice("Status")?,
        })
    }

    fn defaults() -> Draft {
        Draft::new()
            .with("Quantity", "1")
            .with(
                "Request_Date",
                Utc::now().date_naive().format(DATE_FORMAT).to_string(),
            )
            .with("Status", ApprovalStatus::Pending.as_str())
    }

    fn highlights(records: &[Record<Self>]) -> Vec<Highlight> {
        let pending = records
            .iter()
            .filter(|r| r.fields.status == ApprovalStatus::Pending)
            .count();
        vec![Highlight::new("Open requests", pending.to_string())]
    }
}

impl PgModel for StockRequest {
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.tool_name)
            .bind(&self.tool_id)
            .bind(self.quantity)
            .bind(&self.requested_by)
            .bind(self.request_date)
            .bind(self.status.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::legacy::normalize_pairs;

    #[test]
    fn legacy_condition_fills_a_complete_tool() {
        let draft = normalize_pairs::<ToolStock, _, _, _>([
            ("toolName", "Digital Caliper"),
            ("toolId", "MC-07"),
            ("category", "Measuring Tools"),
            ("quantity", "3"),
            ("location", "Crib A"),
            ("minStock", "2"),
            ("supplier", "Mitutoyo"),
            ("condition", "Good"),
        ]);

        let tool = ToolStock::from_draft(&draft).unwrap();
        assert_eq!(tool.status, ToolStatus::Available);
        assert_eq!(tool.maximum_stock, 6);
    }

    #[test]
    fn unknown_tool_status_is_rejected() {
        let draft = ToolStock::defaults().with("Status", "Lost");
        assert!(ToolStock::from_draft(&draft).is_err());
    }

    #[test]
    fn stock_request_needs_a_positive_quantity() {
        let draft = StockRequest::defaults()
            .with("Tool_Name", "End Mill")
            .with("Tool_ID", "CT-01")
            .with("Requested_By", "Operator 4")
            .with("Quantity", "0");
        let err = StockRequest::from_draft(&draft).unwrap_err();
        assert_eq!(err.field, "Quantity");
    }
}
