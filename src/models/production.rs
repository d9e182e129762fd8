use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{FieldKind, FieldSpec, Model, Record, DATE_FORMAT};
use crate::{
    analytics::Highlight,
    forms::{Draft, ValidationError},
    middleware::Portal,
    repository::{
        postgres::{PgModel, PgQuery},
        Repositories, Repository,
    },
};

pub const SHIFTS: &[&str] = &["Morning", "Evening", "Night"];

pub const REJECTION_REASONS: &[&str] = &[
    "Surface finishing",
    "Inner diameter finishing",
    "Total Thickness out",
    "Hole chipped",
    "Hole finishing",
    "Setting mistake",
    "Tool Broken",
    "Tapper surface",
    "Slot Over/below size",
];

/// One shift's output for a machined component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProductionRecord {
    #[serde(rename = "Date")]
    #[sqlx(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Shift")]
    #[sqlx(rename = "Shift")]
    pub shift: String,
    #[serde(rename = "Component_Name")]
    #[sqlx(rename = "Component_Name")]
    pub component_name: String,
    #[serde(rename = "Project_Name")]
    #[sqlx(rename = "Project_Name")]
    pub project_name: String,
    #[serde(rename = "Total_Machined_Quantity")]
    #[sqlx(rename = "Total_Machined_Quantity")]
    pub machined: i32,
    #[serde(rename = "Total_Finished_Quantity")]
    #[sqlx(rename = "Total_Finished_Quantity")]
    pub finished: i32,
    #[serde(rename = "Total_Rejection_Quantity")]
    #[sqlx(rename = "Total_Rejection_Quantity")]
    pub rejected: i32,
    #[serde(rename = "Rejection_Reason")]
    #[sqlx(rename = "Rejection_Reason")]
    pub rejection_reason: String,
    #[serde(rename = "Operator_Name")]
    #[sqlx(rename = "Operator_Name")]
    pub operator_name: String,
}

impl Model for ProductionRecord {
    const LABEL: &'static str = "Production Record";
    const PLURAL: &'static str = "production records";
    const API_PATH: &'static str = "production";
    const SLUG: &'static str = "production";
    const TABLE: &'static str = "production_records";
    const PORTAL: Portal = Portal::Production;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("Date", "Date", FieldKind::Date).aliases(&["date"]),
        FieldSpec::new("Shift", "Shift", FieldKind::Suggest(SHIFTS)).aliases(&["shift"]),
        FieldSpec::new("Component_Name", "Component", FieldKind::Text)
            .aliases(&["componentName"]),
        FieldSpec::new("Project_Name", "Project", FieldKind::Text).aliases(&["projectName"]),
        FieldSpec::new("Total_Machined_Quantity", "Machined", FieldKind::Count)
            .aliases(&["totalMachinedQuantity"]),
        FieldSpec::new("Total_Finished_Quantity", "Finished", FieldKind::Count)
            .aliases(&["totalFinishedQuantity"]),
        FieldSpec::new("Total_Rejection_Quantity", "Rejected", FieldKind::Count)
            .aliases(&["totalRejectionQuantity"]),
        FieldSpec::new(
            "Rejection_Reason",
            "Rejection Reason",
            FieldKind::Suggest(REJECTION_REASONS),
        )
        .optional()
        .aliases(&["rejectionReason"]),
        FieldSpec::new("Operator_Name", "Operator", FieldKind::Text).aliases(&["operatorName"]),
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "Date",
        "Shift",
        "Component_Name",
        "Project_Name",
        "Total_Machined_Quantity",
        "Total_Finished_Quantity",
        "Total_Rejection_Quantity",
        "Operator_Name",
    ];
    const CATEGORY_FIELD: &'static str = "Shift";

    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.production.clone()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.component_name.as_str(),
            self.project_name.as_str(),
            self.operator_name.as_str(),
        ]
    }

    fn category(&self) -> &str {
        &self.shift
    }

    fn status(&self) -> Option<&'static str> {
        None
    }

    fn to_draft(&self) -> Draft {
        Draft::new()
            .with("Date", self.date.format(DATE_FORMAT).to_string())
            .with("Shift", &self.shift)
            .with("Component_Name", &self.component_name)
            .with("Project_Name", &self.project_name)
            .with("Total_Machined_Quantity", self.machined.to_string())
            .with("Total_Finished_Quantity", self.finished.to_string())
            .with("Total_Rejection_Quantity", self.rejected.to_string())
            .with("Rejection_Reason", &self.rejection_reason)
            .with("Operator_Name", &self.operator_name)
    }

    fn from_draft(draft: &Draft) -> Result<Self, ValidationError> {
        let rejected = draft.count("Total_Rejection_Quantity")?;
        let rejection_reason = draft.optional_text("Rejection_Reason");
        if rejected > 0 && rejection_reason.is_empty() {
            return Err(ValidationError::new(
                "Rejection_Reason",
                "is required when parts were rejected",
            ));
        }

        Ok(Self {
            date: draft.date("Date")?,
            shift: draft.text("Shift")?,
            component_name: draft.text("Component_Name")?,
            project_name: draft.text("Project_Name")?,
            machined: draft.count("Total_Machined_Quantity")?,
            finished: draft.count("Total_Finished_Quantity")?,
            rejected,
            rejection_reason,
            operator_name: draft.text("Operator_Name")?,
        })
    }

    fn defaults() -> Draft {
        Draft::new()
            .with("Date", Utc::now().date_naive().format(DATE_FORMAT).to_string())
            .with("Shift", SHIFTS[0])
            .with("Total_Rejection_Quantity", "0")
    }

    fn highlights(records: &[Record<Self>]) -> Vec<Highlight> {
        let machined: i64 = records.iter().map(|r| i64::from(r.fields.machined)).sum();
        let finished: i64 = records.iter().map(|r| i64::from(r.fields.finished)).sum();
        let rejected: i64 = records.iter().map(|r| i64::from(r.fields.rejected)).sum();

        vec![
            Highlight::new("Total machined", machined.to_string()),
            Highlight::new("Total finished", finished.to_string()),
            Highlight::new("Total rejected", rejected.to_string()),
            Highlight::new(
                "Rejection rate",
                Highlight::percent(rejected as usize, machined as usize),
            ),
        ]
    }
}

impl PgModel for ProductionRecord {
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.date)
            .bind(&self.shift)
            .bind(&self.component_name)
            .bind(&self.project_name)
            .bind(self.machined)
            .bind(self.finished)
            .bind(self.rejected)
            .bind(&self.rejection_reason)
            .bind(&self.operator_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(machined: i32, rejected: i32) -> Record<ProductionRecord> {
        Record {
            id: 1,
            fields: ProductionRecord {
                date: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
                shift: "Morning".into(),
                component_name: "Bracket".into(),
                project_name: "A320".into(),
                machined,
                finished: machined - rejected,
                rejected,
                rejection_reason: if rejected > 0 { "Hole chipped".into() } else { String::new() },
                operator_name: "R. Kumar".into(),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rejection_reason_required_only_with_rejections() {
        let mut draft = run(100, 5).fields.to_draft();
        draft.set("Rejection_Reason", "");
        let err = ProductionRecord::from_draft(&draft).unwrap_err();
        assert_eq!(err.field, "Rejection_Reason");

        let draft = run(100, 0).fields.to_draft();
        assert!(ProductionRecord::from_draft(&draft).is_ok());
    }

    #[test]
    fn rejection_rate_over_all_runs() {
        let highlights = ProductionRecord::highlights(&[run(100, 5), run(100, 15)]);
        let rate = highlights.iter().find(|h| h.label == "Rejection rate").unwrap();
        assert_eq!(rate.value, "10.0%");
    }
}
