use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{FieldKind, FieldSpec, Model, Record, DATE_FORMAT};
use crate::{
    analytics::Highlight,
    forms::{Draft, ValidationError},
    middleware::Portal,
    models::EmployeeStatus,
    repository::{
        postgres::{PgModel, PgQuery},
        Repositories, Repository,
    },
};

pub const DEPARTMENTS: &[&str] = &[
    "Engineering",
    "Production",
    "Quality Control",
    "Administration",
    "Maintenance",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    #[serde(rename = "Name")]
    #[sqlx(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    #[sqlx(rename = "Email")]
    pub email: String,
    // Column spelling is inherited from the legacy schema.
    #[serde(rename = "Departrment")]
    #[sqlx(rename = "Departrment")]
    pub department: String,
    #[serde(rename = "Position")]
    #[sqlx(rename = "Position")]
    pub position: String,
    #[serde(rename = "Phone")]
    #[sqlx(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Join_Date")]
    #[sqlx(rename = "Join_Date")]
    pub join_date: Option<NaiveDate>,
    #[serde(rename = "Status")]
    #[sqlx(rename = "Status", try_from = "String")]
    pub status: EmployeeStatus,
}

impl Model for Employee {
    const LABEL: &'static str = "Employee";
    const PLURAL: &'static str = "employees";
    const API_PATH: &'static str = "employees";
    const SLUG: &'static str = "employee";
    const TABLE: &'static str = "employees";
    const PORTAL: Portal = Portal::Employee;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("Name", "Full Name", FieldKind::Text).aliases(&["name"]),
        FieldSpec::new("Email", "Email", FieldKind::Email).aliases(&["email"]),
        FieldSpec::new("Departrment", "Department", FieldKind::Suggest(DEPARTMENTS))
            .aliases(&["Department", "department"]),
        FieldSpec::new("Position", "Position", FieldKind::Text).aliases(&["position"]),
        FieldSpec::new("Phone", "Phone", FieldKind::Text).aliases(&["phone"]),
        FieldSpec::new("Join_Date", "Join Date", FieldKind::Date)
            .optional()
            .aliases(&["joinDate"]),
        FieldSpec::new("Status", "Status", FieldKind::Choice(EmployeeStatus::LABELS))
            .aliases(&["status"]),
    ];
    const LIST_COLUMNS: &'static [&'static str] =
        &["Name", "Email", "Departrment", "Position", "Phone", "Status"];
    const CATEGORY_FIELD: &'static str = "Departrment";

    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.employees.clone()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.position.as_str()]
    }

    fn category(&self) -> &str {
        &self.department
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }

    fn to_draft(&self) -> Draft {
        Draft::new()
            .with("Name", &self.name)
            .with("Email", &self.email)
            .with("Departrment", &self.department)
            .with("Position", &self.position)
            .with("Phone", &self.phone)
            .with(
                "Join_Date",
                self.join_date
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
            )
            .with("Status", self.status.as_str())
    }

    fn from_draft(draft: &Draft) -> Result<Self, ValidationError> {
        let join_date = if draft.is_filled("Join_Date") {
            Some(draft.date("Join_Date")?)
        } else {
            None
        };

        Ok(Self {
            name: draft.text("Name")?,
            email: draft.email("Email")?,
            department: draft.text("Departrment")?,
            position: draft.text("Position")?,
            phone: draft.text("Phone")?,
            join_date,
            status: draft.choice("Status")?,
        })
    }

    fn highlights(records: &[Record<Self>]) -> Vec<Highlight> {
        let active = records
            .iter()
            .filter(|r| r.fields.status == EmployeeStatus::Active)
            .count();

        vec![
            Highlight::new("Active employees", active.to_string()),
            Highlight::new("Inactive employees", (records.len() - active).to_string()),
        ]
    }
}

impl PgModel for Employee {
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.name)
            .bind(&self.email)
            .bind(&self.department)
            .bind(&self.position)
            .bind(&self.phone)
            .bind(self.join_date)
            .bind(self.status.as_str())
    }
}
