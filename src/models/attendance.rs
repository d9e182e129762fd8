use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{FieldKind, FieldSpec, Model, Record, DATE_FORMAT, TIME_FORMAT};
use crate::{
    analytics::Highlight,
    forms::{Draft, ValidationError},
    middleware::Portal,
    models::{ApprovalStatus, AttendanceStatus},
    repository::{
        postgres::{PgModel, PgQuery},
        Repositories, Repository,
    },
};

pub const LEAVE_TYPES: &[&str] = &[
    "Sick Leave",
    "Casual Leave",
    "Annual Leave",
    "Maternity Leave",
    "Unpaid Leave",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    #[serde(rename = "Employee_ID")]
    #[sqlx(rename = "Employee_ID")]
    pub employee_id: String,
    #[serde(rename = "Employee_Name")]
    #[sqlx(rename = "Employee_Name")]
    pub employee_name: String,
    #[serde(rename = "Date")]
    #[sqlx(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Check_In_Time")]
    #[sqlx(rename = "Check_In_Time")]
    pub check_in: Option<NaiveTime>,
    #[serde(rename = "Check_Out_TIme")]
    #[sqlx(rename = "Check_Out_TIme")]
    pub check_out: Option<NaiveTime>,
    #[serde(rename = "Status")]
    #[sqlx(rename = "Status", try_from = "String")]
    pub status: AttendanceStatus,
}

fn time_text(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}

impl Model for AttendanceRecord {
    const LABEL: &'static str = "Attendance Record";
    const PLURAL: &'static str = "attendance records";
    const API_PATH: &'static str = "attendance";
    const SLUG: &'static str = "attendance";
    const TABLE: &'static str = "attendance_records";
    const PORTAL: Portal = Portal::Attendance;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("Employee_ID", "Employee ID", FieldKind::Text).aliases(&["employeeId"]),
        FieldSpec::new("Employee_Name", "Employee Name", FieldKind::Text)
            .aliases(&["employeeName"]),
        FieldSpec::new("Date", "Date", FieldKind::Date).aliases(&["date"]),
        FieldSpec::new("Check_In_Time", "Check In", FieldKind::Time)
            .optional()
            .aliases(&["checkIn"]),
        FieldSpec::new("Check_Out_TIme", "Check Out", FieldKind::Time)
            .optional()
            .aliases(&["Check_Out_Time", "checkOut"]),
        FieldSpec::new("Status", "Status", FieldKind::Choice(AttendanceStatus::LABELS))
            .aliases(&["status"]),
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "Employee_ID",
        "Employee_Name",
        "Date",
        "Check_In_Time",
        "Check_Out_TIme",
        "Status",
    ];
    const CATEGORY_FIELD: &'static str = "Status";

    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.attendance.clone()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.employee_name.as_str(), self.employee_id.as_str()]
    }

    fn category(&self) -> &str {
        self.status.as_str()
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }

    fn to_draft(&self) -> Draft {
        Draft::new()
            .with("Employee_ID", &self.employee_id)
            .with("Employee_Name", &self.employee_name)
            .with("Date", self.date.format(DATE_FORMAT).to_string())
            .with("Check_In_Time", time_text(self.check_in))
            .with("Check_Out_TIme", time_text(self.check_out))
            .with("Status", self.status.as_str())
    }

    fn from_draft(draft: &Draft) -> Result<Self, ValidationError> {
        let check_in = draft.optional_time("Check_In_Time")?;
        let check_out = draft.optional_time("Check_Out_TIme")?;
        if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
            if check_out < check_in {
                return Err(ValidationError::new(
                    "Check_Out_TIme",
                    "must not be earlier than check in",
                ));
            }
        }

        Ok(Self {
            employee_id: draft.text("Employee_ID")?,
            employee_name: draft.text("Employee_Name")?,
            date: draft.date("Date")?,
            check_in,
            check_out,
            status: draft.choice("Status")?,
        })
    }

    fn defaults() -> Draft {
        Draft::new()
            .with("Date", Utc::now().date_naive().format(DATE_FORMAT).to_string())
            .with("Status", AttendanceStatus::Present.as_str())
    }

    fn highlights(records: &[Record<Self>]) -> Vec<Highlight> {
        let on_time = records
            .iter()
            .filter(|r| r.fields.status == AttendanceStatus::Present)
            .count();
        vec![Highlight::new(
            "Attendance rate",
            Highlight::percent(on_time, records.len()),
        )]
    }
}

impl PgModel for AttendanceRecord {
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.employee_id)
            .bind(&self.employee_name)
            .bind(self.date)
            .bind(self.check_in)
            .bind(self.check_out)
            .bind(self.status.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LeaveRequest {
    #[serde(rename = "Employee_ID")]
    #[sqlx(rename = "Employee_ID")]
    pub employee_id: String,
    #[serde(rename = "Employee_Name")]
    #[sqlx(rename = "Employee_Name")]
    pub employee_name: String,
    #[serde(rename = "Leave_Type")]
    #[sqlx(rename = "Leave_Type")]
    pub leave_type: String,
    #[serde(rename = "Start_Date")]
    #[sqlx(rename = "Start_Date")]
    pub start_date: NaiveDate,
    #[serde(rename = "End_Date")]
    #[sqlx(rename = "End_Date")]
    pub end_date: NaiveDate,
    #[serde(rename = "Reason")]
    #[sqlx(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "Manager_Email_ID")]
    #[sqlx(rename = "Manager_Email_ID")]
    pub manager_email: String,
    #[serde(rename = "Status")]
    #[sqlx(rename = "Status", try_from = "String")]
    pub status: ApprovalStatus,
}

impl Model for LeaveRequest {
    const LABEL: &'static str = "Leave Request";
    const PLURAL: &'static str = "leave records";
    const API_PATH: &'static str = "leave";
    const SLUG: &'static str = "leave";
    const TABLE: &'static str = "leave_requests";
    const PORTAL: Portal = Portal::Attendance;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("Employee_ID", "Employee ID", FieldKind::Text).aliases(&["employeeId"]),
        FieldSpec::new("Employee_Name", "Employee Name", FieldKind::Text)
            .aliases(&["employeeName"]),
        FieldSpec::new("Leave_Type", "Leave Type", FieldKind::Suggest(LEAVE_TYPES))
            .aliases(&["leaveType"]),
        FieldSpec::new("Start_Date", "Start Date", FieldKind::Date).aliases(&["startDate"]),
        FieldSpec::new("End_Date", "End Date", FieldKind::Date).aliases(&["endDate"]),
        FieldSpec::new("Reason", "Reason", FieldKind::Text).aliases(&["reason"]),
        FieldSpec::new("Manager_Email_ID", "Manager Email", FieldKind::Email)
            .aliases(&["managerEmail"]),
        FieldSpec::new("Status", "Status", FieldKind::Choice(ApprovalStatus::LABELS))
            .aliases(&["status"]),
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "Employee_ID",
        "Employee_Name",
        "Leave_Type",
        "Start_Date",
        "End_Date",
        "Status",
    ];
    const CATEGORY_FIELD: &'static str = "Status";

    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.leave.clone()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.employee_name.as_str(),
            self.employee_id.as_str(),
            self.leave_type.as_str(),
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
            .with("Employee_ID", &self.employee_id)
            .with("Employee_Name", &self.employee_name)
            .with("Leave_Type", &self.leave_type)
            .with("Start_Date", self.start_date.format(DATE_FORMAT).to_string())
            .with("End_Date", self.end_date.format(DATE_FORMAT).to_string())
            .with("Reason", &self.reason)
            .with("Manager_Email_ID", &self.manager_email)
            .with("Status", self.status.as_str())
    }

    fn from_draft(draft: &Draft) -> Result<Self, ValidationError> {
        let start_date = draft.date("Start_Date")?;
        let end_date = draft.date("End_Date")?;
        if end_date < start_date {
            return Err(ValidationError::new(
                "End_Date",
                "must not be before the start date",
            ));
        }

        Ok(Self {
            employee_id: draft.text("Employee_ID")?,
            employee_name: draft.text("Employee_Name")?,
            leave_type: draft.text("Leave_Type")?,
            start_date,
            end_date,
            reason: draft.text("Reason")?,
            manager_email: draft.email("Manager_Email_ID")?,
            status: draft.choice("Status")?,
        })
    }

    fn highlights(records: &[Record<Self>]) -> Vec<Highlight> {
        let pending = records
            .iter()
            .filter(|r| r.fields.status == ApprovalStatus::Pending)
            .count();
        let days: i64 = records
            .iter()
            .filter(|r| r.fields.status == ApprovalStatus::Approved)
            .map(|r| (r.fields.end_date - r.fields.start_date).num_days() + 1)
            .sum();

        vec![
            Highlight::new("Pending requests", pending.to_string()),
            Highlight::new("Approved leave days", days.to_string()),
        ]
    }
}

impl PgModel for LeaveRequest {
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.employee_id)
            .bind(&self.employee_name)
            .bind(&self.leave_type)
            .bind(self.start_date)
            .bind(self.end_date)
            .bind(&self.reason)
            .bind(&self.manager_email)
            .bind(self.status.as_str())
    }
}
