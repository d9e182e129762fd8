pub mod legacy;

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    error::AppError,
    models::{Model, Record, DATE_FORMAT, TIME_FORMAT},
    repository::{RepoError, Repository},
};

pub use legacy::normalize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

const DECIMAL_SCALE: u32 = 2;
// Ten integer digits.
const DECIMAL_LIMIT: i64 = 10_000_000_000;

/// In-progress form state: raw strings keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    values: BTreeMap<String, String>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.values.insert(column.to_string(), value.into());
    }

    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// The raw value, or "" when the column was never set.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn is_filled(&self, column: &str) -> bool {
        !self.get(column).trim().is_empty()
    }

    pub fn text(&self, column: &str) -> Result<String, ValidationError> {
        let value = self.get(column).trim();
        if value.is_empty() {
            return Err(ValidationError::new(column, "is required"));
        }
        Ok(value.to_string())
    }

    pub fn optional_text(&self, column: &str) -> String {
        self.get(column).trim().to_string()
    }

    pub fn email(&self, column: &str) -> Result<String, ValidationError> {
        let value = self.text(column)?;
        match value.split_once('@') {
            Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(value),
            _ => Err(ValidationError::new(column, "must be an email address")),
        }
    }

    pub fn count(&self, column: &str) -> Result<i32, ValidationError> {
        let value = self.text(column)?;
        let count: i32 = value
            .parse()
            .map_err(|_| ValidationError::new(column, "must be a whole number"))?;
        if count < 0 {
            return Err(ValidationError::new(column, "must not be negative"));
        }
        Ok(count)
    }

    /// Non-negative amount that fits a `NUMERIC(12, 2)` column.
    pub fn decimal(&self, column: &str) -> Result<Decimal, ValidationError> {
        let value = self.text(column)?;
        let amount = Decimal::from_str(&value)
            .map_err(|_| ValidationError::new(column, "must be a number"))?;
        if amount.is_sign_negative() {
            return Err(ValidationError::new(column, "must not be negative"));
        }
        if amount.normalize().scale() > DECIMAL_SCALE {
            return Err(ValidationError::new(
                column,
                format!("must have at most {} decimal places", DECIMAL_SCALE),
            ));
        }
        if amount >= Decimal::from(DECIMAL_LIMIT) {
            return Err(ValidationError::new(
                column,
                format!("must be less than {}", DECIMAL_LIMIT),
            ));
        }
        Ok(amount)
    }

    pub fn date(&self, column: &str) -> Result<NaiveDate, ValidationError> {
        let value = self.text(column)?;
        parse_date(&value).ok_or_else(|| ValidationError::new(column, "must be a date (YYYY-MM-DD)"))
    }

    pub fn optional_time(&self, column: &str) -> Result<Option<NaiveTime>, ValidationError> {
        let value = self.optional_text(column);
        if value.is_empty() {
            return Ok(None);
        }
        NaiveTime::parse_from_str(&value, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&value, "%H:%M:%S"))
            .map(Some)
            .map_err(|_| ValidationError::new(column, "must be a time (HH:MM)"))
    }

    pub fn choice<S: FromStr>(&self, column: &str) -> Result<S, ValidationError> {
        let value = self.text(column)?;
        value
            .parse()
            .map_err(|_| ValidationError::new(column, format!("has an unknown value '{}'", value)))
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(i64),
}

#[derive(Debug)]
pub struct Submission<M> {
    pub record: Record<M>,
    pub notice: String,
    pub redirect: String,
}

/// Binds one entity type's draft to its repository: prefills the draft and
/// turns a submitted draft into an add or an update.
pub struct FormController<M: Model> {
    repo: Arc<dyn Repository<M>>,
    mode: FormMode,
}

impl<M: Model> FormController<M> {
    pub fn new(repo: Arc<dyn Repository<M>>, mode: FormMode) -> Self {
        Self { repo, mode }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    /// Edit mode re-fetches the record by id; add mode starts from defaults.
    pub async fn draft(&self) -> Result<Draft, RepoError> {
        match self.mode {
            FormMode::Add => Ok(M::defaults()),
            FormMode::Edit(id) => Ok(self.repo.get(id).await?.fields.to_draft()),
        }
    }

    pub async fn submit(&self, draft: &Draft) -> Result<Submission<M>, AppError> {
        let fields = M::from_draft(draft)?;

        let (record, verb) = match self.mode {
            FormMode::Add => (self.repo.add(fields).await?, "Added"),
            FormMode::Edit(id) => (self.repo.update(id, fields).await?, "Updated"),
        };

        log::info!("{} {} (id {})", M::LABEL, verb.to_lowercase(), record.id);

        Ok(Submission {
            record,
            notice: format!("{} {}", M::LABEL, verb),
            redirect: format!("/{}", M::SLUG),
        })
    }
}
