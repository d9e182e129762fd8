use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tower_cookies::{Cookies, Key};

use super::{set_flash, take_flash, upload};
use crate::{
    analytics::{summarize, Summary},
    error::AppError,
    filters,
    forms::{legacy::normalize_pairs, Draft, FormController, FormMode},
    middleware::{require_full_access, require_portal, CurrentUser, Portal, ANALYTICS_DENIED},
    models::{field, FieldKind, Model, Record},
    repository::Repositories,
    search::{filter, ListQuery, ALL},
    state::AppState,
};

pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

pub struct Tab {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

pub struct Cell {
    pub text: String,
    /// Badge class; only the status column gets one.
    pub class: &'static str,
}

pub struct Row {
    pub id: i64,
    pub cells: Vec<Cell>,
}

/// Column holding the record's status literal, where the entity has one.
const STATUS_COLUMN: &str = "Status";

fn row<M: Model>(record: &Record<M>) -> Row {
    let draft = record.fields.to_draft();
    let cells = M::LIST_COLUMNS
        .iter()
        .map(|&column| {
            let text = draft.get(column).to_string();
            let class = if column == STATUS_COLUMN {
                filters::status_class(&text)
            } else {
                ""
            };
            Cell { text, class }
        })
        .collect();
    Row {
        id: record.id,
        cells,
    }
}

pub struct FormField {
    pub column: &'static str,
    pub label: &'static str,
    pub input: &'static str,
    pub value: String,
    pub required: bool,
    pub step: &'static str,
    pub options: Vec<SelectOption>,
    pub suggestions: Vec<&'static str>,
}

#[derive(Template)]
#[template(path = "portal/list.html")]
struct ListTemplate {
    user: CurrentUser,
    portal_title: &'static str,
    label: &'static str,
    slug: &'static str,
    notice: String,
    search: String,
    category_label: &'static str,
    categories: Vec<SelectOption>,
    headers: Vec<&'static str>,
    rows: Vec<Row>,
    total: usize,
    can_modify: bool,
    can_view_analytics: bool,
    sections: Vec<Tab>,
}

#[derive(Template)]
#[template(path = "portal/analytics.html")]
struct AnalyticsTabTemplate {
    user: CurrentUser,
    portal_title: &'static str,
    slug: &'static str,
    summary: Summary,
    sections: Vec<Tab>,
}

#[derive(Template)]
#[template(path = "portal/form.html")]
struct FormTemplate {
    user: CurrentUser,
    title: String,
    slug: &'static str,
    action: String,
    is_edit: bool,
    error: String,
    fields: Vec<FormField>,
}

/// Every page of one entity type's portal.
pub fn routes<M: Model>() -> Router<AppState> {
    let base = format!("/{}", M::SLUG);
    Router::new()
        .route(&base, get(list::<M>).post(create::<M>))
        .route(&format!("{}/new", base), get(new_form::<M>))
        .route(&format!("{}/upload", base), post(upload::upload::<M>))
        .route(&format!("{}/:id", base), post(update::<M>))
        .route(&format!("{}/:id/edit", base), get(edit_form::<M>))
        .route(&format!("{}/:id/delete", base), post(delete::<M>))
}

/// Entity pages grouped under one portal, e.g. attendance and leave.
fn sections(portal: Portal, active: &str) -> Vec<Tab> {
    let entries: &[(&'static str, &'static str)] = match portal {
        Portal::Attendance => &[("Attendance", "attendance"), ("Leave", "leave")],
        Portal::ToolStocks => &[("Tool Stock", "toolstocks"), ("Stock Requests", "stockrequests")],
        _ => &[],
    };
    entries
        .iter()
        .map(|&(label, slug)| Tab {
            label,
            href: format!("/{}", slug),
            active: slug == active,
        })
        .collect()
}

fn column_label<M: Model>(column: &'static str) -> &'static str {
    field::<M>(column).map(|f| f.label).unwrap_or(column)
}

pub async fn list<M: Model>(
    State(repos): State<Repositories>,
    State(key): State<Key>,
    cookies: Cookies,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let (user, level) = require_portal(&cookies, &key, M::PORTAL)?;
    let records = repos.of::<M>().list().await?;

    if query.tab == "analytics" {
        if !level.can_view_analytics() {
            return Err(AppError::Forbidden(ANALYTICS_DENIED.into()));
        }
        let template = AnalyticsTabTemplate {
            user,
            portal_title: M::PORTAL.title(),
            slug: M::SLUG,
            summary: summarize(&records),
            sections: sections(M::PORTAL, M::SLUG),
        };
        return Ok(Html(template.render()?));
    }

    let category = query.category_or_all();
    let rows = filter(&records, &query.search, category)
        .into_iter()
        .map(row)
        .collect();

    let categories = std::iter::once(ALL.to_string())
        .chain(M::category_options())
        .map(|value| SelectOption {
            selected: value == category,
            value,
        })
        .collect();

    let template = ListTemplate {
        portal_title: M::PORTAL.title(),
        label: M::LABEL,
        slug: M::SLUG,
        notice: take_flash(&cookies),
        search: query.search.clone(),
        category_label: column_label::<M>(M::CATEGORY_FIELD),
        categories,
        headers: M::LIST_COLUMNS.iter().map(|&c| column_label::<M>(c)).collect(),
        rows,
        total: records.len(),
        can_modify: level.can_modify(),
        can_view_analytics: level.can_view_analytics(),
        sections: sections(M::PORTAL, M::SLUG),
        user,
    };
    Ok(Html(template.render()?))
}

fn form_fields<M: Model>(draft: &Draft) -> Vec<FormField> {
    M::FIELDS
        .iter()
        .map(|spec| {
            let value = draft.get(spec.column).to_string();
            let mut field = FormField {
                column: spec.column,
                label: spec.label,
                input: "text",
                value,
                required: spec.required,
                step: "",
                options: Vec::new(),
                suggestions: Vec::new(),
            };
            match spec.kind {
                FieldKind::Text => {}
                FieldKind::Email => field.input = "email",
                FieldKind::Count => {
                    field.input = "number";
                    field.step = "1";
                }
                FieldKind::Decimal => {
                    field.input = "number";
                    field.step = "0.01";
                }
                FieldKind::Date => field.input = "date",
                FieldKind::Time => field.input = "time",
                FieldKind::Choice(values) => {
                    field.input = "select";
                    field.options = values
                        .iter()
                        .map(|v| SelectOption {
                            value: v.to_string(),
                            selected: *v == field.value,
                        })
                        .collect();
                }
                FieldKind::Suggest(values) => field.suggestions = values.to_vec(),
            }
            field
        })
        .collect()
}

fn form_page<M: Model>(
    user: CurrentUser,
    mode: FormMode,
    draft: &Draft,
    error: String,
) -> Result<String, AppError> {
    let (title, action, is_edit) = match mode {
        FormMode::Add => (format!("Add {}", M::LABEL), format!("/{}", M::SLUG), false),
        FormMode::Edit(id) => (
            format!("Edit {}", M::LABEL),
            format!("/{}/{}", M::SLUG, id),
            true,
        ),
    };

    let template = FormTemplate {
        user,
        title,
        slug: M::SLUG,
        action,
        is_edit,
        error,
        fields: form_fields::<M>(draft),
    };
    Ok(template.render()?)
}

async fn submit<M: Model>(
    cookies: &Cookies,
    user: CurrentUser,
    controller: FormController<M>,
    draft: Draft,
) -> Result<Response, AppError> {
    match controller.submit(&draft).await {
        Ok(submission) => {
            set_flash(cookies, &submission.notice);
            Ok(Redirect::to(&submission.redirect).into_response())
        }
        Err(AppError::Validation(err)) => {
            let page = form_page::<M>(user, controller.mode(), &draft, err.to_string())?;
            Ok((StatusCode::BAD_REQUEST, Html(page)).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn new_form<M: Model>(
    State(repos): State<Repositories>,
    State(key): State<Key>,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let (user, _) = require_portal(&cookies, &key, M::PORTAL)?;
    let controller = FormController::new(repos.of::<M>(), FormMode::Add);
    let draft = controller.draft().await?;
    Ok(Html(form_page::<M>(user, controller.mode(), &draft, String::new())?))
}

pub async fn create<M: Model>(
    State(repos): State<Repositories>,
    State(key): State<Key>,
    cookies: Cookies,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let (user, _) = require_portal(&cookies, &key, M::PORTAL)?;
    let controller = FormController::new(repos.of::<M>(), FormMode::Add);
    submit(&cookies, user, controller, normalize_pairs::<M, _, _, _>(pairs)).await
}

pub async fn edit_form<M: Model>(
    State(repos): State<Repositories>,
    State(key): State<Key>,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let user = require_full_access(&cookies, &key, M::PORTAL)?;
    let controller = FormController::new(repos.of::<M>(), FormMode::Edit(id));
    let draft = controller.draft().await?;
    Ok(Html(form_page::<M>(user, controller.mode(), &draft, String::new())?))
}

pub async fn update<M: Model>(
    State(repos): State<Repositories>,
    State(key): State<Key>,
    cookies: Cookies,
    Path(id): Path<i64>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let user = require_full_access(&cookies, &key, M::PORTAL)?;
    let controller = FormController::new(repos.of::<M>(), FormMode::Edit(id));
    submit(&cookies, user, controller, normalize_pairs::<M, _, _, _>(pairs)).await
}

pub async fn delete<M: Model>(
    State(repos): State<Repositories>,
    State(key): State<Key>,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    require_full_access(&cookies, &key, M::PORTAL)?;
    repos.of::<M>().delete(id).await?;
    log::info!("{} {} deleted", M::LABEL, id);
    set_flash(&cookies, &format!("{} Deleted", M::LABEL));
    Ok(Redirect::to(&format!("/{}", M::SLUG)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, EmployeeStatus};
    use chrono::Utc;

    #[test]
    fn only_the_status_column_gets_a_badge() {
        let record = Record {
            id: 7,
            fields: Employee {
                name: "Lin".into(),
                email: "lin@aero.example".into(),
                department: "Maintenance".into(),
                position: "Fitter".into(),
                phone: "555-0101".into(),
                join_date: None,
                status: EmployeeStatus::Active,
            },
            created_at: Utc::now(),
        };

        let row = row(&record);
        let classes: Vec<(&str, &str)> = row
            .cells
            .iter()
            .map(|cell| (cell.text.as_str(), cell.class))
            .collect();

        assert_eq!(row.id, 7);
        assert!(classes.contains(&("Maintenance", "")));
        assert!(classes.contains(&("Active", "badge badge-ok")));
    }
}
