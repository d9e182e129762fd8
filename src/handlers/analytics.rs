use askama::Template;
use axum::{extract::State, response::Html};
use tower_cookies::{Cookies, Key};

use crate::{
    analytics::{summarize, Summary},
    error::AppError,
    middleware::{require_portal, CurrentUser, Portal},
    models::{
        AttendanceRecord, Employee, LeaveRequest, Model, ProductionRecord, RawMaterial,
        StockRequest, ToolStock,
    },
    repository::{RepoError, Repositories},
};

#[derive(Template)]
#[template(path = "analytics.html")]
struct AnalyticsTemplate {
    user: CurrentUser,
    summaries: Vec<Summary>,
}

async fn summary<M: Model>(repos: &Repositories) -> Result<Summary, RepoError> {
    let records = repos.of::<M>().list().await?;
    Ok(summarize(&records))
}

/// Live summaries for every portal.
pub async fn overview(
    State(repos): State<Repositories>,
    State(key): State<Key>,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let (user, _) = require_portal(&cookies, &key, Portal::Analytics)?;

    let summaries = vec![
        summary::<Employee>(&repos).await?,
        summary::<AttendanceRecord>(&repos).await?,
        summary::<LeaveRequest>(&repos).await?,
        summary::<ToolStock>(&repos).await?,
        summary::<StockRequest>(&repos).await?,
        summary::<RawMaterial>(&repos).await?,
        summary::<ProductionRecord>(&repos).await?,
    ];

    let template = AnalyticsTemplate { user, summaries };
    Ok(Html(template.render()?))
}
