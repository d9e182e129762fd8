pub mod analytics;
pub mod api;
pub mod auth;
pub mod portal;
pub mod upload;

use askama::Template;
use axum::{extract::State, response::Html};
use tower_cookies::{Cookie, Cookies, Key};

use crate::{
    error::AppError,
    middleware::{get_current_user, CurrentUser},
};

/// One-shot notice carried across a redirect.
pub const FLASH_KEY: &str = "aero_flash";

pub fn set_flash(cookies: &Cookies, message: &str) {
    let cookie = Cookie::build((FLASH_KEY, urlencoding::encode(message).into_owned()))
        .path("/")
        .http_only(true)
        .build();
    cookies.add(cookie);
}

/// Reads and clears the flash notice; "" when there is none.
pub fn take_flash(cookies: &Cookies) -> String {
    let Some(cookie) = cookies.get(FLASH_KEY) else {
        return String::new();
    };
    let message = urlencoding::decode(cookie.value())
        .map(|m| m.into_owned())
        .unwrap_or_default();
    cookies.remove(Cookie::build((FLASH_KEY, "")).path("/").build());
    message
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    user: CurrentUser,
    notice: String,
}

pub async fn dashboard(
    State(key): State<Key>,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let user = get_current_user(&cookies, &key).ok_or(AppError::LoginRequired)?;

    let template = DashboardTemplate {
        user,
        notice: take_flash(&cookies),
    };
    Ok(Html(template.render()?))
}
