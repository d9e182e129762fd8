use askama::Template;
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::{Cookies, Key};

use super::{set_flash, take_flash};
use crate::{
    error::AppError,
    session::{CookieStorage, Session},
};

const MAX_CREDENTIAL_LEN: usize = 20;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: String,
    notice: String,
    username: String,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    error: String,
    success: bool,
    username: String,
    email: String,
}

#[derive(Template)]
#[template(path = "verification.html")]
struct VerificationTemplate {
    error: String,
    sent: bool,
    email: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
}

fn render_login(status: StatusCode, error: &str, username: &str) -> Result<Response, AppError> {
    let template = LoginTemplate {
        error: error.to_string(),
        notice: String::new(),
        username: username.to_string(),
    };
    Ok((status, Html(template.render()?)).into_response())
}

pub async fn login_page(cookies: Cookies) -> Result<Html<String>, AppError> {
    let template = LoginTemplate {
        error: String::new(),
        notice: take_flash(&cookies),
        username: String::new(),
    };
    Ok(Html(template.render()?))
}

pub async fn login(
    State(key): State<Key>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    // Credentials are compared exactly; trimming only decides blankness.
    let username = form.username.as_str();
    if username.trim().is_empty() || form.password.is_empty() {
        return render_login(StatusCode::BAD_REQUEST, "Please fill in all fields", username);
    }
    if username.len() > MAX_CREDENTIAL_LEN || form.password.len() > MAX_CREDENTIAL_LEN {
        return render_login(
            StatusCode::BAD_REQUEST,
            "Username and password must not exceed 20 characters.",
            username,
        );
    }

    let mut session = Session::restore(CookieStorage::new(cookies.clone(), key));
    if !session.login(username, &form.password) {
        return render_login(
            StatusCode::UNAUTHORIZED,
            &AppError::InvalidCredentials.to_string(),
            username,
        );
    }

    set_flash(&cookies, "Login Successful");
    Ok(Redirect::to("/dashboard").into_response())
}

pub async fn logout(State(key): State<Key>, cookies: Cookies) -> impl IntoResponse {
    Session::restore(CookieStorage::new(cookies.clone(), key)).logout();
    set_flash(&cookies, "You have been signed out");
    Redirect::to("/login")
}

pub async fn register_page() -> Result<Html<String>, AppError> {
    let template = RegisterTemplate {
        error: String::new(),
        success: false,
        username: String::new(),
        email: String::new(),
    };
    Ok(Html(template.render()?))
}

/// Validates an account request. Accounts are activated by an administrator,
/// so nothing is stored here.
pub async fn register(Form(form): Form<RegisterForm>) -> Result<Response, AppError> {
    let error = validate_registration(&form).err().unwrap_or_default();
    let status = if error.is_empty() {
        log::info!("Account requested for '{}'", form.username.trim());
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    let template = RegisterTemplate {
        success: error.is_empty(),
        error,
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
    };
    Ok((status, Html(template.render()?)).into_response())
}

pub async fn verification_page() -> Result<Html<String>, AppError> {
    let template = VerificationTemplate {
        error: String::new(),
        sent: false,
        email: String::new(),
    };
    Ok(Html(template.render()?))
}

#[derive(Deserialize)]
pub struct VerificationForm {
    #[serde(default)]
    email: String,
}

/// Validates a password reset request. No mail is sent from here.
pub async fn verification(Form(form): Form<VerificationForm>) -> Result<Response, AppError> {
    let email = form.email.trim();
    let (status, error) = if email.is_empty() {
        (StatusCode::BAD_REQUEST, "Please enter your email address".to_string())
    } else {
        log::info!("Password reset requested for '{}'", email);
        (StatusCode::OK, String::new())
    };

    let template = VerificationTemplate {
        sent: error.is_empty(),
        error,
        email: email.to_string(),
    };
    Ok((status, Html(template.render()?)).into_response())
}

fn validate_registration(form: &RegisterForm) -> Result<(), String> {
    let fields = [&form.username, &form.email, &form.password, &form.confirm_password];
    if fields.iter().any(|value| value.trim().is_empty()) {
        return Err("Please fill in all fields".into());
    }
    if form.password != form.confirm_password {
        return Err("Passwords do not match".into());
    }
    if form.password.len() < 6 {
        return Err("Password must be at least 6 characters long".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            username: "operator".into(),
            email: "operator@aero.example".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn registration_rules() {
        assert_eq!(
            validate_registration(&form("secret1", "secret2")).unwrap_err(),
            "Passwords do not match"
        );
        assert_eq!(
            validate_registration(&form("abc", "abc")).unwrap_err(),
            "Password must be at least 6 characters long"
        );
        assert_eq!(
            validate_registration(&form("", "")).unwrap_err(),
            "Please fill in all fields"
        );
        assert!(validate_registration(&form("secret1", "secret1")).is_ok());
    }
}
