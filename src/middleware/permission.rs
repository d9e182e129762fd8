use serde::Serialize;
use tower_cookies::{Cookies, Key};

use crate::{
    error::AppError,
    session::{CookieStorage, Identity, Role, Session},
};

pub const ANALYTICS_DENIED: &str = "Guest users don't have access to analytics features";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Portal {
    Employee,
    Attendance,
    ToolStocks,
    RawMaterials,
    Production,
    Analytics,
}

impl Portal {
    pub const ALL: [Portal; 6] = [
        Portal::Employee,
        Portal::Attendance,
        Portal::ToolStocks,
        Portal::RawMaterials,
        Portal::Production,
        Portal::Analytics,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Portal::Employee => "Employee Portal",
            Portal::Attendance => "Attendance Portal",
            Portal::ToolStocks => "Tool Stock Portal",
            Portal::RawMaterials => "Raw Materials Portal",
            Portal::Production => "Production Portal",
            Portal::Analytics => "Analytics",
        }
    }

    /// Landing page of the portal.
    pub fn path(self) -> &'static str {
        match self {
            Portal::Employee => "/employee",
            Portal::Attendance => "/attendance",
            Portal::ToolStocks => "/toolstocks",
            Portal::RawMaterials => "/rawmaterials",
            Portal::Production => "/production",
            Portal::Analytics => "/analytics",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Portal::Employee => "Manage employee records and departments",
            Portal::Attendance => "Track daily attendance and leave requests",
            Portal::ToolStocks => "Tool inventory and stock requests",
            Portal::RawMaterials => "Raw material stock and suppliers",
            Portal::Production => "Shift output and rejections",
            Portal::Analytics => "Summaries across every portal",
        }
    }
}

/// What a role may do inside a portal it can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// List, add, edit, delete, upload and analytics.
    Full,
    /// List and add only.
    Input,
}

impl AccessLevel {
    pub fn can_modify(self) -> bool {
        self == AccessLevel::Full
    }

    pub fn can_view_analytics(self) -> bool {
        self == AccessLevel::Full
    }
}

pub fn access(role: Role, portal: Portal) -> Option<AccessLevel> {
    match (role, portal) {
        (Role::Admin, _) => Some(AccessLevel::Full),
        (Role::Guest, Portal::Attendance | Portal::Production) => Some(AccessLevel::Input),
        (Role::Guest, _) => None,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PortalLink {
    pub title: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    pub input_only: bool,
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
    // Helper properties for templates
    pub is_admin: bool,
    pub portals: Vec<PortalLink>,
}

impl CurrentUser {
    pub fn from_identity(identity: Identity) -> Self {
        let portals = Portal::ALL
            .iter()
            .filter_map(|&portal| {
                access(identity.role, portal).map(|level| PortalLink {
                    title: portal.title(),
                    path: portal.path(),
                    description: portal.description(),
                    input_only: !level.can_modify(),
                })
            })
            .collect();

        Self {
            is_admin: identity.role == Role::Admin,
            username: identity.username,
            role: identity.role,
            portals,
        }
    }

    pub fn role_name(&self) -> &'static str {
        self.role.as_str()
    }

    pub fn access(&self, portal: Portal) -> Option<AccessLevel> {
        access(self.role, portal)
    }
}

pub fn get_current_user(cookies: &Cookies, key: &Key) -> Option<CurrentUser> {
    let session = Session::restore(CookieStorage::new(cookies.clone(), key.clone()));
    session.current().cloned().map(CurrentUser::from_identity)
}

/// Signed-in user and their access level for `portal`.
pub fn require_portal(
    cookies: &Cookies,
    key: &Key,
    portal: Portal,
) -> Result<(CurrentUser, AccessLevel), AppError> {
    let user = get_current_user(cookies, key).ok_or(AppError::LoginRequired)?;
    match user.access(portal) {
        Some(level) => Ok((user, level)),
        None if portal == Portal::Analytics => Err(AppError::Forbidden(ANALYTICS_DENIED.into())),
        None => Err(AppError::Forbidden(format!(
            "Your role does not have access to the {}",
            portal.title()
        ))),
    }
}

/// Like [`require_portal`] but also requires full access.
pub fn require_full_access(
    cookies: &Cookies,
    key: &Key,
    portal: Portal,
) -> Result<CurrentUser, AppError> {
    let (user, level) = require_portal(cookies, key, portal)?;
    if !level.can_modify() {
        return Err(AppError::Forbidden(format!(
            "Your role can only view and add records in the {}",
            portal.title()
        )));
    }
    Ok(user)
}
