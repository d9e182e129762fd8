pub mod permission;

pub use permission::{
    get_current_user, require_full_access, require_portal, AccessLevel, CurrentUser, Portal,
    PortalLink, ANALYTICS_DENIED,
};
