use tracing::debug;
use url::form_urlencoded;

use super::route::{RouteMeta, RouteTable};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
/// Query parameter carrying the originally requested path on a login redirect.
pub const REDIRECT_PARAM: &str = "redirect";

/// The two session facts a navigation decision depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessSnapshot {
    pub is_logged_in: bool,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    LoginRequired,
    AdminRequired,
    GuestOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Where to send the user after logging in.
    pub return_to: Option<String>,
    pub reason: RedirectReason,
}

impl Redirect {
    /// The location to navigate to, with the return target percent-encoded.
    pub fn location(&self) -> String {
        match &self.return_to {
            Some(target) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(REDIRECT_PARAM, target)
                    .finish();
                format!("{}?{}", self.to, query)
            }
            None => self.to.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Redirect),
}

impl Navigation {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Navigation::Proceed)
    }

    /// `None` when the navigation proceeds.
    pub fn location(&self) -> Option<String> {
        match self {
            Navigation::Proceed => None,
            Navigation::Redirect(redirect) => Some(redirect.location()),
        }
    }
}

/// Decides one navigation. Rules are exclusive and checked in order:
/// login, then admin, then guest-only. A route flagged admin-only without
/// `requires_auth` sends anonymous visitors home, not to the login page.
pub fn evaluate(meta: &RouteMeta, access: AccessSnapshot, target: &str) -> Navigation {
    if meta.requires_auth && !access.is_logged_in {
        let return_to = if target.is_empty() { HOME_PATH } else { target };
        Navigation::Redirect(Redirect {
            to: LOGIN_PATH.to_string(),
            return_to: Some(return_to.to_string()),
            reason: RedirectReason::LoginRequired,
        })
    } else if meta.requires_admin && !access.is_admin {
        Navigation::Redirect(Redirect {
            to: HOME_PATH.to_string(),
            return_to: None,
            reason: RedirectReason::AdminRequired,
        })
    } else if meta.requires_guest && access.is_logged_in {
        Navigation::Redirect(Redirect {
            to: HOME_PATH.to_string(),
            return_to: None,
            reason: RedirectReason::GuestOnly,
        })
    } else {
        Navigation::Proceed
    }
}

/// Checks navigations against a route table. Holds no per-navigation state.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    table: RouteTable,
}

impl RouteGuard {
    pub fn new(table: RouteTable) -> Self {
        RouteGuard { table }
    }

    /// Unknown paths carry no restrictions and always proceed.
    pub fn check(&self, target: &str, access: AccessSnapshot) -> Navigation {
        let meta = self
            .table
            .resolve(target)
            .map(|route| route.meta)
            .unwrap_or_default();
        let decision = evaluate(&meta, access, target);

        if let Navigation::Redirect(redirect) = &decision {
            debug!(
                event_name = "guard.redirect",
                event_domain = "guard",
                target = target,
                to = redirect.to.as_str(),
                reason = ?redirect.reason,
                "navigation redirected"
            );
        }
        decision
    }
}
