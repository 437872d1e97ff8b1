#[allow(clippy::module_inception)]
pub mod guard;
pub mod route;

pub use guard::{evaluate, AccessSnapshot, Navigation, Redirect, RedirectReason, RouteGuard};
pub use guard::{HOME_PATH, LOGIN_PATH, REDIRECT_PARAM};
pub use route::{Route, RouteMeta, RouteTable};
