//! Route table and role-based access rules
//!
//! `can_access` decides, from the session alone, whether a route may be shown
//! or where the visitor should be sent instead.

use std::fmt;

use crate::models::{Role, UserProfile};
use crate::session::AuthState;

/// A page in the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Tasks,
    TaskDetail(String),
    Map,
    TalentDashboard,
    CompleteProfile,
    UserDashboard,
    NotFound,
}

impl Route {
    /// Resolves a path; unknown paths map to `NotFound`
    ///
    /// A trailing slash and a query string are ignored.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["tasks"] => Route::Tasks,
            ["tasks", id] if !id.is_empty() => Route::TaskDetail((*id).to_string()),
            ["map"] => Route::Map,
            ["talent", "dashboard"] => Route::TalentDashboard,
            ["complete-profile"] => Route::CompleteProfile,
            ["user", "dashboard"] => Route::UserDashboard,
            _ => Route::NotFound,
        }
    }

    /// Canonical path
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Tasks => "/tasks".to_string(),
            Route::TaskDetail(id) => format!("/tasks/{}", id),
            Route::Map => "/map".to_string(),
            Route::TalentDashboard => "/talent/dashboard".to_string(),
            Route::CompleteProfile => "/complete-profile".to_string(),
            Route::UserDashboard => "/user/dashboard".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// The role a route is restricted to, if any
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::TalentDashboard | Route::CompleteProfile => Some(Role::Talent),
            Route::UserDashboard => Some(Role::User),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of a route check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Route),
}

/// Decides whether `route` may be shown for `auth`
pub fn can_access(route: &Route, auth: &AuthState) -> Access {
    let Some(required) = route.required_role() else {
        return Access::Allow;
    };

    if auth.role() != Some(required) {
        return Access::Redirect(Route::Home);
    }

    if required == Role::Talent {
        let profile_completed = auth.user.as_ref().is_some_and(|u| u.profile_completed);
        match (profile_completed, route) {
            (false, Route::CompleteProfile) => {}
            (false, _) => return Access::Redirect(Route::CompleteProfile),
            (true, Route::CompleteProfile) => return Access::Redirect(Route::TalentDashboard),
            (true, _) => {}
        }
    }

    Access::Allow
}

/// Where to send an account right after it signs in
pub fn landing_route(profile: &UserProfile) -> Route {
    match profile.role {
        Some(Role::Talent) if !profile.profile_completed => Route::CompleteProfile,
        Some(Role::Talent) => Route::TalentDashboard,
        Some(Role::User) => Route::UserDashboard,
        None => Route::Home,
    }
}
