//! Authentication state for the signed-in account
//!
//! Mirrors what the UI needs to know about the current session: who is signed
//! in, whether an auth request is in flight, and the last auth error.

use serde::{Deserialize, Serialize};

use crate::models::{Role, UserProfile};

/// The essentials kept about the signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Option<Role>,
    /// Avatar URL, empty when unknown
    pub picture: String,
    pub profile_completed: bool,
}

impl From<&UserProfile> for SessionUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.clone(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            role: profile.role,
            picture: profile.picture.clone().unwrap_or_default(),
            profile_completed: profile.profile_completed,
        }
    }
}

/// Session state and its transitions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// An auth request started
    pub fn auth_start(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Authentication succeeded for `profile`
    pub fn add_user(&mut self, profile: &UserProfile) {
        self.is_loading = false;
        self.is_authenticated = true;
        self.user = Some(SessionUser::from(profile));
    }

    /// Authentication failed with `message`
    pub fn auth_fail(&mut self, message: impl Into<String>) {
        self.is_loading = false;
        self.error = Some(message.into());
    }

    /// Signed out
    pub fn remove_user(&mut self) {
        self.user = None;
        self.is_authenticated = false;
        self.error = None;
    }

    /// Changes the signed-in user's role; no-op when signed out
    pub fn update_role(&mut self, role: Role) {
        if let Some(user) = self.user.as_mut() {
            user.role = Some(role);
        }
    }

    /// Records whether the profile is complete; no-op when signed out
    pub fn update_profile_status(&mut self, completed: bool) {
        if let Some(user) = self.user.as_mut() {
            user.profile_completed = completed;
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Role of the signed-in user, if any
    pub fn role(&self) -> Option<Role> {
        if !self.is_authenticated {
            return None;
        }
        self.user.as_ref().and_then(|u| u.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: "7".to_string(),
            email: "sam@example.com".to_string(),
            name: "Sam".to_string(),
            role: Some(Role::Talent),
            picture: None,
            profile_completed: false,
            given_name: Some("Sam".to_string()),
            family_name: None,
        }
    }

    #[test]
    fn test_initial_state() {
        let state = AuthState::new();
        assert!(state.user.is_none());
        assert!(!state.is_authenticated);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_login_flow() {
        let mut state = AuthState::new();
        state.auth_fail("old error");

        state.auth_start();
        assert!(state.is_loading);
        assert!(state.error.is_none());

        state.add_user(&profile());
        assert!(!state.is_loading);
        assert!(state.is_authenticated);
        let user = state.user.as_ref().unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.picture, "");
        assert_eq!(state.role(), Some(Role::Talent));
    }

    #[test]
    fn test_auth_fail_keeps_previous_user() {
        let mut state = AuthState::new();
        state.add_user(&profile());
        state.auth_start();

        state.auth_fail("Login failed");

        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("Login failed"));
        assert!(state.is_authenticated);
    }

    #[test]
    fn test_remove_user() {
        let mut state = AuthState::new();
        state.add_user(&profile());
        state.auth_fail("x");

        state.remove_user();

        assert!(state.user.is_none());
        assert!(!state.is_authenticated);
        assert!(state.error.is_none());
        assert_eq!(state.role(), None);
    }

    #[test]
    fn test_updates_apply_only_when_signed_in() {
        let mut state = AuthState::new();
        state.update_role(Role::User);
        state.update_profile_status(true);
        assert!(state.user.is_none());

        state.add_user(&profile());
        state.update_role(Role::User);
        state.update_profile_status(true);

        let user = state.user.as_ref().unwrap();
        assert_eq!(user.role, Some(Role::User));
        assert!(user.profile_completed);
    }

    #[test]
    fn test_clear_error() {
        let mut state = AuthState::new();
        state.auth_fail("nope");
        state.clear_error();
        assert!(state.error.is_none());
    }
}
