//! Client-side form validation
//!
//! Forms are checked before any request is made. Checks run in a fixed order
//! and the first failure is reported; its `Display` text is what the user
//! sees.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{ApplicationRequest, Credentials, RegistrationRequest, Role};

/// Minimum password length for talent signup
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// A form field failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please use Google Sign-Up for Task Posters")]
    PosterSignupRequiresGoogle,
    #[error("Please use Google Sign-In for Task Posters")]
    PosterLoginRequiresGoogle,
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Full name is required")]
    NameRequired,

    #[error("Please provide a proposal")]
    ProposalRequired,
    #[error("Please provide your price offer")]
    PriceRequired,
    #[error("Please provide a valid price offer")]
    InvalidPrice,

    #[error("Phone number is required")]
    PhoneRequired,
    #[error("Address is required")]
    AddressRequired,
    #[error("City is required")]
    CityRequired,
    #[error("Country is required")]
    CountryRequired,
    #[error("Please provide a bio (at least 10 characters)")]
    BioTooShort,
    #[error("Please select at least one skill")]
    SkillsRequired,
    #[error("Education level is required")]
    EducationRequired,
    #[error("Hourly rate is required")]
    HourlyRateRequired,
    #[error("Please enter a valid hourly rate")]
    InvalidHourlyRate,
    #[error("You must accept the terms and conditions")]
    TermsNotAccepted,
}

/// Whether `email` looks like `local@domain.tld`
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Parses a strictly positive, finite amount
///
/// Surrounding whitespace is ignored. Returns `None` for anything else.
pub fn parse_positive_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Signup form for a new account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub role: Role,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

impl SignupForm {
    /// Checks the form; task posters must sign up through Google
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.role == Role::User {
            return Err(ValidationError::PosterSignupRequiresGoogle);
        }
        if self.email.is_empty() {
            return Err(ValidationError::EmailRequired);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.name.is_empty() {
            return Err(ValidationError::NameRequired);
        }
        Ok(())
    }

    /// Validates and builds the registration payload
    ///
    /// Missing given/family names are derived from the full name: the first
    /// word is the given name, the rest the family name.
    pub fn to_registration(&self) -> Result<RegistrationRequest, ValidationError> {
        self.validate()?;

        let mut words = self.name.split(' ');
        let first = words.next().unwrap_or_default().to_string();
        let rest = words.collect::<Vec<_>>().join(" ");

        let given_name = self
            .given_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or(first);
        let family_name = self
            .family_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or(rest);

        Ok(RegistrationRequest {
            email: self.email.clone(),
            password: self.password.clone(),
            name: self.name.clone(),
            given_name,
            family_name,
            picture: String::new(),
            role: self.role,
            profile_completed: false,
        })
    }
}

/// Email/password login form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub role: Role,
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Checks the form; task posters must sign in through Google
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.is_empty() {
            return Err(ValidationError::EmailRequired);
        }
        if self.role == Role::User {
            return Err(ValidationError::PosterLoginRequiresGoogle);
        }
        if self.password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        Ok(())
    }

    /// Validates and builds the login payload
    pub fn to_credentials(&self) -> Result<Credentials, ValidationError> {
        self.validate()?;
        Ok(Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

/// A talent's application to a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationForm {
    pub proposal: String,
    /// Price offer as typed
    pub price: String,
}

impl ApplicationForm {
    /// Checks the form and returns the parsed price
    pub fn validate(&self) -> Result<f64, ValidationError> {
        if self.proposal.trim().is_empty() {
            return Err(ValidationError::ProposalRequired);
        }
        if self.price.is_empty() {
            return Err(ValidationError::PriceRequired);
        }
        parse_positive_amount(&self.price).ok_or(ValidationError::InvalidPrice)
    }

    /// Validates and builds a pending application for `task_id`
    pub fn to_request(
        &self,
        task_id: &str,
        talent_id: &str,
    ) -> Result<ApplicationRequest, ValidationError> {
        let price = self.validate()?;
        Ok(ApplicationRequest::new(
            task_id,
            talent_id,
            self.proposal.clone(),
            price,
        ))
    }
}
