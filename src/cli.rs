//! Command-line interface for the taskhub client
//!
//! Argument parsing with clap plus [`execute`], which runs one command against
//! a [`TaskHub`] and returns the JSON to print.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;

use crate::api::TaskHub;
use crate::config::{Config, API_URL_ENV};
use crate::error::ApiError;
use crate::models::{Role, TaskQuery};
use crate::routes::landing_route;
use crate::storage::FileStore;
use crate::validation::{ApplicationForm, LoginForm, SignupForm};
use crate::wizard::{ProfileWizard, EDUCATION_LEVELS, SKILLS};

/// Environment variable the login password can be read from
pub const PASSWORD_ENV: &str = "TASKHUB_PASSWORD";

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified role name is not recognized
    #[error("Invalid role: '{0}'. Valid roles: user, talent")]
    InvalidRole(String),

    /// The skill is not one of the offered skills
    #[error("Invalid skill: '{0}'")]
    InvalidSkill(String),

    /// The education level is not one of the offered levels
    #[error("Invalid education level: '{0}'")]
    InvalidEducation(String),

    /// No `--data-dir` was given and the platform data directory is unknown
    #[error("Could not determine a data directory; pass --data-dir")]
    NoDataDir,
}

/// Parses a role argument into a Role.
///
/// # Arguments
/// * `s` - The role string from CLI (`user`, `talent`, `poster` or `doer`)
///
/// # Returns
/// * `Ok(Role)` if the string names a role
/// * `Err(CliError::InvalidRole)` otherwise
pub fn parse_role_arg(s: &str) -> Result<Role, CliError> {
    Role::parse(s).ok_or_else(|| CliError::InvalidRole(s.to_string()))
}

/// Matches `s` case-insensitively against `options`, returning the listed spelling
fn pick_option(s: &str, options: &[&'static str]) -> Option<&'static str> {
    let wanted = s.trim();
    options
        .iter()
        .copied()
        .find(|option| option.eq_ignore_ascii_case(wanted))
}

/// Parses a skill argument into one of the offered skills.
///
/// # Returns
/// * `Ok(String)` with the skill as listed (e.g. `home repair` → `Home Repair`)
/// * `Err(CliError::InvalidSkill)` if the skill is not offered
pub fn parse_skill_arg(s: &str) -> Result<String, CliError> {
    pick_option(s, SKILLS)
        .map(str::to_string)
        .ok_or_else(|| CliError::InvalidSkill(s.to_string()))
}

/// Parses an education argument into one of the offered levels.
pub fn parse_education_arg(s: &str) -> Result<String, CliError> {
    pick_option(s, EDUCATION_LEVELS)
        .map(str::to_string)
        .ok_or_else(|| CliError::InvalidEducation(s.to_string()))
}

/// taskhub - browse and manage marketplace tasks from the terminal
#[derive(Parser, Debug)]
#[command(name = "taskhub")]
#[command(about = "Task marketplace client")]
#[command(version)]
pub struct Cli {
    /// API base URL
    #[arg(long, global = true, env = API_URL_ENV, value_name = "URL")]
    pub api_url: Option<String>,

    /// Directory holding the local store (defaults to the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Commands the CLI can run
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List tasks
    Tasks {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one task
    Task { id: String },
    /// Show the featured tasks
    Featured,
    /// List map markers
    Markers {
        #[arg(long, default_value = "")]
        city: String,
    },
    /// Show the signed-in account
    Me,
    /// Sign in with email and password
    Login {
        #[arg(long, value_parser = parse_role_arg, default_value = "talent")]
        role: Role,
        #[arg(long)]
        email: String,
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },
    /// Create a talent account
    Signup {
        #[arg(long)]
        email: String,
        /// Full name
        #[arg(long)]
        name: String,
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Check whether an email is already registered
    CheckEmail {
        #[arg(long, value_parser = parse_role_arg, default_value = "talent")]
        role: Role,
        email: String,
    },
    /// Apply for a task as the signed-in talent
    Apply {
        task_id: String,
        #[arg(long)]
        proposal: String,
        /// Price offer
        #[arg(long)]
        price: String,
    },
    /// Complete the signed-in talent's profile
    CompleteProfile {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        country: String,
        /// At least ten characters about yourself
        #[arg(long)]
        bio: String,
        /// Repeat for each skill
        #[arg(long = "skill", value_parser = parse_skill_arg)]
        skills: Vec<String>,
        #[arg(long, value_parser = parse_education_arg)]
        education: String,
        #[arg(long, default_value = "")]
        experience: String,
        #[arg(long)]
        hourly_rate: String,
        #[arg(long)]
        id_verified: bool,
        #[arg(long)]
        accept_terms: bool,
    },
    /// Fetch featured tasks and all markers at once
    Overview,
}

impl Cli {
    /// Builds the client configuration: environment first, flags on top
    pub fn config(&self) -> Config {
        let config = Config::from_env();
        match &self.api_url {
            Some(url) => config.with_api_url(url.clone()),
            None => config,
        }
    }

    /// Opens the local store in `--data-dir` or the platform data directory
    pub fn store(&self) -> Result<FileStore, CliError> {
        match &self.data_dir {
            Some(dir) => Ok(FileStore::with_dir(dir.clone())),
            None => FileStore::new().ok_or(CliError::NoDataDir),
        }
    }
}

impl Command {
    /// Text shown when a failure carries no message of its own
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Command::Tasks { .. } | Command::Featured | Command::Overview => {
                "Failed to load tasks. Please try again."
            }
            Command::Task { .. } => "Failed to load task details. Please try again.",
            Command::Markers { .. } => "Failed to load map markers. Please try again.",
            Command::Me => "Failed to load your profile. Please try again.",
            Command::Login { .. } => crate::api::LOGIN_FAILED_MESSAGE,
            Command::Signup { .. } => crate::api::SIGNUP_FAILED_MESSAGE,
            Command::Logout => "Failed to sign out.",
            Command::CheckEmail { .. } => "Failed to check email. Please try again.",
            Command::Apply { .. } => "Failed to submit application. Please try again.",
            Command::CompleteProfile { .. } => "Failed to complete profile. Please try again.",
        }
    }
}

/// Runs `command` against `hub` and returns the JSON to print
pub async fn execute(command: &Command, hub: &TaskHub) -> Result<Value, ApiError> {
    let output = match command {
        Command::Tasks {
            page,
            limit,
            category,
            location,
            search,
        } => {
            let query = TaskQuery {
                page: Some(*page),
                limit: Some(*limit),
                category: category.clone(),
                location: location.clone(),
                search: search.clone(),
            };
            serde_json::to_value(hub.tasks().get_tasks(&query).await?)?
        }
        Command::Task { id } => serde_json::to_value(hub.tasks().get_task_by_id(id).await?)?,
        Command::Featured => serde_json::to_value(hub.tasks().get_featured_tasks().await?)?,
        Command::Markers { city } => serde_json::to_value(hub.map().get_markers(city).await?)?,
        Command::Me => serde_json::to_value(hub.users().get_current_user().await?)?,
        Command::Login {
            role,
            email,
            password,
        } => {
            let form = LoginForm {
                role: *role,
                email: email.clone(),
                password: password.clone().unwrap_or_default(),
            };
            let response = hub.auth().sign_in(&form).await?;
            json!({
                "user": response.user,
                "redirect": landing_route(&response.user).path(),
            })
        }
        Command::Signup {
            email,
            name,
            password,
        } => {
            let password = password.clone().unwrap_or_default();
            let form = SignupForm {
                role: Role::Talent,
                email: email.clone(),
                confirm_password: password.clone(),
                password,
                name: name.clone(),
                given_name: None,
                family_name: None,
            };
            let response = hub.auth().signup_talent(&form).await?;
            json!({
                "user": response.user,
                "redirect": landing_route(&response.user).path(),
            })
        }
        Command::Logout => {
            hub.auth().logout()?;
            json!({ "signedOut": true })
        }
        Command::CheckEmail { role, email } => {
            serde_json::to_value(hub.users().check_user_exists(email, *role).await?)?
        }
        Command::Apply {
            task_id,
            proposal,
            price,
        } => {
            let form = ApplicationForm {
                proposal: proposal.clone(),
                price: price.clone(),
            };
            form.validate()?;
            let me = hub.users().get_current_user().await?;
            let request = form.to_request(task_id, &me.id)?;
            serde_json::to_value(hub.tasks().apply_for_task(task_id, &request).await?)?
        }
        Command::CompleteProfile {
            phone,
            address,
            city,
            country,
            bio,
            skills,
            education,
            experience,
            hourly_rate,
            id_verified,
            accept_terms,
        } => {
            let mut wizard = ProfileWizard::new();
            let data = wizard.data_mut();
            data.phone = phone.clone();
            data.address = address.clone();
            data.city = city.clone();
            data.country = country.clone();
            data.bio = bio.clone();
            data.skills = skills.clone();
            data.education = education.clone();
            data.experience = experience.clone();
            data.hourly_rate = hourly_rate.clone();
            data.id_verified = *id_verified;
            data.accept_terms = *accept_terms;

            while !wizard.is_last_step() {
                wizard.next()?;
            }
            let submission = wizard.submit()?;

            let me = hub.users().get_current_user().await?;
            let profile = hub.users().complete_profile(&me.id, submission).await?;
            json!({ "profile": profile, "redirect": wizard.redirect_to() })
        }
        Command::Overview => {
            let (featured, markers) = futures::try_join!(
                hub.tasks().get_featured_tasks(),
                hub.map().get_markers(""),
            )?;
            json!({ "featured": featured, "markers": markers })
        }
    };

    Ok(output)
}
