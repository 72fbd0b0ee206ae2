//! Talent profile completion wizard
//!
//! A three-step form: personal information, professional information, then
//! verification. Each step is validated before the wizard moves past it, and
//! the final step produces the multipart submission for
//! `PUT /talents/:id/complete-profile`.

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::validation::{parse_positive_amount, ValidationError};

/// Minimum bio length in characters
pub const MIN_BIO_LEN: usize = 10;

/// Where the talent goes once the profile is saved, unless told otherwise
pub const DEFAULT_REDIRECT: &str = "/talent/dashboard";

/// Skills offered in the picker
pub const SKILLS: &[&str] = &[
    "Plumbing",
    "Electrical",
    "Cleaning",
    "Moving",
    "Home Repair",
    "Web Design",
    "Graphic Design",
    "Translation",
    "Writing",
    "Tutoring",
    "Language Instruction",
    "Gardening",
    "Pet Care",
    "Photography",
    "Video Editing",
    "Carpentry",
    "Painting",
    "Cooking",
    "Baking",
    "Driving",
    "Delivery",
    "Child Care",
    "Elder Care",
    "Shopping",
];

/// Education levels offered in the picker
pub const EDUCATION_LEVELS: &[&str] = &[
    "High School",
    "Associate Degree",
    "Bachelor's Degree",
    "Master's Degree",
    "Doctorate",
    "Trade School",
    "Other",
];

/// The wizard's steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    PersonalInformation,
    ProfessionalInformation,
    Verification,
}

impl WizardStep {
    /// All steps in display order
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::PersonalInformation,
            WizardStep::ProfessionalInformation,
            WizardStep::Verification,
        ]
    }

    /// Zero-based position
    pub fn index(&self) -> usize {
        match self {
            WizardStep::PersonalInformation => 0,
            WizardStep::ProfessionalInformation => 1,
            WizardStep::Verification => 2,
        }
    }

    fn next(&self) -> Option<WizardStep> {
        WizardStep::all().get(self.index() + 1).copied()
    }

    fn previous(&self) -> Option<WizardStep> {
        self.index()
            .checked_sub(1)
            .and_then(|i| WizardStep::all().get(i).copied())
    }
}

/// An image attached to the profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Everything the wizard collects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileData {
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub education: String,
    pub experience: String,
    /// Hourly rate as typed
    pub hourly_rate: String,
    pub id_verified: bool,
    pub accept_terms: bool,
    pub profile_image: Option<ProfileImage>,
}

impl ProfileData {
    /// Validates the fields collected on `step`
    pub fn validate_step(&self, step: WizardStep) -> Result<(), ValidationError> {
        match step {
            WizardStep::PersonalInformation => {
                if self.phone.is_empty() {
                    return Err(ValidationError::PhoneRequired);
                }
                if self.address.is_empty() {
                    return Err(ValidationError::AddressRequired);
                }
                if self.city.is_empty() {
                    return Err(ValidationError::CityRequired);
                }
                if self.country.is_empty() {
                    return Err(ValidationError::CountryRequired);
                }
                if self.bio.chars().count() < MIN_BIO_LEN {
                    return Err(ValidationError::BioTooShort);
                }
            }
            WizardStep::ProfessionalInformation => {
                if self.skills.is_empty() {
                    return Err(ValidationError::SkillsRequired);
                }
                if self.education.is_empty() {
                    return Err(ValidationError::EducationRequired);
                }
                if self.hourly_rate.is_empty() {
                    return Err(ValidationError::HourlyRateRequired);
                }
                if parse_positive_amount(&self.hourly_rate).is_none() {
                    return Err(ValidationError::InvalidHourlyRate);
                }
            }
            WizardStep::Verification => {
                if !self.accept_terms {
                    return Err(ValidationError::TermsNotAccepted);
                }
            }
        }
        Ok(())
    }
}

/// The validated profile, ready to upload
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSubmission {
    /// Text fields in upload order
    pub fields: Vec<(String, String)>,
    pub profile_image: Option<ProfileImage>,
}

impl ProfileSubmission {
    /// Builds the submission from collected data
    ///
    /// `skills` is sent as a JSON array string and `profileCompleted` is
    /// always `true`.
    pub fn from_profile(data: &ProfileData) -> Self {
        let skills = Value::from(data.skills.clone()).to_string();
        let fields = vec![
            ("phone", data.phone.clone()),
            ("address", data.address.clone()),
            ("city", data.city.clone()),
            ("country", data.country.clone()),
            ("bio", data.bio.clone()),
            ("skills", skills),
            ("education", data.education.clone()),
            ("experience", data.experience.clone()),
            ("hourlyRate", data.hourly_rate.clone()),
            ("idVerified", data.id_verified.to_string()),
            ("acceptTerms", data.accept_terms.to_string()),
            ("profileCompleted", "true".to_string()),
        ];

        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            profile_image: data.profile_image.clone(),
        }
    }

    /// Value of a text field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Converts into a multipart form
    ///
    /// Fails only if the image's MIME type is not a valid MIME string.
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        if let Some(image) = self.profile_image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime_type)?;
            form = form.part("profileImage", part);
        }
        Ok(form)
    }
}

/// Step-by-step profile completion state
#[derive(Debug, Clone)]
pub struct ProfileWizard {
    step: WizardStep,
    data: ProfileData,
    error: Option<ValidationError>,
    redirect_to: String,
}

impl Default for ProfileWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileWizard {
    /// A wizard on the first step with empty fields
    pub fn new() -> Self {
        Self {
            step: WizardStep::PersonalInformation,
            data: ProfileData::default(),
            error: None,
            redirect_to: DEFAULT_REDIRECT.to_string(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn data(&self) -> &ProfileData {
        &self.data
    }

    /// Mutable access to the fields; clears any pending error
    pub fn data_mut(&mut self) -> &mut ProfileData {
        self.error = None;
        &mut self.data
    }

    /// The last validation failure, if any
    pub fn error(&self) -> Option<ValidationError> {
        self.error
    }

    pub fn redirect_to(&self) -> &str {
        &self.redirect_to
    }

    pub fn is_last_step(&self) -> bool {
        self.step.next().is_none()
    }

    /// Adds `skill` if absent, removes it if present
    pub fn toggle_skill(&mut self, skill: &str) {
        let skills = &mut self.data.skills;
        match skills.iter().position(|s| s == skill) {
            Some(index) => {
                skills.remove(index);
            }
            None => skills.push(skill.to_string()),
        }
    }

    fn check_current_step(&mut self) -> Result<(), ValidationError> {
        let result = self.data.validate_step(self.step);
        self.error = result.err();
        result
    }

    /// Validates the current step and advances
    ///
    /// On the last step this only validates; use [`submit`](Self::submit).
    pub fn next(&mut self) -> Result<WizardStep, ValidationError> {
        self.check_current_step()?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Goes back one step without validating
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.error = None;
        self.step
    }

    /// Validates every step and builds the submission
    ///
    /// If a step other than the current one fails (its data was edited after
    /// moving on) the wizard jumps back to it.
    pub fn submit(&mut self) -> Result<ProfileSubmission, ValidationError> {
        self.check_current_step()?;
        for step in WizardStep::all() {
            if let Err(e) = self.data.validate_step(*step) {
                self.step = *step;
                self.error = Some(e);
                return Err(e);
            }
        }
        Ok(ProfileSubmission::from_profile(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_personal(wizard: &mut ProfileWizard) {
        let data = wizard.data_mut();
        data.phone = "555-0100".to_string();
        data.address = "1 Main St".to_string();
        data.city = "Austin".to_string();
        data.country = "USA".to_string();
        data.bio = "Ten years fixing things".to_string();
    }

    fn fill_professional(wizard: &mut ProfileWizard) {
        wizard.toggle_skill("Plumbing");
        let data = wizard.data_mut();
        data.education = "Trade School".to_string();
        data.hourly_rate = "45".to_string();
    }

    #[test]
    fn test_starts_on_personal_information() {
        let wizard = ProfileWizard::new();
        assert_eq!(wizard.step(), WizardStep::PersonalInformation);
        assert_eq!(wizard.redirect_to(), "/talent/dashboard");
        assert!(!wizard.is_last_step());
    }

    #[test]
    fn test_next_blocks_on_first_missing_field() {
        let mut wizard = ProfileWizard::new();

        assert_eq!(wizard.next(), Err(ValidationError::PhoneRequired));
        assert_eq!(wizard.step(), WizardStep::PersonalInformation);
        assert_eq!(wizard.error(), Some(ValidationError::PhoneRequired));

        fill_personal(&mut wizard);
        wizard.data_mut().bio = "too short".to_string();
        assert_eq!(wizard.next(), Err(ValidationError::BioTooShort));
    }

    #[test]
    fn test_editing_clears_error() {
        let mut wizard = ProfileWizard::new();
        let _ = wizard.next();
        assert!(wizard.error().is_some());

        wizard.data_mut().phone = "555".to_string();

        assert!(wizard.error().is_none());
    }

    #[test]
    fn test_professional_step_rules() {
        let mut wizard = ProfileWizard::new();
        fill_personal(&mut wizard);
        wizard.next().unwrap();

        assert_eq!(wizard.next(), Err(ValidationError::SkillsRequired));

        wizard.toggle_skill("Plumbing");
        assert_eq!(wizard.next(), Err(ValidationError::EducationRequired));

        wizard.data_mut().education = "Other".to_string();
        assert_eq!(wizard.next(), Err(ValidationError::HourlyRateRequired));

        wizard.data_mut().hourly_rate = "-3".to_string();
        assert_eq!(wizard.next(), Err(ValidationError::InvalidHourlyRate));

        wizard.data_mut().hourly_rate = "30".to_string();
        assert_eq!(wizard.next(), Ok(WizardStep::Verification));
        assert!(wizard.is_last_step());
    }

    #[test]
    fn test_toggle_skill() {
        let mut wizard = ProfileWizard::new();
        wizard.toggle_skill("Painting");
        wizard.toggle_skill("Moving");
        wizard.toggle_skill("Painting");

        assert_eq!(wizard.data().skills, vec!["Moving".to_string()]);
    }

    #[test]
    fn test_back_does_not_validate_or_underflow() {
        let mut wizard = ProfileWizard::new();
        fill_personal(&mut wizard);
        wizard.next().unwrap();

        assert_eq!(wizard.back(), WizardStep::PersonalInformation);
        assert_eq!(wizard.back(), WizardStep::PersonalInformation);
    }

    #[test]
    fn test_submit_requires_terms() {
        let mut wizard = ProfileWizard::new();
        fill_personal(&mut wizard);
        wizard.next().unwrap();
        fill_professional(&mut wizard);
        wizard.next().unwrap();

        assert_eq!(wizard.submit(), Err(ValidationError::TermsNotAccepted));

        wizard.data_mut().accept_terms = true;
        let submission = wizard.submit().expect("complete profile should submit");

        assert_eq!(submission.field("skills"), Some(r#"["Plumbing"]"#));
        assert_eq!(submission.field("profileCompleted"), Some("true"));
        assert_eq!(submission.field("hourlyRate"), Some("45"));
        assert_eq!(submission.field("acceptTerms"), Some("true"));
        assert!(submission.field("imagePreview").is_none());
    }

    #[test]
    fn test_submit_rechecks_earlier_steps() {
        let mut wizard = ProfileWizard::new();
        fill_personal(&mut wizard);
        wizard.next().unwrap();
        fill_professional(&mut wizard);
        wizard.next().unwrap();
        wizard.data_mut().accept_terms = true;
        wizard.data_mut().city.clear();

        assert_eq!(wizard.submit(), Err(ValidationError::CityRequired));
        assert_eq!(wizard.step(), WizardStep::PersonalInformation);
    }

    #[test]
    fn test_submission_into_form_with_image() {
        let mut data = ProfileData::default();
        data.profile_image = Some(ProfileImage {
            file_name: "me.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        });

        let submission = ProfileSubmission::from_profile(&data);

        assert!(submission.into_form().is_ok());
    }

    #[test]
    fn test_submission_rejects_bad_mime() {
        let mut data = ProfileData::default();
        data.profile_image = Some(ProfileImage {
            file_name: "me.png".to_string(),
            mime_type: "not a mime".to_string(),
            bytes: vec![1],
        });

        assert!(ProfileSubmission::from_profile(&data).into_form().is_err());
    }
}
