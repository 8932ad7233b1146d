use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::patient::NewPatient;
use crate::domain::types::{BranchName, ClinicalNote, Email, PersonName, PhoneNumber};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
/// Form data for registering a new patient.
///
/// Serializable so a rejected submission can be rendered back into the form.
pub struct AddPatientForm {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// `YYYY-MM-DD`, as sent by a date input.
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    #[validate(length(max = 512))]
    pub address: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

impl AddPatientForm {
    /// Validates the form and converts it into a [`NewPatient`].
    ///
    /// `branch` overrides the submitted branch for users bound to one.
    pub fn into_new_patient(self, branch: Option<&str>) -> Result<NewPatient, FormError> {
        self.validate()?;

        let name = PersonName::new(self.name.trim()).map_err(|_| FormError::InvalidName)?;
        let mut patient = NewPatient::new(name);

        patient.phone = non_blank(&self.phone).map(PhoneNumber::new).transpose()?;
        patient.email = non_blank(&self.email).map(Email::new).transpose()?;
        patient.gender = non_blank(&self.gender).map(str::to_string);
        patient.birth_date = non_blank(&self.birth_date)
            .map(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
            .transpose()
            .map_err(|_| FormError::InvalidDate)?;
        patient.address = non_blank(&self.address).map(str::to_string);
        patient.branch = branch
            .or(non_blank(&self.branch))
            .map(BranchName::new)
            .transpose()?;
        // Notes that sanitize to nothing are dropped rather than rejected.
        patient.notes = non_blank(&self.notes).and_then(|notes| ClinicalNote::new(notes).ok());

        Ok(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> AddPatientForm {
        AddPatientForm {
            name: "  Tran Thi Lan ".into(),
            phone: Some("0912 345 678".into()),
            email: Some("Lan@Example.com".into()),
            birth_date: Some("1990-04-12".into()),
            branch: Some("Quan 1".into()),
            notes: Some("<script>x</script>Allergic to penicillin".into()),
            ..AddPatientForm::default()
        }
    }

    #[test]
    fn valid_form_builds_a_patient() {
        let patient = form().into_new_patient(None).unwrap();
        assert_eq!(patient.name.as_str(), "Tran Thi Lan");
        assert_eq!(patient.phone.unwrap().as_str(), "+84912345678");
        assert_eq!(patient.email.unwrap().as_str(), "lan@example.com");
        assert_eq!(patient.birth_date, NaiveDate::from_ymd_opt(1990, 4, 12));
        assert_eq!(patient.branch.unwrap().as_str(), "Quan 1");
        assert_eq!(patient.notes.unwrap().as_str(), "Allergic to penicillin");
        assert!(patient.code.is_empty());
    }

    #[test]
    fn user_branch_overrides_submitted_branch() {
        let patient = form().into_new_patient(Some("Quan 3")).unwrap();
        assert_eq!(patient.branch.unwrap().as_str(), "Quan 3");
    }

    #[test]
    fn blank_optional_fields_are_dropped() {
        let patient = AddPatientForm {
            name: "Minh".into(),
            phone: Some("  ".into()),
            email: Some(String::new()),
            ..AddPatientForm::default()
        };
        let patient = patient.into_new_patient(None).unwrap();
        assert_eq!(patient.phone, None);
        assert_eq!(patient.email, None);
        assert_eq!(patient.branch, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let missing_name = AddPatientForm {
            name: String::new(),
            ..AddPatientForm::default()
        };
        assert!(matches!(
            missing_name.into_new_patient(None),
            Err(FormError::Validation(_))
        ));

        let bad_date = AddPatientForm {
            birth_date: Some("12/04/1990".into()),
            ..form()
        };
        assert!(matches!(
            bad_date.into_new_patient(None),
            Err(FormError::InvalidDate)
        ));

        let bad_phone = AddPatientForm {
            phone: Some("not a phone".into()),
            ..form()
        };
        assert!(matches!(
            bad_phone.into_new_patient(None),
            Err(FormError::InvalidPhoneNumber)
        ));

        let bad_email = AddPatientForm {
            email: Some("lan-at-example".into()),
            ..form()
        };
        assert!(matches!(
            bad_email.into_new_patient(None),
            Err(FormError::InvalidEmail)
        ));
    }
}
