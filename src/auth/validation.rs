use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::api::models::RegisterRequest;

static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
static MOBILE: OnceLock<Option<Regex>> = OnceLock::new();
static OTP: OnceLock<Option<Regex>> = OnceLock::new();

fn matches(cell: &'static OnceLock<Option<Regex>>, pattern: &str, value: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

pub fn is_email(value: &str) -> bool {
    matches(&EMAIL, r"^[^\s@]+@[^\s@]+\.[^\s@]+$", value)
}

pub fn is_mobile(value: &str) -> bool {
    matches(&MOBILE, r"^[0-9]{10}$", value)
}

pub fn is_otp(value: &str) -> bool {
    matches(&OTP, r"^[0-9]{6}$", value)
}

/// Field name to inline message, in a stable order.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub confirm_password: String,
    pub user_role: String,
    pub agreed_to_terms: bool,
}

impl SignUpForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.insert("username", "Username is required".to_string());
        }
        if self.email.trim().is_empty() {
            errors.insert("email", "Email is required".to_string());
        } else if !is_email(self.email.trim()) {
            errors.insert("email", "Invalid email format".to_string());
        }
        if self.mobile.trim().is_empty() {
            errors.insert("mobile", "Mobile number is required".to_string());
        }
        if self.password.is_empty() {
            errors.insert("password", "Password is required".to_string());
        }
        if self.password != self.confirm_password {
            errors.insert("confirmPassword", "Passwords do not match".to_string());
        }
        if self.user_role.trim().is_empty() {
            errors.insert("userRole", "Role selection is required".to_string());
        }
        if !self.agreed_to_terms {
            errors.insert("agreedToTerms", "You must agree to the terms.".to_string());
        }
        errors
    }

    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            name: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            password: self.password.clone(),
            user_role: self.user_role.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> SignUpForm {
        SignUpForm {
            username: "warden".into(),
            email: "warden@example.com".into(),
            mobile: "9876543210".into(),
            password: "s3cret".into(),
            confirm_password: "s3cret".into(),
            user_role: "Admin".into(),
            agreed_to_terms: true,
        }
    }

    #[test]
    fn patterns() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("a@b"));
        assert!(!is_email("a b@c.de"));
        assert!(is_mobile("0123456789"));
        assert!(!is_mobile("12345"));
        assert!(is_otp("123456"));
        assert!(!is_otp("12345a"));
    }

    #[test]
    fn complete_form_has_no_errors() {
        assert!(complete().validate().is_empty());
    }

    #[test]
    fn every_field_reports_inline() {
        let errors = SignUpForm {
            confirm_password: "x".into(),
            ..SignUpForm::default()
        }
        .validate();
        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec![
                "agreedToTerms",
                "confirmPassword",
                "email",
                "mobile",
                "password",
                "userRole",
                "username"
            ]
        );
    }

    #[test]
    fn malformed_email_is_flagged() {
        let form = SignUpForm {
            email: "not-an-email".into(),
            ..complete()
        };
        assert_eq!(
            form.validate().get("email").map(String::as_str),
            Some("Invalid email format")
        );
    }
}
