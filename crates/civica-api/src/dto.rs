// SPDX-License-Identifier: Apache-2.0

//! Request form shapes, one struct per POST surface, mirroring the HTML
//! form field names. Checkbox fields arrive as present-or-absent, never
//! as booleans.

use civica_store::volunteer::{ApplicationDraft, OpportunityDraft};
use serde::Deserialize;

/// HTML checkboxes submit a value only when ticked.
#[must_use]
pub fn checkbox_checked(field: &Option<String>) -> bool {
    field.is_some()
}

/// Blank or whitespace-only optional inputs collapse to `None`.
#[must_use]
pub fn optional_text(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementForm {
    pub title: String,
    pub content: String,
    pub is_urgent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionForm {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub is_urgent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerForm {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionForm {
    pub title: String,
    pub content: String,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentForm {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profession: Option<String>,
    pub bio: Option<String>,
    pub is_public: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpportunityForm {
    pub title: String,
    pub description: String,
    pub organization: String,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub skills_needed: Option<String>,
    pub time_commitment: Option<String>,
    pub is_urgent: Option<String>,
}

impl OpportunityForm {
    #[must_use]
    pub fn into_draft(self) -> OpportunityDraft {
        let is_urgent = checkbox_checked(&self.is_urgent);
        OpportunityDraft {
            title: self.title,
            description: self.description,
            organization: self.organization,
            location: optional_text(self.location),
            contact_email: optional_text(self.contact_email),
            contact_phone: optional_text(self.contact_phone),
            skills_needed: optional_text(self.skills_needed),
            time_commitment: optional_text(self.time_commitment),
            is_urgent,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationForm {
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: Option<String>,
    pub message: Option<String>,
    pub skills: Option<String>,
}

impl ApplicationForm {
    #[must_use]
    pub fn into_draft(self) -> ApplicationDraft {
        ApplicationDraft {
            applicant_name: self.applicant_name,
            applicant_email: self.applicant_email,
            applicant_phone: optional_text(self.applicant_phone),
            message: optional_text(self.message),
            skills: optional_text(self.skills),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkbox_semantics_are_presence_based() {
        assert!(checkbox_checked(&Some("on".to_string())));
        assert!(checkbox_checked(&Some(String::new())));
        assert!(!checkbox_checked(&None));
    }

    #[test]
    fn blank_optional_fields_collapse_to_none() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(None), None);
        assert_eq!(
            optional_text(Some(" town hall ".to_string())),
            Some("town hall".to_string())
        );
    }

    #[test]
    fn forms_decode_from_urlencoded_field_names() {
        let form: QuestionForm =
            serde_urlencoded_like("title=How%3F&content=Details&is_urgent=on");
        assert_eq!(form.title, "How?");
        assert!(checkbox_checked(&form.is_urgent));
        assert_eq!(form.category, None);
    }

    // Minimal x-www-form-urlencoded decode for the test, enough for the
    // field shapes above.
    fn serde_urlencoded_like<T: for<'de> serde::Deserialize<'de>>(raw: &str) -> T {
        let pairs: Vec<(String, String)> = raw
            .split('&')
            .filter_map(|kv| kv.split_once('='))
            .map(|(k, v)| (k.to_string(), percent_decode(v)))
            .collect();
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).expect("decode form")
    }

    fn percent_decode(raw: &str) -> String {
        let bytes = raw.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'%' if i + 2 < bytes.len() => {
                    let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
                    if let Ok(byte) = u8::from_str_radix(hex, 16) {
                        out.push(byte);
                        i += 3;
                        continue;
                    }
                    out.push(bytes[i]);
                    i += 1;
                }
                b'+' => {
                    out.push(b' ');
                    i += 1;
                }
                other => {
                    out.push(other);
                    i += 1;
                }
            }
        }
        String::from_utf8_lossy(&out).into_owned()
    }
}
