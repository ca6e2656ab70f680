//! Patient case value object

use serde::{Deserialize, Serialize};

/// The patient case information a deliberation runs over (Value Object)
///
/// Free-text clinical presentation, e.g. age, sex, symptoms, and history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    content: String,
}

impl PatientInfo {
    /// Create new patient info
    ///
    /// # Panics
    /// Panics if the content is empty or only whitespace
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        assert!(!content.trim().is_empty(), "Patient info cannot be empty");
        Self { content }
    }

    /// Try to create patient info, returning None if invalid
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the case text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for PatientInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for PatientInfo {
    fn from(s: &str) -> Self {
        PatientInfo::new(s)
    }
}

impl From<String> for PatientInfo {
    fn from(s: String) -> Self {
        PatientInfo::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_info_creation() {
        let p = PatientInfo::new("fever, cough");
        assert_eq!(p.content(), "fever, cough");
    }

    #[test]
    #[should_panic]
    fn test_empty_patient_info_panics() {
        PatientInfo::new("  ");
    }

    #[test]
    fn test_try_new() {
        assert!(PatientInfo::try_new("").is_none());
        assert!(PatientInfo::try_new("   ").is_none());
        assert!(PatientInfo::try_new("fever, cough").is_some());
    }
}
