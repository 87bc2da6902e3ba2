//! Supported question types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Label given to options created without one.
pub const DEFAULT_OPTION_LABEL: &str = "Answer option";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    Consent,
    Email,
    Rating,
    Date,
    ShortText,
    LongText,
    Number,
}

impl QuestionType {
    pub const ALL: [QuestionType; 9] = [
        QuestionType::SingleChoice,
        QuestionType::MultiChoice,
        QuestionType::Consent,
        QuestionType::Email,
        QuestionType::Rating,
        QuestionType::Date,
        QuestionType::ShortText,
        QuestionType::LongText,
        QuestionType::Number,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultiChoice => "multi_choice",
            QuestionType::Consent => "consent",
            QuestionType::Email => "email",
            QuestionType::Rating => "rating",
            QuestionType::Date => "date",
            QuestionType::ShortText => "short_text",
            QuestionType::LongText => "long_text",
            QuestionType::Number => "number",
        }
    }

    /// Only choice questions carry answer options.
    pub fn supports_options(self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultiChoice)
    }

    /// Label assigned to a freshly created question of this type.
    pub fn default_label(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "Single choice question",
            QuestionType::MultiChoice => "Multiple choice question",
            QuestionType::Consent => "I agree to the terms",
            QuestionType::Email => "Your email address",
            QuestionType::Rating => "Rate your experience",
            QuestionType::Date => "Pick a date",
            QuestionType::ShortText => "Short answer",
            QuestionType::LongText => "Detailed answer",
            QuestionType::Number => "Enter a number",
        }
    }

    /// Require an option-capable type, e.g. before adding an option.
    pub fn ensure_supports_options(self) -> Result<(), CoreError> {
        if self.supports_options() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Question type '{self}' does not support options"
            )))
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid question type '{s}'. Must be one of: {}",
                    QuestionType::ALL.map(QuestionType::as_str).join(", ")
                ))
            })
    }
}

impl TryFrom<String> for QuestionType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
