//! Per-type question settings stored in the `extra_params` JSON object.
//!
//! The stored value is a free-form JSON object so switching a question's
//! type never loses settings. Validation deserializes it into the typed
//! shape for the current question type; keys the type does not know are
//! ignored.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::question_type::QuestionType;

/// Upper bound for the number of stars on a rating question.
pub const MAX_RATING_STARS: u32 = 10;

/// Extra params assigned to a freshly created question.
pub fn default_extra_params() -> Value {
    serde_json::json!({ "required": true })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChoiceParams {
    min_answers_count: Option<u32>,
    max_answers_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatingParams {
    stars_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateParams {
    min_date: Option<String>,
    max_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextParams {
    max_length: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NumberParams {
    min_number: Option<f64>,
    max_number: Option<f64>,
}

fn parse<T: DeserializeOwned>(question_type: QuestionType, value: &Value) -> Result<T, CoreError> {
    T::deserialize(value).map_err(|e| {
        CoreError::Validation(format!("Invalid extra params for '{question_type}': {e}"))
    })
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        CoreError::Validation(format!("{field} must be a date in YYYY-MM-DD format"))
    })
}

/// Validate `value` against the settings shape of `question_type`.
pub fn validate_extra_params(question_type: QuestionType, value: &Value) -> Result<(), CoreError> {
    let Some(object) = value.as_object() else {
        return Err(CoreError::Validation(
            "extra_params must be a JSON object".to_string(),
        ));
    };
    // Shared by every type.
    if object.get("required").is_some_and(|r| !r.is_boolean()) {
        return Err(CoreError::Validation(
            "required must be a boolean".to_string(),
        ));
    }

    match question_type {
        QuestionType::SingleChoice | QuestionType::MultiChoice => {
            let params: ChoiceParams = parse(question_type, value)?;
            if let (Some(min), Some(max)) = (params.min_answers_count, params.max_answers_count) {
                if min > max {
                    return Err(CoreError::Validation(format!(
                        "minAnswersCount ({min}) must not exceed maxAnswersCount ({max})"
                    )));
                }
            }
        }
        QuestionType::Rating => {
            let params: RatingParams = parse(question_type, value)?;
            if let Some(stars) = params.stars_count {
                if !(1..=MAX_RATING_STARS).contains(&stars) {
                    return Err(CoreError::Validation(format!(
                        "starsCount must be between 1 and {MAX_RATING_STARS}"
                    )));
                }
            }
        }
        QuestionType::Date => {
            let params: DateParams = parse(question_type, value)?;
            let min = params
                .min_date
                .as_deref()
                .map(|d| parse_date("minDate", d))
                .transpose()?;
            let max = params
                .max_date
                .as_deref()
                .map(|d| parse_date("maxDate", d))
                .transpose()?;
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(CoreError::Validation(
                        "minDate must not be after maxDate".to_string(),
                    ));
                }
            }
        }
        QuestionType::ShortText | QuestionType::LongText => {
            let params: TextParams = parse(question_type, value)?;
            if params.max_length == Some(0) {
                return Err(CoreError::Validation(
                    "maxLength must be greater than zero".to_string(),
                ));
            }
        }
        QuestionType::Number => {
            let params: NumberParams = parse(question_type, value)?;
            if let (Some(min), Some(max)) = (params.min_number, params.max_number) {
                if min > max {
                    return Err(CoreError::Validation(
                        "minNumber must not exceed maxNumber".to_string(),
                    ));
                }
            }
        }
        QuestionType::Email | QuestionType::Consent => {}
    }
    Ok(())
}

/// Shallow-merge `patch` over `base`; top-level keys in `patch` win.
pub fn merge_extra_params(base: &Value, patch: &Value) -> Result<Value, CoreError> {
    let patch = patch.as_object().ok_or_else(|| {
        CoreError::Validation("extra_params patch must be a JSON object".to_string())
    })?;
    let mut merged: Map<String, Value> = base.as_object().cloned().unwrap_or_default();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(merged))
}
