use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;

use crate::error::ApiError;
use crate::validator::Validator;

/// Parse an `:id` path segment. Anything that is not a positive integer is
/// treated as a missing resource.
pub fn read_id_param(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::not_found()),
    }
}

pub fn read_string(qs: &HashMap<String, String>, key: &str, default: &str) -> String {
    match qs.get(key) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => default.to_string(),
    }
}

/// Missing values fall back to `default`; unparsable ones are recorded on
/// the validator.
pub fn read_int(qs: &HashMap<String, String>, key: &str, default: i64, v: &mut Validator) -> i64 {
    match qs.get(key) {
        None => default,
        Some(value) if value.is_empty() => default,
        Some(value) => match value.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                v.add_error(key, "must be an integer value");
                default
            }
        },
    }
}

/// Turn a JSON extractor rejection into a 400 with the decoder's message
pub fn bad_json(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("request body must be sent as application/json")
        }
        JsonRejection::JsonSyntaxError(e) => {
            ApiError::bad_request(format!("body contains badly-formed JSON: {}", e.body_text()))
        }
        JsonRejection::JsonDataError(e) => {
            ApiError::bad_request(format!("body contains invalid data: {}", e.body_text()))
        }
        other => ApiError::bad_request(other.body_text()),
    }
}
