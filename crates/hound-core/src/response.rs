//! Provider response envelope → display text.
//!
//! Only the fields needed to print an answer are looked at: `Status`,
//! `ErrorMessage`, `NumToReturn` and `AllResults[0].WrittenResponseLong`.

use serde_json::Value;

/// Why a server payload could not be turned into display text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("server reported status {status:?}: {message}")]
    Status { status: String, message: String },
    #[error("no results to return")]
    NoResults,
    #[error("response is missing {0}")]
    MissingField(&'static str),
}

/// Extract the long written response from a raw server payload.
pub fn parse_written_response(payload: &str) -> Result<String, ResponseError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| ResponseError::InvalidJson(e.to_string()))?;

    let status = value
        .get("Status")
        .and_then(Value::as_str)
        .ok_or(ResponseError::MissingField("Status"))?;
    if !status.eq_ignore_ascii_case("ok") {
        let message = value
            .get("ErrorMessage")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        return Err(ResponseError::Status {
            status: status.to_string(),
            message,
        });
    }

    if let Some(n) = value.get("NumToReturn").and_then(Value::as_f64) {
        if n < 1.0 {
            return Err(ResponseError::NoResults);
        }
    }

    value
        .get("AllResults")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .ok_or(ResponseError::NoResults)?
        .get("WrittenResponseLong")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ResponseError::MissingField("AllResults[0].WrittenResponseLong"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_written_response_long() {
        let payload = r#"{
            "Status": "OK",
            "NumToReturn": 1,
            "AllResults": [
                {"WrittenResponse": "short", "WrittenResponseLong": "It is 21 degrees and sunny."}
            ]
        }"#;
        assert_eq!(
            parse_written_response(payload).unwrap(),
            "It is 21 degrees and sunny."
        );
    }

    #[test]
    fn status_is_case_insensitive() {
        let payload = r#"{"Status":"ok","AllResults":[{"WrittenResponseLong":"hi"}]}"#;
        assert_eq!(parse_written_response(payload).unwrap(), "hi");
    }

    #[test]
    fn error_status_carries_message() {
        let payload = r#"{"Status":"Error","ErrorMessage":"bad client key"}"#;
        assert_eq!(
            parse_written_response(payload),
            Err(ResponseError::Status {
                status: "Error".into(),
                message: "bad client key".into(),
            })
        );
    }

    #[test]
    fn zero_results_is_an_error() {
        let payload = r#"{"Status":"OK","NumToReturn":0,"AllResults":[]}"#;
        assert_eq!(parse_written_response(payload), Err(ResponseError::NoResults));
    }

    #[test]
    fn empty_results_without_count_is_an_error() {
        let payload = r#"{"Status":"OK","AllResults":[]}"#;
        assert_eq!(parse_written_response(payload), Err(ResponseError::NoResults));
    }

    #[test]
    fn missing_written_response() {
        let payload = r#"{"Status":"OK","AllResults":[{"WrittenResponse":"x"}]}"#;
        assert!(matches!(
            parse_written_response(payload),
            Err(ResponseError::MissingField(_))
        ));
    }

    #[test]
    fn missing_status() {
        assert_eq!(
            parse_written_response("{}"),
            Err(ResponseError::MissingField("Status"))
        );
    }

    #[test]
    fn not_json() {
        assert!(matches!(
            parse_written_response("<html>502</html>"),
            Err(ResponseError::InvalidJson(_))
        ));
    }
}
