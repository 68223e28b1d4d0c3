use serde::Deserialize;
use thiserror::Error;

/// Failure of a single client operation. Nothing is retried automatically.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally; no request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response without a recognisable failure body.
    #[error("HTTP {0}")]
    Status(u16),

    /// Business-rule failure reported by the server, message kept verbatim.
    #[error("{0}")]
    Domain(String),

    /// The issuer refused to open another session for the same class.
    #[error("{0}")]
    RateLimited(String),
}

/// Union of the failure bodies the server sends: `{error}`,
/// `{success: false, message}` and `{status: "error", message}`.
#[derive(Debug, Deserialize)]
struct FailureBody {
    error: Option<String>,
    success: Option<bool>,
    status: Option<String>,
    message: Option<String>,
}

impl FailureBody {
    fn into_message(self) -> Option<String> {
        let failed = self.success == Some(false) || self.status.as_deref() == Some("error");
        self.error.or(self.message.filter(|_| failed))
    }
}

/// A body that signals a business failure. Only deserializes when the body
/// actually carries one, so it can sit in front of the expected payload in an
/// untagged enum.
#[derive(Debug, Deserialize)]
#[serde(try_from = "FailureBody")]
pub(crate) struct Failure(pub(crate) String);

impl TryFrom<FailureBody> for Failure {
    type Error = &'static str;

    fn try_from(body: FailureBody) -> Result<Self, Self::Error> {
        body.into_message().map(Failure).ok_or("not a failure body")
    }
}

impl ClientError {
    /// Classifies a non-2xx response from its status and raw body.
    pub(crate) fn from_failure(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<FailureBody>(body)
            .ok()
            .and_then(FailureBody::into_message);

        match message {
            Some(m) if status == 429 => Self::RateLimited(m),
            Some(m) => Self::Domain(m),
            None => Self::Status(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_bodies_are_classified() {
        assert!(matches!(
            ClientError::from_failure(400, br#"{"success":false,"message":"Attendance already marked"}"#),
            ClientError::Domain(m) if m == "Attendance already marked"
        ));
        assert!(matches!(
            ClientError::from_failure(400, br#"{"error":"subject is required"}"#),
            ClientError::Domain(m) if m == "subject is required"
        ));
        assert!(matches!(
            ClientError::from_failure(403, br#"{"status":"error","message":"Invalid role"}"#),
            ClientError::Domain(m) if m == "Invalid role"
        ));
        assert!(matches!(
            ClientError::from_failure(429, br#"{"error":"busy"}"#),
            ClientError::RateLimited(m) if m == "busy"
        ));
    }

    #[test]
    fn failure_only_matches_failure_shaped_bodies() {
        let f: Failure = serde_json::from_str(r#"{"error":"Missing required fields"}"#).unwrap();
        assert_eq!(f.0, "Missing required fields");

        assert!(serde_json::from_str::<Failure>(r#"{"active":false,"message":"QR code expired"}"#).is_err());
        assert!(serde_json::from_str::<Failure>(r#"{"status":"success","message":"Login successful"}"#).is_err());
        assert!(serde_json::from_str::<Failure>(r#"{"qrData":"abc","expiresIn":15}"#).is_err());
    }

    #[test]
    fn undecodable_bodies_keep_the_status() {
        assert!(matches!(ClientError::from_failure(502, b"Bad Gateway"), ClientError::Status(502)));
        assert!(matches!(
            ClientError::from_failure(500, br#"{"success":true,"message":"odd"}"#),
            ClientError::Status(500)
        ));
    }
}
