use serde::Serialize;

/// Response envelope of operations that report an outcome to the user, such
/// as marking attendance.
///
/// ```json
/// { "success": true, "message": "Attendance marked successfully", "details": { ... } }
/// ```
///
/// On failure `details` is omitted and `message` carries the reason verbatim:
///
/// ```json
/// { "success": false, "message": "Attendance already marked" }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Constructs a success response with the given details and message.
    pub fn success(details: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Constructs a failure response with a message and no details.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: None,
        }
    }
}

/// `{ "error": "..." }`, the failure body of the admin and data endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
