//! Scan → submit.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::{ApiClient, Redemption};
use crate::error::ClientError;

/// Reduces a scanned payload to the bare session token.
///
/// URL payloads (`http…`) keep the text after the last `/`, minus the first
/// `.png`. Anything else is taken as the token itself.
pub fn normalize_scanned_payload(raw: &str) -> Result<String, ClientError> {
    let token = if raw.starts_with("http") {
        let last = raw.rsplit('/').next().unwrap_or(raw);
        last.replacen(".png", "", 1)
    } else {
        raw.to_owned()
    };

    if token.is_empty() {
        return Err(ClientError::Validation("Invalid QR code data".into()));
    }
    Ok(token)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Ready to accept the next scan.
    Capturing,
    /// A redemption is in flight; scans are ignored.
    Submitting,
}

/// Puts the scanner back into `Capturing` when dropped.
struct SubmitGuard<'a>(&'a watch::Sender<ScanState>);

impl<'a> SubmitGuard<'a> {
    fn enter(state: &'a watch::Sender<ScanState>) -> Self {
        state.send_replace(ScanState::Submitting);
        Self(state)
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(ScanState::Capturing);
    }
}

/// The student's scanning device.
pub struct Redeemer {
    api: ApiClient,
    state: watch::Sender<ScanState>,
}

impl Redeemer {
    /// `api` must carry the student's token.
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(ScanState::Capturing);
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ScanState {
        *self.state.borrow()
    }

    /// Normalises `raw` and submits it once. Server failure messages come
    /// back verbatim as [`ClientError::Domain`].
    pub async fn redeem(&mut self, raw: &str) -> Result<Redemption, ClientError> {
        let token = normalize_scanned_payload(raw)?;
        let _guard = SubmitGuard::enter(&self.state);

        match self.api.mark_attendance(&token).await {
            Ok(r) => {
                info!(token = %token, "attendance redeemed");
                Ok(r)
            }
            Err(e) => {
                warn!(token = %token, error = %e, "redemption failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_and_bare_payloads_normalise_to_the_same_token() {
        assert_eq!(
            normalize_scanned_payload("https://host/path/ABC123.png").unwrap(),
            "ABC123"
        );
        assert_eq!(normalize_scanned_payload("ABC123").unwrap(), "ABC123");
        assert_eq!(
            normalize_scanned_payload("http://localhost:5000/static/qr_codes/ABC123").unwrap(),
            "ABC123"
        );
    }

    #[test]
    fn only_the_first_png_is_removed() {
        assert_eq!(
            normalize_scanned_payload("https://h/a.png.png").unwrap(),
            "a.png"
        );
        // Bare payloads are never rewritten.
        assert_eq!(normalize_scanned_payload("tok.png").unwrap(), "tok.png");
    }

    #[test]
    fn empty_payloads_are_rejected() {
        assert!(matches!(
            normalize_scanned_payload(""),
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            normalize_scanned_payload("https://host/path/"),
            Err(ClientError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn scanner_returns_to_capturing_after_a_failed_submit() {
        // Nothing listens on port 9; the request fails at the transport level.
        let mut r = Redeemer::new(ApiClient::new("http://127.0.0.1:9"));
        let mut states = r.subscribe();

        let err = r.redeem("ABC123").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(r.state(), ScanState::Capturing);
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), ScanState::Capturing);
    }

    #[tokio::test]
    async fn invalid_payload_never_leaves_capturing() {
        let mut r = Redeemer::new(ApiClient::new("http://127.0.0.1:9"));
        let states = r.subscribe();

        assert!(r.redeem("").await.is_err());
        assert!(!states.has_changed().unwrap());
    }
}
