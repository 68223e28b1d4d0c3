//! Client side of the QR attendance protocol: issue a session and poll its
//! liveness (admin), redeem a scanned token (student).

pub mod api;
pub mod config;
pub mod error;
pub mod poller;
pub mod redeem;
pub mod session;

pub use api::{ApiClient, IssuedSession, Redemption};
pub use config::ClientConfig;
pub use error::ClientError;
pub use poller::{ExpiryPolicy, PollSnapshot, PollerConfig, PollerHandle, SessionState, SessionView};
pub use redeem::{Redeemer, ScanState, normalize_scanned_payload};
pub use session::IssueRequest;
