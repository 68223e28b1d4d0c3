//! HTTP service for QR attendance sessions: issuance and liveness for admins,
//! redemption for students.

pub mod auth;
pub mod response;
pub mod routes;
pub mod state;
