use common::catalog;
use serde::Serialize;

use crate::error::ClientError;

/// Parameters of an issuance request. All four fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRequest {
    pub department: String,
    pub year: String,
    pub semester: String,
    pub subject: String,
}

impl IssueRequest {
    pub fn new(
        department: impl Into<String>,
        year: impl Into<String>,
        semester: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            department: department.into(),
            year: year.into(),
            semester: semester.into(),
            subject: subject.into(),
        }
    }

    /// Rejects missing fields and combinations outside the catalog.
    pub fn validate(&self) -> Result<(), ClientError> {
        let missing: Vec<&str> = [
            ("department", &self.department),
            ("year", &self.year),
            ("semester", &self.semester),
            ("subject", &self.subject),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ClientError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        catalog::check(
            &self.department,
            &self.year,
            Some(&self.semester),
            &self.subject,
        )
        .map_err(|e| ClientError::Validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_request_passes() {
        let req = IssueRequest::new("CSE", "SY", "SEM3", "Data Structures");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn missing_fields_are_listed() {
        let req = IssueRequest::new("CSE", "", "SEM3", " ");
        match req.validate() {
            Err(ClientError::Validation(m)) => {
                assert_eq!(m, "Missing required fields: year, subject")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn combinations_outside_catalog_are_rejected() {
        for req in [
            IssueRequest::new("MECH", "SY", "SEM3", "Data Structures"),
            IssueRequest::new("CSE", "SY", "SEM5", "Data Structures"),
            IssueRequest::new("CSE", "SY", "SEM3", "Compiler Design"),
        ] {
            assert!(matches!(req.validate(), Err(ClientError::Validation(_))));
        }
    }
}
