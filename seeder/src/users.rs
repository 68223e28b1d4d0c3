//! Account management: create, list and delete users.

use colored::*;
use common::catalog;
use db::models::user::{Enrollment, Model as User, Role};
use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum UserCommandError {
    #[error("{0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

pub struct NewUser {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
    pub enrollment: Enrollment,
}

impl NewUser {
    fn validate(&self) -> Result<(), UserCommandError> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(UserCommandError::Invalid(format!("Invalid email: {}", self.email)));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(UserCommandError::Invalid(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if let Some(dept) = &self.enrollment.department {
            if !catalog::departments().any(|d| d == dept) {
                return Err(UserCommandError::Invalid(format!("Unknown department: {dept}")));
            }
        }
        if let Some(year) = &self.enrollment.year {
            if !catalog::years().any(|y| y == year) {
                return Err(UserCommandError::Invalid(format!("Unknown year: {year}")));
            }
        }
        Ok(())
    }
}

pub async fn create_user(db: &DatabaseConnection, new: NewUser) -> Result<User, UserCommandError> {
    new.validate()?;
    if User::find_by_email(db, &new.email).await?.is_some() {
        return Err(UserCommandError::Invalid(format!(
            "A user with email {} already exists",
            new.email
        )));
    }

    let user = User::create(
        db,
        &new.email,
        &new.display_name,
        &new.password,
        new.role,
        new.enrollment,
    )
    .await?;

    println!("{} {}", "Successfully created user:".green(), user.email);
    println!("User ID: {}", user.id);
    println!("Role: {}", user.role);
    Ok(user)
}

pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<User>, UserCommandError> {
    let users = User::list_all(db).await?;

    println!("\n{}", "All Users:".bold());
    println!(
        "{:<6} {:<32} {:<24} {:<8} {:<6} {:<4}",
        "ID", "Email", "Name", "Role", "Dept", "Year"
    );
    for u in &users {
        println!(
            "{:<6} {:<32} {:<24} {:<8} {:<6} {:<4}",
            u.id,
            u.email,
            u.display_name,
            u.role,
            u.department.as_deref().unwrap_or("-"),
            u.year.as_deref().unwrap_or("-"),
        );
    }
    Ok(users)
}

pub async fn delete_user(db: &DatabaseConnection, email: &str) -> Result<(), UserCommandError> {
    if User::delete_by_email(db, email).await? {
        println!("{} {}", "Successfully deleted user:".green(), email);
        Ok(())
    } else {
        Err(UserCommandError::Invalid(format!("No user with email {email}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::test_utils::setup_test_db;

    fn student(email: &str, password: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password: password.into(),
            display_name: "S".into(),
            role: Role::Student,
            enrollment: Enrollment {
                department: Some("CSE".into()),
                year: Some("SY".into()),
            },
        }
    }

    #[tokio::test]
    async fn create_list_delete() {
        let db = setup_test_db().await;

        create_user(&db, student("s@x.com", "secret1")).await.unwrap();
        assert!(matches!(
            create_user(&db, student("s@x.com", "secret1")).await,
            Err(UserCommandError::Invalid(_))
        ));
        assert_eq!(list_users(&db).await.unwrap().len(), 1);

        delete_user(&db, "s@x.com").await.unwrap();
        assert!(delete_user(&db, "s@x.com").await.is_err());
        assert!(list_users(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_short_passwords_and_unknown_enrollment() {
        let db = setup_test_db().await;

        assert!(create_user(&db, student("s@x.com", "123")).await.is_err());

        let mut bad = student("t@x.com", "secret1");
        bad.enrollment.department = Some("MECH".into());
        assert!(create_user(&db, bad).await.is_err());
    }
}
