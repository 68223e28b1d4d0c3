use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, DatabaseConnection, DbErr, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Account role. Admins issue attendance sessions, students redeem them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,

    #[sea_orm(string_value = "student")]
    Student,
}

/// Represents a user in the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name; unique.
    pub email: String,
    pub display_name: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    /// Department a student is enrolled in, if known.
    pub department: Option<String>,
    /// Year code a student is enrolled in, if known.
    pub year: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecords,
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Enrollment attached to a student account.
#[derive(Debug, Clone, Default)]
pub struct Enrollment {
    pub department: Option<String>,
    pub year: Option<String>,
}

impl Model {
    pub fn hash_password(password: &str) -> Result<String, DbErr> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| DbErr::Custom(format!("Failed to hash password: {e}")))
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn create(
        db: &DatabaseConnection,
        email: &str,
        display_name: &str,
        password: &str,
        role: Role,
        enrollment: Enrollment,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            id: NotSet,
            email: Set(email.trim().to_lowercase()),
            display_name: Set(display_name.to_owned()),
            password_hash: Set(Self::hash_password(password)?),
            role: Set(role),
            department: Set(enrollment.department),
            year: Set(enrollment.year),
            created_at: Set(Utc::now()),
        };
        active.insert(db).await
    }

    pub async fn find_by_email(
        db: &DatabaseConnection,
        email: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(db)
            .await
    }

    /// Returns the user only if the password matches.
    pub async fn verify_credentials(
        db: &DatabaseConnection,
        email: &str,
        password: &str,
    ) -> Result<Option<Self>, DbErr> {
        Ok(Self::find_by_email(db, email)
            .await?
            .filter(|user| user.verify_password(password)))
    }

    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Self>, DbErr> {
        Entity::find().order_by_asc(Column::Id).all(db).await
    }

    /// Deletes by email; returns whether a row was removed.
    pub async fn delete_by_email(db: &DatabaseConnection, email: &str) -> Result<bool, DbErr> {
        let res = Entity::delete_many()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .exec(db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn count_by_role(db: &DatabaseConnection, role: Role) -> Result<u64, DbErr> {
        Entity::find().filter(Column::Role.eq(role)).count(db).await
    }

    /// Whether a student may attend a class of `department`/`year`.
    /// Accounts without a recorded enrollment are not restricted.
    pub fn is_enrolled_in(&self, department: &str, year: &str) -> bool {
        let dept_ok = self.department.as_deref().is_none_or(|d| d == department);
        let year_ok = self.year.as_deref().is_none_or(|y| y == year);
        dept_ok && year_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn create_and_verify_credentials() {
        let db = setup_test_db().await;
        let user = Model::create(
            &db,
            "Alice@Example.com",
            "Alice",
            "password123",
            Role::Student,
            Enrollment::default(),
        )
        .await
        .unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_ne!(user.password_hash, "password123");

        let ok = Model::verify_credentials(&db, "alice@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(ok.map(|u| u.id), Some(user.id));

        let bad = Model::verify_credentials(&db, "alice@example.com", "nope")
            .await
            .unwrap();
        assert!(bad.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = setup_test_db().await;
        Model::create(&db, "dup@example.com", "A", "pw", Role::Admin, Enrollment::default())
            .await
            .unwrap();
        let second =
            Model::create(&db, "dup@example.com", "B", "pw", Role::Admin, Enrollment::default())
                .await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn count_and_delete() {
        let db = setup_test_db().await;
        Model::create(&db, "a@x.com", "A", "pw", Role::Admin, Enrollment::default())
            .await
            .unwrap();
        Model::create(&db, "s1@x.com", "S1", "pw", Role::Student, Enrollment::default())
            .await
            .unwrap();
        Model::create(&db, "s2@x.com", "S2", "pw", Role::Student, Enrollment::default())
            .await
            .unwrap();

        assert_eq!(Model::count_by_role(&db, Role::Student).await.unwrap(), 2);
        assert!(Model::delete_by_email(&db, "s1@x.com").await.unwrap());
        assert!(!Model::delete_by_email(&db, "s1@x.com").await.unwrap());
        assert_eq!(Model::count_by_role(&db, Role::Student).await.unwrap(), 1);
        assert_eq!(Model::list_all(&db).await.unwrap().len(), 2);
    }

    #[test]
    fn enrollment_restricts_only_when_recorded() {
        let mut user = Model {
            id: 1,
            email: "s@x.com".into(),
            display_name: "S".into(),
            password_hash: String::new(),
            role: Role::Student,
            department: None,
            year: None,
            created_at: Utc::now(),
        };
        assert!(user.is_enrolled_in("CSE", "SY"));

        user.department = Some("CSE".into());
        user.year = Some("SY".into());
        assert!(user.is_enrolled_in("CSE", "SY"));
        assert!(!user.is_enrolled_in("CSE", "TY"));
        assert!(!user.is_enrolled_in("AIDS", "SY"));
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert!("lecturer".parse::<Role>().is_err());
        assert_eq!(Role::Student.to_string(), "student");
    }
}
