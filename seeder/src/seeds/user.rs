use crate::seed::Seeder;
use common::catalog;
use db::models::user::{Enrollment, Model, Role};
use fake::{Fake, faker::internet::en::SafeEmail, faker::name::en::Name};
use sea_orm::{DatabaseConnection, DbErr};

pub const DEMO_PASSWORD: &str = "password123";

/// Demo accounts: one admin, one student enrolled in CSE SY, and a handful
/// of random students spread over the catalog.
pub struct UserSeeder;

#[async_trait::async_trait]
impl Seeder for UserSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let fixed = [
            ("admin@example.com", "Demo Admin", Role::Admin, Enrollment::default()),
            (
                "student@example.com",
                "Demo Student",
                Role::Student,
                Enrollment {
                    department: Some("CSE".into()),
                    year: Some("SY".into()),
                },
            ),
        ];
        for (email, name, role, enrollment) in fixed {
            if Model::find_by_email(db, email).await?.is_none() {
                Model::create(db, email, name, DEMO_PASSWORD, role, enrollment).await?;
            }
        }

        let departments: Vec<&str> = catalog::departments().collect();
        let years: Vec<&str> = catalog::years().collect();

        for _ in 0..10 {
            let email: String = SafeEmail().fake();
            let name: String = Name().fake();
            let enrollment = Enrollment {
                department: Some(departments[fastrand::usize(..departments.len())].to_owned()),
                year: Some(years[fastrand::usize(..years.len())].to_owned()),
            };
            // Fake emails can collide; skip rather than fail the run.
            if Model::find_by_email(db, &email).await?.is_none() {
                Model::create(db, &email, &name, DEMO_PASSWORD, Role::Student, enrollment).await?;
            }
        }

        Ok(())
    }
}
