use crate::seed::run_seeder;
use crate::seeds::user::UserSeeder;
use crate::users::{NewUser, UserCommandError, create_user, delete_user, list_users};
use colored::*;
use db::models::user::{Enrollment, Role};
use migration::Migrator;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::io::{self, BufRead, Write};
use std::{env, process::ExitCode};

mod seed;
mod seeds;
mod users;

const USAGE: &str = "usage:
  seeder                      interactive menu
  seeder seed                 demo users
  seeder create-admin <email> <password> <name>
  seeder create-student <email> <password> <name> [department] [year]
  seeder list
  seeder delete <email>";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "data/attendance.db".into());

    let db = match db::connect(&db_path).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{} {e}", "Failed to open database:".red());
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = Migrator::up(&db, None).await {
        eprintln!("{} {e}", "Failed to run migrations:".red());
        return ExitCode::FAILURE;
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let result = match args.as_slice() {
        [] => interactive(&db).await,
        ["seed"] => run_seeder(&UserSeeder, "User", &db)
            .await
            .map_err(UserCommandError::from),
        ["create-admin", email, password, name] => {
            create_user(&db, new_user(email, password, name, Role::Admin, None, None))
                .await
                .map(drop)
        }
        ["create-student", email, password, name, rest @ ..] if rest.len() <= 2 => {
            let dept = rest.first().copied();
            let year = rest.get(1).copied();
            create_user(&db, new_user(email, password, name, Role::Student, dept, year))
                .await
                .map(drop)
        }
        ["list"] => list_users(&db).await.map(drop),
        ["delete", email] => delete_user(&db, email).await,
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red());
            ExitCode::FAILURE
        }
    }
}

fn new_user(
    email: &str,
    password: &str,
    name: &str,
    role: Role,
    department: Option<&str>,
    year: Option<&str>,
) -> NewUser {
    NewUser {
        email: email.to_owned(),
        password: password.to_owned(),
        display_name: name.to_owned(),
        role,
        enrollment: Enrollment {
            department: department.filter(|s| !s.is_empty()).map(str::to_owned),
            year: year.filter(|s| !s.is_empty()).map(str::to_owned),
        },
    }
}

/// Reads one trimmed line; `None` once stdin is closed.
fn read_line(label: &str) -> Option<String> {
    print!("{label}");
    io::stdout().flush().ok();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_owned()),
    }
}

fn prompt(label: &str) -> String {
    read_line(label).unwrap_or_default()
}

async fn interactive(db: &DatabaseConnection) -> Result<(), UserCommandError> {
    loop {
        println!("\n1. Create Admin User");
        println!("2. Create Student User");
        println!("3. List All Users");
        println!("4. Delete User");
        println!("5. Exit");

        let Some(choice) = read_line("\nEnter your choice (1-5): ") else {
            return Ok(());
        };

        let outcome = match choice.as_str() {
            "1" => {
                let email = prompt("Enter admin email: ");
                let password = prompt("Enter password (min 6 characters): ");
                let name = prompt("Enter admin name: ");
                create_user(db, new_user(&email, &password, &name, Role::Admin, None, None))
                    .await
                    .map(drop)
            }
            "2" => {
                let email = prompt("Enter student email: ");
                let password = prompt("Enter password (min 6 characters): ");
                let name = prompt("Enter student name: ");
                let dept = prompt("Enter department (blank to skip): ");
                let year = prompt("Enter year (blank to skip): ");
                let user = new_user(
                    &email,
                    &password,
                    &name,
                    Role::Student,
                    Some(&dept),
                    Some(&year),
                );
                create_user(db, user).await.map(drop)
            }
            "3" => list_users(db).await.map(drop),
            "4" => {
                let email = prompt("Enter user email to delete: ");
                delete_user(db, &email).await
            }
            "5" => {
                println!("Exiting...");
                return Ok(());
            }
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };

        // A failed action is reported and the menu continues.
        if let Err(e) = outcome {
            println!("{} {e}", "Error:".red());
        }
    }
}
