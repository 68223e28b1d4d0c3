pub mod migrations {
    pub mod m202505290001_create_users;
    pub mod m202509080001_create_attendance;
}

mod migrator;

pub use migrator::Migrator;
