use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Condition, PaginatorTrait, QueryOrder, QuerySelect, Set, SqlErr};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// One redemption of an attendance session by a student.
///
/// `(student_id, session_token)` is unique: a student can redeem a given
/// session at most once.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub session_token: String,
    pub student_email: String,
    pub subject: String,
    pub department: String,
    pub year: String,
    pub semester: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Error)]
pub enum MarkError {
    #[error("Attendance already marked")]
    AlreadyMarked,
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Everything needed to persist a redemption.
#[derive(Debug, Clone)]
pub struct NewRecord<'a> {
    pub student_id: i64,
    pub student_email: &'a str,
    pub session_token: &'a str,
    pub subject: &'a str,
    pub department: &'a str,
    pub year: &'a str,
    pub semester: Option<&'a str>,
}

/// Optional filters for the admin records listing.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub department: Option<String>,
    pub year: Option<String>,
    pub subject: Option<String>,
    /// Calendar day (UTC) the record was taken on.
    pub date: Option<NaiveDate>,
}

impl Model {
    pub async fn exists_for(
        db: &DatabaseConnection,
        student_id: i64,
        session_token: &str,
    ) -> Result<bool, DbErr> {
        let n = Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::SessionToken.eq(session_token))
            .count(db)
            .await?;
        Ok(n > 0)
    }

    /// Persists a redemption. A second redemption of the same session by the
    /// same student fails with [`MarkError::AlreadyMarked`], including when two
    /// requests race past the existence check.
    pub async fn mark(
        db: &DatabaseConnection,
        new: NewRecord<'_>,
        now: DateTime<Utc>,
    ) -> Result<Self, MarkError> {
        if Self::exists_for(db, new.student_id, new.session_token).await? {
            return Err(MarkError::AlreadyMarked);
        }

        let active = ActiveModel {
            id: NotSet,
            student_id: Set(new.student_id),
            session_token: Set(new.session_token.to_owned()),
            student_email: Set(new.student_email.to_owned()),
            subject: Set(new.subject.to_owned()),
            department: Set(new.department.to_owned()),
            year: Set(new.year.to_owned()),
            semester: Set(new.semester.map(str::to_owned)),
            timestamp: Set(now),
        };

        match active.insert(db).await {
            Ok(model) => Ok(model),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(MarkError::AlreadyMarked)
            }
            Err(e) => Err(MarkError::Db(e)),
        }
    }

    /// Most recent records of one student, newest first.
    pub async fn history_for_student(
        db: &DatabaseConnection,
        student_id: i64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::Timestamp)
            .limit(limit)
            .all(db)
            .await
    }

    /// Number of attended sessions per subject for one student.
    pub async fn subject_counts_for_student(
        db: &DatabaseConnection,
        student_id: i64,
    ) -> Result<BTreeMap<String, u64>, DbErr> {
        let rows = Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .all(db)
            .await?;

        let mut counts = BTreeMap::new();
        for row in rows {
            *counts.entry(row.subject).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Admin listing, newest first.
    pub async fn filtered(db: &DatabaseConnection, filter: &RecordFilter) -> Result<Vec<Self>, DbErr> {
        let mut cond = Condition::all();
        if let Some(d) = filter.department.as_deref().filter(|s| !s.is_empty()) {
            cond = cond.add(Column::Department.eq(d));
        }
        if let Some(y) = filter.year.as_deref().filter(|s| !s.is_empty()) {
            cond = cond.add(Column::Year.eq(y));
        }
        if let Some(s) = filter.subject.as_deref().filter(|s| !s.is_empty()) {
            cond = cond.add(Column::Subject.eq(s));
        }
        if let Some(day) = filter.date {
            let start = day.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
            if let Some(start) = start {
                cond = cond
                    .add(Column::Timestamp.gte(start))
                    .add(Column::Timestamp.lt(start + Duration::days(1)));
            }
        }

        Entity::find()
            .filter(cond)
            .order_by_desc(Column::Timestamp)
            .all(db)
            .await
    }

    pub async fn recent(db: &DatabaseConnection, limit: u64) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .order_by_desc(Column::Timestamp)
            .limit(limit)
            .all(db)
            .await
    }

    pub async fn count_since(db: &DatabaseConnection, since: DateTime<Utc>) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::Timestamp.gte(since))
            .count(db)
            .await
    }

    /// Milliseconds since the epoch, the unit the dashboards expect.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
