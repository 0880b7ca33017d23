use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{FacultyProfile, FeedbackRecord};
use crate::store::ActivityStore;

/// The production activity store: the portal's Postgres instance.
pub struct PgActivityStore {
    pool: PgPool,
}

impl PgActivityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStore for PgActivityStore {
    async fn count_completed_enrollments(
        &self,
        faculty_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM faculty_scorecard.course_enrollments \
             WHERE user_id = $1 AND status = 'completed' \
             AND enrolled_on BETWEEN $2 AND $3",
        )
        .bind(faculty_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .context("counting completed enrollments")?;
        Ok(row.get("total"))
    }

    async fn count_completed_activities(
        &self,
        faculty_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        types: &[&str],
    ) -> anyhow::Result<i64> {
        let type_list: Vec<String> = types.iter().map(|t| t.to_string()).collect();
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM faculty_scorecard.activities \
             WHERE user_id = $1 AND status = 'completed' \
             AND activity_type = ANY($2) \
             AND completed_on BETWEEN $3 AND $4",
        )
        .bind(faculty_id)
        .bind(&type_list)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .context("counting completed activities")?;
        Ok(row.get("total"))
    }

    async fn feedback_records(
        &self,
        faculty_id: &str,
        years: &[i32],
    ) -> anyhow::Result<Vec<FeedbackRecord>> {
        let year_list: Vec<i32> = years.to_vec();
        let rows = sqlx::query(
            "SELECT teaching_score FROM faculty_scorecard.performance_metrics \
             WHERE user_id = $1 AND year = ANY($2)",
        )
        .bind(faculty_id)
        .bind(&year_list)
        .fetch_all(&self.pool)
        .await
        .context("fetching feedback records")?;

        Ok(rows
            .into_iter()
            .map(|row| FeedbackRecord {
                teaching_score: row.get("teaching_score"),
            })
            .collect())
    }
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn fetch_roster(pool: &PgPool) -> anyhow::Result<Vec<FacultyProfile>> {
    let rows = sqlx::query(
        "SELECT user_id, full_name, email, department, designation \
         FROM faculty_scorecard.profiles ORDER BY full_name",
    )
    .fetch_all(pool)
    .await
    .context("fetching faculty roster")?;

    Ok(rows.into_iter().map(|row| profile_from_row(&row)).collect())
}

pub async fn find_faculty_by_email(
    pool: &PgPool,
    email: &str,
) -> anyhow::Result<Option<FacultyProfile>> {
    let row = sqlx::query(
        "SELECT user_id, full_name, email, department, designation \
         FROM faculty_scorecard.profiles WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .context("looking up faculty profile")?;

    Ok(row.map(|row| profile_from_row(&row)))
}

fn profile_from_row(row: &sqlx::postgres::PgRow) -> FacultyProfile {
    FacultyProfile {
        faculty_id: row.get("user_id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        department: row.get("department"),
        designation: row.get("designation"),
    }
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let faculty = vec![
        (
            "8b5f2a1c-4f7e-4f30-9f3e-6c2f5d8a1b90",
            "Amara Okafor",
            "amara.okafor@example.edu",
            Some("Physics"),
            Some("Professor"),
        ),
        (
            "0d4e9c72-3a15-4a8e-b6d1-7e2c94f0a3c5",
            "Lin Wei",
            "lin.wei@example.edu",
            Some("Physics"),
            Some("Assistant Professor"),
        ),
        (
            "6a1c3e58-92d4-46fb-8a07-1b5d2c8e4f60",
            "Noor Haddad",
            "noor.haddad@example.edu",
            Some("History"),
            Some("Lecturer"),
        ),
    ];

    for (user_id, full_name, email, department, designation) in faculty {
        sqlx::query(
            r#"
            INSERT INTO faculty_scorecard.profiles (user_id, full_name, email, department, designation)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                department = EXCLUDED.department,
                designation = EXCLUDED.designation
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(email)
        .bind(department)
        .bind(designation)
        .execute(pool)
        .await?;
    }

    let enrollments = vec![
        ("amara.okafor@example.edu", "Inclusive Assessment Design", "completed", date(2024, 9, 12)?),
        ("amara.okafor@example.edu", "Research Data Management", "completed", date(2025, 1, 20)?),
        ("amara.okafor@example.edu", "Curriculum Mapping Basics", "completed", date(2025, 3, 4)?),
        ("lin.wei@example.edu", "Inclusive Assessment Design", "completed", date(2024, 10, 2)?),
        ("lin.wei@example.edu", "Grant Writing Essentials", "enrolled", date(2025, 2, 14)?),
    ];

    for (email, course_title, status, enrolled_on) in enrollments {
        let user_id = user_id_for(pool, email).await?;
        sqlx::query(
            r#"
            INSERT INTO faculty_scorecard.course_enrollments (id, user_id, course_title, status, enrolled_on)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, course_title) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_title)
        .bind(status)
        .bind(enrolled_on)
        .execute(pool)
        .await?;
    }

    let activities = vec![
        ("seed-101", "amara.okafor@example.edu", "workshop", "Active Learning Workshop", "completed", Some(date(2024, 11, 8)?)),
        ("seed-102", "amara.okafor@example.edu", "conference", "National Physics Education Conference", "completed", Some(date(2025, 4, 17)?)),
        ("seed-103", "amara.okafor@example.edu", "publication", "Lab-first Mechanics Curricula", "completed", Some(date(2025, 2, 28)?)),
        ("seed-104", "amara.okafor@example.edu", "research", "Peer Instruction Outcomes Study", "completed", Some(date(2025, 5, 30)?)),
        ("seed-105", "lin.wei@example.edu", "seminar", "Department Teaching Seminar", "completed", Some(date(2024, 12, 5)?)),
        ("seed-106", "lin.wei@example.edu", "publication", "Quantum Optics Review", "planned", None),
    ];

    for (source_key, email, activity_type, title, status, completed_on) in activities {
        let user_id = user_id_for(pool, email).await?;
        sqlx::query(
            r#"
            INSERT INTO faculty_scorecard.activities
            (id, user_id, activity_type, title, status, completed_on, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(activity_type)
        .bind(title)
        .bind(status)
        .bind(completed_on)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let metrics = vec![
        ("amara.okafor@example.edu", 2024, "November", Some(82)),
        ("amara.okafor@example.edu", 2025, "March", Some(88)),
        ("lin.wei@example.edu", 2024, "November", Some(65)),
        ("lin.wei@example.edu", 2025, "March", None),
        ("noor.haddad@example.edu", 2024, "November", Some(25)),
    ];

    for (email, year, month, teaching_score) in metrics {
        let user_id = user_id_for(pool, email).await?;
        sqlx::query(
            r#"
            INSERT INTO faculty_scorecard.performance_metrics (id, user_id, year, month, teaching_score)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, year, month) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(year)
        .bind(month)
        .bind(teaching_score)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn import_activities_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        department: Option<String>,
        activity_type: String,
        title: String,
        status: String,
        completed_on: Option<NaiveDate>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let user_id = upsert_profile(pool, &row.full_name, &row.email, row.department.as_deref()).await?;

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO faculty_scorecard.activities
            (id, user_id, activity_type, title, status, completed_on, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user_id)
        .bind(&row.activity_type)
        .bind(&row.title)
        .bind(&row.status)
        .bind(row.completed_on)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn import_metrics_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        year: i32,
        month: String,
        teaching_score: Option<i32>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let user_id = upsert_profile(pool, &row.full_name, &row.email, None).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO faculty_scorecard.performance_metrics (id, user_id, year, month, teaching_score)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, year, month) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user_id)
        .bind(row.year)
        .bind(&row.month)
        .bind(row.teaching_score)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

async fn upsert_profile(
    pool: &PgPool,
    full_name: &str,
    email: &str,
    department: Option<&str>,
) -> anyhow::Result<String> {
    let row = sqlx::query(
        r#"
        INSERT INTO faculty_scorecard.profiles (user_id, full_name, email, department)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name,
            department = COALESCE(EXCLUDED.department, faculty_scorecard.profiles.department)
        RETURNING user_id
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(full_name)
    .bind(email)
    .bind(department)
    .fetch_one(pool)
    .await?;
    Ok(row.get("user_id"))
}

async fn user_id_for(pool: &PgPool, email: &str) -> anyhow::Result<String> {
    let row = sqlx::query("SELECT user_id FROM faculty_scorecard.profiles WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .with_context(|| format!("no faculty profile for {email}"))?;
    Ok(row.get("user_id"))
}

fn date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).context("invalid date")
}
