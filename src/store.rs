use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::FeedbackRecord;

/// Read-only contract with the activity store that owns the faculty records.
///
/// Guarantees expected of implementations:
/// - Counts cover only records with `completed` status whose date falls in
///   the inclusive `[start, end]` window.
/// - `feedback_records` matches calendar years exactly and returns entries
///   with their teaching score as stored, nulls included.
/// - Failures are returned as-is. No method retries, and none substitutes a
///   default value for a failed query.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Completed course enrollments for one faculty member in the window.
    async fn count_completed_enrollments(
        &self,
        faculty_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<i64>;

    /// Completed activities of any of the given types in the window.
    async fn count_completed_activities(
        &self,
        faculty_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        types: &[&str],
    ) -> anyhow::Result<i64>;

    /// All feedback entries for the faculty member in the given years.
    async fn feedback_records(
        &self,
        faculty_id: &str,
        years: &[i32],
    ) -> anyhow::Result<Vec<FeedbackRecord>>;
}
