use futures::{stream, StreamExt};
use thiserror::Error;

use crate::models::{Badge, FacultyProfile, FeedbackRecord, PerformanceScore};
use crate::period::ScoringPeriod;
use crate::store::ActivityStore;

/// Completed records that map a sub-score to 100.
pub const TRAINING_TARGET: i64 = 10;
pub const PUBLICATION_TARGET: i64 = 5;

/// Composite weights. Must sum to 1.0.
pub const TRAINING_WEIGHT: f64 = 0.30;
pub const FEEDBACK_WEIGHT: f64 = 0.40;
pub const PUBLICATION_WEIGHT: f64 = 0.30;

/// Activity types counted as training participation.
pub const TRAINING_TYPES: [&str; 4] = ["workshop", "seminar", "conference", "training"];
/// Activity types counted as publication output.
pub const PUBLICATION_TYPES: [&str; 2] = ["publication", "research"];

#[derive(Debug, Error)]
pub enum EngineError {
    /// The request was malformed; nothing was queried.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A store query failed. The caller decides what to display; the engine
    /// never turns this into a default score.
    #[error("activity store query failed")]
    DataAccess(#[source] anyhow::Error),
}

/// `min(round(count / target * 100), 100)`.
pub fn normalize_count(count: i64, target: i64) -> i64 {
    (((count as f64 / target as f64) * 100.0).round() as i64).min(100)
}

/// Rounded mean teaching score, with missing scores counted as 0.
/// No records averages to 0.
pub fn average_feedback(records: &[FeedbackRecord]) -> i64 {
    if records.is_empty() {
        return 0;
    }
    let total: i64 = records
        .iter()
        .map(|record| i64::from(record.teaching_score.unwrap_or(0)))
        .sum();
    (total as f64 / records.len() as f64).round() as i64
}

/// Weighted composite of the three sub-scores, rounded once more at the end.
pub fn composite(training_score: i64, feedback_score: i64, publication_score: i64) -> i64 {
    (training_score as f64 * TRAINING_WEIGHT
        + feedback_score as f64 * FEEDBACK_WEIGHT
        + publication_score as f64 * PUBLICATION_WEIGHT)
        .round() as i64
}

/// Inclusive lower bounds, checked top-down.
pub fn badge_for(composite_score: i64) -> Badge {
    if composite_score >= 80 {
        Badge::Excellent
    } else if composite_score >= 60 {
        Badge::Good
    } else {
        Badge::NeedsImprovement
    }
}

/// Assemble a scorecard from already-fetched records. Each sub-score is
/// rounded on its own before the composite is rounded again.
pub fn score_from_records(
    trainings_count: i64,
    feedback: &[FeedbackRecord],
    publications_count: i64,
) -> PerformanceScore {
    let training_score = normalize_count(trainings_count, TRAINING_TARGET);
    let avg_feedback = average_feedback(feedback);
    // Metric entries already sit on the 0-100 scale.
    let feedback_score = avg_feedback;
    let publication_score = normalize_count(publications_count, PUBLICATION_TARGET);
    let composite_score = composite(training_score, feedback_score, publication_score);

    PerformanceScore {
        training_score,
        feedback_score,
        publication_score,
        composite_score,
        badge: badge_for(composite_score),
        trainings_count,
        publications_count,
        avg_feedback,
        feedback_count: feedback.len() as i64,
    }
}

/// Score one faculty member over one window.
///
/// The three store reads are independent and issued concurrently. A blank
/// identifier yields an empty scorecard without touching the store.
pub async fn compute_score<S>(
    store: &S,
    faculty_id: &str,
    period: &ScoringPeriod,
) -> Result<PerformanceScore, EngineError>
where
    S: ActivityStore + ?Sized,
{
    if faculty_id.trim().is_empty() {
        return Ok(PerformanceScore::zeroed());
    }
    if period.end < period.start {
        return Err(EngineError::InvalidInput(format!(
            "period ends {} before it starts {}",
            period.end, period.start
        )));
    }

    let (enrollments, training_activities, feedback, publications) = tokio::try_join!(
        store.count_completed_enrollments(faculty_id, period.start, period.end),
        store.count_completed_activities(faculty_id, period.start, period.end, &TRAINING_TYPES),
        store.feedback_records(faculty_id, &period.years),
        store.count_completed_activities(faculty_id, period.start, period.end, &PUBLICATION_TYPES),
    )
    .map_err(EngineError::DataAccess)?;

    Ok(score_from_records(
        enrollments + training_activities,
        &feedback,
        publications,
    ))
}

/// Score every roster member with at most `max_in_flight` members in flight.
/// Completion order is not guaranteed; callers re-sort as needed.
pub async fn score_roster<S>(
    store: &S,
    roster: &[FacultyProfile],
    period: &ScoringPeriod,
    max_in_flight: usize,
) -> Result<Vec<(FacultyProfile, PerformanceScore)>, EngineError>
where
    S: ActivityStore + ?Sized,
{
    let results: Vec<Result<(FacultyProfile, PerformanceScore), EngineError>> =
        stream::iter(roster.iter().cloned())
            .map(|profile| async move {
                let score = compute_score(store, &profile.faculty_id, period).await?;
                Ok((profile, score))
            })
            .buffer_unordered(max_in_flight.max(1))
            .collect()
            .await;

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::store::memory::MemoryStore;

    fn entry(score: i32) -> FeedbackRecord {
        FeedbackRecord {
            teaching_score: Some(score),
        }
    }

    fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dom).unwrap()
    }

    fn period_2024_25() -> ScoringPeriod {
        ScoringPeriod::academic_year(2024).unwrap()
    }

    #[test]
    fn sub_scores_stay_within_bounds() {
        for count in [0, 1, 3, 7, 10, 15, 1_000] {
            let score = score_from_records(count, &[entry(100), entry(0)], count);
            assert!((0..=100).contains(&score.training_score));
            assert!((0..=100).contains(&score.feedback_score));
            assert!((0..=100).contains(&score.publication_score));
            assert!((0..=100).contains(&score.composite_score));
        }
    }

    #[test]
    fn composite_matches_weighted_sum_exactly() {
        for (t, f, p) in [(0, 0, 0), (50, 70, 40), (100, 90, 100), (33, 67, 41)] {
            let expected = (t as f64 * 0.3 + f as f64 * 0.4 + p as f64 * 0.3).round() as i64;
            assert_eq!(composite(t, f, p), expected);
        }
    }

    #[test]
    fn training_score_is_monotone_until_saturation() {
        let mut last = 0;
        for count in 0..=12 {
            let score = normalize_count(count, TRAINING_TARGET);
            assert!(score >= last);
            last = score;
        }
        assert_eq!(normalize_count(10, TRAINING_TARGET), 100);
        assert_eq!(normalize_count(15, TRAINING_TARGET), 100);
    }

    #[test]
    fn badge_boundaries_are_inclusive() {
        assert_eq!(badge_for(59), Badge::NeedsImprovement);
        assert_eq!(badge_for(60), Badge::Good);
        assert_eq!(badge_for(79), Badge::Good);
        assert_eq!(badge_for(80), Badge::Excellent);
    }

    #[test]
    fn zero_data_scores_zero_with_needs_improvement() {
        let score = score_from_records(0, &[], 0);
        assert_eq!(score, PerformanceScore::zeroed());
    }

    #[test]
    fn mid_range_example() {
        let score = score_from_records(5, &[entry(70)], 2);
        assert_eq!(score.training_score, 50);
        assert_eq!(score.feedback_score, 70);
        assert_eq!(score.publication_score, 40);
        assert_eq!(score.composite_score, 55);
        assert_eq!(score.badge, Badge::NeedsImprovement);
    }

    #[test]
    fn saturated_example() {
        let score = score_from_records(10, &[entry(90)], 5);
        assert_eq!(score.training_score, 100);
        assert_eq!(score.feedback_score, 90);
        assert_eq!(score.publication_score, 100);
        assert_eq!(score.composite_score, 96);
        assert_eq!(score.badge, Badge::Excellent);
    }

    #[test]
    fn null_teaching_scores_average_as_zero() {
        let records = [entry(80), FeedbackRecord { teaching_score: None }];
        assert_eq!(average_feedback(&records), 40);
    }

    #[test]
    fn feedback_average_rounds_half_away_from_zero() {
        assert_eq!(average_feedback(&[entry(60), entry(63)]), 62);
    }

    #[tokio::test]
    async fn combines_both_training_sources_within_the_window() {
        let store = MemoryStore {
            enrollments: vec![
                ("fac-1".into(), day(2024, 9, 1)),
                ("fac-1".into(), day(2023, 9, 1)), // previous year, excluded
            ],
            activities: vec![
                ("fac-1".into(), "workshop".into(), day(2024, 10, 5)),
                ("fac-1".into(), "seminar".into(), day(2025, 2, 11)),
                ("fac-1".into(), "publication".into(), day(2025, 3, 1)),
                ("fac-2".into(), "workshop".into(), day(2024, 10, 5)),
            ],
            feedback: vec![
                ("fac-1".into(), 2024, Some(80)),
                ("fac-1".into(), 2025, Some(60)),
                ("fac-1".into(), 2022, Some(10)), // outside both years
            ],
            fail: false,
        };

        let score = compute_score(&store, "fac-1", &period_2024_25()).await.unwrap();
        assert_eq!(score.trainings_count, 3);
        assert_eq!(score.training_score, 30);
        assert_eq!(score.publications_count, 1);
        assert_eq!(score.publication_score, 20);
        assert_eq!(score.avg_feedback, 70);
        assert_eq!(score.feedback_count, 2);
    }

    #[tokio::test]
    async fn blank_faculty_id_scores_zero_without_queries() {
        let store = MemoryStore {
            fail: true, // would error if any query were issued
            ..MemoryStore::default()
        };
        let score = compute_score(&store, "  ", &period_2024_25()).await.unwrap();
        assert_eq!(score, PerformanceScore::zeroed());
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_data_access() {
        let store = MemoryStore {
            fail: true,
            ..MemoryStore::default()
        };
        let err = compute_score(&store, "fac-1", &period_2024_25())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DataAccess(_)));
    }

    #[tokio::test]
    async fn inverted_period_fails_fast() {
        let store = MemoryStore::default();
        let period = ScoringPeriod {
            start: day(2025, 6, 30),
            end: day(2024, 7, 1),
            years: [2024, 2025],
            label: "backwards".into(),
        };
        let err = compute_score(&store, "fac-1", &period).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn recomputation_is_idempotent() {
        let store = MemoryStore {
            enrollments: vec![("fac-1".into(), day(2024, 9, 1))],
            activities: vec![("fac-1".into(), "research".into(), day(2025, 1, 9))],
            feedback: vec![("fac-1".into(), 2024, Some(75))],
            fail: false,
        };
        let period = period_2024_25();
        let first = compute_score(&store, "fac-1", &period).await.unwrap();
        let second = compute_score(&store, "fac-1", &period).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn roster_scoring_covers_every_member() {
        let store = MemoryStore {
            enrollments: vec![("fac-1".into(), day(2024, 9, 1))],
            feedback: vec![("fac-2".into(), 2024, Some(88))],
            ..MemoryStore::default()
        };
        let roster = vec![
            profile("fac-1", "Amara Okafor"),
            profile("fac-2", "Lin Wei"),
        ];
        let scored = score_roster(&store, &roster, &period_2024_25(), 2)
            .await
            .unwrap();
        assert_eq!(scored.len(), 2);
        let lin = scored
            .iter()
            .find(|(p, _)| p.faculty_id == "fac-2")
            .unwrap();
        assert_eq!(lin.1.avg_feedback, 88);
    }

    fn profile(id: &str, name: &str) -> FacultyProfile {
        FacultyProfile {
            faculty_id: id.to_string(),
            full_name: name.to_string(),
            email: format!("{id}@example.edu"),
            department: None,
            designation: None,
        }
    }
}
