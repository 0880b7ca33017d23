use crate::models::{DepartmentAverages, FacultyProfile, PeerComparison, PerformanceScore};
use crate::period::ScoringPeriod;
use crate::score::{self, EngineError};
use crate::store::ActivityStore;

/// Standing label for a composite difference against the peer average.
pub fn standing_label(difference: i64) -> &'static str {
    if difference >= 15 {
        "Top 10%"
    } else if difference >= 10 {
        "Top 25%"
    } else if difference >= 5 {
        "Top 40%"
    } else if difference >= 0 {
        "Top 50%"
    } else if difference >= -5 {
        "Top 60%"
    } else if difference >= -10 {
        "Top 75%"
    } else {
        "Below Average"
    }
}

/// Rounded mean of each sub-score and the composite. `None` when there is
/// nobody to average over.
pub fn department_averages(scores: &[PerformanceScore]) -> Option<DepartmentAverages> {
    if scores.is_empty() {
        return None;
    }
    let count = scores.len() as f64;
    let mean = |pick: fn(&PerformanceScore) -> i64| -> i64 {
        (scores.iter().map(pick).sum::<i64>() as f64 / count).round() as i64
    };
    Some(DepartmentAverages {
        faculty_count: scores.len(),
        avg_training: mean(|s| s.training_score),
        avg_feedback: mean(|s| s.feedback_score),
        avg_publication: mean(|s| s.publication_score),
        avg_composite: mean(|s| s.composite_score),
    })
}

/// Compare one faculty member against department peers (the whole roster
/// when they have no department). Peer scores come from the same engine as
/// the scorecard itself.
pub async fn compare_to_peers<S>(
    store: &S,
    roster: &[FacultyProfile],
    faculty_id: &str,
    period: &ScoringPeriod,
    max_in_flight: usize,
) -> Result<PeerComparison, EngineError>
where
    S: ActivityStore + ?Sized,
{
    let Some(target) = roster.iter().find(|p| p.faculty_id == faculty_id) else {
        return Err(EngineError::InvalidInput(format!(
            "faculty {faculty_id} is not on the roster"
        )));
    };

    let peers: Vec<FacultyProfile> = match &target.department {
        Some(department) => roster
            .iter()
            .filter(|p| p.department.as_deref() == Some(department))
            .cloned()
            .collect(),
        None => roster.to_vec(),
    };

    let scored = score::score_roster(store, &peers, period, max_in_flight).await?;
    let scores: Vec<PerformanceScore> = scored.iter().map(|(_, s)| s.clone()).collect();

    // The target always belongs to its own peer group.
    let Some(averages) = department_averages(&scores) else {
        return Err(EngineError::InvalidInput(format!(
            "no peers found for faculty {faculty_id}"
        )));
    };
    let Some((_, score)) = scored.iter().find(|(p, _)| p.faculty_id == faculty_id) else {
        return Err(EngineError::InvalidInput(format!(
            "faculty {faculty_id} was not scored"
        )));
    };

    let composite_difference = score.composite_score - averages.avg_composite;
    Ok(PeerComparison {
        faculty_id: target.faculty_id.clone(),
        full_name: target.full_name.clone(),
        department: target
            .department
            .clone()
            .unwrap_or_else(|| "All Faculty".to_string()),
        score: score.clone(),
        averages,
        composite_difference,
        standing: standing_label(composite_difference).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::Badge;
    use crate::store::memory::MemoryStore;

    #[test]
    fn standing_tiers_match_the_difference() {
        assert_eq!(standing_label(15), "Top 10%");
        assert_eq!(standing_label(10), "Top 25%");
        assert_eq!(standing_label(5), "Top 40%");
        assert_eq!(standing_label(0), "Top 50%");
        assert_eq!(standing_label(-5), "Top 60%");
        assert_eq!(standing_label(-10), "Top 75%");
        assert_eq!(standing_label(-11), "Below Average");
    }

    #[test]
    fn averages_round_the_mean() {
        let mut a = PerformanceScore::zeroed();
        a.composite_score = 71;
        let mut b = PerformanceScore::zeroed();
        b.composite_score = 72;
        let averages = department_averages(&[a, b]).unwrap();
        // 71.5 rounds away from zero.
        assert_eq!(averages.avg_composite, 72);
        assert_eq!(averages.faculty_count, 2);

        assert!(department_averages(&[]).is_none());
    }

    fn profile(id: &str, name: &str, department: Option<&str>) -> FacultyProfile {
        FacultyProfile {
            faculty_id: id.to_string(),
            full_name: name.to_string(),
            email: format!("{id}@example.edu"),
            department: department.map(str::to_string),
            designation: None,
        }
    }

    fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dom).unwrap()
    }

    #[tokio::test]
    async fn compares_only_against_the_same_department() {
        let store = MemoryStore {
            feedback: vec![
                ("fac-1".into(), 2024, Some(90)),
                ("fac-2".into(), 2024, Some(50)),
                // Different department, would drag the average down.
                ("fac-3".into(), 2024, Some(0)),
            ],
            ..MemoryStore::default()
        };
        let roster = vec![
            profile("fac-1", "Amara Okafor", Some("Physics")),
            profile("fac-2", "Lin Wei", Some("Physics")),
            profile("fac-3", "Noor Haddad", Some("History")),
        ];
        let period = ScoringPeriod::academic_year(2024).unwrap();

        let comparison = compare_to_peers(&store, &roster, "fac-1", &period, 2)
            .await
            .unwrap();
        assert_eq!(comparison.department, "Physics");
        assert_eq!(comparison.averages.faculty_count, 2);
        // Feedback 90 vs 50: composites 36 and 20, average 28.
        assert_eq!(comparison.score.composite_score, 36);
        assert_eq!(comparison.averages.avg_composite, 28);
        assert_eq!(comparison.composite_difference, 8);
        assert_eq!(comparison.standing, "Top 40%");
        assert_eq!(comparison.score.badge, Badge::NeedsImprovement);
    }

    #[tokio::test]
    async fn no_department_compares_against_everyone() {
        let store = MemoryStore {
            enrollments: vec![("fac-2".into(), day(2024, 9, 3))],
            ..MemoryStore::default()
        };
        let roster = vec![
            profile("fac-1", "Amara Okafor", None),
            profile("fac-2", "Lin Wei", Some("Physics")),
        ];
        let period = ScoringPeriod::academic_year(2024).unwrap();

        let comparison = compare_to_peers(&store, &roster, "fac-1", &period, 2)
            .await
            .unwrap();
        assert_eq!(comparison.department, "All Faculty");
        assert_eq!(comparison.averages.faculty_count, 2);
    }

    #[tokio::test]
    async fn unknown_faculty_is_invalid_input() {
        let store = MemoryStore::default();
        let roster = vec![profile("fac-1", "Amara Okafor", None)];
        let period = ScoringPeriod::academic_year(2024).unwrap();

        let err = compare_to_peers(&store, &roster, "fac-9", &period, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
