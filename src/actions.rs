use crate::models::{ActionItem, ActionKind, FacultyProfile, PerformanceScore, Priority};
use crate::period::ScoringPeriod;
use crate::score::{self, EngineError};
use crate::store::ActivityStore;

pub const LOW_SCORE_CUTOFF: i64 = 60;
pub const HIGH_PRIORITY_SCORE_CUTOFF: i64 = 40;
pub const LOW_FEEDBACK_CUTOFF: i64 = 30;
pub const HIGH_PRIORITY_FEEDBACK_CUTOFF: i64 = 20;

/// Rules applied to one scorecard. The missing-certificate flag is raised
/// regardless of the composite; the low-feedback flag only when at least one
/// feedback entry exists.
pub fn actions_for(profile: &FacultyProfile, score: &PerformanceScore) -> Vec<ActionItem> {
    let mut items = Vec::new();

    if score.composite_score < LOW_SCORE_CUTOFF {
        items.push(item(
            profile,
            ActionKind::LowScore,
            if score.composite_score < HIGH_PRIORITY_SCORE_CUTOFF {
                Priority::High
            } else {
                Priority::Medium
            },
            format!("Composite score: {}/100", score.composite_score),
        ));
    }

    if score.trainings_count == 0 {
        items.push(item(
            profile,
            ActionKind::MissingCertificate,
            Priority::Medium,
            "No completed trainings or certifications".to_string(),
        ));
    }

    if score.feedback_count > 0 && score.avg_feedback < LOW_FEEDBACK_CUTOFF {
        items.push(item(
            profile,
            ActionKind::LowFeedback,
            if score.avg_feedback < HIGH_PRIORITY_FEEDBACK_CUTOFF {
                Priority::High
            } else {
                Priority::Medium
            },
            format!("Avg feedback: {}/100", score.avg_feedback),
        ));
    }

    items
}

/// Apply the rules across scored roster members, High priority first.
pub fn collect_actions(scored: &[(FacultyProfile, PerformanceScore)]) -> Vec<ActionItem> {
    let mut items: Vec<ActionItem> = scored
        .iter()
        .flat_map(|(profile, score)| actions_for(profile, score))
        .collect();
    items.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
    items
}

/// Score the whole roster and flag follow-ups.
pub async fn scan_roster<S>(
    store: &S,
    roster: &[FacultyProfile],
    period: &ScoringPeriod,
    max_in_flight: usize,
) -> Result<Vec<ActionItem>, EngineError>
where
    S: ActivityStore + ?Sized,
{
    let scored = score::score_roster(store, roster, period, max_in_flight).await?;
    Ok(collect_actions(&scored))
}

fn item(
    profile: &FacultyProfile,
    kind: ActionKind,
    priority: Priority,
    detail: String,
) -> ActionItem {
    ActionItem {
        faculty_id: profile.faculty_id.clone(),
        name: profile.full_name.clone(),
        department: profile.department.clone(),
        kind,
        priority,
        detail,
    }
}
