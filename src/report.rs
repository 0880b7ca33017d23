use std::fmt::Write;

use crate::compare;
use crate::models::{ActionItem, FacultyProfile, PerformanceScore};
use crate::period::ScoringPeriod;

pub fn build_report(
    period: &ScoringPeriod,
    scored: &[(FacultyProfile, PerformanceScore)],
    items: &[ActionItem],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Faculty Performance Report");
    let _ = writeln!(
        output,
        "Scoring window {} ({} to {})",
        period.label, period.start, period.end
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Scorecards");

    if scored.is_empty() {
        let _ = writeln!(output, "No faculty profiles on the roster.");
    } else {
        let mut ranked = scored.to_vec();
        ranked.sort_by(|a, b| {
            b.1.composite_score
                .cmp(&a.1.composite_score)
                .then_with(|| a.0.full_name.cmp(&b.0.full_name))
        });
        for (profile, score) in ranked.iter() {
            let _ = writeln!(
                output,
                "- {} ({}): composite {}/100, {} ({} trainings, avg feedback {}, {} publications)",
                profile.full_name,
                profile.department.as_deref().unwrap_or("no department"),
                score.composite_score,
                score.badge,
                score.trainings_count,
                score.avg_feedback,
                score.publications_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Roster Averages");

    let scores: Vec<PerformanceScore> = scored.iter().map(|(_, s)| s.clone()).collect();
    match compare::department_averages(&scores) {
        Some(averages) => {
            let _ = writeln!(
                output,
                "Across {} faculty: training {}, feedback {}, publications {}, composite {}.",
                averages.faculty_count,
                averages.avg_training,
                averages.avg_feedback,
                averages.avg_publication,
                averages.avg_composite
            );
        }
        None => {
            let _ = writeln!(output, "Nothing to average.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Action Items");

    if items.is_empty() {
        let _ = writeln!(output, "No action items; the whole roster is on track.");
    } else {
        for action in items.iter() {
            let _ = writeln!(
                output,
                "- [{}] {}: {} ({})",
                action.priority,
                action.name,
                action.kind.label(),
                action.detail
            );
        }
    }

    output
}
