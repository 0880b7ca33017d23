use serde::{Deserialize, Serialize};

/// One roster entry, as stored by the surrounding portal.
#[derive(Debug, Clone)]
pub struct FacultyProfile {
    pub faculty_id: String,
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,
    pub designation: Option<String>,
}

/// A periodic metric entry. A missing teaching score counts as 0 when
/// averaging; it is never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub teaching_score: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Badge {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Badge::Excellent => "Excellent",
            Badge::Good => "Good",
            Badge::NeedsImprovement => "Needs Improvement",
        };
        write!(f, "{label}")
    }
}

/// The scorecard for one faculty member over one scoring window.
///
/// Recomputed on every request and never persisted. All four scores sit in
/// 0-100; the raw counts and average are carried for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceScore {
    pub training_score: i64,
    pub feedback_score: i64,
    pub publication_score: i64,
    pub composite_score: i64,
    pub badge: Badge,
    pub trainings_count: i64,
    pub publications_count: i64,
    pub avg_feedback: i64,
    pub feedback_count: i64,
}

impl PerformanceScore {
    pub fn zeroed() -> Self {
        Self {
            training_score: 0,
            feedback_score: 0,
            publication_score: 0,
            composite_score: 0,
            badge: Badge::NeedsImprovement,
            trainings_count: 0,
            publications_count: 0,
            avg_feedback: 0,
            feedback_count: 0,
        }
    }
}

/// High sorts before Medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Priority {
    High,
    Medium,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    LowScore,
    MissingCertificate,
    LowFeedback,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::LowScore => "Low Performance Score",
            ActionKind::MissingCertificate => "Missing Certificates",
            ActionKind::LowFeedback => "Low Feedback Rating",
        }
    }
}

/// One follow-up flag raised by the roster scan.
#[derive(Debug, Clone, Serialize)]
pub struct ActionItem {
    pub faculty_id: String,
    pub name: String,
    pub department: Option<String>,
    pub kind: ActionKind,
    pub priority: Priority,
    pub detail: String,
}

/// Rounded mean sub-scores across a peer group.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentAverages {
    pub faculty_count: usize,
    pub avg_training: i64,
    pub avg_feedback: i64,
    pub avg_publication: i64,
    pub avg_composite: i64,
}

/// One faculty member against their department peers.
#[derive(Debug, Clone, Serialize)]
pub struct PeerComparison {
    pub faculty_id: String,
    pub full_name: String,
    pub department: String,
    pub score: PerformanceScore,
    pub averages: DepartmentAverages,
    pub composite_difference: i64,
    pub standing: String,
}
