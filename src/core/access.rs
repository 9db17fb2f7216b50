pub const DEFAULT_DENIED_GRADES: &[&str] = &["K2", "K3", "K4", "K5", "1", "2"];

/// Grades that may not use the self-service station at all.
#[derive(Debug, Clone)]
pub struct GradePolicy {
    denied: Vec<String>,
}

impl GradePolicy {
    pub fn new(denied: Vec<String>) -> Self {
        Self {
            denied: denied.into_iter().map(|g| g.trim().to_uppercase()).collect(),
        }
    }

    pub fn is_denied(&self, grade: &str) -> bool {
        let grade = grade.trim().to_uppercase();
        self.denied.iter().any(|g| *g == grade)
    }
}

impl Default for GradePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DENIED_GRADES.iter().map(|g| g.to_string()).collect())
    }
}
