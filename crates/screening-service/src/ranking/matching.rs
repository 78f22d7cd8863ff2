//! Case-insensitive, substring-tolerant skill comparison.

use serde::{Deserialize, Serialize};

/// Returns whether two skill names refer to the same skill.
///
/// Comparison ignores case and surrounding whitespace, and accepts either
/// name containing the other ("node" matches "Node.js"). Blank names
/// never match.
pub fn skill_matches(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Posting skills a candidate covers and lacks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillMatch {
    /// Covered required skills, then covered nice-to-have skills, in
    /// posting order and spelling, without duplicates.
    pub matched: Vec<String>,
    /// Required skills the candidate lacks, in posting order.
    pub missing: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, skill: &str) {
    let lower = skill.trim().to_lowercase();
    if !list.iter().any(|s| s.trim().to_lowercase() == lower) {
        list.push(skill.to_string());
    }
}

/// Compare a candidate's skills with a posting's skill lists.
pub fn match_skills(candidate: &[String], required: &[String], nice_to_have: &[String]) -> SkillMatch {
    let covered = |skill: &String| candidate.iter().any(|c| skill_matches(c, skill));

    let mut result = SkillMatch::default();
    for skill in required.iter().filter(|s| !s.trim().is_empty()) {
        if covered(skill) {
            push_unique(&mut result.matched, skill);
        } else {
            push_unique(&mut result.missing, skill);
        }
    }
    for skill in nice_to_have.iter().filter(|s| !s.trim().is_empty()) {
        if covered(skill) {
            push_unique(&mut result.matched, skill);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_case_and_substring_tolerant() {
        assert!(skill_matches("node.js", "Node.js"));
        assert!(skill_matches("Node", "node.js"));
        assert!(skill_matches(" React ", "react"));
        assert!(!skill_matches("Go", ""));
        assert!(!skill_matches("Python", "Rust"));
    }

    #[test]
    fn test_match_skills_orders_by_posting() {
        let result = match_skills(
            &strings(&["typescript", "JAVASCRIPT", "docker"]),
            &strings(&["JavaScript", "TypeScript", "React"]),
            &strings(&["Docker", "Kubernetes"]),
        );
        assert_eq!(result.matched, strings(&["JavaScript", "TypeScript", "Docker"]));
        assert_eq!(result.missing, strings(&["React"]));
    }

    #[test]
    fn test_duplicate_posting_skills_collapse() {
        let result = match_skills(
            &strings(&["rust"]),
            &strings(&["Rust", "rust", "SQL", "sql"]),
            &strings(&["RUST"]),
        );
        assert_eq!(result.matched, strings(&["Rust"]));
        assert_eq!(result.missing, strings(&["SQL"]));
    }

    #[test]
    fn test_no_requirements() {
        let result = match_skills(&strings(&["rust"]), &[], &[]);
        assert!(result.matched.is_empty());
        assert!(result.missing.is_empty());
    }
}
