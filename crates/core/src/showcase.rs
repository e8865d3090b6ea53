//! Technology filter for the public project showcase.

use crate::project::Project;

/// Distinct tags across `projects`, in first-seen order.
pub fn distinct_tags(projects: &[Project]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for tag in projects.iter().flat_map(|p| p.tags.iter()) {
        if !seen.iter().any(|s| s == tag) {
            seen.push(tag.clone());
        }
    }
    seen
}

/// Projects carrying `tech` as an exact tag. `None` keeps everything.
pub fn filter_by_tech<'a>(projects: &'a [Project], tech: Option<&str>) -> Vec<&'a Project> {
    match tech {
        None => projects.iter().collect(),
        Some(tech) => projects
            .iter()
            .filter(|p| p.tags.iter().any(|t| t == tech))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project(id: &str, tags: &[&str]) -> Project {
        Project {
            id: id.to_string(),
            title: format!("Project {id}"),
            description: "Something worth showing".to_string(),
            image_url: "https://example.com/a.png".to_string(),
            link: "https://example.com".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            user_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn distinct_tags_keeps_first_seen_order() {
        let projects = vec![
            project("1", &["Rust", "axum"]),
            project("2", &["Python", "Rust"]),
        ];
        assert_eq!(distinct_tags(&projects), vec!["Rust", "axum", "Python"]);
    }

    #[test]
    fn no_filter_returns_everything() {
        let projects = vec![project("1", &["Rust"]), project("2", &[])];
        assert_eq!(filter_by_tech(&projects, None).len(), 2);
    }

    #[test]
    fn filter_matches_exact_tag() {
        let projects = vec![
            project("1", &["Rust"]),
            project("2", &["Python"]),
            project("3", &["rust"]),
        ];
        let ids: Vec<&str> = filter_by_tech(&projects, Some("Rust"))
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn unknown_tech_yields_nothing() {
        let projects = vec![project("1", &["Rust"])];
        assert!(filter_by_tech(&projects, Some("Go")).is_empty());
    }
}
