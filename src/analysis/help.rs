//! The help-request queue shown to administrators.

use crate::models::{HelpRequest, HelpStatus};

/// Number of requests in one status tab.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTab {
    pub status: Option<HelpStatus>,
    pub label: &'static str,
    pub count: usize,
}

/// Keep requests in `status` (all of them when `None`) and order the
/// result urgent first. Requests of equal priority keep their API order;
/// unknown priorities go last.
pub fn help_queue(requests: Vec<HelpRequest>, status: Option<HelpStatus>) -> Vec<HelpRequest> {
    let mut queue: Vec<HelpRequest> = requests
        .into_iter()
        .filter(|request| status.map_or(true, |s| request.status() == Some(s)))
        .collect();
    queue.sort_by_key(|request| std::cmp::Reverse(request.priority().map_or(0, |p| p.rank())));
    queue
}

/// Counts for the "all", pending, in-progress and resolved tabs.
pub fn status_tabs(requests: &[HelpRequest]) -> Vec<StatusTab> {
    let count = |status: HelpStatus| {
        requests
            .iter()
            .filter(|request| request.status() == Some(status))
            .count()
    };

    let mut tabs = vec![StatusTab {
        status: None,
        label: "Todas",
        count: requests.len(),
    }];
    for (status, label) in [
        (HelpStatus::Pending, "Pendientes"),
        (HelpStatus::InProgress, "En Progreso"),
        (HelpStatus::Resolved, "Resueltas"),
    ] {
        tabs.push(StatusTab {
            status: Some(status),
            label,
            count: count(status),
        });
    }
    tabs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: i64, priority: &str, status: &str) -> HelpRequest {
        HelpRequest {
            id,
            user_id: Some(1),
            user_name: Some("Ana".to_string()),
            title: format!("Solicitud {}", id),
            description: String::new(),
            priority: priority.to_string(),
            status: status.to_string(),
            admin_response: None,
            assigned_admin_id: None,
            assigned_admin_name: None,
            responded_at: None,
            created_at: "2026-10-12T09:00:00Z".to_string(),
            updated_at: "2026-10-12T09:00:00Z".to_string(),
        }
    }

    fn ids(queue: &[HelpRequest]) -> Vec<i64> {
        queue.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_queue_sorted_by_priority() {
        let requests = vec![
            request(1, "low", "pending"),
            request(2, "normal", "pending"),
            request(3, "urgent", "resolved"),
            request(4, "normal", "in_progress"),
            request(5, "urgent", "pending"),
        ];
        let queue = help_queue(requests, None);
        assert_eq!(ids(&queue), vec![3, 5, 2, 4, 1]);
    }

    #[test]
    fn test_queue_unknown_priority_last() {
        let requests = vec![request(1, "whenever", "pending"), request(2, "low", "pending")];
        assert_eq!(ids(&help_queue(requests, None)), vec![2, 1]);
    }

    #[test]
    fn test_queue_filters_status() {
        let requests = vec![
            request(1, "low", "pending"),
            request(2, "urgent", "resolved"),
            request(3, "urgent", "pending"),
        ];
        let queue = help_queue(requests, Some(HelpStatus::Pending));
        assert_eq!(ids(&queue), vec![3, 1]);
    }

    #[test]
    fn test_status_tabs() {
        let requests = vec![
            request(1, "low", "pending"),
            request(2, "urgent", "resolved"),
            request(3, "urgent", "pending"),
            request(4, "normal", "closed"),
        ];
        let tabs = status_tabs(&requests);
        let counts: Vec<(&str, usize)> = tabs.iter().map(|t| (t.label, t.count)).collect();
        assert_eq!(
            counts,
            vec![("Todas", 4), ("Pendientes", 2), ("En Progreso", 0), ("Resueltas", 1)]
        );
    }
}
