//! Dashboard statistics aggregation.
//!
//! Turns a flat list of reports into the dashboard views in a single pass.
//! Time series are pre-seeded so charts always receive a dense window, and
//! reports outside that window are left out of the series.

use crate::analysis::buckets::{
    elapsed_days, month_slot, parse_timestamp, round_half_up, trailing_months, week_label,
    week_slot, MonthKey, Tally, MONTH_BUCKETS, TREND_BUCKETS, WEEK_BUCKETS,
};
use crate::models::{
    category_label, status_label, AcceptancePoint, AdminWorkload, DashboardStats, MonthCount,
    Report, ResponseTime, Status, StatusCount, TypeCount, WeekCount,
};
use chrono::{DateTime, TimeZone};
use std::fmt;
use tracing::debug;

/// Who a report is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum AdminKey {
    Assigned(i64),
    Unassigned,
}

impl fmt::Display for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminKey::Assigned(id) => write!(f, "Admin {}", id),
            AdminKey::Unassigned => write!(f, "Sin asignar"),
        }
    }
}

#[derive(Debug, Default)]
struct Workload {
    count: usize,
    resolved: usize,
    pending: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct Outcomes {
    accepted: usize,
    rejected: usize,
    total: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct Elapsed {
    total_days: i64,
    count: usize,
}

/// Compute every dashboard view for `reports` as seen at `now`.
///
/// Calendar months are taken in the time zone of `now`.
pub fn compute_dashboard_stats<Tz: TimeZone>(reports: &[Report], now: &DateTime<Tz>) -> DashboardStats {
    let tz = now.timezone();
    let current_month = MonthKey::of(now);

    let mut by_type: Tally<i64, usize> = Tally::new();
    let mut by_status: Tally<i64, usize> = Tally::new();
    let mut by_admin: Tally<AdminKey, Workload> = Tally::new();
    let mut by_week = [0usize; WEEK_BUCKETS];
    let mut by_month = [0usize; MONTH_BUCKETS];
    let mut trend = [Outcomes::default(); TREND_BUCKETS];
    // Accepted first, then rejected.
    let mut response = [Elapsed::default(); 2];
    let mut unparsed = 0usize;

    for report in reports {
        *by_type.entry(report.category_id) += 1;
        *by_status.entry(report.status_id) += 1;

        let status = report.status();
        let resolved = status.is_some_and(Status::is_resolved);

        let admin = match report.assigned_admin() {
            Some(id) => AdminKey::Assigned(id),
            None => AdminKey::Unassigned,
        };
        let workload = by_admin.entry(admin);
        workload.count += 1;
        if resolved {
            workload.resolved += 1;
        } else {
            workload.pending += 1;
        }

        let Some(created) = parse_timestamp(&report.created_at, &tz) else {
            unparsed += 1;
            continue;
        };

        if let Some(slot) = week_slot(now, &created) {
            by_week[slot] += 1;
        }

        let created_month = MonthKey::of(&created);
        if let Some(slot) = month_slot(current_month, created_month, MONTH_BUCKETS) {
            by_month[slot] += 1;
        }

        if let Some(slot) = month_slot(current_month, created_month, TREND_BUCKETS) {
            let outcomes = &mut trend[slot];
            outcomes.total += 1;
            match status {
                Some(Status::Accepted) => outcomes.accepted += 1,
                Some(Status::Rejected) => outcomes.rejected += 1,
                _ => {}
            }
        }

        let slot = match status {
            Some(Status::Accepted) => 0,
            Some(Status::Rejected) => 1,
            _ => continue,
        };
        if let Some(updated) = parse_timestamp(&report.updated_at, &tz) {
            response[slot].total_days += elapsed_days(&created, &updated);
            response[slot].count += 1;
        }
    }

    if unparsed > 0 {
        debug!("{} reports had no parseable created_at", unparsed);
    }

    let reports_by_type = by_type
        .into_entries()
        .into_iter()
        .map(|(id, count)| TypeCount {
            category: category_label(id).into_owned(),
            count,
        })
        .collect();

    let reports_by_status = by_status
        .into_entries()
        .into_iter()
        .map(|(id, count)| StatusCount {
            status: status_label(id).into_owned(),
            count,
        })
        .collect();

    let reports_by_week = by_week
        .iter()
        .enumerate()
        .map(|(slot, &count)| WeekCount {
            week: week_label(slot),
            count,
        })
        .collect();

    let reports_by_month = trailing_months(current_month, MONTH_BUCKETS)
        .into_iter()
        .zip(by_month)
        .map(|(month, count)| MonthCount {
            month: month.label(),
            count,
        })
        .collect();

    let response_time = [Status::Accepted, Status::Rejected]
        .into_iter()
        .zip(response)
        .filter(|(_, elapsed)| elapsed.count > 0)
        .map(|(status, elapsed)| ResponseTime {
            status: status.to_string(),
            avg_days: round_half_up(elapsed.total_days as f64 / elapsed.count as f64),
            count: elapsed.count,
        })
        .collect();

    let mut reports_by_admin: Vec<AdminWorkload> = by_admin
        .into_entries()
        .into_iter()
        .filter(|(_, workload)| workload.count > 0)
        .map(|(admin, workload)| AdminWorkload {
            admin_name: admin.to_string(),
            count: workload.count,
            resolved: workload.resolved,
            pending: workload.pending,
        })
        .collect();
    reports_by_admin.sort_by_key(|entry| std::cmp::Reverse(entry.count));

    let acceptance_trend = trailing_months(current_month, TREND_BUCKETS)
        .into_iter()
        .zip(trend)
        .map(|(month, outcomes)| AcceptancePoint {
            period: month.label(),
            accepted: outcomes.accepted,
            rejected: outcomes.rejected,
            acceptance_rate: percentage(outcomes.accepted, outcomes.total),
            rejection_rate: percentage(outcomes.rejected, outcomes.total),
        })
        .collect();

    DashboardStats {
        reports_by_type,
        reports_by_status,
        reports_by_week,
        reports_by_month,
        response_time,
        reports_by_admin,
        acceptance_trend,
        total_reports: reports.len(),
    }
}

fn percentage(part: usize, total: usize) -> i64 {
    if total == 0 {
        0
    } else {
        round_half_up(part as f64 / total as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(6 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 18, 12, 0, 0)
            .unwrap()
    }

    fn create_test_report(
        id: i64,
        category_id: i64,
        status_id: i64,
        admin: Option<i64>,
        created: DateTime<FixedOffset>,
        updated: DateTime<FixedOffset>,
    ) -> Report {
        Report {
            id,
            user_id: Some(1),
            category_id,
            status_id,
            title: format!("Reporte {}", id),
            description: String::new(),
            incident_date: None,
            location: None,
            evidence_url: None,
            assigned_admin_id: admin,
            is_anonymous: false,
            created_at: created.to_rfc3339(),
            updated_at: updated.to_rfc3339(),
        }
    }

    fn sample_reports() -> Vec<Report> {
        let now = now();
        vec![
            create_test_report(1, 3, 1, None, now - Duration::days(1), now - Duration::days(1)),
            create_test_report(2, 1, 2, Some(2), now - Duration::days(10), now - Duration::days(6)),
            create_test_report(3, 3, 3, Some(1), now - Duration::days(40), now - Duration::days(38)),
            create_test_report(4, 12, 2, Some(2), now - Duration::days(200), now - Duration::days(190)),
            create_test_report(5, 1, 1, Some(2), now - Duration::days(400), now - Duration::days(400)),
            create_test_report(6, 5, 3, None, now - Duration::days(3), now),
        ]
    }

    #[test]
    fn test_single_pending_report() {
        let now = now();
        let reports = vec![create_test_report(1, 1, 1, None, now, now)];

        let stats = compute_dashboard_stats(&reports, &now);

        assert_eq!(stats.total_reports, 1);
        assert_eq!(
            stats.reports_by_type,
            vec![TypeCount {
                category: "Sitio Web Bancario Falso".to_string(),
                count: 1
            }]
        );
        assert_eq!(
            stats.reports_by_status,
            vec![StatusCount {
                status: "Pendiente".to_string(),
                count: 1
            }]
        );
        assert!(stats.response_time.is_empty());
        assert_eq!(
            stats.reports_by_admin,
            vec![AdminWorkload {
                admin_name: "Sin asignar".to_string(),
                count: 1,
                resolved: 0,
                pending: 1
            }]
        );
        assert_eq!(stats.reports_by_week[7].week, "Sem 8");
        assert_eq!(stats.reports_by_week[7].count, 1);
        assert!(stats.reports_by_week[..7].iter().all(|w| w.count == 0));
    }

    #[test]
    fn test_accepted_report_response_time_and_trend() {
        let now = now();
        let created = now - Duration::days(5);
        let updated = created + Duration::days(3);
        let reports = vec![create_test_report(1, 2, 2, Some(2), created, updated)];

        let stats = compute_dashboard_stats(&reports, &now);

        assert_eq!(
            stats.response_time,
            vec![ResponseTime {
                status: "Aceptado".to_string(),
                avg_days: 3,
                count: 1
            }]
        );
        let current = stats.acceptance_trend.last().unwrap();
        assert_eq!(current.period, "oct 26");
        assert_eq!(current.accepted, 1);
        assert_eq!(current.rejected, 0);
        assert_eq!(current.acceptance_rate, 100);
        assert_eq!(current.rejection_rate, 0);
        assert_eq!(stats.reports_by_admin[0].admin_name, "Admin 2");
        assert_eq!(stats.reports_by_admin[0].resolved, 1);
    }

    #[test]
    fn test_empty_input_keeps_fixed_series() {
        let stats = compute_dashboard_stats(&[], &now());

        assert_eq!(stats.total_reports, 0);
        assert!(stats.reports_by_type.is_empty());
        assert!(stats.reports_by_status.is_empty());
        assert!(stats.response_time.is_empty());
        assert!(stats.reports_by_admin.is_empty());
        assert_eq!(stats.reports_by_week.len(), 8);
        assert_eq!(stats.reports_by_month.len(), 12);
        assert_eq!(stats.acceptance_trend.len(), 6);
        assert!(stats.reports_by_week.iter().all(|w| w.count == 0));
        assert!(stats.reports_by_month.iter().all(|m| m.count == 0));
        assert!(stats
            .acceptance_trend
            .iter()
            .all(|p| p.acceptance_rate == 0 && p.rejection_rate == 0));
    }

    #[test]
    fn test_totals_are_consistent() {
        let reports = sample_reports();
        let stats = compute_dashboard_stats(&reports, &now());

        assert_eq!(stats.total_reports, reports.len());
        let by_type: usize = stats.reports_by_type.iter().map(|t| t.count).sum();
        let by_status: usize = stats.reports_by_status.iter().map(|s| s.count).sum();
        let by_admin: usize = stats.reports_by_admin.iter().map(|a| a.count).sum();
        assert_eq!(by_type, reports.len());
        assert_eq!(by_status, reports.len());
        assert_eq!(by_admin, reports.len());
        for admin in &stats.reports_by_admin {
            assert_eq!(admin.resolved + admin.pending, admin.count);
        }
    }

    #[test]
    fn test_type_and_status_keep_first_seen_order() {
        let stats = compute_dashboard_stats(&sample_reports(), &now());

        let categories: Vec<_> = stats.reports_by_type.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(
            categories,
            [
                "Phishing por Email",
                "Sitio Web Bancario Falso",
                "Categoría 12",
                "SMS Fraudulento"
            ]
        );
        let statuses: Vec<_> = stats.reports_by_status.iter().map(|s| s.status.as_str()).collect();
        assert_eq!(statuses, ["Pendiente", "Aceptado", "Rechazado"]);
    }

    #[test]
    fn test_admins_sorted_by_count() {
        let stats = compute_dashboard_stats(&sample_reports(), &now());

        let admins: Vec<_> = stats
            .reports_by_admin
            .iter()
            .map(|a| (a.admin_name.as_str(), a.count, a.resolved, a.pending))
            .collect();
        assert_eq!(
            admins,
            [
                ("Admin 2", 3, 2, 1),
                ("Sin asignar", 2, 1, 1),
                ("Admin 1", 1, 1, 0)
            ]
        );
    }

    #[test]
    fn test_admin_ties_keep_first_seen_order() {
        let now = now();
        let day = |n| now - Duration::days(n);
        let reports = vec![
            create_test_report(1, 1, 2, Some(5), day(2), day(1)),
            create_test_report(2, 1, 1, Some(1), day(2), day(2)),
            create_test_report(3, 1, 1, Some(3), day(2), day(2)),
            create_test_report(4, 1, 1, None, day(2), day(2)),
            create_test_report(5, 1, 3, Some(3), day(2), day(1)),
            create_test_report(6, 1, 1, Some(5), day(2), day(2)),
        ];

        let stats = compute_dashboard_stats(&reports, &now);

        let names: Vec<(&str, usize)> = stats
            .reports_by_admin
            .iter()
            .map(|a| (a.admin_name.as_str(), a.count))
            .collect();
        assert_eq!(
            names,
            vec![("Admin 5", 2), ("Admin 3", 2), ("Admin 1", 1), ("Sin asignar", 1)]
        );
    }

    #[test]
    fn test_unknown_status_counts_as_pending() {
        let now = now();
        let created = now - Duration::days(2);
        let reports = vec![
            create_test_report(1, 1, 4, Some(2), created, now),
            create_test_report(2, 1, 2, Some(2), created, now),
        ];

        let stats = compute_dashboard_stats(&reports, &now);

        assert_eq!(
            stats.reports_by_status,
            vec![
                StatusCount {
                    status: "Estado 4".to_string(),
                    count: 1
                },
                StatusCount {
                    status: "Aceptado".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(
            stats.reports_by_admin,
            vec![AdminWorkload {
                admin_name: "Admin 2".to_string(),
                count: 2,
                resolved: 1,
                pending: 1
            }]
        );
        // Only the accepted report has a response time.
        assert_eq!(stats.response_time.len(), 1);
        assert_eq!(stats.response_time[0].count, 1);

        let current = stats.acceptance_trend.last().unwrap();
        assert_eq!((current.accepted, current.rejected), (1, 0));
        assert_eq!(current.acceptance_rate, 50);
        assert_eq!(current.rejection_rate, 0);
        assert!(stats.acceptance_trend[..TREND_BUCKETS - 1]
            .iter()
            .all(|p| p.accepted == 0 && p.rejected == 0 && p.acceptance_rate == 0));
    }

    #[test]
    fn test_null_updated_at_only_skips_response_time() {
        let json = r#"[
            {"id": 1, "category_id": 1, "status_id": 2, "assigned_admin_id": 1,
             "created_at": "2026-10-10T12:00:00-06:00", "updated_at": "2026-10-14T12:00:00-06:00"},
            {"id": 2, "category_id": 1, "status_id": 2, "assigned_admin_id": 1,
             "created_at": "2026-10-11T12:00:00-06:00", "updated_at": null}
        ]"#;
        let reports: Vec<Report> = serde_json::from_str(json).unwrap();
        let now = now();

        let stats = compute_dashboard_stats(&reports, &now);

        assert_eq!(stats.total_reports, 2);
        assert_eq!(
            stats.response_time,
            vec![ResponseTime {
                status: "Aceptado".to_string(),
                avg_days: 4,
                count: 1
            }]
        );
        assert_eq!(stats.reports_by_month.last().unwrap().count, 2);
        assert_eq!(stats.acceptance_trend.last().unwrap().accepted, 2);
        assert_eq!(stats.reports_by_admin[0].resolved, 2);
    }

    #[test]
    fn test_out_of_window_reports_are_dropped_from_series() {
        let stats = compute_dashboard_stats(&sample_reports(), &now());

        let weekly: Vec<_> = stats.reports_by_week.iter().map(|w| w.count).collect();
        assert_eq!(weekly, [0, 0, 1, 0, 0, 0, 1, 2]);

        let monthly: usize = stats.reports_by_month.iter().map(|m| m.count).sum();
        assert_eq!(monthly, 5);
        assert_eq!(stats.reports_by_month[0].month, "nov 25");
        assert_eq!(stats.reports_by_month[11].month, "oct 26");
        assert_eq!(stats.reports_by_month[11].count, 3);

        let trend_total: usize = stats
            .acceptance_trend
            .iter()
            .map(|p| p.accepted + p.rejected)
            .sum();
        assert_eq!(trend_total, 3);
        assert_eq!(stats.acceptance_trend[0].period, "may 26");
    }

    #[test]
    fn test_trend_rates_include_pending_in_total() {
        let stats = compute_dashboard_stats(&sample_reports(), &now());

        // October: one pending, one accepted, one rejected.
        let october = &stats.acceptance_trend[5];
        assert_eq!((october.accepted, october.rejected), (1, 1));
        assert_eq!(october.acceptance_rate, 33);
        assert_eq!(october.rejection_rate, 33);

        // September: a single rejection.
        let september = &stats.acceptance_trend[4];
        assert_eq!(september.rejection_rate, 100);
        assert_eq!(september.acceptance_rate, 0);
    }

    #[test]
    fn test_response_time_averages() {
        let stats = compute_dashboard_stats(&sample_reports(), &now());

        assert_eq!(
            stats.response_time,
            vec![
                ResponseTime {
                    status: "Aceptado".to_string(),
                    avg_days: 7,
                    count: 2
                },
                ResponseTime {
                    status: "Rechazado".to_string(),
                    avg_days: 3,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_malformed_timestamps_only_affect_time_views() {
        let now = now();
        let mut report = create_test_report(1, 4, 2, Some(3), now, now);
        report.created_at = "yesterday".to_string();

        let stats = compute_dashboard_stats(&[report], &now);

        assert_eq!(stats.total_reports, 1);
        assert_eq!(stats.reports_by_type[0].count, 1);
        assert_eq!(stats.reports_by_admin[0].resolved, 1);
        assert!(stats.response_time.is_empty());
        assert!(stats.reports_by_week.iter().all(|w| w.count == 0));
        assert!(stats.acceptance_trend.iter().all(|p| p.accepted == 0));
    }

    #[test]
    fn test_month_boundary_follows_now_timezone() {
        let now = now();
        let mut report = create_test_report(1, 1, 1, None, now, now);
        // 03:00 UTC on Oct 1 is still Sep 30 in UTC-6.
        report.created_at = "2026-10-01T03:00:00Z".to_string();

        let stats = compute_dashboard_stats(&[report], &now);

        assert_eq!(stats.reports_by_month[10].month, "sep 26");
        assert_eq!(stats.reports_by_month[10].count, 1);
        assert_eq!(stats.reports_by_month[11].count, 0);
    }

    #[test]
    fn test_idempotent() {
        let reports = sample_reports();
        let first = compute_dashboard_stats(&reports, &now());
        let second = compute_dashboard_stats(&reports, &now());
        assert_eq!(first, second);
    }
}
