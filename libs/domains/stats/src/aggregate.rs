//! Window aggregation over a slice of hits, used by the in-memory store.

use std::collections::{BTreeMap, HashSet};

use crate::models::{EndpointHit, StatsWindow, ViewStats};

/// Group hits inside `window` by `(app, uri)` and count them.
///
/// With `window.unique` each IP counts once per group. The uri filter applies
/// to the aggregated rows. Rows come out by hits descending, ties by app then uri.
pub fn aggregate<'a>(
    hits: impl IntoIterator<Item = &'a EndpointHit>,
    window: &StatsWindow,
) -> Vec<ViewStats> {
    let mut groups: BTreeMap<(&str, &str), (i64, HashSet<&str>)> = BTreeMap::new();

    for hit in hits {
        if hit.timestamp < window.start || hit.timestamp > window.end {
            continue;
        }
        let entry = groups
            .entry((hit.app.as_str(), hit.uri.as_str()))
            .or_default();
        entry.0 += 1;
        entry.1.insert(hit.ip.as_str());
    }

    let mut rows: Vec<ViewStats> = groups
        .into_iter()
        .map(|((app, uri), (total, ips))| ViewStats {
            app: app.to_string(),
            uri: uri.to_string(),
            hits: if window.unique { ips.len() as i64 } else { total },
        })
        .filter(|row| window.uris.is_empty() || window.uris.contains(&row.uri))
        .collect();

    // stable sort keeps the BTreeMap order for ties
    rows.sort_by(|a, b| b.hits.cmp(&a.hits));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_helpers::parse_date_time;
    use uuid::Uuid;

    fn hit(uri: &str, ip: &str, at: &str) -> EndpointHit {
        EndpointHit {
            id: Uuid::now_v7(),
            app: "ewm-main-service".into(),
            uri: uri.into(),
            ip: ip.into(),
            timestamp: parse_date_time(at).unwrap(),
        }
    }

    fn window(unique: bool, uris: &[&str]) -> StatsWindow {
        StatsWindow {
            start: parse_date_time("2024-01-01 00:00:00").unwrap(),
            end: parse_date_time("2024-01-02 00:00:00").unwrap(),
            uris: uris.iter().map(|u| u.to_string()).collect(),
            unique,
        }
    }

    fn sample() -> Vec<EndpointHit> {
        vec![
            hit("/events/1", "10.0.0.1", "2024-01-01 10:00:00"),
            hit("/events/1", "10.0.0.1", "2024-01-01 11:00:00"),
            hit("/events/1", "10.0.0.1", "2024-01-01 12:00:00"),
            hit("/events/1", "10.0.0.2", "2024-01-01 13:00:00"),
            hit("/events/1", "10.0.0.2", "2024-01-01 14:00:00"),
        ]
    }

    #[test]
    fn test_unique_counts_distinct_ips() {
        let rows = aggregate(&sample(), &window(true, &[]));
        assert_eq!(
            rows,
            vec![ViewStats {
                app: "ewm-main-service".into(),
                uri: "/events/1".into(),
                hits: 2
            }]
        );
    }

    #[test]
    fn test_raw_counts_every_hit() {
        let rows = aggregate(&sample(), &window(false, &[]));
        assert_eq!(rows[0].hits, 5);
    }

    #[test]
    fn test_bounds_are_inclusive_and_outside_hits_ignored() {
        let hits = vec![
            hit("/events", "1.1.1.1", "2024-01-01 00:00:00"),
            hit("/events", "1.1.1.1", "2024-01-02 00:00:00"),
            hit("/events", "1.1.1.1", "2024-01-02 00:00:01"),
            hit("/events", "1.1.1.1", "2023-12-31 23:59:59"),
        ];
        let rows = aggregate(&hits, &window(false, &[]));
        assert_eq!(rows[0].hits, 2);
    }

    #[test]
    fn test_uri_filter_and_ordering() {
        let mut hits = sample();
        hits.push(hit("/events", "1.1.1.1", "2024-01-01 10:00:00"));
        hits.push(hit("/events/2", "1.1.1.1", "2024-01-01 10:00:00"));

        let rows = aggregate(&hits, &window(false, &[]));
        let uris: Vec<&str> = rows.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["/events/1", "/events", "/events/2"]);

        let filtered = aggregate(&hits, &window(false, &["/events/2", "/missing"]));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].uri, "/events/2");
    }
}
