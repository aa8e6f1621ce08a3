//! Plain-text rendering of deals for the terminal.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::client::{Deal, Version};

fn stamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn deal_cards(deals: &[Deal]) -> String {
    if deals.is_empty() {
        return "No deals yet.\n".to_string();
    }
    let mut out = String::new();
    for deal in deals {
        let latest = deal.versions.last();
        let _ = writeln!(
            out,
            "{}  {}  [{}]  owner: {}  versions: {}",
            deal.deal_id,
            deal.customer_name,
            deal.current_stage,
            deal.ta_owner,
            deal.versions.len(),
        );
        if let Some(v) = latest {
            let _ = writeln!(
                out,
                "    last edited by {} at {}",
                v.edited_by,
                stamp(&v.timestamp)
            );
        }
    }
    out
}

pub fn deal_detail(deal: &Deal) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Deal {}: {}", deal.deal_id, deal.customer_name);
    let _ = writeln!(out, "Stage: {}", deal.current_stage);
    let _ = writeln!(out, "Owner: {}", deal.ta_owner);
    let _ = writeln!(out, "Created: {}", stamp(&deal.created_at));
    for version in &deal.versions {
        let _ = write!(out, "{}", version_block(version));
    }
    out
}

/// Confirmation line for an append, from a post-append fetch so the
/// reported number is the one actually assigned.
pub fn append_confirmation(deal: &Deal) -> String {
    match deal.versions.last() {
        Some(v) => format!(
            "Appended version {} to deal {}.\n",
            v.version_number, deal.deal_id
        ),
        None => format!("Appended a version to deal {}.\n", deal.deal_id),
    }
}

fn version_block(version: &Version) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\nVersion {} ({} by {})",
        version.version_number,
        stamp(&version.timestamp),
        version.edited_by
    );
    let _ = writeln!(out, "  Use cases: {}", version.use_cases);
    let _ = writeln!(out, "  Roadblocks: {}", version.roadblocks);
    let _ = writeln!(
        out,
        "  Solution recommendations: {}",
        version.solution_recommendations
    );
    if let Some(comments) = &version.additional_comments {
        let _ = writeln!(out, "  Additional comments: {comments}");
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn sample_deal() -> Deal {
        Deal {
            id: Uuid::nil(),
            deal_id: "D-1".into(),
            customer_name: "Acme".into(),
            current_stage: "Proposal".into(),
            ta_owner: "Alice".into(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            versions: vec![Version {
                version_number: 1,
                use_cases: "edge inference".into(),
                roadblocks: "budget".into(),
                solution_recommendations: "pilot first".into(),
                additional_comments: None,
                edited_by: "Alice".into(),
                timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            }],
        }
    }

    #[test]
    fn empty_list_has_a_friendly_message() {
        assert_eq!(deal_cards(&[]), "No deals yet.\n");
    }

    #[test]
    fn cards_show_stage_and_version_count() {
        let text = deal_cards(&[sample_deal()]);
        assert!(text.contains("D-1  Acme  [Proposal]"));
        assert!(text.contains("versions: 1"));
        assert!(text.contains("last edited by Alice at 2026-03-01 09:30"));
    }

    #[test]
    fn append_confirmation_reports_the_assigned_number() {
        let deal = sample_deal();
        assert_eq!(
            append_confirmation(&deal),
            "Appended version 1 to deal D-1.\n"
        );
    }

    #[test]
    fn detail_lists_every_version_field() {
        let text = deal_detail(&sample_deal());
        assert!(text.contains("Deal D-1: Acme"));
        assert!(text.contains("Version 1 (2026-03-01 09:30 by Alice)"));
        assert!(text.contains("Use cases: edge inference"));
        assert!(!text.contains("Additional comments"));
    }
}
