//! Checklist key sets and completion accounting
//!
//! The two checklist-bearing workflows deliberately disagree on rounding.
//! Acceptance reports one decimal over the full 12-item set; handover
//! truncates to an integer over only the items actually present. Both
//! policies are load-bearing: review gates and rendered certificates quote
//! them verbatim.

use crate::{WorkflowError, WorkflowResult};
use serde_json::{Map, Value};

/// Flat acceptance checklist. All twelve items count toward the
/// denominator whether or not they have been touched yet.
pub const ACCEPTANCE_CHECKLIST_ITEMS: &[&str] = &[
    "digital_gateway_live",
    "mobile_friendly",
    "pages_present",
    "portals_linked",
    "social_media_embedded",
    "logo_colors_correct",
    "photos_content_displayed",
    "layout_design_ok",
    "staff_training_completed",
    "training_materials_provided",
    "no_critical_errors",
    "minor_issues_resolved",
];

const TECHNICAL_SETUP: &[&str] = &[
    "domain_configured",
    "ssl_active",
    "site_load_ok",
    "responsive_design",
    "no_broken_links",
];
const CORE_PAGES: &[&str] = &[
    "home_completed",
    "about_news_added",
    "contact_correct",
    "portal_links_ok",
    "social_media_tested",
];
const CONTENT_ACCURACY: &[&str] = &[
    "logo_correct",
    "photos_optimized",
    "text_proofread",
    "info_matches_official",
];
const SECURITY_COMPLIANCE: &[&str] = &[
    "admin_created",
    "restricted_access",
    "privacy_statement_included",
];
const TRAINING_HANDOVER_PREP: &[&str] = &[
    "training_scheduled",
    "training_materials_ready",
    "howto_instructions",
    "support_contact_added",
];
const FINAL_TEST_RUN: &[&str] = &[
    "browsers_tested",
    "forms_tested",
    "backup_taken",
    "screenshots_captured",
];

/// Sectioned handover checklist, 25 items across six sections.
pub const HANDOVER_CHECKLIST_SECTIONS: &[(&str, &[&str])] = &[
    ("technical_setup", TECHNICAL_SETUP),
    ("core_pages", CORE_PAGES),
    ("content_accuracy", CONTENT_ACCURACY),
    ("security_compliance", SECURITY_COMPLIANCE),
    ("training_handover_prep", TRAINING_HANDOVER_PREP),
    ("final_test_run", FINAL_TEST_RUN),
];

pub const HANDOVER_SECTION_NAMES: &[&str] = &[
    "technical_setup",
    "core_pages",
    "content_accuracy",
    "security_compliance",
    "training_handover_prep",
    "final_test_run",
];

/// Items of one handover section, `None` for an unknown section name.
pub fn handover_section_items(section: &str) -> Option<&'static [&'static str]> {
    HANDOVER_CHECKLIST_SECTIONS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, items)| *items)
}

/// Acceptance completion: `round(completed / 12 * 100, 1)`.
///
/// An untouched checklist reports 0 rather than 0.0-of-12 arithmetic.
pub fn acceptance_completion(checklist: &Map<String, Value>) -> f64 {
    if checklist.is_empty() {
        return 0.0;
    }
    let completed = checklist
        .values()
        .filter(|value| value.as_bool() == Some(true))
        .count();
    let pct = completed as f64 / ACCEPTANCE_CHECKLIST_ITEMS.len() as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Handover completion: `trunc(completed / present * 100)`, flattened
/// across all sections and counting only items actually present.
pub fn handover_completion(checklist: &Map<String, Value>) -> u8 {
    let mut total = 0usize;
    let mut completed = 0usize;
    for section in checklist.values() {
        if let Some(items) = section.as_object() {
            for value in items.values() {
                total += 1;
                if value.as_bool() == Some(true) {
                    completed += 1;
                }
            }
        }
    }
    if total == 0 {
        0
    } else {
        (completed * 100 / total) as u8
    }
}

/// Validate one acceptance checklist write: known item, boolean value.
pub fn validate_acceptance_item(item: &str, value: &Value) -> WorkflowResult<()> {
    if !ACCEPTANCE_CHECKLIST_ITEMS.contains(&item) {
        return Err(WorkflowError::UnknownChecklistItem {
            item: item.to_string(),
            legal: ACCEPTANCE_CHECKLIST_ITEMS,
        });
    }
    if !value.is_boolean() {
        return Err(WorkflowError::NonBooleanChecklistValue {
            item: item.to_string(),
        });
    }
    Ok(())
}

/// Validate one handover section patch: known section, known items,
/// boolean values. Nothing is written on failure.
pub fn validate_handover_patch(section: &str, patch: &Map<String, Value>) -> WorkflowResult<()> {
    let legal_items =
        handover_section_items(section).ok_or(WorkflowError::UnknownChecklistSection {
            section: section.to_string(),
            legal: HANDOVER_SECTION_NAMES,
        })?;
    for (item, value) in patch {
        if !legal_items.contains(&item.as_str()) {
            return Err(WorkflowError::UnknownChecklistItem {
                item: item.clone(),
                legal: legal_items,
            });
        }
        if !value.is_boolean() {
            return Err(WorkflowError::NonBooleanChecklistValue { item: item.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn section_layout_totals_twenty_five_items() {
        let total: usize = HANDOVER_CHECKLIST_SECTIONS
            .iter()
            .map(|(_, items)| items.len())
            .sum();
        assert_eq!(total, 25);
        assert_eq!(ACCEPTANCE_CHECKLIST_ITEMS.len(), 12);
        assert_eq!(handover_section_items("core_pages").unwrap().len(), 5);
        assert!(handover_section_items("core_page").is_none());
    }

    #[test]
    fn acceptance_rounds_to_one_decimal() {
        let checklist = object(json!({
            "digital_gateway_live": true,
            "mobile_friendly": true,
            "pages_present": false,
        }));
        // 2/12 = 16.666… → 16.7
        assert_eq!(acceptance_completion(&checklist), 16.7);
        assert_eq!(acceptance_completion(&Map::new()), 0.0);
    }

    #[test]
    fn handover_truncates_over_present_items_only() {
        let checklist = object(json!({
            "technical_setup": {
                "domain_configured": true,
                "ssl_active": true,
                "site_load_ok": false,
            }
        }));
        // 2/3 = 66.66… → 66, not 67, and absent sections do not dilute.
        assert_eq!(handover_completion(&checklist), 66);
        assert_eq!(handover_completion(&Map::new()), 0);
    }

    #[test]
    fn acceptance_write_validation() {
        assert!(validate_acceptance_item("mobile_friendly", &json!(true)).is_ok());
        assert!(matches!(
            validate_acceptance_item("mobile_freindly", &json!(true)),
            Err(WorkflowError::UnknownChecklistItem { .. })
        ));
        assert!(matches!(
            validate_acceptance_item("mobile_friendly", &json!("yes")),
            Err(WorkflowError::NonBooleanChecklistValue { .. })
        ));
    }

    #[test]
    fn handover_patch_validation_rejects_before_write() {
        assert!(
            validate_handover_patch("final_test_run", &object(json!({"backup_taken": true})))
                .is_ok()
        );
        assert!(matches!(
            validate_handover_patch("final_exam", &Map::new()),
            Err(WorkflowError::UnknownChecklistSection { .. })
        ));
        assert!(matches!(
            validate_handover_patch("final_test_run", &object(json!({"ssl_active": true}))),
            Err(WorkflowError::UnknownChecklistItem { .. })
        ));
        assert!(matches!(
            validate_handover_patch("final_test_run", &object(json!({"backup_taken": 1}))),
            Err(WorkflowError::NonBooleanChecklistValue { .. })
        ));
    }
}
