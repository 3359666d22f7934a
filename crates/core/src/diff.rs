//! Before/after diff computation for the change history.
//!
//! A diff maps field names to `{old, new}` JSON value pairs. Only fields
//! that were actually submitted in the patch are considered: a merge-time
//! normalization of an unsubmitted field (for example `bhk` being cleared
//! because the property type changed) never produces a diff entry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::buyer::{BuyerPatch, BuyerRecord};

/// One changed field: the stored value before and after the mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// A full diff, keyed by wire field name. `BTreeMap` keeps the JSON
/// representation stable for storage and tests.
pub type Diff = BTreeMap<String, FieldChange>;

/// The sentinel diff written for record creation.
///
/// `created` is not a buyer field name, so consumers can always tell the
/// creation entry apart from a field-by-field change entry.
pub fn creation_sentinel() -> Diff {
    let mut diff = Diff::new();
    diff.insert(
        "created".to_string(),
        FieldChange {
            old: Value::Null,
            new: Value::Bool(true),
        },
    );
    diff
}

fn to_value<T: Serialize>(value: &T) -> Value {
    // Serialization of these field types cannot fail.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn push_if_changed<T: Serialize + PartialEq>(
    diff: &mut Diff,
    field: &str,
    old: &T,
    new: &T,
) {
    if old != new {
        diff.insert(
            field.to_string(),
            FieldChange {
                old: to_value(old),
                new: to_value(new),
            },
        );
    }
}

/// Compute the set of changed fields between the stored snapshot and the
/// merged effective record, restricted to the fields present in `patch`.
///
/// Equality is value equality; `tags` compares as a set (order-independent,
/// duplicates ignored). Equal values are omitted, so an identical update
/// yields an empty diff and the caller skips the history write.
pub fn compute_diff(old: &BuyerRecord, new: &BuyerRecord, patch: &BuyerPatch) -> Diff {
    let mut diff = Diff::new();

    if patch.full_name.is_some() {
        push_if_changed(&mut diff, "full_name", &old.full_name, &new.full_name);
    }
    if patch.email.is_some() {
        push_if_changed(&mut diff, "email", &old.email, &new.email);
    }
    if patch.phone.is_some() {
        push_if_changed(&mut diff, "phone", &old.phone, &new.phone);
    }
    if patch.city.is_some() {
        push_if_changed(&mut diff, "city", &old.city, &new.city);
    }
    if patch.property_type.is_some() {
        push_if_changed(
            &mut diff,
            "property_type",
            &old.property_type,
            &new.property_type,
        );
    }
    if patch.bhk.is_some() {
        push_if_changed(&mut diff, "bhk", &old.bhk, &new.bhk);
    }
    if patch.purpose.is_some() {
        push_if_changed(&mut diff, "purpose", &old.purpose, &new.purpose);
    }
    if patch.budget_min.is_some() {
        push_if_changed(&mut diff, "budget_min", &old.budget_min, &new.budget_min);
    }
    if patch.budget_max.is_some() {
        push_if_changed(&mut diff, "budget_max", &old.budget_max, &new.budget_max);
    }
    if patch.timeline.is_some() {
        push_if_changed(&mut diff, "timeline", &old.timeline, &new.timeline);
    }
    if patch.source.is_some() {
        push_if_changed(&mut diff, "source", &old.source, &new.source);
    }
    if patch.status.is_some() {
        push_if_changed(&mut diff, "status", &old.status, &new.status);
    }
    if patch.notes.is_some() {
        push_if_changed(&mut diff, "notes", &old.notes, &new.notes);
    }
    if patch.tags.is_some() {
        let old_set: BTreeSet<&str> = old.tags.iter().map(String::as_str).collect();
        let new_set: BTreeSet<&str> = new.tags.iter().map(String::as_str).collect();
        if old_set != new_set {
            diff.insert(
                "tags".to_string(),
                FieldChange {
                    old: to_value(&old.tags),
                    new: to_value(&new.tags),
                },
            );
        }
    }

    diff
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buyer::{Bhk, BuyerStatus, City, LeadSource, PropertyType, Purpose, Timeline};
    use serde_json::json;

    fn sample_record() -> BuyerRecord {
        BuyerRecord {
            full_name: "John Doe".into(),
            email: Some("john@example.com".into()),
            phone: "9876543210".into(),
            city: City::Chandigarh,
            property_type: PropertyType::Apartment,
            bhk: Some(Bhk::Two),
            purpose: Purpose::Buy,
            budget_min: Some(5_000_000),
            budget_max: Some(7_000_000),
            timeline: Timeline::WithinThreeMonths,
            source: LeadSource::Website,
            status: BuyerStatus::New,
            notes: None,
            tags: vec!["vip".into()],
        }
    }

    #[test]
    fn single_field_change_produces_single_entry() {
        let old = sample_record();
        let patch = BuyerPatch {
            status: Some(BuyerStatus::Contacted),
            ..Default::default()
        };
        let new = patch.apply(&old);

        let diff = compute_diff(&old, &new, &patch);
        assert_eq!(diff.len(), 1);
        let change = &diff["status"];
        assert_eq!(change.old, json!("New"));
        assert_eq!(change.new, json!("Contacted"));
    }

    #[test]
    fn identical_update_produces_empty_diff() {
        let old = sample_record();
        let patch = BuyerPatch {
            status: Some(BuyerStatus::New),
            phone: Some("9876543210".into()),
            ..Default::default()
        };
        let new = patch.apply(&old);

        assert!(compute_diff(&old, &new, &patch).is_empty());
    }

    #[test]
    fn unsubmitted_fields_never_appear() {
        let old = sample_record();
        // Switching to Plot clears bhk during merge, but bhk was not
        // submitted, so only property_type may appear in the diff.
        let patch = BuyerPatch {
            property_type: Some(PropertyType::Plot),
            ..Default::default()
        };
        let new = patch.apply(&old);
        assert_eq!(new.bhk, None);

        let diff = compute_diff(&old, &new, &patch);
        assert_eq!(diff.len(), 1);
        assert!(diff.contains_key("property_type"));
        assert!(!diff.contains_key("bhk"));
    }

    #[test]
    fn optional_field_set_records_null_old_value() {
        let old = sample_record();
        let patch = BuyerPatch {
            notes: Some("prefers top floor".into()),
            ..Default::default()
        };
        let new = patch.apply(&old);

        let diff = compute_diff(&old, &new, &patch);
        let change = &diff["notes"];
        assert_eq!(change.old, Value::Null);
        assert_eq!(change.new, json!("prefers top floor"));
    }

    #[test]
    fn tags_compare_as_sets() {
        let mut old = sample_record();
        old.tags = vec!["vip".into(), "nri".into()];

        // Same members, different order: no change.
        let patch = BuyerPatch {
            tags: Some(vec!["nri".into(), "vip".into()]),
            ..Default::default()
        };
        let new = patch.apply(&old);
        assert!(compute_diff(&old, &new, &patch).is_empty());

        // A genuinely different set is recorded.
        let patch = BuyerPatch {
            tags: Some(vec!["vip".into(), "hot".into()]),
            ..Default::default()
        };
        let new = patch.apply(&old);
        let diff = compute_diff(&old, &new, &patch);
        assert_eq!(diff["tags"].new, json!(["vip", "hot"]));
    }

    #[test]
    fn duplicate_tags_collapse_for_comparison() {
        let mut old = sample_record();
        old.tags = vec!["vip".into()];

        let patch = BuyerPatch {
            tags: Some(vec!["vip".into(), "vip".into()]),
            ..Default::default()
        };
        let new = patch.apply(&old);
        assert!(compute_diff(&old, &new, &patch).is_empty());
    }

    #[test]
    fn multi_field_patch_records_each_change() {
        let old = sample_record();
        let patch = BuyerPatch {
            status: Some(BuyerStatus::Visited),
            budget_max: Some(9_000_000),
            city: Some(City::Mohali),
            ..Default::default()
        };
        let new = patch.apply(&old);

        let diff = compute_diff(&old, &new, &patch);
        assert_eq!(diff.len(), 3);
        assert_eq!(diff["budget_max"].old, json!(5_000_000i64 + 2_000_000));
        assert_eq!(diff["budget_max"].new, json!(9_000_000i64));
        assert_eq!(diff["city"].new, json!("Mohali"));
    }

    #[test]
    fn creation_sentinel_shape() {
        let diff = creation_sentinel();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff["created"].old, Value::Null);
        assert_eq!(diff["created"].new, Value::Bool(true));

        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json, json!({"created": {"old": null, "new": true}}));
    }
}
