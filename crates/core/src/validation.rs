//! Field-level and cross-field validation for buyer leads.
//!
//! Validation is deterministic and side-effect-free. All failing rules are
//! collected into a single [`ValidationErrors`] aggregate so callers can
//! render per-field feedback in one round trip; nothing is ever partially
//! applied.
//!
//! Enum membership is not re-checked here: closed enums reject unknown
//! values at the deserialization/parse boundary (see [`crate::buyer`]).

use serde::Serialize;
use validator::ValidateEmail;

use crate::buyer::{BuyerPatch, BuyerRecord, BuyerStatus, CreateBuyer};

/// Maximum length of the free-form notes field.
pub const NOTES_MAX_CHARS: usize = 1000;

/// Full name length bounds (inclusive).
pub const FULL_NAME_MIN_CHARS: usize = 2;
pub const FULL_NAME_MAX_CHARS: usize = 80;

/// Phone digit-count bounds (inclusive).
pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 15;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// The kind of rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    Type,
    Range,
    Enum,
    Pattern,
    CrossField,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Type => "type",
            Self::Range => "range",
            Self::Enum => "enum",
            Self::Pattern => "pattern",
            Self::CrossField => "cross_field",
        }
    }
}

/// A single failed rule, attached to the field that should display it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Field path in wire (snake_case) form, e.g. `budget_max`.
    pub field: String,
    /// Human-readable message suitable for form display.
    pub message: String,
    /// The rule kind that failed.
    pub rule: RuleKind,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>, rule: RuleKind) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            rule,
        }
    }
}

/// Aggregate of every failed rule for one candidate record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Return `Ok(())` when no rule failed, otherwise the aggregate.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

// ---------------------------------------------------------------------------
// Per-field rules
// ---------------------------------------------------------------------------

fn check_full_name(value: &str, errors: &mut ValidationErrors) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(FieldError::new(
            "full_name",
            "Full name is required",
            RuleKind::Required,
        ));
    } else if !(FULL_NAME_MIN_CHARS..=FULL_NAME_MAX_CHARS).contains(&len) {
        errors.push(FieldError::new(
            "full_name",
            format!("Full name must be {FULL_NAME_MIN_CHARS} to {FULL_NAME_MAX_CHARS} characters"),
            RuleKind::Range,
        ));
    }
}

fn check_phone(value: &str, errors: &mut ValidationErrors) {
    let digits_only = value.chars().all(|c| c.is_ascii_digit());
    let len = value.len();
    if !digits_only || !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&len) {
        errors.push(FieldError::new(
            "phone",
            format!("Phone must be {PHONE_MIN_DIGITS} to {PHONE_MAX_DIGITS} digits"),
            RuleKind::Pattern,
        ));
    }
}

fn check_email(value: &str, errors: &mut ValidationErrors) {
    // An empty value is treated as "not provided".
    if !value.is_empty() && !value.validate_email() {
        errors.push(FieldError::new(
            "email",
            "Email must be a valid email address",
            RuleKind::Pattern,
        ));
    }
}

fn check_notes(value: &str, errors: &mut ValidationErrors) {
    if value.chars().count() > NOTES_MAX_CHARS {
        errors.push(FieldError::new(
            "notes",
            format!("Notes must be at most {NOTES_MAX_CHARS} characters"),
            RuleKind::Range,
        ));
    }
}

fn check_budget(field: &str, value: i64, errors: &mut ValidationErrors) {
    if value < 0 {
        errors.push(FieldError::new(
            field,
            format!("{field} must be non-negative"),
            RuleKind::Range,
        ));
    }
}

// ---------------------------------------------------------------------------
// Cross-field rules
// ---------------------------------------------------------------------------

/// Validate the cross-field invariants of a complete (effective) record.
///
/// In update mode the caller merges the patch into the stored snapshot
/// first; unchanged fields are trusted (they passed validation when
/// written).
pub fn validate_record(record: &BuyerRecord) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if let (Some(min), Some(max)) = (record.budget_min, record.budget_max) {
        if max < min {
            errors.push(FieldError::new(
                "budget_max",
                "budget_max must be greater than or equal to budget_min",
                RuleKind::CrossField,
            ));
        }
    }

    if record.property_type.requires_bhk() && record.bhk.is_none() {
        errors.push(FieldError::new(
            "bhk",
            format!(
                "BHK is required when property type is {}",
                record.property_type
            ),
            RuleKind::CrossField,
        ));
    }

    errors.into_result()
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validate a create candidate and produce the record to persist.
///
/// Applies defaults (`status` -> `New`, `tags` -> empty), silently clears
/// `bhk` for non-residential property types, and enforces every per-field
/// and cross-field rule, collecting all failures.
pub fn validate_new(input: &CreateBuyer) -> Result<BuyerRecord, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_full_name(&input.full_name, &mut errors);
    check_phone(&input.phone, &mut errors);
    if let Some(email) = &input.email {
        check_email(email, &mut errors);
    }
    if let Some(notes) = &input.notes {
        check_notes(notes, &mut errors);
    }
    if let Some(min) = input.budget_min {
        check_budget("budget_min", min, &mut errors);
    }
    if let Some(max) = input.budget_max {
        check_budget("budget_max", max, &mut errors);
    }

    let record = BuyerRecord {
        full_name: input.full_name.trim().to_string(),
        email: input.email.clone().filter(|e| !e.is_empty()),
        phone: input.phone.clone(),
        city: input.city,
        property_type: input.property_type,
        bhk: if input.property_type.requires_bhk() {
            input.bhk
        } else {
            None
        },
        purpose: input.purpose,
        budget_min: input.budget_min,
        budget_max: input.budget_max,
        timeline: input.timeline,
        source: input.source,
        status: input.status.unwrap_or(BuyerStatus::New),
        notes: input.notes.clone(),
        tags: input.tags.clone().unwrap_or_default(),
    };

    if let Err(cross) = validate_record(&record) {
        errors.0.extend(cross.0);
    }

    errors.into_result().map(|_| record)
}

/// Validate only the fields supplied in a patch.
///
/// Cross-field rules are deferred to [`validate_record`] over the merged
/// effective record; this pass guarantees each supplied value is valid in
/// isolation.
pub fn validate_patch(patch: &BuyerPatch) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if let Some(full_name) = &patch.full_name {
        check_full_name(full_name, &mut errors);
    }
    if let Some(phone) = &patch.phone {
        check_phone(phone, &mut errors);
    }
    if let Some(email) = &patch.email {
        check_email(email, &mut errors);
    }
    if let Some(notes) = &patch.notes {
        check_notes(notes, &mut errors);
    }
    if let Some(min) = patch.budget_min {
        check_budget("budget_min", min, &mut errors);
    }
    if let Some(max) = patch.budget_max {
        check_budget("budget_max", max, &mut errors);
    }

    errors.into_result()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
