//! Buyer domain model: closed enums, the full record snapshot, and the
//! create/patch DTOs.
//!
//! Every enum field is a closed sum type whose wire string (serde, sqlx
//! TEXT value, and CSV cell) is fixed per variant. Membership is therefore
//! enforced at the type boundary: JSON bodies fail deserialization and CSV
//! cells fail [`std::str::FromStr`] on any value outside the set, both with
//! an exact, case-sensitive comparison.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enum plumbing
// ---------------------------------------------------------------------------

/// Error returned when a string does not name a variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    /// The rejected input.
    pub value: String,
    /// The enum type name, for diagnostics.
    pub expected: &'static str,
}

impl std::fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} value: '{}'", self.expected, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

/// Implemented by every closed wire enum. Lets generic code (the CSV
/// decoder) name the allowed values in error messages.
pub trait EnumSet {
    /// Comma-joined wire strings of every variant.
    fn allowed_values() -> String;
}

macro_rules! define_wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
        #[sqlx(type_name = "TEXT")]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] #[sqlx(rename = $wire)] $variant ),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// The exact wire/storage string for this variant.
            pub fn as_str(&self) -> &'static str {
                match self { $( Self::$variant => $wire ),+ }
            }

            /// Comma-joined wire strings, for "Allowed: ..." messages.
            pub fn allowed() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(ParseEnumError {
                        value: other.to_string(),
                        expected: stringify!($name),
                    }),
                }
            }
        }

        impl EnumSet for $name {
            fn allowed_values() -> String {
                Self::allowed()
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Closed enums
// ---------------------------------------------------------------------------

define_wire_enum! {
    /// Service-area city for a lead.
    City {
        Chandigarh => "Chandigarh",
        Mohali => "Mohali",
        Zirakpur => "Zirakpur",
        Panchkula => "Panchkula",
        Other => "Other",
    }
}

define_wire_enum! {
    /// Property category the lead is interested in.
    PropertyType {
        Apartment => "Apartment",
        Villa => "Villa",
        Plot => "Plot",
        Office => "Office",
        Retail => "Retail",
    }
}

impl PropertyType {
    /// Residential types carry a bedroom-count (BHK) requirement; the
    /// commercial/land types must not.
    pub fn requires_bhk(self) -> bool {
        matches!(self, Self::Apartment | Self::Villa)
    }
}

define_wire_enum! {
    /// Bedroom-count category for residential property types.
    Bhk {
        Studio => "Studio",
        One => "One",
        Two => "Two",
        Three => "Three",
        Four => "Four",
    }
}

define_wire_enum! {
    /// Whether the lead wants to buy or rent.
    Purpose {
        Buy => "Buy",
        Rent => "Rent",
    }
}

define_wire_enum! {
    /// Purchase timeline bucket.
    Timeline {
        WithinThreeMonths => "M0_3m",
        ThreeToSixMonths => "M3_6m",
        MoreThanSixMonths => "MoreThan6m",
        Exploring => "Exploring",
    }
}

define_wire_enum! {
    /// How the lead reached us.
    LeadSource {
        Website => "Website",
        Referral => "Referral",
        WalkIn => "Walk_in",
        Call => "Call",
        Other => "Other",
    }
}

define_wire_enum! {
    /// Pipeline status of a lead.
    BuyerStatus {
        New => "New",
        Qualified => "Qualified",
        Contacted => "Contacted",
        Visited => "Visited",
        Negotiation => "Negotiation",
        Converted => "Converted",
        Dropped => "Dropped",
    }
}

// ---------------------------------------------------------------------------
// Record snapshot and DTOs
// ---------------------------------------------------------------------------

/// The full field set of a buyer lead, without identity or bookkeeping
/// columns. This is the unit the validator, diff engine, and repository
/// exchange: validation produces one, updates merge a patch into one, and
/// the diff engine compares two of them field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerRecord {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: City,
    pub property_type: PropertyType,
    pub bhk: Option<Bhk>,
    pub purpose: Purpose,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: Timeline,
    pub source: LeadSource,
    pub status: BuyerStatus,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// DTO for creating a new buyer lead. `status` defaults to `New` and
/// `tags` to empty when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBuyer {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: City,
    pub property_type: PropertyType,
    pub bhk: Option<Bhk>,
    pub purpose: Purpose,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: Timeline,
    pub source: LeadSource,
    pub status: Option<BuyerStatus>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// DTO for a partial update. A `None` field was not supplied and is left
/// unchanged. Clearing is limited to the cases the form supports: an empty
/// `email` string clears the address, and `bhk` is dropped automatically
/// when the effective property type stops being residential.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuyerPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<City>,
    pub property_type: Option<PropertyType>,
    pub bhk: Option<Bhk>,
    pub purpose: Option<Purpose>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: Option<Timeline>,
    pub source: Option<LeadSource>,
    pub status: Option<BuyerStatus>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl BuyerPatch {
    /// `true` if no field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.city.is_none()
            && self.property_type.is_none()
            && self.bhk.is_none()
            && self.purpose.is_none()
            && self.budget_min.is_none()
            && self.budget_max.is_none()
            && self.timeline.is_none()
            && self.source.is_none()
            && self.status.is_none()
            && self.notes.is_none()
            && self.tags.is_none()
    }

    /// Merge this patch into `current`, producing the effective record.
    ///
    /// Unsupplied fields keep their current value. If the effective
    /// property type is not residential, `bhk` is cleared silently.
    pub fn apply(&self, current: &BuyerRecord) -> BuyerRecord {
        let mut merged = current.clone();

        if let Some(v) = &self.full_name {
            merged.full_name = v.trim().to_string();
        }
        if let Some(v) = &self.email {
            merged.email = Some(v.clone()).filter(|e| !e.is_empty());
        }
        if let Some(v) = &self.phone {
            merged.phone = v.clone();
        }
        if let Some(v) = self.city {
            merged.city = v;
        }
        if let Some(v) = self.property_type {
            merged.property_type = v;
        }
        if let Some(v) = self.bhk {
            merged.bhk = Some(v);
        }
        if let Some(v) = self.purpose {
            merged.purpose = v;
        }
        if let Some(v) = self.budget_min {
            merged.budget_min = Some(v);
        }
        if let Some(v) = self.budget_max {
            merged.budget_max = Some(v);
        }
        if let Some(v) = self.timeline {
            merged.timeline = v;
        }
        if let Some(v) = self.source {
            merged.source = v;
        }
        if let Some(v) = self.status {
            merged.status = v;
        }
        if let Some(v) = &self.notes {
            merged.notes = Some(v.clone());
        }
        if let Some(v) = &self.tags {
            merged.tags = v.clone();
        }

        if !merged.property_type.requires_bhk() {
            merged.bhk = None;
        }

        merged
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_round_trip_through_serde() {
        let json = serde_json::to_string(&Timeline::WithinThreeMonths).unwrap();
        assert_eq!(json, "\"M0_3m\"");
        let parsed: Timeline = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Timeline::WithinThreeMonths);

        assert_eq!(
            serde_json::to_string(&LeadSource::WalkIn).unwrap(),
            "\"Walk_in\""
        );
    }

    #[test]
    fn from_str_is_exact_and_case_sensitive() {
        assert_eq!("Chandigarh".parse::<City>().unwrap(), City::Chandigarh);
        assert!("chandigarh".parse::<City>().is_err());
        assert!("InvalidCity".parse::<City>().is_err());

        let err = "Five".parse::<Bhk>().unwrap_err();
        assert_eq!(err.value, "Five");
        assert_eq!(err.expected, "Bhk");
    }

    #[test]
    fn allowed_lists_every_variant() {
        assert_eq!(
            BuyerStatus::allowed(),
            "New, Qualified, Contacted, Visited, Negotiation, Converted, Dropped"
        );
        assert_eq!(Purpose::ALL.len(), 2);
    }

    #[test]
    fn requires_bhk_only_for_residential_types() {
        assert!(PropertyType::Apartment.requires_bhk());
        assert!(PropertyType::Villa.requires_bhk());
        assert!(!PropertyType::Plot.requires_bhk());
        assert!(!PropertyType::Office.requires_bhk());
        assert!(!PropertyType::Retail.requires_bhk());
    }

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
            tags: vec![],
        }
    }

    #[test]
    fn empty_patch_applies_to_identity() {
        let record = sample_record();
        let patch = BuyerPatch::default();
        assert!(patch.is_empty());
        assert_eq!(patch.apply(&record), record);
    }

    #[test]
    fn patch_overrides_only_supplied_fields() {
        let record = sample_record();
        let patch = BuyerPatch {
            status: Some(BuyerStatus::Contacted),
            notes: Some("called twice".into()),
            ..Default::default()
        };

        let merged = patch.apply(&record);
        assert_eq!(merged.status, BuyerStatus::Contacted);
        assert_eq!(merged.notes.as_deref(), Some("called twice"));
        assert_eq!(merged.full_name, record.full_name);
        assert_eq!(merged.bhk, record.bhk);
    }

    #[test]
    fn switching_to_commercial_property_clears_bhk() {
        let record = sample_record();
        let patch = BuyerPatch {
            property_type: Some(PropertyType::Plot),
            ..Default::default()
        };

        let merged = patch.apply(&record);
        assert_eq!(merged.property_type, PropertyType::Plot);
        assert_eq!(merged.bhk, None);
    }

    #[test]
    fn empty_email_patch_clears_the_address() {
        let mut record = sample_record();
        record.email = Some("john@example.com".into());

        let patch = BuyerPatch {
            email: Some("".into()),
            ..Default::default()
        };
        assert_eq!(patch.apply(&record).email, None);
    }

    #[test]
    fn bhk_survives_residential_property_switch() {
        let record = sample_record();
        let patch = BuyerPatch {
            property_type: Some(PropertyType::Villa),
            ..Default::default()
        };

        let merged = patch.apply(&record);
        assert_eq!(merged.bhk, Some(Bhk::Two));
    }
}
