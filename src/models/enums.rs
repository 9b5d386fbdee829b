use std::fmt;

use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(BookingStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(BookingOrigin {
    ClientRequest => "client_request",
    Manual => "manual",
});

str_enum!(Actor {
    Client => "client",
    Professional => "professional",
    System => "system",
});

str_enum!(AbsenceSource {
    Manual => "manual",
    Quote => "quote",
});

str_enum!(PricingUnit {
    Flat => "flat",
    PerSquareMeter => "per_m2",
    PerLinearMeter => "per_linear_m",
    PerCubicMeter => "per_m3",
    PerHour => "per_hour",
    PerTree => "per_tree",
    PerTonne => "per_tonne",
    PerUnit => "per_unit",
});

str_enum!(ProfileKind {
    Artisan => "artisan",
    Company => "company",
    Concierge => "concierge",
    BuildingManager => "building_manager",
});

str_enum!(HourField {
    Start => "start",
    End => "end",
});

str_enum!(WorkCategory {
    Plumbing => "plumbing",
    Electrical => "electrical",
    Heating => "heating",
    Locksmith => "locksmith",
    Painting => "painting",
    Carpentry => "carpentry",
    Other => "other",
});

str_enum!(WarrantyType {
    Structural => "structural",
    Standard => "standard",
});

str_enum!(CalendarView {
    Day => "day",
    Week => "week",
    Month => "month",
});

str_enum!(CellKind {
    Empty => "empty",
    Occupied => "occupied",
    Absent => "absent",
});

str_enum!(BookingEventKind {
    Created => "created",
    Confirmed => "confirmed",
    Cancelled => "cancelled",
    Completed => "completed",
    Reopened => "reopened",
});

str_enum!(TimelineKind {
    WarrantyEnd => "warranty_end",
    Maintenance => "maintenance",
});

impl AbsenceSource {
    /// Blocks owned by another feature (e.g. a signed quote) rather than
    /// declared by hand.
    pub fn is_auto_derived(&self) -> bool {
        !matches!(self, Self::Manual)
    }
}

impl WorkCategory {
    /// Trades covered by the two-year structural warranty.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Plumbing | Self::Electrical | Self::Heating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn booking_status_round_trips_through_str() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = BookingStatus::from_str("archived").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn serde_uses_storage_names() {
        let json = serde_json::to_string(&PricingUnit::PerSquareMeter).unwrap();
        assert_eq!(json, "\"per_m2\"");
        let back: ProfileKind = serde_json::from_str("\"building_manager\"").unwrap();
        assert_eq!(back, ProfileKind::BuildingManager);
    }

    #[test]
    fn structural_categories() {
        assert!(WorkCategory::Heating.is_structural());
        assert!(!WorkCategory::Painting.is_structural());
        assert!(!WorkCategory::Other.is_structural());
    }

    #[test]
    fn quote_absences_are_auto_derived() {
        assert!(AbsenceSource::Quote.is_auto_derived());
        assert!(!AbsenceSource::Manual.is_auto_derived());
    }
}
