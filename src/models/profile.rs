use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ProfileKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    pub id: Uuid,
    pub kind: ProfileKind,
    pub display_name: String,
    /// New client requests skip `pending` when set.
    pub auto_accept: bool,
}

impl ProfessionalProfile {
    pub fn new(kind: ProfileKind, display_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            display_name: display_name.to_string(),
            auto_accept: false,
        }
    }

    pub fn labels(&self) -> ProfileLabels {
        self.kind.labels()
    }
}

/// Wording each profile kind uses for the same agenda contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileLabels {
    pub provider: &'static str,
    pub catalog: &'static str,
    pub booking: &'static str,
}

impl ProfileKind {
    pub fn labels(&self) -> ProfileLabels {
        match self {
            Self::Artisan => ProfileLabels {
                provider: "Artisan",
                catalog: "Motifs",
                booking: "Intervention",
            },
            Self::Company => ProfileLabels {
                provider: "Entreprise",
                catalog: "Prestations",
                booking: "Chantier",
            },
            Self::Concierge => ProfileLabels {
                provider: "Conciergerie",
                catalog: "Services",
                booking: "Mission",
            },
            Self::BuildingManager => ProfileLabels {
                provider: "Gestionnaire",
                catalog: "Contrats",
                booking: "Ordre de service",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_defaults_to_manual_acceptance() {
        let profile = ProfessionalProfile::new(ProfileKind::Artisan, "Plomberie Martin");
        assert!(!profile.auto_accept);
        assert_eq!(profile.labels().catalog, "Motifs");
    }

    #[test]
    fn every_kind_has_labels() {
        for kind in [
            ProfileKind::Artisan,
            ProfileKind::Company,
            ProfileKind::Concierge,
            ProfileKind::BuildingManager,
        ] {
            let labels = kind.labels();
            assert!(!labels.provider.is_empty());
            assert!(!labels.booking.is_empty());
        }
    }
}
