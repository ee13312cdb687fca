//! Controlled role vocabulary of the destination schema.

pub const RESPONSABLE_FORMATION: &str = "responsable-formation";
pub const RESPONSABLE_ANNEE: &str = "responsable-annee";
pub const DIRECTEUR_COMPOSANTE: &str = "directeur-composante";
pub const DIRECTEUR_DEPARTEMENT: &str = "directeur-departement";
pub const DIRECTEUR_MENTION: &str = "directeur-mention";
pub const DIRECTEUR_SPECIALITE: &str = "directeur-specialite";

/// Role ids already seeded in the destination schema; the emitter
/// never re-inserts them.
pub const SEEDED: &[&str] = &[
    RESPONSABLE_FORMATION,
    RESPONSABLE_ANNEE,
    DIRECTEUR_COMPOSANTE,
    DIRECTEUR_DEPARTEMENT,
    DIRECTEUR_MENTION,
    DIRECTEUR_SPECIALITE,
];

/// Administrative roles that get a synthetic fixture even when no
/// imported record references them.
pub const FIXTURE_EXTRAS: &[&str] = &["utilisateur-simple", "administrateur", "services-centraux"];
