//! Keyword heuristics for the hierarchy fields the sources leave
//! blank, plus role-label classification and full-name splitting.
//!
//! Classification is an ordered list of (keywords, label) rules
//! evaluated first-match-wins, so adding a keyword is a data change,
//! not a control-flow change.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::EntityType;
use crate::graph::roles;
use crate::text::{clean_whitespace, is_upper_token, slugify, title_case};

/// One classification rule: the label applies when every keyword
/// appears in the lowercased text.
struct KeywordRule {
    all_of: &'static [&'static str],
    label: &'static str,
}

const DEPARTEMENT_SPI: &str = "Département Sciences pour l’ingénieur";
const FACULTE_DSPS: &str = "Faculté DSPS (Droit, Sciences politiques et sociales)";
const UFR_SIC: &str = "UFR des Sciences de l’Information et de la Communication";

/// Department rules in priority order; earlier entries win.
static DEPARTEMENT_RULES: &[KeywordRule] = &[
    KeywordRule { all_of: &["droit"], label: "Département Droit" },
    KeywordRule { all_of: &["informatique"], label: "Département Informatique" },
    KeywordRule { all_of: &["mathématique"], label: "Département Mathématiques" },
    KeywordRule { all_of: &["physique"], label: "Département Physique" },
    KeywordRule { all_of: &["chimie"], label: "Département Chimie" },
    KeywordRule { all_of: &["communication"], label: "Département Communication" },
    KeywordRule { all_of: &["sociologie"], label: "Département Sociologie" },
    KeywordRule { all_of: &["science politique"], label: "Département Science Politique" },
    KeywordRule { all_of: &["création numérique"], label: "Département Création Numérique" },
    KeywordRule { all_of: &["sciences pour l’ingénieur"], label: DEPARTEMENT_SPI },
    KeywordRule { all_of: &["electronique"], label: DEPARTEMENT_SPI },
    KeywordRule { all_of: &["signal"], label: DEPARTEMENT_SPI },
    KeywordRule { all_of: &["réseaux"], label: DEPARTEMENT_SPI },
    KeywordRule { all_of: &["galilée"], label: "Département Sup Galilée" },
];

/// Composante rules in priority order.
static COMPOSANTE_RULES: &[KeywordRule] = &[
    KeywordRule { all_of: &["galilée"], label: "Institut Galilée" },
    KeywordRule { all_of: &["dsps"], label: FACULTE_DSPS },
    KeywordRule { all_of: &["droit"], label: FACULTE_DSPS },
    KeywordRule { all_of: &["science politique"], label: FACULTE_DSPS },
    KeywordRule { all_of: &["sociologie"], label: FACULTE_DSPS },
    KeywordRule { all_of: &["iut", "bobigny"], label: "IUT de Bobigny" },
    KeywordRule { all_of: &["iut", "saint-denis"], label: "IUT de Saint-Denis" },
    KeywordRule { all_of: &["iut", "villetaneuse"], label: "IUT de Villetaneuse" },
    KeywordRule { all_of: &["communication"], label: UFR_SIC },
    KeywordRule { all_of: &["sciences de l’information"], label: UFR_SIC },
];

fn first_match(rules: &[KeywordRule], text: &str) -> &'static str {
    let text = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.all_of.iter().all(|keyword| text.contains(keyword)))
        .map(|rule| rule.label)
        .unwrap_or("")
}

/// Infer the department from free text; empty when nothing matches.
pub fn infer_departement(text: &str) -> &'static str {
    first_match(DEPARTEMENT_RULES, text)
}

/// Infer the composante from free text; empty when nothing matches.
pub fn infer_composante(text: &str) -> &'static str {
    first_match(COMPOSANTE_RULES, text)
}

static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)mention\s+([^,]+)").unwrap());

/// Extract the mention from a formation name, the text after the word
/// "mention" up to the next comma.
pub fn infer_mention(formation: &str) -> String {
    let formation = clean_whitespace(formation);
    MENTION_RE
        .captures(&formation)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_whitespace(m.as_str()))
        .unwrap_or_default()
}

static NIVEAU_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(1ère|2ème|3ème|annee|année|l1|l2|l3|m1|m2)").unwrap());

/// Whether a parcours value actually names a year level.
pub fn is_niveau_like(value: &str) -> bool {
    NIVEAU_RE.is_match(&value.to_lowercase())
}

/// Derive the year-level label carried by a role description; empty
/// when the text names none.
pub fn niveau_from_role(role: &str) -> &'static str {
    let r = role.to_lowercase();
    if r.contains("1ère") || r.contains("1ere") || r.contains("l1") {
        if r.contains("n1") {
            return "1ère année N1";
        }
        if r.contains("n2") {
            return "1ère année N2";
        }
        return "1ère année";
    }
    if r.contains("2ème") || r.contains("2eme") || r.contains("l2") {
        return "2ème année";
    }
    if r.contains("3ème") || r.contains("3eme") || r.contains("l3") {
        return "3ème année";
    }
    if r.contains("m1") {
        return "M1";
    }
    if r.contains("m2") {
        return "M2";
    }
    ""
}

const YEAR_MARKERS: &[&str] = &[
    "année", "annee", "1ère", "1ere", "2ème", "2eme", "3ème", "3eme", "m1", "m2", "l1", "l2", "l3",
];

/// Map a free-text role label onto the controlled vocabulary.
///
/// "responsable" labels are tested before director labels, so a label
/// carrying both words classifies as a responsable role. Labels that
/// match nothing mint a `role-<slug>` id with the cleaned label as
/// display text.
pub fn map_role(label: &str, entity_type: EntityType) -> (String, String) {
    let label = clean_whitespace(label);
    let lower = label.to_lowercase();
    if lower.contains("responsable") {
        if YEAR_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return (roles::RESPONSABLE_ANNEE.into(), "Responsable annee".into());
        }
        return (
            roles::RESPONSABLE_FORMATION.into(),
            "Responsable de formation".into(),
        );
    }
    if lower.contains("directeur") || lower.contains("directrice") {
        match entity_type {
            EntityType::Composante => {
                return (roles::DIRECTEUR_COMPOSANTE.into(), "Directeur de composante".into());
            }
            EntityType::Departement => {
                return (roles::DIRECTEUR_DEPARTEMENT.into(), "Chef de departement".into());
            }
            EntityType::Mention => {
                return (roles::DIRECTEUR_MENTION.into(), "Directeur de mention".into());
            }
            EntityType::Parcours => {
                return (roles::DIRECTEUR_SPECIALITE.into(), "Directeur de specialite".into());
            }
            EntityType::Niveau => {}
        }
    }
    let slug = slugify(&label);
    let slug = if slug.is_empty() { "role".to_string() } else { slug };
    (format!("role-{slug}"), label)
}

/// Split a free-form full name into (prenom, nom).
///
/// Upper-case tokens are the family name wherever they appear; without
/// any, the first token is the given name and the rest the family
/// name. A single token serves as both.
pub fn split_full_name(full: &str) -> (String, String) {
    let full = clean_whitespace(full);
    if full.is_empty() {
        return (String::new(), String::new());
    }
    let parts: Vec<&str> = full.split(' ').collect();
    if parts.len() == 1 {
        return (title_case(parts[0]), parts[0].to_uppercase());
    }
    let upper: Vec<&str> = parts.iter().copied().filter(|p| is_upper_token(p)).collect();
    if !upper.is_empty() {
        let nom = upper.join(" ");
        let prenom = parts
            .iter()
            .copied()
            .filter(|p| !is_upper_token(p))
            .collect::<Vec<_>>()
            .join(" ");
        return (title_case(&prenom), nom);
    }
    (title_case(parts[0]), parts[1..].join(" ").to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_departement_priority_order() {
        assert_eq!(
            infer_departement("Licence Informatique"),
            "Département Informatique"
        );
        assert_eq!(
            infer_departement("Licence Mathématiques parcours double"),
            "Département Mathématiques"
        );
        // "droit" is checked before "science politique"
        assert_eq!(
            infer_departement("Droit et science politique"),
            "Département Droit"
        );
        assert_eq!(infer_departement("Traitement du signal"), DEPARTEMENT_SPI);
        assert_eq!(infer_departement("Licence Histoire"), "");
    }

    #[test]
    fn test_infer_composante_conjunctions() {
        assert_eq!(infer_composante("Sup Galilée"), "Institut Galilée");
        assert_eq!(infer_composante("IUT de Bobigny"), "IUT de Bobigny");
        assert_eq!(infer_composante("iut de villetaneuse"), "IUT de Villetaneuse");
        // "iut" alone matches no composante
        assert_eq!(infer_composante("iut"), "");
        assert_eq!(infer_composante("Licence Sociologie"), FACULTE_DSPS);
    }

    #[test]
    fn test_infer_mention() {
        assert_eq!(
            infer_mention("Licence mention Informatique, parcours classique"),
            "Informatique"
        );
        assert_eq!(infer_mention("Licence   Mention   Chimie"), "Chimie");
        assert_eq!(infer_mention("Licence Informatique"), "");
    }

    #[test]
    fn test_is_niveau_like() {
        assert!(is_niveau_like("2ème année"));
        assert!(is_niveau_like("L3"));
        assert!(is_niveau_like("M1 apprentissage"));
        assert!(!is_niveau_like("Cybersécurité"));
    }

    #[test]
    fn test_niveau_from_role() {
        assert_eq!(niveau_from_role("Responsable 1ère année N2"), "1ère année N2");
        assert_eq!(niveau_from_role("Responsable 1ere annee"), "1ère année");
        assert_eq!(niveau_from_role("Responsable 2ème année"), "2ème année");
        assert_eq!(niveau_from_role("responsable l3"), "3ème année");
        assert_eq!(niveau_from_role("Responsable M2"), "M2");
        assert_eq!(niveau_from_role("Directeur"), "");
    }

    #[test]
    fn test_map_role_responsable_before_directeur() {
        assert_eq!(
            map_role("Responsable 2ème année", EntityType::Niveau).0,
            roles::RESPONSABLE_ANNEE
        );
        assert_eq!(
            map_role("Responsable de la licence", EntityType::Niveau).0,
            roles::RESPONSABLE_FORMATION
        );
        // a label with both words resolves as a responsable role
        assert_eq!(
            map_role("Responsable et directeur des études", EntityType::Mention).0,
            roles::RESPONSABLE_FORMATION
        );
    }

    #[test]
    fn test_map_role_directors_branch_on_entity_type() {
        assert_eq!(
            map_role("Directeur", EntityType::Composante).0,
            roles::DIRECTEUR_COMPOSANTE
        );
        assert_eq!(
            map_role("Directrice", EntityType::Departement).0,
            roles::DIRECTEUR_DEPARTEMENT
        );
        assert_eq!(
            map_role("Directeur", EntityType::Mention).0,
            roles::DIRECTEUR_MENTION
        );
        assert_eq!(
            map_role("Directeur", EntityType::Parcours).0,
            roles::DIRECTEUR_SPECIALITE
        );
        // no director role exists at year level, so the label mints
        assert_eq!(map_role("Directeur", EntityType::Niveau).0, "role-directeur");
    }

    #[test]
    fn test_map_role_mints_unknown_labels() {
        let (id, label) = map_role("Référent handicap", EntityType::Composante);
        assert_eq!(id, "role-referent-handicap");
        assert_eq!(label, "Référent handicap");
    }

    #[test]
    fn test_split_full_name_upper_tokens_win() {
        assert_eq!(split_full_name("Jean DUPONT"), ("Jean".into(), "DUPONT".into()));
        assert_eq!(split_full_name("DUPONT Jean"), ("Jean".into(), "DUPONT".into()));
        assert_eq!(
            split_full_name("DE LA TOUR Marie"),
            ("Marie".into(), "DE LA TOUR".into())
        );
    }

    #[test]
    fn test_split_full_name_fallbacks() {
        assert_eq!(
            split_full_name("jean dupont"),
            ("Jean".into(), "DUPONT".into())
        );
        assert_eq!(split_full_name("martin"), ("Martin".into(), "MARTIN".into()));
        assert_eq!(split_full_name("  "), (String::new(), String::new()));
    }
}
