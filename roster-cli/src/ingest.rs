//! Per-source ingestion: raw records folded into the build context.
//!
//! The CSV is ingested first, then the workbook entries, so identities
//! merge across both sources with CSV-first precedence on contact
//! fields.

use log::debug;

use crate::graph::{BuildContext, EntityChain, EntityType};
use crate::infer;
use crate::sources::formations::CsvRecord;
use crate::sources::spreadsheet::SheetEntry;
use crate::text::clean_whitespace;

/// Default track when a formation names none.
const DEFAULT_PARCOURS: &str = "Tronc commun";

/// The workbook only describes this composante.
const WORKBOOK_COMPOSANTE: &str = "Institut Galilée";

fn opt(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

/// Fold the formations CSV into the graph.
pub fn ingest_csv_records(ctx: &mut BuildContext, records: &[CsvRecord]) {
    for record in records {
        let formation_nom = clean_whitespace(&record.formation_nom);
        let mut composante = clean_whitespace(&record.composante);
        let mut departement = clean_whitespace(&record.departement);
        let mut mention = clean_whitespace(&record.mention);
        let parcours = clean_whitespace(&record.parcours);
        let role_exact = clean_whitespace(&record.role_exact);
        let email = clean_whitespace(&record.email);
        let telephone = clean_whitespace(&record.telephone);
        let bureau = clean_whitespace(&record.bureau);

        if composante.is_empty() {
            composante =
                infer::infer_composante(&format!("{formation_nom} {mention} {departement}"))
                    .to_string();
        }
        if departement.is_empty() {
            departement =
                infer::infer_departement(&format!("{formation_nom} {mention} {composante}"))
                    .to_string();
        }
        if mention.is_empty() {
            mention = infer::infer_mention(&formation_nom);
        }

        let mut niveau = String::new();
        let parcours_name = if !parcours.is_empty() {
            if infer::is_niveau_like(&parcours) {
                niveau = parcours;
                DEFAULT_PARCOURS.to_string()
            } else {
                parcours
            }
        } else if !mention.is_empty() || !departement.is_empty() || !composante.is_empty() {
            DEFAULT_PARCOURS.to_string()
        } else {
            String::new()
        };
        if niveau.is_empty() {
            niveau = infer::niveau_from_role(&role_exact).to_string();
        }

        let chain = EntityChain {
            composante,
            departement,
            mention,
            parcours: parcours_name,
            niveau,
        };
        let Some(entity_id) = ctx.build_chain(&chain) else {
            debug!("Dropping CSV record with no resolvable entity: {formation_nom:?}");
            continue;
        };

        let role_label = if role_exact.is_empty() {
            "Responsable"
        } else {
            role_exact.as_str()
        };
        let (role_id, role_display) = infer::map_role(role_label, EntityType::Niveau);
        ctx.register_role(&role_id, &role_display);

        let mut prenom = clean_whitespace(&record.responsable_prenom);
        let mut nom = clean_whitespace(&record.responsable_nom);
        if prenom.is_empty() && nom.is_empty() {
            continue;
        }
        if nom.is_empty() {
            (prenom, nom) = infer::split_full_name(&prenom);
        }
        let person_id =
            ctx.get_or_create_person(&prenom, &nom, opt(&email), opt(&telephone), opt(&bureau));

        ctx.record_assignment(person_id, &role_id, entity_id);
        if !email.is_empty() {
            ctx.record_contact(person_id, &role_id, entity_id, &email);
        }
    }
}

/// Fold the workbook's section tables into the graph.
pub fn ingest_sheet_entries(ctx: &mut BuildContext, entries: &[SheetEntry]) {
    for entry in entries {
        let section = clean_whitespace(&entry.section);
        let fonction = clean_whitespace(&entry.fonction);
        let full_name = clean_whitespace(&entry.nom);
        let email = clean_whitespace(&entry.email);
        let telephone = clean_whitespace(&entry.telephone);
        let bureau = clean_whitespace(&entry.bureau);

        let mut chain = EntityChain {
            composante: WORKBOOK_COMPOSANTE.to_string(),
            ..Default::default()
        };
        let section_lower = section.to_lowercase();
        let composante_level = section.eq_ignore_ascii_case("general")
            || section_lower.starts_with("secrétariat")
            || section_lower.starts_with("secretariat");
        if !composante_level {
            // any other section names a mention
            chain.mention = section;
            chain.departement = infer::infer_departement(&chain.mention).to_string();
            chain.parcours = DEFAULT_PARCOURS.to_string();
            chain.niveau = infer::niveau_from_role(&fonction).to_string();
        }

        let Some(entity_id) = ctx.build_chain(&chain) else {
            continue;
        };

        let role_entity_type = if !chain.niveau.is_empty() {
            EntityType::Niveau
        } else if !chain.mention.is_empty() {
            EntityType::Mention
        } else {
            EntityType::Composante
        };
        let role_label = if fonction.is_empty() {
            "Responsable"
        } else {
            fonction.as_str()
        };
        let (role_id, role_display) = infer::map_role(role_label, role_entity_type);
        ctx.register_role(&role_id, &role_display);

        let (prenom, nom) = infer::split_full_name(&full_name);
        let person_id =
            ctx.get_or_create_person(&prenom, &nom, opt(&email), opt(&telephone), opt(&bureau));
        ctx.record_assignment(person_id, &role_id, entity_id);
        if !email.is_empty() {
            ctx.record_contact(person_id, &role_id, entity_id, &email);
        }
    }
}
