//! roster-cli: normalizes the two responsibility roster sources (a
//! sectioned workbook and a flat CSV) into one deterministic batch of
//! SQL seed statements.

mod cli;
mod config;
mod emit;
mod fixtures;
mod graph;
mod infer;
mod ingest;
mod sources;
mod text;
mod xlsx;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::graph::BuildContext;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let csv_path = Path::new(config::CSV_PATH);
    let records = sources::formations::read_records(csv_path)?;
    info!("Read {} CSV records from {}", records.len(), csv_path.display());

    let xlsx_path = Path::new(config::XLSX_PATH);
    let entries = if xlsx_path.exists() {
        let rows = xlsx::read_rows(xlsx_path)?;
        let entries = sources::spreadsheet::read_entries(&rows);
        info!("Read {} workbook entries from {}", entries.len(), xlsx_path.display());
        entries
    } else {
        info!("No workbook at {}, continuing without it", xlsx_path.display());
        Vec::new()
    };

    let mut ctx = BuildContext::new(config::YEAR_ID, config::date_debut());
    ingest::ingest_csv_records(&mut ctx, &records);
    ingest::ingest_sheet_entries(&mut ctx, &entries);
    fixtures::add_role_fixtures(&mut ctx);

    let sql = emit::render_sql(&ctx);
    let out_path = Path::new(config::OUT_SQL);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    fs::write(out_path, sql)
        .with_context(|| format!("Failed to write seed document {}", out_path.display()))?;

    println!("Wrote {}", out_path.display());
    println!("Entities: {}", ctx.entities().len());
    println!("Users: {}", ctx.people().len());
    println!("Affectations: {}", ctx.assignments().len());
    println!("Contact roles: {}", ctx.contacts().len());
    println!("Roles added: {}", ctx.new_role_count());

    Ok(())
}
