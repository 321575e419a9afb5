use anyhow::{bail, Context, Result};
use movies_db_loader::{
    cli::{Cli, Commands},
    config::ConnectionConfig,
    report::write_json_report,
    schema::{load_overrides_file, merge_overrides, DateOverride, DependencyResolver},
    source::resolve_input,
    verify::verify_schema,
    writer::{rebuild, rebuild_with, DryRunDatabase, LoadOptions, PgDatabase, RebuildSummary},
    ConsoleUi, Ui, UiApp,
};
use std::path::PathBuf;
use std::time::Instant;

/// Built-in corrections plus any from `--overrides`
fn effective_overrides(path: Option<PathBuf>) -> Result<Vec<DateOverride>> {
    let extra = match path {
        Some(path) => load_overrides_file(&path)
            .with_context(|| format!("Failed to read overrides from {:?}", path))?,
        None => Vec::new(),
    };
    Ok(merge_overrides(extra)?)
}

fn load_options(schema: String, overrides: Option<PathBuf>) -> Result<LoadOptions> {
    Ok(LoadOptions {
        schema,
        overrides: effective_overrides(overrides)?,
    })
}

fn summary_line(summary: &RebuildSummary) -> String {
    format!(
        "{} tables, {} rows, {} foreign keys in schema {}",
        summary.tables.len(),
        summary.total_rows(),
        summary.foreign_keys,
        summary.schema
    )
}

fn print_summary(summary: &RebuildSummary) {
    println!("\n{}", summary_line(summary));

    let unresolved = summary.unresolved_dates();
    if !unresolved.is_empty() {
        println!("{} out-of-range dates loaded as NULL:", unresolved.len());
        for date in unresolved {
            println!("  {}.{} row {}: {}", date.table, date.column, date.row_id, date.value);
        }
    }
    for ov in &summary.overrides_missing {
        println!("Override skipped, no row: {} {} {}", ov.table, ov.id, ov.column);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Rebuild {
            input,
            connection,
            schema,
            overrides,
            report,
            cache_dir,
            force,
            tui,
            verbose,
        } => {
            let start = Instant::now();
            let options = load_options(schema, overrides)?;
            let config = ConnectionConfig::from(connection);

            let summary = if tui {
                let mut ui = UiApp::new(config.describe())?;
                let result = resolve_input(&input, cache_dir, force, &mut ui)
                    .and_then(|dir| rebuild(&dir, &config, &options, &mut ui));
                match result {
                    Ok(summary) => {
                        ui.finish(&summary_line(&summary))?;
                        summary
                    }
                    Err(e) => {
                        ui.restore()?;
                        return Err(anyhow::Error::new(e).context("Rebuild failed"));
                    }
                }
            } else {
                let mut ui = ConsoleUi::new().verbose(verbose);
                let input_dir = resolve_input(&input, cache_dir, force, &mut ui)?;
                rebuild(&input_dir, &config, &options, &mut ui).context("Rebuild failed")?
            };

            if let Some(path) = report {
                write_json_report(&path, &summary)?;
                println!("Report written to {:?}", path);
            }

            print_summary(&summary);
            println!("Finished in {:.1}s", start.elapsed().as_secs_f64());
        }

        Commands::Plan {
            input,
            schema,
            overrides,
            sql,
            cache_dir,
            verbose,
        } => {
            let options = load_options(schema, overrides)?;
            let mut ui = ConsoleUi::new().verbose(verbose);
            let input_dir = resolve_input(&input, cache_dir, false, &mut ui)?;

            let mut db = DryRunDatabase::new();
            let summary = rebuild_with(&mut db, &input_dir, &options, &mut ui)
                .context("Input would not load")?;

            if sql {
                println!();
                for statement in db.statements() {
                    println!("{};", statement);
                }
            }
            print_summary(&summary);
            println!("{} statements, nothing written", db.statements().len());
        }

        Commands::Verify {
            input,
            connection,
            schema,
            overrides,
            cache_dir,
        } => {
            let options = load_options(schema, overrides)?;
            let config = ConnectionConfig::from(connection);
            let mut ui = ConsoleUi::new();
            let input_dir = resolve_input(&input, cache_dir, false, &mut ui)?;

            ui.set_info(config.describe());
            let mut db = PgDatabase::connect(&config)?;
            let report = verify_schema(&mut db, &input_dir, &options, &mut ui)?;
            db.close()?;

            let failed = report.failures().count();
            println!("\n{} checks, {} failed", report.checks.len(), failed);
            if !report.passed() {
                bail!("schema {} does not match its source data", options.schema);
            }
        }

        Commands::ListTables => {
            let resolver = DependencyResolver::new();
            println!("Tables in load order:\n");
            for table in resolver.load_order()? {
                println!("  {} ({})", table.name, table.source_file);
                println!("      primary key: {}", table.primary_key.join(", "));
                for fk in table.foreign_keys {
                    println!("      {} -> {}", fk.column, fk.references_table);
                }
                let dependents = resolver.dependents(table.name);
                if !dependents.is_empty() {
                    println!("      referenced by: {}", dependents.join(", "));
                }
            }
        }

        Commands::Overrides { overrides } => {
            println!("Date corrections applied after loading:\n");
            for ov in effective_overrides(overrides)? {
                println!("  {}.{} where id = {}: {}", ov.table, ov.column, ov.id, ov.value);
            }
        }
    }

    Ok(())
}
