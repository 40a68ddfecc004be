//! pmdconf CLI binary entry point.
//! Delegates to library modules and prints results.

use clap::Parser;
use pmdconf::catalog::FsCatalogLoader;
use pmdconf::cli::{Cli, Commands};
use pmdconf::config::{self, Effective};
use pmdconf::error::PropertiesError;
use pmdconf::models::{ProjectId, SyncReport};
use pmdconf::storage::{FsStorage, MarkerFileCapability};
use pmdconf::store::ProjectPropertiesStore;
use pmdconf::{merge, output, utils};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Show {
            root,
            project,
            output,
        } => {
            let eff = setup(root.as_deref(), output.as_deref(), cli.log.as_deref());
            let store = open_store(&eff);
            let id = project_id(project.as_deref());
            match store.load(&id) {
                Ok(entry) => output::print_properties(&entry.lock(), &eff.output),
                Err(e) => fail(e),
            }
        }
        Commands::Set {
            root,
            project,
            output,
            enable,
            disable,
            stored_in_project,
            ruleset_file,
            include_derived,
            violations_as_errors,
            full_build,
            working_set,
            clear_working_set,
        } => {
            let eff = setup(root.as_deref(), output.as_deref(), cli.log.as_deref());
            let store = open_store(&eff);
            let id = project_id(project.as_deref());
            let res = store.update(&id, |p| {
                if enable {
                    p.set_pmd_enabled(true);
                }
                if disable {
                    p.set_pmd_enabled(false);
                }
                if let Some(file) = ruleset_file {
                    p.set_rule_set_file(file);
                }
                if let Some(stored) = stored_in_project {
                    p.set_rule_set_stored_in_project(stored);
                }
                if let Some(v) = include_derived {
                    p.set_include_derived_files(v);
                }
                if let Some(v) = violations_as_errors {
                    p.set_violations_as_errors(v);
                }
                if let Some(v) = full_build {
                    p.set_full_build_enabled(v);
                }
                if working_set.is_some() {
                    p.set_working_set_name(working_set);
                } else if clear_working_set {
                    p.set_working_set_name(None);
                }
            });
            // Reload so a mode or file change is reconciled before printing
            match res.and_then(|_| store.load(&id)) {
                Ok(entry) => output::print_properties(&entry.lock(), &eff.output),
                Err(e) => fail(e),
            }
        }
        Commands::Sync {
            root,
            project,
            output,
            write,
        } => {
            let eff = setup(root.as_deref(), output.as_deref(), cli.log.as_deref());
            let store = open_store(&eff);
            let id = project_id(project.as_deref());
            let entry = match store.load(&id) {
                Ok(e) => e,
                Err(e) => fail(e),
            };
            let snapshot = entry.lock().clone();
            let report = SyncReport {
                project: id.clone(),
                stored_in_project: snapshot.is_rule_set_stored_in_project(),
                rules: snapshot.project_rule_set().len(),
                need_rebuild: snapshot.is_need_rebuild(),
            };
            if write {
                if let Err(e) = store.store(snapshot) {
                    fail(e);
                }
                let written = FsStorage::new(eff.properties_file.clone()).path_for(&id);
                eprintln!(
                    "{} wrote {}",
                    utils::info_prefix(),
                    utils::rel_display(&written, &eff.root)
                );
            }
            output::print_sync(&report, write, &eff.output);
        }
        Commands::Merge {
            root,
            output,
            files,
        } => {
            let eff = setup(root.as_deref(), output.as_deref(), cli.log.as_deref());
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            let paths: Vec<PathBuf> = files.iter().map(|f| cwd.join(f)).collect();
            let outcome = merge::merge_files(&FsCatalogLoader, &paths);
            output::print_merge(
                outcome.rule_set.as_ref(),
                &outcome.skipped,
                &cwd,
                &eff.output,
            );
            if outcome.rule_set.is_none() {
                std::process::exit(1);
            }
        }
    }
}

/// Resolve the effective config and install the log subscriber.
fn setup(root: Option<&str>, output: Option<&str>, log: Option<&str>) -> Effective {
    let eff = config::resolve_effective(root, output, log);
    init_tracing(&eff.log);
    if !eff.config_found && eff.output != "json" {
        eprintln!(
            "{} {}",
            utils::note_prefix(),
            "No pmdconf.toml found; using defaults."
        );
    }
    eff
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pmdconf={}", level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn open_store(eff: &Effective) -> ProjectPropertiesStore {
    ProjectPropertiesStore::new(
        Arc::new(FsStorage::new(eff.properties_file.clone())),
        Arc::new(FsCatalogLoader),
        Arc::new(eff.global_rule_set()),
        Arc::new(MarkerFileCapability::new(eff.capability_file.clone())),
    )
}

fn project_id(project: Option<&str>) -> ProjectId {
    let p = PathBuf::from(project.unwrap_or("."));
    ProjectId::new(std::fs::canonicalize(&p).unwrap_or(p))
}

fn fail(e: PropertiesError) -> ! {
    eprintln!("{} {}", utils::error_prefix(), e);
    std::process::exit(2);
}
