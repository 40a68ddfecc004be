//! Process-wide cache of project properties.
//!
//! `ProjectPropertiesStore` owns the mapping from project identity to its
//! `ProjectProperties`. Entries are created on first `load` from the persisted
//! document (or defaults), reconciled on every `load`, written by `store` and
//! `update`, and evicted by `remove`.
//!
//! Locking: the map is behind one mutex that is also held while a missing
//! entry is populated, so a project never gets two instances. Every entry has
//! its own mutex, held across reconciliation and persistence of that project.
//! `store` and `update` keep the map lock until the write is published, so an
//! evicted project is never re-read from an older document than the one being
//! written. Lock order is map then entry; the map lock is never acquired while
//! an entry lock is held.

use crate::catalog::{CatalogLoader, FsCatalogLoader};
use crate::codec;
use crate::error::Result;
use crate::global::GlobalRuleSet;
use crate::merge::merge_files;
use crate::models::{ProjectId, ProjectProperties, RuleSet};
use crate::resolve::{PathListResolver, RuleSetFileResolver};
use crate::storage::{Capability, FsStorage, MarkerFileCapability, PropertiesStorage};
use crate::sync::synchronize;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handle to the single cached instance of a project's properties.
pub type SharedProperties = Arc<Mutex<ProjectProperties>>;

pub struct ProjectPropertiesStore {
    storage: Arc<dyn PropertiesStorage>,
    loader: Arc<dyn CatalogLoader>,
    global: Arc<dyn GlobalRuleSet>,
    capability: Arc<dyn Capability>,
    resolver: Arc<dyn RuleSetFileResolver>,
    cache: Mutex<HashMap<ProjectId, SharedProperties>>,
}

impl ProjectPropertiesStore {
    pub fn new(
        storage: Arc<dyn PropertiesStorage>,
        loader: Arc<dyn CatalogLoader>,
        global: Arc<dyn GlobalRuleSet>,
        capability: Arc<dyn Capability>,
    ) -> Self {
        Self {
            storage,
            loader,
            global,
            capability,
            resolver: Arc::new(PathListResolver),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Store backed by the filesystem with default file names.
    pub fn on_disk(global: Arc<dyn GlobalRuleSet>) -> Self {
        Self::new(
            Arc::new(FsStorage::default()),
            Arc::new(FsCatalogLoader),
            global,
            Arc::new(MarkerFileCapability::default()),
        )
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn RuleSetFileResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Return the cached properties of `project`, creating them on first use,
    /// and bring the rule-set up to date.
    ///
    /// The caller must not hold the lock of the project's cached handle.
    pub fn load(&self, project: &ProjectId) -> Result<SharedProperties> {
        debug!("Loading project properties for project {}", project.name());
        let entry = {
            let mut cache = self.cache.lock();
            self.entry(&mut cache, project)?
        };
        self.materialize(&mut entry.lock());
        Ok(entry)
    }

    /// Persist `properties` and make them the cached instance's value.
    ///
    /// The caller must not hold the lock of the project's cached handle.
    pub fn store(&self, properties: ProjectProperties) -> Result<SharedProperties> {
        let project = properties.project().clone();
        debug!("Storing project properties for project {}", project.name());
        // held until the cached value matches the written document
        let mut cache = self.cache.lock();
        if let Some(entry) = cache.get(&project).map(Arc::clone) {
            let mut guard = entry.lock();
            self.persist(&properties)?;
            *guard = properties;
            drop(guard);
            return Ok(entry);
        }
        self.persist(&properties)?;
        let entry = Arc::new(Mutex::new(properties));
        cache.insert(project, Arc::clone(&entry));
        Ok(entry)
    }

    /// Load, apply `f` to a copy, persist it, then publish it to the cache.
    /// When persisting fails the cached value is left unchanged.
    ///
    /// The caller must not hold the lock of the project's cached handle, and
    /// `f` must not call back into the store.
    pub fn update<F>(&self, project: &ProjectId, f: F) -> Result<SharedProperties>
    where
        F: FnOnce(&mut ProjectProperties),
    {
        debug!("Updating project properties for project {}", project.name());
        let mut cache = self.cache.lock();
        let entry = self.entry(&mut cache, project)?;
        {
            let mut guard = entry.lock();
            self.materialize(&mut guard);
            let mut next = guard.clone();
            f(&mut next);
            self.persist(&next)?;
            *guard = next;
        }
        drop(cache);
        Ok(entry)
    }

    fn entry(
        &self,
        cache: &mut HashMap<ProjectId, SharedProperties>,
        project: &ProjectId,
    ) -> Result<SharedProperties> {
        if let Some(entry) = cache.get(project) {
            return Ok(Arc::clone(entry));
        }
        debug!("Creating new project properties for {}", project.name());
        let props = self.read_properties(project)?;
        let entry = Arc::new(Mutex::new(props));
        cache.insert(project.clone(), Arc::clone(&entry));
        Ok(entry)
    }

    /// Evict `project` from the cache. The persisted document is kept.
    pub fn remove(&self, project: &ProjectId) -> bool {
        self.cache.lock().remove(project).is_some()
    }

    pub fn is_cached(&self, project: &ProjectId) -> bool {
        self.cache.lock().contains_key(project)
    }

    pub fn cached_projects(&self) -> Vec<ProjectId> {
        let mut ids: Vec<ProjectId> = self.cache.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn read_properties(&self, project: &ProjectId) -> Result<ProjectProperties> {
        let decoded = match self.storage.read(project)? {
            Some(bytes) => codec::decode(project, &String::from_utf8(bytes)?)?,
            None => None,
        };
        let mut props = match decoded {
            Some(mut props) => {
                if !props.is_rule_set_stored_in_project() {
                    let specs = codec::decoded_specs(&props);
                    let global = self.global.rule_set();
                    props.set_project_rule_set(RuleSet::from_specs(&specs, &global));
                }
                debug!("Project properties loaded");
                props
            }
            None => {
                info!("Project properties not found. Use default.");
                let mut props = ProjectProperties::new(project.clone());
                props.set_project_rule_set(self.global.rule_set());
                props
            }
        };
        props.set_pmd_enabled(self.capability.is_enabled(project));
        Ok(props)
    }

    fn materialize(&self, props: &mut ProjectProperties) {
        if props.is_rule_set_stored_in_project() {
            self.load_rule_set_from_project(props);
        } else {
            debug!("Synchronizing the project ruleset with the global ruleset");
            let global = self.global.rule_set();
            let (rule_set, changed) = synchronize(props.project_rule_set(), &global);
            if changed {
                props.set_project_rule_set(rule_set);
            }
            let need = props.is_need_rebuild() || changed;
            props.set_need_rebuild(need);
            debug!(
                "Ruleset for project {} is now synchronized. {}",
                props.project().name(),
                if changed {
                    "Ruleset has changed"
                } else {
                    "Ruleset has not changed"
                }
            );
        }
    }

    fn load_rule_set_from_project(&self, props: &mut ProjectProperties) {
        if !props.is_need_rebuild() {
            return;
        }
        let files = self.resolver.resolve(props.project(), props.rule_set_file());
        if files.is_empty() {
            debug!(
                "No rule set file configured for project {}",
                props.project().name()
            );
            return;
        }
        debug!(
            "Loading ruleset from project ruleset file: {}",
            props.rule_set_file()
        );
        let outcome = merge_files(self.loader.as_ref(), &files);
        match outcome.rule_set {
            Some(mut rule_set) => {
                // files without patterns keep the ones the project already has
                let current = props.project_rule_set();
                if rule_set.include_patterns.is_empty() && rule_set.exclude_patterns.is_empty() {
                    rule_set.include_patterns = current.include_patterns.clone();
                    rule_set.exclude_patterns = current.exclude_patterns.clone();
                }
                props.set_project_rule_set(rule_set);
                props.set_need_rebuild(false);
            }
            None => warn!(
                "Project RuleSet cannot be loaded for project {} using RuleSet file name {}. Using the rules from properties.",
                props.project().name(),
                props.rule_set_file()
            ),
        }
    }

    fn persist(&self, props: &ProjectProperties) -> Result<()> {
        if let Err(e) = self
            .capability
            .set_enabled(props.project(), props.is_pmd_enabled())
        {
            warn!(
                "Cannot toggle analysis for project {}: {}",
                props.project().name(),
                e
            );
        }
        let text = codec::encode(props)?;
        self.storage.write(props.project(), text.as_bytes())
    }
}
