//! The parameter store of one effect instance.
//!
//! [`ParameterStore::instantiate`] turns the plugin's descriptor set into
//! parameters, in declaration order, and wires up group nesting. After that
//! the set of parameters is fixed; only their values, keyframes and flags
//! change.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use knobkit_core::{Bounds, ManualClock, ParameterDescriptor, ParameterStore, StoreConfig, Value};
//!
//! let clock = Arc::new(ManualClock::new(0.0));
//! let store = ParameterStore::instantiate(
//!     vec![
//!         ParameterDescriptor::group("controls").with_tab(),
//!         ParameterDescriptor::double("size", 5.0, Bounds::new(0.0, 100.0)).with_parent("controls"),
//!     ],
//!     clock.clone(),
//!     StoreConfig::new(),
//! )?;
//!
//! store.lookup("size")?.set_at(0, 10.0, Value::Double(20.0))?;
//! clock.set_time(10.0);
//! assert_eq!(store.lookup("size")?.get(0)?, Value::Double(20.0));
//! ```
//!
//! # Thread Safety
//!
//! `ParameterStore` is `Send + Sync`. Values, keyframes and flags may be read
//! and written through `&ParameterStore` from any thread.

use std::collections::HashMap;
use std::sync::Arc;

use knobkit_utils::name_id;

use crate::clock::EvaluationClock;
use crate::config::StoreConfig;
use crate::descriptor::ParameterDescriptor;
use crate::error::{ParameterError, ParameterResult};
use crate::parameter::Parameter;
use crate::snapshot::ParameterSnapshot;
use crate::tab::TabContainer;
use crate::types::{ParameterId, Time};

/// Every parameter of one effect instance, addressable by name or id.
pub struct ParameterStore {
    /// Declaration order.
    parameters: Vec<Parameter>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<ParameterId, usize>,
    tabs: Option<Arc<TabContainer>>,
    clock: Arc<dyn EvaluationClock>,
    config: StoreConfig,
}

impl ParameterStore {
    /// Build the parameters of an effect instance from its descriptors.
    ///
    /// Fails if a name is empty, appears twice, or hashes to the id of
    /// another name. Malformed bounds and bad defaults are repaired and
    /// logged, never fatal. A parameter whose declared parent is unknown or
    /// not a group stays top-level.
    pub fn instantiate<I, D>(
        descriptors: I,
        clock: Arc<dyn EvaluationClock>,
        config: StoreConfig,
    ) -> ParameterResult<Self>
    where
        I: IntoIterator<Item = D>,
        D: Into<Arc<ParameterDescriptor>>,
    {
        let descriptors: Vec<Arc<ParameterDescriptor>> =
            descriptors.into_iter().map(Into::into).collect();

        let mut by_name = HashMap::with_capacity(descriptors.len());
        let mut by_id: HashMap<ParameterId, usize> = HashMap::with_capacity(descriptors.len());
        let mut ids = Vec::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            let name = descriptor.name();
            let id = name_id(name).ok_or(ParameterError::EmptyName)?;
            if by_name.insert(name.to_string(), index).is_some() {
                return Err(ParameterError::DuplicateName(name.to_string()));
            }
            if let Some(&first) = by_id.get(&id) {
                return Err(ParameterError::IdCollision {
                    first: descriptors[first].name().to_string(),
                    second: name.to_string(),
                    id,
                });
            }
            by_id.insert(id, index);
            ids.push(id);
        }

        let mut tabs = None;
        let mut parameters: Vec<Parameter> = descriptors
            .iter()
            .zip(&ids)
            .map(|(descriptor, &id)| {
                Parameter::new(descriptor.clone(), id, clock.clone(), &config, &mut tabs)
            })
            .collect();

        attach_children(&mut parameters, &descriptors, &by_name, &by_id);

        log::debug!(
            "Instantiated {} parameters ({})",
            parameters.len(),
            match &tabs {
                Some(t) => format!("tab container with {} pages", t.page_count()),
                None => "no tab container".to_string(),
            }
        );

        Ok(Self {
            parameters,
            by_name,
            by_id,
            tabs,
            clock,
            config,
        })
    }

    // === Lookup ===

    /// Parameter by name.
    pub fn lookup(&self, name: &str) -> ParameterResult<&Parameter> {
        self.by_name
            .get(name)
            .map(|&index| &self.parameters[index])
            .ok_or_else(|| ParameterError::NotFound(name.to_string()))
    }

    /// Parameter by id.
    pub fn lookup_id(&self, id: ParameterId) -> Option<&Parameter> {
        self.by_id.get(&id).map(|&index| &self.parameters[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    // === Traversal ===

    /// Every parameter in declaration order.
    ///
    /// The iterator is lazy and can be cloned to restart the traversal.
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    /// Visit every parameter in declaration order.
    pub fn for_each_parameter<F>(&self, mut visitor: F)
    where
        F: FnMut(&Parameter),
    {
        for parameter in &self.parameters {
            visitor(parameter);
        }
    }

    /// Children of a group in declaration order. Empty for non-groups.
    pub fn children(&self, name: &str) -> ParameterResult<Vec<&Parameter>> {
        let group = self.lookup(name)?;
        Ok(group
            .children()
            .into_iter()
            .filter_map(|id| self.lookup_id(id))
            .collect())
    }

    /// Parameters not attached to any group, in declaration order.
    pub fn top_level(&self) -> Vec<&Parameter> {
        self.parameters.iter().filter(|p| p.parent().is_none()).collect()
    }

    /// The effect's shared tab container, if any group is a tab.
    pub fn tab_container(&self) -> Option<&Arc<TabContainer>> {
        self.tabs.as_ref()
    }

    /// True if the effect declares an output file path, making it an
    /// output (writer) node.
    pub fn is_output(&self) -> bool {
        self.parameters.iter().any(Parameter::is_output_path)
    }

    // === Time ===

    pub fn clock(&self) -> &Arc<dyn EvaluationClock> {
        &self.clock
    }

    /// Current evaluation time.
    pub fn now(&self) -> Time {
        self.clock.time()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // === Persistence ===

    /// State of every parameter in declaration order.
    pub fn snapshot(&self) -> Vec<ParameterSnapshot> {
        self.parameters.iter().map(Parameter::snapshot).collect()
    }

    /// Restore parameters from snapshots, matched by name.
    ///
    /// Each parameter is restored all-or-nothing. Unknown names and invalid
    /// snapshots are skipped with a warning. Returns the number of
    /// parameters restored.
    pub fn restore(&self, snapshots: &[ParameterSnapshot]) -> usize {
        let mut restored = 0;
        for snapshot in snapshots {
            let parameter = match self.lookup(&snapshot.name) {
                Ok(p) => p,
                Err(err) => {
                    log::warn!("Skipping snapshot: {}", err);
                    continue;
                }
            };
            match parameter.restore(snapshot) {
                Ok(()) => restored += 1,
                Err(err) => log::warn!("Skipping snapshot of '{}': {}", snapshot.name, err),
            }
        }
        restored
    }
}

/// Attach each parameter to its declared parent group.
fn attach_children(
    parameters: &mut [Parameter],
    descriptors: &[Arc<ParameterDescriptor>],
    by_name: &HashMap<String, usize>,
    by_id: &HashMap<ParameterId, usize>,
) {
    for (child, descriptor) in descriptors.iter().enumerate() {
        let Some(parent_name) = descriptor.parent() else {
            continue;
        };
        let Some(&parent) = by_name.get(parent_name) else {
            log::warn!(
                "Parameter '{}': unknown parent '{}', kept at top level",
                descriptor.name(),
                parent_name
            );
            continue;
        };
        if !parameters[parent].is_group() {
            log::warn!(
                "Parameter '{}': parent '{}' is not a group, kept at top level",
                descriptor.name(),
                parent_name
            );
            continue;
        }
        if is_ancestor(parameters, by_id, child, parent) {
            log::warn!(
                "Parameter '{}': parent '{}' would form a cycle, kept at top level",
                descriptor.name(),
                parent_name
            );
            continue;
        }

        let child_id = parameters[child].id();
        let parent_id = parameters[parent].id();
        if parameters[parent].attach_child(child_id) {
            parameters[child].set_parent(parent_id);
        }
    }
}

/// True if `candidate` is `of` itself or one of its ancestors.
fn is_ancestor(
    parameters: &[Parameter],
    by_id: &HashMap<ParameterId, usize>,
    candidate: usize,
    of: usize,
) -> bool {
    let candidate_id = parameters[candidate].id();
    let mut current = Some(parameters[of].id());
    // The parent chain is acyclic, so it ends within `len` steps.
    for _ in 0..=parameters.len() {
        match current {
            Some(id) if id == candidate_id => return true,
            Some(id) => {
                current = by_id.get(&id).and_then(|&index| parameters[index].parent());
            }
            None => return false,
        }
    }
    false
}

impl std::fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterStore")
            .field("parameters", &self.parameters)
            .field("tabs", &self.tabs.as_ref().map(|t| t.page_count()))
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Bounds;
    use crate::clock::ManualClock;
    use crate::descriptor::{ParameterKind, StringMode};
    use crate::snapshot::CellSnapshot;
    use crate::tab::Container;
    use crate::value::Value;

    fn effect() -> Vec<ParameterDescriptor> {
        vec![
            ParameterDescriptor::group("controls").with_tab().with_label("Controls"),
            ParameterDescriptor::double("size", 5.0, Bounds::new(0.0, 100.0)).with_parent("controls"),
            ParameterDescriptor::rgba("tint", [1.0, 1.0, 1.0, 1.0]).with_parent("controls"),
            ParameterDescriptor::group("output_tab").with_tab().with_label("Output"),
            ParameterDescriptor::string("output", StringMode::OutputFilePath, "render_#.png")
                .with_parent("output_tab"),
            ParameterDescriptor::group("advanced").with_open(false),
            ParameterDescriptor::int("seed", 0, Bounds::new(0.0, 1000.0)).with_parent("advanced"),
            ParameterDescriptor::choice("filter", ["box", "gauss"], 0).with_parent("advanced"),
            ParameterDescriptor::push_button("reset"),
            ParameterDescriptor::boolean("invert", false),
        ]
    }

    fn instantiate(descriptors: Vec<ParameterDescriptor>) -> (ParameterStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0.0));
        let store = ParameterStore::instantiate(descriptors, clock.clone(), StoreConfig::new()).unwrap();
        (store, clock)
    }

    #[test]
    fn test_lookup() {
        let (store, _) = instantiate(effect());
        assert_eq!(store.len(), 10);
        assert!(store.contains("size"));
        let size = store.lookup("size").unwrap();
        assert_eq!(size.kind(), ParameterKind::Double);
        assert_eq!(store.lookup_id(size.id()).map(|p| p.name()), Some("size"));
        assert_eq!(
            store.lookup("missing").unwrap_err(),
            ParameterError::NotFound("missing".to_string())
        );
    }

    #[test]
    fn test_declaration_order_is_restartable() {
        let (store, _) = instantiate(effect());
        let iter = store.iter();
        let first: Vec<&str> = iter.clone().map(|p| p.name()).collect();
        let second: Vec<&str> = iter.map(|p| p.name()).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "controls");
        assert_eq!(first[9], "invert");

        let mut visited = Vec::new();
        store.for_each_parameter(|p| visited.push(p.name().to_string()));
        assert_eq!(visited, first);
    }

    #[test]
    fn test_no_keyframes_after_instantiation() {
        let (store, _) = instantiate(effect());
        for parameter in store.iter().filter(|p| p.animates()) {
            assert!(!parameter.has_keyframes(), "{}", parameter.name());
        }
        assert_eq!(store.lookup("size").unwrap().get(0).unwrap(), Value::Double(5.0));
    }

    #[test]
    fn test_tab_groups_share_one_container() {
        let (store, _) = instantiate(effect());
        let controls = store.lookup("controls").unwrap().container().unwrap();
        let output = store.lookup("output_tab").unwrap().container().unwrap();
        assert!(controls.same_as(&output));

        let tabs = store.tab_container().unwrap();
        let pages = tabs.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].label, "Controls");
        assert_eq!(pages[1].label, "Output");

        let advanced = store.lookup("advanced").unwrap().container().unwrap();
        assert!(matches!(advanced, Container::Folder(_)));
        assert!(!advanced.same_as(&controls));
    }

    #[test]
    fn test_no_tab_container_without_tab_groups() {
        let (store, _) = instantiate(vec![ParameterDescriptor::group("folder")]);
        assert!(store.tab_container().is_none());
    }

    #[test]
    fn test_children_in_declaration_order() {
        let (store, _) = instantiate(effect());
        let names = |group: &str| -> Vec<String> {
            store
                .children(group)
                .unwrap()
                .iter()
                .map(|p| p.name().to_string())
                .collect()
        };
        assert_eq!(names("controls"), vec!["size", "tint"]);
        assert_eq!(names("advanced"), vec!["seed", "filter"]);
        assert!(names("invert").is_empty());

        let top: Vec<&str> = store.top_level().iter().map(|p| p.name()).collect();
        assert_eq!(top, vec!["controls", "output_tab", "advanced", "reset", "invert"]);
        assert_eq!(
            store.lookup("seed").unwrap().parent(),
            Some(store.lookup("advanced").unwrap().id())
        );
    }

    #[test]
    fn test_bad_parents_stay_top_level() {
        let (store, _) = instantiate(vec![
            ParameterDescriptor::boolean("flag", false),
            ParameterDescriptor::double("a", 0.0, Bounds::unbounded()).with_parent("nowhere"),
            ParameterDescriptor::double("b", 0.0, Bounds::unbounded()).with_parent("flag"),
            ParameterDescriptor::group("loop").with_parent("loop"),
        ]);
        assert_eq!(store.top_level().len(), 4);
        assert!(store.children("loop").unwrap().is_empty());
    }

    #[test]
    fn test_group_cycle_rejected() {
        let (store, _) = instantiate(vec![
            ParameterDescriptor::group("a").with_parent("b"),
            ParameterDescriptor::group("b").with_parent("a"),
        ]);
        // "a" attaches to "b"; "b" cannot then attach to its own child.
        assert_eq!(store.children("b").unwrap().len(), 1);
        assert!(store.children("a").unwrap().is_empty());
        assert_eq!(store.top_level().len(), 1);
    }

    #[test]
    fn test_deep_group_chain_cycle_rejected() {
        let (store, _) = instantiate(vec![
            ParameterDescriptor::group("a").with_parent("c"),
            ParameterDescriptor::group("b").with_parent("a"),
            ParameterDescriptor::group("c").with_parent("b"),
            ParameterDescriptor::double("leaf", 0.0, Bounds::unbounded()).with_parent("c"),
        ]);
        // a -> c and b -> a attach; c -> b would close the loop.
        assert_eq!(store.children("c").unwrap().len(), 2);
        assert_eq!(store.children("a").unwrap().len(), 1);
        assert!(store.children("b").unwrap().is_empty());
        assert_eq!(store.top_level().len(), 1);
        assert_eq!(store.lookup("a").unwrap().parent(), Some(store.lookup("c").unwrap().id()));
    }

    #[test]
    fn test_duplicate_and_empty_names() {
        let clock: Arc<dyn EvaluationClock> = Arc::new(ManualClock::default());
        let result = ParameterStore::instantiate(
            vec![
                ParameterDescriptor::boolean("x", false),
                ParameterDescriptor::boolean("x", true),
            ],
            clock.clone(),
            StoreConfig::new(),
        );
        assert_eq!(result.unwrap_err(), ParameterError::DuplicateName("x".to_string()));

        let result = ParameterStore::instantiate(
            vec![ParameterDescriptor::boolean("", false)],
            clock,
            StoreConfig::new(),
        );
        assert_eq!(result.unwrap_err(), ParameterError::EmptyName);
    }

    #[test]
    fn test_is_output() {
        let (store, clock) = instantiate(effect());
        assert!(store.is_output());
        clock.set_time(12.0);
        assert_eq!(
            store.lookup("output").unwrap().get(0).unwrap(),
            Value::String("render_12.png".to_string())
        );

        let (reader, _) = instantiate(vec![ParameterDescriptor::string(
            "input",
            StringMode::FilePath,
            "plate_###.exr",
        )]);
        assert!(!reader.is_output());
    }

    #[test]
    fn test_clock_shared_with_parameters() {
        let (store, clock) = instantiate(effect());
        let size = store.lookup("size").unwrap();
        size.set_at(0, 0.0, Value::Double(0.0)).unwrap();
        size.set_at(0, 10.0, Value::Double(10.0)).unwrap();
        clock.set_time(4.0);
        assert_eq!(store.now(), 4.0);
        assert_eq!(size.get(0).unwrap(), Value::Double(4.0));
    }

    #[test]
    fn test_snapshot_restore_across_instances() {
        let (source, _) = instantiate(effect());
        source.lookup("size").unwrap().set_at(0, 2.0, Value::Double(40.0)).unwrap();
        source.lookup("filter").unwrap().set(0, Value::Choice(1)).unwrap();
        source.lookup("invert").unwrap().set(0, Value::Bool(true)).unwrap();
        let saved = source.snapshot();
        assert_eq!(saved.len(), source.len());

        let (target, _) = instantiate(effect());
        assert_eq!(target.restore(&saved), saved.len());
        assert_eq!(target.snapshot(), saved);
    }

    #[test]
    fn test_restore_skips_unknown_and_invalid() {
        let (store, _) = instantiate(effect());
        let snapshots = vec![
            ParameterSnapshot {
                name: "gone".to_string(),
                cells: vec![CellSnapshot::constant(Value::Double(1.0))],
            },
            ParameterSnapshot {
                name: "filter".to_string(),
                cells: vec![CellSnapshot::constant(Value::Choice(9))],
            },
            ParameterSnapshot {
                name: "invert".to_string(),
                cells: vec![CellSnapshot::constant(Value::Bool(true))],
            },
        ];
        assert_eq!(store.restore(&snapshots), 1);
        assert_eq!(store.lookup("filter").unwrap().get(0).unwrap(), Value::Choice(0));
        assert_eq!(store.lookup("invert").unwrap().get(0).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParameterStore>();
    }
}
