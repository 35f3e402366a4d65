//! Scripted resources for group tests
#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use assetstream::resource::{
    into_handle, DefinitionNode, DefinitionTree, LoadPolicy, LoaderConfig, Progress, Resource,
    ResourceError, ResourceHandle, ResourceRegistry, ResourceState,
};

/// Calls made on mock resources, in order, as "op:name"
pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Complete,
    Pending,
    Fail,
}

/// Resource whose `load()` outcomes come from a script.
///
/// Definition attributes: `name`, `manual`, and `script`, a comma-separated
/// list of `complete` / `pending` / `fail`. Once the script runs out every
/// `load()` completes.
#[derive(Debug)]
pub struct MockResource {
    type_name: String,
    name: String,
    manual: bool,
    script: VecDeque<Step>,
    state: ResourceState,
    log: CallLog,
}

impl MockResource {
    pub fn new(type_name: &str, log: CallLog) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: String::new(),
            manual: false,
            script: VecDeque::new(),
            state: ResourceState::Unloaded,
            log,
        }
    }

    pub fn named(type_name: &str, name: &str, log: &CallLog) -> Self {
        let mut resource = Self::new(type_name, Arc::clone(log));
        resource.name = name.to_string();
        resource
    }

    pub fn with_script(mut self, steps: &[Step]) -> Self {
        self.script = steps.iter().copied().collect();
        self
    }

    pub fn manual(mut self) -> Self {
        self.manual = true;
        self
    }

    pub fn handle(self) -> ResourceHandle {
        into_handle(self)
    }

    fn record(&self, op: &str) {
        self.log.lock().push(format!("{op}:{}", self.name));
    }
}

impl Resource for MockResource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn create(&mut self, _path: &str, node: &dyn DefinitionNode) -> Result<(), ResourceError> {
        self.name = node
            .attribute("name")
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ResourceError::BadDefinition("mock without name".to_string()))?
            .to_string();
        self.manual = node.attribute("manual") == Some("true");
        if let Some(script) = node.attribute("script") {
            for step in script.split(',').map(str::trim) {
                let step = match step {
                    "complete" => Step::Complete,
                    "pending" => Step::Pending,
                    "fail" => Step::Fail,
                    other => {
                        return Err(ResourceError::BadDefinition(format!("bad step {other}")))
                    }
                };
                self.script.push_back(step);
            }
        }
        self.record("create");
        Ok(())
    }

    fn load(&mut self) -> Result<Progress, ResourceError> {
        self.record("load");
        match self.script.pop_front().unwrap_or(Step::Complete) {
            Step::Complete => {
                self.state = ResourceState::Loaded;
                Ok(Progress::Complete)
            }
            Step::Pending => {
                self.state = ResourceState::Loading;
                Ok(Progress::Pending)
            }
            Step::Fail => {
                self.state = ResourceState::Unloaded;
                Err(ResourceError::Failed(format!("{} refused to load", self.name)))
            }
        }
    }

    fn unload(&mut self) -> Result<(), ResourceError> {
        self.record("unload");
        self.state = ResourceState::Unloaded;
        Ok(())
    }

    fn state(&self) -> ResourceState {
        self.state
    }

    fn is_manual(&self) -> bool {
        self.manual
    }
}

/// Registry building `MockResource`s for the types "mock" and "other"
pub fn mock_registry(policy: LoadPolicy, log: &CallLog) -> ResourceRegistry {
    let mut registry = ResourceRegistry::new(LoaderConfig {
        load_policy: policy,
        ..LoaderConfig::default()
    });
    for type_name in ["mock", "other"] {
        let log = Arc::clone(log);
        registry.register(type_name, move |_group| {
            into_handle(MockResource::new(type_name, Arc::clone(&log)))
        });
    }
    registry
}

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Definition child for a mock resource
pub fn mock_node(name: &str, script: &str) -> DefinitionTree {
    let node = DefinitionTree::new("mock").with_attribute("name", name);
    if script.is_empty() {
        node
    } else {
        node.with_attribute("script", script)
    }
}

/// Remove and return the recorded calls
pub fn take_calls(log: &CallLog) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}
