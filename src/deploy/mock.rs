//! In-memory Dataverse used by the deploy tests.

use crate::cli::{OutputManager, RuntimeConfig};
use crate::dataverse::{DataverseApi, EntityIcons, WebResource};
use crate::error::{DeployError, Result};
use crate::manifest::{Category, IconRecord, IconStatus, UsageType};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Find(String),
    Create(String),
    Update(Uuid, String),
    EntityIcons(String, String),
    Publish,
}

#[derive(Default)]
struct State {
    resources: HashMap<String, (Uuid, WebResource)>,
    entity_icons: HashMap<String, String>,
    calls: Vec<Call>,
    fail_lookup: HashSet<String>,
    fail_create: HashSet<String>,
    fail_entity: HashSet<String>,
    fail_publish: bool,
    next_id: u128,
}

impl State {
    fn allocate_id(&mut self) -> Uuid {
        self.next_id += 1;
        Uuid::from_u128(self.next_id)
    }
}

#[derive(Default)]
pub struct MockDataverse {
    state: Mutex<State>,
}

impl MockDataverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a web resource that already exists remotely
    pub fn with_existing(self, name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.allocate_id();
            let placeholder = WebResource::svg(name, name, "", String::new(), "1.0");
            state.resources.insert(name.to_string(), (id, placeholder));
        }
        self
    }

    pub fn fail_lookup_of(self, name: &str) -> Self {
        self.state.lock().unwrap().fail_lookup.insert(name.to_string());
        self
    }

    pub fn fail_create_of(self, name: &str) -> Self {
        self.state.lock().unwrap().fail_create.insert(name.to_string());
        self
    }

    pub fn fail_entity(self, logical_name: &str) -> Self {
        self.state.lock().unwrap().fail_entity.insert(logical_name.to_string());
        self
    }

    pub fn fail_publish(self) -> Self {
        self.state.lock().unwrap().fail_publish = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Number of calls that change remote state
    pub fn mutating_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| !matches!(call, Call::Find(_)))
            .count()
    }

    pub fn id_of(&self, name: &str) -> Option<Uuid> {
        self.state.lock().unwrap().resources.get(name).map(|(id, _)| *id)
    }

    pub fn resource(&self, name: &str) -> Option<WebResource> {
        self.state
            .lock()
            .unwrap()
            .resources
            .get(name)
            .map(|(_, resource)| resource.clone())
    }

    pub fn resource_count(&self) -> usize {
        self.state.lock().unwrap().resources.len()
    }

    pub fn entity_icon(&self, logical_name: &str) -> Option<String> {
        self.state.lock().unwrap().entity_icons.get(logical_name).cloned()
    }
}

fn simulated(message: String) -> DeployError {
    DeployError::Api {
        status: 500,
        message,
    }
}

impl DataverseApi for MockDataverse {
    async fn find_web_resource(&self, name: &str) -> Result<Option<Uuid>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Find(name.to_string()));
        if state.fail_lookup.contains(name) {
            return Err(simulated(format!("simulated lookup failure for {name}")));
        }
        Ok(state.resources.get(name).map(|(id, _)| *id))
    }

    async fn create_web_resource(&self, resource: &WebResource) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(resource.name.clone()));
        if state.fail_create.contains(&resource.name) {
            return Err(simulated(format!("simulated create failure for {}", resource.name)));
        }
        if state.resources.contains_key(&resource.name) {
            return Err(simulated(format!("duplicate web resource {}", resource.name)));
        }
        let id = state.allocate_id();
        state
            .resources
            .insert(resource.name.clone(), (id, resource.clone()));
        Ok(())
    }

    async fn update_web_resource(&self, id: Uuid, resource: &WebResource) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update(id, resource.name.clone()));
        match state.resources.get_mut(&resource.name) {
            Some((existing, stored)) if *existing == id => {
                *stored = resource.clone();
                Ok(())
            }
            _ => Err(simulated(format!("no web resource with id {id}"))),
        }
    }

    async fn update_entity_icons(&self, icons: &EntityIcons) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::EntityIcons(
            icons.entity_logical_name.clone(),
            icons.web_resource_name.clone(),
        ));
        if state.fail_entity.contains(&icons.entity_logical_name) {
            return Err(simulated(format!(
                "simulated metadata failure for {}",
                icons.entity_logical_name
            )));
        }
        state.entity_icons.insert(
            icons.entity_logical_name.clone(),
            icons.web_resource_name.clone(),
        );
        Ok(())
    }

    async fn publish_all(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Publish);
        if state.fail_publish {
            return Err(simulated("simulated publish failure".to_string()));
        }
        Ok(())
    }
}

/// Icon record whose asset lives at `<category>/<id>.svg`
pub fn icon(id: &str, usage_type: UsageType, entity: Option<&str>) -> IconRecord {
    let category = match usage_type {
        UsageType::Entity => Category::Entity,
        UsageType::Navigation => Category::Nav,
        UsageType::Command => Category::Cmd,
        UsageType::Status => Category::Status,
    };
    let folder = serde_json::to_value(category)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default();

    let mut chars = id.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    IconRecord {
        id: id.to_string(),
        description: format!("{name} icon"),
        name,
        category,
        usage_type,
        entity_logical_name: entity.map(String::from),
        web_resource_name: format!("test_/icons/{folder}/{id}.svg"),
        fluent_component: None,
        local_path: format!("{folder}/{id}.svg"),
        status: Some(IconStatus::Approved),
    }
}

/// Writes a small SVG for every record under `root`
pub fn write_assets(root: &Path, records: &[IconRecord]) {
    for record in records {
        let path = root.join(&record.local_path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, format!("<svg id=\"{}\"/>", record.id)).unwrap();
    }
}

pub fn quiet_runtime() -> RuntimeConfig {
    RuntimeConfig::new(OutputManager::new(false, true))
}
