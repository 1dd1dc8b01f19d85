//! In-memory fakes for the repositories, used by unit tests

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use droid_core::domain::TaskResult;
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::repository::{Delivery, ResultStore, SecretStore, TaskBroker};

/// Writes an executable shell script and returns its path
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o755)
        .open(&path)
        .unwrap();
    writeln!(file, "#!/bin/sh\n{}", body).unwrap();
    file.sync_all().unwrap();
    path
}

/// Ordered record of side effects shared by the fakes
///
/// Backed by a file so shell scripts can append to the same record.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("events"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, event: &str) {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .unwrap();
        writeln!(file, "{}", event).unwrap();
    }

    pub fn entries(&self) -> Vec<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[derive(Default)]
struct BrokerState {
    declared: Vec<String>,
    ready: HashMap<String, VecDeque<Delivery>>,
    unacked: HashMap<u64, Delivery>,
    acked: Vec<u64>,
    fetches: usize,
    next_tag: u64,
}

/// Broker holding deliveries in memory
#[derive(Default)]
pub struct MemoryBroker {
    state: Mutex<BrokerState>,
    fail_declare: bool,
    fail_ack: bool,
    events: Option<EventLog>,
}

impl MemoryBroker {
    pub fn unreachable() -> Self {
        Self {
            fail_declare: true,
            ..Self::default()
        }
    }

    pub fn rejecting_acks() -> Self {
        Self {
            fail_ack: true,
            ..Self::default()
        }
    }

    pub fn recording(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn publish(&self, queue: &str, body: impl Into<Vec<u8>>) {
        let mut state = self.state.lock().unwrap();
        state.next_tag += 1;
        let delivery = Delivery {
            tag: state.next_tag,
            body: body.into(),
        };
        state
            .ready
            .entry(queue.to_string())
            .or_default()
            .push_back(delivery);
    }

    pub fn declared(&self) -> Vec<String> {
        self.state.lock().unwrap().declared.clone()
    }

    pub fn acked(&self) -> Vec<u64> {
        self.state.lock().unwrap().acked.clone()
    }

    pub fn fetches(&self) -> usize {
        self.state.lock().unwrap().fetches
    }

    pub fn ready(&self, queue: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.ready.get(queue).map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl TaskBroker for MemoryBroker {
    async fn declare_queue(&self, queue: &str) -> Result<()> {
        if self.fail_declare {
            bail!("connection refused");
        }
        let mut state = self.state.lock().unwrap();
        state.declared.push(queue.to_string());
        state.ready.entry(queue.to_string()).or_default();
        Ok(())
    }

    async fn fetch(&self, queue: &str) -> Result<Option<Delivery>> {
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        let delivery = state
            .ready
            .get_mut(queue)
            .ok_or_else(|| anyhow!("queue {} was not declared", queue))?
            .pop_front();
        if let Some(delivery) = &delivery {
            state.unacked.insert(delivery.tag, delivery.clone());
        }
        Ok(delivery)
    }

    async fn ack(&self, delivery: &Delivery) -> Result<()> {
        if self.fail_ack {
            bail!("channel closed");
        }
        let mut state = self.state.lock().unwrap();
        if state.unacked.remove(&delivery.tag).is_none() {
            bail!("unknown delivery tag {}", delivery.tag);
        }
        state.acked.push(delivery.tag);
        if let Some(events) = &self.events {
            events.record(&format!("ack {}", delivery.tag));
        }
        Ok(())
    }
}

/// Result store assigning sequential identifiers
#[derive(Default)]
pub struct MemoryResultStore {
    created: Mutex<Vec<TaskResult>>,
    updated: Mutex<Vec<TaskResult>>,
    fail_create: bool,
    fail_update: bool,
    events: Option<EventLog>,
}

impl MemoryResultStore {
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            fail_update: true,
            ..Self::default()
        }
    }

    /// Rejects creates but accepts updates
    pub fn rejecting_creates() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn recording(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    fn record(&self, event: &str) {
        if let Some(events) = &self.events {
            events.record(event);
        }
    }

    pub fn created(&self) -> Vec<TaskResult> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<TaskResult> {
        self.updated.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn create(&self, result: &TaskResult) -> Result<TaskResult> {
        self.record("create");
        if self.fail_create {
            bail!("store unavailable");
        }
        let mut created = self.created.lock().unwrap();
        let mut stored = result.clone();
        stored.id = Some(created.len() as i64 + 1);
        created.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, result: &TaskResult) -> Result<TaskResult> {
        self.record("update");
        if self.fail_update {
            bail!("store unavailable");
        }
        self.updated.lock().unwrap().push(result.clone());
        Ok(result.clone())
    }
}

/// Secret store backed by a map of `(product, key)` pairs
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: HashMap<(String, String), Vec<u8>>,
}

impl MemorySecretStore {
    pub fn with(mut self, product: &str, key: &str, value: &str) -> Self {
        self.secrets
            .insert((product.to_string(), key.to_string()), value.as_bytes().to_vec());
        self
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, product: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .secrets
            .get(&(product.to_string(), key.to_string()))
            .cloned())
    }
}
