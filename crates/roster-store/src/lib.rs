use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use roster_types::{to_pretty_json, FieldKind, UserPatch, UserRecord};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_INDENT: usize = 4;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("User '{0}' already exists")]
    DuplicateUsername(String),
    #[error("User '{0}' not found")]
    NotFound(String),
    #[error("Invalid {}", .0.label().to_lowercase())]
    Invalid(FieldKind),
    #[error("Corrupt data file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(serde_json::Error),
}

/// Reads every record from `path` in file order. A missing file is an empty
/// roster; anything unparseable is `Corrupt`.
pub fn load(path: &Path) -> Result<Vec<UserRecord>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrites `path` with the full record list. Not atomic: a crash while
/// writing leaves a truncated file.
pub fn save<'a, I>(path: &Path, records: I, indent: usize) -> Result<(), StoreError>
where
    I: IntoIterator<Item = &'a UserRecord>,
{
    let records: Vec<&UserRecord> = records.into_iter().collect();
    let mut content = to_pretty_json(&records, indent).map_err(StoreError::Serialize)?;
    content.push('\n');

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    debug!("Saved {} user(s) to {}", records.len(), path.display());
    Ok(())
}

/// In-memory roster keyed by username, written back in full after every
/// mutation. Iteration follows load order, then creation order.
pub struct RecordStore {
    path: PathBuf,
    indent: usize,
    users: HashMap<String, UserRecord>,
    order: Vec<String>,
}

impl RecordStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = load(&path)?;

        let mut users = HashMap::with_capacity(records.len());
        let mut order = Vec::with_capacity(records.len());
        for record in records {
            if let Err(field) = record.validate() {
                warn!(
                    "Stored user '{}' has an invalid {}",
                    record.username,
                    field.label().to_lowercase()
                );
            }
            let username = record.username.clone();
            if users.insert(username.clone(), record).is_some() {
                warn!("Duplicate username '{}' in {}, keeping last", username, path.display());
            } else {
                order.push(username);
            }
        }

        info!("Loaded {} user(s) from {}", order.len(), path.display());
        Ok(Self {
            path,
            indent: DEFAULT_INDENT,
            users,
            order,
        })
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn get(&self, username: &str) -> Result<&UserRecord, StoreError> {
        self.users
            .get(username)
            .ok_or_else(|| StoreError::NotFound(username.to_string()))
    }

    pub fn list(&self) -> Vec<&UserRecord> {
        self.order
            .iter()
            .filter_map(|username| self.users.get(username))
            .collect()
    }

    pub fn save(&self) -> Result<(), StoreError> {
        save(&self.path, self.list(), self.indent)
    }

    pub fn create(&mut self, record: UserRecord) -> Result<(), StoreError> {
        if self.contains(&record.username) {
            return Err(StoreError::DuplicateUsername(record.username));
        }
        if let Err(field) = record.validate() {
            warn!("Rejected new user '{}': invalid {}", record.username, field);
            return Err(StoreError::Invalid(field));
        }

        let username = record.username.clone();
        self.users.insert(username.clone(), record);
        self.order.push(username.clone());

        if let Err(e) = self.save() {
            self.users.remove(&username);
            self.order.pop();
            return Err(e);
        }
        info!("Created user '{}'", username);
        Ok(())
    }

    pub fn update(&mut self, username: &str, patch: &UserPatch) -> Result<&UserRecord, StoreError> {
        let current = self.get(username)?;
        let updated = current.patched(patch);
        if let Err(field) = updated.validate() {
            warn!("Rejected update of '{}': invalid {}", username, field);
            return Err(StoreError::Invalid(field));
        }

        let previous = self.users.insert(username.to_string(), updated);
        if let Err(e) = self.save() {
            if let Some(previous) = previous {
                self.users.insert(username.to_string(), previous);
            }
            return Err(e);
        }
        info!("Updated user '{}'", username);
        self.get(username)
    }

    pub fn delete(&mut self, username: &str) -> Result<UserRecord, StoreError> {
        let removed = self
            .users
            .remove(username)
            .ok_or_else(|| StoreError::NotFound(username.to_string()))?;
        let position = self.order.iter().position(|u| u == username);
        if let Some(position) = position {
            self.order.remove(position);
        }

        if let Err(e) = self.save() {
            self.users.insert(username.to_string(), removed);
            if let Some(position) = position {
                self.order.insert(position, username.to_string());
            }
            return Err(e);
        }
        info!("Deleted user '{}'", username);
        Ok(removed)
    }
}
