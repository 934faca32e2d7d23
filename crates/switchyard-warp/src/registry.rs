//! Schema registry.
//!
//! Compiles the `.proto` bundle once and serves descriptors by fully
//! qualified name. Loading is single-flight: concurrent callers of
//! [`SchemaRegistry::load`] await the same in-flight compile, and once it
//! completes every caller shares one immutable [`SchemaTable`].

use crate::error::SchemaError;
use prost_reflect::{DescriptorPool, EnumDescriptor, MessageDescriptor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Package every wire type lives in.
pub const PACKAGE: &str = "warp.multi_agent.v1";

/// Schema files in dependency order. Later files import earlier ones.
pub const SCHEMA_FILES: &[&str] = &[
    "options.proto",
    "citations.proto",
    "file_content.proto",
    "document_content.proto",
    "attachment.proto",
    "todo.proto",
    "suggestions.proto",
    "input_context.proto",
    "task.proto",
    "request.proto",
    "response.proto",
    "conversation_data.proto",
];

/// Directory of the schema bundle shipped with this crate.
pub fn bundled_schema_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/proto"))
}

/// Fully qualified name for a type in [`PACKAGE`].
pub fn qualified(name: &str) -> String {
    format!("{}.{}", PACKAGE, name)
}

#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    Message(MessageDescriptor),
    Enum(EnumDescriptor),
}

impl TypeDescriptor {
    pub fn full_name(&self) -> &str {
        match self {
            TypeDescriptor::Message(m) => m.full_name(),
            TypeDescriptor::Enum(e) => e.full_name(),
        }
    }
}

/// Immutable name → descriptor table produced by one load.
#[derive(Debug)]
pub struct SchemaTable {
    pool: DescriptorPool,
    types: HashMap<String, TypeDescriptor>,
    loaded_files: Vec<String>,
    failures: Vec<SchemaError>,
}

impl SchemaTable {
    fn compile(dir: &Path) -> Self {
        let mut loaded_files = Vec::new();
        let mut failures = Vec::new();

        let mut compiler = match protox::Compiler::new([dir]) {
            Ok(compiler) => compiler,
            Err(e) => {
                let err = SchemaError::Load {
                    file: dir.display().to_string(),
                    message: e.to_string(),
                };
                warn!("{}", err);
                failures.push(err);
                return Self::from_pool(DescriptorPool::new(), loaded_files, failures);
            }
        };
        compiler.include_imports(true);

        for file in SCHEMA_FILES {
            match compiler.open_file(dir.join(file)) {
                Ok(_) => {
                    debug!(file, "loaded schema file");
                    loaded_files.push((*file).to_string());
                }
                Err(e) => {
                    let err = SchemaError::Load {
                        file: (*file).to_string(),
                        message: e.to_string(),
                    };
                    warn!("{}", err);
                    failures.push(err);
                }
            }
        }

        Self::from_pool(compiler.descriptor_pool(), loaded_files, failures)
    }

    fn from_pool(
        pool: DescriptorPool,
        loaded_files: Vec<String>,
        failures: Vec<SchemaError>,
    ) -> Self {
        let mut types = HashMap::new();
        for message in pool.all_messages() {
            types.insert(
                message.full_name().to_string(),
                TypeDescriptor::Message(message),
            );
        }
        for enumeration in pool.all_enums() {
            types.insert(
                enumeration.full_name().to_string(),
                TypeDescriptor::Enum(enumeration),
            );
        }

        Self {
            pool,
            types,
            loaded_files,
            failures,
        }
    }

    /// Look up a type. `None` is the not-found sentinel; it never panics.
    pub fn resolve(&self, qualified_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(qualified_name.trim_start_matches('.'))
    }

    pub fn resolve_message(&self, qualified_name: &str) -> Option<MessageDescriptor> {
        match self.resolve(qualified_name)? {
            TypeDescriptor::Message(m) => Some(m.clone()),
            TypeDescriptor::Enum(_) => None,
        }
    }

    pub fn resolve_enum(&self, qualified_name: &str) -> Option<EnumDescriptor> {
        match self.resolve(qualified_name)? {
            TypeDescriptor::Enum(e) => Some(e.clone()),
            TypeDescriptor::Message(_) => None,
        }
    }

    /// Resolve a message type or report it missing.
    pub fn message(&self, qualified_name: &str) -> Result<MessageDescriptor, SchemaError> {
        self.resolve_message(qualified_name)
            .ok_or_else(|| SchemaError::TypeNotFound(qualified_name.to_string()))
    }

    /// All known type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn loaded_files(&self) -> &[String] {
        &self.loaded_files
    }

    /// Per-file failures recorded during load.
    pub fn failures(&self) -> &[SchemaError] {
        &self.failures
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }
}

/// Owns the lazily loaded schema for one service instance.
#[derive(Debug)]
pub struct SchemaRegistry {
    dir: PathBuf,
    table: OnceCell<Arc<SchemaTable>>,
}

impl SchemaRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            table: OnceCell::new(),
        }
    }

    /// Registry over the bundle shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(bundled_schema_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the bundle, or join a load already in flight.
    ///
    /// Missing or broken files are logged and skipped. Once loaded, later
    /// calls return the same table without touching the filesystem.
    pub async fn load(&self) -> Result<Arc<SchemaTable>, SchemaError> {
        let table = self
            .table
            .get_or_try_init(|| async {
                let dir = self.dir.clone();
                let table = tokio::task::spawn_blocking(move || SchemaTable::compile(&dir))
                    .await
                    .map_err(|e| SchemaError::LoaderTask(e.to_string()))?;
                info!(
                    dir = %self.dir.display(),
                    files = table.loaded_files.len(),
                    types = table.types.len(),
                    "schema registry loaded"
                );
                Ok::<_, SchemaError>(Arc::new(table))
            })
            .await?;
        Ok(Arc::clone(table))
    }

    /// The loaded table, if [`load`](Self::load) has completed.
    pub fn get(&self) -> Option<Arc<SchemaTable>> {
        self.table.get().cloned()
    }

    /// Loaded table or [`SchemaError::NotReady`].
    pub fn ready(&self) -> Result<Arc<SchemaTable>, SchemaError> {
        self.get().ok_or(SchemaError::NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let registry = SchemaRegistry::bundled();
        assert!(registry.get().is_none());

        let first = registry.load().await.unwrap();
        let second = registry.load().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.loaded_files().len(), SCHEMA_FILES.len());
        assert!(first.failures().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_table() {
        let registry = Arc::new(SchemaRegistry::bundled());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.load().await.unwrap() })
            })
            .collect();

        let mut tables = Vec::new();
        for handle in handles {
            tables.push(handle.await.unwrap());
        }
        for table in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], table));
        }
    }

    #[tokio::test]
    async fn test_resolve_returns_sentinel_for_unknown_names() {
        let registry = SchemaRegistry::bundled();
        let table = registry.load().await.unwrap();

        assert!(table.resolve(&qualified("Request")).is_some());
        assert!(table.resolve_enum(&qualified("ToolType")).is_some());
        assert!(table.resolve_message(&qualified("ToolType")).is_none());
        assert!(table.resolve(&qualified("NoSuchType")).is_none());
        assert!(table.resolve(&format!(".{}", qualified("ResponseEvent"))).is_some());
    }

    #[tokio::test]
    async fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["options.proto", "citations.proto", "file_content.proto"] {
            std::fs::copy(bundled_schema_dir().join(file), dir.path().join(file)).unwrap();
        }

        let registry = SchemaRegistry::new(dir.path());
        let table = registry.load().await.unwrap();

        assert_eq!(table.loaded_files().len(), 3);
        assert_eq!(table.failures().len(), SCHEMA_FILES.len() - 3);
        assert!(table.resolve(&qualified("FileContent")).is_some());
        assert!(table.resolve(&qualified("Request")).is_none());
    }

    #[test]
    fn test_ready_before_load_is_not_ready() {
        let registry = SchemaRegistry::bundled();
        assert!(matches!(registry.ready(), Err(SchemaError::NotReady)));
    }
}
