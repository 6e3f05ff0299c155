//! Test harness for whole-tree transformation tests.
//!
//! Copies a fixture tree into a temp dir and runs driver batches over it
//! through the same entry points the CLI uses.

pub mod fixtures;

use jfold_core::drivers::{Driver, DriverKind};
use jfold_core::load_jfold_config;
use jfold_core::walk::{run_batch, BatchOptions, BatchReport};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ORDER_SERVICE: &str = "src/main/java/com/acme/orders/OrderService.java";
pub const INVENTORY_CONTROLLER: &str = "src/main/java/com/acme/inventory/InventoryController.java";
pub const PAYMENT_CLIENT: &str = "src/main/java/com/acme/payments/PaymentClient.java";

pub struct Workspace {
    pub root: PathBuf,
    _temp_dir: TempDir,
}

impl Workspace {
    /// An empty workspace.
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { root: temp_dir.path().to_path_buf(), _temp_dir: temp_dir }
    }

    /// A workspace holding a copy of a named fixture directory.
    pub fn from_fixture(name: &str) -> Self {
        let fixture_src = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
        assert!(fixture_src.exists(), "Fixture '{name}' not found at {}", fixture_src.display());

        let ws = Self::empty();
        fixtures::copy_dir_recursive(&fixture_src, &ws.root);
        ws
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create dir");
        }
        std::fs::write(path, contents).expect("Failed to write file");
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("Failed to read file")
    }

    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        fixtures::snapshot(&self.root)
    }

    /// Run the given drivers over the workspace with its `.jfold.toml` applied.
    pub fn run(&self, kinds: &[DriverKind]) -> BatchReport {
        self.run_with(kinds, BatchOptions::default())
    }

    pub fn run_with(&self, kinds: &[DriverKind], options: BatchOptions) -> BatchReport {
        let config = load_jfold_config(&self.root);
        let drivers: Vec<&dyn Driver> = kinds.iter().map(|k| k.driver()).collect();
        run_batch(&config, &drivers, options)
    }
}
