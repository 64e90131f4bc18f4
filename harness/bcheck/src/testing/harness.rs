//! Fixture-tree helpers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bc_ir::Bundler;
use bc_sandbox::ExecutionSandbox;

use crate::test::{Harness, HarnessConfig};

/// Write `<root>/<category>/<name>/` with the given `(relative path, contents)`
/// files, creating directories as needed. Returns the fixture directory.
pub fn write_fixture(
    root: &Path,
    category: &str,
    name: &str,
    files: &[(&str, &str)],
) -> io::Result<PathBuf> {
    let dir = root.join(category).join(name);
    fs::create_dir_all(&dir)?;
    for (path, contents) in files {
        let path = dir.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
    }
    Ok(dir)
}

/// A sequential harness over `root` with default configuration.
pub fn harness_for(
    root: &Path,
    bundler: Arc<dyn Bundler>,
    sandbox: Arc<dyn ExecutionSandbox>,
) -> Harness {
    let config = HarnessConfig {
        root: root.to_path_buf(),
        parallel: false,
        ..HarnessConfig::default()
    };
    Harness::new(config, bundler, sandbox)
}
