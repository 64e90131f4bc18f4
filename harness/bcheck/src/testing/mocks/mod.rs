//! Mock implementations of the bundler, sandbox and transformer.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bc_ir::{Bundle, BundleError, BuildRequest, Bundler, Options, Output, OutputFormat};
use bc_sandbox::{Bindings, ExecutionSandbox, ModuleRecord, SandboxError, Thrown};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{json, Value};

use crate::bridge::{TransformError, Transformer};

type CodeFn = Arc<dyn Fn(OutputFormat) -> String + Send + Sync>;
type MapFn = Arc<dyn Fn(OutputFormat) -> Value + Send + Sync>;

/// Scripted behaviour for one fixture's bundle.
#[derive(Clone, Default)]
pub struct FixtureScript {
    build_error: Option<BundleError>,
    generate_error: Option<BundleError>,
    code: Option<CodeFn>,
    map: Option<MapFn>,
    omit_map: bool,
}

impl FixtureScript {
    pub fn new() -> Self {
        FixtureScript::default()
    }

    #[must_use]
    pub fn fails_build(mut self, err: BundleError) -> Self {
        self.build_error = Some(err);
        self
    }

    #[must_use]
    pub fn fails_generate(mut self, err: BundleError) -> Self {
        self.generate_error = Some(err);
        self
    }

    /// Generated code per profile. Without this the entry file is echoed.
    #[must_use]
    pub fn with_code(mut self, code: impl Fn(OutputFormat) -> String + Send + Sync + 'static) -> Self {
        self.code = Some(Arc::new(code));
        self
    }

    /// Map per profile, returned when `sourceMap` is requested.
    #[must_use]
    pub fn with_map(mut self, map: impl Fn(OutputFormat) -> Value + Send + Sync + 'static) -> Self {
        self.map = Some(Arc::new(map));
        self
    }

    /// Never return a map, even when one is requested.
    #[must_use]
    pub fn without_map(mut self) -> Self {
        self.omit_map = true;
        self
    }
}

/// A bundler whose output is scripted per fixture directory name.
///
/// Fixtures without a script build successfully and echo their entry file.
/// Every build is counted.
#[derive(Default)]
pub struct StaticBundler {
    scripts: FxHashMap<String, FixtureScript>,
    builds: Mutex<FxHashMap<String, usize>>,
}

impl StaticBundler {
    pub fn new() -> Self {
        StaticBundler::default()
    }

    /// Script the fixture whose directory is named `fixture`.
    #[must_use]
    pub fn script(mut self, fixture: impl Into<String>, script: FixtureScript) -> Self {
        self.scripts.insert(fixture.into(), script);
        self
    }

    /// How many times the fixture named `fixture` was built.
    pub fn builds(&self, fixture: &str) -> usize {
        self.builds.lock().get(fixture).copied().unwrap_or(0)
    }

    pub fn total_builds(&self) -> usize {
        self.builds.lock().values().sum()
    }
}

fn fixture_name(entry: &Path) -> String {
    entry
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Bundler for StaticBundler {
    fn build(&self, request: &BuildRequest) -> Result<Arc<dyn Bundle>, BundleError> {
        let name = fixture_name(request.entry());
        *self.builds.lock().entry(name.clone()).or_insert(0) += 1;

        let script = self.scripts.get(&name).cloned().unwrap_or_default();
        if let Some(err) = &script.build_error {
            return Err(err.clone());
        }
        Ok(Arc::new(StaticBundle {
            entry: request.entry().to_path_buf(),
            script,
        }))
    }
}

struct StaticBundle {
    entry: PathBuf,
    script: FixtureScript,
}

impl Bundle for StaticBundle {
    fn generate(&self, options: &Options) -> Result<Output, BundleError> {
        if let Some(err) = &self.script.generate_error {
            return Err(err.clone());
        }
        let format = options
            .format()
            .map_err(|e| BundleError::with_code(e.to_string(), "INVALID_OPTION"))?
            .unwrap_or(OutputFormat::Es6);

        let code = match &self.script.code {
            Some(code) => code(format),
            None => fs::read_to_string(&self.entry).map_err(|e| {
                BundleError::with_code(
                    format!("Could not load {}: {e}", self.entry.display()),
                    "UNRESOLVED_ENTRY",
                )
            })?,
        };

        let map = (options.source_map() && !self.script.omit_map).then(|| match &self.script.map {
            Some(map) => map(format),
            None => json!({
                "version": 3,
                "file": options.get(bc_ir::keys::SOURCE_MAP_FILE),
                "sources": [self.entry.to_string_lossy()],
                "names": [],
                "mappings": "AAAA",
            }),
        });

        Ok(Output { code, map })
    }
}

type RunFn = Arc<dyn Fn(&str, &Bindings) -> Result<ModuleRecord, SandboxError> + Send + Sync>;

/// A sandbox that answers from a closure and records the code it was given.
pub struct ScriptedSandbox {
    run: RunFn,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSandbox {
    pub fn new(
        run: impl Fn(&str, &Bindings) -> Result<ModuleRecord, SandboxError> + Send + Sync + 'static,
    ) -> Self {
        ScriptedSandbox {
            run: Arc::new(run),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every run succeeds with `exports`.
    pub fn exporting(exports: Value) -> Self {
        ScriptedSandbox::new(move |_, _| {
            Ok(ModuleRecord {
                exports: exports.clone(),
            })
        })
    }

    /// Every run throws `thrown`.
    pub fn throwing(thrown: Thrown) -> Self {
        ScriptedSandbox::new(move |_, _| Err(SandboxError::Thrown(thrown.clone())))
    }

    /// Code passed to each run, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl ExecutionSandbox for ScriptedSandbox {
    fn run(&self, code: &str, bindings: &Bindings) -> Result<ModuleRecord, SandboxError> {
        self.calls.lock().push(code.to_string());
        (self.run)(code, bindings)
    }
}

type TransformFn = Arc<dyn Fn(&str, &[String]) -> Result<String, TransformError> + Send + Sync>;

/// A transformer that answers from a closure.
#[derive(Clone)]
pub struct ScriptedTransformer {
    transform: TransformFn,
}

impl ScriptedTransformer {
    pub fn new(
        transform: impl Fn(&str, &[String]) -> Result<String, TransformError> + Send + Sync + 'static,
    ) -> Self {
        ScriptedTransformer {
            transform: Arc::new(transform),
        }
    }
}

impl Transformer for ScriptedTransformer {
    fn transform(&self, code: &str, whitelist: &[String]) -> Result<String, TransformError> {
        (self.transform)(code, whitelist)
    }
}
