//! Ahead-of-time compilation of definitions.
//!
//! The compiler walks every enumerable entry of a [`SourceChain`], lowers
//! the ones it can into routines (see [`lower`]) and writes them as one
//! JSON module. Entries it cannot lower are skipped and keep resolving
//! through the interpreter, so a partially compiled container behaves the
//! same as an interpreted one.
//!
//! Compilation never overwrites: if the module file already exists it is
//! left untouched. Clear the output directory when definitions change.

pub(crate) mod exec;
pub mod ir;
pub mod lower;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::error::{CompilationError, Result};
use crate::registry::ClassRegistry;
use crate::source::SourceChain;

pub use ir::{CompiledModule, Expr, Literal, Routine};
pub use lower::CompileError;

/// What [`Compiler::compile`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// A new module was written.
    Compiled {
        path: PathBuf,
        entries: usize,
        skipped: usize,
    },
    /// The module file already existed and was left as is.
    AlreadyCompiled { path: PathBuf },
}

impl CompileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            CompileOutcome::Compiled { path, .. } | CompileOutcome::AlreadyCompiled { path } => path,
        }
    }
}

/// Lowers definitions into a [`CompiledModule`].
#[derive(Debug, Clone)]
pub struct Compiler {
    classes: Arc<ClassRegistry>,
}

impl Compiler {
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        Self { classes }
    }

    /// Where the module called `module_name` is written inside `dir`.
    pub fn module_path(dir: &Path, module_name: &str) -> PathBuf {
        dir.join(format!("{module_name}.json"))
    }

    /// Compiles `sources` into `dir/<module_name>.json` unless that file exists.
    #[instrument(skip(self, sources, dir), fields(dir = %dir.as_ref().display()))]
    pub fn compile(
        &self,
        sources: &SourceChain,
        dir: impl AsRef<Path>,
        module_name: &str,
    ) -> Result<CompileOutcome> {
        let dir = dir.as_ref();
        let path = Self::module_path(dir, module_name);
        if path.exists() {
            debug!(path = %path.display(), "Compiled module already exists");
            return Ok(CompileOutcome::AlreadyCompiled { path });
        }

        let (module, skipped) = self.lower(sources, module_name);
        let entries = module.entries.len();

        let io_error = |source| CompilationError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(dir).map_err(io_error)?;
        let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
        serde_json::to_writer_pretty(&mut file, &module).map_err(|source| CompilationError::Format {
            path: path.clone(),
            source,
        })?;
        if let Err(err) = file.persist_noclobber(&path) {
            if err.error.kind() == std::io::ErrorKind::AlreadyExists {
                debug!(path = %path.display(), "Compiled module written concurrently");
                return Ok(CompileOutcome::AlreadyCompiled { path });
            }
            return Err(io_error(err.error).into());
        }

        info!(path = %path.display(), entries, skipped, "Compilation finished");
        Ok(CompileOutcome::Compiled { path, entries, skipped })
    }

    /// Lowers every entry it can. Returns the module and the number of
    /// skipped entries.
    pub fn lower(&self, sources: &SourceChain, module_name: &str) -> (CompiledModule, usize) {
        let names = sources.definition_names();
        info!(module = module_name, entries = names.len(), "Compiling definitions");

        let mut module = CompiledModule::new(module_name);
        let mut next_id = 0;
        let mut skipped = 0;

        for name in names {
            let definition = match sources.get_definition(&name) {
                Ok(Some(definition)) => definition,
                Ok(None) => continue,
                Err(err) => {
                    warn!(entry = %name, reason = %err, "Entry not compiled");
                    skipped += 1;
                    continue;
                }
            };

            match lower::lower_entry(&self.classes, &definition, &mut next_id) {
                Ok(routines) => {
                    if let Some(root) = routines.first() {
                        debug!(entry = %name, routine = %root.id, helpers = routines.len() - 1, "Emitted routine");
                        module.entries.insert(name.clone(), root.id.clone());
                    }
                    for routine in routines {
                        module.routines.insert(routine.id.clone(), routine);
                    }
                }
                Err(CompileError::Skipped(reason)) => {
                    warn!(entry = %name, reason = %reason, "Entry not compiled");
                    skipped += 1;
                }
            }
        }

        (module, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::helpers::{create, factory, get, value};
    use crate::registry::ClassInfo;
    use crate::source::{DefinitionArray, DefinitionSource};
    use crate::value::Value;

    fn chain() -> SourceChain {
        let definitions = DefinitionArray::from_definitions([
            ("name", value("diwan")),
            ("alias", get("name")),
            ("Logger", create().into()),
            ("clock", factory(|_| Ok(Value::Null)).into()),
        ])
        .unwrap();
        SourceChain::new(vec![Arc::new(definitions) as Arc<dyn DefinitionSource>])
    }

    fn compiler() -> Compiler {
        let mut classes = ClassRegistry::new();
        classes.register(ClassInfo::new("Logger"));
        Compiler::new(Arc::new(classes))
    }

    #[test]
    fn lower_skips_closures() {
        let (module, skipped) = compiler().lower(&chain(), "App");
        assert_eq!(skipped, 1);
        assert!(module.has_entry("name"));
        assert!(module.has_entry("alias"));
        assert!(module.has_entry("Logger"));
        assert!(!module.has_entry("clock"));
    }

    #[test]
    fn compile_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = compiler();

        let outcome = compiler.compile(&chain(), dir.path(), "App").unwrap();
        match &outcome {
            CompileOutcome::Compiled { entries, skipped, .. } => {
                assert_eq!(*entries, 3);
                assert_eq!(*skipped, 1);
            }
            other => panic!("Expected Compiled, got: {other:?}"),
        }
        let written = fs::read(outcome.path()).unwrap();

        let again = compiler.compile(&chain(), dir.path(), "App").unwrap();
        assert!(matches!(again, CompileOutcome::AlreadyCompiled { .. }));
        assert_eq!(fs::read(again.path()).unwrap(), written);

        let module = CompiledModule::load(outcome.path()).unwrap();
        assert_eq!(module.name, "App");
        assert_eq!(module.entries.len(), 3);
    }

    #[test]
    fn load_reports_malformed_modules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        match CompiledModule::load(&path) {
            Err(crate::error::DiError::Compilation(CompilationError::Format { .. })) => {}
            other => panic!("Expected Format error, got: {other:?}"),
        }
    }
}
