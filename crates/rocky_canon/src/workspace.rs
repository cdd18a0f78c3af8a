//! Workspace staging for checker runs.
//!
//! Each run gets a private temp directory holding normalized copies of the
//! input scripts, verbatim copies of the declaration files and a generated
//! `tsconfig.json`. The directory is removed when the [`Workspace`] drops.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tempfile::TempDir;

use crate::annotation::normalize_annotations;
use crate::checker::CompilerOptions;
use crate::error::{CanonError, CanonResult};

/// Declaration file used when none is supplied.
pub const BUNDLED_DEFINITIONS: &str = include_str!("../lib/rocky.d.ts");

const BUNDLED_DEFINITIONS_NAME: &str = "rocky.d.ts";

/// Maps checker-visible file names back to what the user passed in.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    names: FxHashMap<String, String>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a checker name. Returns the previous user name if the checker
    /// name was already taken.
    pub fn insert(
        &mut self,
        checker_name: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Option<String> {
        self.names.insert(checker_name.into(), user_name.into())
    }

    /// User-visible name for a checker name, if known.
    pub fn get(&self, checker_name: &str) -> Option<&str> {
        self.names.get(checker_name).map(String::as_str)
    }

    /// User-visible name, falling back to the checker's own name.
    pub fn display_name<'a>(&'a self, checker_name: &'a str) -> &'a str {
        self.get(checker_name).unwrap_or(checker_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// What a staged file was copied from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedSource {
    /// A user script, normalized.
    Input(PathBuf),
    /// A user declaration file, copied verbatim.
    Definition(PathBuf),
    /// The bundled `rocky.d.ts`.
    BundledDefinition,
}

/// A file in the workspace.
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Name relative to the workspace root, as the checker sees it.
    pub checker_name: String,
    /// Where the content came from.
    pub source: StagedSource,
}

/// Ephemeral project directory handed to the checker.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    files: Vec<StagedFile>,
    names: NameMap,
}

impl Workspace {
    /// Validate the inputs, then materialize the workspace.
    ///
    /// Nothing is written until every path has been validated.
    pub fn stage(
        inputs: &[PathBuf],
        definitions: &[PathBuf],
        options: &CompilerOptions,
    ) -> CanonResult<Self> {
        if inputs.is_empty() {
            return Err(CanonError::MissingInput);
        }

        // 1. Validate and name everything
        let mut names = NameMap::new();
        let mut files = Vec::with_capacity(inputs.len() + definitions.len().max(1));
        let mut claimed: FxHashMap<String, &Path> = FxHashMap::default();

        for input in inputs {
            let checker_name = input_checker_name(input)?;
            if let Some(first) = claimed.insert(checker_name.clone(), input.as_path()) {
                return Err(CanonError::DuplicateInput {
                    name: checker_name,
                    first: first.to_path_buf(),
                    second: input.clone(),
                });
            }
            names.insert(checker_name.clone(), input.display().to_string());
            files.push(StagedFile {
                checker_name,
                source: StagedSource::Input(input.clone()),
            });
        }

        if definitions.is_empty() {
            files.push(StagedFile {
                checker_name: format!("0_{}", BUNDLED_DEFINITIONS_NAME),
                source: StagedSource::BundledDefinition,
            });
        }
        for (index, definition) in definitions.iter().enumerate() {
            files.push(StagedFile {
                checker_name: definition_checker_name(index, definition)?,
                source: StagedSource::Definition(definition.clone()),
            });
        }

        // 2. Materialize
        let dir = tempfile::Builder::new().prefix("rocky-lint-").tempdir()?;
        tracing::info!("staging workspace in {}", dir.path().display());

        let workspace = Self { dir, files, names };
        workspace.materialize(options)?;
        Ok(workspace)
    }

    fn materialize(&self, options: &CompilerOptions) -> CanonResult<()> {
        for file in &self.files {
            let dest = self.root().join(&file.checker_name);
            match &file.source {
                StagedSource::Input(path) => {
                    let content = std::fs::read_to_string(path)?;
                    std::fs::write(&dest, normalize_annotations(&content).as_bytes())?;
                }
                StagedSource::Definition(path) => {
                    std::fs::copy(path, &dest)?;
                }
                StagedSource::BundledDefinition => {
                    std::fs::write(&dest, BUNDLED_DEFINITIONS)?;
                }
            }
            tracing::debug!("staged {:?} as {}", file.source, file.checker_name);
        }

        let tsconfig = self.generate_tsconfig(options)?;
        std::fs::write(self.root().join("tsconfig.json"), tsconfig)?;

        Ok(())
    }

    /// Generate tsconfig.json for the staged files.
    fn generate_tsconfig(&self, options: &CompilerOptions) -> CanonResult<String> {
        let config = serde_json::json!({
            "compilerOptions": options,
            "files": self.checker_names(),
        });

        Ok(serde_json::to_string_pretty(&config)?)
    }

    /// Workspace root directory.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Staged files, inputs first.
    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    /// Checker-visible names of all staged files.
    pub fn checker_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.checker_name.clone()).collect()
    }

    /// Name map for the staged inputs.
    pub fn names(&self) -> &NameMap {
        &self.names
    }

    /// Make the workspace root the process working directory.
    ///
    /// The checker resolves relative module names from there.
    pub fn enter(&self) -> CanonResult<()> {
        std::env::set_current_dir(self.root())?;
        Ok(())
    }
}

/// `path/to/face.js` -> `face.ts`
fn input_checker_name(path: &Path) -> CanonResult<String> {
    let ext = path.extension().and_then(|e| e.to_str());
    let stem = path.file_stem().and_then(|s| s.to_str());

    let (Some("js" | "ts"), Some(stem)) = (ext, stem) else {
        return Err(CanonError::InvalidInput {
            path: path.to_path_buf(),
        });
    };
    if !path.is_file() {
        return Err(CanonError::NotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(format!("{}.ts", stem))
}

/// `lib/rocky.d.ts` at index 1 -> `1_rocky.d.ts`
fn definition_checker_name(index: usize, path: &Path) -> CanonResult<String> {
    let ext = path.extension().and_then(|e| e.to_str());
    let file_name = path.file_name().and_then(|n| n.to_str());

    let (Some("ts"), Some(file_name)) = (ext, file_name) else {
        return Err(CanonError::InvalidDefinition {
            path: path.to_path_buf(),
        });
    };
    if !path.is_file() {
        return Err(CanonError::NotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(format!("{}_{}", index, file_name))
}
