//! Error types for staging and checking.

use std::path::{Path, PathBuf};

/// Error type for rocky_canon operations.
#[derive(Debug, thiserror::Error)]
pub enum CanonError {
    /// No input script was given.
    #[error("no input file given")]
    MissingInput,

    /// Input or definition file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Input script has an extension the checker cannot stage.
    #[error("input file must end in .js or .ts: {}", path.display())]
    InvalidInput { path: PathBuf },

    /// Definition file is not a TypeScript declaration.
    #[error("definition file must end in .ts or .d.ts: {}", path.display())]
    InvalidDefinition { path: PathBuf },

    /// Two inputs would be staged under the same name.
    #[error(
        "input files {} and {} would both be checked as {name}",
        first.display(),
        second.display()
    )]
    DuplicateInput {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Node.js or the TypeScript package could not be located.
    #[error("{0}")]
    CheckerNotFound(#[from] CheckerNotFoundError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The checker process failed.
    #[error("checker error (exit code {exit_code}): {message}")]
    CheckerExecution { exit_code: i32, message: String },

    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl CanonError {
    /// Whether the error stems from how the tool was invoked, as opposed to
    /// a fault in the environment or the checker.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::MissingInput
                | Self::NotFound { .. }
                | Self::InvalidInput { .. }
                | Self::InvalidDefinition { .. }
                | Self::DuplicateInput { .. }
        )
    }
}

/// Result type for rocky_canon operations.
pub type CanonResult<T> = Result<T, CanonError>;

/// Package manager type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Pnpm,
    Npm,
    Yarn,
    Bun,
}

/// Which half of the checker toolchain is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingTool {
    Node,
    TypeScript,
}

/// Error when node or the typescript package is not found.
#[derive(Debug)]
pub struct CheckerNotFoundError {
    missing: MissingTool,
    detected_pm: Option<PackageManager>,
}

impl CheckerNotFoundError {
    /// Create a new CheckerNotFoundError.
    pub fn new(missing: MissingTool, project_root: &Path) -> Self {
        let detected_pm = detect_package_manager(project_root);
        Self {
            missing,
            detected_pm,
        }
    }

    /// The tool that could not be found.
    pub fn missing(&self) -> MissingTool {
        self.missing
    }

    /// Get the detected package manager.
    pub fn detected_package_manager(&self) -> Option<PackageManager> {
        self.detected_pm
    }

    /// Generate CLI error message with installation instructions.
    pub fn display_message(&self) -> String {
        let mut msg = String::new();

        match self.missing {
            MissingTool::Node => {
                msg.push_str("error: node not found\n\n");
                msg.push_str("rocky-lint runs the TypeScript compiler through Node.js.\n");
                msg.push_str("Install Node.js or set ROCKY_LINT_NODE to its executable.\n");
                return msg;
            }
            MissingTool::TypeScript => {
                msg.push_str("error: typescript not found\n\n");
                msg.push_str("rocky-lint requires the 'typescript' package to be installed.\n");
                msg.push_str("Set ROCKY_LINT_TYPESCRIPT to point at an existing install.\n\n");
            }
        }

        if let Some(pm) = self.detected_pm {
            msg.push_str("To install, run:\n\n");
            msg.push_str(&format!("  {}\n", self.install_command(pm)));
        } else {
            msg.push_str("To install, run one of the following:\n\n");
            msg.push_str(&format!(
                "  {}  # npm\n",
                self.install_command(PackageManager::Npm)
            ));
            msg.push_str(&format!(
                "  {}  # pnpm\n",
                self.install_command(PackageManager::Pnpm)
            ));
            msg.push_str(&format!(
                "  {}  # yarn\n",
                self.install_command(PackageManager::Yarn)
            ));
            msg.push_str(&format!(
                "  {}  # bun\n",
                self.install_command(PackageManager::Bun)
            ));
        }

        msg
    }

    fn install_command(&self, pm: PackageManager) -> &'static str {
        match pm {
            PackageManager::Npm => "npm install -D typescript",
            PackageManager::Pnpm => "pnpm add -D typescript",
            PackageManager::Yarn => "yarn add -D typescript",
            PackageManager::Bun => "bun add -D typescript",
        }
    }
}

impl std::fmt::Display for CheckerNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_message())
    }
}

impl std::error::Error for CheckerNotFoundError {}

/// Detect the project's package manager.
pub fn detect_package_manager(project_root: &Path) -> Option<PackageManager> {
    // 1. Lockfiles, in priority order
    if project_root.join("pnpm-lock.yaml").exists() {
        return Some(PackageManager::Pnpm);
    }
    if project_root.join("bun.lockb").exists() || project_root.join("bun.lock").exists() {
        return Some(PackageManager::Bun);
    }
    if project_root.join("yarn.lock").exists() {
        return Some(PackageManager::Yarn);
    }
    if project_root.join("package-lock.json").exists() {
        return Some(PackageManager::Npm);
    }

    // 2. package.json packageManager field
    let pkg_json = project_root.join("package.json");
    let content = std::fs::read_to_string(pkg_json).ok()?;
    let json = serde_json::from_str::<serde_json::Value>(&content).ok()?;
    let pm = json.get("packageManager").and_then(|v| v.as_str())?;

    [
        ("pnpm", PackageManager::Pnpm),
        ("yarn", PackageManager::Yarn),
        ("bun", PackageManager::Bun),
        ("npm", PackageManager::Npm),
    ]
    .into_iter()
    .find(|(prefix, _)| pm.starts_with(*prefix))
    .map(|(_, manager)| manager)
}
