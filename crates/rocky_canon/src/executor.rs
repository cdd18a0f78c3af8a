//! Node.js executor for the TypeScript compiler.
//!
//! Runs the embedded bridge script (`bridge/check.js`) with node inside the
//! workspace and reads back every diagnostic list as one JSON document.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::checker::{CompilerOptions, Program, ProgramSnapshot, TypeChecker};
use crate::error::{CanonError, CanonResult, CheckerNotFoundError, MissingTool};

const BRIDGE_SOURCE: &str = include_str!("../bridge/check.js");
const BRIDGE_FILE_NAME: &str = ".rocky-lint-bridge.js";

/// Where to look for node and the typescript package.
#[derive(Debug, Clone, Default)]
pub struct NodeCheckerConfig {
    /// Explicit node executable.
    pub node: Option<PathBuf>,
    /// Explicit typescript package directory.
    pub typescript: Option<PathBuf>,
    /// Directory whose ancestors are searched for `node_modules/typescript`.
    pub search_root: PathBuf,
}

/// Checker backed by the TypeScript compiler API running in node.
#[derive(Debug, Clone)]
pub struct NodeChecker {
    node_path: PathBuf,
    typescript_path: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BridgeRequest<'a> {
    typescript: &'a Path,
    root_names: &'a [String],
    options: &'a CompilerOptions,
}

impl NodeChecker {
    /// Locate node and typescript.
    ///
    /// node: explicit path, `ROCKY_LINT_NODE`, then `PATH`.
    /// typescript: explicit path, `ROCKY_LINT_TYPESCRIPT`, `node_modules` in
    /// the search root or any ancestor, then the global npm root.
    pub fn new(config: &NodeCheckerConfig) -> Result<Self, CheckerNotFoundError> {
        let node_path = Self::find_node(config)
            .ok_or_else(|| CheckerNotFoundError::new(MissingTool::Node, &config.search_root))?;
        let typescript_path = Self::find_typescript(config).ok_or_else(|| {
            CheckerNotFoundError::new(MissingTool::TypeScript, &config.search_root)
        })?;

        tracing::info!("node: {}", node_path.display());
        tracing::info!("typescript: {}", typescript_path.display());

        Ok(Self {
            node_path,
            typescript_path,
        })
    }

    fn find_node(config: &NodeCheckerConfig) -> Option<PathBuf> {
        config
            .node
            .clone()
            .or_else(|| std::env::var_os("ROCKY_LINT_NODE").map(PathBuf::from))
            .map(|node| {
                // A bare command name is looked up on PATH
                if node.components().count() == 1 && node.is_relative() {
                    which::which(&node).unwrap_or_else(|_| config.search_root.join(&node))
                } else {
                    absolutize(node, &config.search_root)
                }
            })
            .or_else(|| which::which("node").ok())
    }

    fn find_typescript(config: &NodeCheckerConfig) -> Option<PathBuf> {
        if let Some(explicit) = config
            .typescript
            .clone()
            .or_else(|| std::env::var_os("ROCKY_LINT_TYPESCRIPT").map(PathBuf::from))
        {
            return Some(absolutize(explicit, &config.search_root));
        }

        config
            .search_root
            .ancestors()
            .map(|dir| dir.join("node_modules").join("typescript"))
            .find(|candidate| is_typescript_package(candidate))
            .or_else(|| {
                Self::global_npm_root()
                    .map(|root| root.join("typescript"))
                    .filter(|candidate| is_typescript_package(candidate))
            })
    }

    /// `npm root -g`
    fn global_npm_root() -> Option<PathBuf> {
        let npm = which::which("npm").ok()?;
        let output = Command::new(npm).args(["root", "-g"]).output().ok()?;
        if !output.status.success() {
            return None;
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!root.is_empty()).then(|| PathBuf::from(root))
    }

    /// Get the node path.
    pub fn node_path(&self) -> &Path {
        &self.node_path
    }

    /// Get the typescript package path.
    pub fn typescript_path(&self) -> &Path {
        &self.typescript_path
    }
}

/// The bridge runs inside the workspace, so relative overrides are pinned to
/// the launch directory first.
fn absolutize(path: PathBuf, base: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}

fn is_typescript_package(dir: &Path) -> bool {
    dir.join("package.json").is_file()
}

impl TypeChecker for NodeChecker {
    fn create_program(
        &self,
        root: &Path,
        files: &[String],
        options: &CompilerOptions,
    ) -> CanonResult<Box<dyn Program>> {
        let bridge = root.join(BRIDGE_FILE_NAME);
        std::fs::write(&bridge, BRIDGE_SOURCE)?;

        let request = serde_json::to_vec(&BridgeRequest {
            typescript: &self.typescript_path,
            root_names: files,
            options,
        })?;
        tracing::debug!("bridge request: {}", String::from_utf8_lossy(&request));

        let mut child = Command::new(&self.node_path)
            .arg(&bridge)
            .current_dir(root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // The bridge reads all of stdin before writing anything.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&request)?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(CanonError::CheckerExecution {
                exit_code: output.status.code().unwrap_or(-1),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let snapshot: ProgramSnapshot = serde_json::from_slice(&output.stdout)?;
        tracing::info!("checker reported {} diagnostics", snapshot.len());

        Ok(Box::new(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCategory;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_paths_win() {
        let config = NodeCheckerConfig {
            node: Some(PathBuf::from("/opt/node/bin/node")),
            typescript: Some(PathBuf::from("/opt/typescript")),
            search_root: PathBuf::from("/"),
        };

        let checker = NodeChecker::new(&config).unwrap();
        assert_eq!(checker.node_path(), Path::new("/opt/node/bin/node"));
        assert_eq!(checker.typescript_path(), Path::new("/opt/typescript"));
    }

    #[test]
    fn test_finds_typescript_in_ancestor() {
        let project = TempDir::new().unwrap();
        let package = project.path().join("node_modules").join("typescript");
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join("package.json"), r#"{ "name": "typescript" }"#).unwrap();
        let nested = project.path().join("src").join("watchface");
        std::fs::create_dir_all(&nested).unwrap();

        let config = NodeCheckerConfig {
            node: Some(PathBuf::from("node")),
            typescript: None,
            search_root: nested,
        };

        // Only meaningful when the env override is unset.
        if std::env::var_os("ROCKY_LINT_TYPESCRIPT").is_none() {
            assert_eq!(NodeChecker::find_typescript(&config), Some(package));
        }
    }

    #[test]
    fn test_relative_overrides_resolve_against_search_root() {
        let config = NodeCheckerConfig {
            node: Some(PathBuf::from("tools/node/bin/node")),
            typescript: Some(PathBuf::from("tools/ts")),
            search_root: PathBuf::from("/home/pebble/watchface"),
        };

        let checker = NodeChecker::new(&config).unwrap();
        assert_eq!(
            checker.node_path(),
            Path::new("/home/pebble/watchface/tools/node/bin/node")
        );
        assert_eq!(
            checker.typescript_path(),
            Path::new("/home/pebble/watchface/tools/ts")
        );
    }

    /// Just enough of the compiler API for the bridge.
    const FAKE_TYPESCRIPT: &str = r#"
const path = require('path');
const face = { fileName: path.join(process.cwd(), 'face.ts'), text: 'rocky.on("draw", 1);\n' };
const dom = { fileName: '/opt/ts/lib/lib.dom.d.ts', text: 'declare var x: any;\n' };
module.exports = {
  convertCompilerOptionsFromJson(options) {
    return {
      options,
      errors: [{ category: 1, code: 5023, messageText: "Unknown compiler option 'bogus'." }],
    };
  },
  createProgram(rootNames, options) {
    return {
      getOptionsDiagnostics: () => [],
      getGlobalDiagnostics: () => [],
      getSyntacticDiagnostics: () => [],
      getSemanticDiagnostics: () => [
        {
          file: face, start: 17, length: 1, category: 1, code: 2345,
          messageText: {
            messageText: 'head', category: 1, code: 2345,
            next: [
              {
                messageText: 'child', category: 1, code: 2322,
                next: { messageText: 'grandchild', category: 3, code: 2200 },
              },
              { messageText: 'sibling', category: 1, code: 2326 },
            ],
          },
        },
        { file: dom, start: 12, length: 3, category: 1, code: 2300, messageText: 'Duplicate.' },
      ],
    };
  },
};
"#;

    #[test]
    fn test_bridge_output() {
        let Ok(node) = which::which("node") else {
            return;
        };
        let typescript = TempDir::new().unwrap();
        std::fs::write(typescript.path().join("index.js"), FAKE_TYPESCRIPT).unwrap();
        let root = TempDir::new().unwrap();

        let checker = NodeChecker::new(&NodeCheckerConfig {
            node: Some(node),
            typescript: Some(typescript.path().to_path_buf()),
            search_root: root.path().to_path_buf(),
        })
        .unwrap();
        let program = checker
            .create_program(root.path(), &["face.ts".to_string()], &CompilerOptions::default())
            .unwrap();

        // Option conversion errors come first in the options list
        let options = program.options_diagnostics();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].file, None);
        assert_eq!(options[0].code, 5023);

        let semantic = program.semantic_diagnostics();
        assert_eq!(semantic.len(), 2);
        assert_eq!(semantic[0].file.as_deref(), Some("face.ts"));
        assert_eq!(semantic[0].start, 17);
        let chain: Vec<_> = semantic[0]
            .messages()
            .map(|node| (node.text.as_str(), node.code, node.depth))
            .collect();
        assert_eq!(
            chain,
            vec![
                ("head", 2345, 0),
                ("child", 2322, 1),
                ("grandchild", 2200, 2),
                ("sibling", 2326, 1),
            ]
        );
        assert_eq!(semantic[0].chain[2].category, DiagnosticCategory::Message);

        // Files outside the workspace keep their full name
        assert_eq!(semantic[1].file.as_deref(), Some("/opt/ts/lib/lib.dom.d.ts"));
        assert_eq!(semantic[1].chain.len(), 1);
        assert_eq!(semantic[1].head_text(), "Duplicate.");

        assert_eq!(program.source_text("face.ts"), Some("rocky.on(\"draw\", 1);\n"));
        assert_eq!(
            program.source_text("/opt/ts/lib/lib.dom.d.ts"),
            Some("declare var x: any;\n")
        );
    }

    #[test]
    fn test_bridge_request_shape() {
        let files = vec!["face.ts".to_string(), "0_rocky.d.ts".to_string()];
        let options = CompilerOptions::default();
        let request = serde_json::to_value(BridgeRequest {
            typescript: Path::new("/opt/typescript"),
            root_names: &files,
            options: &options,
        })
        .unwrap();

        assert_eq!(request["typescript"], "/opt/typescript");
        assert_eq!(request["rootNames"][1], "0_rocky.d.ts");
        assert_eq!(request["options"]["target"], "es5");
    }
}
