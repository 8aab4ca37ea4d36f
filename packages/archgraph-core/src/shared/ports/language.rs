//! Language abstraction
//!
//! The set of supported languages is fixed at build time, so plugins live in
//! a static registry behind one trait instead of being loaded at runtime.

use serde::{Deserialize, Serialize};

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    #[default]
    Go,
    Java,
    Python,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Java => "java",
            Language::Python => "python",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::TypeScript => &["ts", "tsx"],
            Language::Go => &["go"],
            Language::Java => &["java"],
            Language::Python => &["py", "pyi"],
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "ts" | "tsx" => Some(Language::TypeScript),
            "go" => Some(Language::Go),
            "java" => Some(Language::Java),
            "py" | "pyi" => Some(Language::Python),
            _ => None,
        }
    }

    pub fn from_file_path(path: &str) -> Option<Self> {
        path.rsplit('.').next().and_then(Self::from_extension)
    }
}

/// Classification of an import path relative to the analysed project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Std,
    Internal,
    External,
    Vendor,
}

/// Static description of a plugin
#[derive(Debug, Clone, Copy)]
pub struct PluginMetadata {
    pub name: &'static str,
    pub display_name: &'static str,
    pub file_extensions: &'static [&'static str],
    /// Files whose presence at the project root identifies the language
    pub project_markers: &'static [&'static str],
}

/// Data contract every language plugin fulfils
pub trait LanguagePlugin: Send + Sync {
    fn language(&self) -> Language;

    fn metadata(&self) -> PluginMetadata;

    /// Standard-library membership, decided over an explicit finite set
    fn is_standard_library(&self, import_path: &str) -> bool;

    fn classify_import(&self, import_path: &str, module_name: &str) -> ImportKind {
        if import_path.starts_with("vendor/") || import_path.contains("/vendor/") {
            return ImportKind::Vendor;
        }
        if import_path.starts_with("./") || import_path.starts_with("../") {
            return ImportKind::Internal;
        }
        if !module_name.is_empty() && import_path.starts_with(module_name) {
            return ImportKind::Internal;
        }
        if self.is_standard_library(import_path) {
            return ImportKind::Std;
        }
        ImportKind::External
    }

    fn can_handle(&self, path: &str) -> bool {
        Language::from_file_path(path) == Some(self.language())
    }
}

const GO_STDLIB: &[&str] = &[
    "archive", "bufio", "bytes", "cmp", "compress", "container", "context", "crypto",
    "database", "debug", "embed", "encoding", "errors", "expvar", "flag", "fmt", "go", "hash",
    "html", "image", "index", "io", "iter", "log", "maps", "math", "mime", "net", "os", "path",
    "plugin", "reflect", "regexp", "runtime", "slices", "sort", "strconv", "strings", "sync",
    "syscall", "testing", "text", "time", "unicode", "unique", "unsafe",
];

const NODE_BUILTINS: &[&str] = &[
    "assert", "buffer", "child_process", "cluster", "crypto", "dgram", "dns", "events", "fs",
    "http", "http2", "https", "net", "os", "path", "perf_hooks", "process", "querystring",
    "readline", "stream", "string_decoder", "timers", "tls", "url", "util", "v8", "vm",
    "worker_threads", "zlib",
];

const JAVA_STDLIB: &[&str] = &["java", "javax", "jdk", "sun"];

const PYTHON_STDLIB: &[&str] = &[
    "abc", "argparse", "asyncio", "base64", "collections", "contextlib", "copy", "csv",
    "dataclasses", "datetime", "enum", "functools", "hashlib", "http", "importlib", "inspect",
    "io", "itertools", "json", "logging", "math", "os", "pathlib", "pickle", "queue", "random",
    "re", "shutil", "socket", "sqlite3", "string", "subprocess", "sys", "tempfile", "threading",
    "time", "typing", "unittest", "urllib", "uuid",
];

/// Go plugin
#[derive(Debug, Default)]
pub struct GoPlugin;

impl LanguagePlugin for GoPlugin {
    fn language(&self) -> Language {
        Language::Go
    }

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "golang",
            display_name: "Go",
            file_extensions: Language::Go.extensions(),
            project_markers: &["go.mod"],
        }
    }

    fn is_standard_library(&self, import_path: &str) -> bool {
        let root = import_path.split('/').next().unwrap_or(import_path);
        GO_STDLIB.contains(&root)
    }
}

/// TypeScript plugin
#[derive(Debug, Default)]
pub struct TypeScriptPlugin;

impl LanguagePlugin for TypeScriptPlugin {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "typescript",
            display_name: "TypeScript",
            file_extensions: Language::TypeScript.extensions(),
            project_markers: &["tsconfig.json", "package.json"],
        }
    }

    fn is_standard_library(&self, import_path: &str) -> bool {
        let path = import_path.strip_prefix("node:").unwrap_or(import_path);
        let root = path.split('/').next().unwrap_or(path);
        NODE_BUILTINS.contains(&root)
    }
}

/// Java plugin
#[derive(Debug, Default)]
pub struct JavaPlugin;

impl LanguagePlugin for JavaPlugin {
    fn language(&self) -> Language {
        Language::Java
    }

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "java",
            display_name: "Java",
            file_extensions: Language::Java.extensions(),
            project_markers: &["pom.xml", "build.gradle", "build.gradle.kts"],
        }
    }

    fn is_standard_library(&self, import_path: &str) -> bool {
        let root = import_path.split('.').next().unwrap_or(import_path);
        JAVA_STDLIB.contains(&root)
    }
}

/// Python plugin
#[derive(Debug, Default)]
pub struct PythonPlugin;

impl LanguagePlugin for PythonPlugin {
    fn language(&self) -> Language {
        Language::Python
    }

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "python",
            display_name: "Python",
            file_extensions: Language::Python.extensions(),
            project_markers: &["pyproject.toml", "setup.py", "requirements.txt"],
        }
    }

    fn is_standard_library(&self, import_path: &str) -> bool {
        let root = import_path.split('.').next().unwrap_or(import_path);
        PYTHON_STDLIB.contains(&root)
    }
}

static BUILTIN_PLUGINS: [&dyn LanguagePlugin; 4] =
    [&GoPlugin, &TypeScriptPlugin, &JavaPlugin, &PythonPlugin];

/// Compile-time plugin registry
#[derive(Clone, Copy)]
pub struct PluginRegistry {
    plugins: &'static [&'static dyn LanguagePlugin],
}

impl PluginRegistry {
    pub fn builtin() -> Self {
        Self {
            plugins: &BUILTIN_PLUGINS,
        }
    }

    pub fn plugins(&self) -> &'static [&'static dyn LanguagePlugin] {
        self.plugins
    }

    /// Plugin for a language (every [`Language`] has one)
    pub fn for_language(&self, language: Language) -> &'static dyn LanguagePlugin {
        self.plugins
            .iter()
            .copied()
            .find(|p| p.language() == language)
            .unwrap_or(&GoPlugin)
    }

    /// Plugin selected by file extension
    pub fn for_path(&self, path: &str) -> Option<&'static dyn LanguagePlugin> {
        self.plugins.iter().copied().find(|p| p.can_handle(path))
    }

    /// Plugin selected by project-root marker files, in registry order
    pub fn for_project_markers(&self, root_files: &[&str]) -> Option<&'static dyn LanguagePlugin> {
        self.plugins.iter().copied().find(|p| {
            p.metadata()
                .project_markers
                .iter()
                .any(|marker| root_files.contains(marker))
        })
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
