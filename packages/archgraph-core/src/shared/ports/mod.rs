//! Ports - boundaries to language plugins and external services

mod language;
mod semantic_oracle;

pub use language::{
    GoPlugin, ImportKind, JavaPlugin, Language, LanguagePlugin, PluginMetadata, PluginRegistry,
    PythonPlugin, TypeScriptPlugin,
};
pub use semantic_oracle::{OracleError, OracleImplementation, SemanticOracle};
