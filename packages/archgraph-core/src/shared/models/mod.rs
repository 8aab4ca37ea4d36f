//! Shared models

mod arch_json;
mod raw;

pub use arch_json::{
    ArchExtensions, ArchJson, CodeLocation, Entity, EntityKind, InferenceSource, Member, MemberKind, Parameter,
    Relation, RelationType, SourceLocation, Visibility, ARCH_JSON_VERSION,
};
pub use raw::{
    ChannelOperation, DecodeReport, ModuleRequire, RawCall, RawChannelOp, RawField, RawFunc,
    RawFunctionBody, RawImport, RawLocation, RawPackage, RawParam, RawProject, RawSpawn, RawType,
    SkippedRecord,
};
