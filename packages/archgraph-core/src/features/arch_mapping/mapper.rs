//! Raw facts -> ArchJSON document

use rustc_hash::FxHashSet;
use tracing::info;

use crate::errors::Result;
use crate::features::structural_matching::InferredImplementation;
use crate::shared::models::{
    ArchJson, Entity, EntityKind, Member, MemberKind, Parameter, RawField, RawFunc, RawPackage,
    RawProject, RawType, Relation, RelationType, SourceLocation, Visibility,
};
use crate::shared::utils::TypeIndex;

#[derive(Debug, Clone, Copy, Default)]
pub struct ArchJsonMapper;

impl ArchJsonMapper {
    /// One entity per struct and interface, implementation relations from
    /// the matcher, composition relations from resolvable field types.
    ///
    /// Fails only when two declarations produce the same entity id.
    pub fn map(project: &RawProject, implementations: &[InferredImplementation]) -> Result<ArchJson> {
        let mut entities = Vec::new();
        let mut source_files: Vec<String> = Vec::new();
        let mut seen_files: FxHashSet<&str> = FxHashSet::default();

        for pkg in &project.packages {
            for file in &pkg.source_files {
                if seen_files.insert(file.as_str()) {
                    source_files.push(file.clone());
                }
            }
            entities.extend(pkg.structs.iter().map(|t| Self::entity(pkg, t, EntityKind::Struct)));
            entities.extend(
                pkg.interfaces
                    .iter()
                    .map(|t| Self::entity(pkg, t, EntityKind::Interface)),
            );
        }

        let mut relations = RelationSet::default();
        for imp in implementations {
            let source = imp.struct_id();
            let target = imp.interface_id();
            relations.push(
                Relation::explicit(
                    format!("{}-implementation-{}", source, target),
                    RelationType::Implementation,
                    source,
                    target,
                )
                .with_inference(imp.inference_source(), imp.confidence()),
            );
        }

        let index = TypeIndex::build(project);
        for pkg in &project.packages {
            for st in &pkg.structs {
                let owner = format!("{}.{}", pkg.path(), st.name);
                for field in &st.fields {
                    let Some(target) = index.resolve(pkg.path(), &field.type_name) else {
                        continue;
                    };
                    if target == owner {
                        continue;
                    }
                    relations.push(Relation::explicit(
                        format!("{}-composition-{}", owner, target),
                        RelationType::Composition,
                        owner.clone(),
                        target,
                    ));
                }
            }
        }

        let mut doc = ArchJson::new(project.language)
            .with_entities(entities)
            .with_relations(relations.into_vec());
        doc.source_files = source_files;
        doc.ensure_unique_ids()?;

        info!(
            "arch json: {} entities, {} relations",
            doc.entities.len(),
            doc.relations.len()
        );
        Ok(doc)
    }

    fn entity(pkg: &RawPackage, ty: &RawType, kind: EntityKind) -> Entity {
        let abstract_methods = kind == EntityKind::Interface;
        let members = ty
            .fields
            .iter()
            .map(Self::field_member)
            .chain(ty.methods.iter().map(|m| Self::method_member(m, abstract_methods)))
            .collect();

        Entity::new(
            format!("{}.{}", pkg.path(), ty.name),
            ty.name.clone(),
            kind,
            SourceLocation::new(
                ty.location.file.clone(),
                ty.location.start_line,
                ty.location.end_line,
            ),
        )
        .with_visibility(Visibility::from_exported(ty.exported))
        .with_members(members)
    }

    fn field_member(field: &RawField) -> Member {
        Member::new(
            field.name.clone(),
            MemberKind::Field,
            Visibility::from_exported(field.exported),
        )
        .with_field_type(field.type_name.clone())
    }

    fn method_member(func: &RawFunc, is_abstract: bool) -> Member {
        let parameters = func
            .parameters
            .iter()
            .map(|p| Parameter {
                name: p.name.clone(),
                type_name: p.type_name.clone(),
            })
            .collect();
        let mut member = Member::new(
            func.name.clone(),
            MemberKind::Method,
            Visibility::from_exported(func.exported),
        )
        .with_parameters(parameters);
        member.is_abstract = is_abstract;
        match func.return_types.as_slice() {
            [] => member,
            [single] => member.with_return_type(single.clone()),
            many => member.with_return_type(format!("({})", many.join(", "))),
        }
    }
}

/// Relations deduplicated per (source, target, type), first kept
#[derive(Debug, Default)]
struct RelationSet {
    relations: Vec<Relation>,
    keys: FxHashSet<(String, String, RelationType)>,
}

impl RelationSet {
    fn push(&mut self, relation: Relation) {
        let key = (
            relation.source.clone(),
            relation.target.clone(),
            relation.relation_type,
        );
        if self.keys.insert(key) {
            self.relations.push(relation);
        }
    }

    fn into_vec(self) -> Vec<Relation> {
        self.relations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use crate::features::structural_matching::StructuralMatcher;
    use crate::shared::models::{InferenceSource, RawLocation, RawParam};
    use pretty_assertions::assert_eq;

    fn method(name: &str, exported: bool, returns: &[&str]) -> RawFunc {
        RawFunc {
            name: name.to_string(),
            receiver_type: None,
            parameters: vec![RawParam {
                name: "ctx".to_string(),
                type_name: "context.Context".to_string(),
            }],
            return_types: returns.iter().map(|r| r.to_string()).collect(),
            exported,
            location: RawLocation::new("pkg/svc/svc.go", 1, 1),
            body: None,
        }
    }

    fn ty(name: &str, methods: Vec<RawFunc>, fields: Vec<RawField>) -> RawType {
        RawType {
            name: name.to_string(),
            package_name: "svc".to_string(),
            fields,
            methods,
            exported: true,
            location: RawLocation::new("pkg/svc/svc.go", 3, 30),
        }
    }

    fn field(name: &str, type_name: &str) -> RawField {
        RawField {
            name: name.to_string(),
            type_name: type_name.to_string(),
            exported: false,
            location: None,
        }
    }

    fn project() -> RawProject {
        let mut svc = RawPackage::new("svc", "pkg/svc");
        svc.source_files = vec!["pkg/svc/svc.go".to_string()];
        svc.interfaces.push(ty(
            "Runner",
            vec![method("Start", true, &["error"]), method("Stop", true, &[])],
            vec![],
        ));
        svc.structs.push(ty(
            "Service",
            vec![
                method("Start", true, &["error"]),
                method("Stop", true, &[]),
                method("reset", false, &["int", "error"]),
            ],
            vec![field("cfg", "*Config"), field("cfg2", "Config"), field("log", "*zap.Logger")],
        ));
        svc.structs.push(ty("Config", vec![], vec![]));
        RawProject::default().with_package(svc)
    }

    #[test]
    fn test_entities_and_members() {
        let doc = ArchJsonMapper::map(&project(), &[]).unwrap();
        let ids: Vec<_> = doc.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["pkg/svc.Service", "pkg/svc.Config", "pkg/svc.Runner"]);

        let service = doc.entity("pkg/svc.Service").unwrap();
        assert_eq!(service.kind, EntityKind::Struct);
        assert_eq!(service.members.len(), 6);
        let reset = service.members.iter().find(|m| m.name == "reset").unwrap();
        assert_eq!(reset.visibility, Visibility::Private);
        assert_eq!(reset.return_type.as_deref(), Some("(int, error)"));

        let runner = doc.entity("pkg/svc.Runner").unwrap();
        assert!(runner.members.iter().all(|m| m.is_abstract));
        assert_eq!(doc.source_files, vec!["pkg/svc/svc.go".to_string()]);
    }

    #[test]
    fn test_relations() {
        let project = project();
        let matches = StructuralMatcher::default().match_heuristic(&project);
        let doc = ArchJsonMapper::map(&project, &matches.implementations).unwrap();

        let summary: Vec<_> = doc
            .relations
            .iter()
            .map(|r| (r.relation_type, r.target.as_str(), r.inference_source))
            .collect();
        assert_eq!(
            summary,
            vec![
                (RelationType::Implementation, "pkg/svc.Runner", InferenceSource::Inferred),
                (RelationType::Composition, "pkg/svc.Config", InferenceSource::Explicit),
            ]
        );
        assert_eq!(doc.relations[0].confidence, 1.0);
    }

    #[test]
    fn test_duplicate_entity_is_fatal() {
        let mut project = project();
        project.packages[0].structs.push(ty("Config", vec![], vec![]));
        let err = ArchJsonMapper::map(&project, &[]).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateEntityId { .. }));
    }

    #[test]
    fn test_empty_project() {
        let doc = ArchJsonMapper::map(&RawProject::default(), &[]).unwrap();
        assert!(doc.entities.is_empty());
        assert!(doc.relations.is_empty());
    }
}
