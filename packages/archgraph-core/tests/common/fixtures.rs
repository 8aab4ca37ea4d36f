//! Shared fixtures

use archgraph_core::shared::models::{
    Entity, EntityKind, Member, MemberKind, RawProject, Relation, RelationType, SourceLocation,
    Visibility,
};
use archgraph_core::{ArchJson, Language};

use super::builders::{FuncBuilder, PackageBuilder, ProjectBuilder, TypeBuilder};

pub const SHOP_MODULE: &str = "example.com/shop";

/// Small web service:
///
/// - `pkg/store`: `Store` interface, `SQLStore` implementation
/// - `pkg/service`: `Runner` and empty `Marker` interfaces, `UserService`
///   holding a `store.Store` and a concrete `*Cache`
/// - `pkg/api`: net/http routes, one named and one anonymous handler
/// - `cmd/shop`: `main`, spawning a background worker
pub fn shop_project() -> RawProject {
    let store = PackageBuilder::new("store", "pkg/store")
        .interface("Store", &["Get", "Put"])
        .strukt(TypeBuilder::new("SQLStore", "pkg/store/store.go").methods(&["Get", "Put", "Close"]));

    let service = PackageBuilder::new("service", "pkg/service")
        .imports(&["pkg/store", "context"])
        .interface("Runner", &["Start", "Stop"])
        .interface("Marker", &[])
        .strukt(
            TypeBuilder::new("UserService", "pkg/service/service.go")
                .methods(&["Start", "Stop", "Create", "reset"])
                .field("store", "store.Store")
                .field("cache", "*Cache")
                .field("log", "*zap.Logger"),
        )
        .strukt(TypeBuilder::new("Cache", "pkg/service/service.go"));

    let api_file = "pkg/api/api.go";
    let api = PackageBuilder::new("api", "pkg/api")
        .imports(&["pkg/service", "net/http", "fmt"])
        .function(
            FuncBuilder::new("Register", api_file)
                .calls("http", "HandleFunc", &["\"/users\"", "listUsers"])
                .calls(
                    "http",
                    "HandleFunc",
                    &["\"/health\"", "func(w http.ResponseWriter, r *http.Request) {}"],
                )
                .build(),
        )
        .function(
            FuncBuilder::new("listUsers", api_file)
                .calls("fmt", "Sprintf", &[])
                .calls("ctx", "Done", &[])
                .calls("userService", "Create", &[])
                .build(),
        );

    let main = PackageBuilder::new("main", "cmd/shop")
        .imports(&["pkg/api"])
        .function(
            FuncBuilder::new("main", "cmd/shop/main.go")
                .calls("api", "Register", &[])
                .spawns("worker")
                .build(),
        );

    ProjectBuilder::go(SHOP_MODULE)
        .package(store)
        .package(service)
        .package(api)
        .package(main)
        .build()
}

/// Packages importing each other in a ring: `pkg/p0 → pkg/p1 → … → pkg/p0`
pub fn import_ring(len: usize) -> RawProject {
    (0..len)
        .fold(ProjectBuilder::go(SHOP_MODULE), |builder, i| {
            let target = format!("pkg/p{}", (i + 1) % len);
            builder.package(
                PackageBuilder::new(&format!("p{}", i), &format!("pkg/p{}", i))
                    .imports(&[target.as_str()]),
            )
        })
        .build()
}

/// Entity with one member of each visibility
pub fn class_entity(id: &str, file: &str) -> Entity {
    Entity::new(id, id, EntityKind::Class, SourceLocation::new(file, 1, 30)).with_members(vec![
        Member::new("run", MemberKind::Method, Visibility::Public),
        Member::new("state", MemberKind::Field, Visibility::Private),
        Member::new("hook", MemberKind::Method, Visibility::Protected),
    ])
}

pub fn dependency(source: &str, target: &str) -> Relation {
    Relation::explicit(
        format!("{}-dependency-{}", source, target),
        RelationType::Dependency,
        source,
        target,
    )
}

/// TypeScript-shaped document spread over `src/<dir>/...`
pub fn layered_document() -> ArchJson {
    ArchJson::new(Language::TypeScript)
        .with_entities(vec![
            class_entity("Parser", "src/parser/parser.ts"),
            class_entity("Lexer", "src/parser/lexer.ts"),
            class_entity("AnalyzeCommand", "src/cli/commands/analyze.ts"),
            class_entity("Config", "src/config.ts"),
        ])
        .with_relations(vec![
            dependency("AnalyzeCommand", "Parser"),
            dependency("AnalyzeCommand", "Lexer"),
            dependency("Parser", "Lexer"),
            dependency("AnalyzeCommand", "Config"),
            dependency("Config", "AnalyzeCommand"),
        ])
}
