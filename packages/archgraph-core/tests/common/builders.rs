//! Test data builders

use archgraph_core::shared::models::{
    RawCall, RawField, RawFunc, RawFunctionBody, RawImport, RawLocation, RawPackage, RawProject,
    RawSpawn, RawType,
};
use archgraph_core::Language;

/// Builder for RawProject
#[derive(Debug)]
pub struct ProjectBuilder {
    project: RawProject,
}

impl ProjectBuilder {
    pub fn go(module: &str) -> Self {
        Self {
            project: RawProject::new(Language::Go, module),
        }
    }

    pub fn package(mut self, pkg: PackageBuilder) -> Self {
        self.project.packages.push(pkg.build(&self.project.module_name));
        self
    }

    pub fn build(self) -> RawProject {
        self.project
    }
}

/// Builder for RawPackage; imports are module-relative
#[derive(Debug)]
pub struct PackageBuilder {
    name: String,
    path: String,
    imports: Vec<String>,
    structs: Vec<RawType>,
    interfaces: Vec<RawType>,
    functions: Vec<RawFunc>,
}

impl PackageBuilder {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            imports: Vec::new(),
            structs: Vec::new(),
            interfaces: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn imports(mut self, paths: &[&str]) -> Self {
        self.imports.extend(paths.iter().map(|p| p.to_string()));
        self
    }

    pub fn interface(mut self, name: &str, methods: &[&str]) -> Self {
        let file = self.file();
        self.interfaces.push(TypeBuilder::new(name, &file).methods(methods).build());
        self
    }

    pub fn strukt(mut self, ty: TypeBuilder) -> Self {
        self.structs.push(ty.build());
        self
    }

    pub fn function(mut self, func: RawFunc) -> Self {
        self.functions.push(func);
        self
    }

    pub fn file(&self) -> String {
        format!("{}/{}.go", self.path, self.name)
    }

    fn build(self, module: &str) -> RawPackage {
        let file = self.file();
        let mut pkg = RawPackage::new(self.name, self.path);
        pkg.source_files = vec![file.clone()];
        pkg.imports = self
            .imports
            .iter()
            .enumerate()
            .map(|(i, path)| RawImport {
                path: if module.is_empty() || is_stdlib(path) {
                    path.clone()
                } else {
                    format!("{}/{}", module, path)
                },
                alias: None,
                location: Some(RawLocation::new(file.clone(), i as u32 + 1, i as u32 + 1)),
            })
            .collect();
        pkg.structs = self.structs;
        pkg.interfaces = self.interfaces;
        pkg.functions = self.functions;
        pkg
    }
}

fn is_stdlib(path: &str) -> bool {
    !path.contains('.') && !path.starts_with("pkg/") && !path.starts_with("internal/")
}

/// Builder for RawType (struct or interface)
#[derive(Debug)]
pub struct TypeBuilder {
    ty: RawType,
}

impl TypeBuilder {
    pub fn new(name: &str, file: &str) -> Self {
        Self {
            ty: RawType {
                name: name.to_string(),
                package_name: String::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                exported: name.chars().next().is_some_and(char::is_uppercase),
                location: RawLocation::new(file, 1, 20),
            },
        }
    }

    pub fn methods(mut self, names: &[&str]) -> Self {
        let file = self.ty.location.file.clone();
        self.ty
            .methods
            .extend(names.iter().map(|n| FuncBuilder::new(n, &file).build()));
        self
    }

    pub fn method(mut self, func: RawFunc) -> Self {
        self.ty.methods.push(func);
        self
    }

    pub fn field(mut self, name: &str, type_name: &str) -> Self {
        self.ty.fields.push(RawField {
            name: name.to_string(),
            type_name: type_name.to_string(),
            exported: name.chars().next().is_some_and(char::is_uppercase),
            location: None,
        });
        self
    }

    pub fn build(self) -> RawType {
        self.ty
    }
}

/// Builder for RawFunc with an optional body
#[derive(Debug)]
pub struct FuncBuilder {
    func: RawFunc,
    line: u32,
}

impl FuncBuilder {
    pub fn new(name: &str, file: &str) -> Self {
        Self {
            func: RawFunc {
                name: name.to_string(),
                receiver_type: None,
                parameters: Vec::new(),
                return_types: Vec::new(),
                exported: name.chars().next().is_some_and(char::is_uppercase),
                location: RawLocation::new(file, 1, 50),
                body: None,
            },
            line: 2,
        }
    }

    /// `pkg.Name(args...)`; `pkg` may be empty for an unqualified call
    pub fn calls(mut self, pkg: &str, name: &str, args: &[&str]) -> Self {
        let call = self.call(pkg, name, args);
        self.body().calls.push(call);
        self
    }

    pub fn spawns(mut self, name: &str) -> Self {
        let call = self.call("", name, &[]);
        let location = call.location.clone();
        self.body().spawns.push(RawSpawn { call, location });
        self
    }

    pub fn with_body(mut self) -> Self {
        self.body();
        self
    }

    fn call(&mut self, pkg: &str, name: &str, args: &[&str]) -> RawCall {
        let line = self.line;
        self.line += 1;
        RawCall {
            function_name: name.to_string(),
            package_name: (!pkg.is_empty()).then(|| pkg.to_string()),
            receiver_type: None,
            args: args.iter().map(|a| a.to_string()).collect(),
            location: RawLocation::new(self.func.location.file.clone(), line, line),
        }
    }

    fn body(&mut self) -> &mut RawFunctionBody {
        self.func.body.get_or_insert_with(RawFunctionBody::default)
    }

    pub fn build(self) -> RawFunc {
        self.func
    }
}
