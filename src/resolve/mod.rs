//! Interface resolution: turns requested interface names into rendered
//! method signatures plus the packages those signatures depend on.

mod deps;
mod render;
mod scope;

use std::collections::HashSet;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::alias::ImportAliasTable;
use crate::error::{Error, PackageLoadError, Result};
use crate::ports::loader::PackageLoader;
use crate::types::{Declaration, LoadedPackage, TypeExpr};

use scope::ScopedResolver;

/// A package and the interfaces to mock from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Import path of the package.
    pub path: String,
    /// Interface names to mock, in request order.
    pub interfaces: IndexSet<String>,
}

impl PackageSpec {
    /// Creates a spec for `path` requesting `interfaces`.
    pub fn new<I, S>(path: impl Into<String>, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { path: path.into(), interfaces: interfaces.into_iter().map(Into::into).collect() }
    }
}

/// A package whose requested interfaces have been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Package name.
    pub name: String,
    /// Import path.
    pub path: String,
    /// Resolved interfaces in request order.
    pub interfaces: Vec<ResolvedInterface>,
}

impl ResolvedPackage {
    /// Every package path referenced by any interface, first-seen order.
    #[must_use]
    pub fn dependency_paths(&self) -> IndexSet<String> {
        let mut paths = IndexSet::new();
        for iface in &self.interfaces {
            for param in &iface.type_params {
                paths.extend(param.dependency_paths.iter().cloned());
            }
            for method in &iface.methods {
                paths.extend(method.dependency_paths());
            }
        }
        paths
    }
}

/// A resolved interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInterface {
    /// Interface name.
    pub name: String,
    /// Type parameters; empty for non-generic interfaces.
    pub type_params: Vec<ResolvedTypeParam>,
    /// Complete method set in declaration order.
    pub methods: Vec<Method>,
}

/// A type parameter of a generic interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTypeParam {
    /// Parameter name.
    pub name: String,
    /// Rendered constraint.
    pub constraint: String,
    /// Packages the constraint references.
    pub dependency_paths: IndexSet<String>,
}

/// A resolved method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Parameters.
    pub inputs: Vec<Tuple>,
    /// Results.
    pub outputs: Vec<Tuple>,
    /// Whether the final input is variadic; its type text is then a slice.
    pub variadic: bool,
}

impl Method {
    /// Packages referenced by inputs then outputs, first-seen order.
    pub fn dependency_paths(&self) -> impl Iterator<Item = String> + '_ {
        self.inputs
            .iter()
            .chain(&self.outputs)
            .flat_map(|tuple| tuple.dependency_paths.iter().cloned())
    }
}

/// A parameter or result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    /// Declared name, if any.
    pub variable_name: Option<String>,
    /// Type rendered with the generating scope's import names.
    pub type_text: String,
    /// Packages the type references.
    pub dependency_paths: IndexSet<String>,
}

/// Resolves every spec's interfaces using type information from `loader`.
///
/// Import names are allocated in `aliases` under each package's own path.
///
/// # Errors
///
/// - [`Error::InvalidInput`] for a spec without interfaces, a duplicated
///   path, an unknown interface name or a name that is not an interface.
/// - [`Error::ExternalLoad`] when any package fails to load.
/// - [`Error::Internal`] for loader results that do not match the request or
///   for type kinds the resolver does not handle.
pub fn resolve(
    loader: &dyn PackageLoader,
    specs: &[PackageSpec],
    aliases: &mut ImportAliasTable,
) -> Result<Vec<ResolvedPackage>> {
    validate(specs)?;

    let paths: Vec<String> = specs.iter().map(|spec| spec.path.clone()).collect();
    tracing::debug!(packages = paths.len(), "loading type information");
    let outcome = loader.load_packages(&paths).map_err(|e| {
        let message = e.to_string();
        Error::ExternalLoad(
            paths
                .iter()
                .map(|path| PackageLoadError { path: path.clone(), message: message.clone() })
                .collect(),
        )
    })?;

    if !outcome.errors.is_empty() {
        let mut errors = outcome.errors;
        errors.sort_by(|a, b| a.path.cmp(&b.path));
        return Err(Error::ExternalLoad(errors));
    }

    let mut loaded = outcome.packages;
    if let Some(stray) = loaded.keys().find(|path| !paths.contains(path)) {
        return Err(Error::Internal(format!("loader returned unrequested package {stray}")));
    }

    specs
        .iter()
        .map(|spec| {
            let package = loaded.swap_remove(&spec.path).ok_or_else(|| {
                Error::Internal(format!(
                    "package {} was neither loaded nor reported as failed",
                    spec.path
                ))
            })?;
            resolve_package(&package, spec, aliases)
        })
        .collect()
}

/// Rejects empty interface lists and duplicate paths, first problem wins.
fn validate(specs: &[PackageSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in specs {
        if spec.interfaces.is_empty() {
            return Err(Error::InvalidInput(format!(
                "package {} does not list any interfaces",
                spec.path
            )));
        }
        if !seen.insert(spec.path.as_str()) {
            return Err(Error::InvalidInput(format!("package {} is listed more than once", spec.path)));
        }
    }
    Ok(())
}

fn resolve_package(
    package: &LoadedPackage,
    spec: &PackageSpec,
    aliases: &mut ImportAliasTable,
) -> Result<ResolvedPackage> {
    let mut scope = ScopedResolver::new(aliases, &package.path);
    let mut interfaces = Vec::with_capacity(spec.interfaces.len());

    for name in &spec.interfaces {
        let Some(declaration) = package.lookup(name) else {
            return Err(Error::InvalidInput(format!(
                "interface {name} not found in package {}",
                package.path
            )));
        };
        let Declaration::Type { type_params, underlying: TypeExpr::Interface(iface) } = declaration
        else {
            return Err(Error::InvalidInput(format!(
                "{}.{name} is a {}, not an interface",
                package.path,
                declaration.kind_name()
            )));
        };

        let site = format!("{}.{name}", package.path);
        let type_params = type_params
            .iter()
            .map(|param| scope.type_param(param, &site))
            .collect::<Result<Vec<_>>>()?;
        let methods = scope.methods(&iface.methods, &site)?;
        tracing::debug!(interface = %site, methods = methods.len(), "resolved interface");

        interfaces.push(ResolvedInterface { name: name.clone(), type_params, methods });
    }

    Ok(ResolvedPackage { name: package.name.clone(), path: package.path.clone(), interfaces })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::adapters::memory::StaticPackageLoader;
    use crate::types::StructType;

    fn store_package() -> LoadedPackage {
        package(
            "example.com/app/store",
            "store",
            vec![
                (
                    "Store",
                    interface(vec![
                        method(
                            "Get",
                            vec![
                                var(Some("ctx"), named("context", "context", "Context")),
                                var(Some("key"), basic("string")),
                            ],
                            vec![
                                var(None, pointer(named("example.com/app/store", "store", "Item"))),
                                var(None, error_type()),
                            ],
                        ),
                        variadic_method(
                            "Log",
                            vec![var(Some("format"), basic("string")), var(Some("args"), slice(basic("any")))],
                            vec![],
                        ),
                    ]),
                ),
                ("Clock", interface(vec![method("Now", vec![], vec![var(None, named("time", "time", "Time"))])])),
                (
                    "Item",
                    Declaration::Type {
                        type_params: Vec::new(),
                        underlying: TypeExpr::Struct(StructType::default()),
                    },
                ),
            ],
        )
    }

    #[test]
    fn resolves_methods_with_rendered_types_and_dependencies() {
        let loader = StaticPackageLoader::new().with_package(store_package());
        let mut aliases = ImportAliasTable::new();
        let specs = [PackageSpec::new("example.com/app/store", ["Store", "Clock"])];

        let resolved = resolve(&loader, &specs, &mut aliases).unwrap();
        assert_eq!(resolved.len(), 1);
        let pkg = &resolved[0];
        assert_eq!(pkg.name, "store");
        assert_eq!(
            pkg.interfaces.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            ["Store", "Clock"]
        );

        let get = &pkg.interfaces[0].methods[0];
        assert_eq!(get.inputs[0].variable_name.as_deref(), Some("ctx"));
        assert_eq!(get.inputs[0].type_text, "context.Context");
        assert_eq!(get.outputs[0].type_text, "*store.Item");
        assert_eq!(get.outputs[1].type_text, "error");
        assert!(get.outputs[1].dependency_paths.is_empty());
        assert!(!get.variadic);

        let log = &pkg.interfaces[0].methods[1];
        assert!(log.variadic);
        assert_eq!(log.inputs[1].type_text, "[]any");

        assert_eq!(
            pkg.dependency_paths().into_iter().collect::<Vec<_>>(),
            ["context", "example.com/app/store", "time"]
        );
        assert_eq!(aliases.lookup("example.com/app/store", "time").unwrap().name, "time");
    }

    #[test]
    fn empty_interface_list_is_invalid_input() {
        let loader = StaticPackageLoader::new();
        let specs = [PackageSpec::new("example.com/app/store", Vec::<String>::new())];

        let err = resolve(&loader, &specs, &mut ImportAliasTable::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("example.com/app/store")));
        assert!(loader.requests().is_empty());
    }

    #[test]
    fn duplicate_path_is_invalid_input_before_loading() {
        let loader = StaticPackageLoader::new().with_package(store_package());
        let specs = [
            PackageSpec::new("github.com/my/pkg", ["A"]),
            PackageSpec::new("github.com/my/pkg", ["B"]),
        ];

        let err = resolve(&loader, &specs, &mut ImportAliasTable::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("more than once")));
        assert!(loader.requests().is_empty());
    }

    #[test]
    fn load_errors_are_aggregated_per_package() {
        let loader = StaticPackageLoader::new()
            .with_package(store_package())
            .with_error("example.com/z", "no Go files")
            .with_error("example.com/a", "syntax error");
        let specs = [
            PackageSpec::new("example.com/z", ["X"]),
            PackageSpec::new("example.com/app/store", ["Store"]),
            PackageSpec::new("example.com/a", ["Y"]),
        ];

        let err = resolve(&loader, &specs, &mut ImportAliasTable::new()).unwrap_err();
        let Error::ExternalLoad(errors) = err else {
            panic!("expected ExternalLoad, got {err}");
        };
        assert_eq!(
            errors.iter().map(|e| e.path.as_str()).collect::<Vec<_>>(),
            ["example.com/a", "example.com/z"]
        );
    }

    #[test]
    fn wholesale_load_failure_is_reported_for_every_requested_path() {
        let loader = StaticPackageLoader::new().failing("exporter exited with status 2");
        let specs = [
            PackageSpec::new("example.com/b", ["X"]),
            PackageSpec::new("example.com/a", ["Y"]),
        ];

        let err = resolve(&loader, &specs, &mut ImportAliasTable::new()).unwrap_err();
        let Error::ExternalLoad(errors) = err else {
            panic!("expected ExternalLoad, got {err}");
        };
        assert_eq!(
            errors.iter().map(|e| e.path.as_str()).collect::<Vec<_>>(),
            ["example.com/b", "example.com/a"]
        );
        assert!(errors.iter().all(|e| e.message == "exporter exited with status 2"));
        assert_eq!(loader.requests().len(), 1);
    }

    #[test]
    fn unknown_interface_name_is_invalid_input() {
        let loader = StaticPackageLoader::new().with_package(store_package());
        let specs = [PackageSpec::new("example.com/app/store", ["Missing"])];

        let err = resolve(&loader, &specs, &mut ImportAliasTable::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input: interface Missing not found in package example.com/app/store"
        );
    }

    #[test]
    fn non_interface_declaration_names_its_kind() {
        let loader = StaticPackageLoader::new().with_package(store_package());
        let specs = [PackageSpec::new("example.com/app/store", ["Item"])];

        let err = resolve(&loader, &specs, &mut ImportAliasTable::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input: example.com/app/store.Item is a struct, not an interface"
        );
    }

    #[test]
    fn unrequested_loaded_package_is_internal() {
        let loader = StaticPackageLoader::new()
            .with_package(store_package())
            .with_package(package("example.com/extra", "extra", vec![]))
            .serving_everything();
        let specs = [PackageSpec::new("example.com/app/store", ["Store"])];

        let err = resolve(&loader, &specs, &mut ImportAliasTable::new()).unwrap_err();
        assert!(matches!(err, Error::Internal(ref m) if m.contains("example.com/extra")));
    }

    #[test]
    fn unaccounted_spec_is_internal() {
        let loader = StaticPackageLoader::new();
        let specs = [PackageSpec::new("example.com/ghost", ["Ghost"])];

        let err = resolve(&loader, &specs, &mut ImportAliasTable::new()).unwrap_err();
        assert!(matches!(err, Error::Internal(ref m) if m.contains("example.com/ghost")));
    }

    #[test]
    fn generic_interface_resolves_constraints() {
        let pkg = package(
            "example.com/cache",
            "cache",
            vec![(
                "Cache",
                generic_interface(
                    vec![
                        ("K", TypeExpr::Named { name: "comparable".into(), package: None, type_args: vec![] }),
                        ("V", named("golang.org/x/exp/constraints", "constraints", "Ordered")),
                    ],
                    vec![method(
                        "Get",
                        vec![var(Some("key"), TypeExpr::TypeParam { name: "K".into() })],
                        vec![var(None, TypeExpr::TypeParam { name: "V".into() }), var(None, basic("bool"))],
                    )],
                ),
            )],
        );
        let loader = StaticPackageLoader::new().with_package(pkg);
        let specs = [PackageSpec::new("example.com/cache", ["Cache"])];

        let resolved = resolve(&loader, &specs, &mut ImportAliasTable::new()).unwrap();
        let iface = &resolved[0].interfaces[0];
        assert_eq!(iface.type_params[0].name, "K");
        assert_eq!(iface.type_params[0].constraint, "comparable");
        assert!(iface.type_params[0].dependency_paths.is_empty());
        assert_eq!(iface.type_params[1].constraint, "constraints.Ordered");
        assert_eq!(
            iface.type_params[1].dependency_paths.iter().collect::<Vec<_>>(),
            ["golang.org/x/exp/constraints"]
        );
        assert_eq!(iface.methods[0].inputs[0].type_text, "K");
        assert_eq!(
            resolved[0].dependency_paths().into_iter().collect::<Vec<_>>(),
            ["golang.org/x/exp/constraints"]
        );
    }

    #[test]
    fn unsupported_kind_is_internal_and_names_the_site() {
        let pkg = package(
            "example.com/odd",
            "odd",
            vec![("Odd", interface(vec![method("Do", vec![var(Some("x"), TypeExpr::Unsupported)], vec![])]))],
        );
        let loader = StaticPackageLoader::new().with_package(pkg);
        let specs = [PackageSpec::new("example.com/odd", ["Odd"])];

        let err = resolve(&loader, &specs, &mut ImportAliasTable::new()).unwrap_err();
        let Error::Internal(message) = err else {
            panic!("expected Internal, got {err}");
        };
        assert!(message.contains("example.com/odd.Odd.Do parameter 1"), "{message}");
    }

    #[test]
    fn colliding_package_names_share_one_table_per_scope() {
        let pkg = package(
            "example.com/app/svc",
            "svc",
            vec![(
                "Service",
                interface(vec![
                    method("A", vec![], vec![var(None, named("errors", "errors", "Kind"))]),
                    method(
                        "B",
                        vec![var(None, map(basic("string"), named("github.com/pkg/errors", "errors", "Frame")))],
                        vec![var(None, named("errors", "errors", "Kind"))],
                    ),
                ]),
            )],
        );
        let loader = StaticPackageLoader::new().with_package(pkg);
        let mut aliases = ImportAliasTable::new();
        let specs = [PackageSpec::new("example.com/app/svc", ["Service"])];

        let resolved = resolve(&loader, &specs, &mut aliases).unwrap();
        let b = &resolved[0].interfaces[0].methods[1];
        assert_eq!(b.inputs[0].type_text, "map[string]errors2.Frame");
        assert_eq!(b.outputs[0].type_text, "errors.Kind");
        assert!(aliases.lookup("example.com/app/svc", "github.com/pkg/errors").unwrap().is_alias);
    }
}
