//! Go source for mock implementations.
//!
//! Each resolved package becomes one file holding a mock per interface. A
//! mock records every call and delegates to a caller-supplied function
//! field, reporting through `testing.TB` when that field is unset.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::alias::ImportAliasTable;
use crate::error::{Error, Result};
use crate::resolve::{Method, ResolvedInterface, ResolvedPackage, ResolvedTypeParam};

/// Generated source for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMock {
    /// The package the mocks implement interfaces from.
    pub package: ResolvedPackage,
    /// Complete Go source of the mock file.
    pub source: String,
}

/// Emits the mock file for `pkg`.
///
/// Imports for `sync`, `testing` and `pkg` itself are allocated in the
/// package's scope of `aliases`, alongside whatever resolution allocated.
///
/// # Errors
///
/// - [`Error::InvalidInput`] when two generated identifiers would share a
///   name, such as the `ListCalls` accessor of `List` and a method named
///   `ListCalls`.
/// - [`Error::Internal`] when `pkg` has no interfaces, when a referenced
///   package has no import allocated in its scope or when a variadic
///   method's final input is not a slice.
pub fn synthesize(pkg: &ResolvedPackage, aliases: &mut ImportAliasTable) -> Result<String> {
    if pkg.interfaces.is_empty() {
        return Err(Error::Internal(format!("package {} has no interfaces to mock", pkg.path)));
    }
    check_names(pkg)?;

    for path in pkg.dependency_paths() {
        if aliases.lookup(&pkg.path, &path).is_none() {
            return Err(Error::Internal(format!(
                "package {} references {path} but no import was allocated for it",
                pkg.path
            )));
        }
    }

    let names = Names {
        sync: aliases.alias_for(&pkg.path, "sync", "sync"),
        testing: aliases.alias_for(&pkg.path, "testing", "testing"),
        // Generic mocks carry no assertion, so the package is only imported
        // when something refers to it.
        own: if pkg.interfaces.iter().any(|iface| iface.type_params.is_empty()) {
            Some(aliases.alias_for(&pkg.path, &pkg.path, &pkg.name))
        } else {
            aliases.lookup(&pkg.path, &pkg.path).map(|chosen| chosen.name.clone())
        },
    };

    let mut out = String::new();
    let _ = writeln!(out, "// Code generated by mockwright. DO NOT EDIT.");
    let _ = writeln!(out);
    let _ = writeln!(out, "package mock_{}", pkg.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "import (");
    for import in aliases.export(&pkg.path) {
        if import.is_alias {
            let _ = writeln!(out, "\t{} \"{}\"", import.name, import.path);
        } else {
            let _ = writeln!(out, "\t\"{}\"", import.path);
        }
    }
    let _ = writeln!(out, ")");

    for iface in &pkg.interfaces {
        write_interface(&mut out, pkg, iface, &names)?;
    }

    tracing::debug!(package = %pkg.path, bytes = out.len(), "synthesized mock source");
    Ok(out)
}

/// Identifiers declared in one Go scope, each with what it was generated for.
struct Declared<'a> {
    package: &'a str,
    names: HashMap<String, String>,
}

impl<'a> Declared<'a> {
    fn new(package: &'a str) -> Self {
        Self { package, names: HashMap::new() }
    }

    fn insert(&mut self, name: String, owner: String) -> Result<()> {
        if let Some(existing) = self.names.get(&name) {
            return Err(Error::InvalidInput(format!(
                "cannot mock package {}: {name} would be declared for both {existing} and {owner}",
                self.package
            )));
        }
        self.names.insert(name, owner);
        Ok(())
    }
}

/// Rejects interfaces whose mocks would declare one identifier twice, at
/// package level or among a mock's fields and methods.
fn check_names(pkg: &ResolvedPackage) -> Result<()> {
    let mut package_scope = Declared::new(&pkg.path);
    for iface in &pkg.interfaces {
        let mock = format!("Mock{}", iface.name);
        package_scope.insert(mock.clone(), format!("the mock of {}", iface.name))?;
        package_scope.insert(format!("New{mock}"), format!("the constructor of {mock}"))?;

        let mut members = Declared::new(&pkg.path);
        members.insert("t".to_string(), format!("the testing.TB field of {mock}"))?;
        members.insert("mu".to_string(), format!("the mutex field of {mock}"))?;
        for method in &iface.methods {
            let name = &method.name;
            let site = format!("{}.{name}", iface.name);
            package_scope.insert(format!("{mock}{name}Call"), format!("the call record of {site}"))?;
            members.insert(name.clone(), format!("method {site}"))?;
            members.insert(format!("{name}Func"), format!("the function field of {site}"))?;
            members.insert(format!("calls{name}"), format!("the call log of {site}"))?;
            members.insert(format!("{name}Calls"), format!("the call accessor of {site}"))?;
        }
    }
    Ok(())
}

/// Import names the generated code itself needs.
struct Names {
    sync: String,
    testing: String,
    own: Option<String>,
}

fn write_interface(
    out: &mut String,
    pkg: &ResolvedPackage,
    iface: &ResolvedInterface,
    names: &Names,
) -> Result<()> {
    let mock = format!("Mock{}", iface.name);
    let decl_params = type_param_decl(&iface.type_params);
    let use_params = type_param_use(&iface.type_params);
    let qualified = match &names.own {
        Some(own) => format!("{own}.{}", iface.name),
        None => format!("{}.{}", pkg.name, iface.name),
    };

    let _ = writeln!(out);
    let _ = writeln!(out, "// {mock} is a mock implementation of {qualified}.");
    let _ = writeln!(out, "type {mock}{decl_params} struct {{");
    let _ = writeln!(out, "\tt  {}.TB", names.testing);
    let _ = writeln!(out, "\tmu {}.Mutex", names.sync);
    if !iface.methods.is_empty() {
        let _ = writeln!(out);
        for method in &iface.methods {
            let _ = writeln!(out, "\t{}Func func{}", method.name, signature(method, false)?);
        }
        let _ = writeln!(out);
        for method in &iface.methods {
            let _ = writeln!(out, "\tcalls{} []{mock}{}Call{use_params}", method.name, method.name);
        }
    }
    let _ = writeln!(out, "}}");

    for method in &iface.methods {
        let _ = writeln!(out);
        let _ = writeln!(out, "// {mock}{}Call records one call to {mock}.{}.", method.name, method.name);
        if method.inputs.is_empty() {
            let _ = writeln!(out, "type {mock}{}Call{decl_params} struct{{}}", method.name);
            continue;
        }
        let _ = writeln!(out, "type {mock}{}Call{decl_params} struct {{", method.name);
        for (i, input) in method.inputs.iter().enumerate() {
            let _ = writeln!(out, "\tArg{i} {}", input.type_text);
        }
        let _ = writeln!(out, "}}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "// New{mock} creates a {mock} that reports unexpected calls to t.");
    let _ = writeln!(out, "func New{mock}{decl_params}(t {}.TB) *{mock}{use_params} {{", names.testing);
    let _ = writeln!(out, "\treturn &{mock}{use_params}{{t: t}}");
    let _ = writeln!(out, "}}");

    if iface.type_params.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "var _ {qualified} = (*{mock})(nil)");
    }

    for method in &iface.methods {
        write_method(out, &mock, &use_params, &qualified, method)?;
    }
    Ok(())
}

fn write_method(
    out: &mut String,
    mock: &str,
    use_params: &str,
    qualified: &str,
    method: &Method,
) -> Result<()> {
    let name = &method.name;
    let call = format!("{mock}{name}Call{use_params}");
    let args: Vec<String> = (0..method.inputs.len()).map(|i| format!("arg{i}")).collect();
    let record = args
        .iter()
        .enumerate()
        .map(|(i, arg)| format!("Arg{i}: {arg}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut forwarded = args.join(", ");
    if method.variadic {
        forwarded.push_str("...");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "// {name} implements {qualified}.");
    let _ = writeln!(out, "func (m *{mock}{use_params}) {name}{} {{", signature(method, true)?);
    let _ = writeln!(out, "\tm.mu.Lock()");
    let _ = writeln!(out, "\tm.calls{name} = append(m.calls{name}, {call}{{{record}}})");
    let _ = writeln!(out, "\tfn := m.{name}Func");
    let _ = writeln!(out, "\tm.mu.Unlock()");
    let _ = writeln!(out, "\tif fn == nil {{");
    let _ = writeln!(out, "\t\tm.t.Helper()");
    let _ = writeln!(out, "\t\tm.t.Errorf(\"unexpected call to {mock}.{name}: {name}Func is not set\")");
    let _ = writeln!(out, "\t\treturn");
    let _ = writeln!(out, "\t}}");
    if method.outputs.is_empty() {
        let _ = writeln!(out, "\tfn({forwarded})");
    } else {
        let _ = writeln!(out, "\treturn fn({forwarded})");
    }
    let _ = writeln!(out, "}}");

    let _ = writeln!(out);
    let _ = writeln!(out, "// {name}Calls returns the calls made to {name} so far.");
    let _ = writeln!(out, "func (m *{mock}{use_params}) {name}Calls() []{call} {{");
    let _ = writeln!(out, "\tm.mu.Lock()");
    let _ = writeln!(out, "\tdefer m.mu.Unlock()");
    let _ = writeln!(out, "\treturn append([]{call}(nil), m.calls{name}...)");
    let _ = writeln!(out, "}}");
    Ok(())
}

/// Renders `(params) results`.
///
/// With `named` set, parameters are `arg0..` and results `ret0..` so the
/// method body can return early with zero values.
fn signature(method: &Method, named: bool) -> Result<String> {
    let last = method.inputs.len().saturating_sub(1);
    let mut params = Vec::with_capacity(method.inputs.len());
    for (i, input) in method.inputs.iter().enumerate() {
        let ty = if method.variadic && i == last {
            let elem = input.type_text.strip_prefix("[]").ok_or_else(|| {
                Error::Internal(format!(
                    "variadic method {} ends in {}, not a slice",
                    method.name, input.type_text
                ))
            })?;
            format!("...{elem}")
        } else {
            input.type_text.clone()
        };
        params.push(if named { format!("arg{i} {ty}") } else { ty });
    }

    let results: Vec<String> = method
        .outputs
        .iter()
        .enumerate()
        .map(|(i, output)| {
            if named {
                format!("ret{i} {}", output.type_text)
            } else {
                output.type_text.clone()
            }
        })
        .collect();

    let params = params.join(", ");
    Ok(match results.as_slice() {
        [] => format!("({params})"),
        [single] if !named => format!("({params}) {single}"),
        _ => format!("({params}) ({})", results.join(", ")),
    })
}

fn type_param_decl(params: &[ResolvedTypeParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = params.iter().map(|p| format!("{} {}", p.name, p.constraint)).collect();
    format!("[{}]", parts.join(", "))
}

fn type_param_use(params: &[ResolvedTypeParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
    format!("[{}]", parts.join(", "))
}
