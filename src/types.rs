//! Type information for loaded packages.
//!
//! These structures are the contract between an external type exporter and
//! the resolver. They mirror the shape of Go's type system closely enough to
//! render any declared method signature back to source text.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PackageLoadError;

/// A document describing loaded packages, as produced by a type exporter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeExport {
    /// Packages that loaded successfully.
    #[serde(default)]
    pub packages: Vec<LoadedPackage>,
    /// Packages that failed to load or parse.
    #[serde(default)]
    pub errors: Vec<PackageLoadError>,
}

/// Type information for one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedPackage {
    /// Package name as written in its `package` clause.
    pub name: String,
    /// Import path.
    pub path: String,
    /// Package-scope declarations keyed by identifier.
    #[serde(default)]
    pub declarations: IndexMap<String, Declaration>,
}

impl LoadedPackage {
    /// Looks up a package-scope declaration by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }
}

/// A package-scope declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decl", rename_all = "snake_case")]
pub enum Declaration {
    /// A defined type (`type X ...`).
    Type {
        /// Type parameters of a generic type, in declaration order.
        #[serde(default)]
        type_params: Vec<TypeParamDecl>,
        /// The type's underlying type.
        underlying: TypeExpr,
    },
    /// A function.
    Func {
        /// Function signature.
        signature: Signature,
    },
    /// A package-level variable.
    Var {
        /// Variable type.
        #[serde(rename = "type")]
        ty: TypeExpr,
    },
    /// A constant.
    Const {
        /// Constant type.
        #[serde(rename = "type")]
        ty: TypeExpr,
    },
}

impl Declaration {
    /// Describes what kind of thing this declaration is, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Type { underlying, .. } => underlying.kind_name(),
            Self::Func { .. } => "function",
            Self::Var { .. } => "variable",
            Self::Const { .. } => "constant",
        }
    }
}

/// A type parameter and its constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParamDecl {
    /// Parameter name.
    pub name: String,
    /// Constraint type.
    pub constraint: TypeExpr,
}

/// Package a named type is declared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    /// Import path.
    pub path: String,
    /// Package name, used as the default import identifier.
    pub name: String,
}

/// Structural description of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    /// A predeclared basic type (`int`, `string`, `unsafe.Pointer`, ...).
    Basic {
        /// Type name.
        name: String,
    },
    /// A reference to a defined type, possibly instantiated.
    Named {
        /// Type name.
        name: String,
        /// Declaring package; `None` for predeclared types such as `error`.
        #[serde(default)]
        package: Option<PackageRef>,
        /// Type arguments of an instantiated generic type.
        #[serde(default)]
        type_args: Vec<TypeExpr>,
    },
    /// A reference to a type parameter in scope.
    TypeParam {
        /// Parameter name.
        name: String,
    },
    /// `[]elem`
    Slice {
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// `[len]elem`
    Array {
        /// Array length.
        len: u64,
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// `*elem`
    Pointer {
        /// Pointee type.
        elem: Box<TypeExpr>,
    },
    /// `chan elem`, `chan<- elem` or `<-chan elem`
    Chan {
        /// Channel direction.
        #[serde(default)]
        dir: ChanDir,
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// `map[key]value`
    Map {
        /// Key type.
        key: Box<TypeExpr>,
        /// Value type.
        value: Box<TypeExpr>,
    },
    /// A function type.
    Signature(Signature),
    /// An interface type.
    Interface(InterfaceType),
    /// A struct type.
    Struct(StructType),
    /// A union of constraint terms (`~int | string`).
    Union {
        /// Union terms in source order.
        terms: Vec<UnionTerm>,
    },
    /// A kind this crate does not model.
    #[serde(other)]
    Unsupported,
}

impl TypeExpr {
    /// Describes the structural kind of this type, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic type",
            Self::Named { .. } => "named type",
            Self::TypeParam { .. } => "type parameter",
            Self::Slice { .. } => "slice",
            Self::Array { .. } => "array",
            Self::Pointer { .. } => "pointer",
            Self::Chan { .. } => "channel",
            Self::Map { .. } => "map",
            Self::Signature(_) => "function type",
            Self::Interface(_) => "interface",
            Self::Struct(_) => "struct",
            Self::Union { .. } => "union",
            Self::Unsupported => "unsupported type",
        }
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanDir {
    /// Bidirectional.
    #[default]
    Both,
    /// Send-only.
    Send,
    /// Receive-only.
    Recv,
}

/// A function signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Parameters in order.
    #[serde(default)]
    pub params: Vec<Var>,
    /// Results in order.
    #[serde(default)]
    pub results: Vec<Var>,
    /// Whether the final parameter is variadic; its type is then a slice.
    #[serde(default)]
    pub variadic: bool,
}

/// A parameter, result or struct field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Var {
    /// Declared name, if any.
    #[serde(default)]
    pub name: Option<String>,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

/// An interface method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSig {
    /// Method name.
    pub name: String,
    /// Method signature.
    pub signature: Signature,
}

/// An interface type.
///
/// For a declared interface `methods` is the complete method set, embedded
/// interfaces already flattened in. For an inline literal `methods` holds
/// the explicitly listed methods and `embeddeds` whatever was embedded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceType {
    /// Methods in order.
    #[serde(default)]
    pub methods: Vec<MethodSig>,
    /// Embedded types (interfaces or constraint unions).
    #[serde(default)]
    pub embeddeds: Vec<TypeExpr>,
}

/// A struct type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructType {
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name; for embedded fields the type name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    /// Whether the field is embedded.
    #[serde(default)]
    pub embedded: bool,
    /// Struct tag, if any.
    #[serde(default)]
    pub tag: Option<String>,
}

/// A term of a constraint union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionTerm {
    /// Whether the term is written `~T`.
    #[serde(default)]
    pub tilde: bool,
    /// Term type.
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exported_interface() {
        let yaml = r"
packages:
  - name: store
    path: example.com/app/store
    declarations:
      Store:
        decl: type
        underlying:
          kind: interface
          methods:
            - name: Get
              signature:
                params:
                  - name: ctx
                    type: { kind: named, name: Context, package: { path: context, name: context } }
                  - type: { kind: basic, name: string }
                results:
                  - type: { kind: slice, elem: { kind: basic, name: byte } }
                  - type: { kind: named, name: error }
      Limit:
        decl: const
        type: { kind: basic, name: int }
errors:
  - path: example.com/app/broken
    message: syntax error
";
        let export: TypeExport = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(export.errors.len(), 1);
        let pkg = &export.packages[0];
        assert_eq!(pkg.lookup("Limit").unwrap().kind_name(), "constant");

        let Some(Declaration::Type { underlying: TypeExpr::Interface(iface), type_params }) =
            pkg.lookup("Store")
        else {
            panic!("Store should be an interface");
        };
        assert!(type_params.is_empty());
        assert_eq!(iface.methods[0].signature.params[0].name.as_deref(), Some("ctx"));
        assert_eq!(iface.methods[0].signature.params[1].name, None);
    }

    #[test]
    fn unknown_kinds_parse_as_unsupported() {
        let ty: TypeExpr = serde_json::from_str(r#"{"kind": "tuple"}"#).unwrap();
        assert_eq!(ty, TypeExpr::Unsupported);
    }
}
