//! Package dependencies of a type.

use indexmap::IndexSet;

use crate::error::Result;
use crate::types::TypeExpr;

use super::scope::{unsupported, ScopedResolver};

impl ScopedResolver<'_> {
    /// Collects every package path `ty` references, first-seen order.
    ///
    /// Named types are leaves apart from their type arguments, so the walk
    /// never follows a declaration and cannot loop.
    pub(super) fn dependencies(&mut self, ty: &TypeExpr, site: &str) -> Result<IndexSet<String>> {
        let mut deps = IndexSet::new();
        match ty {
            TypeExpr::Basic { .. } | TypeExpr::TypeParam { .. } => {}
            TypeExpr::Named { package, type_args, .. } => {
                if let Some(pkg) = package {
                    deps.insert(pkg.path.clone());
                }
                for arg in type_args {
                    deps.extend(self.dependencies(arg, site)?);
                }
            }
            TypeExpr::Slice { elem }
            | TypeExpr::Array { elem, .. }
            | TypeExpr::Pointer { elem }
            | TypeExpr::Chan { elem, .. } => return self.dependencies(elem, site),
            TypeExpr::Map { key, value } => {
                deps.extend(self.dependencies(key, site)?);
                deps.extend(self.dependencies(value, site)?);
            }
            TypeExpr::Signature(sig) => {
                for var in sig.params.iter().chain(&sig.results) {
                    deps.extend(self.dependencies(&var.ty, site)?);
                }
            }
            TypeExpr::Interface(iface) => {
                for method in self.methods(&iface.methods, site)? {
                    deps.extend(method.dependency_paths());
                }
                for embedded in &iface.embeddeds {
                    deps.extend(self.dependencies(embedded, site)?);
                }
            }
            TypeExpr::Struct(st) => {
                for field in &st.fields {
                    deps.extend(self.dependencies(&field.ty, site)?);
                }
            }
            TypeExpr::Union { terms } => {
                for term in terms {
                    deps.extend(self.dependencies(&term.ty, site)?);
                }
            }
            TypeExpr::Unsupported => return Err(unsupported(ty, site)),
        }
        Ok(deps)
    }
}
