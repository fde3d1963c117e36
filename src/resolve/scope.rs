use crate::alias::ImportAliasTable;
use crate::error::{Error, Result};
use crate::types::{MethodSig, TypeExpr, TypeParamDecl, Var};

use super::{Method, ResolvedTypeParam, Tuple};

/// Renders types on behalf of one generating scope.
///
/// `site` arguments describe where in the package a type was found and only
/// feed diagnostics.
pub(super) struct ScopedResolver<'a> {
    pub(super) aliases: &'a mut ImportAliasTable,
    pub(super) scope: &'a str,
}

impl<'a> ScopedResolver<'a> {
    pub(super) fn new(aliases: &'a mut ImportAliasTable, scope: &'a str) -> Self {
        Self { aliases, scope }
    }

    pub(super) fn type_param(&mut self, param: &TypeParamDecl, site: &str) -> Result<ResolvedTypeParam> {
        let site = format!("{site} type parameter {}", param.name);
        Ok(ResolvedTypeParam {
            name: param.name.clone(),
            constraint: self.render(&param.constraint, &site)?,
            dependency_paths: self.dependencies(&param.constraint, &site)?,
        })
    }

    pub(super) fn methods(&mut self, methods: &[MethodSig], site: &str) -> Result<Vec<Method>> {
        methods.iter().map(|method| self.method(method, site)).collect()
    }

    fn method(&mut self, method: &MethodSig, site: &str) -> Result<Method> {
        let site = format!("{site}.{}", method.name);
        let sig = &method.signature;

        if sig.variadic && !matches!(sig.params.last(), Some(Var { ty: TypeExpr::Slice { .. }, .. })) {
            return Err(Error::Internal(format!(
                "{site} is variadic but its final parameter is not a slice"
            )));
        }

        let inputs = sig
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| self.tuple(param, &format!("{site} parameter {}", i + 1)))
            .collect::<Result<Vec<_>>>()?;
        let outputs = sig
            .results
            .iter()
            .enumerate()
            .map(|(i, result)| self.tuple(result, &format!("{site} result {}", i + 1)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Method { name: method.name.clone(), inputs, outputs, variadic: sig.variadic })
    }

    fn tuple(&mut self, var: &Var, site: &str) -> Result<Tuple> {
        Ok(Tuple {
            variable_name: var.name.clone().filter(|name| !name.is_empty() && name != "_"),
            type_text: self.render(&var.ty, site)?,
            dependency_paths: self.dependencies(&var.ty, site)?,
        })
    }
}

pub(super) fn unsupported(ty: &TypeExpr, site: &str) -> Error {
    Error::Internal(format!("cannot render {} at {site}", ty.kind_name()))
}
