//! Source text for types, written as the generating scope would import them.

use crate::error::{Error, Result};
use crate::types::{ChanDir, Field, InterfaceType, Signature, StructType, TypeExpr, Var};

use super::scope::{unsupported, ScopedResolver};

impl ScopedResolver<'_> {
    /// Renders `ty`, allocating an import name for every package it mentions.
    pub(super) fn render(&mut self, ty: &TypeExpr, site: &str) -> Result<String> {
        let text = match ty {
            TypeExpr::Basic { name } | TypeExpr::TypeParam { name } => name.clone(),
            TypeExpr::Named { name, package, type_args } => {
                let mut text = match package {
                    Some(pkg) => {
                        let qualifier = self.aliases.alias_for(self.scope, &pkg.path, &pkg.name);
                        format!("{qualifier}.{name}")
                    }
                    None => name.clone(),
                };
                if !type_args.is_empty() {
                    let args = self.render_all(type_args, site)?;
                    text.push('[');
                    text.push_str(&args.join(", "));
                    text.push(']');
                }
                text
            }
            TypeExpr::Slice { elem } => format!("[]{}", self.render(elem, site)?),
            TypeExpr::Array { len, elem } => format!("[{len}]{}", self.render(elem, site)?),
            TypeExpr::Pointer { elem } => format!("*{}", self.render(elem, site)?),
            TypeExpr::Chan { dir, elem } => {
                let elem_text = self.render(elem, site)?;
                match dir {
                    // `chan <-chan T` would parse as `chan<- chan T`.
                    ChanDir::Both if matches!(**elem, TypeExpr::Chan { dir: ChanDir::Recv, .. }) => {
                        format!("chan ({elem_text})")
                    }
                    ChanDir::Both => format!("chan {elem_text}"),
                    ChanDir::Send => format!("chan<- {elem_text}"),
                    ChanDir::Recv => format!("<-chan {elem_text}"),
                }
            }
            TypeExpr::Map { key, value } => {
                format!("map[{}]{}", self.render(key, site)?, self.render(value, site)?)
            }
            TypeExpr::Signature(sig) => format!("func{}", self.render_signature(sig, site)?),
            TypeExpr::Interface(iface) => self.render_interface(iface, site)?,
            TypeExpr::Struct(st) => self.render_struct(st, site)?,
            TypeExpr::Union { terms } => {
                let mut parts = Vec::with_capacity(terms.len());
                for term in terms {
                    let text = self.render(&term.ty, site)?;
                    parts.push(if term.tilde { format!("~{text}") } else { text });
                }
                parts.join(" | ")
            }
            TypeExpr::Unsupported => return Err(unsupported(ty, site)),
        };
        Ok(text)
    }

    fn render_all(&mut self, types: &[TypeExpr], site: &str) -> Result<Vec<String>> {
        types.iter().map(|ty| self.render(ty, site)).collect()
    }

    /// Renders a signature without the `func` keyword or parameter names.
    fn render_signature(&mut self, sig: &Signature, site: &str) -> Result<String> {
        let params = self.render_params(&sig.params, sig.variadic, site)?;
        let results = sig
            .results
            .iter()
            .map(|result| self.render(&result.ty, site))
            .collect::<Result<Vec<_>>>()?;

        Ok(match results.as_slice() {
            [] => format!("({params})"),
            [single] => format!("({params}) {single}"),
            many => format!("({params}) ({})", many.join(", ")),
        })
    }

    fn render_params(&mut self, params: &[Var], variadic: bool, site: &str) -> Result<String> {
        let mut parts = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            if variadic && i + 1 == params.len() {
                let TypeExpr::Slice { elem } = &param.ty else {
                    return Err(Error::Internal(format!(
                        "variadic function type at {site} does not end in a slice"
                    )));
                };
                parts.push(format!("...{}", self.render(elem, site)?));
            } else {
                parts.push(self.render(&param.ty, site)?);
            }
        }
        Ok(parts.join(", "))
    }

    fn render_interface(&mut self, iface: &InterfaceType, site: &str) -> Result<String> {
        if iface.methods.is_empty() && iface.embeddeds.is_empty() {
            return Ok("interface{}".to_string());
        }
        let mut members = Vec::with_capacity(iface.methods.len() + iface.embeddeds.len());
        for embedded in &iface.embeddeds {
            members.push(self.render(embedded, site)?);
        }
        for method in &iface.methods {
            members.push(format!("{}{}", method.name, self.render_signature(&method.signature, site)?));
        }
        Ok(format!("interface{{ {} }}", members.join("; ")))
    }

    fn render_struct(&mut self, st: &StructType, site: &str) -> Result<String> {
        if st.fields.is_empty() {
            return Ok("struct{}".to_string());
        }
        let fields = st
            .fields
            .iter()
            .map(|field| self.render_field(field, site))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("struct{{ {} }}", fields.join("; ")))
    }

    fn render_field(&mut self, field: &Field, site: &str) -> Result<String> {
        let ty = self.render(&field.ty, site)?;
        let mut text = if field.embedded { ty } else { format!("{} {ty}", field.name) };
        if let Some(tag) = field.tag.as_deref().filter(|tag| !tag.is_empty()) {
            text.push(' ');
            if tag.contains('`') {
                text.push_str(&format!("{tag:?}"));
            } else {
                text.push('`');
                text.push_str(tag);
                text.push('`');
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::ImportAliasTable;
    use crate::resolve::fixtures::{basic, map, named, pointer, slice};
    use crate::types::{MethodSig, UnionTerm};

    fn render(ty: &TypeExpr) -> String {
        let mut aliases = ImportAliasTable::new();
        let mut scope = ScopedResolver::new(&mut aliases, "example.com/app");
        scope.render(ty, "test").unwrap()
    }

    fn chan(dir: ChanDir, elem: TypeExpr) -> TypeExpr {
        TypeExpr::Chan { dir, elem: Box::new(elem) }
    }

    fn func(params: Vec<TypeExpr>, results: Vec<TypeExpr>, variadic: bool) -> TypeExpr {
        let vars = |types: Vec<TypeExpr>| -> Vec<Var> {
            types.into_iter().map(|ty| Var { name: Some("ignored".into()), ty }).collect()
        };
        TypeExpr::Signature(Signature { params: vars(params), results: vars(results), variadic })
    }

    #[test]
    fn composite_types() {
        assert_eq!(render(&slice(pointer(named("bytes", "bytes", "Buffer")))), "[]*bytes.Buffer");
        assert_eq!(
            render(&TypeExpr::Array { len: 4, elem: Box::new(basic("byte")) }),
            "[4]byte"
        );
        assert_eq!(render(&map(basic("string"), slice(basic("int")))), "map[string][]int");
    }

    #[test]
    fn channel_directions() {
        assert_eq!(render(&chan(ChanDir::Both, basic("int"))), "chan int");
        assert_eq!(render(&chan(ChanDir::Send, basic("int"))), "chan<- int");
        assert_eq!(render(&chan(ChanDir::Recv, basic("int"))), "<-chan int");
        assert_eq!(
            render(&chan(ChanDir::Both, chan(ChanDir::Recv, basic("int")))),
            "chan (<-chan int)"
        );
        assert_eq!(
            render(&chan(ChanDir::Send, chan(ChanDir::Recv, basic("int")))),
            "chan<- <-chan int"
        );
    }

    #[test]
    fn function_types_drop_parameter_names() {
        assert_eq!(render(&func(vec![], vec![], false)), "func()");
        assert_eq!(
            render(&func(vec![basic("string"), slice(basic("any"))], vec![basic("error")], true)),
            "func(string, ...any) error"
        );
        assert_eq!(
            render(&func(vec![basic("int")], vec![basic("int"), basic("bool")], false)),
            "func(int) (int, bool)"
        );
    }

    #[test]
    fn variadic_function_type_without_slice_is_internal() {
        let mut aliases = ImportAliasTable::new();
        let mut scope = ScopedResolver::new(&mut aliases, "s");
        let err = scope.render(&func(vec![basic("int")], vec![], true), "s.I.M").unwrap_err();
        assert!(matches!(err, Error::Internal(ref m) if m.contains("s.I.M")));
    }

    #[test]
    fn generic_instantiation_renders_arguments() {
        let ty = TypeExpr::Named {
            name: "Page".into(),
            package: Some(crate::types::PackageRef { path: "example.com/paging".into(), name: "paging".into() }),
            type_args: vec![named("example.com/app/user", "user", "User"), basic("int")],
        };
        assert_eq!(render(&ty), "paging.Page[user.User, int]");
    }

    #[test]
    fn inline_interfaces_structs_and_unions() {
        assert_eq!(render(&TypeExpr::Interface(InterfaceType::default())), "interface{}");
        let iface = InterfaceType {
            methods: vec![MethodSig {
                name: "Close".into(),
                signature: Signature { params: vec![], results: vec![Var { name: None, ty: named("x", "x", "E") }], variadic: false },
            }],
            embeddeds: vec![named("io", "io", "Reader")],
        };
        assert_eq!(render(&TypeExpr::Interface(iface)), "interface{ io.Reader; Close() x.E }");

        let st = StructType {
            fields: vec![
                Field { name: "ID".into(), ty: basic("int"), embedded: false, tag: Some(r#"json:"id""#.into()) },
                Field { name: "Mutex".into(), ty: named("sync", "sync", "Mutex"), embedded: true, tag: None },
            ],
        };
        assert_eq!(render(&TypeExpr::Struct(st)), "struct{ ID int `json:\"id\"`; sync.Mutex }");
        assert_eq!(render(&TypeExpr::Struct(StructType::default())), "struct{}");

        let union = TypeExpr::Union {
            terms: vec![
                UnionTerm { tilde: true, ty: basic("int") },
                UnionTerm { tilde: false, ty: basic("string") },
            ],
        };
        assert_eq!(render(&union), "~int | string");
    }
}
