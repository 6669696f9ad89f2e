//! Unit-level declarations and type expression resolution

use std::collections::{HashMap, HashSet};

use sumlint_ast::{FuncSig, Ident, InterfaceElem, SourceFile, DeclarationKind, TypeExpr, TypeExprKind};

use crate::{
    BasicKind, Field, FileId, Interface, Method, Signature, Type, TypeError, TypeInfo, TypeName,
    Universe,
};

/// Alias chains longer than this are reported as cyclic
const MAX_ALIAS_DEPTH: usize = 32;

/// Names declared at the top level of a unit, known before any type is
/// resolved so that declarations may refer to each other in any order.
#[derive(Debug, Default)]
pub(crate) struct UnitDecls {
    pub path: String,
    pub name: String,
    /// Defined (non-alias) type names
    pub types: HashSet<String>,
    /// Alias targets with the file they are written in
    pub aliases: HashMap<String, (FileId, TypeExpr)>,
    /// Functions, variables and constants
    pub values: HashSet<String>,
    /// Import name to package path, per file
    pub imports: Vec<HashMap<String, String>>,
}

impl UnitDecls {
    pub fn collect(universe: &Universe, path: &str, files: &[SourceFile]) -> Result<Self, TypeError> {
        let mut decls = UnitDecls {
            path: path.to_string(),
            name: files
                .first()
                .map(|f| f.package.name.clone())
                .unwrap_or_default(),
            ..Self::default()
        };

        for file in files {
            if file.package.name != decls.name {
                return Err(TypeError::PackageMismatch {
                    expected: decls.name.clone(),
                    found: file.package.name.clone(),
                    span: file.package.span,
                });
            }

            let mut imports = HashMap::new();
            for import in &file.imports {
                let name = match &import.alias {
                    Some(alias) if alias.is_blank() => continue,
                    Some(alias) => alias.name.clone(),
                    None => match universe.package(&import.path) {
                        Some(package) => package.name.clone(),
                        None => default_package_name(&import.path).to_string(),
                    },
                };
                imports.insert(name, import.path.clone());
            }
            decls.imports.push(imports);

            for decl in &file.declarations {
                match &decl.kind {
                    DeclarationKind::Type(spec) => {
                        decls.declare(&spec.name)?;
                        if spec.is_alias {
                            let file_id = decls.imports.len() - 1;
                            decls
                                .aliases
                                .insert(spec.name.name.clone(), (file_id, spec.ty.clone()));
                        } else {
                            decls.types.insert(spec.name.name.clone());
                        }
                    }
                    DeclarationKind::Func(func) if !func.is_method() => {
                        if func.name.name != "init" {
                            decls.declare(&func.name)?;
                        }
                        decls.values.insert(func.name.name.clone());
                    }
                    DeclarationKind::Func(_) => {}
                    DeclarationKind::Var(spec) | DeclarationKind::Const(spec) => {
                        for name in &spec.names {
                            decls.declare(name)?;
                            decls.values.insert(name.name.clone());
                        }
                    }
                }
            }
        }
        Ok(decls)
    }

    fn declare(&self, ident: &Ident) -> Result<(), TypeError> {
        let name = &ident.name;
        if ident.is_blank() {
            return Ok(());
        }
        if self.types.contains(name) || self.aliases.contains_key(name) || self.values.contains(name) {
            return Err(TypeError::DuplicateDecl {
                name: name.clone(),
                span: ident.span,
            });
        }
        Ok(())
    }
}

/// Package name assumed for an import that is not loaded: the last path
/// segment, skipping a trailing major version (`.../yaml/v3` is `yaml`)
fn default_package_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    if is_version {
        segments.next().unwrap_or(last)
    } else {
        last
    }
}

/// Resolves type expressions of one unit, recording each result
pub(crate) struct Resolver<'a> {
    universe: &'a Universe,
    decls: &'a UnitDecls,
    info: &'a mut TypeInfo,
}

impl<'a> Resolver<'a> {
    pub fn new(universe: &'a Universe, decls: &'a UnitDecls, info: &'a mut TypeInfo) -> Self {
        Self {
            universe,
            decls,
            info,
        }
    }

    pub fn resolve(&mut self, file: FileId, ty: &TypeExpr) -> Result<Type, TypeError> {
        self.resolve_at(file, ty, 0)
    }

    fn resolve_at(&mut self, file: FileId, ty: &TypeExpr, depth: usize) -> Result<Type, TypeError> {
        let resolved = match &ty.kind {
            TypeExprKind::Name(ident) => self.resolve_name(ident, depth)?,
            TypeExprKind::Qualified { package, name } => {
                self.resolve_qualified(file, package, name)?
            }
            TypeExprKind::Pointer(inner) => Type::pointer_to(self.resolve_at(file, inner, depth)?),
            TypeExprKind::Slice(inner) => Type::Slice(Box::new(self.resolve_at(file, inner, depth)?)),
            TypeExprKind::Array { elem, .. } => {
                Type::Array(Box::new(self.resolve_at(file, elem, depth)?))
            }
            TypeExprKind::Map { key, value } => Type::Map(
                Box::new(self.resolve_at(file, key, depth)?),
                Box::new(self.resolve_at(file, value, depth)?),
            ),
            TypeExprKind::Chan(inner) => Type::Chan(Box::new(self.resolve_at(file, inner, depth)?)),
            TypeExprKind::Struct(decls) => {
                let mut fields = Vec::new();
                for decl in decls {
                    let field_ty = self.resolve_at(file, &decl.ty, depth)?;
                    if decl.is_embedded() {
                        fields.push(Field {
                            name: embedded_name(&decl.ty).to_string(),
                            ty: field_ty,
                            embedded: true,
                        });
                    } else {
                        fields.extend(decl.names.iter().map(|name| Field {
                            name: name.name.clone(),
                            ty: field_ty.clone(),
                            embedded: false,
                        }));
                    }
                }
                Type::Struct(fields)
            }
            TypeExprKind::Interface(elems) => {
                let mut methods = Vec::new();
                let mut embeddeds = Vec::new();
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { name, sig, .. } => methods.push(Method {
                            name: name.name.clone(),
                            package: self.decls.path.clone(),
                            sig: self.signature_at(file, sig, depth)?,
                        }),
                        InterfaceElem::Embedded(embedded) => {
                            embeddeds.push(self.resolve_at(file, embedded, depth)?)
                        }
                    }
                }
                Type::Interface(Interface::new(methods, embeddeds))
            }
            TypeExprKind::Func(sig) => Type::Signature(self.signature_at(file, sig, depth)?),
            TypeExprKind::Paren(inner) => self.resolve_at(file, inner, depth)?,
        };
        self.info.record_type_expr(file, ty.span, &resolved);
        Ok(resolved)
    }

    pub fn signature(&mut self, file: FileId, sig: &FuncSig) -> Result<Signature, TypeError> {
        self.signature_at(file, sig, 0)
    }

    fn signature_at(&mut self, file: FileId, sig: &FuncSig, depth: usize) -> Result<Signature, TypeError> {
        let mut params = Vec::with_capacity(sig.params.len());
        for param in &sig.params {
            let ty = self.resolve_at(file, &param.ty, depth)?;
            params.push(if param.variadic {
                Type::Slice(Box::new(ty))
            } else {
                ty
            });
        }
        let mut results = Vec::with_capacity(sig.results.len());
        for result in &sig.results {
            results.push(self.resolve_at(file, &result.ty, depth)?);
        }
        Ok(Signature {
            params,
            results,
            variadic: sig.params.last().is_some_and(|p| p.variadic),
        })
    }

    fn resolve_name(&mut self, ident: &Ident, depth: usize) -> Result<Type, TypeError> {
        let name = ident.name.as_str();
        if self.decls.types.contains(name) {
            return Ok(Type::Named(TypeName::new(self.decls.path.clone(), name)));
        }
        if let Some((alias_file, target)) = self.decls.aliases.get(name) {
            if depth >= MAX_ALIAS_DEPTH {
                return Err(TypeError::CyclicAlias {
                    name: name.to_string(),
                    span: ident.span,
                });
            }
            return self.resolve_at(*alias_file, target, depth + 1);
        }
        if name == "nil" {
            return Ok(Type::Nil);
        }
        if let Some(kind) = BasicKind::from_name(name) {
            return Ok(Type::Basic(kind));
        }
        if let Some(ty) = self.universe.predeclared(name) {
            return Ok(ty);
        }
        if self.decls.values.contains(name) {
            return Err(TypeError::NotAType {
                name: name.to_string(),
                span: ident.span,
            });
        }
        Err(TypeError::UndefinedName {
            name: name.to_string(),
            span: ident.span,
        })
    }

    fn resolve_qualified(&mut self, file: FileId, package: &Ident, name: &Ident) -> Result<Type, TypeError> {
        let Some(path) = self.decls.imports.get(file).and_then(|i| i.get(&package.name)) else {
            return Err(TypeError::UndefinedName {
                name: package.name.clone(),
                span: package.span,
            });
        };
        let Some(imported) = self.universe.package(path) else {
            // Not loaded: an opaque named type
            return Ok(Type::Named(TypeName::new(path.clone(), name.name.clone())));
        };
        if let Some(ty) = imported.lookup_type(&name.name) {
            return Ok(ty);
        }
        let qualified = format!("{}.{}", package.name, name.name);
        if imported.funcs.contains_key(&name.name) || imported.vars.contains_key(&name.name) {
            return Err(TypeError::NotAType {
                name: qualified,
                span: package.span.merge(name.span),
            });
        }
        Err(TypeError::UndefinedName {
            name: qualified,
            span: package.span.merge(name.span),
        })
    }
}

/// Field name of an embedded field: the type name without package or `*`
fn embedded_name(ty: &TypeExpr) -> &str {
    match &ty.kind {
        TypeExprKind::Name(ident) => &ident.name,
        TypeExprKind::Qualified { name, .. } => &name.name,
        TypeExprKind::Pointer(inner) | TypeExprKind::Paren(inner) => embedded_name(inner),
        _ => "",
    }
}
