//! Package-level declarations: named types, methods, functions, typed vars

use sumlint_ast::{DeclarationKind, Receiver, SourceFile, TypeExprKind};

use crate::resolve::{Resolver, UnitDecls};
use crate::{Method, MethodDecl, NamedType, Package, Type, TypeError, TypeInfo, TypeName, Universe};

/// Build the package scope of a unit. Variables without a declared type
/// are left to the body checker, which infers them from their initializers.
pub(crate) fn collect_package(
    universe: &Universe,
    decls: &UnitDecls,
    info: &mut TypeInfo,
    files: &[SourceFile],
) -> Result<Package, TypeError> {
    let mut resolver = Resolver::new(universe, decls, info);
    let mut package = Package::new(decls.path.clone(), decls.name.clone());

    for (file_id, file) in files.iter().enumerate() {
        for spec in file.type_specs() {
            let ty = resolver.resolve(file_id, &spec.ty)?;
            if spec.is_alias {
                package.aliases.insert(spec.name.name.clone(), ty);
            } else {
                package.types.insert(
                    spec.name.name.clone(),
                    NamedType {
                        name: TypeName::new(decls.path.clone(), spec.name.name.clone()),
                        definition: ty,
                        methods: Vec::new(),
                    },
                );
            }
        }
    }

    for (file_id, file) in files.iter().enumerate() {
        for func in file.funcs() {
            let sig = resolver.signature(file_id, &func.sig)?;
            let Some(receiver) = &func.receiver else {
                package.funcs.insert(func.name.name.clone(), sig);
                continue;
            };

            resolver.resolve(file_id, &receiver.ty)?;
            let (base, pointer_receiver) = receiver_base(receiver)?;
            let Some(named) = package.types.get_mut(base) else {
                return Err(invalid_receiver(receiver, base));
            };
            if matches!(named.definition, Type::Interface(_) | Type::Pointer(_)) {
                return Err(invalid_receiver(receiver, base));
            }
            if func.name.is_blank() {
                continue;
            }
            if named.method(&func.name.name).is_some() {
                return Err(TypeError::DuplicateDecl {
                    name: format!("{}.{}", base, func.name.name),
                    span: func.name.span,
                });
            }
            named.methods.push(MethodDecl {
                method: Method {
                    name: func.name.name.clone(),
                    package: decls.path.clone(),
                    sig,
                },
                pointer_receiver,
            });
        }
    }

    for (file_id, file) in files.iter().enumerate() {
        for decl in &file.declarations {
            let (DeclarationKind::Var(spec) | DeclarationKind::Const(spec)) = &decl.kind else {
                continue;
            };
            if let Some(ty) = &spec.ty {
                let ty = resolver.resolve(file_id, ty)?;
                for name in spec.names.iter().filter(|n| !n.is_blank()) {
                    package.vars.insert(name.name.clone(), ty.clone());
                }
            }
        }
    }

    Ok(package)
}

/// Base type name of a receiver and whether it is a pointer receiver
fn receiver_base(receiver: &Receiver) -> Result<(&str, bool), TypeError> {
    let ty = receiver.ty.unparen();
    let (base, pointer) = match &ty.kind {
        TypeExprKind::Pointer(inner) => (inner.unparen(), true),
        _ => (ty, false),
    };
    match &base.kind {
        TypeExprKind::Name(ident) => Ok((ident.name.as_str(), pointer)),
        _ => Err(TypeError::InvalidReceiver {
            name: "receiver".to_string(),
            span: receiver.span,
        }),
    }
}

fn invalid_receiver(receiver: &Receiver, base: &str) -> TypeError {
    TypeError::InvalidReceiver {
        name: base.to_string(),
        span: receiver.ty.span,
    }
}
