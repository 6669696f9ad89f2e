//! Loaded packages and the operations over their types

use std::collections::{BTreeMap, HashSet};

use crate::{BasicKind, Interface, Method, Signature, Type, TypeName};

/// Bound on named/alias/embedding chains, guarding against ill-formed input
const MAX_DEPTH: usize = 32;

/// A declared named type
#[derive(Debug, Clone)]
pub struct NamedType {
    pub name: TypeName,
    /// Right-hand side of the declaration; may itself be a named type
    pub definition: Type,
    pub methods: Vec<MethodDecl>,
}

impl NamedType {
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.method.name == name)
    }
}

/// A method attached to a named type
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub method: Method,
    /// Declared on `*T` rather than `T`
    pub pointer_receiver: bool,
}

/// The package-level scope of one type-checked unit
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub path: String,
    /// Name from the `package` clause
    pub name: String,
    pub types: BTreeMap<String, NamedType>,
    pub aliases: BTreeMap<String, Type>,
    pub funcs: BTreeMap<String, Signature>,
    pub vars: BTreeMap<String, Type>,
}

impl Package {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// A type name declared in this package, following aliases
    pub fn lookup_type(&self, name: &str) -> Option<Type> {
        if self.types.contains_key(name) {
            return Some(Type::Named(TypeName::new(self.path.clone(), name)));
        }
        self.aliases.get(name).cloned()
    }
}

/// Result of looking up a selector on a value
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(Type),
    Method(Signature),
}

/// Every package loaded so far, by path.
///
/// The predeclared `error` type lives in the package with the empty path.
#[derive(Debug, Clone)]
pub struct Universe {
    packages: BTreeMap<String, Package>,
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

impl Universe {
    pub fn new() -> Self {
        let mut builtin = Package::new("", "");
        let error = TypeName::new("", "error");
        builtin.types.insert(
            "error".to_string(),
            NamedType {
                name: error,
                definition: Type::Interface(Interface::new(
                    vec![Method {
                        name: "Error".to_string(),
                        package: String::new(),
                        sig: Signature {
                            params: vec![],
                            results: vec![Type::Basic(BasicKind::String)],
                            variadic: false,
                        },
                    }],
                    vec![],
                )),
                methods: vec![],
            },
        );
        builtin
            .aliases
            .insert("any".to_string(), Type::Interface(Interface::default()));

        let mut packages = BTreeMap::new();
        packages.insert(String::new(), builtin);
        Self { packages }
    }

    pub fn insert(&mut self, package: Package) {
        self.packages.insert(package.path.clone(), package);
    }

    pub fn package(&self, path: &str) -> Option<&Package> {
        self.packages.get(path)
    }

    pub fn package_mut(&mut self, path: &str) -> Option<&mut Package> {
        self.packages.get_mut(path)
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Predeclared type names other than the basic kinds
    pub fn predeclared(&self, name: &str) -> Option<Type> {
        self.packages.get("").and_then(|p| p.lookup_type(name))
    }

    pub fn named(&self, name: &TypeName) -> Option<&NamedType> {
        self.packages.get(&name.package)?.types.get(&name.name)
    }

    /// The underlying type: named types are followed to their definition.
    /// A named type from a package that was never loaded is its own
    /// underlying type, which makes it opaque to every other operation.
    pub fn underlying<'a>(&'a self, ty: &'a Type) -> &'a Type {
        let mut current = ty;
        for _ in 0..MAX_DEPTH {
            match current {
                Type::Named(name) => match self.named(name) {
                    Some(named) => current = &named.definition,
                    None => return current,
                },
                _ => return current,
            }
        }
        current
    }

    /// The underlying interface of `ty`, if it has one
    pub fn interface_of<'a>(&'a self, ty: &'a Type) -> Option<&'a Interface> {
        match self.underlying(ty) {
            Type::Interface(iface) => Some(iface),
            _ => None,
        }
    }

    pub fn is_interface(&self, ty: &Type) -> bool {
        self.interface_of(ty).is_some()
    }

    /// Full method set of an interface, including embedded interfaces
    pub fn interface_methods(&self, iface: &Interface) -> BTreeMap<String, Method> {
        let mut methods = BTreeMap::new();
        self.collect_interface_methods(iface, &mut methods, 0);
        methods
    }

    fn collect_interface_methods(
        &self,
        iface: &Interface,
        out: &mut BTreeMap<String, Method>,
        depth: usize,
    ) {
        for method in &iface.methods {
            out.entry(method.name.clone()).or_insert_with(|| method.clone());
        }
        if depth >= MAX_DEPTH {
            return;
        }
        for embedded in &iface.embeddeds {
            if let Some(inner) = self.interface_of(embedded) {
                self.collect_interface_methods(inner, out, depth + 1);
            }
        }
    }

    /// Method set of a type under Go's rules: `T` has its value-receiver
    /// methods, `*T` has both kinds, and methods of embedded fields are
    /// promoted. Embeddings are walked one depth at a time. A field or
    /// method at a shallower depth hides deeper ones of the same name, and a
    /// name found more than once at one depth is ambiguous and not promoted.
    pub fn method_set(&self, ty: &Type) -> BTreeMap<String, Method> {
        let (base, via_pointer) = match ty {
            Type::Pointer(inner) => (inner.as_ref(), true),
            other => (other, false),
        };
        if !via_pointer {
            if let Some(iface) = self.interface_of(base) {
                return self.interface_methods(iface);
            }
        }

        let mut methods = BTreeMap::new();
        let mut hidden = HashSet::new();
        let mut seen = HashSet::new();
        let mut level = vec![(base.clone(), via_pointer)];
        for depth in 0..=MAX_DEPTH {
            if level.is_empty() {
                break;
            }
            let mut found = DepthNames::default();
            let mut visited = Vec::new();
            let mut next = Vec::new();
            for (current, addressable) in &level {
                if let Type::Named(name) = current {
                    // Reached at a shallower depth already
                    if seen.contains(name) {
                        continue;
                    }
                    visited.push(name.clone());
                    if let Some(named) = self.named(name) {
                        for decl in &named.methods {
                            let usable = *addressable || !decl.pointer_receiver;
                            found.note(&decl.method.name, usable.then(|| decl.method.clone()));
                        }
                    }
                }
                match self.underlying(current) {
                    Type::Interface(iface) if depth > 0 => {
                        for (name, method) in self.interface_methods(iface) {
                            found.note(&name, Some(method));
                        }
                    }
                    Type::Struct(fields) => {
                        for field in fields {
                            found.note(&field.name, None);
                            if !field.embedded {
                                continue;
                            }
                            match &field.ty {
                                Type::Pointer(inner) => next.push((inner.as_ref().clone(), true)),
                                other => next.push((other.clone(), *addressable)),
                            }
                        }
                    }
                    _ => {}
                }
            }
            seen.extend(visited);

            for (name, (count, method)) in found.0 {
                if !hidden.insert(name.clone()) {
                    continue;
                }
                if let (1, Some(method)) = (count, method) {
                    methods.insert(name, method);
                }
            }
            level = next;
        }
        methods
    }

    /// Whether `ty` satisfies the interface `iface`
    pub fn implements(&self, ty: &Type, iface: &Interface) -> bool {
        let required = self.interface_methods(iface);
        if required.is_empty() {
            return true;
        }
        let available = self.method_set(ty);
        required.values().all(|req| {
            available
                .get(&req.name)
                .is_some_and(|method| method.satisfies(req))
        })
    }

    /// Two types are identical when their structure matches; named types
    /// are identical only to themselves
    pub fn identical(&self, a: &Type, b: &Type) -> bool {
        a == b
    }

    /// Field or method selected by `name` on a value of type `ty`, with
    /// automatic dereference of one pointer level and promotion through
    /// embedded fields
    pub fn lookup_field_or_method(&self, ty: &Type, name: &str) -> Option<Selection> {
        let base = match self.underlying(ty) {
            Type::Pointer(inner) => inner.as_ref(),
            _ => ty,
        };

        let mut seen = HashSet::new();
        let mut level = vec![base.clone()];
        for _ in 0..MAX_DEPTH {
            if level.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for current in &level {
                if let Type::Named(type_name) = current {
                    if !seen.insert(type_name.clone()) {
                        continue;
                    }
                    if let Some(decl) = self.named(type_name).and_then(|n| n.method(name)) {
                        return Some(Selection::Method(decl.method.sig.clone()));
                    }
                }
                match self.underlying(current) {
                    Type::Interface(iface) => {
                        if let Some(method) = self.interface_methods(iface).remove(name) {
                            return Some(Selection::Method(method.sig));
                        }
                    }
                    Type::Struct(fields) => {
                        if let Some(field) = fields.iter().find(|f| f.name == name) {
                            return Some(Selection::Field(field.ty.clone()));
                        }
                        next.extend(
                            fields
                                .iter()
                                .filter(|f| f.embedded)
                                .map(|f| f.ty.deref().clone()),
                        );
                    }
                    _ => {}
                }
            }
            level = next;
        }
        None
    }
}

/// Fields and methods met at one embedding depth: occurrences of each
/// name, and the method when the first occurrence is a usable method
#[derive(Default)]
struct DepthNames(BTreeMap<String, (usize, Option<Method>)>);

impl DepthNames {
    fn note(&mut self, name: &str, method: Option<Method>) {
        let entry = self.0.entry(name.to_string()).or_insert((0, None));
        entry.0 += 1;
        if entry.0 == 1 {
            entry.1 = method;
        }
    }
}
