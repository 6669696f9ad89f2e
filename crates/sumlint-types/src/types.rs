//! Resolved type representations

use std::fmt;

/// The identity of a declared type: the path of its package and its name.
/// Predeclared types (`error`) have an empty package path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    pub package: String,
    pub name: String,
}

impl TypeName {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// A resolved type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Basic(BasicKind),

    /// Reference to a declared type, resolved through the `Universe`
    Named(TypeName),

    Pointer(Box<Type>),
    Slice(Box<Type>),
    /// Array length is not modeled
    Array(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Chan(Box<Type>),
    Struct(Vec<Field>),
    Interface(Interface),
    Signature(Signature),

    /// Multiple results of a call
    Tuple(Vec<Type>),

    /// The type of `nil`, also used for `case nil:`
    Nil,
}

impl Type {
    pub fn pointer_to(inner: Type) -> Type {
        Type::Pointer(Box::new(inner))
    }

    /// Strip a single level of pointer indirection
    pub fn deref(&self) -> &Type {
        match self {
            Type::Pointer(inner) => inner,
            other => other,
        }
    }

    pub fn as_named(&self) -> Option<&TypeName> {
        match self {
            Type::Named(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn display(&self) -> String {
        match self {
            Type::Basic(kind) => kind.name().to_string(),
            Type::Named(name) => name.to_string(),
            Type::Pointer(inner) => format!("*{}", inner.display()),
            Type::Slice(inner) => format!("[]{}", inner.display()),
            Type::Array(inner) => format!("[...]{}", inner.display()),
            Type::Map(key, value) => format!("map[{}]{}", key.display(), value.display()),
            Type::Chan(inner) => format!("chan {}", inner.display()),
            Type::Struct(fields) => {
                let fields: Vec<_> = fields
                    .iter()
                    .map(|f| {
                        if f.embedded {
                            f.ty.display()
                        } else {
                            format!("{} {}", f.name, f.ty.display())
                        }
                    })
                    .collect();
                format!("struct{{{}}}", fields.join("; "))
            }
            Type::Interface(iface) => {
                let mut elems: Vec<_> = iface.embeddeds.iter().map(Type::display).collect();
                elems.extend(
                    iface
                        .methods
                        .iter()
                        .map(|m| format!("{}{}", m.name, m.sig.display_params())),
                );
                format!("interface{{{}}}", elems.join("; "))
            }
            Type::Signature(sig) => format!("func{}", sig.display_params()),
            Type::Tuple(types) => {
                let types: Vec<_> = types.iter().map(Type::display).collect();
                format!("({})", types.join(", "))
            }
            Type::Nil => "untyped nil".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl BasicKind {
    /// Predeclared basic type by name; `byte` and `rune` are aliases
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => BasicKind::Bool,
            "string" => BasicKind::String,
            "int" => BasicKind::Int,
            "int8" => BasicKind::Int8,
            "int16" => BasicKind::Int16,
            "int32" | "rune" => BasicKind::Int32,
            "int64" => BasicKind::Int64,
            "uint" => BasicKind::Uint,
            "uint8" | "byte" => BasicKind::Uint8,
            "uint16" => BasicKind::Uint16,
            "uint32" => BasicKind::Uint32,
            "uint64" => BasicKind::Uint64,
            "uintptr" => BasicKind::Uintptr,
            "float32" => BasicKind::Float32,
            "float64" => BasicKind::Float64,
            "complex64" => BasicKind::Complex64,
            "complex128" => BasicKind::Complex128,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::String => "string",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
        }
    }
}

/// A struct field; embedded fields are named after their type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub embedded: bool,
}

/// A method of an interface or a named type.
///
/// `package` is the path of the declaring package; unexported method names
/// from different packages never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub package: String,
    pub sig: Signature,
}

impl Method {
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }

    /// Whether `self` can stand in for the interface method `required`
    pub fn satisfies(&self, required: &Method) -> bool {
        self.name == required.name
            && self.sig == required.sig
            && (required.is_exported() || self.package == required.package)
    }
}

/// Interface type as declared: explicit methods, sorted by name, and
/// embedded interfaces
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interface {
    pub methods: Vec<Method>,
    pub embeddeds: Vec<Type>,
}

impl Interface {
    pub fn new(mut methods: Vec<Method>, embeddeds: Vec<Type>) -> Self {
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        Self { methods, embeddeds }
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.embeddeds.is_empty()
    }
}

/// Parameter and result types of a function; names are not part of the type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub params: Vec<Type>,
    pub results: Vec<Type>,
    pub variadic: bool,
}

impl Signature {
    /// The value of a call: nothing, the single result, or a tuple
    pub fn call_result(&self) -> Option<Type> {
        match self.results.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => Some(Type::Tuple(many.to_vec())),
        }
    }

    fn display_params(&self) -> String {
        let params: Vec<_> = self.params.iter().map(Type::display).collect();
        let results: Vec<_> = self.results.iter().map(Type::display).collect();
        match results.len() {
            0 => format!("({})", params.join(", ")),
            1 => format!("({}) {}", params.join(", "), results[0]),
            _ => format!("({}) ({})", params.join(", "), results.join(", ")),
        }
    }
}

pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
