//! Analyzer instances

/// Configuration of one analyzer instance. Instances share the engine and
/// differ only in the name prefix that marks a candidate interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Analyzer name, also the namespace of its facts
    pub name: String,
    /// Declared name prefix of candidate interfaces
    pub prefix: String,
    /// Report implementation counts while analyzing
    pub verbose: bool,
}

impl AnalyzerConfig {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            verbose: false,
        }
    }

    /// `sumlint`: interfaces named `Sum*` with a `sum*()` marker method
    pub fn sum() -> Self {
        Self::new("sumlint", "Sum")
    }

    /// `oneoflint`: generated oneof wrappers such as `isMsg_Payload`
    pub fn oneof() -> Self {
        Self::new("oneoflint", "is")
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// One of the two built-in instances, by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "sumlint" => Some(Self::sum()),
            "oneoflint" => Some(Self::oneof()),
            _ => None,
        }
    }
}
