use serde::{Deserialize, Serialize};

/// Static metadata describing one service interface.
///
/// Built once per interface from a fixed method table (see
/// [`interface_desc!`](crate::interface_desc)) and shared read-only by every
/// server stub for that interface. Method and argument ordering is the
/// binding contract between proxy and stub: it matches the positional order
/// used at call time and never changes after construction.
///
/// The serialized field names (`Name`, `PkgPath`, `Methods`, ...) are fixed
/// for interop with peers that diff or version descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InterfaceDesc {
    pub name: String,
    pub pkg_path: String,
    pub methods: Vec<MethodDesc>,
}

impl InterfaceDesc {
    /// Looks up a method by exact, case-sensitive name.
    pub fn method(&self, name: &str) -> Option<&MethodDesc> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// One method with its positional in- and out-arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MethodDesc {
    pub name: String,
    pub in_args: Vec<ArgDesc>,
    pub out_args: Vec<ArgDesc>,
}

/// A named argument. The type tag is introspection metadata only; it is not
/// enforced at the binding layer and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArgDesc {
    pub name: String,
    #[serde(rename = "Type")]
    pub typ: String,
}

impl ArgDesc {
    pub fn new(name: impl Into<String>, typ: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: typ.into(),
        }
    }
}
