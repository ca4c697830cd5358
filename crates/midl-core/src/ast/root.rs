use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    Const, EncodedCompoundIdentifier, EncodedLibraryIdentifier, Enum, Interface, Struct, Table,
    Union, XUnion,
};
use crate::error::Result;

/// Another library this one depends on, directly or transitively.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Library {
    pub name: EncodedLibraryIdentifier,
}

/// What kind of declaration a qualified name refers to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Const,
    Enum,
    Interface,
    Struct,
    Table,
    Union,
    XUnion,
}

/// Declaration-kind lookup table covering this library and everything it
/// references. Built by the frontend; backends treat a miss as fatal.
pub type DeclMap = BTreeMap<EncodedCompoundIdentifier, DeclKind>;

/// The frontend's entire output for one library.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Root {
    #[serde(default)]
    pub version: String,
    pub name: EncodedLibraryIdentifier,
    #[serde(default)]
    pub library_dependencies: Vec<Library>,
    #[serde(default)]
    pub const_declarations: Vec<Const>,
    #[serde(default)]
    pub enum_declarations: Vec<Enum>,
    #[serde(default)]
    pub interface_declarations: Vec<Interface>,
    #[serde(default)]
    pub struct_declarations: Vec<Struct>,
    #[serde(default)]
    pub table_declarations: Vec<Table>,
    #[serde(default)]
    pub union_declarations: Vec<Union>,
    #[serde(default)]
    pub xunion_declarations: Vec<XUnion>,
    /// Topological order over every declaration above. Backends emit in
    /// exactly this order.
    #[serde(default)]
    pub declaration_order: Vec<EncodedCompoundIdentifier>,
    #[serde(default)]
    pub declarations: DeclMap,
}

impl Root {
    /// Decode a library from the frontend's JSON output.
    pub fn from_json(source: &str) -> Result<Root> {
        Ok(serde_json::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decode_minimal_library() {
        let root = Root::from_json(
            r#"{
                "version": "0.0.1",
                "name": "example.empty",
                "library_dependencies": [],
                "declaration_order": [],
                "declarations": {}
            }"#,
        )
        .expect("minimal library should decode");
        assert_eq!(root.name.0, "example.empty");
        assert!(root.struct_declarations.is_empty());
    }

    #[test]
    fn decode_declaration_map() {
        let root = Root::from_json(
            r#"{
                "name": "example.kinds",
                "declarations": {
                    "example.kinds/Color": "enum",
                    "example.kinds/Point": "struct",
                    "example.kinds/Shape": "xunion"
                }
            }"#,
        )
        .expect("declaration map should decode");
        let point = EncodedCompoundIdentifier("example.kinds/Point".to_string());
        assert_eq!(root.declarations.get(&point), Some(&DeclKind::Struct));
        let shape = EncodedCompoundIdentifier("example.kinds/Shape".to_string());
        assert_eq!(root.declarations.get(&shape), Some(&DeclKind::XUnion));
    }
}
