use serde::{Deserialize, Serialize};

use super::{EncodedCompoundIdentifier, Identifier, PrimitiveSubtype, Type};

/// One `[Name = "value"]` annotation carried through from the source.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    pub name: Identifier,
    #[serde(default)]
    pub value: String,
}

/// Attribute list attached to a declaration or member. Absent lists decode
/// as empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Attributes(pub Vec<Attribute>);

impl Attributes {
    pub fn lookup(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|attr| attr.name.as_str() == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

/// A literal as written in the source. Numeric text is carried verbatim;
/// backends forward it unchanged rather than reparse it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Literal {
    String { value: String },
    Numeric { value: String },
    True,
    False,
    Default,
}

/// A constant expression: either a literal or a reference to a declared
/// constant (including enum members).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Constant {
    Identifier { identifier: EncodedCompoundIdentifier },
    Literal { literal: Literal },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Const {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: EncodedCompoundIdentifier,
    pub value: Constant,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Enum {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    #[serde(rename = "type")]
    pub ty: PrimitiveSubtype,
    pub name: EncodedCompoundIdentifier,
    pub members: Vec<EnumMember>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EnumMember {
    pub name: Identifier,
    pub value: Constant,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Struct {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    pub name: EncodedCompoundIdentifier,
    pub members: Vec<StructMember>,
    pub size: u32,
    #[serde(default)]
    pub max_handles: u32,
    #[serde(default)]
    pub max_out_of_line: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StructMember {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: Identifier,
    pub offset: u32,
    #[serde(default)]
    pub maybe_default_value: Option<Constant>,
}

impl StructMember {
    /// The member injected into a struct the source declared with no
    /// members. An empty struct still occupies one byte on the wire, and
    /// some ownership models forbid empty record types outright.
    pub fn reserved_placeholder() -> StructMember {
        StructMember {
            attributes: Attributes::default(),
            ty: Type::Primitive {
                subtype: PrimitiveSubtype::Uint8,
            },
            name: Identifier::new("__reserved"),
            offset: 0,
            maybe_default_value: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Table {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    pub name: EncodedCompoundIdentifier,
    pub members: Vec<TableMember>,
    pub size: u32,
    #[serde(default)]
    pub max_handles: u32,
    #[serde(default)]
    pub max_out_of_line: u32,
}

/// A table slot. Reserved slots carry only their ordinal; the frontend
/// leaves every other field absent for them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TableMember {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    pub ordinal: u32,
    #[serde(default)]
    pub reserved: bool,
    #[serde(default, rename = "type")]
    pub ty: Option<Type>,
    #[serde(default)]
    pub name: Option<Identifier>,
    #[serde(default)]
    pub maybe_default_value: Option<Constant>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Union {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    pub name: EncodedCompoundIdentifier,
    pub members: Vec<UnionMember>,
    pub size: u32,
    #[serde(default)]
    pub max_handles: u32,
    #[serde(default)]
    pub max_out_of_line: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UnionMember {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: Identifier,
    pub offset: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct XUnion {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    pub name: EncodedCompoundIdentifier,
    pub members: Vec<XUnionMember>,
    pub size: u32,
    #[serde(default)]
    pub max_handles: u32,
    #[serde(default)]
    pub max_out_of_line: u32,
}

/// Extensible-union member. Unlike plain union members these carry an
/// explicit wire ordinal: the discriminant travels on the wire instead of
/// being an index into the member list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct XUnionMember {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    pub ordinal: u32,
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: Identifier,
    pub offset: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Interface {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    pub name: EncodedCompoundIdentifier,
    pub methods: Vec<Method>,
}

impl Interface {
    /// The quoted discovery name for `[Discoverable]` interfaces: the
    /// library path and interface name joined with dots. Empty when the
    /// interface is not discoverable.
    pub fn service_name(&self) -> String {
        if !self.attributes.has("Discoverable") {
            return String::new();
        }
        let ci = self.name.parse();
        let mut parts: Vec<String> = ci
            .library
            .segments()
            .iter()
            .map(|segment| segment.as_str().to_string())
            .collect();
        parts.push(ci.name.as_str().to_string());
        format!("{:?}", parts.join("."))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Method {
    #[serde(default, rename = "maybe_attributes")]
    pub attributes: Attributes,
    pub ordinal: u32,
    pub generated_ordinal: u32,
    pub name: Identifier,
    pub has_request: bool,
    #[serde(default)]
    pub maybe_request: Vec<Parameter>,
    #[serde(default)]
    pub maybe_request_size: u32,
    pub has_response: bool,
    #[serde(default)]
    pub maybe_response: Vec<Parameter>,
    #[serde(default)]
    pub maybe_response_size: u32,
}

/// A request or response parameter. The per-parameter handle and
/// out-of-line bounds are frontend-computed; backends only aggregate them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: Identifier,
    pub offset: u32,
    #[serde(default)]
    pub max_handles: u32,
    #[serde(default)]
    pub max_out_of_line: u32,
}
