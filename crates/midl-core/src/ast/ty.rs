use serde::{Deserialize, Serialize};
use strum_macros::Display;

use super::EncodedCompoundIdentifier;

/// Kernel object classes a handle may refer to.
///
/// Variants are declared in name order so the derived `Ord` sorts the way
/// the emitted handle-type list must be sorted.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, Display, Hash, Eq, PartialEq, Ord, PartialOrd,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HandleSubtype {
    Channel,
    Event,
    EventPair,
    Fifo,
    Guest,
    Handle,
    Interrupt,
    Job,
    Log,
    Port,
    Process,
    Resource,
    Socket,
    Thread,
    Timer,
    Vmar,
    Vmo,
}

/// Fixed-width primitive types of the wire format.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, Display, Hash, Eq, PartialEq, Ord, PartialOrd,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveSubtype {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

/// A resolved type reference, as it appears on struct/table/union members
/// and method parameters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Type {
    Array {
        element_type: Box<Type>,
        element_count: u32,
    },
    Vector {
        element_type: Box<Type>,
        #[serde(default)]
        maybe_element_count: Option<u32>,
        #[serde(default)]
        nullable: bool,
    },
    String {
        #[serde(default)]
        maybe_element_count: Option<u32>,
        #[serde(default)]
        nullable: bool,
    },
    Handle {
        subtype: HandleSubtype,
        #[serde(default)]
        nullable: bool,
    },
    /// The server end of a channel speaking a given interface's protocol:
    /// an endpoint that is not yet bound to an implementation.
    Request {
        subtype: EncodedCompoundIdentifier,
        #[serde(default)]
        nullable: bool,
    },
    Primitive {
        subtype: PrimitiveSubtype,
    },
    /// Reference to another declaration, resolved through the declaration
    /// map carried on [super::Root].
    Identifier {
        identifier: EncodedCompoundIdentifier,
        #[serde(default)]
        nullable: bool,
    },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decode_kind_tagged_type() {
        let ty: Type = serde_json::from_value(serde_json::json!({
            "kind": "vector",
            "element_type": { "kind": "primitive", "subtype": "uint8" },
            "nullable": true,
        }))
        .expect("vector type should decode");
        assert_eq!(
            ty,
            Type::Vector {
                element_type: Box::new(Type::Primitive {
                    subtype: PrimitiveSubtype::Uint8
                }),
                maybe_element_count: None,
                nullable: true,
            }
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result: Result<Type, _> =
            serde_json::from_value(serde_json::json!({ "kind": "quaternion" }));
        assert!(result.is_err(), "unknown type kind must not decode");
    }

    #[test]
    fn handle_subtypes_sort_by_name() {
        let mut subtypes = vec![
            HandleSubtype::Vmo,
            HandleSubtype::Channel,
            HandleSubtype::Job,
        ];
        subtypes.sort();
        assert_eq!(
            subtypes,
            vec![
                HandleSubtype::Channel,
                HandleSubtype::Job,
                HandleSubtype::Vmo,
            ]
        );
    }
}
