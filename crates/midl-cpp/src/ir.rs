//! The C++ IR handed to the template emitters.
//!
//! Everything here is plain data: names already formatted, layout facts
//! already aggregated. The emitters only walk and print it. All values are
//! produced once by [crate::lower] and never mutated afterwards.

use midl_core::ast::{Attributes, DeclKind, HandleSubtype, LibraryIdentifier};
use serde::Serialize;

/// C++ spellings of one resolved type.
///
/// `decl` is the owning representation used for storage and ordinary
/// accessors; `ll_decl` is the non-owning view the llcpp bindings use. Both
/// denote layout-compatible encodings of the same value, and for
/// primitives, handles, and interface endpoints they are identical.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Type {
    pub decl: String,
    pub ll_decl: String,
    /// Name of the destructor the owning representation implies; empty for
    /// trivially destructible types.
    pub dtor: String,
    pub decl_kind: Option<DeclKind>,
}

/// A lowered declaration, tagged so the emitter can dispatch on kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Decl {
    Const(Const),
    Enum(Enum),
    Interface(Interface),
    Struct(Struct),
    Table(Table),
    Union(Union),
    XUnion(XUnion),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Const {
    pub attributes: Attributes,
    /// String constants link externally as `const char[]`; everything else
    /// is an internal `constexpr` with full type information.
    #[serde(rename = "extern")]
    pub extern_: bool,
    pub decorator: String,
    pub ty: Type,
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Enum {
    pub namespace: String,
    pub ty: String,
    pub name: String,
    pub members: Vec<EnumMember>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Struct {
    pub attributes: Attributes,
    pub namespace: String,
    pub name: String,
    /// Symbol of the wire-format coding table describing this struct.
    pub table_type: String,
    pub members: Vec<StructMember>,
    pub size: u32,
    pub max_handles: u32,
    pub max_out_of_line: u32,
}

impl Struct {
    /// Whether encode/decode steps are needed at all: a struct with neither
    /// handles nor out-of-line data is already in wire shape.
    pub fn needs_encode_decode(&self) -> bool {
        self.max_handles > 0 || self.max_out_of_line > 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructMember {
    pub attributes: Attributes,
    pub ty: Type,
    pub name: String,
    pub default_value: String,
    pub offset: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Table {
    pub attributes: Attributes,
    pub namespace: String,
    pub name: String,
    pub table_type: String,
    /// Sorted ascending by ordinal, reserved slots removed.
    pub members: Vec<TableMember>,
    pub size: u32,
    /// Ordinal of the highest surviving member; 0 when none survive.
    pub biggest_ordinal: u32,
    pub max_handles: u32,
    pub max_out_of_line: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableMember {
    pub attributes: Attributes,
    pub ty: Type,
    pub name: String,
    pub default_value: String,
    pub ordinal: u32,
    pub field_presence_name: String,
    pub field_data_name: String,
    pub method_has_name: String,
    pub method_clear_name: String,
    pub value_union_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Union {
    pub attributes: Attributes,
    pub namespace: String,
    pub name: String,
    pub table_type: String,
    pub members: Vec<UnionMember>,
    pub size: u32,
    pub max_handles: u32,
    pub max_out_of_line: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnionMember {
    pub attributes: Attributes,
    pub ty: Type,
    pub name: String,
    pub storage_name: String,
    pub tag_name: String,
    pub offset: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct XUnion {
    pub attributes: Attributes,
    pub namespace: String,
    pub name: String,
    pub table_type: String,
    pub members: Vec<XUnionMember>,
    pub size: u32,
    pub max_handles: u32,
    pub max_out_of_line: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct XUnionMember {
    pub attributes: Attributes,
    pub ordinal: u32,
    pub ty: Type,
    pub name: String,
    pub storage_name: String,
    pub tag_name: String,
    pub offset: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Interface {
    pub attributes: Attributes,
    pub namespace: String,
    pub name: String,
    pub class_name: String,
    pub service_name: String,
    pub proxy_name: String,
    pub stub_name: String,
    pub event_sender_name: String,
    pub sync_name: String,
    pub sync_proxy_name: String,
    pub methods: Vec<Method>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Method {
    pub attributes: Attributes,
    pub ordinal: u32,
    pub ordinal_name: String,
    pub generated_ordinal: u32,
    pub generated_ordinal_name: String,
    pub name: String,
    pub has_request: bool,
    pub request: Vec<Parameter>,
    pub request_size: u32,
    pub request_type_name: String,
    pub request_max_handles: u32,
    pub request_max_out_of_line: u32,
    pub has_response: bool,
    pub response: Vec<Parameter>,
    pub response_size: u32,
    pub response_type_name: String,
    pub response_max_handles: u32,
    pub response_max_out_of_line: u32,
    /// Callback type name; empty for methods without a response.
    pub callback_type: String,
    /// The callable wrapper callbacks are declared with, fixed for the whole
    /// compilation unit by [crate::Options].
    pub callback_wrapper: String,
    pub response_handler_type: String,
    pub responder_type: String,
    pub transitional: bool,
    pub ll_props: LlcppProps,
}

/// Per-method facts specific to the llcpp bindings, derived from layout
/// bounds the frontend computed. They gate which code paths the emitter may
/// generate for the method.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LlcppProps {
    pub interface_name: String,
    /// An out-of-line pointer in the response would outlive the
    /// caller-managed storage it points into, so the simplified C calling
    /// convention is only offered when the response is fully inline.
    pub c_binding_compatible: bool,
    pub need_to_linearize: bool,
    pub stack_alloc_request: bool,
    pub stack_alloc_response: bool,
    pub encode_request: bool,
    pub decode_response: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Parameter {
    pub ty: Type,
    pub name: String,
    pub offset: u32,
}

/// Everything the emitter needs for one library.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Root {
    pub primary_header: String,
    pub headers: Vec<String>,
    pub ll_headers: Vec<String>,
    /// Handle subtypes referenced anywhere in the library, sorted and
    /// de-duplicated.
    pub handle_types: Vec<HandleSubtype>,
    pub library: LibraryIdentifier,
    pub library_reversed: LibraryIdentifier,
    /// Declarations in the frontend's topological order.
    pub decls: Vec<Decl>,
}
