//! Lowering from the resolved AST to the C++ IR.
//!
//! A single forward pass over one library. Declarations are lowered
//! independently, then re-emitted in the frontend's topological order; the
//! only state threaded through the pass is the set of handle subtypes seen,
//! which root assembly reads back at the end.

use std::collections::{BTreeSet, HashMap};

use midl_core::ast;
use midl_core::names::to_upper_camel_case;
use tracing::debug;

use crate::error::{LowerError, Result};
use crate::ir;
use crate::names::{
    change_if_reserved, format_destructor, format_library_path, format_library_prefix,
    format_namespace,
};

/// Above this many bytes of flat-plus-out-of-line payload, generated llcpp
/// code heap-allocates the message buffer instead of growing the stack.
const LLCPP_MAX_STACK_ALLOC_SIZE: u32 = 512;

/// Backend configuration supplied by the driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Declare callbacks as `std::function` instead of `fit::function`.
    pub legacy_callbacks: bool,
}

/// Lower a resolved library into the IR the C++ templates consume.
pub fn lower(root: &ast::Root, options: Options) -> Result<ir::Root> {
    let library = root.name.parse();
    debug!(library = %root.name, "lowering library to C++ IR");

    let mut cx = Lowering {
        namespace: format_namespace(&library),
        symbol_prefix: format_library_prefix(&library),
        decls: &root.declarations,
        library,
        handle_types: BTreeSet::new(),
        options,
    };

    let mut lowered: HashMap<ast::EncodedCompoundIdentifier, ir::Decl> = HashMap::new();
    for decl in &root.const_declarations {
        lowered.insert(decl.name.clone(), ir::Decl::Const(cx.lower_const(decl)?));
    }
    for decl in &root.enum_declarations {
        lowered.insert(decl.name.clone(), ir::Decl::Enum(cx.lower_enum(decl)));
    }
    for decl in &root.interface_declarations {
        lowered.insert(
            decl.name.clone(),
            ir::Decl::Interface(cx.lower_interface(decl)?),
        );
    }
    for decl in &root.struct_declarations {
        lowered.insert(decl.name.clone(), ir::Decl::Struct(cx.lower_struct(decl)?));
    }
    for decl in &root.table_declarations {
        lowered.insert(decl.name.clone(), ir::Decl::Table(cx.lower_table(decl)?));
    }
    for decl in &root.union_declarations {
        lowered.insert(decl.name.clone(), ir::Decl::Union(cx.lower_union(decl)?));
    }
    for decl in &root.xunion_declarations {
        lowered.insert(decl.name.clone(), ir::Decl::XUnion(cx.lower_xunion(decl)?));
    }

    let mut decls = Vec::with_capacity(root.declaration_order.len());
    for name in &root.declaration_order {
        let decl = lowered
            .remove(name)
            .ok_or_else(|| LowerError::UnknownDeclaration(name.clone()))?;
        decls.push(decl);
    }

    let mut headers = Vec::new();
    let mut ll_headers = Vec::new();
    for dependency in &root.library_dependencies {
        if dependency.name == root.name {
            // We don't need to include our own header.
            continue;
        }
        let path = format_library_path(&dependency.name.parse());
        headers.push(format!("{path}/cpp/midl.h"));
        ll_headers.push(format!("{path}/llcpp/midl.h"));
    }

    // The llcpp bindings transport requests over channels whether or not
    // any channel type is spelled out in the library.
    if !root.interface_declarations.is_empty() {
        cx.handle_types.insert(ast::HandleSubtype::Channel);
    }

    Ok(ir::Root {
        primary_header: format!("{}/cpp/midl.h", format_library_path(&cx.library)),
        headers,
        ll_headers,
        handle_types: cx.handle_types.into_iter().collect(),
        library_reversed: cx.library.reversed(),
        library: cx.library,
        decls,
    })
}

struct Lowering<'a> {
    namespace: String,
    symbol_prefix: String,
    decls: &'a ast::DeclMap,
    library: ast::LibraryIdentifier,
    handle_types: BTreeSet<ast::HandleSubtype>,
    options: Options,
}

impl Lowering<'_> {
    fn is_in_external_library(&self, ci: &ast::CompoundIdentifier) -> bool {
        ci.library != self.library
    }

    /// Format a qualified declaration name. Cross-library references are
    /// namespace-qualified; same-library references never are.
    fn lower_compound_identifier(&self, eci: &ast::EncodedCompoundIdentifier, suffix: &str) -> String {
        let ci = eci.parse();
        let name = change_if_reserved(ci.name.as_str(), suffix);
        if self.is_in_external_library(&ci) {
            format!("{}::{}", format_namespace(&ci.library), name)
        } else {
            name
        }
    }

    fn lower_literal(&self, literal: &ast::Literal) -> String {
        match literal {
            ast::Literal::String { value } => format!("{value:?}"),
            ast::Literal::Numeric { value } => value.clone(),
            ast::Literal::True => "true".to_string(),
            ast::Literal::False => "false".to_string(),
            ast::Literal::Default => "default".to_string(),
        }
    }

    fn lower_constant(&self, constant: &ast::Constant, ty: Option<&ir::Type>) -> String {
        match constant {
            ast::Constant::Identifier { identifier } => {
                let value = self.lower_compound_identifier(identifier, "");
                match ty {
                    Some(ty) if ty.decl_kind == Some(ast::DeclKind::Enum) => {
                        format!("{}::{}", ty.decl, value)
                    }
                    _ => value,
                }
            }
            ast::Constant::Literal { literal } => self.lower_literal(literal),
        }
    }

    fn lower_primitive_subtype(&self, subtype: ast::PrimitiveSubtype) -> &'static str {
        match subtype {
            ast::PrimitiveSubtype::Bool => "bool",
            ast::PrimitiveSubtype::Int8 => "int8_t",
            ast::PrimitiveSubtype::Int16 => "int16_t",
            ast::PrimitiveSubtype::Int32 => "int32_t",
            ast::PrimitiveSubtype::Int64 => "int64_t",
            ast::PrimitiveSubtype::Uint8 => "uint8_t",
            ast::PrimitiveSubtype::Uint16 => "uint16_t",
            ast::PrimitiveSubtype::Uint32 => "uint32_t",
            ast::PrimitiveSubtype::Uint64 => "uint64_t",
            ast::PrimitiveSubtype::Float32 => "float",
            ast::PrimitiveSubtype::Float64 => "double",
        }
    }

    fn lower_type(&mut self, ty: &ast::Type) -> Result<ir::Type> {
        let lowered = match ty {
            ast::Type::Array {
                element_type,
                element_count,
            } => {
                let element = self.lower_type(element_type)?;
                ir::Type {
                    decl: format!("::midl::Array<{}, {}>", element.decl, element_count),
                    ll_decl: format!("::midl::ArrayWrapper<{}, {}>", element.ll_decl, element_count),
                    dtor: "~Array".to_string(),
                    decl_kind: None,
                }
            }
            ast::Type::Vector {
                element_type,
                nullable,
                ..
            } => {
                let element = self.lower_type(element_type)?;
                // The low-level convention never owns vector storage, so the
                // view form is the same with or without nullability.
                let ll_decl = format!("::midl::VectorView<{}>", element.ll_decl);
                if *nullable {
                    ir::Type {
                        decl: format!("::midl::VectorPtr<{}>", element.decl),
                        ll_decl,
                        dtor: "~VectorPtr".to_string(),
                        decl_kind: None,
                    }
                } else {
                    ir::Type {
                        decl: format!("::std::vector<{}>", element.decl),
                        ll_decl,
                        dtor: String::new(),
                        decl_kind: None,
                    }
                }
            }
            ast::Type::String { nullable, .. } => {
                let ll_decl = "::midl::StringView".to_string();
                if *nullable {
                    ir::Type {
                        decl: "::midl::StringPtr".to_string(),
                        ll_decl,
                        dtor: "~StringPtr".to_string(),
                        decl_kind: None,
                    }
                } else {
                    ir::Type {
                        decl: "::std::string".to_string(),
                        ll_decl,
                        dtor: String::new(),
                        decl_kind: None,
                    }
                }
            }
            ast::Type::Handle { subtype, .. } => {
                self.handle_types.insert(*subtype);
                let decl = format!("::zx::{subtype}");
                ir::Type {
                    ll_decl: decl.clone(),
                    dtor: format!("~{subtype}"),
                    decl,
                    decl_kind: None,
                }
            }
            ast::Type::Request { subtype, .. } => {
                let interface = self.lower_compound_identifier(subtype, "");
                let decl = format!("::midl::InterfaceRequest<{interface}>");
                ir::Type {
                    ll_decl: decl.clone(),
                    dtor: "~InterfaceRequest".to_string(),
                    decl,
                    decl_kind: None,
                }
            }
            ast::Type::Primitive { subtype } => {
                let decl = self.lower_primitive_subtype(*subtype).to_string();
                ir::Type {
                    ll_decl: decl.clone(),
                    decl,
                    dtor: String::new(),
                    decl_kind: None,
                }
            }
            ast::Type::Identifier {
                identifier,
                nullable,
            } => {
                let name = self.lower_compound_identifier(identifier, "");
                let kind = *self
                    .decls
                    .get(identifier)
                    .ok_or_else(|| LowerError::UnresolvedIdentifier(identifier.clone()))?;
                match kind {
                    ast::DeclKind::Const
                    | ast::DeclKind::Enum
                    | ast::DeclKind::Struct
                    | ast::DeclKind::Table
                    | ast::DeclKind::Union
                    | ast::DeclKind::XUnion => {
                        if *nullable {
                            // The llcpp form of a nullable reference is a
                            // borrowed pointer, never an owned allocation.
                            ir::Type {
                                decl: format!("::std::unique_ptr<{name}>"),
                                ll_decl: format!("{name}*"),
                                dtor: "~unique_ptr".to_string(),
                                decl_kind: Some(kind),
                            }
                        } else {
                            ir::Type {
                                decl: name.clone(),
                                ll_decl: name,
                                dtor: format_destructor(identifier),
                                decl_kind: Some(kind),
                            }
                        }
                    }
                    ast::DeclKind::Interface => {
                        let decl = format!("::midl::InterfaceHandle<{name}>");
                        ir::Type {
                            ll_decl: decl.clone(),
                            decl,
                            dtor: "~InterfaceHandle".to_string(),
                            decl_kind: Some(kind),
                        }
                    }
                }
            }
        };
        Ok(lowered)
    }

    fn lower_const(&mut self, decl: &ast::Const) -> Result<ir::Const> {
        if matches!(decl.ty, ast::Type::String { .. }) {
            // String constants become externally linked character arrays;
            // constexpr std::string is not a thing the target allows.
            return Ok(ir::Const {
                attributes: decl.attributes.clone(),
                extern_: true,
                decorator: "const".to_string(),
                ty: ir::Type {
                    decl: "char".to_string(),
                    ll_decl: "char".to_string(),
                    dtor: String::new(),
                    decl_kind: None,
                },
                name: self.lower_compound_identifier(&decl.name, "[]"),
                value: self.lower_constant(&decl.value, None),
            });
        }
        let ty = self.lower_type(&decl.ty)?;
        Ok(ir::Const {
            attributes: decl.attributes.clone(),
            extern_: false,
            decorator: "constexpr".to_string(),
            name: self.lower_compound_identifier(&decl.name, ""),
            value: self.lower_constant(&decl.value, Some(&ty)),
            ty,
        })
    }

    fn lower_enum(&mut self, decl: &ast::Enum) -> ir::Enum {
        ir::Enum {
            namespace: self.namespace.clone(),
            ty: self.lower_primitive_subtype(decl.ty).to_string(),
            name: self.lower_compound_identifier(&decl.name, ""),
            members: decl
                .members
                .iter()
                .map(|member| ir::EnumMember {
                    name: change_if_reserved(member.name.as_str(), ""),
                    value: self.lower_constant(&member.value, None),
                })
                .collect(),
        }
    }

    fn lower_struct_member(&mut self, member: &ast::StructMember) -> Result<ir::StructMember> {
        let ty = self.lower_type(&member.ty)?;
        let default_value = match &member.maybe_default_value {
            Some(value) => self.lower_constant(value, Some(&ty)),
            None => String::new(),
        };
        Ok(ir::StructMember {
            attributes: member.attributes.clone(),
            ty,
            name: change_if_reserved(member.name.as_str(), ""),
            default_value,
            offset: member.offset,
        })
    }

    fn lower_struct(&mut self, decl: &ast::Struct) -> Result<ir::Struct> {
        let name = self.lower_compound_identifier(&decl.name, "");
        let mut members = decl
            .members
            .iter()
            .map(|member| self.lower_struct_member(member))
            .collect::<Result<Vec<_>>>()?;
        if members.is_empty() {
            members.push(self.lower_struct_member(&ast::StructMember::reserved_placeholder())?);
        }
        Ok(ir::Struct {
            attributes: decl.attributes.clone(),
            namespace: self.namespace.clone(),
            table_type: format!("{}_{}Table", self.symbol_prefix, name),
            name,
            members,
            size: decl.size,
            max_handles: decl.max_handles,
            max_out_of_line: decl.max_out_of_line,
        })
    }

    fn lower_table_member(&mut self, member: &ast::TableMember) -> Result<ir::TableMember> {
        let (ty, name) = match (&member.ty, &member.name) {
            (Some(ty), Some(name)) => (ty, name),
            _ => return Err(LowerError::MalformedTableMember(member.ordinal)),
        };
        let ty = self.lower_type(ty)?;
        let default_value = match &member.maybe_default_value {
            Some(value) => self.lower_constant(value, Some(&ty)),
            None => String::new(),
        };
        Ok(ir::TableMember {
            attributes: member.attributes.clone(),
            ty,
            name: change_if_reserved(name.as_str(), ""),
            default_value,
            ordinal: member.ordinal,
            field_presence_name: format!("has_{name}_"),
            field_data_name: format!("{name}_"),
            method_has_name: format!("has_{name}"),
            method_clear_name: format!("clear_{name}"),
            value_union_name: format!("ValueUnion_{name}"),
        })
    }

    fn lower_table(&mut self, decl: &ast::Table) -> Result<ir::Table> {
        let name = self.lower_compound_identifier(&decl.name, "");
        let mut members = Vec::with_capacity(decl.members.len());
        for member in &decl.members {
            // Reserved ordinals vanish from the IR; they are not tombstones.
            if member.reserved {
                continue;
            }
            members.push(self.lower_table_member(member)?);
        }
        members.sort_by_key(|member| member.ordinal);
        let biggest_ordinal = members.last().map_or(0, |member| member.ordinal);
        Ok(ir::Table {
            attributes: decl.attributes.clone(),
            namespace: self.namespace.clone(),
            table_type: format!("{}_{}Table", self.symbol_prefix, name),
            name,
            members,
            size: decl.size,
            biggest_ordinal,
            max_handles: decl.max_handles,
            max_out_of_line: decl.max_out_of_line,
        })
    }

    fn lower_union_member(&mut self, member: &ast::UnionMember) -> Result<ir::UnionMember> {
        Ok(ir::UnionMember {
            attributes: member.attributes.clone(),
            ty: self.lower_type(&member.ty)?,
            name: change_if_reserved(member.name.as_str(), ""),
            storage_name: change_if_reserved(member.name.as_str(), "_"),
            // Tags live in their own enum scope, so they take the plain
            // camel-cased name rather than a collision-adjusted one.
            tag_name: format!("k{}", to_upper_camel_case(member.name.as_str())),
            offset: member.offset,
        })
    }

    fn lower_union(&mut self, decl: &ast::Union) -> Result<ir::Union> {
        let name = self.lower_compound_identifier(&decl.name, "");
        Ok(ir::Union {
            attributes: decl.attributes.clone(),
            namespace: self.namespace.clone(),
            table_type: format!("{}_{}Table", self.symbol_prefix, name),
            name,
            members: decl
                .members
                .iter()
                .map(|member| self.lower_union_member(member))
                .collect::<Result<Vec<_>>>()?,
            size: decl.size,
            max_handles: decl.max_handles,
            max_out_of_line: decl.max_out_of_line,
        })
    }

    fn lower_xunion_member(&mut self, member: &ast::XUnionMember) -> Result<ir::XUnionMember> {
        Ok(ir::XUnionMember {
            attributes: member.attributes.clone(),
            ordinal: member.ordinal,
            ty: self.lower_type(&member.ty)?,
            name: change_if_reserved(member.name.as_str(), ""),
            storage_name: change_if_reserved(member.name.as_str(), "_"),
            tag_name: format!("k{}", to_upper_camel_case(member.name.as_str())),
            offset: member.offset,
        })
    }

    fn lower_xunion(&mut self, decl: &ast::XUnion) -> Result<ir::XUnion> {
        let name = self.lower_compound_identifier(&decl.name, "");
        Ok(ir::XUnion {
            attributes: decl.attributes.clone(),
            namespace: self.namespace.clone(),
            table_type: format!("{}_{}Table", self.symbol_prefix, name),
            name,
            members: decl
                .members
                .iter()
                .map(|member| self.lower_xunion_member(member))
                .collect::<Result<Vec<_>>>()?,
            size: decl.size,
            max_handles: decl.max_handles,
            max_out_of_line: decl.max_out_of_line,
        })
    }

    fn lower_parameters(&mut self, parameters: &[ast::Parameter]) -> Result<Vec<ir::Parameter>> {
        parameters
            .iter()
            .map(|parameter| {
                Ok(ir::Parameter {
                    ty: self.lower_type(&parameter.ty)?,
                    name: change_if_reserved(parameter.name.as_str(), ""),
                    offset: parameter.offset,
                })
            })
            .collect()
    }

    fn lower_method(&mut self, interface_name: &str, method: &ast::Method) -> Result<ir::Method> {
        let request = self.lower_parameters(&method.maybe_request)?;
        let response = self.lower_parameters(&method.maybe_response)?;
        let request_max_handles = max_handles_from_parameters(&method.maybe_request);
        let request_max_out_of_line = max_out_of_line_from_parameters(&method.maybe_request);
        let response_max_handles = max_handles_from_parameters(&method.maybe_response);
        let response_max_out_of_line = max_out_of_line_from_parameters(&method.maybe_response);

        let ll_props = ir::LlcppProps {
            interface_name: interface_name.to_string(),
            c_binding_compatible: response_max_out_of_line == 0,
            need_to_linearize: !request.is_empty() && request_max_out_of_line > 0,
            stack_alloc_request: request.is_empty()
                || fits_on_stack(method.maybe_request_size, request_max_out_of_line),
            stack_alloc_response: response.is_empty()
                || fits_on_stack(method.maybe_response_size, response_max_out_of_line),
            encode_request: request_max_out_of_line > 0 || request_max_handles > 0,
            decode_response: response_max_out_of_line > 0 || response_max_handles > 0,
        };

        let callback_type = if method.has_response {
            change_if_reserved(method.name.as_str(), "Callback")
        } else {
            String::new()
        };
        let response_type_suffix = if method.has_request {
            "ResponseTable"
        } else {
            "EventTable"
        };
        let callback_wrapper = if self.options.legacy_callbacks {
            "std::function"
        } else {
            "fit::function"
        };

        Ok(ir::Method {
            attributes: method.attributes.clone(),
            ordinal: method.ordinal,
            ordinal_name: format!("k{}_{}_Ordinal", interface_name, method.name),
            generated_ordinal: method.generated_ordinal,
            generated_ordinal_name: format!("k{}_{}_GenOrdinal", interface_name, method.name),
            name: change_if_reserved(method.name.as_str(), ""),
            has_request: method.has_request,
            request,
            request_size: method.maybe_request_size,
            request_type_name: format!(
                "{}_{}{}RequestTable",
                self.symbol_prefix, interface_name, method.name
            ),
            request_max_handles,
            request_max_out_of_line,
            has_response: method.has_response,
            response,
            response_size: method.maybe_response_size,
            response_type_name: format!(
                "{}_{}{}{}",
                self.symbol_prefix, interface_name, method.name, response_type_suffix
            ),
            response_max_handles,
            response_max_out_of_line,
            callback_type,
            callback_wrapper: callback_wrapper.to_string(),
            response_handler_type: format!("{}_{}_ResponseHandler", interface_name, method.name),
            responder_type: format!("{}_{}_Responder", interface_name, method.name),
            transitional: method.attributes.has("Transitional"),
            ll_props,
        })
    }

    fn lower_interface(&mut self, decl: &ast::Interface) -> Result<ir::Interface> {
        let name = self.lower_compound_identifier(&decl.name, "");
        let methods = decl
            .methods
            .iter()
            .map(|method| self.lower_method(&name, method))
            .collect::<Result<Vec<_>>>()?;
        Ok(ir::Interface {
            attributes: decl.attributes.clone(),
            namespace: self.namespace.clone(),
            class_name: self.lower_compound_identifier(&decl.name, "_clazz"),
            service_name: decl.service_name(),
            proxy_name: self.lower_compound_identifier(&decl.name, "_Proxy"),
            stub_name: self.lower_compound_identifier(&decl.name, "_Stub"),
            event_sender_name: self.lower_compound_identifier(&decl.name, "_EventSender"),
            sync_name: self.lower_compound_identifier(&decl.name, "_Sync"),
            sync_proxy_name: self.lower_compound_identifier(&decl.name, "_SyncProxy"),
            name,
            methods,
        })
    }
}

/// Whether a message of `size` flat bytes plus `max_out_of_line` indirected
/// bytes may live on the caller's stack.
fn fits_on_stack(size: u32, max_out_of_line: u32) -> bool {
    u64::from(size) + u64::from(max_out_of_line) < u64::from(LLCPP_MAX_STACK_ALLOC_SIZE)
}

/// Saturating sum of the per-parameter handle bounds. A transitive total
/// past `u32::MAX` clamps instead of wrapping.
fn max_handles_from_parameters(parameters: &[ast::Parameter]) -> u32 {
    saturate(
        parameters
            .iter()
            .map(|parameter| u64::from(parameter.max_handles))
            .sum(),
    )
}

/// Saturating sum of the per-parameter out-of-line bounds.
fn max_out_of_line_from_parameters(parameters: &[ast::Parameter]) -> u32 {
    saturate(
        parameters
            .iter()
            .map(|parameter| u64::from(parameter.max_out_of_line))
            .sum(),
    )
}

fn saturate(total: u64) -> u32 {
    total.min(u64::from(u32::MAX)) as u32
}
