//! Load emitter (component H).
//!
//! Grounded on `original_source/uxsdcxx.py`'s `_gen_load_dfa`/
//! `_gen_load_all`/`_gen_load_simple`/`load_fn_from_complex_type`
//! (spec.md §4.H steps 1-5). The count pass (component G) has already
//! walked the same tree and rejected anything the content model or
//! required-attribute set disallows, so load never re-checks
//! cardinality — it trusts the invariant "count succeeded" and unwraps
//! accordingly (spec.md §5 "count pass -> alloc -> load" ordering).
//!
//! Arena writes mirror spec.md's `out->x_list = &x_arena[g_num_x]`
//! pointer-binding trick with an index instead of a pointer: each
//! `many`-complex child reserves the next slot in its arena's running
//! cursor before recursing into it, so a self-recursive type (`note`
//! containing `note*`) numbers descendants after their own slot without
//! the two ever colliding.

use crate::annotate::{
    AnnotatedComplexType, AnnotatedUnion, ContentModelKind, ElementTypeRef, SimpleTypeRef,
};
use crate::codegen::builder::CodeBuilder;
use crate::codegen::{lexer, structs};
use crate::registry::Registry;

/// `Arenas`: one `Vec<T>` per arena-eligible complex type, preallocated
/// to exactly the size the count pass computed (spec.md §5 "zeroing
/// allocator, never resized").
pub fn emit_arenas_struct(b: &mut CodeBuilder, registry: &Registry) {
    b.line("#[derive(Debug, Default)]");
    b.block("pub struct Arenas {", "}", |b| {
        for name in registry.sorted_arena_types() {
            let ty = registry.complex[&name].rust_type.clone();
            b.line(format!("pub {}: Vec<{ty}>,", structs::arena_field_name(&name)));
        }
    });
    b.blank();
    b.block("fn alloc_arenas(counts: &Counts) -> Arenas {", "}", |b| {
        b.block("Arenas {", "}", |b| {
            for name in registry.sorted_arena_types() {
                let ty = registry.complex[&name].rust_type.clone();
                let field = structs::arena_field_name(&name);
                b.line(format!(
                    "{field}: vec![{ty}::default(); counts.{field} as usize],"
                ));
            }
        });
    });
    b.blank();
    b.line("#[derive(Debug, Default)]");
    b.block("struct Cursors {", "}", |b| {
        for name in registry.sorted_arena_types() {
            b.line(format!("{}: u32,", structs::arena_field_name(&name)));
        }
    });
}

/// Drives emission: the `Arenas`/`Cursors` scaffolding, one `load_<T>`
/// per complex type, and one `load_union_<T>` per union.
pub fn emit_all(b: &mut CodeBuilder, registry: &Registry) {
    emit_arenas_struct(b, registry);
    b.blank();
    for name in &registry.unions {
        emit_union_loader(b, &registry.union_defs[name]);
        b.blank();
    }
    for name in registry.ordered_complex_types() {
        emit_load_fn(b, &registry.complex[name]);
        b.blank();
    }
}

pub(crate) fn fn_name(schema_name: &str) -> String {
    use heck::ToSnakeCase;
    format!("load_{}", schema_name.to_snake_case())
}

fn union_fn_name(schema_name: &str) -> String {
    use heck::ToSnakeCase;
    format!("load_union_{}", schema_name.to_snake_case())
}

/// An expression (not a statement) that parses `{text_var}: &str` into
/// the Rust value `sref` denotes, short-circuiting with `?` on failure.
/// Reused by both element-child and attribute loading, and by the
/// per-member branches a union loader tries in declaration order.
fn parse_simple_expr(sref: &SimpleTypeRef, text_var: &str) -> String {
    match sref {
        SimpleTypeRef::Builtin(local) => {
            let rust = sref.rust_type();
            format!(
                "{text_var}.parse::<{rust}>().map_err(|e| LoadError::ParseFailure {{ type_name: {:?}.to_string(), text: {text_var}.to_string(), detail: e.to_string() }})?",
                local
            )
        }
        SimpleTypeRef::Enum(name) => {
            let table = lexer::phf_table_name("ENUM_TOKENS", name);
            format!(
                "*{table}.get({text_var}).ok_or_else(|| LoadError::EnumNotFound {{ type_name: {:?}.to_string(), text: {text_var}.to_string() }})?"
            )
        }
        SimpleTypeRef::List => format!("{text_var}.to_string()"),
        SimpleTypeRef::Union(name) => format!("{}({text_var})?", union_fn_name(name)),
    }
}

/// `load_union_<T>(text) -> LoadResult<T>`: tries each member in
/// declaration order, accepting the first whose parse succeeds (spec.md
/// §4.H "first whose error channel is clean").
fn emit_union_loader(b: &mut CodeBuilder, u: &AnnotatedUnion) {
    b.block(
        &format!("fn {}(text: &str) -> LoadResult<{}> {{", union_fn_name(&u.schema_name), u.rust_type),
        "}",
        |b| {
            for member in &u.members {
                let variant = crate::mangle::union_variant(&member.rust_type());
                match member {
                    SimpleTypeRef::Enum(name) => {
                        let table = lexer::phf_table_name("ENUM_TOKENS", name);
                        b.block(&format!("if let Some(v) = {table}.get(text) {{"), "}", |b| {
                            b.line(format!("return Ok({}::{variant}(*v));", u.rust_type));
                        });
                    }
                    SimpleTypeRef::List => {
                        b.line(format!("return Ok({}::{variant}(text.to_string()));", u.rust_type));
                    }
                    SimpleTypeRef::Union(name) => {
                        b.block(&format!("if let Ok(v) = {}(text) {{", union_fn_name(name)), "}", |b| {
                            b.line(format!("return Ok({}::{variant}(v));", u.rust_type));
                        });
                    }
                    SimpleTypeRef::Builtin(_) => {
                        let rust = member.rust_type();
                        b.block(&format!("if let Ok(v) = text.parse::<{rust}>() {{"), "}", |b| {
                            b.line(format!("return Ok({}::{variant}(v));", u.rust_type));
                        });
                    }
                }
            }
            b.line(format!(
                "Err(LoadError::UnionNoMatch {{ type_name: {:?}.to_string(), text: text.to_string() }})",
                u.schema_name
            ));
        },
    );
}

fn emit_load_fn(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    let fname = fn_name(&ct.schema_name);
    let ty = &ct.rust_type;
    b.block(
        &format!(
            "fn {fname}(node: roxmltree::Node, arenas: &mut Arenas, cursors: &mut Cursors) -> LoadResult<{ty}> {{"
        ),
        "}",
        |b| {
            b.line(format!("let mut out = {ty}::default();"));

            let many_complex: Vec<&crate::annotate::AnnotatedElement> = ct
                .child_elements
                .iter()
                .filter(|c| c.many && matches!(c.type_ref, ElementTypeRef::Complex(_)))
                .collect();
            for child in &many_complex {
                if let ElementTypeRef::Complex(type_name) = &child.type_ref {
                    let field = structs::arena_field_name(type_name);
                    b.line(format!(
                        "let {}_start = cursors.{field};",
                        crate::mangle::checked(&child.name)
                    ));
                }
            }

            match ct.content_model {
                ContentModelKind::None => {}
                ContentModelKind::All | ContentModelKind::Dfa => {
                    emit_child_loop(b, ct);
                }
            }

            for child in &many_complex {
                if let ElementTypeRef::Complex(type_name) = &child.type_ref {
                    let field = structs::arena_field_name(type_name);
                    let name = crate::mangle::checked(&child.name);
                    b.line(format!("out.{name}_start = {name}_start;"));
                    b.line(format!("out.{name}_len = cursors.{field} - {name}_start;"));
                }
            }

            emit_attribute_loading(b, ct);

            if let Some(sref) = &ct.simple_content_type {
                let text = "node.text().unwrap_or(\"\").trim()";
                let expr = parse_simple_expr(sref, "value_text");
                b.line(format!("let value_text = {text};"));
                b.line(format!("out.value = {expr};"));
            }

            b.line("Ok(out)");
        },
    );
}

/// The single depth-first child loop shared by all three content-model
/// kinds: `all`/`dfa` matter only for the validate/count pass, which has
/// already rejected a document load would otherwise mis-structure, so
/// load always just dispatches every child it sees by tag name.
fn emit_child_loop(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    b.block("for child in node.children().filter(|n| n.is_element()) {", "}", |b| {
        b.block("match child.tag_name().name() {", "}", |b| {
            for child in &ct.child_elements {
                let name = crate::mangle::checked(&child.name);
                b.block(&format!("{:?} => {{", child.name), "}", |b| match &child.type_ref {
                    ElementTypeRef::Complex(type_name) => {
                        let field = structs::arena_field_name(type_name);
                        let child_fn = fn_name(type_name);
                        if child.many {
                            b.line(format!("let idx = cursors.{field} as usize;"));
                            b.line(format!("cursors.{field} += 1;"));
                            b.line(format!("let value = {child_fn}(child, arenas, cursors)?;"));
                            b.line(format!("arenas.{field}[idx] = value;"));
                        } else if child.optional {
                            b.line(format!(
                                "out.{name} = Some(Box::new({child_fn}(child, arenas, cursors)?));"
                            ));
                        } else {
                            b.line(format!("out.{name} = Box::new({child_fn}(child, arenas, cursors)?);"));
                        }
                    }
                    ElementTypeRef::Simple(sref) => {
                        let text = "child.text().unwrap_or(\"\").trim()";
                        let expr = parse_simple_expr(sref, "text");
                        if child.many {
                            b.line(format!("let text = {text};"));
                            b.line(format!("out.{name}.push({expr});"));
                        } else if child.optional {
                            b.line(format!("let text = {text};"));
                            b.line(format!("out.{name} = Some({expr});"));
                        } else {
                            b.line(format!("let text = {text};"));
                            b.line(format!("out.{name} = {expr};"));
                        }
                    }
                });
            }
            b.line("_ => {}");
        });
    });
}

/// Attribute loading: every known attribute is tried by name; unknown
/// attributes are an error only when the type declares none at all
/// (spec.md §4.H step 5) — otherwise they are silently ignored, since
/// the count pass never validates attribute completeness beyond
/// "required attributes are present", which load itself checks here.
fn emit_attribute_loading(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    if ct.attributes.is_empty() {
        b.block("if let Some(attr) = node.attributes().next() {", "}", |b| {
            b.line(format!(
                "return Err(LoadError::UnexpectedAttribute {{ element: {:?}.to_string(), attribute: attr.name().to_string() }});",
                ct.schema_name
            ));
        });
        return;
    }

    for attr in &ct.attributes {
        let name = crate::mangle::checked(&attr.name);
        b.line(format!("let mut {name}: Option<{}> = None;", attr.type_ref.rust_type()));
    }
    b.block("for attr in node.attributes() {", "}", |b| {
        b.block("match attr.name() {", "}", |b| {
            for attr in &ct.attributes {
                let name = crate::mangle::checked(&attr.name);
                let expr = parse_simple_expr(&attr.type_ref, "attr.value()");
                b.line(format!("{:?} => {{ {name} = Some({expr}); }}", attr.name));
            }
            b.line("_ => {}");
        });
    });
    for attr in &ct.attributes {
        let name = crate::mangle::checked(&attr.name);
        if attr.required {
            b.line(format!(
                "let {name} = {name}.ok_or_else(|| attr_error({:?}, {:?}))?;",
                ct.schema_name, attr.name
            ));
        } else if let Some(default) = &attr.default_value {
            let default_expr = parse_simple_expr(&attr.type_ref, "default_text");
            b.line(format!(
                "let {name} = match {name} {{ Some(v) => v, None => {{ let default_text = {default:?}; {default_expr} }} }};"
            ));
        }
        b.line(format!("out.{name} = {name};"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate;
    use crate::xsd::parse_xsd_str;

    fn registry_for(xsd: &str) -> Registry {
        let schema = parse_xsd_str(xsd).unwrap();
        annotate::annotate_schema(&schema).unwrap()
    }

    #[test]
    fn many_complex_child_reserves_a_contiguous_arena_slice() {
        let registry = registry_for(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="root" type="Root"/>
                <xs:complexType name="Root">
                    <xs:sequence>
                        <xs:element name="item" type="Item" maxOccurs="unbounded"/>
                    </xs:sequence>
                </xs:complexType>
                <xs:complexType name="Item">
                    <xs:attribute name="id" type="xs:int" use="required"/>
                </xs:complexType>
            </xs:schema>"#,
        );
        let mut b = CodeBuilder::new();
        emit_load_fn(&mut b, &registry.complex["Root"]);
        let out = b.finish();
        assert!(out.contains("let item_start = cursors.item_arena;"));
        assert!(out.contains("let idx = cursors.item_arena as usize;"));
        assert!(out.contains("arenas.item_arena[idx] = value;"));
        assert!(out.contains("out.item_len = cursors.item_arena - item_start;"));
    }

    #[test]
    fn required_attribute_errors_via_attr_error_when_absent() {
        let registry = registry_for(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="root" type="Root"/>
                <xs:complexType name="Root">
                    <xs:attribute name="id" type="xs:int" use="required"/>
                </xs:complexType>
            </xs:schema>"#,
        );
        let mut b = CodeBuilder::new();
        emit_load_fn(&mut b, &registry.complex["Root"]);
        let out = b.finish();
        assert!(out.contains("attr_error(\"Root\", \"id\")"));
    }

    #[test]
    fn empty_attribute_set_rejects_any_attribute() {
        let registry = registry_for(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="root" type="Root"/>
                <xs:complexType name="Root">
                    <xs:sequence>
                        <xs:element name="a" type="xs:int"/>
                    </xs:sequence>
                </xs:complexType>
            </xs:schema>"#,
        );
        let mut b = CodeBuilder::new();
        emit_load_fn(&mut b, &registry.complex["Root"]);
        let out = b.finish();
        assert!(out.contains("LoadError::UnexpectedAttribute"));
    }

    #[test]
    fn union_loader_tries_members_in_declaration_order() {
        let registry = registry_for(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="root" type="intOrYesno"/>
                <xs:simpleType name="yesno">
                    <xs:restriction base="xs:string">
                        <xs:enumeration value="yes"/>
                        <xs:enumeration value="no"/>
                    </xs:restriction>
                </xs:simpleType>
                <xs:simpleType name="intOrYesno">
                    <xs:union memberTypes="xs:int yesno"/>
                </xs:simpleType>
            </xs:schema>"#,
        );
        let mut b = CodeBuilder::new();
        emit_union_loader(&mut b, &registry.union_defs["intOrYesno"]);
        let out = b.finish();
        let i32_pos = out.find("text.parse::<i32>()").unwrap();
        let enum_pos = out.find("ENUM_TOKENS_YESNO").unwrap();
        assert!(i32_pos < enum_pos);
        assert!(out.contains("LoadError::UnionNoMatch"));
    }
}
