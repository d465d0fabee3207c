//! Write emitter (component I).
//!
//! Grounded on `original_source/uxsdcxx.py`'s `write_fn_from_complex_type`
//! (spec.md §4.I), but rather than hand-building escaped XML text the
//! emitted code is built directly on `quick_xml::Writer` and its events
//! API, the same pattern `tusk-mei`'s own serializer uses
//! (`crates/formats/mei/src/serializer/mod.rs`): `BytesStart::push_attribute`
//! and `BytesText::new` already escape `&`/`<`/`"` for us, so the emitted
//! writer never hand-rolls escaping.

use crate::annotate::{AnnotatedComplexType, AnnotatedEnum, AnnotatedUnion, ElementTypeRef, SimpleTypeRef};
use crate::codegen::builder::CodeBuilder;
use crate::codegen::structs;
use crate::registry::Registry;

/// Drives emission: one `enum_text_<T>` per enum, one `union_text_<T>`
/// per union, then one `write_<T>` per complex type.
pub fn emit_all(b: &mut CodeBuilder, registry: &Registry) {
    for name in &registry.enums {
        emit_enum_text_fn(b, &registry.enum_defs[name]);
        b.blank();
    }
    for name in &registry.unions {
        emit_union_text_fn(b, &registry.union_defs[name]);
        b.blank();
    }
    for name in registry.ordered_complex_types() {
        emit_write_fn(b, &registry.complex[name]);
        b.blank();
    }
}

pub(crate) fn fn_name(schema_name: &str) -> String {
    use heck::ToSnakeCase;
    format!("write_{}", schema_name.to_snake_case())
}

fn enum_text_fn_name(schema_name: &str) -> String {
    use heck::ToSnakeCase;
    format!("enum_text_{}", schema_name.to_snake_case())
}

fn union_text_fn_name(schema_name: &str) -> String {
    use heck::ToSnakeCase;
    format!("union_text_{}", schema_name.to_snake_case())
}

/// `enum_text_<T>(v) -> &'static str`: the reverse of the enum's phf
/// lookup table, one match arm per enumerator.
fn emit_enum_text_fn(b: &mut CodeBuilder, e: &AnnotatedEnum) {
    b.block(
        &format!("fn {}(v: {}) -> &'static str {{", enum_text_fn_name(&e.schema_name), e.rust_type),
        "}",
        |b| {
            b.block("match v {", "}", |b| {
                for value in &e.values {
                    let variant = crate::mangle::enum_variant(value);
                    b.line(format!("{}::{variant} => {value:?},", e.rust_type));
                }
            });
        },
    );
}

/// `union_text_<T>(v: &T) -> String`: formats the member currently held,
/// by branching on the variant and recursing into the member's own
/// simple-value formatting.
fn emit_union_text_fn(b: &mut CodeBuilder, u: &AnnotatedUnion) {
    b.block(
        &format!("fn {}(v: &{}) -> String {{", union_text_fn_name(&u.schema_name), u.rust_type),
        "}",
        |b| {
            b.block("match v {", "}", |b| {
                for member in &u.members {
                    let variant = crate::mangle::union_variant(&member.rust_type());
                    let formatted = format_value_text(member, "x");
                    b.line(format!("{}::{variant}(x) => {formatted},", u.rust_type));
                }
            });
        },
    );
}

/// An expression producing an owned `String` for `value_ref` (always a
/// `&T` expression), dispatched by simple-type kind. Shared by attribute
/// writing, leaf-element writing, and union member writing.
fn format_value_text(sref: &SimpleTypeRef, value_ref: &str) -> String {
    match sref {
        SimpleTypeRef::Builtin(_) => format!("{value_ref}.to_string()"),
        SimpleTypeRef::Enum(name) => format!("{}(*{value_ref}).to_string()", enum_text_fn_name(name)),
        SimpleTypeRef::List => format!("{value_ref}.clone()"),
        SimpleTypeRef::Union(name) => format!("{}({value_ref})", union_text_fn_name(name)),
    }
}

fn loop_var(idx: usize) -> char {
    (b'i' + (idx % 16) as u8) as char
}

fn emit_write_fn(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    let fname = fn_name(&ct.schema_name);
    let ty = &ct.rust_type;
    let has_body = !ct.child_elements.is_empty() || ct.simple_content_type.is_some();
    b.block(
        &format!(
            "fn {fname}(value: &{ty}, arenas: &Arenas, w: &mut quick_xml::Writer<impl std::io::Write>) -> quick_xml::Result<()> {{"
        ),
        "}",
        |b| {
            b.line(format!("let mut start = BytesStart::new({:?});", ct.schema_name));
            emit_attribute_writes(b, ct);

            if has_body {
                b.line("w.write_event(Event::Start(start))?;");
                emit_children_write(b, ct);
                if let Some(sref) = &ct.simple_content_type {
                    let text_expr = format_value_text(sref, "&value.value");
                    b.line(format!("let text = {text_expr};"));
                    b.line("w.write_event(Event::Text(BytesText::new(&text)))?;");
                }
                b.line(format!("w.write_event(Event::End(BytesEnd::new({:?})))?;", ct.schema_name));
            } else {
                b.line("w.write_event(Event::Empty(start))?;");
            }

            b.line("Ok(())");
        },
    );
}

fn emit_attribute_writes(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    for (i, attr) in ct.attributes.iter().enumerate() {
        let name = crate::mangle::checked(&attr.name);
        let var = format!("attr_{i}");
        if attr.required || attr.default_value.is_some() {
            let expr = format_value_text(&attr.type_ref, &format!("&value.{name}"));
            b.line(format!("let {var} = {expr};"));
            b.line(format!("start.push_attribute(({:?}, {var}.as_str()));", attr.name));
        } else {
            b.block(&format!("if let Some(v) = &value.{name} {{"), "}", |b| {
                let expr = format_value_text(&attr.type_ref, "v");
                b.line(format!("let {var} = {expr};"));
                b.line(format!("start.push_attribute(({:?}, {var}.as_str()));", attr.name));
            });
        }
    }
}

fn emit_children_write(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    let mut many_count = 0usize;
    for child in &ct.child_elements {
        let name = crate::mangle::checked(&child.name);
        match &child.type_ref {
            ElementTypeRef::Complex(type_name) => {
                let arena_field = structs::arena_field_name(type_name);
                let child_fn = fn_name(type_name);
                if child.many {
                    let var = loop_var(many_count);
                    many_count += 1;
                    b.block(
                        &format!(
                            "for {var} in value.{name}_start..value.{name}_start + value.{name}_len {{"
                        ),
                        "}",
                        |b| {
                            b.line(format!(
                                "{child_fn}(&arenas.{arena_field}[{var} as usize], arenas, w)?;"
                            ));
                        },
                    );
                } else if child.optional {
                    b.block(&format!("if let Some(child) = &value.{name} {{"), "}", |b| {
                        b.line(format!("{child_fn}(child, arenas, w)?;"));
                    });
                } else {
                    b.line(format!("{child_fn}(&value.{name}, arenas, w)?;"));
                }
            }
            ElementTypeRef::Simple(sref) => {
                if child.many {
                    let var = loop_var(many_count);
                    many_count += 1;
                    b.block(&format!("for {var} in &value.{name} {{"), "}", |b| {
                        emit_leaf_write(b, &child.name, sref, var.to_string().as_str());
                    });
                } else if child.optional {
                    b.block(&format!("if let Some(v) = &value.{name} {{"), "}", |b| {
                        emit_leaf_write(b, &child.name, sref, "v");
                    });
                } else {
                    b.block("{", "}", |b| {
                        b.line(format!("let v = &value.{name};"));
                        emit_leaf_write(b, &child.name, sref, "v");
                    });
                }
            }
        }
    }
}

/// `<tag>text</tag>` for a leaf simple-value child, `value_ref` always a
/// `&T` expression bound in the caller's scope.
fn emit_leaf_write(b: &mut CodeBuilder, tag: &str, sref: &SimpleTypeRef, value_ref: &str) {
    let expr = format_value_text(sref, value_ref);
    b.line(format!("let text = {expr};"));
    b.line(format!("w.write_event(Event::Start(BytesStart::new({tag:?})))?;"));
    b.line("w.write_event(Event::Text(BytesText::new(&text)))?;");
    b.line(format!("w.write_event(Event::End(BytesEnd::new({tag:?})))?;"));
}
