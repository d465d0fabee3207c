//! Struct/enum emitter (component E).
//!
//! Grounded on `uxsdcxx.py`'s `typedefn_from_union`/
//! `typedefn_from_complex_type` (see `original_source/uxsdcxx.py` lines
//! ~315-341), translated to idiomatic Rust sum/product types rather than
//! the C original's tag+union and pointer-into-arena pattern:
//!
//! - A named enumeration -> a C-like Rust `enum` (spec.md §4.E "reserved
//!   enum `types`" becomes unnecessary here: Rust enum variants already
//!   carry their own discriminant, so unlike the C original there is no
//!   separate external type-tag enum to synthesize — see DESIGN.md).
//! - A union simple type -> a Rust enum with one data-carrying variant per
//!   member, which is the direct idiomatic replacement for "tag field +
//!   C union of member values".
//! - A complex type -> a Rust struct. A required/optional *simple* child
//!   is stored inline (`T` / `Option<T>`); a required/optional *complex*
//!   child is boxed (`Box<T>` / `Option<Box<T>>`) so mutually recursive
//!   schemas (`note` containing `note*`) always have a finite struct size
//!   regardless of occurs bounds, rather than relying on "many" being the
//!   only thing that breaks recursion as the C original does. A "many"
//!   *complex* child is stored as a `(start, len)` index pair into the
//!   arena `Vec<T>` the `Document` owns (spec.md §5 arena set); a "many"
//!   *simple* child is stored as an owned `Vec<T>` directly, since simple
//!   values have no further nested elements to share a backing store
//!   with.

use crate::annotate::{AnnotatedComplexType, AnnotatedEnum, AnnotatedUnion, ElementTypeRef};
use crate::codegen::builder::CodeBuilder;
use crate::mangle;
use crate::registry::Registry;

/// Emits every enum, union, and complex-type struct in the registry, in
/// deterministic order: enums, then unions, then complex types in height
/// order (leaves first — spec.md invariant 1).
pub fn emit_all(b: &mut CodeBuilder, registry: &Registry) {
    for name in &registry.enums {
        emit_enum(b, &registry.enum_defs[name]);
        b.blank();
    }
    for name in &registry.unions {
        emit_union(b, &registry.union_defs[name]);
        b.blank();
    }
    for name in registry.ordered_complex_types() {
        emit_complex_type(b, &registry.complex[name]);
        b.blank();
    }
}

fn emit_enum(b: &mut CodeBuilder, e: &AnnotatedEnum) {
    b.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]");
    b.block(&format!("pub enum {} {{", e.rust_type), "}", |b| {
        for (i, value) in e.values.iter().enumerate() {
            let variant = mangle::enum_variant(value);
            if i == 0 {
                b.line("#[default]");
            }
            b.line(format!("{variant},"));
        }
    });
}

fn emit_union(b: &mut CodeBuilder, u: &AnnotatedUnion) {
    b.line("#[derive(Debug, Clone)]");
    b.block(&format!("pub enum {} {{", u.rust_type), "}", |b| {
        for member in &u.members {
            let rust_type = member.rust_type();
            let variant = mangle::union_variant(&rust_type);
            b.line(format!("{variant}({rust_type}),"));
        }
    });
}

fn emit_complex_type(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    b.line("#[derive(Debug, Clone, Default)]");
    b.block(&format!("pub struct {} {{", ct.rust_type), "}", |b| {
        for attr in &ct.attributes {
            let name = mangle::checked(&attr.name);
            let ty = attr.type_ref.rust_type();
            // A defaulted attribute is never truly absent once loaded (a
            // missing one is filled from `default_value`), so it gets the
            // same unwrapped field type as a required attribute.
            if attr.required || attr.default_value.is_some() {
                b.line(format!("pub {name}: {ty},"));
            } else {
                b.line(format!("pub {name}: Option<{ty}>,"));
            }
        }
        for child in &ct.child_elements {
            let name = mangle::checked(&child.name);
            match &child.type_ref {
                ElementTypeRef::Complex(type_name) => {
                    let ty = mangle::type_name(type_name);
                    if child.many {
                        b.line(format!("pub {name}_start: u32,"));
                        b.line(format!("pub {name}_len: u32,"));
                    } else if child.optional {
                        b.line(format!("pub {name}: Option<Box<{ty}>>,"));
                    } else {
                        b.line(format!("pub {name}: Box<{ty}>,"));
                    }
                }
                ElementTypeRef::Simple(sref) => {
                    let ty = sref.rust_type();
                    if child.many {
                        b.line(format!("pub {name}: Vec<{ty}>,"));
                    } else if child.optional {
                        b.line(format!("pub {name}: Option<{ty}>,"));
                    } else {
                        b.line(format!("pub {name}: {ty},"));
                    }
                }
            }
        }
        if let Some(sref) = &ct.simple_content_type {
            b.line(format!("pub value: {},", sref.rust_type()));
        }
    });
}

/// Name of the arena field a `Document` holds for an arena-eligible
/// complex type, e.g. `Note` -> `note_arena`.
pub fn arena_field_name(complex_type_name: &str) -> String {
    use heck::ToSnakeCase;
    format!("{}_arena", complex_type_name.to_snake_case())
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
    fn enum_emits_variants_with_default_on_first() {
        let registry = registry_for(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="root" type="color"/>
                <xs:simpleType name="color">
                    <xs:restriction base="xs:string">
                        <xs:enumeration value="red"/>
                        <xs:enumeration value="green"/>
                    </xs:restriction>
                </xs:simpleType>
            </xs:schema>"#,
        );
        let mut b = CodeBuilder::new();
        emit_enum(&mut b, &registry.enum_defs["color"]);
        let out = b.finish();
        assert!(out.contains("pub enum TColor {"));
        assert!(out.contains("#[default]\n    Red,"));
        assert!(out.contains("Green,"));
    }

    #[test]
    fn many_complex_child_becomes_an_arena_index_pair() {
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
        emit_complex_type(&mut b, &registry.complex["Root"]);
        let out = b.finish();
        assert!(out.contains("pub item_start: u32,"));
        assert!(out.contains("pub item_len: u32,"));
    }

    #[test]
    fn required_singular_complex_child_is_boxed() {
        let registry = registry_for(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="root" type="Root"/>
                <xs:complexType name="Root">
                    <xs:sequence>
                        <xs:element name="item" type="Item"/>
                    </xs:sequence>
                </xs:complexType>
                <xs:complexType name="Item">
                    <xs:attribute name="id" type="xs:int" use="required"/>
                </xs:complexType>
            </xs:schema>"#,
        );
        let mut b = CodeBuilder::new();
        emit_complex_type(&mut b, &registry.complex["Root"]);
        let out = b.finish();
        assert!(out.contains("pub item: Box<TItem>,"));
    }

    #[test]
    fn defaulted_attribute_is_not_wrapped_in_option() {
        let registry = registry_for(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="root" type="Root"/>
                <xs:complexType name="Root">
                    <xs:attribute name="color" type="xs:string" default="red"/>
                    <xs:attribute name="note" type="xs:string"/>
                </xs:complexType>
            </xs:schema>"#,
        );
        let mut b = CodeBuilder::new();
        emit_complex_type(&mut b, &registry.complex["Root"]);
        let out = b.finish();
        assert!(out.contains("pub color: String,"));
        assert!(out.contains("pub note: Option<String>,"));
    }

    #[test]
    fn union_emits_one_variant_per_member_type() {
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
        emit_union(&mut b, &registry.union_defs["intOrYesno"]);
        let out = b.finish();
        assert!(out.contains("pub enum TIntOrYesno {"));
        assert!(out.contains("AsI32(i32),"));
        assert!(out.contains("AsTYesno(TYesno),"));
    }
}
