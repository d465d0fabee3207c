//! Lexer-table emitter (component F).
//!
//! `uxsdcxx.py` treats the perfect-hash trie lexer as an external
//! collaborator (`gen_prelude()` / `gen_lexer_body(alphabet)` — see
//! `tokens_from_enum`/`lexer_from_enum`/`tokens_from_complex_type`/
//! `lexer_from_complex_type` in `original_source/uxsdcxx.py`). The real
//! ecosystem answer to "perfect hash map from a fixed string set, known at
//! generation time" is the `phf` crate (SPEC_FULL.md OQ-2): this emitter's
//! job becomes emitting a `phf::phf_map!` literal per lookup table instead
//! of a bespoke trie, one for every enumeration's token set and one for
//! every complex type's child-tag/attribute-name alphabet.

use crate::annotate::{AnnotatedComplexType, AnnotatedEnum};
use crate::codegen::builder::CodeBuilder;
use crate::mangle;
use crate::registry::Registry;

/// Emits a `phf_map!` from enumerator text to enum variant for every
/// registered enum, plus one for every complex type's child-tag alphabet
/// (used by the DFA-driven load function to turn an element's local name
/// into a symbol id in one lookup).
pub fn emit_all(b: &mut CodeBuilder, registry: &Registry) {
    for name in &registry.enums {
        emit_enum_lookup(b, &registry.enum_defs[name]);
        b.blank();
    }
    for name in registry.ordered_complex_types() {
        let ct = &registry.complex[name];
        if !ct.child_elements.is_empty() {
            emit_child_tag_lookup(b, ct);
            b.blank();
        }
    }
}

pub(crate) fn phf_table_name(prefix: &str, type_name: &str) -> String {
    use heck::ToShoutySnakeCase;
    format!("{}_{}", prefix, type_name.to_shouty_snake_case())
}

fn emit_enum_lookup(b: &mut CodeBuilder, e: &AnnotatedEnum) {
    let table = phf_table_name("ENUM_TOKENS", &e.schema_name);
    b.line(format!(
        "static {table}: phf::Map<&'static str, {}> = phf::phf_map! {{",
        e.rust_type
    ));
    b.indent();
    for value in &e.values {
        let variant = mangle::enum_variant(value);
        b.line(format!("{:?} => {}::{variant},", value, e.rust_type));
    }
    b.dedent();
    b.line("};");
}

/// A DFA/`xs:all` content model dispatches on an element's local name; this
/// table maps that name to the symbol id the compiled automaton (or the
/// `xs:all` flat-member index) expects, exactly as
/// `tokens_from_complex_type`/`lexer_from_complex_type` do for the C
/// original's child-element switch.
fn emit_child_tag_lookup(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    let table = phf_table_name("CHILD_TOKENS", &ct.schema_name);
    b.line(format!("static {table}: phf::Map<&'static str, u32> = phf::phf_map! {{"));
    b.indent();
    for (i, child) in ct.child_elements.iter().enumerate() {
        b.line(format!("{:?} => {i}u32,", child.name));
    }
    b.dedent();
    b.line("};");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate;
    use crate::xsd::parse_xsd_str;

    #[test]
    fn enum_lookup_maps_every_literal_to_its_variant() {
        let schema = parse_xsd_str(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="root" type="color"/>
                <xs:simpleType name="color">
                    <xs:restriction base="xs:string">
                        <xs:enumeration value="red"/>
                        <xs:enumeration value="green"/>
                    </xs:restriction>
                </xs:simpleType>
            </xs:schema>"#,
        )
        .unwrap();
        let registry = annotate::annotate_schema(&schema).unwrap();
        let mut b = CodeBuilder::new();
        emit_enum_lookup(&mut b, &registry.enum_defs["color"]);
        let out = b.finish();
        assert!(out.contains("\"red\" => TColor::Red,"));
        assert!(out.contains("\"green\" => TColor::Green,"));
    }

    #[test]
    fn child_tag_lookup_assigns_stable_symbol_ids_by_position() {
        let schema = parse_xsd_str(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="root" type="Root"/>
                <xs:complexType name="Root">
                    <xs:choice maxOccurs="unbounded">
                        <xs:element name="a" type="xs:int"/>
                        <xs:element name="b" type="xs:int"/>
                    </xs:choice>
                </xs:complexType>
            </xs:schema>"#,
        )
        .unwrap();
        let registry = annotate::annotate_schema(&schema).unwrap();
        let mut b = CodeBuilder::new();
        emit_child_tag_lookup(&mut b, &registry.complex["Root"]);
        let out = b.finish();
        assert!(out.contains("\"a\" => 0u32,"));
        assert!(out.contains("\"b\" => 1u32,"));
    }
}
