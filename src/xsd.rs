//! Schema oracle: a read-only parse of an XSD 1.0 document into a
//! navigable AST.
//!
//! Grounded on `tusk-musicxml-codegen`'s `xsd.rs` (same quick-xml
//! event-loop architecture), extended to resolve `attributeGroup` refs,
//! `simpleContent`/`complexContent` extension and restriction, nested
//! `group ref=`, and occurs bounds as a first-class `Occurs` struct rather
//! than loose `u32`s. The schema graph is immutable once built — the
//! [`crate::annotate`] module builds a separate annotated graph instead of
//! mutating this one (spec.md Design Notes §9).

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{XsdParseError, XsdParseResult};

/// Occurrence bounds. `max == None` means `maxOccurs="unbounded"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: u32,
    pub max: Option<u32>,
}

impl Occurs {
    pub const ONE: Occurs = Occurs { min: 1, max: Some(1) };

    fn from_attrs(e: &BytesStart) -> Occurs {
        let min = get_attr(e, "minOccurs").map(|s| s.parse().unwrap_or(1)).unwrap_or(1);
        let max = get_attr(e, "maxOccurs").and_then(|s| {
            if s == "unbounded" { None } else { Some(s.parse().unwrap_or(1)) }
        }).or(Some(1));
        Occurs { min, max }
    }

    /// Widens `self` by an enclosing occurrence, per spec.md §4.C: `many`
    /// and `optional` grow monotonically as enclosing groups impose them.
    pub fn many(&self) -> bool {
        matches!(self.max, None) || self.max.is_some_and(|m| m > 1)
    }

    pub fn optional(&self) -> bool {
        self.min == 0
    }
}

/// A schema-wide namespace alphabet isn't resolved (see SPEC_FULL OQ-1):
/// any QName whose prefix isn't empty is compared against this fixed set
/// of conventional XML-Schema-namespace prefixes.
fn is_xsd_prefix(prefix: &str) -> bool {
    matches!(prefix, "xs" | "xsd")
}

/// Splits `prefix:local` into `(prefix, local)`; local-only names get an
/// empty prefix.
pub fn split_qname(s: &str) -> (&str, &str) {
    match s.split_once(':') {
        Some((p, l)) => (p, l),
        None => ("", s),
    }
}

/// `true` if `type_name` names one of the fixed XSD atomic built-ins this
/// generator recognizes (spec.md §3 `BuiltinSimpleType`).
pub fn is_builtin(type_name: &str) -> bool {
    let (prefix, local) = split_qname(type_name);
    is_xsd_prefix(prefix) && builtin_rust_type(local).is_some()
}

/// Maps an XSD atomic built-in's local name to its Rust leaf type and a
/// flag for whether parsing it can fail.
pub fn builtin_rust_type(local: &str) -> Option<&'static str> {
    Some(match local {
        "string" | "token" | "normalizedString" | "anyURI" | "NMTOKEN" | "ID" | "IDREF" | "language" => "String",
        "boolean" => "bool",
        "float" => "f32",
        "double" | "decimal" => "f64",
        "integer" => "i64",
        "nonPositiveInteger" | "negativeInteger" => "i64",
        "long" => "i64",
        "int" => "i32",
        "short" => "i16",
        "byte" => "i8",
        "nonNegativeInteger" | "positiveInteger" => "u64",
        "unsignedLong" => "u64",
        "unsignedInt" => "u32",
        "unsignedShort" => "u16",
        "unsignedByte" => "u8",
        _ => return None,
    })
}

/// Schema AST built from the XSD file (the oracle, §6 "Consumed schema
/// oracle"). Never mutated after [`parse_xsd`]/[`parse_xsd_str`] return.
#[derive(Debug, Default)]
pub struct Schema {
    pub simple_types: BTreeMap<String, SimpleType>,
    pub complex_types: BTreeMap<String, ComplexType>,
    pub groups: BTreeMap<String, Group>,
    pub attribute_groups: BTreeMap<String, AttributeGroup>,
    /// Top-level `<xs:element>`s, in document order.
    pub elements: Vec<(String, ElementDecl)>,
}

/// `xs:simpleType` variants this generator discriminates (spec.md §3).
#[derive(Debug, Clone)]
pub enum SimpleType {
    /// `<xs:restriction base="...">` with one or more facets.
    AtomicRestriction { base: String, facets: RestrictionFacets },
    /// `<xs:list itemType="...">`.
    List { item_type: String },
    /// `<xs:union memberTypes="...">` (member simple types, inline or ref).
    Union { member_types: Vec<String> },
}

/// Facets collected from an `<xs:restriction>` body. Only `enumeration`
/// is supported downstream; anything else in `other_facet` causes the
/// annotator to refuse the schema (spec.md Non-goals).
#[derive(Debug, Clone, Default)]
pub struct RestrictionFacets {
    pub enumeration: Vec<String>,
    pub other_facet: Option<String>,
}

/// `xs:complexType`.
#[derive(Debug, Clone, Default)]
pub struct ComplexType {
    pub content: ContentModel,
    pub attributes: Vec<AttributeDecl>,
    pub attribute_group_refs: Vec<String>,
    /// `simpleContent`/`complexContent` `extension`/`restriction` base,
    /// when present. Local attributes/content from the `extension` body
    /// are already merged into `attributes`/`content` above, matching
    /// `tusk-musicxml-codegen`'s flattening approach rather than modeling
    /// a separate inheritance chain.
    pub extension_base: Option<String>,
    /// `true` for `simpleContent` (the type has a scalar `value` in
    /// addition to attributes); `false` for element content / empty.
    pub is_simple_content: bool,
}

#[derive(Debug, Clone, Default)]
pub enum ContentModel {
    #[default]
    Empty,
    Group(Particle),
}

/// Content model particle tree: sequence/choice/all of elements, nested
/// groups, or group references (spec.md §3/§4.D).
#[derive(Debug, Clone)]
pub enum Particle {
    Element(ElementParticle),
    GroupRef { name: String, occurs: Occurs },
    Sequence { occurs: Occurs, members: Vec<Particle> },
    Choice { occurs: Occurs, members: Vec<Particle> },
    All { occurs: Occurs, members: Vec<Particle> },
}

impl Particle {
    pub fn occurs(&self) -> Occurs {
        match self {
            Particle::Element(e) => e.occurs,
            Particle::GroupRef { occurs, .. }
            | Particle::Sequence { occurs, .. }
            | Particle::Choice { occurs, .. }
            | Particle::All { occurs, .. } => *occurs,
        }
    }
}

/// An `<xs:element>` appearing inside a content model.
#[derive(Debug, Clone)]
pub struct ElementParticle {
    pub name: String,
    pub type_name: Option<String>,
    pub inline_complex_type: Option<Box<ComplexType>>,
    pub occurs: Occurs,
}

/// `xs:attribute`.
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    pub name: String,
    pub type_name: String,
    pub required: bool,
    /// `use="prohibited"` — refused by the annotator (spec.md §4.C).
    pub prohibited: bool,
    pub default_value: Option<String>,
}

/// Named `xs:group`.
#[derive(Debug, Clone)]
pub struct Group {
    pub content: Particle,
}

/// Named `xs:attributeGroup`.
#[derive(Debug, Clone, Default)]
pub struct AttributeGroup {
    pub attributes: Vec<AttributeDecl>,
    pub attribute_group_refs: Vec<String>,
}

/// Top-level `xs:element` (candidate document root).
#[derive(Debug, Clone, Default)]
pub struct ElementDecl {
    pub type_name: Option<String>,
    pub inline_complex_type: Option<ComplexType>,
}

fn local_name(name: &[u8]) -> Vec<u8> {
    match name.iter().position(|&b| b == b':') {
        Some(i) => name[i + 1..].to_vec(),
        None => name.to_vec(),
    }
}

fn get_attr(e: &BytesStart, key: &str) -> Option<String> {
    let key = key.as_bytes();
    e.attributes().filter_map(|a| a.ok()).find(|a| a.key.as_ref() == key).map(|a| {
        String::from_utf8_lossy(a.value.as_ref()).into_owned()
    })
}

/// Parses the XSD file at `path` into a [`Schema`].
pub fn parse_xsd(path: &Path) -> XsdParseResult<Schema> {
    let content = std::fs::read_to_string(path)?;
    parse_xsd_str(&content)
}

/// Parses XSD source text into a [`Schema`] (used directly by tests and
/// any in-memory caller).
pub fn parse_xsd_str(content: &str) -> XsdParseResult<Schema> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut schema = Schema::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let local = local_name(e.name().as_ref());
                match local.as_slice() {
                    b"simpleType" => {
                        if let Some(n) = get_attr(&e, "name") {
                            let st = read_simple_type(&mut reader, &mut Vec::new())?;
                            schema.simple_types.insert(n, st);
                        }
                    }
                    b"complexType" => {
                        if let Some(n) = get_attr(&e, "name") {
                            let ct = read_complex_type(&mut reader, &mut Vec::new())?;
                            schema.complex_types.insert(n, ct);
                        }
                    }
                    b"group" => {
                        if let Some(n) = get_attr(&e, "name") {
                            let g = read_named_group(&mut reader, &mut Vec::new())?;
                            schema.groups.insert(n, g);
                        }
                    }
                    b"attributeGroup" => {
                        if let Some(n) = get_attr(&e, "name") {
                            let ag = read_attribute_group(&mut reader, &mut Vec::new())?;
                            schema.attribute_groups.insert(n, ag);
                        }
                    }
                    b"element" => {
                        if let Some(n) = get_attr(&e, "name") {
                            let type_name = get_attr(&e, "type");
                            let ed = read_element_decl(&mut reader, &mut Vec::new(), type_name)?;
                            schema.elements.push((n, ed));
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(schema)
}

fn read_simple_type<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>) -> XsdParseResult<SimpleType> {
    let mut depth = 1u32;
    let mut restriction_base: Option<String> = None;
    let mut facets = RestrictionFacets::default();
    let mut list_item_type: Option<String> = None;
    let mut union_members: Vec<String> = Vec::new();
    let mut kind_is_list = false;
    let mut kind_is_union = false;

    const KNOWN_FACETS: &[&[u8]] = &[
        b"pattern", b"minInclusive", b"maxInclusive", b"minExclusive", b"maxExclusive",
        b"totalDigits", b"fractionDigits", b"length", b"minLength", b"maxLength", b"whiteSpace",
    ];

    while depth > 0 {
        match reader.read_event_into(buf)? {
            Event::Start(e) | Event::Empty(e) => {
                let local = local_name(e.name().as_ref());
                match local.as_slice() {
                    b"restriction" => restriction_base = get_attr(&e, "base").or(restriction_base),
                    b"enumeration" => {
                        if let Some(v) = get_attr(&e, "value") {
                            facets.enumeration.push(v);
                        }
                    }
                    b"list" => {
                        kind_is_list = true;
                        list_item_type = get_attr(&e, "itemType");
                    }
                    b"union" => {
                        kind_is_union = true;
                        if let Some(members) = get_attr(&e, "memberTypes") {
                            union_members.extend(members.split_whitespace().map(str::to_string));
                        }
                    }
                    other if KNOWN_FACETS.contains(&other) => {
                        if facets.other_facet.is_none() {
                            facets.other_facet = Some(String::from_utf8_lossy(other).into_owned());
                        }
                    }
                    b"simpleType" => depth += 1,
                    _ => {}
                }
            }
            Event::End(e) => {
                if local_name(e.name().as_ref()).as_slice() == b"simpleType" {
                    depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if kind_is_union {
        return Ok(SimpleType::Union { member_types: union_members });
    }
    if kind_is_list {
        return Ok(SimpleType::List { item_type: list_item_type.unwrap_or_else(|| "xs:string".into()) });
    }
    Ok(SimpleType::AtomicRestriction {
        base: restriction_base.unwrap_or_else(|| "xs:string".to_string()),
        facets,
    })
}

fn read_complex_type<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>) -> XsdParseResult<ComplexType> {
    let mut depth = 1u32;
    let mut ct = ComplexType::default();

    while depth > 0 {
        match reader.read_event_into(buf)? {
            Event::Start(e) => {
                let local = local_name(e.name().as_ref());
                match local.as_slice() {
                    b"simpleContent" => {
                        depth += 1;
                        let (base, ags, attrs) = read_content_extension(reader, &mut Vec::new())?;
                        ct.extension_base = Some(base);
                        ct.is_simple_content = true;
                        ct.attribute_group_refs.extend(ags);
                        ct.attributes.extend(attrs);
                    }
                    b"complexContent" => {
                        depth += 1;
                        let (base, ags, attrs) = read_content_extension(reader, &mut Vec::new())?;
                        ct.extension_base = Some(base);
                        ct.attribute_group_refs.extend(ags);
                        ct.attributes.extend(attrs);
                    }
                    b"sequence" => {
                        depth += 1;
                        let occurs = Occurs::from_attrs(&e);
                        let members = read_particle_members(reader, &mut Vec::new(), b"sequence")?;
                        ct.content = ContentModel::Group(Particle::Sequence { occurs, members });
                    }
                    b"choice" => {
                        depth += 1;
                        let occurs = Occurs::from_attrs(&e);
                        let members = read_particle_members(reader, &mut Vec::new(), b"choice")?;
                        ct.content = ContentModel::Group(Particle::Choice { occurs, members });
                    }
                    b"all" => {
                        depth += 1;
                        let occurs = Occurs::from_attrs(&e);
                        let members = read_particle_members(reader, &mut Vec::new(), b"all")?;
                        ct.content = ContentModel::Group(Particle::All { occurs, members });
                    }
                    b"attributeGroup" => {
                        if let Some(r) = get_attr(&e, "ref") {
                            ct.attribute_group_refs.push(r);
                        }
                    }
                    b"attribute" => {
                        if let Some(a) = read_attribute(&e) {
                            ct.attributes.push(a);
                        }
                    }
                    b"complexType" => depth += 1,
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let local = local_name(e.name().as_ref());
                match local.as_slice() {
                    b"attributeGroup" => {
                        if let Some(r) = get_attr(&e, "ref") {
                            ct.attribute_group_refs.push(r);
                        }
                    }
                    b"attribute" => {
                        if let Some(a) = read_attribute(&e) {
                            ct.attributes.push(a);
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                if local_name(e.name().as_ref()).as_slice() == b"complexType" {
                    depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ct)
}

fn read_attribute(e: &BytesStart) -> Option<AttributeDecl> {
    let name = get_attr(e, "name")?;
    let type_name = get_attr(e, "type").unwrap_or_else(|| "xs:string".to_string());
    let use_val = get_attr(e, "use");
    let required = use_val.as_deref() == Some("required");
    let prohibited = use_val.as_deref() == Some("prohibited");
    let default_value = get_attr(e, "default");
    Some(AttributeDecl { name, type_name, required, prohibited, default_value })
}

/// Reads the body of `simpleContent`/`complexContent`, down through
/// `extension`/`restriction`, collecting the base type, referenced
/// attribute groups, and local attributes. Returns once the outer
/// `simpleContent`/`complexContent` element closes.
fn read_content_extension<R: BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
) -> XsdParseResult<(String, Vec<String>, Vec<AttributeDecl>)> {
    let mut base = String::new();
    let mut ags = Vec::new();
    let mut attrs = Vec::new();
    let mut depth = 1u32; // inside simpleContent/complexContent

    while depth > 0 {
        match reader.read_event_into(buf)? {
            Event::Start(e) => {
                let local = local_name(e.name().as_ref());
                if local.as_slice() == b"extension" || local.as_slice() == b"restriction" {
                    base = get_attr(&e, "base").unwrap_or_default();
                    depth += 1;
                } else if local.as_slice() == b"attributeGroup" {
                    if let Some(r) = get_attr(&e, "ref") {
                        ags.push(r);
                    }
                } else if local.as_slice() == b"attribute" {
                    if let Some(a) = read_attribute(&e) {
                        attrs.push(a);
                    }
                }
            }
            Event::Empty(e) => {
                let local = local_name(e.name().as_ref());
                if local.as_slice() == b"extension" || local.as_slice() == b"restriction" {
                    base = get_attr(&e, "base").unwrap_or_default();
                } else if local.as_slice() == b"attributeGroup" {
                    if let Some(r) = get_attr(&e, "ref") {
                        ags.push(r);
                    }
                } else if local.as_slice() == b"attribute" {
                    if let Some(a) = read_attribute(&e) {
                        attrs.push(a);
                    }
                }
            }
            Event::End(e) => {
                let local = local_name(e.name().as_ref());
                if local.as_slice() == b"extension" || local.as_slice() == b"restriction" {
                    depth -= 1;
                } else if local.as_slice() == b"simpleContent" || local.as_slice() == b"complexContent" {
                    depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    if base.is_empty() {
        base = "xs:string".to_string();
    }
    Ok((base, ags, attrs))
}

/// Reads the members of a `sequence`/`choice`/`all`, flattening nested
/// `sequence`/`choice` (and inline anonymous element types) into
/// [`Particle`]s. Stops once the opening compositor with tag `kind`
/// closes.
fn read_particle_members<R: BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
    kind: &[u8],
) -> XsdParseResult<Vec<Particle>> {
    let mut members = Vec::new();
    let mut depth = 1u32;

    while depth > 0 {
        match reader.read_event_into(buf)? {
            Event::Start(e) => {
                let local = local_name(e.name().as_ref());
                match local.as_slice() {
                    b"element" => {
                        depth += 1;
                        let name = get_attr(&e, "name").unwrap_or_default();
                        let type_name = get_attr(&e, "type");
                        let occurs = Occurs::from_attrs(&e);
                        let inline = read_inline_element_body(reader, &mut Vec::new())?;
                        if !name.is_empty() {
                            members.push(Particle::Element(ElementParticle {
                                name,
                                type_name,
                                inline_complex_type: inline.map(Box::new),
                                occurs,
                            }));
                        }
                    }
                    b"group" => {
                        depth += 1;
                        if let Some(r) = get_attr(&e, "ref") {
                            let occurs = Occurs::from_attrs(&e);
                            members.push(Particle::GroupRef { name: r, occurs });
                        }
                        skip_to_end(reader, &mut Vec::new(), b"group")?;
                    }
                    b"sequence" => {
                        depth += 1;
                        let occurs = Occurs::from_attrs(&e);
                        let inner = read_particle_members(reader, &mut Vec::new(), b"sequence")?;
                        members.push(Particle::Sequence { occurs, members: inner });
                    }
                    b"choice" => {
                        depth += 1;
                        let occurs = Occurs::from_attrs(&e);
                        let inner = read_particle_members(reader, &mut Vec::new(), b"choice")?;
                        members.push(Particle::Choice { occurs, members: inner });
                    }
                    b"all" => {
                        depth += 1;
                        let occurs = Occurs::from_attrs(&e);
                        let inner = read_particle_members(reader, &mut Vec::new(), b"all")?;
                        members.push(Particle::All { occurs, members: inner });
                    }
                    b"any" => depth += 1,
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let local = local_name(e.name().as_ref());
                match local.as_slice() {
                    b"element" => {
                        let name = get_attr(&e, "name").unwrap_or_default();
                        let type_name = get_attr(&e, "type");
                        let occurs = Occurs::from_attrs(&e);
                        if !name.is_empty() {
                            members.push(Particle::Element(ElementParticle {
                                name,
                                type_name,
                                inline_complex_type: None,
                                occurs,
                            }));
                        }
                    }
                    b"group" => {
                        if let Some(r) = get_attr(&e, "ref") {
                            let occurs = Occurs::from_attrs(&e);
                            members.push(Particle::GroupRef { name: r, occurs });
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                let local = local_name(e.name().as_ref());
                if local.as_slice() == kind
                    || local.as_slice() == b"sequence"
                    || local.as_slice() == b"choice"
                    || local.as_slice() == b"all"
                    || local.as_slice() == b"group"
                {
                    depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(members)
}

/// Consumes events until the matching end tag for `kind`, used after a
/// `<xs:group ref="..."/>` start tag that (unusually) isn't self-closing.
fn skip_to_end<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>, kind: &[u8]) -> XsdParseResult<()> {
    let mut depth = 1u32;
    while depth > 0 {
        match reader.read_event_into(buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == kind => depth += 1,
            Event::End(e) if local_name(e.name().as_ref()) == kind => depth -= 1,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

/// Reads an `<xs:element>`'s body looking only for an inline anonymous
/// `<xs:complexType>` (no `name=`); returns once `</xs:element>` closes.
fn read_inline_element_body<R: BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
) -> XsdParseResult<Option<ComplexType>> {
    let mut depth = 1u32;
    let mut inline = None;
    while depth > 0 {
        match reader.read_event_into(buf)? {
            Event::Start(e) => {
                let local = local_name(e.name().as_ref());
                if local.as_slice() == b"complexType" && get_attr(&e, "name").is_none() {
                    inline = Some(read_complex_type(reader, &mut Vec::new())?);
                } else if local.as_slice() == b"element" {
                    depth += 1;
                }
            }
            Event::End(e) => {
                if local_name(e.name().as_ref()).as_slice() == b"element" {
                    depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(inline)
}

fn read_named_group<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>) -> XsdParseResult<Group> {
    let mut depth = 1u32;
    let mut content = None;
    while depth > 0 {
        match reader.read_event_into(buf)? {
            Event::Start(e) => {
                let local = local_name(e.name().as_ref());
                match local.as_slice() {
                    b"sequence" => {
                        depth += 1;
                        let occurs = Occurs::from_attrs(&e);
                        let members = read_particle_members(reader, &mut Vec::new(), b"sequence")?;
                        content = Some(Particle::Sequence { occurs, members });
                    }
                    b"choice" => {
                        depth += 1;
                        let occurs = Occurs::from_attrs(&e);
                        let members = read_particle_members(reader, &mut Vec::new(), b"choice")?;
                        content = Some(Particle::Choice { occurs, members });
                    }
                    b"all" => {
                        depth += 1;
                        let occurs = Occurs::from_attrs(&e);
                        let members = read_particle_members(reader, &mut Vec::new(), b"all")?;
                        content = Some(Particle::All { occurs, members });
                    }
                    b"group" => depth += 1,
                    _ => {}
                }
            }
            Event::End(e) => {
                if local_name(e.name().as_ref()).as_slice() == b"group" {
                    depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(Group { content: content.unwrap_or(Particle::Sequence { occurs: Occurs::ONE, members: vec![] }) })
}

fn read_attribute_group<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>) -> XsdParseResult<AttributeGroup> {
    let mut ag = AttributeGroup::default();
    let mut depth = 1u32;
    while depth > 0 {
        match reader.read_event_into(buf)? {
            Event::Start(e) => {
                let local = local_name(e.name().as_ref());
                if local.as_slice() == b"attribute" {
                    if let Some(a) = read_attribute(&e) {
                        ag.attributes.push(a);
                    }
                } else if local.as_slice() == b"attributeGroup" {
                    if let Some(r) = get_attr(&e, "ref") {
                        ag.attribute_group_refs.push(r);
                    }
                    depth += 1;
                }
            }
            Event::Empty(e) => {
                let local = local_name(e.name().as_ref());
                if local.as_slice() == b"attribute" {
                    if let Some(a) = read_attribute(&e) {
                        ag.attributes.push(a);
                    }
                } else if local.as_slice() == b"attributeGroup" {
                    if let Some(r) = get_attr(&e, "ref") {
                        ag.attribute_group_refs.push(r);
                    }
                }
            }
            Event::End(e) => {
                if local_name(e.name().as_ref()).as_slice() == b"attributeGroup" {
                    depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(ag)
}

fn read_element_decl<R: BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
    type_name: Option<String>,
) -> XsdParseResult<ElementDecl> {
    let inline_complex_type = read_inline_element_body(reader, buf)?;
    Ok(ElementDecl { type_name, inline_complex_type })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_complex_type() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="foo" type="Foo"/>
            <xs:complexType name="Foo"/>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        assert_eq!(schema.elements.len(), 1);
        let foo = schema.complex_types.get("Foo").unwrap();
        assert!(matches!(foo.content, ContentModel::Empty));
        assert!(foo.attributes.is_empty());
    }

    #[test]
    fn parses_all_model_with_required_and_optional() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="Foo">
                <xs:all>
                    <xs:element name="a" type="xs:int"/>
                    <xs:element name="b" type="xs:int" minOccurs="0"/>
                </xs:all>
            </xs:complexType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let foo = schema.complex_types.get("Foo").unwrap();
        match &foo.content {
            ContentModel::Group(Particle::All { members, .. }) => {
                assert_eq!(members.len(), 2);
                assert!(!members[0].occurs().optional());
                assert!(members[1].occurs().optional());
            }
            other => panic!("expected all model, got {other:?}"),
        }
    }

    #[test]
    fn parses_sequence_with_unbounded_repetition() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="Bar">
                <xs:sequence>
                    <xs:element name="x" type="xs:int" minOccurs="1" maxOccurs="unbounded"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let bar = schema.complex_types.get("Bar").unwrap();
        match &bar.content {
            ContentModel::Group(Particle::Sequence { members, .. }) => {
                assert!(members[0].occurs().many());
            }
            other => panic!("expected sequence model, got {other:?}"),
        }
    }

    #[test]
    fn parses_enumeration_restriction() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="color">
                <xs:restriction base="xs:string">
                    <xs:enumeration value="red"/>
                    <xs:enumeration value="green"/>
                    <xs:enumeration value="blue"/>
                </xs:restriction>
            </xs:simpleType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        match schema.simple_types.get("color").unwrap() {
            SimpleType::AtomicRestriction { facets, .. } => {
                assert_eq!(facets.enumeration, vec!["red", "green", "blue"]);
                assert!(facets.other_facet.is_none());
            }
            other => panic!("expected restriction, got {other:?}"),
        }
    }

    #[test]
    fn parses_union_of_builtin_and_enum() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="yesno">
                <xs:restriction base="xs:string">
                    <xs:enumeration value="yes"/>
                    <xs:enumeration value="no"/>
                </xs:restriction>
            </xs:simpleType>
            <xs:simpleType name="intOrYesNo">
                <xs:union memberTypes="xs:int yesno"/>
            </xs:simpleType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        match schema.simple_types.get("intOrYesNo").unwrap() {
            SimpleType::Union { member_types } => {
                assert_eq!(member_types, &vec!["xs:int".to_string(), "yesno".to_string()]);
            }
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn rejects_nothing_at_parse_time_non_enum_facets_are_just_recorded() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="smallint">
                <xs:restriction base="xs:int">
                    <xs:minInclusive value="0"/>
                </xs:restriction>
            </xs:simpleType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        match schema.simple_types.get("smallint").unwrap() {
            SimpleType::AtomicRestriction { facets, .. } => {
                assert_eq!(facets.other_facet.as_deref(), Some("minInclusive"));
            }
            other => panic!("expected restriction, got {other:?}"),
        }
    }
}
