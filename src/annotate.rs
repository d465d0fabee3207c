//! Schema annotator (component C).
//!
//! Walks the oracle's [`crate::xsd::Schema`] once, depth-first, and builds
//! a separate annotated graph in the [`crate::registry::Registry`] rather
//! than mutating the oracle in place (spec.md Design Notes §9) — the
//! oracle stays a read-only fact base; the annotator is the only writer of
//! target-language metadata (Rust type names, `many`/`optional`, arena
//! membership, DFA tables).
//!
//! Grounded on `uxsdcxx.py`'s `anno_type_*` family: `anno_type_element`,
//! `anno_type_group`, `anno_type_restriction`, `anno_type_union`,
//! `anno_type_simple_type`, `anno_type_complex_type`. The original ties
//! recursion termination to a mutable `cpp_type` field checked at entry;
//! we use an explicit in-progress set keyed by schema name instead, since
//! our annotated values are looked up by name through the registry rather
//! than chased through object pointers (see `Design Notes` in
//! SPEC_FULL.md).

use std::collections::HashSet;

use crate::dfa::{self, DfaTable};
use crate::error::{SchemaError, SchemaResult};
use crate::mangle;
use crate::registry::Registry;
use crate::xsd::{self, AttributeDecl, ComplexType, Occurs, Particle, Schema, SimpleType};

/// A resolved reference to a simple (non-element-bearing) type: one of the
/// fixed built-ins, a named enumeration, the single `list` shape (always a
/// `String`, per spec.md Non-goals), or a named union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleTypeRef {
    /// Local name of an XSD atomic built-in (`"string"`, `"int"`, ...).
    Builtin(String),
    /// Schema name of an enumeration-restricted simple type.
    Enum(String),
    /// An `xs:list` — always loaded as the raw token string.
    List,
    /// Schema name of a union simple type.
    Union(String),
}

impl SimpleTypeRef {
    /// The Rust type this reference loads as.
    pub fn rust_type(&self) -> String {
        match self {
            SimpleTypeRef::Builtin(local) => {
                xsd::builtin_rust_type(local).unwrap_or("String").to_string()
            }
            SimpleTypeRef::Enum(name) => mangle::type_name(name),
            SimpleTypeRef::List => "String".to_string(),
            SimpleTypeRef::Union(name) => mangle::type_name(name),
        }
    }
}

/// An annotated enumeration: a named simple type restricted to
/// `enumeration` facets only.
#[derive(Debug, Clone)]
pub struct AnnotatedEnum {
    pub schema_name: String,
    pub rust_type: String,
    /// Enumerators, first-occurrence order preserved, deduplicated
    /// (spec.md invariant 6). Index 0 is the zero/default sentinel the
    /// count pass relies on to detect "never assigned".
    pub values: Vec<String>,
}

/// An annotated union: a named simple type whose members are themselves
/// simple-type references.
#[derive(Debug, Clone)]
pub struct AnnotatedUnion {
    pub schema_name: String,
    pub rust_type: String,
    pub members: Vec<SimpleTypeRef>,
}

/// What an [`AnnotatedElement`] resolves to: either another complex type
/// (by registry name) or a simple value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementTypeRef {
    Complex(String),
    Simple(SimpleTypeRef),
}

/// A child element reference inside a complex type's content model, or a
/// top-level (candidate root) element — `many`/`optional` already widened
/// by every enclosing group's occurs bounds (spec.md §4.C).
#[derive(Debug, Clone)]
pub struct AnnotatedElement {
    pub name: String,
    pub type_ref: ElementTypeRef,
    pub many: bool,
    pub optional: bool,
}

/// An attribute, resolved and deduplicated by first appearance across the
/// type's own declarations, its attribute-group refs, and (for
/// `complexContent` extension) its base type's attributes.
#[derive(Debug, Clone)]
pub struct AnnotatedAttribute {
    pub name: String,
    pub type_ref: SimpleTypeRef,
    pub required: bool,
    pub default_value: Option<String>,
}

/// How a complex type's content model classifies for the validate/count
/// and load emitters (spec.md §4.D/§4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentModelKind {
    /// No child elements: either wholly empty, or `simpleContent` (a
    /// scalar value plus attributes, no child particle at all).
    #[default]
    None,
    /// `xs:all`: every listed child optional-or-required, order-free,
    /// each at most once.
    All,
    /// `xs:choice`/`xs:sequence` needing the compiled DFA, regardless of
    /// member count — a lone required child still goes through the DFA
    /// builder (component D), matching `uxsdcxx.py`'s unconditional
    /// `t.model = "dfa"` for any choice/sequence group.
    Dfa,
}

/// A fully annotated complex type, ready for the struct/enum/lexer/
/// validate/load/write emitters.
#[derive(Debug, Clone, Default)]
pub struct AnnotatedComplexType {
    pub schema_name: String,
    pub rust_type: String,
    pub content_model: ContentModelKind,
    pub attributes: Vec<AnnotatedAttribute>,
    pub child_elements: Vec<AnnotatedElement>,
    /// Populated only when `content_model == ContentModelKind::Dfa`.
    pub dfa: Option<DfaTable>,
    /// Populated only for `simpleContent` types: the scalar value every
    /// instance carries alongside its attributes.
    pub simple_content_type: Option<SimpleTypeRef>,
}

/// Drives the whole annotation pass and returns the populated registry.
///
/// Mirrors `uxsdcxx.py`'s driver order: every *named* complex type is
/// annotated first (independent of whether any element reaches it), then
/// every top-level element (which may additionally promote anonymous
/// types and mark arena membership). Schema maps are `BTreeMap`s, so
/// visiting them in key order is already deterministic without an extra
/// sort (spec.md invariant: "single-pass and deterministic").
pub fn annotate_schema(schema: &Schema) -> SchemaResult<Registry> {
    let mut cx = Annotator { schema, registry: Registry::default(), in_progress: HashSet::new() };

    for name in schema.complex_types.keys() {
        let ct = &schema.complex_types[name];
        cx.build_complex_type(name, ct, false)?;
    }

    if schema.elements.is_empty() {
        return Err(SchemaError::NoRootElement);
    }
    if schema.elements.len() > 1 {
        return Err(SchemaError::MultipleRootElements { count: schema.elements.len() });
    }

    for (name, decl) in &schema.elements {
        let annotated = cx.annotate_element_ref(
            name,
            decl.type_name.as_deref(),
            decl.inline_complex_type.as_ref(),
            Occurs::ONE,
            false,
            false,
        )?;
        cx.registry.root_elements.push((name.clone(), annotated));
    }

    sort_by_height(&mut cx.registry);
    Ok(cx.registry)
}

struct Annotator<'s> {
    schema: &'s Schema,
    registry: Registry,
    /// Complex type names currently being built, to break recursive
    /// cycles (`note` containing `note*`) without needing a mutable
    /// placeholder on a shared object, per SPEC_FULL.md Design Notes.
    in_progress: HashSet<String>,
}

impl<'s> Annotator<'s> {
    /// Resolves a child or root element reference: widens `many`/
    /// `optional` by the enclosing occurs, resolves its type (builtin,
    /// named/anonymous complex, or simple), and — if the resolved type is
    /// referenced with `many == true` — marks it as an arena type.
    fn annotate_element_ref(
        &mut self,
        name: &str,
        type_name: Option<&str>,
        inline: Option<&ComplexType>,
        occurs: Occurs,
        inherited_many: bool,
        inherited_optional: bool,
    ) -> SchemaResult<AnnotatedElement> {
        let many = inherited_many || occurs.many();
        let optional = inherited_optional || occurs.optional();

        let type_ref = if let Some(ct) = inline {
            self.build_complex_type(name, ct, true)?;
            ElementTypeRef::Complex(name.to_string())
        } else {
            let type_name = type_name
                .ok_or_else(|| SchemaError::UnresolvedReference {
                    reference: "(no type=)".to_string(),
                    from: name.to_string(),
                })?;
            self.resolve_element_type(name, type_name)?
        };

        if many {
            if let ElementTypeRef::Complex(type_name) = &type_ref {
                self.registry.arena_types.insert(type_name.clone());
            }
        }

        Ok(AnnotatedElement { name: name.to_string(), type_ref, many, optional })
    }

    fn resolve_element_type(&mut self, from: &str, type_name: &str) -> SchemaResult<ElementTypeRef> {
        if xsd::is_builtin(type_name) {
            let (_, local) = xsd::split_qname(type_name);
            return Ok(ElementTypeRef::Simple(SimpleTypeRef::Builtin(local.to_string())));
        }
        if let Some(ct) = self.schema.complex_types.get(type_name) {
            self.build_complex_type(type_name, ct, false)?;
            return Ok(ElementTypeRef::Complex(type_name.to_string()));
        }
        if let Some(st) = self.schema.simple_types.get(type_name).cloned() {
            return Ok(ElementTypeRef::Simple(self.annotate_simple_type(type_name, &st)?));
        }
        Err(SchemaError::UnresolvedReference { reference: type_name.to_string(), from: from.to_string() })
    }

    /// Annotates (or no-ops on) a named or promoted-anonymous complex
    /// type. Idempotent: a type already in the registry, or already being
    /// built further up the call stack, returns immediately — this is how
    /// recursive schemas terminate (spec.md invariant 3 / §3 "Annotation
    /// idempotence").
    fn build_complex_type(&mut self, name: &str, ct: &ComplexType, anonymous: bool) -> SchemaResult<()> {
        if self.registry.complex.contains_key(name) || self.in_progress.contains(name) {
            return Ok(());
        }
        self.in_progress.insert(name.to_string());

        let attributes = self.collect_attributes(name, ct)?;

        let simple_content_type = if ct.is_simple_content {
            let base = ct.extension_base.as_deref().unwrap_or("xs:string");
            Some(self.resolve_simple_type_ref(name, base)?)
        } else {
            None
        };

        let (content_model, child_elements, dfa) = match &ct.content {
            xsd::ContentModel::Empty => (ContentModelKind::None, Vec::new(), None),
            xsd::ContentModel::Group(particle) => self.annotate_content(name, particle)?,
        };

        self.in_progress.remove(name);

        let annotated = AnnotatedComplexType {
            schema_name: name.to_string(),
            rust_type: mangle::type_name(name),
            content_model,
            attributes,
            child_elements,
            dfa,
            simple_content_type,
        };
        self.registry.register_complex_type(name, annotated, anonymous);
        Ok(())
    }

    /// Classifies a top-level content particle and annotates its
    /// children. `xs:all` keeps the flat member list; every `xs:choice`/
    /// `xs:sequence` (including a single child occurring exactly once)
    /// goes through the DFA builder (component D) — there is no
    /// member-count shortcut, matching `uxsdcxx.py`'s unconditional
    /// `t.model = "dfa"` for any choice/sequence group.
    fn annotate_content(
        &mut self,
        owner: &str,
        particle: &Particle,
    ) -> SchemaResult<(ContentModelKind, Vec<AnnotatedElement>, Option<DfaTable>)> {
        match particle {
            Particle::All { members, .. } => {
                let mut out = Vec::with_capacity(members.len());
                for m in members {
                    out.push(self.annotate_flat_member(owner, m, false, false)?);
                }
                Ok((ContentModelKind::All, out, None))
            }
            _ => self.annotate_dfa_content(owner, particle),
        }
    }

    fn annotate_dfa_content(
        &mut self,
        owner: &str,
        particle: &Particle,
    ) -> SchemaResult<(ContentModelKind, Vec<AnnotatedElement>, Option<DfaTable>)> {
        let leaves = self.flatten_leaf_elements(owner, particle)?;
        let alphabet = self.flattened_alphabet(particle)?;
        let table = dfa::build(owner, particle, self.schema, &alphabet)?;
        // De-duplicate by name: a symbol can appear in more than one
        // branch of a `choice` (rare, but legal); the child-element list
        // downstream is keyed by tag, so only the first occurrence's
        // multiplicity metadata is kept, consistent with the DFA's own
        // "unique tag" transition table.
        let mut seen = HashSet::new();
        let deduped: Vec<AnnotatedElement> =
            leaves.into_iter().filter(|e| seen.insert(e.name.clone())).collect();
        Ok((ContentModelKind::Dfa, deduped, Some(table)))
    }

    /// Collects every leaf `Particle::Element`/`GroupRef`-resolved element
    /// reachable under `particle`, carrying occurs widening down from
    /// every enclosing group (spec.md §4.C "many/optional widen
    /// monotonically").
    fn flatten_leaf_elements(&mut self, owner: &str, particle: &Particle) -> SchemaResult<Vec<AnnotatedElement>> {
        self.flatten_leaf_elements_widened(owner, particle, false, false)
    }

    fn flatten_leaf_elements_widened(
        &mut self,
        owner: &str,
        particle: &Particle,
        inherited_many: bool,
        inherited_optional: bool,
    ) -> SchemaResult<Vec<AnnotatedElement>> {
        let many = inherited_many || particle.occurs().many();
        let optional = inherited_optional || particle.occurs().optional();
        match particle {
            Particle::Element(el) => {
                let annotated =
                    self.annotate_element_ref(&el.name, el.type_name.as_deref(), el.inline_complex_type.as_deref(), Occurs::ONE, many, optional)?;
                Ok(vec![annotated])
            }
            Particle::GroupRef { name, .. } => {
                let group = self
                    .schema
                    .groups
                    .get(name)
                    .cloned()
                    .ok_or_else(|| SchemaError::UnresolvedReference { reference: name.clone(), from: owner.to_string() })?;
                self.flatten_leaf_elements_widened(owner, &group.content, many, optional)
            }
            Particle::Sequence { members, .. } | Particle::Choice { members, .. } | Particle::All { members, .. } => {
                let mut out = Vec::new();
                for m in members {
                    out.extend(self.flatten_leaf_elements_widened(owner, m, many, optional)?);
                }
                Ok(out)
            }
        }
    }

    fn annotate_flat_member(
        &mut self,
        owner: &str,
        particle: &Particle,
        inherited_many: bool,
        inherited_optional: bool,
    ) -> SchemaResult<AnnotatedElement> {
        match particle {
            Particle::Element(el) => self.annotate_element_ref(
                &el.name,
                el.type_name.as_deref(),
                el.inline_complex_type.as_deref(),
                el.occurs,
                inherited_many,
                inherited_optional,
            ),
            Particle::GroupRef { name, occurs } => Err(SchemaError::UnknownGroupModel {
                type_name: owner.to_string(),
                kind: format!("group ref `{name}` inside xs:all (occurs {occurs:?})"),
            }),
            other => Err(SchemaError::UnknownGroupModel {
                type_name: owner.to_string(),
                kind: format!("{other:?} nested inside xs:all"),
            }),
        }
    }

    /// The element-tag alphabet a DFA is built over: every distinct leaf
    /// element name reachable from `particle`, in first-occurrence order.
    fn flattened_alphabet(&mut self, particle: &Particle) -> SchemaResult<Vec<String>> {
        fn walk(schema: &Schema, particle: &Particle, out: &mut Vec<String>, seen: &mut HashSet<String>) {
            match particle {
                Particle::Element(el) => {
                    if seen.insert(el.name.clone()) {
                        out.push(el.name.clone());
                    }
                }
                Particle::GroupRef { name, .. } => {
                    if let Some(group) = schema.groups.get(name) {
                        walk(schema, &group.content, out, seen);
                    }
                }
                Particle::Sequence { members, .. } | Particle::Choice { members, .. } | Particle::All { members, .. } => {
                    for m in members {
                        walk(schema, m, out, seen);
                    }
                }
            }
        }
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        walk(self.schema, particle, &mut out, &mut seen);
        Ok(out)
    }

    /// Flattens a complex type's attribute list: base type (via
    /// `complexContent` extension) first, then attribute-group refs in
    /// declaration order (each recursively flattened), then direct
    /// attributes — deduplicated by name at first appearance (spec.md
    /// invariant 5).
    fn collect_attributes(&mut self, owner: &str, ct: &ComplexType) -> SchemaResult<Vec<AnnotatedAttribute>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        if !ct.is_simple_content {
            if let Some(base) = &ct.extension_base {
                if !xsd::is_builtin(base) {
                    if let Some(base_ct) = self.schema.complex_types.get(base).cloned() {
                        for a in self.collect_attributes(owner, &base_ct)? {
                            push_dedup(&mut out, &mut seen, a);
                        }
                    }
                }
            }
        }

        for group_ref in &ct.attribute_group_refs {
            let flattened = self.collect_attribute_group(owner, group_ref)?;
            for a in flattened {
                push_dedup(&mut out, &mut seen, a);
            }
        }

        for a in &ct.attributes {
            if a.prohibited {
                return Err(SchemaError::ProhibitedAttribute {
                    type_name: owner.to_string(),
                    attribute: a.name.clone(),
                });
            }
            let type_ref = self.resolve_attribute_type(owner, a)?;
            push_dedup(
                &mut out,
                &mut seen,
                AnnotatedAttribute {
                    name: a.name.clone(),
                    type_ref,
                    required: a.required,
                    default_value: a.default_value.clone(),
                },
            );
        }

        Ok(out)
    }

    fn collect_attribute_group(&mut self, owner: &str, name: &str) -> SchemaResult<Vec<AnnotatedAttribute>> {
        let group = self
            .schema
            .attribute_groups
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnresolvedReference { reference: name.to_string(), from: owner.to_string() })?;

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for nested in &group.attribute_group_refs {
            for a in self.collect_attribute_group(owner, nested)? {
                push_dedup(&mut out, &mut seen, a);
            }
        }
        for a in &group.attributes {
            if a.prohibited {
                return Err(SchemaError::ProhibitedAttribute { type_name: owner.to_string(), attribute: a.name.clone() });
            }
            let type_ref = self.resolve_attribute_type(owner, a)?;
            push_dedup(
                &mut out,
                &mut seen,
                AnnotatedAttribute {
                    name: a.name.clone(),
                    type_ref,
                    required: a.required,
                    default_value: a.default_value.clone(),
                },
            );
        }
        Ok(out)
    }

    fn resolve_attribute_type(&mut self, owner: &str, a: &AttributeDecl) -> SchemaResult<SimpleTypeRef> {
        self.resolve_simple_type_ref(owner, &a.type_name)
    }

    fn resolve_simple_type_ref(&mut self, owner: &str, type_name: &str) -> SchemaResult<SimpleTypeRef> {
        if xsd::is_builtin(type_name) {
            let (_, local) = xsd::split_qname(type_name);
            return Ok(SimpleTypeRef::Builtin(local.to_string()));
        }
        let st = self
            .schema
            .simple_types
            .get(type_name)
            .cloned()
            .ok_or_else(|| SchemaError::UnresolvedReference { reference: type_name.to_string(), from: owner.to_string() })?;
        self.annotate_simple_type(type_name, &st)
    }

    /// Annotates a named simple type: atomic restriction (enumeration
    /// only — any other facet is refused), `list` (always `String`), or
    /// `union` (each member resolved and recorded in
    /// `simple_types_in_unions` for the tag-enum synthesis).
    fn annotate_simple_type(&mut self, name: &str, st: &SimpleType) -> SchemaResult<SimpleTypeRef> {
        match st {
            SimpleType::AtomicRestriction { facets, .. } => {
                if let Some(facet) = &facets.other_facet {
                    return Err(SchemaError::UnsupportedFacet { type_name: name.to_string(), facet: facet.clone() });
                }
                if facets.enumeration.is_empty() {
                    return Err(SchemaError::UnsupportedSimpleType {
                        type_name: name.to_string(),
                        detail: "restriction carries no enumeration facets".to_string(),
                    });
                }
                let mut values = Vec::new();
                let mut seen = HashSet::new();
                for v in &facets.enumeration {
                    if seen.insert(v.clone()) {
                        values.push(v.clone());
                    }
                }
                self.registry.register_enum(
                    name,
                    AnnotatedEnum { schema_name: name.to_string(), rust_type: mangle::type_name(name), values },
                );
                Ok(SimpleTypeRef::Enum(name.to_string()))
            }
            SimpleType::List { .. } => Ok(SimpleTypeRef::List),
            SimpleType::Union { member_types } => {
                let mut members = Vec::with_capacity(member_types.len());
                for m in member_types {
                    let member_ref = self.resolve_simple_type_ref(name, m)?;
                    self.registry.simple_types_in_unions.insert(member_ref.rust_type());
                    members.push(member_ref);
                }
                self.registry.register_union(
                    name,
                    AnnotatedUnion { schema_name: name.to_string(), rust_type: mangle::type_name(name), members },
                );
                Ok(SimpleTypeRef::Union(name.to_string()))
            }
        }
    }
}

fn push_dedup(out: &mut Vec<AnnotatedAttribute>, seen: &mut HashSet<String>, attr: AnnotatedAttribute) {
    if seen.insert(attr.name.clone()) {
        out.push(attr);
    }
}

/// Re-orders `registry.complex_type_order` (named types) so that every
/// type appears after all the complex types its content model or
/// `simpleContent` base refers to — leaves first, matching `uxsdcxx.py`'s
/// `key_ctype` height sort (spec.md invariant 1: "a struct's definition
/// never forward-references a struct defined later"). Anonymous
/// (element-promoted) types are appended to the named list first, in
/// discovery order, before the sort runs, then the whole sequence is
/// stable-sorted by height so ties keep their relative discovery order.
fn sort_by_height(registry: &mut Registry) {
    let mut all: Vec<String> = registry.complex_type_order.drain(..).collect();
    all.extend(registry.anonymous_complex_types.drain(..));

    fn height(name: &str, registry: &Registry, memo: &mut std::collections::HashMap<String, u32>, stack: &mut HashSet<String>) -> u32 {
        if let Some(h) = memo.get(name) {
            return *h;
        }
        if !stack.insert(name.to_string()) {
            // Cycle: treat as a leaf from this caller's perspective,
            // matching the original generator's forward-declared handling
            // of directly-recursive types.
            return 0;
        }
        let def = match registry.complex.get(name) {
            Some(d) => d,
            None => {
                stack.remove(name);
                return 0;
            }
        };
        let mut h = 0u32;
        for child in &def.child_elements {
            if let ElementTypeRef::Complex(child_name) = &child.type_ref {
                if child_name != name {
                    h = h.max(1 + height(child_name, registry, memo, stack));
                } else {
                    h = h.max(1);
                }
            }
        }
        stack.remove(name);
        memo.insert(name.to_string(), h);
        h
    }

    let mut memo = std::collections::HashMap::new();
    let mut heights: Vec<(u32, usize, String)> = all
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut stack = HashSet::new();
            (height(name, registry, &mut memo, &mut stack), i, name.clone())
        })
        .collect();
    heights.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    registry.complex_type_order = heights.into_iter().map(|(_, _, name)| name).collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xsd::parse_xsd_str;

    #[test]
    fn single_required_child_still_goes_through_the_dfa_builder() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="root" type="Root"/>
            <xs:complexType name="Root">
                <xs:sequence>
                    <xs:element name="a" type="xs:int"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let registry = annotate_schema(&schema).unwrap();
        let root = registry.complex.get("Root").unwrap();
        assert_eq!(root.content_model, ContentModelKind::Dfa);
        assert!(root.dfa.is_some());
        assert_eq!(root.child_elements.len(), 1);
    }

    #[test]
    fn all_model_keeps_flat_member_list() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="root" type="Root"/>
            <xs:complexType name="Root">
                <xs:all>
                    <xs:element name="a" type="xs:int"/>
                    <xs:element name="b" type="xs:int" minOccurs="0"/>
                </xs:all>
            </xs:complexType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let registry = annotate_schema(&schema).unwrap();
        let root = registry.complex.get("Root").unwrap();
        assert_eq!(root.content_model, ContentModelKind::All);
        assert!(!root.child_elements[0].optional);
        assert!(root.child_elements[1].optional);
    }

    #[test]
    fn choice_or_sequence_with_repetition_gets_a_dfa() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="root" type="Root"/>
            <xs:complexType name="Root">
                <xs:choice maxOccurs="unbounded">
                    <xs:element name="a" type="xs:int"/>
                    <xs:element name="b" type="xs:int"/>
                </xs:choice>
            </xs:complexType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let registry = annotate_schema(&schema).unwrap();
        let root = registry.complex.get("Root").unwrap();
        assert_eq!(root.content_model, ContentModelKind::Dfa);
        assert!(root.dfa.is_some());
        assert!(root.child_elements.iter().all(|e| e.many));
    }

    #[test]
    fn many_element_registers_its_type_as_an_arena_type() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="root" type="Root"/>
            <xs:complexType name="Root">
                <xs:sequence>
                    <xs:element name="item" type="Item" maxOccurs="unbounded"/>
                </xs:sequence>
            </xs:complexType>
            <xs:complexType name="Item">
                <xs:attribute name="id" type="xs:int" use="required"/>
            </xs:complexType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let registry = annotate_schema(&schema).unwrap();
        assert!(registry.arena_types.contains("Item"));
    }

    #[test]
    fn attribute_group_refs_flatten_in_first_appearance_order() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="root" type="Root"/>
            <xs:attributeGroup name="Coords">
                <xs:attribute name="x" type="xs:int" use="required"/>
                <xs:attribute name="y" type="xs:int" use="required"/>
            </xs:attributeGroup>
            <xs:complexType name="Root">
                <xs:attributeGroup ref="Coords"/>
                <xs:attribute name="z" type="xs:int" use="required"/>
            </xs:complexType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let registry = annotate_schema(&schema).unwrap();
        let root = registry.complex.get("Root").unwrap();
        let names: Vec<&str> = root.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn prohibited_attribute_is_refused() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="root" type="Root"/>
            <xs:complexType name="Root">
                <xs:attribute name="legacy" type="xs:string" use="prohibited"/>
            </xs:complexType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let err = annotate_schema(&schema).unwrap_err();
        assert!(matches!(err, SchemaError::ProhibitedAttribute { .. }));
    }

    #[test]
    fn directly_recursive_type_terminates_and_sorts_first() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="root" type="Node"/>
            <xs:complexType name="Node">
                <xs:sequence>
                    <xs:element name="child" type="Node" minOccurs="0" maxOccurs="unbounded"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let registry = annotate_schema(&schema).unwrap();
        assert!(registry.complex.contains_key("Node"));
        assert!(registry.arena_types.contains("Node"));
    }

    #[test]
    fn multiple_root_elements_are_refused() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="a" type="xs:int"/>
            <xs:element name="b" type="xs:int"/>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let err = annotate_schema(&schema).unwrap_err();
        assert!(matches!(err, SchemaError::MultipleRootElements { count: 2 }));
    }

    #[test]
    fn union_members_are_tracked_for_the_tag_enum() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="root" type="yesnoOrInt"/>
            <xs:simpleType name="yesno">
                <xs:restriction base="xs:string">
                    <xs:enumeration value="yes"/>
                    <xs:enumeration value="no"/>
                </xs:restriction>
            </xs:simpleType>
            <xs:simpleType name="yesnoOrInt">
                <xs:union memberTypes="xs:int yesno"/>
            </xs:simpleType>
        </xs:schema>"#;
        let schema = parse_xsd_str(xsd).unwrap();
        let registry = annotate_schema(&schema).unwrap();
        assert!(registry.union_defs.contains_key("yesnoOrInt"));
        assert!(registry.simple_types_in_unions.contains("i32"));
        assert!(registry.simple_types_in_unions.contains("TYesno"));
    }
}
