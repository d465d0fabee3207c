//! Type registry (component B).
//!
//! The global catalogues the annotator populates and every emitter reads
//! from afterward: named and anonymous complex types, enumerations,
//! unions, the simple types that appear inside unions, and the arena set.
//! spec.md §4.B names five containers; we keep the same five plus the
//! lookup maps the annotated graph itself lives in.

use std::collections::{HashMap, HashSet};

use crate::annotate::{AnnotatedComplexType, AnnotatedEnum, AnnotatedUnion};

/// All state the annotator accumulates while walking the schema. Built
/// once by [`crate::annotate::annotate_schema`] and read-only afterward.
#[derive(Debug, Default)]
pub struct Registry {
    /// Named complex types, in the order they were first annotated.
    /// Re-sorted by tree height (leaves first) once annotation completes
    /// — see [`crate::annotate::sort_by_height`].
    pub complex_type_order: Vec<String>,

    /// Complex types discovered anonymously inside an element declaration
    /// (promoted and registered under the enclosing element's name),
    /// in discovery order. Appended to `complex_type_order` before the
    /// height sort, per spec.md invariant 1.
    pub anonymous_complex_types: Vec<String>,

    /// Enumerations, deduplicated, first-occurrence order preserved
    /// (spec.md invariant 6).
    pub enums: Vec<String>,

    /// Unions, deduplicated, first-occurrence order preserved.
    pub unions: Vec<String>,

    /// The set of simple type names that appear as a union member
    /// somewhere, used to synthesize the type-tag enum. A set during
    /// annotation; sorted by name once, at emission time (spec.md §4.B).
    pub simple_types_in_unions: HashSet<String>,

    /// Complex types with at least one `many = true` element reference
    /// anywhere in the annotated graph (spec.md §3 "Arena set").
    pub arena_types: HashSet<String>,

    /// Complex type name -> annotated definition. Iteration order is not
    /// meaningful; use `complex_type_order`/`anonymous_complex_types` for
    /// emission order.
    pub complex: HashMap<String, AnnotatedComplexType>,

    /// Simple type name -> annotated enum definition.
    pub enum_defs: HashMap<String, AnnotatedEnum>,

    /// Simple type name -> annotated union definition.
    pub union_defs: HashMap<String, AnnotatedUnion>,

    /// Top-level elements (candidate document roots), in document order.
    pub root_elements: Vec<(String, crate::annotate::AnnotatedElement)>,
}

impl Registry {
    /// Registers a named or newly-promoted-anonymous complex type exactly
    /// once; re-annotating is a no-op by construction (callers check
    /// `self.complex.contains_key` before doing the expensive work, per
    /// the idempotence invariant in spec.md §3).
    pub fn register_complex_type(&mut self, name: &str, def: AnnotatedComplexType, anonymous: bool) {
        if self.complex.contains_key(name) {
            return;
        }
        if anonymous {
            self.anonymous_complex_types.push(name.to_string());
        } else {
            self.complex_type_order.push(name.to_string());
        }
        self.complex.insert(name.to_string(), def);
    }

    pub fn register_enum(&mut self, name: &str, def: AnnotatedEnum) {
        if self.enum_defs.contains_key(name) {
            return;
        }
        self.enums.push(name.to_string());
        self.enum_defs.insert(name.to_string(), def);
    }

    pub fn register_union(&mut self, name: &str, def: AnnotatedUnion) {
        if self.union_defs.contains_key(name) {
            return;
        }
        self.unions.push(name.to_string());
        self.union_defs.insert(name.to_string(), def);
    }

    /// All complex type names in final emission order (after height sort).
    pub fn ordered_complex_types(&self) -> &[String] {
        &self.complex_type_order
    }

    /// Arena types, sorted by name (spec.md §4.E "Global mutable state"
    /// emits arena declarations in a fixed order).
    pub fn sorted_arena_types(&self) -> Vec<String> {
        let mut v: Vec<String> = self.arena_types.iter().cloned().collect();
        v.sort();
        v
    }
}
