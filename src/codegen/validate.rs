//! Validate/count emitter (component G).
//!
//! One pass per document: walks every element depth-first, checks its
//! children against the type's content model (`dfa`/`all`/`none`
//! — spec.md §4.G), and tallies how many instances of each arena-eligible
//! complex type will need a slot, so the load pass (component H) can
//! `vec![T::default(); n]` every arena exactly once up front rather than
//! growing it (spec.md §5 count -> alloc -> load). Grounded on
//! `original_source/uxsdcxx.py`'s `_gen_count_dfa`/`_gen_count_all`/
//! `count_fn_from_complex_type`, including the literal `"end of input"`
//! offending-token string on end-of-input DFA rejection.

use crate::annotate::{AnnotatedComplexType, ContentModelKind, ElementTypeRef};
use crate::codegen::builder::CodeBuilder;
use crate::codegen::{lexer, structs};
use crate::registry::Registry;

/// `Counts`: one `u32` field per arena-eligible complex type (spec.md §3
/// "Arena set"), zeroed at the start of a count pass and filled by
/// `count_<Type>` as it walks the tree.
pub fn emit_counts_struct(b: &mut CodeBuilder, registry: &Registry) {
    b.line("#[derive(Debug, Default)]");
    b.block("pub struct Counts {", "}", |b| {
        for name in registry.sorted_arena_types() {
            b.line(format!("pub {}: u32,", structs::arena_field_name(&name)));
        }
    });
}

/// Emits every complex type's compiled DFA as a flat transition table
/// (`-1` standing in for "no transition", since Rust has no native
/// nullable-integer array literal) plus its accepting-state bitmap.
pub fn emit_dfa_tables(b: &mut CodeBuilder, registry: &Registry) {
    for name in registry.ordered_complex_types() {
        let ct = &registry.complex[name];
        if let Some(dfa) = &ct.dfa {
            let n_states = dfa.states.len();
            let n_symbols = dfa.symbols.len();
            b.line(format!(
                "static DFA_TRANSITIONS_{}: [[i32; {n_symbols}]; {n_states}] = [",
                shouty(name)
            ));
            b.indent();
            for state in &dfa.states {
                let row: Vec<String> = state
                    .transitions
                    .iter()
                    .map(|t| t.map(|s| s as i64).unwrap_or(-1).to_string())
                    .collect();
                b.line(format!("[{}],", row.join(", ")));
            }
            b.dedent();
            b.line("];");
            let flags: Vec<&str> = dfa.accepting.iter().map(|a| if *a { "true" } else { "false" }).collect();
            b.line(format!(
                "static DFA_ACCEPTING_{}: [bool; {n_states}] = [{}];",
                shouty(name),
                flags.join(", ")
            ));
            b.blank();
        }
    }
}

fn shouty(s: &str) -> String {
    use heck::ToShoutySnakeCase;
    s.to_shouty_snake_case()
}

/// Drives emission of one `count_<snake>` function per complex type with
/// at least one element child (attribute-only/empty types need no
/// structural check and are skipped, per spec.md §4.G "none" model).
pub fn emit_all(b: &mut CodeBuilder, registry: &Registry) {
    emit_counts_struct(b, registry);
    b.blank();
    emit_dfa_tables(b, registry);
    for name in registry.ordered_complex_types() {
        let ct = &registry.complex[name];
        if ct.content_model != ContentModelKind::None {
            emit_count_fn(b, ct);
            b.blank();
        }
    }
}

pub(crate) fn fn_name(schema_name: &str) -> String {
    use heck::ToSnakeCase;
    format!("count_{}", schema_name.to_snake_case())
}

fn emit_count_fn(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    let fname = fn_name(&ct.schema_name);
    b.block(
        &format!("fn {fname}(node: roxmltree::Node, counts: &mut Counts) -> LoadResult<()> {{"),
        "}",
        |b| match ct.content_model {
            ContentModelKind::None => {
                b.line("Ok(())");
            }
            ContentModelKind::All => emit_all_count(b, ct),
            ContentModelKind::Dfa => emit_dfa_count(b, ct),
        },
    );
}

fn emit_child_dispatch(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    b.block("match child.tag_name().name() {", "}", |b| {
        for child in &ct.child_elements {
            let mut arm = String::new();
            if let ElementTypeRef::Complex(type_name) = &child.type_ref {
                if child.many {
                    arm.push_str(&format!(
                        "counts.{} += 1;",
                        structs::arena_field_name(type_name)
                    ));
                }
                arm.push_str(&format!(" {}(child, counts)?;", fn_name(type_name)));
            }
            b.line(format!("{:?} => {{ {arm} }}", child.name));
        }
        b.line(format!(
            "other => return Err(LoadError::UnexpectedChild {{ element: {:?}.to_string(), child: other.to_string() }}),",
            ct.schema_name
        ));
    });
}

fn emit_all_count(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    let n = ct.child_elements.len();
    b.line(format!("let mut seen = [false; {n}];"));
    b.block("for child in node.children().filter(|n| n.is_element()) {", "}", |b| {
        b.block("let idx = match child.tag_name().name() {", "};", |b| {
            for (i, child) in ct.child_elements.iter().enumerate() {
                b.line(format!("{:?} => {i},", child.name));
            }
            b.line(format!(
                "other => return Err(LoadError::UnexpectedChild {{ element: {:?}.to_string(), child: other.to_string() }}),",
                ct.schema_name
            ));
        });
        b.block("if seen[idx] {", "}", |b| {
            b.line(format!(
                "return Err(LoadError::Duplicate {{ element: {:?}.to_string(), child: child.tag_name().name().to_string() }});",
                ct.schema_name
            ));
        });
        b.line("seen[idx] = true;");
        emit_child_dispatch(b, ct);
    });
    for (i, child) in ct.child_elements.iter().enumerate() {
        if !child.optional {
            b.block(&format!("if !seen[{i}] {{"), "}", |b| {
                b.line(format!(
                    "return Err(all_error({:?}, {:?}));",
                    ct.schema_name, child.name
                ));
            });
        }
    }
    b.line("Ok(())");
}

fn emit_dfa_count(b: &mut CodeBuilder, ct: &AnnotatedComplexType) {
    let table = lexer_table_name(&ct.schema_name);
    let dfa_name = shouty(&ct.schema_name);
    b.line("let mut state: usize = 0;");
    b.block("for child in node.children().filter(|n| n.is_element()) {", "}", |b| {
        b.block(&format!("let symbol = match {table}.get(child.tag_name().name()) {{"), "};", |b| {
            b.line("Some(s) => *s as usize,");
            b.line(format!(
                "None => return Err(dfa_error({:?}, child.tag_name().name())),",
                ct.schema_name
            ));
        });
        b.line(format!("let next = DFA_TRANSITIONS_{dfa_name}[state][symbol];"));
        b.block("if next < 0 {", "}", |b| {
            b.line(format!(
                "return Err(dfa_error({:?}, child.tag_name().name()));",
                ct.schema_name
            ));
        });
        b.line("state = next as usize;");
        emit_child_dispatch(b, ct);
    });
    b.block(&format!("if !DFA_ACCEPTING_{dfa_name}[state] {{"), "}", |b| {
        b.line(format!("return Err(dfa_error({:?}, \"end of input\"));", ct.schema_name));
    });
    b.line("Ok(())");
}

fn lexer_table_name(schema_name: &str) -> String {
    lexer::phf_table_name("CHILD_TOKENS", schema_name)
}
