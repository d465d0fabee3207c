//! Content-model DFA builder (component D).
//!
//! `xs:choice`/`xs:sequence` groups with repetition (anything beyond "one
//! particle, occurring exactly once" — see
//! [`crate::annotate::ContentModelKind`]) compile down to a deterministic
//! finite automaton over the element-tag alphabet, via the textbook
//! regex -> Thompson NFA -> subset-construction pipeline. No crate in the
//! dependency graph does XSD-content-model-to-DFA compilation (see
//! SPEC_FULL.md OQ-2); this is the one piece of the generator with no
//! ecosystem crate to lean on, so it is hand-rolled here, kept small and
//! free of any schema-specific concerns — it only ever sees a symbol
//! alphabet and a content particle tree.
//!
//! `xs:all` never reaches this module: its member list stays flat and is
//! checked by counting, not by automaton (spec.md §4.D).

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::error::{SchemaError, SchemaResult};
use crate::xsd::{Occurs, Particle, Schema};

/// A compiled content-model automaton. State `0` is always the start
/// state. `transitions[state][symbol]` is the next state, or `None` if
/// that symbol is rejected from `state`.
#[derive(Debug, Clone)]
pub struct DfaTable {
    /// Element tag alphabet, in the order the generated lexer assigns
    /// symbol ids (spec.md §4.F — the perfect-hash table and this table
    /// share the same symbol numbering).
    pub symbols: Vec<String>,
    pub states: Vec<DfaState>,
    /// `accepting[state]` — whether the content model may legally end
    /// there (all required children have been seen).
    pub accepting: Vec<bool>,
}

#[derive(Debug, Clone)]
pub struct DfaState {
    pub transitions: Vec<Option<usize>>,
}

impl DfaTable {
    pub fn symbol_id(&self, tag: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == tag)
    }

    pub fn step(&self, state: usize, symbol: usize) -> Option<usize> {
        self.states[state].transitions[symbol]
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.accepting[state]
    }
}

/// A regular expression over element-tag symbol ids, the intermediate
/// form a content particle tree lowers to before Thompson construction.
#[derive(Debug, Clone)]
enum Regex {
    Empty,
    Symbol(usize),
    Concat(Vec<Regex>),
    Union(Vec<Regex>),
    Optional(Box<Regex>),
    Star(Box<Regex>),
}

/// Wraps `inner` to respect `occurs`, expanding bounded repetition into a
/// concatenation of mandatory copies followed by optional copies (or a
/// trailing `Star` when `maxOccurs="unbounded"`). Matches the standard
/// `{m,n}` regex-quantifier desugaring.
fn wrap_occurs(inner: Regex, occurs: Occurs) -> Regex {
    let mut parts = Vec::new();
    for _ in 0..occurs.min {
        parts.push(inner.clone());
    }
    match occurs.max {
        None => parts.push(Regex::Star(Box::new(inner))),
        Some(max) => {
            for _ in 0..max.saturating_sub(occurs.min) {
                parts.push(Regex::Optional(Box::new(inner.clone())));
            }
        }
    }
    match parts.len() {
        0 => Regex::Empty,
        1 => parts.into_iter().next().unwrap(),
        _ => Regex::Concat(parts),
    }
}

fn particle_to_regex(
    owner: &str,
    particle: &Particle,
    schema: &Schema,
    symbols: &HashMap<&str, usize>,
) -> SchemaResult<Regex> {
    let inner = match particle {
        Particle::Element(el) => {
            let id = *symbols
                .get(el.name.as_str())
                .expect("DFA alphabet is always built from the same particle tree being compiled");
            Regex::Symbol(id)
        }
        Particle::GroupRef { name, .. } => {
            let group = schema.groups.get(name).ok_or_else(|| SchemaError::UnresolvedReference {
                reference: name.clone(),
                from: owner.to_string(),
            })?;
            particle_to_regex(owner, &group.content, schema, symbols)?
        }
        Particle::Sequence { members, .. } => {
            let parts = members
                .iter()
                .map(|m| particle_to_regex(owner, m, schema, symbols))
                .collect::<SchemaResult<Vec<_>>>()?;
            if parts.is_empty() { Regex::Empty } else { Regex::Concat(parts) }
        }
        Particle::Choice { members, .. } => {
            let parts = members
                .iter()
                .map(|m| particle_to_regex(owner, m, schema, symbols))
                .collect::<SchemaResult<Vec<_>>>()?;
            Regex::Union(parts)
        }
        Particle::All { .. } => {
            return Err(SchemaError::UnknownGroupModel {
                type_name: owner.to_string(),
                kind: "xs:all nested inside a choice/sequence content model".to_string(),
            });
        }
    };
    Ok(wrap_occurs(inner, particle.occurs()))
}

struct Nfa {
    /// Per-state outgoing edges: `(symbol, target)`, `None` symbol is an
    /// epsilon transition.
    edges: Vec<Vec<(Option<usize>, usize)>>,
}

impl Nfa {
    fn new_state(&mut self) -> usize {
        self.edges.push(Vec::new());
        self.edges.len() - 1
    }

    fn add_edge(&mut self, from: usize, symbol: Option<usize>, to: usize) {
        self.edges[from].push((symbol, to));
    }
}

struct Frag {
    start: usize,
    accept: usize,
}

fn thompson(nfa: &mut Nfa, re: &Regex) -> Frag {
    match re {
        Regex::Empty => {
            let s = nfa.new_state();
            Frag { start: s, accept: s }
        }
        Regex::Symbol(id) => {
            let start = nfa.new_state();
            let accept = nfa.new_state();
            nfa.add_edge(start, Some(*id), accept);
            Frag { start, accept }
        }
        Regex::Concat(parts) => {
            let mut iter = parts.iter();
            let mut frag = thompson(nfa, iter.next().expect("wrap_occurs never emits an empty Concat"));
            for part in iter {
                let next = thompson(nfa, part);
                nfa.add_edge(frag.accept, None, next.start);
                frag = Frag { start: frag.start, accept: next.accept };
            }
            frag
        }
        Regex::Union(parts) => {
            let start = nfa.new_state();
            let accept = nfa.new_state();
            for part in parts {
                let f = thompson(nfa, part);
                nfa.add_edge(start, None, f.start);
                nfa.add_edge(f.accept, None, accept);
            }
            Frag { start, accept }
        }
        Regex::Optional(inner) => {
            let f = thompson(nfa, inner);
            nfa.add_edge(f.start, None, f.accept);
            f
        }
        Regex::Star(inner) => {
            let start = nfa.new_state();
            let accept = nfa.new_state();
            let f = thompson(nfa, inner);
            nfa.add_edge(start, None, f.start);
            nfa.add_edge(start, None, accept);
            nfa.add_edge(f.accept, None, f.start);
            nfa.add_edge(f.accept, None, accept);
            Frag { start, accept }
        }
    }
}

fn epsilon_closure(nfa: &Nfa, seed: &BTreeSet<usize>) -> BTreeSet<usize> {
    let mut closure = seed.clone();
    let mut stack: Vec<usize> = seed.iter().copied().collect();
    while let Some(s) = stack.pop() {
        for &(symbol, to) in &nfa.edges[s] {
            if symbol.is_none() && closure.insert(to) {
                stack.push(to);
            }
        }
    }
    closure
}

fn move_set(nfa: &Nfa, states: &BTreeSet<usize>, symbol: usize) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    for &s in states {
        for &(sym, to) in &nfa.edges[s] {
            if sym == Some(symbol) {
                out.insert(to);
            }
        }
    }
    out
}

/// Compiles `particle`'s content model into a DFA over `alphabet` (the
/// deduplicated, first-occurrence-order element-tag list the caller
/// already computed while flattening leaf elements).
pub fn build(owner: &str, particle: &Particle, schema: &Schema, alphabet: &[String]) -> SchemaResult<DfaTable> {
    let symbol_index: HashMap<&str, usize> =
        alphabet.iter().enumerate().map(|(i, s)| (s.as_str(), i)).collect();
    let regex = particle_to_regex(owner, particle, schema, &symbol_index)?;

    let mut nfa = Nfa { edges: Vec::new() };
    let frag = thompson(&mut nfa, &regex);

    let n = alphabet.len();
    let start_seed: BTreeSet<usize> = std::iter::once(frag.start).collect();
    let start_closure = epsilon_closure(&nfa, &start_seed);

    // Maps an NFA subset to the DFA state index it was assigned; index
    // assignment order (not map iteration order) is what ultimately
    // numbers the states, so `accepting` is filled in step with
    // `transitions` rather than derived from this map afterward.
    let mut dstates: HashMap<BTreeSet<usize>, usize> = HashMap::new();
    let mut transitions: Vec<Vec<Option<usize>>> = Vec::new();
    let mut accepting: Vec<bool> = Vec::new();
    let mut worklist: VecDeque<BTreeSet<usize>> = VecDeque::new();

    dstates.insert(start_closure.clone(), 0);
    transitions.push(vec![None; n]);
    accepting.push(start_closure.contains(&frag.accept));
    worklist.push_back(start_closure);

    while let Some(set) = worklist.pop_front() {
        let from_idx = dstates[&set];
        for symbol in 0..n {
            let moved = move_set(&nfa, &set, symbol);
            if moved.is_empty() {
                continue;
            }
            let closure = epsilon_closure(&nfa, &moved);
            let to_idx = match dstates.get(&closure) {
                Some(&idx) => idx,
                None => {
                    let idx = dstates.len();
                    dstates.insert(closure.clone(), idx);
                    transitions.push(vec![None; n]);
                    accepting.push(closure.contains(&frag.accept));
                    worklist.push_back(closure);
                    idx
                }
            };
            transitions[from_idx][symbol] = Some(to_idx);
        }
    }

    let states = transitions.into_iter().map(|transitions| DfaState { transitions }).collect();

    Ok(DfaTable { symbols: alphabet.to_vec(), states, accepting })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xsd::{ElementParticle, Particle};

    fn leaf(name: &str, occurs: Occurs) -> Particle {
        Particle::Element(ElementParticle {
            name: name.to_string(),
            type_name: Some("xs:int".to_string()),
            inline_complex_type: None,
            occurs,
        })
    }

    #[test]
    fn choice_of_two_elements_accepts_exactly_one() {
        let particle = Particle::Choice {
            occurs: Occurs::ONE,
            members: vec![leaf("a", Occurs::ONE), leaf("b", Occurs::ONE)],
        };
        let schema = Schema::default();
        let alphabet = vec!["a".to_string(), "b".to_string()];
        let table = build("Root", &particle, &schema, &alphabet).unwrap();

        assert!(!table.is_accepting(0));
        let a_id = table.symbol_id("a").unwrap();
        let after_a = table.step(0, a_id).unwrap();
        assert!(table.is_accepting(after_a));
        let b_id = table.symbol_id("b").unwrap();
        assert!(table.step(after_a, b_id).is_none());
    }

    #[test]
    fn unbounded_repetition_stays_accepting_after_any_count() {
        let particle = Particle::Sequence {
            occurs: Occurs::ONE,
            members: vec![leaf("item", Occurs { min: 0, max: None })],
        };
        let schema = Schema::default();
        let alphabet = vec!["item".to_string()];
        let table = build("Root", &particle, &schema, &alphabet).unwrap();

        assert!(table.is_accepting(0));
        let id = table.symbol_id("item").unwrap();
        let s1 = table.step(0, id).unwrap();
        assert!(table.is_accepting(s1));
        let s2 = table.step(s1, id).unwrap();
        assert!(table.is_accepting(s2));
    }

    #[test]
    fn bounded_repetition_rejects_beyond_max() {
        let particle = Particle::Sequence {
            occurs: Occurs::ONE,
            members: vec![leaf("item", Occurs { min: 1, max: Some(2) })],
        };
        let schema = Schema::default();
        let alphabet = vec!["item".to_string()];
        let table = build("Root", &particle, &schema, &alphabet).unwrap();

        let id = table.symbol_id("item").unwrap();
        let s1 = table.step(0, id).unwrap();
        assert!(table.is_accepting(s1));
        let s2 = table.step(s1, id).unwrap();
        assert!(table.is_accepting(s2));
        assert!(table.step(s2, id).is_none());
    }

    #[test]
    fn required_element_rejects_the_empty_sequence() {
        let particle = leaf("only", Occurs::ONE);
        let schema = Schema::default();
        let alphabet = vec!["only".to_string()];
        let table = build("Root", &particle, &schema, &alphabet).unwrap();
        assert!(!table.is_accepting(0));
    }
}
