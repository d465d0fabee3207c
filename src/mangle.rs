//! Name mangling & keyword guard (component A).
//!
//! Deterministic mapping of schema identifiers to target-language-safe
//! identifiers and uppercase tokens. None of this depends on the schema
//! being processed — it is a fixed property of the Rust backend.

/// Rust's reserved and reserved-but-unused keyword set (2021/2024
/// editions combined). A property of this emitter backend, not the
/// schema — see spec.md §4.A.
const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "union",
];

/// `token(s)`: uppercase, replacing any non-alphanumeric-or-underscore
/// character with `_`. Used for enum members and tag enums.
pub fn token(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

/// `union_member(s)`: `as_` prefix plus the same substitution, not
/// uppercased — used for the anonymous-variant field names of a tagged
/// union.
pub fn union_member(s: &str) -> String {
    let mangled: String =
        s.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect();
    format!("as_{mangled}")
}

/// `checked(s)`: if `s` collides with a Rust reserved word, append `_`
/// and warn once on the diagnostic stream. The caller decides whether a
/// given collision is worth a warning (struct field names collide with
/// `self`/`type` far more often than type names do); this function always
/// warns, matching the original generator's unconditional warning.
pub fn checked(s: &str) -> String {
    if RUST_KEYWORDS.contains(&s) {
        tracing::warn!("`{s}` is a Rust keyword; renaming to `{s}_`");
        format!("{s}_")
    } else {
        s.to_string()
    }
}

/// `union_variant(s)`: `union_member(s)` cased as a Rust enum variant —
/// `"as_xs_int"` becomes `"AsXsInt"`. `s` is the member's already-resolved
/// Rust type name (`"i32"`, `"String"`, `"TYesno"`), matching the original
/// generator's `to_union_member_type(e.cpp_type)` (keyed off the member's
/// target-language type, not its schema name).
pub fn union_variant(s: &str) -> String {
    use heck::ToUpperCamelCase;
    union_member(s).to_upper_camel_case()
}

/// `type_name(s)`: `T_<s>` (mangled to a valid Rust type identifier) for
/// user-defined types; built-ins are looked up separately and never pass
/// through this function.
pub fn type_name(s: &str) -> String {
    use heck::ToUpperCamelCase;
    format!("T{}", s.to_upper_camel_case())
}

/// `enum_variant(s)`: an enumerator value (`"red"`, `"8th"`) cased as a
/// Rust enum variant, keyword-guarded in the unlikely case camel-casing
/// produces e.g. `Self`.
pub fn enum_variant(s: &str) -> String {
    use heck::ToUpperCamelCase;
    let v = s.to_upper_camel_case();
    let v = if v.is_empty() { "Empty".to_string() } else { v };
    let v = if v.chars().next().is_some_and(|c| c.is_ascii_digit()) { format!("V{v}") } else { v };
    checked(&v)
}

/// Turns a schema filename's basename (extension stripped) into a valid
/// Rust module identifier, lower-cased, for the namespace the driver
/// wraps generated code in.
pub fn namespace_from_filename(path: &std::path::Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("schema");
    let mangled: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if mangled.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        format!("_{mangled}")
    } else {
        mangled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_uppercases_and_replaces_punctuation() {
        assert_eq!(token("left-center-right"), "LEFT_CENTER_RIGHT");
        assert_eq!(token("yes"), "YES");
    }

    #[test]
    fn union_member_prefixes_without_uppercasing() {
        assert_eq!(union_member("xs:int"), "as_xs_int");
    }

    #[test]
    fn union_variant_camel_cases_the_member_field_name() {
        assert_eq!(union_variant("i32"), "AsI32");
        assert_eq!(union_variant("TYesno"), "AsTYesno");
    }

    #[test]
    fn checked_renames_keywords_only() {
        assert_eq!(checked("type"), "type_");
        assert_eq!(checked("duration"), "duration");
        assert_eq!(checked("self"), "self_");
    }

    #[test]
    fn enum_variant_camel_cases_and_guards_leading_digits() {
        assert_eq!(enum_variant("red"), "Red");
        assert_eq!(enum_variant("8th"), "V8th");
    }

    #[test]
    fn type_name_camel_cases_with_prefix() {
        assert_eq!(type_name("note-type"), "TNoteType");
        assert_eq!(type_name("Measure"), "TMeasure");
    }

    #[test]
    fn namespace_from_filename_strips_extension_and_lowercases() {
        assert_eq!(namespace_from_filename(std::path::Path::new("MusicXML.xsd")), "musicxml");
        assert_eq!(namespace_from_filename(std::path::Path::new("/a/b/foo-bar.xsd")), "foo_bar");
    }
}
