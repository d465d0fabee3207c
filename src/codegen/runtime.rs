//! Runtime prelude emitted verbatim into every generated module
//! (spec.md §6/§7 tier-3 runtime errors).
//!
//! `LoadError` is the generated code's own error type — distinct from
//! this crate's [`crate::error::SchemaError`]/[`crate::error::XsdParseError`],
//! which are errors the *generator* raises about the schema, not errors
//! the *generated loader* raises about a document instance. `dfa_error`,
//! `all_error`, and `attr_error` are the three free-function error
//! constructors spec.md §6 names, carried over unchanged in shape from
//! `original_source/uxsdcxx.py`'s matching helpers, `thiserror`-derived
//! instead of thrown.

/// The literal source text of the runtime prelude, written once per
/// generated module ahead of every emitted struct/enum/load fn.
pub fn prelude_source() -> &'static str {
    r#"#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("content model rejected token `{token}` at byte offset {offset} (element <{element}>)")]
    DfaReject { element: String, token: String, offset: usize },
    #[error("required element missing from xs:all content model of <{element}>: `{missing}`")]
    AllModelMissing { element: String, missing: String },
    #[error("missing required attribute `{attribute}` on <{element}>")]
    MissingAttribute { element: String, attribute: String },
    #[error("duplicate child `{child}` under <{element}>, which permits at most one")]
    Duplicate { element: String, child: String },
    #[error("`{text}` is not a member of enumeration `{type_name}`")]
    EnumNotFound { type_name: String, text: String },
    #[error("failed to parse `{text}` as `{type_name}`: {detail}")]
    ParseFailure { type_name: String, text: String, detail: String },
    #[error("`{text}` did not match any member of union `{type_name}`")]
    UnionNoMatch { type_name: String, text: String },
    #[error("unexpected child <{child}> under <{element}>")]
    UnexpectedChild { element: String, child: String },
    #[error("unexpected attribute `{attribute}` on <{element}>")]
    UnexpectedAttribute { element: String, attribute: String },
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Raised when the compiled content-model DFA has no transition for the
/// next child tag (or for end-of-input) from the current state.
fn dfa_error(element: &str, token: &str) -> LoadError {
    LoadError::DfaReject { element: element.to_string(), token: token.to_string(), offset: 0 }
}

/// Raised when an `xs:all` group finishes without every required member
/// having appeared.
fn all_error(element: &str, missing: &str) -> LoadError {
    LoadError::AllModelMissing { element: element.to_string(), missing: missing.to_string() }
}

/// Raised when a required attribute never appears on an element.
fn attr_error(element: &str, attribute: &str) -> LoadError {
    LoadError::MissingAttribute { element: element.to_string(), attribute: attribute.to_string() }
}
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_declares_every_spec_error_variant() {
        let src = prelude_source();
        for variant in [
            "Xml",
            "DfaReject",
            "AllModelMissing",
            "MissingAttribute",
            "Duplicate",
            "EnumNotFound",
            "ParseFailure",
            "UnionNoMatch",
            "UnexpectedChild",
            "UnexpectedAttribute",
        ] {
            assert!(src.contains(variant), "missing LoadError variant {variant}");
        }
    }

    #[test]
    fn prelude_declares_all_three_error_helpers() {
        let src = prelude_source();
        assert!(src.contains("fn dfa_error("));
        assert!(src.contains("fn all_error("));
        assert!(src.contains("fn attr_error("));
    }
}
