//! Error types for schema ingestion and schema-level rejection.
//!
//! Runtime errors emitted *into* generated code live in
//! [`crate::codegen::runtime`] instead — these are errors the generator
//! itself raises while reading or annotating a schema.

use thiserror::Error;

/// Errors raised while reading XSD source text into the oracle AST.
#[derive(Debug, Error)]
pub enum XsdParseError {
    /// The underlying XML was not well-formed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An I/O error occurred while reading the schema file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required attribute was missing on a schema construct.
    #[error("missing required attribute `{attribute}` on <{element}>")]
    MissingAttribute {
        /// The element the attribute was expected on.
        element: String,
        /// The attribute that was missing.
        attribute: String,
    },
}

/// Result type for XSD ingestion.
pub type XsdParseResult<T> = Result<T, XsdParseError>;

/// Schema-level errors: the schema asked for something this generator
/// cannot express. These are refusals, not bugs — the generator exits
/// nonzero rather than guessing.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A `<xs:restriction>` used a validator other than `enumeration`.
    #[error("unsupported restriction on simple type `{type_name}`: only `enumeration` facets are supported, found `{facet}`")]
    UnsupportedFacet {
        /// Name of the offending simple type.
        type_name: String,
        /// The facet kind that was rejected.
        facet: String,
    },

    /// A content-model group used a compositor other than
    /// `all`/`choice`/`sequence`.
    #[error("unknown content-model group kind `{kind}` on complex type `{type_name}`")]
    UnknownGroupModel {
        /// Name of the offending complex type.
        type_name: String,
        /// The compositor keyword that was rejected.
        kind: String,
    },

    /// An `<xs:attribute use="prohibited">` was encountered.
    #[error("attribute `{attribute}` on `{type_name}` uses prohibited, which is not supported")]
    ProhibitedAttribute {
        /// Name of the complex type declaring the attribute.
        type_name: String,
        /// Name of the prohibited attribute.
        attribute: String,
    },

    /// A simple type variant this generator does not know how to annotate.
    #[error("unsupported simple type variant for `{type_name}`: {detail}")]
    UnsupportedSimpleType {
        /// Name of the offending simple type.
        type_name: String,
        /// Human-readable detail.
        detail: String,
    },

    /// A reference (`type=`, `ref=`, `base=`) could not be resolved against
    /// the registry.
    #[error("unresolved reference `{reference}` (referenced from `{from}`)")]
    UnresolvedReference {
        /// The dangling reference string.
        reference: String,
        /// Where the reference was found.
        from: String,
    },

    /// Per spec: a schema with more than one top-level element declaration
    /// is outside this generator's supported root-element model.
    #[error("schema declares {count} top-level elements; only a single document root is supported")]
    MultipleRootElements {
        /// Number of top-level elements found.
        count: usize,
    },

    /// The schema declared no top-level elements at all.
    #[error("schema declares no top-level element")]
    NoRootElement,

    /// The single top-level element resolves to a simple type rather than
    /// a complex type; the generated `Document` wrapper has nowhere to
    /// hang arenas or a count/load/write trio for it.
    #[error("root element `{element}` must resolve to a complex type")]
    UnsupportedRootType {
        /// Name of the root element.
        element: String,
    },
}

/// Result type for schema annotation and emission.
pub type SchemaResult<T> = Result<T, SchemaError>;
