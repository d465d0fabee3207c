//! End-to-end check that a schema combining several constructs at once
//! (enumeration, union, `xs:all`, a repeated complex child, simple
//! content) produces source text with every component's output present
//! and internally consistent.

use xsdgen::xsd::parse_xsd_str;

const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="score" type="Score"/>

    <xs:simpleType name="stemDirection">
        <xs:restriction base="xs:string">
            <xs:enumeration value="up"/>
            <xs:enumeration value="down"/>
        </xs:restriction>
    </xs:simpleType>

    <xs:simpleType name="durationOrStem">
        <xs:union memberTypes="xs:int stemDirection"/>
    </xs:simpleType>

    <xs:complexType name="Pitch">
        <xs:all>
            <xs:element name="step" type="xs:string"/>
            <xs:element name="octave" type="xs:int"/>
        </xs:all>
    </xs:complexType>

    <xs:complexType name="Note">
        <xs:sequence>
            <xs:element name="pitch" type="Pitch"/>
            <xs:element name="lyric" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
        </xs:sequence>
        <xs:attribute name="dur" type="durationOrStem"/>
        <xs:attribute name="voice" type="xs:int" default="1"/>
    </xs:complexType>

    <xs:complexType name="Score">
        <xs:sequence>
            <xs:element name="note" type="Note" maxOccurs="unbounded"/>
        </xs:sequence>
    </xs:complexType>
</xs:schema>"#;

#[test]
fn generates_a_complete_module_for_a_mixed_construct_schema() {
    let schema = parse_xsd_str(SCHEMA).expect("schema parses");
    let out = xsdgen::generate(&schema, "test_score").expect("generation succeeds");

    assert!(out.contains("pub mod test_score {"));

    // Struct/enum emitter (E)
    assert!(out.contains("pub struct TNote {"));
    assert!(out.contains("pub enum TStemDirection {"));
    assert!(out.contains("pub enum TDurationOrStem {"));
    assert!(out.contains("pub note_start: u32,"));
    assert!(out.contains("pub note_len: u32,"));
    assert!(out.contains("pub lyric: Vec<String>,"));
    // `voice` has a default, so it is not wrapped in Option despite not
    // being `use="required"`.
    assert!(out.contains("pub voice: i32,"));

    // Lexer tables (F)
    assert!(out.contains("phf::phf_map!"));

    // Validate/count (G)
    assert!(out.contains("fn count_score("));
    assert!(out.contains("fn count_note("));
    assert!(out.contains("fn count_pitch("));

    // Load (H)
    assert!(out.contains("fn load_score("));
    assert!(out.contains("fn load_union_duration_or_stem("));
    assert!(out.contains("struct Arenas {"));

    // Write (I)
    assert!(out.contains("fn write_score("));
    assert!(out.contains("fn enum_text_stem_direction("));
    assert!(out.contains("fn union_text_duration_or_stem("));

    // Driver (J)
    assert!(out.contains("pub struct Document {"));
    assert!(out.contains("pub fn parse(xml: &str) -> LoadResult<Document> {"));
    assert!(out.contains("pub fn write_to(&self, out: &mut impl std::io::Write) -> quick_xml::Result<()> {"));
}

#[test]
fn generate_from_path_reads_and_names_the_module_from_the_file_stem() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("xsdgen-test-{}.xsd", std::process::id()));
    std::fs::write(
        &path,
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="root" type="Root"/>
            <xs:complexType name="Root">
                <xs:attribute name="id" type="xs:int" use="required"/>
            </xs:complexType>
        </xs:schema>"#,
    )
    .unwrap();

    let out = xsdgen::generate_from_path(&path).expect("generation succeeds");
    std::fs::remove_file(&path).ok();

    let namespace = format!("xsdgen_test_{}", std::process::id());
    assert!(out.contains(&format!("pub mod {namespace} {{")));
}
