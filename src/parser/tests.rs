#[allow(unused)]
use pretty_assertions::{assert_eq, assert_ne};
use serde_json::json;

use crate::{
    ast::{pos_in, BooleanType, NullType, NumberType, StringType},
    reporter::Diagnostic,
};

use super::*;

fn p_document(input: &str) -> Result<Document, ReportedError> {
    p_document_with(input, ParseOptions::default())
}

fn p_document_with(input: &str, options: ParseOptions) -> Result<Document, ReportedError> {
    let mut reporter = ErrorReporter::from_text(input);
    parse_document(&mut reporter, options)
}

fn p_legacy(input: &str) -> Result<Document, ReportedError> {
    p_document_with(
        input,
        ParseOptions {
            allow_legacy_builtins: true,
        },
    )
}

fn p_error(input: &str) -> Vec<Diagnostic> {
    p_document(input).unwrap_err().diagnostics().to_vec()
}

fn field_types(doc: &Document) -> Vec<Type> {
    doc.object_types()
        .flat_map(|def| def.fields.iter().map(|field| field.type_.clone()))
        .collect()
}

fn type_ref(src: &str, name: &str, idx: usize) -> Type {
    TypeRef {
        range: pos_in(src, name, idx),
        ref_: TypeName {
            range: pos_in(src, name, idx),
            name: name.to_owned(),
        },
        as_live_object: false,
    }
    .into()
}

#[test]
fn test_parse_empty_document() {
    let src = "  \n// nothing here\n";
    assert_eq!(
        p_document(src).unwrap(),
        Document {
            range: CodeRange {
                start: 0,
                end: src.len()
            },
            definitions: vec![],
        }
    );
}

#[test]
fn test_parse_definitions() {
    let src = "type IamStatic {}\ntype Storage { x: IamStatic  y: LiveObject<IamLive> }";
    assert_eq!(
        p_document(src).unwrap(),
        Document {
            range: CodeRange {
                start: 0,
                end: src.len()
            },
            definitions: vec![
                ObjectTypeDefinition {
                    range: pos_in(src, "type IamStatic {}", 0),
                    name: TypeName {
                        range: pos_in(src, "IamStatic", 0),
                        name: "IamStatic".to_owned(),
                    },
                    fields: vec![],
                    leading_comment: None,
                }
                .into(),
                ObjectTypeDefinition {
                    range: pos_in(src, "type Storage { x: IamStatic  y: LiveObject<IamLive> }", 0),
                    name: TypeName {
                        range: pos_in(src, "Storage", 0),
                        name: "Storage".to_owned(),
                    },
                    fields: vec![
                        FieldDef {
                            range: pos_in(src, "x: IamStatic", 0),
                            name: Identifier {
                                range: pos_in(src, "x", 0),
                                name: "x".to_owned(),
                            },
                            optional: false,
                            type_: type_ref(src, "IamStatic", 1),
                            leading_comment: None,
                            trailing_comment: None,
                        },
                        FieldDef {
                            range: pos_in(src, "y: LiveObject<IamLive>", 0),
                            name: Identifier {
                                range: pos_in(src, "y", 2),
                                name: "y".to_owned(),
                            },
                            optional: false,
                            type_: TypeRef {
                                range: pos_in(src, "LiveObject<IamLive>", 0),
                                ref_: TypeName {
                                    range: pos_in(src, "IamLive", 0),
                                    name: "IamLive".to_owned(),
                                },
                                as_live_object: true,
                            }
                            .into(),
                            leading_comment: None,
                            trailing_comment: None,
                        },
                    ],
                    leading_comment: None,
                }
                .into(),
            ],
        }
    );
}

#[test]
fn test_parse_optional_fields_and_separators() {
    let src = "type Circle { cx: number, fill ? : RGB\n  stroke?: RGB }";
    let doc = p_document(src).unwrap();
    let fields = &doc.object_types().next().unwrap().fields;
    assert_eq!(
        fields
            .iter()
            .map(|field| (field.name.name.as_str(), field.optional, field.range))
            .collect::<Vec<_>>(),
        vec![
            ("cx", false, pos_in(src, "cx: number,", 0)),
            ("fill", true, pos_in(src, "fill ? : RGB", 0)),
            ("stroke", true, pos_in(src, "stroke?: RGB", 0)),
        ]
    );
}

#[test]
fn test_parse_scalar_types() {
    let src = "type A { a: boolean b: number c: string d: null }";
    assert_eq!(
        field_types(&p_document(src).unwrap()),
        vec![
            BooleanType {
                range: pos_in(src, "boolean", 0),
            }
            .into(),
            NumberType {
                range: pos_in(src, "number", 0),
            }
            .into(),
            StringType {
                range: pos_in(src, "string", 0),
            }
            .into(),
            NullType {
                range: pos_in(src, "null", 0),
            }
            .into(),
        ]
    );
}

#[test]
fn test_parse_literal_types() {
    let src = "type A { kind: \"rect\" n: -1.5 flag: true other: 'x' }";
    assert_eq!(
        field_types(&p_document(src).unwrap()),
        vec![
            StringLiteral {
                range: pos_in(src, "\"rect\"", 0),
                value: "rect".to_owned(),
            }
            .into(),
            NumberLiteral {
                range: pos_in(src, "-1.5", 0),
                value: NotNan::new(-1.5).unwrap(),
            }
            .into(),
            BooleanLiteral {
                range: pos_in(src, "true", 0),
                value: true,
            }
            .into(),
            StringLiteral {
                range: pos_in(src, "'x'", 0),
                value: "x".to_owned(),
            }
            .into(),
        ]
    );
}

#[test]
fn test_parse_container_types() {
    let src = "type A { a: RGB[][] l: LiveList<RGB> m: LiveMap<string, LiveList<B>> }";
    assert_eq!(
        field_types(&p_document(src).unwrap()),
        vec![
            ArrayType {
                range: pos_in(src, "RGB[][]", 0),
                of_type: Box::new(
                    ArrayType {
                        range: pos_in(src, "RGB[]", 0),
                        of_type: Box::new(type_ref(src, "RGB", 0)),
                    }
                    .into()
                ),
            }
            .into(),
            LiveListType {
                range: pos_in(src, "LiveList<RGB>", 0),
                of_type: Box::new(type_ref(src, "RGB", 1)),
            }
            .into(),
            LiveMapType {
                range: pos_in(src, "LiveMap<string, LiveList<B>>", 0),
                key_type: Box::new(
                    StringType {
                        range: pos_in(src, "string", 0),
                    }
                    .into()
                ),
                value_type: Box::new(
                    LiveListType {
                        range: pos_in(src, "LiveList<B>", 0),
                        of_type: Box::new(type_ref(src, "B", 2)),
                    }
                    .into()
                ),
            }
            .into(),
        ]
    );
}

#[test]
fn test_parse_union_type() {
    let src = "type Storage { shape: LiveObject<Rect> | Circle[] | null }";
    assert_eq!(
        field_types(&p_document(src).unwrap()),
        vec![UnionType {
            range: pos_in(src, "LiveObject<Rect> | Circle[] | null", 0),
            members: vec![
                TypeRef {
                    range: pos_in(src, "LiveObject<Rect>", 0),
                    ref_: TypeName {
                        range: pos_in(src, "Rect", 0),
                        name: "Rect".to_owned(),
                    },
                    as_live_object: true,
                }
                .into(),
                ArrayType {
                    range: pos_in(src, "Circle[]", 0),
                    of_type: Box::new(type_ref(src, "Circle", 0)),
                }
                .into(),
                NullType {
                    range: pos_in(src, "null", 0),
                }
                .into(),
            ],
        }
        .into()]
    );
}

#[test]
fn test_parse_type_as_field_name() {
    let src = "type Rect { type: \"rect\" }";
    let doc = p_document(src).unwrap();
    let field = &doc.object_types().next().unwrap().fields[0];
    assert_eq!(field.name.name, "type");
    assert_eq!(field.name.range, pos_in(src, "type", 1));
}

#[test]
fn test_parse_comments() {
    let src = "\
// union Shape = Rect | Circle

// The root
// of everything
type Storage { // not attached
  // first line
  # second line
  a: A  # trailing a
  b: B, // trailing b

  // detached

  c: C
}
";
    let doc = p_document(src).unwrap();
    let def = doc.object_types().next().unwrap();
    assert_eq!(
        def.leading_comment.as_deref(),
        Some("The root\nof everything")
    );
    assert_eq!(
        def.fields
            .iter()
            .map(|field| (
                field.name.name.as_str(),
                field.leading_comment.as_deref(),
                field.trailing_comment.as_deref(),
            ))
            .collect::<Vec<_>>(),
        vec![
            ("a", Some("first line\nsecond line"), Some("trailing a")),
            ("b", None, Some("trailing b")),
            ("c", None, None),
        ]
    );
}

#[test]
fn test_parse_leading_comment_at_start() {
    let src = "# hello\ntype A {}\ntype B {} // trailing\ntype C {}";
    let doc = p_document(src).unwrap();
    assert_eq!(
        doc.object_types()
            .map(|def| def.leading_comment.as_deref())
            .collect::<Vec<_>>(),
        vec![Some("hello"), None, None]
    );
}

#[test]
fn test_parse_legacy_builtins() {
    let src = "type RGB { r: Int, g: FLOAT, b: Number, s: String, n: nULL, t: Boolean }";
    assert_eq!(
        field_types(&p_legacy(src).unwrap()),
        vec![
            NumberType {
                range: pos_in(src, "Int", 0),
            }
            .into(),
            NumberType {
                range: pos_in(src, "FLOAT", 0),
            }
            .into(),
            NumberType {
                range: pos_in(src, "Number", 0),
            }
            .into(),
            StringType {
                range: pos_in(src, "String", 0),
            }
            .into(),
            NullType {
                range: pos_in(src, "nULL", 0),
            }
            .into(),
            BooleanType {
                range: pos_in(src, "Boolean", 0),
            }
            .into(),
        ]
    );
}

#[test]
fn test_parse_legacy_builtins_rejected_by_default() {
    let src = "type RGB { r: Int }";
    assert_eq!(
        p_error(src),
        vec![Diagnostic {
            range: pos_in(src, "Int", 0),
            message: "legacy built-in type `Int` is not supported, use `number` instead"
                .to_owned(),
        }]
    );
}

#[test]
fn test_parse_legacy_names_allowed_as_definition_names() {
    let src = "type Int {}\ntype PrefixString { s: PrefixString }";
    let doc = p_document(src).unwrap();
    assert_eq!(
        doc.object_types()
            .map(|def| def.name.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Int", "PrefixString"]
    );
    assert_eq!(field_types(&doc), vec![type_ref(src, "PrefixString", 1)]);
}

#[test]
fn test_parse_error_unexpected_token() {
    let src = "type A { x B }";
    assert_eq!(
        p_error(src),
        vec![Diagnostic {
            range: pos_in(src, "B", 0),
            message: "unexpected `B`, expected `:` after the field name".to_owned(),
        }]
    );
}

#[test]
fn test_parse_error_stops_at_first_problem() {
    let src = "type A { x: }\ntype { }";
    assert_eq!(
        p_error(src),
        vec![Diagnostic {
            range: pos_in(src, "}", 0),
            message: "unexpected `}`, expected a type".to_owned(),
        }]
    );
}

#[test]
fn test_parse_error_unexpected_eof() {
    let src = "type A { x: LiveList<B";
    assert_eq!(
        p_error(src),
        vec![Diagnostic {
            range: CodeRange::empty_at(src.len()),
            message: "unexpected end of input, expected `>`".to_owned(),
        }]
    );
}

#[test]
fn test_parse_error_not_a_definition() {
    let src = "union Shape = A | B";
    assert_eq!(
        p_error(src),
        vec![Diagnostic {
            range: pos_in(src, "union", 0),
            message: "unexpected `union`, expected a type definition".to_owned(),
        }]
    );
}

#[test]
fn test_parse_error_invalid_character() {
    let src = "type A { x: B; }";
    assert_eq!(
        p_error(src),
        vec![Diagnostic {
            range: pos_in(src, ";", 0),
            message: "unexpected character `;`".to_owned(),
        }]
    );
}

#[test]
fn test_parse_error_unterminated_string() {
    let src = "type A { x: \"rect\n}";
    assert_eq!(
        p_error(src),
        vec![Diagnostic {
            range: pos_in(src, "\"rect", 0),
            message: "unterminated string literal".to_owned(),
        }]
    );
}

#[test]
fn test_parse_error_live_object_of_scalar() {
    let src = "type Storage { x: LiveObject<string> }";
    assert_eq!(
        p_error(src),
        vec![Diagnostic {
            range: pos_in(src, "string", 0),
            message: "`LiveObject` expects the name of an object type, e.g. `LiveObject<Foo>`"
                .to_owned(),
        }]
    );
}

#[test]
fn test_parse_error_message_has_position() {
    let src = "type A {\n  x: 1.2.3\n}";
    let err = p_document(src).unwrap_err();
    assert_eq!(
        err.to_string(),
        "error:2:9: unexpected character `.`\n    x: 1.2.3\n          ^"
    );
}

#[test]
fn test_serialize_document() {
    let src = "type Storage {\n  // the list\n  items?: LiveList<Item> # live\n}\ntype Item { kind: \"a\" | 2 }";
    let doc = p_document(src).unwrap();
    assert_eq!(
        serde_json::to_value(&doc).unwrap(),
        json!({
            "_kind": "Document",
            "definitions": [
                {
                    "_kind": "ObjectTypeDefinition",
                    "name": { "_kind": "TypeName", "name": "Storage" },
                    "leadingComment": null,
                    "fields": [
                        {
                            "_kind": "FieldDef",
                            "name": { "_kind": "Identifier", "name": "items" },
                            "optional": true,
                            "type": {
                                "_kind": "LiveListType",
                                "ofType": {
                                    "_kind": "TypeRef",
                                    "ref": { "_kind": "TypeName", "name": "Item" },
                                    "asLiveObject": false,
                                },
                            },
                            "leadingComment": "the list",
                            "trailingComment": "live",
                        },
                    ],
                },
                {
                    "_kind": "ObjectTypeDefinition",
                    "name": { "_kind": "TypeName", "name": "Item" },
                    "leadingComment": null,
                    "fields": [
                        {
                            "_kind": "FieldDef",
                            "name": { "_kind": "Identifier", "name": "kind" },
                            "optional": false,
                            "type": {
                                "_kind": "UnionType",
                                "members": [
                                    { "_kind": "StringLiteral", "value": "a" },
                                    { "_kind": "NumberLiteral", "value": 2.0 },
                                ],
                            },
                            "leadingComment": null,
                            "trailingComment": null,
                        },
                    ],
                },
            ],
        })
    );
}
