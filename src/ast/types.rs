use ordered_float::NotNan;
use serde::Serialize;

use crate::ast::{CodeRange, TypeName};

/// A type expression as written on the right-hand side of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Type {
    Boolean(BooleanType),
    Number(NumberType),
    String(StringType),
    Null(NullType),
    StringLiteral(StringLiteral),
    NumberLiteral(NumberLiteral),
    BooleanLiteral(BooleanLiteral),
    Ref(TypeRef),
    Array(ArrayType),
    LiveList(LiveListType),
    LiveMap(LiveMapType),
    Union(UnionType),
}

impl_from!(
    (Type, BooleanType, Type::Boolean),
    (Type, NumberType, Type::Number),
    (Type, StringType, Type::String),
    (Type, NullType, Type::Null),
    (Type, StringLiteral, Type::StringLiteral),
    (Type, NumberLiteral, Type::NumberLiteral),
    (Type, BooleanLiteral, Type::BooleanLiteral),
    (Type, TypeRef, Type::Ref),
    (Type, ArrayType, Type::Array),
    (Type, LiveListType, Type::LiveList),
    (Type, LiveMapType, Type::LiveMap),
    (Type, UnionType, Type::Union),
);

impl_delegators!(
    enum Type {
        Boolean(BooleanType),
        Number(NumberType),
        String(StringType),
        Null(NullType),
        StringLiteral(StringLiteral),
        NumberLiteral(NumberLiteral),
        BooleanLiteral(BooleanLiteral),
        Ref(TypeRef),
        Array(ArrayType),
        LiveList(LiveListType),
        LiveMap(LiveMapType),
        Union(UnionType),
    }
    range: CodeRange,
);

impl Type {
    pub fn scalar(kind: ScalarKind, range: CodeRange) -> Self {
        match kind {
            ScalarKind::Boolean => BooleanType { range }.into(),
            ScalarKind::Number => NumberType { range }.into(),
            ScalarKind::String => StringType { range }.into(),
            ScalarKind::Null => NullType { range }.into(),
        }
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Type::Boolean(_) => Some(ScalarKind::Boolean),
            Type::Number(_) => Some(ScalarKind::Number),
            Type::String(_) => Some(ScalarKind::String),
            Type::Null(_) => Some(ScalarKind::Null),
            Type::StringLiteral(_)
            | Type::NumberLiteral(_)
            | Type::BooleanLiteral(_)
            | Type::Ref(_)
            | Type::Array(_)
            | Type::LiveList(_)
            | Type::LiveMap(_)
            | Type::Union(_) => None,
        }
    }
}

/// The built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Boolean,
    Number,
    String,
    Null,
}

/// Lowercase spellings that can never be used as a definition name.
pub const RESERVED_TYPE_NAMES: [&str; 6] = ["boolean", "float", "int", "null", "number", "string"];

impl ScalarKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ScalarKind::Boolean => "boolean",
            ScalarKind::Number => "number",
            ScalarKind::String => "string",
            ScalarKind::Null => "null",
        }
    }

    /// Recognizes the canonical lowercase keywords only.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "boolean" => Some(ScalarKind::Boolean),
            "number" => Some(ScalarKind::Number),
            "string" => Some(ScalarKind::String),
            "null" => Some(ScalarKind::Null),
            _ => None,
        }
    }

    /// Recognizes the historical keyword set in any letter casing, e.g. `Int`,
    /// `FLOAT` or `nULL`. `int` and `float` both collapse into `number`.
    pub fn from_legacy_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" => Some(ScalarKind::Boolean),
            "int" | "float" | "number" => Some(ScalarKind::Number),
            "string" => Some(ScalarKind::String),
            "null" => Some(ScalarKind::Null),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct BooleanType {
    #[serde(skip)]
    pub range: CodeRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct NumberType {
    #[serde(skip)]
    pub range: CodeRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct StringType {
    #[serde(skip)]
    pub range: CodeRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct NullType {
    #[serde(skip)]
    pub range: CodeRange,
}

/// `"rect"` etc.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct StringLiteral {
    #[serde(skip)]
    pub range: CodeRange,

    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct NumberLiteral {
    #[serde(skip)]
    pub range: CodeRange,

    pub value: NotNan<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct BooleanLiteral {
    #[serde(skip)]
    pub range: CodeRange,

    pub value: bool,
}

/// A reference to a definition by name: `Foo` or `LiveObject<Foo>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind", rename_all = "camelCase")]
pub struct TypeRef {
    #[serde(skip)]
    pub range: CodeRange,

    #[serde(rename = "ref")]
    pub ref_: TypeName,
    pub as_live_object: bool,
}

/// `T[]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind", rename_all = "camelCase")]
pub struct ArrayType {
    #[serde(skip)]
    pub range: CodeRange,

    pub of_type: Box<Type>,
}

/// `LiveList<T>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind", rename_all = "camelCase")]
pub struct LiveListType {
    #[serde(skip)]
    pub range: CodeRange,

    pub of_type: Box<Type>,
}

/// `LiveMap<K, V>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind", rename_all = "camelCase")]
pub struct LiveMapType {
    #[serde(skip)]
    pub range: CodeRange,

    pub key_type: Box<Type>,
    pub value_type: Box<Type>,
}

/// `A | B | null`; always has two or more members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct UnionType {
    #[serde(skip)]
    pub range: CodeRange,

    pub members: Vec<Type>,
}
