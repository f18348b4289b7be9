use serde::Serialize;

use crate::ast::{CodeRange, Type};

/// A whole schema file: its definitions in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct Document {
    #[serde(skip)]
    pub range: CodeRange,

    pub definitions: Vec<Definition>,
}

impl Document {
    pub fn object_types(&self) -> impl Iterator<Item = &ObjectTypeDefinition> {
        self.definitions.iter().map(|def| match def {
            Definition::ObjectType(def) => def,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Definition {
    ObjectType(ObjectTypeDefinition),
}

impl_from!((Definition, ObjectTypeDefinition, Definition::ObjectType),);

/// `type Name { ... }`
///
/// Whether the definition is static is not stored here; the checker keeps it
/// in a side table so that one document can be checked any number of times.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind", rename_all = "camelCase")]
pub struct ObjectTypeDefinition {
    #[serde(skip)]
    pub range: CodeRange,

    pub name: TypeName,
    pub fields: Vec<FieldDef>,
    pub leading_comment: Option<String>,
}

/// `name?: Type`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind", rename_all = "camelCase")]
pub struct FieldDef {
    #[serde(skip)]
    pub range: CodeRange,

    pub name: Identifier,
    pub optional: bool,
    #[serde(rename = "type")]
    pub type_: Type,
    pub leading_comment: Option<String>,
    pub trailing_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct TypeName {
    #[serde(skip)]
    pub range: CodeRange,

    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "_kind")]
pub struct Identifier {
    #[serde(skip)]
    pub range: CodeRange,

    pub name: String,
}
