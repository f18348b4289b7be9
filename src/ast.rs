#[macro_use]
mod macros;

mod document;
mod pos;
mod types;

pub use document::{Definition, Document, FieldDef, Identifier, ObjectTypeDefinition, TypeName};
pub use pos::{pos_in, CodeRange, PositionIndex, DUMMY_RANGE};
pub use types::{
    ArrayType, BooleanLiteral, BooleanType, LiveListType, LiveMapType, NullType, NumberLiteral,
    NumberType, ScalarKind, StringLiteral, StringType, Type, TypeRef, UnionType,
    RESERVED_TYPE_NAMES,
};
