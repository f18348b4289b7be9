pub mod ast;
mod checker;
mod parser;
mod reporter;
mod suggest;

pub use checker::{check, CheckedDefinition, CheckedDocument, ROOT_TYPE_NAME};
pub use parser::{parse_document, ParseOptions};
pub use reporter::{Diagnostic, ErrorReporter, ReportedError};
