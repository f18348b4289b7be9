mod lexer;

use log::{debug, trace};
use ordered_float::NotNan;

use crate::{
    ast::{
        ArrayType, BooleanLiteral, CodeRange, Document, FieldDef, Identifier, LiveListType,
        LiveMapType, NumberLiteral, ObjectTypeDefinition, ScalarKind, StringLiteral, Type,
        TypeName, TypeRef, UnionType,
    },
    reporter::{ErrorReporter, ReportedError},
};
use lexer::{comment_text, string_value, Lexer, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParseOptions {
    /// Accept the historical capitalized scalar keywords (`Int`, `Float`,
    /// `String`, ...) as type expressions, mapping them onto the modern
    /// scalar types.
    pub allow_legacy_builtins: bool,
}

/// Parses the reporter's source text into a [`Document`].
///
/// Parsing stops at the first syntax error, which is returned as a
/// [`ReportedError`] holding that single diagnostic.
pub fn parse_document(
    reporter: &mut ErrorReporter,
    options: ParseOptions,
) -> Result<Document, ReportedError> {
    let text = reporter.shared_text();
    let mut parser = Parser::new(&text, reporter, options);
    let document = parser.parse_whole_document()?;
    debug!(
        "parsed {} definition(s) from {} byte(s)",
        document.definitions.len(),
        text.len()
    );
    Ok(document)
}

#[derive(Debug)]
struct Parser<'a, 'r> {
    lexer: Lexer<'a>,
    reporter: &'r mut ErrorReporter,
    options: ParseOptions,
    next_token: Option<Token>,
    /// Comments and newlines between the last bumped token and `next_token`.
    trivia: Vec<Token>,
    bumped_any: bool,
}

impl<'a, 'r> Parser<'a, 'r> {
    fn new(input: &'a str, reporter: &'r mut ErrorReporter, options: ParseOptions) -> Self {
        Self {
            lexer: Lexer::new(input),
            reporter,
            options,
            next_token: None,
            trivia: Vec::new(),
            bumped_any: false,
        }
    }

    fn parse_whole_document(&mut self) -> Result<Document, ReportedError> {
        let mut definitions = Vec::new();
        loop {
            let token = self.fill_token();
            match token.kind {
                TokenKind::EOF => break,
                TokenKind::Identifier if self.select(token.range) == "type" => {
                    definitions.push(self.parse_definition()?.into());
                }
                _ => return self.unexpected(token, "expected a type definition"),
            }
        }
        Ok(Document {
            range: CodeRange {
                start: 0,
                end: self.lexer.input().len(),
            },
            definitions,
        })
    }

    fn parse_definition(&mut self) -> Result<ObjectTypeDefinition, ReportedError> {
        let leading_comment = self.leading_comment();
        let keyword = self.bump();
        let name_token = self.expect(TokenKind::Identifier, "expected a type name")?;
        let name = TypeName {
            range: name_token.range,
            name: self.select(name_token.range).to_owned(),
        };
        self.expect(TokenKind::LBrace, "expected `{`")?;
        let mut fields = Vec::new();
        let close = loop {
            let token = self.fill_token();
            match token.kind {
                TokenKind::RBrace => break self.bump(),
                TokenKind::Identifier => fields.push(self.parse_field()?),
                _ => return self.unexpected(token, "expected a field name or `}`"),
            }
        };
        trace!("parsed definition {} with {} field(s)", name.name, fields.len());
        Ok(ObjectTypeDefinition {
            range: keyword.range | close.range,
            name,
            fields,
            leading_comment,
        })
    }

    fn parse_field(&mut self) -> Result<FieldDef, ReportedError> {
        let leading_comment = self.leading_comment();
        let name_token = self.bump();
        let name = Identifier {
            range: name_token.range,
            name: self.select(name_token.range).to_owned(),
        };
        let optional = if self.fill_token().kind == TokenKind::Question {
            self.bump();
            true
        } else {
            false
        };
        self.expect(TokenKind::Colon, "expected `:` after the field name")?;
        let type_ = self.parse_type()?;
        let mut range = name.range | *type_.range();
        let token = self.fill_token();
        if token.kind == TokenKind::Comma {
            self.bump();
            range |= token.range;
        }
        let trailing_comment = self.trailing_comment();
        Ok(FieldDef {
            range,
            name,
            optional,
            type_,
            leading_comment,
            trailing_comment,
        })
    }

    fn parse_type(&mut self) -> Result<Type, ReportedError> {
        let first = self.parse_non_union_type()?;
        if self.fill_token().kind != TokenKind::Vert {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.fill_token().kind == TokenKind::Vert {
            self.bump();
            members.push(self.parse_non_union_type()?);
        }
        let range = members
            .iter()
            .fold(*members[0].range(), |range, member| range | *member.range());
        Ok(UnionType { range, members }.into())
    }

    fn parse_non_union_type(&mut self) -> Result<Type, ReportedError> {
        let mut type_ = self.parse_primary_type()?;
        while self.fill_token().kind == TokenKind::LBracket {
            self.bump();
            let close = self.expect(TokenKind::RBracket, "expected `]`")?;
            type_ = ArrayType {
                range: *type_.range() | close.range,
                of_type: Box::new(type_),
            }
            .into();
        }
        Ok(type_)
    }

    fn parse_primary_type(&mut self) -> Result<Type, ReportedError> {
        let token = self.fill_token();
        match token.kind {
            TokenKind::String => {
                self.bump();
                Ok(StringLiteral {
                    range: token.range,
                    value: string_value(self.select(token.range)),
                }
                .into())
            }
            TokenKind::Number => {
                self.bump();
                let value = self
                    .select(token.range)
                    .parse::<f64>()
                    .ok()
                    .and_then(|value| NotNan::new(value).ok());
                match value {
                    Some(value) => Ok(NumberLiteral {
                        range: token.range,
                        value,
                    }
                    .into()),
                    None => self.error(token.range, "invalid number literal"),
                }
            }
            TokenKind::Identifier => {
                self.bump();
                let s = self.select(token.range);
                match s {
                    "true" | "false" => Ok(BooleanLiteral {
                        range: token.range,
                        value: s == "true",
                    }
                    .into()),
                    "LiveObject" => self.parse_live_object(token),
                    "LiveList" => {
                        self.expect(TokenKind::Lt, "expected `<` after `LiveList`")?;
                        let of_type = self.parse_type()?;
                        let close = self.expect(TokenKind::Gt, "expected `>`")?;
                        Ok(LiveListType {
                            range: token.range | close.range,
                            of_type: Box::new(of_type),
                        }
                        .into())
                    }
                    "LiveMap" => {
                        self.expect(TokenKind::Lt, "expected `<` after `LiveMap`")?;
                        let key_type = self.parse_type()?;
                        self.expect(TokenKind::Comma, "expected `,` between key and value types")?;
                        let value_type = self.parse_type()?;
                        let close = self.expect(TokenKind::Gt, "expected `>`")?;
                        Ok(LiveMapType {
                            range: token.range | close.range,
                            key_type: Box::new(key_type),
                            value_type: Box::new(value_type),
                        }
                        .into())
                    }
                    _ => self.parse_named_type(token),
                }
            }
            _ => self.unexpected(token, "expected a type"),
        }
    }

    /// A bare name: a scalar keyword, a legacy keyword, or a reference.
    fn parse_named_type(&mut self, token: Token) -> Result<Type, ReportedError> {
        let s = self.select(token.range);
        if let Some(kind) = ScalarKind::from_keyword(s) {
            return Ok(Type::scalar(kind, token.range));
        }
        if let Some(kind) = ScalarKind::from_legacy_keyword(s) {
            if self.options.allow_legacy_builtins {
                trace!("legacy built-in {} read as {}", s, kind.keyword());
                return Ok(Type::scalar(kind, token.range));
            }
            return self.error(
                token.range,
                format!(
                    "legacy built-in type `{}` is not supported, use `{}` instead",
                    s,
                    kind.keyword()
                ),
            );
        }
        Ok(TypeRef {
            range: token.range,
            ref_: TypeName {
                range: token.range,
                name: s.to_owned(),
            },
            as_live_object: false,
        }
        .into())
    }

    fn parse_live_object(&mut self, keyword: Token) -> Result<Type, ReportedError> {
        self.expect(TokenKind::Lt, "expected `<` after `LiveObject`")?;
        let token = self.fill_token();
        let is_type_name = token.kind == TokenKind::Identifier && {
            let s = self.select(token.range);
            ScalarKind::from_legacy_keyword(s).is_none()
                && !matches!(s, "true" | "false" | "LiveObject" | "LiveList" | "LiveMap")
        };
        if !is_type_name {
            return self.error(
                token.range,
                "`LiveObject` expects the name of an object type, e.g. `LiveObject<Foo>`",
            );
        }
        self.bump();
        let close = self.expect(TokenKind::Gt, "expected `>`")?;
        Ok(TypeRef {
            range: keyword.range | close.range,
            ref_: TypeName {
                range: token.range,
                name: self.select(token.range).to_owned(),
            },
            as_live_object: true,
        }
        .into())
    }

    /// Whole-line comments directly above the upcoming token, with no blank
    /// line in between.
    fn leading_comment(&self) -> Option<String> {
        let trivia = &self.trivia;
        let mut lines = Vec::new();
        let mut i = trivia.len();
        while i >= 2
            && trivia[i - 1].kind == TokenKind::Newline
            && trivia[i - 2].kind == TokenKind::Comment
        {
            let own_line = if i == 2 {
                !self.bumped_any
            } else {
                trivia[i - 3].kind == TokenKind::Newline
            };
            if !own_line {
                break;
            }
            lines.push(comment_text(self.select(trivia[i - 2].range)));
            i -= 2;
        }
        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        Some(lines.join("\n"))
    }

    /// A comment on the same line as the last bumped token.
    fn trailing_comment(&mut self) -> Option<String> {
        self.fill_token();
        match self.trivia.first() {
            Some(token) if token.kind == TokenKind::Comment => {
                Some(comment_text(self.select(token.range)).to_owned())
            }
            _ => None,
        }
    }

    fn expect(&mut self, kind: TokenKind, expectation: &str) -> Result<Token, ReportedError> {
        let token = self.fill_token();
        if token.kind == kind {
            Ok(self.bump())
        } else {
            self.unexpected(token, expectation)
        }
    }

    fn unexpected<T>(&mut self, token: Token, expectation: &str) -> Result<T, ReportedError> {
        let message = match token.kind {
            TokenKind::EOF => format!("unexpected end of input, {}", expectation),
            TokenKind::Invalid => format!("unexpected character `{}`", self.select(token.range)),
            TokenKind::UnterminatedString => "unterminated string literal".to_owned(),
            _ => format!(
                "unexpected `{}`, {}",
                self.select(token.range),
                expectation
            ),
        };
        self.error(token.range, message)
    }

    fn error<T>(
        &mut self,
        range: CodeRange,
        message: impl Into<String>,
    ) -> Result<T, ReportedError> {
        self.reporter.report(range, message);
        Err(self.reporter.raise())
    }

    fn fill_token(&mut self) -> Token {
        if let Some(token) = self.next_token {
            return token;
        }
        loop {
            let token = self.lexer.lex();
            if token.kind.is_trivia() {
                self.trivia.push(token);
                continue;
            }
            self.next_token = Some(token);
            return token;
        }
    }

    fn bump(&mut self) -> Token {
        if let Some(token) = self.next_token.take() {
            self.trivia.clear();
            self.bumped_any = true;
            token
        } else {
            panic!("bump: no token to bump");
        }
    }

    fn select(&self, range: CodeRange) -> &'a str {
        &self.lexer.input()[range.range()]
    }
}

#[cfg(test)]
mod tests;
