//! Java declaration scanner.
//!
//! Extracts what the documentation engine needs from a `.java` file:
//! - `package` name
//! - class / interface / enum / record / `@interface` declarations, nested
//! - method names, parameter names and parameter types as written
//! - enum constants
//! - `/** ... */` comments attached to each of the above
//!
//! Method bodies, initializers and field values are skipped by brace
//! matching; nothing is resolved.

use refdoc_graph::syntax::{
    DeclKind, DocComment, EnumConstant, MethodDecl, ParamDecl, SourceUnit, SyntaxType, TypeDecl,
};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

// -- Doc comment patterns -----------------------------------------------------

static RE_INLINE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{@(code|link|linkplain|literal|value)\s+").unwrap()
});

static RE_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</?p\s*/?>").unwrap());

static RE_PARAM_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@param\s+<?(\w+)>?\s*(.*)$").unwrap());

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "default",
    "synchronized",
    "native",
    "transient",
    "volatile",
    "strictfp",
    "sealed",
];

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: unterminated {what}")]
    Unterminated { line: usize, what: &'static str },

    #[error("line {line}: expected {expected}, found `{found}`")]
    Unexpected {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("line {line}: unexpected end of file, expected {expected}")]
    UnexpectedEof { line: usize, expected: &'static str },
}

// -- Tokens -------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Punct(char),
    /// Raw text between `/**` and `*/`.
    Doc(String),
    /// String, text block, char or number literal.
    Literal,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Ident(s) => write!(f, "{}", s),
            Tok::Punct(c) => write!(f, "{}", c),
            Tok::Doc(_) => write!(f, "/** */"),
            Tok::Literal => write!(f, "literal"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    let at = |i: usize| chars.get(i).copied();

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if at(i + 1) == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if at(i + 1) == Some('*') => {
                let start = line;
                let is_doc = at(i + 2) == Some('*') && at(i + 3) != Some('/');
                let body = i + 2;
                let mut end = body;
                loop {
                    match at(end) {
                        None => {
                            return Err(ParseError::Unterminated {
                                line: start,
                                what: "comment",
                            })
                        }
                        Some('*') if at(end + 1) == Some('/') => break,
                        Some('\n') => line += 1,
                        _ => {}
                    }
                    end += 1;
                }
                if is_doc {
                    let text: String = chars[body + 1..end].iter().collect();
                    tokens.push(Token {
                        tok: Tok::Doc(text),
                        line: start,
                    });
                }
                i = end + 2;
            }
            '"' if at(i + 1) == Some('"') && at(i + 2) == Some('"') => {
                let start = line;
                i += 3;
                loop {
                    match at(i) {
                        None => {
                            return Err(ParseError::Unterminated {
                                line: start,
                                what: "text block",
                            })
                        }
                        Some('\\') => i += 1,
                        Some('"') if at(i + 1) == Some('"') && at(i + 2) == Some('"') => break,
                        Some('\n') => line += 1,
                        _ => {}
                    }
                    i += 1;
                }
                i += 3;
                tokens.push(Token {
                    tok: Tok::Literal,
                    line: start,
                });
            }
            '"' | '\'' => {
                let quote = c;
                i += 1;
                loop {
                    match at(i) {
                        None | Some('\n') => {
                            return Err(ParseError::Unterminated {
                                line,
                                what: if quote == '"' { "string" } else { "char literal" },
                            })
                        }
                        Some('\\') => i += 2,
                        Some(q) if q == quote => break,
                        _ => i += 1,
                    }
                }
                i += 1;
                tokens.push(Token {
                    tok: Tok::Literal,
                    line,
                });
            }
            c if c.is_ascii_digit() => {
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || matches!(chars[i], '_' | '.')) {
                    i += 1;
                }
                tokens.push(Token {
                    tok: Tok::Literal,
                    line,
                });
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '$')) {
                    i += 1;
                }
                tokens.push(Token {
                    tok: Tok::Ident(chars[start..i].iter().collect()),
                    line,
                });
            }
            c => {
                tokens.push(Token {
                    tok: Tok::Punct(c),
                    line,
                });
                i += 1;
            }
        }
    }
    Ok(tokens)
}

// -- Doc comments -------------------------------------------------------------

/// Split a raw `/** */` body into description and `@param` tags.
///
/// Leading `*` gutters are stripped. Inline `{@code X}` tags become
/// `` `X` ``, `{@link X label}` becomes its label (or `` `X` `` without
/// one); `<p>` starts a new paragraph.
pub fn parse_doc(raw: &str) -> DocComment {
    let mut description = String::new();
    let mut params: Vec<(String, String)> = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut in_tags = false;

    for line in raw.lines() {
        let line = line.trim_start();
        let line = match line.strip_prefix('*') {
            Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
            None => line,
        };
        let trimmed = line.trim();
        if trimmed.starts_with('@') {
            params.extend(current.take());
            in_tags = true;
            if let Some(caps) = RE_PARAM_TAG.captures(trimmed) {
                current = Some((caps[1].to_string(), caps[2].to_string()));
            }
            continue;
        }
        if in_tags {
            if let Some((_, text)) = &mut current {
                text.push('\n');
                text.push_str(line);
            }
            continue;
        }
        description.push_str(line);
        description.push('\n');
    }
    params.extend(current);

    DocComment {
        description: clean(&description),
        params: params
            .into_iter()
            .map(|(name, text)| (name, clean(&text)))
            .collect(),
    }
}

fn clean(text: &str) -> String {
    let text = inline_tags(text);
    RE_PARAGRAPH.replace_all(&text, "\n\n").into_owned()
}

/// Replace inline tags; the tag body may hold balanced braces.
fn inline_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(caps) = RE_INLINE_TAG.captures(rest) {
        let (Some(open), Some(tag)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let body = &rest[open.end()..];
        let Some(close) = closing_brace(body) else {
            break;
        };
        out.push_str(&rest[..open.start()]);
        out.push_str(&render_tag(tag.as_str(), body[..close].trim()));
        rest = &body[close + 1..];
    }
    out.push_str(rest);
    out
}

fn closing_brace(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn render_tag(tag: &str, content: &str) -> String {
    match tag {
        "link" | "linkplain" => {
            let (target, label) = split_link(content);
            match label {
                Some(label) => label.to_string(),
                None => format!("`{}`", target.trim_start_matches('#').replace('#', ".")),
            }
        }
        _ => format!("`{}`", content),
    }
}

/// `Type#member(A, B) label` splits after the closing parenthesis,
/// anything else at the first whitespace.
fn split_link(content: &str) -> (&str, Option<&str>) {
    let signature_end = content
        .find('(')
        .filter(|&open| !content[..open].contains(char::is_whitespace))
        .map(|open| content[open..].find(')').map_or(content.len(), |close| open + close + 1));
    let end = signature_end
        .or_else(|| content.find(char::is_whitespace))
        .unwrap_or(content.len());
    let (target, label) = content.split_at(end);
    let label = label.trim();
    (target, (!label.is_empty()).then_some(label))
}

// -- Declarations -------------------------------------------------------------

/// Parse one compilation unit.
pub fn parse(input: &str) -> Result<SourceUnit, ParseError> {
    let tokens = tokenize(input)?;
    Parser { tokens, pos: 0 }.unit()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + n).map(|t| &t.tok)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|t| t.tok.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn is_punct(&self, c: char) -> bool {
        self.peek() == Some(&Tok::Punct(c))
    }

    fn is_ident(&self, s: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(i)) if i == s)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(tok) => ParseError::Unexpected {
                line: self.line(),
                expected,
                found: tok.to_string(),
            },
            None => ParseError::UnexpectedEof {
                line: self.line(),
                expected,
            },
        }
    }

    fn expect_punct(&mut self, c: char, expected: &'static str) -> Result<(), ParseError> {
        if self.is_punct(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Tok::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn take_doc(&mut self) -> Option<DocComment> {
        match self.bump() {
            Some(Tok::Doc(raw)) => Some(parse_doc(&raw)),
            _ => None,
        }
    }

    /// Skip a bracketed region starting at the current `open` token.
    fn skip_balanced(&mut self, open: char, close: char) -> Result<(), ParseError> {
        let line = self.line();
        let mut depth = 0usize;
        loop {
            match self.bump() {
                Some(Tok::Punct(c)) if c == open => depth += 1,
                Some(Tok::Punct(c)) if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => {
                    return Err(ParseError::Unterminated {
                        line,
                        what: match open {
                            '{' => "block",
                            '(' => "parenthesis",
                            '<' => "type arguments",
                            _ => "bracket",
                        },
                    })
                }
            }
        }
    }

    fn skip_annotation(&mut self) -> Result<(), ParseError> {
        self.expect_punct('@', "annotation")?;
        self.qualified_name()?;
        if self.is_punct('(') {
            self.skip_balanced('(', ')')?;
        }
        Ok(())
    }

    fn qualified_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_ident("name")?;
        while self.is_punct('.') && matches!(self.peek_at(1), Some(Tok::Ident(_))) {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.expect_ident("name")?);
        }
        Ok(name)
    }

    fn at_annotation_type(&self) -> bool {
        self.is_punct('@') && matches!(self.peek_at(1), Some(Tok::Ident(i)) if i == "interface")
    }

    fn at_type_keyword(&self) -> bool {
        match self.peek() {
            Some(Tok::Ident(k)) if k == "class" || k == "interface" || k == "enum" => true,
            Some(Tok::Ident(k)) if k == "record" => {
                matches!(self.peek_at(1), Some(Tok::Ident(_)))
                    && matches!(self.peek_at(2), Some(Tok::Punct('(' | '<')))
            }
            _ => false,
        }
    }

    fn at_modifier(&self) -> bool {
        matches!(self.peek(), Some(Tok::Ident(m)) if MODIFIERS.contains(&m.as_str()))
    }

    fn unit(mut self) -> Result<SourceUnit, ParseError> {
        let mut unit = SourceUnit::default();
        let mut doc = None;
        while let Some(tok) = self.peek() {
            match tok {
                Tok::Doc(_) => doc = self.take_doc(),
                Tok::Punct(';') => self.pos += 1,
                Tok::Ident(k) if k == "package" => {
                    self.pos += 1;
                    unit.package = Some(self.qualified_name()?);
                    self.expect_punct(';', "`;` after package name")?;
                    doc = None;
                }
                Tok::Ident(k) if k == "import" => {
                    while !self.is_punct(';') {
                        if self.bump().is_none() {
                            return Err(self.unexpected("`;` after import"));
                        }
                    }
                    self.pos += 1;
                    doc = None;
                }
                _ if self.at_annotation_type() || self.at_type_keyword() => {
                    let decl = self.type_decl(doc.take())?;
                    unit.types.push(decl);
                }
                Tok::Punct('@') => self.skip_annotation()?,
                _ if self.at_modifier() => self.pos += 1,
                _ => return Err(self.unexpected("type declaration")),
            }
        }
        Ok(unit)
    }

    fn type_decl(&mut self, doc: Option<DocComment>) -> Result<TypeDecl, ParseError> {
        let kind = match self.bump() {
            Some(Tok::Punct('@')) => {
                self.pos += 1;
                DeclKind::Annotation
            }
            Some(Tok::Ident(k)) if k == "interface" => DeclKind::Interface,
            Some(Tok::Ident(k)) if k == "enum" => DeclKind::Enum,
            _ => DeclKind::Class,
        };
        let name = self.expect_ident("type name")?;
        let mut decl = TypeDecl::new(&name, kind);
        decl.doc = doc;

        // type parameters, record components, extends / implements / permits
        loop {
            match self.peek() {
                Some(Tok::Punct('{')) => break,
                Some(Tok::Punct('(')) => self.skip_balanced('(', ')')?,
                Some(Tok::Punct('@')) => self.skip_annotation()?,
                Some(_) => self.pos += 1,
                None => return Err(self.unexpected("`{` opening the type body")),
            }
        }
        self.pos += 1;

        if kind == DeclKind::Enum {
            self.enum_constants(&mut decl)?;
        }
        self.body(&mut decl)?;
        Ok(decl)
    }

    /// Constants up to the `;` ending them, or up to the closing `}`.
    fn enum_constants(&mut self, decl: &mut TypeDecl) -> Result<(), ParseError> {
        let mut doc = None;
        loop {
            match self.peek() {
                Some(Tok::Doc(_)) => doc = self.take_doc(),
                Some(Tok::Punct('@')) => self.skip_annotation()?,
                Some(Tok::Punct(',')) => self.pos += 1,
                Some(Tok::Punct(';')) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(Tok::Punct('}')) => return Ok(()),
                Some(Tok::Ident(_)) => {
                    let name = self.expect_ident("enum constant")?;
                    if self.is_punct('(') {
                        self.skip_balanced('(', ')')?;
                    }
                    if self.is_punct('{') {
                        self.skip_balanced('{', '}')?;
                    }
                    decl.constants.push(EnumConstant {
                        name,
                        doc: doc.take(),
                    });
                }
                _ => return Err(self.unexpected("enum constant")),
            }
        }
    }

    /// Members up to and including the closing `}`.
    fn body(&mut self, decl: &mut TypeDecl) -> Result<(), ParseError> {
        let mut doc = None;
        loop {
            match self.peek() {
                None => return Err(self.unexpected("`}` closing the type body")),
                Some(Tok::Punct('}')) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(Tok::Punct(';')) => {
                    self.pos += 1;
                    doc = None;
                }
                Some(Tok::Doc(_)) => doc = self.take_doc(),
                _ if self.at_annotation_type() || self.at_type_keyword() => {
                    let nested = self.type_decl(doc.take())?;
                    decl.nested.push(nested);
                }
                Some(Tok::Punct('@')) => self.skip_annotation()?,
                Some(Tok::Punct('{')) => {
                    self.skip_balanced('{', '}')?;
                    doc = None;
                }
                Some(Tok::Punct('<')) => self.skip_balanced('<', '>')?,
                _ if self.at_modifier() => self.pos += 1,
                _ => self.member(decl, doc.take())?,
            }
        }
    }

    fn member(&mut self, decl: &mut TypeDecl, doc: Option<DocComment>) -> Result<(), ParseError> {
        let line = self.line();
        let is_constructor = matches!(self.peek(), Some(Tok::Ident(n)) if *n == decl.name)
            && matches!(self.peek_at(1), Some(Tok::Punct('(')));
        if is_constructor {
            self.pos += 1;
            self.skip_balanced('(', ')')?;
            return self.skip_method_rest();
        }

        self.parse_type()?;
        let name = self.expect_ident("member name")?;
        if self.is_punct('(') {
            let params = self.params()?;
            self.skip_method_rest()?;
            decl.methods.push(MethodDecl {
                name,
                params,
                doc,
                line,
            });
            Ok(())
        } else {
            self.skip_field()
        }
    }

    /// `throws` clause and body, or the `;` of an abstract method.
    fn skip_method_rest(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(Tok::Punct(';')) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(Tok::Punct('{')) => return self.skip_balanced('{', '}'),
                Some(Tok::Punct('}')) | None => return Err(self.unexpected("method body or `;`")),
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Field declaration rest, through its terminating `;`.
    fn skip_field(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                Some(Tok::Punct('(' | '{' | '[')) => depth += 1,
                Some(Tok::Punct(')' | ']')) => depth = depth.saturating_sub(1),
                Some(Tok::Punct('}')) => {
                    if depth == 0 {
                        return Err(self.unexpected("`;` ending the field"));
                    }
                    depth -= 1;
                }
                Some(Tok::Punct(';')) if depth == 0 => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(self.unexpected("`;` ending the field")),
            }
            self.pos += 1;
        }
    }

    fn params(&mut self) -> Result<Vec<ParamDecl>, ParseError> {
        self.expect_punct('(', "`(`")?;
        let mut params = Vec::new();
        if self.is_punct(')') {
            self.pos += 1;
            return Ok(params);
        }
        loop {
            while self.is_punct('@') || self.is_ident("final") {
                if self.is_punct('@') {
                    self.skip_annotation()?;
                } else {
                    self.pos += 1;
                }
            }
            let mut ty = self.parse_type()?;
            if self.is_punct('.') {
                for _ in 0..3 {
                    self.expect_punct('.', "`...`")?;
                }
                ty = SyntaxType::Other(format!("{}...", written(&ty)));
            }
            let name = self.expect_ident("parameter name")?;
            while self.is_punct('[') {
                self.skip_balanced('[', ']')?;
                ty = SyntaxType::Other(format!("{}[]", written(&ty)));
            }
            params.push(ParamDecl { name, ty });
            match self.peek() {
                Some(Tok::Punct(',')) => self.pos += 1,
                Some(Tok::Punct(')')) => {
                    self.pos += 1;
                    return Ok(params);
                }
                _ => return Err(self.unexpected("`,` or `)` in parameter list")),
            }
        }
    }

    /// A type as written: qualified name, type arguments dropped.
    fn parse_type(&mut self) -> Result<SyntaxType, ParseError> {
        while self.is_punct('@') {
            self.skip_annotation()?;
        }
        if self.is_punct('?') {
            self.pos += 1;
            if self.is_ident("extends") || self.is_ident("super") {
                self.pos += 1;
                self.parse_type()?;
            }
            return Ok(SyntaxType::Other("?".to_string()));
        }

        let mut text = String::new();
        loop {
            text.push_str(&self.expect_ident("type")?);
            if self.is_punct('<') {
                self.skip_balanced('<', '>')?;
            }
            if self.is_punct('.') && matches!(self.peek_at(1), Some(Tok::Ident(_))) {
                self.pos += 1;
                text.push('.');
                continue;
            }
            break;
        }

        let mut array = false;
        while self.is_punct('[') && matches!(self.peek_at(1), Some(Tok::Punct(']'))) {
            self.pos += 2;
            text.push_str("[]");
            array = true;
        }
        Ok(if array {
            SyntaxType::Other(text)
        } else if PRIMITIVES.contains(&text.as_str()) {
            SyntaxType::Primitive(text)
        } else {
            SyntaxType::Named(text)
        })
    }
}

fn written(ty: &SyntaxType) -> &str {
    match ty {
        SyntaxType::Primitive(s) | SyntaxType::Named(s) | SyntaxType::Other(s) => s,
    }
}
