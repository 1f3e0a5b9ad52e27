//! Policy document parser.
//!
//! Walks the token stream produced by the [`lexer`](crate::lexer) and fills a
//! [`Policy`] section by section. Each section reader scans forward until its
//! own close tag, passing over tags it does not know.
//!
//! # Document format
//!
//! ```text
//! <policy>
//!   <manifest>
//!     <id>crm-sales-read</id>
//!     <ns>crm</ns>
//!     <v>1</v>
//!     <name>Sales read access</name>
//!     <desc>Sales workgroup may read CRM records</desc>
//!     <priority>10</priority>
//!   </manifest>
//!   <paths>
//!     <path>/api/v1/crm/:id</path>
//!   </paths>
//!   <effects>
//!     <allow> "crm.read" </allow>
//!   </effects>
//!   <log>
//!     <onpermit source="audit" priority="1">sales read granted</onpermit>
//!   </log>
//!   <matches>
//!     <match type="json">{ "userRightRequest": { "workgroups": ["sales"] } }</match>
//!   </matches>
//! </policy>
//! ```
//!
//! Any malformed integer, unclosed section or lexer error aborts the whole
//! document.

use std::str::FromStr;

use crate::lexer::{Span, Token, TokenKind, tokenize};
use crate::model::{LogDirective, Policy};

// =============================================================================
// Parse Error
// =============================================================================

/// Errors produced while parsing a policy document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Input ended before a section's close tag.
    #[error("unexpected eof, {section} not closed")]
    UnexpectedEof {
        /// Name of the unclosed section.
        section: String,
    },

    /// The lexer reported an error.
    #[error("unexpected error: {literal}")]
    Lexer {
        /// Lexer error literal.
        literal: String,
    },

    /// An integer field did not contain a base-10 integer.
    #[error("invalid integer for {field}: '{value}'")]
    InvalidNumber {
        /// Offending field.
        field: String,
        /// Raw field text.
        value: String,
    },

    /// The document has no `<policy>` element.
    #[error("missing <policy> root element")]
    MissingRoot,

    /// A section appeared more than once.
    #[error("duplicate <{section}> section")]
    DuplicateSection {
        /// Name of the repeated section.
        section: String,
    },

    /// A `<match>` element declared a type other than `json`.
    #[error("unsupported match type '{match_type}'")]
    UnsupportedMatchType {
        /// The declared type.
        match_type: String,
    },

    /// More than one `<match>` element.
    #[error("more than one <match> element")]
    DuplicateMatch,
}

impl ParseError {
    fn eof(section: &str) -> Self {
        Self::UnexpectedEof {
            section: section.to_string(),
        }
    }

    fn invalid_number(field: &str, value: &str) -> Self {
        Self::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Parse a policy document.
///
/// # Errors
///
/// Returns [`ParseError`] if the document has no `<policy>` root, a section
/// is left unclosed, a section is repeated, an integer field is malformed or
/// the lexer reports an error.
pub fn parse_policy(input: &str) -> Result<Policy, ParseError> {
    Parser::new(input).parse()
}

impl FromStr for Policy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_policy(s)
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Opening tag after its attributes have been consumed.
struct Element {
    attributes: Vec<(String, String)>,
    /// Offset right after `>`; `None` for self-closing tags.
    body_start: Option<usize>,
}

impl Element {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    policy: Policy,
    seen_sections: Vec<&'static str>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            tokens: tokenize(src),
            pos: 0,
            policy: Policy::default(),
            seen_sections: Vec::new(),
        }
    }

    /// Next token; `Eof` once the stream is exhausted.
    fn next(&mut self) -> Token {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                token.clone()
            }
            None => Token {
                kind: TokenKind::Eof,
                span: Span {
                    start: self.src.len(),
                    end: self.src.len(),
                },
            },
        }
    }

    fn parse(mut self) -> Result<Policy, ParseError> {
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::OpenTag(name) if name == "policy" => break,
                TokenKind::Eof => return Err(ParseError::MissingRoot),
                TokenKind::Error(literal) => return Err(ParseError::Lexer { literal }),
                _ => {}
            }
        }

        let root = self.open_element("policy")?;
        if root.body_start.is_none() {
            return Ok(self.policy);
        }

        self.scan_section("policy", |p, token| match token.kind {
            TokenKind::OpenTag(name) => p.dispatch_section(&name),
            _ => Ok(()),
        })?;

        Ok(self.policy)
    }

    fn dispatch_section(&mut self, name: &str) -> Result<(), ParseError> {
        let section = match name {
            "manifest" => "manifest",
            "paths" => "paths",
            "effects" => "effects",
            "matches" => "matches",
            "log" => "log",
            other => {
                tracing::trace!(tag = other, "Skipping unknown policy section");
                return Ok(());
            }
        };
        if self.seen_sections.contains(&section) {
            return Err(ParseError::DuplicateSection {
                section: section.to_string(),
            });
        }
        self.seen_sections.push(section);

        if self.open_element(section)?.body_start.is_none() {
            return Ok(());
        }
        match section {
            "manifest" => self.parse_manifest(),
            "paths" => self.parse_paths(),
            "effects" => self.parse_effects(),
            "matches" => self.parse_matches(),
            _ => self.parse_log(),
        }
    }

    /// Scan tokens until `</section>`, handing every other token to
    /// `on_token`.
    fn scan_section<F>(&mut self, section: &str, mut on_token: F) -> Result<(), ParseError>
    where
        F: FnMut(&mut Self, Token) -> Result<(), ParseError>,
    {
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::CloseTag(ref name) if name == section => return Ok(()),
                TokenKind::Eof => return Err(ParseError::eof(section)),
                TokenKind::Error(ref literal) => {
                    return Err(ParseError::Lexer {
                        literal: literal.clone(),
                    });
                }
                _ => on_token(self, token)?,
            }
        }
    }

    /// Consume the attributes of an opening tag up to `>` or `/>`.
    fn open_element(&mut self, tag: &str) -> Result<Element, ParseError> {
        let mut attributes = Vec::new();
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::Attribute { name, value } => attributes.push((name, value)),
                TokenKind::TagEnd => {
                    return Ok(Element {
                        attributes,
                        body_start: Some(token.span.end),
                    });
                }
                TokenKind::SelfClose => {
                    return Ok(Element {
                        attributes,
                        body_start: None,
                    });
                }
                TokenKind::Error(literal) => return Err(ParseError::Lexer { literal }),
                _ => return Err(ParseError::eof(tag)),
            }
        }
    }

    /// Raw source text of an element body, up to its close tag.
    fn read_body(&mut self, tag: &str, element: &Element) -> Result<&'a str, ParseError> {
        let Some(body_start) = element.body_start else {
            return Ok("");
        };
        self.scan_section(tag, |_, _| Ok(()))?;
        // The last consumed token is the element's close tag.
        let body_end = self
            .tokens
            .get(self.pos.saturating_sub(1))
            .map_or(self.src.len(), |t| t.span.start);
        let src = self.src;
        Ok(&src[body_start..body_end.max(body_start)])
    }

    fn read_text(&mut self, tag: &str) -> Result<String, ParseError> {
        let element = self.open_element(tag)?;
        Ok(self.read_body(tag, &element)?.trim().to_string())
    }

    fn read_int<T: FromStr>(&mut self, tag: &str) -> Result<T, ParseError> {
        let text = self.read_text(tag)?;
        text.parse::<T>()
            .map_err(|_| ParseError::invalid_number(tag, &text))
    }

    /// Collect every quoted literal up to `</tag>`, quotes stripped.
    fn read_strings(&mut self, tag: &str) -> Result<Vec<String>, ParseError> {
        let element = self.open_element(tag)?;
        let mut values = Vec::new();
        if element.body_start.is_none() {
            return Ok(values);
        }
        self.scan_section(tag, |_, token| {
            match token.kind {
                TokenKind::String(raw) => values.push(strip_quotes(&raw).to_string()),
                TokenKind::Text(text) | TokenKind::Number(text) => {
                    tracing::warn!(
                        section = tag,
                        text = %text,
                        "Ignoring unquoted value; rights must be quoted strings"
                    );
                }
                _ => {}
            }
            Ok(())
        })?;
        Ok(values)
    }

    // -------------------------------------------------------------------------
    // Sections
    // -------------------------------------------------------------------------

    fn parse_manifest(&mut self) -> Result<(), ParseError> {
        self.scan_section("manifest", |p, token| {
            let TokenKind::OpenTag(name) = token.kind else {
                return Ok(());
            };
            match name.as_str() {
                "id" => p.policy.manifest.id = p.read_text("id")?,
                "ns" => p.policy.manifest.namespace = p.read_text("ns")?,
                "v" => p.policy.manifest.version = p.read_text("v")?,
                "name" => p.policy.manifest.name = p.read_text("name")?,
                "desc" => p.policy.manifest.description = p.read_text("desc")?,
                "priority" => p.policy.manifest.priority = p.read_int("priority")?,
                _ => {}
            }
            Ok(())
        })
    }

    fn parse_paths(&mut self) -> Result<(), ParseError> {
        self.scan_section("paths", |p, token| {
            if token.kind != TokenKind::OpenTag("path".to_string()) {
                return Ok(());
            }
            let route = p.read_text("path")?;
            if !route.is_empty() && !p.policy.routes.contains(&route) {
                p.policy.routes.push(route);
            }
            Ok(())
        })
    }

    fn parse_effects(&mut self) -> Result<(), ParseError> {
        self.scan_section("effects", |p, token| {
            let TokenKind::OpenTag(name) = token.kind else {
                return Ok(());
            };
            match name.as_str() {
                "allow" => {
                    let values = p.read_strings("allow")?;
                    p.policy.rights.allowed.extend(values);
                }
                "deny" => {
                    let values = p.read_strings("deny")?;
                    p.policy.rights.denied.extend(values);
                }
                "redirect" => {
                    let target = p.read_text("redirect")?;
                    p.policy.rights.redirect = Some(strip_quotes(&target).to_string());
                }
                "return" => p.policy.rights.return_msg = Some(p.read_text("return")?),
                "returncode" => p.policy.rights.return_code = Some(p.read_int("returncode")?),
                _ => {}
            }
            Ok(())
        })
    }

    fn parse_matches(&mut self) -> Result<(), ParseError> {
        let mut found = false;
        self.scan_section("matches", |p, token| {
            if token.kind != TokenKind::OpenTag("match".to_string()) {
                return Ok(());
            }
            if found {
                return Err(ParseError::DuplicateMatch);
            }
            found = true;

            let element = p.open_element("match")?;
            match element.attribute("type") {
                Some(match_type) if !match_type.eq_ignore_ascii_case("json") => {
                    return Err(ParseError::UnsupportedMatchType {
                        match_type: match_type.to_string(),
                    });
                }
                _ => {}
            }
            p.policy.matches = p.read_body("match", &element)?.trim().to_string();
            Ok(())
        })
    }

    fn parse_log(&mut self) -> Result<(), ParseError> {
        self.scan_section("log", |p, token| {
            let TokenKind::OpenTag(name) = token.kind else {
                return Ok(());
            };
            let tag = match name.as_str() {
                "onpermit" => "onpermit",
                "ondeny" => "ondeny",
                "onany" => "onany",
                _ => return Ok(()),
            };
            let directive = p.read_directive(tag)?;
            let logging = &mut p.policy.logging;
            match tag {
                "onpermit" => logging.on_permit.push(directive),
                "ondeny" => logging.on_deny.push(directive),
                _ => logging.on_any.push(directive),
            }
            Ok(())
        })
    }

    fn read_directive(&mut self, tag: &str) -> Result<LogDirective, ParseError> {
        let element = self.open_element(tag)?;
        let priority = match element.attribute("priority") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ParseError::invalid_number(&format!("{tag} priority"), raw))?,
            None => 0,
        };
        let source = element.attribute("source").unwrap_or_default().to_string();
        let message = self.read_body(tag, &element)?.trim().to_string();
        Ok(LogDirective {
            source,
            priority,
            message,
        })
    }
}

fn strip_quotes(raw: &str) -> &str {
    let raw = raw.strip_prefix(['"', '\'']).unwrap_or(raw);
    raw.strip_suffix(['"', '\'']).unwrap_or(raw)
}

// =============================================================================
// Tests
// =============================================================================
