//! Parser for domain text.
//!
//! Grammar (in rough EBNF):
//!
//! domain     = "" | term | "[" term ("," element)* "]"
//! element    = term | binary | unary
//! binary     = ("'&'" | "'|'") "," term "," term
//! unary      = "'!'" "," term
//! term       = "(" "'" FIELD "'" "," "'" COMPARATOR "'" "," "'" VALUE "'" ")"
//!
//! FIELD is one or more word characters (`[A-Za-z0-9_]`), VALUE is zero or
//! more word or whitespace characters and is trimmed. Quotes and commas are
//! never part of a value.

use super::ast::{BinaryOp, Comparator, FilterExpression, FilterNode, FilterTerm, NOT_OP};
use super::error::SyntaxError;
use super::lexer::{Token, TokenKind, tokenize};

/// Parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.span.start)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> TokenKind {
        let tok = self
            .tokens
            .get(self.pos)
            .map(|t| t.kind.clone())
            .unwrap_or(TokenKind::Eof);
        self.pos += 1;
        tok
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.offset(), message)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        self.error(format!("expected {}, got {}", expected, describe(self.peek())))
    }

    fn expect(&mut self, expected: TokenKind, label: &str) -> Result<(), SyntaxError> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(label))
        }
    }

    fn expect_quoted(&mut self, label: &str) -> Result<(usize, String), SyntaxError> {
        let offset = self.offset();
        match self.peek() {
            TokenKind::Quoted(_) => match self.advance() {
                TokenKind::Quoted(text) => Ok((offset, text)),
                _ => Err(SyntaxError::new(offset, "lexer state out of sync")),
            },
            _ => Err(self.unexpected(label)),
        }
    }

    fn expect_end(&self) -> Result<(), SyntaxError> {
        match self.peek() {
            TokenKind::Eof => Ok(()),
            other => Err(self.error(format!(
                "unexpected {} after end of domain",
                describe(other)
            ))),
        }
    }

    /// Parse the top-level domain: empty, one bare term, or a bracketed list.
    fn parse_domain(&mut self) -> Result<FilterExpression, SyntaxError> {
        let expr = match self.peek() {
            TokenKind::Eof => FilterExpression::default(),
            TokenKind::LParen => FilterExpression::term(self.parse_term()?),
            TokenKind::LBracket => self.parse_list()?,
            _ => return Err(self.unexpected("'[' or '('")),
        };
        self.expect_end()?;
        Ok(expr)
    }

    /// Parse list: "[" term ("," element)* "]"
    fn parse_list(&mut self) -> Result<FilterExpression, SyntaxError> {
        self.expect(TokenKind::LBracket, "'['")?;

        // The first element is always a bare term.
        if !matches!(self.peek(), TokenKind::LParen) {
            return Err(self.unexpected("a term as the first element"));
        }
        let mut nodes = vec![FilterNode::Leaf(self.parse_term()?)];

        while matches!(self.peek(), TokenKind::Comma) {
            self.advance(); // consume ,
            nodes.push(self.parse_element()?);
        }

        self.expect(TokenKind::RBracket, "',' or ']'")?;
        Ok(FilterExpression::new(nodes))
    }

    /// Parse element: binary | unary | term
    fn parse_element(&mut self) -> Result<FilterNode, SyntaxError> {
        match self.peek() {
            TokenKind::Quoted(op) => {
                let op = op.clone();
                let op_offset = self.offset();
                let binary = match op.as_str() {
                    "&" => Some(BinaryOp::And),
                    "|" => Some(BinaryOp::Or),
                    _ => None,
                };

                if let Some(op) = binary {
                    self.advance(); // consume operator
                    self.expect(TokenKind::Comma, "',' after operator")?;
                    let left = self.parse_term()?;
                    self.expect(TokenKind::Comma, "',' before second operand")?;
                    let right = self.parse_term()?;
                    Ok(FilterNode::Binary { op, left, right })
                } else if op == NOT_OP {
                    self.advance(); // consume !
                    self.expect(TokenKind::Comma, "',' after operator")?;
                    let operand = self.parse_term()?;
                    Ok(FilterNode::Unary { operand })
                } else {
                    Err(SyntaxError::new(
                        op_offset,
                        format!("unknown operator '{op}', expected '&', '|' or '!'"),
                    ))
                }
            }
            TokenKind::LParen => Ok(FilterNode::Leaf(self.parse_term()?)),
            _ => Err(self.unexpected("a term or operator")),
        }
    }

    /// Parse term: "(" field "," comparator "," value ")"
    fn parse_term(&mut self) -> Result<FilterTerm, SyntaxError> {
        self.expect(TokenKind::LParen, "'('")?;

        let (field_offset, field) = self.expect_quoted("quoted field name")?;
        if field.is_empty() || !field.chars().all(is_word_char) {
            return Err(SyntaxError::new(
                field_offset,
                format!("invalid field name '{field}'"),
            ));
        }
        self.expect(TokenKind::Comma, "','")?;

        let (comparator_offset, comparator) = self.expect_quoted("quoted comparator")?;
        let comparator = comparator
            .parse::<Comparator>()
            .map_err(|message| SyntaxError::new(comparator_offset, message))?;
        self.expect(TokenKind::Comma, "','")?;

        let (value_offset, value) = self.expect_quoted("quoted value")?;
        if !value.chars().all(|c| is_word_char(c) || c.is_ascii_whitespace()) {
            return Err(SyntaxError::new(
                value_offset,
                format!("invalid value '{value}'"),
            ));
        }
        self.expect(TokenKind::RParen, "')'")?;

        Ok(FilterTerm {
            field,
            comparator,
            value: value.trim().to_string(),
        })
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::LBracket => "'['".to_string(),
        TokenKind::RBracket => "']'".to_string(),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
        TokenKind::Comma => "','".to_string(),
        TokenKind::Quoted(text) => format!("'{text}'"),
        TokenKind::Eof => "end of input".to_string(),
    }
}

fn parser_for(input: &str) -> Result<Parser, SyntaxError> {
    Ok(Parser::new(tokenize(input)?))
}

/// Parse a domain string into a [`FilterExpression`].
///
/// Only the empty string yields an empty expression; whitespace-only input
/// is a syntax error.
pub fn parse_domain(input: &str) -> Result<FilterExpression, SyntaxError> {
    parser_for(input)?.parse_domain()
}

/// Check a domain string against the grammar without keeping the result.
pub fn is_valid(input: &str) -> bool {
    parse_domain(input).is_ok()
}

/// Parse exactly one bare term, e.g. `('name','=','My Name')`.
pub fn parse_term(input: &str) -> Result<FilterTerm, SyntaxError> {
    let mut parser = parser_for(input)?;
    let term = parser.parse_term()?;
    parser.expect_end()?;
    Ok(term)
}

/// Parse exactly one list element: a binary combinator, a unary combinator,
/// or a bare term.
pub fn parse_node(input: &str) -> Result<FilterNode, SyntaxError> {
    let mut parser = parser_for(input)?;
    let node = parser.parse_element()?;
    parser.expect_end()?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_term() -> FilterTerm {
        FilterTerm::new("name", Comparator::Eq, "My Name")
    }

    fn leaf() -> FilterNode {
        FilterNode::Leaf(name_term())
    }

    fn binary(op: BinaryOp) -> FilterNode {
        FilterNode::Binary {
            op,
            left: name_term(),
            right: name_term(),
        }
    }

    fn not() -> FilterNode {
        FilterNode::Unary {
            operand: name_term(),
        }
    }

    #[test]
    fn test_empty_domain() {
        assert_eq!(parse_domain("").unwrap(), FilterExpression::default());
        for input in ["   ", "\n", " ('name','=','My Name')", "('name','=','My Name') "] {
            assert!(parse_domain(input).is_err(), "accepted {input:?}");
            assert!(!is_valid(input));
        }
    }

    #[test]
    fn test_malformed_single_terms() {
        for input in ["('')", "('','')", "('a','=')", "('name')", "('name','=')"] {
            assert!(parse_domain(input).is_err(), "accepted {input}");
        }
    }

    #[test]
    fn test_single_term() {
        let expr = parse_domain("('name','=','My Name')").unwrap();
        assert_eq!(expr.nodes(), &[leaf()]);
    }

    #[test]
    fn test_single_term_like() {
        let expr = parse_domain("('name','like','My Name')").unwrap();
        assert_eq!(
            expr.nodes(),
            &[FilterNode::Leaf(FilterTerm::new(
                "name",
                Comparator::Like,
                "My Name"
            ))]
        );
    }

    #[test]
    fn test_unbracketed_terms_rejected() {
        assert!(parse_domain("('name','=','My Name'),('name','=','My Name')").is_err());
    }

    #[test]
    fn test_bracketed_terms() {
        let expr = parse_domain("[('name','=','My Name')]").unwrap();
        assert_eq!(expr.nodes(), &[leaf()]);

        let expr = parse_domain("[('name','=','My Name'),('name','=','My Name')]").unwrap();
        assert_eq!(expr.nodes(), &[leaf(), leaf()]);
    }

    #[test]
    fn test_unary_not() {
        let expr = parse_domain("[('name','=','My Name'),'!',('name','=','My Name')]").unwrap();
        assert_eq!(expr.nodes(), &[leaf(), not()]);
    }

    #[test]
    fn test_binary_operators() {
        let expr = parse_domain(
            "[('name','=','My Name'),'&',('name','=','My Name'),('name','=','My Name')]",
        )
        .unwrap();
        assert_eq!(expr.nodes(), &[leaf(), binary(BinaryOp::And)]);

        let expr = parse_domain(
            "[('name','=','My Name'),'|',('name','=','My Name'),('name','=','My Name')]",
        )
        .unwrap();
        assert_eq!(expr.nodes(), &[leaf(), binary(BinaryOp::Or)]);
    }

    #[test]
    fn test_binary_missing_operand() {
        for op in ["&", "|"] {
            let input = format!(
                "[('name','=','My Name'),('name','=','My Name'),'{op}',('name','=','My Name')]"
            );
            assert!(parse_domain(&input).is_err(), "accepted {input}");
        }
    }

    #[test]
    fn test_mixed_order_preserved() {
        let expr = parse_domain(
            "[('name','=','My Name'),('name','=','My Name'),'|',('name','=','My Name'),\
             ('name','=','My Name'),'!',('name','=','My Name'),('name','=','My Name')]",
        )
        .unwrap();
        assert_eq!(
            expr.nodes(),
            &[leaf(), leaf(), binary(BinaryOp::Or), not(), leaf()]
        );
    }

    #[test]
    fn test_leading_operator_rejected() {
        assert!(parse_domain("['!',('name','=','My Name')]").is_err());
        assert!(parse_domain("['&',('a','=','b'),('a','=','b')]").is_err());
    }

    #[test]
    fn test_nested_combinators_rejected() {
        let err = parse_domain("[('a','=','b'),'&','|',('a','=','b'),('a','=','b')]").unwrap_err();
        assert!(err.message.contains("'('"), "{err}");
    }

    #[test]
    fn test_unknown_operator() {
        let err = parse_domain("[('a','=','b'),'^',('a','=','b')]").unwrap_err();
        assert_eq!(err.offset, 15);
    }

    #[test]
    fn test_unsupported_comparator() {
        let err = parse_domain("('name','==','x')").unwrap_err();
        assert_eq!(err.offset, 8);
        assert!(err.message.contains("=="));
    }

    #[test]
    fn test_every_comparator_accepted() {
        for comparator in Comparator::ALL {
            let input = format!("('state','{comparator}','draft')");
            let expr = parse_domain(&input).unwrap();
            assert_eq!(
                expr.nodes(),
                &[FilterNode::Leaf(FilterTerm::new(
                    "state", comparator, "draft"
                ))]
            );
        }
    }

    #[test]
    fn test_value_charset() {
        assert!(parse_domain("('name','=','a,b')").is_err());
        assert!(parse_domain("('name','=','a-b')").is_err());
        assert!(parse_domain("('name','=','it''s')").is_err());
        assert!(parse_domain("('na me','=','x')").is_err());
    }

    #[test]
    fn test_value_trimmed() {
        let term = parse_term("( 'name' , 'ilike' , '  My Name ' )").unwrap();
        assert_eq!(term, FilterTerm::new("name", Comparator::ILike, "My Name"));
    }

    #[test]
    fn test_empty_value_allowed() {
        let term = parse_term("('ref','=','')").unwrap();
        assert_eq!(term.value, "");
    }

    #[test]
    fn test_unbalanced_brackets() {
        assert!(parse_domain("[('name','=','My Name')").is_err());
        assert!(parse_domain("('name','=','My Name')]").is_err());
        assert!(parse_domain("[('name','=','My Name'))]").is_err());
        assert!(parse_domain("[]").is_err());
        assert!(parse_domain("[('name','=','My Name'),]").is_err());
    }

    #[test]
    fn test_parse_node_shapes() {
        assert_eq!(parse_node("('name','=','My Name')").unwrap(), leaf());
        assert_eq!(parse_node("'!',('name','=','My Name')").unwrap(), not());
        assert_eq!(
            parse_node("'&',('name','=','My Name'),('name','=','My Name')").unwrap(),
            binary(BinaryOp::And)
        );
        assert!(parse_node("'&',('name','=','My Name')").is_err());
        assert!(parse_node("'!',('name','=','My Name'),('name','=','My Name')").is_err());
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid(""));
        assert!(is_valid("('name','=','My Name')"));
        assert!(!is_valid("name = x"));
    }

    #[test]
    fn test_display_reparses() {
        let input = "[ ('name','=','My Name'), '&', ('a','in',' x '), ('b','child_of','1'), '!', ('c','not like','z')]";
        let expr = parse_domain(input).unwrap();
        let reparsed = parse_domain(&expr.to_string()).unwrap();
        assert_eq!(expr, reparsed);

        for node in &expr {
            if let FilterNode::Leaf(term) = node {
                assert_eq!(&term.to_string().parse::<FilterTerm>().unwrap(), term);
            }
        }
    }
}
