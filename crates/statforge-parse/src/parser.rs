//! Top-down operator precedence (Pratt) parser with optional post-order
//! constant folding.

use std::sync::Arc;

use statforge_common::{ErrorKind, SfError, SfResult};

use crate::ast::{BinaryOp, ExprNode, UnaryOp};
use crate::tokenizer::{Token, TokenKind, Tokenizer};

const UNARY_BP: u8 = 11;

fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8, BinaryOp)> {
    use TokenKind::*;
    Some(match kind {
        Caret => (11, 11, BinaryOp::Pow), // right-associative
        Star => (9, 10, BinaryOp::Mul),
        Slash => (9, 10, BinaryOp::Div),
        Plus => (8, 9, BinaryOp::Add),
        Minus => (8, 9, BinaryOp::Sub),
        Less => (7, 8, BinaryOp::Lt),
        LessEqual => (7, 8, BinaryOp::Le),
        Greater => (7, 8, BinaryOp::Gt),
        GreaterEqual => (7, 8, BinaryOp::Ge),
        EqualEqual => (7, 8, BinaryOp::Eq),
        BangEqual => (7, 8, BinaryOp::Ne),
        AndAnd => (6, 7, BinaryOp::And),
        OrOr => (5, 6, BinaryOp::Or),
        _ => return None,
    })
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> SfResult<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            let span = self.peek().span;
            Err(SfError::new(ErrorKind::InvalidDsl)
                .with_message(format!("expected {what}, found \"{}\"", self.peek().lexeme))
                .with_span(span))
        }
    }

    fn parse_expr(&mut self, min_bp: u8) -> SfResult<Arc<ExprNode>> {
        let mut lhs = self.parse_prefix()?;

        loop {
            // Ternary is checked before the binding-power cutoff: it may
            // appear anywhere an expression may, regardless of the
            // caller's minimum binding power.
            if self.peek().kind == TokenKind::Question {
                let span = self.peek().span;
                self.advance();
                let then_branch = self.parse_expr(0)?;
                self.expect(TokenKind::Colon, "':' in ternary expression")?;
                let else_branch = self.parse_expr(0)?;
                lhs = Arc::new(ExprNode::Ternary {
                    cond: lhs,
                    then_branch,
                    else_branch,
                    span,
                });
                continue;
            }

            let Some((lbp, rbp, op)) = infix_binding_power(self.peek().kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            let span = self.peek().span;
            self.advance();
            let rhs = self.parse_expr(rbp)?;
            lhs = Arc::new(ExprNode::Binary { op, lhs, rhs, span });
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> SfResult<Arc<ExprNode>> {
        let span = self.peek().span;
        match self.peek().kind {
            TokenKind::Plus => {
                self.advance();
                let expr = self.parse_expr(UNARY_BP)?;
                Ok(Arc::new(ExprNode::Unary {
                    op: UnaryOp::Plus,
                    expr,
                    span,
                }))
            }
            TokenKind::Minus => {
                self.advance();
                let expr = self.parse_expr(UNARY_BP)?;
                Ok(Arc::new(ExprNode::Unary {
                    op: UnaryOp::Neg,
                    expr,
                    span,
                }))
            }
            TokenKind::Bang => {
                self.advance();
                let expr = self.parse_expr(UNARY_BP)?;
                Ok(Arc::new(ExprNode::Unary {
                    op: UnaryOp::Not,
                    expr,
                    span,
                }))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> SfResult<Arc<ExprNode>> {
        let span = self.peek().span;
        match self.peek().kind {
            TokenKind::Number => {
                let tok = self.advance();
                Ok(Arc::new(ExprNode::Literal {
                    value: tok.number,
                    span,
                }))
            }
            TokenKind::CellRef => {
                let tok = self.advance();
                Ok(Arc::new(ExprNode::Ref {
                    name: tok.lexeme,
                    span,
                }))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Identifier => {
                let name = self.advance().lexeme;
                self.expect(TokenKind::LeftParen, "'(' after function name")?;
                let mut args = Vec::new();
                if self.peek().kind != TokenKind::RightParen {
                    loop {
                        args.push(self.parse_expr(0)?);
                        if self.peek().kind == TokenKind::Comma {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                self.expect(TokenKind::RightParen, "')' to close call arguments")?;
                Ok(Arc::new(ExprNode::Call { name, args, span }))
            }
            _ => Err(SfError::new(ErrorKind::InvalidDsl)
                .with_message(format!("unexpected token \"{}\"", self.peek().lexeme))
                .with_span(span)),
        }
    }
}

/// Parses `source` into an expression tree, optionally constant-folding it.
pub fn parse(source: &str, fold: bool) -> SfResult<Arc<ExprNode>> {
    let tokens = Tokenizer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    let tree = parser.parse_expr(0)?;
    if parser.peek().kind != TokenKind::EndOfFile {
        let span = parser.peek().span;
        return Err(SfError::new(ErrorKind::InvalidDsl)
            .with_message(format!("unexpected trailing token \"{}\"", parser.peek().lexeme))
            .with_span(span));
    }
    if fold { fold_constants(&tree) } else { Ok(tree) }
}

/// Post-order constant folding. Arithmetic binary/unary operators on
/// literals collapse to a literal; comparisons and logical operators are
/// left alone (their result is still a number, but folding them would not
/// simplify anything downstream and the evaluator is the single source of
/// truth for their semantics). Division by a literal zero is a fold-time
/// error. A ternary with a literal condition folds away the untaken
/// branch. Call arguments are folded but a call itself never is.
pub fn fold_constants(node: &Arc<ExprNode>) -> SfResult<Arc<ExprNode>> {
    match node.as_ref() {
        ExprNode::Literal { .. } | ExprNode::Ref { .. } => Ok(Arc::clone(node)),
        ExprNode::Unary { op, expr, span } => {
            let folded = fold_constants(expr)?;
            if let ExprNode::Literal { value, .. } = folded.as_ref() {
                let result = match op {
                    UnaryOp::Plus => *value,
                    UnaryOp::Neg => -*value,
                    UnaryOp::Not => {
                        if truthy(*value) {
                            0.0
                        } else {
                            1.0
                        }
                    }
                };
                Ok(Arc::new(ExprNode::Literal {
                    value: result,
                    span: *span,
                }))
            } else {
                Ok(Arc::new(ExprNode::Unary {
                    op: *op,
                    expr: folded,
                    span: *span,
                }))
            }
        }
        ExprNode::Binary { op, lhs, rhs, span } => {
            let lhs = fold_constants(lhs)?;
            let rhs = fold_constants(rhs)?;
            if op.is_arithmetic() {
                if let (ExprNode::Literal { value: l, .. }, ExprNode::Literal { value: r, .. }) =
                    (lhs.as_ref(), rhs.as_ref())
                {
                    if *op == BinaryOp::Div && *r == 0.0 {
                        return Err(SfError::new(ErrorKind::InvalidDsl)
                            .with_message("division by zero in constant expression".to_string())
                            .with_span(*span));
                    }
                    let result = match op {
                        BinaryOp::Add => l + r,
                        BinaryOp::Sub => l - r,
                        BinaryOp::Mul => l * r,
                        BinaryOp::Div => l / r,
                        BinaryOp::Pow => l.powf(*r),
                        _ => unreachable!("is_arithmetic() guards this match"),
                    };
                    return Ok(Arc::new(ExprNode::Literal {
                        value: result,
                        span: *span,
                    }));
                }
            }
            Ok(Arc::new(ExprNode::Binary {
                op: *op,
                lhs,
                rhs,
                span: *span,
            }))
        }
        ExprNode::Ternary {
            cond,
            then_branch,
            else_branch,
            span,
        } => {
            let cond = fold_constants(cond)?;
            let then_branch = fold_constants(then_branch)?;
            let else_branch = fold_constants(else_branch)?;
            if let ExprNode::Literal { value, .. } = cond.as_ref() {
                return Ok(if truthy(*value) { then_branch } else { else_branch });
            }
            Ok(Arc::new(ExprNode::Ternary {
                cond,
                then_branch,
                else_branch,
                span: *span,
            }))
        }
        ExprNode::Call { name, args, span } => {
            let folded_args = args
                .iter()
                .map(fold_constants)
                .collect::<SfResult<Vec<_>>>()?;
            Ok(Arc::new(ExprNode::Call {
                name: name.clone(),
                args: folded_args,
                span: *span,
            }))
        }
    }
}

fn truthy(x: f64) -> bool {
    x != 0.0 && !x.is_nan()
}
