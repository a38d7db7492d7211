use crate::foundation::core::BBox;
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::region::tree::{Mask, NamedRegionTree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) offset: usize,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

pub(crate) fn lex(input: &str) -> LiveryResult<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let kind = match c {
            b'&' => TokenKind::And,
            b'|' => TokenKind::Or,
            b'~' => TokenKind::Not,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            _ if is_ident_byte(c) => {
                while i < bytes.len() && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                out.push(Token {
                    kind: TokenKind::Ident(input[start..i].to_string()),
                    offset: start,
                });
                continue;
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(LiveryError::invalid_expression(
                    start,
                    format!("unexpected character '{ch}'"),
                ));
            }
        };
        out.push(Token {
            kind,
            offset: start,
        });
        i += 1;
    }

    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    And,
    Or,
    Not,
    LParen,
}

/// Operator-stack evaluation state.
struct Machine<'a> {
    regions: &'a NamedRegionTree,
    operands: Vec<Mask>,
    ops: Vec<(Op, usize)>,
}

impl Machine<'_> {
    /// Pushes a finished operand, consuming every pending negation directly above it.
    fn push_operand(&mut self, mut mask: Mask) {
        while let Some((Op::Not, _)) = self.ops.last() {
            self.ops.pop();
            mask = mask.not();
        }
        self.operands.push(mask);
    }

    fn pop_operand(&mut self, offset: usize) -> LiveryResult<Mask> {
        self.operands
            .pop()
            .ok_or_else(|| LiveryError::invalid_expression(offset, "missing operand"))
    }

    fn apply_top(&mut self) -> LiveryResult<()> {
        let Some((op, offset)) = self.ops.pop() else {
            return Ok(());
        };
        match op {
            Op::Not => {
                let m = self.pop_operand(offset)?;
                self.operands.push(m.not());
            }
            Op::And | Op::Or => {
                let right = self.pop_operand(offset)?;
                let left = self.pop_operand(offset)?;
                let out = if op == Op::And {
                    left.and(&right)?
                } else {
                    left.or(&right)?
                };
                self.operands.push(out);
            }
            Op::LParen => {
                return Err(LiveryError::invalid_expression(offset, "unclosed '('"));
            }
        }
        Ok(())
    }
}

/// Evaluates a region expression to a raw mask, without the selection policy.
pub fn evaluate_mask(expression: &str, regions: &NamedRegionTree) -> LiveryResult<Mask> {
    let tokens = lex(expression)?;
    let mut m = Machine {
        regions,
        operands: Vec::new(),
        ops: Vec::new(),
    };
    let mut expect_operand = true;

    for tok in &tokens {
        match &tok.kind {
            TokenKind::Ident(name) => {
                if !expect_operand {
                    return Err(LiveryError::invalid_expression(
                        tok.offset,
                        format!("expected operator before '{name}'"),
                    ));
                }
                let mask = m.regions.resolve(name)?;
                m.push_operand(mask);
                expect_operand = false;
            }
            TokenKind::And | TokenKind::Or => {
                if expect_operand {
                    return Err(LiveryError::invalid_expression(
                        tok.offset,
                        "binary operator without left operand",
                    ));
                }
                while matches!(m.ops.last(), Some((Op::And | Op::Or, _))) {
                    m.apply_top()?;
                }
                let op = if tok.kind == TokenKind::And {
                    Op::And
                } else {
                    Op::Or
                };
                m.ops.push((op, tok.offset));
                expect_operand = true;
            }
            TokenKind::Not => {
                if !expect_operand {
                    return Err(LiveryError::invalid_expression(
                        tok.offset,
                        "'~' must prefix an operand",
                    ));
                }
                m.ops.push((Op::Not, tok.offset));
            }
            TokenKind::LParen => {
                if !expect_operand {
                    return Err(LiveryError::invalid_expression(
                        tok.offset,
                        "expected operator before '('",
                    ));
                }
                m.ops.push((Op::LParen, tok.offset));
            }
            TokenKind::RParen => {
                if expect_operand {
                    return Err(LiveryError::invalid_expression(
                        tok.offset,
                        "expected operand before ')'",
                    ));
                }
                loop {
                    match m.ops.last() {
                        Some((Op::LParen, _)) => break,
                        Some(_) => m.apply_top()?,
                        None => {
                            return Err(LiveryError::invalid_expression(
                                tok.offset,
                                "unbalanced ')'",
                            ));
                        }
                    }
                }
                m.ops.pop();
                // The group is an operand produced right here.
                let group = m.pop_operand(tok.offset)?;
                m.push_operand(group);
            }
        }
    }

    if expect_operand {
        return Err(LiveryError::invalid_expression(
            expression.len(),
            "expression ended where an operand was expected",
        ));
    }
    while !m.ops.is_empty() {
        m.apply_top()?;
    }

    let result = m.pop_operand(expression.len())?;
    if !m.operands.is_empty() {
        return Err(LiveryError::invalid_expression(
            expression.len(),
            "dangling operands",
        ));
    }
    Ok(result)
}

/// Result of evaluating a section selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub mask: Mask,
    pub bbox: BBox,
}

/// Evaluates a selector into a mask and its tight bounding box.
///
/// A selector must pick at least one pixel and must not cover the whole canvas.
#[tracing::instrument(skip(regions))]
pub fn evaluate(expression: &str, regions: &NamedRegionTree) -> LiveryResult<Selection> {
    let mask = evaluate_mask(expression, regions)?;
    if mask.is_full() {
        return Err(LiveryError::FullSelection(expression.to_string()));
    }
    let bbox = mask
        .bbox()
        .ok_or_else(|| LiveryError::EmptySelection(expression.to_string()))?;
    Ok(Selection { mask, bbox })
}

#[cfg(test)]
#[path = "../../tests/unit/region/expr.rs"]
mod tests;
