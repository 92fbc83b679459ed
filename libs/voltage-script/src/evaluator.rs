//! Stack machine for compiled programs
//!
//! Evaluation is strictly left to right. Each group level keeps a running
//! `result`, the operator waiting to be applied and the current `operand`:
//!
//! - an operator folds `operand` into `result` and becomes the pending operator
//! - `|` makes the current operand non-negative
//! - `(` opens a nested group whose value becomes the operand
//! - `)` folds the group and hands its value to the enclosing level
//! - the end sentinel folds and returns
//! - constant and channel references set the operand
//!
//! Groups are kept on a heap stack, so nesting depth is bounded by program
//! length rather than the native call stack.

use crate::opcode::{Operator, Token};

/// Fold state of one group level
#[derive(Debug, Clone, Copy)]
struct Frame {
    result: f64,
    pending: Operator,
    operand: f64,
}

impl Frame {
    fn new() -> Self {
        Self {
            result: 0.0,
            pending: Operator::Add,
            operand: 0.0,
        }
    }

    fn fold(&self) -> f64 {
        self.pending.apply(self.result, self.operand)
    }
}

/// Run `program` from `*cursor` and return its value.
///
/// `leaf` supplies the value of a channel reference; `None` aborts the whole
/// evaluation with 0. The cursor only moves when a `)` with no matching `(`
/// ends the run; it is then left on that `)`. Runs that reach the end sentinel
/// or abort leave it where it was, so a second run starts from the same place.
pub fn run<F>(program: &[u8], constants: &[f64], cursor: &mut usize, mut leaf: F) -> f64
where
    F: FnMut(usize) -> Option<f64>,
{
    let mut groups: Vec<Frame> = Vec::new();
    let mut frame = Frame::new();
    let mut pos = *cursor;

    loop {
        let token = program
            .get(pos)
            .map_or(Token::End, |&byte| Token::decode(byte));

        match token {
            Token::Op(op) => {
                frame.result = frame.fold();
                frame.pending = op;
                frame.operand = op.identity();
            },
            Token::Abs => {
                if frame.operand < 0.0 {
                    frame.operand = -frame.operand;
                }
            },
            Token::Open => {
                groups.push(frame);
                frame = Frame::new();
            },
            Token::Close => {
                let value = frame.fold();
                match groups.pop() {
                    Some(outer) => {
                        frame = outer;
                        frame.operand = value;
                    },
                    None => {
                        *cursor = pos;
                        return value;
                    },
                }
            },
            Token::End => {
                // Unclosed groups close here, innermost first
                let mut value = frame.fold();
                while let Some(outer) = groups.pop() {
                    frame = outer;
                    frame.operand = value;
                    value = frame.fold();
                }
                return value;
            },
            Token::Const(index) => {
                frame.operand = constants.get(index).copied().unwrap_or(0.0);
            },
            Token::Input(channel) => match leaf(channel) {
                Some(value) => frame.operand = value,
                None => return 0.0,
            },
            Token::Unknown(_) => {},
        }

        pos += 1;
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::compiler::compile;

    /// Evaluate with channel `n` reading `values[n]`
    fn eval(text: &str, values: &[f64]) -> f64 {
        let compiled = compile(text);
        let mut cursor = 0;
        run(compiled.program(), compiled.constants(), &mut cursor, |ch| {
            Some(values.get(ch).copied().unwrap_or(0.0))
        })
    }

    #[test]
    fn test_left_to_right_without_precedence() {
        // 2 + 3 * 4 folds as (2 + 3) * 4
        assert_eq!(eval("#2+#3*#4", &[]), 20.0);
        assert_eq!(eval("@0-@1", &[10.0, 4.0]), 6.0);
    }

    #[test]
    fn test_grouping() {
        assert_eq!(eval("@0+(@1*#2)", &[1.0, 3.0]), 7.0);
        assert_eq!(eval("(@0+@1)*#2", &[1.0, 3.0]), 8.0);
        assert_eq!(eval("((@0+@1)*(@0-@1))", &[5.0, 3.0]), 16.0);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(eval("@0<@1", &[3.0, 7.0]), 3.0);
        assert_eq!(eval("@0>@1", &[3.0, 7.0]), 7.0);
        // Clamp to zero from below
        assert_eq!(eval("@0>#0", &[-3.0]), 0.0);
    }

    #[test]
    fn test_absolute_value() {
        assert_eq!(eval("@0|", &[-5.0]), 5.0);
        assert_eq!(eval("(@0-@1)|", &[2.0, 7.0]), 5.0);
        assert_eq!(eval("@0|", &[4.0]), 4.0);
    }

    #[test]
    fn test_divide_by_zero_is_zero() {
        assert_eq!(eval("@0/#0", &[123.0]), 0.0);
        assert_eq!(eval("@0/@1", &[123.0, 0.0]), 0.0);
    }

    #[test]
    fn test_dangling_operators() {
        // Trailing * and / multiply or divide by 1
        assert_eq!(eval("@0*", &[6.0]), 6.0);
        assert_eq!(eval("@0/", &[6.0]), 6.0);
        // Trailing + adds 0
        assert_eq!(eval("@0+", &[6.0]), 6.0);
    }

    #[test]
    fn test_unclosed_group_closes_at_end() {
        assert_eq!(eval("#2*(@0+@1", &[1.0, 2.0]), 6.0);
    }

    #[test]
    fn test_stray_close_stops_and_holds_cursor() {
        let compiled = compile("@0)+@1");
        let mut cursor = 0;
        let value = run(compiled.program(), compiled.constants(), &mut cursor, |ch| {
            Some(ch as f64 + 1.0)
        });
        assert_eq!(value, 1.0);
        assert_eq!(cursor, 1);
    }

    #[test]
    fn test_end_leaves_cursor_in_place() {
        let compiled = compile("@0+(@1*#2)");
        let mut cursor = 0;
        let first = run(compiled.program(), compiled.constants(), &mut cursor, |_| Some(1.0));
        assert_eq!(first, 3.0);
        assert_eq!(cursor, 0);

        // A second run sees the whole program again
        let second = run(compiled.program(), compiled.constants(), &mut cursor, |_| Some(2.0));
        assert_eq!(second, 6.0);
        assert_eq!(cursor, 0);
    }

    #[test]
    fn test_leaf_abort_leaves_cursor_in_place() {
        let compiled = compile("@0+@1");
        let mut cursor = 0;
        let value = run(compiled.program(), compiled.constants(), &mut cursor, |ch| {
            (ch == 0).then_some(1.0)
        });
        assert_eq!(value, 0.0);
        assert_eq!(cursor, 0);
    }

    #[test]
    fn test_leaf_abort_collapses_everything() {
        let compiled = compile("#5+(@0+(@1*#2))");
        let mut cursor = 0;
        let value = run(compiled.program(), compiled.constants(), &mut cursor, |ch| {
            if ch == 1 {
                None
            } else {
                Some(10.0)
            }
        });
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_equals_sign_ends_program() {
        assert_eq!(eval("@0=+@1", &[1.0, 2.0]), 1.0);
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 10_000;
        let text = format!("{}@0{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(eval(&text, &[42.0]), 42.0);
    }
}
