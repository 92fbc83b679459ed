//! Opcode byte layout
//!
//! A compiled program is a sequence of single bytes:
//!
//! | byte | meaning |
//! |------|---------|
//! | `0..=9` | position in [`OP_CHARS`] (`=` end, `+ - * / < >` operators, `( ) |` markers) |
//! | `0x20 \| i` | constant pool reference, `i` in `0..32` |
//! | `0x40 \| i` | input channel reference, `i` in `0..32` |

/// Operator alphabet. The position of a character is its opcode value.
pub const OP_CHARS: &[u8; 10] = b"=+-*/<>()|";

pub const OP_END: u8 = 0;
pub const OP_ADD: u8 = 1;
pub const OP_SUB: u8 = 2;
pub const OP_MULT: u8 = 3;
pub const OP_DIV: u8 = 4;
pub const OP_MIN: u8 = 5;
pub const OP_MAX: u8 = 6;
pub const OP_OPEN: u8 = 7;
pub const OP_CLOSE: u8 = 8;
pub const OP_ABS: u8 = 9;

/// Flag bit marking a constant pool reference
pub const CONST_FLAG: u8 = 0x20;
/// Flag bit marking an input channel reference
pub const INPUT_FLAG: u8 = 0x40;
/// Index bits shared by constant and channel references
pub const INDEX_MASK: u8 = 0x1F;

/// Binary operators that fold an operand into the running result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    Div,
    Min,
    Max,
}

impl Operator {
    pub fn opcode(self) -> u8 {
        match self {
            Operator::Add => OP_ADD,
            Operator::Sub => OP_SUB,
            Operator::Mult => OP_MULT,
            Operator::Div => OP_DIV,
            Operator::Min => OP_MIN,
            Operator::Max => OP_MAX,
        }
    }

    /// Operand value to start from after this operator is read.
    ///
    /// A dangling `*` or `/` with no following leaf leaves the result as is.
    pub fn identity(self) -> f64 {
        match self {
            Operator::Mult | Operator::Div => 1.0,
            _ => 0.0,
        }
    }

    /// Fold `operand` into `result`. Division by zero yields 0.
    pub fn apply(self, result: f64, operand: f64) -> f64 {
        match self {
            Operator::Add => result + operand,
            Operator::Sub => result - operand,
            Operator::Mult => result * operand,
            Operator::Div => {
                if operand == 0.0 {
                    0.0
                } else {
                    result / operand
                }
            },
            Operator::Min => {
                if result < operand {
                    result
                } else {
                    operand
                }
            },
            Operator::Max => {
                if result > operand {
                    result
                } else {
                    operand
                }
            },
        }
    }
}

/// Decoded form of one program byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    End,
    Op(Operator),
    Open,
    Close,
    Abs,
    Const(usize),
    Input(usize),
    Unknown(u8),
}

impl Token {
    /// Decode a program byte. Constant references win over channel references.
    pub fn decode(byte: u8) -> Self {
        if byte & CONST_FLAG != 0 {
            return Token::Const((byte & INDEX_MASK) as usize);
        }
        if byte & INPUT_FLAG != 0 {
            return Token::Input((byte & INDEX_MASK) as usize);
        }
        match byte {
            OP_END => Token::End,
            OP_ADD => Token::Op(Operator::Add),
            OP_SUB => Token::Op(Operator::Sub),
            OP_MULT => Token::Op(Operator::Mult),
            OP_DIV => Token::Op(Operator::Div),
            OP_MIN => Token::Op(Operator::Min),
            OP_MAX => Token::Op(Operator::Max),
            OP_OPEN => Token::Open,
            OP_CLOSE => Token::Close,
            OP_ABS => Token::Abs,
            other => Token::Unknown(other),
        }
    }
}

/// Opcode for an alphabet character, if it is one
pub fn opcode_for(c: u8) -> Option<u8> {
    OP_CHARS.iter().position(|&op| op == c).map(|pos| pos as u8)
}

/// Alphabet character for an opcode below the flag range
pub fn char_for(opcode: u8) -> Option<char> {
    OP_CHARS.get(opcode as usize).map(|&c| c as char)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_positions() {
        assert_eq!(opcode_for(b'='), Some(OP_END));
        assert_eq!(opcode_for(b'+'), Some(OP_ADD));
        assert_eq!(opcode_for(b'<'), Some(OP_MIN));
        assert_eq!(opcode_for(b'('), Some(OP_OPEN));
        assert_eq!(opcode_for(b'|'), Some(OP_ABS));
        assert_eq!(opcode_for(b' '), None);
        assert_eq!(char_for(OP_CLOSE), Some(')'));
        assert_eq!(char_for(10), None);
    }

    #[test]
    fn test_decode_flags() {
        assert_eq!(Token::decode(CONST_FLAG | 3), Token::Const(3));
        assert_eq!(Token::decode(INPUT_FLAG | 31), Token::Input(31));
        // Both flags set: constant is checked first
        assert_eq!(Token::decode(CONST_FLAG | INPUT_FLAG | 2), Token::Const(2));
        assert_eq!(Token::decode(OP_DIV), Token::Op(Operator::Div));
        assert_eq!(Token::decode(17), Token::Unknown(17));
    }

    #[test]
    fn test_operator_apply() {
        assert_eq!(Operator::Add.apply(2.0, 3.0), 5.0);
        assert_eq!(Operator::Sub.apply(2.0, 3.0), -1.0);
        assert_eq!(Operator::Mult.apply(2.0, 3.0), 6.0);
        assert_eq!(Operator::Div.apply(6.0, 3.0), 2.0);
        assert_eq!(Operator::Div.apply(6.0, 0.0), 0.0);
        assert_eq!(Operator::Min.apply(2.0, 3.0), 2.0);
        assert_eq!(Operator::Max.apply(2.0, 3.0), 3.0);
    }

    #[test]
    fn test_operator_identity() {
        assert_eq!(Operator::Mult.identity(), 1.0);
        assert_eq!(Operator::Div.identity(), 1.0);
        assert_eq!(Operator::Sub.identity(), 0.0);
    }
}
