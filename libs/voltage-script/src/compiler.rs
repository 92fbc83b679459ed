//! Script compiler: formula text to packed opcode program
//!
//! Grammar:
//! - `@<int>` references an input channel
//! - `#<float>` is an inline constant
//! - characters of [`OP_CHARS`](crate::opcode::OP_CHARS) are operators and markers
//! - bare digits and `.` outside a reference are ignored
//!
//! Compilation never fails. Unrecognized characters are dropped.

use crate::opcode::{self, CONST_FLAG, INDEX_MASK, INPUT_FLAG, OP_END};

/// Compiled program and its constant pool
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledScript {
    program: Box<[u8]>,
    constants: Box<[f64]>,
}

impl CompiledScript {
    /// Opcode bytes, always terminated by the end sentinel
    pub fn program(&self) -> &[u8] {
        &self.program
    }

    pub fn constants(&self) -> &[f64] {
        &self.constants
    }

    /// Number of tokens before the end sentinel
    pub fn token_count(&self) -> usize {
        self.program.len() - 1
    }
}

/// Compile formula text.
///
/// Constants are stored back to front: the first `#` literal in the text
/// lands in the last pool slot.
pub fn compile(text: &str) -> CompiledScript {
    let bytes = text.as_bytes();

    let capacity = bytes.iter().filter(|&&c| !is_numeric(c)).count() + 1;
    let const_count = bytes.iter().filter(|&&c| c == b'#').count();

    let mut program = Vec::with_capacity(capacity);
    let mut constants = vec![0.0; const_count];
    let mut slot = const_count;

    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'@' => {
                let (channel, end) = parse_channel(bytes, pos + 1);
                program.push(INPUT_FLAG | (channel & INDEX_MASK as u32) as u8);
                pos = end;
            },
            b'#' => {
                slot -= 1;
                program.push(CONST_FLAG | (slot as u8 & INDEX_MASK));
                let (value, end) = parse_float(bytes, pos + 1);
                constants[slot] = value;
                pos = end;
            },
            c if is_numeric(c) => pos += 1,
            c => {
                if let Some(op) = opcode::opcode_for(c) {
                    program.push(op);
                }
                pos += 1;
            },
        }
    }
    program.push(OP_END);

    CompiledScript {
        program: program.into_boxed_slice(),
        constants: constants.into_boxed_slice(),
    }
}

fn is_numeric(c: u8) -> bool {
    c.is_ascii_digit() || c == b'.'
}

fn scan_digits(bytes: &[u8], start: usize) -> usize {
    bytes[start.min(bytes.len())..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count()
}

/// Parse an unsigned decimal channel number starting at `start`.
///
/// Returns channel 0 and `start` when no digits follow.
fn parse_channel(bytes: &[u8], start: usize) -> (u32, usize) {
    let len = scan_digits(bytes, start);
    let channel = bytes[start..start + len]
        .iter()
        .fold(0u32, |acc, &d| acc.saturating_mul(10).saturating_add((d - b'0') as u32));
    (channel, start + len)
}

/// Parse a decimal float literal the way `strtof` does.
///
/// Accepts an optional sign, digits with an optional fraction, and an optional
/// exponent. Returns 0.0 and `start` when no number is present.
fn parse_float(bytes: &[u8], start: usize) -> (f64, usize) {
    let mut end = start;
    if matches!(bytes.get(end), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_digits = scan_digits(bytes, end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = scan_digits(bytes, end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return (0.0, start);
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_digits = scan_digits(bytes, exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    let value = std::str::from_utf8(&bytes[start..end])
        .ok()
        .and_then(|literal| literal.parse::<f64>().ok())
        .unwrap_or(0.0);
    (value, end)
}
