//! Program decompiler for diagnostics

use crate::opcode::{self, Token};

/// Render `program` back to script text.
///
/// Stops at the first end sentinel. Constants print with up to four decimals
/// and at least one digit after the point.
pub fn render(program: &[u8], constants: &[f64]) -> String {
    let mut out = String::new();
    for &byte in program.iter().take_while(|&&byte| byte != opcode::OP_END) {
        match Token::decode(byte) {
            Token::Const(index) => {
                let value = constants.get(index).copied().unwrap_or(0.0);
                out.push_str(&format_constant(value));
            },
            Token::Input(channel) => {
                out.push_str(&format!("@{}", channel));
            },
            Token::Unknown(other) => {
                out.push_str(&format!("token({})", other));
            },
            _ => {
                if let Some(c) = opcode::char_for(byte) {
                    out.push(c);
                }
            },
        }
    }
    out
}

fn format_constant(value: f64) -> String {
    let mut text = format!("{:.4}", value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').len();
        text.truncate(trimmed);
        if text.ends_with('.') {
            text.push('0');
        }
    }
    text
}
