use std::fmt;

/// A reconstructed GML expression sitting on the simulated operand stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    /// A single token: literal, name, asset.
    Atom(String),
    /// Several tokens that read as one value (`2 * pi`); parenthesized when nested.
    Compound(String),
    Unary {
        op: &'static str,
        operand: Box<Expr>,
    },
    Binary {
        op: &'static str,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn atom(text: impl Into<String>) -> Self {
        Expr::Atom(text.into())
    }

    pub fn unary(op: &'static str, operand: Expr) -> Self {
        Expr::Unary { op, operand: Box::new(operand) }
    }

    pub fn binary(op: &'static str, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call { .. })
    }

    fn needs_parens(&self) -> bool {
        matches!(self, Expr::Binary { .. } | Expr::Compound(_))
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_parens() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(v) => write!(f, "{}", v),
            Expr::Atom(s) | Expr::Compound(s) => write!(f, "{}", s),
            Expr::Unary { op, operand } => {
                write!(f, "{}", op)?;
                operand.fmt_operand(f)
            }
            Expr::Binary { op, lhs, rhs } => {
                lhs.fmt_operand(f)?;
                write!(f, " {} ", op)?;
                rhs.fmt_operand(f)
            }
            Expr::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Quotes a string literal the way GML source spells it.
pub fn quote_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "infinity" } else { "-infinity" }.to_string()
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_binaries_are_parenthesized() {
        let e = Expr::binary(
            "*",
            Expr::binary("+", Expr::Int(1), Expr::Int(2)),
            Expr::Compound("2 * pi".into()),
        );
        assert_eq!(e.to_string(), "(1 + 2) * (2 * pi)");
    }

    #[test]
    fn calls_render_arguments_in_order() {
        let e = Expr::Call {
            callee: "show_debug_message".into(),
            args: vec![Expr::atom(quote_string("a\"b")), Expr::unary("-", Expr::Int(3))],
        };
        assert_eq!(e.to_string(), "show_debug_message(\"a\\\"b\", -3)");
    }

    #[test]
    fn doubles() {
        assert_eq!(format_double(2.0), "2");
        assert_eq!(format_double(0.5), "0.5");
        assert_eq!(format_double(f64::INFINITY), "infinity");
        assert_eq!(format_double(f64::NAN), "NaN");
    }
}
