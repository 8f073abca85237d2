//! Enum lowering.
//!
//! ```text
//! enum E { A, B = "b" }
//! ```
//! becomes
//! ```text
//! var E;
//! (function (E) {
//!     E[E["A"] = 0] = "A";
//!     E["B"] = "b";
//! })(E || (E = {}));
//! ```
//! Member initializers are folded where they are constant, so declaration
//! output and the lowering agree on every value.

use std::collections::HashMap;

use tsdual_ast::factory::{assign, expr_stmt, ident, index, number, string};
use tsdual_ast::*;

use crate::namespace::{iife, Binding};
use crate::rename::{Replacement, Substitution};
use crate::EmitDiagnostic;

/// Value of a constant enum member.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    Number(f64),
    String(String),
}

/// One member after evaluation; `value` is `None` when the initializer is
/// not a constant expression.
#[derive(Debug, Clone)]
pub struct EvaluatedMember {
    pub name: String,
    pub value: Option<EnumValue>,
    pub init: Option<Node<Expr>>,
}

/// Folds member values in declaration order.
pub fn evaluate_enum(decl: &EnumDecl) -> Result<Vec<EvaluatedMember>, EmitDiagnostic> {
    let enum_name = decl.name.value.name.as_str();
    let mut known: HashMap<String, EnumValue> = HashMap::new();
    let mut members = Vec::with_capacity(decl.members.len());
    // Value to auto-increment from; `None` after a member that cannot be
    // incremented (strings and computed values)
    let mut next: Option<f64> = Some(0.0);

    for member in &decl.members {
        let name = member.name.value.name.clone();
        let value = match &member.init {
            Some(init) => evaluate(&init.value, enum_name, &known),
            None => match next {
                Some(n) => Some(EnumValue::Number(n)),
                None => {
                    return Err(EmitDiagnostic::new(
                        "Enum member must have initializer.",
                        member.name.span,
                        1061,
                    ))
                }
            },
        };

        next = match &value {
            Some(EnumValue::Number(n)) => Some(n + 1.0),
            _ => None,
        };
        if let Some(value) = &value {
            known.insert(name.clone(), value.clone());
        }
        members.push(EvaluatedMember {
            name,
            value,
            init: member.init.clone(),
        });
    }

    Ok(members)
}

fn evaluate(expr: &Expr, enum_name: &str, known: &HashMap<String, EnumValue>) -> Option<EnumValue> {
    match expr {
        Expr::Literal(Literal::Number(n)) => Some(EnumValue::Number(*n)),
        Expr::Literal(Literal::String(s)) => Some(EnumValue::String(s.clone())),
        Expr::Template { parts, exprs } if exprs.is_empty() && !parts.iter().any(|p| p.contains('\\')) => {
            Some(EnumValue::String(parts.concat()))
        }
        Expr::Paren(inner)
        | Expr::TypeCast { expr: inner, .. }
        | Expr::Satisfies { expr: inner, .. }
        | Expr::NonNullAssertion(inner) => evaluate(&inner.value, enum_name, known),
        Expr::Ident(ident) => known.get(&ident.name).cloned(),
        Expr::Member { object, property } if object.value.is_ident(enum_name) => {
            known.get(&property.value.name).cloned()
        }
        Expr::Index { object, index } if object.value.is_ident(enum_name) => match &index.value {
            Expr::Literal(Literal::String(key)) => known.get(key).cloned(),
            _ => None,
        },
        Expr::Unary { op, expr } => {
            let EnumValue::Number(n) = evaluate(&expr.value, enum_name, known)? else {
                return None;
            };
            let value = match op {
                UnaryOp::Plus => n,
                UnaryOp::Minus => -n,
                UnaryOp::BitNot => !to_int32(n) as f64,
                _ => return None,
            };
            Some(EnumValue::Number(value))
        }
        Expr::Binary { left, op, right } => {
            let left = evaluate(&left.value, enum_name, known)?;
            let right = evaluate(&right.value, enum_name, known)?;
            fold_binary(*op, left, right)
        }
        _ => None,
    }
}

fn fold_binary(op: BinaryOp, left: EnumValue, right: EnumValue) -> Option<EnumValue> {
    use EnumValue::{Number, String};

    match (left, right) {
        (Number(l), Number(r)) => {
            let value = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                BinaryOp::Mod => l % r,
                BinaryOp::Pow => l.powf(r),
                BinaryOp::BitAnd => (to_int32(l) & to_int32(r)) as f64,
                BinaryOp::BitOr => (to_int32(l) | to_int32(r)) as f64,
                BinaryOp::BitXor => (to_int32(l) ^ to_int32(r)) as f64,
                BinaryOp::LeftShift => to_int32(l).wrapping_shl(to_int32(r) as u32 & 31) as f64,
                BinaryOp::RightShift => to_int32(l).wrapping_shr(to_int32(r) as u32 & 31) as f64,
                BinaryOp::UnsignedRightShift => {
                    (to_int32(l) as u32).wrapping_shr(to_int32(r) as u32 & 31) as f64
                }
                _ => return None,
            };
            Some(Number(value))
        }
        (String(l), String(r)) if op == BinaryOp::Add => Some(String(l + &r)),
        (String(l), Number(r)) if op == BinaryOp::Add => {
            Some(String(l + &crate::printer::format_number(r)))
        }
        (Number(l), String(r)) if op == BinaryOp::Add => {
            Some(String(crate::printer::format_number(l) + &r))
        }
        _ => None,
    }
}

/// ECMAScript ToInt32.
fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let truncated = value.trunc() % 4_294_967_296.0;
    let wrapped = if truncated < 0.0 {
        truncated + 4_294_967_296.0
    } else {
        truncated
    };
    wrapped as u32 as i32
}

/// Lowers a non-ambient enum to its declaration plus IIFE. `declare_var`
/// is false when the name is already bound (merged declarations).
pub(crate) fn lower_enum(
    decl: &EnumDecl,
    binding: Binding,
    declare_var: Option<VarDeclKind>,
    diagnostics: &mut Vec<EmitDiagnostic>,
) -> Vec<Node<Stmt>> {
    let name = decl.name.value.name.as_str();
    let members = match evaluate_enum(decl) {
        Ok(members) => members,
        Err(diagnostic) => {
            diagnostics.push(diagnostic);
            return Vec::new();
        }
    };

    // Non-constant initializers may refer to earlier members by bare name
    let mut member_refs = Substitution::default();
    for member in &members {
        member_refs.insert(
            member.name.clone(),
            Replacement::new(tsdual_ast::factory::member(ident(name), member.name.clone())),
        );
    }

    let mut body = Vec::with_capacity(members.len());
    for member in members {
        let key = index(ident(name), string(member.name.clone()));
        let stmt = match (member.value, member.init) {
            (Some(EnumValue::String(value)), _) => assign(key, string(value)),
            (Some(EnumValue::Number(value)), _) => reverse_mapped(name, key, number(value), &member.name),
            (None, Some(mut init)) => {
                member_refs.apply_expr(&mut init);
                reverse_mapped(name, key, init, &member.name)
            }
            (None, None) => continue,
        };
        body.push(expr_stmt(stmt));
    }

    let mut stmts = Vec::new();
    if let Some(kind) = declare_var {
        stmts.push(tsdual_ast::factory::var_stmt(kind, name, None));
    }
    stmts.push(iife(name, body, binding));
    stmts
}

/// `E[E["A"] = value] = "A"`
fn reverse_mapped(enum_name: &str, key: Node<Expr>, value: Node<Expr>, member: &str) -> Node<Expr> {
    assign(index(ident(enum_name), assign(key, value)), string(member))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_program;
    use pretty_assertions::assert_eq;

    fn parse_enum(source: &str) -> EnumDecl {
        let program = tsdual_parser::parse_source(source, 0).unwrap();
        match program.items.into_iter().next().map(|item| item.value) {
            Some(ModuleItem::Stmt(Stmt::Decl(Decl::Enum(decl)))) => decl,
            other => panic!("expected enum, got {:?}", other),
        }
    }

    fn values(source: &str) -> Vec<Option<EnumValue>> {
        evaluate_enum(&parse_enum(source))
            .unwrap()
            .into_iter()
            .map(|member| member.value)
            .collect()
    }

    #[test]
    fn test_auto_increment_and_folding() {
        assert_eq!(
            values("enum E { A, B = 5, C, D = B * 2, E = 1 << 3 | 1, F = ~0 }"),
            vec![
                Some(EnumValue::Number(0.0)),
                Some(EnumValue::Number(5.0)),
                Some(EnumValue::Number(6.0)),
                Some(EnumValue::Number(10.0)),
                Some(EnumValue::Number(9.0)),
                Some(EnumValue::Number(-1.0)),
            ]
        );
    }

    #[test]
    fn test_string_members() {
        assert_eq!(
            values("enum S { A = \"a\", B = A + \"b\", C = `c` }"),
            vec![
                Some(EnumValue::String("a".into())),
                Some(EnumValue::String("ab".into())),
                Some(EnumValue::String("c".into())),
            ]
        );
    }

    #[test]
    fn test_missing_initializer_after_string() {
        let err = evaluate_enum(&parse_enum("enum S { A = \"a\", B }")).unwrap_err();
        assert_eq!(err.code, 1061);
    }

    #[test]
    fn test_lowered_shape() {
        let decl = parse_enum("enum Color { Red, Green = \"g\", Size = \"abc\".length }");
        let mut diagnostics = Vec::new();
        let stmts = lower_enum(&decl, Binding::Local, Some(VarDeclKind::Var), &mut diagnostics);
        let program = Program {
            items: stmts.into_iter().map(tsdual_ast::factory::item).collect(),
            span: Span::default(),
        };
        assert!(diagnostics.is_empty());
        assert_eq!(
            print_program(&program),
            "var Color;\n(function (Color) {\n    Color[Color[\"Red\"] = 0] = \"Red\";\n    Color[\"Green\"] = \"g\";\n    Color[Color[\"Size\"] = \"abc\".length] = \"Size\";\n})(Color || (Color = {}));\n"
        );
    }

    #[test]
    fn test_computed_member_refers_to_earlier_member() {
        let decl = parse_enum("enum E { A = 1, B = A + f() }");
        let mut diagnostics = Vec::new();
        let stmts = lower_enum(&decl, Binding::Local, None, &mut diagnostics);
        let program = Program {
            items: stmts.into_iter().map(tsdual_ast::factory::item).collect(),
            span: Span::default(),
        };
        let output = print_program(&program);
        assert!(output.contains("E[E[\"B\"] = E.A + f()] = \"B\";"), "{}", output);
        assert!(!output.starts_with("var E;"));
    }
}
