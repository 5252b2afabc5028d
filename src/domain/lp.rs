//! CPLEX-LP 格式的模型表示與序列化。
//!
//! 所有區段都以 `Vec` 保存，輸出順序即插入順序；不依賴任何映射的迭代順序。

use std::fmt;

use crate::utils::numeric::format_lp_number;

/// 超過此寬度的線性式會換行續寫
pub const MAX_LINE_WIDTH: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub coefficient: f64,
    pub variable: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    pub terms: Vec<Term>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, coefficient: f64, variable: impl Into<String>) {
        self.terms.push(Term {
            coefficient,
            variable: variable.into(),
        });
    }

    /// 係數皆為 1 的加總式
    pub fn sum_of<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut expr = Self::new();
        for v in variables {
            expr.push(1.0, v);
        }
        expr
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.terms.len());
        for (i, term) in self.terms.iter().enumerate() {
            let magnitude = term.coefficient.abs();
            let body = if magnitude == 1.0 {
                term.variable.clone()
            } else {
                format!("{} {}", format_lp_number(magnitude), term.variable)
            };
            let token = match (i, term.coefficient.is_sign_negative()) {
                (0, false) => body,
                (0, true) => format!("- {}", body),
                (_, false) => format!("+ {}", body),
                (_, true) => format!("- {}", body),
            };
            tokens.push(token);
        }
        tokens
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Le => write!(f, "<="),
            Sense::Ge => write!(f, ">="),
            Sense::Eq => write!(f, "="),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub sense: ObjectiveSense,
    pub name: String,
    pub expr: LinearExpr,
}

/// `lower <= variable` 形式的下界
#[derive(Debug, Clone, PartialEq)]
pub struct LowerBound {
    pub variable: String,
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LpModel {
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
    pub bounds: Vec<LowerBound>,
    pub generals: Vec<String>,
}

impl LpModel {
    pub fn variable_count(&self) -> usize {
        self.generals.len()
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn to_lp_string(&self) -> String {
        self.to_string()
    }
}

/// 將 `head` 後接的項目依寬度換行；續行以兩個空白縮排
fn write_wrapped(
    f: &mut fmt::Formatter<'_>,
    head: &str,
    tokens: &[String],
    tail: &str,
) -> fmt::Result {
    let mut line = String::from(head);
    for token in tokens {
        if line.len() + 1 + token.len() > MAX_LINE_WIDTH && line.trim().len() > head.trim().len() {
            writeln!(f, "{}", line)?;
            line = String::from("  ");
            line.push_str(token);
        } else {
            if !line.ends_with(' ') {
                line.push(' ');
            }
            line.push_str(token);
        }
    }
    if !tail.is_empty() {
        line.push(' ');
        line.push_str(tail);
    }
    writeln!(f, "{}", line)
}

impl fmt::Display for LpModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.objective.sense {
            ObjectiveSense::Minimize => writeln!(f, "Minimize")?,
            ObjectiveSense::Maximize => writeln!(f, "Maximize")?,
        }
        let head = format!(" {}:", self.objective.name);
        write_wrapped(f, &head, &self.objective.expr.tokens(), "")?;

        writeln!(f, "Subject To")?;
        for c in &self.constraints {
            let head = format!(" {}:", c.name);
            let tail = format!("{} {}", c.sense, format_lp_number(c.rhs));
            write_wrapped(f, &head, &c.expr.tokens(), &tail)?;
        }

        writeln!(f, "Bounds")?;
        for b in &self.bounds {
            writeln!(f, " {} <= {}", format_lp_number(b.lower), b.variable)?;
        }

        writeln!(f, "Generals")?;
        for v in &self.generals {
            writeln!(f, " {}", v)?;
        }

        writeln!(f, "End")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_model() -> LpModel {
        let mut objective = LinearExpr::new();
        objective.push(2.5, "x0");
        objective.push(1.0, "x1");
        LpModel {
            objective: Objective {
                sense: ObjectiveSense::Minimize,
                name: "obj".to_string(),
                expr: objective,
            },
            constraints: vec![Constraint {
                name: "total_resources".to_string(),
                expr: LinearExpr::sum_of(["x0", "x1"]),
                sense: Sense::Le,
                rhs: 3000.0,
            }],
            bounds: vec![
                LowerBound {
                    variable: "x0".to_string(),
                    lower: 0.0,
                },
                LowerBound {
                    variable: "x1".to_string(),
                    lower: 0.0,
                },
            ],
            generals: vec!["x0".to_string(), "x1".to_string()],
        }
    }

    #[test]
    fn test_display_sections_in_order() {
        let text = tiny_model().to_lp_string();
        assert_eq!(
            text,
            "Minimize\n obj: 2.5 x0 + x1\nSubject To\n total_resources: x0 + x1 <= 3000\n\
             Bounds\n 0 <= x0\n 0 <= x1\nGenerals\n x0\n x1\nEnd\n"
        );
    }

    #[test]
    fn test_negative_coefficients() {
        let mut expr = LinearExpr::new();
        expr.push(-1.0, "x0");
        expr.push(-3.0, "x1");
        assert_eq!(expr.tokens(), vec!["- x0".to_string(), "- 3 x1".to_string()]);
    }

    #[test]
    fn test_long_expression_wraps() {
        let vars: Vec<String> = (0..200).map(|i| format!("x{}", i)).collect();
        let mut model = tiny_model();
        model.constraints[0].expr = LinearExpr::sum_of(vars.clone());
        let text = model.to_lp_string();

        for line in text.lines() {
            assert!(line.len() <= MAX_LINE_WIDTH + 16, "line too long: {}", line.len());
        }
        let joined: String = text
            .lines()
            .skip_while(|l| !l.starts_with(" total_resources:"))
            .take_while(|l| !l.starts_with("Bounds"))
            .collect::<Vec<_>>()
            .join(" ");
        for v in &vars {
            assert!(joined.split_whitespace().any(|t| t == v), "missing {}", v);
        }
        assert!(joined.trim_end().ends_with("<= 3000"));
    }
}
