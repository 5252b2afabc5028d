use crate::domain::lp::{Constraint, LinearExpr, LowerBound, LpModel, Objective, ObjectiveSense, Sense};
use crate::domain::model::{EntityTotals, ModelSettings, ModelVariant};
use crate::utils::error::{LpError, Result};
use crate::utils::numeric::stable_sum;

pub const OBJECTIVE_LABEL: &str = "obj";
pub const TOTAL_RESOURCES_LABEL: &str = "total_resources";

pub fn variable_name(index: usize) -> String {
    format!("x{}", index)
}

pub fn minimum_label(index: usize) -> String {
    format!("min_muni{}", index)
}

pub fn average_spend_label(index: usize) -> String {
    format!("avg_student_spent_muni{}", index)
}

/// 依設定的變體把聚合向量轉為 LP 模型。
///
/// 變數 `xN` 的編號即 `totals` 的索引；輸出只依序走訪切片。
#[derive(Debug, Clone)]
pub struct LpModelBuilder {
    settings: ModelSettings,
}

impl LpModelBuilder {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn build(&self, totals: &[EntityTotals]) -> Result<LpModel> {
        if totals.is_empty() {
            return Err(LpError::EmptyModelError);
        }

        let variables: Vec<String> = (0..totals.len()).map(variable_name).collect();

        let objective = match self.settings.variant {
            ModelVariant::Simple => ratio_objective(totals, &variables),
            ModelVariant::Extended => LinearExpr::sum_of(variables.iter().cloned()),
        };

        let mut constraints = Vec::with_capacity(totals.len() * 2 + 1);
        for (i, (entity, var)) in totals.iter().zip(&variables).enumerate() {
            constraints.push(Constraint {
                name: minimum_label(i),
                expr: LinearExpr::sum_of([var.clone()]),
                sense: Sense::Ge,
                rhs: self.settings.minimum_amount,
            });

            // 兩條下限都輸出，由求解器決定哪條有效
            if self.settings.variant == ModelVariant::Extended {
                constraints.push(Constraint {
                    name: average_spend_label(i),
                    expr: LinearExpr::sum_of([var.clone()]),
                    sense: Sense::Ge,
                    rhs: entity.average_spend_per_student * entity.student_count as f64,
                });
            }
        }

        let total_resources = stable_sum(totals.iter().map(|e| e.resource_total));
        constraints.push(Constraint {
            name: TOTAL_RESOURCES_LABEL.to_string(),
            expr: LinearExpr::sum_of(variables.iter().cloned()),
            sense: Sense::Le,
            rhs: total_resources,
        });

        let bounds = variables
            .iter()
            .map(|v| LowerBound {
                variable: v.clone(),
                lower: 0.0,
            })
            .collect();

        tracing::debug!(
            "Built {} model: {} variables, {} constraints, total resources {}",
            self.settings.variant,
            variables.len(),
            constraints.len(),
            total_resources
        );

        Ok(LpModel {
            objective: Objective {
                sense: ObjectiveSense::Minimize,
                name: OBJECTIVE_LABEL.to_string(),
                expr: objective,
            },
            constraints,
            bounds,
            generals: variables,
        })
    }
}

/// 學生數為 0 的實體不進入目標函數（避免除以零），但仍保有變數宣告
fn ratio_objective(totals: &[EntityTotals], variables: &[String]) -> LinearExpr {
    let mut expr = LinearExpr::new();
    for (entity, var) in totals.iter().zip(variables) {
        if entity.student_count == 0 {
            continue;
        }
        expr.push(
            entity.resource_total / entity.student_count as f64,
            var.clone(),
        );
    }
    if expr.is_empty() {
        expr.push(0.0, variables[0].clone());
    }
    expr
}
