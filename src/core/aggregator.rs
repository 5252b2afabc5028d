//! 將兩個資料集的逐筆記錄彙總為每個市政單位的數值。

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::domain::model::{Aggregation, Datasets};
use crate::utils::error::LpError;
use crate::utils::numeric::{parse_decimal_comma, stable_sum};

/// 純函式：相同輸入永遠得到相同的 `Aggregation`。
///
/// 實體順序為資源資料集中第一次成功解析出現的順序，再依 `max_entities` 截斷。
/// 無法解析的金額只記錄警告並跳過該筆，不會中止整個流程。
pub fn aggregate(data: &Datasets, max_entities: Option<usize>) -> Aggregation {
    let mut entities: Vec<String> = Vec::new();
    let mut resource_values: HashMap<String, Vec<f64>> = HashMap::new();
    let mut skipped_records = data.skipped_records;

    for record in &data.resources {
        let value = match parse_decimal_comma(&record.value_text) {
            Ok(value) => value,
            Err(reason) => {
                let err = LpError::InputParseError {
                    dataset: data.resources_label.clone(),
                    entity: record.entity.clone(),
                    field: "resource value".to_string(),
                    value: record.value_text.clone(),
                    reason,
                };
                tracing::warn!("⚠️ Skipping record: {}", err);
                skipped_records += 1;
                continue;
            }
        };

        match resource_values.entry(record.entity.clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().push(value),
            Entry::Vacant(slot) => {
                entities.push(record.entity.clone());
                slot.insert(vec![value]);
            }
        }
    }

    let resource_totals: HashMap<String, f64> = resource_values
        .into_iter()
        .map(|(entity, values)| (entity, stable_sum(values)))
        .collect();

    let mut student_counts: HashMap<String, u64> = HashMap::new();
    for record in &data.students {
        let count = student_counts.entry(record.entity.clone()).or_insert(0);
        *count = count.saturating_add(record.students);
    }

    let average_spend: HashMap<String, f64> = resource_totals
        .iter()
        .map(|(entity, total)| {
            let students = student_counts.get(entity).copied().unwrap_or(0).max(1);
            (entity.clone(), total / students as f64)
        })
        .collect();

    if let Some(max) = max_entities {
        if entities.len() > max {
            tracing::info!(
                "✂️ Truncating entity list from {} to {} entities",
                entities.len(),
                max
            );
            entities.truncate(max);
        }
    }

    tracing::debug!(
        "Aggregated {} entities ({} student groups, {} skipped records)",
        entities.len(),
        student_counts.len(),
        skipped_records
    );

    Aggregation {
        entities,
        resource_totals,
        student_counts,
        average_spend,
        skipped_records,
    }
}
