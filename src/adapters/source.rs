use crate::domain::model::{DatasetConfig, DatasetSource, ResourceRecord, StudentRecord};
use crate::utils::error::{LpError, Result};
use crate::utils::numeric::parse_decimal_comma;
use reqwest::Client;
use serde_json::Value;

/// 資料集頂層的記錄陣列鍵（OData 回應格式）
pub const RECORDS_KEY: &str = "value";

/// 從本地檔案或 HTTP 端點讀取 `{ "value": [...] }` 格式的資料集
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    client: Client,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn fetch_document(&self, config: &DatasetConfig) -> Result<Value> {
        let label = config.label();
        match &config.source {
            DatasetSource::File(path) => {
                tracing::debug!("Reading dataset file: {}", label);
                let content = tokio::fs::read_to_string(path).await.map_err(|source| {
                    LpError::DatasetReadError {
                        dataset: label.clone(),
                        source,
                    }
                })?;
                serde_json::from_str(&content).map_err(|source| LpError::DatasetFormatError {
                    dataset: label,
                    source,
                })
            }
            DatasetSource::Endpoint(url) => {
                tracing::debug!("Making API request to: {}", url);
                let mut request = self.client.get(url);
                if let Some(timeout) = config.timeout {
                    request = request.timeout(timeout);
                }

                let response = request.send().await?;
                tracing::debug!("API response status: {}", response.status());
                let response = response.error_for_status()?;
                Ok(response.json::<Value>().await?)
            }
        }
    }

    pub async fn load_resources(
        &self,
        config: &DatasetConfig,
    ) -> Result<(Vec<ResourceRecord>, usize)> {
        let document = self.fetch_document(config).await?;
        let items = record_array(document, &config.label())?;
        Ok(parse_resource_records(items, config))
    }

    pub async fn load_students(
        &self,
        config: &DatasetConfig,
    ) -> Result<(Vec<StudentRecord>, usize)> {
        let document = self.fetch_document(config).await?;
        let items = record_array(document, &config.label())?;
        Ok(parse_student_records(items, config))
    }
}

/// 取出 `value` 陣列；缺少此鍵時中止整個流程
pub fn record_array(document: Value, dataset: &str) -> Result<Vec<Value>> {
    match document {
        Value::Object(mut obj) => match obj.remove(RECORDS_KEY) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(LpError::MissingInputError {
                dataset: dataset.to_string(),
                key: RECORDS_KEY.to_string(),
            }),
        },
        _ => Err(LpError::MissingInputError {
            dataset: dataset.to_string(),
            key: RECORDS_KEY.to_string(),
        }),
    }
}

fn skip(dataset: &str, entity: &str, field: &str, value: &Value, reason: &str) {
    let err = LpError::InputParseError {
        dataset: dataset.to_string(),
        entity: entity.to_string(),
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    tracing::warn!("⚠️ Skipping record: {}", err);
}

fn entity_name<'a>(item: &'a Value, config: &DatasetConfig) -> Option<&'a str> {
    item.get(&config.entity_field).and_then(Value::as_str)
}

/// 金額保留原始文字，小數逗號留待聚合階段解析
pub fn parse_resource_records(
    items: Vec<Value>,
    config: &DatasetConfig,
) -> (Vec<ResourceRecord>, usize) {
    let label = config.label();
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for item in &items {
        let Some(entity) = entity_name(item, config) else {
            skip(&label, "<unknown>", &config.entity_field, item, "missing entity name");
            skipped += 1;
            continue;
        };

        let value_text = match item.get(&config.value_field) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                skip(&label, entity, &config.value_field, other, "unsupported value type");
                skipped += 1;
                continue;
            }
            None => {
                skip(&label, entity, &config.value_field, &Value::Null, "missing field");
                skipped += 1;
                continue;
            }
        };

        records.push(ResourceRecord {
            entity: entity.to_string(),
            value_text,
        });
    }

    tracing::debug!("Loaded {} resource records from {}", records.len(), label);
    (records, skipped)
}

fn student_count(value: &Value) -> std::result::Result<u64, String> {
    match value {
        Value::Number(n) => {
            if let Some(count) = n.as_u64() {
                return Ok(count);
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
                _ => Err("not a non-negative integer".to_string()),
            }
        }
        Value::String(text) => {
            let f = parse_decimal_comma(text)?;
            if f.fract() == 0.0 && f <= u64::MAX as f64 {
                Ok(f as u64)
            } else {
                Err("not an integer".to_string())
            }
        }
        Value::Null => Err("missing field".to_string()),
        _ => Err("unsupported value type".to_string()),
    }
}

pub fn parse_student_records(
    items: Vec<Value>,
    config: &DatasetConfig,
) -> (Vec<StudentRecord>, usize) {
    let label = config.label();
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for item in &items {
        let Some(entity) = entity_name(item, config) else {
            skip(&label, "<unknown>", &config.entity_field, item, "missing entity name");
            skipped += 1;
            continue;
        };

        let raw = item.get(&config.value_field).unwrap_or(&Value::Null);
        match student_count(raw) {
            Ok(students) => records.push(StudentRecord {
                entity: entity.to_string(),
                students,
            }),
            Err(reason) => {
                skip(&label, entity, &config.value_field, raw, &reason);
                skipped += 1;
            }
        }
    }

    tracing::debug!("Loaded {} student records from {}", records.len(), label);
    (records, skipped)
}
