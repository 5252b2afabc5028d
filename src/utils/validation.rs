use crate::domain::model::DatasetSource;
use crate::utils::error::{LpError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LpError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(LpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(LpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(LpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 資料集位置可以是 http(s) 端點或本地路徑
pub fn validate_dataset_location(field_name: &str, location: &str) -> Result<()> {
    validate_non_empty_string(field_name, location)?;
    match DatasetSource::parse(location) {
        DatasetSource::Endpoint(url) => validate_url(field_name, &url),
        DatasetSource::File(_) => validate_path(field_name, location),
    }
}

/// 檢查單一檔名的副檔名
pub fn validate_file_extension(
    field_name: &str,
    file: &str,
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(extension) => Ok(()),
        Some(extension) => Err(LpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(LpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| LpError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 與任何值比較皆為 false，需要另外擋下
    if !(value >= min && value <= max) {
        return Err(LpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sources.resources.endpoint", "https://example.com").is_ok());
        assert!(validate_url("sources.resources.endpoint", "http://example.com").is_ok());
        assert!(validate_url("sources.resources.endpoint", "").is_err());
        assert!(validate_url("sources.resources.endpoint", "invalid-url").is_err());
        assert!(validate_url("sources.resources.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_dataset_location() {
        assert!(validate_dataset_location("resources", "RecursosRepassados.json").is_ok());
        assert!(validate_dataset_location("resources", "https://www.fnde.gov.br/odata").is_ok());
        assert!(validate_dataset_location("resources", "http://").is_err());
        assert!(validate_dataset_location("resources", "  ").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("model.max_entities", 5, 1).is_ok());
        assert!(validate_positive_number("model.max_entities", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("output.model_file", "modelo.lp", &["lp"]).is_ok());
        assert!(validate_file_extension("output.model_file", "modelo.txt", &["lp"]).is_err());
        assert!(validate_file_extension("output.model_file", "modelo", &["lp"]).is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("model.fixed_minimum", 9000.0, 0.0, f64::MAX).is_ok());
        assert!(validate_range("model.fixed_minimum", -1.0, 0.0, f64::MAX).is_err());
        assert!(validate_range("model.fixed_minimum", f64::NAN, 0.0, f64::MAX).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("glpsol".to_string());
        let missing: Option<String> = None;
        assert_eq!(validate_required_field("solver.command", &present).unwrap(), "glpsol");
        assert!(validate_required_field("solver.command", &missing).is_err());
    }
}
