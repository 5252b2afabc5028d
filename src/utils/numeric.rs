//! 數值輔助：在地化小數解析、與輸入順序無關的加總、LP 數字格式

/// 解析以逗號為小數點的字串（例如 `"1234,56"`）。
///
/// 只替換第一個逗號；結果必須是有限且非負的數值。
pub fn parse_decimal_comma(text: &str) -> std::result::Result<f64, String> {
    let normalized = text.trim().replacen(',', ".", 1);
    if normalized.is_empty() {
        return Err("empty value".to_string());
    }

    let value: f64 = normalized
        .parse()
        .map_err(|e| format!("not a decimal number ({})", e))?;

    if !value.is_finite() {
        return Err("value is not finite".to_string());
    }
    if value < 0.0 {
        return Err("value is negative".to_string());
    }
    Ok(value)
}

/// Neumaier 補償加總，先以 `total_cmp` 排序，結果與輸入順序無關。
pub fn stable_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted: Vec<f64> = values.into_iter().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for v in sorted {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

/// LP 檔案用的數字格式：句點小數、無千分位、最短可還原表示。
///
/// `f64` 的 `Display` 不會輸出指數表示法，整數值不帶小數點。
pub fn format_lp_number(value: f64) -> String {
    if value == 0.0 {
        // 避免輸出 "-0"
        return "0".to_string();
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_comma() {
        assert_eq!(parse_decimal_comma("1234,56").unwrap(), 1234.56);
        assert_eq!(parse_decimal_comma(" 1000 ").unwrap(), 1000.0);
        assert_eq!(parse_decimal_comma("0,5").unwrap(), 0.5);
        assert_eq!(parse_decimal_comma("12.5").unwrap(), 12.5);
    }

    #[test]
    fn test_parse_decimal_comma_rejects_invalid() {
        assert!(parse_decimal_comma("abc").is_err());
        assert!(parse_decimal_comma("").is_err());
        assert!(parse_decimal_comma("1.234,56").is_err());
        assert!(parse_decimal_comma("NaN").is_err());
        assert!(parse_decimal_comma("inf").is_err());
        assert!(parse_decimal_comma("-10,0").is_err());
    }

    #[test]
    fn test_stable_sum_is_order_independent() {
        let forward = vec![1e16, 1.0, -1e16, 0.1, 0.2, 0.3];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(stable_sum(forward.clone()), stable_sum(backward));
        assert_eq!(stable_sum(vec![1000.0, 2000.0]), 3000.0);
        assert_eq!(stable_sum(Vec::new()), 0.0);
    }

    #[test]
    fn test_format_lp_number() {
        assert_eq!(format_lp_number(3000.0), "3000");
        assert_eq!(format_lp_number(1234.56), "1234.56");
        assert_eq!(format_lp_number(-0.0), "0");
        assert_eq!(format_lp_number(1e21), "1000000000000000000000");
        assert!(!format_lp_number(0.000001).contains('e'));
    }
}
