use crate::utils::error::{AdminError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AdminError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AdminError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AdminError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AdminError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AdminError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 請求欄位不可為空或只有空白
pub fn validate_required(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AdminError::validation(format!("{} cannot be empty", field_name)));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AdminError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 資源 id 會直接拼進 URL path，不允許空白、斜線或 `.` / `..` 路徑段
pub fn validate_resource_id(resource: &str, id: &str) -> Result<()> {
    validate_required(&format!("{} id", resource), id)?;

    if id.contains(['/', '\\', '?', '#']) {
        return Err(AdminError::validation(format!(
            "{} id '{}' contains reserved URL characters",
            resource, id
        )));
    }

    // Url::join 會解析 `.`、`..` 以及編碼後的 `%2e`
    let decoded = id.to_ascii_lowercase().replace("%2e", ".");
    if decoded.trim_matches('.').is_empty() {
        return Err(AdminError::validation(format!(
            "{} id '{}' is not a valid path segment",
            resource, id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.base_url", "https://example.com").is_ok());
        assert!(validate_url("api.base_url", "http://localhost:3000/api").is_ok());
        assert!(validate_url("api.base_url", "").is_err());
        assert!(validate_url("api.base_url", "invalid-url").is_err());
        assert!(validate_url("api.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("output.page_limit", 10, 1, 100).is_ok());
        assert!(validate_range("output.page_limit", 0, 1, 100).is_err());
        assert!(validate_range("output.page_limit", 101, 1, 100).is_err());
    }

    #[test]
    fn test_validate_resource_id() {
        assert!(validate_resource_id("disease", "clx123").is_ok());
        assert!(validate_resource_id("disease", "  ").is_err());
        assert!(validate_resource_id("disease", "../users").is_err());
        assert!(validate_resource_id("disease", "..\\users").is_err());
        assert!(validate_resource_id("disease", ".").is_err());
        assert!(validate_resource_id("disease", "..").is_err());
        assert!(validate_resource_id("disease", "%2e%2E").is_err());
        assert!(validate_resource_id("disease", ".%2e").is_err());
        assert!(validate_resource_id("disease", "v1.2").is_ok());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("comment", "Leaves curled").is_ok());
        match validate_required("comment", " \t ") {
            Err(AdminError::ValidationError { message }) => {
                assert_eq!(message, "comment cannot be empty")
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }
}
