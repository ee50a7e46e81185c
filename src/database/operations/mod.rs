// 数据库操作实现
// 以 MockDatabase 的方法形式提供

pub mod role;
pub mod user;

use crate::error::DatabaseError;

/// 列表接口默认每页数量
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// 只做基本的格式检查：一个 `@`，域名里有 `.`，没有空白
pub(crate) fn validate_email(email: &str) -> Result<(), DatabaseError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DatabaseError::Invalid(format!("malformed email {email}")))
    }
}
