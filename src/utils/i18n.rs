//! 双语（越南语/英语）文本

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Vi,
    En,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" | "vi-vn" => Ok(Language::Vi),
            "en" | "en-us" | "en-gb" => Ok(Language::En),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

/// 角色的显示名称，未知角色原样返回
pub fn role_label(role: &str, language: Language) -> &str {
    match (role, language) {
        ("admin", Language::Vi) => "Quản trị viên",
        ("admin", Language::En) => "Administrator",
        ("editor", Language::Vi) => "Biên tập viên",
        ("editor", Language::En) => "Editor",
        ("viewer", Language::Vi) => "Người xem",
        ("viewer", Language::En) => "Viewer",
        ("user", Language::Vi) => "Người dùng",
        ("user", Language::En) => "User",
        _ => role,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_have_both_labels() {
        assert_eq!(role_label("admin", Language::Vi), "Quản trị viên");
        assert_eq!(role_label("editor", Language::En), "Editor");
    }

    #[test]
    fn unknown_roles_echo_their_name() {
        assert_eq!(role_label("investor-relations", Language::Vi), "investor-relations");
    }

    #[test]
    fn language_parses_locale_tags() {
        assert_eq!("vi-VN".parse::<Language>(), Ok(Language::Vi));
        assert_eq!("EN".parse::<Language>(), Ok(Language::En));
        assert!("fr".parse::<Language>().is_err());
    }
}
