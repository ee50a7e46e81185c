//! 文本格式化工具

const VIETNAMESE_FOLDS: [(&str, char); 7] = [
    ("àáạảãâầấậẩẫăằắặẳẵ", 'a'),
    ("èéẹẻẽêềếệểễ", 'e'),
    ("ìíịỉĩ", 'i'),
    ("òóọỏõôồốộổỗơờớợởỡ", 'o'),
    ("ùúụủũưừứựửữ", 'u'),
    ("ỳýỵỷỹ", 'y'),
    ("đ", 'd'),
];

/// 去掉越南语的声调和变音符号，只处理小写字母
fn fold_vietnamese(c: char) -> char {
    VIETNAMESE_FOLDS
        .iter()
        .find(|(accented, _)| accented.contains(c))
        .map_or(c, |(_, base)| *base)
}

/// 生成 URL slug：小写、去掉越南语变音、非字母数字合并成单个 `-`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.to_lowercase().chars().map(fold_vietnamese) {
        // 分解形式的组合附加符号直接丢弃
        if ('\u{300}'..='\u{36f}').contains(&c) {
            continue;
        }
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// 文件大小，1024 进制，最多两位小数
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_strips_vietnamese_marks() {
        assert_eq!(slugify("Khu Công nghệ cao Đà Nẵng"), "khu-cong-nghe-cao-da-nang");
        assert_eq!(slugify("Thư ngỏ của Trưởng ban"), "thu-ngo-cua-truong-ban");
    }

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slugify("  Investment -- Guide (2024)!  "), "investment-guide-2024");
        assert_eq!(slugify("***"), "");
        assert_eq!(slugify("Ca\u{301}c dư\u{323} a\u{301}n"), "cac-du-an");
    }

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
    }
}
