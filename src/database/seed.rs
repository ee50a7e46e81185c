//! 确定性的初始数据，同样的数量总是生成同样的用户

use chrono::{DateTime, Duration, Utc};

use crate::api::models::{Role, User};
use crate::utils::slugify;

const FAMILY_NAMES: [&str; 10] = [
    "Nguyễn", "Trần", "Lê", "Phạm", "Hoàng", "Huỳnh", "Phan", "Võ", "Đặng", "Bùi",
];
const MIDDLE_NAMES: [&str; 6] = ["Văn", "Thị", "Minh", "Thanh", "Quốc", "Ngọc"];
const GIVEN_NAMES: [&str; 16] = [
    "An", "Bình", "Châu", "Dũng", "Hà", "Hải", "Hùng", "Lan", "Linh", "Nam", "Phương", "Quân",
    "Sơn", "Thảo", "Trang", "Tuấn",
];

/// 每 6 个用户中 1 个管理员、2 个编辑、3 个只读
const ROLE_CYCLE: [&str; 6] = ["admin", "editor", "editor", "viewer", "viewer", "viewer"];

pub const EMAIL_DOMAIN: &str = "dseza.danang.gov.vn";

// 2024-01-01T08:00:00Z
fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_096_000, 0).unwrap_or_default()
}

pub fn roles() -> Vec<Role> {
    let defaults = [
        (
            "admin",
            "Quản trị viên",
            "Toàn quyền quản trị hệ thống",
            vec!["users.manage", "roles.manage", "articles.manage", "documents.manage"],
        ),
        (
            "editor",
            "Biên tập viên",
            "Đăng và chỉnh sửa tin bài, văn bản",
            vec!["articles.manage", "documents.manage"],
        ),
        (
            "viewer",
            "Người xem",
            "Chỉ xem nội dung quản trị",
            vec!["articles.read", "documents.read"],
        ),
    ];

    defaults
        .into_iter()
        .map(|(name, display_name, description, permissions)| Role {
            id: format!("role-{name}"),
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            permissions: permissions.into_iter().map(String::from).collect(),
            is_active: true,
            created_at: epoch(),
            updated_at: epoch(),
        })
        .collect()
}

/// 生成用户，id 从 "1" 开始递增；角色只取 `roles` 中存在的名称
pub fn users(count: usize, roles: &[Role]) -> Vec<User> {
    (0..count)
        .map(|i| {
            let family = FAMILY_NAMES[i % FAMILY_NAMES.len()];
            let middle = MIDDLE_NAMES[(i / FAMILY_NAMES.len() + i) % MIDDLE_NAMES.len()];
            let given = GIVEN_NAMES[(i * 7) % GIVEN_NAMES.len()];

            let slug = slugify(&format!("{given} {family}")).replace('-', ".");
            let username = format!("{slug}.{}", i + 1);
            let role = ROLE_CYCLE[i % ROLE_CYCLE.len()];
            let role = if roles.iter().any(|r| r.name == role) {
                role.to_string()
            } else {
                roles.first().map_or_else(|| role.to_string(), |r| r.name.clone())
            };
            let created_at = epoch() + Duration::hours(i as i64 * 6);

            User {
                id: (i + 1).to_string(),
                email: format!("{username}@{EMAIL_DOMAIN}"),
                username,
                role,
                is_active: i % 5 != 4,
                full_name: format!("{family} {middle} {given}"),
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}
