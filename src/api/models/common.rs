// 通用的数据结构定义

use serde::{Deserialize, Serialize};

/// 通用的API响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 请求是否成功
    pub success: bool,
    /// 错误消息，成功时为空
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 响应数据，错误时为None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 列表接口的分页信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }
}

/// 分页信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 当前页码，从1开始
    pub current_page: u32,
    pub total_pages: u32,
    /// 总记录数
    pub total_items: u64,
    /// 每页数量
    pub items_per_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// 根据页码、每页数量和总数计算分页信息
    pub fn new(current_page: u32, items_per_page: u32, total_items: u64) -> Self {
        let per_page = items_per_page.max(1);
        let total_pages = total_items.div_ceil(u64::from(per_page)) as u32;
        let current_page = current_page.max(1);
        Self {
            current_page,
            total_pages,
            total_items,
            items_per_page: per_page,
            has_next_page: current_page < total_pages,
            has_prev_page: current_page > 1,
        }
    }
}

/// 带分页的列表数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// 数据列表
    pub data: Vec<T>,
    /// 分页信息
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    /// 对一组完整数据按页切分
    pub fn from_items(items: Vec<T>, page: u32, per_page: u32) -> Self {
        let pagination = Pagination::new(page, per_page, items.len() as u64);
        let skip = (pagination.current_page as usize - 1) * pagination.items_per_page as usize;
        let data = items
            .into_iter()
            .skip(skip)
            .take(pagination.items_per_page as usize)
            .collect();
        Self { data, pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Ticket {
        id: String,
    }

    #[test]
    fn envelope_decodes_without_data_for_any_payload() {
        let error: ApiResponse<Ticket> =
            serde_json::from_str(r#"{"success":false,"message":"user 9 not found"}"#).unwrap();
        assert!(!error.success);
        assert!(error.data.is_none());
        assert!(error.pagination.is_none());

        let ok: ApiResponse<Ticket> =
            serde_json::from_str(r#"{"success":true,"data":{"id":"7"}}"#).unwrap();
        assert_eq!(ok.data.unwrap().id, "7");
    }

    #[test]
    fn pagination_flags_follow_page_position() {
        let first = Pagination::new(1, 10, 25);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next_page);
        assert!(!first.has_prev_page);

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);
    }

    #[test]
    fn empty_collection_has_no_pages() {
        let page = Paginated::<u32>::from_items(Vec::new(), 1, 10);
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_next_page);
        assert!(page.data.is_empty());
    }

    #[test]
    fn from_items_slices_requested_page() {
        let page = Paginated::from_items((1..=25).collect::<Vec<u32>>(), 3, 10);
        assert_eq!(page.data, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.pagination.total_items, 25);
    }

    #[test]
    fn pagination_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(Pagination::new(2, 5, 12)).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["itemsPerPage"], 5);
        assert_eq!(json["hasPrevPage"], true);
    }
}
