//! 分页请求、分页结果与页大小限制

use serde::{Deserialize, Serialize};

/// 请求的页：页码从 0 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub number: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(number: u64, size: u64) -> Self {
        Self { number, size }
    }

    /// 该页第一条记录的偏移量
    pub fn offset(&self) -> u64 {
        self.number.saturating_mul(self.size)
    }
}

/// 页大小上限。超出上限的请求被静默截断，页码保持不变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGuard {
    max_page_size: u64,
}

impl PageGuard {
    pub fn new(max_page_size: u64) -> Self {
        Self { max_page_size }
    }

    pub fn clamp(&self, request: PageRequest) -> PageRequest {
        if request.size > self.max_page_size {
            log::debug!(
                "clamping page size {} to maximum {}",
                request.size,
                self.max_page_size
            );
        }
        PageRequest {
            number: request.number,
            size: request.size.min(self.max_page_size),
        }
    }
}

/// 一页查询结果
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub size: u64,
    pub number: u64,
}

impl<T> PageResult<T> {
    /// 由存储层返回的记录和总数构造
    pub fn new(items: Vec<T>, total_elements: u64, request: PageRequest) -> Self {
        debug_assert!(items.len() as u64 <= request.size);
        Self {
            items,
            total_elements,
            size: request.size,
            number: request.number,
        }
    }

    /// 最后一页的页码；没有记录时为 0
    pub fn last_page_number(&self) -> u64 {
        if self.size == 0 || self.total_elements == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size) - 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.last_page_number()
    }

    /// 转换每条记录（例如 model → dto），分页信息不变
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            size: self.size,
            number: self.number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_clamps_over_limit() {
        let guard = PageGuard::new(200);
        assert_eq!(guard.clamp(PageRequest::new(3, 500)), PageRequest::new(3, 200));
    }

    #[test]
    fn test_guard_identity_below_limit() {
        let guard = PageGuard::new(200);
        assert_eq!(guard.clamp(PageRequest::new(3, 50)), PageRequest::new(3, 50));
        assert_eq!(guard.clamp(PageRequest::new(0, 200)), PageRequest::new(0, 200));
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(2, 20).offset(), 40);
        assert_eq!(PageRequest::new(u64::MAX, 2).offset(), u64::MAX);
    }

    #[test]
    fn test_last_page_number() {
        let page = PageResult::new(vec![0; 20], 95, PageRequest::new(2, 20));
        assert_eq!(page.last_page_number(), 4);
        assert!(page.has_next());

        let exact = PageResult::new(vec![0; 20], 100, PageRequest::new(4, 20));
        assert_eq!(exact.last_page_number(), 4);
        assert!(!exact.has_next());

        let empty: PageResult<u8> = PageResult::new(vec![], 0, PageRequest::new(0, 20));
        assert_eq!(empty.last_page_number(), 0);
        assert!(!empty.has_next());
    }

    #[test]
    fn test_map_keeps_page_info() {
        let page = PageResult::new(vec![1, 2, 3], 13, PageRequest::new(1, 3));
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.items, vec!["1", "2", "3"]);
        assert_eq!(mapped.total_elements, 13);
        assert_eq!(mapped.size, 3);
        assert_eq!(mapped.number, 1);
    }
}
