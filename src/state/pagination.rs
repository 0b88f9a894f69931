use super::data::Page;

/// Page cursor for a server-paginated list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
        }
    }
}

impl Pagination {
    /// Every page number, in order
    pub fn pages(&self) -> Vec<u32> {
        (1..=self.total_pages).collect()
    }

    /// Adopt the cursor reported by a response
    pub fn apply<T>(&mut self, page: &Page<T>) {
        self.current_page = page.current_page;
        self.total_pages = page.total_pages;
        self.total_items = page.total_items;
    }

    /// Move to `page`; returns false when it is already current
    pub fn go_to(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, vec![])]
    #[case(1, vec![1])]
    #[case(5, vec![1, 2, 3, 4, 5])]
    fn test_pages_enumerate_all(#[case] total_pages: u32, #[case] expected: Vec<u32>) {
        let pagination = Pagination {
            total_pages,
            ..Pagination::default()
        };
        assert_eq!(pagination.pages(), expected);
    }

    #[test]
    fn test_apply_and_go_to() {
        let mut pagination = Pagination::default();
        pagination.apply(&Page::<()> {
            items: vec![],
            total_pages: 7,
            total_items: 80,
            current_page: 3,
            page_size: Some(12),
        });
        assert_eq!(pagination.current_page, 3);
        assert_eq!(pagination.pages().len(), 7);

        assert!(!pagination.go_to(3));
        assert!(pagination.go_to(4));
        assert_eq!(pagination.current_page, 4);

        pagination.reset();
        assert_eq!(pagination.current_page, 1);
    }
}
