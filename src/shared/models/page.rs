/// One slice of a larger result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub page: usize,
    pub size: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_elements: u64, page: usize, size: usize) -> Self {
        Self { items, total_elements, page, size }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size as u64)
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        (self.page as u64) + 1 >= self.total_pages()
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page: self.page,
            size: self.size,
        }
    }
}
