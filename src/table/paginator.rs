use std::ops::Range;

use serde::Serialize;

use super::TableError;

pub const PAGE_SIZES: [usize; 7] = [5, 10, 20, 50, 100, 150, 200];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageSize(usize);

impl PageSize {
    pub const DEFAULT: PageSize = PageSize(5);

    pub fn new(value: usize) -> Result<Self, TableError> {
        if PAGE_SIZES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(TableError::InvalidPageSize { value })
        }
    }

    pub fn parse(value: &str) -> Result<Self, TableError> {
        let raw = value.trim();
        let value = raw
            .parse::<usize>()
            .map_err(|_| TableError::PageSizeNotNumber {
                raw: raw.to_string(),
            })?;
        Self::new(value)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub fn total_pages(len: usize, size: PageSize) -> usize {
    len.div_ceil(size.get()).max(1)
}

pub fn page_bounds(len: usize, size: PageSize, page: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(size.get()).min(len);
    let end = page.saturating_mul(size.get()).min(len);
    start..end
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub number: usize,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageControls {
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub pages: Vec<PageLink>,
}

/// Current page and page size for one table.
///
/// The current page is kept within `1..=total_pages` for the length the
/// caller passes in; navigation outside that range is an error, not a clamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paginator {
    current: usize,
    size: PageSize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PageSize::DEFAULT)
    }
}

impl Paginator {
    pub fn new(size: PageSize) -> Self {
        Self { current: 1, size }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.size)
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.current < self.total_pages(len)
    }

    pub fn go_to(&mut self, page: usize, len: usize) -> Result<(), TableError> {
        let total_pages = self.total_pages(len);
        if page == 0 || page > total_pages {
            return Err(TableError::PageOutOfRange {
                requested: page,
                total_pages,
            });
        }
        self.current = page;
        Ok(())
    }

    pub fn next(&mut self, len: usize) -> Result<(), TableError> {
        if !self.has_next(len) {
            return Err(TableError::NextDisabled);
        }
        self.current += 1;
        Ok(())
    }

    pub fn previous(&mut self) -> Result<(), TableError> {
        if !self.has_previous() {
            return Err(TableError::PreviousDisabled);
        }
        self.current -= 1;
        Ok(())
    }

    pub fn set_size(&mut self, size: PageSize) {
        self.size = size;
        self.current = 1;
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    pub fn clamp(&mut self, len: usize) {
        self.current = self.current.clamp(1, self.total_pages(len));
    }

    pub fn bounds(&self, len: usize) -> Range<usize> {
        page_bounds(len, self.size, self.current)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.bounds(items.len())]
    }

    pub fn controls(&self, len: usize) -> PageControls {
        let pages = (1..=self.total_pages(len))
            .map(|number| PageLink {
                number,
                active: number == self.current,
            })
            .collect();
        PageControls {
            previous_enabled: self.has_previous(),
            next_enabled: self.has_next(len),
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_accepts_only_enumerated_values() {
        for size in PAGE_SIZES {
            assert_eq!(PageSize::new(size).unwrap().get(), size);
        }
        assert_eq!(
            PageSize::new(7),
            Err(TableError::InvalidPageSize { value: 7 })
        );
        assert_eq!(
            PageSize::parse(" abc "),
            Err(TableError::PageSizeNotNumber { raw: "abc".into() })
        );
        assert_eq!(
            PageSize::parse("7"),
            Err(TableError::InvalidPageSize { value: 7 })
        );
        assert_eq!(PageSize::parse(" 20 ").unwrap().get(), 20);
    }

    #[test]
    fn total_pages_is_ceil_with_minimum_one() {
        let five = PageSize::new(5).unwrap();
        assert_eq!(total_pages(0, five), 1);
        assert_eq!(total_pages(5, five), 1);
        assert_eq!(total_pages(6, five), 2);
        assert_eq!(total_pages(20, five), 4);
        assert_eq!(total_pages(21, five), 5);
    }

    #[test]
    fn pages_reassemble_the_sequence() {
        let items: Vec<usize> = (0..23).collect();
        for size in PAGE_SIZES {
            let size = PageSize::new(size).unwrap();
            let mut paginator = Paginator::new(size);
            let mut rebuilt = Vec::new();
            loop {
                rebuilt.extend_from_slice(paginator.slice(&items));
                if paginator.next(items.len()).is_err() {
                    break;
                }
            }
            assert_eq!(rebuilt, items, "page size {}", size.get());
            assert_eq!(
                paginator.current(),
                items.len().div_ceil(size.get()).max(1)
            );
        }
    }

    #[test]
    fn bounds_disable_previous_and_next() {
        let mut paginator = Paginator::default();
        assert!(!paginator.has_previous());
        assert_eq!(paginator.previous(), Err(TableError::PreviousDisabled));

        paginator.go_to(3, 12).unwrap();
        assert!(!paginator.has_next(12));
        assert_eq!(paginator.next(12), Err(TableError::NextDisabled));

        let controls = paginator.controls(12);
        assert!(controls.previous_enabled);
        assert!(!controls.next_enabled);
        assert_eq!(controls.pages.len(), 3);
        assert!(controls.pages[2].active);
    }

    #[test]
    fn out_of_range_pages_are_rejected() {
        let mut paginator = Paginator::default();
        assert_eq!(
            paginator.go_to(0, 12),
            Err(TableError::PageOutOfRange {
                requested: 0,
                total_pages: 3
            })
        );
        assert_eq!(
            paginator.go_to(4, 12),
            Err(TableError::PageOutOfRange {
                requested: 4,
                total_pages: 3
            })
        );
        assert_eq!(paginator.current(), 1);
    }

    #[test]
    fn changing_page_size_resets_to_first_page() {
        let mut paginator = Paginator::default();
        paginator.go_to(2, 12).unwrap();
        paginator.set_size(PageSize::new(10).unwrap());
        assert_eq!(paginator.current(), 1);
    }

    #[test]
    fn clamp_pulls_page_back_into_range() {
        let mut paginator = Paginator::default();
        paginator.go_to(3, 12).unwrap();
        paginator.clamp(6);
        assert_eq!(paginator.current(), 2);
        paginator.clamp(0);
        assert_eq!(paginator.current(), 1);
    }
}
