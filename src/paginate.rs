//! Splits an ordered list of items into numbered pages. Page 1 lives at the
//! collection's base path, page `n > 1` at `{base}page/{n}/`.

/// One page of a paginated list.
#[derive(Debug, PartialEq)]
pub struct PageSlice<'a, T> {
    pub number: usize,
    pub count: usize,
    pub route_path: String,
    pub prev_route_path: Option<String>,
    pub next_route_path: Option<String>,
    pub items: &'a [T],
}

/// The number of pages needed for `len` items. An empty list still gets one
/// (empty) page.
pub fn page_count(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    let len = len.max(1);
    match len % page_size {
        0 => len / page_size,
        _ => len / page_size + 1,
    }
}

/// The route path for page `number` of the collection rooted at `base`
/// (which must end in `/`), or `None` outside `[1, count]`.
pub fn page_route_path(base: &str, number: usize, count: usize) -> Option<String> {
    match number {
        0 => None,
        1 => Some(base.to_owned()),
        n if n <= count => Some(format!("{}page/{}/", base, n)),
        _ => None,
    }
}

/// Splits `items` into pages of `page_size` rooted at `base`.
pub fn paginate<'a, T>(
    items: &'a [T],
    base: &str,
    page_size: usize,
) -> Vec<PageSlice<'a, T>> {
    let page_size = page_size.max(1);
    let count = page_count(items.len(), page_size);
    (1..=count)
        .map(|number| {
            let start = ((number - 1) * page_size).min(items.len());
            let end = (start + page_size).min(items.len());
            PageSlice {
                number,
                count,
                // `number` is always within bounds here
                route_path: page_route_path(base, number, count)
                    .unwrap_or_else(|| base.to_owned()),
                prev_route_path: page_route_path(base, number - 1, count),
                next_route_path: page_route_path(base, number + 1, count),
                items: &items[start..end],
            }
        })
        .collect()
}
