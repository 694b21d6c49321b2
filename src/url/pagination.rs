/// Builds the URL of one catalogue page
///
/// The page index is appended as a `/page/{index}` path suffix. A trailing
/// slash on the base is dropped first so the result never contains `//page`.
///
/// # Examples
///
/// ```
/// use catalogue_scraper::url::page_url;
///
/// assert_eq!(page_url("https://shop.example.com/shop", 2), "https://shop.example.com/shop/page/2");
/// assert_eq!(page_url("https://shop.example.com/shop/", 2), "https://shop.example.com/shop/page/2");
/// ```
pub fn page_url(base_url: &str, index: u32) -> String {
    format!("{}/page/{}", base_url.trim_end_matches('/'), index)
}

/// Builds the URLs for the inclusive page range `1..=num_pages`
///
/// Returns `(index, url)` pairs in page order. Empty when `num_pages` is 0.
pub fn page_urls(base_url: &str, num_pages: u32) -> Vec<(u32, String)> {
    (1..=num_pages)
        .map(|index| (index, page_url(base_url, index)))
        .collect()
}
