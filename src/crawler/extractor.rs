//! Product extraction from catalogue markup
//!
//! This module handles turning catalogue HTML into product records:
//! - Segmenting a page into product fragments (one per product card)
//! - Extracting title, price and image URL from each fragment
//!
//! Extraction never fails. A field the markup does not provide comes back as
//! an empty string and the record is still produced.

use crate::crawler::matcher::{ElementMatcher, Heuristics};
use crate::product::ProductRecord;
use scraper::{ElementRef, Html, Node};

/// Applies [`Heuristics`] to catalogue markup
#[derive(Default)]
pub struct Extractor {
    heuristics: Heuristics,
}

impl Extractor {
    pub fn new(heuristics: Heuristics) -> Self {
        Self { heuristics }
    }

    /// Parses a full page and extracts one record per product fragment
    ///
    /// Records come back in document order.
    ///
    /// # Example
    ///
    /// ```
    /// use catalogue_scraper::crawler::Extractor;
    ///
    /// let html = r#"<html><body>
    ///     <div class="product-card"><span class="product-title">A</span></div>
    ///     <div class="product-card"><span class="product-title">B</span></div>
    /// </body></html>"#;
    ///
    /// let records = Extractor::default().extract_page(html);
    /// assert_eq!(records.len(), 2);
    /// assert_eq!(records[1].title, "B");
    /// ```
    pub fn extract_page(&self, html: &str) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        self.fragments(&document)
            .into_iter()
            .map(|fragment| self.extract(fragment))
            .collect()
    }

    /// Extracts a record from a standalone fragment of markup
    ///
    /// # Example
    ///
    /// ```
    /// use catalogue_scraper::crawler::Extractor;
    ///
    /// let record = Extractor::default().extract_fragment(
    ///     r#"<div class="product-card"><span class="product-title">Widget</span><span class="price">$10</span><del>$20</del><img src="http://x/im.jpg"></div>"#,
    /// );
    /// assert_eq!(record.title, "Widget");
    /// assert_eq!(record.price, "$10");
    /// assert_eq!(record.image_url, "http://x/im.jpg");
    /// ```
    pub fn extract_fragment(&self, html: &str) -> ProductRecord {
        let fragment = Html::parse_fragment(html);
        self.extract(fragment.root_element())
    }

    /// Finds every product fragment in a parsed page, in document order
    ///
    /// A card nested inside another card is a fragment of its own.
    pub fn fragments<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| self.heuristics.card.matches(element))
            .collect()
    }

    /// Extracts title, price and image URL from one fragment
    ///
    /// The three fields are extracted independently.
    pub fn extract(&self, fragment: ElementRef<'_>) -> ProductRecord {
        ProductRecord {
            title: self.title(fragment),
            price: self.price(fragment),
            image_url: self.image_url(fragment),
        }
    }

    /// Trimmed text of the first title element
    fn title(&self, fragment: ElementRef<'_>) -> String {
        elements(fragment)
            .find(|element| self.heuristics.title.matches(element))
            .map(|element| element.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Trimmed text of the first price element, ignoring struck-through prices
    ///
    /// Struck-through markup is never a candidate and its text never counts
    /// towards a candidate's text, so a sale price wins over the original.
    fn price(&self, fragment: ElementRef<'_>) -> String {
        let struck = self.heuristics.struck_price.as_ref();

        elements(fragment)
            .filter(|element| !is_struck(element, fragment, struck))
            .find(|element| self.heuristics.price.matches(element))
            .map(|element| {
                let mut text = String::new();
                collect_text_skipping(element, struck, &mut text);
                text.trim().to_string()
            })
            .unwrap_or_default()
    }

    /// `src` of the first usable image
    fn image_url(&self, fragment: ElementRef<'_>) -> String {
        elements(fragment)
            .find(|element| self.heuristics.image.matches(element))
            .and_then(|element| element.value().attr("src"))
            .map(|src| src.trim().to_string())
            .unwrap_or_default()
    }
}

/// The fragment root and all its descendant elements, in document order
fn elements<'a>(fragment: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    fragment.descendants().filter_map(ElementRef::wrap)
}

/// Whether the element is, or sits inside, struck-through markup within the fragment
fn is_struck(element: &ElementRef<'_>, fragment: ElementRef<'_>, struck: &dyn ElementMatcher) -> bool {
    if struck.matches(element) {
        return true;
    }

    for ancestor in element.ancestors() {
        if ancestor.id() == fragment.id() {
            break;
        }
        if ElementRef::wrap(ancestor).is_some_and(|a| struck.matches(&a)) {
            return true;
        }
    }

    false
}

/// Appends the element's text, leaving out the subtrees `skip` matches
fn collect_text_skipping(element: ElementRef<'_>, skip: &dyn ElementMatcher, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !skip.matches(&child_element) {
                collect_text_skipping(child_element, skip, out);
            }
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}
