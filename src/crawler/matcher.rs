//! Structural element predicates
//!
//! Every heuristic the extractor applies (which `div` is a product card, which
//! element holds the title or the price, which markup is a superseded price,
//! which image is usable) is an [`ElementMatcher`]. The extractor only walks
//! the tree; the matchers decide.

use crate::url::is_absolute_http;
use scraper::ElementRef;

/// Predicate over a single element
pub trait ElementMatcher: Send + Sync {
    fn matches(&self, element: &ElementRef<'_>) -> bool;
}

/// Keyword pattern over the `class` attribute
///
/// Matching ignores ASCII case. With a `lead` keyword, the lead must occur and
/// one of the `any_of` keywords must occur somewhere after it
/// (`product-title` matches lead `product` + `title`, `title-product` does
/// not). Without a lead, any `any_of` keyword anywhere is enough.
///
/// The pattern is tested against each whitespace-separated class token and
/// against the whole attribute value.
#[derive(Debug, Clone)]
pub struct ClassPattern {
    lead: Option<String>,
    any_of: Vec<String>,
}

impl ClassPattern {
    pub fn new(lead: Option<&str>, any_of: &[&str]) -> Self {
        Self {
            lead: lead.map(str::to_ascii_lowercase),
            any_of: any_of.iter().map(|k| k.to_ascii_lowercase()).collect(),
        }
    }

    /// `product` followed by `card`, `details` or `inner`
    pub fn product_card() -> Self {
        Self::new(Some("product"), &["card", "details", "inner"])
    }

    /// `product` followed by `title`, `brand` or `name`
    pub fn product_title() -> Self {
        Self::new(Some("product"), &["title", "brand", "name"])
    }

    /// `price` or `cost` anywhere
    pub fn price() -> Self {
        Self::new(None, &["price", "cost"])
    }

    /// Tests a raw `class` attribute value
    pub fn matches_class(&self, class_attr: &str) -> bool {
        class_attr
            .split_whitespace()
            .any(|token| self.matches_value(token))
            || self.matches_value(class_attr)
    }

    fn matches_value(&self, value: &str) -> bool {
        let value = value.to_ascii_lowercase();
        let rest = match &self.lead {
            Some(lead) => match value.find(lead.as_str()) {
                Some(pos) => &value[pos + lead.len()..],
                None => return false,
            },
            None => value.as_str(),
        };
        self.any_of.iter().any(|keyword| rest.contains(keyword.as_str()))
    }
}

impl ElementMatcher for ClassPattern {
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        element
            .value()
            .attr("class")
            .is_some_and(|class| self.matches_class(class))
    }
}

/// Matches elements by tag name
#[derive(Debug, Clone, Copy)]
pub struct Tag(pub &'static [&'static str]);

impl Tag {
    /// Markup for a superseded original price: `<del>`, `<s>`, `<strike>`
    pub fn struck_price() -> Self {
        Self(&["del", "s", "strike"])
    }

    pub fn image() -> Self {
        Self(&["img"])
    }
}

impl ElementMatcher for Tag {
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let name = element.value().name();
        self.0.iter().any(|tag| tag.eq_ignore_ascii_case(name))
    }
}

/// Matches when both matchers match
#[derive(Debug, Clone)]
pub struct Both<A, B>(pub A, pub B);

impl<A: ElementMatcher, B: ElementMatcher> ElementMatcher for Both<A, B> {
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.0.matches(element) && self.1.matches(element)
    }
}

/// `<img>` whose `src` is an absolute `http(s)://` URL
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteImage;

impl ElementMatcher for AbsoluteImage {
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        Tag::image().matches(element)
            && element.value().attr("src").is_some_and(is_absolute_http)
    }
}

/// The set of matchers the extractor applies
pub struct Heuristics {
    pub card: Box<dyn ElementMatcher>,
    pub title: Box<dyn ElementMatcher>,
    pub price: Box<dyn ElementMatcher>,
    pub struck_price: Box<dyn ElementMatcher>,
    pub image: Box<dyn ElementMatcher>,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            card: Box::new(Both(Tag(&["div"]), ClassPattern::product_card())),
            title: Box::new(ClassPattern::product_title()),
            price: Box::new(ClassPattern::price()),
            struck_price: Box::new(Tag::struck_price()),
            image: Box::new(AbsoluteImage),
        }
    }
}
