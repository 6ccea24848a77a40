//! Navigation links for a result page and the response envelope that
//! carries them.

use serde::Serialize;
use url::Url;

use crate::page::PageResult;

/// first / next / last links of a page. `next` is absent on the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub first: Url,
    pub next: Option<Url>,
    pub last: Url,
}

impl PageLinks {
    /// Pure function of the page descriptor and the base URI. Any query
    /// string or fragment already on `base` is dropped.
    pub fn build<T>(page: &PageResult<T>, base: &Url) -> Self {
        let last_page = page.last_page_number();
        let next = page.has_next().then(|| page_url(base, page.number + 1, page.size));

        Self {
            first: page_url(base, 0, page.size),
            next,
            last: page_url(base, last_page, page.size),
        }
    }
}

fn page_url(base: &Url, number: u64, size: u64) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut()
        .append_pair("page", &number.to_string())
        .append_pair("size", &size.to_string());
    url
}

/// Response body of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub data: Vec<T>,
    pub total_elements: u64,
    pub page_size: u64,
    pub first: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Url>,
    pub last: Url,
}

impl<T> PageEnvelope<T> {
    pub fn from_page(page: PageResult<T>, base: &Url) -> Self {
        let links = PageLinks::build(&page, base);
        Self {
            data: page.items,
            total_elements: page.total_elements,
            page_size: page.size,
            first: links.first,
            next: links.next,
            last: links.last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageRequest;

    fn base() -> Url {
        Url::parse("http://localhost:8080/api/v1/profiles").unwrap()
    }

    fn page(total: u64, number: u64, size: u64) -> PageResult<u64> {
        let start = number * size;
        let items: Vec<u64> = (start..total.min(start + size)).collect();
        PageResult::new(items, total, PageRequest::new(number, size))
    }

    #[test]
    fn test_middle_page_has_next() {
        let links = PageLinks::build(&page(95, 2, 20), &base());
        assert_eq!(links.first.as_str(), "http://localhost:8080/api/v1/profiles?page=0&size=20");
        assert_eq!(
            links.next.as_ref().map(Url::as_str),
            Some("http://localhost:8080/api/v1/profiles?page=3&size=20")
        );
        assert_eq!(links.last.as_str(), "http://localhost:8080/api/v1/profiles?page=4&size=20");
    }

    #[test]
    fn test_last_page_has_no_next() {
        let links = PageLinks::build(&page(95, 4, 20), &base());
        assert_eq!(links.next, None);
        assert_eq!(links.first.as_str(), "http://localhost:8080/api/v1/profiles?page=0&size=20");
        assert_eq!(links.last.as_str(), "http://localhost:8080/api/v1/profiles?page=4&size=20");
    }

    #[test]
    fn test_next_link_follows_has_next() {
        for number in 0..5 {
            let result = page(95, number, 20);
            let links = PageLinks::build(&result, &base());
            assert_eq!(links.next.is_some(), result.has_next(), "page {}", number);
        }
    }

    #[test]
    fn test_empty_result() {
        let links = PageLinks::build(&page(0, 0, 20), &base());
        assert_eq!(links.next, None);
        assert_eq!(links.first, links.last);
        assert_eq!(links.last.as_str(), "http://localhost:8080/api/v1/profiles?page=0&size=20");
    }

    #[test]
    fn test_existing_query_is_replaced() {
        let base = Url::parse("https://api.gso.org/profiles?query=age%3E3&page=7#top").unwrap();
        let links = PageLinks::build(&page(10, 0, 5), &base);
        assert_eq!(links.first.as_str(), "https://api.gso.org/profiles?page=0&size=5");
        assert_eq!(links.next.unwrap().as_str(), "https://api.gso.org/profiles?page=1&size=5");
    }

    #[test]
    fn test_deterministic() {
        let p = page(57, 1, 10);
        assert_eq!(PageLinks::build(&p, &base()), PageLinks::build(&p, &base()));
    }

    #[test]
    fn test_envelope_json_omits_absent_next() {
        let envelope = PageEnvelope::from_page(page(3, 0, 20), &base());
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": [0, 1, 2],
                "totalElements": 3,
                "pageSize": 20,
                "first": "http://localhost:8080/api/v1/profiles?page=0&size=20",
                "last": "http://localhost:8080/api/v1/profiles?page=0&size=20",
            })
        );
    }

    #[test]
    fn test_envelope_json_with_next() {
        let envelope = PageEnvelope::from_page(page(95, 2, 20), &base());
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["next"], "http://localhost:8080/api/v1/profiles?page=3&size=20");
        assert_eq!(json["data"].as_array().map(Vec::len), Some(20));
    }
}
