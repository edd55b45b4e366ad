use scraper::{ElementRef, Html, Selector};

use crate::error::CfError;
use crate::macros::select;

pub trait Scrape {
    fn elem(&self) -> ElementRef;

    fn find_first(&self, selector: &Selector) -> Option<ElementRef> {
        self.elem().select(selector).next()
    }
}

/// Extracts the hidden anti-forgery token from a form page.
///
/// The token is valid for exactly one subsequent POST to the page it was
/// scraped from; callers must fetch a fresh one per POST.
pub trait ExtractCsrfToken: Scrape {
    fn extract_csrf_token(&self) -> Result<&str, CfError> {
        let token = self
            .find_first(select!("form input[name=\"csrf_token\"]"))
            .ok_or(CfError::TokenNotFound)?
            .value()
            .attr("value")
            .ok_or(CfError::TokenNotFound)?;
        if token.is_empty() {
            Err(CfError::TokenNotFound)
        } else {
            Ok(token)
        }
    }
}

pub trait ElementRefExt {
    fn inner_text(&self) -> String;
}

impl ElementRefExt for ElementRef<'_> {
    fn inner_text(&self) -> String {
        self.text().fold("".to_owned(), |mut ret, s| {
            ret.push_str(s);
            ret
        })
    }
}

/// Scrapes the inline error element the site renders into a rejected form
/// response, if any.
pub fn scrape_error_message(html: &Html, selector: &Selector) -> Option<String> {
    html.root_element()
        .select(selector)
        .next()
        .map(|elem| elem.inner_text().trim().to_owned())
        .filter(|msg| !msg.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Page(Html);

    impl Page {
        fn parse(html: &str) -> Self {
            Self(Html::parse_document(html))
        }
    }

    impl Scrape for Page {
        fn elem(&self) -> ElementRef {
            self.0.root_element()
        }
    }

    impl ExtractCsrfToken for Page {}

    #[test]
    fn extracts_token_value() {
        let page = Page::parse(
            r#"<html><body>
                <form method="post">
                    <input type="hidden" name="csrf_token" value="deadbeef"/>
                </form>
            </body></html>"#,
        );
        assert_eq!(page.extract_csrf_token().unwrap(), "deadbeef");
    }

    #[test]
    fn extracts_first_token_when_page_has_several_forms() {
        let page = Page::parse(
            r#"<form><input name="csrf_token" value="first"/></form>
               <form><input name="csrf_token" value="second"/></form>"#,
        );
        assert_eq!(page.extract_csrf_token().unwrap(), "first");
    }

    #[test]
    fn missing_token_input_fails() {
        let page = Page::parse("<html><body><form></form></body></html>");
        assert!(matches!(
            page.extract_csrf_token(),
            Err(CfError::TokenNotFound)
        ));
    }

    #[test]
    fn empty_token_value_fails() {
        let page = Page::parse(r#"<form><input name="csrf_token" value=""/></form>"#);
        assert!(matches!(
            page.extract_csrf_token(),
            Err(CfError::TokenNotFound)
        ));
    }

    #[test]
    fn scrapes_inline_error_text() {
        let html = Html::parse_document(
            r#"<form><span class="error for__password">Invalid handle or password</span></form>"#,
        );
        assert_eq!(
            scrape_error_message(&html, select!("form .for__password")).as_deref(),
            Some("Invalid handle or password")
        );
        assert_eq!(scrape_error_message(&html, select!(".for__source")), None);
    }
}
