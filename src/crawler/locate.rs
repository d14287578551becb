use crate::app::Result;
use crate::browser::BrowserDriver;

/// Elements matched by the first selector, in priority order, that yields any.
pub struct Located<E> {
    pub selector: String,
    pub elements: Vec<E>,
}

/// Try `selectors` in order and stop at the first non-empty result.
///
/// A lookup error aborts the search; an empty page yields `Ok(None)`.
pub async fn first_match<D: BrowserDriver>(
    driver: &D,
    selectors: &[String],
) -> Result<Option<Located<D::Element>>> {
    for selector in selectors {
        let elements = driver.find_all(selector).await?;
        if !elements.is_empty() {
            return Ok(Some(Located {
                selector: selector.clone(),
                elements,
            }));
        }
    }
    Ok(None)
}
