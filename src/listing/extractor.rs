use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::listing::model::DocumentReference;

/// Collect every anchor whose `href` contains `marker`, in document order.
///
/// Relative hrefs are resolved against `base`; hrefs that cannot be resolved
/// are skipped.
pub fn extract_links(html: &str, base: &Url, marker: &str) -> Vec<DocumentReference> {
    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !href.contains(marker) {
            continue;
        }

        match base.join(href.trim()) {
            Ok(url) => {
                let text = element.text().collect::<String>();
                links.push(DocumentReference::new(text.trim(), url));
            }
            Err(e) => debug!("Skipping unresolvable href {:?}: {}", href, e),
        }
    }

    links
}
