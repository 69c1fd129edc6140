#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use latestdoc::listing::{extract_links, select_latest};

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);
    let base = Url::parse("https://example.com/").unwrap();

    // Neither step may panic, whatever the markup looks like
    let candidates = extract_links(&html, &base, "redirect_file.php");
    if let Some(latest) = select_latest(&candidates) {
        assert!(candidates.contains(latest));
    }
});
