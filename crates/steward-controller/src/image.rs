//! Container image reference grammar
//!
//! An image is accepted when it is either a bare tag-like token
//! (`lts`, `2.150.1-alpine`) or a full registry reference of the form
//! `[domain[:port]/]path[:tag][@digest]`.

use std::sync::LazyLock;

use regex::Regex;

const TAG: &str = r"[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}";
const DOMAIN_COMPONENT: &str = r"(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])";
const NAME_COMPONENT: &str = r"[a-z0-9]+(?:(?:[._]|__|[-]*)[a-z0-9]+)*";
const DIGEST: &str = r"[A-Za-z][A-Za-z0-9]*(?:[-_+.][A-Za-z][A-Za-z0-9]*)*[:][[:xdigit:]]{32,}";

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{TAG}$")).expect("valid tag regex (verified by tests)")
});

static REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let domain = format!(r"{DOMAIN_COMPONENT}(?:\.{DOMAIN_COMPONENT})*(?::[0-9]+)?");
    let name = format!("(?:{domain}/)?{NAME_COMPONENT}(?:/{NAME_COMPONENT})*");
    Regex::new(&format!("^({name})(?::({TAG}))?(?:@({DIGEST}))?$"))
        .expect("valid reference regex (verified by tests)")
});

/// True if `image` is a syntactically valid image reference
pub fn is_valid_image(image: &str) -> bool {
    !image.is_empty() && (TAG_REGEX.is_match(image) || REFERENCE_REGEX.is_match(image))
}
