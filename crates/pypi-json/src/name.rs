//! Project name normalization.

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonicalize a project name according to PEP 503.
///
/// Lowercases the name and collapses every run of `-`, `_` and `.` into a
/// single `-`. Leading and trailing separators are kept, as the index does.
///
/// # Examples
///
/// ```
/// # use pypi_json::canonicalize_name;
/// assert_eq!(canonicalize_name("Flask"), "flask");
/// assert_eq!(canonicalize_name("Octo-Cheese"), "octo-cheese");
/// assert_eq!(canonicalize_name("django_rest_framework"), "django-rest-framework");
/// assert_eq!(canonicalize_name("Pillow.Image"), "pillow-image");
/// assert_eq!(canonicalize_name("my__package"), "my-package");
/// assert_eq!(canonicalize_name("a-_.b"), "a-b");
/// ```
pub fn canonicalize_name(name: &str) -> String {
    static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_.]+").unwrap());

    SEPARATORS.replace_all(name, "-").to_lowercase()
}
