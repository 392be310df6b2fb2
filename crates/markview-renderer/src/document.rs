//! HTML document shell around a rendered fragment.

use crate::resource::ResourceSet;

/// Wrap `fragment` in a complete HTML document.
///
/// Stylesheets come before scripts in `<head>`, each in set order.
///
/// # Example
///
/// ```
/// use markview_renderer::{ResourceSet, assemble_document};
///
/// let html = assemble_document("<p>hi</p>\n", &ResourceSet::new());
/// assert_eq!(
///     html,
///     "<html>\n<head>\n</head>\n<body>\n<div class=\"container\">\n<p>hi</p>\n</div>\n</body>\n</html>"
/// );
/// ```
#[must_use]
pub fn assemble_document(fragment: &str, resources: &ResourceSet) -> String {
    let head = resources.head_html();
    let mut html = String::with_capacity(fragment.len() + head.len() + 96);
    html.push_str("<html>\n<head>\n");
    html.push_str(&head);
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");
    html.push_str(fragment);
    html.push_str("</div>\n</body>\n</html>");
    html
}
