// HTML 页面渲染

use std::fmt::{self, Write};

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::types::{BrowseError, PageModel};

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Remote file explorer</title>
<style>
a {
    text-decoration: none;
}
body {
    font-family: verdana;
    font-size: 14px;
    padding-left: 10px;
}
</style>
</head>
<body>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

/// 将页面模型渲染到任意输出
///
/// 目录渲染为链接，文件仅展示名称；空列表渲染占位提示
pub fn render_html<W: Write>(page: &PageModel, out: &mut W) -> fmt::Result {
    out.write_str(PAGE_HEAD)?;

    if page.items.is_empty() {
        out.write_str("<div>\n<span>No items found.</span>\n</div>\n")?;
    }

    for item in &page.items {
        if item.is_dir {
            writeln!(
                out,
                "<div class=\"directory\">\n<a href=\"{}\">{}</a>\n</div>",
                encode_double_quoted_attribute(&item.target_url),
                encode_text(&item.name)
            )?;
        } else {
            writeln!(
                out,
                "<div class=\"file\">\n<span>{}</span>\n</div>",
                encode_text(&item.name)
            )?;
        }
    }

    out.write_str(PAGE_TAIL)
}

/// 渲染完整页面
pub fn render_page(page: &PageModel) -> Result<String, BrowseError> {
    let mut html = String::with_capacity(PAGE_HEAD.len() + page.items.len() * 96);
    render_html(page, &mut html)?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::types::ListItem;

    fn item(name: &str, url: &str, is_dir: bool) -> ListItem {
        ListItem {
            name: name.to_string(),
            target_url: url.to_string(),
            is_dir,
        }
    }

    #[test]
    fn test_empty_page_renders_placeholder() {
        let html = render_page(&PageModel::default()).unwrap();
        assert!(html.contains("No items found."));
        assert!(!html.contains("class=\"directory\""));
        assert!(!html.contains("class=\"file\""));
    }

    #[test]
    fn test_directory_linked_file_plain() {
        let page = PageModel {
            items: vec![
                item("docs", "/browse/%2Fhome/docs", true),
                item("readme.txt", "/browse/%2Fhome/readme.txt", false),
            ],
        };
        let html = render_page(&page).unwrap();

        assert!(html.contains("<a href=\"/browse/%2Fhome/docs\">docs</a>"));
        assert!(html.contains("<span>readme.txt</span>"));
        assert!(!html.contains("href=\"/browse/%2Fhome/readme.txt\""));
        assert!(!html.contains("No items found."));
        assert!(html.contains("<title>Remote file explorer</title>"));
    }

    #[test]
    fn test_names_html_escaped_once() {
        let page = PageModel {
            items: vec![
                item("a b&c", "/browse/%2Ftmp/a+b%26c", true),
                item("<script>", "/browse/%2Ftmp/%3Cscript%3E", false),
            ],
        };
        let html = render_page(&page).unwrap();

        assert!(html.contains("<a href=\"/browse/%2Ftmp/a+b%26c\">a b&amp;c</a>"));
        assert!(html.contains("<span>&lt;script&gt;</span>"));
        assert!(!html.contains("<script>"));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_write_failure_propagates() {
        assert!(render_html(&PageModel::default(), &mut FailingWriter).is_err());
    }
}
