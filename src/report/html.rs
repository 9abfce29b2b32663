use crate::export::workbook::ResultSet;
use crate::pipeline::batch::SkippedItem;
use crate::table::table_model::COLUMNS;

// ============================================================================
// HTML views: input form, results, errors (inline CSS, no assets)
// ============================================================================

/// Input form: ZIP upload or URL entry.
pub fn render_home() -> String {
    page(
        "UI Test Case Generator",
        r#"<form method="post" action="/test_cases" enctype="multipart/form-data">
<fieldset>
<legend>Input method</legend>
<label><input type="radio" name="input_method" value="zip_upload" checked> Upload screenshots (ZIP)</label>
<label><input type="radio" name="input_method" value="url_input"> Crawl a URL</label>
</fieldset>
<p><label>ZIP file <input type="file" name="zip_file" accept=".zip,application/zip"></label></p>
<p><label>URL <input type="url" name="url" placeholder="https://example.com/login"></label></p>
<p><button type="submit">Generate test cases</button></p>
</form>"#,
    )
}

/// One table per source, plus a download link for the workbook.
pub fn render_results(
    results: &ResultSet,
    download_href: &str,
    skipped: &[SkippedItem],
) -> String {
    let mut body = format!(
        "<p class=\"summary\">{} sheet(s), {} test case(s). <a class=\"download\" href=\"{}\">Download workbook</a></p>\n",
        results.len(),
        results.total_rows(),
        escape_html(download_href)
    );

    for entry in results.entries() {
        body.push_str(&format!(
            "<section>\n<h2>{}</h2>\n<table>\n<tr>",
            escape_html(&entry.sheet_name)
        ));
        for column in COLUMNS {
            body.push_str(&format!("<th>{}</th>", escape_html(column)));
        }
        body.push_str("</tr>\n");
        for case in entry.table.iter() {
            body.push_str("<tr>");
            for cell in case.cells() {
                body.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
            body.push_str("</tr>\n");
        }
        body.push_str("</table>\n</section>\n");
    }

    if !skipped.is_empty() {
        body.push_str("<ul class=\"skipped\">\n");
        for item in skipped {
            body.push_str(&format!(
                "<li>Skipped {}: {}</li>\n",
                escape_html(&item.name),
                escape_html(item.kind)
            ));
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<p><a href=\"/\">Start over</a></p>");
    page("Generated Test Cases", &body)
}

pub fn render_error(message: &str) -> String {
    page(
        "Something went wrong",
        &format!(
            "<p class=\"error\">{}</p>\n<p><a href=\"/\">Try again</a></p>",
            escape_html(message)
        ),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f5f5f5; }}
.header {{ background: #2563EB; color: white; padding: 20px 30px; }}
.header h1 {{ margin: 0; font-size: 24px; }}
.content {{ max-width: 1100px; margin: 20px auto; padding: 0 20px; }}
section {{ background: white; border-radius: 6px; padding: 16px 20px; margin-bottom: 12px; }}
table {{ border-collapse: collapse; width: 100%; font-size: 14px; }}
th, td {{ border: 1px solid #ddd; padding: 6px 8px; text-align: left; vertical-align: top; }}
th {{ background: #2563EB; color: white; }}
.error {{ color: #c62828; font-weight: bold; }}
.skipped li {{ color: #666; font-size: 13px; }}
fieldset label {{ margin-right: 16px; }}
</style>
</head>
<body>
<div class="header"><h1>{title}</h1></div>
<div class="content">
{body}
</div>
</body>
</html>"##,
        title = escape_html(title),
        body = body,
    )
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
