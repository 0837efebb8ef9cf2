use crate::render::escape_html;

const INDEX_TEMPLATE: &str = include_str!("../../assets/index.html");
const FILES_PLACEHOLDER: &str = "__FILES_JSON__";

/// Dashboard page with the file list embedded as a JS array.
pub fn render_index(files: &[String]) -> String {
    // `<` escaped so a file name can never close the script element.
    let json = serde_json::to_string(files)
        .unwrap_or_else(|_| "[]".to_string())
        .replace('<', "\\u003c");
    INDEX_TEMPLATE.replacen(FILES_PLACEHOLDER, &json, 1)
}

/// A page fragment inside a minimal document shell with loose grid styles.
pub fn render_wrapper(name: &str, content: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Preview - {title}</title>
  <style>
    :root {{ color-scheme: light; }}
    * {{ box-sizing: border-box; }}
    body {{ margin: 0; padding: 24px; background: #f8fafc; }}
    img {{ max-width: 100%; height: auto; }}
    table {{ width: 100%; }}
    .row {{ display: flex; flex-wrap: wrap; margin: 0 -8px; }}
    .col-xs-12, .col-sm-6, .col-md-6 {{ width: 100%; padding: 0 8px; }}
    @media (min-width: 768px) {{ .col-sm-6 {{ width: 50%; }} }}
    @media (min-width: 992px) {{ .col-md-6 {{ width: 50%; }} }}
    .img-responsive {{ display: block; max-width: 100%; height: auto; }}
    .fd-h2 {{ font-weight: 900; font-size: 22px; margin: 20px 0 8px; color: #111827; }}
    .ms-nowline {{ font-size: 45px; font-weight: 900; color: #ffffff !important; letter-spacing: .02em; background: #b45309 !important; padding: 10px 14px; border-radius: 12px; display: inline-block; }}
  </style>
</head>
<body>
  <div id="fd-fragment">
{content}
  </div>
</body>
</html>"#,
        title = escape_html(name),
        content = content,
    )
}
