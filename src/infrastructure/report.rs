//! HTML report rendering for batch translation results

use chrono::Utc;
use serde::Serialize;

/// One translated line, paired with its source
#[derive(Debug, Clone, Serialize)]
pub struct TranslationPair {
    pub original: String,
    pub translated: String,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a self-contained side-by-side HTML document for a finished batch.
pub fn render_report(
    pairs: &[TranslationPair],
    source_language: &str,
    target_language: &str,
) -> String {
    let source = escape(source_language);
    let target = escape(target_language);

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Translation Results: {source} to {target}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; line-height: 1.6; }}
        h1 {{ color: #333; border-bottom: 1px solid #ddd; padding-bottom: 10px; }}
        .translation-container {{
            display: flex;
            margin-bottom: 20px;
            border-bottom: 1px solid #eee;
            padding-bottom: 15px;
        }}
        .original, .translated {{ flex: 1; padding: 10px; }}
        .original {{ border-right: 1px solid #eee; }}
        .header {{ font-weight: bold; margin-bottom: 10px; color: #555; }}
        .timestamp {{ color: #888; font-size: 0.8em; text-align: right; margin-top: 20px; }}
    </style>
</head>
<body>
    <h1>Translation Results: {source} to {target}</h1>
"#
    );

    for pair in pairs {
        html.push_str(&format!(
            r#"    <div class="translation-container">
        <div class="original">
            <div class="header">{source}</div>
            <div>{}</div>
        </div>
        <div class="translated">
            <div class="header">{target}</div>
            <div>{}</div>
        </div>
    </div>
"#,
            escape(&pair.original),
            escape(&pair.translated),
        ));
    }

    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
    html.push_str(&format!(
        "    <div class=\"timestamp\">Generated on {timestamp}</div>\n</body>\n</html>\n"
    ));

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(original: &str, translated: &str) -> TranslationPair {
        TranslationPair {
            original: original.to_string(),
            translated: translated.to_string(),
        }
    }

    #[test]
    fn test_report_lists_every_pair_side_by_side() {
        let pairs = vec![pair("Hello", "Bonjour"), pair("World", "Monde")];
        let html = render_report(&pairs, "English", "French");

        assert_eq!(html.matches("translation-container").count(), 2);
        assert!(html.contains("Bonjour"));
        assert!(html.contains("Monde"));
        assert!(html.contains("Translation Results: English to French"));
    }

    #[test]
    fn test_report_escapes_markup_in_content() {
        let pairs = vec![pair("<script>alert(1)</script>", "a & b")];
        let html = render_report(&pairs, "English", "German");

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
    }

    #[test]
    fn test_empty_report_is_still_a_document() {
        let html = render_report(&[], "English", "Spanish");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Generated on"));
    }
}
