//! Server-rendered pages for the upload form and the result view.

use crate::inference::Prediction;

/// The upload form, optionally annotated with a rejection message.
pub fn index_page(error: Option<&str>) -> String {
    let error_html = match error {
        Some(message) => format!("<p class=\"error\">{}</p>\n", escape(message)),
        None => String::new(),
    };
    page(
        "Age Classifier",
        &format!(
            concat!(
                "<h1>Age Classifier</h1>\n",
                "<p>Upload a photo to estimate the age of the person in it.</p>\n",
                "{}",
                "<form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n",
                "  <input type=\"file\" name=\"file\" accept=\".png,.jpg,.jpeg\">\n",
                "  <button type=\"submit\">Classify</button>\n",
                "</form>\n"
            ),
            error_html
        ),
    )
}

/// The result view for a finished prediction.
pub fn result_page(prediction: &Prediction) -> String {
    page(
        "Prediction",
        &format!(
            concat!(
                "<h1>Prediction</h1>\n",
                "<img src=\"{}\" alt=\"uploaded image\">\n",
                "<p class=\"age\">Estimated age: <strong>{}</strong></p>\n",
                "<p class=\"confidence\">Confidence: {:.2}%</p>\n",
                "<p class=\"timestamp\">Classified at {}</p>\n",
                "<p><a href=\"/\">Classify another image</a></p>\n"
            ),
            escape(&prediction.image_url),
            escape(&prediction.age),
            prediction.confidence,
            prediction.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        ),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "  <meta charset=\"utf-8\">\n",
            "  <title>{}</title>\n",
            "  <link rel=\"stylesheet\" href=\"/static/style.css\">\n",
            "</head>\n",
            "<body>\n",
            "<main>\n{}</main>\n",
            "</body>\n",
            "</html>\n"
        ),
        escape(title),
        body
    )
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_form_posts_a_multipart_file_field() {
        let html = index_page(None);
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("name=\"file\""));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn rejections_are_shown_on_the_form() {
        let html = index_page(Some("No file selected"));
        assert!(html.contains("class=\"error\""));
        assert!(html.contains("No file selected"));
    }

    #[test]
    fn the_result_page_shows_label_confidence_and_image() {
        let prediction = Prediction::new(
            "20-29".to_string(),
            87.65,
            "/temp/abc123.png".to_string(),
        );
        let html = result_page(&prediction);
        assert!(html.contains("20-29"));
        assert!(html.contains("87.65%"));
        assert!(html.contains("src=\"/temp/abc123.png\""));
    }

    #[test]
    fn markup_in_values_is_escaped() {
        assert_eq!(escape("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
    }
}
