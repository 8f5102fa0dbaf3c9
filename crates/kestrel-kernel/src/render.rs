//! Converting displayed values into MIME-typed representations.

use base64::Engine;
use serde::Serialize;

use crate::error::{KernelError, KernelResult};
use crate::events::{FormattedValue, mime};

/// Encoded image bytes.
#[derive(Debug, Clone)]
pub struct ImageOutput {
    /// e.g. `image/png`
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageOutput {
    pub fn png(data: Vec<u8>) -> Self {
        Self {
            mime_type: mime::IMAGE_PNG.to_string(),
            data,
        }
    }

    fn to_formatted(&self) -> FormattedValue {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.data);
        FormattedValue::new(&self.mime_type, encoded)
    }
}

/// Values that can be displayed by the kernel.
///
/// Only the plain-text form is required. The richer forms return `None`
/// when a type has no such representation.
///
/// ```rust
/// use kestrel_kernel::render::Render;
///
/// struct Progress(u8);
///
/// impl Render for Progress {
///     fn render_text(&self) -> String {
///         format!("{}%", self.0)
///     }
///
///     fn render_html(&self) -> Option<String> {
///         Some(format!("<progress value='{}' max='100'></progress>", self.0))
///     }
/// }
/// ```
pub trait Render {
    fn render_text(&self) -> String;

    fn render_html(&self) -> Option<String> {
        None
    }

    fn render_image(&self) -> Option<ImageOutput> {
        None
    }

    fn render_data(&self) -> Option<serde_json::Value> {
        None
    }
}

/// Every representation `value` offers, plain text first.
pub fn all_formatted_values(value: &dyn Render) -> Vec<FormattedValue> {
    let mut values = vec![FormattedValue::plain(value.render_text())];
    if let Some(html) = value.render_html() {
        values.push(FormattedValue::new(mime::TEXT_HTML, html));
    }
    if let Some(data) = value.render_data() {
        values.push(FormattedValue::new(mime::APPLICATION_JSON, data.to_string()));
    }
    if let Some(image) = value.render_image() {
        values.push(image.to_formatted());
    }
    values
}

/// Render `value` to the requested MIME types, in request order.
///
/// An empty request yields every available representation.
pub fn formatted_values(value: &dyn Render, mime_types: &[&str]) -> KernelResult<Vec<FormattedValue>> {
    let available = all_formatted_values(value);
    if mime_types.is_empty() {
        return Ok(available);
    }

    mime_types
        .iter()
        .map(|wanted| {
            available
                .iter()
                .find(|v| v.mime_type == *wanted)
                .cloned()
                .ok_or_else(|| KernelError::UnsupportedMimeType(wanted.to_string()))
        })
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn json_html(pretty: &str) -> String {
    format!(
        "<pre><code class=\"language-json\">{}</code></pre>",
        escape_html(pretty)
    )
}

impl Render for String {
    fn render_text(&self) -> String {
        self.clone()
    }
}

impl Render for &str {
    fn render_text(&self) -> String {
        (*self).to_string()
    }
}

macro_rules! render_via_display {
    ($($ty:ty),*) => {
        $(
            impl Render for $ty {
                fn render_text(&self) -> String {
                    self.to_string()
                }

                fn render_data(&self) -> Option<serde_json::Value> {
                    serde_json::to_value(self).ok()
                }
            }
        )*
    };
}

render_via_display!(i32, i64, u32, u64, usize, f32, f64, bool);

impl<T: Render> Render for Vec<T> {
    fn render_text(&self) -> String {
        let items: Vec<String> = self.iter().map(Render::render_text).collect();
        format!("[{}]", items.join(", "))
    }

    fn render_html(&self) -> Option<String> {
        let items: String = self
            .iter()
            .map(|item| format!("<li>{}</li>", escape_html(&item.render_text())))
            .collect();
        Some(format!("<ul>{items}</ul>"))
    }
}

impl<T: Render> Render for Option<T> {
    fn render_text(&self) -> String {
        match self {
            Some(v) => v.render_text(),
            None => "None".to_string(),
        }
    }

    fn render_html(&self) -> Option<String> {
        self.as_ref().and_then(Render::render_html)
    }
}

impl Render for serde_json::Value {
    fn render_text(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_string())
    }

    fn render_html(&self) -> Option<String> {
        Some(json_html(&self.render_text()))
    }

    fn render_data(&self) -> Option<serde_json::Value> {
        Some(self.clone())
    }
}

/// Displays any serializable value as JSON.
#[derive(Debug, Clone)]
pub struct Json<T: Serialize>(pub T);

impl<T: Serialize> Render for Json<T> {
    fn render_text(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }

    fn render_html(&self) -> Option<String> {
        serde_json::to_string_pretty(&self.0)
            .ok()
            .map(|pretty| json_html(&pretty))
    }

    fn render_data(&self) -> Option<serde_json::Value> {
        serde_json::to_value(&self.0).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Chart;

    impl Render for Chart {
        fn render_text(&self) -> String {
            "chart".to_string()
        }

        fn render_image(&self) -> Option<ImageOutput> {
            Some(ImageOutput::png(vec![0x89, b'P', b'N', b'G']))
        }
    }

    #[test]
    fn test_all_values_starts_with_plain_text() {
        let values = all_formatted_values(&42i64);
        assert_eq!(values[0], FormattedValue::plain("42"));
        assert_eq!(values[1].mime_type, mime::APPLICATION_JSON);
    }

    #[test]
    fn test_image_is_base64() {
        let values = formatted_values(&Chart, &[mime::IMAGE_PNG]).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "iVBORw==");
    }

    #[test]
    fn test_requested_order_is_kept() {
        let value = serde_json::json!({"a": 1});
        let values = formatted_values(&value, &[mime::TEXT_HTML, mime::TEXT_PLAIN]).unwrap();
        assert_eq!(values[0].mime_type, mime::TEXT_HTML);
        assert_eq!(values[1].mime_type, mime::TEXT_PLAIN);
    }

    #[test]
    fn test_unsupported_mime_type() {
        let err = formatted_values(&"text", &[mime::IMAGE_PNG]).unwrap_err();
        assert!(matches!(err, KernelError::UnsupportedMimeType(ref m) if m == mime::IMAGE_PNG));
    }

    #[test]
    fn test_html_is_escaped() {
        let html = vec!["<b>".to_string()].render_html().unwrap();
        assert_eq!(html, "<ul><li>&lt;b&gt;</li></ul>");
    }

    #[test]
    fn test_option_and_json_wrapper() {
        assert_eq!(None::<i32>.render_text(), "None");
        assert_eq!(Some(3).render_text(), "3");

        let data = Json(vec![1, 2]).render_data().unwrap();
        assert_eq!(data, serde_json::json!([1, 2]));
    }
}
