//! Image slideshow with previous/next controls.

use std::path::Path;

use crate::element::{ElementKind, RenderContext, VisualElement};
use crate::elements::picture::ImageData;
use crate::error::Result;
use crate::escape::{html_escape, js_string};

#[derive(Debug, Clone)]
struct Slide {
    image: ImageData,
    caption: Option<String>,
}

/// Slideshow of embedded images; one slide is visible at a time.
#[derive(Debug, Clone)]
pub struct Slides {
    id: String,
    slides: Vec<Slide>,
}

impl Slides {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slides: Vec::new(),
        }
    }

    /// Append a slide.
    pub fn with_slide(mut self, image: ImageData, caption: Option<String>) -> Self {
        self.slides.push(Slide { image, caption });
        self
    }

    /// Append a slide read from an image file.
    pub fn with_slide_path(self, path: &Path, caption: Option<String>) -> Result<Self> {
        Ok(self.with_slide(ImageData::from_path(path)?, caption))
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether there are no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

impl VisualElement for Slides {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Slides
    }

    fn functional_fragment(&self, ctx: &RenderContext<'_>) -> String {
        if self.slides.len() < 2 {
            return String::new();
        }
        format!(
            r#"var root = document.getElementById({root});
var slides = root.querySelectorAll('.tv-slide');
var current = 0;
function show(i) {{
  current = (i + slides.length) % slides.length;
  slides.forEach(function (s, n) {{ s.hidden = n !== current; }});
}}
root.querySelector('.tv-prev').addEventListener('click', function () {{ show(current - 1); }});
root.querySelector('.tv-next').addEventListener('click', function () {{ show(current + 1); }});"#,
            root = js_string(ctx.dom_id()),
        )
    }

    fn appearance_fragment(&self, _ctx: &RenderContext<'_>) -> String {
        let mut html = String::from("<div class=\"tv-slides\">\n");
        for (i, slide) in self.slides.iter().enumerate() {
            let hidden = if i == 0 { "" } else { " hidden" };
            let caption = slide
                .caption
                .as_deref()
                .map(|c| format!("<figcaption>{}</figcaption>", html_escape(c)))
                .unwrap_or_default();
            html.push_str(&format!(
                "<figure class=\"tv-slide\"{}><img src=\"{}\" alt=\"slide {}\">{}</figure>\n",
                hidden,
                slide.image.data_uri(),
                i + 1,
                caption
            ));
        }
        if self.slides.len() > 1 {
            html.push_str(
                "<button type=\"button\" class=\"tv-prev\">&lsaquo;</button>\
                 <button type=\"button\" class=\"tv-next\">&rsaquo;</button>\n",
            );
        }
        html.push_str("</div>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::LinkMap;

    fn png(bytes: &[u8]) -> ImageData {
        ImageData::new("image/png", bytes.to_vec())
    }

    #[test]
    fn test_slides_markup() {
        let slides = Slides::new("Gallery")
            .with_slide(png(b"a"), Some("first <one>".to_string()))
            .with_slide(png(b"b"), None);
        let links = LinkMap::new();
        let ctx = RenderContext::new("Gallery", &links);
        let html = slides.appearance_fragment(&ctx);

        assert_eq!(html.matches("<figure class=\"tv-slide\"").count(), 2);
        assert_eq!(html.matches(" hidden>").count(), 1);
        assert!(html.contains("<figcaption>first &lt;one&gt;</figcaption>"));
        assert!(html.contains("tv-next"));
        assert!(slides.functional_fragment(&ctx).contains(r#"getElementById("Gallery")"#));
    }

    #[test]
    fn test_single_slide_has_no_controls() {
        let slides = Slides::new("One").with_slide(png(b"a"), None);
        let links = LinkMap::new();
        let ctx = RenderContext::new("One", &links);
        assert!(!slides.appearance_fragment(&ctx).contains("tv-next"));
        assert!(slides.functional_fragment(&ctx).is_empty());
    }
}
