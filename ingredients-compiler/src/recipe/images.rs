//! Inline image embedding
//!
//! Rewrites `![alt](path "title"){.inline width: 50%}` so the image travels inside the document.
//! Markers without the inline token are left alone; the other tokens become the CSS style.
//!
//! - Vector payloads: the `<svg>…</svg>` fragment is spliced in as literal markup. A caller
//!   style that sets a width or height replaces the root's own `width`/`height` attributes,
//!   and a title becomes a `<title>` child.
//! - Raster payloads: base64 in a data URI, hard-wrapped so no emitted line grows unbounded.
//!
//! Matches on a line are spliced right to left so earlier byte offsets stay valid.

use crate::recipe::error::CompileError;
use crate::recipe::render::escape_attribute;
use crate::recipe::settings::ImageSettings;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

static IMAGE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)\{(.*?)\}").unwrap());

/// Everything from the first `<svg` to the last `</svg>`, across lines and over any bytes.
static SVG_FRAGMENT: Lazy<regex::bytes::Regex> =
    Lazy::new(|| regex::bytes::Regex::new(r"(?s-u)<svg\b.*</svg>").unwrap());

static SIZE_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s(?:width|height)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>"']+)"#).unwrap()
});

static STYLE_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sstyle\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// A CSS declaration of `width` or `height`.
static STYLE_SETS_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|;)\s*(?:width|height)\s*:").unwrap());

/// A parsed `![alt](path "title"){tokens}` marker that asked to be inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage<'a> {
    pub alt: &'a str,
    pub path: &'a str,
    pub title: Option<&'a str>,
    /// Marker tokens other than the inline token, joined with spaces.
    pub style: String,
}

impl<'a> InlineImage<'a> {
    /// Returns `None` when the marker does not carry `inline_token`.
    pub fn parse(alt: &'a str, target: &'a str, tokens: &'a str, inline_token: &str) -> Option<Self> {
        let tokens: Vec<&str> = tokens.split_whitespace().collect();
        if !tokens.iter().any(|token| *token == inline_token) {
            return None;
        }
        let style = tokens
            .iter()
            .filter(|token| **token != inline_token)
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let (path, title) = split_title(target);
        Some(InlineImage {
            alt,
            path,
            title,
            style,
        })
    }
}

/// Splits `path "title"` into its parts.
fn split_title(target: &str) -> (&str, Option<&str>) {
    let target = target.trim();
    if let Some(start) = target.find(" \"") {
        if target.len() > start + 2 && target.ends_with('"') {
            let title = &target[start + 2..target.len() - 1];
            return (target[..start].trim_end(), Some(title));
        }
    }
    (target, None)
}

/// Embeds every inline image marker in `lines`.
///
/// Embedded payloads span several lines, so the output may be longer than the input. Lines
/// without inline markers come back untouched, which makes the pass idempotent.
pub fn embed_images(
    lines: &[String],
    settings: &ImageSettings,
) -> Result<Vec<String>, CompileError> {
    let mut output = Vec::with_capacity(lines.len());
    let mut embedded = 0;
    for (index, line) in lines.iter().enumerate() {
        let (text, count) = embed_line(line, index + 1, settings)?;
        embedded += count;
        if count == 0 {
            output.push(text);
        } else {
            output.extend(text.split('\n').map(str::to_string));
        }
    }
    log::debug!("embedded {} inline image(s)", embedded);
    Ok(output)
}

fn embed_line(
    line: &str,
    line_no: usize,
    settings: &ImageSettings,
) -> Result<(String, usize), CompileError> {
    let mut text = line.to_string();
    let mut count = 0;
    let markers: Vec<_> = IMAGE_MARKER.captures_iter(line).collect();
    for captures in markers.iter().rev() {
        let (Some(whole), Some(alt), Some(target), Some(tokens)) = (
            captures.get(0),
            captures.get(1),
            captures.get(2),
            captures.get(3),
        ) else {
            continue;
        };
        let Some(image) = InlineImage::parse(
            alt.as_str(),
            target.as_str(),
            tokens.as_str(),
            &settings.inline_token,
        ) else {
            continue;
        };

        let replacement = render_image(&image, &settings.base_dir, line_no, settings.wrap_width)?;
        text.replace_range(whole.range(), &replacement);
        count += 1;
    }
    Ok((text, count))
}

fn render_image(
    image: &InlineImage<'_>,
    base_dir: &Path,
    line: usize,
    wrap_width: usize,
) -> Result<String, CompileError> {
    let path = base_dir.join(image.path);
    let payload = fs::read(&path).map_err(|source| CompileError::ImageRead {
        line,
        path: path.clone(),
        source,
    })?;
    log::debug!("inlining {} ({} bytes)", path.display(), payload.len());

    match SVG_FRAGMENT.find(&payload) {
        Some(fragment) => {
            let svg = std::str::from_utf8(fragment.as_bytes())
                .map_err(|source| CompileError::InvalidSvg { line, path, source })?;
            Ok(embed_svg(svg, &image.style, image.title))
        }
        None => Ok(embed_raster(&payload, image, wrap_width)),
    }
}

/// Applies the caller's style and title to an SVG fragment.
pub fn embed_svg(fragment: &str, style: &str, title: Option<&str>) -> String {
    let Some(open_end) = fragment.find('>') else {
        return fragment.to_string();
    };
    let (open_tag, rest) = fragment.split_at(open_end);
    let self_closing = open_tag.ends_with('/');
    let mut tag = open_tag.trim_end_matches('/').to_string();

    if !style.is_empty() {
        if STYLE_SETS_SIZE.is_match(style) {
            tag = SIZE_ATTRIBUTE.replace_all(&tag, "").into_owned();
        }
        let style = escape_attribute(style);
        let existing = STYLE_ATTRIBUTE.captures(&tag).and_then(|captures| {
            let whole = captures.get(0)?.range();
            let value = captures.get(1).or_else(|| captures.get(2))?.as_str();
            Some((whole, value.trim().trim_end_matches(';').to_string()))
        });
        match existing {
            Some((range, value)) if !value.is_empty() => {
                tag.replace_range(range, &format!(" style=\"{}; {}\"", value, style))
            }
            Some((range, _)) => tag.replace_range(range, &format!(" style=\"{}\"", style)),
            None => tag.push_str(&format!(" style=\"{}\"", style)),
        }
    }

    let mut svg = tag;
    if self_closing {
        svg.push('/');
    }
    svg.push('>');
    if let Some(title) = title {
        svg.push_str(&format!("<title>{}</title>", escape_attribute(title)));
    }
    // `rest` starts with the `>` that closed the open tag
    svg.push_str(&rest[1..]);
    svg
}

/// `<img>` with a base64 data URI, wrapped at `wrap_width` columns (0 disables wrapping).
pub fn embed_raster(payload: &[u8], image: &InlineImage<'_>, wrap_width: usize) -> String {
    let encoded = BASE64.encode(payload);
    let mut html = format!("<img alt=\"{}\"", escape_attribute(image.alt));
    if let Some(title) = image.title {
        html.push_str(&format!(" title=\"{}\"", escape_attribute(title)));
    }
    if !image.style.is_empty() {
        html.push_str(&format!(" style=\"{}\"", escape_attribute(&image.style)));
    }
    html.push_str(&format!(" src=\"data:{};base64,", sniff_mime(payload)));

    let width = if wrap_width == 0 {
        encoded.len().max(1)
    } else {
        wrap_width
    };
    // base64 is ASCII, so byte offsets are char boundaries
    for start in (0..encoded.len()).step_by(width) {
        let end = (start + width).min(encoded.len());
        html.push('\n');
        html.push_str(&encoded[start..end]);
    }
    html.push_str("\n\">");
    html
}

fn sniff_mime(payload: &[u8]) -> &'static str {
    match payload {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        _ => "image",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image<'a>(style: &str, title: Option<&'a str>) -> InlineImage<'a> {
        InlineImage {
            alt: "logo",
            path: "logo.png",
            title,
            style: style.to_string(),
        }
    }

    #[test]
    fn test_parse_requires_inline_token() {
        assert!(InlineImage::parse("a", "a.png", "width:50%", ".inline").is_none());
        let parsed = InlineImage::parse("a", "a.png \"A title\"", ".inline  width:50%", ".inline")
            .unwrap();
        assert_eq!(parsed.path, "a.png");
        assert_eq!(parsed.title, Some("A title"));
        assert_eq!(parsed.style, "width:50%");
    }

    #[test]
    fn test_split_title() {
        assert_eq!(split_title("dir/a b.png"), ("dir/a b.png", None));
        assert_eq!(split_title(" a.png \"T\" "), ("a.png", Some("T")));
        assert_eq!(split_title("a.png \""), ("a.png \"", None));
    }

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(&[0x89, b'P', b'N', b'G', 0x0D]), "image/png");
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_mime(b"GIF89a"), "image/gif");
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8"), "image/webp");
        assert_eq!(sniff_mime(b"plain"), "image");
    }

    #[test]
    fn test_raster_wraps() {
        let payload = vec![0u8; 90];
        let html = embed_raster(&payload, &image("", None), 40);
        let lines: Vec<&str> = html.split('\n').collect();

        assert_eq!(lines[0], "<img alt=\"logo\" src=\"data:image;base64,");
        assert_eq!(lines.last(), Some(&"\">"));
        let data: Vec<&str> = lines[1..lines.len() - 1].to_vec();
        assert_eq!(data.len(), 3);
        assert!(data.iter().all(|l| l.len() <= 40));
        assert_eq!(data.concat(), BASE64.encode(&payload));
    }

    #[test]
    fn test_raster_attributes() {
        let html = embed_raster(b"GIF89a", &image("width: 5em", Some("A \"logo\"")), 80);
        assert!(html.starts_with(
            "<img alt=\"logo\" title=\"A &quot;logo&quot;\" style=\"width: 5em\" src=\"data:image/gif;base64,"
        ));
    }

    #[test]
    fn test_svg_size_attributes_replaced_by_style() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height='50' viewBox="0 0 100 50"><rect stroke-width="2"/></svg>"#;
        let html = embed_svg(svg, "width: 3em", Some("Logo"));
        assert_eq!(
            html,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50" style="width: 3em"><title>Logo</title><rect stroke-width="2"/></svg>"#
        );
    }

    #[test]
    fn test_svg_keeps_size_without_size_style() {
        let svg = r#"<svg width="100" style="fill: red;"><g/></svg>"#;
        let html = embed_svg(svg, "opacity: 0.5", None);
        assert_eq!(
            html,
            r#"<svg width="100" style="fill: red; opacity: 0.5"><g/></svg>"#
        );
    }

    #[test]
    fn test_svg_untouched_without_style_or_title() {
        let svg = "<svg>\n<circle r=\"1\"/>\n</svg>";
        assert_eq!(embed_svg(svg, "", None), svg);
    }
}
