//! HTML rendering of a signal's blocks.

use crate::editor::{escape_html, render_inline};
use crate::models::{BlockKind, Signal, SignalBlock};

/// Render every block in order.
pub fn render_signal(signal: &Signal) -> String {
    signal
        .blocks
        .iter()
        .map(render_block)
        .filter(|html| !html.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &SignalBlock) -> String {
    let caption = block
        .caption
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!("<figcaption>{}</figcaption>", escape_html(c)))
        .unwrap_or_default();

    match block.kind {
        BlockKind::Text if block.content.trim().is_empty() => String::new(),
        BlockKind::Text => format!("<p>{}</p>", render_inline(&block.content)),
        BlockKind::Image if block.content.trim().is_empty() => String::new(),
        BlockKind::Image => format!(
            r#"<figure><img src="{}" alt="{}" loading="lazy">{}</figure>"#,
            escape_html(&block.content),
            escape_html(block.caption.as_deref().unwrap_or("")),
            caption
        ),
        BlockKind::Embed if block.content.trim().is_empty() => String::new(),
        BlockKind::Embed => format!(
            r#"<figure class="embed"><iframe src="{}" allowfullscreen loading="lazy"></iframe>{}</figure>"#,
            escape_html(&block.content),
            caption
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: BlockKind, content: &str, caption: Option<&str>) -> SignalBlock {
        SignalBlock {
            id: format!("b-{}", content.len()),
            kind,
            content: content.to_string(),
            caption: caption.map(str::to_string),
        }
    }

    #[test]
    fn test_render_keeps_block_order() {
        let mut signal = Signal::empty();
        signal.blocks = vec![
            block(BlockKind::Text, "**um**", None),
            block(BlockKind::Image, "/img/a.jpg", Some("a & b")),
            block(BlockKind::Text, "", None),
            block(
                BlockKind::Embed,
                "https://player.vimeo.com/video/1",
                None,
            ),
        ];

        let html = render_signal(&signal);
        let lines: Vec<_> = html.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "<p><strong>um</strong></p>");
        assert_eq!(
            lines[1],
            r#"<figure><img src="/img/a.jpg" alt="a &amp; b" loading="lazy"><figcaption>a &amp; b</figcaption></figure>"#
        );
        assert!(lines[2].contains(r#"<iframe src="https://player.vimeo.com/video/1""#));
    }
}
