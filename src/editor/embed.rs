//! Normalization of pasted media links into playable embed URLs.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::errors::AppError;

static IFRAME_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<iframe\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("valid iframe regex")
});
static YOUTUBE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid youtube id regex"));
static SPOTIFY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid spotify id regex"));

const SPOTIFY_KINDS: [&str; 6] = ["track", "album", "playlist", "artist", "episode", "show"];

/// Known embed providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedProvider {
    YouTube,
    Spotify,
    Vimeo,
    /// `src` of a pasted iframe that matched no known provider
    Iframe,
}

/// A canonical embed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub provider: EmbedProvider,
    pub url: String,
}

/// Turn a pasted link or iframe snippet into a canonical embed URL.
pub fn normalize_embed(raw: &str) -> Result<Embed, AppError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(unsupported(raw));
    }

    if input.to_ascii_lowercase().contains("<iframe") {
        let src = IFRAME_SRC
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().replace("&amp;", "&"))
            .ok_or_else(|| unsupported(raw))?;

        if let Some(embed) = known_provider(&src) {
            return Ok(embed);
        }
        return match Url::parse(&src) {
            Ok(url) if url.scheme() == "https" => Ok(Embed {
                provider: EmbedProvider::Iframe,
                url: url.to_string(),
            }),
            _ => Err(unsupported(raw)),
        };
    }

    known_provider(input).ok_or_else(|| unsupported(raw))
}

fn unsupported(raw: &str) -> AppError {
    AppError::UnsupportedEmbed(format!("Unsupported link: {}", raw.trim()))
}

fn known_provider(input: &str) -> Option<Embed> {
    if let Some(rest) = input.strip_prefix("spotify:") {
        let mut parts = rest.split(':');
        return spotify_embed(parts.next()?, parts.next()?);
    }

    let url = parse_lenient(input)?;
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    match host {
        "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            let id = match segments.as_slice() {
                ["watch", ..] => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned())?,
                ["embed" | "shorts" | "live" | "v", id, ..] => id.to_string(),
                _ => return None,
            };
            youtube_embed(&id)
        }
        "youtu.be" => youtube_embed(segments.first()?),
        "open.spotify.com" => {
            let mut rest = segments.as_slice();
            if let [first, tail @ ..] = rest {
                if first.starts_with("intl-") {
                    rest = tail;
                }
            }
            if let ["embed", tail @ ..] = rest {
                rest = tail;
            }
            match rest {
                [kind, id, ..] => spotify_embed(kind, id),
                _ => None,
            }
        }
        "vimeo.com" => {
            let id = segments
                .iter()
                .find(|seg| seg.chars().all(|c| c.is_ascii_digit()))?;
            Some(vimeo_embed(id))
        }
        "player.vimeo.com" => match segments.as_slice() {
            ["video", id, ..] if id.chars().all(|c| c.is_ascii_digit()) => Some(vimeo_embed(id)),
            _ => None,
        },
        _ => None,
    }
}

/// Parse absolute URLs, or host-first inputs such as `youtu.be/abc`.
fn parse_lenient(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(_) => None,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", input.trim_start_matches('/'))).ok()
        }
        Err(_) => None,
    }
}

fn youtube_embed(id: &str) -> Option<Embed> {
    YOUTUBE_ID.is_match(id).then(|| Embed {
        provider: EmbedProvider::YouTube,
        url: format!("https://www.youtube.com/embed/{}", id),
    })
}

fn spotify_embed(kind: &str, id: &str) -> Option<Embed> {
    (SPOTIFY_KINDS.contains(&kind) && SPOTIFY_ID.is_match(id)).then(|| Embed {
        provider: EmbedProvider::Spotify,
        url: format!("https://open.spotify.com/embed/{}/{}", kind, id),
    })
}

fn vimeo_embed(id: &str) -> Embed {
    Embed {
        provider: EmbedProvider::Vimeo,
        url: format!("https://player.vimeo.com/video/{}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CANONICAL: &str = "https://www.youtube.com/embed/dQw4w9WgXcQ";

    #[test]
    fn test_youtube_shapes_share_one_embed() {
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "youtu.be/dQw4w9WgXcQ",
        ] {
            let embed = normalize_embed(input).unwrap();
            assert_eq!(embed.provider, EmbedProvider::YouTube, "{}", input);
            assert_eq!(embed.url, CANONICAL, "{}", input);
        }
    }

    #[test]
    fn test_spotify_rewrites_to_embed_path() {
        let expected = "https://open.spotify.com/embed/track/4uLU6hMCjMI75M1A2tKUQC";
        for input in [
            "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC",
            "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC?si=xyz",
            "https://open.spotify.com/intl-pt/track/4uLU6hMCjMI75M1A2tKUQC",
            "https://open.spotify.com/embed/track/4uLU6hMCjMI75M1A2tKUQC",
            "spotify:track:4uLU6hMCjMI75M1A2tKUQC",
        ] {
            assert_eq!(normalize_embed(input).unwrap().url, expected, "{}", input);
        }
        assert_eq!(
            normalize_embed("https://open.spotify.com/album/1DFixLWuPkv3KT3TnV35m3")
                .unwrap()
                .url,
            "https://open.spotify.com/embed/album/1DFixLWuPkv3KT3TnV35m3"
        );
    }

    #[test]
    fn test_vimeo() {
        let expected = "https://player.vimeo.com/video/76979871";
        assert_eq!(normalize_embed("https://vimeo.com/76979871").unwrap().url, expected);
        assert_eq!(
            normalize_embed("https://vimeo.com/channels/staffpicks/76979871")
                .unwrap()
                .url,
            expected
        );
        assert_eq!(
            normalize_embed("https://player.vimeo.com/video/76979871?h=1").unwrap().url,
            expected
        );
    }

    #[test]
    fn test_iframe_snippets() {
        let yt = r#"<iframe width="560" src="https://www.youtube.com/embed/dQw4w9WgXcQ?start=3" frameborder="0"></iframe>"#;
        assert_eq!(normalize_embed(yt).unwrap().url, CANONICAL);

        let bandcamp = r#"<iframe style="border:0" src="https://bandcamp.com/EmbeddedPlayer/album=123/size=large/"></iframe>"#;
        let embed = normalize_embed(bandcamp).unwrap();
        assert_eq!(embed.provider, EmbedProvider::Iframe);
        assert_eq!(embed.url, "https://bandcamp.com/EmbeddedPlayer/album=123/size=large/");

        assert!(normalize_embed(r#"<iframe src="http://insecure.example/x"></iframe>"#).is_err());
        assert!(normalize_embed("<iframe></iframe>").is_err());
    }

    #[test]
    fn test_unrecognized_links_are_rejected() {
        for input in [
            "",
            "   ",
            "https://example.org/video.mp4",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/channel/UC123",
            "https://open.spotify.com/user/someone",
            "https://vimeo.com/about",
            "ftp://youtu.be/dQw4w9WgXcQ",
            "not a link",
        ] {
            let err = normalize_embed(input).unwrap_err();
            assert!(matches!(err, AppError::UnsupportedEmbed(_)), "{}", input);
        }
    }

    proptest! {
        #[test]
        fn prop_youtube_watch_and_short_agree(id in "[A-Za-z0-9_-]{11}") {
            let watch = normalize_embed(&format!("https://www.youtube.com/watch?v={}", id)).unwrap();
            let short = normalize_embed(&format!("https://youtu.be/{}", id)).unwrap();
            let embed = normalize_embed(&format!("https://www.youtube.com/embed/{}", id)).unwrap();
            prop_assert_eq!(&watch, &short);
            prop_assert_eq!(&watch, &embed);
            prop_assert_eq!(watch.url, format!("https://www.youtube.com/embed/{}", id));
        }
    }
}
