//! Track discovery from a server-generated HTML directory listing.

use crate::error::{PlayerError, Result};
use crate::model::{Settings, Track};
use reqwest::blocking::Client;
use tracing::{error, info};

/// Fetches the songs directory and returns every linked audio file in listing
/// order. Any failure is logged and yields an empty list.
pub fn load_tracks(client: &Client, settings: &Settings) -> Vec<Track> {
    match fetch_listing(client, &settings.songs_url) {
        Ok(html) => {
            let tracks = parse_listing(&html, &settings.audio_extension);
            info!(count = tracks.len(), url = %settings.songs_url, "loaded track listing");
            tracks
        }
        Err(err) => {
            error!(error = %err, "failed to fetch songs");
            Vec::new()
        }
    }
}

pub fn fetch_listing(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().map_err(|source| PlayerError::Fetch {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(PlayerError::Status {
            url: url.to_string(),
            status,
        });
    }

    response.text().map_err(|source| PlayerError::Fetch {
        url: url.to_string(),
        source,
    })
}

pub fn parse_listing(html: &str, extension: &str) -> Vec<Track> {
    let suffix = format!(".{}", extension.trim_start_matches('.').to_ascii_lowercase());
    anchor_hrefs(html)
        .into_iter()
        .filter_map(|href| track_from_href(&href, &suffix))
        .collect()
}

fn track_from_href(href: &str, suffix: &str) -> Option<Track> {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    if !path.to_ascii_lowercase().ends_with(suffix) {
        return None;
    }

    let file_name = path.rsplit('/').next().unwrap_or(path);
    (file_name.len() > suffix.len()).then(|| Track::new(file_name))
}

/// Collects the `href` value of every `<a>` element, in document order.
fn anchor_hrefs(html: &str) -> Vec<String> {
    let lower = html.to_ascii_lowercase();
    let mut hrefs = Vec::new();
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find("<a") {
        let start = cursor + found;
        let after_name = start + 2;
        let Some(next) = lower[after_name..].chars().next() else {
            break;
        };
        if !(next.is_ascii_whitespace() || next == '>') {
            cursor = after_name;
            continue;
        }

        let Some(tag_len) = lower[after_name..].find('>') else {
            break;
        };
        let tag_end = after_name + tag_len;
        if let Some(value) = attribute_value(&html[after_name..tag_end], "href") {
            hrefs.push(value.replace("&amp;", "&"));
        }
        cursor = tag_end + 1;
    }

    hrefs
}

fn attribute_value(attributes: &str, name: &str) -> Option<String> {
    let lower = attributes.to_ascii_lowercase();
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find(name) {
        let start = cursor + found;
        let preceded_ok = start == 0
            || lower[..start]
                .chars()
                .next_back()
                .is_some_and(|ch| ch.is_ascii_whitespace());
        let rest = lower[start + name.len()..].trim_start();
        if !preceded_ok || !rest.starts_with('=') {
            cursor = start + name.len();
            continue;
        }

        let value_offset = attributes.len() - rest.len() + 1;
        let value = attributes[value_offset..].trim_start();
        return Some(match value.chars().next() {
            Some(quote @ ('"' | '\'')) => value[1..]
                .split(quote)
                .next()
                .unwrap_or_default()
                .to_string(),
            _ => value
                .split(|ch: char| ch.is_ascii_whitespace())
                .next()
                .unwrap_or_default()
                .to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(Track::file_name).collect()
    }

    #[test]
    fn keeps_audio_anchors_in_listing_order() {
        let html = r#"<ul>
            <li><a href="a.mp3">a.mp3</a></li>
            <li><a href="b.txt">b.txt</a></li>
            <li><a href="c.mp3">c.mp3</a></li>
        </ul>"#;
        assert_eq!(names(&parse_listing(html, "mp3")), vec!["a.mp3", "c.mp3"]);
    }

    #[test]
    fn absolute_links_reduce_to_file_names() {
        let html = r#"<a class="icon" href="/songs/Night%20Drive.mp3" title="x">Night Drive</a>
            <A HREF='/songs/Intro.MP3?dl=1'>Intro</A>"#;
        assert_eq!(
            names(&parse_listing(html, "mp3")),
            vec!["Night%20Drive.mp3", "Intro.MP3"]
        );
    }

    #[test]
    fn ignores_non_anchor_tags_and_data_attributes() {
        let html = r#"<abbr href="x.mp3"></abbr><link href="y.mp3">
            <a data-href="z.mp3" href=real.mp3>real</a><a>no link</a>"#;
        assert_eq!(names(&parse_listing(html, "mp3")), vec!["real.mp3"]);
    }

    #[test]
    fn non_html_body_yields_nothing() {
        assert!(parse_listing(r#"{"files":["a.mp3"]}"#, "mp3").is_empty());
        assert!(parse_listing("", "mp3").is_empty());
    }

    #[test]
    fn bare_extension_is_not_a_track() {
        assert!(parse_listing(r#"<a href="/songs/.mp3">x</a>"#, "mp3").is_empty());
    }

    #[test]
    fn extension_is_configurable() {
        let html = r#"<a href="a.ogg">a</a><a href="b.mp3">b</a>"#;
        assert_eq!(names(&parse_listing(html, ".ogg")), vec!["a.ogg"]);
    }
}
