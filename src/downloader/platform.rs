// Platform classification - maps a URL's host to a source platform tag
//
// Classification drives strategy selection and the wording of failure
// suggestions. Anything we don't recognize is Generic, which still works:
// yt-dlp supports far more sites than we special-case here.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Source platform of a media URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Instagram,
    Pinterest,
    Tiktok,
    Twitter,
    Facebook,
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Instagram => "instagram",
            Self::Pinterest => "pinterest",
            Self::Tiktok => "tiktok",
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
            Self::Generic => "generic",
        }
    }

    /// Classify a parsed URL by its host
    pub fn classify(url: &Url) -> Self {
        let host = match url.host_str() {
            Some(h) => h.to_lowercase(),
            None => return Self::Generic,
        };

        for (platform, domains) in PLATFORM_DOMAINS {
            if domains
                .iter()
                .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
            {
                return *platform;
            }
        }

        Self::Generic
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain table, checked as exact host or subdomain suffix
const PLATFORM_DOMAINS: &[(Platform, &[&str])] = &[
    (Platform::Youtube, &["youtube.com", "youtu.be"]),
    (Platform::Instagram, &["instagram.com", "instagr.am"]),
    (Platform::Pinterest, &["pinterest.com", "pin.it"]),
    (Platform::Tiktok, &["tiktok.com"]),
    (Platform::Twitter, &["twitter.com", "x.com", "t.co"]),
    (Platform::Facebook, &["facebook.com", "fb.watch", "fb.com"]),
];

/// Extract a stable media id from the URL for default filenames.
///
/// YouTube: the `v=` query parameter or the `youtu.be` path segment.
/// Pinterest: the numeric id in `/pin/<id>`.
/// Everything else: none, the caller falls back to a random id.
pub fn media_id(platform: Platform, url: &Url) -> Option<String> {
    lazy_static! {
        static ref PIN_RE: Regex = Regex::new(r"/pin/(\d+)").unwrap();
    }

    match platform {
        Platform::Youtube => {
            if url.host_str().is_some_and(|h| h == "youtu.be") {
                let id = url.path().trim_start_matches('/');
                if !id.is_empty() {
                    return Some(id.to_string());
                }
                return None;
            }
            url.query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())
        }
        Platform::Pinterest => PIN_RE
            .captures(url.path())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
        _ => None,
    }
}
