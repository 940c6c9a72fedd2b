// Failure diagnostics - classifies tool stderr into a reason the caller
// can act on
//
// yt-dlp reports everything as free text on stderr, so classification is
// pattern matching over the message. Order matters: specific restrictions
// (DRM, private, age) are checked before the generic network buckets.

use serde::{Deserialize, Serialize};

use super::platform::Platform;

/// Why a download failed, as far as we can tell from the tool output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// 429 or explicit rate limiting
    RateLimited,

    /// Bot/automation detection ("confirm you're not a robot", captcha)
    BotDetection,

    /// Age-restricted content requiring a logged-in account
    AgeRestricted,

    /// Not available in the requester's country
    GeoBlocked,

    /// Private content requiring authorization
    PrivateContent,

    /// Deleted, removed or otherwise gone
    ContentUnavailable,

    /// DRM-protected; no invocation will ever succeed
    DrmProtected,

    /// The site wants a login/cookies before serving anything
    LoginRequired,

    /// Timeout or connection failure
    NetworkTimeout,

    /// The tool does not recognize the URL
    UnsupportedUrl,

    /// Could not classify
    Unknown,
}

impl FailureReason {
    /// Whether retrying with different settings might help
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::BotDetection | Self::NetworkTimeout
        )
    }

    /// Whether supplying cookies might help
    pub fn cookies_might_help(&self) -> bool {
        matches!(
            self,
            Self::BotDetection
                | Self::AgeRestricted
                | Self::PrivateContent
                | Self::LoginRequired
        )
    }

    /// Whether a proxy/VPN might help
    pub fn proxy_might_help(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::BotDetection | Self::GeoBlocked | Self::NetworkTimeout
        )
    }

    /// Whether no workaround exists at all
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::DrmProtected | Self::ContentUnavailable)
    }

    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::RateLimited => "The site is rate-limiting requests",
            Self::BotDetection => "The site detected automated access",
            Self::AgeRestricted => "The content is age-restricted",
            Self::GeoBlocked => "The content is not available in this region",
            Self::PrivateContent => "The content is private",
            Self::ContentUnavailable => "The content is unavailable or was removed",
            Self::DrmProtected => "The content is DRM-protected and cannot be downloaded",
            Self::LoginRequired => "The site requires a login to serve this content",
            Self::NetworkTimeout => "The source site did not respond in time",
            Self::UnsupportedUrl => "The URL is not supported by the extraction tool",
            Self::Unknown => "The download failed for an unknown reason",
        }
    }
}

/// Classify raw tool output into a failure reason
pub fn diagnose_error(stderr: &str) -> FailureReason {
    let lower = stderr.to_lowercase();

    // Permanent restrictions first
    if lower.contains("drm")
        || lower.contains("widevine")
        || lower.contains("fairplay")
        || lower.contains("playready")
    {
        return FailureReason::DrmProtected;
    }
    if lower.contains("private video")
        || lower.contains("private account")
        || lower.contains("this video is private")
    {
        return FailureReason::PrivateContent;
    }
    if lower.contains("video unavailable")
        || lower.contains("has been removed")
        || lower.contains("no longer available")
        || lower.contains("404")
    {
        return FailureReason::ContentUnavailable;
    }

    // Access restrictions
    if lower.contains("age") && (lower.contains("restrict") || lower.contains("confirm your age")) {
        return FailureReason::AgeRestricted;
    }
    if lower.contains("in your country") || lower.contains("geo restrict") || lower.contains("geo-restrict") {
        return FailureReason::GeoBlocked;
    }
    // Rate limiting and bot detection before the login wall: yt-dlp's
    // canonical bot message also mentions --cookies
    if lower.contains("429")
        || lower.contains("too many requests")
        || lower.contains("rate limit")
        || lower.contains("rate-limit")
    {
        return FailureReason::RateLimited;
    }
    if lower.contains("captcha")
        || lower.contains("not a bot")
        || lower.contains("sign in to confirm")
        || lower.contains("bot")
    {
        return FailureReason::BotDetection;
    }

    // Instagram phrases most of its walls this way
    if lower.contains("login required")
        || lower.contains("log in")
        || lower.contains("requested content is not available")
        || lower.contains("cookies")
    {
        return FailureReason::LoginRequired;
    }

    if lower.contains("timed out") || lower.contains("timeout") || lower.contains("connection") {
        return FailureReason::NetworkTimeout;
    }
    if lower.contains("unsupported url") || lower.contains("is not a valid url") {
        return FailureReason::UnsupportedUrl;
    }

    FailureReason::Unknown
}

/// Ordered, platform-aware suggestion list for a failure reason
pub fn suggestions_for(reason: FailureReason, platform: Platform) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    match reason {
        FailureReason::RateLimited => {
            out.push("Wait 10-15 minutes and try again".to_string());
            out.push("Use a different IP (VPN/proxy)".to_string());
        }
        FailureReason::BotDetection => {
            out.push(format!(
                "Provide a cookies file exported from a browser logged in to {}",
                platform_site_name(platform)
            ));
            out.push("Use a fresh proxy/VPN".to_string());
        }
        FailureReason::AgeRestricted => {
            out.push("Provide cookies from a logged-in account (18+)".to_string());
        }
        FailureReason::GeoBlocked => {
            out.push("Use a VPN or proxy in a region where the content is available".to_string());
        }
        FailureReason::PrivateContent => {
            out.push("Provide cookies from an account authorized to view this content".to_string());
            if platform == Platform::Instagram {
                out.push("The account owner must accept your follow request first".to_string());
            }
        }
        FailureReason::ContentUnavailable => {
            out.push("Check that the link still works in a browser".to_string());
            out.push("The content may have been deleted by the uploader".to_string());
        }
        FailureReason::DrmProtected => {
            out.push("DRM-protected content cannot be downloaded as a file".to_string());
        }
        FailureReason::LoginRequired => {
            out.push(format!(
                "Export cookies from a browser logged in to {} and configure them",
                platform_site_name(platform)
            ));
        }
        FailureReason::NetworkTimeout => {
            out.push("Check the server's internet connection".to_string());
            out.push("Try again later".to_string());
            out.push("Configure a proxy if the site throttles this IP".to_string());
        }
        FailureReason::UnsupportedUrl => {
            out.push("Check the URL points at a media page, not a profile or search".to_string());
            out.push("Update yt-dlp: newer releases add and fix extractors".to_string());
        }
        FailureReason::Unknown => {
            out.push("Check the URL".to_string());
            out.push("Try again later".to_string());
            out.push("Update yt-dlp to the latest release".to_string());
        }
    }

    // Generic nudges that only apply when a workaround exists
    if !reason.is_permanent() && reason.proxy_might_help() && platform == Platform::Youtube {
        out.push("YouTube throttling usually clears on its own within 6-24 hours".to_string());
    }

    out
}

fn platform_site_name(platform: Platform) -> &'static str {
    match platform {
        Platform::Youtube => "YouTube",
        Platform::Instagram => "Instagram",
        Platform::Pinterest => "Pinterest",
        Platform::Tiktok => "TikTok",
        Platform::Twitter => "Twitter/X",
        Platform::Facebook => "Facebook",
        Platform::Generic => "the source site",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        let error = "ERROR: HTTP Error 429: Too Many Requests";
        assert_eq!(diagnose_error(error), FailureReason::RateLimited);
    }

    #[test]
    fn test_bot_detection() {
        let error = "Sign in to confirm you're not a bot";
        assert_eq!(diagnose_error(error), FailureReason::BotDetection);
    }

    #[test]
    fn test_bot_detection_with_cookie_hint() {
        // Full real-world message: the --cookies hint must not pull this
        // into the login bucket
        let error = "ERROR: [youtube] abc123: Sign in to confirm you're not a bot. \
                     Use --cookies-from-browser or --cookies for the authentication.";
        let reason = diagnose_error(error);
        assert_eq!(reason, FailureReason::BotDetection);
        assert!(reason.is_retryable());
        assert!(reason.proxy_might_help());
    }

    #[test]
    fn test_age_restricted_detection() {
        let error = "ERROR: Sign in to confirm your age. This video may be inappropriate";
        assert_eq!(diagnose_error(error), FailureReason::AgeRestricted);
    }

    #[test]
    fn test_geo_detection() {
        let error = "ERROR: The uploader has not made this video available in your country";
        assert_eq!(diagnose_error(error), FailureReason::GeoBlocked);
    }

    #[test]
    fn test_private_detection() {
        let error = "ERROR: This video is private";
        assert_eq!(diagnose_error(error), FailureReason::PrivateContent);
    }

    #[test]
    fn test_unavailable_detection() {
        let error = "ERROR: Video unavailable";
        assert_eq!(diagnose_error(error), FailureReason::ContentUnavailable);
    }

    #[test]
    fn test_drm_detection() {
        let error = "This video is DRM protected (Widevine)";
        assert_eq!(diagnose_error(error), FailureReason::DrmProtected);
    }

    #[test]
    fn test_timeout_detection() {
        let error = "ERROR: Connection timed out";
        assert_eq!(diagnose_error(error), FailureReason::NetworkTimeout);
    }

    #[test]
    fn test_unsupported_url_detection() {
        let error = "ERROR: Unsupported URL: https://example.com/nothing";
        assert_eq!(diagnose_error(error), FailureReason::UnsupportedUrl);
    }

    #[test]
    fn test_instagram_login_wall() {
        let error = "ERROR: [Instagram] login required. Use --cookies for authentication";
        let reason = diagnose_error(error);
        assert_eq!(reason, FailureReason::LoginRequired);
        assert!(reason.cookies_might_help());
    }

    #[test]
    fn test_unknown_fallback() {
        assert_eq!(diagnose_error("???"), FailureReason::Unknown);
    }

    #[test]
    fn test_drm_is_permanent() {
        assert!(FailureReason::DrmProtected.is_permanent());
        assert!(FailureReason::ContentUnavailable.is_permanent());
        assert!(!FailureReason::RateLimited.is_permanent());
    }

    #[test]
    fn test_suggestions_are_platform_aware() {
        let yt = suggestions_for(FailureReason::LoginRequired, Platform::Youtube);
        assert!(yt.iter().any(|s| s.contains("YouTube")));

        let insta = suggestions_for(FailureReason::PrivateContent, Platform::Instagram);
        assert!(insta.iter().any(|s| s.contains("follow request")));
    }

    #[test]
    fn test_suggestions_never_empty() {
        for reason in [
            FailureReason::RateLimited,
            FailureReason::DrmProtected,
            FailureReason::Unknown,
            FailureReason::NetworkTimeout,
        ] {
            assert!(!suggestions_for(reason, Platform::Generic).is_empty());
        }
    }
}
