//! User-Agent heuristics
//!
//! Best-effort browser and platform guesses from case-insensitive token
//! matching. Rules are evaluated top to bottom and the first hit wins, so
//! table order is significant: Edge and Chrome user-agents also carry the
//! Safari token, and Edge carries the Chrome token.

use crate::domain::value_objects::{Browser, Platform};

/// Ordered (tokens, label) rules; any token matching selects the label.
type Rules<T> = &'static [(&'static [&'static str], T)];

const BROWSER_RULES: Rules<Browser> = &[
    (&["edg/"], Browser::Edge),
    (&["chrome/"], Browser::Chrome),
    (&["firefox/"], Browser::Firefox),
    (&["safari/"], Browser::Safari),
];

const PLATFORM_RULES: Rules<Platform> = &[
    (&["windows"], Platform::Windows),
    (&["macintosh", "mac os"], Platform::MacOs),
    (&["android"], Platform::Android),
    (&["iphone", "ipad", "ios"], Platform::Ios),
    (&["linux"], Platform::Linux),
];

fn first_match<T: Copy>(haystack: &str, rules: Rules<T>, fallback: T) -> T {
    rules
        .iter()
        .find(|(tokens, _)| tokens.iter().any(|token| haystack.contains(token)))
        .map(|(_, label)| *label)
        .unwrap_or(fallback)
}

/// Classify a raw user-agent into (browser, platform).
pub fn classify(user_agent: &str) -> (Browser, Platform) {
    let ua = user_agent.to_lowercase();
    (
        first_match(&ua, BROWSER_RULES, Browser::Unknown),
        first_match(&ua, PLATFORM_RULES, Platform::Unknown),
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const EDGE_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";
    const CHROME_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const FIREFOX_LINUX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36";

    #[test]
    fn test_edge_beats_chrome_and_safari() {
        assert_eq!(classify(EDGE_WIN), (Browser::Edge, Platform::Windows));
    }

    #[test]
    fn test_edge_token_any_case() {
        let (browser, _) = classify("SOMETHING EDG/1.0 CHROME/2.0");
        assert_eq!(browser, Browser::Edge);
    }

    #[test]
    fn test_chrome_beats_safari() {
        assert_eq!(classify(CHROME_MAC), (Browser::Chrome, Platform::MacOs));
    }

    #[test]
    fn test_firefox_linux() {
        assert_eq!(classify(FIREFOX_LINUX), (Browser::Firefox, Platform::Linux));
    }

    #[test]
    fn test_iphone_matches_macos_rule_first() {
        // "like Mac OS X" hits the macOS rule, which precedes iOS.
        let (browser, platform) = classify(SAFARI_IPHONE);
        assert_eq!(browser, Browser::Safari);
        assert_eq!(platform, Platform::MacOs);
    }

    #[test]
    fn test_ipad_without_mac_token() {
        let (_, platform) = classify("Mozilla/5.0 (iPad; CPU OS 12_0) Mobile/15E148");
        assert_eq!(platform, Platform::Ios);
    }

    #[test]
    fn test_android_beats_linux() {
        assert_eq!(classify(CHROME_ANDROID), (Browser::Chrome, Platform::Android));
    }

    #[test]
    fn test_scenario_user_agent() {
        assert_eq!(
            classify("Mozilla/5.0 (Windows NT 10.0) Chrome/120.0"),
            (Browser::Chrome, Platform::Windows)
        );
    }

    #[test]
    fn test_empty_and_unrecognized() {
        assert_eq!(classify(""), (Browser::Unknown, Platform::Unknown));
        assert_eq!(classify("curl/8.4.0"), (Browser::Unknown, Platform::Unknown));
    }

    #[test]
    fn test_browser_token_requires_slash() {
        let (browser, _) = classify("chrome firefox safari edge");
        assert_eq!(browser, Browser::Unknown);
    }
}
