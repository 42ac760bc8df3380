use regex::{Regex, RegexBuilder};

/// Compiles a glob-style scheme pattern into a case-insensitive regex
///
/// `*` matches any run of characters (including none); every other character
/// matches itself literally. The pattern is not anchored, so it matches
/// anywhere in the candidate URL.
///
/// # Examples
///
/// ```
/// use media_publisher::ruleset::compile_scheme;
///
/// let pattern = compile_scheme("https://*.youtube.com/watch*").unwrap();
/// assert!(pattern.is_match("https://www.YouTube.com/watch?v=abc"));
/// assert!(!pattern.is_match("https://www.youtube.com/channel/abc"));
/// ```
pub fn compile_scheme(scheme: &str) -> Result<Regex, regex::Error> {
    let source = scheme
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    RegexBuilder::new(&source).case_insensitive(true).build()
}

/// Checks whether a media URL is claimed by a rule
///
/// With no scheme patterns, the rule claims any URL containing its domain
/// literally; otherwise any matching pattern claims it.
pub fn matches_media_url(domain: &str, patterns: &[Regex], media_url: &str) -> bool {
    if patterns.is_empty() {
        return media_url.contains(domain);
    }

    patterns.iter().any(|pattern| pattern.is_match(media_url))
}
