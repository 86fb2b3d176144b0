use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Question text and options are entered by administrators and echoed
/// back to every quiz taker, so they are sanitized on write as a
/// fail-safe against Stored XSS. Whitelist-based: safe tags survive,
/// <script> and event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
