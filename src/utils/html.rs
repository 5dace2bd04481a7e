use ammonia;

/// Strips markup from user-supplied text such as saved exam titles.
///
/// Whitelist-based: harmless inline tags survive, `<script>` and friends are
/// removed with their content, and event-handler attributes are dropped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_scripts() {
        assert_eq!(clean_html("Mock <script>alert(1)</script>paper"), "Mock paper");
        assert_eq!(clean_html("  <b>Biology</b> "), "<b>Biology</b>");
    }
}
