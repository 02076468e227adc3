//! Domain-specific assertion macros for efo-explorer harnesses.

/// Assert the labels of a candidate or hierarchy list, in order.
///
/// ```rust,ignore
/// assert_labels!(session.candidates, ["asthma", "allergic asthma"]);
/// ```
#[macro_export]
macro_rules! assert_labels {
    ($items:expr, [$($label:expr),* $(,)?]) => {{
        let actual: Vec<&str> = $items.iter().map(|i| i.label.as_str()).collect();
        let expected: Vec<&str> = vec![$($label),*];
        pretty_assertions::assert_eq!(actual, expected, "labels differ");
    }};
}

/// Assert that a session ended with the given user-facing message.
#[macro_export]
macro_rules! assert_error_message {
    ($session:expr, $needle:expr) => {{
        let message = $session.error_message().unwrap_or_default();
        assert!(
            message.contains($needle),
            "assert_error_message! failed:\n  expected to contain: {:?}\n  actual: {:?}",
            $needle,
            message
        );
    }};
}
