/// Format remaining seconds as a clock face, e.g. `3:00` or `0:07`.
///
/// Minutes are not padded and may exceed 59; seconds always take two digits.
pub fn format_clock(remaining_seconds: u64) -> String {
    format!("{}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
}
