//! Line-level view of a display string for front ends.

/// One line of the display, classified for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayLine<'a> {
    /// A `**...**` line; holds the text between the markers.
    StepHeader(&'a str),
    Text(&'a str),
}

/// Split a display string on `\n` and mark step-header lines.
pub fn display_lines(display: &str) -> Vec<DisplayLine<'_>> {
    display.split('\n').map(classify).collect()
}

// The markers may overlap: "**" and "***" are both empty headers.
fn classify(line: &str) -> DisplayLine<'_> {
    if line.starts_with("**") && line.ends_with("**") {
        DisplayLine::StepHeader(line.get(2..line.len() - 2).unwrap_or(""))
    } else {
        DisplayLine::Text(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_display_has_header_then_content() {
        let lines = display_lines("**Checking**\n\nHello world");
        assert_eq!(
            lines,
            vec![
                DisplayLine::StepHeader("Checking"),
                DisplayLine::Text(""),
                DisplayLine::Text("Hello world"),
            ]
        );
    }

    #[test]
    fn inline_error_prefix_is_not_a_header() {
        assert_eq!(
            display_lines("**Error:** boom"),
            vec![DisplayLine::Text("**Error:** boom")]
        );
    }

    #[test]
    fn short_marker_lines_are_empty_headers() {
        assert_eq!(display_lines("**"), vec![DisplayLine::StepHeader("")]);
        assert_eq!(display_lines("***"), vec![DisplayLine::StepHeader("")]);
        assert_eq!(display_lines("****"), vec![DisplayLine::StepHeader("")]);
        assert_eq!(display_lines("*"), vec![DisplayLine::Text("*")]);
    }

    #[test]
    fn unset_step_display_starts_with_empty_header() {
        assert_eq!(
            display_lines("****\n\nHello"),
            vec![
                DisplayLine::StepHeader(""),
                DisplayLine::Text(""),
                DisplayLine::Text("Hello"),
            ]
        );
    }
}
