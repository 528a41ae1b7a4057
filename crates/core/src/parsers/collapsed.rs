use flamefold_protocol::FrameName;
use tracing::warn;

use crate::parsers::{FoldReport, ParseError};

/// Parse Brendan Gregg's collapsed/folded stack format.
///
/// Each line is `frame;frame;... count` with the count as the last
/// whitespace-separated token; `#` comments and blank lines are ignored.
/// Frames are outermost-first. Lines without a positive count are
/// skipped with a warning.
///
/// This is the inverse of [`FoldedStacks::to_collapsed`]: parsing that
/// output reproduces the records exactly.
///
/// [`FoldedStacks::to_collapsed`]: crate::model::FoldedStacks::to_collapsed
pub fn parse_collapsed(data: &[u8]) -> Result<FoldReport, ParseError> {
    let text = std::str::from_utf8(data)?;
    let mut report = FoldReport::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = line.rsplit_once(char::is_whitespace).and_then(|(stack, count)| {
            let count: u64 = count.parse().ok()?;
            if count == 0 || stack.trim().is_empty() {
                return None;
            }
            Some((stack.trim(), count))
        });
        let Some((stack, count)) = parsed else {
            warn!(line, "skipping malformed collapsed line");
            report.skipped += 1;
            continue;
        };

        let frames: Vec<FrameName> = stack
            .split(';')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(FrameName::from)
            .collect();
        if frames.is_empty() {
            warn!(line, "skipping collapsed line with no frames");
            report.skipped += 1;
            continue;
        }
        report.stacks.add(frames, count);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_lines() {
        let report = parse_collapsed(b"main;foo;bar 10\nmain;foo;baz 20\nmain;qux 5\n").unwrap();
        assert_eq!(report.stacks.len(), 3);
        assert_eq!(report.stacks.total_samples(), 35);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn repeated_paths_merge() {
        let report = parse_collapsed(b"a;b 1\na;b 4\n").unwrap();
        assert_eq!(report.stacks.len(), 1);
        assert_eq!(report.stacks.records()[0].count, 5);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let report = parse_collapsed(b"# perf 60s\n\nmain;foo 5\n").unwrap();
        assert_eq!(report.stacks.len(), 1);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn malformed_lines_skip_and_count() {
        let report = parse_collapsed(b"no_count_here\nmain 3\n;; 4\nmain 0\n").unwrap();
        assert_eq!(report.stacks.total_samples(), 3);
        assert_eq!(report.skipped, 3);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let report = parse_collapsed(b"").unwrap();
        assert!(report.stacks.is_empty());
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(parse_collapsed(b"\xff\xfe 3").is_err());
    }

    #[test]
    fn round_trips_exactly() {
        let input = "main;foo;bar 2\nmain;baz 1\nonly 7\n";
        let report = parse_collapsed(input.as_bytes()).unwrap();
        let text = report.stacks.to_collapsed();
        assert_eq!(text, input);

        let again = parse_collapsed(text.as_bytes()).unwrap();
        assert_eq!(report.stacks.records(), again.stacks.records());
    }
}
