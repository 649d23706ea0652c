//! Line-ending policy
//!
//! Block content is stored and compared with `\n` line breaks. When content is
//! written into a document it takes on that document's dominant style, so a
//! CRLF file never gains stray `\r\r\n` or mixed endings from a push.

/// Dominant line-break style of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detect the style of `text`: CRLF when the majority of its line breaks
    /// are `\r\n`, LF otherwise (including text without any line break).
    pub fn detect(text: &str) -> Self {
        let total = text.matches('\n').count();
        let crlf = text.matches("\r\n").count();
        if crlf * 2 > total { Self::CrLf } else { Self::Lf }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Convert text of any style into this style.
    pub fn apply(self, text: &str) -> String {
        let normalized = normalize(text);
        match self {
            Self::Lf => normalized,
            Self::CrLf => normalized.replace('\n', "\r\n"),
        }
    }
}

/// Convert to `\n` line breaks.
///
/// Carriage returns directly before a line break or at the end of the text
/// are dropped. Others are kept.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut carriage_returns = 0;
    for ch in text.chars() {
        match ch {
            '\r' => carriage_returns += 1,
            '\n' => {
                carriage_returns = 0;
                out.push('\n');
            }
            _ => {
                out.extend(std::iter::repeat_n('\r', carriage_returns));
                carriage_returns = 0;
                out.push(ch);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", LineEnding::Lf)]
    #[case("single line", LineEnding::Lf)]
    #[case("a\nb\n", LineEnding::Lf)]
    #[case("a\r\nb\r\n", LineEnding::CrLf)]
    #[case("a\r\nb\r\nc\n", LineEnding::CrLf)]
    #[case("a\r\nb\nc\n", LineEnding::Lf)]
    #[case("a\r\nb\n", LineEnding::Lf)]
    fn detects_majority_style(#[case] text: &str, #[case] expected: LineEnding) {
        assert_eq!(LineEnding::detect(text), expected);
    }

    #[test]
    fn apply_does_not_double_carriage_returns() {
        assert_eq!(LineEnding::CrLf.apply("a\r\nb\nc"), "a\r\nb\r\nc");
        assert_eq!(LineEnding::Lf.apply("a\r\nb\nc"), "a\nb\nc");
    }

    #[rstest]
    #[case("a\rb\r\n", "a\rb\n")]
    #[case("line\r", "line")]
    #[case("a\r\r\nb", "a\nb")]
    #[case("\r\r", "")]
    #[case("x\ry\rz", "x\ry\rz")]
    fn normalize_drops_carriage_returns_before_breaks(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(normalize(text), expected);
        assert_eq!(normalize(expected), expected);
    }
}
