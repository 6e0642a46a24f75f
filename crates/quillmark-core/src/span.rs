/// Half-open range of zero-based source line indices.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Span covering the single line at `line`.
    pub fn line(line: usize) -> Self {
        Self {
            start: line,
            end: line + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_span() {
        assert_eq!(Span::line(4), Span { start: 4, end: 5 });
    }
}
