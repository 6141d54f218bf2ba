use std::io::BufRead;
use std::path::Path;
use std::str::SplitWhitespace;

use crate::ParseError;

/// Yields `(line number, line)` for each line that's neither empty nor a
/// comment; line numbers start at 1.
pub(super) fn lines<'a>(
    path: &'a Path,
    reader: impl BufRead + 'a,
) -> impl Iterator<Item = Result<(usize, String), ParseError>> + 'a {
    reader
        .lines()
        .enumerate()
        .filter_map(move |(idx, line)| match line {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() || line.starts_with('#') {
                    None
                } else {
                    Some(Ok((idx + 1, line.to_owned())))
                }
            }

            Err(source) => Some(Err(ParseError::Io {
                path: path.to_owned(),
                source,
            })),
        })
}

pub(super) fn parse_f32(line: usize, token: &str) -> Result<f32, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        token: token.to_owned(),
    })
}

/// Parses exactly `N` leading numbers, ignoring anything that follows them.
pub(super) fn parse_floats<const N: usize>(
    line: usize,
    directive: &'static str,
    tokens: &mut SplitWhitespace<'_>,
) -> Result<[f32; N], ParseError> {
    let mut out = [0.0; N];

    for item in &mut out {
        let token = tokens.next().ok_or(ParseError::MissingComponents {
            line,
            directive,
            expected: N,
        })?;

        *item = parse_f32(line, token)?;
    }

    Ok(out)
}
