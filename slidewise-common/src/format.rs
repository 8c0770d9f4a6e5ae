//! Input and solution file formats
//!
//! **Input:** first line is the photo count N; each of the next N lines is
//! `<H|V> <M> <tag_1> ... <tag_M>`.
//!
//! **Solution (`.sol`):** first line is the slide count K; each of the next K
//! lines lists the photo id(s) of one slide, space separated.
//!
//! Both readers fail fast with the 1-based line number of the first problem.
//! Trailing blank lines are accepted; any other trailing content is not.

use crate::catalog::{PhotoId, RawPhoto};
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;

/// Parse input-file text into raw photo records
///
/// Orientation symbols are passed through unchecked; [`crate::Catalog::load`]
/// validates them.
pub fn parse_input(text: &str) -> Result<Vec<RawPhoto>> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

    let (_, header) = lines
        .next()
        .ok_or_else(|| Error::input(1, "missing photo count"))?;
    let count: usize = header
        .trim()
        .parse()
        .map_err(|_| Error::input(1, format!("invalid photo count '{}'", header.trim())))?;

    // the header is untrusted; never reserve more than the text can hold
    let mut records = Vec::with_capacity(count.min(text.lines().count()));
    for expected in 0..count {
        let (line_no, line) = lines.next().ok_or_else(|| {
            Error::input(
                expected + 2,
                format!("expected {} photos, found {}", count, expected),
            )
        })?;
        records.push(parse_photo_line(line_no, line)?);
    }

    reject_trailing(lines, Error::input)?;
    Ok(records)
}

fn parse_photo_line(line_no: usize, line: &str) -> Result<RawPhoto> {
    let mut tokens = line.split_whitespace();

    let orientation = tokens
        .next()
        .ok_or_else(|| Error::input(line_no, "empty photo line"))?;
    let declared = tokens
        .next()
        .ok_or_else(|| Error::input(line_no, "missing tag count"))?;
    let declared: usize = declared
        .parse()
        .map_err(|_| Error::input(line_no, format!("invalid tag count '{}'", declared)))?;

    let tags: Vec<&str> = tokens.collect();
    if tags.len() != declared {
        return Err(Error::input(
            line_no,
            format!("declared {} tags, found {}", declared, tags.len()),
        ));
    }

    Ok(RawPhoto::new(orientation, tags))
}

fn reject_trailing<'a, I>(lines: I, make: fn(usize, String) -> Error) -> Result<()>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    for (line_no, line) in lines {
        if !line.trim().is_empty() {
            return Err(make(line_no, "unexpected trailing content".to_string()));
        }
    }
    Ok(())
}

/// Write slides (as photo-id groups) in solution format
pub fn write_solution<W: Write>(mut writer: W, groups: &[Vec<PhotoId>]) -> std::io::Result<()> {
    writeln!(writer, "{}", groups.len())?;
    for group in groups {
        let line: Vec<String> = group.iter().map(|id| id.to_string()).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    writer.flush()
}

/// Write a solution file, replacing any existing file
pub fn write_solution_file<P: AsRef<Path>>(path: P, groups: &[Vec<PhotoId>]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_solution(std::io::BufWriter::new(file), groups)?;
    Ok(())
}

/// Parse solution text back into photo-id groups
///
/// Only the shape is checked here (one or two ids per slide); uniqueness is
/// [`crate::solution::check_photo_groups`]'s job.
pub fn parse_solution(text: &str) -> Result<Vec<Vec<PhotoId>>> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

    let (_, header) = lines
        .next()
        .ok_or_else(|| Error::solution(1, "missing slide count"))?;
    let count: usize = header
        .trim()
        .parse()
        .map_err(|_| Error::solution(1, format!("invalid slide count '{}'", header.trim())))?;

    let mut groups = Vec::with_capacity(count.min(text.lines().count()));
    for expected in 0..count {
        let (line_no, line) = lines.next().ok_or_else(|| {
            Error::solution(
                expected + 2,
                format!("expected {} slides, found {}", count, expected),
            )
        })?;

        let group = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<PhotoId>()
                    .map_err(|_| Error::solution(line_no, format!("invalid photo id '{}'", tok)))
            })
            .collect::<Result<Vec<_>>>()?;

        if group.is_empty() || group.len() > 2 {
            return Err(Error::solution(
                line_no,
                format!("a slide holds 1 or 2 photos, found {}", group.len()),
            ));
        }
        groups.push(group);
    }

    reject_trailing(lines, Error::solution)?;
    Ok(groups)
}

/// Read and parse a solution file
pub fn read_solution_file<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<PhotoId>>> {
    let text = std::fs::read_to_string(path)?;
    parse_solution(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_basic() {
        let records = parse_input("3\nH 3 cat beach sun\nV 2 selfie smile\nV 2 garden selfie\n").unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], RawPhoto::new("H", ["cat", "beach", "sun"]));
        assert_eq!(records[2].orientation, "V");
    }

    #[test]
    fn test_parse_input_oversized_count() {
        for header in ["18446744073709551615", "100000000000"] {
            let err = parse_input(&format!("{}\nH 1 a\n", header)).unwrap_err();
            match err {
                Error::InputFormat { line, message } => {
                    assert_eq!(line, 3);
                    assert!(message.contains("found 1"), "{}", message);
                }
                other => panic!("expected input format error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_solution_oversized_count() {
        for header in ["18446744073709551615", "100000000000"] {
            let err = parse_solution(&format!("{}\n0\n", header)).unwrap_err();
            match err {
                Error::SolutionFormat { line, message } => {
                    assert_eq!(line, 3);
                    assert!(message.contains("found 1"), "{}", message);
                }
                other => panic!("expected solution format error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_input_zero_tags() {
        let records = parse_input("1\nH 0\n").unwrap();
        assert!(records[0].tags.is_empty());
    }

    #[test]
    fn test_parse_input_tag_count_mismatch() {
        let err = parse_input("2\nH 1 a\nV 3 a b\n").unwrap_err();
        assert!(matches!(err, Error::InputFormat { line: 3, .. }), "{:?}", err);
    }

    #[test]
    fn test_parse_input_missing_lines() {
        let err = parse_input("3\nH 1 a\n").unwrap_err();
        assert!(matches!(err, Error::InputFormat { line: 3, .. }), "{:?}", err);
    }

    #[test]
    fn test_parse_input_bad_header() {
        assert!(matches!(parse_input(""), Err(Error::InputFormat { line: 1, .. })));
        assert!(matches!(parse_input("three\n"), Err(Error::InputFormat { line: 1, .. })));
    }

    #[test]
    fn test_parse_input_bad_tag_count() {
        let err = parse_input("1\nH x a\n").unwrap_err();
        assert!(matches!(err, Error::InputFormat { line: 2, .. }));
    }

    #[test]
    fn test_parse_input_trailing_content() {
        assert!(parse_input("1\nH 1 a\n\n\n").is_ok());
        let err = parse_input("1\nH 1 a\nV 1 b\n").unwrap_err();
        assert!(matches!(err, Error::InputFormat { line: 3, .. }));
    }

    #[test]
    fn test_parse_input_crlf() {
        let records = parse_input("1\r\nH 2 a b\r\n").unwrap();
        assert_eq!(records[0].tags, vec!["a", "b"]);
    }

    #[test]
    fn test_write_solution_layout() {
        let mut out = Vec::new();
        write_solution(&mut out, &[vec![0], vec![3, 2], vec![1]]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3\n0\n3 2\n1\n");
    }

    #[test]
    fn test_write_empty_solution() {
        let mut out = Vec::new();
        write_solution(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0\n");
    }

    #[test]
    fn test_parse_solution_rejects_bad_groups() {
        assert!(matches!(
            parse_solution("1\n1 2 3\n"),
            Err(Error::SolutionFormat { line: 2, .. })
        ));
        assert!(matches!(
            parse_solution("2\n1\n\n"),
            Err(Error::SolutionFormat { line: 3, .. })
        ));
        assert!(matches!(
            parse_solution("1\n-4\n"),
            Err(Error::SolutionFormat { line: 2, .. })
        ));
    }
}
