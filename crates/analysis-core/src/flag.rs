//! Parsing the `look_down` column.

use lookdown_common::config::LookDownParsing;
use lookdown_common::error::{LookdownError, LookdownResult};

/// Turn a raw `look_down` cell into a boolean.
///
/// `raw` is `None` for an empty cell. Strict mode has no verdict for an
/// empty cell and returns `Ok(None)`; permissive mode always has one. See
/// [`LookDownParsing`] for the two modes; `Permissive` exists only so that
/// older tables keep producing the numbers they always produced.
pub fn parse_look_down(
    raw: Option<&str>,
    parsing: LookDownParsing,
) -> LookdownResult<Option<bool>> {
    match parsing {
        LookDownParsing::Strict => parse_strict(raw),
        LookDownParsing::Permissive => Ok(Some(parse_permissive(raw))),
    }
}

fn parse_strict(raw: Option<&str>) -> LookdownResult<Option<bool>> {
    let Some(text) = raw.map(str::trim) else {
        return Ok(None);
    };
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Ok(Some(true))
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Ok(Some(false))
    } else {
        Err(LookdownError::table(format!(
            "look_down value '{text}' is not true/false"
        )))
    }
}

fn parse_permissive(raw: Option<&str>) -> bool {
    let Some(text) = raw.map(str::trim) else {
        // A missing value used to be NaN, and NaN is truthy.
        return true;
    };
    if let Ok(number) = text.parse::<f64>() {
        return number != 0.0;
    }
    text.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_accepts_any_case() {
        let parsed: Vec<bool> = ["True", "TRUE", "false"]
            .into_iter()
            .map(|s| parse_look_down(Some(s), LookDownParsing::Strict).unwrap().unwrap())
            .collect();
        assert_eq!(parsed, vec![true, true, false]);
    }

    #[test]
    fn strict_accepts_numeric_flags() {
        let strict = LookDownParsing::Strict;
        assert_eq!(parse_look_down(Some("1"), strict).unwrap(), Some(true));
        assert_eq!(parse_look_down(Some("0"), strict).unwrap(), Some(false));
    }

    #[test]
    fn strict_has_no_verdict_for_missing_flag() {
        assert_eq!(parse_look_down(None, LookDownParsing::Strict).unwrap(), None);
    }

    #[test]
    fn strict_rejects_unknown_text() {
        for bad in ["yes", "2", "Tru", "1.0"] {
            let err = parse_look_down(Some(bad), LookDownParsing::Strict).unwrap_err();
            assert!(err.to_string().contains(bad));
        }
    }

    #[test]
    fn permissive_matches_legacy_truthiness() {
        let p = LookDownParsing::Permissive;
        let parse = |raw| parse_look_down(raw, p).unwrap();
        assert_eq!(parse(Some("TRUE")), Some(true));
        assert_eq!(parse(Some("False")), Some(false));
        assert_eq!(parse(Some("yes")), Some(false));
        assert_eq!(parse(Some("2")), Some(true));
        assert_eq!(parse(Some("0.0")), Some(false));
        // An empty cell was NaN, and NaN is truthy.
        assert_eq!(parse(None), Some(true));
    }
}
