//! Loose parameter strings: `key1=value1|key2=value2`.
//!
//! Values go through the safe [`Literal`] grammar and fall back to the raw
//! string when they are not literals. Readers and writers consume the
//! options they understand with the `take_*` accessors and call
//! [`LooseParams::finish`] so that misspelled options surface as errors.

pub mod literal;

use indexmap::IndexMap;
use std::fmt;
use tracing::debug;

use crate::config::constants::{PARAM_ASSIGN, PARAM_SEPARATOR};
use crate::error::{ParamError, ParamResult};
pub use literal::Literal;

/// Header row selection shared by the readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// Column names come from the given row (after `skiprows`).
    Row(usize),
    /// No header row; columns are numbered.
    None,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LooseParams {
    values: IndexMap<String, Literal>,
}

impl LooseParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a loose parameter string.
    ///
    /// Empty segments are skipped. A segment without `=` or with an empty
    /// key fails the whole parse. Later duplicates overwrite earlier ones.
    pub fn parse(input: &str) -> ParamResult<Self> {
        let mut values = IndexMap::new();
        for segment in input.split(PARAM_SEPARATOR) {
            if segment.trim().is_empty() {
                continue;
            }
            let (key, raw) = segment
                .split_once(PARAM_ASSIGN)
                .ok_or_else(|| ParamError::MissingAssignment(segment.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ParamError::EmptyKey(segment.to_string()));
            }
            let raw = raw.trim();
            let value = Literal::parse(raw).unwrap_or_else(|| Literal::Str(raw.to_string()));
            values.insert(key.to_string(), value);
        }
        debug!("Parsed {} loose parameter(s) from {:?}", values.len(), input);
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remove and return the first of `keys` that is present.
    fn take_any(&mut self, keys: &[&str]) -> Option<(String, Literal)> {
        keys.iter()
            .find_map(|key| self.values.shift_remove_entry(*key))
    }

    pub fn take_bool(&mut self, key: &str) -> ParamResult<Option<bool>> {
        match self.take_any(&[key]) {
            None => Ok(None),
            Some((_, Literal::Bool(b))) => Ok(Some(b)),
            Some((_, Literal::Int(i @ (0 | 1)))) => Ok(Some(i == 1)),
            Some((_, Literal::Str(s))) if s == "true" || s == "false" => Ok(Some(s == "true")),
            Some((k, other)) => Err(ParamError::invalid_value(k, "a boolean", other)),
        }
    }

    pub fn take_usize(&mut self, key: &str) -> ParamResult<Option<usize>> {
        match self.take_any(&[key]) {
            None | Some((_, Literal::None)) => Ok(None),
            Some((k, Literal::Int(i))) => usize::try_from(i)
                .map(Some)
                .map_err(|_| ParamError::invalid_value(k, "a non-negative integer", i)),
            Some((k, other)) => Err(ParamError::invalid_value(k, "a non-negative integer", other)),
        }
    }

    pub fn take_string(&mut self, key: &str) -> ParamResult<Option<String>> {
        match self.take_any(&[key]) {
            None => Ok(None),
            Some((_, Literal::Str(s))) => Ok(Some(s)),
            Some((k, other)) => Err(ParamError::invalid_value(k, "a string", other)),
        }
    }

    /// Single-byte character option such as a field separator. The first
    /// present key among `keys` wins, so aliases like `sep`/`delimiter` work.
    pub fn take_char(&mut self, keys: &[&str]) -> ParamResult<Option<u8>> {
        match self.take_any(keys) {
            None => Ok(None),
            Some((k, Literal::Str(s))) => match s.as_bytes() {
                [b] => Ok(Some(*b)),
                _ => Err(ParamError::invalid_value(k, "a single ASCII character", format!("'{s}'"))),
            },
            Some((k, other)) => Err(ParamError::invalid_value(k, "a single ASCII character", other)),
        }
    }

    /// A list of names; a lone string is accepted as a one-element list.
    pub fn take_string_list(&mut self, key: &str) -> ParamResult<Option<Vec<String>>> {
        match self.take_any(&[key]) {
            None | Some((_, Literal::None)) => Ok(None),
            Some((_, Literal::Str(s))) => Ok(Some(vec![s])),
            Some((k, Literal::List(items))) => items
                .into_iter()
                .map(|item| match item {
                    Literal::Str(s) => Ok(s),
                    Literal::Int(i) => Ok(i.to_string()),
                    other => Err(ParamError::invalid_value(k.clone(), "a list of names", other)),
                })
                .collect::<ParamResult<Vec<_>>>()
                .map(Some),
            Some((k, other)) => Err(ParamError::invalid_value(k, "a list of names", other)),
        }
    }

    /// `header=None` disables the header row, `header=<n>` selects a row.
    pub fn take_header(&mut self) -> ParamResult<Option<Header>> {
        match self.take_any(&["header"]) {
            None => Ok(None),
            Some((_, Literal::None)) => Ok(Some(Header::None)),
            Some((_, Literal::Int(i))) if i >= 0 => Ok(Some(Header::Row(i as usize))),
            Some((k, other)) => Err(ParamError::invalid_value(k, "None or a row number", other)),
        }
    }

    /// Remove a raw literal, for options with format-specific shapes.
    pub fn take(&mut self, key: &str) -> Option<Literal> {
        self.values.shift_remove(key)
    }

    /// Fail if any option was left unconsumed.
    pub fn finish(self, context: &str) -> ParamResult<()> {
        if self.values.is_empty() {
            Ok(())
        } else {
            Err(ParamError::UnknownOption {
                context: context.to_string(),
                keys: self.values.into_keys().collect(),
            })
        }
    }
}

impl fmt::Display for LooseParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, "{PARAM_SEPARATOR}")?;
            }
            write!(f, "{key}{PARAM_ASSIGN}{value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literals() {
        let params = LooseParams::parse("a=1|b=True").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some(&Literal::Int(1)));
        assert_eq!(params.get("b"), Some(&Literal::Bool(true)));
    }

    #[test]
    fn test_string_fallback() {
        let params = LooseParams::parse("encoding=utf-8|sheet_name='Data'|path=a/b.csv").unwrap();
        assert_eq!(params.get("encoding"), Some(&Literal::Str("utf-8".into())));
        assert_eq!(params.get("sheet_name"), Some(&Literal::Str("Data".into())));
        assert_eq!(params.get("path"), Some(&Literal::Str("a/b.csv".into())));
    }

    #[test]
    fn test_empty_and_blank_segments() {
        assert!(LooseParams::parse("").unwrap().is_empty());
        let params = LooseParams::parse("a=1||b=2|").unwrap();
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_value_keeps_later_equals() {
        let params = LooseParams::parse("expr=a=b").unwrap();
        assert_eq!(params.get("expr"), Some(&Literal::Str("a=b".into())));
    }

    #[test]
    fn test_malformed_segment_fails() {
        assert_eq!(
            LooseParams::parse("a=1|oops"),
            Err(ParamError::MissingAssignment("oops".into()))
        );
        assert_eq!(
            LooseParams::parse("=1"),
            Err(ParamError::EmptyKey("=1".into()))
        );
    }

    #[test]
    fn test_reserialize_roundtrip() {
        let original = LooseParams::parse("a=1|b=True|c=x y|d=[1, 'z']|e=2.0|f=None").unwrap();
        let reparsed = LooseParams::parse(&original.to_string()).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn test_typed_accessors() {
        let mut params =
            LooseParams::parse("sep=;|nrows=2|usecols=['a', 'b']|header=None|index=False").unwrap();
        assert_eq!(params.take_char(&["sep", "delimiter"]).unwrap(), Some(b';'));
        assert_eq!(params.take_usize("nrows").unwrap(), Some(2));
        assert_eq!(
            params.take_string_list("usecols").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(params.take_header().unwrap(), Some(Header::None));
        assert_eq!(params.take_bool("index").unwrap(), Some(false));
        assert_eq!(params.take_bool("missing").unwrap(), None);
        assert!(params.finish("read").is_ok());
    }

    #[test]
    fn test_bare_words_stay_strings() {
        let mut params = LooseParams::parse("na_rep=nan|sheet_name=inf|classes=true|index=true").unwrap();
        assert_eq!(params.take_string("na_rep").unwrap(), Some("nan".to_string()));
        assert_eq!(params.take_string("sheet_name").unwrap(), Some("inf".to_string()));
        assert_eq!(params.take_string("classes").unwrap(), Some("true".to_string()));
        assert_eq!(params.take_bool("index").unwrap(), Some(true));
    }

    #[test]
    fn test_type_mismatch_and_leftovers() {
        let mut params = LooseParams::parse("nrows=abc|bogus=1").unwrap();
        assert!(matches!(
            params.take_usize("nrows"),
            Err(ParamError::InvalidValue { .. })
        ));
        let err = params.finish("csv reader").unwrap_err();
        assert_eq!(err.to_string(), "csv reader got unexpected option(s): bogus");
    }
}
