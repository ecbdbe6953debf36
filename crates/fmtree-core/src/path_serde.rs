//! Lossless serde encoding for node paths.
//!
//! UTF-8 paths are written as plain strings. Any other path is written as its
//! raw `OsStr` bytes, so trees scraped from directories with non-UTF-8 names
//! survive a snapshot round-trip unchanged.

use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Encoded {
    Text(String),
    Bytes(Vec<u8>),
}

pub fn serialize<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    match path.to_str() {
        Some(text) => serializer.serialize_str(text),
        None => serializer.serialize_bytes(raw_bytes(path).map_err(S::Error::custom)?),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PathBuf, D::Error> {
    decode(Encoded::deserialize(deserializer)?).map_err(D::Error::custom)
}

/// Same encoding for optional paths.
pub mod option {
    use super::{Encoded, decode};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::path::{Path, PathBuf};

    struct Wrapped<'a>(&'a Path);

    impl Serialize for Wrapped<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            super::serialize(self.0, serializer)
        }
    }

    pub fn serialize<S: Serializer>(
        path: &Option<PathBuf>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match path {
            Some(path) => serializer.serialize_some(&Wrapped(path)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PathBuf>, D::Error> {
        Option::<Encoded>::deserialize(deserializer)?
            .map(decode)
            .transpose()
            .map_err(D::Error::custom)
    }
}

#[cfg(unix)]
fn raw_bytes(path: &Path) -> Result<&[u8], &'static str> {
    use std::os::unix::ffi::OsStrExt;
    Ok(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn raw_bytes(_path: &Path) -> Result<&[u8], &'static str> {
    Err("path is not valid unicode")
}

#[cfg(unix)]
fn decode(encoded: Encoded) -> Result<PathBuf, String> {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;
    Ok(match encoded {
        Encoded::Text(text) => PathBuf::from(text),
        Encoded::Bytes(bytes) => PathBuf::from(OsString::from_vec(bytes)),
    })
}

#[cfg(not(unix))]
fn decode(encoded: Encoded) -> Result<PathBuf, String> {
    match encoded {
        Encoded::Text(text) => Ok(PathBuf::from(text)),
        Encoded::Bytes(bytes) => String::from_utf8(bytes)
            .map(PathBuf::from)
            .map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::path::PathBuf;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        #[serde(with = "crate::path_serde")]
        path: PathBuf,
        #[serde(with = "crate::path_serde::option")]
        root: Option<PathBuf>,
    }

    #[test]
    fn test_utf8_paths_stay_strings() {
        let entry = Entry {
            path: PathBuf::from("/docs/a.md"),
            root: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"path":"/docs/a.md","root":null}"#);
        assert_eq!(serde_json::from_str::<Entry>(&json).unwrap(), entry);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_round_trip() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(b"/docs/bad\xffname.txt"));
        let entry = Entry {
            path: path.clone(),
            root: Some(path),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.starts_with(r#"{"path":[47,"#));
        assert_eq!(serde_json::from_str::<Entry>(&json).unwrap(), entry);
    }
}
