use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum FileExtensionError {
    #[error("Failed to get file extension")]
    MissingFileExtension,
    #[error("Unsupported file extension for file: {0}")]
    UnsupportedFileExtension(String),
}

pub type FileFormatResult<T> = Result<T, FileExtensionError>;

#[derive(Debug, thiserror::Error)]
pub enum SerdeFormatError {
    #[error("YAML serialization failed")]
    Yaml(#[from] serde_yml::Error),
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
}

pub type SerdeFormatResult<T> = Result<T, SerdeFormatError>;

pub fn get_file_extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|os_str| os_str.to_str())
}

/// Text formats accepted for configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerdeFormat {
    Yaml,
    Json,
}

impl SerdeFormat {
    pub fn from_path(path: &Path) -> FileFormatResult<Self> {
        let ext = get_file_extension(path).ok_or(FileExtensionError::MissingFileExtension)?;

        if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Ok(Self::Yaml)
        } else if ext.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(FileExtensionError::UnsupportedFileExtension(
                path.display().to_string(),
            ))
        }
    }

    pub fn serialize<T: Serialize>(self, value: &T) -> SerdeFormatResult<String> {
        match self {
            Self::Yaml => Ok(serde_yml::to_string(value)?),
            Self::Json => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    pub fn deserialize<T: DeserializeOwned>(self, serialized: &str) -> SerdeFormatResult<T> {
        match self {
            Self::Yaml => Ok(serde_yml::from_str(serialized)?),
            Self::Json => Ok(serde_json::from_str(serialized)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        level: f32,
    }

    #[test]
    fn test_from_path_known_extensions() {
        assert_eq!(
            SerdeFormat::from_path(Path::new("a/b.yaml")).unwrap(),
            SerdeFormat::Yaml
        );
        assert_eq!(
            SerdeFormat::from_path(Path::new("c.YML")).unwrap(),
            SerdeFormat::Yaml
        );
        assert_eq!(
            SerdeFormat::from_path(Path::new("d.json")).unwrap(),
            SerdeFormat::Json
        );
    }

    #[test]
    fn test_from_path_errors() {
        assert!(matches!(
            SerdeFormat::from_path(Path::new("noext")),
            Err(FileExtensionError::MissingFileExtension)
        ));
        let err = SerdeFormat::from_path(&PathBuf::from("cfg.toml")).unwrap_err();
        assert!(err.to_string().contains("cfg.toml"));
    }

    #[test]
    fn test_roundtrip_both_formats() {
        let value = Sample {
            name: "bias".to_string(),
            level: 2.5,
        };
        for format in [SerdeFormat::Yaml, SerdeFormat::Json] {
            let text = format.serialize(&value).unwrap();
            let back: Sample = format.deserialize(&text).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_deserialize_garbage_fails() {
        let result: SerdeFormatResult<Sample> = SerdeFormat::Json.deserialize("{ nope");
        assert!(matches!(result, Err(SerdeFormatError::Json(_))));
    }
}
