//! Validation and serialization adapter.
//!
//! Wraps a model type `T` the way a schema layer wraps model instances:
//! incoming JSON is validated into `T` (serde does the structural work, a
//! [`Validate`] hook adds field rules), and outgoing instances are dumped
//! back to JSON.
//!
//! ```text
//! Serializer::with_data(json) → is_valid() → validated_data() / errors()
//! Serializer::with_instance(model) → data()
//! ```

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Field name to error messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Field-level rules applied after deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors> {
        Ok(())
    }
}

/// Schema adapter over `T`.
#[derive(Debug, Clone)]
pub struct Serializer<T> {
    instance: Option<T>,
    initial_data: Option<Value>,
    validated: Option<Result<T, FieldErrors>>,
}

impl<T> Serializer<T>
where
    T: Serialize + DeserializeOwned + Validate,
{
    /// Serializer for dumping an existing instance.
    pub fn with_instance(instance: T) -> Self {
        Self {
            instance: Some(instance),
            initial_data: None,
            validated: None,
        }
    }

    /// Serializer for validating incoming data.
    pub fn with_data(data: Value) -> Self {
        Self {
            instance: None,
            initial_data: Some(data),
            validated: None,
        }
    }

    /// Serializer updating `instance` from `data`.
    pub fn for_update(instance: T, data: Value) -> Self {
        Self {
            instance: Some(instance),
            initial_data: Some(data),
            validated: None,
        }
    }

    pub fn instance(&self) -> Option<&T> {
        self.instance.as_ref()
    }

    pub fn initial_data(&self) -> Option<&Value> {
        self.initial_data.as_ref()
    }

    /// Validate the initial data.
    ///
    /// With `raise_exception`, invalid data becomes a 400 whose detail is
    /// the field error map. Calling this without data is a programming
    /// error and answers 500.
    pub fn is_valid(&mut self, raise_exception: bool) -> ApiResult<bool> {
        let Some(data) = self.initial_data.clone() else {
            tracing::error!("is_valid() called on a serializer without data");
            return Err(ApiError::internal());
        };

        let result = serde_json::from_value::<T>(data)
            .map_err(|e| {
                let mut errors = FieldErrors::new();
                errors.insert("_schema".to_string(), vec![e.to_string()]);
                errors
            })
            .and_then(|value| value.validate().map(|()| value));

        let valid = result.is_ok();
        if let Err(errors) = &result {
            if raise_exception {
                let detail = serde_json::to_value(errors).unwrap_or(Value::Null);
                self.validated = Some(result);
                return Err(ApiError::bad_request().with_detail(detail));
            }
            tracing::debug!(fields = errors.len(), "Serializer validation failed");
        }
        self.validated = Some(result);
        Ok(valid)
    }

    /// Field errors from the last validation.
    pub fn errors(&self) -> ApiResult<FieldErrors> {
        match &self.validated {
            Some(Ok(_)) => Ok(FieldErrors::new()),
            Some(Err(errors)) => Ok(errors.clone()),
            None => Err(not_validated("errors")),
        }
    }

    /// The validated value.
    pub fn validated_data(&self) -> ApiResult<&T> {
        match &self.validated {
            Some(Ok(value)) => Ok(value),
            Some(Err(_)) => Err(ApiError::bad_request()),
            None => Err(not_validated("validated_data")),
        }
    }

    /// Take the validated value, consuming the serializer.
    pub fn into_validated(self) -> ApiResult<T> {
        match self.validated {
            Some(Ok(value)) => Ok(value),
            Some(Err(errors)) => Err(ApiError::bad_request()
                .with_detail(serde_json::to_value(errors).unwrap_or(Value::Null))),
            None => Err(not_validated("into_validated")),
        }
    }

    /// Representation for responses.
    ///
    /// The instance when present and valid, else the validated data, else
    /// `null`. Reading data supplied for validation before `is_valid()` is
    /// a programming error.
    pub fn data(&self) -> ApiResult<Value> {
        if self.initial_data.is_some() && self.validated.is_none() {
            return Err(not_validated("data"));
        }
        let has_error = matches!(self.validated, Some(Err(_)));
        let value = match (&self.instance, &self.validated) {
            (Some(instance), _) if !has_error => serde_json::to_value(instance),
            (_, Some(Ok(validated))) => serde_json::to_value(validated),
            _ => Ok(Value::Null),
        };
        value.map_err(|e| {
            tracing::error!(error = %e, "Failed to dump serializer data");
            ApiError::internal()
        })
    }
}

fn not_validated(accessor: &str) -> ApiError {
    tracing::error!(accessor, "You must call `.is_valid()` before accessing serializer results");
    ApiError::internal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
        #[serde(default)]
        body: String,
    }

    impl Validate for Note {
        fn validate(&self) -> Result<(), FieldErrors> {
            if self.title.trim().is_empty() {
                let mut errors = FieldErrors::new();
                errors.insert("title".into(), vec!["may not be blank".into()]);
                return Err(errors);
            }
            Ok(())
        }
    }

    #[test]
    fn test_valid_data() {
        let mut s = Serializer::<Note>::with_data(json!({"title": "hello", "extra": 1}));
        assert!(s.is_valid(false).unwrap());
        assert!(s.errors().unwrap().is_empty());
        assert_eq!(s.validated_data().unwrap().title, "hello");
        assert_eq!(s.data().unwrap(), json!({"title": "hello", "body": ""}));
    }

    #[test]
    fn test_field_rule_failure() {
        let mut s = Serializer::<Note>::with_data(json!({"title": "  "}));
        assert!(!s.is_valid(false).unwrap());
        assert_eq!(s.errors().unwrap()["title"], vec!["may not be blank"]);
        assert_eq!(s.data().unwrap(), Value::Null);
    }

    #[test]
    fn test_raise_exception() {
        let mut s = Serializer::<Note>::with_data(json!({"body": "no title"}));
        let err = s.is_valid(true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(err.detail().unwrap().get("_schema").is_some());
    }

    #[test]
    fn test_accessors_before_validation() {
        let s = Serializer::<Note>::with_data(json!({"title": "x"}));
        assert_eq!(s.errors().unwrap_err().kind(), ErrorKind::Internal);
        assert_eq!(s.data().unwrap_err().kind(), ErrorKind::Internal);

        let mut s = Serializer::<Note>::with_instance(Note { title: "x".into(), body: String::new() });
        assert_eq!(s.is_valid(false).unwrap_err().kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_instance_dump() {
        let s = Serializer::with_instance(Note { title: "a</b".into(), body: "c".into() });
        assert_eq!(s.data().unwrap(), json!({"title": "a</b", "body": "c"}));
    }
}
