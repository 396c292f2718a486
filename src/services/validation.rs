use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, FieldError};

/// Runs the declarative rules of `request` and flattens every failure into a field list.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    let mut fields = Vec::new();
    if let Err(errors) = request.validate() {
        collect_field_errors("", &errors, &mut fields);
    }
    finish(fields)
}

/// Fails with `Validation` when `fields` is non-empty, sorted by field path.
pub fn finish(mut fields: Vec<FieldError>) -> Result<(), AppError> {
    if fields.is_empty() {
        return Ok(());
    }
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    Err(AppError::validation(fields))
}

pub fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    let message = failure
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("failed '{}' check", failure.code));
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(&path, nested, out),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    collect_field_errors(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}
