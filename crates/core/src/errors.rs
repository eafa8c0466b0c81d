use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("win field `{0}` must not be empty")]
    EmptyField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::DomainError;

    #[test]
    fn empty_field_error_names_the_field() {
        assert_eq!(DomainError::EmptyField("who").to_string(), "win field `who` must not be empty");
    }
}
