use miette::Diagnostic;
use std::result;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// A binder-position rewrite (a let binding, a function value parameter)
    /// produced something other than a variable.
    #[error("binder must remain a variable, got {found}")]
    #[diagnostic(code(quill::traverse::binder_expected))]
    BinderExpected { found: &'static str },

    #[error("Generic error: {0}")]
    Generic(eyre::Report),
}

pub type Result<T> = result::Result<T, Error>;

impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(eyre::Report::msg(s))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.into())
    }
}
