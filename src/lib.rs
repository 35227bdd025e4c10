use std::fmt;

mod behaviors;
mod dom_core;
mod dom_forms;
mod dom_query;
mod events;
mod html;
mod page;
mod selector;
mod widget;

pub use behaviors::markers;
pub use page::{Navigation, Page};
pub use widget::{WidgetAttachment, WidgetConfig};

pub(crate) use behaviors::*;
pub(crate) use dom_core::*;
pub(crate) use dom_forms::*;
pub(crate) use events::*;
pub(crate) use html::*;
pub(crate) use selector::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    UnsupportedSelector(String),
    SelectorNotFound(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
    Pattern(String),
    Runtime(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::HtmlParse(message) => write!(f, "HTML parse error: {message}"),
            Error::UnsupportedSelector(selector) => {
                write!(f, "unsupported selector: {selector}")
            }
            Error::SelectorNotFound(selector) => {
                write!(f, "no element matches selector: {selector}")
            }
            Error::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "element for {selector} is not {expected} (found {actual})"
            ),
            Error::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected:?}, actual {actual:?}; target: {dom_snippet}"
            ),
            Error::Pattern(message) => write!(f, "invalid pattern: {message}"),
            Error::Runtime(message) => write!(f, "runtime error: {message}"),
        }
    }
}

impl std::error::Error for Error {}
