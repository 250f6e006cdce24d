//! Per-source-type search adapters

mod browser;
mod chat;
mod code;
mod document;
mod email;
pub(crate) mod indexed;
mod registry;

pub use browser::{BrowserAdapter, BrowserProfile};
pub use chat::{ChatAdapter, ChatProfile};
pub use code::{CodeAdapter, CodeProfile};
pub use document::{DocumentAdapter, DocumentProfile};
pub use email::{EmailAdapter, EmailProfile};
pub use indexed::{IndexedAdapter, MetadataProfile};
pub use registry::SourceAdapterRegistry;
