//! SQL text generation.
//!
//! Purely mechanical: walks the resolved tree and concatenates the texts
//! resolution already chose. Nothing here consults the metadata oracle or
//! makes semantic decisions; a query that renders wrong was resolved
//! wrong.

pub mod render;
