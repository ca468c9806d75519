//! Document outline (bookmarks).

use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::object::{Dict, ObjectRef, Value};
use serde::Serialize;
use std::collections::HashSet;

/// A node of the bookmark tree. The root has an empty title.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outline {
    /// Bookmark text
    pub title: String,
    /// Child bookmarks in `/First`..`/Next` order
    pub children: Vec<Outline>,
}

impl PdfDocument {
    /// The document outline.
    ///
    /// A document without `/Outlines` yields an empty root.
    ///
    /// ```no_run
    /// use pdftext::PdfDocument;
    ///
    /// let doc = PdfDocument::open("sample.pdf")?;
    /// for item in doc.outline()?.children {
    ///     println!("{}", item.title);
    /// }
    /// # Ok::<(), pdftext::Error>(())
    /// ```
    pub fn outline(&self) -> Result<Outline> {
        let catalog = self.catalog()?;
        match self.lookup(&catalog, "Outlines")? {
            Value::Dict(root) => {
                let mut visited = HashSet::new();
                self.outline_item(&root, &mut visited, 0)
            },
            _ => Ok(Outline::default()),
        }
    }

    fn outline_item(&self, entry: &Dict, visited: &mut HashSet<ObjectRef>, depth: u32) -> Result<Outline> {
        if depth >= self.options().max_recursion_depth {
            return Err(Error::RecursionLimitExceeded(self.options().max_recursion_depth));
        }

        let title = self.lookup(entry, "Title")?.text().unwrap_or_default();
        let mut children = Vec::new();
        let mut next = entry.get("First").cloned();

        while let Some(link) = next {
            if let Value::Reference(r) = link {
                if !visited.insert(r) {
                    log::warn!("Outline revisits {}, stopping", r);
                    break;
                }
            }
            let child = match self.resolve_value(&link)? {
                Value::Dict(dict) => dict,
                _ => break,
            };
            children.push(self.outline_item(&child, visited, depth + 1)?);
            next = child.get("Next").cloned();
        }

        Ok(Outline { title, children })
    }
}
