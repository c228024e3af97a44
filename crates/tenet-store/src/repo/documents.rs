//! Read-only access to the document and exception registry
//!
//! The governance layer never writes these tables; the document lifecycle
//! tooling owns them. Display text is decoded on the way out.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::governance::Governance;
use crate::repo::hydration::{document_from_row, exception_from_row, DOCUMENT_COLUMNS, EXCEPTION_COLUMNS};
use rusqlite::OptionalExtension;
use tenet_core::errors::GovernanceError;
use tenet_core::model::{Document, DocumentException};

impl Governance {
    /// Fetch one document by id
    pub fn document(&self, document_id: i64) -> Result<Document> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1");
        let stored = self
            .conn
            .query_row(&sql, [document_id], document_from_row)
            .optional()
            .map_err(from_rusqlite)?
            .ok_or(GovernanceError::DocumentNotFound { document_id })?;
        Ok(self.decode_document(stored))
    }

    /// List documents, optionally restricted to one type
    ///
    /// Ordered by type, then name, then id.
    pub fn list_documents(&self, document_type: Option<&str>) -> Result<Vec<Document>> {
        let stored = match document_type {
            Some(wanted) => {
                let sql = format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE document_type = ?1 ORDER BY document_type ASC, document_name ASC, id ASC"
                );
                let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
                let rows = stmt
                    .query_map([wanted], document_from_row)
                    .map_err(from_rusqlite)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(from_rusqlite)?;
                rows
            }
            None => {
                let sql = format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY document_type ASC, document_name ASC, id ASC"
                );
                let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
                let rows = stmt
                    .query_map([], document_from_row)
                    .map_err(from_rusqlite)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(from_rusqlite)?;
                rows
            }
        };

        Ok(stored
            .into_iter()
            .map(|document| self.decode_document(document))
            .collect())
    }

    /// Fetch one exception by id
    pub fn exception(&self, exception_id: i64) -> Result<DocumentException> {
        let sql = format!("SELECT {EXCEPTION_COLUMNS} FROM document_exceptions WHERE value = ?1");
        let stored = self
            .conn
            .query_row(&sql, [exception_id], exception_from_row)
            .optional()
            .map_err(from_rusqlite)?
            .ok_or(GovernanceError::ExceptionNotFound { exception_id })?;
        Ok(self.decode_exception(stored))
    }

    /// List every exception, ordered by id
    pub fn list_exceptions(&self) -> Result<Vec<DocumentException>> {
        let sql = format!("SELECT {EXCEPTION_COLUMNS} FROM document_exceptions ORDER BY value ASC");
        let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        let stored = stmt
            .query_map([], exception_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(stored
            .into_iter()
            .map(|exception| self.decode_exception(exception))
            .collect())
    }

    fn decode_document(&self, mut document: Document) -> Document {
        document.document_name = self.decode(&document.document_name);
        document
    }

    fn decode_exception(&self, mut exception: DocumentException) -> DocumentException {
        exception.name = self.decode(&exception.name);
        exception.description = self.decode(&exception.description);
        exception.justification = self.decode(&exception.justification);
        exception
    }
}
