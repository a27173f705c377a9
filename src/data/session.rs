use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use super::loader;
use super::model::FundingTable;

// ---------------------------------------------------------------------------
// Session – the table loaded once and shared read-only
// ---------------------------------------------------------------------------

/// The loaded table for one dashboard session.
///
/// A failed load is not an error for callers: the session holds an empty
/// table plus the message to show, and every downstream section is skipped.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub table: Arc<FundingTable>,
    pub load_error: Option<String>,
}

impl Session {
    /// Run `loader` once and keep its result, degrading failures to an empty table.
    pub fn open<F>(loader: F) -> Self
    where
        F: FnOnce() -> Result<FundingTable>,
    {
        match loader() {
            Ok(table) => {
                log::info!("Loaded {} startup records", table.len());
                Session {
                    table: Arc::new(table),
                    load_error: None,
                }
            }
            Err(e) => {
                log::error!("Failed to load funding data: {e:#}");
                Session {
                    table: Arc::new(FundingTable::default()),
                    load_error: Some(format!("Error loading data: {e:#}")),
                }
            }
        }
    }

    /// Open a session over a file on disk.
    pub fn from_path(path: &Path) -> Self {
        Self::open(|| loader::load_file(path))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::data::model::tests::record;

    #[test]
    fn successful_loader_is_kept() {
        let session = Session::open(|| {
            Ok(FundingTable::from_records(vec![record("a", None, None, None, None)]))
        });
        assert_eq!(session.table.len(), 1);
        assert!(session.load_error.is_none());
    }

    #[test]
    fn failing_loader_degrades_to_empty_table() {
        let session = Session::open(|| Err(anyhow!("boom")));
        assert!(session.table.is_empty());
        assert_eq!(session.load_error.as_deref(), Some("Error loading data: boom"));
    }

    #[test]
    fn missing_path_is_reported_not_raised() {
        let session = Session::from_path(Path::new("no/such/startup_funding.csv"));
        assert!(session.table.is_empty());
        assert!(session.load_error.unwrap().contains("startup_funding.csv"));
    }
}
