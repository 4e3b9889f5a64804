//! Cached record contract.

use crate::coord::Location;

/// A cacheable record.
///
/// The cache treats records as opaque except for their position: the ring
/// strategy files each record under the cell containing [`Record::location`],
/// not the cell of the query that fetched it.
pub trait Record: Clone + Send + Sync + 'static {
    /// Where this record lives.
    fn location(&self) -> Location;
}
