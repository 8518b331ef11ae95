//! Identity source trait - where batches come from.

use crate::error::SourceError;
use crate::identity::Batch;

/// Produces the ordered identity list for one run.
///
/// Concrete sources live with the caller: a delimited roster file with a
/// named column, a directory group's member list, or the command line
/// itself. A source error is fatal; the driver never repairs or partially
/// uses a malformed source.
///
/// Sources do not filter blank entries - the driver records those as
/// skipped so the summary accounts for every row of the input.
pub trait IdentitySource {
    fn load(&self) -> Result<Batch, SourceError>;
}
