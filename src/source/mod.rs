//! Identity sources - where batches of targets come from.
//!
//! Each source implements [`fanout::IdentitySource`]: a roster file with a
//! named column, a directory group's membership, or a scan of the local
//! machine's profiles.

pub mod directory;
pub mod profile_scan;
pub mod roster;

pub use directory::DirectoryGroup;
pub use profile_scan::ProfileScan;
pub use roster::RosterFile;
