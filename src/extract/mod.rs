//! Ground-truth side of the pipeline: table names from reference SQL and the
//! candidate vocabulary offered to the resolver.

mod sql;
mod vocabulary;

pub use sql::extract_tables;
pub use vocabulary::candidate_vocabulary;
