mod result;

pub use result::{ExecResult, QueryResult};
