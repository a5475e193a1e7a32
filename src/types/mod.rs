//! Call and operation types shared by transaction building and MultiSend encoding

mod call;
mod operation;

pub use call::{Call, SafeCall, TypedCall};
pub use operation::Operation;
