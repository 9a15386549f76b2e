//! Transforms from raw inputs into the dependency model.

pub mod ddg_data;
pub mod traces;

pub use ddg_data::transform_ddg_data;
pub use traces::{
    transform_traces_to_paths, KeyValue, Process, RefType, Span, SpanReference, Trace, TraceData,
};
