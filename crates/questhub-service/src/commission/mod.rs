//! Commission bookkeeping for fees shops pay.

pub mod service;

pub use service::{CommissionService, RecordFeeRequest};
