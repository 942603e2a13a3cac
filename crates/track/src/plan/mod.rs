//! Canonical plan model: the closed op set, parameter schemas and the
//! one-op-per-line text format.

pub mod ops;
pub mod schema;
pub mod text;

pub use ops::{Direction, OpKind, TrackOp};
pub use schema::{bind, schema_for, ArgValue, BindError, OpCall, OpSchema, ParamKind, SCHEMAS};
pub use text::{parse_line, ParseMode, Plan, PlanParseError};
