//! The externally defined rule repository: synonyms plus regex rules that
//! map phrases onto op templates.

pub mod arg_spec;
pub mod repository;

pub use arg_spec::{cast, ArgSpec, CastFailure, CastType};
pub use repository::{
    OpTemplate, Rule, RuleList, RuleLoadError, RuleRepository, Synonym, SUPPORTED_RULES_VERSION,
};
