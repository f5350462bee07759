//! HQL statement model and its textual forms.
//!
//! ```text
//! Builder (hql/)
//!       ↓
//! Statement model        (types.rs)
//!       ↓
//! Compiler               (compiler.rs)  → text bound on the query handle
//! Formatter              (formatter.rs) → multi-line display form
//! Literal audit          (audit.rs)     → no operand value inlined
//! ```

pub mod audit;
pub mod compiler;
pub mod formatter;
pub mod types;

// Re-export key types for convenience
pub use audit::audit_literals;
pub use compiler::compile;
pub use formatter::format_hql;
pub use types::*;
