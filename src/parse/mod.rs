pub mod date_expr;

pub use date_expr::{ParsedDate, format_for_display, parse, parse_at, parse_recurrence_rule};
