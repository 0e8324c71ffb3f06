//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Boolean is TINYINT(1), returns 1/0
//! - `||` is logical OR by default (use CONCAT())
//! - No NULLS FIRST/LAST; NULLs already sort first ascending and last descending
//! - No IF NOT EXISTS on CREATE INDEX
//! - `/` keeps only `div_precision_increment` (4) extra digits, so dividends widen to DECIMAL(65,10)

use super::helpers;
use super::SqlDialect;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn supports_concat_operator(&self) -> bool {
        // MySQL || is OR by default, use CONCAT() instead
        false
    }

    fn fractional_division_cast(&self) -> Option<&'static str> {
        Some("DECIMAL(65,10)")
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_mysql(name)
    }

    fn supports_if_not_exists(&self) -> bool {
        false
    }
}
