//! SQL dialects with differing pagination syntax.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::Window;

/// SQL dialect of the host query engine.
///
/// Only the details pagination depends on are modelled: the limit clause and
/// whether a derived table may carry an alias.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Dialect {
    /// PostgreSQL.
    #[default]
    Postgres,
    /// MySQL and MariaDB.
    #[strum(to_string = "mysql")]
    #[serde(rename = "mysql")]
    MySql,
    /// SQLite.
    Sqlite,
    /// Oracle.
    Oracle,
}

impl Dialect {
    /// Maps a connection adapter name to its dialect.
    ///
    /// Adapter names starting with `oracle` and the `oci` adapter map to
    /// [`Dialect::Oracle`]. Unknown names return `None`.
    pub fn from_adapter_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();

        if name.starts_with("oracle") || name == "oci" {
            return Some(Self::Oracle);
        }

        match name.as_str() {
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            "mysql" | "mysql2" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns whether a subquery in `FROM` may be given an alias with `AS`.
    #[inline]
    pub fn supports_subquery_alias(self) -> bool {
        !matches!(self, Self::Oracle)
    }

    /// Returns the clause restricting a query to the given window.
    pub fn limit_clause(self, window: Window) -> String {
        let Window { offset, limit } = window;
        match self {
            Self::Oracle => format!("OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY"),
            Self::Postgres | Self::MySql | Self::Sqlite => {
                format!("LIMIT {limit} OFFSET {offset}")
            }
        }
    }
}
