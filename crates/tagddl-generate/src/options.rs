use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Options for the generation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Indent with a tab instead of spaces.
    pub use_tab: bool,
    /// Spaces per indentation level when `use_tab` is off.
    pub indent_spaces: usize,
    /// Owner of the database and authorization of created schemas.
    pub owner: String,
    pub encoding: String,
    pub tablespace: String,
    /// `LC_COLLATE`/`LC_CTYPE` value; `default` leaves both out.
    pub collation: String,
    /// Write `_drop.sql` files.
    pub drop_statements: bool,
    /// Emit deferred `FOREIGN KEY` constraints.
    pub foreign_key_constraint: bool,
    /// Read entity documentation as pipe-delimited seed rows.
    pub table_inserts: bool,
    /// Marker name that trigger reference tags target.
    pub trigger: String,
    /// Marker name that function reference tags target.
    pub function: String,
    /// Marker name that procedure reference tags target.
    pub procedure: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            use_tab: false,
            indent_spaces: 4,
            owner: "postgres".to_string(),
            encoding: "UTF8".to_string(),
            tablespace: "pg_default".to_string(),
            collation: "default".to_string(),
            drop_statements: true,
            foreign_key_constraint: true,
            table_inserts: false,
            trigger: "trigger".to_string(),
            function: "function".to_string(),
            procedure: "procedure".to_string(),
        }
    }
}

/// How entity documentation is turned into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentationMode {
    /// `COMMENT ON TABLE` with the documentation text.
    Comment,
    /// One `INSERT` per documentation line.
    SeedRows,
}

impl GenerateOptions {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !self.use_tab && self.indent_spaces == 0 {
            return Err(GenerationError::InvalidOptions(
                "indent_spaces must be at least 1 when use_tab is off".to_string(),
            ));
        }
        if self.owner.trim().is_empty() {
            return Err(GenerationError::InvalidOptions("owner is empty".to_string()));
        }
        for (key, marker) in [
            ("trigger", &self.trigger),
            ("function", &self.function),
            ("procedure", &self.procedure),
        ] {
            if marker.trim().is_empty() {
                return Err(GenerationError::InvalidOptions(format!(
                    "{key} marker name is empty"
                )));
            }
        }
        Ok(())
    }

    /// One indentation level.
    pub fn indent_unit(&self) -> String {
        if self.use_tab {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_spaces)
        }
    }

    pub fn documentation_mode(&self) -> DocumentationMode {
        if self.table_inserts {
            DocumentationMode::SeedRows
        } else {
            DocumentationMode::Comment
        }
    }

    pub fn has_collation(&self) -> bool {
        let collation = self.collation.trim();
        !collation.is_empty() && collation != "default"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = GenerateOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.indent_unit(), "    ");
        assert_eq!(options.documentation_mode(), DocumentationMode::Comment);
        assert!(!options.has_collation());
    }

    #[test]
    fn rejects_empty_marker() {
        let options = GenerateOptions {
            procedure: " ".to_string(),
            ..GenerateOptions::default()
        };
        let err = options.validate().expect_err("empty marker");
        assert!(err.to_string().contains("procedure"));
    }

    #[test]
    fn inserts_switch_selects_seed_rows() {
        let options = GenerateOptions {
            table_inserts: true,
            use_tab: true,
            indent_spaces: 0,
            ..GenerateOptions::default()
        };
        assert!(options.validate().is_ok());
        assert_eq!(options.indent_unit(), "\t");
        assert_eq!(options.documentation_mode(), DocumentationMode::SeedRows);
    }
}
