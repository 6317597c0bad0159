//! Abstract column types to PostgreSQL spellings.

use tagddl_core::Column;

/// Length value that requests an auto-incrementing integer.
pub const AUTO_INCREMENT_LENGTH: i32 = -1;

/// Mapped spelling of the `ENUM` abstract type before materialization.
pub const ENUM_TYPE: &str = "enum";

/// PostgreSQL type for a column.
pub fn data_type(column: &Column) -> String {
    map_type(&column.data_type, column.length)
}

/// PostgreSQL type for an abstract type name and optional length.
///
/// Integer kinds become their `serial` variants only when `length` is
/// exactly [`AUTO_INCREMENT_LENGTH`]. Unknown types pass through verbatim.
pub fn map_type(abstract_type: &str, length: Option<i32>) -> String {
    let auto_increment = length == Some(AUTO_INCREMENT_LENGTH);
    let sized = |spelling: &str| match length {
        Some(n) if n > 0 => format!("{spelling}({n})"),
        _ => spelling.to_string(),
    };

    match abstract_type.trim().to_ascii_uppercase().as_str() {
        "VARCHAR" => sized("varchar"),
        "CHAR" => sized("char"),
        "DECIMAL" | "NUMERIC" => sized("numeric"),
        "BIT" => sized("bit"),
        "INTEGER" | "INT" => serial_or(auto_increment, "serial", "integer"),
        "SMALLINT" => serial_or(auto_increment, "smallserial", "smallint"),
        "BIGINT" => serial_or(auto_increment, "bigserial", "bigint"),
        "BOOLEAN" => "boolean".to_string(),
        "TEXT" => "text".to_string(),
        "BINARY" | "VARBINARY" | "BLOB" => "bytea".to_string(),
        "FLOAT" => "real".to_string(),
        "DOUBLE" => "double precision".to_string(),
        "DATE" => "date".to_string(),
        "TIME" => "time".to_string(),
        "TIMESTAMP" | "DATETIME" => "timestamp".to_string(),
        "TIMESTAMPTZ" => "timestamptz".to_string(),
        "POINT" => "point".to_string(),
        "POLYGON" => "polygon".to_string(),
        "CIDR" => "cidr".to_string(),
        "INET" => "inet".to_string(),
        "ENUM" => ENUM_TYPE.to_string(),
        _ => abstract_type.to_string(),
    }
}

fn serial_or(auto_increment: bool, serial: &str, plain: &str) -> String {
    let spelling = if auto_increment { serial } else { plain };
    spelling.to_string()
}

/// Auto-increment columns never carry an explicit default.
pub fn is_auto_increment(sql_type: &str) -> bool {
    sql_type.contains("serial")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_only_for_sentinel_length() {
        for (abstract_type, serial, plain) in [
            ("INTEGER", "serial", "integer"),
            ("SMALLINT", "smallserial", "smallint"),
            ("BIGINT", "bigserial", "bigint"),
        ] {
            assert_eq!(map_type(abstract_type, Some(-1)), serial);
            assert!(is_auto_increment(&map_type(abstract_type, Some(-1))));
            for length in [None, Some(0), Some(8), Some(-2)] {
                let mapped = map_type(abstract_type, length);
                assert_eq!(mapped, plain);
                assert!(!is_auto_increment(&mapped));
            }
        }
    }

    #[test]
    fn sized_types_take_length() {
        assert_eq!(map_type("VARCHAR", Some(40)), "varchar(40)");
        assert_eq!(map_type("char", Some(2)), "char(2)");
        assert_eq!(map_type("DECIMAL", Some(10)), "numeric(10)");
        assert_eq!(map_type("BIT", Some(8)), "bit(8)");
        assert_eq!(map_type("VARCHAR", None), "varchar");
    }

    #[test]
    fn fixed_and_unknown_types() {
        assert_eq!(map_type("DOUBLE", Some(5)), "double precision");
        assert_eq!(map_type("BLOB", None), "bytea");
        assert_eq!(map_type("ENUM", None), "enum");
        assert_eq!(map_type("jsonb", None), "jsonb");
        assert_eq!(map_type("uuid", Some(-1)), "uuid");
    }
}
