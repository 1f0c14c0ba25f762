//! Archive database schema.

/// SQL to create the namespace table.
pub const CREATE_NAMESPACES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS archive_namespaces (
    name TEXT PRIMARY KEY NOT NULL
)
";

/// SQL to create the records table. Keys are compared bytewise.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS archive_records (
    namespace TEXT NOT NULL REFERENCES archive_namespaces (name),
    key       BLOB NOT NULL,
    value     BLOB NOT NULL,
    PRIMARY KEY (namespace, key)
) WITHOUT ROWID
";
