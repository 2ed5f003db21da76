/// Server error definitions as `(code, symbolic name, message template)`.
///
/// `%s` marks a span filled in by the server (identifiers, values, nested messages).
/// Order is significant: the first template that matches a message wins.
pub(super) const SERVER_ERRORS: &[(u16, &str, &str)] = &[
    (1044, "ER_DBACCESS_DENIED_ERROR", "Access denied for user '%s'@'%s' to database '%s'"),
    (1045, "ER_ACCESS_DENIED_ERROR", "Access denied for user '%s'@'%s' (using password: %s)"),
    (1046, "ER_NO_DB_ERROR", "No database selected"),
    (1048, "ER_BAD_NULL_ERROR", "Column '%s' cannot be null"),
    (1049, "ER_BAD_DB_ERROR", "Unknown database '%s'"),
    (1050, "ER_TABLE_EXISTS_ERROR", "Table '%s' already exists"),
    (1051, "ER_BAD_TABLE_ERROR", "Unknown table '%s'"),
    (1052, "ER_NON_UNIQ_ERROR", "Column '%s' in %s is ambiguous"),
    (1054, "ER_BAD_FIELD_ERROR", "Unknown column '%s' in '%s'"),
    (1060, "ER_DUP_FIELDNAME", "Duplicate column name '%s'"),
    (1062, "ER_DUP_ENTRY", "Duplicate entry '%s' for key %s"),
    (1064, "ER_PARSE_ERROR", "%s near '%s' at line %s"),
    (1095, "ER_KILL_DENIED_ERROR", "You are not owner of thread %s"),
    (1110, "ER_FIELD_SPECIFIED_TWICE", "Column '%s' specified twice"),
    (
        1121,
        "ER_NULL_COLUMN_IN_INDEX",
        "Table handler doesn't support NULL in given index. Please change column '%s' to be NOT NULL or use another handler",
    ),
    (1138, "ER_INVALID_USE_OF_NULL", "Invalid use of NULL value"),
    (
        1142,
        "ER_TABLEACCESS_DENIED_ERROR",
        "%s command denied to user '%s'@'%s' for table '%s'",
    ),
    (
        1143,
        "ER_COLUMNACCESS_DENIED_ERROR",
        "%s command denied to user '%s'@'%s' for column '%s' in table '%s'",
    ),
    (1146, "ER_NO_SUCH_TABLE", "Table '%s.%s' doesn't exist"),
    (
        1149,
        "ER_SYNTAX_ERROR",
        "You have an error in your SQL syntax; check the manual that corresponds to your MySQL server version for the right syntax to use",
    ),
    (1166, "ER_WRONG_COLUMN_NAME", "Incorrect column name '%s'"),
    (
        1171,
        "ER_PRIMARY_CANT_HAVE_NULL",
        "All parts of a PRIMARY KEY must be NOT NULL; if you need NULL in a key, use UNIQUE instead",
    ),
    (1205, "ER_LOCK_WAIT_TIMEOUT", "Lock wait timeout exceeded; try restarting transaction"),
    (
        1213,
        "ER_LOCK_DEADLOCK",
        "Deadlock found when trying to get lock; try restarting transaction",
    ),
    (
        1216,
        "ER_NO_REFERENCED_ROW",
        "Cannot add or update a child row: a foreign key constraint fails",
    ),
    (
        1217,
        "ER_ROW_IS_REFERENCED",
        "Cannot delete or update a parent row: a foreign key constraint fails",
    ),
    (
        1227,
        "ER_SPECIFIC_ACCESS_DENIED_ERROR",
        "Access denied; you need (at least one of) the %s privilege(s) for this operation",
    ),
    (1252, "ER_SPATIAL_CANT_HAVE_NULL", "All parts of a SPATIAL index must be NOT NULL"),
    (
        1263,
        "ER_WARN_NULL_TO_NOTNULL",
        "Column set to default value; NULL supplied to NOT NULL column '%s' at row %s",
    ),
    (
        1287,
        "ER_WARN_DEPRECATED_SYNTAX",
        "'%s' is deprecated and will be removed in a future release. Please use %s instead",
    ),
    (1341, "ER_FPARSER_BAD_HEADER", "Malformed file type header in file '%s'"),
    (1342, "ER_FPARSER_EOF_IN_COMMENT", "Unexpected end of file while parsing comment '%s'"),
    (1343, "ER_FPARSER_ERROR_IN_PARAMETER", "Error while parsing parameter '%s' (line: '%s')"),
    (
        1344,
        "ER_FPARSER_EOF_IN_UNKNOWN_PARAMETER",
        "Unexpected end of file while skipping unknown parameter '%s'",
    ),
    (1364, "ER_NO_DEFAULT_FOR_FIELD", "Field '%s' doesn't have a default value"),
    (
        1370,
        "ER_PROCACCESS_DENIED_ERROR",
        "%s command denied to user '%s'@'%s' for routine '%s'",
    ),
    (
        1382,
        "ER_RESERVED_SYNTAX",
        "The '%s' syntax is reserved for purposes internal to the MySQL server",
    ),
    (1429, "ER_CONNECT_TO_FOREIGN_DATA_SOURCE", "Unable to connect to foreign data source: %s"),
    (
        1451,
        "ER_ROW_IS_REFERENCED_2",
        "Cannot delete or update a parent row: a foreign key constraint fails (%s)",
    ),
    (
        1452,
        "ER_NO_REFERENCED_ROW_2",
        "Cannot add or update a child row: a foreign key constraint fails (%s)",
    ),
    (
        1479,
        "ER_PARTITION_REQUIRES_VALUES_ERROR",
        "Syntax error: %s PARTITIONING requires definition of VALUES %s for each partition",
    ),
    (1541, "ER_EVENT_DROP_FAILED", "Failed to drop %s"),
    (
        1554,
        "ER_WARN_DEPRECATED_SYNTAX_WITH_VER",
        "The syntax '%s' is deprecated and will be removed in MySQL %s. Please use %s instead",
    ),
    (
        1557,
        "ER_FOREIGN_DUPLICATE_KEY",
        "Upholding foreign key constraints for table '%s', entry '%s', key %s would lead to a duplicate entry",
    ),
    (1566, "ER_NULL_IN_VALUES_LESS_THAN", "Not allowed to use NULL value in VALUES LESS THAN"),
    (
        1569,
        "ER_DUP_ENTRY_AUTOINCREMENT_CASE",
        "ALTER TABLE causes auto_increment resequencing, resulting in duplicate entry '%s' for key '%s'",
    ),
    (1586, "ER_DUP_ENTRY_WITH_KEY_NAME", "Duplicate entry '%s' for key '%s'"),
    (1611, "ER_LOAD_DATA_INVALID_COLUMN", "Invalid column reference (%s) in LOAD DATA"),
    (1626, "ER_CONFLICT_FN_PARSE_ERROR", "Error in parsing conflict function. Message: %s"),
    (
        1701,
        "ER_TRUNCATE_ILLEGAL_FK",
        "Cannot truncate a table referenced in a foreign key constraint (%s)",
    ),
    // Raised by the serverless proxy rather than the server. Server codes are 1xxx and
    // client codes 2xxx, so proxy conditions use 6xxx.
    (
        super::PROXY_CONNECTION_ERROR,
        "PR_CONNECTION_ERROR",
        "Communications link failure%s",
    ),
];
