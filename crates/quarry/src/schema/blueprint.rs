//! Table blueprints: structured descriptions of columns, indexes, and
//! foreign keys, consumed by the schema grammars.

use crate::value::{IntoValue, Value};

/// Semantic column types, mapped to native keywords per dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    TinyInteger,
    SmallInteger,
    MediumInteger,
    Integer,
    BigInteger,
    Decimal,
    Float,
    Double,
    Boolean,
    Char,
    String,
    Text,
    MediumText,
    LongText,
    Date,
    DateTime,
    Time,
    Timestamp,
    Binary,
    Uuid,
    Json,
    Jsonb,
    Enum,
    Set,
}

/// One column definition.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub name: String,
    pub ty: ColumnType,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    /// Allowed values for `Enum`/`Set` columns.
    pub allowed: Vec<String>,
    pub nullable: bool,
    pub unsigned: bool,
    pub auto_increment: bool,
    pub primary: bool,
    pub unique: bool,
    pub index: bool,
    pub default: Option<Value>,
    pub comment: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    /// Marks an existing column to be modified in ALTER mode.
    pub change: bool,
}

impl ColumnDefinition {
    fn new(name: &str, ty: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            length: None,
            precision: None,
            scale: None,
            allowed: Vec::new(),
            nullable: false,
            unsigned: false,
            auto_increment: false,
            primary: false,
            unique: false,
            index: false,
            default: None,
            comment: None,
            charset: None,
            collation: None,
            change: false,
        }
    }

    /// Allow NULL values.
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Mark the integer column unsigned.
    pub fn unsigned(&mut self) -> &mut Self {
        self.unsigned = true;
        self
    }

    /// Auto-increment this column.
    pub fn auto_increment(&mut self) -> &mut Self {
        self.auto_increment = true;
        self
    }

    /// Make this column the primary key.
    pub fn primary(&mut self) -> &mut Self {
        self.primary = true;
        self
    }

    /// Add a unique index on this column.
    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    /// Add a plain index on this column.
    pub fn index(&mut self) -> &mut Self {
        self.index = true;
        self
    }

    /// Set the default value.
    pub fn default(&mut self, value: impl IntoValue) -> &mut Self {
        self.default = Some(value.into_value());
        self
    }

    /// Default the column to the current timestamp.
    pub fn use_current(&mut self) -> &mut Self {
        self.default = Some(Value::Str("CURRENT_TIMESTAMP".to_string()));
        self
    }

    /// Attach a column comment.
    pub fn comment(&mut self, comment: &str) -> &mut Self {
        self.comment = Some(comment.to_string());
        self
    }

    /// Set the column character set.
    pub fn charset(&mut self, charset: &str) -> &mut Self {
        self.charset = Some(charset.to_string());
        self
    }

    /// Set the column collation.
    pub fn collation(&mut self, collation: &str) -> &mut Self {
        self.collation = Some(collation.to_string());
        self
    }

    /// Modify this column in place (ALTER mode).
    pub fn change(&mut self) -> &mut Self {
        self.change = true;
        self
    }
}

/// Index kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Primary,
    Unique,
    Index,
    Fulltext,
    Spatial,
}

impl IndexKind {
    /// Suffix used in deterministic index names.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Unique => "unique",
            Self::Index => "index",
            Self::Fulltext => "fulltext",
            Self::Spatial => "spatial",
        }
    }
}

/// One index definition.
#[derive(Debug, Clone)]
pub struct IndexDefinition {
    pub columns: Vec<String>,
    pub kind: IndexKind,
    pub name: String,
}

/// One foreign key definition.
#[derive(Debug, Clone, Default)]
pub struct ForeignKeyDefinition {
    pub column: String,
    pub references: String,
    pub on: String,
    pub name: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

impl ForeignKeyDefinition {
    /// The referenced column.
    pub fn references(&mut self, column: &str) -> &mut Self {
        self.references = column.to_string();
        self
    }

    /// The referenced table.
    pub fn on(&mut self, table: &str) -> &mut Self {
        self.on = table.to_string();
        self
    }

    /// ON DELETE action (`cascade`, `set null`, `restrict`, ...).
    pub fn on_delete(&mut self, action: &str) -> &mut Self {
        self.on_delete = Some(action.to_string());
        self
    }

    /// ON UPDATE action.
    pub fn on_update(&mut self, action: &str) -> &mut Self {
        self.on_update = Some(action.to_string());
        self
    }
}

/// Structured description of a table's desired layout.
///
/// A blueprint with columns and no drop/rename entries compiles through
/// the CREATE path; anything else compiles through ALTER.
#[derive(Debug, Clone, Default)]
pub struct Blueprint {
    pub table: String,
    /// Set when the blueprint was opened for table creation.
    pub create: bool,
    pub columns: Vec<ColumnDefinition>,
    pub indexes: Vec<IndexDefinition>,
    pub foreign_keys: Vec<ForeignKeyDefinition>,
    pub drop_columns: Vec<String>,
    pub drop_indexes: Vec<String>,
    pub drop_foreign_keys: Vec<String>,
    pub rename_columns: Vec<(String, String)>,
    pub engine: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub comment: Option<String>,
    pub temporary: bool,
}

impl Blueprint {
    /// Create an empty blueprint for `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Whether this blueprint compiles through the CREATE path: opened
    /// for creation, has columns, and carries no drop/rename entries.
    pub fn is_creating(&self) -> bool {
        self.create
            && !self.columns.is_empty()
            && self.drop_columns.is_empty()
            && self.drop_indexes.is_empty()
            && self.drop_foreign_keys.is_empty()
            && self.rename_columns.is_empty()
            && self.columns.iter().all(|c| !c.change)
    }

    /// Deterministic index name from table, columns, and kind.
    pub fn index_name(table: &str, columns: &[&str], kind: IndexKind) -> String {
        format!("{table}_{}_{}", columns.join("_"), kind.suffix())
    }

    /// Deterministic foreign key name from table and column.
    pub fn foreign_key_name(table: &str, column: &str) -> String {
        format!("{table}_{column}_foreign")
    }

    fn add_column(&mut self, name: &str, ty: ColumnType) -> &mut ColumnDefinition {
        self.columns.push(ColumnDefinition::new(name, ty));
        self.columns.last_mut().expect("just pushed")
    }

    // ==================== Columns ====================

    /// Auto-incrementing unsigned big integer primary key named `id`.
    pub fn id(&mut self) -> &mut ColumnDefinition {
        let col = self.add_column("id", ColumnType::BigInteger);
        col.unsigned = true;
        col.auto_increment = true;
        col.primary = true;
        col
    }

    pub fn tiny_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::TinyInteger)
    }

    pub fn small_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::SmallInteger)
    }

    pub fn medium_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::MediumInteger)
    }

    pub fn integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Integer)
    }

    pub fn big_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::BigInteger)
    }

    pub fn decimal(&mut self, name: &str, precision: u32, scale: u32) -> &mut ColumnDefinition {
        let col = self.add_column(name, ColumnType::Decimal);
        col.precision = Some(precision);
        col.scale = Some(scale);
        col
    }

    pub fn float(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Float)
    }

    pub fn double(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Double)
    }

    pub fn boolean(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Boolean)
    }

    pub fn char(&mut self, name: &str, length: u32) -> &mut ColumnDefinition {
        let col = self.add_column(name, ColumnType::Char);
        col.length = Some(length);
        col
    }

    /// Variable-length string, 255 by default.
    pub fn string(&mut self, name: &str) -> &mut ColumnDefinition {
        let col = self.add_column(name, ColumnType::String);
        col.length = Some(255);
        col
    }

    pub fn string_with_length(&mut self, name: &str, length: u32) -> &mut ColumnDefinition {
        let col = self.add_column(name, ColumnType::String);
        col.length = Some(length);
        col
    }

    pub fn text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Text)
    }

    pub fn medium_text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::MediumText)
    }

    pub fn long_text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::LongText)
    }

    pub fn date(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Date)
    }

    pub fn date_time(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::DateTime)
    }

    pub fn time(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Time)
    }

    pub fn timestamp(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Timestamp)
    }

    /// Nullable `created_at` and `updated_at` timestamps.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at").nullable();
        self.timestamp("updated_at").nullable();
    }

    pub fn binary(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Binary)
    }

    pub fn uuid(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Uuid)
    }

    pub fn json(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Json)
    }

    pub fn jsonb(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Jsonb)
    }

    pub fn enumeration(&mut self, name: &str, allowed: &[&str]) -> &mut ColumnDefinition {
        let col = self.add_column(name, ColumnType::Enum);
        col.allowed = allowed.iter().map(|s| s.to_string()).collect();
        col
    }

    pub fn set(&mut self, name: &str, allowed: &[&str]) -> &mut ColumnDefinition {
        let col = self.add_column(name, ColumnType::Set);
        col.allowed = allowed.iter().map(|s| s.to_string()).collect();
        col
    }

    // ==================== Indexes ====================

    fn add_index(&mut self, columns: &[&str], kind: IndexKind, name: Option<&str>) {
        let name = name
            .map(|n| n.to_string())
            .unwrap_or_else(|| Self::index_name(&self.table, columns, kind));
        self.indexes.push(IndexDefinition {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            kind,
            name,
        });
    }

    /// Composite primary key.
    pub fn primary(&mut self, columns: &[&str]) {
        self.add_index(columns, IndexKind::Primary, None);
    }

    /// Unique index, auto-named when `name` is `None`.
    pub fn unique(&mut self, columns: &[&str], name: Option<&str>) {
        self.add_index(columns, IndexKind::Unique, name);
    }

    /// Plain index, auto-named when `name` is `None`.
    pub fn index(&mut self, columns: &[&str], name: Option<&str>) {
        self.add_index(columns, IndexKind::Index, name);
    }

    /// Fulltext index.
    pub fn fulltext(&mut self, columns: &[&str], name: Option<&str>) {
        self.add_index(columns, IndexKind::Fulltext, name);
    }

    /// Spatial index.
    pub fn spatial(&mut self, columns: &[&str], name: Option<&str>) {
        self.add_index(columns, IndexKind::Spatial, name);
    }

    // ==================== Foreign keys ====================

    /// Begin a foreign key on `column`; chain `references`/`on`.
    pub fn foreign(&mut self, column: &str) -> &mut ForeignKeyDefinition {
        self.foreign_keys.push(ForeignKeyDefinition {
            column: column.to_string(),
            name: Self::foreign_key_name(&self.table, column),
            ..ForeignKeyDefinition::default()
        });
        self.foreign_keys.last_mut().expect("just pushed")
    }

    // ==================== ALTER operations ====================

    /// Drop a column.
    pub fn drop_column(&mut self, name: &str) {
        self.drop_columns.push(name.to_string());
    }

    /// Drop an index by name.
    pub fn drop_index(&mut self, name: &str) {
        self.drop_indexes.push(name.to_string());
    }

    /// Drop the auto-named unique index over `columns`.
    pub fn drop_unique(&mut self, columns: &[&str]) {
        self.drop_indexes
            .push(Self::index_name(&self.table, columns, IndexKind::Unique));
    }

    /// Drop a foreign key by name.
    pub fn drop_foreign(&mut self, name: &str) {
        self.drop_foreign_keys.push(name.to_string());
    }

    /// Drop the auto-named foreign key on `column`.
    pub fn drop_foreign_on(&mut self, column: &str) {
        self.drop_foreign_keys
            .push(Self::foreign_key_name(&self.table, column));
    }

    /// Rename a column.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        self.rename_columns.push((from.to_string(), to.to_string()));
    }

    // ==================== Table options ====================

    /// Storage engine (MySQL).
    pub fn engine(&mut self, engine: &str) {
        self.engine = Some(engine.to_string());
    }

    /// Default table character set.
    pub fn table_charset(&mut self, charset: &str) {
        self.charset = Some(charset.to_string());
    }

    /// Default table collation.
    pub fn table_collation(&mut self, collation: &str) {
        self.collation = Some(collation.to_string());
    }

    /// Table comment.
    pub fn table_comment(&mut self, comment: &str) {
        self.comment = Some(comment.to_string());
    }

    /// Create as a temporary table.
    pub fn temporary(&mut self) {
        self.temporary = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creating_requires_columns_and_no_drops() {
        let mut bp = Blueprint::new("users");
        bp.create = true;
        assert!(!bp.is_creating());

        bp.string("email");
        assert!(bp.is_creating());

        bp.drop_column("legacy");
        assert!(!bp.is_creating());
    }

    #[test]
    fn change_flag_forces_alter_path() {
        let mut bp = Blueprint::new("users");
        bp.create = true;
        bp.string("email").change();
        assert!(!bp.is_creating());
    }

    #[test]
    fn add_only_table_blueprint_is_not_creating() {
        let mut bp = Blueprint::new("users");
        bp.string("nickname").nullable();
        assert!(!bp.is_creating());
    }

    #[test]
    fn index_names_are_deterministic() {
        assert_eq!(
            Blueprint::index_name("users", &["email"], IndexKind::Unique),
            "users_email_unique"
        );
        assert_eq!(
            Blueprint::index_name("posts", &["a", "b"], IndexKind::Index),
            "posts_a_b_index"
        );
        assert_eq!(
            Blueprint::foreign_key_name("posts", "user_id"),
            "posts_user_id_foreign"
        );
    }
}
