//! Full SELECT, INSERT and UPDATE statements.
//!
//! Values are rendered into the statement text as wire literals; nothing is bound.
//!
//! # Example
//!
//! ```
//! # use rowmodel_core::{FieldType, Value};
//! # use rowmodel_schema::{FieldMeta, KeyRole, Schema};
//! use rowmodel_query::{Order, Select};
//!
//! # let field = |name: &str| FieldMeta {
//! #     name: name.into(), declared_type: "int".into(), field_type: FieldType::Integer,
//! #     nullable: false, key_role: KeyRole::None, default: Value::Null, extra: String::new(),
//! # };
//! # let schema = Schema::new("LogHistory", vec![field("UserId"), field("Created")]).unwrap();
//! let sql = Select::new()
//!     .filter("`UserId` = 100")
//!     .order_by(Order::desc("Created"))
//!     .limit(1)
//!     .build(&schema)
//!     .unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT `UserId`,`Created` FROM `LogHistory` WHERE `UserId` = 100 ORDER BY `Created` DESC LIMIT 1;"
//! );
//! ```

use rowmodel_core::{FieldMap, Result, quote_ident};
use rowmodel_schema::Schema;

use crate::clause::{
    Limit, Order, Where, field_list, group_clause, join_clause, limit_clause, order_clause,
    set_clause, value_list,
};

/// SELECT query description.
///
/// Every part is optional; an empty `Select` reads all columns of all rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    fields: Option<Vec<String>>,
    filter: Where,
    order: Option<Order>,
    group: Option<String>,
    join: Option<String>,
    limit: Option<Limit>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project only these columns. Result rows map onto them positionally.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Add conditions; repeated calls are ANDed together.
    pub fn filter(mut self, filter: impl Into<Where>) -> Self {
        for condition in filter.into().conditions() {
            self.filter = self.filter.and(condition.clone());
        }
        self
    }

    pub fn order_by(mut self, order: impl Into<Order>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group = Some(field.into());
        self
    }

    /// Raw JOIN text, inserted after the table name.
    pub fn join(mut self, join: impl Into<String>) -> Self {
        self.join = Some(join.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Columns the statement projects, defaulting to every schema column.
    pub fn projected_fields(&self, schema: &Schema) -> Vec<String> {
        match &self.fields {
            Some(fields) => fields.clone(),
            None => schema.field_names().map(str::to_string).collect(),
        }
    }

    /// Render the statement, validating projected, ORDER and GROUP columns.
    pub fn build(&self, schema: &Schema) -> Result<String> {
        let fields = self.projected_fields(schema);
        for field in &fields {
            schema.require(field)?;
        }

        let parts = [
            join_clause(self.join.as_deref()),
            self.filter.to_sql(),
            group_clause(schema, self.group.as_deref())?,
            order_clause(schema, self.order.as_ref())?,
            limit_clause(self.limit),
        ];

        let mut sql = format!(
            "SELECT {} FROM {}",
            field_list(&fields),
            quote_ident(schema.table_name())
        );
        for part in parts.iter().filter(|p| !p.is_empty()) {
            sql.push(' ');
            sql.push_str(part);
        }
        sql.push(';');

        tracing::trace!(sql = %sql, "Built SELECT");
        Ok(sql)
    }
}

/// `INSERT INTO table (fields) VALUES (literals);` from wire-representation values.
pub fn insert_statement(table: &str, values: &FieldMap) -> String {
    let fields: Vec<&str> = values.keys().collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        quote_ident(table),
        field_list(&fields),
        value_list(values)
    )
}

/// `UPDATE table SET assignments [WHERE ...];` from wire-representation values.
pub fn update_statement(table: &str, values: &FieldMap, filter: &Where) -> String {
    let where_sql = filter.to_sql();
    if where_sql.is_empty() {
        format!("UPDATE {} SET {};", quote_ident(table), set_clause(values))
    } else {
        format!(
            "UPDATE {} SET {} {};",
            quote_ident(table),
            set_clause(values),
            where_sql
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::Direction;
    use rowmodel_core::{Error, FieldType, Value};
    use rowmodel_schema::{FieldMeta, KeyRole};

    fn schema() -> Schema {
        let field = |name: &str, key_role| FieldMeta {
            name: name.to_string(),
            declared_type: "int(11)".to_string(),
            field_type: FieldType::Integer,
            nullable: false,
            key_role,
            default: Value::Null,
            extra: String::new(),
        };
        Schema::new(
            "LogHistory",
            vec![
                field("Id", KeyRole::Primary),
                field("UserId", KeyRole::None),
                field("EventType", KeyRole::None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_select_all_defaults() {
        assert_eq!(
            Select::new().build(&schema()).unwrap(),
            "SELECT `Id`,`UserId`,`EventType` FROM `LogHistory`;"
        );
    }

    #[test]
    fn test_select_every_clause() {
        let sql = Select::new()
            .fields(["UserId", "EventType"])
            .join("JOIN `users` USING (`UserId`)")
            .filter(vec!["`UserId` > 1", "`EventType` = 100"])
            .group_by("UserId")
            .order_by(("EventType", Direction::Desc))
            .limit((10, 5))
            .build(&schema())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT `UserId`,`EventType` FROM `LogHistory` JOIN `users` USING (`UserId`) \
             WHERE (`UserId` > 1) AND (`EventType` = 100) GROUP BY `UserId` \
             ORDER BY `EventType` DESC LIMIT 10, 5;"
        );
    }

    #[test]
    fn test_repeated_filters_are_anded() {
        let select = Select::new().filter("a = 1").filter("b = 2");
        assert_eq!(
            select.build(&schema()).unwrap(),
            "SELECT `Id`,`UserId`,`EventType` FROM `LogHistory` WHERE (a = 1) AND (b = 2);"
        );
    }

    #[test]
    fn test_unknown_projection_is_field_error() {
        let err = Select::new().fields(["Nope"]).build(&schema()).unwrap_err();
        assert!(matches!(err, Error::Field(_)));
    }

    #[test]
    fn test_insert_statement() {
        let values: FieldMap = [("Id", "NULL"), ("UserId", "100"), ("EventType", "7")]
            .into_iter()
            .collect();
        assert_eq!(
            insert_statement("LogHistory", &values),
            "INSERT INTO `LogHistory` (`Id`,`UserId`,`EventType`) VALUES (NULL,100,7);"
        );
    }

    #[test]
    fn test_update_statement() {
        let values: FieldMap = [("UserId", "101")].into_iter().collect();
        assert_eq!(
            update_statement("LogHistory", &values, &Where::eq("Id", "5")),
            "UPDATE `LogHistory` SET `UserId` = 101 WHERE `Id` = 5;"
        );
        assert_eq!(
            update_statement("LogHistory", &values, &Where::new()),
            "UPDATE `LogHistory` SET `UserId` = 101;"
        );
    }
}
