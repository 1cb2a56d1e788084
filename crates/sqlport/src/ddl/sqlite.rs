//! SQLite DDL builder.
//!
//! SQLite cannot add constraints after table creation, so foreign keys,
//! unique constraints, and checks are inlined into CREATE TABLE. Indexes
//! and trigger placeholders still apply in the constraints phase.

use crate::config::Engine;
use crate::core::identifier::quote_bracket;
use crate::core::schema::{Index, TableSchema, Trigger, TriggerTiming, ViewSchema};
use crate::ddl::{column_type, comment_safe};
use crate::error::Result;
use crate::expr::{ExpressionGenerator, ExpressionNode, SqliteGenerator};
use crate::typemap::TypeService;

pub struct SqliteDdlBuilder {
    generator: SqliteGenerator,
}

impl SqliteDdlBuilder {
    pub fn new() -> Self {
        SqliteDdlBuilder {
            generator: SqliteGenerator,
        }
    }

    /// Whether a table takes the rowid-alias form: a single-column
    /// primary key on its identity column.
    fn rowid_alias(table: &TableSchema) -> Option<&str> {
        if table.primary_key.len() != 1 {
            return None;
        }
        let pk = &table.primary_key[0];
        table
            .columns
            .iter()
            .find(|c| c.is_identity && c.name.eq_ignore_ascii_case(pk))
            .map(|c| c.name.as_str())
    }

    pub fn create_table(
        &self,
        table: &TableSchema,
        types: &TypeService,
        source: Engine,
    ) -> Result<String> {
        let rowid_alias = Self::rowid_alias(table);
        let mut lines = Vec::new();

        for column in &table.columns {
            if rowid_alias == Some(column.name.as_str()) {
                lines.push(format!(
                    "  {} INTEGER PRIMARY KEY AUTOINCREMENT",
                    quote_bracket(&column.name)
                ));
                continue;
            }
            let type_text = column_type(column, types, source, Engine::Sqlite)?;
            let mut line = format!("  {} {}", quote_bracket(&column.name), type_text);
            if !column.is_nullable {
                line.push_str(" NOT NULL");
            }
            if !column.is_identity {
                if let Some(ast) = &column.default_ast {
                    line.push_str(&format!(" DEFAULT {}", self.generator.generate(ast)?));
                }
            }
            lines.push(line);
        }

        if rowid_alias.is_none() && !table.primary_key.is_empty() {
            let cols: Vec<String> = table.primary_key.iter().map(|c| quote_bracket(c)).collect();
            lines.push(format!("  PRIMARY KEY ({})", cols.join(", ")));
        }

        for constraint in &table.unique_constraints {
            let cols: Vec<String> = constraint.columns.iter().map(|c| quote_bracket(c)).collect();
            lines.push(format!(
                "  CONSTRAINT {} UNIQUE ({})",
                quote_bracket(&constraint.name),
                cols.join(", ")
            ));
        }

        for check in &table.check_constraints {
            let ast = check
                .check_ast
                .clone()
                .unwrap_or_else(|| ExpressionNode::raw(&check.definition));
            lines.push(format!(
                "  CONSTRAINT {} CHECK ({})",
                quote_bracket(&check.name),
                self.generator.generate(&ast)?
            ));
        }

        for fk in &table.foreign_keys {
            let cols: Vec<String> = fk.columns.iter().map(|c| quote_bracket(c)).collect();
            let ref_cols: Vec<String> = fk.ref_columns.iter().map(|c| quote_bracket(c)).collect();
            let mut line = format!(
                "  CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
                quote_bracket(&fk.name),
                cols.join(", "),
                quote_bracket(&fk.ref_table),
                ref_cols.join(", ")
            );
            if let Some(action) = fk
                .on_delete
                .as_deref()
                .filter(|a| !a.eq_ignore_ascii_case("NO ACTION"))
            {
                line.push_str(&format!(" ON DELETE {}", action));
            }
            if let Some(action) = fk
                .on_update
                .as_deref()
                .filter(|a| !a.eq_ignore_ascii_case("NO ACTION"))
            {
                line.push_str(&format!(" ON UPDATE {}", action));
            }
            lines.push(line);
        }

        Ok(format!(
            "CREATE TABLE {} (\n{}\n);",
            quote_bracket(&table.name),
            lines.join(",\n")
        ))
    }

    pub fn create_index(&self, table: &TableSchema, index: &Index) -> String {
        let cols: Vec<String> = index
            .columns
            .iter()
            .map(|c| {
                format!(
                    "{} {}",
                    quote_bracket(&c.name),
                    if c.ascending { "ASC" } else { "DESC" }
                )
            })
            .collect();
        format!(
            "CREATE {}INDEX {} ON {} ({});",
            if index.is_unique { "UNIQUE " } else { "" },
            quote_bracket(&index.name),
            quote_bracket(&table.name),
            cols.join(", ")
        )
    }

    /// Placeholder trigger with the original body preserved in a comment.
    /// INSTEAD OF triggers on tables downgrade to AFTER.
    pub fn create_trigger_placeholder(&self, trigger: &Trigger) -> String {
        let (timing, timing_note) = match trigger.timing {
            TriggerTiming::Before => ("BEFORE", ""),
            TriggerTiming::After => ("AFTER", ""),
            TriggerTiming::InsteadOf => ("AFTER", " (downgraded from INSTEAD OF)"),
        };
        format!(
            "/* Placeholder for trigger {name}{note}. Original body:\n{body}\n*/\n\
             CREATE TRIGGER {trg} {timing} {event} ON {table}\nBEGIN\n  SELECT 1;\nEND;",
            name = trigger.name,
            note = timing_note,
            body = comment_safe(&trigger.body),
            trg = quote_bracket(&trigger.name),
            timing = timing,
            event = trigger.event.as_sql(),
            table = quote_bracket(&trigger.table),
        )
    }

    pub fn create_view_placeholder(&self, view: &ViewSchema) -> String {
        format!(
            "/* Placeholder for view {name}. Original definition:\n{definition}\n*/\n\
             CREATE VIEW {ident} AS SELECT 1 AS placeholder;",
            name = view.name,
            definition = comment_safe(&view.definition),
            ident = quote_bracket(&view.name),
        )
    }
}

impl Default for SqliteDdlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{CheckConstraint, Column, ForeignKey, TriggerEvent};
    use crate::expr::{annotate_tables, TsqlParser};

    fn types() -> TypeService {
        TypeService::with_builtins()
    }

    fn order_items() -> TableSchema {
        let mut tables = vec![TableSchema {
            name: "Order Items".to_string(),
            columns: vec![
                Column {
                    name: "Id".to_string(),
                    data_type: "int".to_string(),
                    is_identity: true,
                    ..Default::default()
                },
                Column {
                    name: "OrderId".to_string(),
                    data_type: "int".to_string(),
                    ..Default::default()
                },
                Column {
                    name: "Qty".to_string(),
                    data_type: "int".to_string(),
                    default_text: Some("((1))".to_string()),
                    ..Default::default()
                },
            ],
            primary_key: vec!["Id".to_string()],
            foreign_keys: vec![ForeignKey {
                name: "FK_Items_Orders".to_string(),
                columns: vec!["OrderId".to_string()],
                ref_table: "Orders".to_string(),
                ref_columns: vec!["Id".to_string()],
                on_delete: Some("CASCADE".to_string()),
                on_update: None,
            }],
            check_constraints: vec![CheckConstraint {
                name: "CK_Items_Qty".to_string(),
                definition: "([Qty]>(0))".to_string(),
                check_ast: None,
            }],
            ..Default::default()
        }];
        annotate_tables(&mut tables, &TsqlParser);
        tables.remove(0)
    }

    #[test]
    fn test_identity_pk_becomes_rowid_alias() {
        let sql = SqliteDdlBuilder::new()
            .create_table(&order_items(), &types(), Engine::SqlServer)
            .unwrap();
        assert!(sql.contains("[Id] INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(!sql.contains("PRIMARY KEY ([Id])"));
    }

    #[test]
    fn test_constraints_are_inlined() {
        let sql = SqliteDdlBuilder::new()
            .create_table(&order_items(), &types(), Engine::SqlServer)
            .unwrap();
        assert!(sql.contains(
            "CONSTRAINT [FK_Items_Orders] FOREIGN KEY ([OrderId]) REFERENCES [Orders] ([Id]) ON DELETE CASCADE"
        ));
        assert!(sql.contains("CONSTRAINT [CK_Items_Qty] CHECK (([Qty] > 0))"));
        assert!(sql.contains("[Qty] INTEGER NOT NULL DEFAULT 1"));
    }

    #[test]
    fn test_composite_pk_stays_a_table_constraint() {
        let mut table = order_items();
        table.primary_key = vec!["OrderId".to_string(), "Id".to_string()];
        let sql = SqliteDdlBuilder::new()
            .create_table(&table, &types(), Engine::SqlServer)
            .unwrap();
        assert!(sql.contains("PRIMARY KEY ([OrderId], [Id])"));
        assert!(!sql.contains("AUTOINCREMENT"));
    }

    #[test]
    fn test_instead_of_trigger_downgrades() {
        let trigger = Trigger {
            name: "TR_Items".to_string(),
            table: "Order Items".to_string(),
            event: TriggerEvent::Insert,
            timing: TriggerTiming::InsteadOf,
            body: "SET NOCOUNT ON; /* body */".to_string(),
        };
        let sql = SqliteDdlBuilder::new().create_trigger_placeholder(&trigger);
        assert!(sql.contains("CREATE TRIGGER [TR_Items] AFTER INSERT ON [Order Items]"));
        assert!(sql.contains("downgraded from INSTEAD OF"));
        assert!(sql.contains("SET NOCOUNT ON"));
    }
}
